//! Diagnostic logging setup for the binary

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter (e.g. `debug`, `hunkwise=trace`)
pub const ENV_LOG: &str = "HUNKWISE_LOG";

/// Filter used when `HUNKWISE_LOG` is unset or invalid
const DEFAULT_FILTER: &str = "warn";

/// Install a stderr subscriber; calling it twice is harmless
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("hunkwise=debug")
    } else {
        EnvFilter::try_from_env(ENV_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .without_time();

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
