use anyhow::Result;
use clap::Args;

use crate::cli::output::{format_session, OutputFormat};
use crate::cli::Workspace;

/// Show command arguments
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Document path, relative to the workspace
    pub path: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Run the show command
pub fn run(args: ShowArgs, workspace: &Workspace) -> Result<()> {
    let registry = workspace.load_registry()?;

    match registry.get(&args.path) {
        Some(session) => println!("{}", format_session(session, args.format)),
        None => {
            if args.format == OutputFormat::Json {
                println!("null");
            } else {
                println!("No review in progress for {}.", args.path);
                println!("Open one with 'hunkwise propose {} --new-file <FILE>'.", args.path);
            }
        }
    }

    Ok(())
}
