use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = hunkwise::cli::run() {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
