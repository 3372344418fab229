use anyhow::Result;
use clap::Args;

use crate::cli::output::{format_final_result, OutputFormat};
use crate::cli::Workspace;
use crate::error::ReviewError;
use crate::session::FinalResult;

/// Commit command arguments
#[derive(Debug, Args)]
pub struct CommitArgs {
    /// Document path, relative to the workspace
    pub path: String,

    /// Reject whatever is still pending before committing
    #[arg(long)]
    pub reject_pending: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Run the commit command
pub fn run(args: CommitArgs, workspace: &Workspace) -> Result<()> {
    let mut registry = workspace.load_registry()?;

    if args.reject_pending {
        registry.decide_all(&args.path, false)?;
    }

    let result = match registry.commit(&args.path, &workspace.documents) {
        Ok(result) => result,
        Err(err @ ReviewError::Undecided { .. }) => {
            anyhow::bail!(
                "{}. Decide them with 'hunkwise accept'/'hunkwise reject' or pass --reject-pending.",
                err
            );
        }
        Err(err) => return Err(err.into()),
    };

    workspace.save_registry(&registry)?;
    println!("{}", format_final_result(&args.path, &result, args.format));

    if matches!(result, FinalResult::Integrity(_)) {
        std::process::exit(2);
    }

    Ok(())
}
