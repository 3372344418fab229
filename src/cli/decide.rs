use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::cli::output::{describe_chunk, format_progress};
use crate::cli::Workspace;
use crate::core::chunk::ChunkId;
use crate::error::ReviewError;
use crate::session::ReviewSession;

/// Arguments for commands that take only a document path
#[derive(Debug, Args)]
pub struct PathArgs {
    /// Document path, relative to the workspace
    pub path: String,
}

/// Accept/reject command arguments
#[derive(Debug, Args)]
pub struct DecideArgs {
    /// Document path, relative to the workspace
    pub path: String,

    /// Chunk ids as shown by 'hunkwise show' (e.g. 3 or #3)
    #[arg(required = true)]
    pub chunks: Vec<ChunkId>,
}

/// Decide individual chunks
pub fn run_one(args: DecideArgs, accepted: bool, workspace: &Workspace) -> Result<()> {
    let mut registry = workspace.load_registry()?;
    let verb = if accepted { "Accepted" } else { "Rejected" };

    for id in &args.chunks {
        let before = registry
            .get(&args.path)
            .and_then(|s| s.store().get(*id))
            .map(|c| c.status);

        match registry.decide(&args.path, *id, accepted) {
            Ok(session) => {
                let chunk = session.store().get(*id);
                match (before, chunk) {
                    (Some(previous), Some(_)) if previous.is_terminal() => println!(
                        "{} chunk #{} was already {}",
                        "Unchanged:".yellow(),
                        id,
                        previous
                    ),
                    (_, Some(chunk)) => {
                        println!("{} #{} {}", verb.bold(), id, describe_chunk(chunk))
                    }
                    _ => {}
                }
            }
            Err(err @ ReviewError::UnknownChunk { .. }) => {
                tracing::warn!("{}", err);
                println!("{} {}", "Skipped:".yellow(), err);
            }
            Err(err) => return Err(err.into()),
        }
    }

    workspace.save_registry(&registry)?;
    if let Some(session) = registry.get(&args.path) {
        print_footer(session);
    }

    Ok(())
}

/// Decide every pending chunk at once
pub fn run_all(args: PathArgs, accepted: bool, workspace: &Workspace) -> Result<()> {
    let mut registry = workspace.load_registry()?;
    let pending = registry
        .get(&args.path)
        .map(|s| s.store().pending_count())
        .unwrap_or(0);

    let session = registry.decide_all(&args.path, accepted)?;
    let verb = if accepted { "Accepted" } else { "Rejected" };
    println!("{} {} pending chunk(s) in {}", verb.bold(), pending, args.path);
    print_footer(session);

    workspace.save_registry(&registry)?;
    Ok(())
}

fn print_footer(session: &ReviewSession) {
    println!("{}", format_progress(&session.progress()));
    if session.is_done() {
        println!(
            "All chunks decided. Run 'hunkwise commit {}' to write the result.",
            session.document_path
        );
    }
}
