use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::output::{format_chunks, OutputFormat};
use crate::config::HunkwiseConfig;
use crate::core::chunk::group;
use crate::core::diff::diff_with;

/// Diff command arguments
#[derive(Debug, Args)]
pub struct DiffArgs {
    /// Original file
    pub old: PathBuf,

    /// Proposed file
    pub new: PathBuf,

    /// Override the configured gap size
    #[arg(long)]
    pub min_gap: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Run the diff command
pub fn run(args: DiffArgs, config: &HunkwiseConfig) -> Result<()> {
    let old = std::fs::read_to_string(&args.old)
        .with_context(|| format!("Failed to read {}", args.old.display()))?;
    let new = std::fs::read_to_string(&args.new)
        .with_context(|| format!("Failed to read {}", args.new.display()))?;

    let min_gap = args.min_gap.unwrap_or(config.review.min_gap_size);
    let ops = diff_with(&old, &new, &config.diff.options());
    let chunks = group(&ops, min_gap);

    print!("{}", format_chunks(&chunks, args.format));
    if args.format == OutputFormat::Json {
        println!();
    }

    Ok(())
}
