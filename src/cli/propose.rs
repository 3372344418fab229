use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::cli::output::{format_session, OutputFormat};
use crate::cli::Workspace;
use crate::storage::DocumentStore;

/// Propose command arguments
#[derive(Debug, Args)]
pub struct ProposeArgs {
    /// Document path, relative to the workspace (optional with --json)
    pub path: Option<String>,

    /// Read the proposed content from this file
    #[arg(long, conflicts_with = "stdin")]
    pub new_file: Option<PathBuf>,

    /// Read the proposed content from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Treat stdin as a JSON proposal: {"file_path": ..., "new_content": ...}
    #[arg(long, requires = "stdin")]
    pub json: bool,

    /// Override the configured gap size for this review
    #[arg(long)]
    pub min_gap: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,
}

/// Edit proposal as sent by an agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proposal {
    /// Document the edit targets
    pub file_path: String,
    /// Full proposed content of the document
    pub new_content: String,
}

impl Proposal {
    pub fn from_json(input: &str) -> Result<Self> {
        let proposal: Self =
            serde_json::from_str(input).context("Failed to parse proposal JSON from stdin")?;
        if proposal.file_path.trim().is_empty() {
            bail!("Proposal has an empty file_path");
        }
        Ok(proposal)
    }
}

/// Run the propose command
pub fn run(args: ProposeArgs, workspace: &Workspace) -> Result<()> {
    let proposal = read_proposal(&args)?;
    let path = proposal.file_path.as_str();

    let original = if workspace.documents.exists(path) {
        workspace
            .documents
            .read(path)
            .with_context(|| format!("Failed to read {}", path))?
    } else {
        // Resolving up front rejects paths outside the workspace
        workspace.documents.resolve(path)?;
        String::new()
    };

    let mut options = workspace.review_options();
    if let Some(gap) = args.min_gap {
        options = options.with_min_gap_size(gap);
    }

    let mut registry = workspace.load_registry()?;
    let session = registry.open(path, &original, &proposal.new_content, &options)?;
    let rendered = format_session(session, args.format);
    let no_changes = session.chunks().is_empty();

    if no_changes {
        // Nothing to review, so nothing to keep around
        registry.discard(path);
    }
    workspace.save_registry(&registry)?;

    println!("{}", rendered);
    if no_changes && args.format == OutputFormat::Pretty {
        println!("Proposed content is identical to {}; no review opened.", path);
    }

    Ok(())
}

fn read_proposal(args: &ProposeArgs) -> Result<Proposal> {
    if args.json {
        let proposal = Proposal::from_json(&read_stdin()?)?;
        if let Some(path) = &args.path {
            if path != &proposal.file_path {
                bail!(
                    "Path argument '{}' does not match proposal file_path '{}'",
                    path,
                    proposal.file_path
                );
            }
        }
        return Ok(proposal);
    }

    let Some(path) = args.path.clone() else {
        bail!("A document path is required unless --json is used");
    };

    let new_content = if let Some(file) = &args.new_file {
        std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read proposed content from {}", file.display()))?
    } else if args.stdin {
        read_stdin()?
    } else {
        bail!("Provide the proposed content with --new-file <FILE> or --stdin");
    };

    Ok(Proposal {
        file_path: path,
        new_content,
    })
}

fn read_stdin() -> Result<String> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("Failed to read from stdin")?;
    Ok(input)
}
