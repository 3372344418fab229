pub mod commit;
pub mod decide;
pub mod diff;
pub mod output;
pub mod propose;
pub mod show;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;

use crate::config::HunkwiseConfig;
use crate::session::{ReviewOptions, ReviewRegistry};
use crate::storage::{FsDocumentStore, PendingStore};
use crate::utils::short_id;

/// Review agent-proposed edits chunk by chunk before they reach disk
#[derive(Debug, Parser)]
#[command(name = "hunkwise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Workspace root that document paths are relative to
    #[arg(long, short = 'C', global = true, default_value = ".")]
    pub workspace: PathBuf,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Print debug logging to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Open a review of proposed content for a document
    Propose(propose::ProposeArgs),

    /// Show the chunks of a review
    Show(show::ShowArgs),

    /// Accept one chunk
    Accept(decide::DecideArgs),

    /// Reject one chunk
    Reject(decide::DecideArgs),

    /// Accept every pending chunk
    AcceptAll(decide::PathArgs),

    /// Reject every pending chunk
    RejectAll(decide::PathArgs),

    /// Write the accepted chunks once every chunk is decided
    Commit(commit::CommitArgs),

    /// Drop a review without writing anything
    Discard(decide::PathArgs),

    /// List reviews in progress
    Status,

    /// Preview the chunks between two files without opening a review
    Diff(diff::DiffArgs),
}

/// Everything a command needs to work against one workspace
pub struct Workspace {
    pub root: PathBuf,
    pub config: HunkwiseConfig,
    pub pending: PendingStore,
    pub documents: FsDocumentStore,
}

impl Workspace {
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Workspace '{}' is not a directory", root.display());
        }

        let config = HunkwiseConfig::load_or_default(root);
        Ok(Self {
            root: root.to_path_buf(),
            config,
            pending: PendingStore::new(root),
            documents: FsDocumentStore::new(root),
        })
    }

    /// Live reviews, with stale ones dropped
    pub fn load_registry(&self) -> Result<ReviewRegistry> {
        self.pending
            .load_with_max_age(i64::from(self.config.review.max_session_age_hours))
            .context("Failed to load reviews in progress")
    }

    pub fn save_registry(&self, registry: &ReviewRegistry) -> Result<()> {
        self.pending
            .save(registry)
            .context("Failed to save reviews in progress")
    }

    pub fn review_options(&self) -> ReviewOptions {
        ReviewOptions::from(&self.config)
    }
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    crate::logging::init(cli.verbose);
    if cli.no_color || !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let workspace = Workspace::open(&cli.workspace)?;
    dispatch(cli.command, &workspace)
}

fn dispatch(command: Commands, workspace: &Workspace) -> Result<()> {
    match command {
        Commands::Propose(args) => propose::run(args, workspace),
        Commands::Show(args) => show::run(args, workspace),
        Commands::Accept(args) => decide::run_one(args, true, workspace),
        Commands::Reject(args) => decide::run_one(args, false, workspace),
        Commands::AcceptAll(args) => decide::run_all(args, true, workspace),
        Commands::RejectAll(args) => decide::run_all(args, false, workspace),
        Commands::Commit(args) => commit::run(args, workspace),
        Commands::Discard(args) => run_discard(args, workspace),
        Commands::Status => run_status(workspace),
        Commands::Diff(args) => diff::run(args, &workspace.config),
    }
}

fn run_discard(args: decide::PathArgs, workspace: &Workspace) -> Result<()> {
    let mut registry = workspace.load_registry()?;

    match registry.discard(&args.path) {
        Some(session) => {
            workspace.save_registry(&registry)?;
            tracing::info!(path = %session.document_path, "review discarded");
            println!(
                "Discarded review of {} ({} chunks, nothing written).",
                session.document_path,
                session.chunks().len()
            );
        }
        None => println!("No review in progress for {}.", args.path),
    }

    Ok(())
}

fn run_status(workspace: &Workspace) -> Result<()> {
    let registry = workspace.load_registry()?;

    if registry.is_empty() {
        println!("No reviews in progress.");
        return Ok(());
    }

    println!("{}", "Reviews in progress:".bold());
    for session in registry.sessions() {
        println!(
            "  {} {} {}",
            session.document_path.cyan(),
            short_id(&session.session_id).dimmed(),
            output::format_progress(&session.progress())
        );
    }

    println!("\nRun 'hunkwise commit <path>' once every chunk is decided.");

    Ok(())
}
