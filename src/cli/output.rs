use clap::ValueEnum;
use colored::Colorize;

use crate::core::chunk::{ChunkKind, ChunkStatus, DiffChunk};
use crate::core::store::ReviewProgress;
use crate::session::{FinalResult, ReviewSession};
use crate::utils::{preview, short_id, CHUNK_PREVIEW_LEN};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal output with colors
    #[default]
    Pretty,
    /// JSON output for machine consumption
    Json,
}

/// Format a full review for display
pub fn format_session(session: &ReviewSession, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => format_session_pretty(session),
        OutputFormat::Json => format_session_json(session),
    }
}

/// Format a bare chunk list (no session) for display
pub fn format_chunks(chunks: &[DiffChunk], format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => {
            if chunks.is_empty() {
                return "No changes.\n".to_string();
            }
            let mut output = String::new();
            for chunk in chunks {
                output.push_str(&format_chunk_pretty(chunk));
            }
            output
        }
        OutputFormat::Json => {
            let chunks: Vec<serde_json::Value> = chunks.iter().map(chunk_json).collect();
            serde_json::to_string_pretty(&serde_json::json!({ "chunks": chunks }))
                .unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn format_session_pretty(session: &ReviewSession) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} {} {}\n",
        "Review of".bold(),
        session.document_path.cyan(),
        format!("(session {})", short_id(&session.session_id)).dimmed()
    ));
    output.push_str(&format!("{}\n", format_progress(&session.progress())));
    output.push_str(&format!("{}\n", "─".repeat(60).dimmed()));

    if session.chunks().is_empty() {
        output.push_str("No changes proposed.\n");
        return output;
    }

    for chunk in session.chunks() {
        output.push_str(&format_chunk_pretty(chunk));
    }

    output
}

fn format_chunk_pretty(chunk: &DiffChunk) -> String {
    let mut output = String::new();

    let kind = match chunk.kind() {
        ChunkKind::Change => "change".yellow(),
        ChunkKind::Insert => "insert".green(),
        ChunkKind::Delete => "delete".red(),
    };
    let status = match chunk.status {
        ChunkStatus::Pending => "pending".bold(),
        ChunkStatus::Accepted => "accepted".green().bold(),
        ChunkStatus::Rejected => "rejected".red().bold(),
    };

    output.push_str(&format!(
        " {} {:<6} {:<8} {} {}\n",
        format!("#{:<3}", chunk.id).bold(),
        kind,
        status,
        format!("+{} -{}", chunk.chars_added(), chunk.chars_removed()).dimmed(),
        format!("{} → {}", chunk.old_range, chunk.new_range).dimmed()
    ));

    if !chunk.old_text.is_empty() {
        for line in chunk.old_text.split_inclusive('\n') {
            output.push_str(&format!("   {} {}\n", "-".red(), visible_line(line).red()));
        }
    }
    if !chunk.new_text.is_empty() {
        for line in chunk.new_text.split_inclusive('\n') {
            output.push_str(&format!("   {} {}\n", "+".green(), visible_line(line).green()));
        }
    }

    output
}

/// Render one line of chunk text, marking the trailing newline if present
fn visible_line(line: &str) -> String {
    match line.strip_suffix('\n') {
        Some(body) => format!("{}⏎", body.trim_end_matches('\r')),
        None => line.to_string(),
    }
}

/// One-line progress summary, as shown in a review header
pub fn format_progress(progress: &ReviewProgress) -> String {
    format!(
        "{}/{} decided ({} accepted, {} rejected, {} pending)",
        progress.decided(),
        progress.total,
        progress.accepted.to_string().green(),
        progress.rejected.to_string().red(),
        progress.pending.to_string().yellow()
    )
}

/// Short one-line description of a chunk for confirmations
pub fn describe_chunk(chunk: &DiffChunk) -> String {
    match chunk.kind() {
        ChunkKind::Change => format!(
            "\"{}\" → \"{}\"",
            preview(&chunk.old_text, CHUNK_PREVIEW_LEN),
            preview(&chunk.new_text, CHUNK_PREVIEW_LEN)
        ),
        ChunkKind::Insert => format!("insert \"{}\"", preview(&chunk.new_text, CHUNK_PREVIEW_LEN)),
        ChunkKind::Delete => format!("delete \"{}\"", preview(&chunk.old_text, CHUNK_PREVIEW_LEN)),
    }
}

/// Describe the outcome of a commit
pub fn format_final_result(path: &str, result: &FinalResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => match result {
            FinalResult::Written(content) => format!(
                "{} {} ({} bytes)",
                "Wrote".green().bold(),
                path,
                content.len()
            ),
            FinalResult::Discarded => format!(
                "{} no chunks accepted, {} left unchanged",
                "Discarded:".yellow().bold(),
                path
            ),
            FinalResult::Integrity(err) => format!(
                "{} {}\nThe review is still open; propose the edit again to re-diff against the current file.",
                "Integrity error:".red().bold(),
                err
            ),
        },
        OutputFormat::Json => {
            let value = match result {
                FinalResult::Written(content) => serde_json::json!({
                    "path": path,
                    "result": "written",
                    "bytes": content.len(),
                }),
                FinalResult::Discarded => serde_json::json!({
                    "path": path,
                    "result": "discarded",
                }),
                FinalResult::Integrity(err) => serde_json::json!({
                    "path": path,
                    "result": "integrity_error",
                    "error": err.to_string(),
                }),
            };
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn chunk_json(chunk: &DiffChunk) -> serde_json::Value {
    serde_json::json!({
        "id": chunk.id,
        "kind": chunk.kind(),
        "status": chunk.status,
        "old_range": chunk.old_range,
        "new_range": chunk.new_range,
        "old_text": chunk.old_text,
        "new_text": chunk.new_text,
    })
}

fn format_session_json(session: &ReviewSession) -> String {
    let chunks: Vec<serde_json::Value> = session.chunks().iter().map(chunk_json).collect();

    serde_json::to_string_pretty(&serde_json::json!({
        "path": session.document_path,
        "session_id": session.session_id,
        "created_at": session.created_at,
        "min_gap_size": session.min_gap_size,
        "done": session.is_done(),
        "progress": session.progress(),
        "chunks": chunks,
    }))
    .unwrap_or_else(|_| "{}".to_string())
}
