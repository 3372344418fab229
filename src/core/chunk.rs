use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::diff::EditOp;

/// Default number of unchanged characters that separates two chunks
pub const DEFAULT_MIN_GAP_SIZE: usize = 50;

/// Identifier of a chunk, unique within one review session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkId(pub u32);

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ChunkId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(ChunkId)
    }
}

/// Half-open byte range `[from, to)` into a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub from: usize,
    pub to: usize,
}

impl TextRange {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }

    pub fn len(&self) -> usize {
        self.to.saturating_sub(self.from)
    }

    pub fn is_empty(&self) -> bool {
        self.to <= self.from
    }

    pub fn as_range(&self) -> Range<usize> {
        self.from..self.to
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// What a chunk does to the document, derived from its texts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Change,
    Insert,
    Delete,
}

impl fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChunkKind::Change => "change",
            ChunkKind::Insert => "insert",
            ChunkKind::Delete => "delete",
        };
        f.pad(label)
    }
}

/// Review status of a chunk. Accepted and rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ChunkStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ChunkStatus::Pending)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChunkStatus::Pending => "pending",
            ChunkStatus::Accepted => "accepted",
            ChunkStatus::Rejected => "rejected",
        };
        f.pad(label)
    }
}

/// A contiguous, independently reviewable unit of change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffChunk {
    pub id: ChunkId,
    /// Span replaced in the original content
    pub old_range: TextRange,
    /// Span produced in the target content
    pub new_range: TextRange,
    /// Literal text of `old_range` in the original
    pub old_text: String,
    /// Literal text of `new_range` in the target
    pub new_text: String,
    #[serde(default)]
    pub status: ChunkStatus,
}

impl DiffChunk {
    pub fn kind(&self) -> ChunkKind {
        match (self.old_text.is_empty(), self.new_text.is_empty()) {
            (true, _) => ChunkKind::Insert,
            (false, true) => ChunkKind::Delete,
            (false, false) => ChunkKind::Change,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status.is_pending()
    }

    /// Characters this chunk adds to the document
    pub fn chars_added(&self) -> usize {
        self.new_text.chars().count()
    }

    /// Characters this chunk removes from the document
    pub fn chars_removed(&self) -> usize {
        self.old_text.chars().count()
    }
}

/// Chunk being accumulated while walking the edit script
#[derive(Debug)]
struct OpenChunk {
    old_from: usize,
    new_from: usize,
    old_text: String,
    new_text: String,
    /// Short equal run seen since the last edit, folded in if another edit follows
    gap: String,
}

impl OpenChunk {
    fn new(old_from: usize, new_from: usize) -> Self {
        Self {
            old_from,
            new_from,
            old_text: String::new(),
            new_text: String::new(),
            gap: String::new(),
        }
    }

    fn absorb_gap(&mut self) {
        if !self.gap.is_empty() {
            self.old_text.push_str(&self.gap);
            self.new_text.push_str(&self.gap);
            self.gap.clear();
        }
    }
}

/// Groups elementary edit operations into review chunks
///
/// Owns the id counter for a review session, so chunks it produces never
/// share an id.
#[derive(Debug, Clone)]
pub struct ChunkGrouper {
    min_gap_size: usize,
    next_id: u32,
}

impl ChunkGrouper {
    pub fn new(min_gap_size: usize) -> Self {
        Self {
            min_gap_size,
            next_id: 1,
        }
    }

    pub fn min_gap_size(&self) -> usize {
        self.min_gap_size
    }

    /// Walk `ops` and emit chunks split on equal runs of at least `min_gap_size` characters
    pub fn group(&mut self, ops: &[EditOp]) -> Vec<DiffChunk> {
        let mut chunks = Vec::new();
        let mut open: Option<OpenChunk> = None;
        let mut old_pos = 0usize;
        let mut new_pos = 0usize;
        let mut unchanged_run = 0usize;

        for op in ops {
            if op.text().is_empty() {
                continue;
            }

            match op {
                EditOp::Equal(text) => {
                    unchanged_run += op.char_len();
                    if unchanged_run >= self.min_gap_size {
                        if let Some(chunk) = open.take() {
                            chunks.push(self.finalize(chunk));
                        }
                    } else if let Some(chunk) = open.as_mut() {
                        chunk.gap.push_str(text);
                    }
                    old_pos += text.len();
                    new_pos += text.len();
                }
                EditOp::Delete(text) => {
                    unchanged_run = 0;
                    let chunk = open.get_or_insert_with(|| OpenChunk::new(old_pos, new_pos));
                    chunk.absorb_gap();
                    chunk.old_text.push_str(text);
                    old_pos += text.len();
                }
                EditOp::Insert(text) => {
                    unchanged_run = 0;
                    let chunk = open.get_or_insert_with(|| OpenChunk::new(old_pos, new_pos));
                    chunk.absorb_gap();
                    chunk.new_text.push_str(text);
                    new_pos += text.len();
                }
            }
        }

        if let Some(chunk) = open {
            chunks.push(self.finalize(chunk));
        }

        chunks
    }

    fn finalize(&mut self, chunk: OpenChunk) -> DiffChunk {
        let id = ChunkId(self.next_id);
        self.next_id += 1;

        DiffChunk {
            id,
            old_range: TextRange::new(chunk.old_from, chunk.old_from + chunk.old_text.len()),
            new_range: TextRange::new(chunk.new_from, chunk.new_from + chunk.new_text.len()),
            old_text: chunk.old_text,
            new_text: chunk.new_text,
            status: ChunkStatus::Pending,
        }
    }
}

impl Default for ChunkGrouper {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_GAP_SIZE)
    }
}

/// Group `ops` into chunks with a fresh id counter
pub fn group(ops: &[EditOp], min_gap_size: usize) -> Vec<DiffChunk> {
    ChunkGrouper::new(min_gap_size).group(ops)
}
