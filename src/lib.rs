//! Chunk-based review of proposed document edits.
//!
//! An agent proposes new content for a document; [`crate::core::diff`] computes a
//! character-level edit script, [`crate::core::chunk`] groups it into reviewable
//! chunks, [`crate::core::store`] tracks accept/reject decisions, and
//! [`crate::core::reconstruct`] rebuilds the final text from the accepted chunks.
//! [`session`] ties these together for a host, and [`storage`] provides the
//! document and live-review persistence the CLI uses.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;
pub mod utils;

pub use crate::core::{
    apply, diff, group, ChunkId, ChunkKind, ChunkStatus, ChunkStore, Decision, DiffChunk, EditOp,
    TextRange,
};
pub use error::{IntegrityError, Result, ReviewError};
pub use session::{FinalResult, ReviewOptions, ReviewRegistry, ReviewSession};
pub use storage::{DocumentStore, FsDocumentStore, MemoryDocumentStore};
