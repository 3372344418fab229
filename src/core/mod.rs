pub mod chunk;
pub mod diff;
pub mod reconstruct;
pub mod store;

pub use chunk::{
    group, ChunkGrouper, ChunkId, ChunkKind, ChunkStatus, DiffChunk, TextRange,
    DEFAULT_MIN_GAP_SIZE,
};
pub use diff::{diff, diff_with, DiffOptions, EditOp};
pub use reconstruct::apply;
pub use store::{ChunkStore, Command, Decision, ReviewProgress};
