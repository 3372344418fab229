//! Error types for the review engine

use crate::core::chunk::{ChunkId, TextRange};

/// Common result type for the library
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Errors surfaced by review sessions and the document store
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// Caller passed arguments the engine cannot work with
    #[error("invalid review input: {0}")]
    Input(String),

    /// A decision referenced a chunk that is not part of the session
    #[error("chunk {id} does not exist in the review of {path}")]
    UnknownChunk {
        /// Document under review
        path: String,
        /// Requested chunk id
        id: ChunkId,
    },

    /// Commit attempted while chunks are still undecided
    #[error("{pending} chunk(s) in {path} are still pending a decision")]
    Undecided {
        /// Document under review
        path: String,
        /// Chunks still pending
        pending: usize,
    },

    /// Commit attempted on a session that already wrote its result
    #[error("review of {path} has already been committed")]
    AlreadyCommitted {
        /// Document under review
        path: String,
    },

    /// No live review exists for the document
    #[error("no review in progress for {path}")]
    NoSession {
        /// Requested document
        path: String,
    },

    /// Reading the document from storage failed
    #[error("failed to read {path}: {source}")]
    Read {
        /// Document path
        path: String,
        /// Source I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing the reconstructed document failed
    #[error("failed to write {path}: {source}")]
    Write {
        /// Document path
        path: String,
        /// Source I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Data-integrity violations found before reconstructing a document
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// Chunk range reaches past the end of the original content
    #[error("chunk {id} range {range} is outside the document (length {len})")]
    OutOfBounds {
        id: ChunkId,
        range: TextRange,
        len: usize,
    },

    /// Chunk range splits a multi-byte character
    #[error("chunk {id} range {range} does not fall on character boundaries")]
    NotCharBoundary { id: ChunkId, range: TextRange },

    /// Text under the chunk range differs from the chunk's recorded text
    #[error("chunk {id} no longer matches the document at {range}")]
    TextMismatch { id: ChunkId, range: TextRange },

    /// Two accepted chunks cover overlapping spans
    #[error("chunks {first} and {second} overlap")]
    Overlap { first: ChunkId, second: ChunkId },

    /// Document changed on disk since the review was opened
    #[error("{path} changed since the review was opened")]
    DocumentChanged { path: String },
}
