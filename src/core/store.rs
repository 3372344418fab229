use serde::{Deserialize, Serialize};

use crate::core::chunk::{ChunkId, ChunkStatus, DiffChunk};

/// A reviewer's accept/reject choice for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub chunk_id: ChunkId,
    pub accepted: bool,
}

impl Decision {
    pub fn accept(chunk_id: ChunkId) -> Self {
        Self {
            chunk_id,
            accepted: true,
        }
    }

    pub fn reject(chunk_id: ChunkId) -> Self {
        Self {
            chunk_id,
            accepted: false,
        }
    }
}

/// Commands understood by [`ChunkStore::reduce`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Accept(ChunkId),
    Reject(ChunkId),
    AcceptAllPending,
    RejectAllPending,
}

/// Review progress counters, as shown in a header widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReviewProgress {
    pub total: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub pending: usize,
}

impl ReviewProgress {
    pub fn decided(&self) -> usize {
        self.accepted + self.rejected
    }
}

/// Chunk list plus per-chunk status
///
/// Every transition is pure: it borrows the current state and returns the
/// next one. Commands that name an unknown chunk, or a chunk that was already
/// decided, return a state equal to the input.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkStore {
    chunks: Vec<DiffChunk>,
}

impl ChunkStore {
    pub fn new(chunks: Vec<DiffChunk>) -> Self {
        Self { chunks }
    }

    pub fn chunks(&self) -> &[DiffChunk] {
        &self.chunks
    }

    pub fn get(&self, id: ChunkId) -> Option<&DiffChunk> {
        self.chunks.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.get(id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Apply one command and return the resulting state
    pub fn reduce(&self, command: &Command) -> ChunkStore {
        let mut next = self.clone();
        match *command {
            Command::Accept(id) => next.settle_one(id, ChunkStatus::Accepted),
            Command::Reject(id) => next.settle_one(id, ChunkStatus::Rejected),
            Command::AcceptAllPending => next.settle_pending(ChunkStatus::Accepted),
            Command::RejectAllPending => next.settle_pending(ChunkStatus::Rejected),
        }
        next
    }

    pub fn accept_chunk(&self, id: ChunkId) -> ChunkStore {
        self.reduce(&Command::Accept(id))
    }

    pub fn reject_chunk(&self, id: ChunkId) -> ChunkStore {
        self.reduce(&Command::Reject(id))
    }

    pub fn accept_all_pending(&self) -> ChunkStore {
        self.reduce(&Command::AcceptAllPending)
    }

    pub fn reject_all_pending(&self) -> ChunkStore {
        self.reduce(&Command::RejectAllPending)
    }

    fn settle_one(&mut self, id: ChunkId, status: ChunkStatus) {
        if let Some(chunk) = self.chunks.iter_mut().find(|c| c.id == id) {
            if chunk.status.is_pending() {
                chunk.status = status;
            }
        }
    }

    fn settle_pending(&mut self, status: ChunkStatus) {
        for chunk in self.chunks.iter_mut().filter(|c| c.status.is_pending()) {
            chunk.status = status;
        }
    }

    pub fn pending_count(&self) -> usize {
        self.count(ChunkStatus::Pending)
    }

    pub fn accepted_count(&self) -> usize {
        self.count(ChunkStatus::Accepted)
    }

    pub fn rejected_count(&self) -> usize {
        self.count(ChunkStatus::Rejected)
    }

    fn count(&self, status: ChunkStatus) -> usize {
        self.chunks.iter().filter(|c| c.status == status).count()
    }

    /// True when no chunk is pending; vacuously true for an empty store
    pub fn is_fully_processed(&self) -> bool {
        self.chunks.iter().all(|c| c.status.is_terminal())
    }

    /// Accepted chunks in original order
    pub fn accepted_chunks(&self) -> Vec<&DiffChunk> {
        self.chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Accepted)
            .collect()
    }

    /// Decisions recorded so far, one per decided chunk
    pub fn decisions(&self) -> Vec<Decision> {
        self.chunks
            .iter()
            .filter_map(|c| match c.status {
                ChunkStatus::Accepted => Some(Decision::accept(c.id)),
                ChunkStatus::Rejected => Some(Decision::reject(c.id)),
                ChunkStatus::Pending => None,
            })
            .collect()
    }

    /// Next pending chunk after `after` in document order, wrapping around
    pub fn next_pending(&self, after: Option<ChunkId>) -> Option<&DiffChunk> {
        let start = after
            .and_then(|id| self.chunks.iter().position(|c| c.id == id))
            .map_or(0, |index| index + 1);

        self.chunks[start.min(self.chunks.len())..]
            .iter()
            .chain(self.chunks.iter())
            .find(|c| c.is_pending())
    }

    pub fn progress(&self) -> ReviewProgress {
        ReviewProgress {
            total: self.chunks.len(),
            accepted: self.accepted_count(),
            rejected: self.rejected_count(),
            pending: self.pending_count(),
        }
    }
}
