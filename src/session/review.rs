use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::HunkwiseConfig;
use crate::core::chunk::{ChunkGrouper, ChunkId, DiffChunk, DEFAULT_MIN_GAP_SIZE};
use crate::core::diff::{diff_with, DiffOptions};
use crate::core::reconstruct;
use crate::core::store::{ChunkStore, Command, ReviewProgress};
use crate::error::{IntegrityError, Result, ReviewError};
use crate::storage::{normalize_path, DocumentStore};
use crate::utils::content_hash;

/// Knobs used when opening a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOptions {
    pub min_gap_size: usize,
    pub diff: DiffOptions,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            min_gap_size: DEFAULT_MIN_GAP_SIZE,
            diff: DiffOptions::default(),
        }
    }
}

impl From<&HunkwiseConfig> for ReviewOptions {
    fn from(config: &HunkwiseConfig) -> Self {
        Self {
            min_gap_size: config.review.min_gap_size,
            diff: config.diff.options(),
        }
    }
}

impl ReviewOptions {
    pub fn with_min_gap_size(mut self, min_gap_size: usize) -> Self {
        self.min_gap_size = min_gap_size;
        self
    }
}

/// Outcome of committing a fully reviewed session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalResult {
    /// Accepted chunks were applied and the document was written
    Written(String),
    /// Nothing was accepted; the document was left alone
    Discarded,
    /// Chunks no longer line up with the document; nothing was written
    Integrity(IntegrityError),
}

/// A proposed edit to one document, under review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSession {
    /// Unique session identifier (UUID)
    pub session_id: String,
    /// Workspace-relative path of the document
    pub document_path: String,
    /// Document content the chunks were computed against
    pub original_content: String,
    /// Content proposed by the agent
    pub target_content: String,
    /// Hash of `original_content`, compared against storage at commit time
    pub original_hash: String,
    /// When the review was opened (RFC 3339)
    pub created_at: String,
    /// Gap threshold the chunks were grouped with
    pub min_gap_size: usize,
    store: ChunkStore,
    #[serde(default)]
    committed: bool,
}

impl ReviewSession {
    /// Open a review with default options, optionally overriding the gap size
    pub fn open(
        document_path: &str,
        original_content: &str,
        target_content: &str,
        min_gap_size: Option<usize>,
    ) -> Result<Self> {
        let mut options = ReviewOptions::default();
        if let Some(gap) = min_gap_size {
            options = options.with_min_gap_size(gap);
        }
        Self::open_with(document_path, original_content, target_content, &options)
    }

    /// Diff the two contents and group the result into pending chunks
    pub fn open_with(
        document_path: &str,
        original_content: &str,
        target_content: &str,
        options: &ReviewOptions,
    ) -> Result<Self> {
        if document_path.trim().is_empty() {
            return Err(ReviewError::Input("document path is empty".to_string()));
        }
        let document_path =
            normalize_path(document_path).map_err(|e| ReviewError::Input(e.to_string()))?;

        let ops = diff_with(original_content, target_content, &options.diff);
        let chunks = ChunkGrouper::new(options.min_gap_size).group(&ops);

        let session = Self {
            session_id: Uuid::new_v4().to_string(),
            document_path,
            original_content: original_content.to_string(),
            target_content: target_content.to_string(),
            original_hash: content_hash(original_content),
            created_at: Utc::now().to_rfc3339(),
            min_gap_size: options.min_gap_size,
            store: ChunkStore::new(chunks),
            committed: false,
        };

        tracing::debug!(
            path = %session.document_path,
            session = %session.session_id,
            ops = ops.len(),
            chunks = session.store.len(),
            "opened review"
        );

        Ok(session)
    }

    pub fn chunks(&self) -> &[DiffChunk] {
        self.store.chunks()
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn progress(&self) -> ReviewProgress {
        self.store.progress()
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// True once every chunk is decided
    pub fn is_done(&self) -> bool {
        self.store.is_fully_processed()
    }

    /// Run one reducer command against the chunk state
    pub fn apply_command(&self, command: &Command) -> Self {
        let next_store = self.store.reduce(command);
        if next_store == self.store {
            tracing::debug!(
                path = %self.document_path,
                ?command,
                "decision left review unchanged"
            );
        }
        Self {
            store: next_store,
            ..self.clone()
        }
    }

    /// Accept or reject one chunk; unknown or decided chunks are a no-op
    pub fn decide(&self, chunk_id: ChunkId, accepted: bool) -> Self {
        let command = if accepted {
            Command::Accept(chunk_id)
        } else {
            Command::Reject(chunk_id)
        };
        self.apply_command(&command)
    }

    /// Like [`decide`](Self::decide), but reports ids that are not in this session
    pub fn try_decide(&self, chunk_id: ChunkId, accepted: bool) -> Result<Self> {
        if !self.store.contains(chunk_id) {
            return Err(ReviewError::UnknownChunk {
                path: self.document_path.clone(),
                id: chunk_id,
            });
        }
        Ok(self.decide(chunk_id, accepted))
    }

    /// Accept or reject every chunk that is still pending
    pub fn decide_all(&self, accepted: bool) -> Self {
        let command = if accepted {
            Command::AcceptAllPending
        } else {
            Command::RejectAllPending
        };
        self.apply_command(&command)
    }

    /// Hours since the review was opened; unparseable timestamps count as stale
    pub fn age_hours(&self, now: DateTime<Utc>) -> i64 {
        match DateTime::parse_from_rfc3339(&self.created_at) {
            Ok(created) => (now - created.with_timezone(&Utc)).num_hours(),
            Err(_) => i64::MAX,
        }
    }

    /// Reconstruct the document from accepted chunks and write it once
    ///
    /// Refuses to run while chunks are pending or after a previous commit.
    /// Integrity problems are reported as [`FinalResult::Integrity`] and leave
    /// the session open so the host can re-diff against the current document.
    pub fn commit(&mut self, documents: &dyn DocumentStore) -> Result<FinalResult> {
        if self.committed {
            return Err(ReviewError::AlreadyCommitted {
                path: self.document_path.clone(),
            });
        }

        let pending = self.store.pending_count();
        if pending > 0 {
            return Err(ReviewError::Undecided {
                path: self.document_path.clone(),
                pending,
            });
        }

        if self.store.accepted_count() == 0 {
            self.committed = true;
            tracing::info!(path = %self.document_path, "review discarded, no chunks accepted");
            return Ok(FinalResult::Discarded);
        }

        if let Some(violation) = self.check_document(documents)? {
            tracing::warn!(path = %self.document_path, "{}", violation);
            return Ok(FinalResult::Integrity(violation));
        }

        let content = match reconstruct::apply(
            &self.original_content,
            self.store.chunks(),
            &self.store.decisions(),
        ) {
            Ok(content) => content,
            Err(violation) => {
                tracing::warn!(path = %self.document_path, "{}", violation);
                return Ok(FinalResult::Integrity(violation));
            }
        };

        documents
            .write(&self.document_path, &content)
            .map_err(|source| ReviewError::Write {
                path: self.document_path.clone(),
                source,
            })?;

        self.committed = true;
        tracing::info!(
            path = %self.document_path,
            accepted = self.store.accepted_count(),
            rejected = self.store.rejected_count(),
            "review committed"
        );

        Ok(FinalResult::Written(content))
    }

    /// Compare the stored document against the content the chunks were built from
    fn check_document(&self, documents: &dyn DocumentStore) -> Result<Option<IntegrityError>> {
        let current_hash = if documents.exists(&self.document_path) {
            let current =
                documents
                    .read(&self.document_path)
                    .map_err(|source| ReviewError::Read {
                        path: self.document_path.clone(),
                        source,
                    })?;
            content_hash(&current)
        } else {
            content_hash("")
        };

        if current_hash == self.original_hash {
            Ok(None)
        } else {
            Ok(Some(IntegrityError::DocumentChanged {
                path: self.document_path.clone(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chunk::ChunkStatus;
    use crate::storage::MemoryDocumentStore;

    const OLD: &str = "Hello world. Goodbye world.";
    const NEW: &str = "Hello universe. Goodbye universe.";

    fn session() -> ReviewSession {
        ReviewSession::open("greeting.txt", OLD, NEW, Some(5)).unwrap()
    }

    #[test]
    fn test_open_rejects_empty_path() {
        let err = ReviewSession::open("  ", OLD, NEW, None).unwrap_err();
        assert!(matches!(err, ReviewError::Input(_)));
    }

    #[test]
    fn test_open_normalizes_path() {
        let session = ReviewSession::open("./docs//guide.md", OLD, NEW, None).unwrap();
        assert_eq!(session.document_path, "docs/guide.md");

        let err = ReviewSession::open("docs/../../guide.md", OLD, NEW, None).unwrap_err();
        assert!(matches!(err, ReviewError::Input(_)));
    }

    #[test]
    fn test_open_builds_pending_chunks() {
        let session = session();
        assert_eq!(session.chunks().len(), 2);
        assert!(session.chunks().iter().all(|c| c.status == ChunkStatus::Pending));
        assert_eq!(session.original_hash, content_hash(OLD));
        assert_eq!(session.min_gap_size, 5);
        assert!(!session.is_done());
    }

    #[test]
    fn test_decide_is_pure() {
        let session = session();
        let next = session.decide(ChunkId(1), true);
        assert_eq!(session.progress().pending, 2);
        assert_eq!(next.progress().accepted, 1);
        assert_eq!(next.session_id, session.session_id);
    }

    #[test]
    fn test_try_decide_unknown_chunk() {
        let err = session().try_decide(ChunkId(42), true).unwrap_err();
        assert!(matches!(err, ReviewError::UnknownChunk { id: ChunkId(42), .. }));
    }

    #[test]
    fn test_commit_partial() {
        let documents = MemoryDocumentStore::new().with_document("greeting.txt", OLD);
        let mut session = session().decide(ChunkId(1), true).decide(ChunkId(2), false);

        let result = session.commit(&documents).unwrap();
        assert_eq!(
            result,
            FinalResult::Written("Hello universe. Goodbye world.".to_string())
        );
        assert_eq!(
            documents.get("greeting.txt").as_deref(),
            Some("Hello universe. Goodbye world.")
        );
        assert_eq!(documents.write_count(), 1);
        assert!(session.is_committed());

        // One-shot: a second commit never writes again
        assert!(matches!(
            session.commit(&documents),
            Err(ReviewError::AlreadyCommitted { .. })
        ));
        assert_eq!(documents.write_count(), 1);
    }

    #[test]
    fn test_commit_requires_all_decided() {
        let documents = MemoryDocumentStore::new().with_document("greeting.txt", OLD);
        let mut session = session().decide(ChunkId(1), true);

        let err = session.commit(&documents).unwrap_err();
        assert!(matches!(err, ReviewError::Undecided { pending: 1, .. }));
        assert_eq!(documents.write_count(), 0);
    }

    #[test]
    fn test_commit_nothing_accepted_discards() {
        let documents = MemoryDocumentStore::new().with_document("greeting.txt", OLD);
        let mut session = session().decide_all(false);

        assert_eq!(session.commit(&documents).unwrap(), FinalResult::Discarded);
        assert_eq!(documents.write_count(), 0);
        assert!(session.is_committed());
    }

    #[test]
    fn test_commit_no_op_review() {
        let documents = MemoryDocumentStore::new().with_document("same.txt", OLD);
        let mut session = ReviewSession::open("same.txt", OLD, OLD, None).unwrap();

        assert!(session.is_done());
        assert_eq!(session.commit(&documents).unwrap(), FinalResult::Discarded);
        assert_eq!(documents.write_count(), 0);
    }

    #[test]
    fn test_commit_detects_changed_document() {
        let documents = MemoryDocumentStore::new().with_document("greeting.txt", OLD);
        let mut session = session().decide_all(true);
        documents.set("greeting.txt", "Someone else edited this.");

        let result = session.commit(&documents).unwrap();
        assert!(matches!(
            result,
            FinalResult::Integrity(IntegrityError::DocumentChanged { .. })
        ));
        assert_eq!(documents.write_count(), 0);
        assert!(!session.is_committed());
    }

    #[test]
    fn test_commit_new_document() {
        let documents = MemoryDocumentStore::new();
        let mut session = ReviewSession::open("new.txt", "", "fresh\n", None)
            .unwrap()
            .decide_all(true);

        assert_eq!(
            session.commit(&documents).unwrap(),
            FinalResult::Written("fresh\n".to_string())
        );
        assert_eq!(documents.get("new.txt").as_deref(), Some("fresh\n"));
    }

    #[test]
    fn test_write_failure_keeps_session_open() {
        let documents = MemoryDocumentStore::new().with_document("greeting.txt", OLD);
        documents.fail_writes(true);
        let mut session = session().decide_all(true);

        let err = session.commit(&documents).unwrap_err();
        assert!(matches!(err, ReviewError::Write { .. }));
        assert!(!session.is_committed());

        documents.fail_writes(false);
        assert_eq!(
            session.commit(&documents).unwrap(),
            FinalResult::Written(NEW.to_string())
        );
    }

    #[test]
    fn test_age_hours() {
        let mut session = session();
        let now = Utc::now();
        assert_eq!(session.age_hours(now), 0);

        session.created_at = (now - chrono::Duration::hours(30)).to_rfc3339();
        assert_eq!(session.age_hours(now), 30);

        session.created_at = "not a timestamp".to_string();
        assert_eq!(session.age_hours(now), i64::MAX);
    }
}
