use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::chunk::ChunkId;
use crate::error::{Result, ReviewError};
use crate::session::review::{FinalResult, ReviewOptions, ReviewSession};
use crate::storage::{normalize_path, DocumentStore};

/// Current schema version of the persisted registry
const REGISTRY_VERSION: u8 = 1;

/// Live review sessions, at most one per document path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRegistry {
    /// Schema version
    pub version: u8,
    sessions: BTreeMap<String, ReviewSession>,
}

impl Default for ReviewRegistry {
    fn default() -> Self {
        Self {
            version: REGISTRY_VERSION,
            sessions: BTreeMap::new(),
        }
    }
}

impl ReviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `session`, discarding any uncommitted review of the same document
    pub fn insert(&mut self, session: ReviewSession) -> Option<ReviewSession> {
        let replaced = self
            .sessions
            .insert(session.document_path.clone(), session);
        if let Some(previous) = &replaced {
            let progress = previous.progress();
            tracing::warn!(
                path = %previous.document_path,
                session = %previous.session_id,
                decided = progress.decided(),
                total = progress.total,
                "discarding uncommitted review replaced by a new proposal"
            );
        }
        replaced
    }

    /// Open a review for `document_path`, replacing any existing one
    pub fn open(
        &mut self,
        document_path: &str,
        original_content: &str,
        target_content: &str,
        options: &ReviewOptions,
    ) -> Result<&ReviewSession> {
        let session =
            ReviewSession::open_with(document_path, original_content, target_content, options)?;
        let path = session.document_path.clone();
        self.insert(session);
        self.get_or_err(&path)
    }

    pub fn get(&self, document_path: &str) -> Option<&ReviewSession> {
        self.sessions.get(&key(document_path))
    }

    fn get_or_err(&self, document_path: &str) -> Result<&ReviewSession> {
        self.get(document_path).ok_or_else(|| ReviewError::NoSession {
            path: document_path.to_string(),
        })
    }

    pub fn sessions(&self) -> impl Iterator<Item = &ReviewSession> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Record a decision on one chunk of the review for `document_path`
    pub fn decide(
        &mut self,
        document_path: &str,
        chunk_id: ChunkId,
        accepted: bool,
    ) -> Result<&ReviewSession> {
        let next = self
            .get_or_err(document_path)?
            .try_decide(chunk_id, accepted)?;
        self.replace(next)
    }

    /// Accept or reject every pending chunk of the review for `document_path`
    pub fn decide_all(&mut self, document_path: &str, accepted: bool) -> Result<&ReviewSession> {
        let next = self.get_or_err(document_path)?.decide_all(accepted);
        self.replace(next)
    }

    fn replace(&mut self, session: ReviewSession) -> Result<&ReviewSession> {
        let path = session.document_path.clone();
        self.sessions.insert(path.clone(), session);
        self.get_or_err(&path)
    }

    /// Commit the review for `document_path`
    ///
    /// Written and discarded reviews are closed and removed. Integrity
    /// failures and storage errors leave the review in place.
    pub fn commit(
        &mut self,
        document_path: &str,
        documents: &dyn DocumentStore,
    ) -> Result<FinalResult> {
        let path_key = key(document_path);
        let session = self
            .sessions
            .get_mut(&path_key)
            .ok_or_else(|| ReviewError::NoSession {
                path: document_path.to_string(),
            })?;

        let result = session.commit(documents)?;
        if session.is_committed() {
            self.sessions.remove(&path_key);
        }
        Ok(result)
    }

    /// Drop the review for `document_path` without writing anything
    pub fn discard(&mut self, document_path: &str) -> Option<ReviewSession> {
        self.sessions.remove(&key(document_path))
    }

    /// Drop reviews older than `max_age_hours`, returning how many were removed
    pub fn prune_stale(&mut self, max_age_hours: i64) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|path, session| {
            let age = session.age_hours(now);
            if age > max_age_hours {
                tracing::warn!(
                    path = %path,
                    session = %session.session_id,
                    "dropping stale review ({} hours old)",
                    age
                );
                false
            } else {
                true
            }
        });
        before - self.sessions.len()
    }
}

/// Registry key for a caller-supplied path
///
/// Paths that fail to normalize are looked up verbatim and simply miss.
fn key(document_path: &str) -> String {
    normalize_path(document_path).unwrap_or_else(|_| document_path.to_string())
}
