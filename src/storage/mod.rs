pub mod document;
pub mod pending;

pub use document::{normalize_path, DocumentStore, FsDocumentStore, MemoryDocumentStore};
pub use pending::PendingStore;
