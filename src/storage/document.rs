use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Host document store the review engine reads from and commits to
pub trait DocumentStore {
    fn read(&self, path: &str) -> io::Result<String>;
    fn write(&self, path: &str, content: &str) -> io::Result<()>;
    fn exists(&self, path: &str) -> bool;
}

/// Documents on the local filesystem, addressed relative to a workspace root
#[derive(Debug, Clone)]
pub struct FsDocumentStore {
    root: PathBuf,
}

impl FsDocumentStore {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a workspace-relative path, refusing anything that escapes the root
    pub fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        Ok(self.root.join(normalize_path(path)?))
    }
}

/// Canonical workspace-relative form of a document path
///
/// `./a.txt` and `a.txt` collapse to the same key, as do repeated separators.
/// Empty, absolute and `..` paths are rejected.
pub fn normalize_path(path: &str) -> io::Result<String> {
    let relative = Path::new(path);
    let mut parts: Vec<&str> = Vec::new();

    for component in relative.components() {
        match component {
            Component::CurDir => {}
            Component::Normal(part) => parts.push(part.to_str().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Document path is not valid UTF-8: '{}'", path),
                )
            })?),
            Component::ParentDir => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Path traversal detected in document path: '{}'", path),
                ));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!(
                        "Path '{}' is outside the workspace. Use a workspace-relative path.",
                        path
                    ),
                ));
            }
        }
    }

    if parts.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "empty document path"));
    }

    Ok(parts.join("/"))
}

impl DocumentStore for FsDocumentStore {
    fn read(&self, path: &str) -> io::Result<String> {
        fs::read_to_string(self.resolve(path)?)
    }

    fn write(&self, path: &str, content: &str) -> io::Result<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(target, content)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.is_file()).unwrap_or(false)
    }
}

/// In-memory document store, handy for embedding hosts and tests
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, path: &str, content: &str) -> Self {
        self.documents
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
        self
    }

    /// Current content of a document, if present
    pub fn get(&self, path: &str) -> Option<String> {
        self.documents.borrow().get(path).cloned()
    }

    /// Replace a document without counting it as a committed write
    pub fn set(&self, path: &str, content: &str) {
        self.documents
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
    }

    /// Number of successful writes so far
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Make subsequent writes fail, simulating a storage outage
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn read(&self, path: &str) -> io::Result<String> {
        self.get(path).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such document: {}", path))
        })
    }

    fn write(&self, path: &str, content: &str) -> io::Result<()> {
        if self.fail_writes.get() {
            return Err(io::Error::new(io::ErrorKind::Other, "storage unavailable"));
        }
        self.set(path, content);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn exists(&self, path: &str) -> bool {
        self.documents.borrow().contains_key(path)
    }
}
