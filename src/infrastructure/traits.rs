//! I/O boundary traits for testability
//!
//! These traits abstract file and document access, allowing services
//! to be tested with substitute implementations.

use std::io;
use std::path::{Path, PathBuf};

use lopdf::Document;
use tracing::debug;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Resolve to an absolute path without symlinks.
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;
}

/// Document store: loads and saves PDF files.
pub trait PdfStore: Send + Sync {
    /// Load and parse the document at `path`.
    fn open(&self, path: &Path) -> lopdf::Result<Document>;

    /// Serialize `doc` to `path`, replacing any existing file.
    fn save(&self, doc: &mut Document, path: &Path) -> lopdf::Result<()>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        std::fs::canonicalize(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                self.create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// lopdf-backed document store.
#[derive(Debug, Default)]
pub struct LopdfStore;

impl PdfStore for LopdfStore {
    fn open(&self, path: &Path) -> lopdf::Result<Document> {
        debug!("loading {}", path.display());
        Document::load(path)
    }

    fn save(&self, doc: &mut Document, path: &Path) -> lopdf::Result<()> {
        debug!("saving {}", path.display());
        doc.save(path)?;
        Ok(())
    }
}
