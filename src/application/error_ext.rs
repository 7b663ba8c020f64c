//! Error conversion helpers for file and document operations
//!
//! Provides an extension trait for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting I/O-like results to `ApplicationResult` with context.
pub trait PathContextExt<T> {
    /// Add path context to an error.
    ///
    /// # Example
    /// ```ignore
    /// fs.read_to_string(&bookmark)
    ///     .with_path_context("read bookmark file", &bookmark)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;
}

fn operation_failed(
    action: &str,
    path: &Path,
    source: impl std::error::Error + Send + Sync + 'static,
) -> ApplicationError {
    ApplicationError::OperationFailed {
        context: format!("{}: {}", action, path.display()),
        source: Box::new(source),
    }
}

impl<T> PathContextExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| operation_failed(action, path, e))
    }
}

impl<T> PathContextExt<T> for lopdf::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| operation_failed(action, path, e))
    }
}
