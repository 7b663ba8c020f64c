//! Domain-level errors (no I/O concerns)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent outline conversion failures.
/// Each one aborts the current top-level operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("page index out of range: {page} >= {page_count}")]
    PageOutOfRange { page: i64, page_count: usize },

    #[error("outline nesting {depth} exceeds the limit of {max} levels")]
    OutlineTooDeep { depth: usize, max: usize },

    #[error("refusing to overwrite the source document: {0}")]
    SourceOverwrite(PathBuf),

    #[error("malformed name tree: {0}")]
    MalformedNameTree(String),

    #[error("unexpected target kind for named destination {key:?}: {kind}")]
    UnexpectedTargetKind { key: String, kind: String },

    #[error("unresolved destination: {0:?}")]
    UnresolvedDestination(String),

    #[error("no destination for bookmark: {0:?}")]
    NoDestination(String),

    #[error("no bookmark is found")]
    EmptyOutline,
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
