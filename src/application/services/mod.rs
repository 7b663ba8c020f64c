//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, PdfStore)
//! but are themselves concrete structs, not traits.

mod bookmark;

pub use bookmark::{BookmarkService, ExportReport, ImportReport, RemoveReport};
