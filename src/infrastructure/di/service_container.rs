//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::BookmarkService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, LopdfStore, PdfStore, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Document store abstraction
    pub store: Arc<dyn PdfStore>,

    pub bookmarks: BookmarkService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(LopdfStore))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn PdfStore>,
    ) -> Self {
        let settings = Arc::new(settings);
        let bookmarks = BookmarkService::new(fs.clone(), store.clone(), settings.clone());

        Self {
            settings,
            fs,
            store,
            bookmarks,
        }
    }
}
