//! Bookmark import/export service
//!
//! Orchestrates document access, the outline codecs and output naming.
//! Every operation validates its inputs and finishes all conversion work
//! before anything is written, so a failed run leaves no output file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, PathContextExt};
use crate::config::Settings;
use crate::domain::{
    serialize, DestinationResolver, DomainError, IndentParser, Outline, PageLookup, TreeBuilder,
};
use crate::infrastructure::pdf::PdfDocument;
use crate::infrastructure::traits::{FileSystem, PdfStore};
use crate::util::path::{derive_output_path, OutputKind};

/// Result of exporting an outline to a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub output: PathBuf,
    /// Number of bookmarks written
    pub entries: usize,
    /// Whether an existing file was replaced
    pub overwritten: bool,
}

/// Result of writing bookmarks into a new document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub output: PathBuf,
    /// Number of bookmarks added
    pub entries: usize,
}

/// Result of removing an outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveReport {
    pub output: PathBuf,
    /// Whether the input had an outline at all
    pub removed: bool,
}

/// Bookmark service.
pub struct BookmarkService {
    fs: Arc<dyn FileSystem>,
    store: Arc<dyn PdfStore>,
    settings: Arc<Settings>,
}

impl BookmarkService {
    /// Create a new bookmark service.
    pub fn new(fs: Arc<dyn FileSystem>, store: Arc<dyn PdfStore>, settings: Arc<Settings>) -> Self {
        Self {
            fs,
            store,
            settings,
        }
    }

    // ============================================================
    // Export
    // ============================================================

    /// Export the outline of `pdf` to `bookmark`, or to a derived `.txt` path.
    #[instrument(level = "debug", skip(self))]
    pub fn export(&self, pdf: &Path, bookmark: Option<&Path>) -> ApplicationResult<ExportReport> {
        let outline = self.resolved_outline(pdf)?;
        let text = serialize(&outline.entries()).map_err(|e| ApplicationError::in_document(pdf, e))?;

        let output = match bookmark {
            Some(path) => path.to_path_buf(),
            None => self.output_path(pdf, OutputKind::Text),
        };
        if self.same_file(&output, pdf) {
            return Err(DomainError::SourceOverwrite(output).into());
        }
        let overwritten = self.fs.exists(&output);
        self.fs
            .ensure_parent(&output)
            .with_path_context("create directory for", &output)?;
        self.fs
            .write(&output, &text)
            .with_path_context("write bookmark file", &output)?;

        info!("exported {} bookmarks to {}", outline.len(), output.display());
        Ok(ExportReport {
            output,
            entries: outline.len(),
            overwritten,
        })
    }

    /// The exported text of `pdf`, without writing a file.
    pub fn render(&self, pdf: &Path) -> ApplicationResult<String> {
        let outline = self.resolved_outline(pdf)?;
        serialize(&outline.entries()).map_err(|e| ApplicationError::in_document(pdf, e))
    }

    /// Tree view of the resolved outline of `pdf`.
    pub fn outline_tree(&self, pdf: &Path) -> ApplicationResult<Tree<String>> {
        let outline = self.resolved_outline(pdf)?;
        if outline.is_empty() {
            return Err(ApplicationError::in_document(pdf, DomainError::EmptyOutline));
        }
        let label = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| pdf.display().to_string());
        Ok(outline.to_tree(label))
    }

    /// Open `pdf` and resolve every outline item to a page index.
    fn resolved_outline(&self, pdf: &Path) -> ApplicationResult<Outline> {
        let doc = self.open(pdf)?;
        let items = doc.read_outline();
        if items.is_empty() {
            return Err(ApplicationError::in_document(pdf, DomainError::EmptyOutline));
        }
        let names = doc
            .named_destinations(self.settings.max_name_tree_depth)
            .map_err(|e| ApplicationError::in_document(pdf, e))?;
        debug!(
            "resolving {} top-level bookmarks against {} pages, {} names",
            items.len(),
            doc.page_count(),
            names.len()
        );
        DestinationResolver::new(&doc, &names)
            .resolve_outline(&items)
            .map_err(|e| ApplicationError::in_document(pdf, e))
    }

    // ============================================================
    // Import
    // ============================================================

    /// Add the bookmarks of `bookmark` to a copy of `pdf`, after any existing ones.
    #[instrument(level = "debug", skip(self))]
    pub fn import(
        &self,
        pdf: &Path,
        bookmark: &Path,
        offset: Option<i64>,
    ) -> ApplicationResult<ImportReport> {
        self.write_outline(pdf, bookmark, offset, false)
    }

    /// Replace the outline of a copy of `pdf` with the bookmarks of `bookmark`.
    #[instrument(level = "debug", skip(self))]
    pub fn reset(
        &self,
        pdf: &Path,
        bookmark: &Path,
        offset: Option<i64>,
    ) -> ApplicationResult<ImportReport> {
        self.write_outline(pdf, bookmark, offset, true)
    }

    fn write_outline(
        &self,
        pdf: &Path,
        bookmark: &Path,
        offset: Option<i64>,
        replace: bool,
    ) -> ApplicationResult<ImportReport> {
        let mut doc = self.open(pdf)?;
        self.require_file(bookmark)?;
        let text = self
            .fs
            .read_to_string(bookmark)
            .with_path_context("read bookmark file", bookmark)?;

        let offset = offset.unwrap_or(self.settings.default_offset);
        let parser = IndentParser::new(offset, doc.page_count());
        let outline = TreeBuilder::build_from_text(&text, &parser)
            .map_err(|e| ApplicationError::in_document(bookmark, e))?;
        debug!("parsed {} bookmarks with offset {}", outline.len(), offset);
        let depth = outline.depth();
        if depth > self.settings.max_outline_depth {
            return Err(ApplicationError::in_document(
                bookmark,
                DomainError::OutlineTooDeep {
                    depth,
                    max: self.settings.max_outline_depth,
                },
            ));
        }

        if replace {
            doc.clear_outline()
                .with_path_context("clear outline of", pdf)?;
        }
        let entries = doc
            .append_outline(&outline)
            .with_path_context("write outline into", pdf)?;

        let output = self.output_path(pdf, OutputKind::Pdf);
        self.save(&mut doc, &output)?;

        info!("imported {} bookmarks into {}", entries, output.display());
        Ok(ImportReport { output, entries })
    }

    // ============================================================
    // Remove
    // ============================================================

    /// Write a copy of `pdf` without an outline.
    #[instrument(level = "debug", skip(self))]
    pub fn remove(&self, pdf: &Path) -> ApplicationResult<RemoveReport> {
        let mut doc = self.open(pdf)?;
        let removed = doc
            .clear_outline()
            .with_path_context("clear outline of", pdf)?;

        let output = self.output_path(pdf, OutputKind::Pdf);
        self.save(&mut doc, &output)?;

        info!("removed outline, saved {}", output.display());
        Ok(RemoveReport { output, removed })
    }

    // ============================================================
    // Helpers
    // ============================================================

    fn require_file(&self, path: &Path) -> ApplicationResult<()> {
        if !self.fs.is_file(path) {
            return Err(DomainError::FileNotFound(path.to_path_buf()).into());
        }
        Ok(())
    }

    fn same_file(&self, a: &Path, b: &Path) -> bool {
        if a == b {
            return true;
        }
        match (self.fs.canonicalize(a), self.fs.canonicalize(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }

    fn open(&self, pdf: &Path) -> ApplicationResult<PdfDocument> {
        self.require_file(pdf)?;
        let doc = self.store.open(pdf).with_path_context("open document", pdf)?;
        Ok(PdfDocument::new(doc, self.settings.max_outline_depth))
    }

    fn save(&self, doc: &mut PdfDocument, output: &Path) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(output)
            .with_path_context("create directory for", output)?;
        self.store
            .save(doc.document_mut(), output)
            .with_path_context("save document", output)
    }

    fn output_path(&self, pdf: &Path, kind: OutputKind) -> PathBuf {
        derive_output_path(pdf, kind, &self.settings, Local::now())
    }
}
