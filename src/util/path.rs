use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{Naming, Settings};

/// Kind of file derived from an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// A rewritten document
    Pdf,
    /// An exported bookmark file
    Text,
}

impl OutputKind {
    fn extension(self) -> &'static str {
        match self {
            OutputKind::Pdf => "pdf",
            OutputKind::Text => "txt",
        }
    }
}

/// Sibling path of `input` for an output of `kind`.
///
/// Never returns `input` itself: the source document is not written in place.
pub fn derive_output_path(
    input: &Path,
    kind: OutputKind,
    settings: &Settings,
    now: DateTime<Local>,
) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match (settings.naming, kind) {
        (Naming::Suffix, OutputKind::Pdf) => format!("{stem}{}", settings.suffix),
        (Naming::Suffix, OutputKind::Text) => stem,
        (Naming::Timestamp, _) => format!("{stem}-{}", now.format(&settings.timestamp_format)),
    };
    let candidate = input.with_file_name(format!("{name}.{}", kind.extension()));
    if candidate == input {
        // an empty suffix on a .pdf input would overwrite it
        return input.with_file_name(format!("{name}-new.{}", kind.extension()));
    }
    candidate
}
