//! Tree serializer producing the aligned plain-text bookmark format.

use crate::domain::entities::OutlineEntry;
use crate::domain::error::{DomainError, DomainResult};

const INDENT: &str = "  ";

/// Render resolved entries, one line each, page numbers 1-based.
///
/// Titles are indented two spaces per level and padded so that every page
/// number starts in the same column.
pub fn serialize(entries: &[OutlineEntry]) -> DomainResult<String> {
    let column_width = entries
        .iter()
        .map(|e| e.title.chars().count() + INDENT.len() * e.level)
        .max()
        .ok_or(DomainError::EmptyOutline)?
        + 1;

    let mut out = String::new();
    for entry in entries {
        let used = entry.title.chars().count() + INDENT.len() * entry.level;
        out.push_str(&format!(
            "{}{}{}{}\n",
            INDENT.repeat(entry.level),
            entry.title,
            " ".repeat(column_width - used),
            entry.page + 1
        ));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::builder::TreeBuilder;
    use crate::domain::parser::IndentParser;

    fn entry(level: usize, page: usize, title: &str) -> OutlineEntry {
        OutlineEntry {
            level,
            page,
            title: title.to_string(),
        }
    }

    #[test]
    fn given_nested_entries_when_serializing_then_pages_share_a_column() {
        let entries = vec![
            entry(0, 0, "Preface"),
            entry(0, 2, "Chapter 1"),
            entry(1, 3, "Section 1.1"),
            entry(2, 4, "Detail"),
        ];

        let text = serialize(&entries).unwrap();

        assert_eq!(
            text,
            concat!(
                "Preface       1\n",
                "Chapter 1     3\n",
                "  Section 1.1 4\n",
                "    Detail    5\n",
            )
        );
    }

    #[test]
    fn given_wide_characters_when_serializing_then_counts_characters() {
        let text = serialize(&[entry(0, 0, "目录"), entry(0, 1, "ab")]).unwrap();

        assert_eq!(text, "目录 1\nab 2\n");
    }

    #[test]
    fn given_no_entries_when_serializing_then_empty_outline() {
        assert_eq!(serialize(&[]).unwrap_err(), DomainError::EmptyOutline);
    }

    #[test]
    fn given_serialized_outline_when_reparsing_then_output_is_stable() {
        let entries = vec![
            entry(0, 0, "Cover"),
            entry(0, 1, "Part I Foundations"),
            entry(1, 2, "Chapter 1"),
            entry(2, 3, "1.1 Scope"),
            entry(1, 9, "Chapter 2"),
            entry(0, 11, "Index"),
        ];
        let first = serialize(&entries).unwrap();

        let outline = TreeBuilder::build_from_text(&first, &IndentParser::new(0, 12)).unwrap();
        let second = serialize(&outline.entries()).unwrap();

        assert_eq!(second, first);
    }
}
