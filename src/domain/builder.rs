//! Tree builder placing parsed bookmark lines into an outline forest.

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::entities::Outline;
use crate::domain::error::DomainResult;
use crate::domain::parser::{IndentParser, ParsedLine};

/// Attaches bookmark lines to their parents by relative indentation.
///
/// The parent of a line is the nearest preceding line whose indent is
/// strictly smaller. Lines with zero indent, and lines with no such
/// predecessor, become top-level bookmarks. Levels therefore never skip:
/// a node is always exactly one level below its parent.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: TreeArena,
    /// Indent of every accepted line, parallel to `bookmarks`
    history_indent: Vec<usize>,
    bookmarks: Vec<Index>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `text` and build the resulting outline in one pass.
    #[instrument(level = "debug", skip(text))]
    pub fn build_from_text(text: &str, parser: &IndentParser) -> DomainResult<Outline> {
        let mut builder = Self::new();
        for line in parser.parse(text)? {
            builder.push(line);
        }
        debug!("built outline with {} bookmarks", builder.tree.len());
        Ok(builder.build())
    }

    /// Append one parsed line, returning its handle.
    pub fn push(&mut self, line: ParsedLine) -> Index {
        let parent = self.find_parent(line.indent);
        let level = parent
            .and_then(|idx| self.tree.get_node(idx))
            .map_or(0, |node| node.data.level + 1);

        let idx = self.tree.insert_node(
            NodeData {
                title: line.title,
                page: line.page,
                level,
            },
            parent,
        );
        self.history_indent.push(line.indent);
        self.bookmarks.push(idx);
        idx
    }

    /// Nearest preceding bookmark with a strictly smaller indent.
    fn find_parent(&self, indent: usize) -> Option<Index> {
        if indent == 0 {
            return None;
        }
        self.history_indent
            .iter()
            .zip(&self.bookmarks)
            .rev()
            .find(|&(&previous, _)| previous < indent)
            .map(|(_, &idx)| idx)
    }

    /// Parent handle of the `position`-th accepted line, for inspection.
    #[cfg(test)]
    fn parent_of(&self, position: usize) -> Option<Index> {
        let idx = *self.bookmarks.get(position)?;
        self.tree.get_node(idx)?.parent
    }

    /// Handle of the `position`-th accepted line.
    #[cfg(test)]
    fn handle(&self, position: usize) -> Option<Index> {
        self.bookmarks.get(position).copied()
    }

    /// Nesting level of the `position`-th accepted line.
    #[cfg(test)]
    fn level_of(&self, position: usize) -> Option<usize> {
        let idx = *self.bookmarks.get(position)?;
        Some(self.tree.get_node(idx)?.data.level)
    }

    pub fn build(self) -> Outline {
        self.tree.into_outline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(indent: usize, title: &str, page: usize) -> ParsedLine {
        ParsedLine {
            indent,
            title: title.to_string(),
            page,
        }
    }

    #[test]
    fn given_indents_when_building_then_links_nearest_smaller_parent() {
        let mut builder = TreeBuilder::new();
        for (i, indent) in [0, 2, 4, 2, 0].into_iter().enumerate() {
            builder.push(line(indent, &format!("n{i}"), i));
        }

        let parents: Vec<_> = (0..5).map(|i| builder.parent_of(i)).collect();

        assert_eq!(
            parents,
            vec![
                None,
                builder.handle(0),
                builder.handle(1),
                builder.handle(0),
                None
            ]
        );
    }

    #[test]
    fn given_irregular_indent_widths_when_building_then_levels_never_skip() {
        let mut builder = TreeBuilder::new();
        builder.push(line(0, "root", 0));
        builder.push(line(8, "wide", 1));
        builder.push(line(3, "narrow", 2));
        builder.push(line(9, "deeper", 3));

        let levels: Vec<_> = (0..4).map(|i| builder.level_of(i).unwrap()).collect();

        // 3 < 8 so "narrow" attaches to "root", "deeper" to "narrow"
        assert_eq!(levels, vec![0, 1, 1, 2]);
    }

    #[test]
    fn given_indented_first_line_when_building_then_it_is_top_level() {
        let mut builder = TreeBuilder::new();
        builder.push(line(4, "first", 0));
        builder.push(line(2, "second", 1));

        let outline = builder.build();

        assert_eq!(outline.roots.len(), 2);
    }

    #[test]
    fn given_siblings_when_building_then_preserves_text_order() {
        let mut builder = TreeBuilder::new();
        builder.push(line(0, "Part", 0));
        builder.push(line(2, "One", 1));
        builder.push(line(2, "Two", 2));
        builder.push(line(2, "Three", 3));

        let outline = builder.build();

        let titles: Vec<_> = outline.roots[0]
            .children
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn given_text_starting_indented_when_building_then_nests_under_first_line() {
        let parser = IndentParser::new(0, 5);

        let outline = TreeBuilder::build_from_text("    A 1\n  B 2", &parser).unwrap();

        assert_eq!(outline.roots.len(), 1);
        assert_eq!(outline.roots[0].children[0].title, "B");
    }
}
