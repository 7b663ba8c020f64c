//! Indent parser for the plain-text bookmark format.
//!
//! Each line reads `<indent><title tokens><spaces><page>`. The page number is
//! the rightmost whitespace-delimited token, 1-based. Lines with fewer than
//! two tokens, or whose last token is not an integer, are skipped.

use tracing::trace;

use crate::domain::error::{DomainError, DomainResult};

/// A bookmark line accepted by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// Count of leading whitespace characters, not normalized
    pub indent: usize,
    pub title: String,
    /// Zero-based page index, offset applied and range-checked
    pub page: usize,
}

/// Parses bookmark lines against a document's page count.
#[derive(Debug, Clone, Copy)]
pub struct IndentParser {
    offset: i64,
    page_count: usize,
}

impl IndentParser {
    /// `offset` is added to every page number before validation.
    pub fn new(offset: i64, page_count: usize) -> Self {
        Self { offset, page_count }
    }

    /// Parse one line; `line_no` is 1-based and used for diagnostics.
    ///
    /// Returns `Ok(None)` for lines that carry no integer page token.
    pub fn parse_line(&self, line_no: usize, line: &str) -> DomainResult<Option<ParsedLine>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((page_token, title_tokens)) = tokens.split_last() else {
            return Ok(None);
        };
        if title_tokens.is_empty() {
            trace!(line_no, "skipping line without page number");
            return Ok(None);
        }
        let Ok(page_value) = page_token.parse::<i64>() else {
            trace!(line_no, token = %page_token, "skipping line without integer page number");
            return Ok(None);
        };

        let out_of_range = || DomainError::PageOutOfRange {
            page: page_value.saturating_sub(1).saturating_add(self.offset),
            page_count: self.page_count,
        };
        let page = page_value
            .checked_sub(1)
            .and_then(|p| p.checked_add(self.offset))
            .ok_or_else(out_of_range)?;
        if page < 0 || page >= self.page_count as i64 {
            return Err(out_of_range());
        }

        Ok(Some(ParsedLine {
            indent: line.chars().take_while(|c| c.is_whitespace()).count(),
            title: title_tokens.join(" "),
            page: page as usize,
        }))
    }

    /// Parse every line of `text` in order, aborting on the first error.
    ///
    /// Leading whitespace of the whole text is dropped, so the first
    /// bookmark line always has indent 0.
    pub fn parse(&self, text: &str) -> DomainResult<Vec<ParsedLine>> {
        let body = text.trim_start();
        let skipped = text[..text.len() - body.len()].matches('\n').count();
        let mut parsed = Vec::new();
        for (idx, line) in body.lines().enumerate() {
            if let Some(line) = self.parse_line(skipped + idx + 1, line)? {
                parsed.push(line);
            }
        }
        Ok(parsed)
    }
}
