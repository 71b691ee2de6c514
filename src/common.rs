//! Common types shared across the toolkit

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source span (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn dummy() -> Self {
        Self { start: 0, end: 0 }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Resolved source position (1-indexed line and column)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Source file information
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File path (or "<input>" for in-memory sources)
    pub path: String,
    /// Source code content
    pub content: String,
    /// Line start byte offsets
    line_starts: Vec<usize>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        let line_starts = std::iter::once(0)
            .chain(content.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            path: path.into(),
            content,
            line_starts,
        }
    }

    pub fn from_str(content: &str) -> Self {
        Self::new("<input>", content)
    }

    /// Get line and column for a byte offset (both 1-indexed)
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts.get(line).copied().unwrap_or(0);
        (line + 1, col + 1)
    }

    /// Resolve the start of a span to a `Position`
    pub fn position(&self, span: Span) -> Position {
        let (line, column) = self.line_col(span.start);
        Position {
            file: self.path.clone(),
            line,
            column,
        }
    }

    /// Get a specific line (1-indexed)
    pub fn line(&self, line: usize) -> &str {
        if line == 0 || line > self.line_starts.len() {
            return "";
        }
        let start = self.line_starts[line - 1];
        let end = self
            .line_starts
            .get(line)
            .copied()
            .unwrap_or(self.content.len());
        self.content[start..end].trim_end_matches('\n')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_merge() {
        let s1 = Span::new(5, 10);
        let s2 = Span::new(8, 15);
        let merged = s1.merge(s2);
        assert_eq!(merged.start, 5);
        assert_eq!(merged.end, 15);
    }

    #[test]
    fn test_source_file_line_col() {
        let src = SourceFile::from_str("line 1\nline 2\nline 3");
        assert_eq!(src.line_col(0), (1, 1));
        assert_eq!(src.line_col(6), (1, 7));
        assert_eq!(src.line_col(7), (2, 1));
        assert_eq!(src.line_col(14), (3, 1));
    }

    #[test]
    fn test_position_display() {
        let src = SourceFile::new("main.tn", "module main\n");
        let pos = src.position(Span::new(7, 11));
        assert_eq!(pos.to_string(), "main.tn:1:8");
    }
}
