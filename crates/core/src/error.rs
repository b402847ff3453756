use thiserror::Error;

/// Source location information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Optional file path
    pub file: Option<String>,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl SourceLocation {
    /// Create a new source location
    pub fn new(line: usize, column: usize) -> Self {
        Self {
            file: None,
            line,
            column,
        }
    }

    /// Attach a file path to this location.
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(file) = &self.file {
            write!(f, "{}:{}:{}", file, self.line, self.column)
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}

/// Errors raised by the core parsing layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// markdown-rs parser error surfaced through the adapter.
    #[error("Parse error at {location}: {message}")]
    MarkdownAdapter {
        /// Error message
        message: String,
        /// Source location
        location: SourceLocation,
    },
    /// The parser returned something other than a root node.
    #[error("Expected a root node, found `{0}`")]
    NotARoot(&'static str),
}

impl CoreError {
    /// Returns the source location, when the error carries one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CoreError::MarkdownAdapter { location, .. } => Some(location),
            CoreError::NotARoot(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_includes_file_when_present() {
        assert_eq!(SourceLocation::new(3, 7).to_string(), "3:7");
        assert_eq!(
            SourceLocation::new(3, 7).in_file("docs/index.mdx").to_string(),
            "docs/index.mdx:3:7"
        );
    }

    #[test]
    fn adapter_errors_report_location() {
        let err = CoreError::MarkdownAdapter {
            message: "Unexpected end of file".into(),
            location: SourceLocation::new(2, 5),
        };
        assert_eq!(err.to_string(), "Parse error at 2:5: Unexpected end of file");
        assert_eq!(err.location(), Some(&SourceLocation::new(2, 5)));
        assert_eq!(CoreError::NotARoot("paragraph").location(), None);
    }
}
