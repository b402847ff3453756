use crate::export::ExportError;
use crate::markdown::MarkdownError;
use mdxport_core::{CoreError, FrontmatterError};
use thiserror::Error;

/// Errors raised by a postprocessor run.
#[derive(Debug, Error)]
pub enum PostprocessError {
    /// A pending value could not be turned into an export node.
    #[error("Cannot export `{name}`: {source}")]
    Serialization {
        /// Export name
        name: String,
        /// Underlying conversion error
        #[source]
        source: ExportError,
    },
    /// The tree is not a well-formed document root.
    #[error("Malformed tree: {0}")]
    MalformedTree(String),
    /// Re-serializing the tree to markdown failed.
    #[error(transparent)]
    Markdown(#[from] MarkdownError),
}

/// Errors raised while processing a whole document.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Parsing the source failed.
    #[error(transparent)]
    Core(#[from] CoreError),
    /// The frontmatter block is invalid.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// The postprocessor failed.
    #[error(transparent)]
    Postprocess(#[from] PostprocessError),
}
