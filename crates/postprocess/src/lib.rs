#![deny(missing_docs)]
//! Postprocessing for parsed Markdown/MDX trees: frontmatter titles, link
//! references, processed markdown and the module exports an MDX compiler
//! picks up.

/// Parallel processing of many documents.
pub mod batch;
/// Postprocess and pipeline errors.
pub mod error;
/// Value to JavaScript expression conversion.
pub mod estree;
/// Synthetic export nodes.
pub mod export;
/// Per-file data.
pub mod file;
/// Heading ids and table of contents.
pub mod headings;
/// MDAST to Markdown serialization.
pub mod markdown;
/// Postprocessor options.
pub mod options;
/// Single-document driver.
pub mod pipeline;
/// The postprocess step.
pub mod postprocess;
/// Link reference extraction.
pub mod references;

pub use batch::{BatchInput, BatchOptions, BatchOutput, BatchResult, BatchStats, process_batch};
pub use error::{PipelineError, PostprocessError};
pub use export::{ExportDeclaration, ExportError, PendingExport, export_node, prepend_exports};
pub use file::FileData;
pub use headings::{HeadingIds, TocEntry, assign_heading_ids};
pub use crate::markdown::{MarkdownError, MarkdownOutput, Settings, ToMarkdownOptions, to_markdown};
pub use options::{IncludeMdast, PostprocessOptions, ProcessedMarkdown};
pub use pipeline::{DocumentOptions, ProcessedDocument, process_document};
pub use postprocess::Postprocessor;
pub use references::{ExtractedReference, extract_references};
