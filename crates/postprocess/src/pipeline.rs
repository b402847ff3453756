//! Source text to postprocessed tree, for one document.

use crate::error::PipelineError;
use crate::file::FileData;
use crate::headings::{TocEntry, assign_heading_ids};
use crate::postprocess::Postprocessor;
use markdown::mdast::Node;
use mdxport_core::error::CoreError;
use mdxport_core::frontmatter::{Frontmatter, frontmatter_from_tree};
use mdxport_core::parse::ParserPipeline;
use std::path::{Path, PathBuf};

/// Per-document inputs besides the source text.
#[derive(Debug, Clone, Default)]
pub struct DocumentOptions {
    /// Source path, used in error locations.
    pub path: Option<PathBuf>,
    /// Frontmatter supplied by the caller; wins over the document's own block.
    pub frontmatter: Option<Frontmatter>,
    /// Store the table of contents in the file values as `toc`.
    pub generate_toc: bool,
}

/// A processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedDocument {
    /// The tree with export nodes prepended.
    pub tree: Node,
    /// Frontmatter, heading ids and named values.
    pub file: FileData,
    /// Headings in document order.
    pub toc: Vec<TocEntry>,
}

/// Parses `source` and runs every processing step on it.
///
/// Steps: parse in the processor's format, load the frontmatter block,
/// assign heading ids, then run `processor`.
///
/// # Examples
///
/// ```
/// use mdxport_postprocess::{DocumentOptions, PostprocessOptions, Postprocessor, process_document};
///
/// let mut processor = Postprocessor::new(PostprocessOptions::default());
/// let doc = process_document("# Hello", &DocumentOptions::default(), &mut processor).unwrap();
/// assert_eq!(doc.file.frontmatter.unwrap()["title"], "Hello");
/// ```
pub fn process_document(
    source: &str,
    options: &DocumentOptions,
    processor: &mut Postprocessor,
) -> Result<ProcessedDocument, PipelineError> {
    let parser = ParserPipeline::new(processor.options().format);
    let mut tree = parser
        .parse(source)
        .map_err(|err| locate(err, options.path.as_deref()))?;

    let mut file = FileData {
        path: options.path.clone(),
        ..FileData::default()
    };
    file.frontmatter = match &options.frontmatter {
        Some(frontmatter) => Some(frontmatter.clone()),
        None => frontmatter_from_tree(&tree)?,
    };

    let toc = assign_heading_ids(&mut tree, &mut file, options.generate_toc);
    processor.run(&mut tree, &mut file)?;

    Ok(ProcessedDocument { tree, file, toc })
}

fn locate(err: CoreError, path: Option<&Path>) -> CoreError {
    match (err, path) {
        (CoreError::MarkdownAdapter { message, location }, Some(path)) => {
            CoreError::MarkdownAdapter {
                message,
                location: location.in_file(path.display().to_string()),
            }
        }
        (err, _) => err,
    }
}
