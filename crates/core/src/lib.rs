#![deny(missing_docs)]
//! mdxport core: markdown parsing adapter, tree traversal, flattening,
//! frontmatter loading, and slugs.

/// Core error types.
pub mod error;
/// Subtree to plain-text flattening.
pub mod flatten;
/// Frontmatter loading from the parsed tree.
pub mod frontmatter;
/// Markdown parsing adapter.
pub mod parse;
mod script;
/// Slug generation utilities.
pub mod slug;
/// Node kind names and position helpers.
pub mod tree;
/// Pre-order tree traversal.
pub mod visit;

pub use error::{CoreError, SourceLocation};
pub use flatten::{flatten, flatten_children};
pub use frontmatter::{Frontmatter, FrontmatterError, frontmatter_from_tree};
pub use parse::{Format, ParseOptions, ParserPipeline, parse_mdast, parse_mdast_with_options};
pub use slug::{Slugger, extract_custom_id, slugify};
pub use tree::{node_kind, start_offset, strip_positions};
pub use visit::{Visit, visit, visit_mut};
