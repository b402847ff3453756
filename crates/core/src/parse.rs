//! Markdown parsing adapter over markdown-rs.

use crate::CoreError;
use crate::script;
use crate::tree::node_kind;
use markdown::mdast::Node;
use markdown::message::{Message, Place};
use serde::{Deserialize, Serialize};

/// Text dialect a document is written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Plain Markdown (CommonMark + GFM).
    Md,
    /// MDX: Markdown with JSX, ESM and `{expression}` syntax.
    #[default]
    Mdx,
}

/// Parser options for building markdown-rs parse options.
///
/// The dialect picks the base constructs: CommonMark for [`Format::Md`],
/// and for [`Format::Mdx`] the MDX set, which turns off indented code,
/// raw HTML and `<url>` autolinks in favour of JSX.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Dialect the input is written in.
    pub format: Format,
    /// Enable GitHub Flavored Markdown constructs.
    pub gfm: bool,
    /// Enable YAML/TOML frontmatter parsing.
    pub frontmatter: bool,
    /// Enable math constructs (`$inline$` and `$$block$$`).
    pub math: bool,
}

impl ParseOptions {
    /// Defaults for plain Markdown.
    pub const fn markdown() -> Self {
        Self::for_format(Format::Md)
    }

    /// Defaults for MDX.
    pub const fn mdx() -> Self {
        Self::for_format(Format::Mdx)
    }

    /// Defaults for the given dialect: GFM and frontmatter on, math off.
    pub const fn for_format(format: Format) -> Self {
        Self {
            format,
            gfm: true,
            frontmatter: true,
            math: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    ///
    /// MDX options carry ESM and expression parsers, so `import`/`export`
    /// blocks become `mdxjsEsm` nodes and nested braces inside expressions
    /// are tracked.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = match self.format {
            Format::Md => markdown::Constructs::default(),
            Format::Mdx => markdown::Constructs::mdx(),
        };
        constructs.frontmatter = self.frontmatter;

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_footnote_definition = true;
            constructs.gfm_label_start_footnote = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }
        if self.math {
            constructs.math_flow = true;
            constructs.math_text = true;
        }

        let mut options = markdown::ParseOptions {
            constructs,
            math_text_single_dollar: self.math,
            ..markdown::ParseOptions::default()
        };
        if self.format == Format::Mdx {
            options.mdx_esm_parse = Some(Box::new(script::parse_esm));
            options.mdx_expression_parse = Some(Box::new(script::parse_expression));
        }
        options
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::mdx()
    }
}

/// Parses documents and checks that the result is a tree root.
#[derive(Clone, Copy, Debug)]
pub struct ParserPipeline {
    options: ParseOptions,
}

impl ParserPipeline {
    /// Create a pipeline with the default parse options for `format`.
    pub fn new(format: Format) -> Self {
        Self::with_options(ParseOptions::for_format(format))
    }

    /// Create a pipeline with explicit parse options.
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    /// Parse markdown into MDAST.
    pub fn parse(&self, input: &str) -> Result<Node, CoreError> {
        let root = parse_mdast(input, &self.options)?;
        if !matches!(root, Node::Root(_)) {
            return Err(CoreError::NotARoot(node_kind(&root)));
        }
        Ok(root)
    }
}

/// Parse markdown into an MDAST tree using core options.
pub fn parse_mdast(input: &str, options: &ParseOptions) -> Result<Node, CoreError> {
    parse_mdast_with_options(input, &options.to_markdown())
}

/// Parse markdown into an MDAST tree using markdown-rs `ParseOptions`.
pub fn parse_mdast_with_options(
    input: &str,
    options: &markdown::ParseOptions,
) -> Result<Node, CoreError> {
    markdown::to_mdast(input, options).map_err(|err| {
        log::debug!("markdown-rs rejected input: {}", err);
        CoreError::MarkdownAdapter {
            message: err.to_string(),
            location: message_location(&err),
        }
    })
}

fn message_location(message: &Message) -> crate::SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => crate::SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                crate::SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => crate::SourceLocation::new(1, 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(root: &Node) -> Vec<&'static str> {
        root.children().unwrap().iter().map(node_kind).collect()
    }

    #[test]
    fn format_deserializes_lowercase() {
        let format: Format = serde_json::from_str("\"md\"").unwrap();
        assert_eq!(format, Format::Md);
    }

    #[test]
    fn mdx_pipeline_parses_esm() {
        let pipeline = ParserPipeline::new(Format::Mdx);
        let root = pipeline
            .parse("import X from './x'\n\n# Hi")
            .expect("mdx should parse");
        let children = root.children().expect("root has children");
        let Node::MdxjsEsm(esm) = &children[0] else {
            panic!("expected ESM, got {:?}", children[0]);
        };
        assert_eq!(esm.value, "import X from './x'");
        assert!(matches!(children[1], Node::Heading(_)));
    }

    #[test]
    fn esm_spans_blank_lines_inside_brackets() {
        let root = ParserPipeline::new(Format::Mdx)
            .parse("export const meta = {\n  a: 1,\n\n  b: 2,\n}\n\nText")
            .unwrap();
        assert_eq!(kinds(&root), ["mdxjsEsm", "paragraph"]);
    }

    #[test]
    fn esm_rejects_plain_statements() {
        let err = ParserPipeline::new(Format::Mdx)
            .parse("import a from 'a'\nconst b = 1")
            .unwrap_err();
        assert_eq!(err.location().map(|location| location.line), Some(2));
        assert!(err.to_string().contains("only import/exports"), "{err}");
    }

    #[test]
    fn nested_braces_stay_in_one_expression() {
        let root = ParserPipeline::new(Format::Mdx)
            .parse("<Box style={{ color: 'red' }} {...rest} />\n\n{ {a: '}'}.a }")
            .unwrap();
        assert_eq!(kinds(&root), ["mdxJsxFlowElement", "mdxFlowExpression"]);
        let Node::MdxFlowExpression(expression) = &root.children().unwrap()[1] else {
            unreachable!();
        };
        assert_eq!(expression.value, " {a: '}'}.a ");
    }

    #[test]
    fn markdown_format_keeps_imports_as_text() {
        let root = ParserPipeline::new(Format::Md)
            .parse("import X from './x'\n\n    indented")
            .unwrap();
        assert_eq!(kinds(&root), ["paragraph", "code"]);
    }

    #[test]
    fn mdx_parse_errors_carry_location() {
        let pipeline = ParserPipeline::new(Format::Mdx);
        let err = pipeline.parse("# Title\n\n{unclosed").unwrap_err();
        assert!(matches!(err, CoreError::MarkdownAdapter { .. }), "{err:?}");
        assert!(err.location().is_some());
    }

    #[test]
    fn math_is_opt_in() {
        let options = ParseOptions {
            math: true,
            ..ParseOptions::markdown()
        };
        let root = ParserPipeline::with_options(options).parse("$$\nx\n$$").unwrap();
        assert_eq!(kinds(&root), ["math"]);
    }
}
