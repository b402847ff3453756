//! Small helpers over the markdown-rs MDAST.

use markdown::mdast::Node;

/// Returns the mdast `type` name of a node (`"heading"`, `"mdxjsEsm"`, ...).
///
/// # Examples
///
/// ```
/// use markdown::mdast::{Node, Text};
/// use mdxport_core::tree::node_kind;
///
/// let text = Node::Text(Text { value: "hi".into(), position: None });
/// assert_eq!(node_kind(&text), "text");
/// ```
pub fn node_kind(node: &Node) -> &'static str {
    match node {
        Node::Root(_) => "root",
        Node::Blockquote(_) => "blockquote",
        Node::FootnoteDefinition(_) => "footnoteDefinition",
        Node::MdxJsxFlowElement(_) => "mdxJsxFlowElement",
        Node::List(_) => "list",
        Node::MdxjsEsm(_) => "mdxjsEsm",
        Node::Toml(_) => "toml",
        Node::Yaml(_) => "yaml",
        Node::Break(_) => "break",
        Node::InlineCode(_) => "inlineCode",
        Node::InlineMath(_) => "inlineMath",
        Node::Delete(_) => "delete",
        Node::Emphasis(_) => "emphasis",
        Node::MdxTextExpression(_) => "mdxTextExpression",
        Node::FootnoteReference(_) => "footnoteReference",
        Node::Html(_) => "html",
        Node::Image(_) => "image",
        Node::ImageReference(_) => "imageReference",
        Node::MdxJsxTextElement(_) => "mdxJsxTextElement",
        Node::Link(_) => "link",
        Node::LinkReference(_) => "linkReference",
        Node::Strong(_) => "strong",
        Node::Text(_) => "text",
        Node::Code(_) => "code",
        Node::Math(_) => "math",
        Node::MdxFlowExpression(_) => "mdxFlowExpression",
        Node::Heading(_) => "heading",
        Node::Table(_) => "table",
        Node::ThematicBreak(_) => "thematicBreak",
        Node::TableRow(_) => "tableRow",
        Node::TableCell(_) => "tableCell",
        Node::ListItem(_) => "listItem",
        Node::Definition(_) => "definition",
        Node::Paragraph(_) => "paragraph",
    }
}

/// Removes source positions from a node and all of its descendants.
pub fn strip_positions(node: &mut Node) {
    node.position_set(None);
    if let Some(children) = node.children_mut() {
        for child in children {
            strip_positions(child);
        }
    }
}

/// Byte offset where the node starts in the source, if it has a position.
pub fn start_offset(node: &Node) -> Option<usize> {
    node.position().map(|position| position.start.offset)
}
