//! Reduces a subtree to its plain text content.

use markdown::mdast::Node;

/// Concatenates the text of every value-bearing descendant of `node`, in
/// document order, ignoring all markup.
///
/// No trimming or whitespace normalization is applied.
///
/// # Examples
///
/// ```
/// use mdxport_core::flatten::flatten;
///
/// let tree = markdown::to_mdast("# Hello *big* `world`", &Default::default()).unwrap();
/// let heading = &tree.children().unwrap()[0];
/// assert_eq!(flatten(heading), "Hello big world");
/// ```
pub fn flatten(node: &Node) -> String {
    let mut buffer = String::new();
    flatten_into(node, &mut buffer);
    buffer
}

/// Flattens a list of sibling nodes.
pub fn flatten_children(nodes: &[Node]) -> String {
    let mut buffer = String::new();
    for node in nodes {
        flatten_into(node, &mut buffer);
    }
    buffer
}

fn flatten_into(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(text) => buffer.push_str(&text.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::InlineMath(math) => buffer.push_str(&math.value),
        Node::Code(code) => buffer.push_str(&code.value),
        Node::Math(math) => buffer.push_str(&math.value),
        Node::Html(html) => buffer.push_str(&html.value),
        Node::Yaml(yaml) => buffer.push_str(&yaml.value),
        Node::Toml(toml) => buffer.push_str(&toml.value),
        Node::MdxjsEsm(esm) => buffer.push_str(&esm.value),
        Node::MdxFlowExpression(expr) => buffer.push_str(&expr.value),
        Node::MdxTextExpression(expr) => buffer.push_str(&expr.value),

        Node::Root(_)
        | Node::Blockquote(_)
        | Node::FootnoteDefinition(_)
        | Node::MdxJsxFlowElement(_)
        | Node::MdxJsxTextElement(_)
        | Node::List(_)
        | Node::ListItem(_)
        | Node::Delete(_)
        | Node::Emphasis(_)
        | Node::Strong(_)
        | Node::Link(_)
        | Node::LinkReference(_)
        | Node::Heading(_)
        | Node::Paragraph(_)
        | Node::Table(_)
        | Node::TableRow(_)
        | Node::TableCell(_) => {
            if let Some(children) = node.children() {
                for child in children {
                    flatten_into(child, buffer);
                }
            }
        }

        Node::Break(_)
        | Node::ThematicBreak(_)
        | Node::Image(_)
        | Node::ImageReference(_)
        | Node::FootnoteReference(_)
        | Node::Definition(_) => {}
    }
}
