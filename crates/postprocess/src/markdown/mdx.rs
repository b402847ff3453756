//! MDX extension: ESM, `{expressions}` and JSX elements.

use super::{Extension, Handlers, MarkdownError, Render, Rendered, indent_lines};
use markdown::mdast::{AttributeContent, AttributeValue, Node};

/// Handlers for the five MDX node kinds.
///
/// JSX elements whose name starts with an uppercase letter are reported as
/// imports (`<Tabs.Item>` requires `Tabs`). `{` is escaped in plain text so
/// it is not read back as an expression.
///
/// # Examples
///
/// ```
/// use mdxport_core::parse::{ParseOptions, parse_mdast};
/// use mdxport_postprocess::markdown::{ToMarkdownOptions, mdx::mdx_extension, to_markdown};
///
/// let tree = parse_mdast("<Note>hi</Note>", &ParseOptions::mdx()).unwrap();
/// let options = ToMarkdownOptions {
///     extensions: vec![mdx_extension()],
///     ..Default::default()
/// };
/// let output = to_markdown(&tree, &options).unwrap();
/// assert_eq!(output.markdown, "<Note>hi</Note>\n");
/// assert_eq!(output.imports, ["Note"]);
/// ```
pub fn mdx_extension() -> Extension<'static> {
    let mut handlers = Handlers::new();
    handlers.insert("mdxjsEsm", |node: &Node, _: &dyn Render| match node {
        Node::MdxjsEsm(esm) => Ok(Rendered::new(esm.value.clone())),
        _ => Ok(Rendered::default()),
    });
    handlers.insert("mdxFlowExpression", |node: &Node, _: &dyn Render| match node {
        Node::MdxFlowExpression(expr) => Ok(Rendered::new(format!("{{{}}}", expr.value))),
        _ => Ok(Rendered::default()),
    });
    handlers.insert("mdxTextExpression", |node: &Node, _: &dyn Render| match node {
        Node::MdxTextExpression(expr) => Ok(Rendered::new(format!("{{{}}}", expr.value))),
        _ => Ok(Rendered::default()),
    });
    handlers.insert("mdxJsxFlowElement", render_jsx_flow);
    handlers.insert("mdxJsxTextElement", render_jsx_text);

    Extension {
        name: "mdx",
        handlers,
        unsafe_chars: vec!['{'],
    }
}

fn render_jsx_flow(node: &Node, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let Node::MdxJsxFlowElement(element) = node else {
        return Ok(Rendered::default());
    };
    let mut out = Rendered::default();
    let open = open_tag(element.name.as_deref(), &element.attributes, &mut out);

    if element.children.is_empty() {
        out.text = self_closing(element.name.as_deref(), open);
        return Ok(out);
    }

    let inner = render.blocks(&element.children, "\n\n")?;
    let inner = out.absorb(inner);
    out.text = format!(
        "{}\n{}\n{}",
        open,
        indent_lines(&inner, "  ", "  "),
        close_tag(element.name.as_deref())
    );
    Ok(out)
}

fn render_jsx_text(node: &Node, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let Node::MdxJsxTextElement(element) = node else {
        return Ok(Rendered::default());
    };
    let mut out = Rendered::default();
    let open = open_tag(element.name.as_deref(), &element.attributes, &mut out);

    if element.children.is_empty() {
        out.text = self_closing(element.name.as_deref(), open);
        return Ok(out);
    }

    let inner = render.phrasing(&element.children)?;
    let inner = out.absorb(inner);
    out.text = format!("{}{}{}", open, inner, close_tag(element.name.as_deref()));
    Ok(out)
}

/// `<Name attr="x">`, recording `Name` as an import when it is a component.
fn open_tag(name: Option<&str>, attributes: &[AttributeContent], out: &mut Rendered) -> String {
    let Some(name) = name else {
        return "<>".to_string();
    };
    if let Some(import) = component_import(name) {
        out.imports.push(import.to_string());
    }

    let mut tag = format!("<{name}");
    for attribute in attributes {
        tag.push(' ');
        tag.push_str(&attribute_source(attribute));
    }
    tag.push('>');
    tag
}

fn close_tag(name: Option<&str>) -> String {
    format!("</{}>", name.unwrap_or_default())
}

fn self_closing(name: Option<&str>, open: String) -> String {
    match name {
        Some(_) => format!("{} />", open.trim_end_matches('>')),
        None => "<></>".to_string(),
    }
}

fn attribute_source(attribute: &AttributeContent) -> String {
    match attribute {
        AttributeContent::Expression(spread) => format!("{{{}}}", spread.value),
        AttributeContent::Property(property) => match &property.value {
            None => property.name.clone(),
            Some(AttributeValue::Literal(literal)) => {
                format!("{}=\"{}\"", property.name, literal.replace('"', "&quot;"))
            }
            Some(AttributeValue::Expression(expr)) => {
                format!("{}={{{}}}", property.name, expr.value)
            }
        },
    }
}

/// Root identifier of a component name: `Tabs.Item` -> `Tabs`.
fn component_import(name: &str) -> Option<&str> {
    if name.contains(':') {
        return None;
    }
    let root = name.split('.').next().unwrap_or(name);
    root.starts_with(|c: char| c.is_ascii_uppercase())
        .then_some(root)
}

#[cfg(test)]
mod tests {
    use super::super::{ToMarkdownOptions, to_markdown};
    use super::*;
    use mdxport_core::parse::{ParseOptions, parse_mdast};
    use mdxport_core::tree::node_kind;

    fn parse(input: &str) -> Node {
        parse_mdast(input, &ParseOptions::mdx()).unwrap()
    }

    fn roundtrip(input: &str) -> (String, Vec<String>) {
        render(&parse(input))
    }

    fn render(tree: &Node) -> (String, Vec<String>) {
        let options = ToMarkdownOptions {
            extensions: vec![mdx_extension()],
            ..Default::default()
        };
        let output = to_markdown(tree, &options).unwrap();
        (output.markdown, output.imports)
    }

    #[test]
    fn esm_and_expressions() {
        let input = "import X from './x'\nexport const meta = {\n  tags: ['a'],\n}\n\n{1 + 1}\n\nvalue {a} here";
        let tree = parse(input);
        let kinds: Vec<_> = tree.children().unwrap().iter().map(node_kind).collect();
        assert_eq!(kinds, ["mdxjsEsm", "mdxFlowExpression", "paragraph"]);

        let (markdown, imports) = render(&tree);
        assert_eq!(markdown, format!("{input}\n"));
        assert!(imports.is_empty());
    }

    #[test]
    fn flow_elements_indent_children() {
        let (markdown, imports) =
            roundtrip("<Callout type=\"note\" open count={2} {...rest}>\n  Some *text*\n</Callout>");
        assert_eq!(
            markdown,
            "<Callout type=\"note\" open count={2} {...rest}>\n  Some *text*\n</Callout>\n"
        );
        assert_eq!(imports, ["Callout"]);
    }

    #[test]
    fn self_closing_and_fragments() {
        let (markdown, imports) = roundtrip("<Tabs.Item />\n\n<div />\n\n<></>");
        assert_eq!(markdown, "<Tabs.Item />\n\n<div />\n\n<></>\n");
        assert_eq!(imports, ["Tabs"]);
    }

    #[test]
    fn braces_in_text_are_escaped() {
        let tree = Node::Root(markdown::mdast::Root {
            children: vec![Node::Paragraph(markdown::mdast::Paragraph {
                children: vec![Node::Text(markdown::mdast::Text {
                    value: "a {b}".into(),
                    position: None,
                })],
                position: None,
            })],
            position: None,
        });
        let options = ToMarkdownOptions {
            extensions: vec![mdx_extension()],
            ..Default::default()
        };
        assert_eq!(to_markdown(&tree, &options).unwrap().markdown, "a \\{b}\n");
    }

    #[test]
    fn component_roots() {
        assert_eq!(component_import("Tabs.Item"), Some("Tabs"));
        assert_eq!(component_import("div"), None);
        assert_eq!(component_import("svg:rect"), None);
    }
}
