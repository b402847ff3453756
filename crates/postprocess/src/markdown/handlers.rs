//! Built-in handlers for CommonMark, GFM, frontmatter and math nodes.

use super::escape::{destination, fence_length, inline_code_ticks, title_suffix};
use super::{MarkdownError, Render, Rendered, indent_lines};
use markdown::mdast::{self, AlignKind, Node, ReferenceKind};
use mdxport_core::tree::node_kind;

/// Renders `node` without consulting overrides for the node itself.
///
/// MDX nodes have no built-in handler: they need the MDX extension.
pub(super) fn render_builtin(node: &Node, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    match node {
        Node::Root(root) => render.blocks(&root.children, "\n\n"),
        Node::Paragraph(paragraph) => render.phrasing(&paragraph.children),
        Node::Heading(heading) => render_heading(heading, render),
        Node::ThematicBreak(_) => Ok(Rendered::new(
            render.settings().rule.to_string().repeat(3),
        )),
        Node::Blockquote(quote) => {
            let mut out = render.blocks(&quote.children, "\n\n")?;
            out.text = indent_lines(&out.text, "> ", "> ");
            Ok(out)
        }
        Node::List(list) => render_list(list, render),
        Node::ListItem(item) => {
            let marker = render.settings().bullet.to_string();
            render_list_item(item, &marker, render)
        }
        Node::Code(code) => Ok(Rendered::new(render_code(code, render.settings().fence))),
        Node::Math(math) => {
            let meta = math.meta.as_deref().unwrap_or_default();
            Ok(Rendered::new(format!("$${}\n{}\n$$", meta, math.value)))
        }
        Node::Html(html) => Ok(Rendered::new(html.value.clone())),
        Node::Definition(definition) => Ok(Rendered::new(format!(
            "[{}]: {}{}",
            reference_label(definition.label.as_deref(), &definition.identifier),
            destination(&definition.url),
            title_suffix(definition.title.as_deref()),
        ))),
        Node::FootnoteDefinition(definition) => {
            let mut out = render.blocks(&definition.children, "\n\n")?;
            let label = reference_label(definition.label.as_deref(), &definition.identifier);
            out.text = indent_lines(&out.text, &format!("[^{label}]: "), "    ");
            Ok(out)
        }
        Node::Table(table) => render_table(table, render),
        Node::TableRow(row) => render_table_row(row, render),
        Node::TableCell(cell) => render_table_cell(cell, render),
        Node::Yaml(yaml) => Ok(Rendered::new(format!("---\n{}\n---", yaml.value))),
        Node::Toml(toml) => Ok(Rendered::new(format!("+++\n{}\n+++", toml.value))),

        Node::Text(text) => Ok(Rendered::new(render.escape(&text.value))),
        Node::Emphasis(emphasis) => {
            let marker = render.settings().emphasis.to_string();
            wrap(render.phrasing(&emphasis.children)?, &marker)
        }
        Node::Strong(strong) => {
            let marker = render.settings().strong.to_string().repeat(2);
            wrap(render.phrasing(&strong.children)?, &marker)
        }
        Node::Delete(delete) => wrap(render.phrasing(&delete.children)?, "~~"),
        Node::InlineCode(code) => Ok(Rendered::new(render_inline_code(&code.value))),
        Node::InlineMath(math) => Ok(Rendered::new(format!("${}$", math.value))),
        Node::Break(_) => Ok(Rendered::new("\\\n")),
        Node::Link(link) => render_link(link, render),
        Node::Image(image) => Ok(Rendered::new(format!(
            "![{}]({}{})",
            render.escape(&image.alt),
            destination(&image.url),
            title_suffix(image.title.as_deref()),
        ))),
        Node::LinkReference(reference) => {
            let mut out = render.phrasing(&reference.children)?;
            let label = reference_label(reference.label.as_deref(), &reference.identifier);
            out.text = format!(
                "[{}]{}",
                out.text,
                reference_suffix(&reference.reference_kind, label)
            );
            Ok(out)
        }
        Node::ImageReference(reference) => {
            let label = reference_label(reference.label.as_deref(), &reference.identifier);
            Ok(Rendered::new(format!(
                "![{}]{}",
                render.escape(&reference.alt),
                reference_suffix(&reference.reference_kind, label)
            )))
        }
        Node::FootnoteReference(reference) => Ok(Rendered::new(format!(
            "[^{}]",
            reference_label(reference.label.as_deref(), &reference.identifier)
        ))),

        Node::MdxjsEsm(_)
        | Node::MdxFlowExpression(_)
        | Node::MdxTextExpression(_)
        | Node::MdxJsxFlowElement(_)
        | Node::MdxJsxTextElement(_) => Err(MarkdownError::UnknownNode {
            kind: node_kind(node),
        }),
    }
}

fn wrap(mut inner: Rendered, marker: &str) -> Result<Rendered, MarkdownError> {
    inner.text = format!("{marker}{}{marker}", inner.text);
    Ok(inner)
}

fn render_heading(heading: &mdast::Heading, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let mut out = render.phrasing(&heading.children)?;
    let hashes = "#".repeat(usize::from(heading.depth.clamp(1, 6)));
    out.text = if out.text.is_empty() {
        hashes
    } else {
        // Line breaks inside an ATX heading would end it early.
        format!("{} {}", hashes, out.text.replace("\\\n", " "))
    };
    Ok(out)
}

fn render_list(list: &mdast::List, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let settings = render.settings();
    let spread = list.spread
        || list
            .children
            .iter()
            .any(|child| matches!(child, Node::ListItem(item) if item.spread));
    let separator = if spread { "\n\n" } else { "\n" };

    let mut out = Rendered::default();
    let mut number = list.start.unwrap_or(1);
    for (i, child) in list.children.iter().enumerate() {
        let rendered = match child {
            Node::ListItem(item) => {
                let marker = if list.ordered {
                    format!("{}{}", number, settings.bullet_ordered)
                } else {
                    settings.bullet.to_string()
                };
                render_list_item(item, &marker, render)?
            }
            other => render.node(other)?,
        };
        if settings.increment_list_marker {
            number += 1;
        }
        let text = out.absorb(rendered);
        if i > 0 {
            out.text.push_str(separator);
        }
        out.text.push_str(&text);
    }
    Ok(out)
}

fn render_list_item(
    item: &mdast::ListItem,
    marker: &str,
    render: &dyn Render,
) -> Result<Rendered, MarkdownError> {
    let separator = if item.spread { "\n\n" } else { "\n" };
    let mut out = render.blocks(&item.children, separator)?;
    if let Some(checked) = item.checked {
        let checkbox = if checked { "[x]" } else { "[ ]" };
        out.text = if out.text.is_empty() {
            checkbox.to_string()
        } else {
            format!("{} {}", checkbox, out.text)
        };
    }

    let rest = " ".repeat(marker.chars().count() + 1);
    out.text = if out.text.is_empty() {
        marker.to_string()
    } else {
        indent_lines(&out.text, &format!("{marker} "), &rest)
    };
    Ok(out)
}

fn render_code(code: &mdast::Code, fence_char: char) -> String {
    let fence = fence_char.to_string().repeat(fence_length(&code.value, fence_char));
    let mut info = code.lang.clone().unwrap_or_default();
    if let Some(meta) = &code.meta {
        info.push(' ');
        info.push_str(meta);
    }
    if code.value.is_empty() {
        format!("{fence}{info}\n{fence}")
    } else {
        format!("{fence}{info}\n{}\n{fence}", code.value)
    }
}

fn render_inline_code(value: &str) -> String {
    let ticks = "`".repeat(inline_code_ticks(value));
    let needs_padding = value.starts_with('`')
        || value.ends_with('`')
        || (value.starts_with(' ') && value.ends_with(' ') && !value.trim().is_empty());
    if needs_padding {
        format!("{ticks} {value} {ticks}")
    } else {
        format!("{ticks}{value}{ticks}")
    }
}

fn render_link(link: &mdast::Link, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    if is_autolink(link) {
        return Ok(Rendered::new(format!("<{}>", link.url)));
    }
    let mut out = render.phrasing(&link.children)?;
    out.text = format!(
        "[{}]({}{})",
        out.text,
        destination(&link.url),
        title_suffix(link.title.as_deref())
    );
    Ok(out)
}

/// `<https://example.com>` style links: label equals an absolute URL.
fn is_autolink(link: &mdast::Link) -> bool {
    if link.title.is_some() || link.url.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return false;
    }
    let [Node::Text(text)] = link.children.as_slice() else {
        return false;
    };
    let label = text.value.strip_prefix("mailto:").unwrap_or(&text.value);
    let url = link.url.strip_prefix("mailto:").unwrap_or(&link.url);
    label == url && (link.url.contains("://") || link.url.starts_with("mailto:"))
}

fn reference_label<'a>(label: Option<&'a str>, identifier: &'a str) -> &'a str {
    label.unwrap_or(identifier)
}

fn reference_suffix(kind: &ReferenceKind, label: &str) -> String {
    match kind {
        ReferenceKind::Full => format!("[{label}]"),
        ReferenceKind::Collapsed => "[]".to_string(),
        ReferenceKind::Shortcut => String::new(),
    }
}

fn render_table(table: &mdast::Table, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let mut out = Rendered::default();
    let mut lines = Vec::with_capacity(table.children.len() + 1);
    let columns = table
        .children
        .iter()
        .map(|row| row.children().map_or(0, Vec::len))
        .max()
        .unwrap_or(0)
        .max(table.align.len());

    for (i, row) in table.children.iter().enumerate() {
        let rendered = render.node(row)?;
        lines.push(out.absorb(rendered));
        if i == 0 {
            lines.push(delimiter_row(&table.align, columns));
        }
    }
    out.text = lines.join("\n");
    Ok(out)
}

fn delimiter_row(align: &[AlignKind], columns: usize) -> String {
    let cells: Vec<&str> = (0..columns)
        .map(|i| match align.get(i) {
            Some(AlignKind::Left) => ":--",
            Some(AlignKind::Right) => "--:",
            Some(AlignKind::Center) => ":-:",
            Some(AlignKind::None) | None => "---",
        })
        .collect();
    format!("| {} |", cells.join(" | "))
}

fn render_table_row(row: &mdast::TableRow, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let mut out = Rendered::default();
    let mut cells = Vec::with_capacity(row.children.len());
    for cell in &row.children {
        let rendered = render.node(cell)?;
        cells.push(out.absorb(rendered));
    }
    out.text = format!("| {} |", cells.join(" | "));
    Ok(out)
}

fn render_table_cell(cell: &mdast::TableCell, render: &dyn Render) -> Result<Rendered, MarkdownError> {
    let mut out = render.phrasing(&cell.children)?;
    out.text = out.text.replace('|', "\\|").replace('\n', " ");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::super::{ToMarkdownOptions, to_markdown};
    use markdown::mdast::Node;

    fn parse(input: &str) -> Node {
        let options = markdown::ParseOptions {
            constructs: markdown::Constructs {
                frontmatter: true,
                math_flow: true,
                math_text: true,
                ..markdown::Constructs::gfm()
            },
            ..markdown::ParseOptions::default()
        };
        markdown::to_mdast(input, &options).unwrap()
    }

    fn roundtrip(input: &str) -> String {
        to_markdown(&parse(input), &ToMarkdownOptions::default())
            .unwrap()
            .markdown
    }

    #[test]
    fn canonical_blocks() {
        let input = "---\ntitle: x\n---\n\n## Setup\n\n> quoted *text*\n>\n> second\n\n***\n\n```rust title=\"a\"\nfn main() {}\n```\n";
        insta::assert_snapshot!(roundtrip(input), @r#"
        ---
        title: x
        ---

        ## Setup

        > quoted *text*
        >
        > second

        ***

        ```rust title="a"
        fn main() {}
        ```
        "#);
    }

    #[test]
    fn lists_and_tasks() {
        assert_eq!(roundtrip("- a\n- b\n  - c\n"), "* a\n* b\n  * c\n");
        assert_eq!(roundtrip("3. x\n4. y\n"), "3. x\n4. y\n");
        assert_eq!(roundtrip("- [x] done\n- [ ] todo\n"), "* [x] done\n* [ ] todo\n");
        assert_eq!(roundtrip("- a\n\n- b\n"), "* a\n\n* b\n");
    }

    #[test]
    fn inline_content() {
        assert_eq!(
            roundtrip("**bold** _em_ ~~del~~ `code` a\\\nb"),
            "**bold** *em* ~~del~~ `code` a\\\nb\n"
        );
        assert_eq!(roundtrip("`` a`b ``"), "``a`b``\n");
        assert_eq!(roundtrip("$x^2$"), "$x^2$\n");
    }

    #[test]
    fn links_images_and_references() {
        assert_eq!(
            roundtrip("[a](/x \"T\") ![i](/i.png) <https://e.com>"),
            "[a](/x \"T\") ![i](/i.png) <https://e.com>\n"
        );
        assert_eq!(
            roundtrip("[full][r] [r][] [r]\n\n[r]: /ref"),
            "[full][r] [r][] [r]\n\n[r]: /ref\n"
        );
        assert_eq!(
            roundtrip("note[^1]\n\n[^1]: the note"),
            "note[^1]\n\n[^1]: the note\n"
        );
    }

    #[test]
    fn tables() {
        let output = roundtrip("| a | b |\n| :-- | --: |\n| 1 | x\\|y |\n");
        assert_eq!(output, "| a | b |\n| :-- | --: |\n| 1 | x\\|y |\n");
    }

    #[test]
    fn escapes_text() {
        assert_eq!(
            roundtrip("\\*not em\\*\n1\\. x"),
            "\\*not em\\*\n1\\. x\n"
        );
    }

    #[test]
    fn mdx_nodes_need_the_extension() {
        let tree = markdown::to_mdast("{1 + 1}", &markdown::ParseOptions::mdx()).unwrap();
        let err = to_markdown(&tree, &ToMarkdownOptions::default()).unwrap_err();
        assert_eq!(
            err,
            super::super::MarkdownError::UnknownNode {
                kind: "mdxFlowExpression"
            }
        );
    }
}
