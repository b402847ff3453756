//! Link reference extraction.

use markdown::mdast::Node;
use mdxport_core::visit::{Visit, visit};
use serde::{Deserialize, Serialize};

/// A link target found in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedReference {
    /// Link destination as written.
    pub href: String,
}

/// Collects the destination of every link, in document order.
///
/// A matched link's children are not searched, so links nested inside a
/// link label are not reported. Returns an empty list without walking the
/// tree when `enabled` is false.
pub fn extract_references(tree: &Node, enabled: bool) -> Vec<ExtractedReference> {
    let mut references = Vec::new();
    if !enabled {
        return references;
    }

    visit(tree, &mut |node| match node {
        Node::Link(link) => {
            references.push(ExtractedReference {
                href: link.url.clone(),
            });
            Visit::Skip
        }
        _ => Visit::Continue,
    });
    references
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown::mdast::{Link, Paragraph, Root, Text};

    fn text(value: &str) -> Node {
        Node::Text(Text {
            value: value.into(),
            position: None,
        })
    }

    fn link(url: &str, children: Vec<Node>) -> Node {
        Node::Link(Link {
            url: url.into(),
            title: None,
            children,
            position: None,
        })
    }

    fn hrefs(references: &[ExtractedReference]) -> Vec<&str> {
        references.iter().map(|r| r.href.as_str()).collect()
    }

    #[test]
    fn document_order_and_no_double_count() {
        let tree = Node::Root(Root {
            children: vec![
                link("a", vec![text("x")]),
                Node::Paragraph(Paragraph {
                    children: vec![link("b", vec![])],
                    position: None,
                }),
            ],
            position: None,
        });
        assert_eq!(hrefs(&extract_references(&tree, true)), ["a", "b"]);
    }

    #[test]
    fn links_inside_a_label_are_skipped() {
        let tree = Node::Root(Root {
            children: vec![link("outer", vec![link("inner", vec![text("x")])])],
            position: None,
        });
        assert_eq!(hrefs(&extract_references(&tree, true)), ["outer"]);
    }

    #[test]
    fn disabled_returns_nothing() {
        let tree = markdown::to_mdast("[a](/a)", &Default::default()).unwrap();
        assert!(extract_references(&tree, false).is_empty());
    }

    #[test]
    fn parsed_document_keeps_duplicates() {
        let tree = markdown::to_mdast(
            "# [Docs](/docs)\n\n- [x](/x) and [x](/x)\n- ![img](/i.png) [ref]\n\n[ref]: /ref",
            &markdown::ParseOptions::gfm(),
        )
        .unwrap();
        assert_eq!(
            hrefs(&extract_references(&tree, true)),
            ["/docs", "/x", "/x"]
        );
    }
}
