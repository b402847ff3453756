//! Synthetic `export let` nodes injected at the top of the tree.
//!
//! The MDX compiler reads ESM from `mdxjsEsm` nodes, so a computed value is
//! surfaced as a module export by turning it into an expression tree and
//! wrapping the generated declaration in such a node.

use crate::estree::{Expression, is_identifier_name, is_reserved_word, value_to_expression};
use markdown::mdast::{MdxjsEsm, Node};
use serde_json::Value;
use thiserror::Error;

/// Why a value could not be turned into an export declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The binding name is not a JavaScript identifier.
    #[error("`{0}` is not a valid JavaScript identifier")]
    InvalidIdentifier(String),
    /// The binding name is a reserved word in module code.
    #[error("`{0}` is a reserved word and cannot be exported")]
    ReservedWord(String),
}

/// A value waiting to be surfaced as a module export.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingExport {
    /// Binding name.
    pub name: String,
    /// Exported value.
    pub value: Value,
}

impl PendingExport {
    /// Creates a pending export.
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// `export let <name> = <init>;`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDeclaration {
    name: String,
    init: Expression,
}

impl ExportDeclaration {
    /// Builds the declaration for `name = value`.
    pub fn new(name: &str, value: &Value) -> Result<Self, ExportError> {
        if !is_identifier_name(name) {
            return Err(ExportError::InvalidIdentifier(name.to_string()));
        }
        if is_reserved_word(name) {
            return Err(ExportError::ReservedWord(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            init: value_to_expression(value),
        })
    }

    /// Binding name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Initializer expression.
    pub fn init(&self) -> &Expression {
        &self.init
    }

    /// Prints the declaration as module source.
    pub fn to_source(&self) -> String {
        format!("export let {} = {};", self.name, self.init.to_source())
    }

    /// Wraps the declaration in an `mdxjsEsm` node.
    pub fn into_node(self) -> Node {
        Node::MdxjsEsm(MdxjsEsm {
            value: self.to_source(),
            position: None,
            stops: Vec::new(),
        })
    }
}

/// Builds the synthetic export node for `name = value`.
///
/// # Examples
///
/// ```
/// use markdown::mdast::Node;
/// use mdxport_postprocess::export::export_node;
///
/// let node = export_node("toc", &serde_json::json!([])).unwrap();
/// match node {
///     Node::MdxjsEsm(esm) => assert_eq!(esm.value, "export let toc = [];"),
///     _ => unreachable!(),
/// }
/// ```
pub fn export_node(name: &str, value: &Value) -> Result<Node, ExportError> {
    ExportDeclaration::new(name, value).map(ExportDeclaration::into_node)
}

/// Inserts `nodes` at the front of `children`, keeping their relative order.
pub fn prepend_exports(children: &mut Vec<Node>, nodes: Vec<Node>) {
    if nodes.is_empty() {
        return;
    }
    children.splice(0..0, nodes);
}

/// Returns the binding name of a synthetic export node built by this module.
pub fn exported_name(node: &Node) -> Option<&str> {
    let Node::MdxjsEsm(esm) = node else {
        return None;
    };
    let rest = esm.value.strip_prefix("export let ")?;
    rest.split_once(" = ").map(|(name, _)| name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use markdown::mdast::{Paragraph, Text};
    use serde_json::json;

    fn paragraph(text: &str) -> Node {
        Node::Paragraph(Paragraph {
            children: vec![Node::Text(Text {
                value: text.into(),
                position: None,
            })],
            position: None,
        })
    }

    #[test]
    fn declaration_source() {
        let decl = ExportDeclaration::new("frontmatter", &json!({ "title": "Hi" })).unwrap();
        assert_eq!(decl.name(), "frontmatter");
        assert_eq!(decl.to_source(), r#"export let frontmatter = {title: "Hi"};"#);
    }

    #[test]
    fn rejects_bad_names() {
        assert_eq!(
            ExportDeclaration::new("my-data", &json!(1)).unwrap_err(),
            ExportError::InvalidIdentifier("my-data".into())
        );
        assert_eq!(
            ExportDeclaration::new("default", &json!(1)).unwrap_err(),
            ExportError::ReservedWord("default".into())
        );
    }

    #[test]
    fn prepend_keeps_batch_order() {
        let mut children = vec![paragraph("body")];
        let batch = vec![
            export_node("b", &json!(2)).unwrap(),
            export_node("a", &json!(1)).unwrap(),
        ];
        prepend_exports(&mut children, batch);

        let names: Vec<_> = children.iter().map(exported_name).collect();
        assert_eq!(names, [Some("b"), Some("a"), None]);
    }

    #[test]
    fn exported_name_ignores_other_esm() {
        let node = Node::MdxjsEsm(MdxjsEsm {
            value: "import X from './x'".into(),
            position: None,
            stops: Vec::new(),
        });
        assert_eq!(exported_name(&node), None);
    }
}
