//! Depth-first, pre-order traversal with early-stop signaling.

use markdown::mdast::Node;

/// What the traversal should do after visiting a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node's children, then continue with its siblings.
    Continue,
    /// Do not descend into this node's children.
    Skip,
    /// End the whole traversal.
    Stop,
}

/// Visits `node` and its descendants in pre-order, left to right.
///
/// Returns `true` when the visitor stopped the traversal early.
///
/// # Examples
///
/// ```
/// use markdown::mdast::Node;
/// use mdxport_core::visit::{Visit, visit};
///
/// let tree = markdown::to_mdast("# a\n\n# b", &Default::default()).unwrap();
/// let mut headings = 0;
/// visit(&tree, &mut |node| {
///     if matches!(node, Node::Heading(_)) {
///         headings += 1;
///         return Visit::Stop;
///     }
///     Visit::Continue
/// });
/// assert_eq!(headings, 1);
/// ```
pub fn visit<F>(node: &Node, visitor: &mut F) -> bool
where
    F: FnMut(&Node) -> Visit,
{
    match visitor(node) {
        Visit::Stop => return true,
        Visit::Skip => return false,
        Visit::Continue => {}
    }

    if let Some(children) = node.children() {
        for child in children {
            if visit(child, visitor) {
                return true;
            }
        }
    }
    false
}

/// Mutable variant of [`visit`]; the visitor may edit each node in place.
///
/// Children are read after the visitor returns, so edits to a node's child
/// list are reflected in the traversal.
pub fn visit_mut<F>(node: &mut Node, visitor: &mut F) -> bool
where
    F: FnMut(&mut Node) -> Visit,
{
    match visitor(node) {
        Visit::Stop => return true,
        Visit::Skip => return false,
        Visit::Continue => {}
    }

    if let Some(children) = node.children_mut() {
        for child in children {
            if visit_mut(child, visitor) {
                return true;
            }
        }
    }
    false
}
