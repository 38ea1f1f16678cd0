//! Structural equality of cursors

use super::XDoc;
use crate::dom::node::{Node, NodeKind};

impl PartialEq for XDoc {
    /// Two cursors are equal when the subtrees under their roots match
    ///
    /// Selections beyond the root do not take part. The empty cursor equals
    /// only itself.
    fn eq(&self, other: &Self) -> bool {
        match (self.root_node(), other.root_node()) {
            (Ok(left), Ok(right)) => compare_nodes(&left, &right),
            (Err(_), Err(_)) => true,
            _ => false,
        }
    }
}

/// Recursive comparison, stopping at the first difference
///
/// Attributes are matched by qualified name, so their order does not matter.
fn compare_nodes(left: &Node, right: &Node) -> bool {
    let kind = left.kind();
    if kind != right.kind() {
        return false;
    }
    if kind.has_value() && left.value() != right.value() {
        return false;
    }
    if kind.has_name()
        && (left.namespace_uri() != right.namespace_uri() || left.name() != right.name())
    {
        return false;
    }

    if kind == NodeKind::Element {
        let attributes = left.attributes();
        if attributes.len() != right.attributes().len() {
            return false;
        }
        let attributes_match = attributes.iter().all(|attr| {
            let name = attr.name().unwrap_or_default();
            right
                .attribute(&name)
                .map_or(false, |other| compare_nodes(attr, &other))
        });
        if !attributes_match {
            return false;
        }
    }

    if kind.is_container() {
        let children = left.children();
        let other_children = right.children();
        return children.len() == other_children.len()
            && children
                .iter()
                .zip(&other_children)
                .all(|(l, r)| compare_nodes(l, r));
    }
    true
}
