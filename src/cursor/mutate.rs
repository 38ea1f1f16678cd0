//! Removal, replacement and relative insertion
//!
//! Everything here works on the current node. Content taken from another
//! cursor is deep-copied into this cursor's tree first, so the source is never
//! modified.

use super::XDoc;
use crate::dom::node::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::names::validate_qname;
use crate::namespaces::XMLNS_NAMESPACE;
use crate::values::Value;

impl XDoc {
    /// Detach the current node from the tree
    ///
    /// Attributes are removed from their owner element. This cursor becomes
    /// empty and the empty cursor is returned.
    pub fn remove(&mut self) -> Result<XDoc> {
        let current = self.current()?;
        let tree = current.tree();
        match (current.kind(), current.parent()) {
            (NodeKind::Attribute, Some(owner)) => {
                let name = current.name().unwrap_or_default();
                tree.remove_attribute(&owner, &name)?;
            }
            (_, Some(parent)) => tree.remove_child(&parent, &current)?,
            (_, None) => {}
        }
        self.state = None;
        Ok(XDoc::EMPTY)
    }

    /// Remove an attribute of the current element, if present
    pub fn remove_attr(&mut self, name: &str) -> Result<&mut Self> {
        let current = self.current()?;
        if current.kind() != NodeKind::Element {
            return Err(Error::state("xdoc is not an element"));
        }
        current.tree().remove_attribute(&current, name)?;
        Ok(self)
    }

    /// Remove all children of the current node
    pub fn remove_nodes(&mut self) -> Result<&mut Self> {
        let current = self.current()?;
        let tree = current.tree();
        for child in current.children() {
            tree.remove_child(&current, &child)?;
        }
        Ok(self)
    }

    /// Remove every selected node
    pub fn remove_all(&self) -> Result<()> {
        self.current()?;
        for mut item in self.to_list() {
            item.remove()?;
        }
        Ok(())
    }

    /// Replace the current node with a text node holding `value`
    ///
    /// An absent value removes the current node.
    pub fn replace(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        match value.into().render() {
            Some(text) => {
                let node = current.tree().create_text(&text);
                self.replace_current(node)
            }
            None => {
                self.remove()?;
                Ok(self)
            }
        }
    }

    /// Replace the current node with a copy of the current node of `other`
    ///
    /// When `other` is at its document node, its document element is used.
    /// An element without a namespace placed into a document whose root
    /// element has one gets an explicit default namespace declaration. An
    /// empty `other` removes the current node.
    pub fn replace_with(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        let source = match other.as_node() {
            Some(node) if node.kind() == NodeKind::Document => node.tree().document_element(),
            source => source,
        };
        let Some(source) = source else {
            self.remove()?;
            return Ok(self);
        };

        let tree = current.tree();
        let copy = tree.import_node(&source)?;
        if copy.kind() == NodeKind::Element && copy.namespace_uri().is_none() {
            let default_ns = tree.document_element().and_then(|root| root.namespace_uri());
            if let Some(ns) = default_ns {
                tree.set_attribute(&copy, "xmlns", Some(XMLNS_NAMESPACE), &ns)?;
            }
        }
        self.replace_current(copy)
    }

    /// Replace the current node with copies of the children of `other`'s root element
    ///
    /// Returns a cursor at the last inserted node. When there is nothing to
    /// insert, the current node is removed and the empty cursor is returned.
    pub fn replace_with_nodes(&mut self, other: &XDoc) -> Result<XDoc> {
        let current = self.current()?;
        let children = source_children(other);
        if children.is_empty() {
            return self.remove();
        }

        let parent = sibling_parent(&current)?;
        let tree = current.tree();
        let mut last = current.clone();
        for child in &children {
            let copy = tree.import_node(child)?;
            last = insert_after(&parent, &copy, Some(&last))?;
        }
        tree.remove_child(&parent, &current)?;
        Ok(self.at_node(&last))
    }

    /// Rename the current element
    ///
    /// A new element with the same namespace takes over the attributes and
    /// children and then replaces the current one.
    pub fn rename(&mut self, name: &str) -> Result<&mut Self> {
        let current = self.current()?;
        validate_qname(name)?;
        if current.name().as_deref() == Some(name) {
            return Ok(self);
        }
        if current.kind() != NodeKind::Element {
            return Err(Error::state("xdoc is not an element"));
        }

        let tree = current.tree();
        let renamed = tree.create_element(name, current.namespace_uri().as_deref());
        for attr in current.attributes() {
            tree.set_attribute(
                &renamed,
                &attr.name().unwrap_or_default(),
                attr.namespace_uri().as_deref(),
                &attr.value().unwrap_or_default(),
            )?;
        }
        for child in current.children() {
            tree.append_child(&renamed, &child)?;
        }
        self.replace_current(renamed)
    }

    /// Append a copy of the root of `other` to the current node
    pub fn add(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        if let Some(source) = source_root(other) {
            let tree = current.tree();
            let copy = tree.import_node(&source)?;
            tree.append_child(&current, &copy)?;
        }
        Ok(self)
    }

    /// Insert a copy of the root of `other` before the current node
    pub fn add_before(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        let parent = sibling_parent(&current)?;
        if let Some(source) = source_root(other) {
            let tree = current.tree();
            let copy = tree.import_node(&source)?;
            tree.insert_before(&parent, &copy, Some(&current))?;
        }
        Ok(self)
    }

    /// Insert a copy of the root of `other` after the current node
    pub fn add_after(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        let parent = sibling_parent(&current)?;
        if let Some(source) = source_root(other) {
            let copy = current.tree().import_node(&source)?;
            insert_after(&parent, &copy, Some(&current))?;
        }
        Ok(self)
    }

    /// Insert a text node before the current node
    ///
    /// Absent and empty values are skipped.
    pub fn add_value_before(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        let Some(text) = value.into().render().filter(|t| !t.is_empty()) else {
            return Ok(self);
        };
        let parent = sibling_parent(&current)?;
        let tree = current.tree();
        let node = tree.create_text(&text);
        tree.insert_before(&parent, &node, Some(&current))?;
        Ok(self)
    }

    /// Insert a text node after the current node
    ///
    /// Absent and empty values are skipped.
    pub fn add_value_after(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        let Some(text) = value.into().render().filter(|t| !t.is_empty()) else {
            return Ok(self);
        };
        let parent = sibling_parent(&current)?;
        let node = current.tree().create_text(&text);
        insert_after(&parent, &node, Some(&current))?;
        Ok(self)
    }

    /// Append copies of the children of `other`'s root element to the current node
    pub fn add_nodes(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        let tree = current.tree();
        for child in source_children(other) {
            let copy = tree.import_node(&child)?;
            tree.append_child(&current, &copy)?;
        }
        Ok(self)
    }

    /// Insert copies of the children of `other`'s root element in front of
    /// the children of the current node
    pub fn add_nodes_in_front(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        self.require_element_root()?;
        let tree = current.tree();
        let mut last: Option<Node> = None;
        for child in source_children(other) {
            let copy = tree.import_node(&child)?;
            last = Some(insert_after(&current, &copy, last.as_ref())?);
        }
        Ok(self)
    }

    /// Insert copies of the children of `other`'s root element before the current node
    pub fn add_nodes_before(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        self.require_element_root()?;
        let children = source_children(other);
        if children.is_empty() {
            return Ok(self);
        }
        let parent = sibling_parent(&current)?;
        let tree = current.tree();
        for child in &children {
            let copy = tree.import_node(child)?;
            tree.insert_before(&parent, &copy, Some(&current))?;
        }
        Ok(self)
    }

    /// Insert copies of the children of `other`'s root element after the current node
    pub fn add_nodes_after(&mut self, other: &XDoc) -> Result<&mut Self> {
        let current = self.current()?;
        self.require_element_root()?;
        let children = source_children(other);
        if children.is_empty() {
            return Ok(self);
        }
        let parent = sibling_parent(&current)?;
        let tree = current.tree();
        let mut last = current.clone();
        for child in &children {
            let copy = tree.import_node(child)?;
            last = insert_after(&parent, &copy, Some(&last))?;
        }
        Ok(self)
    }

    /// [`add`](Self::add) every selected node of `other`
    pub fn add_all(&mut self, other: &XDoc) -> Result<&mut Self> {
        self.current()?;
        for item in other.to_list() {
            self.add(&item)?;
        }
        Ok(self)
    }

    /// [`add_before`](Self::add_before) every selected node of `other`
    pub fn add_all_before(&mut self, other: &XDoc) -> Result<&mut Self> {
        self.current()?;
        for item in other.to_list() {
            self.add_before(&item)?;
        }
        Ok(self)
    }

    /// [`add_after`](Self::add_after) every selected node of `other`, keeping their order
    pub fn add_all_after(&mut self, other: &XDoc) -> Result<&mut Self> {
        self.current()?;
        for item in other.to_list().iter().rev() {
            self.add_after(item)?;
        }
        Ok(self)
    }

    /// Put `node` in the place of the current node
    ///
    /// The selection gets a new member list and the root follows the
    /// replacement when the current node was the root.
    fn replace_current(&mut self, node: Node) -> Result<&mut Self> {
        let current = self.current()?;
        if current.kind() == NodeKind::Attribute {
            return Err(Error::state("cannot replace an attribute"));
        }
        let parent = current
            .parent()
            .ok_or_else(|| Error::state("xdoc is top node"))?;
        current.tree().replace_child(&parent, &node, &current)?;

        let state = self.state_mut()?;
        state.selection = state
            .selection
            .as_ref()
            .map(|selection| selection.with_current(node.clone()));
        if state.root == current {
            state.root = node;
        }
        Ok(self)
    }

    fn require_element_root(&self) -> Result<()> {
        match self.root_node()?.kind() {
            NodeKind::Element => Ok(()),
            _ => Err(Error::state("xdoc is not an element")),
        }
    }
}

/// Insert `node` right after `reference` under `parent`, or first when there is no reference
///
/// Returns the inserted node.
pub(crate) fn insert_after(parent: &Node, node: &Node, reference: Option<&Node>) -> Result<Node> {
    let tree = parent.tree();
    let next = match reference {
        None => parent.first_child(),
        Some(reference) => {
            let siblings = parent.children();
            let index = siblings
                .iter()
                .position(|sibling| sibling == reference)
                .ok_or_else(|| Error::argument("ref is not a child of parent"))?;
            siblings.get(index + 1).cloned()
        }
    };
    tree.insert_before(parent, node, next.as_ref())?;
    Ok(node.clone())
}

/// Parent of a node that may get siblings
fn sibling_parent(node: &Node) -> Result<Node> {
    if node.kind() == NodeKind::Attribute {
        return Err(Error::state("attributes have no siblings"));
    }
    match node.parent() {
        Some(parent) if parent.kind() != NodeKind::Document => Ok(parent),
        _ => Err(Error::state("xdoc is top node")),
    }
}

/// Root of a cursor, with a document root standing for its document element
fn source_root(other: &XDoc) -> Option<Node> {
    let root = other.root_node().ok()?;
    match root.kind() {
        NodeKind::Document => root.tree().document_element(),
        _ => Some(root),
    }
}

fn source_children(other: &XDoc) -> Vec<Node> {
    source_root(other).map(|root| root.children()).unwrap_or_default()
}
