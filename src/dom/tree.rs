//! Mutable node arena shared by every cursor over one document
//!
//! A [`Tree`] is a cheap, clonable handle. All handles of one tree observe each
//! other's mutations immediately; there is no internal locking and the type is
//! neither `Send` nor `Sync`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::node::{Node, NodeData, NodeId, NodeKind};
use crate::error::{Error, Result};

/// Arena index of the document node of every tree
pub(crate) const DOCUMENT: NodeId = 0;

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TreeId(u64);

/// Detached deep copy of a subtree, used to move content between trees
#[derive(Debug, Clone)]
pub(crate) struct Snapshot {
    data: NodeData,
    attributes: Vec<Snapshot>,
    children: Vec<Snapshot>,
}

/// Arena storage of one tree
#[derive(Debug)]
pub(crate) struct TreeData {
    nodes: Vec<NodeData>,
}

impl TreeData {
    fn new() -> Self {
        Self {
            nodes: vec![NodeData::document()],
        }
    }

    pub fn get(&self, id: NodeId) -> &NodeData {
        &self.nodes[id]
    }

    fn get_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        self.nodes.len() - 1
    }

    pub fn is_ancestor_or_self(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.get(id).parent;
        }
        false
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let node = self.get(id);
        match node.kind {
            NodeKind::Document | NodeKind::Element => {
                let mut out = String::new();
                self.collect_text(id, &mut out);
                out
            }
            _ => node.value.clone().unwrap_or_default(),
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        for &child in &self.get(id).children {
            let node = self.get(child);
            match node.kind {
                NodeKind::Text | NodeKind::CData => {
                    out.push_str(node.value.as_deref().unwrap_or_default())
                }
                NodeKind::Element => self.collect_text(child, out),
                _ => {}
            }
        }
    }

    /// Preorder position of every attached node; attributes follow their element
    pub fn document_order(&self) -> HashMap<NodeId, usize> {
        let mut order = HashMap::new();
        let mut stack = vec![DOCUMENT];
        while let Some(id) = stack.pop() {
            order.insert(id, order.len());
            let node = self.get(id);
            for &attr in node.attributes.values() {
                order.insert(attr, order.len());
            }
            stack.extend(node.children.iter().rev());
        }
        order
    }

    /// Detach a node from its parent's child list or owner's attribute map
    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.get(id).parent else {
            return;
        };
        let is_attribute = self.get(id).kind == NodeKind::Attribute;
        let parent_data = self.get_mut(parent);
        if is_attribute {
            parent_data.attributes.retain(|_, attr| *attr != id);
        } else {
            parent_data.children.retain(|child| *child != id);
        }
        self.get_mut(id).parent = None;
    }

    fn position(&self, parent: NodeId, child: NodeId) -> Option<usize> {
        self.get(parent).children.iter().position(|&c| c == child)
    }

    fn document_element(&self) -> Option<NodeId> {
        self.get(DOCUMENT)
            .children
            .iter()
            .copied()
            .find(|&c| self.get(c).kind == NodeKind::Element)
    }

    /// Validate that `child` may be placed under `parent`, replacing `replacing`
    fn check_hierarchy(
        &self,
        parent: NodeId,
        child: NodeId,
        replacing: Option<NodeId>,
    ) -> Result<()> {
        let parent_kind = self.get(parent).kind;
        let child_kind = self.get(child).kind;

        if !parent_kind.is_container() {
            return Err(Error::state(format!("{} node cannot have children", parent_kind)));
        }
        if matches!(child_kind, NodeKind::Document | NodeKind::Attribute) {
            return Err(Error::state(format!("{} node cannot be a child", child_kind)));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(Error::state("node is an ancestor of the new parent"));
        }
        if parent == DOCUMENT {
            match child_kind {
                NodeKind::Text | NodeKind::CData => {
                    return Err(Error::state("document cannot contain text"));
                }
                NodeKind::Element => {
                    if let Some(existing) = self.document_element() {
                        if existing != child && Some(existing) != replacing {
                            return Err(Error::state("document already has a root element"));
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn insert_at(&mut self, parent: NodeId, child: NodeId, index: Option<usize>) {
        self.detach(child);
        let children = &mut self.get_mut(parent).children;
        match index {
            Some(i) if i <= children.len() => children.insert(i, child),
            _ => children.push(child),
        }
        self.get_mut(child).parent = Some(parent);
    }

    fn snapshot(&self, id: NodeId) -> Snapshot {
        let node = self.get(id);
        let mut data = node.clone();
        data.parent = None;
        data.children.clear();
        data.attributes.clear();
        Snapshot {
            data,
            attributes: node.attributes.values().map(|&a| self.snapshot(a)).collect(),
            children: node.children.iter().map(|&c| self.snapshot(c)).collect(),
        }
    }

    fn materialize(&mut self, snapshot: &Snapshot, parent: Option<NodeId>) -> NodeId {
        let mut data = snapshot.data.clone();
        data.parent = parent;
        let id = self.push(data);
        for attr in &snapshot.attributes {
            let attr_id = self.materialize(attr, Some(id));
            let name = self.get(attr_id).name.clone().unwrap_or_default();
            self.get_mut(id).attributes.insert(name, attr_id);
        }
        for child in &snapshot.children {
            let child_id = self.materialize(child, Some(id));
            self.get_mut(id).children.push(child_id);
        }
        id
    }
}

/// Shared handle to a document tree
///
/// Arena slots are never reused: nodes that are removed, replaced or created
/// and left detached keep their storage until the last handle to the tree is
/// dropped. A long-lived tree that is rewritten repeatedly grows with every
/// edit; [`XDoc::deep_clone`](crate::XDoc::deep_clone) of its root produces a
/// compact copy.
#[derive(Clone)]
pub struct Tree {
    id: TreeId,
    inner: Rc<RefCell<TreeData>>,
}

impl Tree {
    /// Create a tree holding only a document node
    pub fn new() -> Self {
        Self {
            id: TreeId(NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed)),
            inner: Rc::new(RefCell::new(TreeData::new())),
        }
    }

    /// Identity of this tree
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Check whether two handles refer to the same tree
    pub fn ptr_eq(&self, other: &Tree) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn with<R>(&self, f: impl FnOnce(&TreeData) -> R) -> R {
        f(&self.inner.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut TreeData) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }

    pub(crate) fn data<R>(&self, id: NodeId, f: impl FnOnce(&NodeData) -> R) -> R {
        f(self.inner.borrow().get(id))
    }

    pub(crate) fn node(&self, id: NodeId) -> Node {
        Node::new(self.clone(), id)
    }

    fn own(&self, node: &Node) -> Result<NodeId> {
        if node.tree_id() == self.id {
            Ok(node.id())
        } else {
            Err(Error::argument("node belongs to another tree"))
        }
    }

    /// The document node
    pub fn document(&self) -> Node {
        self.node(DOCUMENT)
    }

    /// The top-level element, if one has been appended
    pub fn document_element(&self) -> Option<Node> {
        self.with(|t| t.document_element()).map(|id| self.node(id))
    }

    /// Create a detached element
    pub fn create_element(&self, name: &str, namespace: Option<&str>) -> Node {
        let id = self.with_mut(|t| t.push(NodeData::element(name, namespace)));
        self.node(id)
    }

    /// Create a detached text node
    pub fn create_text(&self, value: &str) -> Node {
        self.create_character_data(NodeKind::Text, value)
    }

    /// Create a detached CDATA section
    pub fn create_cdata(&self, value: &str) -> Node {
        self.create_character_data(NodeKind::CData, value)
    }

    /// Create a detached comment
    pub fn create_comment(&self, value: &str) -> Node {
        self.create_character_data(NodeKind::Comment, value)
    }

    fn create_character_data(&self, kind: NodeKind, value: &str) -> Node {
        let id = self.with_mut(|t| t.push(NodeData::character_data(kind, value)));
        self.node(id)
    }

    /// Append text or CDATA under `parent`
    ///
    /// When the last child of `parent` is of the same kind, `value` extends it
    /// instead of starting a new node, so adjacent runs stay one node as they
    /// would after a reparse. Returns the node holding the text.
    pub fn append_character_data(&self, parent: &Node, kind: NodeKind, value: &str) -> Result<Node> {
        if !matches!(kind, NodeKind::Text | NodeKind::CData) {
            return Err(Error::argument(format!("{} is not character data", kind)));
        }
        let parent_id = self.own(parent)?;
        let last = self.with(|t| {
            t.get(parent_id)
                .children
                .last()
                .copied()
                .filter(|&child| t.get(child).kind == kind)
        });
        if let Some(id) = last {
            self.with_mut(|t| {
                t.get_mut(id)
                    .value
                    .get_or_insert_with(String::new)
                    .push_str(value)
            });
            return Ok(self.node(id));
        }
        let node = self.create_character_data(kind, value);
        self.append_child(parent, &node)?;
        Ok(node)
    }

    /// Append `child` as the last child of `parent`, moving it if attached
    pub fn append_child(&self, parent: &Node, child: &Node) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` before `reference`, or append it when `reference` is None
    pub fn insert_before(&self, parent: &Node, child: &Node, reference: Option<&Node>) -> Result<()> {
        let parent = self.own(parent)?;
        let child = self.own(child)?;
        let reference = reference.map(|r| self.own(r)).transpose()?;

        self.with_mut(|t| {
            t.check_hierarchy(parent, child, None)?;
            if let Some(reference) = reference {
                if t.get(reference).parent != Some(parent) || t.get(reference).kind == NodeKind::Attribute {
                    return Err(Error::argument("reference is not a child of parent"));
                }
                if reference == child {
                    return Ok(());
                }
            }
            t.detach(child);
            let index = reference.and_then(|r| t.position(parent, r));
            t.insert_at(parent, child, index);
            Ok(())
        })
    }

    /// Remove `child` from the child list of `parent`
    pub fn remove_child(&self, parent: &Node, child: &Node) -> Result<()> {
        let parent = self.own(parent)?;
        let child = self.own(child)?;
        self.with_mut(|t| {
            if t.position(parent, child).is_none() {
                return Err(Error::argument("node is not a child of parent"));
            }
            t.detach(child);
            Ok(())
        })
    }

    /// Put `new_child` in the place of `old_child`
    pub fn replace_child(&self, parent: &Node, new_child: &Node, old_child: &Node) -> Result<()> {
        let parent = self.own(parent)?;
        let new_child = self.own(new_child)?;
        let old_child = self.own(old_child)?;
        if new_child == old_child {
            return Ok(());
        }
        self.with_mut(|t| {
            if t.position(parent, old_child).is_none() {
                return Err(Error::argument("node is not a child of parent"));
            }
            t.check_hierarchy(parent, new_child, Some(old_child))?;
            t.detach(new_child);
            // Detaching may have shifted the old child's position
            let index = t.position(parent, old_child);
            t.detach(old_child);
            t.insert_at(parent, new_child, index);
            Ok(())
        })
    }

    /// Deep-copy a node of any tree (including this one) into this tree
    ///
    /// The copy is detached. Document nodes cannot be imported.
    pub fn import_node(&self, node: &Node) -> Result<Node> {
        if node.kind() == NodeKind::Document {
            return Err(Error::argument("cannot import a document node"));
        }
        // The source borrow ends before the target is borrowed mutably
        let snapshot = node.tree().with(|t| t.snapshot(node.id()));
        let id = self.with_mut(|t| t.materialize(&snapshot, None));
        Ok(self.node(id))
    }

    /// Create or overwrite an attribute of an element
    pub fn set_attribute(
        &self,
        element: &Node,
        name: &str,
        namespace: Option<&str>,
        value: &str,
    ) -> Result<Node> {
        let element = self.own(element)?;
        let id = self.with_mut(|t| {
            if t.get(element).kind != NodeKind::Element {
                return Err(Error::state(format!(
                    "{} node cannot have attributes",
                    t.get(element).kind
                )));
            }
            let mut data = NodeData::attribute(name, namespace, value);
            data.parent = Some(element);
            if let Some(&existing) = t.get(element).attributes.get(name) {
                let slot = t.get_mut(existing);
                slot.value = data.value;
                slot.namespace = data.namespace;
                return Ok(existing);
            }
            let id = t.push(data);
            t.get_mut(element).attributes.insert(name.to_string(), id);
            Ok(id)
        })?;
        Ok(self.node(id))
    }

    /// Remove an attribute by qualified name, returning the detached node
    pub fn remove_attribute(&self, element: &Node, name: &str) -> Result<Option<Node>> {
        let element = self.own(element)?;
        let removed = self.with_mut(|t| {
            let removed = t.get_mut(element).attributes.shift_remove(name);
            if let Some(attr) = removed {
                t.get_mut(attr).parent = None;
            }
            removed
        });
        Ok(removed.map(|id| self.node(id)))
    }

    /// Overwrite the value of a text, CDATA, comment or attribute node
    pub fn set_value(&self, node: &Node, value: &str) -> Result<()> {
        let id = self.own(node)?;
        self.with_mut(|t| {
            let data = t.get_mut(id);
            if !data.kind.has_value() {
                return Err(Error::state(format!("{} node has no value", data.kind)));
            }
            data.value = Some(value.to_string());
            Ok(())
        })
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("id", &self.id)
            .field("nodes", &self.inner.borrow().nodes.len())
            .finish()
    }
}
