//! XML node representation
//!
//! Node data lives in a per-tree arena and is addressed by [`NodeId`]. The
//! public [`Node`] handle pairs an id with its owning [`Tree`], so every handle
//! carries the identity of the tree it belongs to.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::Serialize;

use super::tree::{Tree, TreeId};
use crate::names::split_qname;

/// Compact node identifier (index into the tree arena)
pub type NodeId = usize;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Attribute node
    Attribute,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
}

impl NodeKind {
    /// Check if nodes of this kind carry a value
    pub fn has_value(self) -> bool {
        matches!(
            self,
            NodeKind::Attribute | NodeKind::Text | NodeKind::CData | NodeKind::Comment
        )
    }

    /// Check if nodes of this kind carry a name and namespace
    pub fn has_name(self) -> bool {
        matches!(self, NodeKind::Element | NodeKind::Attribute)
    }

    /// Check if nodes of this kind may have children
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }

    /// Check if the value of this kind counts as plain text
    pub fn is_textual(self) -> bool {
        matches!(self, NodeKind::Text | NodeKind::CData | NodeKind::Attribute)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Document => "document",
            NodeKind::Element => "element",
            NodeKind::Attribute => "attribute",
            NodeKind::Text => "text",
            NodeKind::CData => "cdata",
            NodeKind::Comment => "comment",
        };
        write!(f, "{}", s)
    }
}

/// A node in the arena
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    /// Type of this node
    pub kind: NodeKind,
    /// Qualified name (elements and attributes)
    pub name: Option<String>,
    /// Namespace URI (elements and attributes)
    pub namespace: Option<String>,
    /// Value (text, CDATA, comments and attributes)
    pub value: Option<String>,
    /// Parent node; the owner element for attributes
    pub parent: Option<NodeId>,
    /// Child nodes in document order
    pub children: Vec<NodeId>,
    /// Attributes keyed by qualified name, in insertion order
    pub attributes: IndexMap<String, NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            name: None,
            namespace: None,
            value: None,
            parent: None,
            children: Vec::new(),
            attributes: IndexMap::new(),
        }
    }

    /// Create a document node
    pub fn document() -> Self {
        Self::new(NodeKind::Document)
    }

    /// Create an element node
    pub fn element(name: &str, namespace: Option<&str>) -> Self {
        Self {
            name: Some(name.to_string()),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            ..Self::new(NodeKind::Element)
        }
    }

    /// Create an attribute node
    pub fn attribute(name: &str, namespace: Option<&str>, value: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            namespace: namespace.filter(|ns| !ns.is_empty()).map(str::to_string),
            value: Some(value.to_string()),
            ..Self::new(NodeKind::Attribute)
        }
    }

    /// Create a text, CDATA or comment node
    pub fn character_data(kind: NodeKind, value: &str) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(kind)
        }
    }
}

/// Handle to a node of a [`Tree`]
///
/// Two handles are equal when they address the same node of the same tree.
#[derive(Clone)]
pub struct Node {
    tree: Tree,
    id: NodeId,
}

impl Node {
    pub(crate) fn new(tree: Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    /// The tree owning this node
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Identity of the owning tree
    pub fn tree_id(&self) -> TreeId {
        self.tree.id()
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    /// Check whether this node belongs to the same tree as `other`
    pub fn same_tree(&self, other: &Node) -> bool {
        self.tree_id() == other.tree_id()
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.tree.data(self.id, |n| n.kind)
    }

    /// Qualified name (elements and attributes)
    pub fn name(&self) -> Option<String> {
        self.tree.data(self.id, |n| n.name.clone())
    }

    /// Local part of the qualified name
    pub fn local_name(&self) -> Option<String> {
        self.name().map(|name| split_qname(&name).1.to_string())
    }

    /// Prefix of the qualified name, if any
    pub fn prefix(&self) -> Option<String> {
        self.name()
            .and_then(|name| split_qname(&name).0.map(str::to_string))
    }

    /// Namespace URI
    pub fn namespace_uri(&self) -> Option<String> {
        self.tree.data(self.id, |n| n.namespace.clone())
    }

    /// Value of text, CDATA, comment and attribute nodes
    pub fn value(&self) -> Option<String> {
        self.tree.data(self.id, |n| n.value.clone())
    }

    /// Parent node; the owner element for attributes
    pub fn parent(&self) -> Option<Node> {
        self.tree
            .data(self.id, |n| n.parent)
            .map(|id| self.tree.node(id))
    }

    /// Child nodes in document order
    pub fn children(&self) -> Vec<Node> {
        self.tree
            .data(self.id, |n| n.children.clone())
            .into_iter()
            .map(|id| self.tree.node(id))
            .collect()
    }

    /// Number of children
    pub fn child_count(&self) -> usize {
        self.tree.data(self.id, |n| n.children.len())
    }

    /// First child, if any
    pub fn first_child(&self) -> Option<Node> {
        self.tree
            .data(self.id, |n| n.children.first().copied())
            .map(|id| self.tree.node(id))
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> Vec<Node> {
        self.tree
            .data(self.id, |n| n.attributes.values().copied().collect::<Vec<_>>())
            .into_iter()
            .map(|id| self.tree.node(id))
            .collect()
    }

    /// Attribute by qualified name
    pub fn attribute(&self, name: &str) -> Option<Node> {
        self.tree
            .data(self.id, |n| n.attributes.get(name).copied())
            .map(|id| self.tree.node(id))
    }

    /// Attribute by local name and namespace URI
    pub fn attribute_ns(&self, local_name: &str, namespace: Option<&str>) -> Option<Node> {
        self.attributes().into_iter().find(|attr| {
            attr.local_name().as_deref() == Some(local_name)
                && attr.namespace_uri().as_deref() == namespace
        })
    }

    /// Concatenated text of all descendant text and CDATA nodes
    pub fn text_content(&self) -> String {
        self.tree.with(|t| t.text_content(self.id))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.tree_id() == other.tree_id()
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tree_id().hash(state);
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (kind, name) = self.tree.data(self.id, |n| (n.kind, n.name.clone()));
        match name {
            Some(name) => write!(f, "Node({} {} #{})", kind, name, self.id),
            None => write!(f, "Node({} #{})", kind, self.id),
        }
    }
}
