//! Immutable node selections

use std::fmt;
use std::rc::Rc;

use crate::dom::node::Node;

/// An ordered, non-empty list of nodes with a current position
///
/// The node list is shared between copies; moving the position or replacing a
/// member produces a new value and never touches the shared list.
#[derive(Clone)]
pub struct Selection {
    nodes: Rc<[Node]>,
    index: usize,
}

impl Selection {
    /// Create a selection positioned at `index`
    ///
    /// Returns `None` for an empty list or an out-of-range index.
    pub fn new(nodes: Vec<Node>, index: usize) -> Option<Self> {
        if index >= nodes.len() {
            return None;
        }
        Some(Self {
            nodes: nodes.into(),
            index,
        })
    }

    /// Create a selection of a single node
    pub fn single(node: Node) -> Self {
        Self {
            nodes: Rc::from(vec![node]),
            index: 0,
        }
    }

    /// The node at the current position
    pub fn current(&self) -> &Node {
        &self.nodes[self.index]
    }

    /// Current position
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of selected nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false; selections hold at least one node
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All selected nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The same nodes positioned at `index`
    pub fn at(&self, index: usize) -> Option<Self> {
        (index < self.nodes.len()).then(|| Self {
            nodes: Rc::clone(&self.nodes),
            index,
        })
    }

    /// The same nodes positioned at the next member
    pub fn next(&self) -> Option<Self> {
        self.at(self.index + 1)
    }

    /// A new selection whose current member is replaced by `node`
    pub fn with_current(&self, node: Node) -> Self {
        let mut nodes = self.nodes.to_vec();
        nodes[self.index] = node;
        Self {
            nodes: nodes.into(),
            index: self.index,
        }
    }

    /// Check whether two selections share storage and position
    pub fn ptr_eq(&self, other: &Selection) -> bool {
        Rc::ptr_eq(&self.nodes, &other.nodes) && self.index == other.index
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("nodes", &self.nodes)
            .field("index", &self.index)
            .finish()
    }
}
