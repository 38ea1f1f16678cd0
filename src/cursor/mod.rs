//! The document cursor
//!
//! An [`XDoc`] is a view over a shared, mutable tree: a [`Selection`] of nodes
//! with a current position, plus a `root` that bounds building (`end`) and
//! anchors path queries and serialization. Navigation never fails; it
//! produces [`XDoc::EMPTY`] instead. Mutation through an empty cursor is an
//! error.
//!
//! ```
//! use xdoc::XDoc;
//!
//! let mut doc = XDoc::new("doc")?;
//! doc.attr("source", "http://example.com")?
//!     .start("item")?
//!     .value(42)?
//!     .end()?;
//!
//! assert_eq!(doc.at("item").as_i32(), Some(42));
//! assert_eq!(
//!     doc.to_string(),
//!     r#"<doc source="http://example.com"><item>42</item></doc>"#
//! );
//! # Ok::<(), xdoc::Error>(())
//! ```

mod builder;
mod convert;
mod equality;
mod insert;
mod mutate;
mod navigate;
pub mod selection;

use std::cell::Cell;
use std::fmt;

pub use selection::Selection;

use crate::dom::node::{Node, NodeKind};
use crate::dom::parser::parse_with_limits;
use crate::dom::tree::Tree;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::validate_qname;

/// Pattern for non-markup noise in front of the first tag
const LEADING_NOISE_PATTERN: &str = r"^\W+<";

lazy_static::lazy_static! {
    static ref LEADING_NOISE: regex::Regex = regex::Regex::new(LEADING_NOISE_PATTERN).unwrap();
}

/// Cursor over an XML tree
pub struct XDoc {
    state: Option<State>,
}

struct State {
    /// `None` while positioned at the document node
    selection: Option<Selection>,
    root: Node,
    exclusive: Cell<bool>,
}

impl XDoc {
    /// The empty cursor: no tree, no selection
    pub const EMPTY: XDoc = XDoc { state: None };

    /// The empty cursor
    pub fn empty() -> Self {
        Self::EMPTY
    }

    /// Create a document with a single root element
    pub fn new(tag: &str) -> Result<Self> {
        Self::new_ns(tag, None)
    }

    /// Create a document with a single root element in `namespace`
    ///
    /// An empty namespace is the same as none.
    pub fn new_ns(tag: &str, namespace: Option<&str>) -> Result<Self> {
        validate_qname(tag)?;
        let tree = Tree::new();
        let root = tree.create_element(tag, namespace);
        tree.append_child(&tree.document(), &root)?;
        Ok(Self::rooted(root))
    }

    /// Wrap an existing tree, positioned at its document element
    pub fn from_tree(tree: Tree) -> Result<Self> {
        let root = tree
            .document_element()
            .ok_or_else(|| Error::argument("tree does not have a root element"))?;
        Ok(Self::rooted(root))
    }

    /// Copy the current element of another cursor into a new tree
    pub fn from_cursor(other: &XDoc) -> Result<Self> {
        let node = other.as_node().ok_or_else(|| Error::argument("cursor is empty"))?;
        if node.kind() != NodeKind::Element {
            return Err(Error::argument(format!(
                "cannot create a document from a {} node",
                node.kind()
            )));
        }
        let tree = Tree::new();
        let copy = tree.import_node(&node)?;
        tree.append_child(&tree.document(), &copy)?;
        Ok(Self::rooted(copy))
    }

    /// Parse markup, returning the empty cursor on blank input or failure
    pub fn load(xml: &str) -> Self {
        Self::load_with_limits(xml, &Limits::default())
    }

    /// Parse markup under the given limits, returning the empty cursor on failure
    pub fn load_with_limits(xml: &str, limits: &Limits) -> Self {
        if xml.trim().is_empty() {
            return Self::EMPTY;
        }
        match Self::parse(xml, limits) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("failed to load XML: {}", e);
                Self::EMPTY
            }
        }
    }

    /// Parse markup, surfacing the parse error
    pub fn try_load(xml: &str) -> Result<Self> {
        Self::parse(xml, &Limits::default())
    }

    fn parse(xml: &str, limits: &Limits) -> Result<Self> {
        let xml = xml.trim();
        if xml.is_empty() {
            return Err(Error::Xml("input is blank".to_string()));
        }
        let xml = LEADING_NOISE.replace(xml, "<");
        let tree = parse_with_limits(&xml, limits)?;
        Self::from_tree(tree)
    }

    /// Combine the current nodes of several cursors into one selection
    ///
    /// Empty cursors are skipped; the nodes may belong to different trees.
    pub fn selection_of(docs: &[XDoc]) -> Self {
        let nodes: Vec<Node> = docs.iter().filter_map(XDoc::as_node).collect();
        match Selection::new(nodes, 0) {
            Some(selection) => Self::view(selection),
            None => Self::EMPTY,
        }
    }

    /// A cursor selecting only `root`
    fn rooted(root: Node) -> Self {
        Self::from_parts(Some(Selection::single(root.clone())), root)
    }

    /// A cursor whose root is the current node of `selection`
    pub(crate) fn view(selection: Selection) -> Self {
        let root = selection.current().clone();
        Self::from_parts(Some(selection), root)
    }

    pub(crate) fn from_parts(selection: Option<Selection>, root: Node) -> Self {
        Self {
            state: Some(State {
                selection,
                root,
                exclusive: Cell::new(false),
            }),
        }
    }

    fn state(&self) -> Result<&State> {
        self.state.as_ref().ok_or(Error::Empty)
    }

    fn state_mut(&mut self) -> Result<&mut State> {
        self.state.as_mut().ok_or(Error::Empty)
    }

    /// The node at the current position, or an error on the empty cursor
    pub(crate) fn current(&self) -> Result<Node> {
        self.as_node().ok_or(Error::Empty)
    }

    /// The root of this cursor
    pub(crate) fn root_node(&self) -> Result<Node> {
        Ok(self.state()?.root.clone())
    }

    /// The tree this cursor operates on
    pub fn tree(&self) -> Option<Tree> {
        self.state.as_ref().map(|s| s.root.tree().clone())
    }

    /// Check if this is the empty cursor
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
    }

    /// The node at the current position
    ///
    /// This is the document node while the cursor is positioned above the
    /// document element.
    pub fn as_node(&self) -> Option<Node> {
        self.state.as_ref().map(|state| match &state.selection {
            Some(selection) => selection.current().clone(),
            None => state.root.tree().document(),
        })
    }

    /// A cursor sharing this cursor's selection and root
    ///
    /// The exclusive flag is not copied.
    pub fn copy(&self) -> Self {
        match &self.state {
            Some(state) => Self::from_parts(state.selection.clone(), state.root.clone()),
            None => Self::EMPTY,
        }
    }

    /// Check whether two cursors share selection storage, position and root
    pub fn ptr_eq(a: &XDoc, b: &XDoc) -> bool {
        match (&a.state, &b.state) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                let same_selection = match (&a.selection, &b.selection) {
                    (None, None) => true,
                    (Some(x), Some(y)) => x.ptr_eq(y),
                    _ => false,
                };
                same_selection && a.root == b.root
            }
            _ => false,
        }
    }

    /// Mark the tree as owned by this cursor alone
    ///
    /// The next [`deep_clone`](Self::deep_clone) clears the mark and returns a
    /// shallow copy instead of copying the tree. Only a cursor rooted at the
    /// document element may be marked.
    pub fn set_exclusive(&mut self) -> Result<&mut Self> {
        if let Some(state) = &self.state {
            let at_top = state
                .root
                .parent()
                .map_or(false, |parent| parent.kind() == NodeKind::Document);
            if !at_top {
                return Err(Error::state("only the root node can be marked exclusive"));
            }
            state.exclusive.set(true);
        }
        Ok(self)
    }

    /// Check whether the exclusive mark is set
    pub fn is_exclusive(&self) -> bool {
        self.state.as_ref().map_or(false, |s| s.exclusive.get())
    }

    /// Copy the subtree under `root` into a new tree
    ///
    /// When the exclusive mark is set, it is cleared and a shallow copy of this
    /// cursor is returned instead.
    pub fn deep_clone(&self) -> Result<Self> {
        let Some(state) = &self.state else {
            return Ok(Self::EMPTY);
        };
        if state.exclusive.replace(false) {
            return Ok(self.copy());
        }

        let tree = Tree::new();
        let document = tree.document();
        match state.root.kind() {
            NodeKind::Document => {
                for child in state.root.children() {
                    let copy = tree.import_node(&child)?;
                    tree.append_child(&document, &copy)?;
                }
                Ok(Self::rooted(document))
            }
            NodeKind::Element => {
                let copy = tree.import_node(&state.root)?;
                tree.append_child(&document, &copy)?;
                Ok(Self::rooted(copy))
            }
            kind => Err(Error::state(format!("cannot clone a {} node", kind))),
        }
    }
}

impl Default for XDoc {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Clone for XDoc {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl fmt::Debug for XDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            None => write!(f, "XDoc(empty)"),
            Some(state) => f
                .debug_struct("XDoc")
                .field("selection", &state.selection)
                .field("root", &state.root)
                .field("exclusive", &state.exclusive.get())
                .finish(),
        }
    }
}

impl fmt::Display for XDoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml_string(false))
    }
}
