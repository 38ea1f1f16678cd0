//! Navigation: path lookup and selection stepping
//!
//! Every operation here returns a new cursor and never fails; a miss is the
//! empty cursor. The root of each result is its selected node.

use super::{Selection, XDoc};
use crate::dom::node::{Node, NodeKind};
use crate::names::is_simple_path;
use crate::xpath;

impl XDoc {
    /// Select by path
    ///
    /// A path of ASCII letters, digits, `.` and `-` (optionally starting with
    /// `@`) is looked up directly among the children or attributes of the
    /// current node, matching the qualified name exactly. Anything else is
    /// evaluated as a query against the root, as [`at_path`](Self::at_path).
    pub fn at(&self, path: &str) -> XDoc {
        if !is_simple_path(path) {
            return self.at_path(path);
        }
        let Some(current) = self.as_node() else {
            return XDoc::EMPTY;
        };

        let nodes = match path.strip_prefix('@') {
            Some(name) => current.attribute(name).into_iter().collect(),
            None => current
                .children()
                .into_iter()
                .filter(|child| {
                    child.kind() == NodeKind::Element && child.name().as_deref() == Some(path)
                })
                .collect(),
        };
        Self::select(nodes, 0)
    }

    /// Select by evaluating a path query with the root as context node
    ///
    /// Query errors are logged and yield the empty cursor.
    pub fn at_path(&self, path: &str) -> XDoc {
        let Some(state) = &self.state else {
            return XDoc::EMPTY;
        };
        if path.is_empty() {
            return XDoc::EMPTY;
        }
        match xpath::evaluate(&state.root, path) {
            Ok(nodes) => Self::select(nodes, 0),
            Err(e) => {
                log::debug!("path '{}' did not evaluate: {}", path, e);
                XDoc::EMPTY
            }
        }
    }

    /// Select all children of the root, positioned at `index` (0-based)
    pub fn at_index(&self, index: usize) -> XDoc {
        match &self.state {
            Some(state) => Self::select(state.root.children(), index),
            None => XDoc::EMPTY,
        }
    }

    /// Select a node of this cursor's tree
    ///
    /// Nodes of any other tree yield the empty cursor.
    pub fn at_node(&self, node: &Node) -> XDoc {
        match &self.state {
            Some(state) if state.root.same_tree(node) => XDoc::view(Selection::single(node.clone())),
            _ => XDoc::EMPTY,
        }
    }

    /// Select the child elements of the root
    pub fn elements(&self) -> XDoc {
        self.at_path("*")
    }

    /// The same selection positioned at its first member
    pub fn first(&self) -> XDoc {
        self.step(|selection| selection.at(0))
    }

    /// The same selection positioned at its next member
    pub fn next(&self) -> XDoc {
        self.step(Selection::next)
    }

    /// The parent element of the current node (the owner of an attribute)
    ///
    /// The document element has no parent element.
    pub fn parent(&self) -> XDoc {
        let Some(current) = self.as_node() else {
            return XDoc::EMPTY;
        };
        match current.parent() {
            Some(parent) if parent.kind() != NodeKind::Document => self.at_node(&parent),
            _ => XDoc::EMPTY,
        }
    }

    /// A cursor positioned at the root of this one
    pub fn root(&self) -> XDoc {
        match &self.state {
            Some(state) => XDoc::from_parts(
                Some(Selection::single(state.root.clone())),
                state.root.clone(),
            ),
            None => XDoc::EMPTY,
        }
    }

    /// Number of selected nodes
    ///
    /// A cursor positioned at the document node counts as one.
    pub fn len(&self) -> usize {
        match &self.state {
            None => 0,
            Some(state) => state.selection.as_ref().map_or(1, Selection::len),
        }
    }

    /// One cursor per selected node, in selection order
    pub fn to_list(&self) -> Vec<XDoc> {
        match self.state.as_ref().and_then(|s| s.selection.as_ref()) {
            Some(selection) => (0..selection.len())
                .filter_map(|i| selection.at(i))
                .map(XDoc::view)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Iterate over the selected nodes as cursors
    pub fn iter(&self) -> std::vec::IntoIter<XDoc> {
        self.to_list().into_iter()
    }

    fn step(&self, f: impl FnOnce(&Selection) -> Option<Selection>) -> XDoc {
        self.state
            .as_ref()
            .and_then(|s| s.selection.as_ref())
            .and_then(f)
            .map_or(XDoc::EMPTY, XDoc::view)
    }

    fn select(nodes: Vec<Node>, index: usize) -> XDoc {
        Selection::new(nodes, index).map_or(XDoc::EMPTY, XDoc::view)
    }
}

impl<'a> IntoIterator for &'a XDoc {
    type Item = XDoc;
    type IntoIter = std::vec::IntoIter<XDoc>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> XDoc {
        XDoc::load(r#"<doc a="1">Hello <bold>World</bold>!<bold>Cool</bold><struct><name>John</name></struct></doc>"#)
    }

    #[test]
    fn test_simple_lookup() {
        let doc = sample();
        assert_eq!(doc.at("bold").len(), 2);
        assert_eq!(doc.at("@a").contents(), "1");
        assert!(doc.at("missing").is_empty());
        assert!(doc.at("@missing").is_empty());
        assert!(doc.at("").is_empty());
        assert!(doc.at("@").is_empty());
    }

    #[test]
    fn test_simple_lookup_uses_current_node() {
        let mut doc = sample();
        doc.start("bold").unwrap();
        // The new, empty element is current; lookups start there
        assert!(doc.at("bold").is_empty());
        // Queries still start at the root
        assert_eq!(doc.at("bold[1]").contents(), "World");
    }

    #[test]
    fn test_query_lookup() {
        let doc = sample();
        assert_eq!(doc.at("bold[2]").contents(), "Cool");
        assert_eq!(doc.at("struct/name").contents(), "John");
        assert!(doc.at("bold[").is_empty());
    }

    #[test]
    fn test_index_lookup() {
        let doc = sample();
        assert_eq!(doc.at_index(3).contents(), "Cool");
        assert_eq!(doc.at_index(3).len(), 5);
        assert!(doc.at_index(5).is_empty());
        assert!(XDoc::EMPTY.at_index(0).is_empty());
    }

    #[test]
    fn test_node_lookup_checks_tree() {
        let doc = sample();
        let other = sample();
        let node = other.at("struct").as_node().unwrap();
        assert!(doc.at_node(&node).is_empty());
        let own = doc.at("struct").as_node().unwrap();
        assert_eq!(doc.at_node(&own).name().unwrap(), "struct");
    }

    #[test]
    fn test_first_and_next() {
        let bold = sample().at("bold");
        assert_eq!(bold.next().contents(), "Cool");
        assert!(bold.next().next().is_empty());
        assert_eq!(bold.next().first().contents(), "World");
    }

    #[test]
    fn test_parent() {
        let doc = sample();
        assert!(doc.parent().is_empty());
        assert_eq!(doc.at("struct/name").parent().name().unwrap(), "struct");
        assert_eq!(doc.at("@a").parent().name().unwrap(), "doc");
    }

    #[test]
    fn test_to_list_and_iter() {
        let doc = sample();
        let contents: Vec<String> = doc.at("bold").iter().map(|d| d.contents()).collect();
        assert_eq!(contents, vec!["World", "Cool"]);
        assert_eq!((&doc.elements()).into_iter().count(), 3);
        assert!(XDoc::EMPTY.to_list().is_empty());
    }

    #[test]
    fn test_navigation_roots_at_selection() {
        let doc = sample();
        let name = doc.at("struct").at("name");
        assert_eq!(name.to_string(), "<name>John</name>");
        assert_eq!(name.root().name().unwrap(), "name");
    }

    #[test]
    fn test_root_moves_while_clone_keeps_position() {
        let doc = sample();
        let bold = doc.at("bold");
        assert_eq!(bold.len(), 2);

        let copy = bold.clone();
        assert_eq!(copy.len(), 2);
        assert_eq!(copy.contents(), "World");

        let root = bold.root();
        assert_eq!(root.len(), 1);
        assert_eq!(root.contents(), "World");
        assert_eq!(bold.next().root().contents(), "Cool");
        assert_eq!(doc.root().name().unwrap(), "doc");
    }
}
