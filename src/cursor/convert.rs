//! Reading values and names back out of a cursor
//!
//! Value readers never fail: the empty cursor and unparsable contents read as
//! `None` (or `""` for [`contents`](XDoc::contents)). Name accessors report an
//! empty cursor as [`Error::Empty`](crate::Error::Empty).

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};

use super::XDoc;
use crate::dom::node::{Node, NodeKind};
use crate::dom::writer::{write, write_children, WriteOptions};
use crate::error::Result;
use crate::values::parse_timestamp;

lazy_static::lazy_static! {
    /// Lexical forms accepted by [`XDoc::as_bool`]
    static ref BOOLEAN_MAP: HashMap<&'static str, bool> = {
        let mut m = HashMap::new();
        m.insert("false", false);
        m.insert("0", false);
        m.insert("true", true);
        m.insert("1", true);
        m
    };
}

impl XDoc {
    /// Contents of the current node
    ///
    /// An element whose only child is text or CDATA yields that text; text,
    /// CDATA and attribute nodes yield their value; anything else yields the
    /// markup of its children.
    pub fn contents(&self) -> String {
        let Some(current) = self.as_node() else {
            return String::new();
        };
        if current.kind().is_textual() {
            return current.value().unwrap_or_default();
        }
        if current.kind() == NodeKind::Element && current.child_count() == 1 {
            if let Some(child) = current.first_child().filter(is_text_node) {
                return child.value().unwrap_or_default();
            }
        }
        write_children(&current).unwrap_or_else(|e| {
            log::warn!("failed to serialize contents: {}", e);
            String::new()
        })
    }

    /// Leading text of the current node
    ///
    /// For an element, the text and CDATA children up to the first other
    /// child, concatenated; a childless element yields `""` and an element
    /// whose only child is not text yields `None`. Other nodes yield their
    /// value if they are text, CDATA or attributes.
    pub fn as_text(&self) -> Option<String> {
        let current = self.as_node()?;
        if current.kind() != NodeKind::Element {
            return current.kind().is_textual().then(|| current.value()).flatten();
        }

        let children = current.children();
        if let [only] = children.as_slice() {
            return is_text_node(only).then(|| only.value()).flatten();
        }
        Some(
            children
                .iter()
                .take_while(|child| is_text_node(child))
                .filter_map(Node::value)
                .collect(),
        )
    }

    /// Text of the current node and all its descendants
    pub fn as_inner_text(&self) -> Option<String> {
        self.as_node().map(|node| match node.kind() {
            NodeKind::Document | NodeKind::Element => node.text_content(),
            _ => node.value().unwrap_or_default(),
        })
    }

    /// Parse the trimmed contents
    pub fn as_value<T: FromStr>(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.contents().trim().parse().ok()
    }

    /// Contents as a boolean (`true`, `false`, `1` or `0`)
    pub fn as_bool(&self) -> Option<bool> {
        if self.is_empty() {
            return None;
        }
        BOOLEAN_MAP.get(self.contents().trim()).copied()
    }

    /// Contents as an `i8`
    pub fn as_i8(&self) -> Option<i8> {
        self.as_value()
    }

    /// Contents as an `i16`
    pub fn as_i16(&self) -> Option<i16> {
        self.as_value()
    }

    /// Contents as an `i32`
    pub fn as_i32(&self) -> Option<i32> {
        self.as_value()
    }

    /// Contents as an `i64`
    pub fn as_i64(&self) -> Option<i64> {
        self.as_value()
    }

    /// Contents as an `f32`
    pub fn as_f32(&self) -> Option<f32> {
        self.as_value()
    }

    /// Contents as an `f64`
    pub fn as_f64(&self) -> Option<f64> {
        self.as_value()
    }

    /// Contents as a timestamp
    ///
    /// Accepts the format written by the builder and RFC 3339.
    pub fn as_date(&self) -> Option<DateTime<FixedOffset>> {
        if self.is_empty() {
            return None;
        }
        parse_timestamp(&self.contents())
    }

    /// Name of the current node
    ///
    /// Elements and attributes report their qualified name; other kinds
    /// report `#document`, `#text`, `#cdata-section` or `#comment`.
    pub fn name(&self) -> Result<String> {
        let current = self.current()?;
        Ok(current.name().unwrap_or_else(|| {
            match current.kind() {
                NodeKind::Document => "#document",
                NodeKind::CData => "#cdata-section",
                NodeKind::Comment => "#comment",
                _ => "#text",
            }
            .to_string()
        }))
    }

    /// Namespace URI of the current node
    pub fn namespace_uri(&self) -> Result<Option<String>> {
        Ok(self.current()?.namespace_uri())
    }

    /// Prefix of the current node's name
    pub fn prefix(&self) -> Result<Option<String>> {
        Ok(self.current()?.prefix())
    }

    /// Check the name of the current node
    pub fn has_name(&self, name: &str) -> bool {
        self.name().map_or(false, |n| n == name)
    }

    /// Check the name and namespace of the current node
    pub fn has_name_ns(&self, name: &str, namespace: Option<&str>) -> bool {
        self.has_name(name)
            && self
                .namespace_uri()
                .map_or(false, |ns| ns.as_deref() == namespace)
    }

    /// Check whether the current node has an attribute with this qualified name
    pub fn has_attr(&self, name: &str) -> bool {
        self.as_node()
            .map_or(false, |node| node.attribute(name).is_some())
    }

    /// Check whether the current node has an attribute with this local name and namespace
    pub fn has_attr_ns(&self, local_name: &str, namespace: Option<&str>) -> bool {
        self.as_node()
            .map_or(false, |node| node.attribute_ns(local_name, namespace).is_some())
    }

    /// Check whether the current node is text or CDATA
    pub fn is_text(&self) -> bool {
        self.as_node().map_or(false, |node| is_text_node(&node))
    }

    /// Markup of the subtree under the root
    ///
    /// The XML declaration is only written for the document element (or the
    /// document itself). Serialization failures yield an empty string.
    pub fn to_xml_string(&self, declaration: bool) -> String {
        let Ok(root) = self.root_node() else {
            return String::new();
        };
        let options = WriteOptions::compact().with_declaration(declaration && is_top_level(&root));
        render(&root, &options)
    }

    /// Indented markup of the subtree under the root, with the XML declaration
    pub fn to_pretty_string(&self) -> String {
        match self.root_node() {
            Ok(root) => render(&root, &WriteOptions::pretty()),
            Err(_) => String::new(),
        }
    }
}

fn render(root: &Node, options: &WriteOptions) -> String {
    write(root, options).unwrap_or_else(|e| {
        log::warn!("failed to serialize document: {}", e);
        String::new()
    })
}

fn is_text_node(node: &Node) -> bool {
    matches!(node.kind(), NodeKind::Text | NodeKind::CData)
}

fn is_top_level(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Document => true,
        _ => node
            .parent()
            .map_or(false, |parent| parent.kind() == NodeKind::Document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::tree::Tree;
    use chrono::{Datelike, Timelike};

    fn with_cdata() -> XDoc {
        let tree = Tree::new();
        let root = tree.create_element("test", None);
        tree.append_child(&tree.document(), &root).unwrap();
        let x = tree.create_element("x", None);
        tree.append_child(&root, &x).unwrap();
        let cdata = tree.create_cdata("blah");
        tree.append_child(&x, &cdata).unwrap();
        XDoc::from_tree(tree).unwrap()
    }

    #[test]
    fn test_contents() {
        let mut doc = XDoc::new("test").unwrap();
        doc.value("<tag>text</tag>").unwrap();
        assert_eq!(doc.contents(), "<tag>text</tag>");

        let doc = XDoc::load("<a>x<b>y</b></a>");
        assert_eq!(doc.contents(), "x<b>y</b>");
        assert_eq!(doc.at("b").contents(), "y");
        assert_eq!(XDoc::EMPTY.contents(), "");
    }

    #[test]
    fn test_as_text() {
        let mut doc = XDoc::new("test").unwrap();
        assert_eq!(doc.at("foo").as_text(), None);
        doc.elem_value("aaa", "1").unwrap().elem("zzz").unwrap();
        assert_eq!(doc.at("zzz").as_text().as_deref(), Some(""));
        // Stops at the first element child
        assert_eq!(doc.as_text().as_deref(), Some(""));
        assert_eq!(XDoc::load("<a><b/></a>").as_text(), None);

        let doc = XDoc::load("<a>one<![CDATA[two]]><b/>three</a>");
        assert_eq!(doc.as_text().as_deref(), Some("onetwo"));
    }

    #[test]
    fn test_as_text_on_cdata() {
        let doc = with_cdata();
        assert_eq!(doc.at("x").as_text().as_deref(), Some("blah"));
        assert_eq!(doc.at("x").at_index(0).as_text().as_deref(), Some("blah"));
        assert!(doc.at("x").at_index(0).is_text());
    }

    #[test]
    fn test_as_inner_text() {
        let mut doc = XDoc::new("test").unwrap();
        for i in 1..=5 {
            doc.elem_value("a", i).unwrap();
        }
        assert_eq!(doc.as_inner_text().as_deref(), Some("12345"));
        assert_eq!(XDoc::EMPTY.as_inner_text(), None);
    }

    #[test]
    fn test_typed_converters() {
        let doc = XDoc::load(r#"<r b="true" n=" 42 " f="2.5" big="300"><d>2024-05-01T12:30:00+0100</d></r>"#);
        assert_eq!(doc.at("@b").as_bool(), Some(true));
        assert_eq!(doc.at("@n").as_i32(), Some(42));
        assert_eq!(doc.at("@n").as_i64(), Some(42));
        assert_eq!(doc.at("@big").as_i8(), None);
        assert_eq!(doc.at("@big").as_i16(), Some(300));
        assert_eq!(doc.at("@f").as_f64(), Some(2.5));
        assert_eq!(doc.at("@f").as_f32(), Some(2.5));
        assert_eq!(doc.at("@f").as_bool(), None);
        assert_eq!(doc.at("@missing").as_i32(), None);

        let date = doc.at("d").as_date().unwrap();
        assert_eq!((date.year(), date.hour()), (2024, 12));
        assert_eq!(date.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_names() {
        let doc = XDoc::load(r#"<x:r xmlns:x="urn:x" x:a="1">t<!--c--></x:r>"#);
        assert_eq!(doc.name().unwrap(), "x:r");
        assert_eq!(doc.prefix().unwrap().as_deref(), Some("x"));
        assert!(doc.has_name_ns("x:r", Some("urn:x")));
        assert!(doc.has_attr("x:a"));
        assert!(doc.has_attr_ns("a", Some("urn:x")));
        assert!(!doc.has_attr("a"));
        assert_eq!(doc.at_index(0).name().unwrap(), "#text");
        assert_eq!(doc.at_index(1).name().unwrap(), "#comment");
        assert!(matches!(XDoc::EMPTY.name(), Err(crate::Error::Empty)));
        assert!(XDoc::EMPTY.namespace_uri().is_err());
        assert!(!XDoc::EMPTY.has_name("x"));
    }

    #[test]
    fn test_declaration_only_at_top() {
        let doc = XDoc::load("<a><b/></a>");
        assert_eq!(
            doc.to_xml_string(true),
            r#"<?xml version="1.0" encoding="UTF-8"?><a><b/></a>"#
        );
        assert_eq!(doc.at("b").to_xml_string(true), "<b/>");
        assert_eq!(XDoc::EMPTY.to_xml_string(true), "");
    }

    #[test]
    fn test_pretty_string() {
        let doc = XDoc::load("<a><b/></a>");
        let pretty = doc.to_pretty_string();
        assert!(pretty.starts_with("<?xml"));
        assert!(pretty.contains("\n    <b/>"));
    }
}
