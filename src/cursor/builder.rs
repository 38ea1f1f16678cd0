//! Tree construction
//!
//! The builder walks the tree open/close style: [`start`](XDoc::start) appends
//! a child element and moves into it, [`end`](XDoc::end) moves back to the
//! parent. The chain of parent links is the only stack, and the cursor's root
//! is the floor `end` cannot go below.

use super::{Selection, XDoc};
use crate::dom::node::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::names::validate_qname;
use crate::namespaces::{XMLNS_NAMESPACE, XML_NAMESPACE};
use crate::values::Value;

/// Qualified name of the language attribute
const LANG_ATTRIBUTE: &str = "xml:lang";

impl XDoc {
    /// Append a new element under the current node and move into it
    pub fn start(&mut self, tag: &str) -> Result<&mut Self> {
        self.start_ns(tag, None)
    }

    /// Append a new element in `namespace` under the current node and move into it
    pub fn start_ns(&mut self, tag: &str, namespace: Option<&str>) -> Result<&mut Self> {
        let current = self.current()?;
        validate_qname(tag)?;
        let tree = current.tree();
        let element = tree.create_element(tag, namespace);
        tree.append_child(&current, &element)?;
        self.state_mut()?.selection = Some(Selection::single(element));
        Ok(self)
    }

    /// Set an attribute of the current element
    ///
    /// An absent value leaves the element untouched. `xml:` and `xmlns`
    /// names get their reserved namespaces.
    pub fn attr(&mut self, name: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        let Some(value) = value.into().render() else {
            return Ok(self);
        };
        validate_qname(name)?;
        if current.kind() != NodeKind::Element {
            return Err(Error::state("xdoc is not an element"));
        }
        current
            .tree()
            .set_attribute(&current, name, attribute_namespace(name), &value)?;
        Ok(self)
    }

    /// Append text to the current node
    ///
    /// Text directly following other text joins that node; empty text adds
    /// nothing.
    pub fn value(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        if let Some(text) = value.into().render().filter(|t| !t.is_empty()) {
            current
                .tree()
                .append_character_data(&current, NodeKind::Text, &text)?;
        }
        Ok(self)
    }

    /// Append an empty child element, staying at the current node
    pub fn elem(&mut self, tag: &str) -> Result<&mut Self> {
        self.start(tag)?.end()
    }

    /// Append a child element holding `value`, staying at the current node
    ///
    /// Nothing is added when the value is absent.
    pub fn elem_value(&mut self, tag: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let value = value.into();
        if value.is_absent() {
            self.current()?;
            return Ok(self);
        }
        self.start(tag)?.value(value)?.end()
    }

    /// Append a CDATA section to the current node
    ///
    /// A section directly following another one extends it.
    pub fn cdata(&mut self, text: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        if let Some(text) = text.into().render() {
            current
                .tree()
                .append_character_data(&current, NodeKind::CData, &text)?;
        }
        Ok(self)
    }

    /// Append a comment to the current node
    pub fn comment(&mut self, text: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        if let Some(text) = text.into().render() {
            let tree = current.tree();
            let node = tree.create_comment(&text);
            tree.append_child(&current, &node)?;
        }
        Ok(self)
    }

    /// Append a downlevel-hidden conditional comment wrapping the markup of `contents`
    ///
    /// The comment reads `[condition]>markup<![endif]`.
    pub fn conditional_comment(&mut self, condition: &str, contents: &XDoc) -> Result<&mut Self> {
        self.current()?;
        if condition.is_empty() {
            return Err(Error::argument("condition is empty"));
        }
        if contents.is_empty() {
            return Ok(self);
        }
        let text = format!("[{}]>{}<![endif]", condition, contents.to_xml_string(false));
        self.comment(text)
    }

    /// Move to the parent of the current node
    ///
    /// Fails when the current node is the root of this cursor.
    pub fn end(&mut self) -> Result<&mut Self> {
        let current = self.current()?;
        if current == self.root_node()? {
            return Err(Error::state("xdoc is at root position"));
        }
        let parent = current
            .parent()
            .ok_or_else(|| Error::state("xdoc is at root position"))?;
        let state = self.state_mut()?;
        state.selection = match parent.kind() {
            NodeKind::Document => None,
            _ => Some(Selection::single(parent)),
        };
        Ok(self)
    }

    /// Move up until `marker` is the current node
    pub fn end_at(&mut self, marker: &Node) -> Result<&mut Self> {
        while self.current()? != *marker {
            self.end()?;
        }
        Ok(self)
    }

    /// Move up to the root of this cursor
    pub fn end_all(&mut self) -> Result<&mut Self> {
        let root = self.root_node()?;
        self.end_at(&root)
    }

    /// Replace the value of the current node
    ///
    /// An element loses its text and CDATA children and gets `value` as a new
    /// text child; text, CDATA and attribute nodes are overwritten in place.
    pub fn replace_value(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        let current = self.current()?;
        let text = value
            .into()
            .render()
            .ok_or_else(|| Error::argument("value is absent"))?;
        let tree = current.tree();
        match current.kind() {
            NodeKind::Element => {
                for child in current.children() {
                    if matches!(child.kind(), NodeKind::Text | NodeKind::CData) {
                        tree.remove_child(&current, &child)?;
                    }
                }
                let node = tree.create_text(&text);
                tree.append_child(&current, &node)?;
            }
            NodeKind::Text | NodeKind::CData | NodeKind::Attribute => tree.set_value(&current, &text)?,
            _ => return Err(Error::state("xdoc has no value")),
        }
        Ok(self)
    }

    /// The `xml:lang` attribute of the current node
    pub fn language(&self) -> Option<String> {
        self.as_node()
            .and_then(|node| node.attribute(LANG_ATTRIBUTE))
            .and_then(|attr| attr.value())
    }

    /// Set or, with `None`, remove the `xml:lang` attribute of the current element
    pub fn set_language(&mut self, language: Option<&str>) -> Result<&mut Self> {
        match language {
            Some(language) => self.attr(LANG_ATTRIBUTE, language),
            None => self.remove_attr(LANG_ATTRIBUTE),
        }
    }
}

/// Reserved namespace of an attribute name, if any
fn attribute_namespace(name: &str) -> Option<&'static str> {
    if name.starts_with("xml:") {
        Some(XML_NAMESPACE)
    } else if name == "xmlns" || name.starts_with("xmlns:") {
        Some(XMLNS_NAMESPACE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    #[test]
    fn test_build_nested() {
        let mut doc = XDoc::new("doc").unwrap();
        doc.attr("source", "http://budjb.com")
            .unwrap()
            .value("Hello ")
            .unwrap()
            .start("bold")
            .unwrap()
            .attr("style", "blinking")
            .unwrap()
            .value("World")
            .unwrap()
            .end()
            .unwrap()
            .value("!")
            .unwrap()
            .elem("br")
            .unwrap();
        assert_eq!(
            doc.to_string(),
            r#"<doc source="http://budjb.com">Hello <bold style="blinking">World</bold>!<br/></doc>"#
        );
    }

    #[test]
    fn test_absent_values_are_skipped() {
        let mut doc = XDoc::new("doc").unwrap();
        doc.attr("a", None::<&str>)
            .unwrap()
            .value(None::<String>)
            .unwrap()
            .elem_value("e", None::<i32>)
            .unwrap()
            .cdata(None::<&str>)
            .unwrap();
        assert_eq!(doc.to_string(), "<doc/>");
    }

    #[test]
    fn test_adjacent_text_joins_and_empty_text_is_skipped() {
        let mut doc = XDoc::new("doc").unwrap();
        doc.value("a")
            .unwrap()
            .value("b")
            .unwrap()
            .elem_value("e", "")
            .unwrap()
            .value("")
            .unwrap()
            .cdata("x")
            .unwrap()
            .cdata("y")
            .unwrap();

        let root = doc.as_node().unwrap();
        assert_eq!(root.child_count(), 3);
        assert_eq!(doc.to_string(), "<doc>ab<e/><![CDATA[xy]]></doc>");
        assert_eq!(XDoc::load(&doc.to_string()), doc);
    }

    #[test]
    fn test_typed_values() {
        let ts = FixedOffset::east_opt(3600)
            .unwrap()
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .unwrap();
        let mut doc = XDoc::new("doc").unwrap();
        doc.attr("n", 42)
            .unwrap()
            .attr("b", true)
            .unwrap()
            .elem_value("at", ts)
            .unwrap()
            .elem_value("f", 1.5)
            .unwrap();
        assert_eq!(
            doc.to_string(),
            r#"<doc n="42" b="true"><at>2024-05-01T12:30:00+0100</at><f>1.5</f></doc>"#
        );
    }

    #[test]
    fn test_attribute_overwrite_and_namespace() {
        let mut doc = XDoc::new("doc").unwrap();
        doc.attr("a", "1").unwrap().attr("a", "2").unwrap();
        doc.attr("xml:lang", "en").unwrap();
        assert_eq!(doc.at("@a").contents(), "2");
        assert_eq!(
            doc.at("@xml:lang").as_node().unwrap().namespace_uri().as_deref(),
            Some(XML_NAMESPACE)
        );
        assert!(matches!(doc.attr("a b", "x"), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_attr_on_text_fails() {
        let doc = XDoc::load("<a>text</a>");
        let mut text = doc.at_index(0);
        assert!(matches!(text.attr("x", "1"), Err(Error::InvalidState(_))));
    }

    #[test]
    fn test_end_at_root_fails() {
        let mut doc = XDoc::new("doc").unwrap();
        let err = doc.end().unwrap_err();
        assert_eq!(err.to_string(), "xdoc is at root position");

        let mut nested = doc.at_path("/doc");
        nested.start("a").unwrap().end().unwrap();
        assert!(nested.end().is_err());
    }

    #[test]
    fn test_end_at_marker() {
        let mut doc = XDoc::new("doc").unwrap();
        doc.start("a").unwrap();
        let marker = doc.as_node().unwrap();
        doc.start("b").unwrap().start("c").unwrap();
        doc.end_at(&marker).unwrap();
        assert_eq!(doc.name().unwrap(), "a");
        doc.end_all().unwrap();
        assert_eq!(doc.name().unwrap(), "doc");
    }

    #[test]
    fn test_end_at_foreign_marker_fails() {
        let mut doc = XDoc::new("doc").unwrap();
        let other = XDoc::new("other").unwrap().as_node().unwrap();
        doc.start("a").unwrap();
        let err = doc.end_at(&other).unwrap_err();
        assert_eq!(err.to_string(), "xdoc is at root position");
    }

    #[test]
    fn test_builder_on_empty_fails() {
        let mut empty = XDoc::EMPTY;
        assert!(matches!(empty.start("a"), Err(Error::Empty)));
        assert!(matches!(empty.value("a"), Err(Error::Empty)));
        assert!(matches!(empty.end(), Err(Error::Empty)));
    }

    #[test]
    fn test_conditional_comment() {
        let mut doc = XDoc::new("head").unwrap();
        let link = XDoc::load(r#"<link href="ie.css"/>"#);
        doc.conditional_comment("if IE", &link).unwrap();
        assert_eq!(
            doc.to_string(),
            r#"<head><!--[if IE]><link href="ie.css"/><![endif]--></head>"#
        );
        assert!(matches!(
            doc.conditional_comment("", &link),
            Err(Error::InvalidArgument(_))
        ));
        doc.conditional_comment("if IE", &XDoc::EMPTY).unwrap();
        assert_eq!(doc.at_path("comment()").len(), 1);
    }

    #[test]
    fn test_replace_value() {
        let mut doc = XDoc::load("<a>one<![CDATA[two]]><b/>three</a>");
        doc.replace_value("new").unwrap();
        assert_eq!(doc.to_string(), "<a><b/>new</a>");

        let mut attr = XDoc::load(r#"<a x="1"/>"#).at("@x");
        attr.replace_value(2).unwrap();
        assert_eq!(attr.root().parent().to_string(), r#"<a x="2"/>"#);

        let mut comment = XDoc::load("<a><!--c--></a>").at_index(0);
        assert_eq!(
            comment.replace_value("x").unwrap_err().to_string(),
            "xdoc has no value"
        );
    }

    #[test]
    fn test_language() {
        let mut doc = XDoc::new("doc").unwrap();
        assert_eq!(doc.language(), None);
        doc.set_language(Some("en")).unwrap();
        assert_eq!(doc.language().as_deref(), Some("en"));
        assert_eq!(doc.to_string(), r#"<doc xml:lang="en"/>"#);
        doc.set_language(None).unwrap();
        assert_eq!(doc.to_string(), "<doc/>");
    }
}
