//! Path-addressed insertion
//!
//! [`XDoc::insert_value_at`] writes a value at a slash-separated path below the
//! current node, creating the elements along the way. A segment may carry a
//! 1-based index (`item[3]`); missing siblings are appended until the index
//! exists, and existing ones are never moved or removed.

use super::{Selection, XDoc};
use crate::dom::node::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::names::validate_qname;
use crate::values::Value;

/// Pattern for an indexed path segment such as `item[2]`
const INDEXED_SEGMENT_PATTERN: &str = r"^(.+)\[(\d+)\]$";

lazy_static::lazy_static! {
    static ref INDEXED_SEGMENT: regex::Regex = regex::Regex::new(INDEXED_SEGMENT_PATTERN).unwrap();
}

/// One parsed path segment
#[derive(Debug, PartialEq)]
struct Segment<'a> {
    name: &'a str,
    index: Option<usize>,
}

impl<'a> Segment<'a> {
    fn parse(token: &'a str) -> Result<Self> {
        let segment = match INDEXED_SEGMENT.captures(token) {
            Some(caps) => {
                let name = caps.get(1).map_or("", |m| m.as_str());
                let digits = caps.get(2).map_or("", |m| m.as_str());
                let index: usize = digits
                    .parse()
                    .map_err(|_| Error::argument(format!("index out of range in '{}'", token)))?;
                if index == 0 {
                    return Err(Error::argument(format!("index must be at least 1 in '{}'", token)));
                }
                Segment {
                    name,
                    index: Some(index),
                }
            }
            None => Segment {
                name: token,
                index: None,
            },
        };
        if segment.name.is_empty() {
            return Err(Error::argument("path contains an empty segment"));
        }
        Ok(segment)
    }
}

impl XDoc {
    /// Write `value` at `path` below the current node, creating elements as needed
    ///
    /// Every segment but the last moves into a child element: `name[N]` into
    /// the Nth one (appending empty siblings until there are N), plain `name`
    /// into the last one (creating it if there is none). The last segment
    /// decides where the value goes: `@name` sets an attribute, a segment
    /// starting with `#` writes text into the element reached so far, and
    /// anything else appends a new child element holding the text. Empty text
    /// adds no text node.
    ///
    /// The selection of this cursor does not change. An absent value is a
    /// no-op. A failure part-way leaves the elements created so far in place.
    pub fn insert_value_at(&mut self, path: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let mut target = self.current()?;
        let Some(text) = value.into().render() else {
            return Ok(self);
        };

        let path = path.trim_matches('/');
        let tokens: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let root = self.root_node()?;
        let last = tokens.len().saturating_sub(1);
        for (i, token) in tokens.iter().enumerate() {
            let segment = Segment::parse(token)?;
            if i < last {
                validate_qname(segment.name)?;
                target = match segment.index {
                    Some(index) => nth_child_element(&target, segment.name, index)?,
                    None => last_child_element(&target, segment.name)?,
                };
                continue;
            }

            let mut cursor = XDoc::from_parts(Some(Selection::single(target.clone())), root.clone());
            if let Some(name) = segment.name.strip_prefix('@') {
                cursor.attr(name, text.as_str())?;
                return Ok(self);
            }
            if !segment.name.starts_with('#') {
                cursor.start(segment.name)?;
                target = cursor.current()?;
            }
        }

        if !text.is_empty() {
            target
                .tree()
                .append_character_data(&target, NodeKind::Text, &text)?;
        }
        Ok(self)
    }
}

fn child_elements(parent: &Node, name: &str) -> Vec<Node> {
    parent
        .children()
        .into_iter()
        .filter(|child| child.kind() == NodeKind::Element && child.name().as_deref() == Some(name))
        .collect()
}

fn append_element(parent: &Node, name: &str) -> Result<Node> {
    let tree = parent.tree();
    let element = tree.create_element(name, None);
    tree.append_child(parent, &element)?;
    Ok(element)
}

/// The `index`th (1-based) child element named `name`, appending empty ones as needed
fn nth_child_element(parent: &Node, name: &str, index: usize) -> Result<Node> {
    let mut existing = child_elements(parent, name);
    while existing.len() < index {
        existing.push(append_element(parent, name)?);
    }
    Ok(existing.swap_remove(index - 1))
}

/// The last child element named `name`, created if there is none
fn last_child_element(parent: &Node, name: &str) -> Result<Node> {
    match child_elements(parent, name).pop() {
        Some(element) => Ok(element),
        None => append_element(parent, name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_parse() {
        assert_eq!(
            Segment::parse("foo[3]").unwrap(),
            Segment {
                name: "foo",
                index: Some(3)
            }
        );
        assert_eq!(Segment::parse("@id").unwrap().index, None);
        assert!(matches!(Segment::parse("foo[0]"), Err(Error::InvalidArgument(_))));
        assert!(matches!(Segment::parse(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            Segment::parse("foo[99999999999999999999999]"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_insert_paths() {
        let mut doc = XDoc::new("test").unwrap();
        doc.insert_value_at("", "text")
            .unwrap()
            .insert_value_at("@id", "123")
            .unwrap()
            .insert_value_at("foo/a", "a")
            .unwrap()
            .insert_value_at("foo/b", "b")
            .unwrap()
            .insert_value_at("foo/@key", "value")
            .unwrap()
            .insert_value_at("foo[3]/c", "c")
            .unwrap()
            .insert_value_at("bar[3]/d", "d")
            .unwrap()
            .insert_value_at("foo[5]/e", "e")
            .unwrap()
            .insert_value_at("foo[5]/f", "f")
            .unwrap();
        assert_eq!(
            doc.to_string(),
            r#"<test id="123">text<foo key="value"><a>a</a><b>b</b></foo><foo/><foo><c>c</c></foo><bar/><bar/><bar><d>d</d></bar><foo/><foo><e>e</e><f>f</f></foo></test>"#
        );
    }

    #[test]
    fn test_selection_unchanged() {
        let mut doc = XDoc::new("root").unwrap();
        doc.insert_value_at("/a/b/", "x").unwrap();
        assert_eq!(doc.name().unwrap(), "root");
        assert_eq!(doc.to_string(), "<root><a><b>x</b></a></root>");
    }

    #[test]
    fn test_hash_segment_writes_in_place() {
        let mut doc = XDoc::new("root").unwrap();
        doc.insert_value_at("a/#text", "x").unwrap();
        doc.insert_value_at("a/#text", "y").unwrap();
        assert_eq!(doc.to_string(), "<root><a>xy</a></root>");
    }

    #[test]
    fn test_empty_and_absent_values() {
        let mut doc = XDoc::new("root").unwrap();
        doc.insert_value_at("a", "").unwrap();
        doc.insert_value_at("b", None::<&str>).unwrap();
        assert_eq!(doc.to_string(), "<root><a/></root>");
    }

    #[test]
    fn test_invalid_paths() {
        let mut doc = XDoc::new("root").unwrap();
        assert!(matches!(
            doc.insert_value_at("a//b", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            doc.insert_value_at("a[0]/b", "x"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            XDoc::empty().insert_value_at("a", "x"),
            Err(Error::Empty)
        ));
    }

    #[test]
    fn test_indexed_creation_is_minimal() {
        let mut doc = XDoc::load("<r><i>1</i><i>2</i></r>");
        doc.insert_value_at("i[2]/#", "!").unwrap();
        assert_eq!(doc.to_string(), "<r><i>1</i><i>2!</i></r>");
        doc.insert_value_at("i[4]/v", "4").unwrap();
        assert_eq!(doc.at("i").len(), 4);
        assert_eq!(doc.at("i[4]/v").contents(), "4");
    }
}
