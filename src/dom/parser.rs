//! Markup parser building a [`Tree`] from text
//!
//! Namespaces are recorded, not rewritten: names keep their prefixes and the
//! URI bound to each prefix is stored next to the name. Namespace declarations
//! stay on their element as ordinary attributes.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::node::{Node, NodeKind};
use super::tree::Tree;
use crate::error::{Error, Result};
use crate::limits::Limits;
use crate::names::split_qname;
use crate::namespaces::{NamespaceScopes, XMLNS_NAMESPACE};

/// Parse markup into a new tree with default limits
pub fn parse(xml: &str) -> Result<Tree> {
    parse_with_limits(xml, &Limits::default())
}

/// Parse markup into a new tree
pub fn parse_with_limits(xml: &str, limits: &Limits) -> Result<Tree> {
    limits.check_input_size(xml.len())?;

    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);

    let tree = Tree::new();
    let document = tree.document();
    let mut scopes = NamespaceScopes::new();
    let mut element_stack: Vec<Node> = Vec::new();
    let mut has_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            Error::Xml(format!(
                "error parsing XML at position {}: {}",
                reader.buffer_position(),
                e
            ))
        })?;

        match event {
            Event::Start(e) => {
                if element_stack.is_empty() && has_root {
                    return Err(Error::Xml("multiple root elements".to_string()));
                }
                limits.check_depth(element_stack.len() + 1)?;
                let parent = element_stack.last().unwrap_or(&document).clone();
                let element = parse_element(&tree, &e, &mut scopes, limits)?;
                tree.append_child(&parent, &element)?;
                element_stack.push(element);
                has_root = true;
            }
            Event::Empty(e) => {
                if element_stack.is_empty() && has_root {
                    return Err(Error::Xml("multiple root elements".to_string()));
                }
                limits.check_depth(element_stack.len() + 1)?;
                let parent = element_stack.last().unwrap_or(&document).clone();
                let element = parse_element(&tree, &e, &mut scopes, limits)?;
                // An empty element opens and closes its scope at once
                scopes.pop();
                tree.append_child(&parent, &element)?;
                has_root = true;
            }
            Event::End(_) => {
                element_stack.pop();
                scopes.pop();
            }
            Event::Text(e) => {
                let text = e
                    .unescape()
                    .map_err(|e| Error::Xml(format!("failed to unescape text: {}", e)))?;
                match element_stack.last() {
                    Some(current) => {
                        tree.append_character_data(current, NodeKind::Text, &text)?;
                    }
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(Error::Xml(
                            "text is not allowed outside the root element".to_string(),
                        ))
                    }
                }
            }
            Event::CData(e) => {
                let Some(current) = element_stack.last() else {
                    return Err(Error::Xml(
                        "CDATA is not allowed outside the root element".to_string(),
                    ));
                };
                let text = std::str::from_utf8(&e)
                    .map_err(|e| Error::Xml(format!("invalid CDATA section: {}", e)))?;
                // A value holding "]]>" is written as consecutive sections
                tree.append_character_data(current, NodeKind::CData, text)?;
            }
            Event::Comment(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|e| Error::Xml(format!("invalid comment: {}", e)))?;
                let node = tree.create_comment(&text);
                tree.append_child(element_stack.last().unwrap_or(&document), &node)?;
            }
            Event::Decl(_) => {}
            Event::PI(_) | Event::DocType(_) => {
                log::debug!("skipping processing instruction or doctype");
            }
            Event::Eof => break,
        }
    }

    if let Some(open) = element_stack.last() {
        return Err(Error::Xml(format!(
            "unclosed element '{}'",
            open.name().unwrap_or_default()
        )));
    }
    if !has_root {
        return Err(Error::Xml("document has no root element".to_string()));
    }

    Ok(tree)
}

/// Create an element from a start tag, opening a new namespace scope
fn parse_element(
    tree: &Tree,
    start: &BytesStart,
    scopes: &mut NamespaceScopes,
    limits: &Limits,
) -> Result<Node> {
    let name = std::str::from_utf8(start.name().as_ref())
        .map_err(|e| Error::Xml(format!("invalid element name: {}", e)))?
        .to_string();

    let mut attributes = Vec::new();
    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| Error::Xml(format!("failed to parse attribute: {}", e)))?;
        let attr_name = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| Error::Xml(format!("invalid attribute name: {}", e)))?
            .to_string();
        let attr_value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(format!("failed to unescape attribute value: {}", e)))?
            .to_string();
        attributes.push((attr_name, attr_value));
    }
    limits.check_attributes(attributes.len())?;

    // Declarations on this element are in scope for its own name
    scopes.push();
    for (attr_name, attr_value) in &attributes {
        scopes.declare_from_attribute(attr_name, attr_value);
    }

    let (prefix, _) = split_qname(&name);
    let element = tree.create_element(&name, scopes.resolve(prefix));

    for (attr_name, attr_value) in &attributes {
        let namespace = if attr_name == "xmlns" || attr_name.starts_with("xmlns:") {
            Some(XMLNS_NAMESPACE)
        } else {
            match split_qname(attr_name) {
                // Unprefixed attributes are in no namespace
                (None, _) => None,
                (prefix, _) => scopes.resolve(prefix),
            }
        };
        tree.set_attribute(&element, attr_name, namespace, attr_value)?;
    }

    Ok(element)
}
