//! Serializer rendering a node and its subtree as markup
//!
//! Text is escaped for `<`, `>` and `&` only; attribute values are fully
//! escaped. Namespace declarations are added to an element whenever its
//! namespace, or that of one of its attributes, is not already in scope.

use std::collections::HashSet;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::node::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::names::split_qname;
use crate::namespaces::{NamespaceScopes, XMLNS_NAMESPACE};

/// Output options for [`write`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit an `<?xml ...?>` declaration first
    pub declaration: bool,
    /// Indentation width in spaces; `None` writes everything on one line
    pub indent: Option<usize>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            declaration: false,
            indent: None,
        }
    }
}

impl WriteOptions {
    /// Single-line output without a declaration
    pub fn compact() -> Self {
        Self::default()
    }

    /// Declaration and four-space indentation
    pub fn pretty() -> Self {
        Self {
            declaration: true,
            indent: Some(4),
        }
    }

    /// Set whether a declaration is written
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.declaration = declaration;
        self
    }
}

/// Serialize a node (and its subtree) to a string
///
/// A document node renders all of its children. Attribute nodes render as
/// their escaped value.
pub fn write(node: &Node, options: &WriteOptions) -> Result<String> {
    let mut writer = match options.indent {
        Some(width) => Writer::new_with_indent(Vec::new(), b' ', width),
        None => Writer::new(Vec::new()),
    };

    if options.declaration {
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    }

    let mut scopes = NamespaceScopes::new();
    write_node(&mut writer, node, &mut scopes)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("serialized output is not UTF-8: {}", e)))
}

/// Serialize the children of a node, without the node itself
pub fn write_children(node: &Node) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    let mut scopes = NamespaceScopes::new();
    for child in node.children() {
        write_node(&mut writer, &child, &mut scopes)?;
    }
    String::from_utf8(writer.into_inner())
        .map_err(|e| Error::Xml(format!("serialized output is not UTF-8: {}", e)))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node, scopes: &mut NamespaceScopes) -> Result<()> {
    match node.kind() {
        NodeKind::Document => {
            for child in node.children() {
                write_node(writer, &child, scopes)?;
            }
        }
        NodeKind::Element => write_element(writer, node, scopes)?,
        NodeKind::Text | NodeKind::Attribute => {
            let value = node.value().unwrap_or_default();
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(&value))))?;
        }
        NodeKind::CData => {
            let value = node.value().unwrap_or_default();
            for section in cdata_sections(&value) {
                writer.write_event(Event::CData(BytesCData::new(section)))?;
            }
        }
        NodeKind::Comment => {
            let value = node.value().unwrap_or_default();
            writer.write_event(Event::Comment(BytesText::from_escaped(value)))?;
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, node: &Node, scopes: &mut NamespaceScopes) -> Result<()> {
    let name = node.name().unwrap_or_default();
    let attributes = node.attributes();

    scopes.push();
    let mut start = BytesStart::new(name.as_str());
    let mut declared: HashSet<Option<String>> = HashSet::new();

    // Explicit declarations first, so they win over generated ones
    for attr in &attributes {
        let attr_name = attr.name().unwrap_or_default();
        let value = attr.value().unwrap_or_default();
        if scopes.declare_from_attribute(&attr_name, &value) {
            let prefix = attr_name.strip_prefix("xmlns:").map(str::to_string);
            declared.insert(prefix);
        }
    }

    let (prefix, _) = split_qname(&name);
    let mut generated = Vec::new();
    ensure_declared(
        scopes,
        &mut declared,
        &mut generated,
        prefix,
        node.namespace_uri().as_deref(),
    );
    for attr in &attributes {
        if attr.namespace_uri().as_deref() == Some(XMLNS_NAMESPACE) {
            continue;
        }
        let attr_name = attr.name().unwrap_or_default();
        if let (Some(prefix), _) = split_qname(&attr_name) {
            ensure_declared(
                scopes,
                &mut declared,
                &mut generated,
                Some(prefix),
                attr.namespace_uri().as_deref(),
            );
        }
    }

    for (key, uri) in &generated {
        start.push_attribute((key.as_str(), uri.as_str()));
    }
    for attr in &attributes {
        let attr_name = attr.name().unwrap_or_default();
        let value = attr.value().unwrap_or_default();
        start.push_attribute((attr_name.as_str(), value.as_str()));
    }

    let children = node.children();
    if children.is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start))?;
        for child in &children {
            write_node(writer, child, scopes)?;
        }
        writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    }

    scopes.pop();
    Ok(())
}

/// Split a CDATA value so that no section contains `]]>`
///
/// Each split leaves `]]` at the end of one section and starts the next with
/// `>`; reading the sections back concatenates to the original value.
fn cdata_sections(value: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = value;
    while let Some(pos) = rest.find("]]>") {
        sections.push(&rest[..pos + 2]);
        rest = &rest[pos + 2..];
    }
    sections.push(rest);
    sections
}

/// Queue an `xmlns` declaration when `prefix` is not bound to `namespace`
fn ensure_declared(
    scopes: &mut NamespaceScopes,
    declared: &mut HashSet<Option<String>>,
    generated: &mut Vec<(String, String)>,
    prefix: Option<&str>,
    namespace: Option<&str>,
) {
    let key = prefix.map(str::to_string);
    if declared.contains(&key) || scopes.resolve(prefix) == namespace {
        return;
    }
    // Prefixed names without a namespace cannot be undeclared
    if prefix.is_some() && namespace.is_none() {
        return;
    }
    let uri = namespace.unwrap_or_default();
    scopes.declare(prefix, uri);
    let attr_name = match prefix {
        Some(prefix) => format!("xmlns:{}", prefix),
        None => "xmlns".to_string(),
    };
    generated.push((attr_name, uri.to_string()));
    declared.insert(key);
}
