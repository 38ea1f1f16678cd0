//! XML namespace scopes
//!
//! Namespaces are passed through rather than resolved: element and attribute
//! names keep their prefixes, and a namespace URI is recorded alongside. The
//! scope stack here is shared by the parser (to record the URI of each name)
//! and the writer (to decide which `xmlns` declarations must be emitted).

use std::collections::HashMap;

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Key used for the default namespace inside a scope frame
const DEFAULT_KEY: &str = "";

/// Stack of in-scope namespace declarations
#[derive(Debug, Clone)]
pub struct NamespaceScopes {
    /// One frame per open element; maps prefix (or "" for default) to URI
    frames: Vec<HashMap<String, String>>,
}

impl NamespaceScopes {
    /// Create a scope stack with only the implicit `xml` prefix bound
    pub fn new() -> Self {
        let mut base = HashMap::new();
        base.insert("xml".to_string(), XML_NAMESPACE.to_string());
        Self { frames: vec![base] }
    }

    /// Open a new scope frame
    pub fn push(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Close the innermost scope frame
    pub fn pop(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Declare a prefix (or the default namespace when `prefix` is None)
    ///
    /// An empty URI for the default namespace undeclares it.
    pub fn declare(&mut self, prefix: Option<&str>, uri: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(prefix.unwrap_or(DEFAULT_KEY).to_string(), uri.to_string());
        }
    }

    /// Resolve a prefix (or the default namespace) to its URI
    pub fn resolve(&self, prefix: Option<&str>) -> Option<&str> {
        let key = prefix.unwrap_or(DEFAULT_KEY);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(key))
            .map(String::as_str)
            .filter(|uri| !uri.is_empty())
    }

    /// Record an `xmlns` or `xmlns:p` attribute if `name` is one
    ///
    /// Returns true if the attribute was a namespace declaration.
    pub fn declare_from_attribute(&mut self, name: &str, value: &str) -> bool {
        if name == "xmlns" {
            self.declare(None, value);
            true
        } else if let Some(prefix) = name.strip_prefix("xmlns:") {
            self.declare(Some(prefix), value);
            true
        } else {
            false
        }
    }
}

impl Default for NamespaceScopes {
    fn default() -> Self {
        Self::new()
    }
}
