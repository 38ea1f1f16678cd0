//! Step predicates
//!
//! Supported forms: an integer position, `last()`, `position() op N`, and
//! existence or comparison tests on `@attr`, a child element name, `text()`
//! or `.`. Comparisons use XPath node-set semantics: the test holds if any
//! node of the operand satisfies it.

use crate::dom::node::{Node, NodeKind};
use crate::error::{Error, Result};
use crate::names::is_valid_qname;
use crate::namespaces::XMLNS_NAMESPACE;

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl Comparison {
    /// Operators in the order they must be tried when scanning an expression
    const OPERATORS: [(&'static str, Comparison); 6] = [
        ("!=", Comparison::Ne),
        ("<=", Comparison::Le),
        (">=", Comparison::Ge),
        ("=", Comparison::Eq),
        ("<", Comparison::Lt),
        (">", Comparison::Gt),
    ];

    fn numbers(self, left: f64, right: f64) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            Comparison::Lt => left < right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Ge => left >= right,
        }
    }

    fn strings(self, left: &str, right: &str) -> bool {
        match self {
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
            // Relational operators always compare numerically
            _ => match (left.trim().parse::<f64>(), right.trim().parse::<f64>()) {
                (Ok(l), Ok(r)) => self.numbers(l, r),
                _ => false,
            },
        }
    }
}

/// Left-hand side of an existence or comparison predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `@name` or `@*`
    Attribute(String),
    /// A child element name or `*`
    Child(String),
    /// `text()`
    Text,
    /// `.`
    Context,
}

impl Operand {
    fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "." => Ok(Operand::Context),
            "text()" => Ok(Operand::Text),
            "*" => Ok(Operand::Child(s.to_string())),
            _ => {
                if let Some(name) = s.strip_prefix('@') {
                    if name == "*" || is_valid_qname(name) {
                        return Ok(Operand::Attribute(name.to_string()));
                    }
                } else if is_valid_qname(s) {
                    return Ok(Operand::Child(s.to_string()));
                }
                Err(Error::Query(format!("unsupported predicate operand '{}'", s)))
            }
        }
    }

    /// String values of the nodes this operand selects from `node`
    fn values(&self, node: &Node) -> Vec<String> {
        match self {
            Operand::Attribute(name) => node
                .attributes()
                .into_iter()
                .filter(|attr| attr.namespace_uri().as_deref() != Some(XMLNS_NAMESPACE))
                .filter(|attr| name == "*" || attr.name().as_deref() == Some(name.as_str()))
                .filter_map(|attr| attr.value())
                .collect(),
            Operand::Child(name) => node
                .children()
                .into_iter()
                .filter(|child| child.kind() == NodeKind::Element)
                .filter(|child| name == "*" || child.name().as_deref() == Some(name.as_str()))
                .map(|child| child.text_content())
                .collect(),
            Operand::Text => node
                .children()
                .into_iter()
                .filter(|child| matches!(child.kind(), NodeKind::Text | NodeKind::CData))
                .filter_map(|child| child.value())
                .collect(),
            Operand::Context => vec![node.text_content()],
        }
    }
}

/// A parsed predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `[N]`: 1-based proximity position
    Position(usize),
    /// `[last()]`
    Last,
    /// `[position() op N]`
    PositionCompare(Comparison, i64),
    /// `[@a]`, `[name]`, `[text()]`
    Exists(Operand),
    /// `[@a='v']`, `[name='v']`, `[text()='v']`, `[.='v']`
    Compare(Operand, Comparison, String),
}

impl Predicate {
    /// Parse the text between `[` and `]`
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        if trimmed.is_empty() {
            return Err(Error::Query("empty predicate".to_string()));
        }

        if let Ok(position) = trimmed.parse::<usize>() {
            return Ok(Predicate::Position(position));
        }
        if trimmed == "last()" {
            return Ok(Predicate::Last);
        }

        if let Some((left, op, right)) = split_comparison(trimmed) {
            if left == "position()" {
                let n = right
                    .parse::<i64>()
                    .map_err(|_| Error::Query(format!("invalid position in '{}'", trimmed)))?;
                return Ok(Predicate::PositionCompare(op, n));
            }
            return Ok(Predicate::Compare(Operand::parse(left)?, op, parse_literal(right)?));
        }

        Ok(Predicate::Exists(Operand::parse(trimmed)?))
    }

    /// Check if this predicate holds for the node at `position` (1-based) of `size`
    pub fn matches(&self, node: &Node, position: usize, size: usize) -> bool {
        match self {
            Predicate::Position(n) => position == *n,
            Predicate::Last => position == size,
            Predicate::PositionCompare(op, n) => op.numbers(position as f64, *n as f64),
            Predicate::Exists(operand) => !operand.values(node).is_empty(),
            Predicate::Compare(operand, op, literal) => operand
                .values(node)
                .iter()
                .any(|value| op.strings(value, literal)),
        }
    }
}

/// Find the first comparison operator outside string literals
fn split_comparison(expr: &str) -> Option<(&str, Comparison, &str)> {
    let bytes = expr.as_bytes();
    let mut quote: Option<u8> = None;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'\'' || b == b'"' => quote = Some(b),
            None => {
                for (symbol, op) in Comparison::OPERATORS {
                    if bytes[i..].starts_with(symbol.as_bytes()) {
                        let left = expr[..i].trim();
                        let right = expr[i + symbol.len()..].trim();
                        return Some((left, op, right));
                    }
                }
            }
        }
        i += 1;
    }
    None
}

/// Parse a quoted string or a number literal
fn parse_literal(s: &str) -> Result<String> {
    let s = s.trim();
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' || first == b'"') && first == last {
            return Ok(s[1..s.len() - 1].to_string());
        }
    }
    if s.parse::<f64>().is_ok() {
        return Ok(s.to_string());
    }
    Err(Error::Query(format!("unsupported literal '{}'", s)))
}
