//! Location path parsing
//!
//! An expression is a union (`|`) of location paths. Each path is split into
//! steps on `/` outside predicates and string literals; `//` contributes an
//! implicit `descendant-or-self::node()` step.

use std::fmt;

use super::predicates::Predicate;
use crate::error::{Error, Result};
use crate::names::is_valid_qname;

/// Marker produced by [`split_path`] for the `//` abbreviation
pub const DESCENDANT_MARKER: &str = "//";

/// Axes supported by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// child:: axis (default)
    Child,
    /// attribute:: axis (@)
    Attribute,
    /// self:: axis (.)
    Self_,
    /// parent:: axis (..)
    Parent,
    /// descendant:: axis
    Descendant,
    /// descendant-or-self:: axis
    DescendantOrSelf,
    /// ancestor:: axis
    Ancestor,
    /// ancestor-or-self:: axis
    AncestorOrSelf,
    /// following-sibling:: axis
    FollowingSibling,
    /// preceding-sibling:: axis
    PrecedingSibling,
}

impl Axis {
    /// Parse axis from string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "child" => Some(Self::Child),
            "attribute" => Some(Self::Attribute),
            "self" => Some(Self::Self_),
            "parent" => Some(Self::Parent),
            "descendant" => Some(Self::Descendant),
            "descendant-or-self" => Some(Self::DescendantOrSelf),
            "ancestor" => Some(Self::Ancestor),
            "ancestor-or-self" => Some(Self::AncestorOrSelf),
            "following-sibling" => Some(Self::FollowingSibling),
            "preceding-sibling" => Some(Self::PrecedingSibling),
            _ => None,
        }
    }

    /// Check if positions on this axis count backwards from the context node
    pub fn is_reverse(&self) -> bool {
        matches!(
            self,
            Self::Parent | Self::Ancestor | Self::AncestorOrSelf | Self::PrecedingSibling
        )
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Child => "child",
            Self::Attribute => "attribute",
            Self::Self_ => "self",
            Self::Parent => "parent",
            Self::Descendant => "descendant",
            Self::DescendantOrSelf => "descendant-or-self",
            Self::Ancestor => "ancestor",
            Self::AncestorOrSelf => "ancestor-or-self",
            Self::FollowingSibling => "following-sibling",
            Self::PrecedingSibling => "preceding-sibling",
        };
        write!(f, "{}", s)
    }
}

/// Node test of a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// Qualified name, compared as a string
    Name(String),
    /// `*`
    AnyName,
    /// `text()`: text and CDATA nodes
    Text,
    /// `comment()`
    Comment,
    /// `node()`
    Node,
}

impl NodeTest {
    /// Parse a node test
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "*" => Ok(Self::AnyName),
            "text()" => Ok(Self::Text),
            "comment()" => Ok(Self::Comment),
            "node()" => Ok(Self::Node),
            name if is_valid_qname(name) => Ok(Self::Name(name.to_string())),
            other => Err(Error::Query(format!("unsupported node test '{}'", other))),
        }
    }
}

/// A single step in a location path
#[derive(Debug, Clone, PartialEq)]
pub struct PathStep {
    /// Axis to walk from each context node
    pub axis: Axis,
    /// Filter applied to the nodes on the axis
    pub test: NodeTest,
    /// Predicates, applied in order
    pub predicates: Vec<Predicate>,
}

impl PathStep {
    /// Parse a step from a string
    pub fn parse(step: &str) -> Result<Self> {
        let step = step.trim();

        if step == DESCENDANT_MARKER {
            return Ok(Self::new(Axis::DescendantOrSelf, NodeTest::Node));
        }
        if step == "." {
            return Ok(Self::new(Axis::Self_, NodeTest::Node));
        }
        if step == ".." {
            return Ok(Self::new(Axis::Parent, NodeTest::Node));
        }

        let (head, predicates) = extract_predicates(step)?;

        let (axis, rest) = if let Some(rest) = head.strip_prefix('@') {
            (Axis::Attribute, rest)
        } else if let Some((axis, rest)) = head.split_once("::") {
            let axis = Axis::parse(axis.trim())
                .ok_or_else(|| Error::Query(format!("unsupported axis '{}'", axis)))?;
            (axis, rest)
        } else {
            (Axis::Child, head)
        };

        Ok(Self {
            axis,
            test: NodeTest::parse(rest.trim())?,
            predicates,
        })
    }

    /// Create a step without predicates
    pub fn new(axis: Axis, test: NodeTest) -> Self {
        Self {
            axis,
            test,
            predicates: Vec::new(),
        }
    }
}

/// A parsed location path
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    /// Starts at the document node
    pub absolute: bool,
    /// Steps in evaluation order
    pub steps: Vec<PathStep>,
}

impl LocationPath {
    /// Parse a single location path (no unions)
    pub fn parse(path: &str) -> Result<Self> {
        let (absolute, raw) = split_path(path)?;
        let steps = raw
            .into_iter()
            .map(PathStep::parse)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { absolute, steps })
    }
}

/// Parse a full expression into its union branches
pub fn parse_expression(expr: &str) -> Result<Vec<LocationPath>> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(Error::Query("empty expression".to_string()));
    }
    split_top_level(expr, b'|')
        .into_iter()
        .map(LocationPath::parse)
        .collect()
}

/// Split `s` on `sep` where it appears outside predicates and string literals
fn split_top_level(s: &str, sep: u8) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = 0;
    for (i, &b) in s.as_bytes().iter().enumerate() {
        if scanner.feed(b) && b == sep {
            parts.push(&s[start..i]);
            start = i + 1;
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Tracks predicate depth and string literals while scanning bytes
#[derive(Default)]
struct Scanner {
    depth: usize,
    quote: Option<u8>,
}

impl Scanner {
    /// Feed one byte; returns true if it sits at the top level
    fn feed(&mut self, b: u8) -> bool {
        match (self.quote, b) {
            (Some(q), _) if b == q => {
                self.quote = None;
                false
            }
            (Some(_), _) => false,
            (None, b'\'' | b'"') => {
                self.quote = Some(b);
                false
            }
            (None, b'[') => {
                self.depth += 1;
                false
            }
            (None, b']') => {
                self.depth = self.depth.saturating_sub(1);
                false
            }
            (None, _) => self.depth == 0,
        }
    }
}

/// Split a location path into raw steps
///
/// Returns whether the path is absolute, and the steps with `//` reported as
/// [`DESCENDANT_MARKER`]. Empty steps are an error.
pub fn split_path(path: &str) -> Result<(bool, Vec<&str>)> {
    let path = path.trim();
    if path.is_empty() {
        return Err(Error::Query("empty location path".to_string()));
    }

    let bytes = path.as_bytes();
    let len = bytes.len();
    let mut steps = Vec::new();
    let mut scanner = Scanner::default();

    let absolute = path.starts_with('/');
    let mut i = 0;
    if path.starts_with("//") {
        steps.push(DESCENDANT_MARKER);
        i = 2;
    } else if absolute {
        i = 1;
    }
    let mut current_start = i;

    while i < len {
        if scanner.feed(bytes[i]) && bytes[i] == b'/' {
            let step = &path[current_start..i];
            if step.trim().is_empty() {
                return Err(Error::Query(format!("empty step in '{}'", path)));
            }
            steps.push(step);

            if i + 1 < len && bytes[i + 1] == b'/' {
                steps.push(DESCENDANT_MARKER);
                i += 2;
            } else {
                i += 1;
            }
            current_start = i;
            continue;
        }
        i += 1;
    }

    let last = &path[current_start..];
    if last.trim().is_empty() {
        // A lone "/" selects the document node
        if path != "/" {
            return Err(Error::Query(format!("path '{}' ends with a separator", path)));
        }
    } else {
        steps.push(last);
    }

    Ok((absolute, steps))
}

/// Split `name[p1][p2]` into the head and its parsed predicates
fn extract_predicates(step: &str) -> Result<(&str, Vec<Predicate>)> {
    let Some(open) = step.find('[') else {
        return Ok((step, Vec::new()));
    };

    let head = &step[..open];
    let mut predicates = Vec::new();
    let mut scanner = Scanner::default();
    let mut start = None;

    for (i, &b) in step.as_bytes().iter().enumerate().skip(open) {
        let depth_before = scanner.depth;
        let top = scanner.feed(b);
        match b {
            b'[' if scanner.quote.is_none() && depth_before == 0 => start = Some(i + 1),
            b']' if scanner.quote.is_none() && scanner.depth == 0 => {
                let begin = start
                    .take()
                    .ok_or_else(|| Error::Query(format!("unbalanced ']' in '{}'", step)))?;
                predicates.push(Predicate::parse(&step[begin..i])?);
            }
            _ if top && !b.is_ascii_whitespace() => {
                return Err(Error::Query(format!("unexpected text after predicate in '{}'", step)));
            }
            _ => {}
        }
    }

    if scanner.depth != 0 || scanner.quote.is_some() {
        return Err(Error::Query(format!("unterminated predicate in '{}'", step)));
    }

    Ok((head, predicates))
}
