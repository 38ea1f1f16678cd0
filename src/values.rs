//! Scalar values written into a document
//!
//! Attribute, text and replacement setters accept anything convertible into a
//! [`Value`]. Each kind is rendered by a fixed rule: text as-is, numbers and
//! booleans by their `Display` form, timestamps by [`TIMESTAMP_FORMAT`]. An
//! absent value (`None`) renders to nothing, which setters treat as a no-op.

use chrono::{DateTime, FixedOffset, Offset, TimeZone};

/// Timestamp format used when writing dates (`yyyy-MM-ddTHH:mm:ssZ`)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// A scalar value destined for a text or attribute node
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// No value; setters skip it
    Absent,
    /// Literal text
    Text(String),
    /// Any integer or floating-point number, already rendered
    Number(String),
    /// A boolean, rendered as `true`/`false`
    Boolean(bool),
    /// A timestamp with its offset
    Timestamp(DateTime<FixedOffset>),
}

impl Value {
    /// Render the value to the text stored in the tree
    pub fn render(&self) -> Option<String> {
        match self {
            Value::Absent => None,
            Value::Text(s) => Some(s.clone()),
            Value::Number(n) => Some(n.clone()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Timestamp(ts) => Some(format_timestamp(ts)),
        }
    }

    /// Check if the value is absent
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }
}

/// Format a timestamp with [`TIMESTAMP_FORMAT`]
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp written with [`TIMESTAMP_FORMAT`] or as RFC 3339
pub fn parse_timestamp(text: &str) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    DateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(text))
        .ok()
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Text(c.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

macro_rules! number_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(n.to_string())
                }
            }
        )*
    };
}

number_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(ts: DateTime<Tz>) -> Self {
        let offset = ts.offset().fix();
        Value::Timestamp(ts.with_timezone(&offset))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Absent, Into::into)
    }
}
