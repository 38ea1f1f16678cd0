//! Path query engine
//!
//! A small evaluator for abbreviated XPath 1.0 location paths, enough for the
//! navigation, indexing and filtering used by the cursor:
//!
//! - absolute (`/a`), relative (`a/b`) and descendant (`//a`) paths
//! - `.`, `..`, `*`, `@name`, `@*`, `text()`, `node()`, `comment()`
//! - named axes such as `ancestor::` or `following-sibling::`
//! - predicates on position and on attribute or child values
//! - unions with `|`
//!
//! Names are matched as qualified-name strings; prefixes are not resolved.

pub mod eval;
pub mod predicates;
pub mod selectors;

pub use eval::evaluate;
pub use predicates::{Comparison, Operand, Predicate};
pub use selectors::{Axis, LocationPath, NodeTest, PathStep};
