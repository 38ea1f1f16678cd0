//! # xdoc
//!
//! A cursor API for building, navigating and rewriting in-memory XML trees.
//!
//! An [`XDoc`] is a selection of one or more nodes of a shared, mutable tree.
//! Builder calls (`start`, `attr`, `value`, `end`) describe a document depth
//! first; navigation (`at`, `at_path`, `next`, `parent`) narrows the
//! selection and never fails; mutation (`replace`, `rename`, `add*`,
//! `remove*`) rewrites the tree in place.
//!
//! ## Features
//!
//! - Open/close builder driven by parent links
//! - Direct child and attribute lookup for plain names, path queries for the rest
//! - Path-addressed insertion that creates indexed elements on demand
//! - Shallow copies, deep clones and a one-shot clone elision flag
//! - Structural equality
//!
//! ## Example
//!
//! ```rust
//! use xdoc::XDoc;
//!
//! let mut doc = XDoc::new("doc")?;
//! doc.value("Hello ")?
//!     .start("bold")?
//!     .value("World")?
//!     .end()?
//!     .elem_value("bold", "Cool")?;
//!
//! assert_eq!(doc.at("bold").len(), 2);
//! assert_eq!(doc.at("bold[2]").contents(), "Cool");
//!
//! doc.insert_value_at("list/item[2]/@id", 7)?;
//! assert_eq!(
//!     doc.to_string(),
//!     r#"<doc>Hello <bold>World</bold><bold>Cool</bold><list><item/><item id="7"/></list></doc>"#
//! );
//! # Ok::<(), xdoc::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod dom;
pub mod error;
pub mod limits;
pub mod names;
pub mod namespaces;
pub mod values;
pub mod xpath;

// Re-exports for convenience
pub use cursor::{Selection, XDoc};
pub use dom::{Node, NodeKind, Tree, TreeId, WriteOptions};
pub use error::{Error, Result};
pub use limits::Limits;
pub use values::Value;

/// Version of the xdoc library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
