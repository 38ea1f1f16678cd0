//! In-memory XML tree
//!
//! - [`tree`]: the shared node arena and its structural operations
//! - [`node`]: node kinds and the public node handle
//! - [`parser`]: text to tree
//! - [`writer`]: tree to text

pub mod node;
pub mod parser;
pub mod tree;
pub mod writer;

pub use node::{Node, NodeId, NodeKind};
pub use parser::{parse, parse_with_limits};
pub use tree::{Tree, TreeId};
pub use writer::{write, WriteOptions};
