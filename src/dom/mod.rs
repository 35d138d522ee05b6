//! Widget tree: slotmap-backed arena of nodes with parent/child links.

pub mod node;
pub mod tree;

pub use node::{NodeData, NodeId};
pub use tree::Dom;
