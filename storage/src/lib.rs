pub mod graph;
pub mod node;

pub use graph::{GraphError, ObjectGraph, Related, Walk};
pub use node::{Node, RelationKind};
