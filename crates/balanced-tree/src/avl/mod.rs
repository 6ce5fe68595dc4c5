//! AVL node type and the balancing routines over an arena.

pub mod types;
pub mod util;

pub use types::AvlNode;
pub use util::Rotation;
