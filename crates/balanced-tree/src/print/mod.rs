//! Tree-dump helpers for debug output.

pub mod print_tree;
pub mod types;

pub use print_tree::print_tree;
pub use types::PrintChild;
