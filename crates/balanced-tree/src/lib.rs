//! Generic AVL tree over a caller-supplied three-way comparator.
//!
//! Nodes live in an index-addressed [`Arena`](arena::Arena) rather than
//! behind pointers: every child link is an `Option<u32>` slot index, each
//! node is reachable from exactly one parent, and removed slots are recycled
//! through a free list.
//!
//! Every mutation descends from the root, makes its leaf-level change, and
//! rebalances each ancestor on the way back up, so insert, remove and find
//! are all O(log n).
//!
//! # Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! [`types`] | [`Node`] / [`AvlNodeLike`] traits, comparator alias, [`EMPTY_HEIGHT`] |
//! [`arena`] | Slot storage with a free list |
//! [`avl`] | [`AvlNode`], height bookkeeping, rotations, insert/remove/find |
//! [`traverse`] | In/pre/post-order walks with aggregated failure status |
//! [`print`] | `├─` / `└─` tree dump helper |
//! [`tree`] | [`BalancedTree`], the public handle |
//!
//! ```
//! use balanced_tree::{BalancedTree, TraversalOrder};
//!
//! let mut tree = BalancedTree::new();
//! for v in [5, 3, 8, 1] {
//!     tree.insert(v).unwrap();
//! }
//! assert!(tree.contains(&3));
//! assert_eq!(tree.remove(&3), Some(3));
//! assert_eq!(tree.values(TraversalOrder::InOrder), vec![&1, &5, &8]);
//! ```

pub mod arena;
pub mod avl;
pub mod error;
pub mod print;
pub mod traverse;
pub mod tree;
pub mod types;

pub use avl::{AvlNode, Rotation};
pub use error::{TraversalError, TreeError};
pub use traverse::TraversalOrder;
pub use tree::BalancedTree;
pub use types::{default_comparator, AvlNodeLike, Comparator, Node, EMPTY_HEIGHT};
