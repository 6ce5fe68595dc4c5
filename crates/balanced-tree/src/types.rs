//! Node trait definitions.
//!
//! Nodes are stored in an [`Arena`](crate::arena::Arena) and refer to their
//! children through `Option<u32>` indices. All tree-manipulation functions
//! take the arena and work with indices; a node never owns another node
//! directly, and there are no parent links.

/// Height of an absent subtree. A leaf has height `0`.
pub const EMPTY_HEIGHT: i32 = -1;

/// Child links (`l`, `r`).
pub trait Node {
    fn l(&self) -> Option<u32>;
    fn r(&self) -> Option<u32>;
    fn set_l(&mut self, v: Option<u32>);
    fn set_r(&mut self, v: Option<u32>);
}

/// Element access plus the cached subtree height used by the balancing code.
pub trait AvlNodeLike<T>: Node {
    fn value(&self) -> &T;
    fn value_mut(&mut self) -> &mut T;
    fn height(&self) -> i32;
    fn set_height(&mut self, h: i32);
    fn into_value(self) -> T
    where
        Self: Sized;
}

/// Three-way ordering of a stored element against a query element.
///
/// Returns a negative number when `stored` sorts before `query`, zero when
/// they are equal and a positive number otherwise. The third argument is the
/// context value the tree was created with.
pub type Comparator<T, X> = fn(&T, &T, &X) -> i32;

/// Natural-order comparator for `PartialOrd` elements; ignores the context.
pub fn default_comparator<T: PartialOrd, X>(stored: &T, query: &T, _ctx: &X) -> i32 {
    if stored == query {
        0
    } else if stored < query {
        -1
    } else {
        1
    }
}
