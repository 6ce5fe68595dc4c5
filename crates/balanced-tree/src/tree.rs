use std::fmt;

use crate::arena::Arena;
use crate::avl::types::AvlNode;
use crate::avl::util;
use crate::error::{TraversalError, TreeError};
use crate::traverse::{self, TraversalOrder};
use crate::types::{default_comparator, Comparator};

/// Self-balancing (AVL) binary search tree.
///
/// Ordering is defined by a three-way `comparator(stored, query, context)`;
/// the `context` value given at construction is passed to every call.
/// Elements comparing equal are not rejected: a duplicate is stored to the
/// left of its equal.
pub struct BalancedTree<T, X = (), C = Comparator<T, X>>
where
    C: Fn(&T, &T, &X) -> i32,
{
    root: Option<u32>,
    comparator: C,
    context: X,
    arena: Arena<AvlNode<T>>,
}

impl<T> BalancedTree<T, (), Comparator<T, ()>>
where
    T: PartialOrd,
{
    pub fn new() -> Self {
        Self::with_comparator(default_comparator::<T, ()>, ())
    }
}

impl<T> Default for BalancedTree<T, (), Comparator<T, ()>>
where
    T: PartialOrd,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, X, C> BalancedTree<T, X, C>
where
    C: Fn(&T, &T, &X) -> i32,
{
    pub fn with_comparator(comparator: C, context: X) -> Self {
        Self {
            root: None,
            comparator,
            context,
            arena: Arena::new(),
        }
    }

    /// Like [`with_comparator`](Self::with_comparator), with room for
    /// `capacity` elements reserved up front.
    pub fn with_capacity(capacity: usize, comparator: C, context: X) -> Result<Self, TreeError> {
        Ok(Self {
            root: None,
            comparator,
            context,
            arena: Arena::with_capacity(capacity)?,
        })
    }

    pub fn reserve(&mut self, additional: usize) -> Result<(), TreeError> {
        self.arena.reserve(additional)
    }

    pub fn context(&self) -> &X {
        &self.context
    }

    /// Inserts `value`, rebalancing every ancestor of the new leaf.
    ///
    /// Fails only when a node cannot be allocated; the tree is then left
    /// exactly as it was.
    pub fn insert(&mut self, value: T) -> Result<(), TreeError> {
        let node = self.arena.try_alloc(AvlNode::new(value))?;
        self.root = Some(util::insert(
            &mut self.arena,
            self.root,
            node,
            &self.comparator,
            &self.context,
        ));
        Ok(())
    }

    /// Removes one element comparing equal to `query` and returns it.
    /// Removing a missing element is a no-op.
    pub fn remove(&mut self, query: &T) -> Option<T> {
        let (root, removed) = util::remove(
            &mut self.arena,
            self.root,
            query,
            &self.comparator,
            &self.context,
        );
        self.root = root;
        removed
    }

    pub fn find(&self, query: &T) -> Option<&T> {
        util::find(
            &self.arena,
            self.root,
            query,
            &self.comparator,
            &self.context,
        )
        .map(|i| &self.arena[i].v)
    }

    pub fn contains(&self, query: &T) -> bool {
        self.find(query).is_some()
    }

    /// Smallest element under the comparator.
    pub fn first(&self) -> Option<&T> {
        util::first(&self.arena, self.root).map(|i| &self.arena[i].v)
    }

    /// Largest element under the comparator.
    pub fn last(&self) -> Option<&T> {
        util::last(&self.arena, self.root).map(|i| &self.arena[i].v)
    }

    /// Number of elements, counted by walking the tree.
    pub fn size(&self) -> usize {
        util::size(&self.arena, self.root)
    }

    /// Height of the root; a single element has height `0` and the empty
    /// tree has height [`EMPTY_HEIGHT`](crate::EMPTY_HEIGHT).
    pub fn height(&self) -> i32 {
        util::height(&self.arena, self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drops every element. The tree stays usable.
    pub fn clear(&mut self) {
        log::debug!("clearing tree of {} nodes", self.arena.len());
        self.arena.clear();
        self.root = None;
    }

    /// Calls `action(element, params)` on every element in `order`.
    ///
    /// The walk never stops early. If any call fails the result is an error
    /// carrying the failure count and the first error; elements visited after
    /// a failure are still passed to `action`.
    ///
    /// `action` may mutate elements but must not change how they compare.
    pub fn for_each<A, E, F>(
        &mut self,
        order: TraversalOrder,
        mut action: F,
        params: &mut A,
    ) -> Result<(), TraversalError<E>>
    where
        F: FnMut(&mut T, &mut A) -> Result<(), E>,
    {
        traverse::for_each(&mut self.arena, self.root, order, &mut action, params)
    }

    /// Read-only visit of every element in `order`.
    pub fn walk<F>(&self, order: TraversalOrder, mut f: F)
    where
        F: FnMut(&T),
    {
        traverse::walk(&self.arena, self.root, order, &mut f);
    }

    /// Every element in `order`.
    pub fn values(&self, order: TraversalOrder) -> Vec<&T> {
        let mut out = Vec::new();
        self.collect_refs(self.root, order, &mut out);
        out
    }

    fn collect_refs<'a>(&'a self, node: Option<u32>, order: TraversalOrder, out: &mut Vec<&'a T>) {
        let Some(i) = node else {
            return;
        };
        let n = &self.arena[i];
        if order == TraversalOrder::PreOrder {
            out.push(&n.v);
        }
        self.collect_refs(n.l, order, out);
        if order == TraversalOrder::InOrder {
            out.push(&n.v);
        }
        self.collect_refs(n.r, order, out);
        if order == TraversalOrder::PostOrder {
            out.push(&n.v);
        }
    }

    /// Checks ordering, balance, cached heights, and that no node is leaked.
    pub fn assert_valid(&self) -> Result<(), String> {
        let reachable =
            util::assert_avl_tree(&self.arena, self.root, &self.comparator, &self.context)?;
        if reachable != self.arena.len() {
            return Err(format!(
                "Reachable node count {reachable} does not match {} allocated nodes",
                self.arena.len()
            ));
        }
        Ok(())
    }

    /// Indented dump of the tree, each node shown with its cached height.
    pub fn print(&self, tab: &str) -> String
    where
        T: fmt::Display,
    {
        util::print(&self.arena, self.root, tab)
    }
}

impl<T, X, C> fmt::Debug for BalancedTree<T, X, C>
where
    T: fmt::Debug,
    C: Fn(&T, &T, &X) -> i32,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.values(TraversalOrder::InOrder))
            .finish()
    }
}
