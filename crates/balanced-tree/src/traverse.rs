//! Depth-first walks over the arena.
//!
//! A walk visits every node exactly once. Action failures are collected
//! rather than short-circuiting, so side effects of the action are applied
//! to the whole tree even when the overall result is an error.

use crate::arena::Arena;
use crate::error::TraversalError;
use crate::types::AvlNodeLike;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TraversalOrder {
    /// Left, self, right. Yields elements in ascending comparator order.
    #[default]
    InOrder,
    /// Self, left, right.
    PreOrder,
    /// Left, right, self.
    PostOrder,
}

struct Outcome<E> {
    failures: usize,
    first: Option<E>,
}

impl<E> Outcome<E> {
    fn new() -> Self {
        Self {
            failures: 0,
            first: None,
        }
    }

    fn record(&mut self, status: Result<(), E>) {
        if let Err(err) = status {
            self.failures += 1;
            self.first.get_or_insert(err);
        }
    }

    fn into_result(self) -> Result<(), TraversalError<E>> {
        match self.first {
            None => Ok(()),
            Some(first) => Err(TraversalError {
                failures: self.failures,
                first,
            }),
        }
    }
}

/// Runs `action` on every element reachable from `root` in `order`.
pub fn for_each<T, N, A, E, F>(
    arena: &mut Arena<N>,
    root: Option<u32>,
    order: TraversalOrder,
    action: &mut F,
    params: &mut A,
) -> Result<(), TraversalError<E>>
where
    N: AvlNodeLike<T>,
    F: FnMut(&mut T, &mut A) -> Result<(), E>,
{
    fn visit<T, N, A, E, F>(
        arena: &mut Arena<N>,
        node: Option<u32>,
        order: TraversalOrder,
        action: &mut F,
        params: &mut A,
        outcome: &mut Outcome<E>,
    ) where
        N: AvlNodeLike<T>,
        F: FnMut(&mut T, &mut A) -> Result<(), E>,
    {
        let Some(i) = node else {
            return;
        };
        let (l, r) = (arena[i].l(), arena[i].r());

        if order == TraversalOrder::PreOrder {
            outcome.record(action(arena[i].value_mut(), params));
        }
        visit(arena, l, order, action, params, outcome);
        if order == TraversalOrder::InOrder {
            outcome.record(action(arena[i].value_mut(), params));
        }
        visit(arena, r, order, action, params, outcome);
        if order == TraversalOrder::PostOrder {
            outcome.record(action(arena[i].value_mut(), params));
        }
    }

    let mut outcome = Outcome::new();
    visit(arena, root, order, action, params, &mut outcome);
    outcome.into_result()
}

/// Read-only walk over every element reachable from `root` in `order`.
pub fn walk<T, N, F>(arena: &Arena<N>, root: Option<u32>, order: TraversalOrder, f: &mut F)
where
    N: AvlNodeLike<T>,
    F: FnMut(&T),
{
    let Some(i) = root else {
        return;
    };
    let n = &arena[i];
    if order == TraversalOrder::PreOrder {
        f(n.value());
    }
    walk(arena, n.l(), order, f);
    if order == TraversalOrder::InOrder {
        f(n.value());
    }
    walk(arena, n.r(), order, f);
    if order == TraversalOrder::PostOrder {
        f(n.value());
    }
}
