use std::fmt::Display;

use crate::arena::Arena;
use crate::print::{print_tree, PrintChild};
use crate::types::{AvlNodeLike, EMPTY_HEIGHT};

/// The four restructurings used to restore balance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// Left subtree of the left child is too tall: single right rotation.
    LeftLeft,
    /// Right subtree of the right child is too tall: single left rotation.
    RightRight,
    /// Right subtree of the left child is too tall: left then right rotation.
    LeftRight,
    /// Left subtree of the right child is too tall: right then left rotation.
    RightLeft,
}

#[inline]
fn set_l<T, N>(arena: &mut Arena<N>, i: u32, v: Option<u32>)
where
    N: AvlNodeLike<T>,
{
    arena[i].set_l(v);
}

#[inline]
fn set_r<T, N>(arena: &mut Arena<N>, i: u32, v: Option<u32>)
where
    N: AvlNodeLike<T>,
{
    arena[i].set_r(v);
}

/// Cached height of `node`, or [`EMPTY_HEIGHT`] for an absent subtree.
#[inline]
pub fn height<T, N>(arena: &Arena<N>, node: Option<u32>) -> i32
where
    N: AvlNodeLike<T>,
{
    node.map_or(EMPTY_HEIGHT, |i| arena[i].height())
}

/// `height(left) - height(right)`.
#[inline]
pub fn balance_factor<T, N>(arena: &Arena<N>, node: u32) -> i32
where
    N: AvlNodeLike<T>,
{
    let n = &arena[node];
    height(arena, n.l()) - height(arena, n.r())
}

pub fn is_balanced<T, N>(arena: &Arena<N>, node: Option<u32>) -> bool
where
    N: AvlNodeLike<T>,
{
    node.map_or(true, |i| (-1..=1).contains(&balance_factor(arena, i)))
}

/// Recomputes the cached height of `node` from its children's cached heights.
#[inline]
pub fn update_height<T, N>(arena: &mut Arena<N>, node: u32)
where
    N: AvlNodeLike<T>,
{
    let h = {
        let n = &arena[node];
        1 + height(arena, n.l()).max(height(arena, n.r()))
    };
    arena[node].set_height(h);
}

fn ll_rotate<T, N>(arena: &mut Arena<N>, n: u32) -> u32
where
    N: AvlNodeLike<T>,
{
    let Some(nl) = arena[n].l() else {
        return n;
    };
    let nlr = arena[nl].r();

    set_l(arena, n, nlr);
    set_r(arena, nl, Some(n));
    update_height(arena, n);
    update_height(arena, nl);
    nl
}

fn rr_rotate<T, N>(arena: &mut Arena<N>, n: u32) -> u32
where
    N: AvlNodeLike<T>,
{
    let Some(nr) = arena[n].r() else {
        return n;
    };
    let nrl = arena[nr].l();

    set_r(arena, n, nrl);
    set_l(arena, nr, Some(n));
    update_height(arena, n);
    update_height(arena, nr);
    nr
}

fn lr_rotate<T, N>(arena: &mut Arena<N>, n: u32) -> u32
where
    N: AvlNodeLike<T>,
{
    if let Some(nl) = arena[n].l() {
        let pivot = rr_rotate(arena, nl);
        set_l(arena, n, Some(pivot));
    }
    ll_rotate(arena, n)
}

fn rl_rotate<T, N>(arena: &mut Arena<N>, n: u32) -> u32
where
    N: AvlNodeLike<T>,
{
    if let Some(nr) = arena[n].r() {
        let pivot = ll_rotate(arena, nr);
        set_r(arena, n, Some(pivot));
    }
    rr_rotate(arena, n)
}

/// Applies `rotation` to the subtree rooted at `n` and returns the new
/// subtree root. Heights of every relinked node are recomputed.
pub fn rotate<T, N>(arena: &mut Arena<N>, n: u32, rotation: Rotation) -> u32
where
    N: AvlNodeLike<T>,
{
    log::trace!("{rotation:?} rotation at node {n}");
    match rotation {
        Rotation::LeftLeft => ll_rotate(arena, n),
        Rotation::RightRight => rr_rotate(arena, n),
        Rotation::LeftRight => lr_rotate(arena, n),
        Rotation::RightLeft => rl_rotate(arena, n),
    }
}

/// Picks the rotation that fixes `n`, or `None` if `n` is within balance.
/// Children of `n` must already carry correct heights.
pub fn pick_rotation<T, N>(arena: &Arena<N>, n: u32) -> Option<Rotation>
where
    N: AvlNodeLike<T>,
{
    let bf = balance_factor(arena, n);
    if bf > 1 {
        match arena[n].l() {
            Some(l) if balance_factor(arena, l) < 0 => Some(Rotation::LeftRight),
            _ => Some(Rotation::LeftLeft),
        }
    } else if bf < -1 {
        match arena[n].r() {
            Some(r) if balance_factor(arena, r) > 0 => Some(Rotation::RightLeft),
            _ => Some(Rotation::RightRight),
        }
    } else {
        None
    }
}

/// Restores the AVL property at `n`, assuming both subtrees are already
/// valid AVL trees with correct cached heights. Returns the subtree root.
pub fn rebalance<T, N>(arena: &mut Arena<N>, n: u32) -> u32
where
    N: AvlNodeLike<T>,
{
    update_height(arena, n);
    match pick_rotation(arena, n) {
        Some(rotation) => rotate(arena, n, rotation),
        None => n,
    }
}

/// Links the detached node `n` into the subtree at `root` and returns the
/// new subtree root. Elements comparing equal go left.
pub fn insert<T, N, X, C>(
    arena: &mut Arena<N>,
    root: Option<u32>,
    n: u32,
    comparator: &C,
    ctx: &X,
) -> u32
where
    N: AvlNodeLike<T>,
    C: Fn(&T, &T, &X) -> i32,
{
    let Some(curr) = root else {
        return n;
    };

    if comparator(arena[curr].value(), arena[n].value(), ctx) < 0 {
        let r = arena[curr].r();
        let r = insert(arena, r, n, comparator, ctx);
        set_r(arena, curr, Some(r));
    } else {
        let l = arena[curr].l();
        let l = insert(arena, l, n, comparator, ctx);
        set_l(arena, curr, Some(l));
    }
    rebalance(arena, curr)
}

/// Index of the first node on the search path comparing equal to `query`.
pub fn find<T, N, X, C>(
    arena: &Arena<N>,
    root: Option<u32>,
    query: &T,
    comparator: &C,
    ctx: &X,
) -> Option<u32>
where
    N: AvlNodeLike<T>,
    C: Fn(&T, &T, &X) -> i32,
{
    let mut curr = root;
    while let Some(i) = curr {
        let cmp = comparator(arena[i].value(), query, ctx);
        if cmp == 0 {
            return Some(i);
        }
        curr = if cmp < 0 { arena[i].r() } else { arena[i].l() };
    }
    None
}

/// Detaches the left-most node of the subtree at `n`.
///
/// Returns the new subtree root and the detached node, whose links are
/// cleared.
fn take_min<T, N>(arena: &mut Arena<N>, n: u32) -> (Option<u32>, u32)
where
    N: AvlNodeLike<T>,
{
    let Some(l) = arena[n].l() else {
        let r = arena[n].r();
        set_r(arena, n, None);
        return (r, n);
    };
    let (l, min) = take_min(arena, l);
    set_l(arena, n, l);
    (Some(rebalance(arena, n)), min)
}

/// Removes the first node comparing equal to `query` from the subtree at
/// `root`, rebalancing every ancestor on the way back up.
///
/// Returns the new subtree root and the removed element.
pub fn remove<T, N, X, C>(
    arena: &mut Arena<N>,
    root: Option<u32>,
    query: &T,
    comparator: &C,
    ctx: &X,
) -> (Option<u32>, Option<T>)
where
    N: AvlNodeLike<T>,
    C: Fn(&T, &T, &X) -> i32,
{
    let Some(n) = root else {
        return (None, None);
    };

    let cmp = comparator(arena[n].value(), query, ctx);
    if cmp != 0 {
        let removed = if cmp < 0 {
            let r = arena[n].r();
            let (r, removed) = remove(arena, r, query, comparator, ctx);
            set_r(arena, n, r);
            removed
        } else {
            let l = arena[n].l();
            let (l, removed) = remove(arena, l, query, comparator, ctx);
            set_l(arena, n, l);
            removed
        };
        if removed.is_none() {
            return (Some(n), None);
        }
        return (Some(rebalance(arena, n)), removed);
    }

    match (arena[n].l(), arena[n].r()) {
        (Some(_), Some(r)) => {
            // Two children: the in-order successor's element takes this
            // node's place and the successor's slot is released instead.
            let (r, succ) = take_min(arena, r);
            set_r(arena, n, r);
            {
                let (node, successor) = arena.pair_mut(n, succ);
                std::mem::swap(node.value_mut(), successor.value_mut());
            }
            let removed = arena.free(succ).map(N::into_value);
            (Some(rebalance(arena, n)), removed)
        }
        (l, r) => {
            let removed = arena.free(n).map(N::into_value);
            (l.or(r), removed)
        }
    }
}

/// Number of nodes reachable from `node`.
pub fn size<T, N>(arena: &Arena<N>, node: Option<u32>) -> usize
where
    N: AvlNodeLike<T>,
{
    match node {
        None => 0,
        Some(i) => 1 + size(arena, arena[i].l()) + size(arena, arena[i].r()),
    }
}

/// Left-most node.
pub fn first<T, N>(arena: &Arena<N>, root: Option<u32>) -> Option<u32>
where
    N: AvlNodeLike<T>,
{
    let mut curr = root?;
    while let Some(l) = arena[curr].l() {
        curr = l;
    }
    Some(curr)
}

/// Right-most node.
pub fn last<T, N>(arena: &Arena<N>, root: Option<u32>) -> Option<u32>
where
    N: AvlNodeLike<T>,
{
    let mut curr = root?;
    while let Some(r) = arena[curr].r() {
        curr = r;
    }
    Some(curr)
}

/// Checks ordering, balance and cached heights of the subtree at `root`.
///
/// Returns the number of reachable nodes.
pub fn assert_avl_tree<T, N, X, C>(
    arena: &Arena<N>,
    root: Option<u32>,
    comparator: &C,
    ctx: &X,
) -> Result<usize, String>
where
    N: AvlNodeLike<T>,
    C: Fn(&T, &T, &X) -> i32,
{
    fn validate_heights<T, N>(arena: &Arena<N>, node: u32, count: &mut usize) -> Result<i32, String>
    where
        N: AvlNodeLike<T>,
    {
        *count += 1;
        let n = &arena[node];
        let lh = match n.l() {
            Some(l) => validate_heights(arena, l, count)?,
            None => EMPTY_HEIGHT,
        };
        let rh = match n.r() {
            Some(r) => validate_heights(arena, r, count)?,
            None => EMPTY_HEIGHT,
        };

        let expected = 1 + lh.max(rh);
        if n.height() != expected {
            return Err(format!(
                "Height mismatch at node {node}: expected {expected}, got {}",
                n.height()
            ));
        }
        if !(-1..=1).contains(&(lh - rh)) {
            return Err(format!("AVL balance violated at node {node}: bf={}", lh - rh));
        }
        Ok(expected)
    }

    fn in_order<T, N>(arena: &Arena<N>, node: Option<u32>, out: &mut Vec<u32>)
    where
        N: AvlNodeLike<T>,
    {
        if let Some(i) = node {
            in_order(arena, arena[i].l(), out);
            out.push(i);
            in_order(arena, arena[i].r(), out);
        }
    }

    let Some(root) = root else {
        return Ok(0);
    };

    let mut count = 0;
    validate_heights(arena, root, &mut count)?;

    let mut order = Vec::with_capacity(count);
    in_order(arena, Some(root), &mut order);
    for pair in order.windows(2) {
        if comparator(arena[pair[0]].value(), arena[pair[1]].value(), ctx) > 0 {
            return Err(format!(
                "Node order violated between nodes {} and {}",
                pair[0], pair[1]
            ));
        }
    }

    Ok(count)
}

/// Debug dump of the subtree at `node`, one line per node.
pub fn print<T, N>(arena: &Arena<N>, node: Option<u32>, tab: &str) -> String
where
    T: Display,
    N: AvlNodeLike<T>,
{
    match node {
        None => "∅".to_string(),
        Some(i) => {
            let n = &arena[i];
            let (l, r) = (n.l(), n.r());
            let left: &PrintChild<'_> = &|tab: &str| print::<T, N>(arena, l, tab);
            let right: &PrintChild<'_> = &|tab: &str| print::<T, N>(arena, r, tab);
            format!(
                "{} [h={}]{}",
                n.value(),
                n.height(),
                print_tree(Some(tab), &[Some(left), Some(right)])
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::avl::types::AvlNode;

    fn cmp(stored: &i32, query: &i32, _ctx: &()) -> i32 {
        stored.cmp(query) as i32
    }

    fn build(values: &[i32]) -> (Arena<AvlNode<i32>>, Option<u32>) {
        let mut arena = Arena::new();
        let mut root = None;
        for &v in values {
            let n = arena.try_alloc(AvlNode::new(v)).unwrap();
            root = Some(insert(&mut arena, root, n, &cmp, &()));
        }
        (arena, root)
    }

    fn in_order(arena: &Arena<AvlNode<i32>>, node: Option<u32>, out: &mut Vec<i32>) {
        if let Some(i) = node {
            in_order(arena, arena[i].l, out);
            out.push(arena[i].v);
            in_order(arena, arena[i].r, out);
        }
    }

    /// Links a chain by hand, bypassing rebalancing, for rotation tests.
    fn chain(arena: &mut Arena<AvlNode<i32>>, links: &[(i32, Option<usize>, Option<usize>)]) -> Vec<u32> {
        let idx: Vec<u32> = links
            .iter()
            .map(|&(v, _, _)| arena.try_alloc(AvlNode::new(v)).unwrap())
            .collect();
        for (i, &(_, l, r)) in links.iter().enumerate().rev() {
            arena[idx[i]].l = l.map(|j| idx[j]);
            arena[idx[i]].r = r.map(|j| idx[j]);
            update_height(arena, idx[i]);
        }
        idx
    }

    #[test]
    fn height_of_absent_subtree_is_minus_one() {
        let arena: Arena<AvlNode<i32>> = Arena::new();
        assert_eq!(height(&arena, None), -1);
        assert!(is_balanced(&arena, None));
    }

    #[test]
    fn left_left_case_rotates_right() {
        let mut arena = Arena::new();
        // 3 -> 2 -> 1 down the left spine.
        let idx = chain(&mut arena, &[(3, Some(1), None), (2, Some(2), None), (1, None, None)]);
        assert_eq!(balance_factor(&arena, idx[0]), 2);
        assert_eq!(pick_rotation(&arena, idx[0]), Some(Rotation::LeftLeft));

        let root = rebalance(&mut arena, idx[0]);
        assert_eq!(root, idx[1]);
        assert_eq!(arena[root].l, Some(idx[2]));
        assert_eq!(arena[root].r, Some(idx[0]));
        assert_eq!(arena[root].h, 1);
        assert_eq!(assert_avl_tree(&arena, Some(root), &cmp, &()), Ok(3));
    }

    #[test]
    fn right_right_case_rotates_left() {
        let mut arena = Arena::new();
        let idx = chain(&mut arena, &[(1, None, Some(1)), (2, None, Some(2)), (3, None, None)]);
        assert_eq!(pick_rotation(&arena, idx[0]), Some(Rotation::RightRight));

        let root = rebalance(&mut arena, idx[0]);
        assert_eq!(root, idx[1]);
        assert_eq!(arena[root].l, Some(idx[0]));
        assert_eq!(arena[root].r, Some(idx[2]));
    }

    #[test]
    fn left_right_case_double_rotates() {
        let mut arena = Arena::new();
        // 3 with left child 1, which has right child 2.
        let idx = chain(&mut arena, &[(3, Some(1), None), (1, None, Some(2)), (2, None, None)]);
        assert_eq!(pick_rotation(&arena, idx[0]), Some(Rotation::LeftRight));

        let root = rebalance(&mut arena, idx[0]);
        assert_eq!(arena[root].v, 2);
        assert_eq!(arena[root].l.map(|i| arena[i].v), Some(1));
        assert_eq!(arena[root].r.map(|i| arena[i].v), Some(3));
        assert_eq!(assert_avl_tree(&arena, Some(root), &cmp, &()), Ok(3));
    }

    #[test]
    fn right_left_case_double_rotates() {
        let mut arena = Arena::new();
        let idx = chain(&mut arena, &[(1, None, Some(1)), (3, Some(2), None), (2, None, None)]);
        assert_eq!(pick_rotation(&arena, idx[0]), Some(Rotation::RightLeft));

        let root = rebalance(&mut arena, idx[0]);
        assert_eq!(arena[root].v, 2);
        assert_eq!(arena[root].l.map(|i| arena[i].v), Some(1));
        assert_eq!(arena[root].r.map(|i| arena[i].v), Some(3));
    }

    #[test]
    fn even_child_uses_single_rotation() {
        let mut arena = Arena::new();
        // Left child 2 has both children: its balance factor is 0.
        let idx = chain(
            &mut arena,
            &[
                (5, Some(1), None),
                (2, Some(2), Some(3)),
                (1, None, None),
                (3, None, None),
            ],
        );
        assert_eq!(balance_factor(&arena, idx[1]), 0);
        assert_eq!(pick_rotation(&arena, idx[0]), Some(Rotation::LeftLeft));
        let root = rebalance(&mut arena, idx[0]);
        assert_eq!(arena[root].v, 2);
        assert_eq!(assert_avl_tree(&arena, Some(root), &cmp, &()), Ok(4));
    }

    #[test]
    fn insert_keeps_order_and_balance() {
        let (arena, root) = build(&[1, 2, 3, 4, 5, 6, 7]);
        let mut out = Vec::new();
        in_order(&arena, root, &mut out);
        assert_eq!(out, vec![1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(height(&arena, root), 2);
        assert_eq!(root.map(|r| arena[r].v), Some(4));
    }

    #[test]
    fn remove_two_child_node_moves_successor() {
        let (mut arena, root) = build(&[4, 2, 6, 1, 3, 5, 7]);
        let (root, removed) = remove(&mut arena, root, &4, &cmp, &());
        assert_eq!(removed, Some(4));
        assert_eq!(root.map(|r| arena[r].v), Some(5));
        assert_eq!(assert_avl_tree(&arena, root, &cmp, &()), Ok(6));
        assert_eq!(arena.len(), 6);
    }

    #[test]
    fn remove_successor_is_right_child() {
        let (mut arena, root) = build(&[2, 1, 3]);
        let (root, removed) = remove(&mut arena, root, &2, &cmp, &());
        assert_eq!(removed, Some(2));
        let mut out = Vec::new();
        in_order(&arena, root, &mut out);
        assert_eq!(out, vec![1, 3]);
        assert_eq!(root.map(|r| arena[r].v), Some(3));
    }

    #[test]
    fn remove_missing_is_noop() {
        let (mut arena, root) = build(&[2, 1, 3]);
        let (after, removed) = remove(&mut arena, root, &9, &cmp, &());
        assert_eq!(removed, None);
        assert_eq!(after, root);
        assert_eq!(arena.len(), 3);
    }

    #[test]
    fn first_last_and_size() {
        let (arena, root) = build(&[8, 3, 10, 1, 6, 14]);
        assert_eq!(first(&arena, root).map(|i| arena[i].v), Some(1));
        assert_eq!(last(&arena, root).map(|i| arena[i].v), Some(14));
        assert_eq!(size(&arena, root), 6);
        assert_eq!(size(&arena, None), 0);
    }

    #[test]
    fn assert_avl_tree_detects_stale_height() {
        let (mut arena, root) = build(&[2, 1, 3]);
        let r = root.unwrap();
        arena[r].h = 5;
        assert!(assert_avl_tree(&arena, root, &cmp, &())
            .unwrap_err()
            .starts_with("Height mismatch"));
    }

    #[test]
    fn print_renders_children() {
        let (arena, root) = build(&[2, 1]);
        assert_eq!(print(&arena, root, ""), "2 [h=1]\n├─ 1 [h=0]\n│  ├─ ∅\n│  └─ ∅\n└─ ∅");
    }
}
