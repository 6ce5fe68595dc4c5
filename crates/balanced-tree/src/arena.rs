//! Index-addressed node storage.
//!
//! Slots are addressed by `u32`. A freed slot joins an intrusive free list
//! and is handed out again by the next allocation, so indices stay dense
//! across insert/remove churn.

use std::ops::{Index, IndexMut};

use crate::error::TreeError;

enum Slot<N> {
    Occupied(N),
    Vacant { next_free: Option<u32> },
}

pub struct Arena<N> {
    slots: Vec<Slot<N>>,
    free: Option<u32>,
    len: usize,
}

impl<N> Arena<N> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: None,
            len: 0,
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, TreeError> {
        let mut arena = Self::new();
        arena.reserve(capacity)?;
        Ok(arena)
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reserve(&mut self, additional: usize) -> Result<(), TreeError> {
        self.slots.try_reserve(additional).map_err(|err| {
            log::debug!("arena reserve of {additional} slots failed: {err}");
            TreeError::AllocationFailed
        })
    }

    /// Stores `node` and returns its index. On failure `node` is dropped and
    /// the arena is left as it was.
    pub fn try_alloc(&mut self, node: N) -> Result<u32, TreeError> {
        if let Some(idx) = self.free {
            let slot = &mut self.slots[idx as usize];
            let Slot::Vacant { next_free } = *slot else {
                unreachable!("free list points at occupied slot {idx}");
            };
            log::trace!("reusing arena slot {idx}");
            *slot = Slot::Occupied(node);
            self.free = next_free;
            self.len += 1;
            return Ok(idx);
        }

        let Ok(idx) = u32::try_from(self.slots.len()) else {
            log::debug!("arena index space exhausted");
            return Err(TreeError::AllocationFailed);
        };
        self.reserve(1)?;
        self.slots.push(Slot::Occupied(node));
        self.len += 1;
        Ok(idx)
    }

    /// Vacates slot `idx`, returning its node. Returns `None` if the slot was
    /// already vacant or out of range.
    pub fn free(&mut self, idx: u32) -> Option<N> {
        let slot = self.slots.get_mut(idx as usize)?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }
        let prev = std::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free,
            },
        );
        self.free = Some(idx);
        self.len -= 1;
        match prev {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, idx: u32) -> Option<&N> {
        match self.slots.get(idx as usize)? {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    /// Mutable access to two distinct occupied slots at once.
    ///
    /// Panics if `a == b` or either slot is vacant.
    pub fn pair_mut(&mut self, a: u32, b: u32) -> (&mut N, &mut N) {
        assert_ne!(a, b, "pair_mut requires distinct slots");
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.slots.split_at_mut(hi as usize);
        match (&mut head[lo as usize], &mut tail[0]) {
            (Slot::Occupied(lo_node), Slot::Occupied(hi_node)) => {
                if a < b {
                    (lo_node, hi_node)
                } else {
                    (hi_node, lo_node)
                }
            }
            _ => panic!("arena slot {lo} or {hi} is vacant"),
        }
    }

    /// Drops every node. Keeps the allocated capacity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free = None;
        self.len = 0;
    }
}

impl<N> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Index<u32> for Arena<N> {
    type Output = N;

    fn index(&self, idx: u32) -> &N {
        match &self.slots[idx as usize] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("arena slot {idx} is vacant"),
        }
    }
}

impl<N> IndexMut<u32> for Arena<N> {
    fn index_mut(&mut self, idx: u32) -> &mut N {
        match &mut self.slots[idx as usize] {
            Slot::Occupied(node) => node,
            Slot::Vacant { .. } => panic!("arena slot {idx} is vacant"),
        }
    }
}
