use crate::types::{AvlNodeLike, Node};

/// A single tree element with its child links and cached height.
#[derive(Clone, Debug)]
pub struct AvlNode<T> {
    pub l: Option<u32>,
    pub r: Option<u32>,
    pub v: T,
    /// Height of the subtree rooted here; a leaf is `0`.
    pub h: i32,
}

impl<T> AvlNode<T> {
    pub fn new(v: T) -> Self {
        Self {
            l: None,
            r: None,
            v,
            h: 0,
        }
    }
}

impl<T> Node for AvlNode<T> {
    fn l(&self) -> Option<u32> {
        self.l
    }

    fn r(&self) -> Option<u32> {
        self.r
    }

    fn set_l(&mut self, v: Option<u32>) {
        self.l = v;
    }

    fn set_r(&mut self, v: Option<u32>) {
        self.r = v;
    }
}

impl<T> AvlNodeLike<T> for AvlNode<T> {
    fn value(&self) -> &T {
        &self.v
    }

    fn value_mut(&mut self) -> &mut T {
        &mut self.v
    }

    fn height(&self) -> i32 {
        self.h
    }

    fn set_height(&mut self, h: i32) {
        self.h = h;
    }

    fn into_value(self) -> T {
        self.v
    }
}
