use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The arena could not grow. The tree is unchanged.
    #[error("node allocation failed")]
    AllocationFailed,
}

/// At least one traversal action reported failure.
///
/// The walk still visited every element; `first` is the error returned by
/// the earliest failing action in visitation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("traversal action failed on {failures} element(s)")]
pub struct TraversalError<E> {
    pub failures: usize,
    pub first: E,
}
