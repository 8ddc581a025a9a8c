use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// A dispatch was refused because it would nest deeper than
    /// [`StoreConfig::max_dispatch_depth`](crate::StoreConfig::max_dispatch_depth).
    #[error("dispatch nested {depth} levels deep, limit is {limit}")]
    DispatchDepthExceeded { depth: usize, limit: usize },

    #[error("store has been dropped")]
    StoreDropped,
}

pub(crate) type ErrorHandler = Arc<dyn Fn(&StoreError) + Send + Sync + 'static>;
