pub mod partition;
pub mod progress;
pub mod reduce;
#[cfg(feature = "mt")]
pub mod reduce_mt;
pub mod result;

pub use partition::CategoryIndex;
pub use progress::{NoProgress, ProgressObserver, TracingProgress};
pub use reduce::{AggregateOptions, GeneMeanReducer, ReduceStrategy, aggregate};
pub use result::{AggregationResult, CollisionPolicy};
