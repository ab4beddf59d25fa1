//! Query operators.
//!
//! Every operator implements [`QueryOperator`]. Opening an operator yields
//! [`QueryResults`], which hand their partitioned stream to a
//! [`StreamRecipient`] once the consumer is ready to drive it.

mod scan;
mod traits;
mod union;

pub use scan::ScanExec;
pub use traits::{QueryOperator, QueryResults, SequentialQuery, StreamRecipient, StreamResults};
pub use union::{
    OrderedUnionEnumerator, SequentialUnion, UnionExec, UnionResults, UnionStrategy,
    UnorderedUnionEnumerator,
};
