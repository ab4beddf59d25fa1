//! Query execution.
//!
//! - [`LocalExecutor`]: runs an operator tree on the local machine
//! - [`ExecutionResult`]: gathered output plus metrics

mod driver;
mod local;
mod result;

pub use local::LocalExecutor;
pub use result::ExecutionResult;
