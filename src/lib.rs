//! Braid - partitioned parallel set-operator execution
//!
//! Braid evaluates set operators over partitioned streams of elements. The
//! distinct union repartitions both inputs by element hash, deduplicates
//! every partition independently and, when either input is ordered, carries
//! compound ordering keys so the gathered output preserves source order.
//!
//! ```
//! use braid::engine::{LocalExecutor, ScanExec, UnionExec};
//!
//! let union = UnionExec::new(
//!     ScanExec::ordered(vec![1, 2, 2, 3]),
//!     ScanExec::ordered(vec![3, 4]),
//!     None,
//! );
//! let result = LocalExecutor::with_parallelism(2).execute(&union)?;
//! assert_eq!(result.elements(), &[1, 2, 3, 4]);
//! # Ok::<(), braid::error::BraidError>(())
//! ```

#![forbid(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Re-export core crates
pub use braid_core as core;
pub use braid_engine as engine;
pub use braid_exchange as exchange;
pub use common_config as config;
pub use common_error as error;

/// Braid version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
