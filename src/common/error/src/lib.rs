//! Error types and result aliases for Braid.
//!
//! Every fallible operation in the execution core returns [`BraidResult`].
//! Failures are never recovered internally; they surface to whoever drives
//! the partition enumerators.

mod error;

pub use error::{BraidError, BraidResult};
