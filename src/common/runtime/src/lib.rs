//! Async runtime utilities for Braid.
//!
//! Partition workers are synchronous pull loops; this crate hosts them on a
//! Tokio blocking pool so one worker runs per partition. When the caller is
//! already inside a Tokio runtime its pool is reused; otherwise a single
//! shared runtime is created on first use.

use std::future::Future;
use std::panic;
use std::sync::OnceLock;

use common_error::{BraidError, BraidResult};
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};

const RUNTIME_THREAD_NAME: &str = "braid-runtime";
static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

/// Get the shared runtime, creating it on first use.
pub fn get_runtime() -> BraidResult<&'static Runtime> {
    RUNTIME
        .get_or_init(|| {
            Builder::new_multi_thread()
                .enable_all()
                .thread_name(RUNTIME_THREAD_NAME)
                .build()
                .map_err(|e| format!("Failed to create runtime: {e}"))
        })
        .as_ref()
        .map_err(|e| BraidError::internal(e.clone()))
}

/// Block the calling thread until `future` completes.
///
/// - Outside any runtime, the shared runtime drives the future.
/// - On a multi-thread runtime worker, the current runtime drives it under
///   `block_in_place`.
/// - On a current-thread runtime, the future is driven by the shared runtime
///   from a scoped helper thread.
///
/// A panic raised while driving the future resumes on the calling thread.
pub fn block_on<F>(future: F) -> BraidResult<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    match Handle::try_current() {
        Err(_) => Ok(get_runtime()?.block_on(future)),
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            Ok(tokio::task::block_in_place(|| handle.block_on(future)))
        }
        Ok(_) => std::thread::scope(|scope| {
            let worker = scope.spawn(|| get_runtime().map(|runtime| runtime.block_on(future)));
            worker
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload))
        }),
    }
}

/// A handle to a set of blocking tasks.
pub struct JoinSet<T> {
    inner: tokio::task::JoinSet<T>,
}

impl<T: Send + 'static> JoinSet<T> {
    /// Create a new join set.
    pub fn new() -> Self {
        Self {
            inner: tokio::task::JoinSet::new(),
        }
    }

    /// Run a blocking closure on the runtime's blocking pool.
    ///
    /// Must be called from within a runtime context.
    pub fn spawn_blocking<F>(&mut self, f: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        self.inner.spawn_blocking(f);
    }

    /// Wait for the next task to complete.
    pub async fn join_next(&mut self) -> Option<Result<T, tokio::task::JoinError>> {
        self.inner.join_next().await
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Get the number of tasks in the set.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Send + 'static> Default for JoinSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
