//! Configuration management for Braid.
//!
//! Provides the execution settings the surrounding engine supplies to the
//! set-operator core: partition count and whether to run partitioned at all.

use std::num::NonZeroUsize;

use common_error::{BraidError, BraidResult};
use serde::{Deserialize, Serialize};

/// Largest partition count the executor accepts.
pub const MAX_PARTITION_COUNT: usize = 512;

/// Global Braid configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BraidConfig {
    /// Execution configuration.
    pub execution: ExecutionConfig,
}

impl BraidConfig {
    /// Decode a configuration from JSON and validate it.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> BraidResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> BraidResult<()> {
        self.execution.validate()
    }
}

/// Execution configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Number of partitions; `None` uses the host's available parallelism.
    pub parallelism: Option<usize>,
    /// How queries are scheduled.
    pub execution_mode: ExecutionMode,
    /// Enable per-partition metrics collection.
    pub collect_metrics: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            parallelism: None,
            execution_mode: ExecutionMode::Default,
            collect_metrics: true,
        }
    }
}

impl ExecutionConfig {
    /// Set the partition count.
    #[must_use]
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = Some(parallelism);
        self
    }

    /// Set the execution mode.
    #[must_use]
    pub fn with_execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.execution_mode = mode;
        self
    }

    /// Enable or disable metrics collection.
    #[must_use]
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.collect_metrics = enabled;
        self
    }

    /// Resolve the effective partition count.
    pub fn partition_count(&self) -> usize {
        self.parallelism
            .unwrap_or_else(|| {
                std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
            })
            .clamp(1, MAX_PARTITION_COUNT)
    }

    /// Reject partition counts the executor cannot honor.
    pub fn validate(&self) -> BraidResult<()> {
        match self.parallelism {
            Some(0) => Err(BraidError::config("parallelism must be at least 1")),
            Some(n) if n > MAX_PARTITION_COUNT => Err(BraidError::config(format!(
                "parallelism {n} exceeds the maximum of {MAX_PARTITION_COUNT}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Scheduling mode for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run partitioned unless the root operator limits parallelism.
    #[default]
    Default,
    /// Always run partitioned.
    ForceParallelism,
    /// Run the sequential form of the query.
    Sequential,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Default => write!(f, "Default"),
            Self::ForceParallelism => write!(f, "ForceParallelism"),
            Self::Sequential => write!(f, "Sequential"),
        }
    }
}
