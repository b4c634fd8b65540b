//! Execution budget configuration.

use std::time::Duration;

use crate::error::{ExecutorError, ExecutorResult};
use crate::traits::MemoryProbe;

/// Default interval between memory samples.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Share of currently available memory used as the default memory floor.
pub const DEFAULT_MEMORY_FRACTION: f64 = 0.8;

/// Resource limits for one executor.
///
/// A task is admitted only while the host's available memory is strictly
/// greater than `max_memory_bytes`, so the value acts as a floor of free
/// memory to keep, not as a cap on what tasks may use.
///
/// # Example
///
/// ```rust
/// use fuzzy_itinerary_executor::ExecutionBudget;
/// use std::time::Duration;
///
/// let budget = ExecutionBudget::builder()
///     .with_max_workers(4)
///     .with_max_memory_bytes(512 * 1024 * 1024)
///     .with_sample_interval(Duration::from_millis(250))
///     .with_admission_timeout(Duration::from_secs(600))
///     .build();
///
/// assert_eq!(budget.max_workers, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionBudget {
    /// Maximum number of tasks executing at once.
    pub max_workers: usize,
    /// Available memory must exceed this many bytes for a task to be admitted.
    pub max_memory_bytes: u64,
    /// How often the admission gate re-reads available memory.
    pub sample_interval: Duration,
    /// Fail still-queued tasks once memory has held the next admission back
    /// for this long (None = wait indefinitely). Waiting for a free worker
    /// does not count.
    pub admission_timeout: Option<Duration>,
}

impl ExecutionBudget {
    /// Creates a new builder for ExecutionBudget.
    pub fn builder() -> ExecutionBudgetBuilder {
        ExecutionBudgetBuilder::default()
    }

    /// Checks that the budget can drive an executor.
    pub fn validate(&self) -> ExecutorResult<()> {
        if self.max_workers == 0 {
            return Err(ExecutorError::InvalidBudget(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.sample_interval.is_zero() {
            return Err(ExecutorError::InvalidBudget(
                "sample_interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExecutionBudget {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for ExecutionBudget.
#[derive(Debug, Clone, Default)]
pub struct ExecutionBudgetBuilder {
    max_workers: Option<usize>,
    max_memory_bytes: Option<u64>,
    sample_interval: Option<Duration>,
    admission_timeout: Option<Duration>,
}

impl ExecutionBudgetBuilder {
    /// Sets the worker count.
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = Some(max_workers);
        self
    }

    /// Sets the memory floor in bytes.
    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = Some(bytes);
        self
    }

    /// Sets the memory sampling interval.
    pub fn with_sample_interval(mut self, interval: Duration) -> Self {
        self.sample_interval = Some(interval);
        self
    }

    /// Sets how long memory pressure may defer a single admission.
    pub fn with_admission_timeout(mut self, timeout: Duration) -> Self {
        self.admission_timeout = Some(timeout);
        self
    }

    /// Builds the budget.
    ///
    /// Unset workers default to the logical CPU count; an unset memory floor
    /// defaults to 0.
    pub fn build(self) -> ExecutionBudget {
        let max_memory_bytes = self.max_memory_bytes.unwrap_or(0);
        self.finish(max_memory_bytes)
    }

    /// Builds the budget, defaulting an unset memory floor to
    /// [`DEFAULT_MEMORY_FRACTION`] of what `probe` reports right now.
    pub fn build_for(self, probe: &dyn MemoryProbe) -> ExecutionBudget {
        let max_memory_bytes = self
            .max_memory_bytes
            .unwrap_or_else(|| (probe.available_bytes() as f64 * DEFAULT_MEMORY_FRACTION) as u64);
        self.finish(max_memory_bytes)
    }

    fn finish(self, max_memory_bytes: u64) -> ExecutionBudget {
        ExecutionBudget {
            max_workers: self.max_workers.unwrap_or_else(num_cpus::get),
            max_memory_bytes,
            sample_interval: self.sample_interval.unwrap_or(DEFAULT_SAMPLE_INTERVAL),
            admission_timeout: self.admission_timeout,
        }
    }
}
