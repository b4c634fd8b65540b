//! Error types for query execution.

use std::time::Duration;

use fuzzy_itinerary::ItineraryError;
use thiserror::Error;

/// Why a single query task failed.
///
/// Recorded per task in the [`ResultSet`](crate::ResultSet); never aborts a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum QueryExecutionError {
    /// The collaborator reported a failure.
    #[error("query failed: {0}")]
    Failed(String),

    /// The collaborator did not recognise a location code.
    #[error("unknown location: {0}")]
    UnknownLocation(String),

    /// The collaborator panicked while executing the task.
    #[error("query panicked: {0}")]
    Panicked(String),

    /// The task was still queued when the admission timeout elapsed.
    #[error("not admitted within {0:?}")]
    AdmissionTimeout(Duration),
}

impl QueryExecutionError {
    /// Shorthand for [`QueryExecutionError::Failed`].
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors that stop an operation as a whole.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The itinerary could not be parsed or validated.
    #[error("itinerary error: {0}")]
    Itinerary(#[from] ItineraryError),

    /// The execution budget is unusable.
    #[error("invalid execution budget: {0}")]
    InvalidBudget(String),

    /// The worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// The host memory probe could not be initialised.
    #[error("memory probe error: {0}")]
    MemoryProbe(#[from] std::io::Error),

    /// Some tasks failed; raised when a result set is converted strictly.
    #[error("{failed} of {total} queries failed; first error: {first}")]
    PartialFailure {
        /// Number of failed tasks.
        failed: usize,
        /// Number of tasks in the run.
        total: usize,
        /// The error of the lowest-numbered failed task.
        first: QueryExecutionError,
    },
}

/// Result type for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
