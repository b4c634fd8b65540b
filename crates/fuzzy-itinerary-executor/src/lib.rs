//! # fuzzy-itinerary-executor
//!
//! Runs the flight searches a fuzzy itinerary expands into, concurrently and
//! without exhausting host memory.
//!
//! The executor never talks to an airline or a browser itself. Each search
//! is a [`QueryTask`] handed to a caller-supplied [`QueryCollaborator`];
//! the executor decides *when* and *on which worker* it runs.
//!
//! ## Key Features
//!
//! - **Bounded workers** - at most `max_workers` queries in flight
//! - **Memory admission** - new queries wait while available memory is at or
//!   below the budget's floor; a background sampler wakes them up
//! - **Partial failure** - failed or panicking queries are recorded per task,
//!   the rest of the run carries on
//! - **Multi-airport planning** - region aliases fan out to every airport pair
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fuzzy_itinerary::{CodeResolver, ItineraryParser};
//! use fuzzy_itinerary_executor::{
//!     ConcurrentExecutor, ExecutionBudget, FixedMemoryProbe, QueryCollaborator,
//!     QueryExecutionError, QueryTask,
//! };
//!
//! struct Echo;
//!
//! impl QueryCollaborator for Echo {
//!     type Row = String;
//!
//!     fn execute(&self, task: &mut QueryTask<String>) -> Result<(), QueryExecutionError> {
//!         task.push_row(task.to_string());
//!         Ok(())
//!     }
//! }
//!
//! let budget = ExecutionBudget::builder().with_max_workers(2).build();
//! let probe = Arc::new(FixedMemoryProbe::new(u64::MAX));
//! let executor = ConcurrentExecutor::new(budget, probe).unwrap();
//!
//! let parser = ItineraryParser::new(CodeResolver);
//! let results = executor
//!     .search_args(&parser, &["AMS", "PVG", "2024-09-27+2"], &Echo)
//!     .unwrap();
//!
//! assert_eq!(results.len(), 3);
//! assert_eq!(results.into_result().unwrap()[0], "AMS→PVG 2024-09-27");
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - `Serialize` for tasks, outcomes and result sets
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  fuzzy-itinerary-executor                   │
//! │                                                             │
//! │  ConcurrentExecutor                                         │
//! │  ├── plan Itinerary → QueryTasks (QueryPlanner)             │
//! │  ├── admit: free worker + memory above floor (gate)         │
//! │  ├── dispatch on rayon pool → QueryCollaborator             │
//! │  └── merge outcomes → ResultSet with stats                  │
//! │                                                             │
//! │  Collaborators:                                             │
//! │  ├── QueryCollaborator - runs one search                    │
//! │  ├── MemoryProbe       - reports available memory           │
//! │  └── ResultSink        - exports the merged results         │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod admission;
mod config;
mod error;
mod executor;
mod planner;
mod probe;
mod result;
mod task;
mod traits;

// Public re-exports
pub use config::{
    ExecutionBudget, ExecutionBudgetBuilder, DEFAULT_MEMORY_FRACTION, DEFAULT_SAMPLE_INTERVAL,
};
pub use error::{ExecutorError, ExecutorResult, QueryExecutionError};
pub use executor::ConcurrentExecutor;
pub use planner::{QueryPlanner, Routing};
pub use probe::{FixedMemoryProbe, SystemMemoryProbe};
pub use result::{ExecutionStats, ResultSet, TaskOutcome, TaskStatus};
pub use task::{QueryLeg, QueryTask, TaskId};
pub use traits::{MemoryProbe, QueryCollaborator, ResultSink};

// Re-export commonly used types from dependencies for convenience
pub use fuzzy_itinerary::{Itinerary, LocationCode};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<ExecutionBudget> = None;
        let _: Option<ResultSet<()>> = None;
        let _: Option<ExecutionStats> = None;
        let _: Option<TaskOutcome<()>> = None;
        let _: Option<ExecutorResult<()>> = None;
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_result_set_serializes() {
        let results: ResultSet<u32> = ResultSet::new(Vec::new(), ExecutionStats::default());
        let json = serde_json::to_value(&results).unwrap();
        assert_eq!(json["stats"]["total"], 0);
    }
}
