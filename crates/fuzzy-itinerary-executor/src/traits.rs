//! Collaborator traits.
//!
//! The executor never performs a query itself. It talks to three
//! collaborators supplied by the caller:
//!
//! - [`QueryCollaborator`] runs one task (drives a browser, calls an API, ...)
//! - [`MemoryProbe`] reports how much memory the host has available
//! - [`ResultSink`] receives the merged results for export
//!
//! # Example: Implementing QueryCollaborator
//!
//! ```ignore
//! use fuzzy_itinerary_executor::{QueryCollaborator, QueryExecutionError, QueryTask};
//!
//! struct FlightSearch { client: SearchClient }
//!
//! impl QueryCollaborator for FlightSearch {
//!     type Row = FlightRow;
//!
//!     fn execute(&self, task: &mut QueryTask<FlightRow>) -> Result<(), QueryExecutionError> {
//!         let page = self
//!             .client
//!             .search(task.legs())
//!             .map_err(|e| QueryExecutionError::failed(e.to_string()))?;
//!         task.extend_rows(page.rows());
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::QueryExecutionError;
use crate::result::ResultSet;
use crate::task::QueryTask;

/// Executes one query task, filling it with result rows.
///
/// Called concurrently from several workers, so implementations must not
/// keep mutable state shared between calls. Each call owns its task
/// exclusively.
pub trait QueryCollaborator: Send + Sync {
    /// One result row produced by a query.
    type Row: Send;

    /// Runs `task`, pushing its result rows into it, or fails.
    ///
    /// The call may block for as long as the query takes.
    fn execute(&self, task: &mut QueryTask<Self::Row>) -> Result<(), QueryExecutionError>;
}

impl<C: QueryCollaborator + ?Sized> QueryCollaborator for &C {
    type Row = C::Row;

    fn execute(&self, task: &mut QueryTask<Self::Row>) -> Result<(), QueryExecutionError> {
        (**self).execute(task)
    }
}

/// Reports the memory currently available on the host.
pub trait MemoryProbe: Send + Sync {
    /// A point-in-time reading, in bytes.
    fn available_bytes(&self) -> u64;
}

/// Receives a finished result set, e.g. to write it out as a table.
pub trait ResultSink<R> {
    /// Error produced when export fails.
    type Error;

    /// Accepts the merged results of a run.
    fn accept(&mut self, results: &ResultSet<R>) -> Result<(), Self::Error>;
}
