//! Result types for query execution.

use std::time::Duration;

use crate::error::{ExecutorError, ExecutorResult, QueryExecutionError};
use crate::task::{QueryTask, TaskId};
use crate::traits::ResultSink;

/// Terminal state of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TaskStatus {
    /// The collaborator filled the task.
    Completed,
    /// The task failed; its rows are whatever was pushed before the failure.
    Failed(QueryExecutionError),
}

/// A task together with how it ended.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TaskOutcome<R> {
    task: QueryTask<R>,
    status: TaskStatus,
}

impl<R> TaskOutcome<R> {
    /// A completed task.
    pub fn completed(task: QueryTask<R>) -> Self {
        Self {
            task,
            status: TaskStatus::Completed,
        }
    }

    /// A failed task.
    pub fn failed(task: QueryTask<R>, error: QueryExecutionError) -> Self {
        Self {
            task,
            status: TaskStatus::Failed(error),
        }
    }

    /// The task, with its rows.
    pub fn task(&self) -> &QueryTask<R> {
        &self.task
    }

    /// How the task ended.
    pub fn status(&self) -> &TaskStatus {
        &self.status
    }

    /// Returns true if the task completed.
    pub fn is_completed(&self) -> bool {
        matches!(self.status, TaskStatus::Completed)
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&QueryExecutionError> {
        match &self.status {
            TaskStatus::Completed => None,
            TaskStatus::Failed(e) => Some(e),
        }
    }

    /// Consumes the outcome, returning the task.
    pub fn into_task(self) -> QueryTask<R> {
        self.task
    }
}

/// Statistics from one executor run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExecutionStats {
    /// Wall-clock duration of the run.
    pub duration: Duration,
    /// Number of tasks submitted.
    pub total: usize,
    /// Tasks that completed.
    pub completed: usize,
    /// Tasks that failed, including those never admitted.
    pub failed: usize,
    /// Admissions held back at least once by memory pressure.
    pub deferred_admissions: usize,
    /// Most tasks observed executing at the same time.
    pub peak_concurrency: usize,
    /// Memory readings taken by the admission gate.
    pub memory_samples: usize,
}

/// Every task of a run, each tagged completed or failed.
///
/// Outcomes are in completion order. Call [`sort_by_id`](Self::sort_by_id)
/// for plan order.
///
/// # Example
///
/// ```ignore
/// let results = executor.search(&trip, &collaborator);
/// println!("{} ok, {} failed", results.completed_count(), results.failed_count());
///
/// for outcome in results.failures() {
///     eprintln!("{}: {}", outcome.task(), outcome.error().unwrap());
/// }
///
/// let rows = results.into_result()?; // Err if anything failed
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResultSet<R> {
    outcomes: Vec<TaskOutcome<R>>,
    stats: ExecutionStats,
}

impl<R> ResultSet<R> {
    /// Creates a result set.
    pub fn new(outcomes: Vec<TaskOutcome<R>>, stats: ExecutionStats) -> Self {
        Self { outcomes, stats }
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if the run had no tasks.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Iterates all outcomes.
    pub fn iter(&self) -> impl Iterator<Item = &TaskOutcome<R>> {
        self.outcomes.iter()
    }

    /// Iterates completed outcomes.
    pub fn completed(&self) -> impl Iterator<Item = &TaskOutcome<R>> {
        self.outcomes.iter().filter(|o| o.is_completed())
    }

    /// Iterates failed outcomes.
    pub fn failures(&self) -> impl Iterator<Item = &TaskOutcome<R>> {
        self.outcomes.iter().filter(|o| !o.is_completed())
    }

    /// Number of completed tasks.
    pub fn completed_count(&self) -> usize {
        self.completed().count()
    }

    /// Number of failed tasks.
    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    /// Looks up the outcome of a task.
    pub fn get(&self, id: TaskId) -> Option<&TaskOutcome<R>> {
        self.outcomes.iter().find(|o| o.task.id() == id)
    }

    /// Reorders outcomes by task id, i.e. plan order.
    pub fn sort_by_id(&mut self) {
        self.outcomes.sort_by_key(|o| o.task.id());
    }

    /// Rows of all completed tasks, in current outcome order.
    pub fn merged_rows(&self) -> impl Iterator<Item = &R> {
        self.completed().flat_map(|o| o.task.rows())
    }

    /// Consumes the set, returning rows of completed tasks in plan order.
    pub fn into_rows(mut self) -> Vec<R> {
        self.sort_by_id();
        self.outcomes
            .into_iter()
            .filter(TaskOutcome::is_completed)
            .flat_map(|o| o.task.into_rows())
            .collect()
    }

    /// Like [`into_rows`](Self::into_rows), but fails if any task failed.
    ///
    /// The error reports the failure of the lowest task id.
    pub fn into_result(self) -> ExecutorResult<Vec<R>> {
        let first = self
            .failures()
            .min_by_key(|o| o.task.id())
            .and_then(TaskOutcome::error)
            .cloned();
        match first {
            None => Ok(self.into_rows()),
            Some(first) => Err(ExecutorError::PartialFailure {
                failed: self.failed_count(),
                total: self.len(),
                first,
            }),
        }
    }

    /// Statistics of the run.
    pub fn stats(&self) -> &ExecutionStats {
        &self.stats
    }

    /// Hands the set to a sink for export.
    pub fn export_to<S: ResultSink<R>>(&self, sink: &mut S) -> Result<(), S::Error> {
        sink.accept(self)
    }
}

impl<R> IntoIterator for ResultSet<R> {
    type Item = TaskOutcome<R>;
    type IntoIter = std::vec::IntoIter<TaskOutcome<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a ResultSet<R> {
    type Item = &'a TaskOutcome<R>;
    type IntoIter = std::slice::Iter<'a, TaskOutcome<R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.outcomes.iter()
    }
}
