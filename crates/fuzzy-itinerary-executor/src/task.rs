//! Query tasks, the unit of work handed to the collaborator.

use std::fmt;

use chrono::NaiveDate;
use fuzzy_itinerary::LocationCode;

/// Position of a task in its plan.
///
/// Ids follow combination order, so sorting by id restores the order the
/// tasks were planned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TaskId(usize);

impl TaskId {
    /// Creates an id from a plan index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The plan index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One concrete flight search: origin, destination and date.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QueryLeg {
    /// Departure location code.
    pub origin: LocationCode,
    /// Arrival location code.
    pub destination: LocationCode,
    /// Travel date.
    pub date: NaiveDate,
}

impl QueryLeg {
    /// Creates a leg.
    pub fn new(origin: LocationCode, destination: LocationCode, date: NaiveDate) -> Self {
        Self {
            origin,
            destination,
            date,
        }
    }
}

impl fmt::Display for QueryLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{} {}", self.origin, self.destination, self.date)
    }
}

/// A query to run: one leg per itinerary leg, plus the rows it produced.
///
/// Rows start empty and are filled exactly once by the collaborator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QueryTask<R> {
    id: TaskId,
    combination: usize,
    legs: Vec<QueryLeg>,
    rows: Vec<R>,
}

impl<R> QueryTask<R> {
    /// Creates an empty task.
    pub fn new(id: TaskId, combination: usize, legs: Vec<QueryLeg>) -> Self {
        Self {
            id,
            combination,
            legs,
            rows: Vec::new(),
        }
    }

    /// The task's plan id.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Index of the date combination this task was derived from.
    pub fn combination_index(&self) -> usize {
        self.combination
    }

    /// The legs to search, in travel order.
    pub fn legs(&self) -> &[QueryLeg] {
        &self.legs
    }

    /// Rows collected so far.
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Appends one result row.
    pub fn push_row(&mut self, row: R) {
        self.rows.push(row);
    }

    /// Appends result rows.
    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = R>) {
        self.rows.extend(rows);
    }

    /// Consumes the task, returning its rows.
    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

impl<R> fmt::Display for QueryTask<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, leg) in self.legs.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{leg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(origin: &str, destination: &str, day: u32) -> QueryLeg {
        QueryLeg::new(
            LocationCode::new(origin),
            LocationCode::new(destination),
            NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
        )
    }

    #[test]
    fn test_new_task_is_empty() {
        let task: QueryTask<u32> = QueryTask::new(TaskId::new(3), 1, vec![leg("AMS", "PVG", 27)]);
        assert_eq!(task.id().index(), 3);
        assert_eq!(task.combination_index(), 1);
        assert!(task.rows().is_empty());
    }

    #[test]
    fn test_rows() {
        let mut task = QueryTask::new(TaskId::new(0), 0, vec![leg("AMS", "PVG", 27)]);
        task.push_row(1);
        task.extend_rows([2, 3]);
        assert_eq!(task.rows(), &[1, 2, 3]);
        assert_eq!(task.into_rows(), vec![1, 2, 3]);
    }

    #[test]
    fn test_display() {
        let task: QueryTask<()> = QueryTask::new(
            TaskId::new(0),
            0,
            vec![leg("AMS", "PVG", 27), leg("PVG", "AMS", 30)],
        );
        assert_eq!(task.to_string(), "AMS→PVG 2024-09-27, PVG→AMS 2024-09-30");
        assert_eq!(TaskId::new(7).to_string(), "#7");
    }

    #[test]
    fn test_ids_order_by_index() {
        let mut ids = vec![TaskId::new(2), TaskId::new(0), TaskId::new(1)];
        ids.sort();
        assert_eq!(ids, vec![TaskId::new(0), TaskId::new(1), TaskId::new(2)]);
    }
}
