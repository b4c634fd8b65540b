//! Error types for itinerary parsing and date expansion.

use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur while building an itinerary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ItineraryError {
    /// A date expression does not match `YYYY-MM-DD[+m][-n]`.
    #[error("invalid date expression: '{0}' (expected YYYY-MM-DD[+m][-n])")]
    InvalidDateExpression(String),

    /// An argument has the wrong shape for its position.
    #[error("invalid argument at position {position}: expected {expected}")]
    InvalidArgumentAtPosition {
        /// Zero-based index of the offending argument.
        position: usize,
        /// What the argument at this position should look like.
        expected: &'static str,
    },

    /// Two consecutive fixed leg dates are not strictly increasing.
    #[error("dates are not in order ({previous} >= {next}); provide them in increasing order")]
    DateOrderViolation {
        /// Date of the earlier leg.
        previous: NaiveDate,
        /// Date of the following leg.
        next: NaiveDate,
    },

    /// The argument list matches none of the itinerary shapes.
    #[error("unrecognized itinerary shape for {arg_count} arguments")]
    UnrecognizedItineraryShape {
        /// Number of arguments supplied.
        arg_count: usize,
    },

    /// A location token could not be resolved.
    #[error("unknown location: '{0}'")]
    UnknownLocation(String),

    /// A multi-leg itinerary was constructed with no legs.
    #[error("itinerary has no legs")]
    EmptyItinerary,
}

/// Result type for itinerary operations.
pub type ItineraryResult<T> = std::result::Result<T, ItineraryError>;
