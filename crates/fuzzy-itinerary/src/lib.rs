//! # fuzzy-itinerary
//!
//! Turns flexible trip descriptions with fuzzy dates into the complete set
//! of concrete date assignments that have to be searched.
//!
//! This crate provides:
//! - **Date windows**: `YYYY-MM-DD[+m][-n]` expressions and their expansion
//! - **Itineraries**: one-way, round-trip, chain-trip and perfect-chain shapes
//! - **Parsing**: classification of raw argument lists into those shapes
//! - **Combinations**: every per-leg date assignment that keeps legs in order
//! - **Locations**: airport codes and alias tables for multi-airport regions
//!
//! ## Usage
//!
//! ```rust
//! use fuzzy_itinerary::{generate, CodeResolver, ItineraryKind, ItineraryParser};
//!
//! let parser = ItineraryParser::new(CodeResolver);
//!
//! // Leave AMS between 09-25 and 09-27, come back on 10-01
//! let trip = parser.parse(&["AMS", "PVG", "2024-09-27-2", "2024-10-01"]).unwrap();
//! assert_eq!(trip.kind(), ItineraryKind::RoundTrip);
//!
//! let combinations: Vec<_> = generate(&trip).iter().collect();
//! assert_eq!(combinations.len(), 3);
//! ```
//!
//! ## Argument Shapes
//!
//! | Shape | Arguments | Dates |
//! |-------|-----------|-------|
//! | one-way | `org, dest, date` | fuzzy |
//! | round-trip | `org, dest, out, back` | fuzzy, out < back |
//! | chain-trip | `org, dest, date, ...` | fixed, increasing |
//! | perfect-chain | `org, date, org, date, ..., dest` | fixed, increasing |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod combinations;
mod date;
mod error;
mod itinerary;
mod location;
mod parser;

pub use combinations::{generate, CombinationGenerator, DateCombination};
pub use date::{expand_date_expression, DateSpec, FIXED_DATE_LEN};
pub use error::{ItineraryError, ItineraryResult};
pub use itinerary::{Itinerary, ItineraryKind, Leg};
pub use location::{
    AliasTable, CodeResolver, LocationCode, LocationRef, LocationResolver, LOCATION_TOKEN_LEN,
};
pub use parser::{classify_args, ItineraryParser};

/// Calendar date type used throughout the crate.
pub use chrono::NaiveDate;
