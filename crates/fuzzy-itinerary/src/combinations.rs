//! Concrete date assignments for an itinerary.
//!
//! Every leg's window is expanded independently, the per-leg candidate lists
//! are combined with a Cartesian product in leg order, and tuples that break
//! the itinerary's ordering rule are dropped.

use chrono::NaiveDate;
use itertools::Itertools;

use crate::itinerary::Itinerary;

/// One concrete date per leg, in leg order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DateCombination(Vec<NaiveDate>);

impl DateCombination {
    /// The dates, indexed by leg.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.0
    }

    /// Number of legs covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the combination covers no legs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the combination, returning its dates.
    pub fn into_dates(self) -> Vec<NaiveDate> {
        self.0
    }
}

/// Generates the valid date combinations of one itinerary.
///
/// Leg windows are expanded once at construction; [`iter`](Self::iter) can
/// be called any number of times and always yields the same sequence.
///
/// # Example
///
/// ```rust
/// use fuzzy_itinerary::{CodeResolver, CombinationGenerator, ItineraryParser};
///
/// let trip = ItineraryParser::new(CodeResolver)
///     .parse(&["AMS", "PVG", "2024-09-27-2", "2024-10-01"])
///     .unwrap();
/// let combos: Vec<_> = CombinationGenerator::new(&trip).iter().collect();
/// assert_eq!(combos.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct CombinationGenerator<'a> {
    itinerary: &'a Itinerary,
    candidates: Vec<Vec<NaiveDate>>,
}

impl<'a> CombinationGenerator<'a> {
    /// Expands every leg of `itinerary`.
    pub fn new(itinerary: &'a Itinerary) -> Self {
        let candidates = itinerary
            .legs()
            .iter()
            .map(|leg| leg.date().expand())
            .collect();
        Self {
            itinerary,
            candidates,
        }
    }

    /// The itinerary combinations are generated for.
    pub fn itinerary(&self) -> &'a Itinerary {
        self.itinerary
    }

    /// Per-leg candidate dates, each ascending.
    pub fn candidates(&self) -> &[Vec<NaiveDate>] {
        &self.candidates
    }

    /// Size of the unfiltered product, an upper bound on the output.
    pub fn product_len(&self) -> usize {
        self.candidates.iter().map(Vec::len).product()
    }

    /// Lazily yields accepted combinations in lexicographic product order.
    pub fn iter(&self) -> impl Iterator<Item = DateCombination> + '_ {
        self.candidates
            .iter()
            .map(|dates| dates.iter().copied())
            .multi_cartesian_product()
            .filter(move |dates| self.itinerary.accepts(dates))
            .map(DateCombination)
    }
}

/// Creates a generator for `itinerary`.
pub fn generate(itinerary: &Itinerary) -> CombinationGenerator<'_> {
    CombinationGenerator::new(itinerary)
}
