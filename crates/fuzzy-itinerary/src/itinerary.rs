//! Itinerary shapes and their typed constructors.

use std::fmt;

use chrono::NaiveDate;

use crate::date::DateSpec;
use crate::error::{ItineraryError, ItineraryResult};
use crate::location::LocationRef;

/// The four supported itinerary shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ItineraryKind {
    /// A single leg.
    OneWay,
    /// Outbound leg plus the reversed return leg.
    RoundTrip,
    /// Independent legs on strictly increasing fixed dates.
    ChainTrip,
    /// Legs where each destination is the next origin, on increasing fixed dates.
    PerfectChain,
}

impl ItineraryKind {
    /// Returns true if leg dates must strictly increase from leg to leg.
    pub fn requires_increasing_dates(&self) -> bool {
        !matches!(self, ItineraryKind::OneWay)
    }
}

impl fmt::Display for ItineraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryKind::OneWay => write!(f, "one-way"),
            ItineraryKind::RoundTrip => write!(f, "round-trip"),
            ItineraryKind::ChainTrip => write!(f, "chain-trip"),
            ItineraryKind::PerfectChain => write!(f, "perfect-chain"),
        }
    }
}

/// One origin → destination hop with its date window.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Leg {
    origin: LocationRef,
    destination: LocationRef,
    date: DateSpec,
}

impl Leg {
    /// Creates a leg.
    pub fn new(origin: LocationRef, destination: LocationRef, date: DateSpec) -> Self {
        Self {
            origin,
            destination,
            date,
        }
    }

    /// Where the leg departs from.
    pub fn origin(&self) -> &LocationRef {
        &self.origin
    }

    /// Where the leg arrives.
    pub fn destination(&self) -> &LocationRef {
        &self.destination
    }

    /// The leg's date or date window.
    pub fn date(&self) -> &DateSpec {
        &self.date
    }
}

/// A validated, ordered sequence of legs tagged with its shape.
///
/// Built once through one of the typed constructors (or through
/// [`ItineraryParser`](crate::ItineraryParser)) and read-only afterwards.
///
/// # Example
///
/// ```rust
/// use fuzzy_itinerary::{DateSpec, Itinerary, ItineraryKind, LocationCode, LocationRef};
///
/// let ams = LocationRef::single(LocationCode::new("AMS"));
/// let pvg = LocationRef::single(LocationCode::new("PVG"));
/// let trip = Itinerary::round_trip(
///     ams,
///     pvg,
///     DateSpec::parse("2024-09-27+1").unwrap(),
///     DateSpec::parse("2024-10-01").unwrap(),
/// );
///
/// assert_eq!(trip.kind(), ItineraryKind::RoundTrip);
/// assert_eq!(trip.legs()[1].origin().name(), "PVG");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Itinerary {
    kind: ItineraryKind,
    legs: Vec<Leg>,
}

impl Itinerary {
    /// A single leg on a fuzzy date.
    pub fn one_way(origin: LocationRef, destination: LocationRef, date: DateSpec) -> Self {
        Self {
            kind: ItineraryKind::OneWay,
            legs: vec![Leg::new(origin, destination, date)],
        }
    }

    /// An outbound leg and its return, each on a fuzzy date.
    ///
    /// Date ordering is enforced per combination, not here, because the two
    /// windows may overlap.
    pub fn round_trip(
        origin: LocationRef,
        destination: LocationRef,
        outbound: DateSpec,
        inbound: DateSpec,
    ) -> Self {
        let outbound_leg = Leg::new(origin.clone(), destination.clone(), outbound);
        let return_leg = Leg::new(destination, origin, inbound);
        Self {
            kind: ItineraryKind::RoundTrip,
            legs: vec![outbound_leg, return_leg],
        }
    }

    /// Independent legs on fixed, strictly increasing dates.
    pub fn chain_trip(
        legs: impl IntoIterator<Item = (LocationRef, LocationRef, NaiveDate)>,
    ) -> ItineraryResult<Self> {
        let legs: Vec<Leg> = legs
            .into_iter()
            .map(|(origin, destination, date)| Leg::new(origin, destination, DateSpec::fixed(date)))
            .collect();
        Self::validated(ItineraryKind::ChainTrip, legs)
    }

    /// A connected chain: each stop departs on its date and flies to the
    /// next stop, the last stop flying to `destination`.
    pub fn perfect_chain(
        stops: impl IntoIterator<Item = (LocationRef, NaiveDate)>,
        destination: LocationRef,
    ) -> ItineraryResult<Self> {
        let stops: Vec<(LocationRef, NaiveDate)> = stops.into_iter().collect();
        let arrivals = stops
            .iter()
            .skip(1)
            .map(|(stop, _)| stop.clone())
            .chain(std::iter::once(destination));
        let legs = stops
            .iter()
            .zip(arrivals)
            .map(|((origin, date), arrival)| Leg::new(origin.clone(), arrival, DateSpec::fixed(*date)))
            .collect();
        Self::validated(ItineraryKind::PerfectChain, legs)
    }

    fn validated(kind: ItineraryKind, legs: Vec<Leg>) -> ItineraryResult<Self> {
        if legs.is_empty() {
            return Err(ItineraryError::EmptyItinerary);
        }
        for pair in legs.windows(2) {
            let (previous, next) = (pair[0].date.base(), pair[1].date.base());
            if previous >= next {
                return Err(ItineraryError::DateOrderViolation { previous, next });
            }
        }
        Ok(Self { kind, legs })
    }

    /// The itinerary's shape.
    pub fn kind(&self) -> ItineraryKind {
        self.kind
    }

    /// Legs in travel order. Never empty.
    pub fn legs(&self) -> &[Leg] {
        &self.legs
    }

    /// Number of legs.
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    /// Returns true if one concrete date per leg satisfies this shape's
    /// ordering rule.
    pub fn accepts(&self, dates: &[NaiveDate]) -> bool {
        if dates.len() != self.legs.len() {
            return false;
        }
        !self.kind.requires_increasing_dates() || dates.windows(2).all(|w| w[0] < w[1])
    }
}
