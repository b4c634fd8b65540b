//! Query planning: from an itinerary to concrete query tasks.
//!
//! Each valid date combination is crossed with every routing, a choice of
//! one origin and one destination code per leg. Routings are taken from
//! the product of each leg's codes and then filtered so that:
//!
//! - no hop departs from and arrives at the same code,
//! - a round trip's return hop exactly reverses the outbound hop,
//! - a perfect chain leaves each stop from the code it arrived at.
//!
//! Task ids run combination-major, routing-minor.

use fuzzy_itinerary::{generate, Itinerary, ItineraryKind, LocationCode};
use itertools::Itertools;
use tracing::debug;

use crate::task::{QueryLeg, QueryTask, TaskId};

/// One origin/destination code pair per leg.
pub type Routing = Vec<(LocationCode, LocationCode)>;

/// Plans the query tasks for one itinerary.
///
/// # Example
///
/// ```rust
/// use fuzzy_itinerary::{AliasTable, ItineraryParser};
/// use fuzzy_itinerary_executor::QueryPlanner;
///
/// let mut aliases = AliasTable::new();
/// aliases.insert("ChinaEast/CNE", ["SHA", "PVG"]);
/// let trip = ItineraryParser::new(&aliases)
///     .parse(&["AMS", "CNE", "2024-09-27+1"])
///     .unwrap();
///
/// let planner = QueryPlanner::new(&trip);
/// assert_eq!(planner.routings().len(), 2);
///
/// let tasks = planner.tasks::<()>();
/// assert_eq!(tasks.len(), 4); // 2 dates × 2 destination airports
/// ```
#[derive(Debug, Clone)]
pub struct QueryPlanner<'a> {
    itinerary: &'a Itinerary,
    routings: Vec<Routing>,
}

impl<'a> QueryPlanner<'a> {
    /// Computes the routings of `itinerary`.
    pub fn new(itinerary: &'a Itinerary) -> Self {
        let routings = itinerary
            .legs()
            .iter()
            .map(|leg| {
                leg.origin()
                    .codes()
                    .iter()
                    .cartesian_product(leg.destination().codes())
                    .filter(|(origin, destination)| origin != destination)
                    .map(|(origin, destination)| (origin.clone(), destination.clone()))
                    .collect::<Vec<_>>()
            })
            .multi_cartesian_product()
            .filter(|routing| is_connected(itinerary.kind(), routing))
            .collect();

        Self {
            itinerary,
            routings,
        }
    }

    /// The itinerary being planned.
    pub fn itinerary(&self) -> &'a Itinerary {
        self.itinerary
    }

    /// Every admissible routing, in product order.
    pub fn routings(&self) -> &[Routing] {
        &self.routings
    }

    /// Builds one empty task per (date combination, routing) pair.
    pub fn tasks<R>(&self) -> Vec<QueryTask<R>> {
        let mut tasks = Vec::new();
        let mut combinations = 0;

        for (combination, dates) in generate(self.itinerary).iter().enumerate() {
            combinations += 1;
            for routing in &self.routings {
                let legs = routing
                    .iter()
                    .zip(dates.dates())
                    .map(|((origin, destination), date)| {
                        QueryLeg::new(origin.clone(), destination.clone(), *date)
                    })
                    .collect();
                tasks.push(QueryTask::new(TaskId::new(tasks.len()), combination, legs));
            }
        }

        debug!(
            kind = %self.itinerary.kind(),
            combinations,
            routings = self.routings.len(),
            tasks = tasks.len(),
            "planned query tasks"
        );
        tasks
    }
}

fn is_connected(kind: ItineraryKind, routing: &[(LocationCode, LocationCode)]) -> bool {
    match kind {
        ItineraryKind::RoundTrip => routing
            .windows(2)
            .all(|pair| pair[1].0 == pair[0].1 && pair[1].1 == pair[0].0),
        ItineraryKind::PerfectChain => routing.windows(2).all(|pair| pair[0].1 == pair[1].0),
        ItineraryKind::OneWay | ItineraryKind::ChainTrip => true,
    }
}
