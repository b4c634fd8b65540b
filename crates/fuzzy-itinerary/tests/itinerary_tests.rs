//! Integration tests for itinerary parsing and date combination generation.

use fuzzy_itinerary::{
    classify_args, expand_date_expression, generate, AliasTable, CodeResolver, DateSpec,
    ItineraryError, ItineraryKind, ItineraryParser, NaiveDate,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn parser() -> ItineraryParser<CodeResolver> {
    ItineraryParser::new(CodeResolver)
}

// =============================================================================
// Date windows
// =============================================================================

#[test]
fn test_window_size_and_bounds() {
    let base = date(2024, 2, 27);
    for m in 0..5 {
        for n in 0..5 {
            let spec = DateSpec::new(base, m, n).unwrap();
            let dates = spec.expand();

            assert_eq!(dates.len(), (m + n + 1) as usize, "+{m}-{n}");
            assert_eq!(dates[0], base - chrono::Days::new(n as u64));
            assert_eq!(*dates.last().unwrap(), base + chrono::Days::new(m as u64));
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn test_window_crosses_leap_day_and_year_end() {
    assert_eq!(
        expand_date_expression("2024-02-28+2").unwrap(),
        vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
    );
    assert_eq!(
        expand_date_expression("2025-01-01-1").unwrap(),
        vec![date(2024, 12, 31), date(2025, 1, 1)]
    );
}

#[test]
fn test_malformed_expressions() {
    for input in ["2024-13-01", "2024-09-27+", "2024/09/27", "27-09-2024", "2024-09-27+-1"] {
        assert!(
            matches!(
                expand_date_expression(input),
                Err(ItineraryError::InvalidDateExpression(_))
            ),
            "{input}"
        );
    }
}

// =============================================================================
// Classification
// =============================================================================

#[test]
fn test_classification_is_exclusive_over_arities() {
    let date = "2024-09-27";
    let code = "AMS";
    for n in 0..16 {
        for last in [date, code] {
            let mut args = vec![code; n];
            if let Some(slot) = args.last_mut() {
                *slot = last;
            }
            // At most one shape, or a clean error; never a panic.
            let _ = classify_args(&args);
        }
    }

    assert!(matches!(
        classify_args(&["AMS", "PVG"]),
        Err(ItineraryError::UnrecognizedItineraryShape { arg_count: 2 })
    ));
    assert!(matches!(
        classify_args(&["AMS", "2024-09-20", "IST", "2024-09-27", "CDG", "2024-10-01", "LHR", "X"]),
        Err(ItineraryError::UnrecognizedItineraryShape { arg_count: 8 })
    ));
}

// =============================================================================
// Round trips
// =============================================================================

#[test]
fn test_round_trip_combinations() {
    let trip = parser()
        .parse(&["AMS", "PVG", "2024-09-27-2", "2024-10-01"])
        .unwrap();
    let combinations: Vec<Vec<NaiveDate>> =
        generate(&trip).iter().map(|c| c.into_dates()).collect();

    assert_eq!(
        combinations,
        vec![
            vec![date(2024, 9, 25), date(2024, 10, 1)],
            vec![date(2024, 9, 26), date(2024, 10, 1)],
            vec![date(2024, 9, 27), date(2024, 10, 1)],
        ]
    );
}

#[test]
fn test_round_trip_overlapping_windows_never_reverse() {
    let trip = parser()
        .parse(&["AMS", "PVG", "2024-09-27+3-3", "2024-09-28+3-3"])
        .unwrap();
    let generator = generate(&trip);
    let combinations: Vec<_> = generator.iter().collect();

    assert!(!combinations.is_empty());
    assert!(combinations.len() < generator.product_len());
    for c in &combinations {
        assert!(c.dates()[0] < c.dates()[1]);
    }
}

#[test]
fn test_generate_is_repeatable() {
    let trip = parser()
        .parse(&["AMS", "PVG", "2024-09-27+5-2", "2024-10-05+1-2"])
        .unwrap();
    let first: Vec<_> = generate(&trip).iter().collect();
    let second: Vec<_> = generate(&trip).iter().collect();
    assert_eq!(first, second);
}

// =============================================================================
// Chains
// =============================================================================

#[test]
fn test_chain_date_order() {
    let ok = parser().parse(&["JFK", "IST", "2024-09-20", "IST", "CDG", "2024-09-27"]);
    assert_eq!(ok.unwrap().kind(), ItineraryKind::ChainTrip);

    let reversed = parser().parse(&["JFK", "IST", "2024-09-27", "IST", "CDG", "2024-09-20"]);
    assert_eq!(
        reversed,
        Err(ItineraryError::DateOrderViolation {
            previous: date(2024, 9, 27),
            next: date(2024, 9, 20),
        })
    );

    let same_day = parser().parse(&["JFK", "2024-09-20", "IST", "2024-09-20", "CDG"]);
    assert!(matches!(
        same_day,
        Err(ItineraryError::DateOrderViolation { .. })
    ));
}

#[test]
fn test_perfect_chain_yields_single_combination() {
    let trip = parser()
        .parse(&["JFK", "2024-09-20", "IST", "2024-09-27", "CDG", "2024-10-01", "LHR"])
        .unwrap();
    assert_eq!(trip.leg_count(), 3);

    let combinations: Vec<_> = generate(&trip).iter().collect();
    assert_eq!(combinations.len(), 1);
    assert_eq!(
        combinations[0].dates(),
        &[date(2024, 9, 20), date(2024, 9, 27), date(2024, 10, 1)]
    );

    let stops: Vec<(&str, &str)> = trip
        .legs()
        .iter()
        .map(|leg| (leg.origin().name(), leg.destination().name()))
        .collect();
    assert_eq!(stops, vec![("JFK", "IST"), ("IST", "CDG"), ("CDG", "LHR")]);
}

#[test]
fn test_chain_rejects_fuzzy_dates() {
    let result = parser().parse(&["JFK", "IST", "2024-09-20+1", "IST", "CDG", "2024-09-27"]);
    assert_eq!(
        result,
        Err(ItineraryError::InvalidArgumentAtPosition {
            position: 2,
            expected: "a fixed date YYYY-MM-DD",
        })
    );
}

// =============================================================================
// Locations
// =============================================================================

#[test]
fn test_alias_table_as_resolver() {
    let mut aliases = AliasTable::new();
    aliases.insert("Shanghai/上海市", ["SHA//Hongqiao", "PVG//Pudong"]);

    let trip = ItineraryParser::new(&aliases)
        .parse(&["AMS", "上海市", "2024-09-27"])
        .unwrap();
    let destination = trip.legs()[0].destination();
    assert_eq!(destination.name(), "shanghai");
    assert_eq!(destination.codes().len(), 2);

    let unknown = ItineraryParser::new(&aliases).parse(&["AMS", "X1Z", "2024-09-27"]);
    assert!(matches!(unknown, Err(ItineraryError::UnknownLocation(_))));
}

#[test]
fn test_location_token_length() {
    let result = parser().parse(&["AMST", "PVG", "2024-09-27"]);
    assert!(matches!(
        result,
        Err(ItineraryError::InvalidArgumentAtPosition { position: 0, .. })
    ));
}
