//! Raw argument parsing.
//!
//! Classifies a flat argument list into one of the four itinerary shapes,
//! validates every token, resolves locations and hands the typed values to
//! the matching [`Itinerary`] constructor.
//!
//! | Shape | Arguments |
//! |-------|-----------|
//! | one-way | `org, dest, date` |
//! | round-trip | `org, dest, date_out, date_back` |
//! | chain-trip | `org, dest, date, org, dest, date, ...` |
//! | perfect-chain | `org, date, org, date, ..., dest` |
//!
//! One-way and round-trip dates may be fuzzy (`2024-09-27+5-2`); chain
//! dates must be fixed `YYYY-MM-DD`.

use chrono::NaiveDate;

use crate::date::{DateSpec, FIXED_DATE_LEN};
use crate::error::{ItineraryError, ItineraryResult};
use crate::itinerary::{Itinerary, ItineraryKind};
use crate::location::{CodeResolver, LocationRef, LocationResolver, LOCATION_TOKEN_LEN};

/// Parses raw itinerary arguments using an injected location resolver.
///
/// # Example
///
/// ```rust
/// use fuzzy_itinerary::{CodeResolver, ItineraryKind, ItineraryParser};
///
/// let parser = ItineraryParser::new(CodeResolver);
/// let trip = parser.parse(&["AMS", "PVG", "2024-09-27+5-2", "2024-10-05+1-2"]).unwrap();
/// assert_eq!(trip.kind(), ItineraryKind::RoundTrip);
///
/// let chain = parser
///     .parse(&["JFK", "2024-09-20", "IST", "2024-09-27", "CDG"])
///     .unwrap();
/// assert_eq!(chain.kind(), ItineraryKind::PerfectChain);
/// assert_eq!(chain.leg_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ItineraryParser<R = CodeResolver> {
    resolver: R,
}

impl<R: LocationResolver> ItineraryParser<R> {
    /// Creates a parser that resolves location tokens through `resolver`.
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Returns the resolver used for location tokens.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Parses a raw argument list into an itinerary.
    pub fn parse<S: AsRef<str>>(&self, args: &[S]) -> ItineraryResult<Itinerary> {
        let args = RawArgs::new(args);

        match classify(&args)? {
            ItineraryKind::OneWay => Ok(Itinerary::one_way(
                self.location(&args, 0)?,
                self.location(&args, 1)?,
                args.fuzzy_date(2)?,
            )),
            ItineraryKind::RoundTrip => Ok(Itinerary::round_trip(
                self.location(&args, 0)?,
                self.location(&args, 1)?,
                args.fuzzy_date(2)?,
                args.fuzzy_date(3)?,
            )),
            ItineraryKind::ChainTrip => {
                let legs = (0..args.len())
                    .step_by(3)
                    .map(|i| -> ItineraryResult<_> {
                        Ok((
                            self.location(&args, i)?,
                            self.location(&args, i + 1)?,
                            args.fixed_date(i + 2)?,
                        ))
                    })
                    .collect::<ItineraryResult<Vec<_>>>()?;
                Itinerary::chain_trip(legs)
            }
            ItineraryKind::PerfectChain => {
                let last = args.len() - 1;
                let stops = (0..last)
                    .step_by(2)
                    .map(|i| -> ItineraryResult<_> {
                        Ok((self.location(&args, i)?, args.fixed_date(i + 1)?))
                    })
                    .collect::<ItineraryResult<Vec<_>>>()?;
                Itinerary::perfect_chain(stops, self.location(&args, last)?)
            }
        }
    }

    fn location(&self, args: &RawArgs<'_>, position: usize) -> ItineraryResult<LocationRef> {
        let token = args.get(position)?;
        if char_len(token) != LOCATION_TOKEN_LEN {
            return Err(ItineraryError::InvalidArgumentAtPosition {
                position,
                expected: "a 3-character location",
            });
        }
        self.resolver.resolve(token)
    }
}

/// Determines the shape of an argument list without validating its tokens.
///
/// Shapes are tried in priority order: one-way, round-trip, chain-trip,
/// perfect-chain. Chain-trip and perfect-chain are told apart by the last
/// argument, a date for the former and a location for the latter.
pub fn classify_args<S: AsRef<str>>(args: &[S]) -> ItineraryResult<ItineraryKind> {
    classify(&RawArgs::new(args))
}

fn classify(args: &RawArgs<'_>) -> ItineraryResult<ItineraryKind> {
    let n = args.len();
    let last_len = args.last().map(char_len);

    let kind = match n {
        3 => ItineraryKind::OneWay,
        4 => ItineraryKind::RoundTrip,
        _ if n >= 3 && n % 3 == 0 && last_len == Some(FIXED_DATE_LEN) => ItineraryKind::ChainTrip,
        _ if n >= 5 && n % 2 == 1 && last_len == Some(LOCATION_TOKEN_LEN) => {
            ItineraryKind::PerfectChain
        }
        _ => return Err(ItineraryError::UnrecognizedItineraryShape { arg_count: n }),
    };
    Ok(kind)
}

struct RawArgs<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> RawArgs<'a> {
    fn new<S: AsRef<str>>(args: &'a [S]) -> Self {
        Self {
            tokens: args.iter().map(|s| s.as_ref()).collect(),
        }
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }

    fn last(&self) -> Option<&'a str> {
        self.tokens.last().copied()
    }

    fn get(&self, position: usize) -> ItineraryResult<&'a str> {
        self.tokens
            .get(position)
            .copied()
            .ok_or(ItineraryError::InvalidArgumentAtPosition {
                position,
                expected: "an argument",
            })
    }

    fn fuzzy_date(&self, position: usize) -> ItineraryResult<DateSpec> {
        let token = self.get(position)?;
        if char_len(token) < FIXED_DATE_LEN {
            return Err(ItineraryError::InvalidArgumentAtPosition {
                position,
                expected: "a date expression YYYY-MM-DD[+m][-n]",
            });
        }
        DateSpec::parse(token)
    }

    fn fixed_date(&self, position: usize) -> ItineraryResult<NaiveDate> {
        let token = self.get(position)?;
        if char_len(token) != FIXED_DATE_LEN {
            return Err(ItineraryError::InvalidArgumentAtPosition {
                position,
                expected: "a fixed date YYYY-MM-DD",
            });
        }
        Ok(DateSpec::parse(token)?.base())
    }
}

fn char_len(token: &str) -> usize {
    token.chars().count()
}
