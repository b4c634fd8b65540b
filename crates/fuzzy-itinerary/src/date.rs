//! Fuzzy date expressions and their expansion into concrete dates.
//!
//! A date expression is a calendar date optionally followed by a forward
//! offset and a backward offset, both in days:
//!
//! | Expression | Window |
//! |------------|--------|
//! | `2024-09-27` | the date itself |
//! | `2024-09-27+2` | 09-27 .. 09-29 |
//! | `2024-09-27-2` | 09-25 .. 09-27 |
//! | `2024-09-27+5-2` | 09-25 .. 10-02 |

use std::fmt;
use std::str::FromStr;

use chrono::{Days, NaiveDate};
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{ItineraryError, ItineraryResult};

/// Length in characters of a fixed `YYYY-MM-DD` date token.
pub const FIXED_DATE_LEN: usize = 10;

/// A calendar date with an optional window of days around it.
///
/// The window always lies inside the representable calendar range, so
/// [`expand`](Self::expand) cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DateSpec {
    base: NaiveDate,
    forward_days: u32,
    backward_days: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    start: NaiveDate,
    #[cfg_attr(feature = "serde", serde(skip))]
    end: NaiveDate,
}

impl DateSpec {
    /// Creates a window of `backward_days` before and `forward_days` after `base`.
    ///
    /// Fails with [`ItineraryError::InvalidDateExpression`] when the window
    /// runs off the end of the calendar.
    pub fn new(base: NaiveDate, forward_days: u32, backward_days: u32) -> ItineraryResult<Self> {
        let start = base.checked_sub_days(Days::new(u64::from(backward_days)));
        let end = base.checked_add_days(Days::new(u64::from(forward_days)));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                base,
                forward_days,
                backward_days,
                start,
                end,
            }),
            _ => Err(ItineraryError::InvalidDateExpression(format_expression(
                base,
                forward_days,
                backward_days,
            ))),
        }
    }

    /// Creates a window holding exactly one date.
    pub fn fixed(base: NaiveDate) -> Self {
        Self {
            base,
            forward_days: 0,
            backward_days: 0,
            start: base,
            end: base,
        }
    }

    /// Parses a `YYYY-MM-DD[+m][-n]` expression.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use fuzzy_itinerary::DateSpec;
    ///
    /// let spec = DateSpec::parse("2024-09-27+5-2").unwrap();
    /// assert_eq!(spec.forward_days(), 5);
    /// assert_eq!(spec.backward_days(), 2);
    /// assert_eq!(spec.expand().len(), 8);
    /// ```
    pub fn parse(input: &str) -> ItineraryResult<Self> {
        let invalid = || ItineraryError::InvalidDateExpression(input.to_string());

        let (_, (year, _, month, _, day, forward, backward)) =
            all_consuming(date_expression)(input.trim()).map_err(|_| invalid())?;
        let base = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)?;

        Self::new(base, forward.unwrap_or(0), backward.unwrap_or(0)).map_err(|_| invalid())
    }

    /// The date the window is centred on.
    pub fn base(&self) -> NaiveDate {
        self.base
    }

    /// Days after the base date included in the window.
    pub fn forward_days(&self) -> u32 {
        self.forward_days
    }

    /// Days before the base date included in the window.
    pub fn backward_days(&self) -> u32 {
        self.backward_days
    }

    /// Returns true when the window holds only the base date.
    pub fn is_fixed(&self) -> bool {
        self.forward_days == 0 && self.backward_days == 0
    }

    /// First date of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date of the window.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of dates in the window.
    pub fn window_len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Expands the window into every date from start to end, ascending.
    pub fn expand(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take(self.window_len())
            .collect()
    }
}

impl fmt::Display for DateSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_expression(
            self.base,
            self.forward_days,
            self.backward_days,
        ))
    }
}

impl FromStr for DateSpec {
    type Err = ItineraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses a date expression and expands it in one step.
pub fn expand_date_expression(input: &str) -> ItineraryResult<Vec<NaiveDate>> {
    Ok(DateSpec::parse(input)?.expand())
}

fn format_expression(base: NaiveDate, forward_days: u32, backward_days: u32) -> String {
    let mut out = base.format("%Y-%m-%d").to_string();
    if forward_days > 0 {
        out.push_str(&format!("+{forward_days}"));
    }
    if backward_days > 0 {
        out.push_str(&format!("-{backward_days}"));
    }
    out
}

// ============================================================================
// Grammar
// ============================================================================

type DateParts = (i32, char, u32, char, u32, Option<u32>, Option<u32>);

fn date_expression(input: &str) -> IResult<&str, DateParts> {
    tuple((
        fixed_digits::<i32>(4),
        char('-'),
        fixed_digits::<u32>(2),
        char('-'),
        fixed_digits::<u32>(2),
        opt(preceded(char('+'), day_offset)),
        opt(preceded(char('-'), day_offset)),
    ))(input)
}

fn fixed_digits<T: FromStr>(count: usize) -> impl Fn(&str) -> IResult<&str, T> {
    move |input| {
        map_res(
            take_while_m_n(count, count, |c: char| c.is_ascii_digit()),
            str::parse::<T>,
        )(input)
    }
}

fn day_offset(input: &str) -> IResult<&str, u32> {
    map_res(digit1, str::parse::<u32>)(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod parsing {
        use super::*;

        #[test]
        fn test_plain_date() {
            let spec = DateSpec::parse("2024-09-27").unwrap();
            assert_eq!(spec.base(), date(2024, 9, 27));
            assert!(spec.is_fixed());
        }

        #[test]
        fn test_forward_only() {
            let spec = DateSpec::parse("2024-09-27+2").unwrap();
            assert_eq!(spec.forward_days(), 2);
            assert_eq!(spec.backward_days(), 0);
        }

        #[test]
        fn test_backward_only() {
            let spec = DateSpec::parse("2024-09-27-3").unwrap();
            assert_eq!(spec.forward_days(), 0);
            assert_eq!(spec.backward_days(), 3);
        }

        #[test]
        fn test_both_modifiers() {
            let spec = DateSpec::parse("2024-09-27+5-2").unwrap();
            assert_eq!(spec.forward_days(), 5);
            assert_eq!(spec.backward_days(), 2);
        }

        #[test]
        fn test_explicit_zero_modifiers() {
            let spec = DateSpec::parse("2023-06-18+0-0").unwrap();
            assert!(spec.is_fixed());
        }

        #[test]
        fn test_surrounding_whitespace() {
            assert!(DateSpec::parse("  2024-09-27+1 ").is_ok());
        }

        #[test]
        fn test_rejects_malformed() {
            for input in [
                "",
                "2024-9-27",
                "27-09-2024",
                "2024/09/27",
                "2024-09-27+",
                "2024-09-27+-2",
                "2024-09-27-2+5",
                "2024-09-27+1+1",
                "2024-09-27x",
                "2024-13-01",
                "2024-02-30",
                "2024-09-27+99999999999",
            ] {
                let err = DateSpec::parse(input).unwrap_err();
                assert_eq!(err, ItineraryError::InvalidDateExpression(input.to_string()));
            }
        }

        #[test]
        fn test_rejects_window_past_calendar_end() {
            let err = DateSpec::parse("0001-01-01-99999999").unwrap_err();
            assert!(matches!(err, ItineraryError::InvalidDateExpression(_)));
        }

        #[test]
        fn test_from_str() {
            let spec: DateSpec = "2024-10-05+1-2".parse().unwrap();
            assert_eq!(spec.base(), date(2024, 10, 5));
        }
    }

    mod expansion {
        use super::*;

        #[test]
        fn test_fixed_expands_to_single_date() {
            let dates = DateSpec::fixed(date(2024, 9, 27)).expand();
            assert_eq!(dates, vec![date(2024, 9, 27)]);
        }

        #[test]
        fn test_window_bounds_and_count() {
            let spec = DateSpec::parse("2024-09-27+5-2").unwrap();
            let dates = spec.expand();
            assert_eq!(dates.len(), 5 + 2 + 1);
            assert_eq!(dates.first(), Some(&date(2024, 9, 25)));
            assert_eq!(dates.last(), Some(&date(2024, 10, 2)));
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn test_backward_only_window() {
            let dates = expand_date_expression("2023-06-18-3").unwrap();
            assert_eq!(
                dates,
                vec![
                    date(2023, 6, 15),
                    date(2023, 6, 16),
                    date(2023, 6, 17),
                    date(2023, 6, 18)
                ]
            );
        }

        #[test]
        fn test_window_crosses_leap_day() {
            let dates = expand_date_expression("2024-02-28+2").unwrap();
            assert_eq!(
                dates,
                vec![date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]
            );
        }

        #[test]
        fn test_every_small_window_has_expected_shape() {
            let base = date(2024, 12, 30);
            for forward in 0..4 {
                for backward in 0..4 {
                    let spec = DateSpec::new(base, forward, backward).unwrap();
                    let dates = spec.expand();
                    assert_eq!(dates.len(), (forward + backward + 1) as usize);
                    assert_eq!(dates[0], base - Days::new(backward.into()));
                    assert_eq!(*dates.last().unwrap(), base + Days::new(forward.into()));
                }
            }
        }
    }

    #[test]
    fn test_display_is_canonical() {
        assert_eq!(DateSpec::parse("2024-09-27").unwrap().to_string(), "2024-09-27");
        assert_eq!(DateSpec::parse("2024-09-27+0-2").unwrap().to_string(), "2024-09-27-2");
        assert_eq!(DateSpec::parse("2024-09-27+5-2").unwrap().to_string(), "2024-09-27+5-2");
    }
}
