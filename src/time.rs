//! # Epoch helpers
//!
//! Conversions between [`hifitime::Epoch`] and the two textual epoch forms used
//! by the element-set encodings:
//!
//! * the fixed-column **two-digit year + fractional day-of-year** pair, where the
//!   day is counted from **day 0** of the year (midnight of December 31st of the
//!   previous year), so `1.5` is January 1st at noon;
//! * the **calendar timestamp** `YYYY-MM-DDTHH:MM:SS[.fffffffff]` shared by the
//!   KVN, CSV, JSON and XML encodings, always UTC, with trailing fractional zeros
//!   trimmed and the fraction omitted when it is zero.
use hifitime::{Epoch, TimeScale};
use nom::{
    bytes::complete::take_while_m_n,
    character::complete::{char, digit1},
    combinator::{all_consuming, map_res, opt},
    sequence::preceded,
    IResult, Parser,
};

use crate::constants::TWO_DIGIT_YEAR_PIVOT;
use crate::gpelements_errors::ElementsError;

/// Calendar components of an epoch, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanos: u32,
}

impl CivilTime {
    pub fn from_epoch(epoch: &Epoch) -> Self {
        let (year, month, day, hour, minute, second, nanos) = epoch.to_gregorian_utc();
        CivilTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
            nanos,
        }
    }

    pub fn to_epoch(&self) -> Result<Epoch, ElementsError> {
        Epoch::maybe_from_gregorian(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.nanos,
            TimeScale::UTC,
        )
        .map_err(|e| ElementsError::format("Epoch", e.to_string()))
    }
}

/// Expand the two-digit year of the fixed-column format: `< 56` is 20xx, otherwise 19xx.
pub fn expand_two_digit_year(yy: i32) -> i32 {
    if yy < TWO_DIGIT_YEAR_PIVOT {
        2000 + yy
    } else {
        1900 + yy
    }
}

/// Inverse of [`expand_two_digit_year`]; years before 1955 collapse to `0`.
pub fn two_digit_year(year: i32) -> i32 {
    if year < 1955 {
        0
    } else if year < 2000 {
        year - 1900
    } else {
        year - 2000
    }
}

/// Build an epoch from a full year and a fractional day counted from day 0.
///
/// Arguments
/// -----------------
/// * `year`: the full (four-digit) year.
/// * `day`: fractional day of the year, `1.0` being January 1st at 00:00 UTC.
///
/// Return
/// ----------
/// * The corresponding UTC [`Epoch`], or a `Format` error on a non-finite day.
pub fn epoch_from_year_day(year: i32, day: f64) -> Result<Epoch, ElementsError> {
    if !day.is_finite() {
        return Err(ElementsError::format("EpochDay", format!("'{day}' is not finite")));
    }
    Ok(Epoch::from_day_of_year(year, day, TimeScale::UTC))
}

/// Split an epoch into its full year and fractional day counted from day 0.
pub fn year_day(epoch: &Epoch) -> (i32, f64) {
    epoch.to_time_scale(TimeScale::UTC).year_days_of_year()
}

/// Render an epoch as `YYYY-MM-DDTHH:MM:SS[.fffffffff]` (UTC, trailing zeros trimmed).
pub fn format_timestamp(epoch: &Epoch) -> String {
    let c = CivilTime::from_epoch(epoch);
    let mut s = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        c.year, c.month, c.day, c.hour, c.minute, c.second
    );
    if c.nanos > 0 {
        let frac = format!("{:09}", c.nanos);
        s.push('.');
        s.push_str(frac.trim_end_matches('0'));
    }
    s
}

fn fixed_digits<'a>(
    n: usize,
) -> impl Parser<&'a str, Output = u32, Error = nom::error::Error<&'a str>> {
    map_res(
        take_while_m_n(n, n, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u32>(),
    )
}

fn fraction_nanos(input: &str) -> IResult<&str, u32> {
    map_res(preceded(char('.'), digit1), |digits: &str| {
        if digits.len() > 9 {
            return Err("more than nine fractional digits");
        }
        let padded = format!("{digits:0<9}");
        padded.parse::<u32>().map_err(|_| "invalid fraction")
    })
    .parse(input)
}

fn timestamp(input: &str) -> IResult<&str, CivilTime> {
    let (input, (year, _, month, _, day, _, hour, _, minute, _, second)) = (
        fixed_digits(4),
        char('-'),
        fixed_digits(2),
        char('-'),
        fixed_digits(2),
        char('T'),
        fixed_digits(2),
        char(':'),
        fixed_digits(2),
        char(':'),
        fixed_digits(2),
    )
        .parse(input)?;
    let (input, nanos) = opt(fraction_nanos).parse(input)?;
    let (input, _) = opt(char('Z')).parse(input)?;
    Ok((
        input,
        CivilTime {
            year: year as i32,
            month: month as u8,
            day: day as u8,
            hour: hour as u8,
            minute: minute as u8,
            second: second as u8,
            nanos: nanos.unwrap_or(0),
        },
    ))
}

/// Parse a calendar timestamp written by [`format_timestamp`].
///
/// An optional trailing `Z` is accepted; every other suffix is rejected.
pub fn parse_timestamp(s: &str) -> Result<Epoch, ElementsError> {
    let (_, civil) = all_consuming(timestamp).parse(s.trim()).map_err(|_| {
        ElementsError::format("Epoch", format!("'{s}' is not a YYYY-MM-DDTHH:MM:SS timestamp"))
    })?;
    civil.to_epoch()
}

/// Serde adapter writing an [`Epoch`] as a calendar timestamp string.
pub mod epoch_serde {
    use hifitime::Epoch;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(epoch: &Epoch, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(epoch))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Epoch, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_timestamp(&s).map_err(D::Error::custom)
    }
}

/// Same as [`epoch_serde`] for optional values; `""` and `"null"` read back as `None`.
pub mod opt_epoch_serde {
    use hifitime::Epoch;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        epoch: &Option<Epoch>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match epoch {
            Some(epoch) => serializer.serialize_str(&super::format_timestamp(epoch)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Epoch>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s.as_deref().map(str::trim) {
            None | Some("") | Some("null") => Ok(None),
            Some(s) => super::parse_timestamp(s).map(Some).map_err(D::Error::custom),
        }
    }
}
