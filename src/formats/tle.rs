//! # Fixed-column two-line element reader and writer
//!
//! Parse and render the legacy **two-line element** format: a free-text name
//! line followed by two 69-column data lines.
//!
//! ## Overview
//! -----------------
//! ```text
//! ISS (ZARYA)
//! 1 25544U 98067A   20262.67636574  .00000241  00000+0  12514-4 0  9990
//! 2 25544  51.6432 245.8351 0000884 104.2674 236.9442 15.48952759246507
//! ```
//!
//! Every field is addressed through the [`line1`] and [`line2`] column tables
//! (1-based, inclusive bounds). A data line that does not reach a field is a
//! `Format` error naming that field.
//!
//! ## Units & Conventions
//! -----------------
//! - **Epoch:** two-digit year (`< 56` is 20xx) and fractional day counted from
//!   day 0 of that year, see [`epoch_from_year_day`].
//! - **Drag terms:** `MeanMotionDDot` and `BStar` use the implied-point signed
//!   fraction of [`parse_signed_fraction`].
//! - **Eccentricity:** seven digits with an implied leading `0.`.
//! - **Checksum:** column 69, see [`line_checksum`]. [`parse_tle`] ignores it;
//!   [`parse_tle_checked`] verifies it.
//!
//! ## Round trip
//! -----------------
//! [`marshal_tle`] of a parsed set reproduces the three input lines (names are
//! padded to 24 characters) with freshly computed checksums. Zero drag terms
//! always render as `" 00000+0"`.
use crate::catalog_id::CatalogId;
use crate::constants::{
    line1, line2, Column, DEFAULT_CLASSIFICATION, MAX_ELEMENT_SET_NO, MAX_REV_AT_EPOCH,
    TLE_NAME_WIDTH,
};
use crate::conversion::{
    format_mean_motion_dot, format_signed_fraction, line_checksum, parse_signed_fraction,
    parse_tle_float,
};
use crate::elements::{ElementSet, InternationalDesignator};
use crate::gpelements_errors::ElementsError;
use crate::time::{epoch_from_year_day, expand_two_digit_year, two_digit_year, year_day};

/// Slice one field out of a data line.
fn extract(line: &str, column: Column) -> Result<&str, ElementsError> {
    line.get(column.range()).ok_or_else(|| {
        ElementsError::format(
            column.name,
            format!(
                "line of {} characters does not reach column {}",
                line.len(),
                column.end
            ),
        )
    })
}

fn parse_number<T: std::str::FromStr>(line: &str, column: Column) -> Result<T, ElementsError>
where
    T::Err: std::fmt::Display,
{
    let raw = extract(line, column)?;
    raw.trim()
        .parse()
        .map_err(|e| ElementsError::format(column.name, format!("'{raw}': {e}")))
}

fn parse_float(line: &str, column: Column) -> Result<f64, ElementsError> {
    parse_tle_float(extract(line, column)?).map_err(|e| e.for_field(column.name))
}

fn parse_fraction(line: &str, column: Column) -> Result<f64, ElementsError> {
    parse_signed_fraction(extract(line, column)?).map_err(|e| e.for_field(column.name))
}

fn expect_line_number(line: &str, column: Column, expected: &str) -> Result<(), ElementsError> {
    let found = extract(line, column)?;
    if found != expected {
        return Err(ElementsError::format(
            column.name,
            format!("expected line {expected}, found '{found}'"),
        ));
    }
    Ok(())
}

/// Launch columns 10–17 of the first data line; all blank means no designator.
fn parse_launch(line: &str) -> Result<Option<InternationalDesignator>, ElementsError> {
    let year = extract(line, line1::LAUNCH_YEAR)?;
    let number = extract(line, line1::LAUNCH_NUMBER)?;
    let piece = extract(line, line1::LAUNCH_PIECE)?;
    if year.trim().is_empty() && number.trim().is_empty() && piece.trim().is_empty() {
        return Ok(None);
    }

    let yy: i32 = parse_number(line, line1::LAUNCH_YEAR)?;
    let number = number.trim().trim_start_matches('0');
    let launch_number = if number.is_empty() {
        0
    } else {
        number.parse().map_err(|e| {
            ElementsError::format(line1::LAUNCH_NUMBER.name, format!("'{number}': {e}"))
        })?
    };

    Ok(Some(InternationalDesignator {
        launch_year: expand_two_digit_year(yy),
        launch_number,
        launch_piece: piece.trim_end().to_string(),
    }))
}

fn parse_eccentricity(line: &str) -> Result<f64, ElementsError> {
    let column = line2::ECCENTRICITY;
    let raw = extract(line, column)?;
    if raw.starts_with('-') {
        return Err(ElementsError::range(column.name, format!("'{raw}' is negative")));
    }
    format!("0.{}", raw.trim_start())
        .parse()
        .map_err(|e| ElementsError::format(column.name, format!("'{raw}': {e}")))
}

/// Parse a three-line element set.
///
/// Arguments
/// -----------------
/// * `l0`: the name line; trailing blanks are dropped.
/// * `l1`, `l2`: the two data lines, at least 68 characters each.
///
/// Return
/// ----------
/// * The decoded [`ElementSet`], with `object_id` synthesized from the launch
///   columns and `launch` filled in.
/// * A `Format` error naming the first field that is missing or malformed.
/// * A `CatalogIdMismatch` error when the two data lines disagree on the catalog id.
///
/// See also
/// ------------
/// * [`parse_tle_checked`] – Same, with checksum verification.
/// * [`marshal_tle`] – The inverse operation.
pub fn parse_tle(l0: &str, l1: &str, l2: &str) -> Result<ElementSet, ElementsError> {
    expect_line_number(l1, line1::LINE_NUMBER, "1")?;
    expect_line_number(l2, line2::LINE_NUMBER, "2")?;

    let norad_cat_id = CatalogId::new(extract(l1, line1::CATALOG_ID)?).decode();
    let classification_type = extract(l1, line1::CLASSIFICATION)?.to_string();
    let launch = parse_launch(l1)?;

    let epoch_year: i32 = parse_number(l1, line1::EPOCH_YEAR)?;
    let epoch_day: f64 = parse_number(l1, line1::EPOCH_DAY)?;
    let epoch = epoch_from_year_day(expand_two_digit_year(epoch_year), epoch_day)
        .map_err(|e| e.for_field(line1::EPOCH_DAY.name))?;

    let mean_motion_dot = parse_float(l1, line1::MEAN_MOTION_DOT)?;
    let mean_motion_ddot = parse_fraction(l1, line1::MEAN_MOTION_DDOT)?;
    let bstar = parse_fraction(l1, line1::BSTAR)?;

    let ephemeris_type = match extract(l1, line1::EPHEMERIS_TYPE)?.trim() {
        "" => 0,
        _ => parse_number(l1, line1::EPHEMERIS_TYPE)?,
    };
    let element_set_no = parse_number(l1, line1::ELEMENT_SET)?;

    let second_id = CatalogId::new(extract(l2, line2::CATALOG_ID)?).decode();
    if second_id != norad_cat_id {
        return Err(ElementsError::CatalogIdMismatch {
            line1: norad_cat_id.to_string(),
            line2: second_id.to_string(),
        });
    }

    let mut e = ElementSet::new(epoch);
    e.name = l0.trim_end().to_string();
    e.object_id = launch.as_ref().map(|d| d.to_string()).unwrap_or_default();
    e.launch = launch;
    e.classification_type = classification_type;
    e.norad_cat_id = norad_cat_id;
    e.mean_motion_dot = mean_motion_dot;
    e.mean_motion_ddot = mean_motion_ddot;
    e.bstar = bstar;
    e.ephemeris_type = ephemeris_type;
    e.element_set_no = element_set_no;

    e.inclination = parse_float(l2, line2::INCLINATION)?;
    e.ra_of_asc_node = parse_float(l2, line2::RA_OF_ASC_NODE)?;
    e.eccentricity = parse_eccentricity(l2)?;
    e.arg_of_pericenter = parse_float(l2, line2::ARG_OF_PERICENTER)?;
    e.mean_anomaly = parse_float(l2, line2::MEAN_ANOMALY)?;
    e.mean_motion = parse_float(l2, line2::MEAN_MOTION)?;
    e.rev_at_epoch = parse_number(l2, line2::REV_AT_EPOCH)?;

    Ok(e)
}

/// Compare the checksum digit of a data line with the one computed from its content.
///
/// `line_number` (1 or 2) selects the column table and is reported in the error.
pub fn verify_checksum(line: &str, line_number: u8) -> Result<(), ElementsError> {
    let column = if line_number == 1 {
        line1::CHECKSUM
    } else {
        line2::CHECKSUM
    };
    let expected = extract(line, column)?.chars().next().unwrap_or(' ');
    let computed = line_checksum(&line[..column.start - 1]);
    if expected != computed {
        return Err(ElementsError::Checksum {
            line: line_number,
            expected,
            computed,
        });
    }
    Ok(())
}

/// [`parse_tle`] preceded by [`verify_checksum`] on both data lines.
pub fn parse_tle_checked(l0: &str, l1: &str, l2: &str) -> Result<ElementSet, ElementsError> {
    verify_checksum(l1, 1)?;
    verify_checksum(l2, 2)?;
    parse_tle(l0, l1, l2)
}

/// Right-aligned fixed-point rendering that must fit its column.
fn fixed(x: f64, column: Column, precision: usize) -> Result<String, ElementsError> {
    let width = column.width();
    let s = format!("{x:>width$.precision$}");
    if s.len() > width || !x.is_finite() {
        return Err(ElementsError::range(
            column.name,
            format!("{s} does not fit {width} columns"),
        ));
    }
    Ok(s)
}

/// Seven eccentricity digits after the implied `0.`; the eighth decimal is dropped.
fn format_eccentricity(x: f64) -> Result<String, ElementsError> {
    let rendered = format!("{x:.8}");
    match rendered.strip_prefix("0.") {
        Some(digits) => Ok(digits[..line2::ECCENTRICITY.width()].to_string()),
        None => Err(ElementsError::range(
            line2::ECCENTRICITY.name,
            format!("{rendered} is not below 1"),
        )),
    }
}

fn format_launch(designator: Option<InternationalDesignator>) -> Result<String, ElementsError> {
    let Some(d) = designator else {
        return Ok(" ".repeat(8));
    };
    let yy = two_digit_year(d.launch_year);
    if !(0..100).contains(&yy) {
        return Err(ElementsError::range(
            line1::LAUNCH_YEAR.name,
            format!("{} has no two-digit form", d.launch_year),
        ));
    }
    if d.launch_number >= 1000 {
        return Err(ElementsError::range(
            line1::LAUNCH_NUMBER.name,
            format!("{} does not fit 3 columns", d.launch_number),
        ));
    }
    if d.launch_piece.len() > line1::LAUNCH_PIECE.width() {
        return Err(ElementsError::range(
            line1::LAUNCH_PIECE.name,
            format!("'{}' does not fit 3 columns", d.launch_piece),
        ));
    }
    Ok(format!("{yy:02}{:03}{:<3}", d.launch_number, d.launch_piece))
}

/// Render an element set as its three fixed-column lines.
///
/// Arguments
/// -----------------
/// * `e`: the element set; its catalog id is encoded with [`CatalogId::encode`]
///   and its launch fields come from [`ElementSet::international_designator`].
///
/// Return
/// ----------
/// * `(l0, l1, l2)`: the name padded to 24 characters and the two
///   69-column data lines, each ending with its checksum digit.
/// * A `Range` error when a value does not fit its columns: eccentricity
///   outside `[0, 1)`, `rev_at_epoch >= 100000`, `element_set_no >= 10000`,
///   a catalog id longer than five characters, angles that overflow eight
///   columns, or drag terms beyond the one-digit exponent.
pub fn marshal_tle(e: &ElementSet) -> Result<(String, String, String), ElementsError> {
    let name_width = TLE_NAME_WIDTH;
    let line0 = format!("{:<name_width$}", e.name);

    let id = e.norad_cat_id.encode();
    let id = if id.as_str().bytes().all(|b| b.is_ascii_digit()) {
        format!("{:0>5}", id.as_str())
    } else {
        id.to_string()
    };
    if id.len() > line1::CATALOG_ID.width() {
        return Err(ElementsError::range(
            line1::CATALOG_ID.name,
            format!("'{id}' does not fit 5 columns"),
        ));
    }

    let classification = e
        .classification_type
        .chars()
        .next()
        .map(String::from)
        .unwrap_or_else(|| DEFAULT_CLASSIFICATION.to_string());
    let launch = format_launch(e.international_designator()?)?;

    let (year, day) = year_day(&e.epoch);
    let yy = two_digit_year(year);
    if !(0..100).contains(&yy) {
        return Err(ElementsError::range(
            line1::EPOCH_YEAR.name,
            format!("{year} has no two-digit form"),
        ));
    }

    let mean_motion_dot = format_mean_motion_dot(e.mean_motion_dot)
        .map_err(|err| err.for_field(line1::MEAN_MOTION_DOT.name))?;
    let mean_motion_ddot = format_signed_fraction(e.mean_motion_ddot)
        .map_err(|err| err.for_field(line1::MEAN_MOTION_DDOT.name))?;
    let bstar =
        format_signed_fraction(e.bstar).map_err(|err| err.for_field(line1::BSTAR.name))?;

    if e.ephemeris_type > 9 {
        return Err(ElementsError::range(
            line1::EPHEMERIS_TYPE.name,
            format!("{} does not fit 1 column", e.ephemeris_type),
        ));
    }
    if e.element_set_no >= MAX_ELEMENT_SET_NO {
        return Err(ElementsError::range(
            line1::ELEMENT_SET.name,
            format!("{} does not fit 4 columns", e.element_set_no),
        ));
    }

    let mut first = format!(
        "1 {id:<5}{classification} {launch} {yy:02}{day:012.8} {mean_motion_dot} {mean_motion_ddot} {bstar} {} {:>4}",
        e.ephemeris_type, e.element_set_no
    );
    first.push(line_checksum(&first));

    if e.rev_at_epoch >= MAX_REV_AT_EPOCH {
        return Err(ElementsError::range(
            line2::REV_AT_EPOCH.name,
            format!("{} is too many revolutions", e.rev_at_epoch),
        ));
    }

    let mut second = format!(
        "2 {id:<5} {} {} {} {} {} {}{:>5}",
        fixed(e.inclination, line2::INCLINATION, 4)?,
        fixed(e.ra_of_asc_node, line2::RA_OF_ASC_NODE, 4)?,
        format_eccentricity(e.eccentricity)?,
        fixed(e.arg_of_pericenter, line2::ARG_OF_PERICENTER, 4)?,
        fixed(e.mean_anomaly, line2::MEAN_ANOMALY, 4)?,
        fixed(e.mean_motion, line2::MEAN_MOTION, 8)?,
        e.rev_at_epoch
    );
    second.push(line_checksum(&second));

    Ok((line0, first, second))
}
