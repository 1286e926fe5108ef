//! # CSV records
//!
//! One element set per line, columns in the order of [`CSV_HEADER`]. The five
//! string-valued columns (name, object id, epoch, classification and catalog id)
//! are double-quoted, the numeric ones are bare:
//!
//! ```text
//! "ISS (ZARYA)","1998-067A","2020-09-18T16:13:57.999936",15.48952759,8.84e-05,51.6432,...,"U","25544",999,24650,1.2514e-05,2.41e-06,0
//! ```
//!
//! Quotes inside a string value are doubled. The reader goes through the `csv`
//! crate, so records whose producer omitted the quoting are accepted as well.
use std::fmt::Display;
use std::str::FromStr;

use ::csv::{ReaderBuilder, StringRecord, Trim};
use itertools::Itertools;

use crate::catalog_id::CatalogId;
use crate::constants::{CSV_FIELD_COUNT, CSV_HEADER};
use crate::conversion::format_general;
use crate::elements::{revolutions_from_f64, ElementSet};
use crate::gpelements_errors::ElementsError;
use crate::time::{format_timestamp, parse_timestamp};

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Render one element set as a CSV record, without line terminator.
pub fn marshal_csv(e: &ElementSet) -> String {
    [
        quote(&e.name),
        quote(&e.object_id),
        quote(&format_timestamp(&e.epoch)),
        format_general(e.mean_motion),
        format_general(e.eccentricity),
        format_general(e.inclination),
        format_general(e.ra_of_asc_node),
        format_general(e.arg_of_pericenter),
        format_general(e.mean_anomaly),
        e.ephemeris_type.to_string(),
        quote(&e.classification_type),
        quote(e.norad_cat_id.as_str()),
        e.element_set_no.to_string(),
        e.rev_at_epoch.to_string(),
        format_general(e.bstar),
        format_general(e.mean_motion_dot),
        format_general(e.mean_motion_ddot),
    ]
    .iter()
    .join(",")
}

fn column_name(index: usize) -> &'static str {
    CSV_HEADER.split(',').nth(index).unwrap_or("CSV")
}

/// Text of one column; the reader has already removed any quoting.
fn text(record: &StringRecord, index: usize) -> &str {
    record.get(index).unwrap_or_default()
}

fn parsed<T: FromStr>(record: &StringRecord, index: usize) -> Result<T, ElementsError>
where
    T::Err: Display,
{
    let raw = text(record, index);
    raw.parse().map_err(|e| {
        ElementsError::format(column_name(index), format!("'{raw}': {e}"))
    })
}

/// Parse one CSV record.
///
/// Arguments
/// -----------------
/// * `line`: a single record, quoted or not, without its header.
///
/// Return
/// ----------
/// * The decoded [`ElementSet`]; provenance fields are left empty.
/// * A `Format` error naming the column when a value does not parse, or
///   naming `CSV` when the record does not have exactly 17 fields.
pub fn parse_csv(line: &str) -> Result<ElementSet, ElementsError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());

    let record = reader
        .records()
        .next()
        .transpose()?
        .ok_or_else(|| ElementsError::format("CSV", "empty record"))?;
    if record.len() != CSV_FIELD_COUNT {
        return Err(ElementsError::format(
            "CSV",
            format!("expected {CSV_FIELD_COUNT} fields, found {}", record.len()),
        ));
    }

    let epoch = parse_timestamp(text(&record, 2)).map_err(|e| e.for_field(column_name(2)))?;
    let mut e = ElementSet::new(epoch);
    e.name = text(&record, 0).to_string();
    e.object_id = text(&record, 1).to_string();
    e.mean_motion = parsed(&record, 3)?;
    e.eccentricity = parsed(&record, 4)?;
    e.inclination = parsed(&record, 5)?;
    e.ra_of_asc_node = parsed(&record, 6)?;
    e.arg_of_pericenter = parsed(&record, 7)?;
    e.mean_anomaly = parsed(&record, 8)?;
    e.ephemeris_type = parsed(&record, 9)?;
    e.classification_type = text(&record, 10).to_string();
    e.norad_cat_id = CatalogId::new(text(&record, 11));
    e.element_set_no = parsed(&record, 12)?;
    e.rev_at_epoch = revolutions_from_f64(parsed(&record, 13)?)?;
    e.bstar = parsed(&record, 14)?;
    e.mean_motion_dot = parsed(&record, 15)?;
    e.mean_motion_ddot = parsed(&record, 16)?;

    Ok(e)
}
