//! # JSON element sets
//!
//! Field-level encoding is the serde derive of [`ElementSet`]; this module adds
//! the two framings found in the wild (one JSON array, or one object per line)
//! and the de-quoting pass for producers that write every numeric value as a
//! string, e.g. `"MEAN_MOTION":"15.48952759"`.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;

use crate::elements::ElementSet;
use crate::gpelements_errors::ElementsError;

/// Keys whose quoted numeric values are unquoted by [`destring_numbers`].
///
/// `NORAD_CAT_ID` is absent on purpose: it is a [`CatalogId`](crate::CatalogId)
/// and keeps its string form.
const NUMERIC_KEYS: [&str; 12] = [
    "MEAN_MOTION",
    "ECCENTRICITY",
    "INCLINATION",
    "RA_OF_ASC_NODE",
    "ARG_OF_PERICENTER",
    "MEAN_ANOMALY",
    "EPHEMERIS_TYPE",
    "ELEMENT_SET_NO",
    "REV_AT_EPOCH",
    "BSTAR",
    "MEAN_MOTION_DOT",
    "MEAN_MOTION_DDOT",
];

static QUOTED_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""([A-Z_]+)"\s*:\s*"([-0-9Ee+.]+)""#).expect("valid quoted-number pattern")
});

/// Remove the quotes around the numeric values of the known element keys.
///
/// Other keys and values that do not look numeric are left alone.
pub fn destring_numbers(src: &str) -> String {
    QUOTED_NUMBER
        .replace_all(src, |caps: &Captures| {
            if NUMERIC_KEYS.contains(&&caps[1]) {
                format!("\"{}\":{}", &caps[1], &caps[2])
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Split a JSON array of element sets into its raw records.
///
/// Records are decoded separately with [`from_value`] so that one bad record
/// does not hide the others.
pub fn parse_json_array(src: &str) -> Result<Vec<Value>, ElementsError> {
    Ok(serde_json::from_str(&destring_numbers(src))?)
}

/// Decode one raw record produced by [`parse_json_array`].
pub fn from_value(value: Value) -> Result<ElementSet, ElementsError> {
    Ok(serde_json::from_value(value)?)
}

/// Decode a single JSON object, typically one line of newline-delimited input.
pub fn parse_json_line(line: &str) -> Result<ElementSet, ElementsError> {
    Ok(serde_json::from_str(&destring_numbers(line))?)
}

/// Render one element set as a compact JSON object, without line terminator.
pub fn marshal_json(e: &ElementSet) -> Result<String, ElementsError> {
    Ok(serde_json::to_string(e)?)
}
