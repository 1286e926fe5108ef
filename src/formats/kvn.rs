//! # KVN Orbit Mean-elements Message
//!
//! Reader and writer for the CCSDS **key-value notation** OMM subset that carries
//! one element set:
//!
//! ```text
//! CCSDS_OMM_VERS = 2.0
//! CREATION_DATE  =
//! ORIGINATOR     =
//!
//! OBJECT_NAME    = ISS (ZARYA)
//! OBJECT_ID      = 1998-067A
//! ...
//! MEAN_MOTION_DDOT = 0e+00
//! ```
//!
//! The writer emits a fixed template with `%g`-style mean elements and
//! scientific perturbation terms, each with the shortest digits that read back
//! exactly, so a message parses to the set it was written from. The reader
//! tokenises each `KEY = value` line with `nom` and then reads the template keys
//! in order:
//!
//! - blank lines and `COMMENT` lines are ignored;
//! - a blank value means *absent*, which is only accepted for `CREATION_DATE`,
//!   `ORIGINATOR`, `OBJECT_NAME` and `OBJECT_ID`;
//! - the constant keys (`CENTER_NAME`, `REF_FRAME`, `TIME_SYSTEM`,
//!   `MEAN_ELEMENT_THEORY`) are checked when present;
//! - every failure is a `Format` error naming the offending key.
use std::collections::HashMap;

use nom::{
    bytes::complete::take_while1,
    character::complete::{char, space0},
    combinator::rest,
    sequence::delimited,
    IResult, Parser,
};

use crate::catalog_id::CatalogId;
use crate::constants::{KVN_MARKER, OMM_VERSION};
use crate::conversion::{format_exp, format_general};
use crate::elements::{revolutions_from_f64, ElementSet, InternationalDesignator};
use crate::gpelements_errors::ElementsError;
use crate::time::{format_timestamp, parse_timestamp};

/// Keys whose value is fixed by the message subset.
const CONSTANT_KEYS: [(&str, &str); 4] = [
    ("CENTER_NAME", "EARTH"),
    ("REF_FRAME", "TEME"),
    ("TIME_SYSTEM", "UTC"),
    ("MEAN_ELEMENT_THEORY", "SGP/SGP4"),
];

/// Render one element set as a KVN message.
pub fn marshal_kvn(e: &ElementSet) -> String {
    let creation_date = e.creation_date.as_ref().map(format_timestamp).unwrap_or_default();
    format!(
        "{KVN_MARKER} = {OMM_VERSION}
CREATION_DATE  = {creation_date}
ORIGINATOR     = {originator}

OBJECT_NAME    = {name}
OBJECT_ID      = {object_id}
CENTER_NAME    = EARTH
REF_FRAME      = TEME
TIME_SYSTEM    = UTC
MEAN_ELEMENT_THEORY = SGP/SGP4

EPOCH          = {epoch}
MEAN_MOTION    = {mean_motion}
ECCENTRICITY   = {eccentricity}
INCLINATION    = {inclination}
RA_OF_ASC_NODE = {ra_of_asc_node}
ARG_OF_PERICENTER = {arg_of_pericenter}
MEAN_ANOMALY   = {mean_anomaly}

EPHEMERIS_TYPE = {ephemeris_type}
CLASSIFICATION_TYPE = {classification_type}
NORAD_CAT_ID   = {norad_cat_id}
ELEMENT_SET_NO = {element_set_no}
REV_AT_EPOCH   = {rev_at_epoch}
BSTAR          = {bstar}
MEAN_MOTION_DOT = {mean_motion_dot}
MEAN_MOTION_DDOT = {mean_motion_ddot}
",
        originator = e.originator,
        name = e.name,
        object_id = e.object_id,
        epoch = format_timestamp(&e.epoch),
        mean_motion = format_general(e.mean_motion),
        eccentricity = format_general(e.eccentricity),
        inclination = format_general(e.inclination),
        ra_of_asc_node = format_general(e.ra_of_asc_node),
        arg_of_pericenter = format_general(e.arg_of_pericenter),
        mean_anomaly = format_general(e.mean_anomaly),
        ephemeris_type = e.ephemeris_type,
        classification_type = e.classification_type,
        norad_cat_id = e.norad_cat_id,
        element_set_no = e.element_set_no,
        rev_at_epoch = e.rev_at_epoch,
        bstar = format_exp(e.bstar),
        mean_motion_dot = format_exp(e.mean_motion_dot),
        mean_motion_ddot = format_exp(e.mean_motion_ddot),
    )
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// `KEY = value`, the value running to the end of the line.
fn key_value(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, (key, _, value)) = (
        take_while1(is_key_char),
        delimited(space0, char('='), space0),
        rest,
    )
        .parse(input)?;
    Ok((input, (key, value.trim())))
}

/// The `KEY = value` pairs of one message, keys unique.
struct Fields<'a> {
    values: HashMap<&'a str, &'a str>,
}

impl<'a> Fields<'a> {
    fn tokenize(text: &'a str) -> Result<Self, ElementsError> {
        let mut values = HashMap::new();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with("COMMENT") {
                continue;
            }
            let (_, (key, value)) = key_value(line).map_err(|_| {
                ElementsError::format("KVN", format!("'{line}' is not a KEY = value line"))
            })?;
            if values.insert(key, value).is_some() {
                return Err(ElementsError::format(key, "appears twice in one message"));
            }
        }
        Ok(Fields { values })
    }

    /// Value of an optional key; missing keys and blank values are `None`.
    fn optional(&self, key: &str) -> Option<&'a str> {
        self.values.get(key).copied().filter(|v| !v.is_empty())
    }

    fn required(&self, key: &str) -> Result<&'a str, ElementsError> {
        match self.values.get(key) {
            None => Err(ElementsError::format(key, "missing")),
            Some(v) if v.is_empty() => Err(ElementsError::format(key, "blank value")),
            Some(v) => Ok(v),
        }
    }

    fn parsed<T: std::str::FromStr>(&self, key: &str) -> Result<T, ElementsError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.required(key)?;
        raw.parse()
            .map_err(|e| ElementsError::format(key, format!("'{raw}': {e}")))
    }
}

/// Parse one KVN message.
///
/// Arguments
/// -----------------
/// * `text`: one complete message, starting with its `CCSDS_OMM_VERS` line.
///
/// Return
/// ----------
/// * The decoded [`ElementSet`] with its `launch` fields derived from `OBJECT_ID`.
/// * A `Format` error naming the first key that is missing, blank when it must
///   not be, or malformed.
pub fn parse_kvn(text: &str) -> Result<ElementSet, ElementsError> {
    let fields = Fields::tokenize(text)?;

    fields.required(KVN_MARKER)?;
    for (key, expected) in CONSTANT_KEYS {
        if let Some(found) = fields.optional(key) {
            if found != expected {
                return Err(ElementsError::format(
                    key,
                    format!("expected '{expected}', found '{found}'"),
                ));
            }
        }
    }

    let creation_date = fields
        .optional("CREATION_DATE")
        .filter(|v| *v != "null")
        .map(|v| parse_timestamp(v).map_err(|e| e.for_field("CREATION_DATE")))
        .transpose()?;
    let epoch = parse_timestamp(fields.required("EPOCH")?).map_err(|e| e.for_field("EPOCH"))?;

    let mut e = ElementSet::new(epoch);
    e.creation_date = creation_date;
    e.originator = fields.optional("ORIGINATOR").unwrap_or_default().to_string();
    e.name = fields.optional("OBJECT_NAME").unwrap_or_default().to_string();
    e.object_id = fields.optional("OBJECT_ID").unwrap_or_default().to_string();
    if !e.object_id.is_empty() {
        e.launch = Some(InternationalDesignator::parse(&e.object_id)?);
    }

    e.mean_motion = fields.parsed("MEAN_MOTION")?;
    e.eccentricity = fields.parsed("ECCENTRICITY")?;
    e.inclination = fields.parsed("INCLINATION")?;
    e.ra_of_asc_node = fields.parsed("RA_OF_ASC_NODE")?;
    e.arg_of_pericenter = fields.parsed("ARG_OF_PERICENTER")?;
    e.mean_anomaly = fields.parsed("MEAN_ANOMALY")?;

    e.ephemeris_type = fields.parsed("EPHEMERIS_TYPE")?;
    e.classification_type = fields.required("CLASSIFICATION_TYPE")?.to_string();
    e.norad_cat_id = CatalogId::new(fields.required("NORAD_CAT_ID")?);
    e.element_set_no = fields.parsed("ELEMENT_SET_NO")?;
    e.rev_at_epoch = revolutions_from_f64(fields.parsed("REV_AT_EPOCH")?)?;
    e.bstar = fields.parsed("BSTAR")?;
    e.mean_motion_dot = fields.parsed("MEAN_MOTION_DOT")?;
    e.mean_motion_ddot = fields.parsed("MEAN_MOTION_DDOT")?;

    Ok(e)
}

#[cfg(test)]
mod kvn_test {
    use super::*;
    use indoc::indoc;

    const ISS_KVN: &str = indoc! {"
        CCSDS_OMM_VERS = 2.0
        CREATION_DATE  =
        ORIGINATOR     =

        OBJECT_NAME    = ISS (ZARYA)
        OBJECT_ID      = 1998-067A
        CENTER_NAME    = EARTH
        REF_FRAME      = TEME
        TIME_SYSTEM    = UTC
        MEAN_ELEMENT_THEORY = SGP/SGP4

        EPOCH          = 2020-09-18T16:13:57.999936
        MEAN_MOTION    = 15.48952759
        ECCENTRICITY   = 8.84e-05
        INCLINATION    = 51.6432
        RA_OF_ASC_NODE = 245.8351
        ARG_OF_PERICENTER = 104.2674
        MEAN_ANOMALY   = 236.9442

        EPHEMERIS_TYPE = 0
        CLASSIFICATION_TYPE = U
        NORAD_CAT_ID   = 25544
        ELEMENT_SET_NO = 999
        REV_AT_EPOCH   = 24650
        BSTAR          = 1.2514e-05
        MEAN_MOTION_DOT = 2.41e-06
        MEAN_MOTION_DDOT = 0e+00
    "};

    #[test]
    fn test_parse_kvn() {
        let e = parse_kvn(ISS_KVN).unwrap();
        assert_eq!(e.name, "ISS (ZARYA)");
        assert_eq!(e.object_id, "1998-067A");
        assert_eq!(e.launch.as_ref().unwrap().launch_number, 67);
        assert_eq!(e.creation_date, None);
        assert_eq!(e.originator, "");
        assert_eq!(e.mean_motion, 15.48952759);
        assert_eq!(e.eccentricity, 8.84e-05);
        assert_eq!(e.norad_cat_id.as_str(), "25544");
        assert_eq!(e.rev_at_epoch, 24650);
        assert_eq!(e.bstar, 1.2514e-05);
        assert_eq!(format_timestamp(&e.epoch), "2020-09-18T16:13:57.999936");
    }

    #[test]
    fn test_marshal_is_the_template() {
        let e = parse_kvn(ISS_KVN).unwrap();
        let text = marshal_kvn(&e);
        assert!(text.contains("CREATION_DATE  = \nORIGINATOR     = \n"));
        assert!(text.ends_with("MEAN_MOTION_DDOT = 0e+00\n"));
        assert!(text.lines().map(str::trim_end).eq(ISS_KVN.lines()));
    }

    #[test]
    fn test_round_trip_with_provenance() {
        let mut e = parse_kvn(ISS_KVN).unwrap();
        e.creation_date = Some(parse_timestamp("2021-01-02T03:04:05.5").unwrap());
        e.originator = "18 SPCS".into();
        let text = marshal_kvn(&e);
        assert!(text.contains("CREATION_DATE  = 2021-01-02T03:04:05.5\n"));
        assert!(text.contains("ORIGINATOR     = 18 SPCS\n"));
        assert_eq!(parse_kvn(&text).unwrap(), e);
    }

    #[test]
    fn test_comments_and_blank_lines_are_ignored() {
        let text = ISS_KVN.replace(
            "OBJECT_NAME",
            "COMMENT GENERATED VIA SPACE-TRACK.ORG API\n\n\nOBJECT_NAME",
        );
        assert_eq!(parse_kvn(&text).unwrap(), parse_kvn(ISS_KVN).unwrap());
    }

    #[test]
    fn test_errors_name_the_key() {
        let text = ISS_KVN.replace("INCLINATION    = 51.6432", "INCLINATION    = fifty");
        assert_eq!(
            parse_kvn(&text).unwrap_err(),
            ElementsError::format("INCLINATION", "'fifty': invalid float literal")
        );

        let text = ISS_KVN.replace("BSTAR          = 1.2514e-05\n", "");
        assert_eq!(
            parse_kvn(&text).unwrap_err(),
            ElementsError::format("BSTAR", "missing")
        );

        let text = ISS_KVN.replace("EPOCH          = 2020-09-18T16:13:57.999936", "EPOCH          =");
        assert_eq!(
            parse_kvn(&text).unwrap_err(),
            ElementsError::format("EPOCH", "blank value")
        );

        let text = ISS_KVN.replace("REF_FRAME      = TEME", "REF_FRAME      = GCRF");
        assert!(matches!(
            parse_kvn(&text).unwrap_err(),
            ElementsError::Format { field, .. } if field == "REF_FRAME"
        ));

        let text = ISS_KVN.replace("CLASSIFICATION_TYPE = U", "CLASSIFICATION_TYPE U");
        assert!(parse_kvn(&text).unwrap_err().is_format_error());
    }

    #[test]
    fn test_round_trip_of_arbitrary_values() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(2024_u64);
        let mut e = parse_kvn(ISS_KVN).unwrap();
        e.bstar = 1.23456789e-5;
        e.mean_motion_dot = 2.4123456e-6;
        e.mean_motion_ddot = -1.0 / 3.0 * 1e-12;
        for _ in 0..200 {
            let text = marshal_kvn(&e);
            let back = parse_kvn(&text).unwrap();
            assert_eq!(
                serde_json::to_value(&back).unwrap(),
                serde_json::to_value(&e).unwrap(),
                "{text}"
            );

            e.mean_motion = rng.random_range(0.5..17.0);
            e.eccentricity = rng.random::<f64>();
            e.inclination = rng.random_range(0.0..180.0);
            e.ra_of_asc_node = rng.random_range(0.0..360.0);
            e.arg_of_pericenter = rng.random_range(0.0..360.0);
            e.mean_anomaly = rng.random_range(0.0..360.0);
            e.bstar = rng.random_range(-1e-3..1e-3);
            e.mean_motion_dot = rng.random_range(-1e-4..1e-4);
            e.mean_motion_ddot = rng.random_range(-1e-9..1e-9);
        }
    }

    #[test]
    fn test_null_creation_date() {
        let text = ISS_KVN.replace("CREATION_DATE  =\n", "CREATION_DATE  = null\n");
        assert_eq!(parse_kvn(&text).unwrap().creation_date, None);
    }
}
