//! # Element sets
//!
//! [`ElementSet`] is the in-memory form of one orbital element set, the record
//! every codec of this crate produces and consumes. It is a plain value: cloning
//! yields an independent record.
//!
//! The serde derive uses the CCSDS OMM key names, so the JSON encoding is simply
//! `serde_json` over this type:
//!
//! ```json
//! {"OBJECT_NAME":"ISS (ZARYA)","OBJECT_ID":"1998-067A","EPOCH":"2020-09-18T16:14:55.599936",
//!  "MEAN_MOTION":15.48952759,"ECCENTRICITY":8.84e-05, ... ,"NORAD_CAT_ID":25544, ...}
//! ```
//!
//! The launch fields of the fixed-column format are kept as an
//! [`InternationalDesignator`] derived from `OBJECT_ID`. Codecs that read them
//! directly fill both; the others leave the designator to be derived lazily with
//! [`ElementSet::use_international_designator`].
//!
//! See also
//! ------------
//! * [`Format`] and [`ElementSet::marshal`] – Render a set in any of the five encodings.
//! * [`walk`] – Catalog reassignment, renaming and random walks of a set.
pub mod walk;

use std::fmt;
use std::str::FromStr;

use hifitime::Epoch;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

use crate::catalog_id::CatalogId;
use crate::constants::{Degree, RevPerDay, DEFAULT_CLASSIFICATION, MAX_REV_AT_EPOCH};
use crate::formats::{csv, json, kvn, tle, xml};
use crate::gpelements_errors::ElementsError;
use crate::time::{epoch_serde, opt_epoch_serde};

/// The launch year, launch number of the year and piece of an object, e.g. `1998-067A`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InternationalDesignator {
    pub launch_year: i32,
    pub launch_number: u32,
    pub launch_piece: String,
}

impl InternationalDesignator {
    /// Parse `YYYY-NNNP…`.
    ///
    /// `"null"` and inputs shorter than four characters yield the zero designator,
    /// inputs shorter than eight characters carry the year only. Non-numeric year
    /// or launch number digits are a `Format` error naming `OBJECT_ID`.
    pub fn parse(s: &str) -> Result<Self, ElementsError> {
        let s = s.trim();
        let mut designator = InternationalDesignator::default();
        if s == "null" || s.len() < 4 {
            return Ok(designator);
        }

        let invalid = |part: &str, reason: String| {
            ElementsError::format(
                "OBJECT_ID",
                format!("bad international designator {part} in '{s}': {reason}"),
            )
        };

        let year = s.get(0..4).ok_or_else(|| invalid("year", "not ASCII".into()))?;
        designator.launch_year = year.parse().map_err(|e| invalid("year", format!("{e}")))?;

        if s.len() < 8 {
            return Ok(designator);
        }

        let number = s.get(5..8).ok_or_else(|| invalid("number", "not ASCII".into()))?;
        designator.launch_number = number.parse().map_err(|e| invalid("number", format!("{e}")))?;
        designator.launch_piece = s.get(8..).unwrap_or_default().trim().to_string();

        Ok(designator)
    }
}

impl fmt::Display for InternationalDesignator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:03}{}",
            self.launch_year, self.launch_number, self.launch_piece
        )
    }
}

/// One orbital element set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSet {
    #[serde(
        rename = "CreationDate",
        default,
        skip_serializing_if = "Option::is_none",
        with = "opt_epoch_serde"
    )]
    pub creation_date: Option<Epoch>,

    #[serde(rename = "Originator", default, skip_serializing_if = "String::is_empty")]
    pub originator: String,

    #[serde(rename = "OBJECT_NAME", default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// International designator text, e.g. `"2020-025A"`.
    #[serde(rename = "OBJECT_ID", default, skip_serializing_if = "String::is_empty")]
    pub object_id: String,

    /// Launch fields derived from `object_id`, `None` until needed.
    #[serde(skip)]
    pub launch: Option<InternationalDesignator>,

    #[serde(rename = "EPOCH", with = "epoch_serde")]
    pub epoch: Epoch,

    #[serde(rename = "MEAN_MOTION")]
    pub mean_motion: RevPerDay,
    #[serde(rename = "ECCENTRICITY")]
    pub eccentricity: f64,
    #[serde(rename = "INCLINATION")]
    pub inclination: Degree,
    #[serde(rename = "RA_OF_ASC_NODE")]
    pub ra_of_asc_node: Degree,
    #[serde(rename = "ARG_OF_PERICENTER")]
    pub arg_of_pericenter: Degree,
    #[serde(rename = "MEAN_ANOMALY")]
    pub mean_anomaly: Degree,

    #[serde(rename = "EPHEMERIS_TYPE", default)]
    pub ephemeris_type: u8,
    #[serde(rename = "CLASSIFICATION_TYPE", default)]
    pub classification_type: String,
    #[serde(rename = "NORAD_CAT_ID")]
    pub norad_cat_id: CatalogId,
    #[serde(rename = "ELEMENT_SET_NO", default)]
    pub element_set_no: u32,
    #[serde(
        rename = "REV_AT_EPOCH",
        default,
        deserialize_with = "deserialize_revolutions"
    )]
    pub rev_at_epoch: u32,

    #[serde(rename = "BSTAR")]
    pub bstar: f64,
    #[serde(rename = "MEAN_MOTION_DOT")]
    pub mean_motion_dot: f64,
    #[serde(rename = "MEAN_MOTION_DDOT")]
    pub mean_motion_ddot: f64,
}

/// Convert a revolution counter read as a float into its integer form.
///
/// Producers disagree on whether `REV_AT_EPOCH` is an integer; the fractional
/// part, if any, is dropped.
pub(crate) fn revolutions_from_f64(x: f64) -> Result<u32, ElementsError> {
    if !x.is_finite() || x < 0.0 || x >= u32::MAX as f64 {
        return Err(ElementsError::range(
            "REV_AT_EPOCH",
            format!("{x} is not a revolution count"),
        ));
    }
    Ok(x as u32)
}

fn deserialize_revolutions<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let x = f64::deserialize(deserializer)?;
    revolutions_from_f64(x).map_err(D::Error::custom)
}

impl ElementSet {
    /// A blank element set at `epoch`: unclassified, all numbers zero.
    pub fn new(epoch: Epoch) -> Self {
        ElementSet {
            creation_date: None,
            originator: String::new(),
            name: String::new(),
            object_id: String::new(),
            launch: None,
            epoch,
            mean_motion: 0.0,
            eccentricity: 0.0,
            inclination: 0.0,
            ra_of_asc_node: 0.0,
            arg_of_pericenter: 0.0,
            mean_anomaly: 0.0,
            ephemeris_type: 0,
            classification_type: DEFAULT_CLASSIFICATION.to_string(),
            norad_cat_id: CatalogId::default(),
            element_set_no: 0,
            rev_at_epoch: 0,
            bstar: 0.0,
            mean_motion_dot: 0.0,
            mean_motion_ddot: 0.0,
        }
    }

    /// Launch fields of this set, from the cache or parsed from `object_id`.
    ///
    /// Returns `None` when the set has no designator at all.
    pub fn international_designator(
        &self,
    ) -> Result<Option<InternationalDesignator>, ElementsError> {
        if let Some(designator) = &self.launch {
            return Ok(Some(designator.clone()));
        }
        if self.object_id.trim().is_empty() {
            return Ok(None);
        }
        InternationalDesignator::parse(&self.object_id).map(Some)
    }

    /// Fill `launch` from `object_id` if it is not set yet.
    pub fn use_international_designator(&mut self) -> Result<(), ElementsError> {
        if self.launch.is_none() {
            self.launch = self.international_designator()?;
        }
        Ok(())
    }

    /// Check the value-range invariants shared by every encoding.
    pub fn validate(&self) -> Result<(), ElementsError> {
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(ElementsError::range(
                "Eccentricity",
                format!("{} is not in [0, 1)", self.eccentricity),
            ));
        }
        if self.rev_at_epoch >= MAX_REV_AT_EPOCH {
            return Err(ElementsError::range(
                "RevAtEpoch",
                format!("{} is too many revolutions", self.rev_at_epoch),
            ));
        }
        Ok(())
    }

    /// Render this set in the requested encoding.
    ///
    /// JSON, XML and fixed-column renderings end with a newline, the KVN
    /// template ends with its last line's newline and CSV has none.
    pub fn marshal(&self, format: Format) -> Result<String, ElementsError> {
        match format {
            Format::Csv => Ok(csv::marshal_csv(self)),
            Format::Json => Ok(json::marshal_json(self)? + "\n"),
            Format::Xml => Ok(xml::marshal_xml(self)? + "\n"),
            Format::Kvn => Ok(kvn::marshal_kvn(self)),
            Format::Tle => {
                let (line0, line1, line2) = tle::marshal_tle(self)?;
                Ok(format!("{line0}\n{line1}\n{line2}\n"))
            }
        }
    }
}

/// The five textual encodings of an element set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Csv,
    Json,
    Xml,
    Kvn,
    Tle,
}

impl FromStr for Format {
    type Err = ElementsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "xml" => Ok(Format::Xml),
            "kvn" => Ok(Format::Kvn),
            "tle" => Ok(Format::Tle),
            other => Err(ElementsError::InvalidOption(format!(
                "unknown marshal representation '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Csv => "csv",
            Format::Json => "json",
            Format::Xml => "xml",
            Format::Kvn => "kvn",
            Format::Tle => "tle",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
pub(crate) mod elements_test {
    use super::*;
    use hifitime::TimeScale;

    pub(crate) fn sample() -> ElementSet {
        let mut e = ElementSet::new(Epoch::from_gregorian(
            2020,
            12,
            13,
            3,
            44,
            10,
            927_392_000,
            TimeScale::UTC,
        ));
        e.name = "STARLINK-1329".into();
        e.object_id = "2020-025A".into();
        e.mean_motion = 15.05587631;
        e.eccentricity = 0.000133;
        e.inclination = 53.0021;
        e.ra_of_asc_node = 52.3173;
        e.arg_of_pericenter = 82.0365;
        e.mean_anomaly = 278.0774;
        e.norad_cat_id = CatalogId::new("45531");
        e.element_set_no = 999;
        e.rev_at_epoch = 3623;
        e.bstar = 6.5515e-5;
        e.mean_motion_dot = 6.76e-6;
        e
    }

    #[test]
    fn test_international_designator() {
        let d = InternationalDesignator::parse("1998-067A").unwrap();
        assert_eq!(d.launch_year, 1998);
        assert_eq!(d.launch_number, 67);
        assert_eq!(d.launch_piece, "A");
        assert_eq!(d.to_string(), "1998-067A");

        assert_eq!(
            InternationalDesignator::parse("null").unwrap(),
            InternationalDesignator::default()
        );
        assert_eq!(InternationalDesignator::parse("1998").unwrap().launch_year, 1998);
        assert_eq!(InternationalDesignator::default().to_string(), "0000-000");

        let err = InternationalDesignator::parse("19x8-067A").unwrap_err();
        assert!(err.is_format_error());
        assert!(InternationalDesignator::parse("1998-0x7A").is_err());
    }

    #[test]
    fn test_use_international_designator() {
        let mut e = sample();
        assert!(e.launch.is_none());
        e.use_international_designator().unwrap();
        let launch = e.launch.clone().unwrap();
        assert_eq!(launch.launch_year, 2020);
        assert_eq!(launch.launch_number, 25);
        assert_eq!(launch.launch_piece, "A");

        let mut blank = ElementSet::new(e.epoch);
        blank.use_international_designator().unwrap();
        assert!(blank.launch.is_none());
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with(r#"{"OBJECT_NAME":"STARLINK-1329","OBJECT_ID":"2020-025A","EPOCH":"2020-12-13T03:44:10.927392","#));
        assert!(json.contains(r#""NORAD_CAT_ID":45531,"#));
        assert!(json.contains(r#""CLASSIFICATION_TYPE":"U","#));
        assert!(!json.contains("CreationDate"));
        assert!(!json.contains("Originator"));

        let back: ElementSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_json_lenient_revolutions() {
        let mut value = serde_json::to_value(sample()).unwrap();
        value["REV_AT_EPOCH"] = serde_json::json!(3623.0);
        let e: ElementSet = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(e.rev_at_epoch, 3623);

        value["REV_AT_EPOCH"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<ElementSet>(value).is_err());
    }

    #[test]
    fn test_validate() {
        let mut e = sample();
        assert!(e.validate().is_ok());
        e.eccentricity = 1.0;
        assert!(e.validate().unwrap_err().is_range_error());
        e.eccentricity = 0.5;
        e.rev_at_epoch = 100_000;
        assert!(e.validate().unwrap_err().is_range_error());
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Csv);
        assert_eq!("TLE".parse::<Format>().unwrap(), Format::Tle);
        assert_eq!(Format::Kvn.to_string(), "kvn");
        assert!(matches!(
            "yaml".parse::<Format>(),
            Err(ElementsError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_marshal_line_endings() {
        let e = sample();
        assert!(e.marshal(Format::Json).unwrap().ends_with("}\n"));
        assert!(e.marshal(Format::Xml).unwrap().ends_with("</omm>\n"));
        assert_eq!(e.marshal(Format::Tle).unwrap().lines().count(), 3);
        assert!(!e.marshal(Format::Csv).unwrap().contains('\n'));
        assert!(e
            .marshal(Format::Kvn)
            .unwrap()
            .starts_with("CCSDS_OMM_VERS = 2.0\n"));
    }
}
