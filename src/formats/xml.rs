//! # XML Orbit Mean-elements Messages
//!
//! The XML encoding mirrors the CCSDS OMM element tree:
//!
//! ```xml
//! <omm id="CCSDS_OMM_VERS" version="2.0">
//!   <header><CREATION_DATE>…</CREATION_DATE><ORIGINATOR>…</ORIGINATOR></header>
//!   <body><segment>
//!     <metadata><OBJECT_NAME>…</OBJECT_NAME><OBJECT_ID>…</OBJECT_ID>…</metadata>
//!     <data>
//!       <meanElements><EPOCH>…</EPOCH><MEAN_MOTION>…</MEAN_MOTION>…</meanElements>
//!       <tleParameters><EPHEMERIS_TYPE>…</EPHEMERIS_TYPE>…</tleParameters>
//!     </data>
//!   </segment></body>
//! </omm>
//! ```
//!
//! A single set is written as a bare `<omm>` element, a list of sets as an
//! `<ndm>` document holding one `<omm>` per set. The reader accepts both roots.
//!
//! The element tree is modelled with private serde structs deserialized by
//! `quick_xml::de`, then converted into [`ElementSet`].
use quick_xml::{events::Event, Reader};
use serde::{Deserialize, Serialize};

use crate::catalog_id::CatalogId;
use crate::constants::{KVN_MARKER, OMM_VERSION};
use crate::elements::{revolutions_from_f64, ElementSet};
use crate::gpelements_errors::ElementsError;
use crate::time::{format_timestamp, parse_timestamp};

#[derive(Debug, Serialize, Deserialize)]
struct Ndm {
    #[serde(rename = "omm", default)]
    omm: Vec<Omm>,
}

/// One `<omm>` element, as found in the document.
#[derive(Debug, Serialize, Deserialize)]
pub struct Omm {
    #[serde(rename = "@id", default)]
    id: String,
    #[serde(rename = "@version", default)]
    version: String,
    #[serde(default)]
    header: Header,
    body: Body,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Header {
    #[serde(rename = "CREATION_DATE", default, skip_serializing_if = "Option::is_none")]
    creation_date: Option<String>,
    #[serde(rename = "ORIGINATOR", default, skip_serializing_if = "Option::is_none")]
    originator: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Body {
    segment: Segment,
}

#[derive(Debug, Serialize, Deserialize)]
struct Segment {
    #[serde(default)]
    metadata: Metadata,
    data: Data,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Metadata {
    #[serde(rename = "OBJECT_NAME", default)]
    object_name: String,
    #[serde(rename = "OBJECT_ID", default)]
    object_id: String,
    #[serde(rename = "CENTER_NAME", default, skip_serializing_if = "Option::is_none")]
    center_name: Option<String>,
    #[serde(rename = "REF_FRAME", default, skip_serializing_if = "Option::is_none")]
    ref_frame: Option<String>,
    #[serde(rename = "TIME_SYSTEM", default, skip_serializing_if = "Option::is_none")]
    time_system: Option<String>,
    #[serde(rename = "MEAN_ELEMENT_THEORY", default, skip_serializing_if = "Option::is_none")]
    mean_element_theory: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Data {
    #[serde(rename = "meanElements")]
    mean_elements: MeanElements,
    #[serde(rename = "tleParameters")]
    tle_parameters: TleParameters,
}

#[derive(Debug, Serialize, Deserialize)]
struct MeanElements {
    #[serde(rename = "EPOCH")]
    epoch: String,
    #[serde(rename = "MEAN_MOTION")]
    mean_motion: f64,
    #[serde(rename = "ECCENTRICITY")]
    eccentricity: f64,
    #[serde(rename = "INCLINATION")]
    inclination: f64,
    #[serde(rename = "RA_OF_ASC_NODE")]
    ra_of_asc_node: f64,
    #[serde(rename = "ARG_OF_PERICENTER")]
    arg_of_pericenter: f64,
    #[serde(rename = "MEAN_ANOMALY")]
    mean_anomaly: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct TleParameters {
    #[serde(rename = "EPHEMERIS_TYPE", default)]
    ephemeris_type: u8,
    #[serde(rename = "CLASSIFICATION_TYPE", default)]
    classification_type: String,
    #[serde(rename = "NORAD_CAT_ID")]
    norad_cat_id: CatalogId,
    #[serde(rename = "ELEMENT_SET_NO", default)]
    element_set_no: u32,
    #[serde(rename = "REV_AT_EPOCH", default)]
    rev_at_epoch: f64,
    #[serde(rename = "BSTAR")]
    bstar: f64,
    #[serde(rename = "MEAN_MOTION_DOT")]
    mean_motion_dot: f64,
    #[serde(rename = "MEAN_MOTION_DDOT")]
    mean_motion_ddot: f64,
}

impl From<&ElementSet> for Omm {
    fn from(e: &ElementSet) -> Self {
        Omm {
            id: KVN_MARKER.to_string(),
            version: OMM_VERSION.to_string(),
            header: Header {
                creation_date: e.creation_date.as_ref().map(format_timestamp),
                originator: Some(e.originator.clone()).filter(|o| !o.is_empty()),
            },
            body: Body {
                segment: Segment {
                    metadata: Metadata {
                        object_name: e.name.clone(),
                        object_id: e.object_id.clone(),
                        center_name: Some("EARTH".into()),
                        ref_frame: Some("TEME".into()),
                        time_system: Some("UTC".into()),
                        mean_element_theory: Some("SGP/SGP4".into()),
                    },
                    data: Data {
                        mean_elements: MeanElements {
                            epoch: format_timestamp(&e.epoch),
                            mean_motion: e.mean_motion,
                            eccentricity: e.eccentricity,
                            inclination: e.inclination,
                            ra_of_asc_node: e.ra_of_asc_node,
                            arg_of_pericenter: e.arg_of_pericenter,
                            mean_anomaly: e.mean_anomaly,
                        },
                        tle_parameters: TleParameters {
                            ephemeris_type: e.ephemeris_type,
                            classification_type: e.classification_type.clone(),
                            norad_cat_id: e.norad_cat_id.clone(),
                            element_set_no: e.element_set_no,
                            rev_at_epoch: e.rev_at_epoch as f64,
                            bstar: e.bstar,
                            mean_motion_dot: e.mean_motion_dot,
                            mean_motion_ddot: e.mean_motion_ddot,
                        },
                    },
                },
            },
        }
    }
}

impl TryFrom<Omm> for ElementSet {
    type Error = ElementsError;

    fn try_from(omm: Omm) -> Result<Self, Self::Error> {
        let Segment { metadata, data } = omm.body.segment;
        let mean = data.mean_elements;
        let tle = data.tle_parameters;

        let epoch = parse_timestamp(&mean.epoch).map_err(|e| e.for_field("EPOCH"))?;
        let mut e = ElementSet::new(epoch);
        e.creation_date = omm
            .header
            .creation_date
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "null")
            .map(|s| parse_timestamp(s).map_err(|e| e.for_field("CREATION_DATE")))
            .transpose()?;
        e.originator = omm.header.originator.unwrap_or_default();
        e.name = metadata.object_name;
        e.object_id = metadata.object_id;

        e.mean_motion = mean.mean_motion;
        e.eccentricity = mean.eccentricity;
        e.inclination = mean.inclination;
        e.ra_of_asc_node = mean.ra_of_asc_node;
        e.arg_of_pericenter = mean.arg_of_pericenter;
        e.mean_anomaly = mean.mean_anomaly;

        e.ephemeris_type = tle.ephemeris_type;
        e.classification_type = tle.classification_type;
        e.norad_cat_id = tle.norad_cat_id;
        e.element_set_no = tle.element_set_no;
        e.rev_at_epoch = revolutions_from_f64(tle.rev_at_epoch)?;
        e.bstar = tle.bstar;
        e.mean_motion_dot = tle.mean_motion_dot;
        e.mean_motion_ddot = tle.mean_motion_ddot;
        Ok(e)
    }
}

/// Render one element set as a bare `<omm>` element, without line terminator.
pub fn marshal_xml(e: &ElementSet) -> Result<String, ElementsError> {
    Ok(quick_xml::se::to_string_with_root("omm", &Omm::from(e))?)
}

/// Render a list of element sets as one `<ndm>` document.
pub fn marshal_xml_document(sets: &[ElementSet]) -> Result<String, ElementsError> {
    let ndm = Ndm {
        omm: sets.iter().map(Omm::from).collect(),
    };
    Ok(quick_xml::se::to_string_with_root("ndm", &ndm)?)
}

/// Name of the first element of the document, past any declaration or comment.
fn root_name(src: &str) -> Result<String, ElementsError> {
    let mut reader = Reader::from_str(src);
    loop {
        match reader
            .read_event()
            .map_err(|e| ElementsError::Xml(e.to_string()))?
        {
            Event::Start(tag) | Event::Empty(tag) => {
                return Ok(String::from_utf8_lossy(tag.name().as_ref()).into_owned())
            }
            Event::Eof => return Err(ElementsError::Xml("document has no root element".into())),
            _ => {}
        }
    }
}

/// Split an XML document into its `<omm>` elements.
///
/// Arguments
/// -----------------
/// * `src`: an `<ndm>` document or a single `<omm>` element.
///
/// Return
/// ----------
/// * The raw messages, to be converted with `ElementSet::try_from` one by one.
/// * An `Xml` error when the document is not well formed or has another root.
pub fn parse_xml_document(src: &str) -> Result<Vec<Omm>, ElementsError> {
    match root_name(src)?.as_str() {
        "ndm" => Ok(quick_xml::de::from_str::<Ndm>(src)?.omm),
        "omm" => Ok(vec![quick_xml::de::from_str::<Omm>(src)?]),
        other => Err(ElementsError::Xml(format!(
            "unexpected root element <{other}>, expected <ndm> or <omm>"
        ))),
    }
}

/// Parse every element set of an XML document, failing on the first bad one.
pub fn parse_xml(src: &str) -> Result<Vec<ElementSet>, ElementsError> {
    parse_xml_document(src)?
        .into_iter()
        .map(ElementSet::try_from)
        .collect()
}

#[cfg(test)]
mod xml_test {
    use super::*;
    use crate::elements::elements_test::sample;
    use indoc::indoc;

    #[test]
    fn test_single_omm() {
        let xml = marshal_xml(&sample()).unwrap();
        assert!(xml.starts_with(r#"<omm id="CCSDS_OMM_VERS" version="2.0">"#));
        assert!(xml.contains("<OBJECT_NAME>STARLINK-1329</OBJECT_NAME>"));
        assert!(xml.contains("<NORAD_CAT_ID>45531</NORAD_CAT_ID>"));
        assert!(!xml.contains("CREATION_DATE"));
        assert_eq!(parse_xml(&xml).unwrap(), vec![sample()]);
    }

    #[test]
    fn test_ndm_document() {
        let mut second = sample();
        second.name = "STARLINK-1330".into();
        second.creation_date = Some(parse_timestamp("2020-12-13T10:00:00").unwrap());
        second.originator = "18 SPCS".into();
        let sets = vec![sample(), second];

        let xml = marshal_xml_document(&sets).unwrap();
        assert!(xml.starts_with("<ndm><omm "));
        assert_eq!(xml.matches("<omm ").count(), 2);
        assert_eq!(parse_xml(&xml).unwrap(), sets);
    }

    #[test]
    fn test_space_track_document() {
        let xml = indoc! {r#"
            <?xml version="1.0" encoding="UTF-8"?>
            <ndm xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
              <omm id="CCSDS_OMM_VERS" version="2.0">
                <header>
                  <CREATION_DATE>2020-09-19T04:06:18</CREATION_DATE>
                  <ORIGINATOR>18 SPCS</ORIGINATOR>
                </header>
                <body><segment>
                  <metadata>
                    <OBJECT_NAME>ISS (ZARYA)</OBJECT_NAME>
                    <OBJECT_ID>1998-067A</OBJECT_ID>
                    <CENTER_NAME>EARTH</CENTER_NAME>
                  </metadata>
                  <data>
                    <meanElements>
                      <EPOCH>2020-09-18T16:13:57.999936</EPOCH>
                      <MEAN_MOTION>15.48952759</MEAN_MOTION>
                      <ECCENTRICITY>.0000884</ECCENTRICITY>
                      <INCLINATION>51.6432</INCLINATION>
                      <RA_OF_ASC_NODE>245.8351</RA_OF_ASC_NODE>
                      <ARG_OF_PERICENTER>104.2674</ARG_OF_PERICENTER>
                      <MEAN_ANOMALY>236.9442</MEAN_ANOMALY>
                    </meanElements>
                    <tleParameters>
                      <EPHEMERIS_TYPE>0</EPHEMERIS_TYPE>
                      <CLASSIFICATION_TYPE>U</CLASSIFICATION_TYPE>
                      <NORAD_CAT_ID>25544</NORAD_CAT_ID>
                      <ELEMENT_SET_NO>999</ELEMENT_SET_NO>
                      <REV_AT_EPOCH>24650</REV_AT_EPOCH>
                      <BSTAR>.12514E-4</BSTAR>
                      <MEAN_MOTION_DOT>.00000241</MEAN_MOTION_DOT>
                      <MEAN_MOTION_DDOT>0</MEAN_MOTION_DDOT>
                    </tleParameters>
                  </data>
                </segment></body>
              </omm>
            </ndm>
        "#};
        let sets = parse_xml(xml).unwrap();
        assert_eq!(sets.len(), 1);
        let e = &sets[0];
        assert_eq!(e.name, "ISS (ZARYA)");
        assert_eq!(e.originator, "18 SPCS");
        assert!(e.creation_date.is_some());
        assert_eq!(e.eccentricity, 8.84e-5);
        assert_eq!(e.bstar, 1.2514e-5);
        assert_eq!(e.norad_cat_id.as_str(), "25544");
        assert_eq!(e.rev_at_epoch, 24650);
    }

    #[test]
    fn test_bad_documents() {
        assert!(matches!(
            parse_xml("<list><omm/></list>").unwrap_err(),
            ElementsError::Xml(_)
        ));
        assert!(parse_xml("").unwrap_err().is_format_error());
        assert!(parse_xml("<ndm><omm><body>").unwrap_err().is_format_error());
    }
}
