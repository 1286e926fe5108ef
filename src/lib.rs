//! # gpelements
//!
//! Orbital element sets ("general perturbations" elements) in the five textual
//! encodings found in catalogs: fixed-column two-line sets, CCSDS OMM in KVN and
//! XML, CSV and JSON. Any encoding can be read with
//! [`reader::for_each_element_set`], which detects the input shape, and any
//! [`ElementSet`] can be written back with [`ElementSet::marshal`].
//!
//! ```rust
//! use gpelements::{read_element_sets, DecodeOptions, Format};
//!
//! let input = "ISS (ZARYA)
//! 1 25544U 98067A   20262.67636574  .00000241  00000+0  12514-4 0  9990
//! 2 25544  51.6432 245.8351 0000884 104.2674 236.9442 15.48952759246507
//! ";
//! let sets = read_element_sets(input.as_bytes(), &DecodeOptions::default()).unwrap();
//! assert_eq!(sets[0].norad_cat_id.as_str(), "25544");
//!
//! let kvn = sets[0].marshal(Format::Kvn).unwrap();
//! assert!(kvn.contains("INCLINATION    = 51.6432\n"));
//! ```
pub mod catalog_id;
pub mod constants;
pub mod conversion;
pub mod elements;
pub mod formats;
pub mod gpelements_errors;
pub mod propagation;
pub mod reader;
pub mod time;

pub use catalog_id::CatalogId;
pub use elements::{ElementSet, Format, InternationalDesignator};
pub use gpelements_errors::ElementsError;
pub use propagation::{Ephemeris, Precision, Propagator};
pub use reader::{for_each_element_set, read_element_sets, DecodeOptions};
