use std::fs::File;
use std::io::BufReader;

use approx::assert_relative_eq;
use camino::Utf8Path;
use gpelements::{read_element_sets, DecodeOptions, ElementSet};

/// Open a file of `tests/data` for buffered reading.
pub fn open_fixture(name: &str) -> BufReader<File> {
    let path = Utf8Path::new("tests/data").join(name);
    let file = File::open(&path).unwrap_or_else(|e| panic!("cannot open {path}: {e}"));
    BufReader::new(file)
}

/// Every set of a fixture, decoded with the default options.
pub fn read_fixture(name: &str) -> Vec<ElementSet> {
    read_element_sets(open_fixture(name), &DecodeOptions::default())
        .unwrap_or_else(|e| panic!("cannot decode {name}: {e}"))
}

/// The three reference sets of `catalog.tle`: ISS, NOAA 15 and STARLINK-1329.
pub fn reference_catalog() -> Vec<ElementSet> {
    read_fixture("catalog.tle")
}

/// Compare everything an element set carries except header and cached launch fields.
///
/// Epochs may differ by 0.1 ms (the fixed-column epoch is a day fraction),
/// floating point values by a relative 1e-9.
pub fn assert_same_elements(actual: &ElementSet, expected: &ElementSet) {
    assert_eq!(actual.name, expected.name);
    assert_eq!(actual.object_id, expected.object_id);
    assert_eq!(actual.norad_cat_id, expected.norad_cat_id);
    assert_eq!(actual.classification_type, expected.classification_type);
    assert_eq!(actual.ephemeris_type, expected.ephemeris_type);
    assert_eq!(actual.element_set_no, expected.element_set_no);
    assert_eq!(actual.rev_at_epoch, expected.rev_at_epoch);

    let drift = (actual.epoch - expected.epoch).abs().to_seconds();
    assert!(
        drift < 1e-4,
        "epoch of {} off by {drift} s",
        expected.name
    );

    assert_relative_eq!(actual.mean_motion, expected.mean_motion, max_relative = 1e-9);
    assert_relative_eq!(actual.eccentricity, expected.eccentricity, max_relative = 1e-9);
    assert_relative_eq!(actual.inclination, expected.inclination, max_relative = 1e-9);
    assert_relative_eq!(actual.ra_of_asc_node, expected.ra_of_asc_node, max_relative = 1e-9);
    assert_relative_eq!(
        actual.arg_of_pericenter,
        expected.arg_of_pericenter,
        max_relative = 1e-9
    );
    assert_relative_eq!(actual.mean_anomaly, expected.mean_anomaly, max_relative = 1e-9);
    assert_relative_eq!(actual.bstar, expected.bstar, max_relative = 1e-9);
    assert_relative_eq!(actual.mean_motion_dot, expected.mean_motion_dot, max_relative = 1e-9);
    assert_relative_eq!(
        actual.mean_motion_ddot,
        expected.mean_motion_ddot,
        max_relative = 1e-9
    );
}
