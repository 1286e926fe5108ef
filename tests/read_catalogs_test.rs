mod common;

use common::{assert_same_elements, read_fixture, reference_catalog};

#[test]
fn test_fixed_column_catalog() {
    let sets = reference_catalog();
    assert_eq!(sets.len(), 3);

    let names: Vec<&str> = sets.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["ISS (ZARYA)", "NOAA 15", "STARLINK-1329"]);

    let noaa = &sets[1];
    assert_eq!(noaa.norad_cat_id.as_str(), "25338");
    assert_eq!(noaa.object_id, "1998-030A");
    assert_eq!(noaa.rev_at_epoch, 16704);
    assert_eq!(noaa.bstar, 3.2881e-5);
    assert!(gpelements::time::format_timestamp(&noaa.epoch)
        .starts_with("2020-09-18T12:49:04.791"));
}

#[test]
fn test_every_encoding_agrees_with_fixed_columns() {
    let reference = reference_catalog();
    for fixture in [
        "catalog.kvn",
        "catalog.csv",
        "catalog.json",
        "catalog.ndjson",
        "catalog.xml",
    ] {
        let sets = read_fixture(fixture);
        assert_eq!(sets.len(), 2, "{fixture}");
        assert_same_elements(&sets[0], &reference[1]);
        assert_same_elements(&sets[1], &reference[2]);
    }
}

#[test]
fn test_header_fields() {
    for fixture in ["catalog.kvn", "catalog.xml"] {
        let sets = read_fixture(fixture);
        assert_eq!(sets[0].originator, "18 SPCS", "{fixture}");
        assert_eq!(
            sets[0].creation_date.map(|d| gpelements::time::format_timestamp(&d)),
            Some("2020-12-13T10:06:18".to_string()),
            "{fixture}"
        );
    }

    // Fixed-column sets have no header.
    assert!(reference_catalog().iter().all(|e| e.creation_date.is_none()));
}

#[test]
fn test_launch_fields_from_designator() {
    let mut e = read_fixture("catalog.json").remove(1);
    e.use_international_designator().unwrap();
    let launch = e.launch.unwrap();
    assert_eq!(launch.launch_year, 2020);
    assert_eq!(launch.launch_number, 25);
    assert_eq!(launch.launch_piece, "A");
}
