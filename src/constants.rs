//! # Constants and type definitions for gpelements
//!
//! This module centralizes the **fixed layouts**, **alphabets**, **markers** and
//! **type aliases** shared by the element-set codecs.
//!
//! ## Overview
//!
//! - Column tables of the two fixed-width data lines (1-based, inclusive bounds,
//!   exactly as printed in the legacy format description)
//! - The Alpha-5 large-radix alphabet and its lead character
//! - Detection markers and headers of the textual encodings
//! - Unit aliases used in the data model
//!
//! Every fixed-width field is described by a [`Column`] so that its width can be
//! tested on its own instead of being buried in slicing expressions.

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Mean motion in revolutions per day
pub type RevPerDay = f64;

// -------------------------------------------------------------------------------------------------
// Fixed-column layout
// -------------------------------------------------------------------------------------------------

/// One fixed-width field of a data line.
///
/// `start` and `end` are **1-based and inclusive**, so `Column { start: 3, end: 7 }`
/// covers the five characters `line[2..7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub start: usize,
    pub end: usize,
}

impl Column {
    pub const fn new(name: &'static str, start: usize, end: usize) -> Self {
        Column { name, start, end }
    }

    /// Number of characters covered by the field.
    pub const fn width(&self) -> usize {
        self.end - self.start + 1
    }

    /// Zero-based, half-open byte range of the field.
    pub const fn range(&self) -> std::ops::Range<usize> {
        (self.start - 1)..self.end
    }
}

/// Width of the name line written by the fixed-column encoder (right-padded).
pub const TLE_NAME_WIDTH: usize = 24;

/// Width of each data line, checksum included.
pub const TLE_LINE_WIDTH: usize = 69;

/// Columns of the first data line.
pub mod line1 {
    use super::Column;

    pub const LINE_NUMBER: Column = Column::new("LineNumber", 1, 1);
    pub const CATALOG_ID: Column = Column::new("NoradCatId", 3, 7);
    pub const CLASSIFICATION: Column = Column::new("ClassificationType", 8, 8);
    pub const LAUNCH_YEAR: Column = Column::new("LaunchYear", 10, 11);
    pub const LAUNCH_NUMBER: Column = Column::new("LaunchNum", 12, 14);
    pub const LAUNCH_PIECE: Column = Column::new("LaunchPiece", 15, 17);
    pub const EPOCH_YEAR: Column = Column::new("EpochYear", 19, 20);
    pub const EPOCH_DAY: Column = Column::new("EpochDay", 21, 32);
    pub const MEAN_MOTION_DOT: Column = Column::new("MeanMotionDot", 34, 43);
    pub const MEAN_MOTION_DDOT: Column = Column::new("MeanMotionDDot", 45, 52);
    pub const BSTAR: Column = Column::new("BStar", 54, 61);
    pub const EPHEMERIS_TYPE: Column = Column::new("EphemerisType", 63, 63);
    pub const ELEMENT_SET: Column = Column::new("ElementSet", 65, 68);
    pub const CHECKSUM: Column = Column::new("Checksum", 69, 69);
}

/// Columns of the second data line.
pub mod line2 {
    use super::Column;

    pub const LINE_NUMBER: Column = Column::new("LineNumber", 1, 1);
    pub const CATALOG_ID: Column = Column::new("NoradCatId", 3, 7);
    pub const INCLINATION: Column = Column::new("Inclination", 9, 16);
    pub const RA_OF_ASC_NODE: Column = Column::new("RightAscension", 18, 25);
    pub const ECCENTRICITY: Column = Column::new("Eccentricity", 27, 33);
    pub const ARG_OF_PERICENTER: Column = Column::new("ArgOfPericenter", 35, 42);
    pub const MEAN_ANOMALY: Column = Column::new("MeanAnomaly", 44, 51);
    pub const MEAN_MOTION: Column = Column::new("MeanMotion", 53, 63);
    pub const REV_AT_EPOCH: Column = Column::new("RevAtEpoch", 64, 68);
    pub const CHECKSUM: Column = Column::new("Checksum", 69, 69);
}

/// Two-digit years strictly below this pivot belong to the 2000s, the others to the 1900s.
pub const TWO_DIGIT_YEAR_PIVOT: i32 = 56;

/// Exclusive upper bound of the element set number.
pub const MAX_ELEMENT_SET_NO: u32 = 10_000;

/// Exclusive upper bound of the revolution counter.
pub const MAX_REV_AT_EPOCH: u32 = 100_000;

// -------------------------------------------------------------------------------------------------
// Catalog identifiers
// -------------------------------------------------------------------------------------------------

/// Symbols of the large-radix catalog encoding, least valuable first.
pub const NORAD_CAT_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// First character of every large-radix catalog token.
pub const NORAD_CAT_LEAD: char = 'z';

/// Padding symbol placed between the lead character and the significant symbols.
pub const NORAD_CAT_PAD: char = '0';

/// Total width of a catalog token in the fixed-column format.
pub const NORAD_CAT_WIDTH: usize = 5;

/// Catalog numbers below this bound are written in plain decimal.
pub const NORAD_CAT_DECIMAL_LIMIT: u64 = 100_000;

/// Letters usable as the leading character of reassigned Alpha-5 numbers (no `L`, `N`, `O`).
pub const ALPHA5_BLOCKS: &str = "ABCDEFGHIJKMPQRSTUVWXYZ";

/// Numbers available in one Alpha-5 block.
pub const ALPHA5_BLOCK_SIZE: i64 = 10_000;

// -------------------------------------------------------------------------------------------------
// Textual encodings
// -------------------------------------------------------------------------------------------------

/// First key of a KVN Orbit Mean-elements Message, also its detection marker.
pub const KVN_MARKER: &str = "CCSDS_OMM_VERS";

/// Version written in KVN messages and XML `omm` attributes.
pub const OMM_VERSION: &str = "2.0";

/// Column header of the CSV encoding.
pub const CSV_HEADER: &str = "OBJECT_NAME,OBJECT_ID,EPOCH,MEAN_MOTION,ECCENTRICITY,INCLINATION,RA_OF_ASC_NODE,ARG_OF_PERICENTER,MEAN_ANOMALY,EPHEMERIS_TYPE,CLASSIFICATION_TYPE,NORAD_CAT_ID,ELEMENT_SET_NO,REV_AT_EPOCH,BSTAR,MEAN_MOTION_DOT,MEAN_MOTION_DDOT";

/// Number of fields in a CSV record.
pub const CSV_FIELD_COUNT: usize = 17;

/// A CSV input line that contains this fragment is a header.
pub const CSV_HEADER_FRAGMENT: &str = ",EPOCH,";

/// More than this many commas in the first line marks CSV input.
pub const CSV_COMMA_THRESHOLD: usize = 4;

/// Default classification written for fresh element sets.
pub const DEFAULT_CLASSIFICATION: &str = "U";

#[cfg(test)]
mod constants_test {
    use super::*;

    #[test]
    fn test_line1_widths() {
        assert_eq!(line1::CATALOG_ID.width(), 5);
        assert_eq!(line1::CLASSIFICATION.width(), 1);
        assert_eq!(line1::LAUNCH_YEAR.width(), 2);
        assert_eq!(line1::LAUNCH_NUMBER.width(), 3);
        assert_eq!(line1::LAUNCH_PIECE.width(), 3);
        assert_eq!(line1::EPOCH_YEAR.width(), 2);
        assert_eq!(line1::EPOCH_DAY.width(), 12);
        assert_eq!(line1::MEAN_MOTION_DOT.width(), 10);
        assert_eq!(line1::MEAN_MOTION_DDOT.width(), 8);
        assert_eq!(line1::BSTAR.width(), 8);
        assert_eq!(line1::ELEMENT_SET.width(), 4);
        assert_eq!(line1::CHECKSUM.end, TLE_LINE_WIDTH);
    }

    #[test]
    fn test_line2_widths() {
        assert_eq!(line2::CATALOG_ID.width(), 5);
        assert_eq!(line2::INCLINATION.width(), 8);
        assert_eq!(line2::RA_OF_ASC_NODE.width(), 8);
        assert_eq!(line2::ECCENTRICITY.width(), 7);
        assert_eq!(line2::ARG_OF_PERICENTER.width(), 8);
        assert_eq!(line2::MEAN_ANOMALY.width(), 8);
        assert_eq!(line2::MEAN_MOTION.width(), 11);
        assert_eq!(line2::REV_AT_EPOCH.width(), 5);
        assert_eq!(line2::CHECKSUM.end, TLE_LINE_WIDTH);
    }

    #[test]
    fn test_column_range() {
        assert_eq!(line1::CATALOG_ID.range(), 2..7);
        assert_eq!(line2::MEAN_MOTION.range(), 52..63);
    }

    #[test]
    fn test_alphabet() {
        assert_eq!(NORAD_CAT_ALPHABET.len(), 62);
        assert_eq!(CSV_HEADER.split(',').count(), CSV_FIELD_COUNT);
        assert_eq!(ALPHA5_BLOCKS.len(), 23);
    }
}
