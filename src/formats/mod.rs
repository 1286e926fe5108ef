//! # Element-set encodings
//!
//! One sub-module per textual encoding. Each exposes a `parse_*` function
//! producing an [`ElementSet`](crate::ElementSet) and a `marshal_*` function
//! rendering one:
//!
//! | Module   | Encoding                                          |
//! |----------|---------------------------------------------------|
//! | [`tle`]  | Fixed-column two-line element sets with checksums |
//! | [`kvn`]  | CCSDS OMM key-value notation                      |
//! | [`csv`]  | One comma-separated record per set                |
//! | [`json`] | OMM-keyed JSON objects, arrays or lines           |
//! | [`xml`]  | CCSDS OMM XML, bare `<omm>` or `<ndm>` documents  |
//!
//! Picking the right one for an unknown input is the job of [`crate::reader`].
pub mod csv;
pub mod json;
pub mod kvn;
pub mod tle;
pub mod xml;
