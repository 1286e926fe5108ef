//! # Input detection and record dispatch
//!
//! [`for_each_element_set`] reads element sets of any supported encoding from a
//! buffered reader and hands them one at a time to a callback. The encoding is
//! detected from the first non-blank line, in this fixed priority order:
//!
//! 1. `[` → one JSON array of records (read fully, quoted numbers de-quoted).
//! 2. `{` → newline-delimited JSON, one record per line.
//! 3. `<` → one XML document, `<ndm>` list or single `<omm>` (read fully).
//! 4. a line starting with `CCSDS_OMM_VERS` → concatenated KVN messages.
//! 5. more than four commas → CSV records, an optional `…,EPOCH,…` header skipped.
//! 6. anything else → fixed-column element sets in groups of three (or two) lines.
//!
//! The order is part of the contract: a KVN message whose first line holds
//! five commas is still KVN, and CSV is only tried when no KVN marker is seen.
//!
//! Line-oriented shapes are decoded while streaming; the array and XML shapes
//! need the whole input before any record boundary is known.
//!
//! Error policy
//! -----------------
//! * Decode errors are wrapped in [`ElementsError::AtRecord`] with the zero-based
//!   record index and stop the run, unless [`DecodeOptions::tolerate`] is set, in
//!   which case the record is logged with `tracing::warn!` and skipped.
//! * Errors returned by the callback stop the run immediately and are returned unchanged.
//! * I/O errors and malformed array or XML framing always stop the run.
use std::io::BufRead;

use tracing::{debug, warn};

use crate::constants::{CSV_COMMA_THRESHOLD, CSV_HEADER_FRAGMENT, KVN_MARKER};
use crate::elements::ElementSet;
use crate::formats::{csv, json, kvn, tle, xml};
use crate::gpelements_errors::ElementsError;

/// Configuration of [`for_each_element_set`].
///
/// Build it with [`DecodeOptions::builder`] or use [`Default`]:
/// fail-fast, no checksum verification, three-line fixed-column groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Log and skip records that fail to decode instead of stopping.
    pub tolerate: bool,
    /// Check the checksum digit of fixed-column data lines.
    pub verify_checksums: bool,
    /// Lines per fixed-column set: 3 with a name line, 2 without.
    pub tle_lines: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            tolerate: false,
            verify_checksums: false,
            tle_lines: 3,
        }
    }
}

impl DecodeOptions {
    pub fn builder() -> DecodeOptionsBuilder {
        DecodeOptionsBuilder::new()
    }
}

/// Builder for [`DecodeOptions`], with validation.
#[derive(Debug, Clone)]
pub struct DecodeOptionsBuilder {
    options: DecodeOptions,
}

impl Default for DecodeOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DecodeOptionsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            options: DecodeOptions::default(),
        }
    }

    pub fn tolerate(mut self, v: bool) -> Self {
        self.options.tolerate = v;
        self
    }
    pub fn verify_checksums(mut self, v: bool) -> Self {
        self.options.verify_checksums = v;
        self
    }
    pub fn tle_lines(mut self, v: usize) -> Self {
        self.options.tle_lines = v;
        self
    }

    /// Finalize the builder.
    ///
    /// Return
    /// ----------
    /// * `Err(ElementsError::InvalidOption)` when `tle_lines` is neither 2 nor 3.
    pub fn build(self) -> Result<DecodeOptions, ElementsError> {
        if !(2..=3).contains(&self.options.tle_lines) {
            return Err(ElementsError::InvalidOption(format!(
                "tle_lines must be 2 or 3, got {}",
                self.options.tle_lines
            )));
        }
        Ok(self.options)
    }
}

/// Encodings recognised by [`detect_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputShape {
    JsonArray,
    JsonLines,
    Xml,
    Kvn,
    Csv,
    Tle,
}

/// Classify an input from its first non-blank line.
pub fn detect_shape(first_line: &str) -> InputShape {
    let line = first_line.trim_start();
    match line.chars().next() {
        Some('[') => InputShape::JsonArray,
        Some('{') => InputShape::JsonLines,
        Some('<') => InputShape::Xml,
        _ if line.starts_with(KVN_MARKER) => InputShape::Kvn,
        _ if line.matches(',').count() > CSV_COMMA_THRESHOLD => InputShape::Csv,
        _ => InputShape::Tle,
    }
}

/// Counts records and applies the error policy.
struct Dispatch<'a, F> {
    options: &'a DecodeOptions,
    callback: F,
    index: usize,
    delivered: usize,
}

impl<F> Dispatch<'_, F> {
    fn offer<E>(&mut self, decoded: Result<ElementSet, ElementsError>) -> Result<(), E>
    where
        F: FnMut(ElementSet) -> Result<(), E>,
        E: From<ElementsError>,
    {
        let index = self.index;
        self.index += 1;
        match decoded {
            Ok(e) => {
                (self.callback)(e)?;
                self.delivered += 1;
                Ok(())
            }
            Err(err) if self.options.tolerate => {
                warn!(index, error = %err, "Skipping element set that failed to decode");
                Ok(())
            }
            Err(err) => Err(err.at_record(index).into()),
        }
    }
}

fn decode_tle(group: &[String], options: &DecodeOptions) -> Result<ElementSet, ElementsError> {
    let (l0, l1, l2) = match group {
        [l0, l1, l2] if options.tle_lines == 3 => (l0.as_str(), l1.as_str(), l2.as_str()),
        [l1, l2] if options.tle_lines == 2 => ("", l1.as_str(), l2.as_str()),
        _ => {
            return Err(ElementsError::format(
                "TLE",
                format!(
                    "incomplete set of {} line(s), expected {}",
                    group.len(),
                    options.tle_lines
                ),
            ))
        }
    };
    if options.verify_checksums {
        tle::parse_tle_checked(l0, l1, l2)
    } else {
        tle::parse_tle(l0, l1, l2)
    }
}

/// Decode every element set of `reader` and pass each to `f`.
///
/// Arguments
/// -----------------
/// * `reader`: the input, in any of the encodings listed in the [module documentation](self).
/// * `options`: error policy and fixed-column settings.
/// * `f`: called once per decoded set, in input order.
///
/// Return
/// ----------
/// * The number of sets handed to `f`; empty or blank input yields 0.
/// * The first decode error (wrapped with its record index), I/O error or
///   callback error, following the error policy above.
///
/// See also
/// ------------
/// * [`detect_shape`] – The detection step on its own.
pub fn for_each_element_set<R, F, E>(reader: R, options: &DecodeOptions, f: F) -> Result<usize, E>
where
    R: BufRead,
    F: FnMut(ElementSet) -> Result<(), E>,
    E: From<ElementsError>,
{
    let mut lines = reader.lines();
    let first = loop {
        match lines.next() {
            None => return Ok(0),
            Some(line) => {
                let line = line.map_err(ElementsError::from)?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
        }
    };

    let shape = detect_shape(&first);
    debug!(?shape, "Detected element set input");

    let mut dispatch = Dispatch {
        options,
        callback: f,
        index: 0,
        delivered: 0,
    };
    let lines = std::iter::once(Ok(first)).chain(lines);

    match shape {
        InputShape::JsonArray | InputShape::Xml => {
            let mut text = String::new();
            for line in lines {
                text.push_str(&line.map_err(ElementsError::from)?);
                text.push('\n');
            }
            if shape == InputShape::JsonArray {
                for value in json::parse_json_array(&text)? {
                    dispatch.offer(json::from_value(value))?;
                }
            } else {
                for omm in xml::parse_xml_document(&text)? {
                    dispatch.offer(ElementSet::try_from(omm))?;
                }
            }
        }
        InputShape::JsonLines => {
            for line in lines {
                let line = line.map_err(ElementsError::from)?;
                if !line.trim().is_empty() {
                    dispatch.offer(json::parse_json_line(&line))?;
                }
            }
        }
        InputShape::Kvn => {
            let mut message = String::new();
            for line in lines {
                let line = line.map_err(ElementsError::from)?;
                if line.trim_start().starts_with(KVN_MARKER) && !message.is_empty() {
                    dispatch.offer(kvn::parse_kvn(&message))?;
                    message.clear();
                }
                message.push_str(&line);
                message.push('\n');
            }
            if !message.is_empty() {
                dispatch.offer(kvn::parse_kvn(&message))?;
            }
        }
        InputShape::Csv => {
            let mut first_record = true;
            for line in lines {
                let line = line.map_err(ElementsError::from)?;
                if line.trim().is_empty() {
                    continue;
                }
                if first_record && line.contains(CSV_HEADER_FRAGMENT) {
                    first_record = false;
                    continue;
                }
                first_record = false;
                dispatch.offer(csv::parse_csv(&line))?;
            }
        }
        InputShape::Tle => {
            let mut group = Vec::with_capacity(options.tle_lines);
            for line in lines {
                let line = line.map_err(ElementsError::from)?;
                if line.trim().is_empty() {
                    continue;
                }
                group.push(line);
                if group.len() == options.tle_lines {
                    dispatch.offer(decode_tle(&group, options))?;
                    group.clear();
                }
            }
            if !group.is_empty() {
                dispatch.offer(decode_tle(&group, options))?;
            }
        }
    }

    Ok(dispatch.delivered)
}

/// Collect every element set of `reader`.
pub fn read_element_sets<R: BufRead>(
    reader: R,
    options: &DecodeOptions,
) -> Result<Vec<ElementSet>, ElementsError> {
    let mut sets = Vec::new();
    for_each_element_set(reader, options, |e| -> Result<(), ElementsError> {
        sets.push(e);
        Ok(())
    })?;
    Ok(sets)
}
