use thiserror::Error;

/// Errors raised by the element-set codecs, the input dispatcher and the
/// propagation glue.
///
/// Variants
/// -----------------
/// * `Format` – A fixed-width column, a KVN line, a CSV record or a timestamp could not be decoded.
/// * `CatalogIdMismatch` – The two data lines of a fixed-column set disagree on the catalog id.
/// * `Range` – A value does not fit the representable range of its field.
/// * `OutOfCapacity` – The Alpha-5 reassignment blocks are exhausted.
/// * `Checksum` – A data line carries a checksum digit that does not match its content.
/// * `AtRecord` – Wraps any of the above with the zero-based index of the offending record.
///
/// See also
/// ------------
/// * [`ElementsError::is_format_error`], [`ElementsError::is_range_error`],
///   [`ElementsError::is_consistency_error`] – Classification helpers that see through `AtRecord`.
#[derive(Error, Debug)]
pub enum ElementsError {
    #[error("Invalid {field}: {reason}")]
    Format { field: String, reason: String },

    #[error("Catalog id disagreement between data lines: '{line1}' != '{line2}'")]
    CatalogIdMismatch { line1: String, line2: String },

    #[error("{field} out of range: {reason}")]
    Range { field: String, reason: String },

    #[error("Out of catalog number capacity: {0}")]
    OutOfCapacity(String),

    #[error("Checksum failed on line {line}: expected {expected}, computed {computed}")]
    Checksum {
        line: u8,
        expected: char,
        computed: char,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unable to read input: {0}")]
    Io(#[from] std::io::Error),

    #[error("Propagation failed: {0}")]
    Propagation(String),

    #[error("Invalid decode option: {0}")]
    InvalidOption(String),

    #[error("{source} on set {index}")]
    AtRecord {
        index: usize,
        #[source]
        source: Box<ElementsError>,
    },
}

impl ElementsError {
    pub(crate) fn format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ElementsError::Format {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ElementsError::Range {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn at_record(self, index: usize) -> Self {
        ElementsError::AtRecord {
            index,
            source: Box::new(self),
        }
    }

    /// Rename the field of a `Format` or `Range` error, leaving other variants untouched.
    pub(crate) fn for_field(self, name: &str) -> Self {
        match self {
            ElementsError::Format { reason, .. } => ElementsError::format(name, reason),
            ElementsError::Range { reason, .. } => ElementsError::range(name, reason),
            other => other,
        }
    }

    /// Strip any `AtRecord` wrappers.
    pub fn root(&self) -> &ElementsError {
        match self {
            ElementsError::AtRecord { source, .. } => source.root(),
            other => other,
        }
    }

    /// `true` for malformed input: bad columns, templates, records or checksums.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self.root(),
            ElementsError::Format { .. }
                | ElementsError::Checksum { .. }
                | ElementsError::Json(_)
                | ElementsError::Xml(_)
                | ElementsError::Csv(_)
        )
    }

    pub fn is_range_error(&self) -> bool {
        matches!(self.root(), ElementsError::Range { .. })
    }

    pub fn is_consistency_error(&self) -> bool {
        matches!(self.root(), ElementsError::CatalogIdMismatch { .. })
    }
}

impl From<quick_xml::de::DeError> for ElementsError {
    fn from(err: quick_xml::de::DeError) -> Self {
        ElementsError::Xml(err.to_string())
    }
}

impl From<quick_xml::se::SeError> for ElementsError {
    fn from(err: quick_xml::se::SeError) -> Self {
        ElementsError::Xml(err.to_string())
    }
}

impl PartialEq for ElementsError {
    fn eq(&self, other: &Self) -> bool {
        use ElementsError::*;
        match (self, other) {
            (Format { field: a, reason: b }, Format { field: c, reason: d }) => a == c && b == d,
            (
                CatalogIdMismatch { line1: a, line2: b },
                CatalogIdMismatch { line1: c, line2: d },
            ) => a == c && b == d,
            (Range { field: a, reason: b }, Range { field: c, reason: d }) => a == c && b == d,
            (OutOfCapacity(a), OutOfCapacity(b)) => a == b,
            (
                Checksum {
                    line: a,
                    expected: b,
                    computed: c,
                },
                Checksum {
                    line: d,
                    expected: e,
                    computed: f,
                },
            ) => a == d && b == e && c == f,
            (Xml(a), Xml(b)) => a == b,
            (Propagation(a), Propagation(b)) => a == b,
            (InvalidOption(a), InvalidOption(b)) => a == b,
            (
                AtRecord {
                    index: a,
                    source: b,
                },
                AtRecord {
                    index: c,
                    source: d,
                },
            ) => a == c && b == d,

            // not comparable: same variant is enough
            (Json(_), Json(_)) => true,
            (Csv(_), Csv(_)) => true,
            (Io(_), Io(_)) => true,

            _ => false,
        }
    }
}
