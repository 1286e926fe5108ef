//! # Catalog identifiers
//!
//! A [`CatalogId`] is the textual identifier of a cataloged object. It is almost
//! always a small decimal number, but numbers beyond five decimal digits cannot
//! fit the five catalog columns of the fixed-column format. Those are written as
//! a lead character followed by a base-62 numeral:
//!
//! ```text
//!   100000  →  "z0Aa4"     lead 'z', pad '0', then "Aa4" most significant first
//! ```
//!
//! The alphabet is `a-z`, `A-Z`, `0-9` (so `'a'` is 0 and `'9'` is 61). Because
//! the pad symbol `'0'` is also a digit of that alphabet, numbers whose leading
//! base-62 symbol would be `'0'` stay in decimal; [`CatalogId::encode`] is a
//! non-fatal fallback and never wraps.
//!
//! ## JSON representation
//!
//! A catalog id is written as a **bare JSON number** when it
//! [looks numeric](CatalogId::looks_numeric) and as a **string** otherwise.
//! Downstream tools consume `NORAD_CAT_ID` as a number whenever they can.
use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::constants::{
    NORAD_CAT_ALPHABET, NORAD_CAT_DECIMAL_LIMIT, NORAD_CAT_LEAD, NORAD_CAT_PAD, NORAD_CAT_WIDTH,
};
use crate::gpelements_errors::ElementsError;

const RADIX: u64 = 62;

/// Number of base-62 symbols after the lead character.
const ALPHA_SYMBOLS: usize = NORAD_CAT_WIDTH - 1;

/// A catalog identifier, kept as trimmed text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct CatalogId(String);

impl CatalogId {
    pub fn new(s: impl AsRef<str>) -> Self {
        CatalogId(s.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the id is a run of decimal digits without a leading zero.
    ///
    /// Only such ids are written as bare JSON numbers; `"0"`, `"00005"` and
    /// `"z0Aa4"` are written as strings.
    pub fn looks_numeric(&self) -> bool {
        self.numeric_value().is_some()
    }

    fn numeric_value(&self) -> Option<u64> {
        let s = self.0.as_str();
        if s.is_empty() || s.starts_with('0') || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        s.parse().ok()
    }

    /// Encoded form for the five catalog columns.
    ///
    /// Decimal ids below 100000 are returned unchanged, larger ones are
    /// converted with [`number_to_alpha`]. Anything that is not a decimal
    /// number is returned unchanged.
    pub fn encode(&self) -> CatalogId {
        match self.0.parse::<u64>() {
            Ok(n) if self.0.bytes().all(|b| b.is_ascii_digit()) => CatalogId(number_to_alpha(n)),
            _ => self.clone(),
        }
    }

    /// Decimal form of an encoded id; ids without the lead character pass through.
    pub fn decode(&self) -> CatalogId {
        match alpha_to_number(&self.0) {
            Ok(n) => CatalogId(n.to_string()),
            Err(_) => self.clone(),
        }
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<u64> for CatalogId {
    fn from(n: u64) -> Self {
        CatalogId(n.to_string())
    }
}

impl From<&str> for CatalogId {
    fn from(s: &str) -> Self {
        CatalogId::new(s)
    }
}

/// Encode a catalog number.
///
/// Arguments
/// -----------------
/// * `n`: the catalog number.
///
/// Return
/// ----------
/// * The plain decimal text when `n < 100000`.
/// * Otherwise `'z'` followed by the base-62 numeral of `n`, left-padded with
///   `'0'` to four symbols.
/// * The plain decimal text again when `n` needs more than four symbols or when
///   its leading symbol is the pad symbol.
pub fn number_to_alpha(n: u64) -> String {
    if n < NORAD_CAT_DECIMAL_LIMIT {
        return n.to_string();
    }

    let alphabet = NORAD_CAT_ALPHABET.as_bytes();
    let mut symbols = Vec::with_capacity(ALPHA_SYMBOLS);
    let mut rest = n;
    while rest > 0 {
        symbols.push(alphabet[(rest % RADIX) as usize] as char);
        rest /= RADIX;
    }
    symbols.reverse();

    if symbols.len() > ALPHA_SYMBOLS || symbols.first() == Some(&NORAD_CAT_PAD) {
        return n.to_string();
    }

    let mut token = String::with_capacity(NORAD_CAT_WIDTH);
    token.push(NORAD_CAT_LEAD);
    token.extend(std::iter::repeat(NORAD_CAT_PAD).take(ALPHA_SYMBOLS - symbols.len()));
    token.extend(symbols);
    token
}

/// Decode a token produced by [`number_to_alpha`] with the lead character.
///
/// Leading pad symbols are ignored and the remaining symbols are read most
/// significant first. Tokens without the lead character, or with a symbol
/// outside the alphabet, are a `Format` error.
pub fn alpha_to_number(token: &str) -> Result<u64, ElementsError> {
    let invalid = || {
        ElementsError::format(
            "NoradCatId",
            format!("'{token}' is not a '{NORAD_CAT_LEAD}'-prefixed base-62 token"),
        )
    };

    let digits = token
        .strip_prefix(NORAD_CAT_LEAD)
        .ok_or_else(invalid)?
        .trim_start_matches(NORAD_CAT_PAD);

    digits.chars().try_fold(0u64, |acc, c| {
        let value = NORAD_CAT_ALPHABET.find(c).ok_or_else(invalid)? as u64;
        acc.checked_mul(RADIX)
            .and_then(|acc| acc.checked_add(value))
            .ok_or_else(invalid)
    })
}

impl Serialize for CatalogId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.numeric_value() {
            Some(n) => serializer.serialize_u64(n),
            None => serializer.serialize_str(&self.0),
        }
    }
}

struct CatalogIdVisitor;

impl Visitor<'_> for CatalogIdVisitor {
    type Value = CatalogId;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a catalog number or identifier string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<CatalogId, E> {
        Ok(CatalogId::new(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<CatalogId, E> {
        Ok(CatalogId::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<CatalogId, E> {
        Ok(CatalogId(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<CatalogId, E> {
        if v.fract() == 0.0 && v >= 0.0 && v < u64::MAX as f64 {
            Ok(CatalogId::from(v as u64))
        } else {
            Err(E::invalid_value(de::Unexpected::Float(v), &self))
        }
    }
}

impl<'de> Deserialize<'de> for CatalogId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(CatalogIdVisitor)
    }
}
