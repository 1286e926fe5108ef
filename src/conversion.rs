//! # Numeric primitives of the element-set encodings
//!
//! The fixed-column format stores its drag terms as a signed decimal fraction
//! with an implied leading `0.` and a one-digit signed exponent
//! (`"-12345-3"` is `-0.12345e-3`), and protects each data line with a mod-10
//! checksum. The textual encodings (KVN, CSV) render floats the way the legacy
//! producers do: shortest general form (`%g`) for the mean elements and scientific
//! form for the perturbation terms, both with the shortest digits that read back
//! to the same value.
//!
//! All parsers here return [`ElementsError::Format`] and all writers return
//! [`ElementsError::Range`] when a value cannot be represented in its field.
//! The field named in those errors is generic; the fixed-column codec renames it
//! with [`ElementsError::for_field`].
use crate::gpelements_errors::ElementsError;

/// Values of `%g` whose decimal exponent reaches this bound switch to scientific form.
const GENERAL_EXP_LIMIT: i32 = 6;

/// Split a Rust `{:e}` rendering into its mantissa and exponent.
fn split_exponent(s: &str) -> (&str, i32) {
    match s.split_once('e') {
        Some((mantissa, exp)) => (mantissa, exp.parse().unwrap_or(0)),
        None => (s, 0),
    }
}

fn non_finite(x: f64) -> Option<String> {
    if x.is_nan() {
        Some("NaN".into())
    } else if x.is_infinite() {
        Some(if x > 0.0 { "+Inf" } else { "-Inf" }.into())
    } else {
        None
    }
}

/// Parse a signed fraction with implied decimal point and one-digit exponent.
///
/// Arguments
/// -----------------
/// * `token`: the raw field, e.g. `" 12514-4"`, `"-12345-3"` or `" 00000+0"`.
///   The first character is the sign (`' '`, `'+'` or `'-'`); a leading digit is
///   accepted as an implicit `+`.
///
/// Return
/// ----------
/// * The decoded value, or a `Format` error when the mantissa is not a run of
///   digits or the trailing signed exponent is missing.
pub fn parse_signed_fraction(token: &str) -> Result<f64, ElementsError> {
    let invalid =
        |reason: &str| ElementsError::format("SignedFraction", format!("'{token}' {reason}"));

    let (negative, body) = match token.chars().next() {
        Some('-') => (true, &token[1..]),
        Some(' ') | Some('+') => (false, &token[1..]),
        Some(c) if c.is_ascii_digit() => (false, token),
        _ => return Err(invalid("has no sign")),
    };
    let body = body.trim();

    let split = body
        .rfind(['-', '+'])
        .filter(|&i| i > 0)
        .ok_or_else(|| invalid("has no exponent"))?;
    let (mantissa, exponent) = body.split_at(split);

    if mantissa.is_empty() || !mantissa.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid("has a malformed mantissa"));
    }
    if exponent.len() != 2 || !exponent.as_bytes()[1].is_ascii_digit() {
        return Err(invalid("has a malformed exponent"));
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}0.{mantissa}e{exponent}")
        .parse::<f64>()
        .map_err(|e| invalid(&e.to_string()))
}

/// Inverse of [`parse_signed_fraction`], always eight characters wide.
///
/// Non-negative values carry a leading space; zero renders as `" 00000+0"`.
/// Values whose exponent does not fit a single digit are a `Range` error.
pub fn format_signed_fraction(x: f64) -> Result<String, ElementsError> {
    if !x.is_finite() {
        return Err(ElementsError::range("SignedFraction", format!("{x} is not finite")));
    }
    if x == 0.0 {
        return Ok(" 00000+0".into());
    }

    let rendered = format!("{:.4e}", x * 10.0);
    let (mantissa, exp) = split_exponent(&rendered);
    if !(-9..=9).contains(&exp) {
        return Err(ElementsError::range(
            "SignedFraction",
            format!("{x:e} needs a two-digit exponent"),
        ));
    }

    let digits = mantissa.replace('.', "");
    let lead = if x >= 0.0 { " " } else { "" };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    Ok(format!("{lead}{digits}{exp_sign}{}", exp.abs()))
}

/// Parse a plain fixed-column float, tolerating an exponent written without `e`.
///
/// The first `-` or `+` after the leading character introduces the exponent, so
/// `"1.5-3"` reads as `1.5e-3` while `"-.00000241"` is an ordinary negative value.
pub fn parse_tle_float(token: &str) -> Result<f64, ElementsError> {
    let token = token.trim();
    let mut chars = token.chars();
    let Some(first) = chars.next() else {
        return Err(ElementsError::format("Float", "empty field"));
    };
    let rest = chars.as_str().replacen('-', "e-", 1).replacen('+', "e", 1);

    format!("{first}{rest}")
        .parse::<f64>()
        .map_err(|e| ElementsError::format("Float", format!("'{token}': {e}")))
}

/// Render the first derivative of the mean motion as `" .00000241"` / `"-.00000241"`.
pub fn format_mean_motion_dot(x: f64) -> Result<String, ElementsError> {
    let x = if x == 0.0 { 0.0 } else { x };
    let rendered = format!("{x:.8}");
    let Some(fraction) = rendered
        .strip_prefix("0.")
        .map(|f| format!(" .{f}"))
        .or_else(|| rendered.strip_prefix("-0.").map(|f| format!("-.{f}")))
    else {
        return Err(ElementsError::range(
            "MeanMotionDot",
            format!("{rendered} is not a pure fraction"),
        ));
    };
    Ok(fraction)
}

/// Mod-10 checksum of a data line: digit values plus one per `-`, other characters ignored.
pub fn line_checksum(line: &str) -> char {
    let sum: u32 = line
        .chars()
        .map(|c| match c {
            '-' => 1,
            c => c.to_digit(10).unwrap_or(0),
        })
        .sum();
    char::from(b'0' + (sum % 10) as u8)
}

/// Shortest general rendering, as the `%g` verb of the legacy producers.
///
/// Fixed notation is used for decimal exponents in `-4..6`, scientific notation
/// with a signed two-digit exponent otherwise (`6.5515e-05`, `1e+06`).
pub fn format_general(x: f64) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    if x == 0.0 {
        return if x.is_sign_negative() { "-0" } else { "0" }.into();
    }

    let sci = format!("{x:e}");
    let (mantissa, exp) = split_exponent(&sci);
    if exp < -4 || exp >= GENERAL_EXP_LIMIT {
        format!("{mantissa}e{exp:+03}")
    } else {
        format!("{x}")
    }
}

/// Scientific rendering with the shortest mantissa that reads back to `x`
/// and a signed two-digit exponent (`6.5515e-05`, `0e+00`).
pub fn format_exp(x: f64) -> String {
    if let Some(s) = non_finite(x) {
        return s;
    }
    let sci = format!("{x:e}");
    let (mantissa, exp) = split_exponent(&sci);
    format!("{mantissa}e{exp:+03}")
}
