//! Comparison-only normalisation of extracted field values.
//!
//! Independent documents present the same value differently: `"$10,000,000"`
//! on one form is `"10000000"` on another, `"Ten Million"` is `"TEN MILLION"`.
//! Normalised values are only ever compared, never displayed.

use std::fmt;

/// Case-folded, alphanumeric-only projection of a field value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedValue(String);

impl NormalizedValue {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NormalizedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalise a value for equality comparison.
///
/// # Algorithm
///
/// 1. Lowercase each character. A character whose lowercase form is not a
///    single alphanumeric character is kept as-is.
/// 2. Drop every character that is not alphanumeric: whitespace,
///    punctuation, currency symbols, separators.
///
/// Total and idempotent: `normalize(normalize(v).as_str()) == normalize(v)`.
pub fn normalize(value: &str) -> NormalizedValue {
    let folded = value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .map(fold_char)
        .collect();
    NormalizedValue(folded)
}

/// Normalise any displayable value (numbers, booleans) via its string form.
pub fn normalize_display<T: fmt::Display + ?Sized>(value: &T) -> NormalizedValue {
    normalize(&value.to_string())
}

fn fold_char(c: char) -> char {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) if l.is_alphanumeric() => l,
        _ => c,
    }
}
