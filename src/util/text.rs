use std::{collections::HashSet, str::FromStr};

use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

/// Characters that never belong to a rendered number: plain, non-breaking and
/// narrow non-breaking spaces, quotes and line breaks.
const NUMBER_ESCAPE_CHAR: &[char] = &[' ', '\u{a0}', '\u{202f}', '"', '\n', '\r', '\t'];

/// How a web page renders the separators of a decimal number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLocale {
    /// Thousands separator, removed before parsing.
    pub grouping: char,
    /// Decimal separator, rewritten to `.` before parsing.
    pub decimal: char,
}

impl NumberLocale {
    /// `14.523,45`
    pub const CONTINENTAL: NumberLocale = NumberLocale {
        grouping: '.',
        decimal: ',',
    };

    /// `14,523.45`
    pub const INTERNATIONAL: NumberLocale = NumberLocale {
        grouping: ',',
        decimal: '.',
    };
}

/// Parses a decimal value from a given string.
///
/// Whitespace and the characters in `escape_chars` are dropped before the
/// text is handed to `Decimal::from_str`; scientific notation is accepted as
/// a fallback.
///
/// # Arguments
///
/// * `s`: A string slice containing the representation of a decimal number.
/// * `escape_chars`: Optional characters to be escaped from the input string.
///
/// # Returns
///
/// * `Result<Decimal>`: The parsed `Decimal` value if successful, or an error
///   if the conversion fails.
pub fn parse_decimal(s: &str, escape_chars: Option<Vec<char>>) -> Result<Decimal> {
    let cleaned = clean_escape_chars(s, escape_chars);
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|why| anyhow!("Failed to parse '{}' as Decimal because {:?}", cleaned, why))
}

/// Rewrites a number rendered under `locale` into the canonical form
/// (`.` as decimal separator, no grouping).
///
/// `"14.523,45"` under [`NumberLocale::CONTINENTAL`] becomes `"14523.45"`.
pub fn normalize_number(s: &str, locale: NumberLocale) -> String {
    clean_escape_chars(s, Some(vec![locale.grouping]))
        .chars()
        .map(|c| if c == locale.decimal { '.' } else { c })
        .collect()
}

/// Parses a number rendered under `locale` as a `Decimal`.
pub fn parse_localized_decimal(s: &str, locale: NumberLocale) -> Result<Decimal> {
    parse_decimal(&normalize_number(s, locale), None)
}

/// Removes a set of escape characters from a given string.
///
/// # Arguments
///
/// * `s`: The original string from which escape characters will be removed.
/// * `escape_chars`: Optional characters that will be removed from the
///   string if found, on top of [`NUMBER_ESCAPE_CHAR`].
pub(crate) fn clean_escape_chars(s: &str, escape_chars: Option<Vec<char>>) -> String {
    let mut combined: Vec<char> = NUMBER_ESCAPE_CHAR.to_vec();
    if let Some(ec) = escape_chars {
        combined.extend(ec);
    }

    let filters = combined.iter().collect::<HashSet<_>>();
    s.chars().filter(|c| !filters.contains(c)).collect()
}
