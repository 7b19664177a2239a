//! Request code derivation: company prefix + month/year + sequence.
//!
//! Codes look like `AT082601`: prefix `AT`, August (`08`) 2026 (`26`),
//! first request that month (`01`). Codes are unique per company-month
//! only; equal prefixes across companies are accepted behavior.

use chrono::{DateTime, Datelike, Utc};

use crate::errors::DomainError;

/// Highest sequence the two-digit code format can carry for one
/// company-month block.
pub const SEQUENCE_CAP: u32 = 99;

/// Uppercase prefix from a company name: the first two letters of a
/// single-word name, or the initial of each word otherwise.
pub fn company_prefix(company_name: &str) -> String {
    let words: Vec<&str> = company_name.split_whitespace().collect();
    match words.as_slice() {
        [] => String::new(),
        [single] => single.chars().take(2).flat_map(char::to_uppercase).collect(),
        many => many
            .iter()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect(),
    }
}

/// `MMYY` suffix for the month a request is created in.
pub fn month_year_suffix(at: DateTime<Utc>) -> String {
    format!("{:02}{:02}", at.month(), at.year() % 100)
}

/// Sequence digits of an existing code for the given prefix + month block,
/// if the code belongs to that block.
pub fn parse_sequence(code: &str, prefix: &str, suffix: &str) -> Option<u32> {
    let rest = code.strip_prefix(prefix)?;
    let digits = rest.strip_prefix(suffix)?;
    if digits.len() != 2 || !digits.chars().all(|ch| ch.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Smallest unused sequence: max over existing codes in the block, plus one.
/// Defaults to 1 in a fresh month.
pub fn next_sequence<'a>(
    existing_codes: impl IntoIterator<Item = &'a str>,
    prefix: &str,
    suffix: &str,
) -> u32 {
    existing_codes
        .into_iter()
        .filter_map(|code| parse_sequence(code, prefix, suffix))
        .max()
        .map_or(1, |max| max + 1)
}

/// Full code for a company's request created at `at`, given the codes the
/// company already holds for that calendar month. Past sequence 99 the
/// format has no room left and a third digit would collide with the next
/// month's parse, so the block is refused outright.
pub fn request_code<'a>(
    company_name: &str,
    existing_codes: impl IntoIterator<Item = &'a str>,
    at: DateTime<Utc>,
) -> Result<String, DomainError> {
    let prefix = company_prefix(company_name);
    let suffix = month_year_suffix(at);
    let sequence = next_sequence(existing_codes, &prefix, &suffix);
    if sequence > SEQUENCE_CAP {
        return Err(DomainError::Validation(format!(
            "request code block `{prefix}{suffix}` is exhausted at {SEQUENCE_CAP} codes"
        )));
    }
    Ok(format!("{prefix}{suffix}{sequence:02}"))
}
