//! German VAT ID (USt-IdNr.) format validation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ValidatorError;

/// `DE` followed by exactly nine digits, nothing before or after.
pub const GERMAN_VAT_REGEX: &str = r"^DE[0-9]{9}$";

static GERMAN_VAT_PATTERN: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(GERMAN_VAT_REGEX));

/// A VAT ID that passed the format check, split at the country prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VatId<'a> {
    /// Two-letter country prefix, always `DE` here.
    pub country_code: &'a str,
    /// The number without the prefix.
    pub number: &'a str,
}

impl<'a> VatId<'a> {
    fn split(vat: &'a str) -> Option<Self> {
        let (country_code, number) = vat.split_at_checked(2)?;
        Some(Self {
            country_code,
            number,
        })
    }
}

impl fmt::Display for VatId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.country_code, self.number)
    }
}

/// Check `vat` against [`GERMAN_VAT_REGEX`].
///
/// Returns `Ok(Some(id))` when the input is a well-formed German VAT ID and
/// `Ok(None)` when it is not. The input is taken verbatim: surrounding
/// whitespace or lowercase `de` are rejected.
///
/// # Errors
///
/// `ValidatorError::Pattern` if the pattern cannot be compiled.
pub fn validate_german_format(vat: &str) -> Result<Option<VatId<'_>>, ValidatorError> {
    let pattern = GERMAN_VAT_PATTERN
        .as_ref()
        .map_err(|e| ValidatorError::Pattern(e.to_string()))?;

    if !pattern.is_match(vat) {
        return Ok(None);
    }
    Ok(VatId::split(vat))
}
