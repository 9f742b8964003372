//! Two-stage validation pipeline: format check, then VIES lookup.

use std::fmt;

use tracing::info;

use super::format::validate_german_format;
use super::vies::ViesClient;
use crate::config::Settings;
use crate::error::ValidatorError;

/// Message returned when the input does not look like a German VAT ID.
pub const INVALID_GERMAN_FORMAT_MSG: &str =
    "A German VAT number starts with DE followed by 9 numeric characters.";

/// Message returned when VIES does not know the number.
pub const INVALID_ON_VIES_MSG: &str = "The VAT number is invalid on VIES";

/// Why a VAT number was turned down. Not an error: the pipeline ran to
/// completion and reached a negative answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Failed the `DE` + 9 digits check; VIES was not contacted.
    InvalidFormat,
    /// VIES reported the number as not valid.
    InvalidOnVies,
}

impl Rejection {
    /// Human-readable explanation.
    pub fn message(self) -> &'static str {
        match self {
            Self::InvalidFormat => INVALID_GERMAN_FORMAT_MSG,
            Self::InvalidOnVies => INVALID_ON_VIES_MSG,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of a completed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Empty when valid, the rejection message otherwise.
    pub fn message(self) -> &'static str {
        match self {
            Self::Valid => "",
            Self::Rejected(r) => r.message(),
        }
    }
}

/// Validates German VAT IDs. Holds no per-request state and can be shared
/// between tasks.
#[derive(Debug, Clone)]
pub struct Validator {
    vies: ViesClient,
}

impl Validator {
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(settings: &Settings) -> Result<Self, ValidatorError> {
        Ok(Self {
            vies: ViesClient::new(settings)?,
        })
    }

    /// Validate `vat`: format first, then a single VIES lookup.
    ///
    /// Malformed input is rejected without any network traffic.
    ///
    /// # Errors
    ///
    /// Any [`ValidatorError`] ends the pipeline immediately; nothing is retried.
    /// Failures are returned, not logged; the caller decides how to report them.
    pub async fn validate_german_vat(&self, vat: &str) -> Result<Verdict, ValidatorError> {
        let Some(id) = validate_german_format(vat)? else {
            info!("rejected {vat:?}: not in German VAT format");
            return Ok(Verdict::Rejected(Rejection::InvalidFormat));
        };

        let reply = self.vies.check_vat(&id).await?;

        if reply.valid {
            info!(
                "{id} is valid on VIES (request date {})",
                reply
                    .request_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into())
            );
            Ok(Verdict::Valid)
        } else {
            info!("{id} is not valid on VIES");
            Ok(Verdict::Rejected(Rejection::InvalidOnVies))
        }
    }
}
