//! German VAT ID validation: format check and EU VIES lookup.
//!
//! # Example
//!
//! ```no_run
//! use vat_validator::Settings;
//! use vat_validator::vat::*;
//!
//! # async fn run() -> Result<(), vat_validator::ValidatorError> {
//! // Format-only validation (no network)
//! let id = validate_german_format("DE123456789")?.unwrap();
//! assert_eq!(id.number, "123456789");
//!
//! // Full pipeline, one VIES call
//! let validator = Validator::new(&Settings::default())?;
//! let verdict = validator.validate_german_vat("DE123456789").await?;
//! println!("valid={} message={:?}", verdict.is_valid(), verdict.message());
//! # Ok(())
//! # }
//! ```

mod envelope;
mod format;
mod validator;
mod vies;

pub use envelope::check_vat_envelope;
pub use format::{GERMAN_VAT_REGEX, VatId, validate_german_format};
pub use validator::{INVALID_GERMAN_FORMAT_MSG, INVALID_ON_VIES_MSG, Rejection, Validator, Verdict};
pub use vies::{ViesClient, ViesReply, parse_check_vat_response};

/// Namespace URIs used by the `checkVat` SOAP exchange.
pub mod vies_ns {
    pub const SOAP_ENV: &str = "http://schemas.xmlsoap.org/soap/envelope/";
    pub const CHECK_VAT_TYPES: &str = "urn:ec.europa.eu:taxud:vies:services:checkVat:types";
}
