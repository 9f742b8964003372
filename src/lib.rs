//! # vat-validator
//!
//! Validates German VAT identification numbers (USt-IdNr.) in two stages:
//!
//! 1. **Format** — `DE` followed by exactly nine digits, checked locally.
//! 2. **VIES** — one SOAP `checkVat` call to the EU VAT Information Exchange
//!    System.
//!
//! A malformed or unregistered number is a *rejection* ([`vat::Verdict`]),
//! not an error. [`ValidatorError`] is reserved for cases where no answer
//! could be obtained (network failure, unreadable reply, SOAP fault).
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `server` (default) | axum HTTP endpoint, logging setup, `vat-validator` binary |

pub mod config;
mod error;
pub mod vat;

#[cfg(feature = "server")]
pub mod api;

#[cfg(feature = "server")]
pub mod logging;

pub use config::{LISTEN_PORT, Settings};
pub use error::ValidatorError;
pub use vat::{Rejection, Validator, Verdict};
