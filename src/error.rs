use thiserror::Error;

/// Internal faults of the validation pipeline.
///
/// A VAT number that is malformed or unknown to VIES is *not* an error: it is
/// reported as a [`Verdict::Rejected`](crate::vat::Verdict::Rejected). This
/// type only covers conditions where no verdict could be reached.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ValidatorError {
    /// The format pattern could not be compiled.
    #[error("pattern error: {0}")]
    Pattern(String),

    /// Building the SOAP request failed.
    #[error("XML error: {0}")]
    Xml(String),

    /// Connection, DNS, TLS, or body read failure while talking to VIES.
    #[error("VIES network error: {0}")]
    Network(String),

    /// The VIES reply was not a well-formed `checkVatResponse`.
    #[error("VIES parse error: {0}")]
    Parse(String),

    /// VIES answered with a SOAP fault (e.g. `MS_UNAVAILABLE`).
    #[error("VIES fault: {0}")]
    Fault(String),
}

impl ValidatorError {
    /// Whether the fault originated on the VIES side of the call
    /// (network, unreadable reply, or SOAP fault).
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Parse(_) | Self::Fault(_))
    }
}

impl From<reqwest::Error> for ValidatorError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
