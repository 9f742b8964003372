//! Service settings and fixed protocol constants.

use std::time::Duration;

/// TCP port the HTTP server listens on. Not configurable.
pub const LISTEN_PORT: u16 = 8001;

/// Path of the single validation endpoint.
pub const VALIDATE_PATH: &str = "/validate_vat";

/// EU VIES SOAP endpoint for the `checkVat` operation.
pub const DEFAULT_VIES_URL: &str =
    "https://ec.europa.eu/taxation_customs/vies/services/checkVatService";

/// Content type of the outbound SOAP request.
pub const SOAP_CONTENT_TYPE: &str = "text/xml;charset=UTF-8";

/// Environment variable overriding [`DEFAULT_VIES_URL`].
pub const ENV_VIES_URL: &str = "VIES_URL";

/// Environment variable setting a request timeout (whole seconds) for VIES calls.
pub const ENV_VIES_TIMEOUT: &str = "VIES_TIMEOUT_SECS";

/// Runtime settings, built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where `checkVat` requests are POSTed.
    pub vies_url: String,
    /// Timeout for the whole VIES exchange. `None` leaves the client default
    /// (no timeout).
    pub request_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vies_url: DEFAULT_VIES_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl Settings {
    /// Settings pointing at a custom VIES endpoint, everything else default.
    pub fn with_vies_url(url: impl Into<String>) -> Self {
        Self {
            vies_url: url.into(),
            ..Self::default()
        }
    }

    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// Blank values are ignored. A timeout that is not a positive integer is
    /// ignored as well and logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(url) = lookup(ENV_VIES_URL).filter(|v| !v.trim().is_empty()) {
            settings.vies_url = url.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_VIES_TIMEOUT).filter(|v| !v.trim().is_empty()) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => settings.request_timeout = Some(Duration::from_secs(secs)),
                _ => tracing::warn!(
                    "ignoring {ENV_VIES_TIMEOUT}={raw:?}: expected a positive number of seconds"
                ),
            }
        }

        settings
    }
}
