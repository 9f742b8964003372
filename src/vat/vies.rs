//! EU VIES SOAP client for VAT number validation.

use chrono::NaiveDate;
use quick_xml::Reader;
use quick_xml::events::Event;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use super::envelope::check_vat_envelope;
use super::format::VatId;
use crate::config::{SOAP_CONTENT_TYPE, Settings};
use crate::error::ValidatorError;

/// Parsed `checkVatResponse`.
///
/// Only [`valid`](Self::valid) drives the verdict; the other fields are kept
/// for logging and callers that want them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViesReply {
    pub country_code: String,
    pub vat_number: String,
    /// Date of the request as reported by VIES (sent as `2024-01-15+01:00`).
    pub request_date: Option<NaiveDate>,
    /// Whether the VAT number is currently valid.
    pub valid: bool,
    /// Registered company name, if the member state discloses it.
    pub name: Option<String>,
    /// Registered address, if the member state discloses it.
    pub address: Option<String>,
}

/// Client for the VIES `checkVat` SOAP operation.
#[derive(Debug, Clone)]
pub struct ViesClient {
    http: reqwest::Client,
    url: String,
}

impl ViesClient {
    /// Build a client for the endpoint and timeout in `settings`.
    ///
    /// # Errors
    ///
    /// `ValidatorError::Network` if the HTTP client cannot be initialised
    /// (e.g. the TLS backend fails to load).
    pub fn new(settings: &Settings) -> Result<Self, ValidatorError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ValidatorError::Network(e.to_string()))?;

        Ok(Self {
            http,
            url: settings.vies_url.clone(),
        })
    }

    /// Endpoint this client posts to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask VIES whether `id` is a registered VAT number.
    ///
    /// Exactly one POST is made; nothing is retried. The HTTP status is not
    /// inspected because VIES reports its own failures as SOAP faults in the
    /// body.
    ///
    /// # Errors
    ///
    /// `ValidatorError::Network` on transport failures,
    /// `ValidatorError::Fault` if VIES answers with a SOAP fault,
    /// `ValidatorError::Parse` on any other unexpected reply.
    pub async fn check_vat(&self, id: &VatId<'_>) -> Result<ViesReply, ValidatorError> {
        let envelope = check_vat_envelope(id)?;
        debug!("POST {} checkVat {}", self.url, id);

        let resp = self
            .http
            .post(&self.url)
            .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
            .body(envelope)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        debug!("VIES answered HTTP {status} ({} bytes)", body.len());

        parse_check_vat_response(&body)
    }
}

/// Parse a VIES SOAP reply.
///
/// Elements are matched by local name, so `soap:Envelope`, `env:Envelope`
/// and an unprefixed `Envelope` are all accepted.
///
/// # Errors
///
/// `ValidatorError::Fault` when the body holds a `Fault`,
/// `ValidatorError::Parse` when the XML is malformed, the root is not an
/// `Envelope`, or `checkVatResponse/valid` is missing or not a boolean.
pub fn parse_check_vat_response(xml: &str) -> Result<ViesReply, ValidatorError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut p = ParsedReply::default();
    let mut path: Vec<String> = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let name = local_name(e.local_name().as_ref())?;
                p.enter(&path, &name, &mut saw_root)?;
                path.push(name);
            }
            Ok(Event::Empty(ref e)) => {
                let name = local_name(e.local_name().as_ref())?;
                p.enter(&path, &name, &mut saw_root)?;
            }
            Ok(Event::Text(ref e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| ValidatorError::Parse(format!("bad text content: {e}")))?;
                if !text.is_empty() {
                    p.handle_text(&path, &text);
                }
            }
            Ok(Event::CData(e)) => {
                let raw = e.into_inner();
                let text = String::from_utf8_lossy(&raw);
                if !text.is_empty() {
                    p.handle_text(&path, &text);
                }
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ValidatorError::Parse(format!(
                    "XML parse error at position {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(ValidatorError::Parse("empty document".into()));
    }
    if let Some(open) = path.last() {
        return Err(ValidatorError::Parse(format!(
            "unexpected end of document inside <{open}>"
        )));
    }

    p.into_reply()
}

fn local_name(raw: &[u8]) -> Result<String, ValidatorError> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| ValidatorError::Parse(format!("element name is not UTF-8: {e}")))
}

#[derive(Default)]
struct ParsedReply {
    country_code: Option<String>,
    vat_number: Option<String>,
    request_date: Option<String>,
    valid: Option<String>,
    name: Option<String>,
    address: Option<String>,
    fault: bool,
    fault_code: Option<String>,
    fault_string: Option<String>,
}

impl ParsedReply {
    /// Called for every opening (or self-closing) element.
    fn enter(
        &mut self,
        path: &[String],
        name: &str,
        saw_root: &mut bool,
    ) -> Result<(), ValidatorError> {
        if path.is_empty() {
            if *saw_root {
                return Err(ValidatorError::Parse(format!(
                    "unexpected second root element <{name}>"
                )));
            }
            if name != "Envelope" {
                return Err(ValidatorError::Parse(format!(
                    "expected <Envelope> root element, found <{name}>"
                )));
            }
            *saw_root = true;
        }
        if name == "Fault" && path.len() == 2 && path[1] == "Body" {
            self.fault = true;
        }
        Ok(())
    }

    fn handle_text(&mut self, path: &[String], text: &str) {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let slot = match segments.as_slice() {
            ["Envelope", "Body", "checkVatResponse", field] => match *field {
                "countryCode" => &mut self.country_code,
                "vatNumber" => &mut self.vat_number,
                "requestDate" => &mut self.request_date,
                "valid" => &mut self.valid,
                "name" => &mut self.name,
                "address" => &mut self.address,
                _ => return,
            },
            ["Envelope", "Body", "Fault", "faultcode"] => &mut self.fault_code,
            ["Envelope", "Body", "Fault", "faultstring"] => &mut self.fault_string,
            _ => return,
        };
        slot.get_or_insert_with(String::new).push_str(text);
    }

    fn into_reply(self) -> Result<ViesReply, ValidatorError> {
        if self.fault {
            let reason = self
                .fault_string
                .or(self.fault_code)
                .unwrap_or_else(|| "unknown SOAP fault".into());
            return Err(ValidatorError::Fault(reason));
        }

        let raw_valid = self.valid.ok_or_else(|| {
            ValidatorError::Parse("reply has no checkVatResponse/valid element".into())
        })?;
        let valid = parse_bool(raw_valid.trim()).ok_or_else(|| {
            ValidatorError::Parse(format!("invalid boolean {raw_valid:?} in <valid>"))
        })?;

        Ok(ViesReply {
            country_code: self.country_code.unwrap_or_default(),
            vat_number: self.vat_number.unwrap_or_default(),
            request_date: self.request_date.as_deref().and_then(parse_request_date),
            valid,
            name: self.name.filter(|n| disclosed(n)),
            address: self.address.filter(|a| disclosed(a)),
        })
    }
}

/// XML Schema booleans plus the capitalised and single-letter spellings
/// some gateways emit.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" | "t" | "T" | "1" => Some(true),
        "false" | "False" | "FALSE" | "f" | "F" | "0" => Some(false),
        _ => None,
    }
}

/// `2024-01-15+01:00` → 2024-01-15. The offset is dropped.
fn parse_request_date(s: &str) -> Option<NaiveDate> {
    let date = s.trim().get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// VIES uses `---` for data the member state does not disclose.
fn disclosed(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s != "---"
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_REPLY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/">
  <env:Header/>
  <env:Body>
    <ns2:checkVatResponse xmlns:ns2="urn:ec.europa.eu:taxud:vies:services:checkVat:types">
      <ns2:countryCode>DE</ns2:countryCode>
      <ns2:vatNumber>123456789</ns2:vatNumber>
      <ns2:requestDate>2024-01-15+01:00</ns2:requestDate>
      <ns2:valid>true</ns2:valid>
      <ns2:name>ACME GMBH</ns2:name>
      <ns2:address>MUSTERSTR 1 10115 BERLIN</ns2:address>
    </ns2:checkVatResponse>
  </env:Body>
</env:Envelope>"#;

    fn reply_with_valid(valid: &str) -> String {
        format!(
            r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body><checkVatResponse xmlns="urn:ec.europa.eu:taxud:vies:services:checkVat:types"><countryCode>DE</countryCode><vatNumber>123456789</vatNumber><requestDate>2024-01-15+01:00</requestDate><valid>{valid}</valid><name>---</name><address>---</address></checkVatResponse></soap:Body></soap:Envelope>"#
        )
    }

    #[test]
    fn parses_valid_reply() {
        let reply = parse_check_vat_response(VALID_REPLY).unwrap();
        assert!(reply.valid);
        assert_eq!(reply.country_code, "DE");
        assert_eq!(reply.vat_number, "123456789");
        assert_eq!(reply.request_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(reply.name.as_deref(), Some("ACME GMBH"));
        assert_eq!(reply.address.as_deref(), Some("MUSTERSTR 1 10115 BERLIN"));
    }

    #[test]
    fn parses_invalid_reply_and_filters_dashes() {
        let reply = parse_check_vat_response(&reply_with_valid("false")).unwrap();
        assert!(!reply.valid);
        assert!(reply.name.is_none());
        assert!(reply.address.is_none());
    }

    #[test]
    fn numeric_booleans() {
        assert!(parse_check_vat_response(&reply_with_valid("1")).unwrap().valid);
        assert!(!parse_check_vat_response(&reply_with_valid("0")).unwrap().valid);
    }

    #[test]
    fn capitalised_and_short_booleans() {
        for raw in ["TRUE", "True", "t", "T"] {
            assert!(parse_check_vat_response(&reply_with_valid(raw)).unwrap().valid, "{raw}");
        }
        for raw in ["FALSE", "False", "f", "F"] {
            assert!(!parse_check_vat_response(&reply_with_valid(raw)).unwrap().valid, "{raw}");
        }
    }

    #[test]
    fn surrounding_whitespace_in_valid() {
        assert!(parse_check_vat_response(&reply_with_valid(" true\n")).unwrap().valid);
    }

    #[test]
    fn bad_boolean_is_parse_error() {
        for raw in ["yes", "tRUE", "2"] {
            let err = parse_check_vat_response(&reply_with_valid(raw)).unwrap_err();
            assert!(matches!(err, ValidatorError::Parse(_)), "{err:?}");
        }
    }

    #[test]
    fn soap_fault() {
        let xml = r#"<env:Envelope xmlns:env="http://schemas.xmlsoap.org/soap/envelope/"><env:Header/><env:Body><env:Fault><faultcode>env:Server</faultcode><faultstring>MS_UNAVAILABLE</faultstring></env:Fault></env:Body></env:Envelope>"#;
        match parse_check_vat_response(xml) {
            Err(ValidatorError::Fault(reason)) => assert_eq!(reason, "MS_UNAVAILABLE"),
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn fault_without_string_uses_code() {
        let xml = r#"<S:Envelope xmlns:S="http://schemas.xmlsoap.org/soap/envelope/"><S:Body><S:Fault><faultcode>S:Client</faultcode></S:Fault></S:Body></S:Envelope>"#;
        match parse_check_vat_response(xml) {
            Err(ValidatorError::Fault(reason)) => assert_eq!(reason, "S:Client"),
            other => panic!("expected fault, got {other:?}"),
        }
    }

    #[test]
    fn missing_valid_is_parse_error() {
        let xml = r#"<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/"><soap:Body/></soap:Envelope>"#;
        assert!(matches!(
            parse_check_vat_response(xml),
            Err(ValidatorError::Parse(_))
        ));
    }

    #[test]
    fn wrong_root_is_parse_error() {
        let xml = "<html><body>Service Unavailable</body></html>";
        assert!(matches!(
            parse_check_vat_response(xml),
            Err(ValidatorError::Parse(_))
        ));
    }

    #[test]
    fn non_xml_is_parse_error() {
        for body in ["", "not xml at all", "<Envelope><Body>"] {
            assert!(
                matches!(parse_check_vat_response(body), Err(ValidatorError::Parse(_))),
                "{body:?}"
            );
        }
    }

    #[test]
    fn mismatched_tags_are_parse_error() {
        let xml = "<Envelope><Body></Envelope></Body>";
        assert!(matches!(
            parse_check_vat_response(xml),
            Err(ValidatorError::Parse(_))
        ));
    }

    #[test]
    fn unparseable_request_date_is_dropped() {
        let xml = reply_with_valid("true").replace("2024-01-15+01:00", "yesterday");
        let reply = parse_check_vat_response(&xml).unwrap();
        assert!(reply.valid);
        assert!(reply.request_date.is_none());
    }

    #[test]
    fn valid_outside_check_vat_response_is_ignored() {
        let xml = r#"<Envelope><Body><other><valid>true</valid></other></Body></Envelope>"#;
        assert!(matches!(
            parse_check_vat_response(xml),
            Err(ValidatorError::Parse(_))
        ));
    }

    #[test]
    fn client_keeps_configured_url() {
        let client = ViesClient::new(&Settings::with_vies_url("http://127.0.0.1:1/vies")).unwrap();
        assert_eq!(client.url(), "http://127.0.0.1:1/vies");
    }
}
