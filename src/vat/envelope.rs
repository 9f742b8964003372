//! SOAP 1.1 request construction for the VIES `checkVat` operation.

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

use super::format::VatId;
use super::vies_ns;
use crate::error::ValidatorError;

fn xml_io(e: std::io::Error) -> ValidatorError {
    ValidatorError::Xml(format!("XML write error: {e}"))
}

/// Indented element writer. Text content is always escaped.
struct SoapWriter {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl SoapWriter {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2),
        }
    }

    fn into_string(self) -> Result<String, ValidatorError> {
        let buf = self.writer.into_inner().into_inner();
        String::from_utf8(buf).map_err(|e| ValidatorError::Xml(format!("XML UTF-8 error: {e}")))
    }

    fn start_element_with_attrs(
        &mut self,
        name: &str,
        attrs: &[(&str, &str)],
    ) -> Result<&mut Self, ValidatorError> {
        let mut elem = BytesStart::new(name);
        for (k, v) in attrs {
            elem.push_attribute((*k, *v));
        }
        self.writer
            .write_event(Event::Start(elem))
            .map_err(xml_io)?;
        Ok(self)
    }

    fn start_element(&mut self, name: &str) -> Result<&mut Self, ValidatorError> {
        self.start_element_with_attrs(name, &[])
    }

    fn empty_element(&mut self, name: &str) -> Result<&mut Self, ValidatorError> {
        self.writer
            .write_event(Event::Empty(BytesStart::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    fn end_element(&mut self, name: &str) -> Result<&mut Self, ValidatorError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_io)?;
        Ok(self)
    }

    fn text_element(&mut self, name: &str, text: &str) -> Result<&mut Self, ValidatorError> {
        self.start_element(name)?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_io)?;
        self.end_element(name)
    }
}

/// Build the `checkVat` SOAP envelope for `id`.
///
/// ```text
/// soapenv:Envelope
///   soapenv:Header
///   soapenv:Body
///     checkVat (xmlns = checkVat types namespace)
///       countryCode
///       vatNumber
/// ```
pub fn check_vat_envelope(id: &VatId<'_>) -> Result<String, ValidatorError> {
    let mut w = SoapWriter::new();
    w.start_element_with_attrs("soapenv:Envelope", &[("xmlns:soapenv", vies_ns::SOAP_ENV)])?;
    w.empty_element("soapenv:Header")?;
    w.start_element("soapenv:Body")?;
    w.start_element_with_attrs("checkVat", &[("xmlns", vies_ns::CHECK_VAT_TYPES)])?;
    w.text_element("countryCode", id.country_code)?;
    w.text_element("vatNumber", id.number)?;
    w.end_element("checkVat")?;
    w.end_element("soapenv:Body")?;
    w.end_element("soapenv:Envelope")?;
    w.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::Reader;

    fn de() -> VatId<'static> {
        VatId {
            country_code: "DE",
            number: "123456789",
        }
    }

    /// Collect (path, text) pairs for every text node.
    fn texts(xml: &str) -> Vec<(String, String)> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);
        let mut path: Vec<String> = Vec::new();
        let mut out = Vec::new();
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    path.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap())
                }
                Event::End(_) => {
                    path.pop();
                }
                Event::Text(t) => {
                    let text = t.unescape().unwrap().into_owned();
                    if !text.is_empty() {
                        out.push((path.join("/"), text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        out
    }

    #[test]
    fn envelope_structure() {
        let xml = check_vat_envelope(&de()).unwrap();
        assert!(xml.starts_with("<soapenv:Envelope"));
        assert!(xml.contains(r#"xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(xml.contains("<soapenv:Header/>"));
        assert!(xml.contains(
            r#"<checkVat xmlns="urn:ec.europa.eu:taxud:vies:services:checkVat:types">"#
        ));
        assert!(xml.trim_end().ends_with("</soapenv:Envelope>"));
    }

    #[test]
    fn envelope_fields() {
        let xml = check_vat_envelope(&de()).unwrap();
        assert_eq!(
            texts(&xml),
            vec![
                (
                    "soapenv:Envelope/soapenv:Body/checkVat/countryCode".to_string(),
                    "DE".to_string()
                ),
                (
                    "soapenv:Envelope/soapenv:Body/checkVat/vatNumber".to_string(),
                    "123456789".to_string()
                ),
            ]
        );
    }

    #[test]
    fn markup_in_values_is_escaped() {
        let id = VatId {
            country_code: "DE",
            number: "</vatNumber><x>&",
        };
        let xml = check_vat_envelope(&id).unwrap();
        assert!(xml.contains("&lt;/vatNumber&gt;&lt;x&gt;&amp;"));
        let fields = texts(&xml);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].1, "</vatNumber><x>&");
    }
}
