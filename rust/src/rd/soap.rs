//! SOAP 1.1 envelope codec for the Revenue Department services
//!
//! Requests are rendered with `writeln!` into a string; responses are read
//! with quick-xml into a flat field map. The services wrap every value in an
//! `ArrayOfAnyType`, so a field looks like
//! `<vName><anyType xsi:type="xsd:string">...</anyType></vName>` or is nil.

use crate::error::{RdError, RdResult};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fmt::Write;

const SOAP_ENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema";

/// One RPC call against a SOAP service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapRequest {
    namespace: String,
    operation: String,
    params: Vec<(String, String)>,
}

impl SoapRequest {
    pub fn new(namespace: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter. Order is preserved in the envelope.
    pub fn param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((name.into(), value.to_string()));
        self
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Value for the `SOAPAction` header
    pub fn soap_action(&self) -> String {
        format!("{}/{}", self.namespace.trim_end_matches('/'), self.operation)
    }

    pub fn to_envelope(&self) -> String {
        let mut xml = String::new();
        // Writing into a String cannot fail
        let _ = self.write_envelope(&mut xml);
        xml
    }

    fn write_envelope(&self, xml: &mut String) -> std::fmt::Result {
        writeln!(xml, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
        writeln!(
            xml,
            r#"<soap:Envelope xmlns:xsi="{}" xmlns:xsd="{}" xmlns:soap="{}">"#,
            XSI_NS, XSD_NS, SOAP_ENV_NS
        )?;
        writeln!(xml, "  <soap:Body>")?;
        writeln!(
            xml,
            r#"    <{} xmlns="{}">"#,
            self.operation,
            xml_escape(&self.namespace)
        )?;
        for (name, value) in &self.params {
            writeln!(xml, "      <{}>{}</{}>", name, xml_escape(value), name)?;
        }
        writeln!(xml, "    </{}>", self.operation)?;
        writeln!(xml, "  </soap:Body>")?;
        write!(xml, "</soap:Envelope>")
    }
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// =============================================================================
// Response parsing
// =============================================================================

/// A single field of a service result, before any normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawField {
    /// `xsi:nil`, self-closing, or no values
    Nil,
    Values(Vec<String>),
}

impl RawField {
    /// First wrapped value, if any
    pub fn first(&self) -> Option<&str> {
        match self {
            RawField::Nil => None,
            RawField::Values(values) => values.first().map(String::as_str),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.first().is_none()
    }
}

/// Result fields keyed by element local name
pub type SoapFields = BTreeMap<String, RawField>;

/// Extract the `<*Result>` element of a response body as a field map.
///
/// `service` only labels errors.
pub fn parse_response(service: &str, xml: &str) -> RdResult<SoapFields> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<String> = Vec::new();
    let mut fields = SoapFields::new();
    // Stack depth at which the result element was opened
    let mut result_depth: Option<usize> = None;
    let mut found_result = false;
    let mut current: Option<FieldBuilder> = None;
    let mut fault: Option<String> = None;
    let mut in_fault = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = local_name(&e);
                stack.push(name.clone());
                let depth = stack.len();

                if name == "Fault" {
                    in_fault = true;
                }

                match result_depth {
                    None if is_result_element(&name, &stack) => {
                        result_depth = Some(depth);
                        found_result = true;
                    }
                    Some(d) if depth == d + 1 => {
                        current = Some(FieldBuilder::new(name, has_nil(&e)));
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                let name = local_name(&e);
                match result_depth {
                    // Self-closing field directly under the result
                    Some(d) if stack.len() == d => {
                        fields.insert(name, RawField::Nil);
                    }
                    None if is_result_element(&name, &stack) => {
                        found_result = true;
                    }
                    _ => {}
                }
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                if let Some(field) = current.as_mut() {
                    field.push(&text);
                } else if in_fault && stack.last().is_some_and(|n| n == "faultstring") {
                    fault = Some(text.into_owned());
                }
            }
            Event::CData(c) => {
                if let Some(field) = current.as_mut() {
                    field.push(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(_) => {
                let depth = stack.len();
                if let Some(d) = result_depth {
                    if depth == d + 1 {
                        if let Some(field) = current.take() {
                            let (name, raw) = field.finish();
                            fields.insert(name, raw);
                        }
                    } else if depth == d {
                        result_depth = None;
                    }
                }
                if stack.pop().as_deref() == Some("Fault") {
                    in_fault = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(message) = fault {
        return Err(RdError::SoapFault {
            service: service.to_string(),
            message,
        });
    }

    if !found_result {
        return Err(RdError::MalformedResponse {
            service: service.to_string(),
            message: "no result element in response body".to_string(),
        });
    }

    Ok(fields)
}

/// `<OpResult>` directly inside `<OpResponse>`
fn is_result_element(name: &str, stack: &[String]) -> bool {
    if !name.ends_with("Result") {
        return false;
    }
    // For Start events the element itself is already on the stack
    let parent = if stack.last().is_some_and(|n| n == name) {
        stack.len().checked_sub(2).and_then(|i| stack.get(i))
    } else {
        stack.last()
    };
    parent.is_some_and(|p| p.ends_with("Response"))
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn has_nil(e: &BytesStart<'_>) -> bool {
    e.attributes().flatten().any(|attr| {
        attr.key.local_name().as_ref() == b"nil" && attr.value.as_ref() == b"true"
    })
}

struct FieldBuilder {
    name: String,
    nil: bool,
    values: Vec<String>,
}

impl FieldBuilder {
    fn new(name: String, nil: bool) -> Self {
        Self {
            name,
            nil,
            values: Vec::new(),
        }
    }

    fn push(&mut self, text: &str) {
        if !text.is_empty() {
            self.values.push(text.to_string());
        }
    }

    fn finish(self) -> (String, RawField) {
        let raw = if self.nil || self.values.is_empty() {
            RawField::Nil
        } else {
            RawField::Values(self.values)
        };
        (self.name, raw)
    }
}
