//! Error types for the Revenue Department client and partner hooks
//!
//! Format problems on user input are not errors at the hook level (the hook
//! is a no-op), but they are still typed here so callers of the client can
//! tell them apart from transport failures.

use th_partner_types::ValidationError;
use thiserror::Error;

/// Main error type for TIN verification and registry lookup
#[derive(Error, Debug)]
pub enum RdError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("SOAP fault from {service}: {message}")]
    SoapFault { service: String, message: String },

    #[error("Malformed response from {service}: {message}")]
    MalformedResponse { service: String, message: String },

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Registry reported an error for TIN {tin}: {message}")]
    RemoteData { tin: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures while moving a SOAP request over HTTP
#[derive(Error, Debug)]
pub enum TransportError {
    /// Certificate validation or handshake failure, including an unusable
    /// pinned certificate file
    #[error("TLS failure: {0}")]
    Tls(String),

    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    #[error("Service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl TransportError {
    pub fn is_tls(&self) -> bool {
        matches!(self, TransportError::Tls(_))
    }
}

pub type RdResult<T> = std::result::Result<T, RdError>;
