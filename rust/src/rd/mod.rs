//! Revenue Department (กรมสรรพากร) web service integration
//!
//! This module provides:
//! - SOAP envelope rendering and response parsing
//! - An HTTP transport with pinned-certificate and unverified modes
//! - A client for TIN/PIN verification and VAT registrant lookup

pub mod client;
pub mod soap;
pub mod transport;

pub use client::{RdClient, TinService};
pub use soap::{RawField, SoapFields, SoapRequest};
pub use transport::{HttpTransport, SoapTransport, TlsMode};
