//! HTTP transport for SOAP calls
//!
//! A fresh `reqwest::Client` is built for every call so no session state is
//! shared between verifications. The retry policy lives in the client, not
//! here: a transport makes exactly one attempt in the mode it is given.

use super::soap::SoapRequest;
use crate::config::ServiceEndpoint;
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Certificate, Client};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the server certificate is checked for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Trust only the configured certificate, or the built-in web PKI roots
    /// when none is configured
    Pinned,
    /// Accept any certificate
    Unverified,
}

impl std::fmt::Display for TlsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pinned => write!(f, "pinned"),
            Self::Unverified => write!(f, "unverified"),
        }
    }
}

/// Posts a SOAP request and returns the raw response body
#[async_trait]
pub trait SoapTransport: Send + Sync {
    async fn post(
        &self,
        endpoint: &ServiceEndpoint,
        request: &SoapRequest,
        mode: TlsMode,
    ) -> Result<String, TransportError>;
}

/// reqwest-backed transport used in production
#[derive(Debug, Clone)]
pub struct HttpTransport {
    certificate_path: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(certificate_path: Option<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            certificate_path,
            timeout,
        }
    }

    fn build_client(&self, mode: TlsMode) -> Result<Client, TransportError> {
        let mut builder = Client::builder().use_rustls_tls();

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match (mode, &self.certificate_path) {
            (TlsMode::Pinned, Some(path)) => builder
                .tls_built_in_root_certs(false)
                .add_root_certificate(load_certificate(path)?),
            (TlsMode::Pinned, None) => builder,
            (TlsMode::Unverified, _) => builder.danger_accept_invalid_certs(true),
        };

        builder.build().map_err(|e| match mode {
            TlsMode::Pinned => TransportError::Tls(format!("cannot build pinned client: {}", e)),
            TlsMode::Unverified => TransportError::Http(e),
        })
    }
}

#[async_trait]
impl SoapTransport for HttpTransport {
    async fn post(
        &self,
        endpoint: &ServiceEndpoint,
        request: &SoapRequest,
        mode: TlsMode,
    ) -> Result<String, TransportError> {
        let client = self.build_client(mode)?;

        let response = client
            .post(endpoint.url.clone())
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", format!("\"{}\"", request.soap_action()))
            .body(request.to_envelope())
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().await.map_err(classify)?;

        // SOAP 1.1 faults arrive as HTTP 500; hand them to the parser
        if status.is_success() || (status.as_u16() == 500 && body.contains("Fault")) {
            return Ok(body);
        }

        Err(TransportError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }
}

/// Read the bundled certificate, PEM first, then DER
fn load_certificate(path: &Path) -> Result<Certificate, TransportError> {
    let bytes = std::fs::read(path).map_err(|e| {
        TransportError::Tls(format!(
            "cannot read certificate {}: {}",
            path.display(),
            e
        ))
    })?;

    Certificate::from_pem(&bytes)
        .or_else(|_| Certificate::from_der(&bytes))
        .map_err(|e| {
            TransportError::Tls(format!(
                "cannot parse certificate {}: {}",
                path.display(),
                e
            ))
        })
}

/// Split certificate/handshake failures from other request errors.
///
/// rustls reports handshake and certificate failures as an `io::Error` of
/// kind `InvalidData` wrapping the TLS error, somewhere below a connect
/// error. Refused or reset connections carry other kinds.
fn classify(err: reqwest::Error) -> TransportError {
    let err = err.without_url();
    if !err.is_connect() {
        return TransportError::Http(err);
    }

    let mut tls_cause = None;
    let mut source = std::error::Error::source(&err);
    while let Some(e) = source {
        if is_tls_io_error(e) {
            tls_cause = Some(e.to_string());
            break;
        }
        source = e.source();
    }

    match tls_cause {
        Some(cause) => TransportError::Tls(format!("{}: {}", err, cause)),
        None => TransportError::Http(err),
    }
}

fn is_tls_io_error(err: &(dyn std::error::Error + 'static)) -> bool {
    err.downcast_ref::<io::Error>()
        .is_some_and(|io| io.kind() == io::ErrorKind::InvalidData && io.get_ref().is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RdServiceConfig;

    #[test]
    fn test_invalid_data_io_error_is_tls() {
        let handshake = io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid peer certificate: UnknownIssuer",
        );
        assert!(is_tls_io_error(&handshake));

        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(!is_tls_io_error(&refused));

        // A bare kind with no wrapped TLS error is not enough
        let bare = io::Error::from(io::ErrorKind::InvalidData);
        assert!(!is_tls_io_error(&bare));
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_tls() {
        // Reserve a port, then free it so nothing is listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let endpoint = ServiceEndpoint::new(
            &format!("http://127.0.0.1:{}/tls/ssl/certificate.asmx", port),
            "urn:test",
        )
        .unwrap();
        let request = SoapRequest::new("urn:test", "ServiceTIN");

        let transport = HttpTransport::new(None, Some(Duration::from_secs(5)));
        let err = transport
            .post(&endpoint, &request, TlsMode::Unverified)
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Http(_)), "got {:?}", err);
    }

    #[test]
    fn test_missing_certificate_is_tls_error() {
        let err = load_certificate(Path::new("/nonexistent/rdws.cer")).unwrap_err();
        assert!(err.is_tls());
    }

    #[test]
    fn test_configured_certificate_must_load() {
        let transport = HttpTransport::new(Some(PathBuf::from("/nonexistent/rdws.cer")), None);
        assert!(matches!(
            transport.build_client(TlsMode::Pinned),
            Err(TransportError::Tls(_))
        ));
        assert!(transport.build_client(TlsMode::Unverified).is_ok());
    }

    #[test]
    fn test_default_config_builds_verified_client() {
        let config = RdServiceConfig::default();
        let transport = HttpTransport::new(config.certificate_path, config.request_timeout);
        assert!(transport.build_client(TlsMode::Pinned).is_ok());
    }

    #[test]
    fn test_tls_mode_display() {
        assert_eq!(TlsMode::Pinned.to_string(), "pinned");
        assert_eq!(TlsMode::Unverified.to_string(), "unverified");
    }
}
