//! Revenue Department service configuration
//!
//! Endpoints, credentials and trust material are injected rather than
//! hard-coded so tests and staging deployments can point elsewhere. Resolve
//! once at startup and hand the result to [`crate::RdClient`].

use crate::error::{RdError, RdResult};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// TIN/PIN existence check service
pub const DEFAULT_TIN_SERVICE_URL: &str =
    "https://rdws.rd.go.th/serviceRD3/checktinpinservice.asmx";
pub const DEFAULT_TIN_SERVICE_NAMESPACE: &str =
    "https://rdws.rd.go.th/serviceRD3/checktinpinservice";

/// VAT registrant lookup service
pub const DEFAULT_VAT_SERVICE_URL: &str = "https://rdws.rd.go.th/serviceRD3/vatserviceRD3.asmx";
pub const DEFAULT_VAT_SERVICE_NAMESPACE: &str = "https://rdws.rd.go.th/serviceRD3/vatserviceRD3";

/// The public services accept this fixed account
pub const ANONYMOUS: &str = "anonymous";

/// One SOAP service: where to post and which XML namespace its operations use
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub url: Url,
    pub namespace: String,
}

impl ServiceEndpoint {
    pub fn new(url: &str, namespace: impl Into<String>) -> RdResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| RdError::Config(format!("invalid service URL '{}': {}", url, e)))?;
        Ok(Self {
            url,
            namespace: namespace.into(),
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn anonymous() -> Self {
        Self {
            username: ANONYMOUS.to_string(),
            password: ANONYMOUS.to_string(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Configuration for both Revenue Department services
#[derive(Debug, Clone)]
pub struct RdServiceConfig {
    pub tin_service: ServiceEndpoint,
    pub vat_service: ServiceEndpoint,
    pub credentials: Credentials,
    /// Certificate trusted for the first (pinned) connection attempt. `None`
    /// trusts the web PKI roots built into the TLS stack.
    pub certificate_path: Option<PathBuf>,
    /// Treat a registry-reported error as a failure instead of "no data"
    pub strict_remote_errors: bool,
    /// Per-request timeout. `None` leaves the HTTP client default in place.
    pub request_timeout: Option<Duration>,
}

impl RdServiceConfig {
    /// Start from the public endpoints and apply `RD_*` environment overrides.
    ///
    /// Does not load `.env` files; binaries call `dotenvy::dotenv()` first.
    pub fn from_env() -> RdResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] but with an injectable variable source
    pub fn from_lookup<F>(lookup: F) -> RdResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self::default();

        if let Some(url) = get("RD_TIN_SERVICE_URL") {
            config.tin_service = ServiceEndpoint::new(&url, config.tin_service.namespace)?;
        }
        if let Some(url) = get("RD_VAT_SERVICE_URL") {
            config.vat_service = ServiceEndpoint::new(&url, config.vat_service.namespace)?;
        }
        if let Some(username) = get("RD_USERNAME") {
            config.credentials.username = username;
        }
        if let Some(password) = get("RD_PASSWORD") {
            config.credentials.password = password;
        }
        if let Some(path) = get("RD_CERT_PATH") {
            config.certificate_path = Some(PathBuf::from(path));
        }
        if let Some(strict) = get("RD_STRICT_REMOTE_ERRORS") {
            config.strict_remote_errors = parse_flag("RD_STRICT_REMOTE_ERRORS", &strict)?;
        }
        if let Some(secs) = get("RD_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| {
                RdError::Config(format!("RD_TIMEOUT_SECS must be a whole number, got '{}'", secs))
            })?;
            config.request_timeout = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }

    pub fn with_strict_remote_errors(mut self, strict: bool) -> Self {
        self.strict_remote_errors = strict;
        self
    }

    pub fn with_certificate_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.certificate_path = Some(path.into());
        self
    }
}

impl Default for RdServiceConfig {
    fn default() -> Self {
        Self {
            tin_service: ServiceEndpoint {
                url: Url::parse(DEFAULT_TIN_SERVICE_URL).expect("default TIN service URL is valid"),
                namespace: DEFAULT_TIN_SERVICE_NAMESPACE.to_string(),
            },
            vat_service: ServiceEndpoint {
                url: Url::parse(DEFAULT_VAT_SERVICE_URL).expect("default VAT service URL is valid"),
                namespace: DEFAULT_VAT_SERVICE_NAMESPACE.to_string(),
            },
            credentials: Credentials::anonymous(),
            certificate_path: None,
            strict_remote_errors: false,
            request_timeout: None,
        }
    }
}

fn parse_flag(key: &str, value: &str) -> RdResult<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(RdError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}
