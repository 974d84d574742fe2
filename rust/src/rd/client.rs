//! Revenue Department web service client
//!
//! Two calls: an existence check against the TIN/PIN service and a
//! registration lookup against the VAT service. Both go through
//! [`RdClient::call_with_fallback`], which makes one pinned-certificate
//! attempt and, only on a TLS failure, exactly one unverified attempt.

use super::soap::{parse_response, RawField, SoapFields, SoapRequest};
use super::transport::{HttpTransport, SoapTransport, TlsMode};
use crate::config::{RdServiceConfig, ServiceEndpoint};
use crate::error::{RdError, RdResult, TransportError};
use async_trait::async_trait;
use th_partner_types::{BranchCode, RegistrationField, RegistrationRecord, Tin, NOT_PROVIDED};
use tracing::{debug, warn};

const TIN_OPERATION: &str = "ServiceTIN";
const VAT_OPERATION: &str = "Service";

/// Existence indicator in the TIN/PIN service result
const EXISTS_FIELD: &str = "vIsExist";

/// Identity fields the lookup returns but nothing downstream reads
const UNUSED_IDENTITY_FIELDS: [RegistrationField; 3] = [
    RegistrationField::Name,
    RegistrationField::Surname,
    RegistrationField::BusinessFirstDate,
];

/// Verification and lookup as seen by the partner hooks
#[async_trait]
pub trait TinService: Send + Sync {
    /// True iff the registry knows this TIN/PIN
    async fn verify(&self, tin: &Tin) -> RdResult<bool>;

    /// Registered name and address for a TIN/branch. Empty when the registry
    /// reports an error (unless configured strict).
    async fn fetch(&self, tin: &Tin, branch: BranchCode) -> RdResult<RegistrationRecord>;
}

/// Client for the Revenue Department SOAP services
pub struct RdClient<T: SoapTransport = HttpTransport> {
    config: RdServiceConfig,
    transport: T,
}

impl RdClient<HttpTransport> {
    /// Create a client that talks HTTP using the configured certificate
    pub fn new(config: RdServiceConfig) -> Self {
        let transport = HttpTransport::new(config.certificate_path.clone(), config.request_timeout);
        Self { config, transport }
    }

    /// Create a client from `RD_*` environment variables
    pub fn from_env() -> RdResult<Self> {
        Ok(Self::new(RdServiceConfig::from_env()?))
    }
}

impl<T: SoapTransport> RdClient<T> {
    /// Create with an existing transport
    pub fn with_transport(config: RdServiceConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &RdServiceConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Check whether a TIN/PIN is registered
    pub async fn verify_tin(&self, tin: &Tin) -> RdResult<bool> {
        let endpoint = &self.config.tin_service;
        let request = SoapRequest::new(&endpoint.namespace, TIN_OPERATION)
            .param("username", &self.config.credentials.username)
            .param("password", &self.config.credentials.password)
            .param("TIN", tin);

        let body = self.call_with_fallback(endpoint, &request).await?;
        debug!(%tin, response = %body, "TIN service raw response");

        let fields = parse_response(TIN_OPERATION, &body)?;
        let exists = fields
            .get(EXISTS_FIELD)
            .and_then(RawField::first)
            .map(str::trim)
            .is_some_and(|v| !v.is_empty() && v != NOT_PROVIDED);

        debug!(%tin, exists, "TIN verification result");
        Ok(exists)
    }

    /// Fetch registered name and address data for a TIN and branch
    pub async fn fetch_registration(
        &self,
        tin: &Tin,
        branch: BranchCode,
    ) -> RdResult<RegistrationRecord> {
        let endpoint = &self.config.vat_service;
        // ProvinceCode and AmphurCode are reserved by the service; always 0
        let request = SoapRequest::new(&endpoint.namespace, VAT_OPERATION)
            .param("username", &self.config.credentials.username)
            .param("password", &self.config.credentials.password)
            .param("TIN", tin)
            .param("ProvinceCode", 0)
            .param("BranchNumber", branch.value())
            .param("AmphurCode", 0);

        let body = self.call_with_fallback(endpoint, &request).await?;
        debug!(%tin, %branch, response = %body, "VAT service raw response");

        let fields = parse_response(VAT_OPERATION, &body)?;

        if let Some(message) = fields
            .get(RegistrationField::ErrorMessage.wire_name())
            .and_then(RawField::first)
            .filter(|m| !m.trim().is_empty() && *m != NOT_PROVIDED)
        {
            if self.config.strict_remote_errors {
                return Err(RdError::RemoteData {
                    tin: tin.to_string(),
                    message: message.to_string(),
                });
            }
            warn!(%tin, %branch, error = message, "registry reported an error, treating as no data");
            return Ok(RegistrationRecord::new());
        }

        let record = filter_fields(&fields);
        debug!(
            %tin,
            %branch,
            record = %serde_json::to_string(&record).unwrap_or_default(),
            "filtered registration record"
        );
        Ok(record)
    }

    /// One pinned attempt, then one unverified attempt if and only if the
    /// first failed on TLS
    pub async fn call_with_fallback(
        &self,
        endpoint: &ServiceEndpoint,
        request: &SoapRequest,
    ) -> Result<String, TransportError> {
        match self.transport.post(endpoint, request, TlsMode::Pinned).await {
            Ok(body) => Ok(body),
            Err(TransportError::Tls(reason)) => {
                warn!(
                    operation = request.operation(),
                    url = %endpoint.url,
                    %reason,
                    "certificate check failed, retrying without TLS verification"
                );
                self.transport
                    .post(endpoint, request, TlsMode::Unverified)
                    .await
            }
            Err(other) => Err(other),
        }
    }
}

#[async_trait]
impl<T: SoapTransport> TinService for RdClient<T> {
    async fn verify(&self, tin: &Tin) -> RdResult<bool> {
        self.verify_tin(tin).await
    }

    async fn fetch(&self, tin: &Tin, branch: BranchCode) -> RdResult<RegistrationRecord> {
        self.fetch_registration(tin, branch).await
    }
}

/// Unwrap each field's first value, dropping nil, `"-"` and unused identity fields
fn filter_fields(fields: &SoapFields) -> RegistrationRecord {
    let mut record = RegistrationRecord::new();
    for (name, raw) in fields {
        let skipped = RegistrationField::from_wire(name)
            .is_some_and(|f| UNUSED_IDENTITY_FIELDS.contains(&f));
        if skipped {
            continue;
        }
        if let Some(value) = raw.first() {
            record.insert(name.clone(), value);
        }
    }
    record
}
