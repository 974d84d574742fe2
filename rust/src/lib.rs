//! Thai partner localization
//!
//! Verifies Taxpayer / Personal Identification Numbers against the Revenue
//! Department web services and turns the registered address into the
//! partner's address lines.
//!
//! ## Call chain
//! VAT field change -> [`partner::on_vat_change`] -> [`rd::TinService::verify`]
//! -> [`rd::TinService::fetch`] -> [`address::compose`] -> field updates
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use l10n_th_partner::{on_vat_change, BranchCode, RdClient, RdServiceConfig, VatChange};
//!
//! # async fn run() -> l10n_th_partner::RdResult<()> {
//! let client = RdClient::new(RdServiceConfig::from_env()?);
//! match on_vat_change(&client, Some("0105536112014"), BranchCode::HEAD_OFFICE).await? {
//!     VatChange::Updates(updates) => println!("{}", updates.street),
//!     VatChange::Warning(warning) => eprintln!("{}: {}", warning.title, warning.message),
//!     VatChange::NoOp => {}
//! }
//! # Ok(())
//! # }
//! ```

// Core error handling
pub mod error;

// Injected endpoints, credentials and trust material
pub mod config;

// Revenue Department SOAP client
pub mod rd;

// Address composition
pub mod address;

// Host hooks for partner records
pub mod partner;

pub use address::{compose, compose_company_name, CAPITAL_PROVINCE};
pub use config::{Credentials, RdServiceConfig, ServiceEndpoint};
pub use error::{RdError, RdResult, TransportError};
pub use partner::{on_vat_change, PartnerUpdates, PartnerWarning, VatChange, VerificationStage};
pub use rd::{HttpTransport, RdClient, SoapTransport, TinService, TlsMode};

// Foundation types
pub use th_partner_types::{
    BranchCode, ComposedAddress, RegistrationField, RegistrationRecord, Tin, ValidationError,
};
