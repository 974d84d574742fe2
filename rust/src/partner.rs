//! Partner record hooks
//!
//! The host framework fires these when partner fields change and applies the
//! returned values to the record. They take the current field values as
//! arguments and never touch persistence themselves.
//!
//! ## VAT change cycle
//!
//! ```text
//! Idle --(not 13 digits)--> FormatInvalid: NoOp
//! Idle --> Verifying --(not registered)--> NotFound: Warning
//!              \--(registered)--> Found --> Fetched --> Composed: Updates
//! ```
//!
//! Every cycle returns to Idle. Transport failures during verification or
//! lookup end the cycle with an error.

use crate::address::{compose, compose_company_name};
use crate::error::RdResult;
use crate::rd::TinService;
use serde::{Deserialize, Serialize};
use th_partner_types::{BranchCode, Tin, ValidationError};
use tracing::{debug, info};

// =============================================================================
// VAT change
// =============================================================================

/// Stages of one VAT change cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationStage {
    Idle,
    FormatInvalid,
    Verifying,
    NotFound,
    Found,
    Fetched,
    Composed,
}

impl std::fmt::Display for VerificationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::FormatInvalid => write!(f, "format-invalid"),
            Self::Verifying => write!(f, "verifying"),
            Self::NotFound => write!(f, "verified-not-found"),
            Self::Found => write!(f, "verified-found"),
            Self::Fetched => write!(f, "fetched"),
            Self::Composed => write!(f, "composed"),
        }
    }
}

/// Field values to write back to the partner record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerUpdates {
    pub name_company: String,
    pub street: String,
    pub street2: String,
    pub city: String,
    pub zip: String,
}

/// User-facing warning shown instead of updating the record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerWarning {
    pub title: String,
    pub message: String,
}

impl PartnerWarning {
    pub fn tin_not_found(tin: &Tin) -> Self {
        Self {
            title: "Tax ID not found".to_string(),
            message: format!(
                "Taxpayer identification number {} is not registered with the Revenue Department.",
                tin
            ),
        }
    }
}

/// Outcome of a VAT field change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VatChange {
    NoOp,
    Warning(PartnerWarning),
    Updates(PartnerUpdates),
}

/// React to a change of the partner's VAT (TIN/PIN) field.
///
/// Values that are not exactly 13 digits are ignored without any network
/// call. An unregistered number produces a warning and no field updates.
pub async fn on_vat_change<S>(
    service: &S,
    vat: Option<&str>,
    branch: BranchCode,
) -> RdResult<VatChange>
where
    S: TinService + ?Sized,
{
    let outcome = run_vat_change(service, vat, branch).await;
    debug!(
        stage = %VerificationStage::Idle,
        failed = outcome.is_err(),
        "VAT change cycle finished"
    );
    outcome
}

async fn run_vat_change<S>(
    service: &S,
    vat: Option<&str>,
    branch: BranchCode,
) -> RdResult<VatChange>
where
    S: TinService + ?Sized,
{
    let Some(tin) = vat.and_then(|v| Tin::parse(v).ok()) else {
        debug!(stage = %VerificationStage::FormatInvalid, "VAT value is not a TIN, nothing to do");
        return Ok(VatChange::NoOp);
    };

    debug!(stage = %VerificationStage::Verifying, %tin, "verifying TIN");
    if !service.verify(&tin).await? {
        debug!(stage = %VerificationStage::NotFound, %tin, "TIN not registered");
        return Ok(VatChange::Warning(PartnerWarning::tin_not_found(&tin)));
    }

    debug!(stage = %VerificationStage::Found, %tin, %branch, "fetching registration");
    let record = service.fetch(&tin, branch).await?;
    debug!(stage = %VerificationStage::Fetched, %tin, fields = record.len(), "registration fetched");

    let address = compose(&record);
    let updates = PartnerUpdates {
        name_company: compose_company_name(&record),
        street: address.street,
        street2: address.street2,
        city: address.city,
        zip: address.zip,
    };
    debug!(stage = %VerificationStage::Composed, %tin, "address composed");

    Ok(VatChange::Updates(updates))
}

/// Record constraint on the stored branch field
pub fn validate_branch(branch: &str) -> Result<BranchCode, ValidationError> {
    BranchCode::parse_stored(branch)
}

// =============================================================================
// Naming
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyType {
    Person,
    Company,
}

/// Field the host should clear after a company type switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearedField {
    Title,
    PartnerCompanyType,
}

/// Companies have no personal title; people have no company type
pub fn on_company_type_change(company_type: CompanyType) -> ClearedField {
    match company_type {
        CompanyType::Company => ClearedField::Title,
        CompanyType::Person => ClearedField::PartnerCompanyType,
    }
}

/// Display name of a company: legal-form prefix, name, legal-form suffix
pub fn company_display_name(
    prefix: Option<&str>,
    name_company: Option<&str>,
    suffix: Option<&str>,
) -> String {
    join_present(&[prefix, name_company, suffix])
}

/// Display name of a person: title in front of the computed first/last name
pub fn person_display_name(title: Option<&str>, computed: Option<&str>) -> Option<String> {
    let computed = computed.filter(|n| !n.is_empty())?;
    match title.filter(|t| !t.is_empty()) {
        Some(title) => Some(format!("{} {}", title, computed)),
        None => Some(computed.to_string()),
    }
}

/// `name_company` follows the record name for companies and is unset otherwise
pub fn inverse_name_company(is_company: bool, name: Option<&str>) -> Option<String> {
    match name {
        Some(name) if is_company && !name.is_empty() => Some(name.to_string()),
        _ => None,
    }
}

/// `name_company` to store when a partner is created
pub fn name_company_on_create(
    is_company: bool,
    name: Option<&str>,
    default_name: Option<&str>,
) -> Option<String> {
    inverse_name_company(is_company, name.or(default_name))
}

/// Name fields of an existing partner, as read by the install-time backfill
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerNames {
    pub is_company: bool,
    pub name: Option<String>,
    pub name_company: Option<String>,
}

/// Fill `name_company` on partners that lack one. Returns how many were touched.
pub fn backfill_name_company(partners: &mut [PartnerNames]) -> usize {
    let mut updated = 0;
    for partner in partners.iter_mut().filter(|p| p.name_company.is_none()) {
        partner.name_company = inverse_name_company(partner.is_company, partner.name.as_deref());
        updated += 1;
    }
    info!("{} partners updated installing module.", updated);
    updated
}

fn join_present(parts: &[Option<&str>]) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}
