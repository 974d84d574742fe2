//! Thai Partner Types - Level 1 Foundation Types
//!
//! Pure data structures shared by the Revenue Department client and the
//! partner hooks. Nothing in this crate touches the network or logs.
//!
//! ## Contents
//!
//! - [`Tin`]: 13-digit Taxpayer / Personal Identification Number
//! - [`BranchCode`]: business location sub-registration under one TIN
//! - [`RegistrationField`] / [`RegistrationRecord`]: registry lookup result
//! - [`ComposedAddress`]: address lines rendered from a registration record
//!
//! A registration record never holds the registry's `"-"` placeholder: values
//! are normalized on insert so downstream code only sees real data.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

/// Format failures for identifiers entered on a partner record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid identification number '{0}': expected exactly 13 digits")]
    InvalidTin(String),

    #[error("Invalid branch code '{0}': expected exactly 5 digits")]
    InvalidBranch(String),
}

// ============================================================================
// IDENTIFICATION NUMBER
// ============================================================================

/// Taxpayer Identification Number or Personal Identification Number.
///
/// Always exactly 13 ASCII digits. Construction is the only place the format
/// is checked, so holding a `Tin` means the value is safe to send.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tin(String);

impl Tin {
    /// Number of digits in a TIN/PIN
    pub const LEN: usize = 13;

    /// Parse a TIN, rejecting anything that is not exactly 13 ASCII digits
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if value.len() == Self::LEN && value.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(value.to_string()))
        } else {
            Err(ValidationError::InvalidTin(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Tin {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Tin {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Tin> for String {
    fn from(tin: Tin) -> Self {
        tin.0
    }
}

impl AsRef<str> for Tin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// BRANCH CODE
// ============================================================================

/// Branch number under a TIN. `0` is the head office.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BranchCode(u32);

impl BranchCode {
    /// Head office
    pub const HEAD_OFFICE: BranchCode = BranchCode(0);

    /// Digits in the stored (zero-padded) form of a branch code
    pub const STORED_LEN: usize = 5;

    pub fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Parse the stored form of a branch code (`"00000"`, `"00012"`, ...).
    ///
    /// This is the record constraint on persisted branch values and is
    /// stricter than what the registry accepts.
    pub fn parse_stored(value: &str) -> Result<Self, ValidationError> {
        if value.len() != Self::STORED_LEN || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidBranch(value.to_string()));
        }
        value
            .parse::<u32>()
            .map(Self)
            .map_err(|_| ValidationError::InvalidBranch(value.to_string()))
    }
}

impl fmt::Display for BranchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl From<u32> for BranchCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

// ============================================================================
// REGISTRATION RECORD
// ============================================================================

/// Placeholder the registry uses for "no value"
pub const NOT_PROVIDED: &str = "-";

/// Fields returned by the VAT registry lookup, keyed by their wire names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegistrationField {
    Nid,
    Tin,
    TitleName,
    Name,
    Surname,
    BranchTitleName,
    BranchName,
    BranchNumber,
    BuildingName,
    FloorNumber,
    VillageName,
    RoomNumber,
    HouseNumber,
    MooNumber,
    SoiName,
    StreetName,
    Thambol,
    Amphur,
    Province,
    PostCode,
    BusinessFirstDate,
    ErrorMessage,
}

impl RegistrationField {
    pub const ALL: [RegistrationField; 22] = [
        Self::Nid,
        Self::Tin,
        Self::TitleName,
        Self::Name,
        Self::Surname,
        Self::BranchTitleName,
        Self::BranchName,
        Self::BranchNumber,
        Self::BuildingName,
        Self::FloorNumber,
        Self::VillageName,
        Self::RoomNumber,
        Self::HouseNumber,
        Self::MooNumber,
        Self::SoiName,
        Self::StreetName,
        Self::Thambol,
        Self::Amphur,
        Self::Province,
        Self::PostCode,
        Self::BusinessFirstDate,
        Self::ErrorMessage,
    ];

    /// Element name used by the registry web service
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Nid => "vNID",
            Self::Tin => "vtin",
            Self::TitleName => "vtitleName",
            Self::Name => "vName",
            Self::Surname => "vSurname",
            Self::BranchTitleName => "vBranchTitleName",
            Self::BranchName => "vBranchName",
            Self::BranchNumber => "vBranchNumber",
            Self::BuildingName => "vBuildingName",
            Self::FloorNumber => "vFloorNumber",
            Self::VillageName => "vVillageName",
            Self::RoomNumber => "vRoomNumber",
            Self::HouseNumber => "vHouseNumber",
            Self::MooNumber => "vMooNumber",
            Self::SoiName => "vSoiName",
            Self::StreetName => "vStreetName",
            Self::Thambol => "vThambol",
            Self::Amphur => "vAmphur",
            Self::Province => "vProvince",
            Self::PostCode => "vPostCode",
            Self::BusinessFirstDate => "vBusinessFirstDate",
            Self::ErrorMessage => "vmsgerr",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }
}

impl fmt::Display for RegistrationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Registered name and address data for one TIN/branch, keyed by wire name.
///
/// Absent keys mean "not provided". Blank values and the `"-"` placeholder
/// are dropped on insert, including when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct RegistrationRecord {
    fields: BTreeMap<String, String>,
}

impl From<BTreeMap<String, String>> for RegistrationRecord {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut record = Self::new();
        for (name, value) in raw {
            record.insert(name, value);
        }
        record
    }
}

impl From<RegistrationRecord> for BTreeMap<String, String> {
    fn from(record: RegistrationRecord) -> Self {
        record.fields
    }
}

impl RegistrationRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under its wire name. Returns false if the value was dropped.
    pub fn insert(&mut self, name: impl Into<String>, value: impl AsRef<str>) -> bool {
        let value = value.as_ref().trim();
        if value.is_empty() || value == NOT_PROVIDED {
            return false;
        }
        self.fields.insert(name.into(), value.to_string());
        true
    }

    /// Builder-style insert for a known field
    pub fn with(mut self, field: RegistrationField, value: impl AsRef<str>) -> Self {
        self.insert(field.wire_name(), value);
        self
    }

    pub fn get(&self, field: RegistrationField) -> Option<&str> {
        self.get_raw(field.wire_name())
    }

    /// Look up by wire name, including names this crate has no variant for
    pub fn get_raw(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, field: RegistrationField) -> bool {
        self.get(field).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

// ============================================================================
// COMPOSED ADDRESS
// ============================================================================

/// Address lines written back to the partner record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedAddress {
    /// Building, room, floor, house number, street and soi
    pub street: String,
    /// Sub-district (ตำบล / แขวง)
    pub street2: String,
    /// District (อำเภอ / เขต)
    pub city: String,
    pub zip: String,
}

impl ComposedAddress {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.street2.is_empty()
            && self.city.is_empty()
            && self.zip.is_empty()
    }
}
