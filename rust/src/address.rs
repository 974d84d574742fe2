//! Thai address composition from a registration record
//!
//! Registry records carry granular components; partner records want the
//! conventional street / sub-district / district / postcode lines. Bangkok
//! uses แขวง and เขต where every other province uses ตำบล and อำเภอ.

use th_partner_types::{ComposedAddress, RegistrationField, RegistrationRecord};

/// Province value the registry uses for Bangkok
pub const CAPITAL_PROVINCE: &str = "กรุงเทพมหานคร";

/// Street line components in output order, with their labels
const STREET_COMPONENTS: [(RegistrationField, &str); 6] = [
    (RegistrationField::BuildingName, "อาคาร "),
    (RegistrationField::RoomNumber, "ห้องเลขที่ "),
    (RegistrationField::FloorNumber, "ชั้นที่ "),
    (RegistrationField::HouseNumber, "เลขที่ "),
    (RegistrationField::StreetName, "ถนน "),
    (RegistrationField::SoiName, "ซอย "),
];

const SUB_DISTRICT_PREFIX: &str = "ตำบล";
const CAPITAL_SUB_DISTRICT_PREFIX: &str = "แขวง";
const DISTRICT_PREFIX: &str = "อำเภอ";
const CAPITAL_DISTRICT_PREFIX: &str = "เขต";

/// Render address lines. Missing components are skipped, never rendered empty.
pub fn compose(record: &RegistrationRecord) -> ComposedAddress {
    let capital = is_capital(record);

    ComposedAddress {
        street: compose_street(record),
        street2: prefixed(
            record.get(RegistrationField::Thambol),
            if capital {
                CAPITAL_SUB_DISTRICT_PREFIX
            } else {
                SUB_DISTRICT_PREFIX
            },
        ),
        city: prefixed(
            record.get(RegistrationField::Amphur),
            if capital {
                CAPITAL_DISTRICT_PREFIX
            } else {
                DISTRICT_PREFIX
            },
        ),
        zip: record
            .get(RegistrationField::PostCode)
            .unwrap_or_default()
            .to_string(),
    }
}

/// Branch title and branch name joined by a single space
pub fn compose_company_name(record: &RegistrationRecord) -> String {
    [
        record.get(RegistrationField::BranchTitleName),
        record.get(RegistrationField::BranchName),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

fn compose_street(record: &RegistrationRecord) -> String {
    let mut street = String::new();
    for (field, label) in STREET_COMPONENTS {
        if let Some(value) = record.get(field) {
            street.push_str(label);
            street.push_str(value);
            street.push(' ');
        }
    }
    street.truncate(street.trim_end().len());
    street
}

fn is_capital(record: &RegistrationRecord) -> bool {
    record
        .get(RegistrationField::Province)
        .is_some_and(|p| p == CAPITAL_PROVINCE)
}

fn prefixed(value: Option<&str>, prefix: &str) -> String {
    value
        .map(|v| format!("{}{}", prefix, v))
        .unwrap_or_default()
}
