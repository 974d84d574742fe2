//! Test doubles and response fixtures for the VAT change tests
//!
//! Nothing here touches the network: `MockTinService` stands in for the
//! verifier and fetcher, `ScriptedTransport` replays canned SOAP bodies.

#![allow(dead_code)]

use async_trait::async_trait;
use l10n_th_partner::{
    BranchCode, RdResult, RegistrationRecord, ServiceEndpoint, SoapTransport, Tin, TinService,
    TlsMode, TransportError,
};
use l10n_th_partner::rd::SoapRequest;
use std::collections::VecDeque;
use std::sync::Mutex;

// =============================================================================
// TinService double
// =============================================================================

/// Returns a fixed verification answer and record, counting calls
pub struct MockTinService {
    exists: bool,
    record: RegistrationRecord,
    verify_calls: Mutex<Vec<String>>,
    fetch_calls: Mutex<Vec<(String, BranchCode)>>,
}

impl MockTinService {
    pub fn registered(record: RegistrationRecord) -> Self {
        Self {
            exists: true,
            record,
            verify_calls: Mutex::new(Vec::new()),
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unregistered() -> Self {
        Self {
            exists: false,
            ..Self::registered(RegistrationRecord::new())
        }
    }

    pub fn verify_calls(&self) -> Vec<String> {
        self.verify_calls.lock().unwrap().clone()
    }

    pub fn fetch_calls(&self) -> Vec<(String, BranchCode)> {
        self.fetch_calls.lock().unwrap().clone()
    }

    pub fn total_calls(&self) -> usize {
        self.verify_calls().len() + self.fetch_calls().len()
    }
}

#[async_trait]
impl TinService for MockTinService {
    async fn verify(&self, tin: &Tin) -> RdResult<bool> {
        self.verify_calls.lock().unwrap().push(tin.to_string());
        Ok(self.exists)
    }

    async fn fetch(&self, tin: &Tin, branch: BranchCode) -> RdResult<RegistrationRecord> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push((tin.to_string(), branch));
        Ok(self.record.clone())
    }
}

// =============================================================================
// SoapTransport double
// =============================================================================

/// One recorded transport attempt
#[derive(Debug, Clone)]
pub struct Attempt {
    pub url: String,
    pub operation: String,
    pub mode: TlsMode,
}

/// Replays scripted outcomes in order and records every attempt
pub struct ScriptedTransport {
    outcomes: Mutex<VecDeque<Result<String, TransportError>>>,
    attempts: Mutex<Vec<Attempt>>,
}

impl ScriptedTransport {
    pub fn new(outcomes: Vec<Result<String, TransportError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn attempts(&self) -> Vec<Attempt> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn modes(&self) -> Vec<TlsMode> {
        self.attempts().into_iter().map(|a| a.mode).collect()
    }
}

#[async_trait]
impl SoapTransport for ScriptedTransport {
    async fn post(
        &self,
        endpoint: &ServiceEndpoint,
        request: &SoapRequest,
        mode: TlsMode,
    ) -> Result<String, TransportError> {
        self.attempts.lock().unwrap().push(Attempt {
            url: endpoint.url.to_string(),
            operation: request.operation().to_string(),
            mode,
        });
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Tls("no scripted outcome left".into())))
    }
}

pub fn tls_failure() -> Result<String, TransportError> {
    Err(TransportError::Tls("invalid peer certificate: UnknownIssuer".into()))
}

// =============================================================================
// Fixtures
// =============================================================================

pub const VALID_TIN: &str = "0105536112014";

pub fn tin_exists_response() -> String {
    envelope(
        "ServiceTIN",
        r#"<vIsExist><anyType xsi:type="xsd:string">Yes</anyType></vIsExist>
           <vDigitOk><anyType xsi:type="xsd:string">Yes</anyType></vDigitOk>
           <vmsgerr xsi:nil="true"/>"#,
    )
}

pub fn tin_missing_response() -> String {
    envelope(
        "ServiceTIN",
        r#"<vIsExist xsi:nil="true"/><vmsgerr xsi:nil="true"/>"#,
    )
}

/// Bangkok head office with a `"-"` soi and no floor
pub fn bangkok_registration_response() -> String {
    envelope(
        "Service",
        r#"<vNID><anyType xsi:type="xsd:string">0105536112014</anyType></vNID>
           <vtitleName><anyType xsi:type="xsd:string">บริษัท</anyType></vtitleName>
           <vName><anyType xsi:type="xsd:string">ทดสอบ</anyType></vName>
           <vSurname><anyType xsi:type="xsd:string">-</anyType></vSurname>
           <vBranchTitleName><anyType xsi:type="xsd:string">บริษัท ทดสอบ</anyType></vBranchTitleName>
           <vBranchName><anyType xsi:type="xsd:string">จำกัด</anyType></vBranchName>
           <vBranchNumber><anyType xsi:type="xsd:int">0</anyType></vBranchNumber>
           <vBuildingName><anyType xsi:type="xsd:string">อาคารทดสอบ</anyType></vBuildingName>
           <vFloorNumber><anyType xsi:type="xsd:string">-</anyType></vFloorNumber>
           <vVillageName><anyType xsi:type="xsd:string">-</anyType></vVillageName>
           <vRoomNumber><anyType xsi:type="xsd:string">-</anyType></vRoomNumber>
           <vHouseNumber><anyType xsi:type="xsd:string">1</anyType></vHouseNumber>
           <vMooNumber><anyType xsi:type="xsd:string">-</anyType></vMooNumber>
           <vSoiName><anyType xsi:type="xsd:string">-</anyType></vSoiName>
           <vStreetName><anyType xsi:type="xsd:string">สุขุมวิท</anyType></vStreetName>
           <vThambol><anyType xsi:type="xsd:string">คลองตัน</anyType></vThambol>
           <vAmphur><anyType xsi:type="xsd:string">วัฒนา</anyType></vAmphur>
           <vProvince><anyType xsi:type="xsd:string">กรุงเทพมหานคร</anyType></vProvince>
           <vPostCode><anyType xsi:type="xsd:string">10110</anyType></vPostCode>
           <vBusinessFirstDate><anyType xsi:type="xsd:string">2536/01/01</anyType></vBusinessFirstDate>
           <vmsgerr xsi:nil="true"/>"#,
    )
}

/// Populated fields alongside an error message
pub fn registration_error_response() -> String {
    envelope(
        "Service",
        r#"<vBranchName><anyType xsi:type="xsd:string">จำกัด</anyType></vBranchName>
           <vProvince><anyType xsi:type="xsd:string">กรุงเทพมหานคร</anyType></vProvince>
           <vPostCode><anyType xsi:type="xsd:string">10110</anyType></vPostCode>
           <vmsgerr><anyType xsi:type="xsd:string">ไม่พบข้อมูลผู้ประกอบการ</anyType></vmsgerr>"#,
    )
}

fn envelope(operation: &str, result: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:xsd="http://www.w3.org/2001/XMLSchema">
  <soap:Body>
    <{op}Response xmlns="https://rdws.rd.go.th/serviceRD3/">
      <{op}Result>{result}</{op}Result>
    </{op}Response>
  </soap:Body>
</soap:Envelope>"#,
        op = operation,
        result = result
    )
}
