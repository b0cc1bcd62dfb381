//! netcup CCP JSON API wire types
//!
//! Every call is a `POST` of `{"action": ..., "param": {...}}` to a single
//! endpoint; every answer is the same envelope with an action-specific
//! `responsedata` payload.

use dyndns_core::RecordType;
use serde::{Deserialize, Serialize};

/// Backend status code for "too many requests" (180 requests per minute)
pub const RATE_LIMIT_STATUS_CODE: i64 = 4013;

/// Backend status code for an unknown or expired session id
pub const SESSION_INVALID_STATUS_CODE: i64 = 4001;

/// Request envelope
#[derive(Debug, Serialize)]
pub struct ApiRequest<'a, P: Serialize> {
    pub action: &'a str,
    pub param: P,
}

#[derive(Serialize)]
pub struct LoginParams<'a> {
    pub customernumber: &'a str,
    pub apikey: &'a str,
    pub apipassword: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionParams {
    pub customernumber: String,
    pub apikey: String,
    pub apisessionid: String,
}

#[derive(Serialize)]
pub struct InfoDnsRecordsParams {
    pub domainname: String,
    #[serde(flatten)]
    pub session: SessionParams,
}

#[derive(Serialize)]
pub struct UpdateDnsRecordsParams {
    pub domainname: String,
    pub dnsrecordset: NetcupRecordSet,
    #[serde(flatten)]
    pub session: SessionParams,
}

/// Response envelope
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub serverrequestid: String,
    #[serde(default)]
    pub clientrequestid: String,
    #[serde(default)]
    pub action: String,
    pub status: String,
    #[serde(default)]
    pub statuscode: i64,
    #[serde(default)]
    pub shortmessage: String,
    #[serde(default)]
    pub longmessage: String,
    #[serde(default)]
    pub responsedata: serde_json::Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    pub apisessionid: String,
}

/// A DNS record as the CCP API represents it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetcupRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub hostname: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    pub destination: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleterecord: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl NetcupRecord {
    /// Whether this record is the one addressed by (label, type)
    pub fn matches(&self, label: &str, record_type: &RecordType) -> bool {
        self.hostname.eq_ignore_ascii_case(label) && record_type.matches(&self.record_type)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetcupRecordSet {
    #[serde(default)]
    pub dnsrecords: Vec<NetcupRecord>,
}
