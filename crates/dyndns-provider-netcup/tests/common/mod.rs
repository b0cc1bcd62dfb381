//! In-process fake of the netcup CCP JSON endpoint
//!
//! Serves the four actions the provider uses, keeps one record list per
//! process and counts calls per action so tests can assert on traffic.

#![allow(dead_code)]

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use dyndns_provider_netcup::NetcupProvider;
use dyndns_provider_netcup::api::NetcupRecord;
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CUSTOMER: &str = "12345";
pub const API_KEY: &str = "test-api-key";
pub const API_PASSWORD: &str = "test-api-password";
pub const DOMAIN: &str = "example.com";

#[derive(Default)]
pub struct FakeState {
    records: Mutex<Vec<NetcupRecord>>,
    calls: Mutex<HashMap<String, usize>>,
    sessions: Mutex<HashSet<String>>,
    next_session: AtomicUsize,
    login_delay: Mutex<Duration>,
    reject_login: AtomicBool,
    rate_limited: AtomicBool,
    malformed_records: AtomicBool,
    last_update: Mutex<Option<Vec<NetcupRecord>>>,
}

/// A running fake CCP server
pub struct FakeCcp {
    pub endpoint: String,
    pub state: Arc<FakeState>,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for FakeCcp {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl FakeCcp {
    pub async fn start(records: Vec<NetcupRecord>) -> Self {
        let state = Arc::new(FakeState::default());
        *state.records.lock().unwrap() = records;

        let app = Router::new()
            .route("/", post(handle))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{addr}/"),
            state,
            task,
        }
    }

    pub fn provider(&self) -> NetcupProvider {
        NetcupProvider::new(CUSTOMER, API_KEY, API_PASSWORD)
            .unwrap()
            .with_endpoint(&self.endpoint)
    }

    pub fn calls(&self, action: &str) -> usize {
        self.state.calls.lock().unwrap().get(action).copied().unwrap_or(0)
    }

    pub fn records(&self) -> Vec<NetcupRecord> {
        self.state.records.lock().unwrap().clone()
    }

    /// The record list sent by the last `updateDnsRecords`
    pub fn last_update(&self) -> Option<Vec<NetcupRecord>> {
        self.state.last_update.lock().unwrap().clone()
    }

    pub fn set_login_delay(&self, delay: Duration) {
        *self.state.login_delay.lock().unwrap() = delay;
    }

    pub fn reject_login(&self, reject: bool) {
        self.state.reject_login.store(reject, Ordering::SeqCst);
    }

    pub fn set_rate_limited(&self, limited: bool) {
        self.state.rate_limited.store(limited, Ordering::SeqCst);
    }

    /// Answer `infoDnsRecords` with a record list of the wrong shape
    pub fn set_malformed_records(&self, malformed: bool) {
        self.state.malformed_records.store(malformed, Ordering::SeqCst);
    }

    /// Forget every issued session, as the backend does after its timeout
    pub fn expire_sessions(&self) {
        self.state.sessions.lock().unwrap().clear();
    }

    pub fn active_sessions(&self) -> usize {
        self.state.sessions.lock().unwrap().len()
    }
}

pub fn record(id: &str, hostname: &str, record_type: &str, destination: &str) -> NetcupRecord {
    NetcupRecord {
        id: Some(id.to_string()),
        hostname: hostname.to_string(),
        record_type: record_type.to_string(),
        priority: Some("0".to_string()),
        destination: destination.to_string(),
        deleterecord: false,
        state: Some("yes".to_string()),
    }
}

fn success(action: &str, data: Value) -> Json<Value> {
    Json(json!({
        "serverrequestid": "srv",
        "clientrequestid": "",
        "action": action,
        "status": "success",
        "statuscode": 2000,
        "shortmessage": "ok",
        "longmessage": "",
        "responsedata": data,
    }))
}

fn failure(action: &str, code: i64, message: &str) -> Json<Value> {
    Json(json!({
        "serverrequestid": "srv",
        "clientrequestid": "",
        "action": action,
        "status": "error",
        "statuscode": code,
        "shortmessage": message,
        "longmessage": message,
        "responsedata": "",
    }))
}

async fn handle(State(state): State<Arc<FakeState>>, Json(request): Json<Value>) -> Json<Value> {
    let action = request["action"].as_str().unwrap_or_default().to_string();
    let param = &request["param"];
    *state.calls.lock().unwrap().entry(action.clone()).or_default() += 1;

    if state.rate_limited.load(Ordering::SeqCst) {
        return failure(&action, 4013, "Api rate limit reached");
    }

    if action == "login" {
        let delay = *state.login_delay.lock().unwrap();
        tokio::time::sleep(delay).await;

        let credentials_ok = param["customernumber"] == CUSTOMER
            && param["apikey"] == API_KEY
            && param["apipassword"] == API_PASSWORD;
        if !credentials_ok || state.reject_login.load(Ordering::SeqCst) {
            return failure(&action, 4010, "Login failed");
        }

        let id = format!("session-{}", state.next_session.fetch_add(1, Ordering::SeqCst));
        state.sessions.lock().unwrap().insert(id.clone());
        return success(&action, json!({ "apisessionid": id }));
    }

    let session = param["apisessionid"].as_str().unwrap_or_default().to_string();
    if !state.sessions.lock().unwrap().contains(&session) {
        return failure(&action, 4001, "The session id is not in a valid format or expired");
    }

    match action.as_str() {
        "infoDnsRecords" if state.malformed_records.load(Ordering::SeqCst) => {
            success(&action, json!({ "dnsrecords": "maintenance" }))
        }
        "infoDnsRecords" => {
            let records = state.records.lock().unwrap().clone();
            success(&action, json!({ "dnsrecords": records }))
        }
        "updateDnsRecords" => {
            let submitted: Vec<NetcupRecord> =
                serde_json::from_value(param["dnsrecordset"]["dnsrecords"].clone()).unwrap();

            let mut next_id = 1000;
            let stored: Vec<NetcupRecord> = submitted
                .iter()
                .cloned()
                .map(|mut r| {
                    if r.id.is_none() {
                        next_id += 1;
                        r.id = Some(next_id.to_string());
                    }
                    r
                })
                .collect();

            *state.last_update.lock().unwrap() = Some(submitted);
            *state.records.lock().unwrap() = stored.clone();
            success(&action, json!({ "dnsrecords": stored }))
        }
        "logout" => {
            state.sessions.lock().unwrap().remove(&session);
            success(&action, Value::Null)
        }
        _ => failure(&action, 4000, "unknown action"),
    }
}
