//! Shared fixtures: an in-memory platform and store helpers

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rulectl_core::remote::{
    Method, RemoteClient, RemoteRequest, RemoteResponse, RetryPolicy, Shutdown, Transport,
    TransportError,
};
use rulectl_core::{LocalStore, SyncClient, Workspace};
use rulectl_fs::NormalizedPath;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const ORG: &str = "org-1";

/// Scripted failure returned instead of normal routing.
struct Fault {
    method: Method,
    path_prefix: String,
    outcome: Result<RemoteResponse, TransportError>,
    remaining: usize,
}

#[derive(Default)]
struct PlatformState {
    next_id: u64,
    rulesets: BTreeMap<String, Value>,
    rules: BTreeMap<String, Value>,
    tags: BTreeMap<String, Value>,
    faults: Vec<Fault>,
    requests: Vec<RemoteRequest>,
    page_size: Option<usize>,
}

/// In-memory stand-in for the rules API.
#[derive(Default)]
pub struct FakePlatform {
    state: Mutex<PlatformState>,
}

impl FakePlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed_ruleset(&self, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.allocate("rs");
        state.rulesets.insert(
            id.clone(),
            json!({"id": id, "name": name, "description": "", "createdAt": "2020-01-01"}),
        );
        id
    }

    pub fn seed_rule(&self, ruleset: &str, name: &str) -> String {
        let mut state = self.state.lock().unwrap();
        let id = state.allocate("r");
        state.rules.insert(
            id.clone(),
            json!({
                "id": id,
                "rulesetId": ruleset,
                "name": name,
                "type": "File",
                "severityOfAlerts": 3,
                "updatedAt": "2020-01-01"
            }),
        );
        id
    }

    pub fn seed_tags(&self, rule: &str, tags: Value) {
        self.state.lock().unwrap().tags.insert(rule.to_string(), tags);
    }

    /// Answer the next `times` matching requests with `status`.
    pub fn fail(&self, method: Method, path_prefix: &str, status: u16, times: usize) {
        let response = RemoteResponse::new(status, json!({"errors": [format!("injected {status}")]}));
        self.fail_with(method, path_prefix, Ok(response), times);
    }

    pub fn fail_with(
        &self,
        method: Method,
        path_prefix: &str,
        outcome: Result<RemoteResponse, TransportError>,
        times: usize,
    ) {
        self.state.lock().unwrap().faults.push(Fault {
            method,
            path_prefix: path_prefix.to_string(),
            outcome,
            remaining: times,
        });
    }

    /// Split listings into pages of `size` items.
    pub fn paginate(&self, size: usize) {
        self.state.lock().unwrap().page_size = Some(size);
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: Method, path_prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(path_prefix))
            .count()
    }

    pub fn ruleset_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state
            .rulesets
            .values()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn rule_names(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        let mut names: Vec<String> = state
            .rules
            .values()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    pub fn rule_by_name(&self, name: &str) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.rules.values().find(|r| r["name"] == name).cloned()
    }

    pub fn tags_of(&self, rule: &str) -> Option<Value> {
        self.state.lock().unwrap().tags.get(rule).cloned()
    }
}

impl PlatformState {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    fn take_fault(&mut self, request: &RemoteRequest) -> Option<Result<RemoteResponse, TransportError>> {
        let fault = self.faults.iter_mut().find(|f| {
            f.remaining > 0 && f.method == request.method && request.path.starts_with(&f.path_prefix)
        })?;
        fault.remaining -= 1;
        Some(fault.outcome.clone())
    }

    fn page(&self, field: &str, items: Vec<Value>, request: &RemoteRequest) -> RemoteResponse {
        let start: usize = request
            .query
            .iter()
            .find(|(k, _)| k == "token")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        let size = self.page_size.unwrap_or(usize::MAX);
        let end = start.saturating_add(size).min(items.len());
        let token = if end < items.len() { end.to_string() } else { String::new() };
        RemoteResponse::new(200, json!({ field: items[start..end].to_vec(), "token": token }))
    }

    fn name_taken(&self, collection: &BTreeMap<String, Value>, name: &Value, except: Option<&str>) -> bool {
        collection
            .iter()
            .any(|(id, doc)| Some(id.as_str()) != except && doc["name"] == *name)
    }

    fn route(&mut self, request: &RemoteRequest) -> RemoteResponse {
        let segments: Vec<&str> = request.path.trim_matches('/').split('/').collect();
        let body = request.body.clone().unwrap_or(Value::Null);
        let not_found = || RemoteResponse::new(404, json!({"errors": ["not found"]}));
        let conflict = || RemoteResponse::new(400, json!({"errors": ["name already exists"]}));

        match (request.method, segments.as_slice()) {
            (Method::Get, ["rulesets"]) => {
                let items = self.rulesets.values().cloned().collect();
                self.page("rulesets", items, request)
            }
            (Method::Post, ["rulesets"]) => {
                if self.name_taken(&self.rulesets, &body["name"], None) {
                    return conflict();
                }
                let id = self.allocate("rs");
                let mut doc = body;
                doc["id"] = json!(id);
                self.rulesets.insert(id, doc.clone());
                RemoteResponse::new(200, doc)
            }
            (Method::Put, ["rulesets", id]) => {
                if !self.rulesets.contains_key(*id) {
                    return not_found();
                }
                if self.name_taken(&self.rulesets, &body["name"], Some(*id)) {
                    return conflict();
                }
                let mut doc = body;
                doc["id"] = json!(id);
                self.rulesets.insert(id.to_string(), doc.clone());
                RemoteResponse::new(200, doc)
            }
            (Method::Delete, ["rulesets", id]) => {
                if self.rulesets.remove(*id).is_none() {
                    return not_found();
                }
                self.rules.retain(|_, r| r["rulesetId"] != *id);
                RemoteResponse::new(200, json!({}))
            }
            (Method::Get, ["rulesets", id, "rules"]) => {
                if !self.rulesets.contains_key(*id) {
                    return not_found();
                }
                let items = self
                    .rules
                    .values()
                    .filter(|r| r["rulesetId"] == *id)
                    .cloned()
                    .collect();
                self.page("rules", items, request)
            }
            (Method::Post, ["rulesets", id, "rules"]) => {
                if !self.rulesets.contains_key(*id) {
                    return not_found();
                }
                if self.name_taken(&self.rules, &body["name"], None) {
                    return conflict();
                }
                let rule_id = self.allocate("r");
                let mut doc = body;
                doc["id"] = json!(rule_id);
                doc["rulesetId"] = json!(id);
                self.rules.insert(rule_id, doc.clone());
                RemoteResponse::new(200, doc)
            }
            (Method::Put, ["rulesets", id, "rules", rule_id]) => {
                if !self.rules.contains_key(*rule_id) {
                    return not_found();
                }
                if self.name_taken(&self.rules, &body["name"], Some(*rule_id)) {
                    return conflict();
                }
                let mut doc = body;
                doc["id"] = json!(rule_id);
                doc["rulesetId"] = json!(id);
                self.rules.insert(rule_id.to_string(), doc.clone());
                RemoteResponse::new(200, doc)
            }
            (Method::Delete, ["rulesets", _, "rules", rule_id]) => {
                if self.rules.remove(*rule_id).is_none() {
                    return not_found();
                }
                self.tags.remove(*rule_id);
                RemoteResponse::new(200, json!({}))
            }
            (Method::Get, ["rules", rule_id, "tags"]) => {
                if !self.rules.contains_key(*rule_id) {
                    return not_found();
                }
                let mut tags = self.tags.get(*rule_id).cloned().unwrap_or_else(|| json!({}));
                tags["errors"] = json!([]);
                RemoteResponse::new(200, tags)
            }
            (Method::Post, ["rules", rule_id, "tags"]) => {
                if !self.rules.contains_key(*rule_id) {
                    return not_found();
                }
                self.tags.insert(rule_id.to_string(), body.clone());
                RemoteResponse::new(200, body)
            }
            _ => not_found(),
        }
    }
}

#[async_trait]
impl Transport for FakePlatform {
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(request.clone());
        if let Some(outcome) = state.take_fault(request) {
            return outcome;
        }
        Ok(state.route(request))
    }
}

/// Retry policy with short, deterministic delays.
pub fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_rate_limit_attempts: 5,
        max_unavailable_attempts: 3,
        initial_backoff: Duration::from_millis(10),
        max_backoff: Duration::from_millis(100),
        multiplier: 2.0,
    }
}

pub fn client(platform: &Arc<FakePlatform>) -> RemoteClient {
    client_with(platform, Shutdown::never())
}

pub fn client_with(platform: &Arc<FakePlatform>, shutdown: Shutdown) -> RemoteClient {
    let transport: Arc<dyn Transport> = platform.clone();
    RemoteClient::new(transport, fast_policy(), shutdown)
}

pub fn sync_client(platform: &Arc<FakePlatform>) -> SyncClient {
    SyncClient::new(client(platform))
}

pub fn open_store(dir: &TempDir, org: &str) -> LocalStore {
    LocalStore::open(
        NormalizedPath::new(dir.path().join("workspaces").join(org)),
        Workspace::new(org).unwrap(),
    )
    .unwrap()
}
