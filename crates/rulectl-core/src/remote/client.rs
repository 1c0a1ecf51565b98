//! Typed platform operations with retry classification

use std::sync::Arc;

use serde_json::Value;

use super::error::RemoteError;
use super::retry::RetryPolicy;
use super::shutdown::Shutdown;
use super::transport::{RemoteRequest, RemoteResponse, Transport};

const TOO_MANY_REQUESTS: u16 = 429;

/// Client for one Organization's rulesets, rules and tags.
///
/// Every call goes through [`RemoteClient::send`], which retries 429s with
/// backoff (honoring server hints), retries 5xx and network failures a few
/// times, and fails 4xx at once.
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    shutdown: Shutdown,
}

impl RemoteClient {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy, shutdown: Shutdown) -> Self {
        Self {
            transport,
            policy,
            shutdown,
        }
    }

    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub async fn list_rulesets(&self) -> Result<Vec<Value>, RemoteError> {
        self.list("rulesets".to_string(), "rulesets").await
    }

    pub async fn list_rules(&self, ruleset: &str) -> Result<Vec<Value>, RemoteError> {
        self.list(format!("rulesets/{ruleset}/rules"), "rules").await
    }

    pub async fn get_tags(&self, rule: &str) -> Result<Value, RemoteError> {
        self.send(RemoteRequest::get(format!("rules/{rule}/tags"))).await
    }

    /// Returns the platform-assigned ID.
    pub async fn create_ruleset(&self, payload: Value) -> Result<String, RemoteError> {
        let body = self.send(RemoteRequest::post("rulesets", payload)).await?;
        assigned_id(&body)
    }

    pub async fn update_ruleset(&self, ruleset: &str, payload: Value) -> Result<(), RemoteError> {
        self.send(RemoteRequest::put(format!("rulesets/{ruleset}"), payload))
            .await
            .map(drop)
    }

    pub async fn delete_ruleset(&self, ruleset: &str) -> Result<(), RemoteError> {
        self.send(RemoteRequest::delete(format!("rulesets/{ruleset}")))
            .await
            .map(drop)
    }

    /// Returns the platform-assigned ID.
    pub async fn create_rule(&self, ruleset: &str, payload: Value) -> Result<String, RemoteError> {
        let body = self
            .send(RemoteRequest::post(format!("rulesets/{ruleset}/rules"), payload))
            .await?;
        assigned_id(&body)
    }

    pub async fn update_rule(&self, ruleset: &str, rule: &str, payload: Value) -> Result<(), RemoteError> {
        self.send(RemoteRequest::put(format!("rulesets/{ruleset}/rules/{rule}"), payload))
            .await
            .map(drop)
    }

    pub async fn delete_rule(&self, ruleset: &str, rule: &str) -> Result<(), RemoteError> {
        self.send(RemoteRequest::delete(format!("rulesets/{ruleset}/rules/{rule}")))
            .await
            .map(drop)
    }

    /// Replace a rule's tags.
    pub async fn set_tags(&self, rule: &str, payload: Value) -> Result<(), RemoteError> {
        self.send(RemoteRequest::post(format!("rules/{rule}/tags"), payload))
            .await
            .map(drop)
    }

    /// Follow continuation tokens until the listing is exhausted.
    async fn list(&self, path: String, field: &str) -> Result<Vec<Value>, RemoteError> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let mut request = RemoteRequest::get(path.clone());
            if let Some(token) = &token {
                request = request.with_query("token", token.clone());
            }
            let body = self.send(request).await?;

            match body.get(field) {
                Some(Value::Array(page)) => items.extend(page.iter().cloned()),
                _ => {
                    return Err(RemoteError::InvalidResponse {
                        message: format!("listing of '{path}' has no '{field}' array"),
                    });
                }
            }

            token = body
                .get("token")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
            if token.is_none() {
                return Ok(items);
            }
        }
    }

    /// Send one request, retrying per the [`RetryPolicy`].
    pub async fn send(&self, request: RemoteRequest) -> Result<Value, RemoteError> {
        let mut schedule = self.policy.schedule();
        let mut rate_limited = 0u32;
        let mut unavailable = 0u32;

        loop {
            if self.shutdown.is_triggered() {
                return Err(RemoteError::Interrupted);
            }

            let hint = match self.transport.send(&request).await {
                Ok(response) if response.is_success() => return Ok(response.body),
                Ok(response) if response.status == TOO_MANY_REQUESTS => {
                    rate_limited += 1;
                    if rate_limited >= self.policy.max_rate_limit_attempts {
                        return Err(RemoteError::RateLimited {
                            attempts: rate_limited,
                        });
                    }
                    tracing::warn!(
                        method = request.method.as_str(),
                        path = %request.path,
                        attempt = rate_limited,
                        "Rate limited; backing off"
                    );
                    response.retry_after
                }
                Ok(response) if (400..500).contains(&response.status) => {
                    return Err(RemoteError::Rejected {
                        status: response.status,
                        message: error_message(&response),
                    });
                }
                Ok(response) => {
                    unavailable += 1;
                    let message = format!("HTTP {}: {}", response.status, error_message(&response));
                    self.unavailable(&request, unavailable, message)?;
                    None
                }
                Err(e) => {
                    unavailable += 1;
                    self.unavailable(&request, unavailable, e.message)?;
                    None
                }
            };

            let delay = self.policy.next_delay(hint, &mut schedule);
            tracing::debug!(delay_ms = delay.as_millis() as u64, "Waiting before retry");
            self.shutdown
                .sleep(delay)
                .await
                .map_err(|_| RemoteError::Interrupted)?;
        }
    }

    fn unavailable(&self, request: &RemoteRequest, attempts: u32, message: String) -> Result<(), RemoteError> {
        if attempts >= self.policy.max_unavailable_attempts {
            return Err(RemoteError::Unavailable { attempts, message });
        }
        tracing::warn!(
            method = request.method.as_str(),
            path = %request.path,
            attempt = attempts,
            %message,
            "Platform unavailable; retrying"
        );
        Ok(())
    }
}

fn assigned_id(body: &Value) -> Result<String, RemoteError> {
    body.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| RemoteError::InvalidResponse {
            message: "create response carries no 'id'".to_string(),
        })
}

/// Best-effort human message from an error response.
fn error_message(response: &RemoteResponse) -> String {
    match &response.body {
        Value::String(s) => s.clone(),
        Value::Null => "no response body".to_string(),
        body => {
            if let Some(errors) = body.get("errors").and_then(Value::as_array) {
                let joined: Vec<String> = errors
                    .iter()
                    .map(|e| e.as_str().map(str::to_string).unwrap_or_else(|| e.to_string()))
                    .collect();
                if !joined.is_empty() {
                    return joined.join("; ");
                }
            }
            body.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string())
        }
    }
}
