//! reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use hawk::{PayloadHasher, RequestBuilder, SHA256};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use reqwest::{Client, Url};
use serde_json::Value;

use super::transport::{Method, RemoteRequest, RemoteResponse, Transport, TransportError};

const RATE_LIMIT_RESET: &str = "x-rate-limit-reset";
const JSON: &str = "application/json";

/// API credentials for one account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub user_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Talks to the platform over HTTPS, scoped to one Organization.
///
/// Every request is signed with Hawk: the user ID and API key are the
/// credentials, and the Organization ID travels as the `ext` field.
pub struct HttpTransport {
    http: Client,
    base_url: String,
    credentials: Credentials,
    org_id: String,
}

impl HttpTransport {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        org_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::new(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            credentials,
            org_id: org_id.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request_url(&self, request: &RemoteRequest) -> Result<Url, TransportError> {
        let mut url = Url::parse(&self.url(&request.path))
            .map_err(|e| TransportError::new(format!("Invalid URL for '{}': {e}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Hawk `Authorization` header for one request. `body` is hashed into
    /// the MAC when present.
    fn authorization(&self, method: Method, url: &Url, body: Option<&[u8]>) -> Result<String, TransportError> {
        let sign_error = |e: hawk::Error| TransportError::new(format!("Failed to sign request: {e}"));

        let credentials = hawk::Credentials {
            id: self.credentials.user_id.clone(),
            key: hawk::Key::new(self.credentials.api_key.as_bytes(), SHA256).map_err(sign_error)?,
        };
        let host = url
            .host_str()
            .ok_or_else(|| TransportError::new(format!("URL has no host: {url}")))?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| TransportError::new(format!("URL has no port: {url}")))?;
        let resource = match url.query() {
            Some(query) => format!("{}?{query}", url.path()),
            None => url.path().to_string(),
        };
        let hash = match body {
            Some(body) => Some(PayloadHasher::hash(JSON.as_bytes(), SHA256, body).map_err(sign_error)?),
            None => None,
        };

        let header = RequestBuilder::new(method.as_str(), host, port, &resource)
            .hash(hash.as_deref())
            .ext(Some(self.org_id.as_str()))
            .request()
            .make_header(&credentials)
            .map_err(sign_error)?;
        Ok(format!("Hawk {header}"))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &RemoteRequest) -> Result<RemoteResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };
        let url = self.request_url(request)?;
        let body = request
            .body
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| TransportError::new(format!("Failed to encode request body: {e}")))?;
        let authorization = self.authorization(request.method, &url, body.as_deref())?;

        let mut builder = self
            .http
            .request(method, url.clone())
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .header(AUTHORIZATION, authorization);
        if let Some(body) = body {
            builder = builder.body(body);
        }

        tracing::trace!(method = request.method.as_str(), %url, "Sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::new(format!("{} {url}: {e}", request.method.as_str())))?;

        let status = response.status().as_u16();
        let retry_after = retry_hint(response.headers());
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::new(format!("Failed to read response from {url}: {e}")))?;

        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(RemoteResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// `Retry-After` is in seconds; the platform's `x-rate-limit-reset` is in
/// milliseconds.
fn retry_hint(headers: &HeaderMap) -> Option<Duration> {
    let header_u64 = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
    };

    header_u64(RETRY_AFTER.as_str())
        .map(Duration::from_secs)
        .or_else(|| header_u64(RATE_LIMIT_RESET).map(Duration::from_millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn retry_after_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("500"));
        assert_eq!(retry_hint(&headers), Some(Duration::from_secs(3)));
    }

    #[test]
    fn rate_limit_reset_is_milliseconds() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_RESET, HeaderValue::from_static("1500"));
        assert_eq!(retry_hint(&headers), Some(Duration::from_millis(1500)));
        assert_eq!(retry_hint(&HeaderMap::new()), None);
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(
            "https://api.example.com/v2/",
            Credentials {
                api_key: "secret-key".into(),
                user_id: "user-1".into(),
            },
            "org-1",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn url_joins_without_double_slash() {
        assert_eq!(transport().url("/rulesets"), "https://api.example.com/v2/rulesets");
    }

    #[test]
    fn query_is_part_of_request_url() {
        let request = RemoteRequest::get("rulesets").with_query("token", "abc");
        let url = transport().request_url(&request).unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v2/rulesets?token=abc");
    }

    #[test]
    fn requests_are_signed_with_hawk() {
        let transport = transport();
        let url = transport.request_url(&RemoteRequest::get("rulesets")).unwrap();

        let header = transport.authorization(Method::Get, &url, None).unwrap();

        assert!(header.starts_with("Hawk "), "{header}");
        for field in ["id=\"user-1\"", "ts=\"", "nonce=\"", "mac=\"", "ext=\"org-1\""] {
            assert!(header.contains(field), "missing {field} in {header}");
        }
        assert!(!header.contains("hash="), "{header}");
        assert!(!header.contains("secret-key"), "{header}");
    }

    #[test]
    fn request_bodies_are_hashed_into_the_signature() {
        let transport = transport();
        let url = transport.request_url(&RemoteRequest::get("rulesets")).unwrap();

        let header = transport
            .authorization(Method::Post, &url, Some(br#"{"name":"Base"}"#))
            .unwrap();

        assert!(header.contains("hash=\""), "{header}");
    }

    #[test]
    fn credentials_debug_hides_key() {
        let creds = Credentials {
            api_key: "secret".into(),
            user_id: "u".into(),
        };
        assert!(!format!("{creds:?}").contains("secret"));
    }
}
