//! HTTP transport for registry calls
//!
//! A [`Transport`] performs one network exchange for an already built
//! [`Request`] and hands back the raw status and body. Status handling,
//! decoding and cancellation live in [`Client`](super::client::Client), so
//! every transport (including test stubs) gets the same semantics.

use async_trait::async_trait;
use reqwest::{header, Method};
use serde::Serialize;
use url::Url;

use super::auth::Credential;
use super::error::ApiError;
use super::query::Query;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

const USER_AGENT: &str = concat!("ag/", env!("CARGO_PKG_VERSION"));

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// A fully built registry request
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Path relative to the registry root, e.g. `/services`
    pub path: String,
    pub query: Query,
    /// Serialized JSON body
    pub body: Option<Vec<u8>>,
    pub credential: Option<Credential>,
}

impl Request {
    /// A bodiless request with an empty query
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Query::new(),
            body: None,
            credential: None,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    /// Serialize `body` as the JSON request body
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_vec(body).map_err(ApiError::Encoding)?);
        Ok(self)
    }
}

/// Raw registry answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One network exchange. Implementations must be safe to share between
/// concurrent calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return whatever the registry answered. Only
    /// failures to obtain a response are errors here.
    async fn round_trip(&self, request: &Request) -> Result<RawResponse, ApiError>;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport rooted at `base_url`
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidArgument(format!("registry URL {:?}: {}", base_url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    /// Resolve the full URL of a request
    pub fn url_for(&self, request: &Request) -> Result<Url, ApiError> {
        let mut url = self
            .base_url
            .join(request.path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidArgument(format!("path {:?}: {}", request.path, e)))?;

        if request.query.is_empty() {
            url.set_query(None);
        } else {
            url.set_query(Some(&request.query.encode()));
        }

        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn round_trip(&self, request: &Request) -> Result<RawResponse, ApiError> {
        let url = self.url_for(request)?;
        tracing::debug!("{} {}", request.method, url);

        let mut builder = self.client.request(request.method.clone(), url);
        if let Some(credential) = &request.credential {
            builder = builder.bearer_auth(credential.expose());
        }
        if let Some(body) = &request.body {
            builder = builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!(
                "API error: {} - {}",
                status,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
        }

        Ok(RawResponse {
            status: status.as_u16(),
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str, query: Query) -> Request {
        Request::new(Method::GET, path).with_query(query)
    }

    #[test]
    fn test_url_for_keeps_base_path() {
        let transport = HttpTransport::new("https://registry.example.com/v1").unwrap();
        let url = transport.url_for(&request("/services", Query::new())).unwrap();
        assert_eq!(url.as_str(), "https://registry.example.com/v1/services");
    }

    #[test]
    fn test_url_for_appends_query() {
        let transport = HttpTransport::new("http://localhost:8080").unwrap();
        let mut query = Query::new();
        query.append("name", "web");
        query.append("name", "api");
        let url = transport.url_for(&request("/services", query)).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/services?name=web&name=api");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpTransport::new("not a url").err().unwrap();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[test]
    fn test_sanitize_truncates_and_strips() {
        let long = "x".repeat(500);
        let sanitized = sanitize_for_log(&long);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
        assert_eq!(sanitize_for_log("a\nb\u{7}c"), "abc");
    }
}
