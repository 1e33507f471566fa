//! Registry client
//!
//! Drives every call through the same pipeline:
//!
//! 1. build: resolve the path, attach the query or serialized envelope and
//!    the session credential ([`Client::new_request`])
//! 2. send: one exchange on the [`Transport`], raced against the caller's
//!    [`Context`]
//! 3. finish: decode a 2xx body, or turn anything else into an
//!    [`ApiError`]

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::auth::Session;
use super::context::Context;
use super::error::ApiError;
use super::orgs::OrgsClient;
use super::progress::{Event, EventKind, ProgressFn};
use super::projects::ProjectsClient;
use super::services::ServicesClient;
use super::transport::{sanitize_for_log, HttpTransport, RawResponse, Request, Transport};
use crate::apitypes::Envelope;
use crate::config::Config;
use crate::identity::{EntropySource, IdentityGenerator};

/// Shared registry client. Cheap to clone; clones share the transport and
/// session.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    identities: IdentityGenerator,
    progress: Option<ProgressFn>,
}

impl Client {
    pub fn new(transport: Arc<dyn Transport>, session: Session) -> Self {
        Self {
            transport,
            session: Arc::new(session),
            identities: IdentityGenerator::default(),
            progress: None,
        }
    }

    /// Create a client talking HTTP to the configured registry
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        let registry = config.effective_registry_uri();
        tracing::info!("Using registry: {}", registry);
        let transport = HttpTransport::new(&registry)?;
        Ok(Self::new(
            Arc::new(transport),
            Session::from_token(config.effective_auth_token()),
        ))
    }

    /// Replace the nonce source used for new identities
    pub fn with_entropy(mut self, entropy: Arc<dyn EntropySource>) -> Self {
        self.identities = IdentityGenerator::new(entropy);
        self
    }

    /// Report progress of every call to `progress`
    pub fn with_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn identities(&self) -> &IdentityGenerator {
        &self.identities
    }

    pub fn orgs(&self) -> OrgsClient {
        OrgsClient::new(self.clone())
    }

    pub fn projects(&self) -> ProjectsClient {
        ProjectsClient::new(self.clone())
    }

    pub fn services(&self) -> ServicesClient {
        ServicesClient::new(self.clone())
    }

    /// Start building an authenticated request against `path`
    pub fn new_request(&self, method: Method, path: &str) -> Request {
        Request::new(method, path).with_credential(self.session.credential().cloned())
    }

    /// Send a request whose response body is not needed
    pub async fn send(&self, ctx: &Context, request: Request) -> Result<(), ApiError> {
        self.dispatch(ctx, &request).await.map(|_| ())
    }

    /// Send a list request. An empty or `null` body is an empty list.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        request: Request,
    ) -> Result<Vec<Envelope<T>>, ApiError> {
        let body = self.dispatch(ctx, &request).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        let items: Option<Vec<Envelope<T>>> =
            serde_json::from_slice(&body).map_err(ApiError::Decode)?;
        Ok(items.unwrap_or_default())
    }

    async fn dispatch(&self, ctx: &Context, request: &Request) -> Result<Vec<u8>, ApiError> {
        let method = request.method.as_str();
        let uploading = request.body.is_some();

        if uploading {
            let event = Event::for_request(EventKind::Uploading, method, &request.path);
            self.notify(Some(&event), None);
        }

        let exchange = tokio::select! {
            biased;
            reason = ctx.done() => Err(ApiError::Cancelled(reason)),
            response = self.transport.round_trip(request) => response,
        };

        let result = exchange.and_then(|response| {
            if uploading {
                let event = Event::for_request(EventKind::Processing, method, &request.path);
                self.notify(Some(&event), None);
            }
            check_status(response)
        });

        if let Err(err) = &result {
            tracing::debug!("{} {} failed: {}", method, request.path, err);
            self.notify(None, Some(err));
        }

        result
    }

    fn notify(&self, event: Option<&Event>, err: Option<&ApiError>) {
        if let Some(progress) = &self.progress {
            progress(event, err);
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("session", &self.session)
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

fn check_status(response: RawResponse) -> Result<Vec<u8>, ApiError> {
    if response.is_success() {
        return Ok(response.body);
    }
    Err(ApiError::Registry {
        status: response.status,
        message: registry_message(&response.body),
    })
}

/// Pull a human readable message out of a registry error body
///
/// The registry answers `{"type": "...", "error": ["..."]}`. A JSON body
/// without a usable `error` or `message` gives `None`, so the status text
/// is shown instead; non-JSON bodies are passed on sanitized.
fn registry_message(body: &[u8]) -> Option<String> {
    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        return match value.get("error").or_else(|| value.get("message")) {
            Some(Value::Array(parts)) => {
                let parts: Vec<&str> = parts.iter().filter_map(Value::as_str).collect();
                (!parts.is_empty()).then(|| parts.join(", "))
            }
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        };
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    (!text.is_empty()).then(|| sanitize_for_log(text))
}
