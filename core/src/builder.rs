//! Request construction, dispatch, and response normalization.
//!
//! # Design
//! `RequestBuilder` holds only configuration and shared handles; every call
//! builds its own `HttpRequest` and returns its own `Outcome`, so one builder
//! can serve any number of concurrent requests. Failures are recorded on the
//! outcome rather than returned as `Err`.
//!
//! A 401 or 419 while a token is stored clears the token and invokes the
//! auth-expiry hook with `/`. What "navigate" means is up to the host.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::credentials::{CredentialStore, AUTHORIZATION};
use crate::error::{HttpFailure, RequestError};
use crate::http::{merge_header, HttpMethod, HttpRequest, HttpResponse};
use crate::outcome::Outcome;
use crate::transport::{ReqwestTransport, Transport};

/// Where the host should navigate once credentials have expired.
pub const AUTH_EXPIRED_REDIRECT: &str = "/";

/// Pass as the body of a POST/PUT/PATCH/DELETE that has none.
pub const NO_BODY: Option<&'static ()> = None;

pub type AuthExpiredHook = Arc<dyn Fn(&str) + Send + Sync>;

#[derive(Clone)]
pub struct RequestBuilder {
    base_url: String,
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
    on_auth_expired: Option<AuthExpiredHook>,
}

impl fmt::Debug for RequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("base_url", &self.base_url)
            .field("on_auth_expired", &self.on_auth_expired.is_some())
            .finish_non_exhaustive()
    }
}

impl RequestBuilder {
    /// Builder over the reqwest transport.
    pub fn new(config: &ClientConfig, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            transport: Arc::new(ReqwestTransport::new()),
            on_auth_expired: None,
        }
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    /// Install the callback run after an expired token has been cleared.
    pub fn on_auth_expired(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_auth_expired = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Headers every request starts from. The token is read now, so a token
    /// stored later only affects requests built later.
    pub fn base_headers(&self) -> Vec<(String, String)> {
        let token = self.credentials.get(AUTHORIZATION).unwrap_or_default();
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Accept".to_string(), "application/json".to_string()),
            (AUTHORIZATION.to_string(), format!("Bearer {token}")),
        ]
    }

    /// Build a request without sending it. GET never carries a body, and a
    /// body serializing to JSON `null` counts as absent.
    pub fn build<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Result<HttpRequest, RequestError> {
        let body = match body {
            Some(body) if method != HttpMethod::Get => {
                let text = serde_json::to_string(body)
                    .map_err(|e| RequestError::Serialization(e.to_string()))?;
                (text != "null").then_some(text)
            }
            _ => None,
        };

        let mut merged = self.base_headers();
        for (name, value) in headers {
            merge_header(&mut merged, name, value);
        }

        Ok(HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: merged,
            body,
        })
    }

    pub async fn get(&self, path: &str, headers: &[(&str, &str)]) -> Outcome {
        self.dispatch(HttpMethod::Get, path, NO_BODY, headers).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Outcome {
        self.dispatch(HttpMethod::Post, path, body, headers).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Outcome {
        self.dispatch(HttpMethod::Put, path, body, headers).await
    }

    pub async fn patch<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Outcome {
        self.dispatch(HttpMethod::Patch, path, body, headers).await
    }

    pub async fn delete<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Outcome {
        self.dispatch(HttpMethod::Delete, path, body, headers).await
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&B>,
        headers: &[(&str, &str)],
    ) -> Outcome {
        match self.build(method, path, body, headers) {
            Ok(request) => self.send(request).await,
            Err(error) => Outcome::failed(CancellationToken::new(), error),
        }
    }

    /// Send `request` and wait for its outcome.
    pub async fn send(&self, request: HttpRequest) -> Outcome {
        self.begin(request).finish().await
    }

    /// Prepare `request` for sending, handing out its cancellation handle
    /// before anything is awaited.
    pub fn begin(&self, request: HttpRequest) -> InFlight<'_> {
        InFlight {
            builder: self,
            request,
            abort: CancellationToken::new(),
        }
    }

    /// Turn a raw response into the outcome's data or error.
    ///
    /// Not pure: an auth-expiry status with a JSON body clears the stored
    /// token and runs the hook before the error is returned. An error body
    /// that is not JSON, empty included, is a `Deserialization` error and
    /// leaves the token alone.
    pub fn interpret(&self, response: HttpResponse) -> Result<Option<Value>, RequestError> {
        if !response.is_success() {
            let body: Value = serde_json::from_str(&response.body)
                .map_err(|e| RequestError::Deserialization(e.to_string()))?;
            if matches!(response.status, 401 | 419) {
                self.expire_credentials();
            }
            let message = failure_message(&body, &response.status_text);
            return Err(HttpFailure { message, response }.into());
        }

        if response.status == 204 {
            return Ok(None);
        }

        serde_json::from_str(&response.body)
            .map(Some)
            .map_err(|e| RequestError::Deserialization(e.to_string()))
    }

    fn expire_credentials(&self) {
        let stored = self
            .credentials
            .get(AUTHORIZATION)
            .filter(|token| !token.is_empty());
        if stored.is_none() {
            return;
        }

        warn!("authorization expired, clearing stored token");
        if let Err(e) = self.credentials.remove(AUTHORIZATION) {
            warn!(error = %e, "failed to clear stored token");
        }
        if let Some(hook) = &self.on_auth_expired {
            hook(AUTH_EXPIRED_REDIRECT);
        }
    }
}

/// A built request whose cancellation handle is already available.
#[derive(Debug)]
pub struct InFlight<'a> {
    builder: &'a RequestBuilder,
    request: HttpRequest,
    abort: CancellationToken,
}

impl InFlight<'_> {
    pub fn abort_handle(&self) -> CancellationToken {
        self.abort.clone()
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    pub async fn finish(self) -> Outcome {
        let InFlight {
            builder,
            request,
            abort,
        } = self;
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = tokio::select! {
            biased;
            _ = abort.cancelled() => Err(RequestError::Cancelled),
            response = builder.transport.execute(request) => response.map_err(RequestError::from),
        };

        let mut outcome = Outcome::new(abort);
        match response.and_then(|r| builder.interpret(r)) {
            Ok(data) => outcome.data = data,
            Err(error) => {
                debug!(error = %error, "request failed");
                outcome.error = Some(error);
            }
        }
        outcome
    }
}

/// The server's `message` is either a string or a map of field → messages.
/// Field messages are space-joined, then fields are space-joined.
fn failure_message(body: &Value, status_text: &str) -> String {
    match body.get("message") {
        Some(Value::Object(fields)) => fields
            .values()
            .map(join_messages)
            .collect::<Vec<_>>()
            .join(" "),
        Some(messages @ Value::Array(_)) => join_messages(messages),
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => status_text.to_string(),
        Some(other) => other.to_string(),
    }
}

fn join_messages(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(as_text).collect::<Vec<_>>().join(" "),
        other => as_text(other),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
