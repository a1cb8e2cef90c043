//! `reqwest`-backed transport for the `vAPI` REST dialect.
//!
//! Successful responses wrap their payload as `{"value": ...}`; this
//! transport unwraps the envelope before handing the payload back.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;
use tracing::debug;

use super::{Method, Request, Transport};
use crate::config::ClientConfig;
use crate::{AppError, Result, TransportError};

/// Header carrying the authenticated API session token.
pub const SESSION_HEADER: &str = "vmware-api-session-id";

/// HTTP implementation of [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpTransport {
    /// Transport for `base_url` with a default client and no session token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            session_token: None,
        })
    }

    /// Transport configured from `config`, including its session token.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|err| AppError::Config(format!("failed to build http client: {err}")))?;
        let session_token =
            (!config.session_token.is_empty()).then(|| config.session_token.clone());
        Ok(Self {
            client,
            base_url: config.base_url(),
            session_token,
        })
    }

    /// Authenticate every request with `token`.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// Origin plus REST prefix every resource path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, request: Request) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base_url, request.resource);
        debug!(method = request.method.as_str(), %url, "sending request");

        let mut builder = self.client.request(http_method(request.method), &url);
        if let Some(token) = &self.session_token {
            builder = builder.header(SESSION_HEADER, token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|err| {
            TransportError::with_status(status.as_u16(), format!("failed to read body: {err}"))
        })?;

        if !status.is_success() {
            return Err(TransportError::with_status(
                status.as_u16(),
                String::from_utf8_lossy(&body).trim().to_owned(),
            )
            .into());
        }

        unwrap_envelope(&body)
    }
}

impl Transport for HttpTransport {
    fn execute(
        &self,
        request: Request,
    ) -> Pin<Box<dyn Future<Output = Result<Option<Value>>> + Send + '_>> {
        Box::pin(self.send(request))
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Strip the `{"value": ...}` envelope from a success body.
///
/// An empty body or a `null` value is an empty response. A JSON body
/// without the envelope is returned as-is.
fn unwrap_envelope(body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)?;
    let payload = match value {
        Value::Object(mut map) if map.contains_key("value") => {
            map.remove("value").unwrap_or(Value::Null)
        }
        other => other,
    };

    Ok((!payload.is_null()).then_some(payload))
}
