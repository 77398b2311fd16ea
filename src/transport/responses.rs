use std::time::Duration;

use async_trait::async_trait;

use crate::protocol::ResponseRequest;
use crate::transport::error::TransportError;
use crate::transport::http::{AuthStrategy, HttpClient, HttpConfig, SseParser};
use crate::transport::types::{ApiKey, BaseUrl};
use crate::transport::{RawEventStream, Transport};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const RESPONSES_PATH: &str = "/v1/responses";

/// Streams `POST /v1/responses` over HTTP.
#[derive(Clone)]
pub struct HttpTransport {
    http: HttpClient,
    auth: AuthStrategy,
    base_url: BaseUrl,
    api_key_env: String,
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    pub fn new(api_key: ApiKey, http_config: HttpConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: HttpClient::with_config(http_config)?,
            auth: AuthStrategy::bearer(api_key),
            base_url: BaseUrl::new(DEFAULT_BASE_URL),
            api_key_env: "OPENAI_API_KEY".to_string(),
        })
    }

    /// Reads the key from `api_key_env`. Fails early with a hint when the
    /// variable is missing. An empty name sends requests without credentials,
    /// for local gateways that do not check them.
    pub fn from_env(api_key_env: &str, http_config: HttpConfig) -> Result<Self, TransportError> {
        if api_key_env.is_empty() {
            tracing::debug!("no api_key_env configured, sending unauthenticated requests");
            return Ok(Self {
                http: HttpClient::with_config(http_config)?,
                auth: AuthStrategy::None,
                base_url: BaseUrl::new(DEFAULT_BASE_URL),
                api_key_env: String::new(),
            });
        }
        let api_key = ApiKey::from_env(api_key_env)?;
        let mut transport = Self::new(api_key, http_config)?;
        transport.api_key_env = api_key_env.to_string();
        Ok(transport)
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<BaseUrl>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn endpoint(&self) -> String {
        self.base_url.join(RESPONSES_PATH)
    }

    fn parse_error(&self, status: reqwest::StatusCode, body: &str) -> TransportError {
        TransportError::from_status(status.as_u16(), body, &self.api_key_env)
    }
}

/// Reads a delta-seconds `Retry-After` value. HTTP-date forms are ignored.
fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let value = headers.get(reqwest::header::RETRY_AFTER)?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn open(&self, request: &ResponseRequest) -> Result<RawEventStream, TransportError> {
        if !self.auth.is_configured() {
            return Err(TransportError::auth_with_hint(
                "No API key configured",
                format!("Set the {} environment variable", self.api_key_env),
            ));
        }

        let url = self.endpoint();
        let body = serde_json::to_string(request)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        tracing::info!(url = %url, model = %request.model, "opening response stream");

        let response = self
            .http
            .post(&url, &self.auth)
            .header("content-type", "application/json")
            .header("accept", "text/event-stream")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), ?retry_after, "response stream rejected");
            return Err(self.parse_error(status, &error_body).with_retry_after(retry_after));
        }

        Ok(Box::pin(SseParser::parse_stream(response.bytes_stream())))
    }
}
