//! Request pipeline
//!
//! Every API call goes through [`RequestPipeline::execute`]:
//!
//! 1. resolve the credential (per-call override, else the pipeline default)
//! 2. encode the body with camelCase keys
//! 3. attach the bearer token
//! 4. mirror the request to the `airbased::wire` target when debugging
//! 5. wait for room in the rate window
//! 6. send, retrying connection failures and gateway errors
//! 7. classify the status and decode the body back to snake_case keys
//!
//! The five verb helpers are thin wrappers over `execute`.

use std::sync::Arc;

use serde_json::Value;

use crate::classify;
use crate::codec;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::rate_limit::{DEFAULT_BUDGET, DEFAULT_WINDOW, RateLimiter};
use crate::retry::{RetryPolicy, with_retry};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// Log target for mirrored requests
pub const WIRE_TARGET: &str = "airbased::wire";

/// Per-call request settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the pipeline's default API key
    pub api_key: Option<String>,
    /// Query string parameters, in order
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_key(mut self, api_key: Option<impl Into<String>>) -> Self {
        self.api_key = api_key.map(Into::into);
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }
}

/// Turns logical API calls into paced, encoded, retried HTTP exchanges.
///
/// Clones share the transport and the rate limiter.
#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn Transport>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    base_url: String,
    api_key: Option<String>,
    user_agent: String,
    debug: bool,
}

impl std::fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestPipeline")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("limiter", &self.limiter)
            .field("retry", &self.retry)
            .field("debug", &self.debug)
            .finish()
    }
}

impl RequestPipeline {
    /// Create a pipeline with its own rate limiter
    pub fn new(transport: Arc<dyn Transport>, config: &Config) -> Self {
        Self {
            transport,
            limiter: RateLimiter::new(DEFAULT_BUDGET, DEFAULT_WINDOW),
            retry: RetryPolicy::default(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent.clone(),
            debug: config.debug,
        }
    }

    /// Share a rate limiter with other pipelines using the same credential
    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Build the physical request for a call
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<HttpRequest> {
        let api_key = options
            .api_key
            .as_deref()
            .or(self.api_key.as_deref())
            .ok_or_else(|| {
                Error::InvalidInput(
                    "No API key configured (set AIRTABLE_API_KEY or pass one explicitly)".into(),
                )
            })?;

        let mut request = HttpRequest::new(method, self.url(path))
            .with_query(options.query.clone())
            .with_header("User-Agent", self.user_agent.as_str());

        if let Some(body) = body {
            request = request
                .with_body(codec::encode_body(body)?)
                .with_header("Content-Type", "application/json");
        }

        Ok(request.with_header("Authorization", format!("Bearer {api_key}")))
    }

    /// Execute one logical call and return the decoded response body
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        options: &RequestOptions,
    ) -> Result<Value> {
        let request = self.build_request(method, path, body, options)?;

        if self.debug {
            mirror(&request);
        }

        let response = with_retry(
            &self.retry,
            || self.send_once(request.clone()),
            Error::is_retryable,
        )
        .await?;

        codec::decode_body(&response.body).map_err(|e| Error::Decode(e.to_string()))
    }

    /// One admitted, classified physical exchange
    async fn send_once(&self, request: HttpRequest) -> Result<HttpResponse> {
        let admission = self.limiter.admit().await;
        let method = request.method;
        let url = request.url.clone();

        let result = self.transport.send(request).await;
        admission.complete(result.as_ref().ok().and_then(HttpResponse::date));

        let response = result?;
        tracing::debug!(%method, %url, status = response.status, "Request completed");
        classify::check(response)
    }

    pub async fn get(&self, path: &str, options: &RequestOptions) -> Result<Value> {
        self.execute(Method::Get, path, None, options).await
    }

    pub async fn post(&self, path: &str, body: &Value, options: &RequestOptions) -> Result<Value> {
        self.execute(Method::Post, path, Some(body), options).await
    }

    pub async fn patch(&self, path: &str, body: &Value, options: &RequestOptions) -> Result<Value> {
        self.execute(Method::Patch, path, Some(body), options).await
    }

    pub async fn put(&self, path: &str, body: &Value, options: &RequestOptions) -> Result<Value> {
        self.execute(Method::Put, path, Some(body), options).await
    }

    pub async fn delete(&self, path: &str, options: &RequestOptions) -> Result<Value> {
        self.execute(Method::Delete, path, None, options).await
    }
}

fn mirror(request: &HttpRequest) {
    let headers: Vec<(&str, &str)> = request
        .headers
        .iter()
        .map(|(name, value)| {
            if name.eq_ignore_ascii_case("authorization") {
                (name.as_str(), "Bearer <redacted>")
            } else {
                (name.as_str(), value.as_str())
            }
        })
        .collect();

    tracing::info!(
        target: WIRE_TARGET,
        method = %request.method,
        url = %request.url,
        query = ?request.query,
        headers = ?headers,
        body = request.body.as_deref().unwrap_or(""),
        "Outgoing request"
    );
}
