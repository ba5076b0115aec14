//! reqwest transport
//!
//! Wraps reqwest and implements the Transport trait from ab-core.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use ab_core::{
    Config, Error, HttpRequest, HttpResponse, Method, RateLimiter, RequestPipeline, Result,
    Transport,
};

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with the timeout from `config`
    pub fn new(config: &Config) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    fn format_send_error(error: &reqwest::Error) -> String {
        if error.is_timeout() {
            format!("Request timeout: {error}")
        } else if error.is_connect() {
            format!("Connection failed: {error}")
        } else {
            format!("Request failed: {error}")
        }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.inner.request(to_reqwest(request.method), &request.url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            // Malformed URLs and header values never leave the process
            if e.is_builder() {
                Error::InvalidInput(format!("Invalid request: {e}"))
            } else {
                Error::Network(Self::format_send_error(&e))
            }
        })?;

        let status = response.status().as_u16();
        tracing::trace!(url = %request.url, status, "Response received");
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {e}")))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Build a pipeline over a reqwest transport from `config`
pub fn connect(config: &Config) -> Result<RequestPipeline> {
    config.validate()?;
    let transport = ReqwestTransport::new(config)?;
    Ok(RequestPipeline::new(Arc::new(transport), config))
}

/// Build a pipeline that shares `limiter` with other pipelines
pub fn connect_shared(config: &Config, limiter: RateLimiter) -> Result<RequestPipeline> {
    Ok(connect(config)?.with_limiter(limiter))
}
