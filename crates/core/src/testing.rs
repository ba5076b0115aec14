//! Test doubles shared by the unit tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::pipeline::RequestPipeline;
use crate::rate_limit::{DEFAULT_BUDGET, DEFAULT_WINDOW, ManualClock, RateLimiter};
use crate::transport::{HttpRequest, HttpResponse, Transport};

/// Replays canned responses in order and records every request
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Decoded JSON body of the n-th request
    pub fn body(&self, index: usize) -> serde_json::Value {
        let requests = self.requests.lock().unwrap();
        serde_json::from_str(requests[index].body.as_deref().unwrap()).unwrap()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::InvalidInput("script exhausted".into())))
    }
}

/// Pipeline with a default key and a manual clock, so tests never sleep
pub fn test_pipeline(transport: Arc<dyn Transport>) -> RequestPipeline {
    let clock = Arc::new(ManualClock::default());
    let limiter = RateLimiter::with_clock(DEFAULT_BUDGET, DEFAULT_WINDOW, clock);
    RequestPipeline::new(transport, &Config::with_api_key("default-key")).with_limiter(limiter)
}

/// 200 response with a JSON body
pub fn ok(body: serde_json::Value) -> Result<HttpResponse> {
    Ok(HttpResponse::new(200, body.to_string()))
}
