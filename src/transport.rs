//! HTTP transport abstraction - blocking and async flavours, mockable for tests
//!
//! A transport only moves bytes: it sends a fully prepared [`ApiRequest`] and hands
//! back the status and body text. Status checks and JSON decoding happen in
//! [`crate::executor::RequestExecutor`] so both execution models share them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::{Error, Result};

const REDACTED_PARAMS: [&str; 2] = ["token", "key"];

/// Fully prepared request, credentials already attached
#[derive(Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Endpoint path relative to the API base, e.g. `/v2/classifieds/listings`
    pub path: String,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub user_agent: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query: Vec<(&str, &str)> = self
            .query
            .iter()
            .map(|(key, value)| {
                if REDACTED_PARAMS.contains(&key.as_str()) {
                    (key.as_str(), "<redacted>")
                } else {
                    (key.as_str(), value.as_str())
                }
            })
            .collect();

        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &query)
            .field("user_agent", &self.user_agent)
            .field("body", &self.body)
            .finish()
    }
}

/// What came back over the wire, uninterpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Successful response with a decoded JSON body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    /// Decode the body into a domain type. A shape mismatch counts as a failed request.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let status = self.status;
        serde_json::from_value(self.body.clone()).map_err(|_| Error::RequestFailed {
            status,
            body: self.body.to_string(),
        })
    }
}

/// Blocking transport - occupies the calling thread for the round trip
pub trait BlockingTransport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse>;
}

/// Async transport - suspends the calling task while the response is awaited
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse>;
}

impl<T: BlockingTransport + ?Sized> BlockingTransport for Arc<T> {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        (**self).send(request)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        (**self).send(request).await
    }
}

// ============================================================================
// reqwest implementations
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct HttpBlockingTransport {
    client: reqwest::blocking::Client,
}

impl HttpBlockingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl BlockingTransport for HttpBlockingTransport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .query(&request.query)
            .header(USER_AGENT, request.user_agent.as_str());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;

        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.clone(), &request.url)
            .query(&request.query)
            .header(USER_AGENT, request.user_agent.as_str());

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

/// Recording transport for exercising clients without a network connection.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Mutex, MutexGuard};

    /// Replies from a queue of canned responses (`200 {}` once the queue is empty)
    /// and records every request it is asked to send.
    #[derive(Debug, Default)]
    pub struct MockTransport {
        requests: Mutex<Vec<ApiRequest>>,
        responses: Mutex<VecDeque<Result<RawResponse>>>,
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(&self, status: u16, body: Value) -> &Self {
            lock(&self.responses).push_back(Ok(RawResponse::json(status, &body)));
            self
        }

        pub fn reply_raw(&self, status: u16, body: &str) -> &Self {
            lock(&self.responses).push_back(Ok(RawResponse::new(status, body)));
            self
        }

        pub fn fail(&self, message: &str) -> &Self {
            lock(&self.responses).push_back(Err(Error::Transport(message.to_string())));
            self
        }

        pub fn calls(&self) -> usize {
            lock(&self.requests).len()
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            lock(&self.requests).clone()
        }

        pub fn last_request(&self) -> Option<ApiRequest> {
            lock(&self.requests).last().cloned()
        }

        fn respond(&self, request: &ApiRequest) -> Result<RawResponse> {
            lock(&self.requests).push(request.clone());
            lock(&self.responses)
                .pop_front()
                .unwrap_or_else(|| Ok(RawResponse::new(200, "{}")))
        }
    }

    impl BlockingTransport for MockTransport {
        fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
            self.respond(request)
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn send(&self, request: &ApiRequest) -> Result<RawResponse> {
            self.respond(request)
        }
    }
}
