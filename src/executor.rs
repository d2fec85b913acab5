//! Authenticated request preparation and response decoding

use std::fmt;

use log::{debug, warn};
use reqwest::Method;
use serde_json::Value;

use crate::consts::{library_label, BASE_URL, DEFAULT_USER_AGENT};
use crate::errors::{Error, Result};
use crate::transport::{ApiRequest, ApiResponse, RawResponse};

/// Query parameters in the order they are sent
pub type Params = Vec<(String, String)>;

/// Trade token plus the optional elevated API key
#[derive(Clone, Default)]
pub struct Credentials {
    token: String,
    api_key: Option<String>,
}

impl Credentials {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_key: None,
        }
    }

    /// An empty key is the same as no key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn require_token(&self) -> Result<&str> {
        if self.token.is_empty() {
            return Err(Error::MissingToken);
        }
        Ok(&self.token)
    }

    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or(Error::MissingApiKey)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &if self.has_token() { "<redacted>" } else { "<none>" })
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Attaches credentials to requests and interprets responses.
///
/// Holds no mutable state, so one executor can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    base_url: String,
    credentials: Credentials,
    user_agent: String,
}

impl RequestExecutor {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            credentials,
            user_agent: format!("{} | {}", DEFAULT_USER_AGENT, library_label()),
        }
    }

    /// Set the application part of the `User-Agent` header; the library label is always appended
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = format!("{} | {}", user_agent, library_label());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `path`. Caller supplied `token`/`key` params are replaced
    /// by the held credentials.
    pub fn prepare(
        &self,
        method: Method,
        path: &str,
        params: Params,
        body: Option<Value>,
    ) -> Result<ApiRequest> {
        let token = self.credentials.require_token()?;

        let mut query: Params = params
            .into_iter()
            .filter(|(name, _)| name != "token" && name != "key")
            .collect();
        query.push(("token".to_string(), token.to_string()));
        if let Some(key) = &self.credentials.api_key {
            query.push(("key".to_string(), key.clone()));
        }

        debug!("{} {}", method, path);

        Ok(ApiRequest {
            method,
            path: path.to_string(),
            url: format!("{}{}", self.base_url, path),
            query,
            user_agent: self.user_agent.clone(),
            body,
        })
    }

    /// Check the status and decode the body. Non-2xx and non-JSON bodies are failures.
    pub fn complete(response: RawResponse) -> Result<ApiResponse> {
        if !response.is_success() {
            warn!("Request failed with status {}", response.status);
            return Err(Error::RequestFailed {
                status: response.status,
                body: response.body,
            });
        }

        match serde_json::from_str(&response.body) {
            Ok(body) => Ok(ApiResponse {
                status: response.status,
                body,
            }),
            Err(e) => {
                warn!("Undecodable response body ({}): {}", response.status, e);
                Err(Error::RequestFailed {
                    status: response.status,
                    body: response.body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_prepare_attaches_token() {
        let executor = RequestExecutor::new(Credentials::new("abc"));
        let request = executor
            .prepare(Method::GET, "/v2/classifieds/listings", params(&[("skip", "0")]), None)
            .unwrap();

        assert_eq!(request.url, "https://api.backpack.tf/api/v2/classifieds/listings");
        assert_eq!(request.query, params(&[("skip", "0"), ("token", "abc")]));
        assert_eq!(request.query_value("key"), None);
        assert!(request.user_agent.starts_with("Listing goin' up! | backpack-tf v"));
    }

    #[test]
    fn test_prepare_attaches_key_and_overrides_caller_credentials() {
        let executor =
            RequestExecutor::new(Credentials::new("abc").with_api_key("xyz")).with_user_agent("my bot");
        let request = executor
            .prepare(
                Method::POST,
                "/agent/pulse",
                params(&[("token", "forged"), ("key", "forged")]),
                Some(json!({})),
            )
            .unwrap();

        assert_eq!(request.query, params(&[("token", "abc"), ("key", "xyz")]));
        assert!(request.user_agent.starts_with("my bot | backpack-tf v"));
        assert_eq!(request.body, Some(json!({})));
    }

    #[test]
    fn test_prepare_without_token() {
        let executor = RequestExecutor::new(Credentials::new(""));
        assert!(matches!(
            executor.prepare(Method::GET, "/agent/status", Params::new(), None),
            Err(Error::MissingToken)
        ));
    }

    #[test]
    fn test_empty_api_key_is_absent() {
        let credentials = Credentials::new("abc").with_api_key("");
        assert!(!credentials.has_api_key());
        assert!(matches!(credentials.require_api_key(), Err(Error::MissingApiKey)));
    }

    #[test]
    fn test_credentials_debug_is_redacted() {
        let debug = format!("{:?}", Credentials::new("abc123").with_api_key("key456"));
        assert!(!debug.contains("abc123"));
        assert!(!debug.contains("key456"));
    }

    #[test]
    fn test_base_url_override() {
        let executor =
            RequestExecutor::new(Credentials::new("abc")).with_base_url("http://localhost:8080/api/");
        let request = executor
            .prepare(Method::DELETE, "/v2/classifieds/listings", Params::new(), None)
            .unwrap();
        assert_eq!(request.url, "http://localhost:8080/api/v2/classifieds/listings");
    }

    #[test]
    fn test_complete() {
        let response = RequestExecutor::complete(RawResponse::new(200, r#"{"status":"active"}"#)).unwrap();
        assert_eq!(response.body, json!({"status": "active"}));

        assert!(matches!(
            RequestExecutor::complete(RawResponse::new(404, r#"{"message":"not found"}"#)),
            Err(Error::RequestFailed { status: 404, ref body }) if body.contains("not found")
        ));

        assert!(matches!(
            RequestExecutor::complete(RawResponse::new(200, "<html>")),
            Err(Error::RequestFailed { status: 200, .. })
        ));
    }
}
