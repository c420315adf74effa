//! HTTP/HTTPS Client for AquaGuard Services
//!
//! ## Overview
//!
//! Two things in the pipeline live behind HTTP: the weather service that
//! supplies the ambient temperature, and (optionally) the store export the
//! readings come from. Both are plain JSON GETs, so the client stays small:
//! one blocking `ureq` agent, a base URL, headers, and retry with backoff.
//!
//! ## Retry Policy
//!
//! ```text
//! delay(attempt) = retry_base_delay * 2^(attempt - 1)
//! ```
//!
//! Transport errors, 5xx and 429 are retried up to `max_retries` times.
//! Other 4xx responses fail immediately; asking again will not help.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use aquaguard_connectors::http::{HttpClient, HttpConfig};
//!
//! let config = HttpConfig::new("https://store.example.com")
//!     .bearer_token("your-api-token")
//!     .timeout_secs(10);
//! let client = HttpClient::new(config)?;
//!
//! let docs = client.get_json("/api/v1/readings", &[("limit", "500")])?;
//! println!("{} documents", docs.as_array().map_or(0, |a| a.len()));
//! # Ok::<(), aquaguard_connectors::http::HttpError>(())
//! ```

use std::collections::HashMap;
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::ConnectionStats;

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Server returned error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Body was not the JSON we expected
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// HTTP configuration
#[derive(Clone, Debug)]
pub struct HttpConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    pub auth: AuthMethod,
    /// Custom headers
    pub headers: HashMap<String, String>,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, doubled for each one after
    pub retry_base_delay: Duration,
    /// User agent string
    pub user_agent: String,
}

/// Authentication methods
#[derive(Clone, Debug)]
pub enum AuthMethod {
    None,
    /// Bearer token
    Bearer(String),
    /// API key in header
    ApiKey { header: String, value: String },
}

impl HttpConfig {
    /// Create new configuration with base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            auth: AuthMethod::None,
            headers: HashMap::new(),
            max_retries: 3,
            retry_base_delay: Duration::from_millis(200),
            user_agent: format!("AquaGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthMethod::Bearer(token.into());
        self
    }

    /// Set API key authentication
    pub fn api_key(mut self, header: impl Into<String>, value: impl Into<String>) -> Self {
        self.auth = AuthMethod::ApiKey {
            header: header.into(),
            value: value.into(),
        };
        self
    }

    /// Set request timeout in seconds
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Add custom header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Blocking JSON client on a shared `ureq` agent
pub struct HttpClient {
    config: HttpConfig,
    agent: ureq::Agent,
    stats: Mutex<ConnectionStats>,
}

impl HttpClient {
    pub fn new(config: HttpConfig) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::Config("Base URL must start with http:// or https://".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: Mutex::new(ConnectionStats::default()),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    /// Full URL for `path`; an empty path is the base URL itself
    pub fn url(&self, path: &str) -> String {
        if path.is_empty() {
            return self.config.base_url.clone();
        }
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// GET `path` and return the body as text
    pub fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, HttpError> {
        let mut request = self.build_request(self.agent.get(&self.url(path)));
        for (name, value) in query {
            request = request.query(name, value);
        }
        self.execute_with_retry(request)
    }

    /// GET `path` and parse the body as JSON
    pub fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, HttpError> {
        let text = self.get_text(path, query)?;
        serde_json::from_str(&text).map_err(|e| HttpError::Serialization(e.to_string()))
    }

    /// Snapshot of request statistics
    pub fn stats(&self) -> ConnectionStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Build request with authentication and headers
    fn build_request(&self, mut request: ureq::Request) -> ureq::Request {
        match &self.config.auth {
            AuthMethod::None => {}
            AuthMethod::Bearer(token) => {
                request = request.set("Authorization", &format!("Bearer {}", token));
            }
            AuthMethod::ApiKey { header, value } => {
                request = request.set(header, value);
            }
        }

        for (name, value) in &self.config.headers {
            request = request.set(name, value);
        }

        request.set("Accept", "application/json")
    }

    fn record(&self, update: impl FnOnce(&mut ConnectionStats)) {
        if let Ok(mut stats) = self.stats.lock() {
            update(&mut stats);
        }
    }

    fn execute_with_retry(&self, request: ureq::Request) -> Result<String, HttpError> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                let delay = self.config.retry_base_delay * (1u32 << (attempt - 1).min(16));
                log::debug!("Retry {} for {} after {:?}", attempt, request.url(), delay);
                self.record(|s| s.retries += 1);
                thread::sleep(delay);
            }

            self.record(|s| s.requests_sent += 1);
            match request.clone().call() {
                Ok(resp) => {
                    let text = resp.into_string().map_err(|e| HttpError::Request(e.to_string()))?;
                    self.record(|s| s.bytes_received += text.len() as u64);
                    return Ok(text);
                }
                Err(ureq::Error::Status(code, resp)) => {
                    let error = HttpError::ServerError {
                        status: code,
                        message: resp.into_string().unwrap_or_default(),
                    };
                    if code >= 500 || code == 429 {
                        last_error = Some(error);
                        continue;
                    }
                    return Err(self.fail(error));
                }
                Err(ureq::Error::Transport(e)) => {
                    last_error = Some(HttpError::Request(e.to_string()));
                }
            }
        }

        let error = last_error.unwrap_or_else(|| HttpError::Request("Unknown error".into()));
        log::warn!("Giving up on {}: {}", request.url(), error);
        Err(self.fail(error))
    }

    fn fail(&self, error: HttpError) -> HttpError {
        let message = error.to_string();
        self.record(|s| {
            s.requests_failed += 1;
            s.last_error = Some(message);
        });
        error
    }
}
