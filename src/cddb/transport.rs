//! Transport boundary for the CDDB client.
//!
//! The protocol layer only needs one operation: a blocking HTTP GET
//! that returns the full response body as UTF-8 text. The trait keeps
//! the grammar and client logic testable without a network, in the
//! same way the client is swappable for mocks in tests.

use super::domain::CddbError;

/// Blocking "GET this URL, give me the body as text" operation.
///
/// Implementations decide everything about connections, timeouts and
/// headers; the client performs no retries on top. `CddbClient` holds
/// no other mutable state, so it is safe to share across threads
/// exactly when the transport is.
pub trait Transport: Send + Sync {
    /// Perform a single HTTP GET and return the whole body as text.
    fn fetch(&self, url: &str) -> Result<String, CddbError>;
}

/// User agent sent with every request
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Real transport backed by reqwest's blocking client.
pub struct HttpTransport {
    http_client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        let http_client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("Failed to build HTTP client");

        Self { http_client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str) -> Result<String, CddbError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .map_err(|e| CddbError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| CddbError::Transport(e.to_string()))?;

        response.text().map_err(|e| CddbError::Transport(e.to_string()))
    }
}
