//! Blocking HTTP transport.

use std::sync::OnceLock;
use std::time::Duration;

use reqwest::blocking::Client;

use super::{ByteStream, TransferError, Transport};

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// HTTP transport backed by a blocking `reqwest` client.
///
/// The client is built by [`Transport::prepare`], which the engine calls on
/// the producer thread before workers start. `open` builds it on demand if
/// `prepare` was never called.
#[derive(Debug)]
pub struct HttpTransport {
    client: OnceLock<Client>,
    pub(crate) timeout: Duration,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport {
    /// Create a new HTTP transport with the default timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new HTTP transport with a custom per-request timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: OnceLock::new(),
            timeout,
        }
    }

    fn client(&self) -> Result<&Client, TransferError> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }
        let client = Client::builder()
            .user_agent(concat!("gemmirror/", env!("CARGO_PKG_VERSION")))
            .timeout(self.timeout)
            .build()
            .map_err(|e| TransferError::Init(e.to_string()))?;
        // Another thread may have initialized it first.
        Ok(self.client.get_or_init(|| client))
    }
}

impl Transport for HttpTransport {
    fn prepare(&self) -> Result<(), TransferError> {
        self.client().map(|_| ())
    }

    fn open(&self, location: &str) -> Result<ByteStream, TransferError> {
        let response = self.client()?.get(location).send().map_err(|e| {
            if e.is_timeout() {
                TransferError::Timeout {
                    url: location.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                TransferError::Request {
                    url: location.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransferError::Status {
                url: location.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}
