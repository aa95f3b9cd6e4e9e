//! HTTP client abstraction for testability

use std::ops::Range;
use std::time::Duration;

use crate::error::FetchError;

/// Status and body of a completed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests. Implementations classify every
/// failure into a [`FetchError`]; non-success statuses are errors.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the response body.
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError>;

    /// Performs an HTTP GET restricted to the half-open byte range `range`.
    ///
    /// The request carries `Range: bytes={start}-{end - 1}`. The returned
    /// status lets callers tell a partial response (206) from a server that
    /// ignored the header (200).
    fn get_range(
        &self,
        url: &str,
        range: Range<u64>,
        timeout: Duration,
    ) -> Result<HttpResponse, FetchError>;
}

/// Formats the `Range` header value for a half-open byte range.
pub fn range_header(range: &Range<u64>) -> String {
    format!("bytes={}-{}", range.start, range.end.saturating_sub(1))
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient.
    ///
    /// Timeouts are applied per request, so one client serves both short
    /// manifest lookups and longer archive downloads.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("hfpics/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    fn send(
        &self,
        request: reqwest::blocking::RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<HttpResponse, FetchError> {
        let response = request
            .timeout(timeout)
            .send()
            .map_err(|e| classify(url, timeout, e))?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::transport(
                url,
                format!("HTTP {} from {}", status, url),
            ));
        }

        // Read response body
        let body = response
            .bytes()
            .map(|b| b.to_vec())
            .map_err(|e| classify(url, timeout, e))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, timeout: Duration) -> Result<Vec<u8>, FetchError> {
        self.send(self.client.get(url), url, timeout)
            .map(|response| response.body)
    }

    fn get_range(
        &self,
        url: &str,
        range: Range<u64>,
        timeout: Duration,
    ) -> Result<HttpResponse, FetchError> {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::RANGE, range_header(&range));
        self.send(request, url, timeout)
    }
}

/// Maps a reqwest error onto the closed fetch error kinds.
fn classify(url: &str, timeout: Duration, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::timeout(
            url,
            format!("request timed out after {}s", timeout.as_secs_f64()),
        )
    } else if err.is_decode() {
        FetchError::parse(url, format!("failed to decode response: {}", err))
    } else {
        FetchError::transport(url, format!("request failed: {}", err))
    }
}
