//! Partial downloads from shard archives via HTTP Range requests.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::FetchError;
use crate::http::HttpClient;

/// Default timeout for archive range requests.
///
/// Longer than the manifest timeout since image payloads are larger.
pub const DEFAULT_RANGE_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP status for a satisfied Range request.
const PARTIAL_CONTENT: u16 = 206;

/// Downloads byte spans of remote archives.
///
/// Does not retry; a failed fetch is returned to the caller as-is.
pub struct RangeFetcher<'a, C: HttpClient> {
    http_client: &'a C,
    timeout: Duration,
}

impl<'a, C: HttpClient> RangeFetcher<'a, C> {
    pub fn new(http_client: &'a C) -> Self {
        Self {
            http_client,
            timeout: DEFAULT_RANGE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches `size` bytes starting at `offset` from `archive_url`.
    ///
    /// A 206 response must carry exactly `size` bytes. A 200 response means
    /// the server sent the whole resource, which is then sliced locally.
    pub fn fetch_range(
        &self,
        archive_url: &str,
        offset: u64,
        size: u64,
    ) -> Result<Vec<u8>, FetchError> {
        if size == 0 {
            return Ok(Vec::new());
        }

        let end = offset.checked_add(size).ok_or_else(|| {
            FetchError::parse(
                archive_url,
                format!("byte range {}+{} overflows", offset, size),
            )
        })?;

        debug!(url = %archive_url, offset, size, "Fetching byte range");
        let response = self
            .http_client
            .get_range(archive_url, offset..end, self.timeout)?;

        let received = response.body.len() as u64;
        if response.status == PARTIAL_CONTENT {
            if received != size {
                return Err(length_mismatch(archive_url, size, received));
            }
            return Ok(response.body);
        }

        // Range header ignored, body is the full resource
        warn!(
            url = %archive_url,
            status = response.status,
            received,
            "Server ignored Range header"
        );
        if received < end {
            return Err(length_mismatch(archive_url, end, received));
        }
        let mut body = response.body;
        body.truncate(end as usize);
        body.drain(..offset as usize);
        Ok(body)
    }
}

fn length_mismatch(url: &str, expected: u64, received: u64) -> FetchError {
    FetchError::transport(
        url,
        format!("expected {} bytes, received {}", expected, received),
    )
}
