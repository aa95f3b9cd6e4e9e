//! Error types for image retrieval.
//!
//! Transport failures are classified into a small closed set of
//! [`FetchErrorKind`]s at the HTTP boundary so callers can branch on the kind
//! instead of parsing messages. The original cause text is kept for display.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Classification of a failed remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// The request did not complete within its timeout.
    Timeout,
    /// Connection, status or body transfer failure.
    TransportFailure,
    /// The response body could not be interpreted.
    ParseFailure,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchErrorKind::Timeout => write!(f, "timed out"),
            FetchErrorKind::TransportFailure => write!(f, "transport failure"),
            FetchErrorKind::ParseFailure => write!(f, "parse failure"),
        }
    }
}

/// A manifest or archive fetch failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("fetching {url} failed ({kind}): {cause}")]
pub struct FetchError {
    kind: FetchErrorKind,
    url: String,
    cause: String,
}

impl FetchError {
    /// Creates a fetch error for `url`.
    pub fn new(kind: FetchErrorKind, url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            cause: cause.into(),
        }
    }

    pub fn timeout(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::Timeout, url, cause)
    }

    pub fn transport(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::TransportFailure, url, cause)
    }

    pub fn parse(url: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::new(FetchErrorKind::ParseFailure, url, cause)
    }

    pub fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Human-readable cause of the failure.
    pub fn cause(&self) -> &str {
        &self.cause
    }
}

/// Errors from the local image cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to create the cache root.
    #[error("failed to create cache directory {path}: {source}")]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// Failed to read a cache entry.
    #[error("failed to read {path}: {source}")]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a cache entry.
    #[error("failed to write {path}: {source}")]
    WriteFailed { path: PathBuf, source: io::Error },
}

/// Errors returned by [`Retriever`](crate::Retriever).
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// A caller-supplied argument was rejected before any work was done.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Manifest or archive fetch failed.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Local cache I/O failed.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::timeout("https://example.com/index/0001.json", "after 10s");
        assert_eq!(
            err.to_string(),
            "fetching https://example.com/index/0001.json failed (timed out): after 10s"
        );
    }

    #[test]
    fn test_fetch_error_accessors() {
        let err = FetchError::parse("http://x/index/0000.json", "expected value at line 1");
        assert_eq!(err.kind(), FetchErrorKind::ParseFailure);
        assert_eq!(err.url(), "http://x/index/0000.json");
        assert_eq!(err.cause(), "expected value at line 1");
    }

    #[test]
    fn test_retrieve_error_from_fetch_is_transparent() {
        let fetch = FetchError::transport("http://x/images/0000.tar", "HTTP 503");
        let err: RetrieveError = fetch.clone().into();
        assert!(matches!(err, RetrieveError::Fetch(_)));
        assert_eq!(err.to_string(), fetch.to_string());
    }

    #[test]
    fn test_cache_error_display() {
        let err = CacheError::WriteFailed {
            path: PathBuf::from("/cache/11112.jpg"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/cache/11112.jpg"));
        assert!(err.to_string().contains("denied"));
    }
}
