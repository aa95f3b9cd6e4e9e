//! Cache-first image retrieval.
//!
//! [`Retriever`] wires the resolution pipeline together:
//!
//! ```text
//! get(id, form)
//!   │
//!   ├─ CacheStore::lookup ──── hit ──────────────────────────► deliver
//!   │
//!   └─ miss ─► derive_shard_key ─► ManifestClient::fetch_manifest
//!                                    │
//!                                    ├─ locate ── none ──────► NotFound
//!                                    │
//!                                    └─ RangeFetcher::fetch_range
//!                                         └─ CacheStore::store ► deliver
//! ```
//!
//! Each call is synchronous and performs at most two network requests.
//! Concurrent calls for the same uncached ID are not coordinated; both may
//! fetch and the last write wins.

use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info};

use crate::cache::{Artifact, CacheStore, ImageFormat};
use crate::config::RetrieverConfig;
use crate::error::RetrieveError;
use crate::http::{HttpClient, ReqwestClient};
use crate::manifest::ManifestClient;
use crate::range::RangeFetcher;
use crate::shard::derive_shard_key;
use crate::ImageId;

/// How a retrieved image is handed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnForm {
    /// Path of the cache file.
    Path,
    /// Raw image bytes.
    Content,
}

impl FromStr for ReturnForm {
    type Err = RetrieveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(ReturnForm::Path),
            "content" => Ok(ReturnForm::Content),
            other => Err(RetrieveError::InvalidArgument(format!(
                "return form must be 'path' or 'content', got '{}'",
                other
            ))),
        }
    }
}

/// Outcome of a retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retrieval {
    /// Path of the cached image file.
    Path(PathBuf),
    /// Image bytes.
    Content(Vec<u8>),
    /// The dataset has no image for the requested ID.
    NotFound,
}

impl Retrieval {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Retrieval::NotFound)
    }
}

/// Retrieves dataset images by ID through the local cache.
pub struct Retriever<C: HttpClient = ReqwestClient> {
    config: RetrieverConfig,
    base_url: String,
    cache: CacheStore,
    http_client: C,
}

impl Retriever<ReqwestClient> {
    /// Creates a retriever using a reqwest HTTP client.
    ///
    /// Creates the cache directory if it does not exist.
    pub fn new(config: RetrieverConfig) -> Result<Self, RetrieveError> {
        let http_client =
            ReqwestClient::new().map_err(|e| RetrieveError::HttpClient(e.to_string()))?;
        Self::with_client(config, http_client)
    }
}

impl<C: HttpClient> Retriever<C> {
    /// Creates a retriever using the given HTTP client.
    pub fn with_client(config: RetrieverConfig, http_client: C) -> Result<Self, RetrieveError> {
        let cache = CacheStore::new(&config.cache_dir)?;
        let base_url = config.base_url();
        debug!(repo = %config.repo, cache_dir = %config.cache_dir.display(), "Retriever ready");

        Ok(Self {
            config,
            base_url,
            cache,
            http_client,
        })
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Base URL of the dataset files.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub fn http_client(&self) -> &C {
        &self.http_client
    }

    /// Manifest client bound to this retriever's dataset.
    pub fn manifest_client(&self) -> ManifestClient<'_, C> {
        ManifestClient::new(&self.http_client, &self.base_url)
            .with_timeout(self.config.manifest_timeout)
    }

    fn range_fetcher(&self) -> RangeFetcher<'_, C> {
        RangeFetcher::new(&self.http_client).with_timeout(self.config.range_timeout)
    }

    /// Retrieves image `id`, returned as `"path"` or `"content"`.
    ///
    /// An unrecognised `form` is rejected with
    /// [`RetrieveError::InvalidArgument`] before the cache or network is
    /// touched.
    pub fn get(&self, id: ImageId, form: &str) -> Result<Retrieval, RetrieveError> {
        let form = form.parse()?;
        self.retrieve(id, form)
    }

    /// Retrieves image `id` in the given form.
    pub fn retrieve(&self, id: ImageId, form: ReturnForm) -> Result<Retrieval, RetrieveError> {
        if let Some(artifact) = self.cache.lookup(id) {
            debug!(id, path = %artifact.path.display(), "Cache hit");
            return self.deliver(artifact, None, form);
        }

        let shard = derive_shard_key(id);
        debug!(id, shard = %shard, "Cache miss");

        let manifests = self.manifest_client();
        let manifest = manifests.fetch_manifest(&shard)?;
        let Some((filename, entry)) = manifests.locate(&manifest, id)? else {
            info!(id, shard = %shard, "No image for ID");
            return Ok(Retrieval::NotFound);
        };
        debug!(id, filename, offset = entry.offset, size = entry.size, "Located image");

        let archive_url = shard.archive_url(&self.base_url);
        let bytes = self
            .range_fetcher()
            .fetch_range(&archive_url, entry.offset, entry.size)?;

        let artifact = self
            .cache
            .store(id, ImageFormat::from_filename(filename), &bytes)?;
        self.deliver(artifact, Some(bytes), form)
    }

    /// Hands back `artifact` in `form`, reading the file only when the bytes
    /// are not already in hand.
    fn deliver(
        &self,
        artifact: Artifact,
        bytes: Option<Vec<u8>>,
        form: ReturnForm,
    ) -> Result<Retrieval, RetrieveError> {
        match (form, bytes) {
            (ReturnForm::Path, _) => Ok(Retrieval::Path(artifact.path)),
            (ReturnForm::Content, Some(bytes)) => Ok(Retrieval::Content(bytes)),
            (ReturnForm::Content, None) => Ok(Retrieval::Content(self.cache.read(&artifact)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, FetchErrorKind};
    use crate::http::tests::MockHttpClient;
    use std::fs;
    use tempfile::TempDir;

    const REPO: &str = "test/pics";

    fn config(temp: &TempDir) -> RetrieverConfig {
        RetrieverConfig::new(REPO, temp.path().join("cache"))
    }

    fn base_url() -> String {
        format!("https://huggingface.co/datasets/{}/resolve/main", REPO)
    }

    fn manifest_url() -> String {
        format!("{}/index/0001.json", base_url())
    }

    fn archive_url() -> String {
        format!("{}/images/0001.tar", base_url())
    }

    fn archive() -> Vec<u8> {
        let mut body = vec![b'j'; 100];
        body.extend(vec![b'w'; 200]);
        body
    }

    fn mock_dataset() -> MockHttpClient {
        let manifest = r#"{"files": {
            "11112.jpg": {"offset": 0, "size": 100},
            "11113.webp": {"offset": 100, "size": 200},
            "other.txt": {"offset": 300, "size": 50}
        }}"#;
        MockHttpClient::new()
            .with_body(manifest_url(), manifest)
            .with_body(archive_url(), archive())
    }

    #[test]
    fn test_return_form_parse() {
        assert_eq!("path".parse::<ReturnForm>().unwrap(), ReturnForm::Path);
        assert_eq!("content".parse::<ReturnForm>().unwrap(), ReturnForm::Content);
        assert!(matches!(
            "Path".parse::<ReturnForm>(),
            Err(RetrieveError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_get_path_fetches_and_caches() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), mock_dataset()).unwrap();

        let result = retriever.get(11112, "path").unwrap();
        let expected = temp.path().join("cache").join("11112.jpg");
        assert_eq!(result, Retrieval::Path(expected.clone()));
        assert_eq!(fs::read(&expected).unwrap(), vec![b'j'; 100]);

        let requests = retriever.http_client.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, manifest_url());
        assert_eq!(requests[1].url, archive_url());
        assert_eq!(requests[1].range, Some(0..100));
    }

    #[test]
    fn test_get_content_webp() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), mock_dataset()).unwrap();

        let result = retriever.get(11113, "content").unwrap();
        assert_eq!(result, Retrieval::Content(vec![b'w'; 200]));
        assert!(temp.path().join("cache").join("11113.webp").is_file());
    }

    #[test]
    fn test_cache_hit_skips_network() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), MockHttpClient::new()).unwrap();
        retriever
            .cache()
            .store(11112, ImageFormat::Jpeg, b"cached bytes")
            .unwrap();

        let content = retriever.get(11112, "content").unwrap();
        assert_eq!(content, Retrieval::Content(b"cached bytes".to_vec()));
        assert_eq!(retriever.http_client.request_count(), 0);
    }

    #[test]
    fn test_second_get_is_served_from_cache() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), mock_dataset()).unwrap();

        let Retrieval::Content(first) = retriever.get(11113, "content").unwrap() else {
            panic!("expected content");
        };
        let Retrieval::Path(path) = retriever.get(11113, "path").unwrap() else {
            panic!("expected path");
        };
        assert_eq!(fs::read(path).unwrap(), first);
        assert_eq!(retriever.http_client.request_count(), 2);
    }

    #[test]
    fn test_not_found() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), mock_dataset()).unwrap();

        let result = retriever.get(19999, "path").unwrap();
        assert!(result.is_not_found());
        assert_eq!(retriever.http_client.request_count(), 1);
        assert_eq!(retriever.cache().stats().unwrap(), (0, 0));
    }

    #[test]
    fn test_unrelated_manifest_entries_are_ignored() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new()
            .with_body(
                manifest_url(),
                r#"{"files": {
                    "11112.jpg": {"offset": 0, "size": 4},
                    "README.txt": {"note": "metadata only"}
                }}"#,
            )
            .with_body(archive_url(), b"abcd".to_vec());
        let retriever = Retriever::with_client(config(&temp), client).unwrap();

        let result = retriever.get(11112, "content").unwrap();
        assert_eq!(result, Retrieval::Content(b"abcd".to_vec()));
    }

    #[test]
    fn test_malformed_matching_entry_is_parse_failure() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new()
            .with_body(manifest_url(), r#"{"files": {"11112.jpg": {"offset": -1, "size": 4}}}"#);
        let retriever = Retriever::with_client(config(&temp), client).unwrap();

        let err = retriever.get(11112, "path").unwrap_err();
        assert!(matches!(
            err,
            RetrieveError::Fetch(ref f) if f.kind() == FetchErrorKind::ParseFailure
        ));
        assert_eq!(retriever.http_client.request_count(), 1);
        assert!(retriever.cache().lookup(11112).is_none());
    }

    #[test]
    fn test_invalid_form_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), mock_dataset()).unwrap();

        let err = retriever.get(11112, "invalid").unwrap_err();
        assert!(matches!(err, RetrieveError::InvalidArgument(_)));
        assert_eq!(retriever.http_client.request_count(), 0);
        assert_eq!(retriever.cache().stats().unwrap(), (0, 0));
    }

    #[test]
    fn test_manifest_timeout_leaves_no_cache_entry() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new()
            .with_error(manifest_url(), FetchError::timeout(manifest_url(), "10s"));
        let retriever = Retriever::with_client(config(&temp), client).unwrap();

        let err = retriever.get(11112, "path").unwrap_err();
        match err {
            RetrieveError::Fetch(fetch) => assert_eq!(fetch.kind(), FetchErrorKind::Timeout),
            other => panic!("unexpected error: {other}"),
        }
        assert!(retriever.cache().lookup(11112).is_none());
    }

    #[test]
    fn test_archive_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let client = MockHttpClient::new()
            .with_body(manifest_url(), r#"{"files": {"11112.jpg": {"offset": 0, "size": 10}}}"#)
            .with_error(archive_url(), FetchError::transport(archive_url(), "HTTP 500"));
        let retriever = Retriever::with_client(config(&temp), client).unwrap();

        let err = retriever.get(11112, "content").unwrap_err();
        assert!(matches!(err, RetrieveError::Fetch(_)));
        assert!(retriever.cache().lookup(11112).is_none());
    }

    #[test]
    fn test_timeouts_come_from_config() {
        let temp = TempDir::new().unwrap();
        let config = config(&temp)
            .with_manifest_timeout(std::time::Duration::from_secs(1))
            .with_range_timeout(std::time::Duration::from_secs(2));
        let retriever = Retriever::with_client(config, mock_dataset()).unwrap();

        retriever.get(11112, "path").unwrap();
        let requests = retriever.http_client.requests();
        assert_eq!(requests[0].timeout.as_secs(), 1);
        assert_eq!(requests[1].timeout.as_secs(), 2);
    }

    #[test]
    fn test_with_client_creates_cache_dir() {
        let temp = TempDir::new().unwrap();
        let retriever = Retriever::with_client(config(&temp), MockHttpClient::new()).unwrap();
        assert!(retriever.cache().root().is_dir());
        assert_eq!(retriever.base_url(), base_url());
    }
}
