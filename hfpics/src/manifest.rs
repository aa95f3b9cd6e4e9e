//! Shard manifest fetching and lookup.
//!
//! Every shard publishes a JSON index at `index/{shard}.json`:
//!
//! ```text
//! {"files": {"11112.jpg": {"offset": 0, "size": 100}, ...}}
//! ```
//!
//! Each entry gives the byte span of one image inside the shard's tar
//! archive. Entries keep the order they have in the document, and lookups
//! return the first qualifying entry.

use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::FetchError;
use crate::http::HttpClient;
use crate::shard::ShardKey;
use crate::ImageId;

/// Default timeout for manifest requests.
pub const DEFAULT_MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Filename suffixes recognised as images.
pub const IMAGE_EXTENSIONS: [&str; 2] = [".jpg", ".webp"];

/// Byte span of one file inside a shard archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub offset: u64,
    pub size: u64,
}

impl ManifestEntry {
    /// Half-open byte range of the entry within the archive.
    pub fn byte_range(&self) -> std::ops::Range<u64> {
        self.offset..self.offset.saturating_add(self.size)
    }
}

#[derive(Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    files: serde_json::Map<String, Value>,
}

/// Parsed index of one shard.
///
/// Entry bodies are kept undecoded. Only the entry a lookup selects has to
/// carry an integer `offset` and `size`; other files may describe themselves
/// however they like.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    shard: ShardKey,
    files: Vec<(String, Value)>,
}

impl Manifest {
    /// Creates a manifest from already-parsed entries, kept in the given order.
    pub fn new(shard: ShardKey, files: Vec<(String, ManifestEntry)>) -> Self {
        let files = files
            .into_iter()
            .map(|(name, entry)| (name, json!({"offset": entry.offset, "size": entry.size})))
            .collect();
        Self { shard, files }
    }

    /// Parses a manifest document.
    ///
    /// A document without a `files` object is an empty manifest. The body
    /// must be a JSON object, and `files`, when present, must be an object.
    pub fn parse(shard: ShardKey, body: &[u8]) -> Result<Self, serde_json::Error> {
        let document: ManifestDocument = serde_json::from_slice(body)?;
        Ok(Self {
            shard,
            files: document.files.into_iter().collect(),
        })
    }

    pub fn shard(&self) -> &ShardKey {
        &self.shard
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates filenames in document order.
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.iter().map(|(name, _)| name.as_str())
    }

    /// Finds the image entry for `id`.
    ///
    /// Matches the first filename that starts with the decimal ID and ends
    /// with an accepted image extension. Fails only when that entry lacks an
    /// integer `offset` or `size`.
    pub fn locate(&self, id: ImageId) -> Result<Option<(&str, ManifestEntry)>, serde_json::Error> {
        let prefix = id.to_string();
        let Some((name, value)) = self.files.iter().find(|(name, _)| {
            name.starts_with(&prefix) && IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        }) else {
            return Ok(None);
        };

        let entry = ManifestEntry::deserialize(value)?;
        Ok(Some((name.as_str(), entry)))
    }
}

/// Fetches shard manifests from a dataset base URL.
pub struct ManifestClient<'a, C: HttpClient> {
    http_client: &'a C,
    base_url: &'a str,
    timeout: Duration,
}

impl<'a, C: HttpClient> ManifestClient<'a, C> {
    pub fn new(http_client: &'a C, base_url: &'a str) -> Self {
        Self {
            http_client,
            base_url,
            timeout: DEFAULT_MANIFEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Downloads and parses the manifest for `shard`.
    pub fn fetch_manifest(&self, shard: &ShardKey) -> Result<Manifest, FetchError> {
        let url = shard.manifest_url(self.base_url);
        debug!(shard = %shard, url = %url, "Fetching manifest");

        let body = self.http_client.get(&url, self.timeout)?;
        let manifest = Manifest::parse(shard.clone(), &body)
            .map_err(|e| FetchError::parse(&url, format!("malformed manifest: {}", e)))?;

        debug!(shard = %shard, entries = manifest.len(), "Manifest parsed");
        Ok(manifest)
    }

    /// Finds the entry for `id` in `manifest`.
    ///
    /// A matching entry without a usable byte span is a
    /// [`ParseFailure`](crate::FetchErrorKind::ParseFailure) against the
    /// manifest URL.
    pub fn locate<'m>(
        &self,
        manifest: &'m Manifest,
        id: ImageId,
    ) -> Result<Option<(&'m str, ManifestEntry)>, FetchError> {
        manifest.locate(id).map_err(|e| {
            FetchError::parse(
                manifest.shard().manifest_url(self.base_url),
                format!("malformed entry for {}: {}", id, e),
            )
        })
    }
}
