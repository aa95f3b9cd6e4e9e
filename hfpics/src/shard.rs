//! Image ID to shard key mapping.
//!
//! The dataset is partitioned into shards of [`SHARD_SIZE`] consecutive IDs.
//! Each shard is addressed by the decimal quotient `id / SHARD_SIZE`,
//! zero-padded to four digits (`0000`, `0001`, ...). Quotients wider than
//! four digits are rendered in full.

use std::fmt;

use crate::ImageId;

/// Number of consecutive image IDs stored in one shard.
pub const SHARD_SIZE: u64 = 10_000;

/// Minimum width of a rendered shard key.
const KEY_WIDTH: usize = 4;

/// Key identifying one shard's manifest and archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShardKey(String);

impl ShardKey {
    /// Returns the key as rendered in remote paths.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// URL of this shard's JSON manifest under `base_url`.
    pub fn manifest_url(&self, base_url: &str) -> String {
        format!("{}/index/{}.json", base_url.trim_end_matches('/'), self.0)
    }

    /// URL of this shard's packed image archive under `base_url`.
    pub fn archive_url(&self, base_url: &str) -> String {
        format!("{}/images/{}.tar", base_url.trim_end_matches('/'), self.0)
    }
}

impl fmt::Display for ShardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives the shard key holding `id`.
///
/// ```
/// use hfpics::derive_shard_key;
///
/// assert_eq!(derive_shard_key(11112).as_str(), "0001");
/// assert_eq!(derive_shard_key(123456).as_str(), "0012");
/// ```
pub fn derive_shard_key(id: ImageId) -> ShardKey {
    ShardKey(format!("{:0width$}", id / SHARD_SIZE, width = KEY_WIDTH))
}
