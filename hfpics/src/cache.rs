//! Local image cache.
//!
//! Images are stored as files directly under the cache root, named by the
//! decimal image ID plus the extension of the format they were published in
//! (`11112.jpg`, `11113.webp`). Entries are written once and never
//! invalidated, updated or evicted.
//!
//! Lookups probe the bare ID first (entries written before the extension
//! was known), then each image extension.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::CacheError;
use crate::ImageId;

/// Image encoding of a cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Probe order for cache lookups.
    pub const ALL: [ImageFormat; 2] = [ImageFormat::Jpeg, ImageFormat::Webp];

    /// File extension including the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => ".jpg",
            ImageFormat::Webp => ".webp",
        }
    }

    /// Format for a manifest filename: WebP for `.webp`, JPEG otherwise.
    pub fn from_filename(filename: &str) -> Self {
        if filename.ends_with(ImageFormat::Webp.extension()) {
            ImageFormat::Webp
        } else {
            ImageFormat::Jpeg
        }
    }
}

/// Reference to an image file in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub id: ImageId,
    pub path: PathBuf,
    /// `None` for entries stored without an extension.
    pub format: Option<ImageFormat>,
}

/// File-per-image cache rooted at a directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Opens the cache at `root`, creating the directory and any missing
    /// ancestors.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| CacheError::CreateDirFailed {
            path: root.clone(),
            source: e,
        })?;
        Ok(Self { root })
    }

    /// Opens an existing cache at `root` without creating anything.
    ///
    /// Returns `None` when `root` is not a directory.
    pub fn open_existing(root: impl Into<PathBuf>) -> Option<Self> {
        let root = root.into();
        root.is_dir().then_some(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Extension-less path for `id`, the first location [`lookup`](Self::lookup) probes.
    pub fn path_for(&self, id: ImageId) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Path an entry for `id` in `format` is written to.
    pub fn entry_path(&self, id: ImageId, format: ImageFormat) -> PathBuf {
        self.root.join(format!("{}{}", id, format.extension()))
    }

    /// Finds a cached entry for `id`.
    pub fn lookup(&self, id: ImageId) -> Option<Artifact> {
        let bare = self.path_for(id);
        if bare.is_file() {
            return Some(Artifact {
                id,
                path: bare,
                format: None,
            });
        }

        ImageFormat::ALL.iter().find_map(|&format| {
            let path = self.entry_path(id, format);
            path.is_file().then(|| Artifact {
                id,
                path,
                format: Some(format),
            })
        })
    }

    /// Writes `bytes` as the cache entry for `id`.
    ///
    /// The write is not atomic; an interrupted write leaves a truncated file.
    pub fn store(
        &self,
        id: ImageId,
        format: ImageFormat,
        bytes: &[u8],
    ) -> Result<Artifact, CacheError> {
        let path = self.entry_path(id, format);
        fs::write(&path, bytes).map_err(|e| CacheError::WriteFailed {
            path: path.clone(),
            source: e,
        })?;

        info!(id, path = %path.display(), bytes = bytes.len(), "Cached image");
        Ok(Artifact {
            id,
            path,
            format: Some(format),
        })
    }

    /// Reads the content of a cached entry.
    pub fn read(&self, artifact: &Artifact) -> Result<Vec<u8>, CacheError> {
        debug!(id = artifact.id, path = %artifact.path.display(), "Reading cached image");
        fs::read(&artifact.path).map_err(|e| CacheError::ReadFailed {
            path: artifact.path.clone(),
            source: e,
        })
    }

    /// Returns `(file count, total bytes)` of the entries under the root.
    pub fn stats(&self) -> Result<(u64, u64), CacheError> {
        let read_failed = |e| CacheError::ReadFailed {
            path: self.root.clone(),
            source: e,
        };

        let mut files = 0;
        let mut bytes = 0;
        for entry in fs::read_dir(&self.root).map_err(read_failed)? {
            let metadata = entry.and_then(|e| e.metadata()).map_err(read_failed)?;
            if metadata.is_file() {
                files += 1;
                bytes += metadata.len();
            }
        }
        Ok((files, bytes))
    }
}
