//! Retriever configuration.
//!
//! [`RetrieverConfig`] is passed explicitly to [`Retriever::new`](crate::Retriever::new).
//! [`ConfigFile`] persists user defaults in `~/.hfpics/config.ini`:
//!
//! ```ini
//! [dataset]
//! repo = picollect/a_1024
//! endpoint = https://huggingface.co
//!
//! [cache]
//! directory = ~/.cache/hf_pics
//!
//! [network]
//! manifest_timeout = 10
//! range_timeout = 30
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::manifest::DEFAULT_MANIFEST_TIMEOUT;
use crate::range::DEFAULT_RANGE_TIMEOUT;

/// Dataset repository used when none is configured.
pub const DEFAULT_REPO: &str = "picollect/a_1024";

/// Dataset hosting service.
pub const DEFAULT_ENDPOINT: &str = "https://huggingface.co";

/// Cache directory used when none is configured, relative to the home directory.
pub const DEFAULT_CACHE_DIR: &str = "~/.cache/hf_pics";

/// Configuration for a [`Retriever`](crate::Retriever).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieverConfig {
    /// Dataset repository identifier (`owner/name`).
    pub repo: String,

    /// Base URL of the hosting service.
    pub endpoint: String,

    /// Directory holding cached images.
    pub cache_dir: PathBuf,

    /// Timeout for manifest requests.
    pub manifest_timeout: Duration,

    /// Timeout for archive range requests.
    pub range_timeout: Duration,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_dir: expand_tilde(DEFAULT_CACHE_DIR),
            manifest_timeout: DEFAULT_MANIFEST_TIMEOUT,
            range_timeout: DEFAULT_RANGE_TIMEOUT,
        }
    }
}

impl RetrieverConfig {
    /// Create a configuration for `repo` cached under `cache_dir`.
    pub fn new(repo: impl Into<String>, cache_dir: impl AsRef<Path>) -> Self {
        Self {
            repo: repo.into(),
            cache_dir: expand_tilde(cache_dir),
            ..Default::default()
        }
    }

    /// Build a configuration from the values in a config file.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            repo: config.repo.clone(),
            endpoint: config.endpoint.clone(),
            cache_dir: expand_tilde(&config.cache_dir),
            manifest_timeout: config.manifest_timeout,
            range_timeout: config.range_timeout,
        }
    }

    /// Set the dataset repository.
    pub fn with_repo(mut self, repo: impl Into<String>) -> Self {
        self.repo = repo.into();
        self
    }

    /// Set the hosting service base URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the cache directory. A leading `~` is expanded.
    pub fn with_cache_dir(mut self, cache_dir: impl AsRef<Path>) -> Self {
        self.cache_dir = expand_tilde(cache_dir);
        self
    }

    /// Set the manifest request timeout.
    pub fn with_manifest_timeout(mut self, timeout: Duration) -> Self {
        self.manifest_timeout = timeout;
        self
    }

    /// Set the archive range request timeout.
    pub fn with_range_timeout(mut self, timeout: Duration) -> Self {
        self.range_timeout = timeout;
        self
    }

    /// Base URL of the dataset's main branch files.
    pub fn base_url(&self) -> String {
        format!(
            "{}/datasets/{}/resolve/main",
            self.endpoint.trim_end_matches('/'),
            self.repo
        )
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory is known, are
/// returned unchanged.
pub fn expand_tilde(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Errors loading or saving the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: ConfigKey,
        value: String,
        reason: String,
    },

    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("cannot determine home directory")]
    NoHomeDir,
}

/// Settable configuration keys, addressed as `section.key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    DatasetRepo,
    DatasetEndpoint,
    CacheDirectory,
    NetworkManifestTimeout,
    NetworkRangeTimeout,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::DatasetRepo,
        ConfigKey::DatasetEndpoint,
        ConfigKey::CacheDirectory,
        ConfigKey::NetworkManifestTimeout,
        ConfigKey::NetworkRangeTimeout,
    ];

    fn section(&self) -> &'static str {
        match self {
            ConfigKey::DatasetRepo | ConfigKey::DatasetEndpoint => "dataset",
            ConfigKey::CacheDirectory => "cache",
            ConfigKey::NetworkManifestTimeout | ConfigKey::NetworkRangeTimeout => "network",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ConfigKey::DatasetRepo => "repo",
            ConfigKey::DatasetEndpoint => "endpoint",
            ConfigKey::CacheDirectory => "directory",
            ConfigKey::NetworkManifestTimeout => "manifest_timeout",
            ConfigKey::NetworkRangeTimeout => "range_timeout",
        }
    }

    /// Current value of this key, rendered as it is stored.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::DatasetRepo => config.repo.clone(),
            ConfigKey::DatasetEndpoint => config.endpoint.clone(),
            ConfigKey::CacheDirectory => config.cache_dir.display().to_string(),
            ConfigKey::NetworkManifestTimeout => config.manifest_timeout.as_secs().to_string(),
            ConfigKey::NetworkRangeTimeout => config.range_timeout.as_secs().to_string(),
        }
    }

    /// Parse and assign `value` to this key.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::DatasetRepo => {
                if !value.contains('/') {
                    return Err(self.invalid(value, "expected owner/name"));
                }
                config.repo = value.to_string();
            }
            ConfigKey::DatasetEndpoint => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(self.invalid(value, "expected an http(s) URL"));
                }
                config.endpoint = value.to_string();
            }
            ConfigKey::CacheDirectory => config.cache_dir = PathBuf::from(value),
            ConfigKey::NetworkManifestTimeout => config.manifest_timeout = self.seconds(value)?,
            ConfigKey::NetworkRangeTimeout => config.range_timeout = self.seconds(value)?,
        }
        Ok(())
    }

    fn seconds(&self, value: &str) -> Result<Duration, ConfigError> {
        match value.parse::<u64>() {
            Ok(0) => Err(self.invalid(value, "timeout must be positive")),
            Ok(secs) => Ok(Duration::from_secs(secs)),
            Err(e) => Err(self.invalid(value, &e.to_string())),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        ConfigError::InvalidValue {
            key: *self,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.to_string() == s)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

/// User configuration persisted as INI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub repo: String,
    pub endpoint: String,
    /// Stored unexpanded so `~` survives a save.
    pub cache_dir: PathBuf,
    pub manifest_timeout: Duration,
    pub range_timeout: Duration,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            manifest_timeout: DEFAULT_MANIFEST_TIMEOUT,
            range_timeout: DEFAULT_RANGE_TIMEOUT,
        }
    }
}

/// Path of the user's config file.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".hfpics").join("config.ini"))
}

impl ConfigFile {
    /// Load from the default location. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path().ok_or(ConfigError::NoHomeDir)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load from `path`. Keys absent from the file keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();
        for key in ConfigKey::ALL {
            if let Some(value) = ini.get_from(Some(key.section()), key.name()) {
                key.set(&mut config, value)?;
            }
        }
        Ok(config)
    }

    /// Save to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_file_path().ok_or(ConfigError::NoHomeDir)?;
        self.save_to(&path)
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_failed = |e| ConfigError::Write {
            path: path.to_path_buf(),
            source: e,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::ALL {
            ini.with_section(Some(key.section()))
                .set(key.name(), key.get(self));
        }
        ini.write_to_file(path).map_err(write_failed)
    }
}
