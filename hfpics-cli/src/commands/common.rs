//! Common types and utilities shared across CLI commands.

use std::path::PathBuf;

use hfpics::config::ConfigFile;
use hfpics::RetrieverConfig;

use crate::error::CliError;

/// Global CLI arguments that override config file values.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub repo: Option<String>,
    pub cache_dir: Option<PathBuf>,
}

/// Resolve retriever settings from CLI args and config.
pub fn resolve_config(overrides: &Overrides) -> Result<RetrieverConfig, CliError> {
    let file = ConfigFile::load()?;
    Ok(apply_overrides(
        RetrieverConfig::from_config_file(&file),
        overrides,
    ))
}

/// CLI takes precedence, then config.
pub fn apply_overrides(mut config: RetrieverConfig, overrides: &Overrides) -> RetrieverConfig {
    if let Some(repo) = &overrides.repo {
        config = config.with_repo(repo.clone());
    }
    if let Some(dir) = &overrides.cache_dir {
        config = config.with_cache_dir(dir);
    }
    config
}

/// Format a byte count for display.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let mut size = bytes as f64 / 1024.0;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_overrides() {
        let base = RetrieverConfig::new("picollect/a_1024", "/tmp/base");
        let overrides = Overrides {
            repo: Some("other/set".to_string()),
            cache_dir: None,
        };

        let config = apply_overrides(base, &overrides);
        assert_eq!(config.repo, "other/set");
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/base"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }
}
