//! Cache inspection CLI commands.

use std::process::ExitCode;

use clap::Subcommand;
use hfpics::CacheStore;

use super::common::{format_size, resolve_config, Overrides};
use crate::error::CliError;

/// Cache action subcommands.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Show the cache directory
    Path,
    /// Show cache statistics
    Stats,
    /// Show whether an ID is cached, and where
    Lookup {
        /// Image ID
        id: u64,
    },
}

/// Run a cache subcommand.
pub fn run(action: CacheAction, overrides: &Overrides) -> Result<ExitCode, CliError> {
    let config = resolve_config(overrides)?;

    match action {
        CacheAction::Path => {
            println!("{}", config.cache_dir.display());
            Ok(ExitCode::SUCCESS)
        }
        CacheAction::Stats => {
            println!("Image cache: {}", config.cache_dir.display());
            let Some(store) = CacheStore::open_existing(&config.cache_dir) else {
                println!("  (not created yet)");
                return Ok(ExitCode::SUCCESS);
            };
            let (files, bytes) = store.stats()?;
            println!("  Files: {}", files);
            println!("  Size:  {}", format_size(bytes));
            Ok(ExitCode::SUCCESS)
        }
        CacheAction::Lookup { id } => {
            let artifact =
                CacheStore::open_existing(&config.cache_dir).and_then(|store| store.lookup(id));
            match artifact {
                Some(artifact) => {
                    println!("{}", artifact.path.display());
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("ID {} is not cached", id);
                    Ok(ExitCode::from(2))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inspection_does_not_create_cache_dir() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("never_created");
        let overrides = Overrides {
            repo: None,
            cache_dir: Some(missing.clone()),
        };

        assert!(run(CacheAction::Stats, &overrides).is_ok());
        assert!(run(CacheAction::Lookup { id: 11112 }, &overrides).is_ok());
        assert!(!missing.exists());
    }
}
