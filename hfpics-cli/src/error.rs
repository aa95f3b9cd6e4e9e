//! CLI error type.

use std::fmt;

use hfpics::config::ConfigError;
use hfpics::{CacheError, RetrieveError};

/// Errors surfaced to the user by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, parsed or saved.
    Config(String),

    /// Retrieval failed.
    Retrieve(RetrieveError),

    /// Reading the cache failed.
    Cache(CacheError),

    /// Writing the requested output failed.
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Retrieve(e) => write!(f, "Retrieval failed: {}", e),
            CliError::Cache(e) => write!(f, "Cache error: {}", e),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Retrieve(e) => Some(e),
            CliError::Cache(e) => Some(e),
            CliError::Config(_) | CliError::Output(_) => None,
        }
    }
}

impl From<RetrieveError> for CliError {
    fn from(e: RetrieveError) -> Self {
        CliError::Retrieve(e)
    }
}

impl From<CacheError> for CliError {
    fn from(e: CacheError) -> Self {
        CliError::Cache(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
