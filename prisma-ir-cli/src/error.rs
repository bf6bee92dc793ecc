//! Error types for the CLI.
//!
//! This module defines all error types used throughout the CLI,
//! providing detailed error messages with context for debugging.

use std::path::PathBuf;

use prisma_ir::{PlanningErrors, Violations};
use prisma_ir_agent::PolicyError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Exit code for rejected input (planning or validation failures).
pub const EXIT_REJECTED: u8 = 2;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error reading an input document.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Error writing output files.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// The component plan is invalid.
    #[error("{0}")]
    Planning(#[from] PlanningErrors),

    /// The application failed validation.
    #[error("{0}")]
    Validation(#[from] Violations),

    /// Some components could not be generated.
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The generation settings are out of range.
    #[error("Invalid generation settings: {0}")]
    Policy(#[from] PolicyError),

    /// Refused to overwrite an existing file.
    #[error("File already exists: {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Planning(_) | CliError::Validation(_) | CliError::Generation(_) => {
                EXIT_REJECTED
            }
            _ => 1,
        }
    }
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a not found error.
    pub fn not_found(path: PathBuf) -> Self {
        Self::NotFound { path }
    }

    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Error reading a JSON input document.
#[derive(Debug, Error)]
pub enum InputError {
    /// Input file not found.
    #[error("Input file not found: {path}")]
    NotFound { path: PathBuf },

    /// Input file is not the expected JSON shape.
    #[error("Invalid JSON in {path}: {message}")]
    InvalidJson { path: PathBuf, message: String },

    /// IO error reading input.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to read a file already on disk.
    #[error("Failed to read existing file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to list the output directory.
    #[error("Failed to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_ir::PlanningError;

    #[test]
    fn test_exit_codes() {
        let planning = CliError::from(PlanningErrors(vec![PlanningError::unassigned("orders")]));
        assert_eq!(planning.exit_code(), EXIT_REJECTED);

        let validation = CliError::from(Violations(Vec::new()));
        assert_eq!(validation.exit_code(), EXIT_REJECTED);

        let io = CliError::from(std::io::Error::other("disk"));
        assert_eq!(io.exit_code(), 1);
    }

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::invalid_value("output.extension", "must be lowercase letters");
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for 'output.extension': must be lowercase letters"
        );
    }
}
