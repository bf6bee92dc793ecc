//! # prisma-ir-cli
//!
//! CLI library for planning, validating, rendering and generating Prisma
//! schemas from `prisma-ir` JSON documents.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`input`] - JSON input documents
//! - [`pipeline`] - The steps behind each subcommand
//! - [`writer`] - Schema directory output, dry run and stale-file detection
//! - [`error`] - Error types and exit codes

pub mod config;
pub mod error;
pub mod input;
pub mod pipeline;
pub mod writer;

pub use config::{CliArgs, Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use writer::{FileStatus, OutputReport, SchemaWriter};
