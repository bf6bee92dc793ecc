//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `prisma-ir.toml` files
//! and merging with command-line arguments.

use std::path::{Path, PathBuf};
use std::time::Duration;

use prisma_ir::render::Provider;
use prisma_ir::{PlannerOptions, RenderOptions};
use prisma_ir_agent::{PolicyError, RetryPolicy};
use serde::Deserialize;

use crate::error::{CliResult, ConfigError};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "prisma-ir.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration.
    pub output: OutputConfig,

    /// Rendering options.
    pub render: RenderConfig,

    /// Producer retry settings.
    pub generation: GenerationConfig,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory for generated schema files.
    pub dir: PathBuf,

    /// Extension of planned schema filenames.
    pub extension: String,

    /// Whether to also write `main.prisma` with the datasource header.
    pub datasource: bool,
}

/// Rendering configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Target database provider.
    pub provider: Provider,

    /// Whether to emit `///` documentation comments.
    pub comments: bool,
}

/// Generation configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Attempts per component before giving up.
    pub max_attempts: u32,

    /// Timeout of one producer call, in milliseconds.
    pub timeout_ms: u64,

    /// Pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./prisma"),
            extension: "prisma".to_string(),
            datasource: true,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Postgresql,
            comments: true,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: RetryPolicy::DEFAULT_MAX_ATTEMPTS,
            timeout_ms: 120_000,
            retry_delay_ms: 0,
        }
    }
}

impl Config {
    /// Options for the renderer.
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions::default()
            .with_provider(self.render.provider)
            .with_comments(self.render.comments)
    }

    /// Options for the planner.
    pub fn planner_options(&self) -> PlannerOptions {
        PlannerOptions {
            extension: self.output.extension.clone(),
        }
    }

    /// Retry policy for the generate command.
    pub fn retry_policy(&self) -> Result<RetryPolicy, PolicyError> {
        Ok(RetryPolicy::new(self.generation.max_attempts)?
            .with_timeout(Duration::from_millis(self.generation.timeout_ms))?
            .with_retry_delay(Duration::from_millis(self.generation.retry_delay_ms)))
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// Without a path, `prisma-ir.toml` in the current directory is used if
    /// it exists and defaults otherwise. An explicit path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::not_found(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(CONFIG_FILENAME),
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Self::check(&config)?;
        Ok(config)
    }

    /// Reject values that would produce unusable output.
    pub fn check(config: &Config) -> Result<(), ConfigError> {
        let extension = &config.output.extension;
        if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_lowercase()) {
            return Err(ConfigError::invalid_value(
                "output.extension",
                format!("'{extension}' must be non-empty lowercase ASCII letters"),
            ));
        }
        Ok(())
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref extension) = args.extension {
            config.output.extension = extension.clone();
        }

        if let Some(datasource) = args.datasource {
            config.output.datasource = datasource;
        }

        if let Some(provider) = args.provider {
            config.render.provider = provider;
        }

        if let Some(comments) = args.comments {
            config.render.comments = comments;
        }

        if let Some(max_attempts) = args.max_attempts {
            config.generation.max_attempts = max_attempts;
        }

        if let Some(timeout_ms) = args.timeout_ms {
            config.generation.timeout_ms = timeout_ms;
        }

        config
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# prisma-ir configuration file

[output]
# Output directory for rendered schema files
dir = "./prisma"

# Extension of planned schema filenames (schema-01-actors.prisma)
extension = "prisma"

# Whether to also write main.prisma with the generator and datasource blocks
datasource = true

[render]
# Target database provider (postgresql, sqlite)
provider = "postgresql"

# Whether to emit /// documentation comments from model and field descriptions
comments = true

[generation]
# Attempts per component before the component is reported as failed
max_attempts = 3

# Timeout of a single producer call, in milliseconds
timeout_ms = 120000

# Pause between attempts, in milliseconds
retry_delay_ms = 0
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Filename extension override.
    pub extension: Option<String>,

    /// Datasource header override.
    pub datasource: Option<bool>,

    /// Provider override.
    pub provider: Option<Provider>,

    /// Comments override.
    pub comments: Option<bool>,

    /// Attempt budget override.
    pub max_attempts: Option<u32>,

    /// Producer timeout override.
    pub timeout_ms: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("./prisma"));
        assert_eq!(config.output.extension, "prisma");
        assert!(config.output.datasource);
        assert_eq!(config.render.provider, Provider::Postgresql);
        assert!(config.render.comments);
        assert_eq!(config.generation.max_attempts, 3);
        assert_eq!(config.generation.timeout_ms, 120_000);
        assert_eq!(config.generation.retry_delay_ms, 0);
    }

    #[test]
    fn test_merge_cli_args_output() {
        let config = Config::default();
        let args = CliArgs {
            output: Some(PathBuf::from("./custom")),
            provider: Some(Provider::Sqlite),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(config, &args);
        assert_eq!(merged.output.dir, PathBuf::from("./custom"));
        assert_eq!(merged.render.provider, Provider::Sqlite);
    }

    #[test]
    fn test_merge_cli_args_preserves_unset() {
        let config = Config::default();
        let args = CliArgs::default();

        let merged = ConfigManager::merge_cli_args(config.clone(), &args);
        assert_eq!(merged, config);
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[output]
dir = "./schema"
extension = "prisma"
datasource = false

[render]
provider = "sqlite"
comments = false

[generation]
max_attempts = 5
timeout_ms = 1000
retry_delay_ms = 250
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("./schema"));
        assert!(!config.output.datasource);
        assert_eq!(config.render.provider, Provider::Sqlite);
        assert!(!config.render.comments);

        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.timeout(), Duration::from_millis(1000));
        assert_eq!(policy.retry_delay(), Duration::from_millis(250));

        let options = config.render_options();
        assert_eq!(options.provider, Provider::Sqlite);
        assert!(!options.comments);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[render]\nprovider = \"sqlite\"\n").unwrap();
        assert_eq!(config.render.provider, Provider::Sqlite);
        assert!(config.render.comments);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_check_rejects_bad_extension() {
        let mut config = Config::default();
        config.output.extension = "Prisma.v2".to_string();
        assert!(matches!(
            ConfigManager::check(&config),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_zero_attempts_rejected_by_policy() {
        let mut config = Config::default();
        config.generation.max_attempts = 0;
        assert!(config.retry_policy().is_err());
    }
}
