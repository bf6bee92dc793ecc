//! Renderer configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Database provider targeted by the rendered schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// PostgreSQL, with native type attributes and trigram indexes
    #[default]
    Postgresql,

    /// SQLite, without native type attributes
    Sqlite,
}

impl Provider {
    /// Name used in the `datasource` block.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Postgresql => "postgresql",
            Provider::Sqlite => "sqlite",
        }
    }

    /// Whether `@db.*` native type attributes are emitted.
    pub fn supports_native_types(&self) -> bool {
        matches!(self, Provider::Postgresql)
    }

    /// Whether full-text indexes render as GIN trigram indexes.
    pub fn supports_gin(&self) -> bool {
        matches!(self, Provider::Postgresql)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown provider name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown provider '{0}', expected 'postgresql' or 'sqlite'")]
pub struct UnknownProvider(pub String);

impl FromStr for Provider {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgresql" | "postgres" => Ok(Provider::Postgresql),
            "sqlite" => Ok(Provider::Sqlite),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Options controlling rendered output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Target database provider
    pub provider: Provider,

    /// Emit `///` documentation comments
    pub comments: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            provider: Provider::Postgresql,
            comments: true,
        }
    }
}

impl RenderOptions {
    /// Set the provider.
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Enable or disable documentation comments.
    pub fn with_comments(mut self, comments: bool) -> Self {
        self.comments = comments;
        self
    }
}
