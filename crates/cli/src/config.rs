//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taxonomy_kit_domain::usecases::ResolverConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub resolver: ResolverSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverSettings {
    #[serde(default = "default_group")]
    pub default_group: String,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "default_group_label")]
    pub group_label: String,

    #[serde(default = "default_document_label")]
    pub document_label: String,
}

// Default value functions
fn default_db_path() -> PathBuf {
    PathBuf::from("./taxonomy.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_group() -> String {
    ResolverConfig::default().default_group
}

fn default_key_prefix() -> String {
    ResolverConfig::default().key_prefix
}

fn default_group_label() -> String {
    ResolverConfig::default().group_label
}

fn default_document_label() -> String {
    ResolverConfig::default().document_label
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
        }
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            default_group: default_group(),
            key_prefix: default_key_prefix(),
            group_label: default_group_label(),
            document_label: default_document_label(),
        }
    }
}

impl ResolverSettings {
    pub fn to_resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            default_group: self.default_group.clone(),
            key_prefix: self.key_prefix.clone(),
            group_label: self.group_label.clone(),
            document_label: self.document_label.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            // User specified a path that doesn't exist
            anyhow::bail!("Config file not found: {}", path.display());
        }

        // Add environment variable overrides
        builder = builder.add_source(
            config::Environment::with_prefix("TAXONOMY_KIT")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# taxonomy-kit configuration

[general]
db_path = "./taxonomy.sqlite"
log_level = "info"

[resolver]
# Group used when a command is not given --group
default_group = "Default"
# Pointer records live at "<key_prefix>:<group>:active"
key_prefix = "taxonomy"
# Wording of the "No <document_label> found for <group_label>: <group>" message
group_label = "group"
document_label = "data"

# Line-of-business deployments use:
# default_group = "Retail"
# group_label = "LOB"
# document_label = "taxonomy"
"#
        .to_string()
    }
}
