//! Subcommand implementations

pub mod classify;
pub mod config;
pub mod groups;
pub mod import;
pub mod metadata;
pub mod prompt;
pub mod show;

use anyhow::{Context as _, Result};
use std::path::PathBuf;
use taxonomy_kit_adapters::store::SqliteRecordStore;
use taxonomy_kit_domain::usecases::TaxonomyResolver;

use crate::config::AppConfig;

/// Global options shared by every subcommand
#[derive(Debug, Clone)]
pub struct Context {
    pub config_path: Option<PathBuf>,
    pub db_override: Option<PathBuf>,
}

impl Context {
    pub fn load_config(&self) -> AppConfig {
        AppConfig::load(self.config_path.as_deref()).unwrap_or_default()
    }

    pub async fn open_store(&self, config: &AppConfig) -> Result<SqliteRecordStore> {
        let db_path = self
            .db_override
            .clone()
            .unwrap_or_else(|| config.general.db_path.clone());

        tracing::debug!(db_path = %db_path.display(), "Opening record store");

        SqliteRecordStore::new(&db_path)
            .await
            .with_context(|| format!("Failed to open record store: {}", db_path.display()))
    }

    pub async fn resolver(&self) -> Result<TaxonomyResolver<SqliteRecordStore>> {
        let config = self.load_config();
        let store = self.open_store(&config).await?;
        Ok(TaxonomyResolver::new(
            store,
            config.resolver.to_resolver_config(),
        ))
    }
}
