//! Active taxonomy resolution
//!
//! A group's active taxonomy is found in two hops through a single flat
//! table: the pointer record at `<prefix>:<group>:active` names a data
//! record, and the data record carries the taxonomy payload.
//!
//! Every public operation here is fail-soft. Missing records and store
//! failures are reported through `tracing` and degrade to `None`, an empty
//! list, or a fixed message. Callers never see an error.

use futures::TryStreamExt;
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::{DataRecord, PointerRecord, Taxonomy, TaxonomyMetadata};
use crate::ports::{RecordStore, StoreError};

/// Naming scheme for one deployment of the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Group used when the caller does not name one
    pub default_group: String,
    /// First segment of every pointer key
    pub key_prefix: String,
    /// What a group is called in user-facing messages
    pub group_label: String,
    /// What a taxonomy is called in user-facing messages
    pub document_label: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_group: "Default".to_string(),
            key_prefix: "taxonomy".to_string(),
            group_label: "group".to_string(),
            document_label: "data".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Scheme used by the line-of-business deployment
    pub fn line_of_business() -> Self {
        Self {
            default_group: "Retail".to_string(),
            key_prefix: "taxonomy".to_string(),
            group_label: "LOB".to_string(),
            document_label: "taxonomy".to_string(),
        }
    }

    /// Key of the pointer record for `group`
    pub fn pointer_key(&self, group: &str) -> String {
        format!("{}:{}:active", self.key_prefix, group)
    }

    /// Extract the group from a pointer key, if `key` is one.
    ///
    /// Only the first segment after the prefix is taken, so
    /// `taxonomy:a:b:active` yields `a`.
    pub fn group_from_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        let rest = key.strip_prefix(self.key_prefix.as_str())?.strip_prefix(':')?;
        rest.strip_suffix(":active")?;
        rest.split(':').next().filter(|group| !group.is_empty())
    }

    /// Message returned by the prompt builder when no taxonomy is active
    pub fn not_found_message(&self, group: &str) -> String {
        format!(
            "No {} found for {}: {}",
            self.document_label, self.group_label, group
        )
    }

    /// Message returned by the prompt builder when the payload is unusable
    pub fn prompt_error_message(&self, group: &str) -> String {
        format!("Error building prompt block for {}", group)
    }
}

/// Internal failures, never returned from the public surface
#[derive(Debug, Error)]
enum ResolveError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Malformed record at {key}: {message}")]
    MalformedRecord { key: String, message: String },
}

/// Resolves groups to their active taxonomy
pub struct TaxonomyResolver<S> {
    store: S,
    config: ResolverConfig,
}

impl<S: RecordStore> TaxonomyResolver<S> {
    pub fn new(store: S, config: ResolverConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// `group`, or the configured default when absent or empty
    pub fn group_or_default<'a>(&'a self, group: Option<&'a str>) -> &'a str {
        group
            .filter(|g| !g.is_empty())
            .unwrap_or(&self.config.default_group)
    }

    /// Load the active taxonomy of `group` (default group when `None`)
    pub async fn load_active_taxonomy(&self, group: Option<&str>) -> Option<Taxonomy> {
        let group = self.group_or_default(group);

        let payload = match self.resolve_payload(group).await {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                tracing::error!(group = %group, error = %e, "Failed to load taxonomy");
                return None;
            }
        };

        match serde_json::from_value::<Taxonomy>(payload) {
            Ok(taxonomy) => {
                tracing::info!(
                    group = %group,
                    version = %taxonomy.version,
                    categories = taxonomy.categories.len(),
                    "Loaded taxonomy"
                );
                Some(taxonomy)
            }
            Err(e) => {
                tracing::error!(group = %group, error = %e, "Stored taxonomy payload is malformed");
                None
            }
        }
    }

    /// Render the active taxonomy of `group` as prompt text.
    ///
    /// Returns a fixed message instead of failing when nothing is active or
    /// the stored payload cannot be read as a taxonomy.
    pub async fn build_prompt_block(&self, group: Option<&str>) -> String {
        let group = self.group_or_default(group);

        let payload = match self.resolve_payload(group).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(group = %group, error = %e, "Failed to load taxonomy");
                None
            }
        };

        let Some(payload) = payload else {
            return self.config.not_found_message(group);
        };

        match serde_json::from_value::<Taxonomy>(payload) {
            Ok(taxonomy) => taxonomy.prompt_block(),
            Err(e) => {
                tracing::error!(group = %group, error = %e, "Failed to build prompt block");
                self.config.prompt_error_message(group)
            }
        }
    }

    /// All groups with a pointer record, sorted ascending
    pub async fn available_groups(&self) -> Vec<String> {
        match self.scan_groups().await {
            Ok(groups) => groups,
            Err(e) => {
                tracing::error!(error = %e, "Failed to list available groups");
                Vec::new()
            }
        }
    }

    /// Version and write time of the active data record of `group`
    pub async fn taxonomy_metadata(&self, group: &str) -> Option<TaxonomyMetadata> {
        match self.resolve_record(group).await {
            Ok(Some((_, record))) => Some(TaxonomyMetadata {
                version: record.version,
                timestamp: record.timestamp,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::error!(group = %group, error = %e, "Failed to get taxonomy metadata");
                None
            }
        }
    }

    /// Follow pointer → data record and return the raw payload
    async fn resolve_payload(&self, group: &str) -> Result<Option<serde_json::Value>, ResolveError> {
        let Some((reference, record)) = self.resolve_record(group).await? else {
            return Ok(None);
        };

        if record.data.is_none() {
            tracing::warn!(group = %group, reference = %reference, "Taxonomy data not found for reference");
        }
        Ok(record.data)
    }

    /// Follow pointer → data record. Session is dropped on return.
    async fn resolve_record(
        &self,
        group: &str,
    ) -> Result<Option<(String, DataRecord)>, ResolveError> {
        let mut session = self.store.open().await?;

        let pointer_key = self.config.pointer_key(group);
        let pointer = match session.get(&pointer_key).await? {
            Some(value) => parse_record::<PointerRecord>(&pointer_key, value)?,
            None => {
                tracing::warn!(group = %group, "No active taxonomy found");
                return Ok(None);
            }
        };

        let Some(reference) = pointer.reference().map(str::to_string) else {
            tracing::warn!(group = %group, key = %pointer_key, "Active pointer has no reference");
            return Ok(None);
        };

        let record = match session.get(&reference).await? {
            Some(value) => parse_record::<DataRecord>(&reference, value)?,
            None => {
                tracing::warn!(group = %group, reference = %reference, "Taxonomy record not found for reference");
                return Ok(None);
            }
        };

        tracing::debug!(group = %group, reference = %reference, version = %record.version, "Resolved active record");
        Ok(Some((reference, record)))
    }

    async fn scan_groups(&self) -> Result<Vec<String>, StoreError> {
        let mut session = self.store.open().await?;
        let mut cursor = session.cursor();

        let mut groups = BTreeSet::new();
        while let Some((key, _)) = cursor.try_next().await? {
            if let Some(group) = self.config.group_from_key(&key) {
                groups.insert(group.to_string());
            }
        }

        Ok(groups.into_iter().collect())
    }
}

fn parse_record<T: serde::de::DeserializeOwned>(
    key: &str,
    value: serde_json::Value,
) -> Result<T, ResolveError> {
    serde_json::from_value(value).map_err(|e| ResolveError::MalformedRecord {
        key: key.to_string(),
        message: e.to_string(),
    })
}
