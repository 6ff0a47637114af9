//! Publishing a taxonomy as the active version of a group
//!
//! Writes the immutable data record first, then overwrites the group's
//! pointer. Readers never observe a pointer to a record that is not there.
//! An existing data record is never rewritten: publishing the same payload
//! under its key only moves the pointer, and a different payload is refused.

use serde_json::json;
use thiserror::Error;

use crate::model::{DataRecord, Taxonomy};
use crate::ports::{Clock, RecordStore, RecordWriter, StoreError};
use crate::usecases::resolve::ResolverConfig;

/// Length of the content hash suffix in generated references
const REFERENCE_HASH_LEN: usize = 12;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Group name must not be empty")]
    EmptyGroup,
    #[error("Group name '{0}' must not contain ':'")]
    InvalidGroup(String),
    #[error("Reference '{0}' collides with a pointer key")]
    ReferenceCollision(String),
    #[error("Reference '{0}' already holds a different taxonomy")]
    ReferenceExists(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedTaxonomy {
    pub group: String,
    pub pointer_key: String,
    pub reference: String,
    pub version: String,
    /// Unix milliseconds written to the pointer record
    pub timestamp: i64,
    /// The data record already existed with this payload and was left as is
    pub reused: bool,
}

pub struct TaxonomyPublisher<W, C> {
    writer: W,
    clock: C,
    config: ResolverConfig,
}

impl<W: RecordStore + RecordWriter, C: Clock> TaxonomyPublisher<W, C> {
    pub fn new(writer: W, clock: C, config: ResolverConfig) -> Self {
        Self {
            writer,
            clock,
            config,
        }
    }

    /// Default data key: `<prefix>:<group>:v<version>:<hash>`
    pub fn default_reference(&self, group: &str, taxonomy: &Taxonomy) -> String {
        let hash = taxonomy.content_hash();
        format!(
            "{}:{}:v{}:{}",
            self.config.key_prefix,
            group,
            taxonomy.version,
            &hash[..REFERENCE_HASH_LEN]
        )
    }

    /// Store `taxonomy` and make it the active one for `group`
    pub async fn publish(
        &self,
        group: &str,
        taxonomy: &Taxonomy,
        reference: Option<&str>,
    ) -> Result<PublishedTaxonomy, PublishError> {
        if group.is_empty() {
            return Err(PublishError::EmptyGroup);
        }
        if group.contains(':') {
            return Err(PublishError::InvalidGroup(group.to_string()));
        }

        let reference = match reference.filter(|r| !r.is_empty()) {
            Some(r) => r.to_string(),
            None => self.default_reference(group, taxonomy),
        };
        if self.config.group_from_key(&reference).is_some() {
            return Err(PublishError::ReferenceCollision(reference));
        }

        let timestamp = (self.clock.now().unix_timestamp_nanos() / 1_000_000) as i64;
        let data = serde_json::to_value(taxonomy)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;

        let reused = match self.existing_payload(&reference).await? {
            Some(existing) if existing.as_ref() == Some(&data) => true,
            Some(_) => return Err(PublishError::ReferenceExists(reference)),
            None => false,
        };

        if reused {
            tracing::debug!(reference = %reference, "Data record already stored, reusing it");
        } else {
            self.writer
                .put(json!({
                    "id": reference,
                    "group": group,
                    "version": taxonomy.version,
                    "data": data,
                    "timestamp": timestamp,
                }))
                .await?;
        }

        let pointer_key = self.config.pointer_key(group);
        self.writer
            .put(json!({
                "id": pointer_key,
                "group": group,
                "ref": reference,
                "timestamp": timestamp,
            }))
            .await?;

        tracing::info!(
            group = %group,
            reference = %reference,
            version = %taxonomy.version,
            "Published active taxonomy"
        );

        Ok(PublishedTaxonomy {
            group: group.to_string(),
            pointer_key,
            reference,
            version: taxonomy.version.clone(),
            timestamp,
            reused,
        })
    }

    /// Payload of the data record stored under `reference`.
    ///
    /// `None` when no record exists; `Some(None)` when one exists without `data`.
    async fn existing_payload(
        &self,
        reference: &str,
    ) -> Result<Option<Option<serde_json::Value>>, PublishError> {
        let mut session = self.writer.open().await?;
        let Some(value) = session.get(reference).await? else {
            return Ok(None);
        };
        let record: DataRecord = serde_json::from_value(value)
            .map_err(|e| PublishError::Serialization(e.to_string()))?;
        Ok(Some(record.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::sample_taxonomy;
    use crate::testing::MapStore;
    use crate::usecases::resolve::TaxonomyResolver;
    use std::sync::Arc;
    use time::OffsetDateTime;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    fn fixed_clock() -> FixedClock {
        FixedClock(OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap())
    }

    #[tokio::test]
    async fn test_publish_then_resolve() {
        let store = Arc::new(MapStore::new());
        let publisher =
            TaxonomyPublisher::new(store.clone(), fixed_clock(), ResolverConfig::default());

        let published = publisher
            .publish("Retail", &sample_taxonomy(), None)
            .await
            .unwrap();
        assert_eq!(published.pointer_key, "taxonomy:Retail:active");
        assert!(published.reference.starts_with("taxonomy:Retail:v2024.06:"));
        assert_eq!(published.timestamp, 1_700_000_000_000);
        assert!(!published.reused);

        let resolver = TaxonomyResolver::new(store, ResolverConfig::default());
        assert_eq!(
            resolver.load_active_taxonomy(Some("Retail")).await,
            Some(sample_taxonomy())
        );
        let metadata = resolver.taxonomy_metadata("Retail").await.unwrap();
        assert_eq!(metadata.version, "2024.06");
        assert_eq!(metadata.timestamp, 1_700_000_000_000);
        assert_eq!(resolver.available_groups().await, vec!["Retail"]);
    }

    #[tokio::test]
    async fn test_republish_swaps_pointer() {
        let store = Arc::new(MapStore::new());
        let publisher =
            TaxonomyPublisher::new(store.clone(), fixed_clock(), ResolverConfig::default());

        let mut next = sample_taxonomy();
        next.version = "2024.07".to_string();
        next.categories.pop();

        publisher.publish("Retail", &sample_taxonomy(), Some("v1")).await.unwrap();
        publisher.publish("Retail", &next, Some("v2")).await.unwrap();

        let resolver = TaxonomyResolver::new(store, ResolverConfig::default());
        let active = resolver.load_active_taxonomy(Some("Retail")).await.unwrap();
        assert_eq!(active.version, "2024.07");
        assert_eq!(active.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_publish_rejects_bad_input() {
        let publisher =
            TaxonomyPublisher::new(MapStore::new(), fixed_clock(), ResolverConfig::default());
        let taxonomy = sample_taxonomy();

        assert!(matches!(
            publisher.publish("", &taxonomy, None).await,
            Err(PublishError::EmptyGroup)
        ));
        assert!(matches!(
            publisher.publish("a:b", &taxonomy, None).await,
            Err(PublishError::InvalidGroup(_))
        ));
        assert!(matches!(
            publisher
                .publish("Retail", &taxonomy, Some("taxonomy:Other:active"))
                .await,
            Err(PublishError::ReferenceCollision(_))
        ));
    }

    #[tokio::test]
    async fn test_shared_reference_keeps_first_payload() {
        let store = Arc::new(MapStore::new());
        let publisher =
            TaxonomyPublisher::new(store.clone(), fixed_clock(), ResolverConfig::default());

        let mut other = sample_taxonomy();
        other.version = "2025.01".to_string();

        publisher.publish("A", &sample_taxonomy(), Some("shared")).await.unwrap();
        let result = publisher.publish("B", &other, Some("shared")).await;
        assert!(matches!(result, Err(PublishError::ReferenceExists(r)) if r == "shared"));

        let resolver = TaxonomyResolver::new(store, ResolverConfig::default());
        let active = resolver.load_active_taxonomy(Some("A")).await.unwrap();
        assert_eq!(active.version, "2024.06");
        assert!(resolver.load_active_taxonomy(Some("B")).await.is_none());
        assert_eq!(resolver.available_groups().await, vec!["A"]);
    }

    #[tokio::test]
    async fn test_identical_payload_reuses_record() {
        let store = Arc::new(MapStore::new());
        let first = TaxonomyPublisher::new(store.clone(), fixed_clock(), ResolverConfig::default());
        let later = FixedClock(OffsetDateTime::from_unix_timestamp(1_800_000_000).unwrap());
        let second = TaxonomyPublisher::new(store.clone(), later, ResolverConfig::default());

        let a = first.publish("A", &sample_taxonomy(), Some("shared")).await.unwrap();
        let b = second.publish("B", &sample_taxonomy(), Some("shared")).await.unwrap();
        assert!(!a.reused);
        assert!(b.reused);
        assert_eq!(b.timestamp, 1_800_000_000_000);

        let resolver = TaxonomyResolver::new(store, ResolverConfig::default());
        assert_eq!(
            resolver.load_active_taxonomy(Some("B")).await,
            Some(sample_taxonomy())
        );
        // The data record keeps its original write time
        let metadata = resolver.taxonomy_metadata("B").await.unwrap();
        assert_eq!(metadata.timestamp, 1_700_000_000_000);
    }

    #[tokio::test]
    async fn test_republish_same_content_keeps_write_time() {
        let store = Arc::new(MapStore::new());
        let first = TaxonomyPublisher::new(store.clone(), fixed_clock(), ResolverConfig::default());
        let later = FixedClock(OffsetDateTime::from_unix_timestamp(1_800_000_000).unwrap());
        let second = TaxonomyPublisher::new(store.clone(), later, ResolverConfig::default());

        let a = first.publish("Retail", &sample_taxonomy(), None).await.unwrap();
        let b = second.publish("Retail", &sample_taxonomy(), None).await.unwrap();
        assert_eq!(a.reference, b.reference);
        assert!(b.reused);

        let resolver = TaxonomyResolver::new(store, ResolverConfig::default());
        let metadata = resolver.taxonomy_metadata("Retail").await.unwrap();
        assert_eq!(metadata.timestamp, 1_700_000_000_000);
    }

    #[test]
    fn test_default_reference_is_content_addressed() {
        let publisher =
            TaxonomyPublisher::new(MapStore::new(), fixed_clock(), ResolverConfig::default());
        let taxonomy = sample_taxonomy();

        let a = publisher.default_reference("Retail", &taxonomy);
        let b = publisher.default_reference("Retail", &taxonomy);
        assert_eq!(a, b);
        assert_eq!(a.rsplit(':').next().unwrap().len(), 12);
    }
}
