//! Domain models and value objects

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A versioned tree of categories used to label text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Version string chosen by the writer (e.g. "2024.06")
    pub version: String,
    /// Top-level categories in document order
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Taxonomy {
    /// Compact, prompt-ready summary: one line per category listing the
    /// subcategory ids, both in document order.
    pub fn prompt_block(&self) -> String {
        self.categories
            .iter()
            .map(|category| {
                let ids: Vec<&str> = category.children.iter().map(|sub| sub.id.as_str()).collect();
                format!("- {}: [{}]", category.label, ids.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// SHA-256 over the canonical JSON encoding, hex encoded
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        // Serializing plain structs with string keys cannot fail
        if let Ok(bytes) = serde_json::to_vec(self) {
            hasher.update(&bytes);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Total number of subcategories across all categories
    pub fn subcategory_count(&self) -> usize {
        self.categories.iter().map(|c| c.children.len()).sum()
    }
}

/// A top-level taxonomy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub children: Vec<Subcategory>,
}

/// A leaf taxonomy entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub order: i64,
    /// Short guidance for annotators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Longer definition text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub def: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Indirection record naming the active data record of a group.
///
/// Stored under `<prefix>:<group>:active`. Switching the active taxonomy
/// means overwriting this record only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}

impl PointerRecord {
    /// The referenced data key, if present and non-empty
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref().filter(|r| !r.is_empty())
    }
}

/// Immutable versioned payload referenced by a pointer record.
///
/// `data` is kept as raw JSON so that a record with a missing payload can be
/// told apart from one whose payload is not a valid taxonomy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub timestamp: i64,
}

/// Version probe for the active taxonomy of a group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyMetadata {
    pub version: String,
    /// Unix milliseconds at which the data record was written
    pub timestamp: i64,
}

/// Result of classifying a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: String,
    pub subcategory: String,
    /// Confidence score 0.0-1.0
    pub confidence: f64,
    pub rationale: String,
}

impl Classification {
    pub const FALLBACK_CATEGORY: &'static str = "Other";
    pub const FALLBACK_SUBCATEGORY: &'static str = "General";

    /// The catch-all `Other/General` classification
    pub fn fallback(confidence: f64, rationale: impl Into<String>) -> Self {
        Self {
            category: Self::FALLBACK_CATEGORY.to_string(),
            subcategory: Self::FALLBACK_SUBCATEGORY.to_string(),
            confidence,
            rationale: rationale.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.category == Self::FALLBACK_CATEGORY && self.subcategory == Self::FALLBACK_SUBCATEGORY
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_taxonomy;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_block_lists_ids_in_document_order() {
        let block = sample_taxonomy().prompt_block();
        let lines: Vec<&str> = block.lines().collect();

        assert_eq!(
            lines,
            vec![
                "- Accounts: [login_password, kyc_verification, transfers]",
                "- Products: [stocks, etfs]",
            ]
        );
    }

    #[test]
    fn test_prompt_block_empty_category() {
        let taxonomy = Taxonomy {
            version: "1".to_string(),
            categories: vec![Category {
                id: "empty".to_string(),
                label: "Empty".to_string(),
                order: 0,
                children: vec![],
            }],
        };

        assert_eq!(taxonomy.prompt_block(), "- Empty: []");
    }

    #[test]
    fn test_content_hash_is_stable() {
        let a = sample_taxonomy();
        let mut b = sample_taxonomy();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);

        b.version = "2024.07".to_string();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_pointer_empty_ref_is_absent() {
        let pointer: PointerRecord =
            serde_json::from_value(json!({"id": "taxonomy:A:active", "ref": ""})).unwrap();
        assert_eq!(pointer.reference(), None);

        let pointer: PointerRecord =
            serde_json::from_value(json!({"id": "taxonomy:A:active"})).unwrap();
        assert_eq!(pointer.reference(), None);
    }

    #[test]
    fn test_data_record_null_payload_is_absent() {
        let record: DataRecord =
            serde_json::from_value(json!({"id": "r1", "version": "1", "data": null})).unwrap();
        assert!(record.data.is_none());
    }

    #[test]
    fn test_subcategory_optional_fields_roundtrip_shape() {
        let value = json!({
            "id": "options",
            "label": "Options",
            "order": 3,
            "hint": "derivatives",
            "keywords": ["option", "call", "put"]
        });
        let sub: Subcategory = serde_json::from_value(value).unwrap();
        assert_eq!(sub.hint.as_deref(), Some("derivatives"));
        assert!(sub.def.is_none());

        let back = serde_json::to_value(&sub).unwrap();
        assert!(back.get("def").is_none());
    }
}
