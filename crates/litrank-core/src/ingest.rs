//! Ingestion of extractor output.
//!
//! Paper and repository extractors produce an [`ExtractionBundle`]:
//!
//! ```json
//! {
//!   "entities": [{"id": "colbert", "name": "ColBERT", "entity_type": "method"}],
//!   "relationships": [{"source_id": "colbert", "target_id": "bert", "relation_type": "based_on"}],
//!   "benchmarks": [{"method_id": "colbert", "benchmark_id": "beir", "metric_name": "ndcg", "score": 0.85}]
//! }
//! ```
//!
//! Each list is optional. Records follow the same rules as stored records.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::LitError;
use crate::model::{BenchmarkScore, Entity, EntityRelationship};
use crate::store::EntityStore;

/// Entities, relationships and scores extracted from one source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionBundle {
    pub entities: Vec<Entity>,
    pub relationships: Vec<EntityRelationship>,
    pub benchmarks: Vec<BenchmarkScore>,
}

#[derive(Deserialize)]
struct RawBundle {
    #[serde(default)]
    entities: Vec<Value>,
    #[serde(default)]
    relationships: Vec<Value>,
    #[serde(default)]
    benchmarks: Vec<Value>,
}

impl ExtractionBundle {
    /// Parse a bundle from its JSON form.
    ///
    /// Any invalid record fails the whole bundle; nothing is stored.
    pub fn from_json(value: Value) -> Result<Self, LitError> {
        let raw: RawBundle = serde_json::from_value(value)
            .map_err(|e| LitError::malformed("bundle", e.to_string()))?;

        Ok(Self {
            entities: raw
                .entities
                .into_iter()
                .map(Entity::from_record)
                .collect::<Result<_, _>>()?,
            relationships: raw
                .relationships
                .into_iter()
                .map(EntityRelationship::from_record)
                .collect::<Result<_, _>>()?,
            benchmarks: raw
                .benchmarks
                .into_iter()
                .map(BenchmarkScore::from_record)
                .collect::<Result<_, _>>()?,
        })
    }

    /// Read and parse a bundle file.
    pub fn from_file(path: &Path) -> Result<Self, LitError> {
        let bundle_err = |message: String| LitError::BundleRead {
            path: path.to_path_buf(),
            message,
        };

        let text = fs::read_to_string(path).map_err(|e| bundle_err(e.to_string()))?;
        let value: Value = serde_json::from_str(&text).map_err(|e| bundle_err(e.to_string()))?;
        Self::from_json(value)
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty() && self.benchmarks.is_empty()
    }

    /// Total number of records.
    pub fn len(&self) -> usize {
        self.entities.len() + self.relationships.len() + self.benchmarks.len()
    }
}

/// Counts of records stored by an ingest.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestSummary {
    pub entities: usize,
    pub relationships: usize,
    pub benchmarks: usize,
}

impl std::fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Stored {} entities, {} relationships, {} benchmark scores",
            self.entities, self.relationships, self.benchmarks
        )
    }
}

/// Store every record of a bundle: entities, then relationships, then scores.
///
/// Stops at the first write failure; records saved before it stay saved.
/// `on_record` is called after each successful save.
pub fn ingest_bundle(
    store: &EntityStore,
    bundle: &ExtractionBundle,
    mut on_record: impl FnMut(),
) -> Result<IngestSummary, LitError> {
    let mut summary = IngestSummary::default();

    for entity in &bundle.entities {
        store.save_entity(entity)?;
        summary.entities += 1;
        on_record();
    }
    for relationship in &bundle.relationships {
        store.save_relationship(relationship)?;
        summary.relationships += 1;
        on_record();
    }
    for score in &bundle.benchmarks {
        store.save_benchmark_score(score)?;
        summary.benchmarks += 1;
        on_record();
    }

    tracing::info!("{}", summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityType;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample() -> Value {
        json!({
            "entities": [
                {"id": "colbert", "name": "ColBERT", "entity_type": "method", "features": {"year": 2020}},
                {"id": "beir", "name": "BEIR", "entity_type": "benchmark"}
            ],
            "relationships": [
                {"source_id": "colbert", "target_id": "beir", "relation_type": "evaluated_on"}
            ],
            "benchmarks": [
                {"method_id": "colbert", "benchmark_id": "beir", "metric_name": "ndcg", "score": 0.85}
            ]
        })
    }

    #[test]
    fn test_parse_bundle() {
        let bundle = ExtractionBundle::from_json(sample()).unwrap();

        assert_eq!(bundle.entities.len(), 2);
        assert_eq!(bundle.entities[1].entity_type, EntityType::Benchmark);
        assert_eq!(bundle.relationships.len(), 1);
        assert_eq!(bundle.benchmarks[0].score, 0.85);
        assert_eq!(bundle.len(), 4);
    }

    #[test]
    fn test_parse_partial_bundle() {
        let bundle = ExtractionBundle::from_json(json!({"benchmarks": []})).unwrap();
        assert!(bundle.is_empty());
    }

    #[test]
    fn test_unknown_type_fails_bundle() {
        let err = ExtractionBundle::from_json(json!({
            "entities": [{"id": "x", "name": "X", "entity_type": "widget"}]
        }))
        .unwrap_err();

        assert!(matches!(err, LitError::Validation { .. }));
    }

    #[test]
    fn test_ingest_counts_and_stores() {
        let temp = TempDir::new().unwrap();
        let store = EntityStore::open(temp.path()).unwrap();
        let bundle = ExtractionBundle::from_json(sample()).unwrap();
        let mut seen = 0;

        let summary = ingest_bundle(&store, &bundle, || seen += 1).unwrap();

        assert_eq!(seen, 4);
        assert_eq!(
            summary.to_string(),
            "Stored 2 entities, 1 relationships, 1 benchmark scores"
        );
        assert!(store.get_entity("colbert").is_some());
        assert_eq!(store.get_top_performers("beir", "ndcg", 5, true).len(), 1);
    }

    #[test]
    fn test_from_file_missing() {
        let temp = TempDir::new().unwrap();
        let err = ExtractionBundle::from_file(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LitError::BundleRead { .. }));
    }

    #[test]
    fn test_from_file_not_json() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bundle.json");
        std::fs::write(&path, "{ nope").unwrap();

        let err = ExtractionBundle::from_file(&path).unwrap_err();
        assert!(matches!(err, LitError::BundleRead { .. }));
    }
}
