//! Entity store: typed access to entities, relationships and benchmark scores.
//!
//! The store is a façade over three record stores laid out under one root:
//!
//! ```text
//! <root>/
//!   entities/        one record per entity id
//!   relationships/   one record per `{source}_{relation}_{target}`
//!   benchmarks/      one record per `{method}_{benchmark}_{metric}`
//! ```
//!
//! ## Failure model
//!
//! Writes return errors. Reads are best-effort: a missing, malformed or
//! otherwise unreadable record is skipped (or yields `None`) and the reason is
//! logged at debug level.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use litrank_db::RecordStore;
use serde::Serialize;
use serde_json::Value;

use crate::db_adapter::{open_record_stores, IntoLitResult, RecordStores};
use crate::errors::LitError;
use crate::model::{Attributes, BenchmarkScore, Entity, EntityRelationship, EntityType, RelationType};

// ============================================================================
// Result Types
// ============================================================================

/// A benchmark score resolved to its method entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPerformer {
    pub method: Entity,
    pub score: f64,
    pub metric: String,
    pub benchmark: String,
    pub metadata: Attributes,
}

/// Record counts for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Total readable entities.
    pub entities: usize,
    /// Readable entities per type. Types with no entities are absent.
    pub entities_by_type: BTreeMap<EntityType, usize>,
    pub relationships: usize,
    pub benchmark_scores: usize,
}

// ============================================================================
// EntityStore
// ============================================================================

/// Storage layer for entities, relationships and benchmark scores.
pub struct EntityStore {
    root: PathBuf,
    entities: Box<dyn RecordStore>,
    relationships: Box<dyn RecordStore>,
    benchmarks: Box<dyn RecordStore>,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl EntityStore {
    /// Open (creating if needed) the store rooted at `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, LitError> {
        let root = root.as_ref();
        let stores = open_record_stores(root)?;
        tracing::debug!("Opened entity store at {}", root.display());
        Ok(Self::from_stores(root, stores))
    }

    /// Build a store from already-opened record stores.
    pub fn from_stores(root: impl Into<PathBuf>, stores: RecordStores) -> Self {
        Self {
            root: root.into(),
            entities: stores.entities,
            relationships: stores.relationships,
            benchmarks: stores.benchmarks,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    /// Save or replace an entity, keyed by its id.
    pub fn save_entity(&self, entity: &Entity) -> Result<(), LitError> {
        self.entities
            .save(entity.id(), &entity.to_record())
            .into_lit_result()
    }

    /// Fetch an entity by id. Missing or unreadable records yield `None`.
    pub fn get_entity(&self, id: &str) -> Option<Entity> {
        let value = read_record(self.entities.as_ref(), id)?;
        parse_record(id, value, Entity::from_record)
    }

    /// Delete an entity. Returns `false` if there was nothing to delete.
    ///
    /// Relationships and scores referencing the entity are left in place.
    pub fn delete_entity(&self, id: &str) -> Result<bool, LitError> {
        match self.entities.delete(id).into_lit_result() {
            Ok(()) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// All readable entities, optionally restricted to one type, in key order.
    pub fn list_entities(&self, entity_type: Option<EntityType>) -> Vec<Entity> {
        load_all(self.entities.as_ref(), Entity::from_record)
            .into_iter()
            .filter(|e| entity_type.is_none_or(|t| e.entity_type == t))
            .collect()
    }

    /// Case-insensitive substring search over names and string-valued features.
    ///
    /// Each entity appears at most once, in [`list_entities`](Self::list_entities) order.
    pub fn search_entities(&self, query: &str, entity_type: Option<EntityType>) -> Vec<Entity> {
        let needle = query.to_lowercase();
        self.list_entities(entity_type)
            .into_iter()
            .filter(|e| entity_matches(e, &needle))
            .collect()
    }

    // ------------------------------------------------------------------------
    // Relationships
    // ------------------------------------------------------------------------

    /// Save a relationship, replacing any of the same type between the same pair.
    ///
    /// A non-finite confidence is rejected, since JSON has no encoding for it.
    pub fn save_relationship(&self, relationship: &EntityRelationship) -> Result<(), LitError> {
        ensure_finite("confidence", relationship.confidence)?;
        self.relationships
            .save(&relationship.storage_key(), &relationship.to_record())
            .into_lit_result()
    }

    /// Relationships matching every given filter. Empty filters match all.
    pub fn get_relationships(
        &self,
        source_id: Option<&str>,
        target_id: Option<&str>,
        relation_type: Option<RelationType>,
    ) -> Vec<EntityRelationship> {
        load_all(self.relationships.as_ref(), EntityRelationship::from_record)
            .into_iter()
            .filter(|r| {
                field_matches(source_id, &r.source_id)
                    && field_matches(target_id, &r.target_id)
                    && relation_type.is_none_or(|t| r.relation_type == t)
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Benchmark scores
    // ------------------------------------------------------------------------

    /// Save a score, replacing any for the same method, benchmark and metric.
    ///
    /// A non-finite score is rejected, since JSON has no encoding for it.
    pub fn save_benchmark_score(&self, score: &BenchmarkScore) -> Result<(), LitError> {
        ensure_finite("score", score.score)?;
        self.benchmarks
            .save(&score.storage_key(), &score.to_record())
            .into_lit_result()
    }

    /// Scores matching every given filter. Empty filters match all.
    pub fn get_benchmark_scores(
        &self,
        method_id: Option<&str>,
        benchmark_id: Option<&str>,
        metric_name: Option<&str>,
    ) -> Vec<BenchmarkScore> {
        load_all(self.benchmarks.as_ref(), BenchmarkScore::from_record)
            .into_iter()
            .filter(|s| {
                field_matches(method_id, &s.method_id)
                    && field_matches(benchmark_id, &s.benchmark_id)
                    && field_matches(metric_name, &s.metric_name)
            })
            .collect()
    }

    /// Best methods on a benchmark metric.
    ///
    /// Scores are ordered by value (descending when `higher_is_better`), ties
    /// by method id, and truncated to `limit` before each is resolved to its
    /// method. Scores whose method no longer exists are dropped, so fewer than
    /// `limit` results may come back even when more scores exist.
    pub fn get_top_performers(
        &self,
        benchmark_id: &str,
        metric_name: &str,
        limit: usize,
        higher_is_better: bool,
    ) -> Vec<TopPerformer> {
        let mut scores = self.get_benchmark_scores(None, Some(benchmark_id), Some(metric_name));
        sort_scores(&mut scores, higher_is_better);
        scores.truncate(limit);

        scores
            .into_iter()
            .filter_map(|score| {
                let Some(method) = self.get_entity(&score.method_id) else {
                    tracing::debug!(
                        "Dropping score for missing method '{}' on {}",
                        score.method_id,
                        benchmark_id
                    );
                    return None;
                };
                Some(TopPerformer {
                    method,
                    score: score.score,
                    metric: metric_name.to_string(),
                    benchmark: benchmark_id.to_string(),
                    metadata: score.metadata,
                })
            })
            .collect()
    }

    /// Count readable records in each store.
    pub fn stats(&self) -> StoreStats {
        let entities = self.list_entities(None);
        let mut entities_by_type = BTreeMap::new();
        for entity in &entities {
            *entities_by_type.entry(entity.entity_type).or_insert(0) += 1;
        }

        StoreStats {
            entities: entities.len(),
            entities_by_type,
            relationships: self.get_relationships(None, None, None).len(),
            benchmark_scores: self.get_benchmark_scores(None, None, None).len(),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Sort scores best-first, breaking ties by method id.
pub(crate) fn sort_scores(scores: &mut [BenchmarkScore], higher_is_better: bool) {
    scores.sort_by(|a, b| {
        let by_score = if higher_is_better {
            b.score.total_cmp(&a.score)
        } else {
            a.score.total_cmp(&b.score)
        };
        by_score.then_with(|| a.method_id.cmp(&b.method_id))
    });
}

fn ensure_finite(field: &'static str, value: f64) -> Result<(), LitError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LitError::NonFinite { field, value })
    }
}

fn field_matches(filter: Option<&str>, value: &str) -> bool {
    match filter {
        Some(f) if !f.is_empty() => f == value,
        _ => true,
    }
}

fn entity_matches(entity: &Entity, needle: &str) -> bool {
    if entity.name.to_lowercase().contains(needle) {
        return true;
    }
    entity
        .features
        .values()
        .any(|v| matches!(v, Value::String(s) if s.to_lowercase().contains(needle)))
}

fn read_record(store: &dyn RecordStore, key: &str) -> Option<Value> {
    match store.get(key).into_lit_result() {
        Ok(value) => Some(value),
        Err(e) if e.is_not_found() => {
            tracing::trace!("No record for '{}' in {}", key, store.root().display());
            None
        }
        Err(LitError::StoreIo { path, message }) => {
            tracing::warn!("Failed to read record '{}' at {}: {}", key, path.display(), message);
            None
        }
        Err(e) => {
            tracing::debug!("Skipping record '{}': {}", key, e);
            None
        }
    }
}

fn parse_record<T>(key: &str, value: Value, parse: fn(Value) -> Result<T, LitError>) -> Option<T> {
    match parse(value) {
        Ok(item) => Some(item),
        Err(e) => {
            tracing::debug!("Skipping record '{}': {}", key, e);
            None
        }
    }
}

fn load_all<T>(store: &dyn RecordStore, parse: fn(Value) -> Result<T, LitError>) -> Vec<T> {
    let keys = match store.list_keys().into_lit_result() {
        Ok(keys) => keys,
        Err(e) => {
            tracing::warn!("Failed to list records in {}: {}", store.root().display(), e);
            return Vec::new();
        }
    };

    keys.iter()
        .filter_map(|key| {
            let value = read_record(store, key)?;
            parse_record(key, value, parse)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup() -> (TempDir, EntityStore) {
        let temp = TempDir::new().unwrap();
        let store = EntityStore::open(temp.path()).unwrap();
        (temp, store)
    }

    fn method(id: &str, name: &str) -> Entity {
        Entity::new(id, name, EntityType::Method)
    }

    #[test]
    fn test_save_and_get_entity() {
        let (_temp, store) = setup();
        let entity = method("colbert", "ColBERT").with_feature("year", 2020);

        store.save_entity(&entity).unwrap();

        assert_eq!(store.get_entity("colbert"), Some(entity));
    }

    #[test]
    fn test_get_missing_entity() {
        let (_temp, store) = setup();
        assert_eq!(store.get_entity("ghost"), None);
    }

    #[test]
    fn test_save_is_upsert() {
        let (_temp, store) = setup();
        store.save_entity(&method("m1", "First")).unwrap();
        store.save_entity(&method("m1", "Second")).unwrap();

        let all = store.list_entities(None);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Second");
    }

    #[test]
    fn test_delete_entity() {
        let (_temp, store) = setup();
        store.save_entity(&method("m1", "M1")).unwrap();

        assert!(store.delete_entity("m1").unwrap());
        assert_eq!(store.get_entity("m1"), None);
        assert!(!store.delete_entity("m1").unwrap());
    }

    #[test]
    fn test_delete_does_not_cascade() {
        let (_temp, store) = setup();
        store.save_entity(&method("m1", "M1")).unwrap();
        store
            .save_relationship(&EntityRelationship::new("m1", "m2", RelationType::Uses))
            .unwrap();
        store.delete_entity("m1").unwrap();

        assert_eq!(store.get_relationships(Some("m1"), None, None).len(), 1);
    }

    #[test]
    fn test_list_entities_by_type() {
        let (_temp, store) = setup();
        store.save_entity(&method("m1", "M1")).unwrap();
        store
            .save_entity(&Entity::new("beir", "BEIR", EntityType::Benchmark))
            .unwrap();

        assert_eq!(store.list_entities(None).len(), 2);
        let benchmarks = store.list_entities(Some(EntityType::Benchmark));
        assert_eq!(benchmarks.len(), 1);
        assert_eq!(benchmarks[0].id(), "beir");
    }

    #[test]
    fn test_list_skips_malformed_records() {
        let (temp, store) = setup();
        store.save_entity(&method("good", "Good")).unwrap();
        std::fs::write(
            temp.path().join("entities").join("bad.json"),
            json!({"key": "bad", "data": {"id": "bad"}}).to_string(),
        )
        .unwrap();
        std::fs::write(temp.path().join("entities").join("junk.json"), "not json").unwrap();

        let all = store.list_entities(None);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id(), "good");
        assert_eq!(store.get_entity("bad"), None);
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let (_temp, store) = setup();
        store.save_entity(&method("rag", "RAG System")).unwrap();
        store.save_entity(&method("bm25", "BM25")).unwrap();

        for query in ["RAG", "rag", "Rag"] {
            let hits = store.search_entities(query, None);
            assert_eq!(hits.len(), 1, "query {query}");
            assert_eq!(hits[0].name, "RAG System");
        }
    }

    #[test]
    fn test_search_string_features_once() {
        let (_temp, store) = setup();
        store
            .save_entity(
                &method("colbert", "ColBERT")
                    .with_feature("architecture", "late interaction")
                    .with_feature("notes", "interaction over tokens")
                    .with_feature("year", 2020),
            )
            .unwrap();

        assert_eq!(store.search_entities("INTERACTION", None).len(), 1);
        assert!(store.search_entities("2020", None).is_empty());
    }

    #[test]
    fn test_search_respects_type() {
        let (_temp, store) = setup();
        store.save_entity(&method("dense", "Dense Retrieval")).unwrap();
        store
            .save_entity(&Entity::new("p1", "Dense Passage Paper", EntityType::Paper))
            .unwrap();

        assert_eq!(store.search_entities("dense", None).len(), 2);
        assert_eq!(store.search_entities("dense", Some(EntityType::Paper)).len(), 1);
    }

    #[test]
    fn test_relationship_resave_overwrites() {
        let (_temp, store) = setup();
        let first = EntityRelationship::new("a", "b", RelationType::ImprovesUpon)
            .with_properties(json!({"v": 1}).as_object().cloned().unwrap());
        let second = EntityRelationship::new("a", "b", RelationType::ImprovesUpon)
            .with_properties(json!({"v": 2}).as_object().cloned().unwrap());

        store.save_relationship(&first).unwrap();
        store.save_relationship(&second).unwrap();

        let rels = store.get_relationships(Some("a"), Some("b"), Some(RelationType::ImprovesUpon));
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].properties["v"], 2);
    }

    #[test]
    fn test_relationship_filters() {
        let (_temp, store) = setup();
        store
            .save_relationship(&EntityRelationship::new("a", "b", RelationType::Uses))
            .unwrap();
        store
            .save_relationship(&EntityRelationship::new("a", "c", RelationType::BasedOn))
            .unwrap();
        store
            .save_relationship(&EntityRelationship::new("d", "b", RelationType::Uses))
            .unwrap();

        assert_eq!(store.get_relationships(None, None, None).len(), 3);
        assert_eq!(store.get_relationships(Some("a"), None, None).len(), 2);
        assert_eq!(store.get_relationships(None, Some("b"), None).len(), 2);
        assert_eq!(
            store
                .get_relationships(Some("a"), None, Some(RelationType::Uses))
                .len(),
            1
        );
        assert_eq!(store.get_relationships(Some(""), None, None).len(), 3);
    }

    #[test]
    fn test_score_filters_and_overwrite() {
        let (_temp, store) = setup();
        store
            .save_benchmark_score(&BenchmarkScore::new("m1", "beir", "ndcg", 0.5))
            .unwrap();
        store
            .save_benchmark_score(&BenchmarkScore::new("m1", "beir", "ndcg", 0.6))
            .unwrap();
        store
            .save_benchmark_score(&BenchmarkScore::new("m1", "msmarco", "mrr", 0.3))
            .unwrap();

        let scores = store.get_benchmark_scores(Some("m1"), Some("beir"), None);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 0.6);
        assert_eq!(store.get_benchmark_scores(Some("m1"), None, None).len(), 2);
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let (_temp, store) = setup();

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store
                .save_benchmark_score(&BenchmarkScore::new("m", "b", "acc", value))
                .unwrap_err();
            assert!(matches!(err, LitError::NonFinite { field: "score", .. }));
        }
        assert!(store.get_benchmark_scores(Some("m"), None, None).is_empty());
        assert_eq!(store.stats().benchmark_scores, 0);
    }

    #[test]
    fn test_non_finite_confidence_rejected() {
        let (_temp, store) = setup();

        let err = store
            .save_relationship(
                &EntityRelationship::new("a", "b", RelationType::Uses)
                    .with_confidence(f64::INFINITY),
            )
            .unwrap_err();
        assert!(matches!(err, LitError::NonFinite { field: "confidence", .. }));
        assert!(store.get_relationships(Some("a"), None, None).is_empty());
    }

    #[test]
    fn test_confidence_outside_unit_range_round_trips() {
        let (_temp, store) = setup();

        store
            .save_relationship(
                &EntityRelationship::new("a", "b", RelationType::Uses).with_confidence(1.5),
            )
            .unwrap();
        store
            .save_relationship(
                &EntityRelationship::new("a", "c", RelationType::Uses).with_confidence(-0.25),
            )
            .unwrap();

        let mut confidences: Vec<f64> = store
            .get_relationships(Some("a"), None, None)
            .iter()
            .map(|r| r.confidence)
            .collect();
        confidences.sort_by(f64::total_cmp);
        assert_eq!(confidences, vec![-0.25, 1.5]);
    }

    fn seed_scores(store: &EntityStore) {
        for (i, score) in [0.80, 0.85, 0.90].into_iter().enumerate() {
            let id = format!("m{i}");
            store.save_entity(&method(&id, &format!("Method {i}"))).unwrap();
            store
                .save_benchmark_score(&BenchmarkScore::new(&id, "b", "acc", score))
                .unwrap();
        }
    }

    #[test]
    fn test_top_performers_higher_is_better() {
        let (_temp, store) = setup();
        seed_scores(&store);

        let top = store.get_top_performers("b", "acc", 2, true);

        assert_eq!(top.len(), 2);
        assert_eq!(top[0].method.id(), "m2");
        assert_eq!(top[0].score, 0.90);
        assert_eq!(top[1].method.id(), "m1");
        assert_eq!(top[1].score, 0.85);
        assert_eq!(top[0].metric, "acc");
        assert_eq!(top[0].benchmark, "b");
    }

    #[test]
    fn test_top_performers_lower_is_better() {
        let (_temp, store) = setup();
        seed_scores(&store);

        let top = store.get_top_performers("b", "acc", 2, false);
        let ids: Vec<_> = top.iter().map(|t| t.method.id()).collect();

        assert_eq!(ids, vec!["m0", "m1"]);
    }

    #[test]
    fn test_top_performers_drop_missing_after_truncation() {
        let (_temp, store) = setup();
        seed_scores(&store);
        store.delete_entity("m2").unwrap();

        let top = store.get_top_performers("b", "acc", 2, true);

        assert_eq!(top.len(), 1);
        assert_eq!(top[0].method.id(), "m1");
    }

    #[test]
    fn test_top_performers_ties_by_method_id() {
        let (_temp, store) = setup();
        for id in ["zeta", "alpha"] {
            store.save_entity(&method(id, id)).unwrap();
            store
                .save_benchmark_score(&BenchmarkScore::new(id, "b", "acc", 0.5))
                .unwrap();
        }

        let top = store.get_top_performers("b", "acc", 10, true);
        assert_eq!(top[0].method.id(), "alpha");
        assert_eq!(top[1].method.id(), "zeta");
    }

    #[test]
    fn test_stats() {
        let (_temp, store) = setup();
        seed_scores(&store);
        store
            .save_entity(&Entity::new("beir", "BEIR", EntityType::Benchmark))
            .unwrap();
        store
            .save_relationship(&EntityRelationship::new("m1", "beir", RelationType::EvaluatedOn))
            .unwrap();

        let stats = store.stats();

        assert_eq!(stats.entities, 4);
        assert_eq!(stats.entities_by_type[&EntityType::Method], 3);
        assert_eq!(stats.entities_by_type[&EntityType::Benchmark], 1);
        assert_eq!(stats.relationships, 1);
        assert_eq!(stats.benchmark_scores, 3);
    }
}
