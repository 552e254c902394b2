//! Entity, relationship and benchmark score records.
//!
//! ## Record format
//!
//! Each type converts to and from a JSON object with fixed field names
//! (`to_record` / `from_record`). The conversion is lossless:
//! `T::from_record(x.to_record())` equals `x`.
//!
//! ```json
//! {
//!   "id": "colbert",
//!   "name": "ColBERT",
//!   "entity_type": "method",
//!   "features": {"year": 2020},
//!   "metadata": {},
//!   "created_at": "2025-01-02T03:04:05.123456+00:00"
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::kinds::{EntityType, RelationType};
use super::timestamp;
use crate::errors::LitError;

/// Free-form string-keyed JSON map used for features, metadata and properties.
pub type Attributes = Map<String, Value>;

fn parse_created_at(kind: &'static str, raw: Option<String>) -> Result<DateTime<Utc>, LitError> {
    match raw {
        Some(s) => timestamp::parse(&s).map_err(|e| LitError::malformed(kind, e)),
        None => Ok(timestamp::now()),
    }
}

fn decode<T: for<'de> Deserialize<'de>>(kind: &'static str, value: Value) -> Result<T, LitError> {
    serde_json::from_value(value).map_err(|e| LitError::malformed(kind, e.to_string()))
}

// ============================================================================
// Entity
// ============================================================================

/// A research artifact: a method, paper, repository, benchmark, dataset,
/// feature or metric.
///
/// The `id` is assigned by the caller and fixed for the life of the value;
/// saving an entity with an existing id replaces the stored one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    id: String,

    /// Human-readable name.
    pub name: String,

    /// Closed kind of the entity.
    pub entity_type: EntityType,

    /// Named capabilities or properties (e.g. `year`, `architecture`).
    pub features: Attributes,

    /// Provenance and other free-form data.
    pub metadata: Attributes,

    #[serde(serialize_with = "timestamp::serialize")]
    created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct EntityRecord {
    id: String,
    name: String,
    entity_type: String,
    #[serde(default)]
    features: Option<Attributes>,
    #[serde(default)]
    metadata: Option<Attributes>,
    #[serde(default)]
    created_at: Option<String>,
}

impl Entity {
    /// Create an entity with empty features and metadata, timestamped now.
    pub fn new(id: impl Into<String>, name: impl Into<String>, entity_type: EntityType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            entity_type,
            features: Attributes::new(),
            metadata: Attributes::new(),
            created_at: timestamp::now(),
        }
    }

    /// Set a single feature.
    pub fn with_feature(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.add_feature(key, value);
        self
    }

    /// Replace all features.
    pub fn with_features(mut self, features: Attributes) -> Self {
        self.features = features;
        self
    }

    /// Replace all metadata.
    pub fn with_metadata(mut self, metadata: Attributes) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Insert or replace a feature.
    pub fn add_feature(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.features.insert(key.into(), value.into());
    }

    pub fn get_feature(&self, key: &str) -> Option<&Value> {
        self.features.get(key)
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Convert to the persisted JSON object.
    pub fn to_record(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "entity_type": self.entity_type.as_str(),
            "features": self.features,
            "metadata": self.metadata,
            "created_at": timestamp::format(&self.created_at),
        })
    }

    /// Rebuild an entity from its persisted JSON object.
    ///
    /// # Errors
    ///
    /// - [`LitError::MalformedRecord`] if a required field is missing or mistyped,
    ///   or `created_at` is not a timestamp.
    /// - [`LitError::Validation`] if `entity_type` is not a known kind.
    pub fn from_record(value: Value) -> Result<Self, LitError> {
        let raw: EntityRecord = decode("entity", value)?;
        Ok(Self {
            entity_type: raw.entity_type.parse()?,
            created_at: parse_created_at("entity", raw.created_at)?,
            id: raw.id,
            name: raw.name,
            features: raw.features.unwrap_or_default(),
            metadata: raw.metadata.unwrap_or_default(),
        })
    }
}

// ============================================================================
// EntityRelationship
// ============================================================================

/// A directed, typed edge between two entity ids.
///
/// Endpoints are not checked for existence. Only one relationship of a given
/// type is stored per ordered `(source, target)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRelationship {
    pub source_id: String,
    pub target_id: String,
    pub relation_type: RelationType,

    /// Free-form edge properties.
    pub properties: Attributes,

    /// Extraction confidence. Defaults to 1.0 and is not range-checked.
    pub confidence: f64,

    #[serde(serialize_with = "timestamp::serialize")]
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct RelationshipRecord {
    source_id: String,
    target_id: String,
    relation_type: String,
    #[serde(default)]
    properties: Option<Attributes>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    created_at: Option<String>,
}

impl EntityRelationship {
    /// Create a relationship with confidence 1.0 and no properties.
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        relation_type: RelationType,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            relation_type,
            properties: Attributes::new(),
            confidence: 1.0,
            created_at: timestamp::now(),
        }
    }

    pub fn with_properties(mut self, properties: Attributes) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Storage identity: `{source_id}_{relation_type}_{target_id}`.
    pub fn storage_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.source_id,
            self.relation_type.as_str(),
            self.target_id
        )
    }

    pub fn to_record(&self) -> Value {
        json!({
            "source_id": self.source_id,
            "target_id": self.target_id,
            "relation_type": self.relation_type.as_str(),
            "properties": self.properties,
            "confidence": self.confidence,
            "created_at": timestamp::format(&self.created_at),
        })
    }

    /// Rebuild a relationship from its persisted JSON object.
    ///
    /// Missing `properties` and `confidence` take their defaults.
    pub fn from_record(value: Value) -> Result<Self, LitError> {
        let raw: RelationshipRecord = decode("relationship", value)?;
        Ok(Self {
            relation_type: raw.relation_type.parse()?,
            created_at: parse_created_at("relationship", raw.created_at)?,
            source_id: raw.source_id,
            target_id: raw.target_id,
            properties: raw.properties.unwrap_or_default(),
            confidence: raw.confidence.unwrap_or(1.0),
        })
    }
}

// ============================================================================
// BenchmarkScore
// ============================================================================

/// A method's score on one metric of one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkScore {
    pub method_id: String,
    pub benchmark_id: String,
    pub metric_name: String,
    pub score: f64,
    pub metadata: Attributes,
}

#[derive(Deserialize)]
struct BenchmarkScoreRecord {
    method_id: String,
    benchmark_id: String,
    metric_name: String,
    score: f64,
    #[serde(default)]
    metadata: Option<Attributes>,
}

impl BenchmarkScore {
    pub fn new(
        method_id: impl Into<String>,
        benchmark_id: impl Into<String>,
        metric_name: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            method_id: method_id.into(),
            benchmark_id: benchmark_id.into(),
            metric_name: metric_name.into(),
            score,
            metadata: Attributes::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: Attributes) -> Self {
        self.metadata = metadata;
        self
    }

    /// Storage identity: `{method_id}_{benchmark_id}_{metric_name}`.
    pub fn storage_key(&self) -> String {
        format!(
            "{}_{}_{}",
            self.method_id, self.benchmark_id, self.metric_name
        )
    }

    pub fn to_record(&self) -> Value {
        json!({
            "method_id": self.method_id,
            "benchmark_id": self.benchmark_id,
            "metric_name": self.metric_name,
            "score": self.score,
            "metadata": self.metadata,
        })
    }

    pub fn from_record(value: Value) -> Result<Self, LitError> {
        let raw: BenchmarkScoreRecord = decode("benchmark score", value)?;
        Ok(Self {
            method_id: raw.method_id,
            benchmark_id: raw.benchmark_id,
            metric_name: raw.metric_name,
            score: raw.score,
            metadata: raw.metadata.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_entity_round_trip() {
        let entity = Entity::new("colbert", "ColBERT", EntityType::Method)
            .with_feature("year", 2020)
            .with_feature("architecture", "late interaction")
            .with_metadata(attrs(json!({"source": "arxiv:2004.12832"})));

        let restored = Entity::from_record(entity.to_record()).unwrap();

        assert_eq!(restored, entity);
    }

    #[test]
    fn test_entity_serialize_matches_record() {
        let entity = Entity::new("e1", "E1", EntityType::Dataset).with_feature("size", "1M");
        assert_eq!(serde_json::to_value(&entity).unwrap(), entity.to_record());
    }

    #[test]
    fn test_entity_record_field_names() {
        let record = Entity::new("e1", "E1", EntityType::Paper).to_record();
        let obj = record.as_object().unwrap();
        let mut keys: Vec<_> = obj.keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["created_at", "entity_type", "features", "id", "metadata", "name"]
        );
        assert_eq!(obj["entity_type"], "paper");
    }

    #[test]
    fn test_entity_defaults_for_missing_maps() {
        let before = timestamp::now();
        let entity = Entity::from_record(json!({
            "id": "bm25",
            "name": "BM25",
            "entity_type": "method"
        }))
        .unwrap();

        assert!(entity.features.is_empty());
        assert!(entity.metadata.is_empty());
        assert!(entity.created_at() >= before);
    }

    #[test]
    fn test_entity_accepts_naive_timestamp() {
        let entity = Entity::from_record(json!({
            "id": "bm25",
            "name": "BM25",
            "entity_type": "method",
            "features": {},
            "metadata": {},
            "created_at": "2024-11-05T14:30:01.123456"
        }))
        .unwrap();

        assert_eq!(
            timestamp::format(&entity.created_at()),
            "2024-11-05T14:30:01.123456+00:00"
        );
    }

    #[test]
    fn test_entity_unknown_type_is_validation_error() {
        let err = Entity::from_record(json!({
            "id": "x",
            "name": "X",
            "entity_type": "gadget"
        }))
        .unwrap_err();

        assert!(matches!(err, LitError::Validation { .. }));
    }

    #[test]
    fn test_entity_missing_name_is_malformed() {
        let err = Entity::from_record(json!({"id": "x", "entity_type": "method"})).unwrap_err();
        assert!(matches!(err, LitError::MalformedRecord { kind: "entity", .. }));
    }

    #[test]
    fn test_entity_bad_timestamp_is_malformed() {
        let err = Entity::from_record(json!({
            "id": "x",
            "name": "X",
            "entity_type": "method",
            "created_at": "last tuesday"
        }))
        .unwrap_err();
        assert!(matches!(err, LitError::MalformedRecord { .. }));
    }

    #[test]
    fn test_add_and_get_feature() {
        let mut entity = Entity::new("m", "M", EntityType::Method);
        entity.add_feature("dims", 768);
        entity.add_feature("dims", 1024);

        assert_eq!(entity.get_feature("dims"), Some(&json!(1024)));
        assert_eq!(entity.get_feature("missing"), None);
        assert_eq!(entity.feature_count(), 1);
    }

    #[test]
    fn test_relationship_round_trip() {
        let rel = EntityRelationship::new("colbert", "bert", RelationType::BasedOn)
            .with_properties(attrs(json!({"note": "encoder"})))
            .with_confidence(0.75);

        let restored = EntityRelationship::from_record(rel.to_record()).unwrap();

        assert_eq!(restored, rel);
    }

    #[test]
    fn test_relationship_defaults() {
        let rel = EntityRelationship::from_record(json!({
            "source_id": "a",
            "target_id": "b",
            "relation_type": "uses"
        }))
        .unwrap();

        assert_eq!(rel.confidence, 1.0);
        assert!(rel.properties.is_empty());
    }

    #[test]
    fn test_relationship_unknown_type() {
        let err = EntityRelationship::from_record(json!({
            "source_id": "a",
            "target_id": "b",
            "relation_type": "cites"
        }))
        .unwrap_err();
        assert!(matches!(err, LitError::Validation { field: "relation_type", .. }));
    }

    #[test]
    fn test_relationship_storage_key() {
        let rel = EntityRelationship::new("splade", "bm25", RelationType::ImprovesUpon);
        assert_eq!(rel.storage_key(), "splade_improves_upon_bm25");
    }

    #[test]
    fn test_score_round_trip_and_key() {
        let score = BenchmarkScore::new("colbert", "beir", "ndcg@10", 0.85)
            .with_metadata(attrs(json!({"split": "test"})));

        assert_eq!(score.storage_key(), "colbert_beir_ndcg@10");
        assert_eq!(BenchmarkScore::from_record(score.to_record()).unwrap(), score);
    }

    #[test]
    fn test_score_requires_numeric_score() {
        let err = BenchmarkScore::from_record(json!({
            "method_id": "m",
            "benchmark_id": "b",
            "metric_name": "acc",
            "score": "high"
        }))
        .unwrap_err();
        assert!(matches!(err, LitError::MalformedRecord { kind: "benchmark score", .. }));
    }
}
