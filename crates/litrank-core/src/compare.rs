//! Comparison engine: rankings, feature matrices and text summaries.
//!
//! All operations are read-only queries over a borrowed [`EntityStore`].
//! Every query returns a [`ComparisonResult`]; "nothing found" is an empty
//! result with an explanatory summary, never an error.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::constants::{
    ENTITY_NAME_ROW, FEATURE_SUMMARY_ROWS, MISSING_VALUE, SOLUTION_LIMIT, SUMMARY_ROWS,
};
use crate::model::{Attributes, Entity, EntityType};
use crate::store::{sort_scores, EntityStore};

// ============================================================================
// FeatureMatrix
// ============================================================================

/// Feature comparison table: one named row per feature, one column per entity.
///
/// The first row is always `entity_name`. Rows keep insertion order and
/// serialize as a JSON object in that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMatrix {
    rows: Vec<(String, Vec<Value>)>,
}

impl FeatureMatrix {
    /// Build a matrix over `entities`.
    ///
    /// With `features = None` the rows are the sorted union of every entity's
    /// feature keys. Entities lacking a feature contribute `"N/A"`.
    pub fn build(entities: &[Entity], features: Option<&[String]>) -> Self {
        let keys: Vec<String> = match features {
            Some(list) => list.to_vec(),
            None => entities
                .iter()
                .flat_map(|e| e.features.keys().cloned())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let mut matrix = Self::default();
        matrix.insert(
            ENTITY_NAME_ROW,
            entities.iter().map(|e| Value::String(e.name.clone())).collect(),
        );
        for key in keys {
            let values = entities
                .iter()
                .map(|e| {
                    e.get_feature(&key)
                        .cloned()
                        .unwrap_or_else(|| Value::String(MISSING_VALUE.to_string()))
                })
                .collect();
            matrix.insert(key, values);
        }
        matrix
    }

    /// Insert a row, replacing an existing row of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<Value>) {
        let name = name.into();
        match self.rows.iter_mut().find(|(n, _)| *n == name) {
            Some(row) => row.1 = values,
            None => self.rows.push((name, values)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&[Value]> {
        self.rows
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// All rows, `entity_name` first.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.rows.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Feature row names, excluding `entity_name`.
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(|(n, _)| n.as_str())
            .filter(|n| *n != ENTITY_NAME_ROW)
    }

    /// Number of rows besides `entity_name`.
    pub fn feature_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Total rows, `entity_name` included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Serialize for FeatureMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rows.len()))?;
        for (name, values) in &self.rows {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

// ============================================================================
// Results
// ============================================================================

/// One ranked row. Which optional fields are set depends on the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingRow {
    pub rank: usize,
    pub entity_id: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Attributes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_count: Option<usize>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
}

impl RankingRow {
    fn new(rank: usize, entity: &Entity) -> Self {
        Self {
            rank,
            entity_id: entity.id().to_string(),
            name: entity.name.clone(),
            score: None,
            metric: None,
            metadata: None,
            feature_count: None,
            entity_type: None,
        }
    }
}

/// Outcome of a comparison query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Entities involved, in the order used for the feature matrix.
    pub entities: Vec<Entity>,
    pub rankings: Vec<RankingRow>,
    pub feature_matrix: FeatureMatrix,
    /// Human-readable summary.
    pub summary: String,
}

impl ComparisonResult {
    fn empty(summary: String) -> Self {
        Self {
            summary,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

// ============================================================================
// ComparisonEngine
// ============================================================================

/// Read-only comparison queries over an entity store.
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine<'a> {
    store: &'a EntityStore,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(store: &'a EntityStore) -> Self {
        Self { store }
    }

    /// Rank methods by their score on one benchmark metric.
    pub fn compare_methods_on_benchmark(
        &self,
        benchmark_id: &str,
        metric_name: &str,
        limit: usize,
        higher_is_better: bool,
    ) -> ComparisonResult {
        let top = self
            .store
            .get_top_performers(benchmark_id, metric_name, limit, higher_is_better);

        if top.is_empty() {
            return ComparisonResult::empty(format!(
                "No results found for {} on metric {}",
                benchmark_id, metric_name
            ));
        }

        let rankings: Vec<RankingRow> = top
            .iter()
            .enumerate()
            .map(|(idx, p)| RankingRow {
                score: Some(p.score),
                metric: Some(metric_name.to_string()),
                metadata: Some(p.metadata.clone()),
                ..RankingRow::new(idx + 1, &p.method)
            })
            .collect();
        let entities: Vec<Entity> = top.into_iter().map(|p| p.method).collect();

        tracing::debug!(
            "Ranked {} methods on {} ({})",
            rankings.len(),
            benchmark_id,
            metric_name
        );

        ComparisonResult {
            feature_matrix: FeatureMatrix::build(&entities, None),
            summary: benchmark_summary(benchmark_id, metric_name, &rankings),
            entities,
            rankings,
        }
    }

    /// Compare entities side by side on their features.
    ///
    /// Unknown ids are skipped. Rankings order entities by feature count,
    /// keeping input order for ties.
    pub fn compare_entities_by_features(
        &self,
        entity_ids: &[String],
        features: Option<&[String]>,
    ) -> ComparisonResult {
        let entities: Vec<Entity> = entity_ids
            .iter()
            .filter_map(|id| self.store.get_entity(id))
            .collect();

        if entities.is_empty() {
            return ComparisonResult::empty("No entities found for comparison".to_string());
        }

        let feature_matrix = FeatureMatrix::build(&entities, features);

        let mut by_count: Vec<&Entity> = entities.iter().collect();
        by_count.sort_by(|a, b| b.feature_count().cmp(&a.feature_count()));
        let rankings = by_count
            .into_iter()
            .enumerate()
            .map(|(idx, e)| RankingRow {
                feature_count: Some(e.feature_count()),
                entity_type: Some(e.entity_type),
                ..RankingRow::new(idx + 1, e)
            })
            .collect();

        ComparisonResult {
            summary: feature_summary(&entities, &feature_matrix),
            entities,
            rankings,
            feature_matrix,
        }
    }

    /// Find the best methods matching a free-text query.
    ///
    /// With both `benchmark_id` and `metric_name`, matching methods that have
    /// a score there are ranked by it. Otherwise the first matches are
    /// returned in store order. `constraints` is accepted but not applied yet.
    pub fn find_best_solution(
        &self,
        query: &str,
        benchmark_id: Option<&str>,
        metric_name: Option<&str>,
        _constraints: Option<&Attributes>,
    ) -> ComparisonResult {
        let hits = self.store.search_entities(query, Some(EntityType::Method));

        if hits.is_empty() {
            return ComparisonResult::empty(format!("No methods found matching query: {}", query));
        }

        let (entities, rankings) = match (non_empty(benchmark_id), non_empty(metric_name)) {
            (Some(benchmark), Some(metric)) => self.rank_hits_by_score(&hits, benchmark, metric),
            _ => {
                let entities: Vec<Entity> = hits.into_iter().take(SOLUTION_LIMIT).collect();
                let rankings = entities
                    .iter()
                    .enumerate()
                    .map(|(idx, e)| RankingRow {
                        feature_count: Some(e.feature_count()),
                        ..RankingRow::new(idx + 1, e)
                    })
                    .collect();
                (entities, rankings)
            }
        };

        ComparisonResult {
            feature_matrix: FeatureMatrix::build(&entities, None),
            summary: solution_summary(query, &rankings),
            entities,
            rankings,
        }
    }

    fn rank_hits_by_score(
        &self,
        hits: &[Entity],
        benchmark_id: &str,
        metric_name: &str,
    ) -> (Vec<Entity>, Vec<RankingRow>) {
        let hit_ids: HashSet<&str> = hits.iter().map(|e| e.id()).collect();

        let mut scores: Vec<_> = self
            .store
            .get_benchmark_scores(None, Some(benchmark_id), Some(metric_name))
            .into_iter()
            .filter(|s| hit_ids.contains(s.method_id.as_str()))
            .collect();
        sort_scores(&mut scores, true);

        let scored: Vec<(Entity, f64)> = scores
            .into_iter()
            .filter_map(|s| self.store.get_entity(&s.method_id).map(|e| (e, s.score)))
            .take(SOLUTION_LIMIT)
            .collect();

        let rankings = scored
            .iter()
            .enumerate()
            .map(|(idx, (e, score))| RankingRow {
                score: Some(*score),
                metric: Some(metric_name.to_string()),
                ..RankingRow::new(idx + 1, e)
            })
            .collect();
        let entities = scored.into_iter().map(|(e, _)| e).collect();

        (entities, rankings)
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ============================================================================
// Summaries
// ============================================================================

fn benchmark_summary(benchmark_id: &str, metric_name: &str, rankings: &[RankingRow]) -> String {
    let Some(best) = rankings.first() else {
        return format!("No results found for {}", benchmark_id);
    };

    let mut summary = format!(
        "Best performing method on {} ({}): {} with score {:.4}\n\nTop performers:\n",
        benchmark_id,
        metric_name,
        best.name,
        best.score.unwrap_or_default()
    );
    for row in rankings.iter().take(SUMMARY_ROWS) {
        let _ = writeln!(
            summary,
            "{}. {}: {:.4}",
            row.rank,
            row.name,
            row.score.unwrap_or_default()
        );
    }
    summary
}

fn feature_summary(entities: &[Entity], matrix: &FeatureMatrix) -> String {
    let mut summary = format!(
        "Comparing {} entities across {} features\n\n",
        entities.len(),
        matrix.feature_count()
    );
    for entity in entities.iter().take(FEATURE_SUMMARY_ROWS) {
        let _ = writeln!(summary, "- {}: {} features", entity.name, entity.feature_count());
    }
    summary
}

fn solution_summary(query: &str, rankings: &[RankingRow]) -> String {
    if rankings.is_empty() {
        return format!("No solutions found for: {}", query);
    }

    let mut summary = format!("Best solutions for '{}':\n\n", query);
    for row in rankings.iter().take(SUMMARY_ROWS) {
        let _ = write!(summary, "{}. {}", row.rank, row.name);
        if let Some(score) = row.score {
            let _ = write!(summary, " (score: {:.4})", score);
        }
        summary.push('\n');
    }
    summary
}
