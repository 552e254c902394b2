//! Table rendering for CLI output using comfy-table.
//!
//! ## Tables Overview
//!
//! | Command | Table Function |
//! |---------|----------------|
//! | `litrank entity list`, `search` | `render_entities_table()` |
//! | `litrank top`, `compare`, `best`, `sota` | `render_rankings_table()` |
//! | `litrank compare features`, `sota` | `render_feature_matrix()` |
//! | `litrank scores` | `render_scores_table()` |
//! | `litrank relations` | `render_relationships_table()` |
//! | `litrank stats` | `render_metrics_table()` |
//!
//! Every renderer returns an empty string for empty input.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, ColumnConstraint, Table, Width};

use litrank_core::constants::{ENTITY_NAME_ROW, MISSING_VALUE};
use litrank_core::{BenchmarkScore, Entity, EntityRelationship, FeatureMatrix, RankingRow};

use super::format::{format_value, truncate_str};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table
}

fn right(content: impl ToString) -> Cell {
    Cell::new(content.to_string()).set_alignment(CellAlignment::Right)
}

/// Render entities for `litrank entity list` and `litrank search`.
///
/// # Example Output
///
/// ```text
/// ID         NAME        TYPE        FEATURES
/// colbert    ColBERT     method             3
/// beir       BEIR        benchmark          0
/// ```
pub fn render_entities_table(entities: &[Entity], max_name: usize) -> String {
    if entities.is_empty() {
        return String::new();
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("ID"),
        Cell::new("NAME"),
        Cell::new("TYPE"),
        right("FEATURES"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // ID
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // NAME
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // TYPE
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // FEATURES
    ]);

    for entity in entities {
        table.add_row(vec![
            Cell::new(truncate_str(entity.id(), max_name)),
            Cell::new(truncate_str(&entity.name, max_name)),
            Cell::new(entity.entity_type),
            right(entity.feature_count()),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render ranking rows.
///
/// Score rankings show SCORE and METRIC columns; feature-count rankings
/// (rows without scores) show TYPE and FEATURES instead.
///
/// # Example Output
///
/// ```text
/// RANK   METHOD      SCORE   METRIC
///    1   SPLADE        0.9   ndcg
///    2   ColBERT      0.85   ndcg
/// ```
pub fn render_rankings_table(rankings: &[RankingRow], max_name: usize) -> String {
    if rankings.is_empty() {
        return String::new();
    }

    let scored = rankings.iter().any(|r| r.score.is_some());
    let mut table = new_table();

    if scored {
        table.set_header(vec![
            right("RANK"),
            Cell::new("METHOD"),
            right("SCORE"),
            Cell::new("METRIC"),
        ]);
    } else {
        table.set_header(vec![
            right("RANK"),
            Cell::new("NAME"),
            Cell::new("TYPE"),
            right("FEATURES"),
        ]);
    }
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(4)),  // RANK
        ColumnConstraint::LowerBoundary(Width::Fixed(10)), // METHOD / NAME
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),  // SCORE / TYPE
        ColumnConstraint::LowerBoundary(Width::Fixed(6)),  // METRIC / FEATURES
    ]);

    for row in rankings {
        let name = truncate_str(&row.name, max_name);
        if scored {
            table.add_row(vec![
                right(row.rank),
                Cell::new(name),
                right(
                    row.score
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| MISSING_VALUE.to_string()),
                ),
                Cell::new(row.metric.as_deref().unwrap_or(MISSING_VALUE)),
            ]);
        } else {
            table.add_row(vec![
                right(row.rank),
                Cell::new(name),
                Cell::new(
                    row.entity_type
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| MISSING_VALUE.to_string()),
                ),
                right(
                    row.feature_count
                        .map(|c| c.to_string())
                        .unwrap_or_else(|| MISSING_VALUE.to_string()),
                ),
            ]);
        }
    }

    table.trim_fmt().to_string()
}

/// Render a feature matrix with one column per entity.
///
/// # Example Output
///
/// ```text
/// FEATURE   ColBERT   SPLADE
/// task      RAG       RAG
/// year      2020      N/A
/// ```
pub fn render_feature_matrix(matrix: &FeatureMatrix, max_cell: usize) -> String {
    let Some(names) = matrix.get(ENTITY_NAME_ROW) else {
        return String::new();
    };
    if matrix.feature_count() == 0 {
        return String::new();
    }

    let mut table = new_table();
    let mut header = vec![Cell::new("FEATURE")];
    header.extend(
        names
            .iter()
            .map(|n| Cell::new(truncate_str(&format_value(n), max_cell))),
    );
    table.set_header(header);

    for (feature, values) in matrix.rows().filter(|(n, _)| *n != ENTITY_NAME_ROW) {
        let mut row = vec![Cell::new(truncate_str(feature, max_cell))];
        row.extend(
            values
                .iter()
                .map(|v| Cell::new(truncate_str(&format_value(v), max_cell))),
        );
        table.add_row(row);
    }

    table.trim_fmt().to_string()
}

/// Render benchmark scores for `litrank scores`.
///
/// # Example Output
///
/// ```text
/// METHOD    BENCHMARK   METRIC   SCORE
/// colbert   beir        ndcg      0.85
/// ```
pub fn render_scores_table(scores: &[BenchmarkScore]) -> String {
    if scores.is_empty() {
        return String::new();
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("METHOD"),
        Cell::new("BENCHMARK"),
        Cell::new("METRIC"),
        right("SCORE"),
    ]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(8)), // METHOD
        ColumnConstraint::LowerBoundary(Width::Fixed(9)), // BENCHMARK
        ColumnConstraint::LowerBoundary(Width::Fixed(6)), // METRIC
        ColumnConstraint::LowerBoundary(Width::Fixed(6)), // SCORE
    ]);

    for score in scores {
        table.add_row(vec![
            Cell::new(&score.method_id),
            Cell::new(&score.benchmark_id),
            Cell::new(&score.metric_name),
            right(score.score),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render relationships for `litrank relations`.
///
/// # Example Output
///
/// ```text
/// SOURCE    RELATION       TARGET   CONFIDENCE
/// colbert   based_on       bert            0.9
/// ```
pub fn render_relationships_table(relationships: &[EntityRelationship]) -> String {
    if relationships.is_empty() {
        return String::new();
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("SOURCE"),
        Cell::new("RELATION"),
        Cell::new("TARGET"),
        right("CONFIDENCE"),
    ]);

    for rel in relationships {
        table.add_row(vec![
            Cell::new(&rel.source_id),
            Cell::new(rel.relation_type),
            Cell::new(&rel.target_id),
            right(rel.confidence),
        ]);
    }

    table.trim_fmt().to_string()
}

/// Render a simple key-value table.
///
/// # Example Output
///
/// ```text
/// RECORD              COUNT
/// Entities                3
/// Benchmark scores    1,204
/// ```
pub fn render_metrics_table(metrics: &[(String, String)]) -> String {
    if metrics.is_empty() {
        return String::new();
    }

    let mut table = new_table();
    table.set_header(vec![Cell::new("RECORD"), right("COUNT")]);
    table.set_constraints(vec![
        ColumnConstraint::LowerBoundary(Width::Fixed(18)), // RECORD
        ColumnConstraint::LowerBoundary(Width::Fixed(8)),  // COUNT
    ]);

    for (key, value) in metrics {
        table.add_row(vec![Cell::new(key), right(value)]);
    }

    table.trim_fmt().to_string()
}
