//! Markdown report rendering.
//!
//! A report has a title, a summary, an optional rankings table and an optional
//! feature comparison table:
//!
//! ```text
//! # State-of-the-Art Report: RAG
//!
//! ## Summary
//!
//! Best solutions for 'RAG': ...
//!
//! ## Rankings
//!
//! | Rank | Method | Score | Metric |
//! |------|--------|-------|--------|
//! | 1 | ColBERT | 0.85 | ndcg |
//!
//! ## Feature Comparison
//!
//! | Method | year |
//! |---|---|
//! | ColBERT | 2020 |
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::compare::{FeatureMatrix, RankingRow};
use crate::constants::{ENTITY_NAME_ROW, MISSING_VALUE};
use crate::errors::LitError;

/// What a report is about; decides the title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    /// State-of-the-art search for a domain.
    Sota { domain: String },
    /// Side-by-side comparison of named methods.
    Comparison,
}

impl ReportKind {
    pub fn title(&self) -> String {
        match self {
            Self::Sota { domain } => format!("State-of-the-Art Report: {}", domain),
            Self::Comparison => "Method Comparison Report".to_string(),
        }
    }
}

/// Borrowed view of everything a report renders.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    pub kind: &'a ReportKind,
    pub summary: &'a str,
    pub rankings: &'a [RankingRow],
    pub feature_matrix: &'a FeatureMatrix,
}

/// Render a report as Markdown.
///
/// The rankings section is omitted when there are no rows, and the feature
/// section when the matrix has no feature rows.
pub fn render_markdown_report(report: &Report<'_>) -> String {
    let mut sections = vec![
        format!("# {}", report.kind.title()),
        format!("## Summary\n\n{}", report.summary.trim_end()),
    ];

    if !report.rankings.is_empty() {
        sections.push(rankings_section(report.rankings));
    }

    if let Some(features) = feature_section(report.feature_matrix) {
        sections.push(features);
    }

    let mut out = sections.join("\n\n");
    out.push('\n');
    out
}

/// Write rendered report text to `path`, creating parent directories.
pub fn write_report(path: &Path, text: &str) -> Result<(), LitError> {
    let to_err = |e: std::io::Error| LitError::ReportWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_err)?;
    }
    fs::write(path, text).map_err(to_err)?;

    tracing::debug!("Wrote report to {}", path.display());
    Ok(())
}

fn rankings_section(rankings: &[RankingRow]) -> String {
    let mut lines = vec![
        "## Rankings".to_string(),
        String::new(),
        "| Rank | Method | Score | Metric |".to_string(),
        "|------|--------|-------|--------|".to_string(),
    ];
    for row in rankings {
        let score = row
            .score
            .map(score_text)
            .unwrap_or_else(|| MISSING_VALUE.to_string());
        let metric = row.metric.as_deref().unwrap_or(MISSING_VALUE);
        lines.push(format!(
            "| {} | {} | {} | {} |",
            row.rank,
            cell(&row.name),
            score,
            cell(metric)
        ));
    }
    lines.join("\n")
}

fn feature_section(matrix: &FeatureMatrix) -> Option<String> {
    let names = matrix.get(ENTITY_NAME_ROW)?;
    let features: Vec<(&str, &[Value])> = matrix
        .rows()
        .filter(|(name, _)| *name != ENTITY_NAME_ROW)
        .collect();
    if features.is_empty() {
        return None;
    }

    let header = features
        .iter()
        .map(|(name, _)| cell(name))
        .collect::<Vec<_>>()
        .join(" | ");

    let mut lines = vec![
        "## Feature Comparison".to_string(),
        String::new(),
        format!("| Method | {} |", header),
        format!("|{}|", vec!["---"; features.len() + 1].join("|")),
    ];
    for (idx, name) in names.iter().enumerate() {
        let mut row = format!("| {} |", cell(&value_text(name)));
        for (_, values) in &features {
            let value = values.get(idx).map(value_text).unwrap_or_default();
            row.push_str(&format!(" {} |", cell(&value)));
        }
        lines.push(row);
    }
    Some(lines.join("\n"))
}

/// Strings print bare; everything else in its JSON form.
/// Scores always carry a decimal point (`1.0`, not `1`).
fn score_text(score: f64) -> String {
    format!("{:?}", score)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Entity, EntityType};
    use serde_json::json;
    use tempfile::TempDir;

    fn ranking(rank: usize, name: &str, score: Option<f64>) -> RankingRow {
        RankingRow {
            rank,
            entity_id: name.to_lowercase(),
            name: name.to_string(),
            score,
            metric: score.map(|_| "ndcg".to_string()),
            metadata: None,
            feature_count: None,
            entity_type: None,
        }
    }

    #[test]
    fn test_full_report_layout() {
        let entities = vec![
            Entity::new("a", "ColBERT", EntityType::Method).with_feature("year", 2020),
            Entity::new("b", "BM25", EntityType::Method).with_feature("kind", "sparse"),
        ];
        let matrix = FeatureMatrix::build(&entities, None);
        let rankings = vec![ranking(1, "ColBERT", Some(0.85)), ranking(2, "BM25", None)];
        let kind = ReportKind::Sota {
            domain: "RAG".to_string(),
        };

        let text = render_markdown_report(&Report {
            kind: &kind,
            summary: "Best solutions for 'RAG':\n\n1. ColBERT\n",
            rankings: &rankings,
            feature_matrix: &matrix,
        });

        let expected = "\
# State-of-the-Art Report: RAG

## Summary

Best solutions for 'RAG':

1. ColBERT

## Rankings

| Rank | Method | Score | Metric |
|------|--------|-------|--------|
| 1 | ColBERT | 0.85 | ndcg |
| 2 | BM25 | N/A | N/A |

## Feature Comparison

| Method | kind | year |
|---|---|---|
| ColBERT | N/A | 2020 |
| BM25 | sparse | N/A |
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_whole_scores_keep_decimal_point() {
        let rankings = vec![ranking(1, "Exact", Some(1.0)), ranking(2, "Half", Some(0.5))];
        let matrix = FeatureMatrix::build(&[], None);

        let text = render_markdown_report(&Report {
            kind: &ReportKind::Comparison,
            summary: "scores",
            rankings: &rankings,
            feature_matrix: &matrix,
        });

        assert!(text.contains("| 1 | Exact | 1.0 | ndcg |"));
        assert!(text.contains("| 2 | Half | 0.5 | ndcg |"));
    }

    #[test]
    fn test_empty_sections_omitted() {
        let kind = ReportKind::Comparison;
        let matrix = FeatureMatrix::build(&[Entity::new("a", "A", EntityType::Method)], None);

        let text = render_markdown_report(&Report {
            kind: &kind,
            summary: "nothing",
            rankings: &[],
            feature_matrix: &matrix,
        });

        assert_eq!(text, "# Method Comparison Report\n\n## Summary\n\nnothing\n");
    }

    #[test]
    fn test_non_string_values_use_json() {
        let entities = vec![Entity::new("a", "A", EntityType::Method)
            .with_feature("tags", json!(["x", "y"]))
            .with_feature("open", true)];
        let matrix = FeatureMatrix::build(&entities, None);

        let text = render_markdown_report(&Report {
            kind: &ReportKind::Comparison,
            summary: "",
            rankings: &[],
            feature_matrix: &matrix,
        });

        assert!(text.contains(r#"| A | true | ["x","y"] |"#));
    }

    #[test]
    fn test_write_report_creates_parents() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("report.md");

        write_report(&path, "# hi\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# hi\n");
    }
}
