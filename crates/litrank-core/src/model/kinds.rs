//! Closed enumerations for entity and relationship kinds.
//!
//! Both enums serialize to their lowercase snake_case value, which is also the
//! persisted form. Parsing is exact: anything outside the set is a
//! [`LitError::Validation`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::errors::LitError;

// ============================================================================
// EntityType
// ============================================================================

/// Kind of research artifact an [`Entity`](super::Entity) describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    /// A technique or system (e.g. ColBERT).
    Method,
    /// A published paper.
    Paper,
    /// A code repository.
    Repository,
    /// An evaluation benchmark.
    Benchmark,
    /// A dataset.
    Dataset,
    /// A capability or property.
    Feature,
    /// A measurement (e.g. NDCG@10).
    Metric,
}

impl EntityType {
    /// Every entity type, in declaration order.
    pub const ALL: [EntityType; 7] = [
        Self::Method,
        Self::Paper,
        Self::Repository,
        Self::Benchmark,
        Self::Dataset,
        Self::Feature,
        Self::Metric,
    ];

    /// The persisted string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Method => "method",
            Self::Paper => "paper",
            Self::Repository => "repository",
            Self::Benchmark => "benchmark",
            Self::Dataset => "dataset",
            Self::Feature => "feature",
            Self::Metric => "metric",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LitError::Validation {
                field: "entity_type",
                value: s.to_string(),
                expected: Self::expected(),
            })
    }
}

// ============================================================================
// RelationType
// ============================================================================

/// Kind of directed edge between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    Implements,
    Uses,
    ImprovesUpon,
    EvaluatedOn,
    PartOf,
    ComparedWith,
    BasedOn,
}

impl RelationType {
    /// Every relation type, in declaration order.
    pub const ALL: [RelationType; 7] = [
        Self::Implements,
        Self::Uses,
        Self::ImprovesUpon,
        Self::EvaluatedOn,
        Self::PartOf,
        Self::ComparedWith,
        Self::BasedOn,
    ];

    /// The persisted string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Implements => "implements",
            Self::Uses => "uses",
            Self::ImprovesUpon => "improves_upon",
            Self::EvaluatedOn => "evaluated_on",
            Self::PartOf => "part_of",
            Self::ComparedWith => "compared_with",
            Self::BasedOn => "based_on",
        }
    }

    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = LitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| LitError::Validation {
                field: "relation_type",
                value: s.to_string(),
                expected: Self::expected(),
            })
    }
}
