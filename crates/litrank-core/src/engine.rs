//! litrank engine: the entry point tying configuration, storage and queries together.
//!
//! [`LitEngine`] owns the resolved [`GlobalConfig`] and an [`EntityStore`].
//! Query methods borrow a [`ComparisonEngine`] over that store.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::compare::{ComparisonEngine, ComparisonResult, FeatureMatrix, RankingRow};
use crate::config::GlobalConfig;
use crate::errors::LitError;
use crate::ingest::{ingest_bundle, ExtractionBundle, IngestSummary};
use crate::report::{render_markdown_report, Report, ReportKind};
use crate::store::EntityStore;

// ============================================================================
// Result Types
// ============================================================================

/// State-of-the-art answer for a domain query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SotaReport {
    pub domain: String,
    pub num_methods: usize,
    pub rankings: Vec<RankingRow>,
    pub feature_matrix: FeatureMatrix,
    pub summary: String,
}

impl SotaReport {
    fn from_result(domain: &str, result: ComparisonResult) -> Self {
        Self {
            domain: domain.to_string(),
            num_methods: result.entities.len(),
            rankings: result.rankings,
            feature_matrix: result.feature_matrix,
            summary: result.summary,
        }
    }

    /// Render as a Markdown report titled after the domain.
    pub fn to_markdown(&self) -> String {
        let kind = ReportKind::Sota {
            domain: self.domain.clone(),
        };
        render_markdown_report(&Report {
            kind: &kind,
            summary: &self.summary,
            rankings: &self.rankings,
            feature_matrix: &self.feature_matrix,
        })
    }
}

/// Feature comparison of methods looked up by name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodComparison {
    /// Names of the resolved entities, in request order.
    pub methods: Vec<String>,
    pub feature_matrix: FeatureMatrix,
    pub summary: String,
}

impl MethodComparison {
    pub fn to_markdown(&self) -> String {
        render_markdown_report(&Report {
            kind: &ReportKind::Comparison,
            summary: &self.summary,
            rankings: &[],
            feature_matrix: &self.feature_matrix,
        })
    }
}

// ============================================================================
// LitEngine
// ============================================================================

/// The main engine for litrank operations.
///
/// # Construction
///
/// Use [`LitEngine::with_defaults`] for typical usage, [`LitEngine::with_config`]
/// for an explicit config file, or [`LitEngine::with_data_dir`] to point at a
/// data directory directly (tests, scripts).
#[derive(Debug)]
pub struct LitEngine {
    global_config: GlobalConfig,
    data_dir: PathBuf,
    store: EntityStore,
}

impl LitEngine {
    // -------------------------------------------------------------------------
    // Construction
    // -------------------------------------------------------------------------

    /// Create an engine from a loaded configuration.
    ///
    /// `data_dir` overrides the configured data directory.
    pub fn from_global_config(
        global_config: GlobalConfig,
        data_dir: Option<&Path>,
    ) -> anyhow::Result<Self> {
        let data_dir = global_config.resolve_data_dir(data_dir)?;
        let store = EntityStore::open(&data_dir)?;
        tracing::debug!("Using data directory {}", data_dir.display());

        Ok(Self {
            global_config,
            data_dir,
            store,
        })
    }

    /// Create an engine from `~/.litrank/config.yaml` (or defaults).
    pub fn with_defaults() -> anyhow::Result<Self> {
        let config = GlobalConfig::load_default()?;
        Self::from_global_config(config, None)
    }

    /// Create an engine from a specific configuration file.
    pub fn with_config(path: &Path, data_dir: Option<&Path>) -> anyhow::Result<Self> {
        let config = GlobalConfig::from_path(path)?;
        Self::from_global_config(config, data_dir)
    }

    /// Create an engine with default settings over an explicit data directory.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Result<Self, LitError> {
        let data_dir = data_dir.into();
        let store = EntityStore::open(&data_dir)?;
        Ok(Self {
            global_config: GlobalConfig::default(),
            data_dir,
            store,
        })
    }

    pub fn global_config(&self) -> &GlobalConfig {
        &self.global_config
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn comparison(&self) -> ComparisonEngine<'_> {
        ComparisonEngine::new(&self.store)
    }

    // -------------------------------------------------------------------------
    // Ingestion
    // -------------------------------------------------------------------------

    pub fn ingest(&self, bundle: &ExtractionBundle) -> Result<IngestSummary, LitError> {
        ingest_bundle(&self.store, bundle, || {})
    }

    /// Parse and store an extraction bundle file.
    pub fn ingest_file(&self, path: &Path) -> Result<IngestSummary, LitError> {
        let bundle = ExtractionBundle::from_file(path)?;
        self.ingest(&bundle)
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Rank methods on a benchmark metric, using configured defaults for
    /// anything not given.
    pub fn top(
        &self,
        benchmark_id: &str,
        metric_name: &str,
        limit: Option<usize>,
        higher_is_better: Option<bool>,
    ) -> ComparisonResult {
        let ranking = &self.global_config.ranking;
        self.comparison().compare_methods_on_benchmark(
            benchmark_id,
            metric_name,
            limit.unwrap_or(ranking.default_limit),
            higher_is_better.unwrap_or(ranking.higher_is_better),
        )
    }

    /// Find state-of-the-art methods for a domain query.
    pub fn find_sota(
        &self,
        domain: &str,
        benchmark_id: Option<&str>,
        metric_name: Option<&str>,
    ) -> SotaReport {
        let result = self
            .comparison()
            .find_best_solution(domain, benchmark_id, metric_name, None);
        SotaReport::from_result(domain, result)
    }

    /// Compare methods by name.
    ///
    /// Each name resolves to the first search hit of any type; names with no
    /// hit are skipped, and a name resolving to an entity already picked adds
    /// nothing. Returns `None` when no name resolves.
    pub fn compare_methods(&self, names: &[String]) -> Option<MethodComparison> {
        let mut ids: Vec<String> = Vec::new();
        for name in names {
            match self.store.search_entities(name, None).into_iter().next() {
                Some(entity) if !ids.iter().any(|id| id == entity.id()) => {
                    ids.push(entity.id().to_string());
                }
                Some(_) => {}
                None => tracing::debug!("No entity matches '{}'", name),
            }
        }

        if ids.is_empty() {
            return None;
        }

        let result = self.comparison().compare_entities_by_features(&ids, None);
        Some(MethodComparison {
            methods: result.entities.iter().map(|e| e.name.clone()).collect(),
            feature_matrix: result.feature_matrix,
            summary: result.summary,
        })
    }
}
