//! # litrank-core
//!
//! Core library for litrank, a personal research-notes aggregator.
//!
//! This crate stores structured facts about papers and tools (methods,
//! benchmarks, scores, relationships) and answers ranking and comparison
//! queries over them. It is consumed by the `litrank` CLI.
//!
//! ## Main Types
//!
//! - [`LitEngine`] – the main entry point (configuration + store + queries)
//! - [`EntityStore`] – typed storage over the file-backed record stores
//! - [`ComparisonEngine`] – rankings, feature matrices and summaries
//! - [`LitError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`model`] – entities, relationships, benchmark scores
//! - [`store`] – the entity store
//! - [`compare`] – the comparison engine
//! - [`report`] – Markdown report rendering
//! - [`ingest`] – extraction bundle ingestion
//! - [`config`] – global configuration
//! - [`engine`] – the LitEngine implementation
//!
//! ## Example
//!
//! ```ignore
//! use litrank_core::{Entity, EntityType, BenchmarkScore, LitEngine};
//!
//! let engine = LitEngine::with_data_dir("/tmp/litrank")?;
//! engine.store().save_entity(&Entity::new("colbert", "ColBERT", EntityType::Method))?;
//! engine.store().save_benchmark_score(&BenchmarkScore::new("colbert", "beir", "ndcg", 0.85))?;
//!
//! let result = engine.comparison().compare_methods_on_benchmark("beir", "ndcg", 10, true);
//! println!("{}", result.summary);
//! ```

pub mod compare;
pub mod config;
pub mod constants;
pub mod db_adapter;
pub mod engine;
pub mod errors;
pub mod ingest;
pub mod model;
pub mod report;
pub mod store;

pub use compare::{ComparisonEngine, ComparisonResult, FeatureMatrix, RankingRow};
pub use config::{ConfigCheck, GlobalConfig, RankingConfig};
pub use engine::{LitEngine, MethodComparison, SotaReport};
pub use errors::LitError;
pub use ingest::{ingest_bundle, ExtractionBundle, IngestSummary};
pub use model::{
    Attributes, BenchmarkScore, Entity, EntityRelationship, EntityType, RelationType,
};
pub use report::{render_markdown_report, write_report, Report, ReportKind};
pub use store::{EntityStore, StoreStats, TopPerformer};
