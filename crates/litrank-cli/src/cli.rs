//! CLI definition and command dispatch for litrank.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to the engine.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (`--config`, `--data-dir`, `--verbose`)
//! 2. Environment variables (`LITRANK_CONFIG`, `LITRANK_DATA_DIR`, `LITRANK_VERBOSE`)
//! 3. Config file (`~/.litrank/config.yaml` or the path from `--config`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use crate::ui::color::terminal_width;
use crate::ui::{format, table, ColorMode, MessageType, Progress, ProgressMode, Style};

use litrank_core::{
    ingest_bundle, write_report, Attributes, BenchmarkScore, ComparisonResult, ConfigCheck,
    Entity, EntityRelationship, EntityType, ExtractionBundle, GlobalConfig, LitEngine, LitError,
    RankingRow, RelationType, TopPerformer,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// litrank – rank and compare methods from your research notes
#[derive(Parser, Debug)]
#[command(name = "litrank")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "LITRANK_VERBOSE")]
    pub verbose: bool,

    /// Suppress progress and informational messages
    #[arg(short, long, global = true, env = "LITRANK_QUIET")]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.litrank/config.yaml)
    #[arg(long, global = true, env = "LITRANK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory holding entity, relationship and score records
    /// (default: `data_dir` from config, else ~/.litrank/data)
    #[arg(long, global = true, env = "LITRANK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Color output mode: always, never, or auto (default: auto)
    #[arg(long, global = true, env = "LITRANK_COLOR", default_value = "auto")]
    pub color: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add, show, list or remove entities
    #[command(after_help = r#"EXAMPLES:
    # Add a method with features
    litrank entity add colbert "ColBERT" --type method -f year=2020 -f task="dense retrieval"

    # Show one entity with its relations and scores
    litrank entity show colbert

    # List all benchmarks
    litrank entity list --type benchmark
"#)]
    Entity {
        #[command(subcommand)]
        action: EntityAction,
    },

    /// Search entities by name or feature text (case-insensitive)
    #[command(after_help = r#"EXAMPLES:
    # Everything mentioning RAG
    litrank search rag

    # Only methods
    litrank search retrieval --type method --json
"#)]
    Search {
        /// Text to look for in names and string features
        query: String,

        /// Restrict to one entity type
        #[arg(long = "type", short = 't')]
        entity_type: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Record a relationship between two entities
    #[command(after_help = r#"EXAMPLES:
    # ColBERT builds on BERT
    litrank relate colbert based_on bert

    # With confidence and properties
    litrank relate colbert improves_upon bm25 --confidence 0.8 -p source=paper
"#)]
    Relate {
        /// Source entity id
        source: String,

        /// Relation type (implements, uses, improves_upon, evaluated_on,
        /// part_of, compared_with, based_on)
        relation: String,

        /// Target entity id
        target: String,

        /// Extraction confidence (any finite number)
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
        confidence: f64,

        /// Property as KEY=VALUE (repeatable; VALUE parsed as JSON when possible)
        #[arg(long = "prop", short = 'p', value_name = "KEY=VALUE")]
        properties: Vec<String>,
    },

    /// List relationships, optionally filtered
    Relations {
        /// Only relationships from this entity
        #[arg(long)]
        source: Option<String>,

        /// Only relationships to this entity
        #[arg(long)]
        target: Option<String>,

        /// Only this relation type
        #[arg(long = "type", short = 't')]
        relation_type: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Record a benchmark score for a method
    #[command(after_help = r#"EXAMPLES:
    # ColBERT scores 0.85 nDCG@10 on BEIR
    litrank score colbert beir ndcg@10 0.85

    # With metadata
    litrank score colbert beir ndcg@10 0.85 -m split=test
"#)]
    Score {
        /// Method entity id
        method: String,

        /// Benchmark entity id
        benchmark: String,

        /// Metric name
        metric: String,

        /// Score value
        #[arg(allow_negative_numbers = true)]
        score: f64,

        /// Metadata as KEY=VALUE (repeatable; VALUE parsed as JSON when possible)
        #[arg(long = "meta", short = 'm', value_name = "KEY=VALUE")]
        metadata: Vec<String>,
    },

    /// List benchmark scores, optionally filtered
    Scores {
        /// Only scores of this method
        #[arg(long)]
        method: Option<String>,

        /// Only scores on this benchmark
        #[arg(long)]
        benchmark: Option<String>,

        /// Only scores for this metric
        #[arg(long)]
        metric: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show the top methods on a benchmark metric
    #[command(after_help = r#"EXAMPLES:
    # Best five on BEIR nDCG@10
    litrank top beir ndcg@10 --limit 5

    # Lowest latency first
    litrank top msmarco latency_ms --lower
"#)]
    Top {
        /// Benchmark entity id
        benchmark: String,

        /// Metric name
        metric: String,

        /// Number of results (default: ranking.default_limit from config)
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Lower scores rank first
        #[arg(long)]
        lower: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Compare methods on a benchmark, or entities by their features
    Compare {
        #[command(subcommand)]
        action: CompareAction,
    },

    /// Find the best solutions for a query
    #[command(after_help = r#"EXAMPLES:
    # Methods matching "rag", ranked by BEIR nDCG@10
    litrank best rag --benchmark beir --metric ndcg@10

    # Methods matching "reranking" with their feature counts
    litrank best reranking
"#)]
    Best {
        /// Text to match against method names and features
        query: String,

        /// Rank by scores on this benchmark (needs --metric)
        #[arg(long, requires = "metric")]
        benchmark: Option<String>,

        /// Metric to rank by (needs --benchmark)
        #[arg(long, requires = "benchmark")]
        metric: Option<String>,

        /// Constraint as KEY=VALUE (repeatable; accepted but not yet applied)
        #[arg(long = "constraint", value_name = "KEY=VALUE")]
        constraints: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// State-of-the-art report for a research domain
    #[command(after_help = r#"EXAMPLES:
    # Print the report
    litrank sota "dense retrieval" --benchmark beir --metric ndcg@10

    # Write it as Markdown
    litrank sota rag --report reports/rag.md
"#)]
    Sota {
        /// Domain query, matched against method names and features
        domain: String,

        /// Rank by scores on this benchmark (needs --metric)
        #[arg(long, requires = "metric")]
        benchmark: Option<String>,

        /// Metric to rank by (needs --benchmark)
        #[arg(long, requires = "benchmark")]
        metric: Option<String>,

        /// Write the Markdown report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Import an extraction bundle (entities, relationships, benchmarks)
    #[command(after_help = r#"EXAMPLES:
    # Import extractor output
    litrank import colbert-paper.json

    # Bundle format
    {"entities": [...], "relationships": [...], "benchmarks": [...]}
"#)]
    Import {
        /// Path to the bundle JSON file
        file: PathBuf,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show record counts for the data directory
    Stats {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Inspect litrank configuration
    #[command(after_help = r#"EXAMPLES:
    # Validate the config file
    litrank config check

    # Show resolved configuration
    litrank config show --json
"#)]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Entity subcommands
#[derive(Subcommand, Debug)]
pub enum EntityAction {
    /// Add or replace an entity
    Add {
        /// Unique entity id
        id: String,

        /// Display name
        name: String,

        /// Entity type (method, paper, repository, benchmark, dataset, feature, metric)
        #[arg(long = "type", short = 't', default_value = "method")]
        entity_type: String,

        /// Feature as KEY=VALUE (repeatable; VALUE parsed as JSON when possible)
        #[arg(long = "feature", short = 'f', value_name = "KEY=VALUE")]
        features: Vec<String>,

        /// Metadata as KEY=VALUE (repeatable; VALUE parsed as JSON when possible)
        #[arg(long = "meta", short = 'm', value_name = "KEY=VALUE")]
        metadata: Vec<String>,
    },

    /// Show one entity
    Show {
        id: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// List entities
    List {
        /// Restrict to one entity type
        #[arg(long = "type", short = 't')]
        entity_type: Option<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove an entity (its relationships and scores are kept)
    Rm { id: String },
}

/// Compare subcommands
#[derive(Subcommand, Debug)]
pub enum CompareAction {
    /// Rank methods by their score on a benchmark metric
    #[command(after_help = r#"EXAMPLES:
    litrank compare benchmark beir ndcg@10 --limit 3
"#)]
    Benchmark {
        /// Benchmark entity id
        benchmark: String,

        /// Metric name
        metric: String,

        /// Number of results (default: ranking.default_limit from config)
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Lower scores rank first
        #[arg(long)]
        lower: bool,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Feature matrix for entities given by id
    #[command(after_help = r#"EXAMPLES:
    # All features of three methods
    litrank compare features colbert splade bm25

    # Selected features only
    litrank compare features colbert splade --feature year --feature params
"#)]
    Features {
        /// Entity ids
        #[arg(required = true)]
        ids: Vec<String>,

        /// Feature to include (repeatable; default: all)
        #[arg(long = "feature", short = 'f')]
        features: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Feature comparison of methods looked up by name
    #[command(after_help = r#"EXAMPLES:
    litrank compare methods ColBERT SPLADE --report reports/colbert-vs-splade.md
"#)]
    Methods {
        /// Method names (first search hit for each)
        #[arg(required = true)]
        names: Vec<String>,

        /// Write the Markdown report to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors/warnings
    Check {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show resolved configuration and data directory
    Show {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Run function
// ============================================================================

/// Run the CLI application.
///
/// Config commands run without touching the data directory; every other
/// command opens a [`LitEngine`] first.
///
/// # Returns
///
/// Returns `ExitCode::SUCCESS` on success, or `ExitCode::FAILURE` on error.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings always; debug only with --verbose
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!(
        "litrank_core={},litrank_db={},litrank_cli={}",
        log_level, log_level, log_level
    );

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let color_mode: ColorMode = cli.color.parse().unwrap_or_default();
    let style = Style::new(color_mode);

    if let Command::Config { action } = &cli.command {
        return finish(&style, handle_config(&style, &cli, action));
    }

    let engine = match open_engine(&cli) {
        Ok(engine) => engine,
        Err(e) => {
            let hint = match &cli.config {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check ~/.litrank/config.yaml or pass --data-dir".to_string(),
            };
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to open litrank data directory",
                    Some(&e.to_string()),
                    Some(&hint),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!("Data directory: {}", engine.data_dir().display());

    let result = match cli.command {
        Command::Entity { action } => handle_entity(&style, &engine, action),
        Command::Search {
            query,
            entity_type,
            json,
        } => handle_search(&style, &engine, &query, entity_type.as_deref(), json),
        Command::Relate {
            source,
            relation,
            target,
            confidence,
            properties,
        } => handle_relate(
            &style,
            &engine,
            &source,
            &relation,
            &target,
            confidence,
            &properties,
        ),
        Command::Relations {
            source,
            target,
            relation_type,
            json,
        } => handle_relations(
            &style,
            &engine,
            source.as_deref(),
            target.as_deref(),
            relation_type.as_deref(),
            json,
        ),
        Command::Score {
            method,
            benchmark,
            metric,
            score,
            metadata,
        } => handle_score(&style, &engine, &method, &benchmark, &metric, score, &metadata),
        Command::Scores {
            method,
            benchmark,
            metric,
            json,
        } => handle_scores(
            &style,
            &engine,
            method.as_deref(),
            benchmark.as_deref(),
            metric.as_deref(),
            json,
        ),
        Command::Top {
            benchmark,
            metric,
            limit,
            lower,
            json,
        } => handle_top(&style, &engine, &benchmark, &metric, limit, lower, json),
        Command::Compare { action } => handle_compare(&style, &engine, action),
        Command::Best {
            query,
            benchmark,
            metric,
            constraints,
            json,
        } => handle_best(
            &style,
            &engine,
            &query,
            benchmark.as_deref(),
            metric.as_deref(),
            &constraints,
            json,
        ),
        Command::Sota {
            domain,
            benchmark,
            metric,
            report,
            json,
        } => handle_sota(
            &style,
            &engine,
            &domain,
            benchmark.as_deref(),
            metric.as_deref(),
            report.as_deref(),
            json,
        ),
        Command::Import { file, json } => handle_import(&style, &engine, &file, cli.quiet, json),
        Command::Stats { json } => handle_stats(&style, &engine, json),
        Command::Config { .. } => Ok(()),
    };

    finish(&style, result)
}

fn finish(style: &Style, result: Result<(), LitError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style.message(MessageType::Err, &e.to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Open the engine honoring `--config` and `--data-dir`.
fn open_engine(cli: &Cli) -> anyhow::Result<LitEngine> {
    match (&cli.config, &cli.data_dir) {
        (Some(path), data_dir) => LitEngine::with_config(path, data_dir.as_deref()),
        (None, None) => LitEngine::with_defaults(),
        (None, Some(dir)) => {
            LitEngine::from_global_config(GlobalConfig::load_default()?, Some(dir.as_path()))
        }
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Parse `KEY=VALUE` pairs. Values are JSON when they parse, else strings.
fn parse_attributes(pairs: &[String]) -> Result<Attributes, LitError> {
    let mut attributes = Attributes::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            return Err(LitError::InvalidArgument(format!(
                "Expected KEY=VALUE, got `{}`",
                pair
            )));
        };
        let key = key.trim();
        if key.is_empty() {
            return Err(LitError::InvalidArgument(format!(
                "Missing key in `{}`",
                pair
            )));
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        attributes.insert(key.to_string(), value);
    }
    Ok(attributes)
}

fn parse_entity_type(raw: Option<&str>) -> Result<Option<EntityType>, LitError> {
    raw.map(|s| s.to_lowercase().parse()).transpose()
}

fn parse_relation_type(raw: Option<&str>) -> Result<Option<RelationType>, LitError> {
    raw.map(|s| s.to_lowercase().parse()).transpose()
}

/// Ranking limit and direction, falling back to configured defaults.
fn ranking_args(engine: &LitEngine, limit: Option<usize>, lower: bool) -> (usize, bool) {
    let ranking = &engine.global_config().ranking;
    (
        limit.unwrap_or(ranking.default_limit),
        if lower { false } else { ranking.higher_is_better },
    )
}

/// Width for name columns, a third of the terminal within sane bounds.
fn name_width() -> usize {
    (terminal_width() / 3).clamp(16, 48)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), LitError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_table(rendered: &str) {
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
}

// ============================================================================
// Entity handlers
// ============================================================================

fn handle_entity(style: &Style, engine: &LitEngine, action: EntityAction) -> Result<(), LitError> {
    match action {
        EntityAction::Add {
            id,
            name,
            entity_type,
            features,
            metadata,
        } => handle_entity_add(style, engine, id, name, &entity_type, &features, &metadata),
        EntityAction::Show { id, json } => handle_entity_show(style, engine, &id, json),
        EntityAction::List { entity_type, json } => {
            handle_entity_list(style, engine, entity_type.as_deref(), json)
        }
        EntityAction::Rm { id } => handle_entity_rm(style, engine, &id),
    }
}

fn handle_entity_add(
    style: &Style,
    engine: &LitEngine,
    id: String,
    name: String,
    entity_type: &str,
    features: &[String],
    metadata: &[String],
) -> Result<(), LitError> {
    let entity_type: EntityType = entity_type.to_lowercase().parse()?;
    let entity = Entity::new(id, name, entity_type)
        .with_features(parse_attributes(features)?)
        .with_metadata(parse_attributes(metadata)?);

    let replaced = engine.store().get_entity(entity.id()).is_some();
    engine.store().save_entity(&entity)?;

    let verb = if replaced { "Replaced" } else { "Added" };
    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "{} {} {} ({})",
                verb,
                entity.entity_type,
                style.id(entity.id()),
                entity.name
            )
        )
    );
    if entity.feature_count() > 0 {
        println!(
            "{}",
            style.message_detail("Features", &entity.feature_count().to_string())
        );
    }
    Ok(())
}

fn handle_entity_show(
    style: &Style,
    engine: &LitEngine,
    id: &str,
    json: bool,
) -> Result<(), LitError> {
    let entity = engine
        .store()
        .get_entity(id)
        .ok_or_else(|| LitError::NotFound(format!("entity `{}`", id)))?;
    let relationships = engine.store().get_relationships(Some(id), None, None);
    let scores = engine.store().get_benchmark_scores(Some(id), None, None);

    if json {
        return print_json(&serde_json::json!({
            "entity": entity.to_record(),
            "relationships": relationships,
            "benchmark_scores": scores,
        }));
    }

    println!("{}", style.section(&entity.name));
    println!();
    println!("  {}", style.key_value("ID", &style.id(entity.id())));
    println!("  {}", style.key_value("Type", entity.entity_type.as_str()));
    println!(
        "  {}",
        style.key_value("Created", &format::format_timestamp(entity.created_at()))
    );

    if !entity.features.is_empty() {
        println!();
        println!("{}", style.section("FEATURES"));
        for (key, value) in &entity.features {
            println!("  {}", style.key_value(key, &format::format_value(value)));
        }
    }

    if !entity.metadata.is_empty() {
        println!();
        println!("{}", style.section("METADATA"));
        for (key, value) in &entity.metadata {
            println!("  {}", style.key_value(key, &format::format_value(value)));
        }
    }

    if !relationships.is_empty() {
        println!();
        println!("{}", style.section("RELATIONS"));
        print_table(&table::render_relationships_table(&relationships));
    }

    if !scores.is_empty() {
        println!();
        println!("{}", style.section("SCORES"));
        print_table(&table::render_scores_table(&scores));
    }
    Ok(())
}

fn handle_entity_list(
    style: &Style,
    engine: &LitEngine,
    entity_type: Option<&str>,
    json: bool,
) -> Result<(), LitError> {
    let entities = engine.store().list_entities(parse_entity_type(entity_type)?);
    print_entities(style, &entities, json, "No entities found.")
}

fn handle_entity_rm(style: &Style, engine: &LitEngine, id: &str) -> Result<(), LitError> {
    if !engine.store().delete_entity(id)? {
        return Err(LitError::NotFound(format!("entity `{}`", id)));
    }
    println!(
        "{}",
        style.message(MessageType::Ok, &format!("Removed entity {}", style.id(id)))
    );
    Ok(())
}

fn handle_search(
    style: &Style,
    engine: &LitEngine,
    query: &str,
    entity_type: Option<&str>,
    json: bool,
) -> Result<(), LitError> {
    let hits = engine
        .store()
        .search_entities(query, parse_entity_type(entity_type)?);
    print_entities(
        style,
        &hits,
        json,
        &format!("No entities match '{}'.", query),
    )
}

fn print_entities(
    style: &Style,
    entities: &[Entity],
    json: bool,
    empty_message: &str,
) -> Result<(), LitError> {
    if json {
        let records: Vec<Value> = entities.iter().map(Entity::to_record).collect();
        return print_json(&records);
    }

    if entities.is_empty() {
        println!("{}", style.message(MessageType::Info, empty_message));
    } else {
        print_table(&table::render_entities_table(entities, name_width()));
    }
    Ok(())
}

// ============================================================================
// Relationship and score handlers
// ============================================================================

fn handle_relate(
    style: &Style,
    engine: &LitEngine,
    source: &str,
    relation: &str,
    target: &str,
    confidence: f64,
    properties: &[String],
) -> Result<(), LitError> {
    if !confidence.is_finite() {
        return Err(LitError::InvalidArgument(format!(
            "Confidence must be a finite number, got {}",
            confidence
        )));
    }
    let relation_type: RelationType = relation.to_lowercase().parse()?;

    for id in [source, target] {
        if engine.store().get_entity(id).is_none() {
            println!(
                "{}",
                style.message(
                    MessageType::Warn,
                    &format!("Entity {} does not exist yet", style.id(id))
                )
            );
        }
    }

    let relationship = EntityRelationship::new(source, target, relation_type)
        .with_confidence(confidence)
        .with_properties(parse_attributes(properties)?);
    engine.store().save_relationship(&relationship)?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Recorded {} {} {}",
                style.id(source),
                relation_type,
                style.id(target)
            )
        )
    );
    Ok(())
}

fn handle_relations(
    style: &Style,
    engine: &LitEngine,
    source: Option<&str>,
    target: Option<&str>,
    relation_type: Option<&str>,
    json: bool,
) -> Result<(), LitError> {
    let relationships =
        engine
            .store()
            .get_relationships(source, target, parse_relation_type(relation_type)?);

    if json {
        return print_json(&relationships);
    }

    if relationships.is_empty() {
        println!("{}", style.message(MessageType::Info, "No relationships found."));
    } else {
        print_table(&table::render_relationships_table(&relationships));
    }
    Ok(())
}

fn handle_score(
    style: &Style,
    engine: &LitEngine,
    method: &str,
    benchmark: &str,
    metric: &str,
    score: f64,
    metadata: &[String],
) -> Result<(), LitError> {
    if !score.is_finite() {
        return Err(LitError::InvalidArgument(format!(
            "Score must be a finite number, got {}",
            score
        )));
    }
    if engine.store().get_entity(method).is_none() {
        println!(
            "{}",
            style.message(
                MessageType::Warn,
                &format!(
                    "Method {} does not exist; the score will not show in rankings until it does",
                    style.id(method)
                )
            )
        );
    }

    let record = BenchmarkScore::new(method, benchmark, metric, score)
        .with_metadata(parse_attributes(metadata)?);
    engine.store().save_benchmark_score(&record)?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Recorded {} {} = {} for {}",
                benchmark,
                metric,
                style.score(score),
                style.id(method)
            )
        )
    );
    Ok(())
}

fn handle_scores(
    style: &Style,
    engine: &LitEngine,
    method: Option<&str>,
    benchmark: Option<&str>,
    metric: Option<&str>,
    json: bool,
) -> Result<(), LitError> {
    let scores = engine
        .store()
        .get_benchmark_scores(method, benchmark, metric);

    if json {
        return print_json(&scores);
    }

    if scores.is_empty() {
        println!("{}", style.message(MessageType::Info, "No benchmark scores found."));
    } else {
        print_table(&table::render_scores_table(&scores));
    }
    Ok(())
}

// ============================================================================
// Ranking and comparison handlers
// ============================================================================

fn handle_top(
    style: &Style,
    engine: &LitEngine,
    benchmark: &str,
    metric: &str,
    limit: Option<usize>,
    lower: bool,
    json: bool,
) -> Result<(), LitError> {
    let (limit, higher_is_better) = ranking_args(engine, limit, lower);
    let performers = engine
        .store()
        .get_top_performers(benchmark, metric, limit, higher_is_better);

    if json {
        return print_json(&performers);
    }

    if performers.is_empty() {
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("No scores for {} on {}.", metric, benchmark)
            )
        );
        return Ok(());
    }

    let rows: Vec<RankingRow> = performers
        .iter()
        .enumerate()
        .map(|(idx, p)| performer_row(idx + 1, p))
        .collect();
    println!(
        "{}",
        style.section(&format!("TOP {} · {}", benchmark, metric))
    );
    println!();
    print_table(&table::render_rankings_table(&rows, name_width()));
    Ok(())
}

fn performer_row(rank: usize, performer: &TopPerformer) -> RankingRow {
    RankingRow {
        rank,
        entity_id: performer.method.id().to_string(),
        name: performer.method.name.clone(),
        score: Some(performer.score),
        metric: Some(performer.metric.clone()),
        metadata: Some(performer.metadata.clone()),
        feature_count: None,
        entity_type: None,
    }
}

fn handle_compare(
    style: &Style,
    engine: &LitEngine,
    action: CompareAction,
) -> Result<(), LitError> {
    match action {
        CompareAction::Benchmark {
            benchmark,
            metric,
            limit,
            lower,
            json,
        } => {
            let (limit, higher_is_better) = ranking_args(engine, limit, lower);
            let result = engine.top(&benchmark, &metric, Some(limit), Some(higher_is_better));
            print_comparison(style, &result, json)
        }
        CompareAction::Features {
            ids,
            features,
            json,
        } => {
            let selected = (!features.is_empty()).then_some(features.as_slice());
            let result = engine
                .comparison()
                .compare_entities_by_features(&ids, selected);
            print_comparison(style, &result, json)
        }
        CompareAction::Methods {
            names,
            report,
            json,
        } => {
            let comparison = engine.compare_methods(&names).ok_or_else(|| {
                LitError::NotFound(format!("no entity matches any of: {}", names.join(", ")))
            })?;

            if let Some(path) = &report {
                write_report(path, &comparison.to_markdown())?;
                if !json {
                    print_report_written(style, path);
                }
            }

            if json {
                return print_json(&comparison);
            }
            if report.is_none() {
                println!("{}", comparison.summary.trim_end());
                println!();
                print_table(&table::render_feature_matrix(
                    &comparison.feature_matrix,
                    name_width(),
                ));
            }
            Ok(())
        }
    }
}

fn handle_best(
    style: &Style,
    engine: &LitEngine,
    query: &str,
    benchmark: Option<&str>,
    metric: Option<&str>,
    constraints: &[String],
    json: bool,
) -> Result<(), LitError> {
    let constraints = parse_attributes(constraints)?;
    if !constraints.is_empty() {
        tracing::debug!("Ignoring {} constraint(s)", constraints.len());
    }
    let result = engine.comparison().find_best_solution(
        query,
        benchmark,
        metric,
        Some(&constraints),
    );
    print_comparison(style, &result, json)
}

fn handle_sota(
    style: &Style,
    engine: &LitEngine,
    domain: &str,
    benchmark: Option<&str>,
    metric: Option<&str>,
    report: Option<&Path>,
    json: bool,
) -> Result<(), LitError> {
    let sota = engine.find_sota(domain, benchmark, metric);

    if let Some(path) = report {
        write_report(path, &sota.to_markdown())?;
        if !json {
            print_report_written(style, path);
            println!(
                "{}",
                style.message_detail("Methods", &sota.num_methods.to_string())
            );
        }
    }

    if json {
        return print_json(&sota);
    }
    if report.is_some() {
        return Ok(());
    }

    println!(
        "{}",
        style.section(&format!("STATE OF THE ART · {}", domain))
    );
    println!();
    println!("{}", sota.summary.trim_end());
    if !sota.rankings.is_empty() {
        println!();
        print_table(&table::render_rankings_table(&sota.rankings, name_width()));
    }
    let matrix = table::render_feature_matrix(&sota.feature_matrix, name_width());
    if !matrix.is_empty() {
        println!();
        println!("{}", style.section("FEATURES"));
        print_table(&matrix);
    }
    Ok(())
}

fn print_report_written(style: &Style, path: &Path) {
    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!("Wrote report to {}", path.display())
        )
    );
}

/// Human or JSON rendering of a comparison result.
fn print_comparison(style: &Style, result: &ComparisonResult, json: bool) -> Result<(), LitError> {
    if json {
        return print_json(result);
    }

    if result.is_empty() {
        println!("{}", style.message(MessageType::Info, result.summary.trim_end()));
        return Ok(());
    }

    println!("{}", result.summary.trim_end());
    if !result.rankings.is_empty() {
        println!();
        print_table(&table::render_rankings_table(&result.rankings, name_width()));
    }
    let matrix = table::render_feature_matrix(&result.feature_matrix, name_width());
    if !matrix.is_empty() {
        println!();
        println!("{}", style.section("FEATURES"));
        print_table(&matrix);
    }
    Ok(())
}

// ============================================================================
// Import and stats handlers
// ============================================================================

fn handle_import(
    style: &Style,
    engine: &LitEngine,
    file: &Path,
    quiet: bool,
    json: bool,
) -> Result<(), LitError> {
    let bundle = ExtractionBundle::from_file(file)?;

    if bundle.is_empty() {
        if json {
            return print_json(&litrank_core::IngestSummary::default());
        }
        println!(
            "{}",
            style.message(
                MessageType::Skip,
                &format!("{} contains no records", file.display())
            )
        );
        return Ok(());
    }

    let mode = ProgressMode::detect(quiet, json);
    let progress = Progress::bar(bundle.len() as u64, "Importing records", mode);
    let summary = match ingest_bundle(engine.store(), &bundle, || progress.inc(1)) {
        Ok(summary) => summary,
        Err(e) => {
            progress.finish_clear();
            return Err(e);
        }
    };

    if json {
        progress.finish_clear();
        return print_json(&summary);
    }

    progress.finish_with_message(&style.message(MessageType::Ok, &summary.to_string()));
    tracing::debug!(
        "Imported {} in {:.2?}",
        file.display(),
        progress.elapsed()
    );
    Ok(())
}

fn handle_stats(style: &Style, engine: &LitEngine, json: bool) -> Result<(), LitError> {
    let stats = engine.store().stats();

    if json {
        return print_json(&stats);
    }

    println!("{}", style.section("STATS"));
    println!();
    println!(
        "  {}",
        style.key_value("Data dir", &engine.data_dir().display().to_string())
    );
    println!();

    let mut metrics = vec![(
        "Entities".to_string(),
        format::format_thousands(stats.entities as u64),
    )];
    for (entity_type, count) in &stats.entities_by_type {
        metrics.push((
            format!("  {}", entity_type),
            format::format_thousands(*count as u64),
        ));
    }
    metrics.push((
        "Relationships".to_string(),
        format::format_thousands(stats.relationships as u64),
    ));
    metrics.push((
        "Benchmark scores".to_string(),
        format::format_thousands(stats.benchmark_scores as u64),
    ));

    print_table(&table::render_metrics_table(&metrics));
    Ok(())
}

// ============================================================================
// Config command handlers
// ============================================================================

fn handle_config(style: &Style, cli: &Cli, action: &ConfigAction) -> Result<(), LitError> {
    match action {
        ConfigAction::Check { json } => handle_config_check(style, cli.config.as_deref(), *json),
        ConfigAction::Show { json } => handle_config_show(style, cli, *json),
    }
}

/// Validate the configuration file and report errors/warnings.
fn handle_config_check(style: &Style, path: Option<&Path>, json: bool) -> Result<(), LitError> {
    let check = ConfigCheck::run(path);

    if json {
        print_json(&check)?;
    } else {
        let location = check
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no home directory)".to_string());

        if check.exists {
            println!(
                "{}",
                style.message(MessageType::Info, &format!("Checked {}", location))
            );
        } else {
            println!(
                "{}",
                style.message(
                    MessageType::Skip,
                    &format!("No config file at {}; using defaults", location)
                )
            );
        }

        if !check.warnings.is_empty() {
            println!(
                "{}",
                style.message(
                    MessageType::Warn,
                    &format!("{} warning(s):", check.warnings.len())
                )
            );
            for warning in &check.warnings {
                println!("{}", style.list_item(warning));
            }
        }

        if !check.errors.is_empty() {
            println!(
                "{}",
                style.message(MessageType::Err, &format!("{} error(s):", check.errors.len()))
            );
            for error in &check.errors {
                println!("{}", style.list_item(error));
            }
        }

        if check.is_valid() && check.warnings.is_empty() {
            println!("{}", style.message(MessageType::Ok, "Configuration is valid"));
        } else if check.is_valid() {
            println!(
                "{}",
                style.message(MessageType::Ok, "Configuration is valid with warnings")
            );
        }
    }

    if !check.is_valid() {
        return Err(LitError::InvalidConfiguration {
            message: format!("{} configuration error(s) found", check.errors.len()),
            hint: "Fix the file and run `litrank config check` again".to_string(),
        });
    }

    Ok(())
}

/// Resolved configuration for `litrank config show`.
#[derive(Serialize)]
struct ResolvedConfig<'a> {
    path: Option<PathBuf>,
    data_dir: PathBuf,
    config: &'a GlobalConfig,
}

/// Show resolved configuration and the data directory it leads to.
fn handle_config_show(style: &Style, cli: &Cli, json: bool) -> Result<(), LitError> {
    let (path, config) = match &cli.config {
        Some(path) => (Some(path.clone()), GlobalConfig::from_path(path)?),
        None => (GlobalConfig::default_path(), GlobalConfig::load_default()?),
    };
    let resolved = ResolvedConfig {
        path,
        data_dir: config.resolve_data_dir(cli.data_dir.as_deref())?,
        config: &config,
    };

    if json {
        return print_json(&resolved);
    }

    println!("{}", style.message(MessageType::Info, "Resolved configuration:"));
    println!();
    if let Some(path) = &resolved.path {
        println!("  {}", style.key_value("Config file", &path.display().to_string()));
    }
    println!(
        "  {}",
        style.key_value("Data dir", &resolved.data_dir.display().to_string())
    );
    println!();
    print!("{}", config.to_yaml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_attributes_json_and_strings() {
        let attrs = parse_attributes(&[
            "year=2020".to_string(),
            "task=dense retrieval".to_string(),
            "open=true".to_string(),
            "tags=[\"a\",\"b\"]".to_string(),
            "note=a=b".to_string(),
        ])
        .unwrap();

        assert_eq!(attrs["year"], json!(2020));
        assert_eq!(attrs["task"], json!("dense retrieval"));
        assert_eq!(attrs["open"], json!(true));
        assert_eq!(attrs["tags"], json!(["a", "b"]));
        assert_eq!(attrs["note"], json!("a=b"));
    }

    #[test]
    fn test_parse_attributes_rejects_bad_pairs() {
        assert!(matches!(
            parse_attributes(&["novalue".to_string()]),
            Err(LitError::InvalidArgument(_))
        ));
        assert!(matches!(
            parse_attributes(&["=x".to_string()]),
            Err(LitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_type_parsing_is_case_insensitive() {
        assert_eq!(
            parse_entity_type(Some("Benchmark")).unwrap(),
            Some(EntityType::Benchmark)
        );
        assert_eq!(
            parse_relation_type(Some("BASED_ON")).unwrap(),
            Some(RelationType::BasedOn)
        );
        assert_eq!(parse_entity_type(None).unwrap(), None);
        assert!(matches!(
            parse_entity_type(Some("widget")),
            Err(LitError::Validation { .. })
        ));
    }
}
