//! Common constants used throughout litrank-core.
//!
//! This module centralizes directory names, file names, and ranking defaults
//! to avoid duplication and ensure consistency across the codebase.

// ============================================================================
// Directory Names
// ============================================================================

/// The name of the global litrank configuration directory.
///
/// Located at `~/.litrank/` on Unix-like systems.
pub const LITRANK_HOME_DIR: &str = ".litrank";

/// The global configuration filename inside [`LITRANK_HOME_DIR`].
pub const GLOBAL_CONFIG_FILENAME: &str = "config.yaml";

/// Default data directory name inside [`LITRANK_HOME_DIR`].
pub const DEFAULT_DATA_DIR_NAME: &str = "data";

/// Subdirectory holding entity records.
pub const ENTITIES_DIR: &str = "entities";

/// Subdirectory holding relationship records.
pub const RELATIONSHIPS_DIR: &str = "relationships";

/// Subdirectory holding benchmark score records.
pub const BENCHMARKS_DIR: &str = "benchmarks";

// ============================================================================
// Comparison Defaults
// ============================================================================

/// Placeholder written into a feature matrix when an entity lacks a feature.
pub const MISSING_VALUE: &str = "N/A";

/// Name of the synthetic first row of every feature matrix.
pub const ENTITY_NAME_ROW: &str = "entity_name";

/// Default number of results for ranking queries.
pub const DEFAULT_RANKING_LIMIT: usize = 10;

/// Maximum number of solutions returned by `find_best_solution`.
pub const SOLUTION_LIMIT: usize = 10;

/// Ranked rows listed in benchmark and solution summaries.
pub const SUMMARY_ROWS: usize = 5;

/// Entities listed in feature comparison summaries.
pub const FEATURE_SUMMARY_ROWS: usize = 3;
