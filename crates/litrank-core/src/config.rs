//! Configuration types for litrank.
//!
//! [`GlobalConfig`] is the user-level configuration stored in
//! `~/.litrank/config.yaml`. Every field is optional; a missing file means
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_DATA_DIR_NAME, DEFAULT_RANKING_LIMIT, GLOBAL_CONFIG_FILENAME, LITRANK_HOME_DIR,
};
use crate::errors::LitError;

/// Ranking limits above this trigger a warning.
const LARGE_RANKING_LIMIT: usize = 1000;

// ============================================================================
// GlobalConfig
// ============================================================================

/// Global (user-level) configuration.
///
/// # Example YAML
///
/// ```yaml
/// data_dir: /home/me/research/litrank
/// ranking:
///   default_limit: 20
///   higher_is_better: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Where entity, relationship and score records live.
    /// Defaults to `~/.litrank/data`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Ranking query defaults.
    #[serde(default)]
    pub ranking: RankingConfig,
}

impl GlobalConfig {
    /// Load from `~/.litrank/config.yaml`, or defaults if there is none.
    ///
    /// # Errors
    ///
    /// Returns [`LitError::InvalidGlobalConfig`] if the file exists but cannot be parsed.
    pub fn load_default() -> Result<Self, LitError> {
        match Self::default_path() {
            Some(path) => Self::from_path(&path),
            None => {
                tracing::debug!("Could not determine home directory, using default config");
                Ok(Self::default())
            }
        }
    }

    /// Load from a specific path. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LitError::InvalidGlobalConfig`] if the file cannot be read or parsed,
    /// and [`LitError::InvalidConfiguration`] if validation fails.
    pub fn from_path(path: &Path) -> Result<Self, LitError> {
        if !path.exists() {
            tracing::debug!(
                "Global config not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            LitError::InvalidGlobalConfig(format!("Failed to read {}: {}", path.display(), e))
        })?;

        // An empty file parses as YAML null.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            LitError::InvalidGlobalConfig(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        for warning in config.validate()? {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok(config)
    }

    /// The global config directory (`~/.litrank`).
    pub fn default_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(LITRANK_HOME_DIR))
    }

    /// The global config file (`~/.litrank/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        Self::default_dir().map(|d| d.join(GLOBAL_CONFIG_FILENAME))
    }

    /// Validate the configuration, returning non-fatal warnings.
    pub fn validate(&self) -> Result<Vec<String>, LitError> {
        self.ranking.validate()
    }

    /// Resolve the data directory.
    ///
    /// Precedence: `override_dir` (CLI flag or env), then `data_dir`, then
    /// `~/.litrank/data`.
    pub fn resolve_data_dir(&self, override_dir: Option<&Path>) -> Result<PathBuf, LitError> {
        if let Some(dir) = override_dir {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        Self::default_dir()
            .map(|d| d.join(DEFAULT_DATA_DIR_NAME))
            .ok_or(LitError::NoDataDir)
    }

    /// Render as YAML.
    pub fn to_yaml(&self) -> Result<String, LitError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

// ============================================================================
// ConfigCheck
// ============================================================================

/// Result of checking a configuration file without failing on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConfigCheck {
    /// The file that was checked, if a path could be determined.
    pub path: Option<PathBuf>,
    pub exists: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigCheck {
    /// Check `path`, or `~/.litrank/config.yaml` when `None`.
    pub fn run(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(GlobalConfig::default_path);
        let mut check = Self {
            exists: path.as_deref().is_some_and(Path::exists),
            path,
            ..Self::default()
        };

        let Some(path) = check.path.clone().filter(|_| check.exists) else {
            return check;
        };

        match GlobalConfig::from_path(&path) {
            Ok(config) => match config.validate() {
                Ok(warnings) => check.warnings = warnings,
                Err(e) => check.errors.push(e.to_string()),
            },
            Err(e) => check.errors.push(e.to_string()),
        }
        check
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

// ============================================================================
// RankingConfig
// ============================================================================

/// Defaults for ranking queries (`top`, `compare benchmark`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Number of results when no `--limit` is given.
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Whether higher scores rank first.
    #[serde(default = "default_higher_is_better")]
    pub higher_is_better: bool,
}

fn default_limit() -> usize {
    DEFAULT_RANKING_LIMIT
}

fn default_higher_is_better() -> bool {
    true
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            higher_is_better: default_higher_is_better(),
        }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<Vec<String>, LitError> {
        let mut warnings = Vec::new();

        if self.default_limit == 0 {
            return Err(LitError::InvalidConfiguration {
                message: "ranking.default_limit cannot be 0".to_string(),
                hint: "Set default_limit to at least 1 (default: 10)".to_string(),
            });
        }

        if self.default_limit > LARGE_RANKING_LIMIT {
            warnings.push(format!(
                "ranking.default_limit={} is very large; rankings will be slow to read",
                self.default_limit
            ));
        }

        Ok(warnings)
    }
}
