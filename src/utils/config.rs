//! Configuration and constants for the CLI.
//!
//! Defaults live here as constants. An optional TOML file can override
//! them per section; CLI flags override the file.

use super::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Current report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Rows kept by every ranked section unless overridden
pub const DEFAULT_TOP_K: usize = 10;

/// Upper bound accepted for any row limit
pub const MAX_TOP_K: usize = 1000;

// Outlier defaults
pub const DEFAULT_HIGH_PERFORMANCE_THRESHOLD: f64 = 4.5;
pub const DEFAULT_HIGH_PERFORMANCE_MAX_REVIEWS: u64 = 5;
pub const DEFAULT_LOW_PERFORMANCE_THRESHOLD: f64 = 2.0;
pub const DEFAULT_LOW_PERFORMANCE_MIN_REVIEWS: u64 = 5000;

/// Default width of the SVG bar chart in pixels
pub const DEFAULT_CHART_WIDTH: usize = 900;

/// Width of the `#` bars in text charts
pub const TEXT_CHART_WIDTH: usize = 40;

// Column names accepted in the dataset header
pub const COLUMN_DRUG: &str = "drug";
pub const COLUMN_CONDITION: &str = "condition";
pub const COLUMN_DISEASE_CLASS: &str = "disease_class";
pub const COLUMN_TYPE: &str = "type";
pub const COLUMN_PERFORMANCE: &str = "performance";
pub const COLUMN_WEIGHTED_PERFORMANCE: &str = "weighted_performance";
pub const COLUMN_REVIEWS: &str = "reviews";

/// Dashboard configuration, usually read from `drug-eval.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub recommend: RecommendConfig,

    #[serde(default)]
    pub outliers: OutlierConfig,

    #[serde(default)]
    pub chart: ChartSettings,
}

/// Defaults for the top-drugs section
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RankingConfig {
    /// Minimum reviews a record needs to be ranked
    #[serde(default)]
    pub min_reviews: u64,

    /// Rank on `weighted_performance` instead of `performance`
    #[serde(default)]
    pub weighted: bool,
}

/// Defaults for the recommendation section
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RecommendConfig {
    /// Drug types offered when none are given on the command line
    #[serde(default)]
    pub allowed_types: BTreeSet<String>,

    #[serde(default = "default_top_k")]
    pub limit: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            allowed_types: BTreeSet::new(),
            limit: DEFAULT_TOP_K,
        }
    }
}

/// Outlier thresholds
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutlierConfig {
    #[serde(default = "default_high_threshold")]
    pub high_performance_threshold: f64,

    #[serde(default = "default_high_max_reviews")]
    pub high_performance_max_reviews: u64,

    #[serde(default = "default_low_threshold")]
    pub low_performance_threshold: f64,

    #[serde(default = "default_low_min_reviews")]
    pub low_performance_min_reviews: u64,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            high_performance_threshold: DEFAULT_HIGH_PERFORMANCE_THRESHOLD,
            high_performance_max_reviews: DEFAULT_HIGH_PERFORMANCE_MAX_REVIEWS,
            low_performance_threshold: DEFAULT_LOW_PERFORMANCE_THRESHOLD,
            low_performance_min_reviews: DEFAULT_LOW_PERFORMANCE_MIN_REVIEWS,
        }
    }
}

/// Chart rendering settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartSettings {
    #[serde(default = "default_chart_width")]
    pub width: usize,

    #[serde(default)]
    pub title: Option<String>,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
            title: None,
        }
    }
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_high_threshold() -> f64 {
    DEFAULT_HIGH_PERFORMANCE_THRESHOLD
}

fn default_high_max_reviews() -> u64 {
    DEFAULT_HIGH_PERFORMANCE_MAX_REVIEWS
}

fn default_low_threshold() -> f64 {
    DEFAULT_LOW_PERFORMANCE_THRESHOLD
}

fn default_low_min_reviews() -> u64 {
    DEFAULT_LOW_PERFORMANCE_MIN_REVIEWS
}

fn default_chart_width() -> usize {
    DEFAULT_CHART_WIDTH
}

/// Load dashboard config from a TOML file
///
/// # Errors
/// * `ConfigError::Io` - If file cannot be read
/// * `ConfigError::Parse` - If TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
///
/// # Example
/// ```ignore
/// let config = load_config("drug-eval.toml")?;
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<DashboardConfig, ConfigError> {
    let path = path.as_ref();
    debug!("Loading config from: {}", path.display());

    let contents = fs::read_to_string(path)?;
    let config: DashboardConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl DashboardConfig {
    /// Reject values the engine cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.recommend.limit == 0 || self.recommend.limit > MAX_TOP_K {
            return Err(ConfigError::Invalid(format!(
                "recommend.limit must be between 1 and {}",
                MAX_TOP_K
            )));
        }

        let thresholds = [
            self.outliers.high_performance_threshold,
            self.outliers.low_performance_threshold,
        ];
        if thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ConfigError::Invalid(
                "outlier thresholds must be finite numbers".to_string(),
            ));
        }

        if self.chart.width < 200 {
            return Err(ConfigError::Invalid(
                "chart.width must be at least 200 pixels".to_string(),
            ));
        }

        Ok(())
    }
}
