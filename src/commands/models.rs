use crate::aggregator::{HighPerformanceQuery, LowPerformanceQuery, RankQuery, RecommendQuery};
use crate::chart::BarChartConfig;
use crate::parser::schema::PerformanceField;
use crate::utils::config::{DashboardConfig, DEFAULT_TOP_K};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Arguments for the dashboard command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct DashboardArgs {
    /// Review dataset CSV
    pub data_path: PathBuf,

    /// Disease class for the top-drugs section
    pub disease_class: String,

    /// Minimum reviews a record needs to be ranked
    pub min_reviews: u64,

    /// Performance column used for ranking and recommendations
    pub field: PerformanceField,

    /// Free-text condition search; the recommendation section is skipped when None
    pub condition_search: Option<String>,

    /// Drug types eligible for recommendation
    pub allowed_types: BTreeSet<String>,

    /// Number of recommendations to show
    pub recommend_limit: usize,

    pub high_performance: HighPerformanceQuery,
    pub low_performance: LowPerformanceQuery,

    /// Output path for JSON report (optional)
    pub output_json: Option<PathBuf>,

    /// Output path for SVG chart of the top drugs (optional)
    pub output_svg: Option<PathBuf>,

    pub chart_config: BarChartConfig,

    /// Print tables and text charts to stdout
    pub print_tables: bool,
}

impl Default for DashboardArgs {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/drugs.csv"),
            disease_class: String::new(),
            min_reviews: 0,
            field: PerformanceField::Unweighted,
            condition_search: None,
            allowed_types: BTreeSet::new(),
            recommend_limit: DEFAULT_TOP_K,
            high_performance: HighPerformanceQuery::default(),
            low_performance: LowPerformanceQuery::default(),
            output_json: None,
            output_svg: None,
            chart_config: BarChartConfig::default(),
            print_tables: true,
        }
    }
}

impl DashboardArgs {
    /// Start from config file values; CLI flags are applied on top by the caller
    pub fn from_config(config: &DashboardConfig) -> Self {
        let mut chart_config = BarChartConfig::new().with_width(config.chart.width);
        if let Some(title) = &config.chart.title {
            chart_config = chart_config.with_title(title.clone());
        }

        Self {
            min_reviews: config.ranking.min_reviews,
            field: PerformanceField::from_weighted_flag(config.ranking.weighted),
            allowed_types: config.recommend.allowed_types.clone(),
            recommend_limit: config.recommend.limit,
            high_performance: HighPerformanceQuery {
                performance_threshold: config.outliers.high_performance_threshold,
                max_reviews: config.outliers.high_performance_max_reviews,
            },
            low_performance: LowPerformanceQuery {
                performance_threshold: config.outliers.low_performance_threshold,
                min_reviews: config.outliers.low_performance_min_reviews,
            },
            chart_config,
            ..Default::default()
        }
    }

    pub fn rank_query(&self) -> RankQuery {
        RankQuery {
            disease_class: self.disease_class.clone(),
            min_reviews: self.min_reviews,
            field: self.field,
        }
    }

    /// None when no condition search was requested
    pub fn recommend_query(&self) -> Option<RecommendQuery> {
        self.condition_search.as_ref().map(|search| RecommendQuery {
            condition_substring: search.clone(),
            allowed_types: self.allowed_types.clone(),
            field: self.field,
            limit: self.recommend_limit,
        })
    }
}

/// Which sections a single-section command prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    All,
    TopDrugs,
    Recommendations,
    Outliers,
}

impl Section {
    pub fn includes(self, other: Section) -> bool {
        self == Section::All || self == other
    }
}
