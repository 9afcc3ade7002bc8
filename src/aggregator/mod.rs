//! Ranking and aggregation over the review dataset.
//!
//! This module turns raw review records into:
//! - Top drug/condition pairs per disease class
//! - Condition-search recommendations
//! - Outlier reports (high score / few reviews, low score / many reviews)
//! - Dataset summary statistics

pub mod metrics;
pub mod pipeline;
pub mod queries;

// Re-export main types and functions
pub use metrics::{summarize, DatasetSummary};
pub use pipeline::{run_pipeline, Admission, Grouping, Plan, RankedRow, Sample, SortKey};
pub use queries::{
    find_high_performance_low_reviews, find_low_performance_high_reviews, rank_by_disease_class,
    recommend_by_condition, HighPerformanceQuery, LowPerformanceQuery, RankQuery, RecommendQuery,
};
