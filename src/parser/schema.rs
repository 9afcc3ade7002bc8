//! Record types and the JSON report schema.
//!
//! `ReviewRecord` is the typed row produced by the loader. The result row
//! and `Report` types define the structure of JSON files we write to disk.
//! Schema is versioned to allow future evolution.

use crate::utils::config::{
    COLUMN_CONDITION, COLUMN_DISEASE_CLASS, COLUMN_DRUG, COLUMN_PERFORMANCE, COLUMN_REVIEWS,
    COLUMN_TYPE, COLUMN_WEIGHTED_PERFORMANCE,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One row of the review dataset
///
/// Every field except `drug` may be missing. A numeric field that could not
/// be parsed is stored as `None` as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub drug: String,
    pub condition: Option<String>,
    pub disease_class: Option<String>,
    #[serde(rename = "type")]
    pub drug_type: Option<String>,
    pub performance: Option<f64>,
    pub weighted_performance: Option<f64>,
    pub reviews: Option<u64>,
}

impl ReviewRecord {
    /// Value of the selected performance column
    pub fn score(&self, field: PerformanceField) -> Option<f64> {
        match field {
            PerformanceField::Unweighted => self.performance,
            PerformanceField::Weighted => self.weighted_performance,
        }
    }
}

/// Known dataset columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Drug,
    Condition,
    DiseaseClass,
    Type,
    Performance,
    WeightedPerformance,
    Reviews,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Drug,
        Column::Condition,
        Column::DiseaseClass,
        Column::Type,
        Column::Performance,
        Column::WeightedPerformance,
        Column::Reviews,
    ];

    /// Header name as it appears in the CSV
    pub fn name(self) -> &'static str {
        match self {
            Column::Drug => COLUMN_DRUG,
            Column::Condition => COLUMN_CONDITION,
            Column::DiseaseClass => COLUMN_DISEASE_CLASS,
            Column::Type => COLUMN_TYPE,
            Column::Performance => COLUMN_PERFORMANCE,
            Column::WeightedPerformance => COLUMN_WEIGHTED_PERFORMANCE,
            Column::Reviews => COLUMN_REVIEWS,
        }
    }

    /// Match a header cell, ignoring case and surrounding whitespace
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|column| column.name().eq_ignore_ascii_case(header))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which performance column a ranking uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceField {
    #[default]
    Unweighted,
    Weighted,
}

impl PerformanceField {
    pub fn from_weighted_flag(weighted: bool) -> Self {
        if weighted {
            Self::Weighted
        } else {
            Self::Unweighted
        }
    }

    pub fn column(self) -> Column {
        match self {
            Self::Unweighted => Column::Performance,
            Self::Weighted => Column::WeightedPerformance,
        }
    }
}

/// Aggregated group produced by the ranking operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub drug: String,

    /// Present when the grouping key includes the condition
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub condition: Option<String>,

    /// Mean of the selected performance column
    pub avg_performance: f64,

    /// Sum of reviews across the group
    pub reviews: u64,

    /// Number of records in the group
    pub records: usize,
}

/// Non-aggregated record projection used by the outlier reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    pub drug: String,
    pub condition: Option<String>,
    pub performance: f64,
    pub reviews: u64,
}

/// Rows returned by one engine operation plus bookkeeping counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult<T> {
    pub rows: Vec<T>,

    /// Records that passed the filter
    pub matched: usize,

    /// Records skipped because a needed numeric value was malformed
    pub excluded: usize,
}

impl<T> QueryResult<T> {
    pub fn empty() -> Self {
        Self {
            rows: Vec::new(),
            matched: 0,
            excluded: 0,
        }
    }

    /// Nothing passed the filter
    pub fn is_no_match(&self) -> bool {
        self.matched == 0
    }
}

/// Top-level report structure written to JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Schema version for compatibility checking
    pub version: String,

    /// CSV file the report was computed from
    pub dataset_path: String,

    /// Parameters the sections were computed with
    pub parameters: ReportParameters,

    /// Dataset-level statistics
    pub summary: crate::aggregator::DatasetSummary,

    pub sections: ReportSections,

    /// Timestamp when report was generated
    pub generated_at: String,
}

/// Query parameters echoed into the report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportParameters {
    pub disease_class: String,
    pub min_reviews: u64,
    pub performance_field: PerformanceField,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub condition_search: Option<String>,

    #[serde(default)]
    pub allowed_types: BTreeSet<String>,

    pub high_performance_threshold: f64,
    pub high_performance_max_reviews: u64,
    pub low_performance_threshold: f64,
    pub low_performance_min_reviews: u64,
}

/// Dashboard sections; a section is None when it was not requested
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSections {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub top_drugs: Option<QueryResult<AggregateRow>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub recommendations: Option<QueryResult<AggregateRow>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub high_performance_low_reviews: Option<QueryResult<RawRow>>,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub low_performance_high_reviews: Option<QueryResult<RawRow>>,
}

impl ReportSections {
    /// Number of sections that were computed
    pub fn count(&self) -> usize {
        [
            self.top_drugs.is_some(),
            self.recommendations.is_some(),
            self.high_performance_low_reviews.is_some(),
            self.low_performance_high_reviews.is_some(),
        ]
        .iter()
        .filter(|present| **present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_from_header() {
        assert_eq!(Column::from_header(" Drug "), Some(Column::Drug));
        assert_eq!(
            Column::from_header("WEIGHTED_PERFORMANCE"),
            Some(Column::WeightedPerformance)
        );
        assert_eq!(Column::from_header("rating"), None);
    }

    #[test]
    fn test_record_score_selects_field() {
        let record = ReviewRecord {
            drug: "A".to_string(),
            condition: None,
            disease_class: None,
            drug_type: None,
            performance: Some(3.0),
            weighted_performance: Some(4.0),
            reviews: Some(1),
        };

        assert_eq!(record.score(PerformanceField::Unweighted), Some(3.0));
        assert_eq!(record.score(PerformanceField::Weighted), Some(4.0));
    }

    #[test]
    fn test_query_result_no_match() {
        let result: QueryResult<RawRow> = QueryResult::empty();
        assert!(result.is_no_match());
        assert!(result.rows.is_empty());
    }
}
