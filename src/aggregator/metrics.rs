//! Dataset-level statistics.
//!
//! Supplies the choices a caller offers for filtering (disease classes,
//! drug types, review range) and counts of malformed values.

use crate::parser::dataset::Dataset;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Summary statistics for a loaded dataset
///
/// **Public** - returned from summarize
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Records held by the dataset
    pub records: usize,

    /// Rows the loader dropped
    pub rejected_rows: usize,

    /// Distinct disease classes, sorted, missing values dropped
    pub disease_classes: Vec<String>,

    /// Distinct drug types, sorted, missing values dropped
    pub drug_types: Vec<String>,

    /// Sum of all well-formed review counts
    pub total_reviews: u64,

    /// Smallest well-formed review count
    pub min_reviews: Option<u64>,

    /// Largest well-formed review count
    pub max_reviews: Option<u64>,

    /// Records whose performance value is missing or malformed
    pub malformed_performance: usize,

    /// Records whose review count is missing or malformed
    pub malformed_reviews: usize,
}

/// Calculate summary statistics for a dataset
///
/// **Public** - main entry point for metrics calculation
pub fn summarize(dataset: &Dataset) -> DatasetSummary {
    let records = dataset.records();
    debug!("Summarizing {} records", records.len());

    let disease_classes: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.disease_class.as_deref())
        .collect();
    let drug_types: BTreeSet<&str> = records
        .iter()
        .filter_map(|r| r.drug_type.as_deref())
        .collect();

    let reviews: Vec<u64> = records.iter().filter_map(|r| r.reviews).collect();

    DatasetSummary {
        records: records.len(),
        rejected_rows: dataset.rejected_rows(),
        disease_classes: disease_classes.into_iter().map(str::to_string).collect(),
        drug_types: drug_types.into_iter().map(str::to_string).collect(),
        total_reviews: reviews.iter().fold(0u64, |acc, r| acc.saturating_add(*r)),
        min_reviews: reviews.iter().copied().min(),
        max_reviews: reviews.iter().copied().max(),
        malformed_performance: records.iter().filter(|r| r.performance.is_none()).count(),
        malformed_reviews: records.len() - reviews.len(),
    }
}

impl DatasetSummary {
    /// Check whether a disease class exists in the dataset
    pub fn has_disease_class(&self, class: &str) -> bool {
        self.disease_classes.iter().any(|c| c == class)
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and debugging
    pub fn summary(&self) -> String {
        format!(
            "Records: {} | Rejected: {} | Classes: {} | Types: {} | Reviews: {}",
            self.records,
            self.rejected_rows,
            self.disease_classes.len(),
            self.drug_types.len(),
            self.total_reviews
        )
    }
}
