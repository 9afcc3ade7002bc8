//! CSV dataset loader.
//!
//! Reads the review CSV into an immutable `Dataset`. Header names are
//! matched case-insensitively; unknown columns are ignored. Numeric fields
//! are parsed leniently: a bad value becomes `None` instead of failing the
//! whole load, and the engine later counts those rows as excluded.

use super::schema::{Column, ReviewRecord};
use crate::utils::error::LoadError;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Loaded review dataset
///
/// Owned and read-only after construction. Queries borrow it.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<ReviewRecord>,
    columns: BTreeSet<Column>,
    rejected_rows: usize,
}

impl Dataset {
    /// Build a dataset from records with an explicit column set
    pub fn new(records: Vec<ReviewRecord>, columns: impl IntoIterator<Item = Column>) -> Self {
        Self {
            records,
            columns: columns.into_iter().collect(),
            rejected_rows: 0,
        }
    }

    /// Build a dataset whose schema has every known column
    pub fn from_records(records: Vec<ReviewRecord>) -> Self {
        Self::new(records, Column::ALL)
    }

    pub fn records(&self) -> &[ReviewRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Rows dropped by the loader
    pub fn rejected_rows(&self) -> usize {
        self.rejected_rows
    }
}

/// Row as it comes out of the CSV reader, before numeric parsing
#[derive(Debug, Deserialize)]
struct RawReviewRow {
    #[serde(default)]
    drug: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    disease_class: Option<String>,
    #[serde(default, rename = "type")]
    drug_type: Option<String>,
    #[serde(default)]
    performance: Option<String>,
    #[serde(default)]
    weighted_performance: Option<String>,
    #[serde(default)]
    reviews: Option<String>,
}

/// Load a dataset from a CSV file
///
/// **Public** - main entry point for loading
///
/// # Errors
/// * `LoadError::Io` - File missing or unreadable
/// * `LoadError::MissingColumn` - No `drug` column in the header
/// * `LoadError::InvalidFormat` - Every data row was rejected
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    info!("Loading dataset from: {}", path.display());

    let file = File::open(path)?;
    let dataset = load_dataset_from_reader(file)?;

    info!(
        "Loaded {} records ({} rejected)",
        dataset.len(),
        dataset.rejected_rows()
    );
    Ok(dataset)
}

/// Load a dataset from any CSV byte source
///
/// **Public** - used by `load_dataset` and by tests with in-memory data
pub fn load_dataset_from_reader<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(source);

    let headers = normalize_headers(reader.headers()?);
    let columns: BTreeSet<Column> = headers.iter().filter_map(Column::from_header).collect();
    debug!("Detected columns: {:?}", columns);

    if !columns.contains(&Column::Drug) {
        return Err(LoadError::MissingColumn(Column::Drug.name().to_string()));
    }

    let mut records = Vec::new();
    let mut rejected_rows = 0;
    let mut total_rows = 0;

    for (index, result) in reader.records().enumerate() {
        total_rows += 1;
        // +2: one for the header line, one for 1-based numbering
        let line = index + 2;

        let row = match result.and_then(|r| r.deserialize::<RawReviewRow>(Some(&headers))) {
            Ok(row) => row,
            Err(e) => {
                // Log but don't fail - a single bad row must not abort the load
                warn!("Skipping row {}: {}", line, e);
                rejected_rows += 1;
                continue;
            }
        };

        match to_record(row, line) {
            Some(record) => records.push(record),
            None => rejected_rows += 1,
        }
    }

    if records.is_empty() && total_rows > 0 {
        return Err(LoadError::InvalidFormat(
            "All dataset rows failed to parse".to_string(),
        ));
    }

    Ok(Dataset {
        records,
        columns,
        rejected_rows,
    })
}

/// Lowercase known header names so serde field names match
///
/// **Private** - internal helper for load_dataset_from_reader
fn normalize_headers(headers: &StringRecord) -> StringRecord {
    headers
        .iter()
        .map(|h| match Column::from_header(h) {
            Some(column) => column.name().to_string(),
            None => h.to_string(),
        })
        .collect()
}

/// Convert a raw row into a typed record
///
/// **Private** - returns None when the row has no drug name
fn to_record(row: RawReviewRow, line: usize) -> Option<ReviewRecord> {
    let drug = match non_empty(row.drug) {
        Some(drug) => drug,
        None => {
            warn!("Skipping row {}: empty drug name", line);
            return None;
        }
    };

    Some(ReviewRecord {
        drug,
        condition: non_empty(row.condition),
        disease_class: non_empty(row.disease_class),
        drug_type: non_empty(row.drug_type),
        performance: parse_score(row.performance.as_deref(), line, Column::Performance),
        weighted_performance: parse_score(
            row.weighted_performance.as_deref(),
            line,
            Column::WeightedPerformance,
        ),
        reviews: parse_reviews(row.reviews.as_deref(), line),
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse a performance score; non-finite values are malformed
///
/// **Public** - also used by tests
pub fn parse_score(value: Option<&str>, line: usize, column: Column) -> Option<f64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    match value.parse::<f64>() {
        Ok(score) if score.is_finite() => Some(score),
        _ => {
            debug!("Row {}: malformed {} value '{}'", line, column, value);
            None
        }
    }
}

/// Parse a review count
///
/// Accepts integral floats like `"120.0"`. Negative or fractional counts
/// are malformed, as are counts that do not fit in a `u64`.
pub fn parse_reviews(value: Option<&str>, line: usize) -> Option<u64> {
    let value = value?.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(count) = value.parse::<u64>() {
        return Some(count);
    }

    match value.parse::<f64>() {
        Ok(count)
            if count.is_finite()
                && count >= 0.0
                && count < u64::MAX as f64
                && count.fract() == 0.0 =>
        {
            Some(count as u64)
        }
        _ => {
            debug!("Row {}: malformed reviews value '{}'", line, value);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
drug,condition,disease_class,type,performance,weighted_performance,reviews
Tamiflu,Influenza,Respiratory,Rx,4.1,4.3,120
Advil,Pain,Musculoskeletal,OTC,3.8,3.6,5400
";

    #[test]
    fn test_load_sample() {
        let dataset = load_dataset_from_reader(SAMPLE.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.rejected_rows(), 0);
        assert!(Column::ALL.iter().all(|c| dataset.has_column(*c)));

        let first = &dataset.records()[0];
        assert_eq!(first.drug, "Tamiflu");
        assert_eq!(first.drug_type.as_deref(), Some("Rx"));
        assert_eq!(first.weighted_performance, Some(4.3));
        assert_eq!(first.reviews, Some(120));
    }

    #[test]
    fn test_missing_optional_column_recorded() {
        let csv = "drug,condition,performance,reviews\nA,Flu,4.0,3\n";
        let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();

        assert!(!dataset.has_column(Column::WeightedPerformance));
        assert!(!dataset.has_column(Column::DiseaseClass));
        assert_eq!(dataset.records()[0].weighted_performance, None);
    }

    #[test]
    fn test_missing_drug_column_fails() {
        let csv = "condition,performance\nFlu,4.0\n";
        let result = load_dataset_from_reader(csv.as_bytes());
        assert!(matches!(result, Err(LoadError::MissingColumn(c)) if c == "drug"));
    }

    #[test]
    fn test_header_case_and_whitespace() {
        let csv = " Drug , Condition ,Reviews\nA,Flu,7\n";
        let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.records()[0].condition.as_deref(), Some("Flu"));
        assert_eq!(dataset.records()[0].reviews, Some(7));
    }

    #[test]
    fn test_malformed_numbers_become_none() {
        let csv = "drug,performance,reviews\nA,n/a,12.0\nB,NaN,-3\nC,4.5,abc\n";
        let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();
        let records = dataset.records();

        assert_eq!(records[0].performance, None);
        assert_eq!(records[0].reviews, Some(12));
        assert_eq!(records[1].performance, None);
        assert_eq!(records[1].reviews, None);
        assert_eq!(records[2].performance, Some(4.5));
        assert_eq!(records[2].reviews, None);
    }

    #[test]
    fn test_rows_without_drug_rejected() {
        let csv = "drug,condition\n,Flu\nA,Cold\n";
        let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.rejected_rows(), 1);
    }

    #[test]
    fn test_all_rows_rejected_fails() {
        let csv = "drug,condition\n,Flu\n,Cold\n";
        let result = load_dataset_from_reader(csv.as_bytes());
        assert!(matches!(result, Err(LoadError::InvalidFormat(_))));
    }

    #[test]
    fn test_header_only_is_empty_dataset() {
        let csv = "drug,condition,reviews\n";
        let dataset = load_dataset_from_reader(csv.as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_parse_reviews_rejects_fractional() {
        assert_eq!(parse_reviews(Some("10.5"), 1), None);
        assert_eq!(parse_reviews(Some(" 42 "), 1), Some(42));
        assert_eq!(parse_reviews(None, 1), None);
    }

    #[test]
    fn test_parse_reviews_rejects_out_of_range() {
        assert_eq!(parse_reviews(Some("1e30"), 1), None);
        assert_eq!(parse_reviews(Some("18446744073709551616"), 1), None);
        assert_eq!(parse_reviews(Some("1e3"), 1), Some(1000));
    }
}
