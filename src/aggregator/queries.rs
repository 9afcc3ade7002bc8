//! Engine operations behind each dashboard section.
//!
//! Each operation validates the columns it needs, builds a `Plan` and an
//! admission closure, and hands both to `run_pipeline`. An empty dataset
//! short-circuits to an empty result before any schema check.

use super::pipeline::{run_pipeline, Admission, Grouping, Plan, RankedRow, Sample, SortKey};
use crate::parser::dataset::Dataset;
use crate::parser::schema::{
    AggregateRow, Column, PerformanceField, QueryResult, RawRow, ReviewRecord,
};
use crate::utils::config::{
    DEFAULT_HIGH_PERFORMANCE_MAX_REVIEWS, DEFAULT_HIGH_PERFORMANCE_THRESHOLD,
    DEFAULT_LOW_PERFORMANCE_MIN_REVIEWS, DEFAULT_LOW_PERFORMANCE_THRESHOLD, DEFAULT_TOP_K,
};
use crate::utils::error::EngineError;
use log::debug;
use std::collections::BTreeSet;

/// Parameters for `rank_by_disease_class`
#[derive(Debug, Clone, PartialEq)]
pub struct RankQuery {
    pub disease_class: String,
    pub min_reviews: u64,
    pub field: PerformanceField,
}

/// Parameters for `recommend_by_condition`
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendQuery {
    /// Matched case-insensitively anywhere in the condition
    pub condition_substring: String,
    pub allowed_types: BTreeSet<String>,
    pub field: PerformanceField,
    pub limit: usize,
}

/// Parameters for `find_high_performance_low_reviews`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighPerformanceQuery {
    pub performance_threshold: f64,
    pub max_reviews: u64,
}

impl Default for HighPerformanceQuery {
    fn default() -> Self {
        Self {
            performance_threshold: DEFAULT_HIGH_PERFORMANCE_THRESHOLD,
            max_reviews: DEFAULT_HIGH_PERFORMANCE_MAX_REVIEWS,
        }
    }
}

/// Parameters for `find_low_performance_high_reviews`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPerformanceQuery {
    pub performance_threshold: f64,
    pub min_reviews: u64,
}

impl Default for LowPerformanceQuery {
    fn default() -> Self {
        Self {
            performance_threshold: DEFAULT_LOW_PERFORMANCE_THRESHOLD,
            min_reviews: DEFAULT_LOW_PERFORMANCE_MIN_REVIEWS,
        }
    }
}

/// Top drug/condition pairs within one disease class
///
/// **Public** - backs the "top drugs" section
///
/// # Returns
/// Up to 10 groups sorted by mean performance (descending)
///
/// # Errors
/// * `EngineError::Schema` - A needed column is absent from the dataset
pub fn rank_by_disease_class(
    dataset: &Dataset,
    query: &RankQuery,
) -> Result<QueryResult<AggregateRow>, EngineError> {
    if dataset.is_empty() {
        return Ok(QueryResult::empty());
    }
    require_columns(
        dataset,
        &[
            Column::DiseaseClass,
            Column::Condition,
            Column::Reviews,
            query.field.column(),
        ],
    )?;

    debug!(
        "Ranking disease class '{}' (min reviews {}, {:?})",
        query.disease_class, query.min_reviews, query.field
    );

    let plan = Plan {
        grouping: Some(Grouping::DrugCondition),
        sort: SortKey::Score,
        dedupe: false,
        limit: DEFAULT_TOP_K,
    };

    let result = run_pipeline(
        dataset.records(),
        |record| {
            if record.disease_class.as_deref() != Some(query.disease_class.as_str()) {
                return Admission::Skip;
            }
            // Rows without a condition have no (drug, condition) key
            let Some(condition) = record.condition.as_deref() else {
                return Admission::Skip;
            };
            let Some(reviews) = record.reviews else {
                return Admission::Malformed;
            };
            if reviews < query.min_reviews {
                return Admission::Skip;
            }
            let Some(score) = record.score(query.field) else {
                return Admission::Malformed;
            };
            Admission::Keep(Sample {
                drug: &record.drug,
                condition: Some(condition),
                score,
                reviews,
            })
        },
        &plan,
    );

    Ok(into_aggregate(result))
}

/// Drugs recommended for a free-text condition search
///
/// **Public** - backs the "recommendations" section
///
/// A record with no condition or no type never matches. `matched == 0`
/// on the result means nothing passed the text and type filter.
pub fn recommend_by_condition(
    dataset: &Dataset,
    query: &RecommendQuery,
) -> Result<QueryResult<AggregateRow>, EngineError> {
    if dataset.is_empty() {
        return Ok(QueryResult::empty());
    }
    require_columns(
        dataset,
        &[
            Column::Condition,
            Column::Type,
            Column::Reviews,
            query.field.column(),
        ],
    )?;

    let needle = query.condition_substring.to_lowercase();
    debug!(
        "Recommending for '{}' among types {:?}",
        needle, query.allowed_types
    );

    let plan = Plan {
        grouping: Some(Grouping::Drug),
        sort: SortKey::Score,
        dedupe: false,
        limit: query.limit,
    };

    let result = run_pipeline(
        dataset.records(),
        |record| {
            let text_match = record
                .condition
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(&needle));
            let type_match = record
                .drug_type
                .as_ref()
                .is_some_and(|t| query.allowed_types.contains(t));
            if !(text_match && type_match) {
                return Admission::Skip;
            }
            let (Some(score), Some(reviews)) = (record.score(query.field), record.reviews) else {
                return Admission::Malformed;
            };
            Admission::Keep(Sample {
                drug: &record.drug,
                condition: record.condition.as_deref(),
                score,
                reviews,
            })
        },
        &plan,
    );

    Ok(into_aggregate(result))
}

/// Highly rated records backed by very few reviews
///
/// **Public** - deduplicated, sorted by performance (descending), top 10
pub fn find_high_performance_low_reviews(
    dataset: &Dataset,
    query: &HighPerformanceQuery,
) -> Result<QueryResult<RawRow>, EngineError> {
    if dataset.is_empty() {
        return Ok(QueryResult::empty());
    }
    require_columns(dataset, &[Column::Performance, Column::Reviews])?;

    let plan = Plan {
        grouping: None,
        sort: SortKey::Score,
        dedupe: true,
        limit: DEFAULT_TOP_K,
    };

    let result = run_pipeline(
        dataset.records(),
        |record| {
            admit_outlier(
                record,
                |performance| performance >= query.performance_threshold,
                |reviews| reviews <= query.max_reviews,
            )
        },
        &plan,
    );

    Ok(into_raw(result))
}

/// Poorly rated records with a large review count
///
/// **Public** - deduplicated, sorted by reviews (descending), top 10
pub fn find_low_performance_high_reviews(
    dataset: &Dataset,
    query: &LowPerformanceQuery,
) -> Result<QueryResult<RawRow>, EngineError> {
    if dataset.is_empty() {
        return Ok(QueryResult::empty());
    }
    require_columns(dataset, &[Column::Performance, Column::Reviews])?;

    let plan = Plan {
        grouping: None,
        sort: SortKey::Reviews,
        dedupe: true,
        limit: DEFAULT_TOP_K,
    };

    let result = run_pipeline(
        dataset.records(),
        |record| {
            admit_outlier(
                record,
                |performance| performance <= query.performance_threshold,
                |reviews| reviews > query.min_reviews,
            )
        },
        &plan,
    );

    Ok(into_raw(result))
}

/// Fail with the first column the dataset does not provide
///
/// **Private** - schema check shared by all operations
fn require_columns(dataset: &Dataset, columns: &[Column]) -> Result<(), EngineError> {
    match columns.iter().find(|c| !dataset.has_column(**c)) {
        Some(missing) => Err(EngineError::Schema {
            field: missing.name().to_string(),
        }),
        None => Ok(()),
    }
}

/// Admission for the raw outlier operations
///
/// **Private** - a known value failing its predicate is a skip, not malformed
fn admit_outlier<'a>(
    record: &'a ReviewRecord,
    performance_ok: impl Fn(f64) -> bool,
    reviews_ok: impl Fn(u64) -> bool,
) -> Admission<'a> {
    if record.performance.is_some_and(|p| !performance_ok(p))
        || record.reviews.is_some_and(|r| !reviews_ok(r))
    {
        return Admission::Skip;
    }
    match (record.performance, record.reviews) {
        (Some(performance), Some(reviews)) => Admission::Keep(Sample {
            drug: &record.drug,
            condition: record.condition.as_deref(),
            score: performance,
            reviews,
        }),
        _ => Admission::Malformed,
    }
}

fn into_aggregate(result: QueryResult<RankedRow<'_>>) -> QueryResult<AggregateRow> {
    QueryResult {
        rows: result
            .rows
            .into_iter()
            .map(|row| AggregateRow {
                drug: row.drug.to_string(),
                condition: row.condition.map(str::to_string),
                avg_performance: row.score,
                reviews: row.reviews,
                records: row.records,
            })
            .collect(),
        matched: result.matched,
        excluded: result.excluded,
    }
}

fn into_raw(result: QueryResult<RankedRow<'_>>) -> QueryResult<RawRow> {
    QueryResult {
        rows: result
            .rows
            .into_iter()
            .map(|row| RawRow {
                drug: row.drug.to_string(),
                condition: row.condition.map(str::to_string),
                performance: row.score,
                reviews: row.reviews,
            })
            .collect(),
        matched: result.matched,
        excluded: result.excluded,
    }
}
