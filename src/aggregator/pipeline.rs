//! The shared filter → group → dedupe → sort → truncate pipeline.
//!
//! Every engine operation is a `Plan` plus an admission closure. Keeping a
//! single implementation means limits, dedupe and tie-breaking cannot drift
//! between sections.
//!
//! Stage order:
//! 1. Admit each record (keep / skip / malformed)
//! 2. Optionally group by drug or (drug, condition), averaging scores and
//!    summing reviews
//! 3. Optionally drop exact duplicates on (drug, condition, score, reviews)
//! 4. Stable sort, descending on the plan's sort key
//! 5. Truncate to the plan's limit

use crate::parser::schema::{QueryResult, ReviewRecord};
use log::debug;
use std::collections::{HashMap, HashSet};

/// Values of one admitted record that the pipeline works on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<'a> {
    pub drug: &'a str,
    pub condition: Option<&'a str>,
    pub score: f64,
    pub reviews: u64,
}

/// Filter verdict for a single record
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Admission<'a> {
    Keep(Sample<'a>),
    Skip,
    /// A numeric value the query needs could not be parsed
    Malformed,
}

/// Grouping key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Drug,
    DrugCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Score,
    Reviews,
}

/// Pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub grouping: Option<Grouping>,
    pub sort: SortKey,
    pub dedupe: bool,
    pub limit: usize,
}

/// Output row of the pipeline, still borrowing from the dataset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedRow<'a> {
    pub drug: &'a str,
    pub condition: Option<&'a str>,
    /// Mean score when grouped, raw score otherwise
    pub score: f64,
    pub reviews: u64,
    pub records: usize,
}

impl<'a> From<Sample<'a>> for RankedRow<'a> {
    fn from(sample: Sample<'a>) -> Self {
        Self {
            drug: sample.drug,
            condition: sample.condition,
            score: sample.score,
            reviews: sample.reviews,
            records: 1,
        }
    }
}

/// Run a plan over the records
///
/// **Public** - the engine's single code path
///
/// # Arguments
/// * `records` - Dataset rows, never mutated
/// * `admit` - Filter predicate extracting the sample for kept rows
/// * `plan` - Grouping, sort, dedupe and limit settings
pub fn run_pipeline<'a, F>(
    records: &'a [ReviewRecord],
    admit: F,
    plan: &Plan,
) -> QueryResult<RankedRow<'a>>
where
    F: Fn(&'a ReviewRecord) -> Admission<'a>,
{
    let mut samples = Vec::new();
    let mut excluded = 0;

    for record in records {
        match admit(record) {
            Admission::Keep(sample) => samples.push(sample),
            Admission::Skip => {}
            Admission::Malformed => excluded += 1,
        }
    }

    let matched = samples.len();
    debug!(
        "Pipeline admitted {} of {} records ({} malformed)",
        matched,
        records.len(),
        excluded
    );

    let mut rows = match plan.grouping {
        Some(grouping) => group_samples(&samples, grouping),
        None => samples.into_iter().map(RankedRow::from).collect(),
    };

    if plan.dedupe {
        rows = dedupe_rows(rows);
    }

    sort_rows(&mut rows, plan.sort);
    rows.truncate(plan.limit);

    QueryResult {
        rows,
        matched,
        excluded,
    }
}

/// Running totals for one group
struct Accumulator<'a> {
    drug: &'a str,
    condition: Option<&'a str>,
    score_sum: f64,
    reviews: u64,
    records: usize,
}

/// Group samples, keeping groups in first-encounter order
///
/// **Private** - encounter order is what the stable sort falls back on
fn group_samples<'a>(samples: &[Sample<'a>], grouping: Grouping) -> Vec<RankedRow<'a>> {
    let mut index: HashMap<(&'a str, Option<&'a str>), usize> = HashMap::new();
    let mut groups: Vec<Accumulator<'a>> = Vec::new();

    for sample in samples {
        let condition = match grouping {
            Grouping::Drug => None,
            Grouping::DrugCondition => sample.condition,
        };

        let slot = *index.entry((sample.drug, condition)).or_insert_with(|| {
            groups.push(Accumulator {
                drug: sample.drug,
                condition,
                score_sum: 0.0,
                reviews: 0,
                records: 0,
            });
            groups.len() - 1
        });

        let group = &mut groups[slot];
        group.score_sum += sample.score;
        group.reviews = group.reviews.saturating_add(sample.reviews);
        group.records += 1;
    }

    debug!("Grouped {} samples into {} groups", samples.len(), groups.len());

    groups
        .into_iter()
        .map(|g| RankedRow {
            drug: g.drug,
            condition: g.condition,
            score: g.score_sum / g.records as f64,
            reviews: g.reviews,
            records: g.records,
        })
        .collect()
}

/// Drop rows equal on (drug, condition, score, reviews), keeping the first
fn dedupe_rows(rows: Vec<RankedRow<'_>>) -> Vec<RankedRow<'_>> {
    let mut seen = HashSet::new();
    rows.into_iter()
        .filter(|row| seen.insert((row.drug, row.condition, score_bits(row.score), row.reviews)))
        .collect()
}

/// Hashable form of a score; 0.0 and -0.0 compare equal
fn score_bits(score: f64) -> u64 {
    if score == 0.0 {
        0.0f64.to_bits()
    } else {
        score.to_bits()
    }
}

/// Stable descending sort
fn sort_rows(rows: &mut [RankedRow<'_>], key: SortKey) {
    match key {
        SortKey::Score => rows.sort_by(|a, b| b.score.total_cmp(&a.score)),
        SortKey::Reviews => rows.sort_by(|a, b| b.reviews.cmp(&a.reviews)),
    }
}
