//! Projection of result rows into (label, value) chart series.

use crate::parser::schema::{AggregateRow, RawRow};
use serde::{Deserialize, Serialize};

/// One bar of a bar chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// `"drug (condition)"`, or just the drug when there is no condition
pub fn point_label(drug: &str, condition: Option<&str>) -> String {
    match condition {
        Some(condition) => format!("{} ({})", drug, condition),
        None => drug.to_string(),
    }
}

/// Series of mean performance per group
pub fn aggregate_series(rows: &[AggregateRow]) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| ChartPoint {
            label: point_label(&row.drug, row.condition.as_deref()),
            value: row.avg_performance,
        })
        .collect()
}

/// Series of raw performance scores
pub fn performance_series(rows: &[RawRow]) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| ChartPoint {
            label: point_label(&row.drug, row.condition.as_deref()),
            value: row.performance,
        })
        .collect()
}

/// Series of review counts
pub fn reviews_series(rows: &[RawRow]) -> Vec<ChartPoint> {
    rows.iter()
        .map(|row| ChartPoint {
            label: point_label(&row.drug, row.condition.as_deref()),
            value: row.reviews as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_series_labels() {
        let rows = vec![
            AggregateRow {
                drug: "Tamiflu".to_string(),
                condition: Some("Influenza".to_string()),
                avg_performance: 4.2,
                reviews: 10,
                records: 1,
            },
            AggregateRow {
                drug: "Advil".to_string(),
                condition: None,
                avg_performance: 3.1,
                reviews: 7,
                records: 2,
            },
        ];

        let series = aggregate_series(&rows);

        assert_eq!(series[0].label, "Tamiflu (Influenza)");
        assert_eq!(series[0].value, 4.2);
        assert_eq!(series[1].label, "Advil");
    }

    #[test]
    fn test_reviews_series_uses_counts() {
        let rows = vec![RawRow {
            drug: "A".to_string(),
            condition: Some("Pain".to_string()),
            performance: 1.0,
            reviews: 9000,
        }];

        assert_eq!(reviews_series(&rows)[0].value, 9000.0);
        assert_eq!(performance_series(&rows)[0].value, 1.0);
    }
}
