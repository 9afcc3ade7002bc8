//! Plain-text tables for terminal output.

use crate::chart::generator::truncate_label;
use crate::parser::schema::{AggregateRow, RawRow};

const DRUG_WIDTH: usize = 28;
const CONDITION_WIDTH: usize = 32;

/// Render aggregate rows as an aligned table
///
/// The condition column is only shown when at least one row has one.
pub fn render_aggregate_table(rows: &[AggregateRow]) -> String {
    if rows.is_empty() {
        return no_data();
    }

    let with_condition = rows.iter().any(|r| r.condition.is_some());
    let mut lines = Vec::with_capacity(rows.len() + 2);

    let header = if with_condition {
        format!(
            "  {:>3}  {:<dw$}  {:<cw$}  {:>9}  {:>10}",
            "#",
            "Drug",
            "Condition",
            "Avg Perf",
            "Reviews",
            dw = DRUG_WIDTH,
            cw = CONDITION_WIDTH
        )
    } else {
        format!(
            "  {:>3}  {:<dw$}  {:>9}  {:>10}",
            "#",
            "Drug",
            "Avg Perf",
            "Reviews",
            dw = DRUG_WIDTH
        )
    };
    let separator = rule(header.len());
    lines.push(separator.clone());
    lines.push(header);
    lines.push(separator);

    for (i, row) in rows.iter().enumerate() {
        let drug = truncate_label(&row.drug, DRUG_WIDTH);
        let line = if with_condition {
            format!(
                "  {:>3}  {:<dw$}  {:<cw$}  {:>9.3}  {:>10}",
                i + 1,
                drug,
                truncate_label(row.condition.as_deref().unwrap_or("-"), CONDITION_WIDTH),
                row.avg_performance,
                row.reviews,
                dw = DRUG_WIDTH,
                cw = CONDITION_WIDTH
            )
        } else {
            format!(
                "  {:>3}  {:<dw$}  {:>9.3}  {:>10}",
                i + 1,
                drug,
                row.avg_performance,
                row.reviews,
                dw = DRUG_WIDTH
            )
        };
        lines.push(line);
    }

    lines.join("\n")
}

/// Render raw outlier rows as an aligned table
pub fn render_raw_table(rows: &[RawRow]) -> String {
    if rows.is_empty() {
        return no_data();
    }

    let header = format!(
        "  {:>3}  {:<dw$}  {:<cw$}  {:>11}  {:>10}",
        "#",
        "Drug",
        "Condition",
        "Performance",
        "Reviews",
        dw = DRUG_WIDTH,
        cw = CONDITION_WIDTH
    );

    let separator = rule(header.len());
    let mut lines = vec![separator.clone(), header, separator];

    for (i, row) in rows.iter().enumerate() {
        lines.push(format!(
            "  {:>3}  {:<dw$}  {:<cw$}  {:>11.2}  {:>10}",
            i + 1,
            truncate_label(&row.drug, DRUG_WIDTH),
            truncate_label(row.condition.as_deref().unwrap_or("-"), CONDITION_WIDTH),
            row.performance,
            row.reviews,
            dw = DRUG_WIDTH,
            cw = CONDITION_WIDTH
        ));
    }

    lines.join("\n")
}

fn rule(len: usize) -> String {
    format!("  {}", "-".repeat(len.saturating_sub(2)))
}

fn no_data() -> String {
    "  No data available for the selected filters.".to_string()
}
