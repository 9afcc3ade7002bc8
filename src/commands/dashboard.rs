//! Dashboard command implementation.
//!
//! The dashboard command:
//! 1. Loads the review dataset
//! 2. Summarizes it (available classes, types, malformed values)
//! 3. Runs the requested engine operations
//! 4. Renders a bar chart of the leading section
//! 5. Writes the JSON report
//! 6. Prints tables and text charts

use super::models::{DashboardArgs, Section};
use crate::aggregator::{
    find_high_performance_low_reviews, find_low_performance_high_reviews, rank_by_disease_class,
    recommend_by_condition, summarize, DatasetSummary,
};
use crate::chart::{
    aggregate_series, generate_bar_chart, generate_text_chart, performance_series,
    reviews_series, ChartPoint,
};
use crate::output::{render_aggregate_table, render_raw_table, write_report, write_svg};
use crate::parser::load_dataset;
use crate::parser::schema::{Report, ReportParameters, ReportSections};
use crate::utils::config::{MAX_TOP_K, REPORT_SCHEMA_VERSION};
use crate::utils::error::ChartError;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::time::Instant;

/// Execute the dashboard command
///
/// **Public** - main entry point called from main.rs
///
/// `section` limits which engine operations run; the `rank`, `recommend`
/// and `outliers` subcommands are this function with a narrower section.
///
/// # Returns
/// The report that was computed (and written, if an output path was given)
///
/// # Errors
/// * Dataset load failures
/// * Schema errors from the engine (e.g. no `weighted_performance` column)
/// * File write errors
pub fn execute_dashboard(args: DashboardArgs, section: Section) -> Result<Report> {
    let start_time = Instant::now();

    info!("Starting dashboard for dataset: {}", args.data_path.display());

    // Step 1: Load dataset
    info!("Step 1/5: Loading dataset...");
    let dataset = load_dataset(&args.data_path).with_context(|| {
        format!("Failed to load dataset {}", args.data_path.display())
    })?;

    // Step 2: Summarize
    info!("Step 2/5: Summarizing dataset...");
    let summary = summarize(&dataset);
    info!("Dataset: {}", summary.summary());

    if section.includes(Section::TopDrugs) && !summary.has_disease_class(&args.disease_class) {
        warn!(
            "Disease class '{}' does not occur in the dataset",
            args.disease_class
        );
    }

    // Step 3: Run queries
    info!("Step 3/5: Running queries...");
    let mut sections = ReportSections::default();

    if section.includes(Section::TopDrugs) {
        let result = rank_by_disease_class(&dataset, &args.rank_query())
            .context("Failed to rank drugs by disease class")?;
        debug!("Top drugs: {} rows", result.rows.len());
        sections.top_drugs = Some(result);
    }

    if section.includes(Section::Recommendations) {
        if let Some(query) = args.recommend_query() {
            let result = recommend_by_condition(&dataset, &query)
                .context("Failed to compute recommendations")?;
            debug!("Recommendations: {} rows", result.rows.len());
            sections.recommendations = Some(result);
        }
    }

    if section.includes(Section::Outliers) {
        let high = find_high_performance_low_reviews(&dataset, &args.high_performance)
            .context("Failed to find high-performance outliers")?;
        let low = find_low_performance_high_reviews(&dataset, &args.low_performance)
            .context("Failed to find low-performance outliers")?;
        debug!("Outliers: {} high, {} low", high.rows.len(), low.rows.len());
        sections.high_performance_low_reviews = Some(high);
        sections.low_performance_high_reviews = Some(low);
    }

    // Step 4: Chart
    if let Some(svg_path) = &args.output_svg {
        info!("Step 4/5: Generating chart...");
        let (points, precision) = chart_series(&sections);
        let chart_config = args.chart_config.clone().with_precision(precision);
        match generate_bar_chart(&points, Some(&chart_config)) {
            Ok(svg) => {
                write_svg(&svg, svg_path).context("Failed to write chart SVG")?;
                info!("✓ Chart written to: {}", svg_path.display());
            }
            Err(ChartError::EmptySeries) => {
                warn!("No rows to chart, skipping {}", svg_path.display());
            }
        }
    } else {
        info!("Step 4/5: Skipping chart generation (not requested)");
    }

    // Step 5: Report
    info!("Step 5/5: Building report...");
    let report = build_report(&args, summary, sections);

    if let Some(json_path) = &args.output_json {
        write_report(&report, json_path).context("Failed to write report JSON")?;
        info!("✓ Report written to: {}", json_path.display());
    }

    if args.print_tables {
        print_report(&report, &args);
    }

    let elapsed = start_time.elapsed();
    info!("Dashboard completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Validate dashboard arguments
///
/// **Public** - can be called before execute_dashboard for early validation
pub fn validate_args(args: &DashboardArgs, section: Section) -> Result<()> {
    if args.data_path.as_os_str().is_empty() {
        anyhow::bail!("Dataset path cannot be empty");
    }

    if section.includes(Section::TopDrugs) && args.disease_class.trim().is_empty() {
        anyhow::bail!("Disease class cannot be empty");
    }

    if section == Section::Recommendations && args.condition_search.is_none() {
        anyhow::bail!("A condition search term is required for recommendations");
    }

    if args.condition_search.is_some() && section.includes(Section::Recommendations) {
        if args.allowed_types.is_empty() {
            anyhow::bail!("At least one drug type must be allowed for recommendations");
        }

        if args.recommend_limit == 0 {
            anyhow::bail!("Recommendation limit must be greater than 0");
        }

        if args.recommend_limit > MAX_TOP_K {
            anyhow::bail!("Recommendation limit is too large (max {})", MAX_TOP_K);
        }
    }

    let thresholds = [
        args.high_performance.performance_threshold,
        args.low_performance.performance_threshold,
    ];
    if thresholds.iter().any(|t| !t.is_finite()) {
        anyhow::bail!("Performance thresholds must be finite numbers");
    }

    Ok(())
}

/// Assemble the report from computed sections
///
/// **Public** - also useful for callers that run queries themselves
pub fn build_report(
    args: &DashboardArgs,
    summary: DatasetSummary,
    sections: ReportSections,
) -> Report {
    use chrono::Utc;

    Report {
        version: REPORT_SCHEMA_VERSION.to_string(),
        dataset_path: args.data_path.display().to_string(),
        parameters: ReportParameters {
            disease_class: args.disease_class.clone(),
            min_reviews: args.min_reviews,
            performance_field: args.field,
            condition_search: args.condition_search.clone(),
            allowed_types: args.allowed_types.clone(),
            high_performance_threshold: args.high_performance.performance_threshold,
            high_performance_max_reviews: args.high_performance.max_reviews,
            low_performance_threshold: args.low_performance.performance_threshold,
            low_performance_min_reviews: args.low_performance.min_reviews,
        },
        summary,
        sections,
        generated_at: Utc::now().to_rfc3339(),
    }
}

/// Series for the SVG chart: the first computed section with rows
///
/// **Private** - internal helper for execute_dashboard
///
/// # Returns
/// The points and the decimal places their values are shown with
fn chart_series(sections: &ReportSections) -> (Vec<ChartPoint>, usize) {
    if let Some(top) = sections.top_drugs.as_ref().filter(|r| !r.rows.is_empty()) {
        return (aggregate_series(&top.rows), 2);
    }
    if let Some(rec) = sections.recommendations.as_ref().filter(|r| !r.rows.is_empty()) {
        return (aggregate_series(&rec.rows), 2);
    }
    if let Some(high) = sections
        .high_performance_low_reviews
        .as_ref()
        .filter(|r| !r.rows.is_empty())
    {
        return (performance_series(&high.rows), 2);
    }
    if let Some(low) = sections
        .low_performance_high_reviews
        .as_ref()
        .filter(|r| !r.rows.is_empty())
    {
        // Review counts are whole numbers
        return (reviews_series(&low.rows), 0);
    }
    (Vec::new(), 0)
}

/// Print every computed section to stdout
///
/// **Private** - internal helper for execute_dashboard
fn print_report(report: &Report, args: &DashboardArgs) {
    let sections = &report.sections;

    println!("\n{}", "=".repeat(80));
    println!("DRUG PERFORMANCE DASHBOARD");
    println!("{}", "=".repeat(80));
    println!("Dataset:  {}", report.dataset_path);
    println!("Records:  {}", report.summary.records);
    println!("Field:    {:?}", report.parameters.performance_field);

    if let Some(top) = &sections.top_drugs {
        print_heading(&format!(
            "Top Drugs for {} (min {} reviews)",
            args.disease_class, args.min_reviews
        ));
        println!("{}", render_aggregate_table(&top.rows));
        println!();
        println!("{}", generate_text_chart(&aggregate_series(&top.rows), 2));
        print_excluded(top.excluded);
    }

    if let Some(rec) = &sections.recommendations {
        let search = args.condition_search.as_deref().unwrap_or_default();
        print_heading(&format!("Recommendations for \"{}\"", search));
        if rec.is_no_match() {
            println!("  No matching conditions found for \"{}\".", search);
        } else {
            println!("{}", render_aggregate_table(&rec.rows));
            println!();
            println!("{}", generate_text_chart(&aggregate_series(&rec.rows), 2));
        }
        print_excluded(rec.excluded);
    }

    if let Some(high) = &sections.high_performance_low_reviews {
        print_heading(&format!(
            "High Performance (>= {}) but Low Review Count (<= {})",
            args.high_performance.performance_threshold, args.high_performance.max_reviews
        ));
        println!("{}", render_raw_table(&high.rows));
        print_excluded(high.excluded);
    }

    if let Some(low) = &sections.low_performance_high_reviews {
        print_heading(&format!(
            "Low Performance (<= {}) with High Review Count (> {})",
            args.low_performance.performance_threshold, args.low_performance.min_reviews
        ));
        println!("{}", render_raw_table(&low.rows));
        println!();
        println!("{}", generate_text_chart(&reviews_series(&low.rows), 0));
        print_excluded(low.excluded);
    }

    println!("{}", "=".repeat(80));
}

fn print_heading(title: &str) {
    println!("\n{}", title);
    println!("{}", "-".repeat(title.chars().count()));
}

fn print_excluded(excluded: usize) {
    if excluded > 0 {
        println!("  ({} rows with malformed values were excluded)", excluded);
    }
}
