use crate::aggregator::summarize;
use crate::output::read_report;
use crate::parser::load_dataset;
use crate::utils::config::REPORT_SCHEMA_VERSION;
use anyhow::{Context, Result};
use log::warn;
use std::path::PathBuf;

/// Validate a report JSON file
pub fn validate_report_file(file_path: PathBuf) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(&file_path)
        .with_context(|| format!("Failed to read report {}", file_path.display()))?;

    if report.version != REPORT_SCHEMA_VERSION {
        warn!(
            "Report schema v{} differs from current v{}",
            report.version,
            REPORT_SCHEMA_VERSION
        );
    }

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Dataset: {}", report.dataset_path);
    println!("  Records: {}", report.summary.records);
    println!("  Disease Class: {}", report.parameters.disease_class);
    println!("  Sections: {}", report.sections.count());
    println!("  Generated: {}", report.generated_at);

    Ok(())
}

/// List the disease classes and drug types a dataset offers
pub fn display_classes(data_path: PathBuf) -> Result<()> {
    let dataset = load_dataset(&data_path)
        .with_context(|| format!("Failed to load dataset {}", data_path.display()))?;
    let summary = summarize(&dataset);

    println!("Dataset: {}", data_path.display());
    println!("  Records: {} ({} rejected)", summary.records, summary.rejected_rows);
    match (summary.min_reviews, summary.max_reviews) {
        (Some(min), Some(max)) => println!("  Reviews per record: {} - {}", min, max),
        _ => println!("  Reviews per record: n/a"),
    }
    if summary.malformed_performance > 0 || summary.malformed_reviews > 0 {
        println!(
            "  Malformed values: {} performance, {} reviews",
            summary.malformed_performance, summary.malformed_reviews
        );
    }

    println!();
    println!("Disease classes ({}):", summary.disease_classes.len());
    for class in &summary.disease_classes {
        println!("  {}", class);
    }

    println!();
    println!("Drug types ({}):", summary.drug_types.len());
    for kind in &summary.drug_types {
        println!("  {}", kind);
    }

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Drug Eval Studio Report Schema");
    println!("Current Version: {}", REPORT_SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Input CSV columns:");
        println!("  drug, condition, disease_class, type,");
        println!("  performance, weighted_performance, reviews");
        println!();
        println!("Report Structure:");
        println!("  version: string            - Schema version (e.g., '1.0.0')");
        println!("  dataset_path: string       - CSV the report was computed from");
        println!("  parameters: object         - Query parameters");
        println!("  summary: object            - Dataset statistics");
        println!("    disease_classes: array   - Distinct disease classes");
        println!("    drug_types: array        - Distinct drug types");
        println!("  sections: object           - Computed sections (each optional)");
        println!("    top_drugs                - Ranked (drug, condition) groups");
        println!("    recommendations          - Ranked drugs for a condition search");
        println!("    high_performance_low_reviews");
        println!("    low_performance_high_reviews");
        println!("      rows: array            - Result rows");
        println!("      matched: number        - Records that passed the filter");
        println!("      excluded: number       - Records with malformed values");
        println!("  generated_at: string       - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Drug Eval Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Ranked aggregates and outlier reports over drug review datasets.");
}
