//! Dataset loading and schema definitions.
//!
//! This module handles:
//! - Reading the review CSV into typed records
//! - Tracking which columns the dataset provides
//! - Defining the result rows and output report schema

pub mod dataset;
pub mod schema;

// Re-export main types
pub use dataset::{load_dataset, load_dataset_from_reader, Dataset};
pub use schema::{
    AggregateRow, Column, PerformanceField, QueryResult, RawRow, Report, ReportParameters,
    ReportSections, ReviewRecord,
};
