//! Drug Eval Studio
//!
//! Ranked aggregates and outlier reports over a static dataset of
//! drug-performance reviews.
//!
//! This crate provides the core implementation for the
//! `drug-eval` CLI tool: a CSV loader, a ranking/aggregation engine,
//! and table, chart and JSON report renderers.
//!
//! ## Getting Started
//!
//! ```bash
//! drug-eval dashboard --data drugs.csv --disease-class Respiratory --min-reviews 50
//! drug-eval --help
//! ```

pub mod aggregator;
pub mod chart;
pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
