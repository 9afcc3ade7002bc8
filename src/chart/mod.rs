//! Bar chart generation for ranked sections.
//!
//! This module converts result rows into (label, value) series and renders
//! them as SVG or terminal bar charts.

pub mod generator;
pub mod series;

// Re-export main types
pub use generator::{generate_bar_chart, generate_text_chart, BarChartConfig};
pub use series::{aggregate_series, performance_series, reviews_series, ChartPoint};
