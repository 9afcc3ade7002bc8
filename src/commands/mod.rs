//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod dashboard;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use dashboard::{build_report, execute_dashboard, validate_args};
pub use models::{DashboardArgs, Section};
pub use utils::{display_classes, display_schema, display_version, validate_report_file};
