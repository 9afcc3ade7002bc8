//! Drug Eval Studio CLI
//!
//! Explore a drug-performance review dataset from the terminal.
//! Ranks drugs per disease class, recommends drugs for a condition search
//! and lists performance/review-count outliers.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use drug_eval_studio::commands::{
    display_classes, display_schema, display_version, execute_dashboard, validate_args,
    validate_report_file, DashboardArgs, Section,
};
use drug_eval_studio::parser::PerformanceField;
use drug_eval_studio::utils::config::{load_config, DashboardConfig};

/// Drug Eval Studio - ranked views over drug review data
#[derive(Parser, Debug)]
#[command(name = "drug-eval")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Options shared by every dataset command
#[derive(Args, Debug)]
struct DataOpts {
    /// Review dataset CSV
    #[arg(short, long, default_value = "data/drugs.csv")]
    data: PathBuf,

    /// Dashboard config file (TOML)
    #[arg(short, long, env = "DRUG_EVAL_CONFIG")]
    config: Option<PathBuf>,
}

/// Options of the top-drugs section
#[derive(Args, Debug)]
struct RankOpts {
    /// Disease class to rank
    #[arg(long)]
    disease_class: String,

    /// Minimum reviews a record needs to be ranked
    #[arg(long)]
    min_reviews: Option<u64>,

    /// Rank on weighted_performance instead of performance
    #[arg(long)]
    weighted: bool,
}

/// Options of the recommendation section
#[derive(Args, Debug)]
struct RecommendOpts {
    /// Case-insensitive condition search term
    #[arg(long)]
    condition: Option<String>,

    /// Allowed drug types (comma separated)
    #[arg(long, value_delimiter = ',')]
    types: Vec<String>,

    /// Number of recommendations
    #[arg(long)]
    limit: Option<usize>,
}

/// Output files
#[derive(Args, Debug)]
struct OutputOpts {
    /// Output path for JSON report (optional)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output path for SVG bar chart (optional)
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Chart title
    #[arg(long)]
    title: Option<String>,

    /// Do not print tables to stdout
    #[arg(long)]
    quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every dashboard section
    Dashboard {
        #[command(flatten)]
        data: DataOpts,

        #[command(flatten)]
        rank: RankOpts,

        #[command(flatten)]
        recommend: RecommendOpts,

        #[command(flatten)]
        output: OutputOpts,
    },

    /// Top drugs for a disease class
    Rank {
        #[command(flatten)]
        data: DataOpts,

        #[command(flatten)]
        rank: RankOpts,

        #[command(flatten)]
        output: OutputOpts,
    },

    /// Recommend drugs for a condition search
    Recommend {
        #[command(flatten)]
        data: DataOpts,

        #[command(flatten)]
        recommend: RecommendOpts,

        /// Use weighted_performance instead of performance
        #[arg(long)]
        weighted: bool,

        #[command(flatten)]
        output: OutputOpts,
    },

    /// High-performance/low-review and low-performance/high-review outliers
    Outliers {
        #[command(flatten)]
        data: DataOpts,

        #[command(flatten)]
        output: OutputOpts,
    },

    /// List disease classes and drug types in a dataset
    Classes {
        /// Review dataset CSV
        #[arg(short, long, default_value = "data/drugs.csv")]
        data: PathBuf,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Dashboard {
            data,
            rank,
            recommend,
            output,
        } => {
            let mut args = base_args(&data)?;
            apply_rank(&mut args, rank);
            apply_recommend(&mut args, recommend);
            apply_output(&mut args, output);
            run(args, Section::All)?;
        }

        Commands::Rank { data, rank, output } => {
            let mut args = base_args(&data)?;
            apply_rank(&mut args, rank);
            apply_output(&mut args, output);
            run(args, Section::TopDrugs)?;
        }

        Commands::Recommend {
            data,
            recommend,
            weighted,
            output,
        } => {
            let mut args = base_args(&data)?;
            if weighted {
                args.field = PerformanceField::Weighted;
            }
            apply_recommend(&mut args, recommend);
            apply_output(&mut args, output);
            run(args, Section::Recommendations)?;
        }

        Commands::Outliers { data, output } => {
            let mut args = base_args(&data)?;
            apply_output(&mut args, output);
            run(args, Section::Outliers)?;
        }

        Commands::Classes { data } => {
            display_classes(data)?;
        }

        Commands::Validate { file } => {
            validate_report_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}

/// Validate then execute
///
/// **Private** - shared tail of the dataset commands
fn run(args: DashboardArgs, section: Section) -> Result<()> {
    validate_args(&args, section)?;
    execute_dashboard(args, section)?;
    Ok(())
}

/// Arguments seeded from the config file, if any
fn base_args(data: &DataOpts) -> Result<DashboardArgs> {
    let config = match &data.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DashboardConfig::default(),
    };

    Ok(DashboardArgs {
        data_path: data.data.clone(),
        ..DashboardArgs::from_config(&config)
    })
}

fn apply_rank(args: &mut DashboardArgs, rank: RankOpts) {
    args.disease_class = rank.disease_class;
    if let Some(min_reviews) = rank.min_reviews {
        args.min_reviews = min_reviews;
    }
    if rank.weighted {
        args.field = PerformanceField::Weighted;
    }
}

fn apply_recommend(args: &mut DashboardArgs, recommend: RecommendOpts) {
    args.condition_search = recommend.condition;
    if !recommend.types.is_empty() {
        args.allowed_types = recommend
            .types
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
    }
    if let Some(limit) = recommend.limit {
        args.recommend_limit = limit;
    }
}

fn apply_output(args: &mut DashboardArgs, output: OutputOpts) {
    args.output_json = output.output;
    args.output_svg = output.chart;
    if let Some(title) = output.title {
        args.chart_config = args.chart_config.clone().with_title(title);
    }
    args.print_tables = !output.quiet;
}
