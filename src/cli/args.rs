//! Command line argument parsing for the Paideia CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Paideia - prediction services for an adaptive tutoring product
#[derive(Parser, Debug, Clone)]
#[command(name = "paideia")]
#[command(about = "Query understanding and adaptive next-step recommendation")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct PaideiaArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PaideiaArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Output format for command results
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    Human,
    /// JSON
    Json,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Generate a synthetic training dataset
    #[command(name = "generate-data")]
    GenerateData(GenerateDataArgs),

    /// Train the query understanding model
    #[command(name = "train-query")]
    TrainQuery(TrainQueryArgs),

    /// Train the adaptive recommendation model
    #[command(name = "train-adaptive")]
    TrainAdaptive(TrainAdaptiveArgs),

    /// Analyze a student query
    Analyze(AnalyzeArgs),

    /// Recommend the next learning step for a student state
    Recommend(RecommendArgs),
}

/// Which synthetic dataset to generate
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Labeled student queries
    Queries,
    /// Simulated student interaction histories
    Interactions,
}

/// Arguments for generating synthetic data
#[derive(Parser, Debug, Clone)]
pub struct GenerateDataArgs {
    /// Dataset kind
    #[arg(value_name = "KIND")]
    pub kind: DataKind,

    /// Output file path (JSON)
    #[arg(value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    /// Number of query rows (queries only)
    #[arg(short, long, default_value = "2000")]
    pub count: usize,

    /// Number of simulated students (interactions only)
    #[arg(long, default_value = "100")]
    pub students: usize,

    /// Interactions per student (interactions only)
    #[arg(long, default_value = "20")]
    pub steps: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for training the query model
#[derive(Parser, Debug, Clone)]
pub struct TrainQueryArgs {
    /// Training data file (JSON array of query samples)
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Where to persist the trained bundle
    #[arg(short, long, default_value = "models/query_bundle.json")]
    pub bundle_path: PathBuf,

    /// Number of trees per classification head
    #[arg(long, default_value = "100")]
    pub trees: usize,

    /// Text embedding dimension
    #[arg(long, default_value = "256")]
    pub dimension: usize,

    /// Training seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for training the adaptive model
#[derive(Parser, Debug, Clone)]
pub struct TrainAdaptiveArgs {
    /// Training data file (JSON array of interaction samples)
    #[arg(value_name = "DATA_FILE")]
    pub data_file: PathBuf,

    /// Where to persist the trained bundle
    #[arg(short, long, default_value = "models/adaptive_bundle.json")]
    pub bundle_path: PathBuf,

    /// Number of trees per classification head
    #[arg(long, default_value = "100")]
    pub trees: usize,

    /// Training seed
    #[arg(long, default_value = "42")]
    pub seed: u64,
}

/// Arguments for analyzing a query
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// The student query to analyze
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Trained bundle to serve from
    #[arg(short, long, default_value = "models/query_bundle.json")]
    pub bundle_path: PathBuf,

    /// Text embedding dimension (must match training)
    #[arg(long, default_value = "256")]
    pub dimension: usize,
}

/// Arguments for recommending the next learning step
#[derive(Parser, Debug, Clone)]
pub struct RecommendArgs {
    /// Current topic
    #[arg(long)]
    pub topic: String,

    /// Current difficulty level
    #[arg(long)]
    pub difficulty: String,

    /// Latest assessment score (0-100)
    #[arg(long)]
    pub score: f64,

    /// Attempts taken (at least 1)
    #[arg(long, default_value = "1")]
    pub attempts: u32,

    /// Minutes spent
    #[arg(long, default_value = "10")]
    pub time_spent: f64,

    /// Trained bundle to serve from
    #[arg(short, long, default_value = "models/adaptive_bundle.json")]
    pub bundle_path: PathBuf,
}
