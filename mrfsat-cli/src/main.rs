//! MRFSAT CLI - Satisfiability prediction from structural cluster features

mod analyzer;
mod format;
mod prepare;
mod processor;
mod train;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use format::eprintln_colored;

/// Analyzer used when neither a flag nor the config file names one
const DEFAULT_ANALYZER: &str = "build/mrfsat";

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct CliConfig {
    /// Default model path
    #[serde(default)]
    model: Option<PathBuf>,
    /// Default analyzer executable
    #[serde(default)]
    analyzer: Option<PathBuf>,
    /// Default analyzer layout
    #[serde(default)]
    schema: Option<String>,
    /// Default verbosity level
    #[serde(default)]
    verbosity: Option<String>,
    /// Enable colors by default
    #[serde(default)]
    color: Option<bool>,
}

impl CliConfig {
    /// Load configuration from file
    fn load() -> Self {
        let config_path = dirs::home_dir()
            .map(|mut p| {
                p.push(".mrfsatrc");
                p
            })
            .filter(|p| p.exists())
            .or_else(|| {
                dirs::config_dir().map(|mut p| {
                    p.push("mrfsat");
                    p.push("config.yaml");
                    p
                })
            });

        if let Some(path) = config_path
            && path.exists()
            && let Ok(contents) = fs::read_to_string(&path)
        {
            match serde_yaml::from_str(&contents) {
                Ok(config) => return config,
                Err(e) => eprintln!("Ignoring malformed config '{}': {}", path.display(), e),
            }
        }

        Self::default()
    }

    /// Merge configuration with command-line arguments
    fn merge_with_args(&self, args: &mut Args) {
        // Only apply config if arg is not explicitly set
        if args.verbosity == Verbosity::Normal
            && let Some(ref v) = self.verbosity
            && let Ok(v) = Verbosity::from_str(v, true)
        {
            args.verbosity = v;
        }

        if let Some(color) = self.color
            && !color
        {
            args.no_color = true;
        }

        if let Command::Predict(ref mut predict) = args.command {
            if predict.model.is_none() {
                predict.model.clone_from(&self.model);
            }
            if predict.analyzer.is_none() {
                predict.analyzer.clone_from(&self.analyzer);
            }
            if predict.schema.is_none()
                && let Some(ref s) = self.schema
                && let Ok(s) = SchemaVersion::from_str(s, true)
            {
                predict.schema = Some(s);
            }
        }
    }
}

/// Verbosity level
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    /// No output except results
    Quiet,
    /// Minimal output
    Normal,
    /// Detailed output
    Verbose,
    /// Debug output
    Debug,
    /// Trace output
    Trace,
}

/// Analyzer output layout
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum SchemaVersion {
    /// Counts plus freedom and strength statistics
    Canonical,
    /// Counts plus freedom statistics only
    Legacy,
}

impl SchemaVersion {
    fn as_str(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::Legacy => "legacy",
        }
    }
}

/// Output format for predictions
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    /// Human-readable lines (default)
    Text,
    /// One JSON object per instance
    Json,
}

/// MRFSAT - predict satisfiability of SAT and pseudo-Boolean instances
#[derive(Parser, Debug, Clone)]
#[command(name = "mrfsat")]
#[command(version)]
#[command(about = "Predict satisfiability from structural cluster features")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level
    #[arg(short, long, value_enum, default_value = "normal", global = true)]
    verbosity: Verbosity,

    /// Enable quiet mode (equivalent to --verbosity quiet)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Classify instances with a trained model
    Predict(PredictArgs),
    /// Build a training dataset from analyzer exports
    Prepare(PrepareArgs),
    /// Train a random forest on a prepared dataset
    Train(TrainArgs),
}

#[derive(clap::Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("input").required(true).args(["file", "dir"])))]
struct PredictArgs {
    /// Instance file(s) to classify
    #[arg(short, long, value_name = "FILE")]
    file: Vec<PathBuf>,

    /// Directory of instances to classify
    #[arg(short, long, value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Recurse into subdirectories of --dir
    #[arg(short = 'R', long)]
    recursive: bool,

    /// Serialized model (JSON)
    #[arg(short, long, value_name = "PATH")]
    model: Option<PathBuf>,

    /// Structural analyzer executable
    #[arg(short, long, value_name = "PATH")]
    analyzer: Option<PathBuf>,

    /// Analyzer output layout
    #[arg(long, value_enum)]
    schema: Option<SchemaVersion>,

    /// Features the model was trained on (defaults follow --schema)
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// Treat undefined cluster ratios as zero instead of skipping the instance
    #[arg(long)]
    zero_fill: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(clap::Args, Debug, Clone)]
struct PrepareArgs {
    /// Headerless analyzer export
    #[arg(long, value_name = "CSV")]
    export: PathBuf,

    /// Baseline labels (name,is_sat)
    #[arg(long, value_name = "CSV")]
    baseline: PathBuf,

    /// Decision/optimization mapping (name,dec_opt)
    #[arg(long, value_name = "CSV")]
    dec_opt: PathBuf,

    /// Family mapping (name,family)
    #[arg(long, value_name = "CSV")]
    family: PathBuf,

    /// Headered third-party feature export to align with
    #[arg(long, value_name = "CSV")]
    secondary: Option<PathBuf>,

    /// Where to write the aligned secondary dataset
    #[arg(long, value_name = "CSV", requires = "secondary")]
    secondary_output: Option<PathBuf>,

    /// Pipeline configuration (YAML)
    #[arg(long, value_name = "YAML")]
    config: Option<PathBuf>,

    /// Balancing seed
    #[arg(long)]
    seed: Option<u64>,

    /// Prepared dataset output
    #[arg(short, long, value_name = "CSV")]
    output: PathBuf,
}

#[derive(clap::Args, Debug, Clone)]
struct TrainArgs {
    /// Prepared dataset
    #[arg(long, value_name = "CSV")]
    dataset: PathBuf,

    /// Model output (JSON)
    #[arg(short, long, value_name = "PATH")]
    output: PathBuf,

    /// Feature columns
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// Number of trees
    #[arg(long, default_value = "100")]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value = "12")]
    max_depth: usize,

    /// Random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_fraction: f64,

    /// Standardize features before fitting
    #[arg(long)]
    standardize: bool,
}

fn main() {
    let mut args = Args::parse();

    // Load configuration file and merge with args
    let config = CliConfig::load();
    config.merge_with_args(&mut args);

    // Determine verbosity level
    let verbosity = if args.quiet {
        Verbosity::Quiet
    } else {
        args.verbosity
    };

    // Set up logging
    if verbosity >= Verbosity::Verbose {
        let level = match verbosity {
            Verbosity::Trace => Level::TRACE,
            Verbosity::Debug => Level::DEBUG,
            _ => Level::INFO,
        };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .with_ansi(!args.no_color)
            .finish();
        if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
            eprintln_colored(&args, &format!("Failed to set tracing subscriber: {}", e));
            std::process::exit(1);
        }
    }

    let result = match &args.command {
        Command::Predict(predict) => processor::run_predict(&args, predict, verbosity),
        Command::Prepare(prepare) => prepare::run_prepare(&args, prepare, verbosity),
        Command::Train(train) => train::run_train(&args, train, verbosity),
    };

    if let Err(e) = result {
        eprintln_colored(&args, &format!("Error: {:#}", e));
        std::process::exit(1);
    }
}
