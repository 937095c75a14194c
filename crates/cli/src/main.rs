//! ragscope CLI - retrieval ranking and evaluation
//!
//! This binary provides the command-line interface for evaluating and
//! querying a vector-store-backed retrieval pipeline.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ragscope::search::format_results;
use ragscope::{run_compare, run_evaluate, run_search, SearchOptions};
use ragscope_core::config::Config;
use ragscope_evals::comparison::DEFAULT_PROFILE_MIN_SIMILARITY;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Parser)]
#[command(name = "ragscope")]
#[command(about = "Retrieval ranking and IR evaluation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate retrieval quality over a test-query file
    Evaluate {
        /// JSON file of test queries
        #[arg(short, long, default_value = "test_queries.json")]
        queries: PathBuf,

        /// Keep only the first chunk of each source
        #[arg(long)]
        deduplicate: bool,

        /// Drop results below this similarity
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Directory for the JSON and Markdown reports
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// Compare baseline, deduplication, threshold and combined retrieval
    Compare {
        /// JSON file of test queries
        #[arg(short, long, default_value = "test_queries.json")]
        queries: PathBuf,

        /// Threshold used by the threshold and combined profiles
        #[arg(long, default_value_t = DEFAULT_PROFILE_MIN_SIMILARITY)]
        min_similarity: f64,

        /// Directory for the comparison files
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long)]
        no_progress: bool,
    },
    /// Retrieve ranked chunks for a single query
    Search {
        /// Query text
        query: String,

        /// Number of chunks to retrieve
        #[arg(short, default_value_t = 5)]
        k: usize,

        /// Drop results below this similarity
        #[arg(long, default_value_t = 0.0)]
        min_similarity: f64,

        /// Cap on the number of results shown (0 for no cap)
        #[arg(long)]
        max_results: Option<usize>,

        /// Return at most one chunk per source
        #[arg(long)]
        unique_sources: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let Some(command) = cli.command else {
        println!("Run 'ragscope evaluate' to score retrieval quality, or --help for more options");
        return Ok(());
    };

    let mut config = load_config(cli.config.as_deref())?;

    match command {
        Commands::Evaluate {
            queries,
            deduplicate,
            min_similarity,
            output_dir,
            no_progress,
        } => {
            if deduplicate {
                config.retrieval.deduplicate = true;
            }
            if let Some(min) = min_similarity {
                config.retrieval.min_similarity = min;
            }
            apply_output_dir(&mut config, output_dir);
            config.validate()?;

            run_evaluate(&config, &queries, !no_progress).await?;
            println!("\nResults saved to:");
            println!("  - {}", config.output.results_path().display());
            println!("  - {}", config.output.report_path().display());
            Ok(())
        }
        Commands::Compare {
            queries,
            min_similarity,
            output_dir,
            no_progress,
        } => {
            apply_output_dir(&mut config, output_dir);
            config.validate()?;
            run_compare(&config, &queries, min_similarity, !no_progress).await?;
            Ok(())
        }
        Commands::Search {
            query,
            k,
            min_similarity,
            max_results,
            unique_sources,
        } => {
            config.validate()?;
            let options = SearchOptions {
                min_similarity,
                max_results,
                unique_sources,
            };
            let results = run_search(&config, &query, k, &options).await?;
            println!("{}", format_results(&query, &results));
            Ok(())
        }
    }
}

/// Initialize logging system
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ragscope={level},ragscope_core={level},ragscope_storage={level},\
             ragscope_retrieval={level},ragscope_evals={level}"
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Load configuration from the given file or the global config path
fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let config = Config::load(config_path).context("Failed to load configuration")?;
    debug!("Loaded configuration: {config:?}");
    Ok(config)
}

fn apply_output_dir(config: &mut Config, output_dir: Option<PathBuf>) {
    if let Some(dir) = output_dir {
        config.output.directory = dir.to_string_lossy().into_owned();
    }
}
