use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use ldasweep::config::Config;
use ldasweep::data::corpus::Vectorizer;
use ldasweep::evaluate::metrics::{parse_metrics, Metric, MetricOptions};
use ldasweep::evaluate::params::{default_topic_counts, parse_topic_counts, ConstParams};
use ldasweep::evaluate::results::ModelSelection;
use ldasweep::evaluate::sweep::EvalOptions;
use ldasweep::output::archive::load_results;
use ldasweep::output::summary::SummaryOptions;
use ldasweep::pipeline::evaluation::{self, SweepSettings};
use ldasweep::pipeline::finalize;

/// ldasweep: LDA topic model evaluation.
///
/// Fits LDA models over a range of topic counts, scores each with several
/// quality metrics, plots the results and exports the model you pick.
#[derive(Parser)]
#[command(name = "ldasweep", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download the Reuters sample dataset
    DownloadData,

    /// Build a dataset from a directory of .txt files (one document per file)
    Vectorize {
        /// Directory containing the text files
        input_dir: std::path::PathBuf,

        /// Dataset name (default: the configured dataset)
        #[arg(long)]
        name: Option<String>,

        /// Drop terms occurring in fewer documents than this
        #[arg(long, default_value = "1")]
        min_df: usize,
    },

    /// Evaluate topic models over a range of topic counts
    Evaluate(EvaluateArgs),

    /// Select a model from the last evaluation, export and summarize it
    Finalize(FinalizeArgs),

    /// Evaluate, then finalize
    Run {
        #[command(flatten)]
        sweep: EvaluateArgs,

        #[command(flatten)]
        pick: FinalizeArgs,
    },

    /// Show pipeline status (dataset, last evaluation, exported model)
    Status,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Topic counts, e.g. `10,20,40..100:20` (default: 10 to 500)
    #[arg(long)]
    ks: Option<String>,

    /// Gibbs sampling iterations per model
    #[arg(long, default_value = "1500")]
    n_iter: usize,

    /// Topic-word prior (beta)
    #[arg(long, default_value = "0.1")]
    eta: f64,

    /// Random seed shared by all models
    #[arg(long, default_value = "1")]
    seed: u64,

    /// Record the log-likelihood every N iterations
    #[arg(long, default_value = "10")]
    refresh: usize,

    /// Comma-separated metrics (default: loglikelihood,cao_juan_2009,arun_2010,coherence_mimno_2011)
    #[arg(long)]
    metrics: Option<String>,

    /// Models fitted in parallel (default: LDASWEEP_WORKERS or all cores)
    #[arg(long)]
    workers: Option<usize>,

    /// Do not keep fitted models in the results archive
    #[arg(long)]
    no_models: bool,
}

#[derive(Args)]
struct FinalizeArgs {
    /// Pick the model with this number of topics
    #[arg(long, conflicts_with = "best_by")]
    n_topics: Option<usize>,

    /// Pick the best model under this metric
    #[arg(long)]
    best_by: Option<Metric>,

    /// Top words to show per topic
    #[arg(long, default_value = "10")]
    top_words: usize,

    /// Top topics to show per document
    #[arg(long, default_value = "3")]
    top_topics: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;

    // Set up structured logging; RUST_LOG wins over LDASWEEP_LOG
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::DownloadData => {
            println!("Downloading Reuters dataset...");
            println!("  Destination: {}", config.data_dir.display());
            ldasweep::data::download::download_reuters(&config.data_dir).await?;
            println!("\n{}", "Dataset downloaded successfully.".bold());
            println!("You can now run `ldasweep evaluate`.");
        }

        Commands::Vectorize {
            input_dir,
            name,
            min_df,
        } => {
            let name = name.unwrap_or_else(|| config.dataset.clone());
            println!("Vectorizing documents in {}...", input_dir.display());
            let dataset = Vectorizer::new(min_df, 2).vectorize_dir(&name, &input_dir)?;
            dataset.save(&config.data_dir)?;
            println!(
                "  {} documents, vocab size {}",
                dataset.doc_labels.len(),
                dataset.vocab.len()
            );
            println!("\n{}", format!("Dataset '{name}' saved.").bold());
            if name != config.dataset {
                println!("Set LDASWEEP_DATASET={name} to evaluate it.");
            }
        }

        Commands::Evaluate(args) => {
            let settings = sweep_settings(&args, &config)?;
            evaluation::run(&config, &settings).await?;
            println!("\n{}", "Evaluation complete.".bold());
            println!("Inspect the plot, then run `ldasweep finalize --n-topics <k>`.");
        }

        Commands::Finalize(args) => {
            config.require_results()?;
            let results = load_results(&config.results_path())?;
            let selection = model_selection(&args)?;
            finalize::run(&config, &results, &selection, &summary_options(&args))?;
            println!("\n{}", "Done.".bold());
        }

        Commands::Run { sweep, pick } => {
            let settings = sweep_settings(&sweep, &config)?;
            if sweep.no_models {
                anyhow::bail!("`ldasweep run` needs the fitted models; drop --no-models.");
            }
            // Validate the selection before spending time on the sweep
            let selection = model_selection(&pick)?;
            let results = evaluation::run(&config, &settings).await?;
            finalize::run(&config, &results, &selection, &summary_options(&pick))?;
            println!("\n{}", "Done.".bold());
        }

        Commands::Status => {
            ldasweep::status::show(&config)?;
        }
    }

    Ok(())
}

fn sweep_settings(args: &EvaluateArgs, config: &Config) -> Result<SweepSettings> {
    let topic_counts = match &args.ks {
        Some(list) => parse_topic_counts(list)?,
        None => default_topic_counts(),
    };
    let metrics = match &args.metrics {
        Some(list) => parse_metrics(list)?,
        None => Metric::defaults(),
    };
    let workers = args.workers.unwrap_or(config.workers);
    if workers == 0 {
        anyhow::bail!("--workers must be at least 1");
    }

    info!(
        models = topic_counts.len(),
        workers,
        n_iter = args.n_iter,
        "Sweep configured"
    );

    Ok(SweepSettings {
        topic_counts,
        consts: ConstParams {
            eta: args.eta,
            n_iter: args.n_iter,
            random_state: args.seed,
            refresh: args.refresh,
        },
        options: EvalOptions {
            metrics,
            metric_options: MetricOptions::default(),
            workers,
            return_models: !args.no_models,
            show_progress: true,
        },
    })
}

/// `--n-topics` picks a specific model; otherwise `--best-by` (default arun_2010).
fn model_selection(args: &FinalizeArgs) -> Result<ModelSelection> {
    Ok(match (args.n_topics, args.best_by) {
        (Some(0), _) => anyhow::bail!("--n-topics must be at least 1"),
        (Some(k), _) => ModelSelection::NTopics(k),
        (None, Some(metric)) => ModelSelection::BestBy(metric),
        (None, None) => ModelSelection::BestBy(Metric::Arun2010),
    })
}

fn summary_options(args: &FinalizeArgs) -> SummaryOptions {
    SummaryOptions {
        top_topics_per_doc: args.top_topics,
        top_words_per_topic: args.top_words,
    }
}
