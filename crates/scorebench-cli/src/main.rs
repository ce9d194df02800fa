//! scorebench: generate and scale score fixtures for layout stress tests

mod config;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scorebench_core::{duplicate_score, synthesize, IdPolicy, MeasureGap, Score, ScoreStats};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::load_config;

const DEFAULT_LOG_FILTER: &str = "scorebench=info,scorebench_core=info";

#[derive(Parser, Debug)]
#[command(name = "scorebench")]
#[command(about = "Generate and scale score fixtures", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/scorebench/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a dense two-hand piano fixture from scratch
    Synth {
        /// Number of measures
        #[arg(short, long)]
        measures: Option<u32>,

        /// Notes per measure in each staff
        #[arg(short, long)]
        notes_per_measure: Option<u32>,

        /// Output path
        #[arg(short, long, default_value = "piano_dense.json")]
        output: PathBuf,
    },
    /// Append a tick-shifted copy of every voice
    Duplicate {
        /// Score to read
        #[arg(short, long)]
        input: PathBuf,

        /// Output path (default: `<input>_doubled.json`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gap in ticks between the last original note start and the copy
        #[arg(long, conflicts_with = "from_document")]
        gap: Option<u32>,

        /// Derive the gap from the document's resolution and time signature
        #[arg(long)]
        from_document: bool,

        /// Give copies the same ids as their originals
        #[arg(long)]
        preserve_ids: bool,

        /// Number of doubling passes
        #[arg(long, default_value = "1")]
        passes: u32,
    },
    /// Print statistics for a score
    Stats {
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Command::Synth { measures, notes_per_measure, output } => {
            let mut params = config.synth.pattern_params();
            if let Some(measures) = measures {
                params.measure_count = measures;
            }
            if let Some(notes) = notes_per_measure {
                params.notes_per_measure = notes;
            }

            let score = synthesize(&params)?;
            write_score(&score, &output)?;

            println!("Generated fixture:");
            println!("{}", ScoreStats::collect(&score));
            println!("\nWritten to: {}", output.display());
        }
        Command::Duplicate { input, output, gap, from_document, preserve_ids, passes } => {
            let mut score = read_score(&input)?;

            let mut options = config.duplicate.options();
            if let Some(gap) = gap {
                options.gap = MeasureGap::Fixed(gap);
            }
            if from_document {
                options.gap = MeasureGap::FromDocument;
            }
            if preserve_ids {
                options.ids = IdPolicy::Preserve;
            }

            for pass in 1..=passes {
                let report = duplicate_score(&mut score, &options)
                    .with_context(|| format!("Duplication pass {pass} failed"))?;
                tracing::info!(pass, appended = report.events_appended, "Pass complete");
            }

            let output = output.unwrap_or_else(|| doubled_path(&input));
            write_score(&score, &output)?;

            println!("Created {} from {}:", output.display(), input.display());
            println!("{}", ScoreStats::collect(&score));
        }
        Command::Stats { input } => {
            let score = read_score(&input)?;
            println!("{}:", input.display());
            println!("{}", ScoreStats::collect(&score));
        }
    }

    Ok(())
}

fn read_score(path: &Path) -> Result<Score> {
    let s = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Score::from_json_str(&s).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_score(score: &Score, path: &Path) -> Result<()> {
    fs::write(path, score.to_json_pretty()?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

fn doubled_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("score");
    input.with_file_name(format!("{stem}_doubled.json"))
}
