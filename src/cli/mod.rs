//! Command-line interface for the dataset preparation utilities.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::PrepConfig;
use crate::core::transforms::{global_to_local, Point3D};
use crate::core::writers::WriteMode;
use crate::processors::{dedup, merging};

#[derive(Parser)]
#[command(name = "dataset-prep")]
#[command(about = "Dataset preparation utilities", version)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a global point to the local frame
    Transform {
        /// Global origin as X Y Z
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        origin: Vec<f64>,
        /// Global point as X Y Z
        #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
        point: Vec<f64>,
    },

    /// Concatenate all *.txt files in a folder
    MergeText {
        /// Folder containing the text files
        input_dir: PathBuf,
        /// Output file (defaults to config, then output_file.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Concatenate the rows of all *.csv files in a folder
    MergeCsv {
        /// Folder containing the CSV files
        input_dir: PathBuf,
        /// Output file (defaults to config, then output_file.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Field delimiter
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Drop rows whose first tab-separated field was already seen
    Dedup {
        /// Tab-separated file, rewritten in place
        file: PathBuf,
        /// Replace the file by rename instead of truncating it
        #[arg(long)]
        atomic: bool,
    },
}

/// Create a spinner for indeterminate operations
fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 37 {
            let head: String = value.chars().take(34).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<37} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PrepConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}, using defaults", path.display(), e);
                PrepConfig::default()
            }
        },
        None => PrepConfig::default(),
    };

    let result = match cli.command {
        Commands::Transform { origin, point } => cmd_transform(&origin, &point),
        Commands::MergeText { input_dir, output } => {
            let output = output.unwrap_or_else(|| config.merge.text_output.clone());
            cmd_merge_text(&input_dir, &output)
        }
        Commands::MergeCsv { input_dir, output, delimiter } => {
            let output = output.unwrap_or_else(|| config.merge.csv_output.clone());
            let delimiter = delimiter.unwrap_or(config.merge.delimiter);
            cmd_merge_csv(&input_dir, &output, delimiter)
        }
        Commands::Dedup { file, atomic } => {
            let mode = if atomic {
                WriteMode::Atomic
            } else {
                config.dedup.write_mode()
            };
            cmd_dedup(&file, mode)
        }
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn cmd_transform(origin: &[f64], point: &[f64]) -> Result<()> {
    let origin = to_point(origin).context("--origin needs exactly three values")?;
    let point = to_point(point).context("--point needs exactly three values")?;

    let local = global_to_local(origin, point);

    print_summary(
        "Global to Local",
        &[
            ("Global origin", format_point(origin)),
            ("Global point", format_point(point)),
            ("Local point", format_point(local)),
        ],
    );
    Ok(())
}

fn to_point(values: &[f64]) -> Option<Point3D> {
    match *values {
        [x, y, z] => Some(Point3D::new(x, y, z)),
        _ => None,
    }
}

fn format_point(p: Point3D) -> String {
    format!("({}, {}, {})", p.x, p.y, p.z)
}

fn cmd_merge_text(input_dir: &Path, output: &Path) -> Result<()> {
    let start = Instant::now();
    let spinner = create_spinner("Merging text files...");

    let report = merging::merge_text(input_dir, output);
    spinner.finish_and_clear();
    let report = report
        .with_context(|| format!("Text merge of {} failed", input_dir.display()))?;

    print_summary(
        "Text Merge Complete",
        &[
            ("Input directory", input_dir.display().to_string()),
            ("Output file", report.output.display().to_string()),
            ("Files merged", report.files.len().to_string()),
            ("Bytes written", report.records.to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_merge_csv(input_dir: &Path, output: &Path, delimiter: char) -> Result<()> {
    let start = Instant::now();
    let spinner = create_spinner("Merging CSV files...");

    let report = merging::merge_csv(input_dir, output, delimiter);
    spinner.finish_and_clear();
    let report = report
        .with_context(|| format!("CSV merge of {} failed", input_dir.display()))?;

    print_summary(
        "CSV Merge Complete",
        &[
            ("Input directory", input_dir.display().to_string()),
            ("Output file", report.output.display().to_string()),
            ("Files merged", report.files.len().to_string()),
            ("Rows written", report.records.to_string()),
            ("Delimiter", format!("{:?}", delimiter)),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}

fn cmd_dedup(file: &Path, mode: WriteMode) -> Result<()> {
    let start = Instant::now();
    let spinner = create_spinner("Removing duplicate rows...");

    let report = dedup::remove_duplicates_with(file, mode);
    spinner.finish_and_clear();
    let report = report.with_context(|| format!("Deduplication of {} failed", file.display()))?;

    print_summary(
        "Deduplication Complete",
        &[
            ("File", report.path.display().to_string()),
            ("Rows kept", report.kept.to_string()),
            ("Rows dropped", report.dropped.to_string()),
            ("Atomic write", (mode == WriteMode::Atomic).to_string()),
            ("Duration", format!("{:.2?}", start.elapsed())),
        ],
    );
    Ok(())
}
