use chrono::Local;
use clap::{Parser, Subcommand};
use focal_stats::analyze;
use focal_stats::config::{self, AnalyzerConfig, ConfigError};
use focal_stats::crop_factors::CropFactorTable;
use focal_stats::engine::FocalEngine;
use focal_stats::exif::ExifReader;
use focal_stats::output;
use focal_stats::prompt::StdConsole;
use focal_stats::report::{self, ReportInput, RunLayout};
use focal_stats::resolver::{Interaction, MissingDataResolver};
use focal_stats::stats::{self, EmptyInput};
use focal_stats::store::ElicitedStore;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

fn version_string() -> &'static str {
    let describe = env!("FOCAL_STATS_DESCRIBE");
    if describe.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup; called exactly once
        Box::leak(format!("{} ({describe})", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

#[derive(Parser)]
#[command(name = "focal-stats")]
#[command(about = "Which focal lengths do you actually shoot?")]
#[command(long_about = "\
Which focal lengths do you actually shoot?

Reads the focal length and camera model from every photo in a folder,
converts it to a 35mm-equivalent focal length using the camera's crop
factor, and counts how often each focal range and each exact focal length
was used.

Pipeline:

  photos/ ──scan──▶ EXIF focal length × crop factor ──▶ focal group
                    │
                    └─ no focal length ──▶ ask once, remember the answer

Files (paths relative to the working directory, configurable):

  focal-stats.toml              # Optional config
  camera_crop_factors.json      # {\"ilce-6400\": 1.5, ...} (unlisted = 1.0)
  missing_exif_data.json        # Answers you typed, reused next run
  outputs/<YYYYmmddHHMMSS>/     # One report folder per run
      focal_length_details.csv
      focal_length_analysis.json
      focal_length_chart.txt

Run 'focal-stats gen-config' to generate a documented focal-stats.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: focal-stats.toml in the working directory, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze every photo in a folder and write a report
    Analyze {
        /// Folder to scan recursively
        dir: PathBuf,
        /// Never ask; skip photos without a focal length unless answered before
        #[arg(long)]
        no_prompt: bool,
        /// Where to create the timestamped report folder (overrides config)
        #[arg(long)]
        output_root: Option<PathBuf>,
    },
    /// List photos that would need a manual focal length, without asking
    Check {
        /// Folder to scan recursively
        dir: PathBuf,
    },
    /// Print a stock focal-stats.toml with all options documented
    GenConfig,
    /// List the focal lengths entered manually in earlier runs
    Elicited,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Analyze {
            dir,
            no_prompt,
            output_root,
        } => {
            let config = load_cli_config(cli.config.as_deref())?;
            let engine = build_engine(&config);
            let started = Local::now().naive_local();
            let mut console = StdConsole::stdio();
            let interaction = if no_prompt {
                Interaction::Disabled
            } else {
                Interaction::Prompt(&mut console)
            };
            let mut resolver =
                MissingDataResolver::new(ElicitedStore::load(config.elicited_data_path()), interaction);

            println!("==> Analyzing {}", dir.display());
            let run = analyze::analyze_folder(
                &dir,
                &config.normalized_extensions(),
                &engine,
                &ExifReader::new(),
                &mut resolver,
                &mut |event| output::print_analyze_event(&event),
            )?;
            println!();
            output::print_run_summary(&run.tally);

            let result = match stats::aggregate(&run.records, engine.groups()) {
                Ok(result) => result,
                Err(EmptyInput) => {
                    println!("==> Nothing to analyze");
                    return Ok(());
                }
            };
            println!();
            output::print_statistics(&result);
            println!();
            output::print_chart(&result);

            let root = output_root.unwrap_or_else(|| config.output_root_path());
            let layout = RunLayout::timestamped(&root, started);
            let files = report::write_report(
                &layout,
                &ReportInput {
                    source_folder: &dir,
                    generated_at: started,
                    records: &run.records,
                    tally: &run.tally,
                    result: &result,
                },
            )?;
            println!();
            output::print_report_files(&files);
        }
        Command::Check { dir } => {
            let config = load_cli_config(cli.config.as_deref())?;
            let engine = build_engine(&config);
            let store = ElicitedStore::load(config.elicited_data_path());
            println!("==> Checking {}", dir.display());
            let report = analyze::check_folder(
                &dir,
                &config.normalized_extensions(),
                &engine,
                &ExifReader::new(),
                &store,
            )?;
            output::print_check_report(&report);
        }
        Command::Elicited => {
            let config = load_cli_config(cli.config.as_deref())?;
            let store = ElicitedStore::load(config.elicited_data_path());
            output::print_elicited(&store);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr so they never mix with prompts and reports.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "focal_stats=warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// An explicit `--config` must exist; the default file is optional.
fn load_cli_config(path: Option<&Path>) -> Result<AnalyzerConfig, ConfigError> {
    match path {
        Some(path) if !path.exists() => Err(ConfigError::Validation(format!(
            "config file not found: {}",
            path.display()
        ))),
        Some(path) => config::load_config(path),
        None => config::load_config(Path::new(config::DEFAULT_CONFIG_FILE)),
    }
}

fn build_engine(config: &AnalyzerConfig) -> FocalEngine {
    let crop_factors = CropFactorTable::load(&config.crop_factors_path());
    FocalEngine::new(crop_factors, config.focal_group_table())
}
