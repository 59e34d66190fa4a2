use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

use trainforge::config::AppConfig;
use trainforge::duration::DurationRange;
use trainforge::export::{ExportArtifact, ExportFormat, ExportManager};
use trainforge::generator::{try_generate_workout, COOLDOWN_MINUTES, WARMUP_MINUTES};
use trainforge::logging::{init_logging, log_error};
use trainforge::models::{Step, WorkoutRequest, WorkoutType};
use trainforge::{biased_workout, parse_pattern_payload, EngineError, LoadSummary, PatternPayload, ZoneCalculator};

/// trainforge - Structured Workout Generator
///
/// Builds interval sessions from a catalog of effort patterns, scales them to
/// your FTP, and exports them as .zwo, JSON or plain text with consistent
/// training-load numbers.
#[derive(Parser)]
#[command(name = "trainforge")]
#[command(version)]
#[command(about = "Structured workout generator", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a workout
    Generate {
        /// Functional threshold power in watts (config default if omitted)
        #[arg(long)]
        ftp: Option<u32>,

        /// Workout type (recovery, endurance, tempo, threshold, vo2max, anaerobic)
        #[arg(short = 't', long = "type")]
        workout_type: WorkoutType,

        /// Duration range (short, medium, long, extended, epic)
        #[arg(short, long, default_value = "medium")]
        range: DurationRange,

        /// Intensity bias in percent (config default if omitted)
        #[arg(short, long, allow_hyphen_values = true)]
        bias: Option<i32>,

        /// Signature of the previous workout, to avoid an immediate repeat
        #[arg(short, long)]
        previous: Option<String>,

        /// Export format (zwo, json, text, all)
        #[arg(short = 'f', long)]
        format: Option<String>,

        /// Write exports into this directory instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for reproducible variant selection
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Inspect the pattern catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },

    /// Show the power zone table for an FTP
    Zones {
        /// Functional threshold power in watts (config default if omitted)
        #[arg(long)]
        ftp: Option<u32>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List variants and the duration ranges they fit
    List {
        /// Only show one workout type
        #[arg(short = 't', long = "type")]
        workout_type: Option<WorkoutType>,
    },
    /// Validate a pattern payload file
    Validate {
        file: PathBuf,
    },
    /// Print the bundled catalog as a pattern payload
    Dump,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let mut log_config = config.logging.clone();
    log_config.level = log_config.level.with_verbosity(cli.verbose);
    init_logging(&log_config).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Generate {
            ftp,
            workout_type,
            range,
            bias,
            previous,
            format,
            output,
            seed,
        } => {
            let request = WorkoutRequest::new(
                ftp.unwrap_or(config.generator.default_ftp),
                workout_type,
                range,
            );
            let bias = bias.unwrap_or(config.generator.default_bias_pct);
            let options = GenerateOptions {
                previous: previous.as_deref(),
                format: format.as_deref(),
                output: output.as_deref(),
                seed,
            };
            run_generate(&config, &request, bias, options)?;
        }

        Commands::Catalog { action } => match action {
            CatalogAction::List { workout_type } => {
                let load = config.load_patterns()?;
                if let Some(reason) = &load.fallback_reason {
                    eprintln!("{} {}", "⚠".yellow(), reason);
                }
                print_catalog(&load.payload, workout_type);
            }
            CatalogAction::Validate { file } => {
                let json = fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read pattern file: {}", file.display()))?;
                match parse_pattern_payload(&json) {
                    Ok(payload) => println!(
                        "{} {} (version {}, {} variants)",
                        "✓".green(),
                        file.display(),
                        payload.version,
                        payload.patterns.variant_count()
                    ),
                    Err(err) => {
                        println!("{} {}", "✗".red(), err);
                        std::process::exit(1);
                    }
                }
            }
            CatalogAction::Dump => {
                println!("{}", PatternPayload::bundled().to_json()?);
            }
        },

        Commands::Zones { ftp } => {
            let ftp = ftp.unwrap_or(config.generator.default_ftp);
            println!("{}", format!("Power zones for FTP {} W", ftp).bold());
            for boundary in ZoneCalculator::power_zones(ftp) {
                let watts = match boundary.max_watts {
                    Some(max) => format!("{}-{} W", boundary.min_watts, max),
                    None => format!("{}+ W", boundary.min_watts),
                };
                println!("  {:<16} {}", boundary.zone.to_string(), watts);
            }
        }

        Commands::Config { action } => {
            let path = cli.config.unwrap_or_else(AppConfig::default_config_path);
            match action {
                ConfigAction::Show => {
                    println!("{}", format!("# {}", path.display()).dimmed());
                    println!("{}", toml::to_string_pretty(&config)?);
                }
                ConfigAction::Init { force } => {
                    if path.exists() && !force {
                        anyhow::bail!(
                            "Config file already exists: {} (use --force to overwrite)",
                            path.display()
                        );
                    }
                    AppConfig::default().save_to_file(&path)?;
                    println!("{} Wrote {}", "✓".green(), path.display());
                }
            }
        }
    }

    Ok(())
}

struct GenerateOptions<'a> {
    previous: Option<&'a str>,
    format: Option<&'a str>,
    output: Option<&'a Path>,
    seed: Option<u64>,
}

fn run_generate(config: &AppConfig, request: &WorkoutRequest, bias: i32, options: GenerateOptions<'_>) -> Result<()> {
    let load = config.load_patterns()?;
    if let Some(reason) = &load.fallback_reason {
        eprintln!("{} {}", "⚠".yellow(), reason);
    }

    let mut rng: Box<dyn RngCore> = match options.seed {
        Some(seed) => Box::new(StdRng::seed_from_u64(seed)),
        None => Box::new(rand::thread_rng()),
    };

    let workout = match try_generate_workout(&load.payload.patterns, request, options.previous, rng.as_mut()) {
        Ok(workout) => workout,
        Err(err) => {
            log_error(&err);
            eprintln!("{} {}", "✗".red(), err.user_message());
            if let EngineError::NoFittingVariant { .. } = err {
                std::process::exit(2);
            }
            return Err(err.into());
        }
    };

    let manager = ExportManager::new(config.export.author.clone());
    let artifacts: Vec<ExportArtifact> = match options.format {
        None => Vec::new(),
        Some("all") => manager.export_all(&workout, bias)?,
        Some(name) => vec![manager.export(&workout, bias, ExportFormat::from_str(name)?)?],
    };

    if artifacts.is_empty() || options.output.is_some() {
        print_workout(&workout, bias);
    }

    if let Some(dir) = options.output {
        for path in manager.write_to_dir(&artifacts, dir)? {
            println!("{} {}", "✓ Wrote".green(), path.display());
        }
    } else {
        for artifact in &artifacts {
            println!("{}", artifact.content);
        }
    }

    Ok(())
}

fn print_workout(workout: &trainforge::Workout, bias: i32) {
    let summary = LoadSummary::compute(workout, bias);
    let shown = biased_workout(workout, bias);

    println!("{}", shown.title.bold());
    println!(
        "  FTP {} W • Bias {}% • Zone {}",
        workout.ftp, summary.bias_pct, summary.zone
    );
    println!();

    for (index, step) in shown.steps.iter().enumerate() {
        let power = match step {
            Step::Ramp { from, to, .. } => format!("{}→{} W", from, to),
            Step::Steady { intensity, .. } => format!("{} W", intensity),
        };
        let line = format!(
            "  {:>2}. {:>3}'  {:<12} {}",
            index + 1,
            step.minutes(),
            power,
            step.description()
        );
        match step.phase() {
            trainforge::Phase::Work => println!("{}", line.red()),
            trainforge::Phase::Recovery => println!("{}", line.green()),
            _ => println!("{}", line.dimmed()),
        }
    }

    println!();
    println!(
        "  Total {}' • Avg {} W • NP {} W • IF {:.2} • TSS {}",
        summary.total_minutes,
        summary.avg_intensity,
        summary.normalized_power,
        summary.intensity_factor(workout.ftp),
        summary.tss
    );
    println!("  {} {}", "Signature:".dimmed(), workout.signature.dimmed());
    if let Some(hint) = &workout.hint {
        println!("  {} {}", "Hint:".yellow(), hint);
    }
}

fn print_catalog(payload: &PatternPayload, only: Option<WorkoutType>) {
    let padding = WARMUP_MINUTES + COOLDOWN_MINUTES;
    println!("{}", format!("Pattern catalog {}", payload.version).bold());

    for (workout_type, variants) in payload.patterns.categories() {
        if only.is_some_and(|wanted| wanted != workout_type) {
            continue;
        }
        println!();
        println!("{}", workout_type.display_name().cyan().bold());
        for (index, variant) in variants.iter().enumerate() {
            let total = padding.saturating_add(variant.total_minutes());
            let fits = DurationRange::for_minutes(total)
                .map(|range| range.to_string())
                .unwrap_or_else(|| "none".to_string());
            let work = variant
                .blocks()
                .iter()
                .filter(|block| block.phase() == trainforge::Phase::Work)
                .count();
            println!(
                "  {:>2}. {:>3}' total  {:>2} work blocks  fits {}",
                index + 1,
                total,
                work,
                fits
            );
        }
    }
}
