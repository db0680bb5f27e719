//! envrisk CLI - environmental risk scoring for site tables

// Global invariants enforced:
// - Output order equals input order unless --sort is given
// - Identical input yields byte-for-byte identical output

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use envrisk_core::plan::{self, PlannedAction};
use envrisk_core::report::{self, AssessedSite};
use envrisk_core::{assess_file, config, AssessmentOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "envrisk")]
#[command(about = "Environmental risk scoring for assessed sites (air, water, soil, human)")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score every site in a CSV or JSON table
    Score {
        /// Path to the site table (.csv or .json)
        path: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Write output to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Path to config file (default: auto-discover next to the input)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Include recommendations and action priority
        #[arg(long)]
        recommendations: bool,

        /// Sort by global score (highest first) instead of input order
        #[arg(long)]
        sort: bool,

        /// Show only the first N sites (after sorting)
        #[arg(long)]
        top: Option<usize>,

        /// Output a dated action plan instead of site scores (implies --recommendations)
        #[arg(long)]
        plan: bool,

        /// Reference date for the action plan, YYYY-MM-DD (default: today)
        #[arg(long, requires = "plan")]
        plan_date: Option<NaiveDate>,
    },
    /// Validate or inspect a configuration file
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a config file without scoring anything
    Validate {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show the resolved configuration (merged defaults + config file)
    Show {
        /// Path to config file (default: auto-discover from current directory)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Summary,
    Json,
    Csv,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Score {
            path,
            format,
            output,
            config: config_path,
            recommendations,
            sort,
            top,
            plan: build_plan,
            plan_date,
        } => {
            // Normalize path to absolute
            let normalized_path = if path.is_relative() {
                std::env::current_dir()?.join(&path)
            } else {
                path
            };

            // Validate path exists
            if !normalized_path.is_file() {
                anyhow::bail!("Input file does not exist: {}", normalized_path.display());
            }

            // Config is discovered next to the input table
            let project_root = normalized_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or(std::env::current_dir()?);
            let resolved_config = config::load_and_resolve(&project_root, config_path.as_deref())
                .context("failed to load configuration")?;

            if let Some(config_path) = &resolved_config.config_path {
                eprintln!("Using config: {}", config_path.display());
            }

            let options = AssessmentOptions {
                recommendations: recommendations || build_plan,
                sort,
                top_n: top,
            };
            let sites = assess_file(&normalized_path, options, &resolved_config)
                .with_context(|| format!("failed to assess {}", normalized_path.display()))?;
            tracing::info!(sites = sites.len(), "assessment complete");

            let rendered = if build_plan {
                let reference_date =
                    plan_date.unwrap_or_else(|| chrono::Local::now().date_naive());
                let actions = plan::plan_actions(&sites, reference_date);
                tracing::info!(actions = actions.len(), %reference_date, "action plan built");
                render_plan(&actions, format)?
            } else {
                render(&sites, format)?
            };
            match output {
                Some(out_path) => {
                    write_output(&out_path, &rendered)?;
                    eprintln!("Results written to {}", out_path.display());
                }
                None => print!("{}", rendered),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref());

                match resolved {
                    Ok(config) => {
                        if let Some(ref p) = config.config_path {
                            println!("Config valid: {}", p.display());
                        } else {
                            println!("No config file found. Using defaults.");
                        }
                    }
                    Err(e) => {
                        eprintln!("Config validation failed: {:#}", e);
                        std::process::exit(1);
                    }
                }
            }
            ConfigAction::Show { path } => {
                let project_root = std::env::current_dir()?;
                let resolved = config::load_and_resolve(&project_root, path.as_deref())
                    .context("failed to load configuration")?;
                print_config(&resolved);
            }
        },
    }

    Ok(())
}

/// Render assessed sites in the requested format
fn render(sites: &[AssessedSite], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text => report::render_text(sites),
        OutputFormat::Summary => report::render_summary(sites),
        OutputFormat::Json => format!("{}\n", report::render_json(sites)),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            report::write_csv(sites, &mut buf).context("failed to write CSV")?;
            String::from_utf8(buf).context("CSV output is not valid UTF-8")?
        }
    })
}

/// Render an action plan in the requested format; summary uses the text table
fn render_plan(actions: &[PlannedAction], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Text | OutputFormat::Summary => plan::render_plan_text(actions),
        OutputFormat::Json => format!("{}\n", plan::render_plan_json(actions)),
        OutputFormat::Csv => {
            let mut buf = Vec::new();
            plan::write_plan_csv(actions, &mut buf).context("failed to write CSV")?;
            String::from_utf8(buf).context("CSV output is not valid UTF-8")?
        }
    })
}

/// Write output with the temp + rename pattern
fn write_output(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write temporary file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

fn print_config(resolved: &envrisk_core::ResolvedConfig) {
    let t = &resolved.thresholds;
    let pair = |c: &envrisk_core::factors::Cutoffs| format!("{} / {}", c.lower, c.upper);

    println!("Configuration:");
    match resolved.config_path {
        Some(ref p) => println!("  Source: {}", p.display()),
        None => println!("  Source: defaults (no config file found)"),
    }
    if let Some(ref profile) = resolved.profile {
        println!("  Profile: {}", profile);
    }
    println!();
    println!("Air:");
    println!("  pm25: {}", pair(&t.air.pm25));
    println!("  pm10: {}", pair(&t.air.pm10));
    println!("  no2: {}", pair(&t.air.no2));
    println!("  o3: {}", pair(&t.air.o3));
    println!();
    println!("Water:");
    println!(
        "  humidity: dry < {} / humid > {}",
        t.water.humidity.dry, t.water.humidity.humid
    );
    println!("  water_points: {}", pair(&t.water.water_points));
    println!();
    println!("Soil:");
    println!(
        "  ph: {} / {} / {} / {}",
        t.soil.ph.extreme_acid, t.soil.ph.acid, t.soil.ph.alkaline, t.soil.ph.extreme_alkaline
    );
    println!("  organic_carbon: {}", pair(&t.soil.organic_carbon));
    println!("  clay: {}", pair(&t.soil.clay));
    println!("  sand: {}", pair(&t.soil.sand));
    println!();
    println!("Human:");
    println!("  dwellings: {}", pair(&t.human.dwellings));
    println!("  industrial_zones: {}", pair(&t.human.industrial_zones));
    println!("  population: {}", pair(&t.human.population));
    println!("  water_access: {}", pair(&t.human.water_access));
    println!("  forest_cover: {}", pair(&t.human.forest_cover));
    println!();
    println!("Risk levels:");
    println!("  medium: {}", resolved.risk_levels.medium);
    println!("  high: {}", resolved.risk_levels.high);
}
