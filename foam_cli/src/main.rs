//! # Foamline CLI
//!
//! Terminal front end for the foam_core estimating engine: price a single
//! assembly, build and price `.sfe` estimates, and manage the pricing
//! settings file.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

use foam_core::calculations::{calculate_assembly, AssemblyInput, AssemblyResult, EstimateOptions, EstimateTotals};
use foam_core::config::PricingConfig;
use foam_core::estimate::Estimate;
use foam_core::file_io::{load_estimate, load_pricing_config, save_estimate, save_pricing_config, FileLock};
use foam_core::geometry::Geometry;
use foam_core::materials::MaterialType;
use foam_core::productivity::{resolve_all, Condition};

#[derive(Parser)]
#[command(name = "foam_cli")]
#[command(about = "Spray foam estimating: board-feet, labor, material and quote totals")]
#[command(version)]
struct Cli {
    /// Verbose logging (debug level); RUST_LOG overrides
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Wall,
    Attic,
    Flat,
    Linear,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one assembly
    Assembly {
        /// Assembly shape
        #[arg(long, value_enum)]
        kind: Kind,

        /// Label shown on the quote
        #[arg(long, default_value = "Assembly")]
        label: String,

        /// Wall or linear run length (ft)
        #[arg(long)]
        linear_ft: Option<f64>,

        /// Wall height (ft)
        #[arg(long)]
        height_ft: Option<f64>,

        /// Attic or flat plan area (sq ft)
        #[arg(long)]
        area_sqft: Option<f64>,

        /// Roof pitch, inches of rise per 12 of run
        #[arg(long, default_value = "0")]
        pitch: f64,

        /// Treat --pitch as a direct multiplier instead of rise/12
        #[arg(long)]
        pitch_multiplier: bool,

        /// Spray band width for linear runs (in)
        #[arg(long)]
        spray_width_in: Option<f64>,

        /// Foam thickness (in)
        #[arg(long)]
        thickness_in: f64,

        /// Product, e.g. "open cell", "cc", "roof coating"
        #[arg(long, default_value = "open_cell")]
        material: MaterialType,

        /// Explicit cost per board-foot; overrides the pricing settings
        #[arg(long)]
        cost_per_bdft: Option<f64>,

        /// tight, typical or wide
        #[arg(long, default_value = "typical")]
        condition: Condition,

        /// Pricing settings file (defaults when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Create a new estimate file from a JSON list of assemblies
    New {
        /// Output .sfe path
        path: PathBuf,

        #[arg(long)]
        customer: String,

        #[arg(long)]
        job: String,

        /// JSON file containing an array of assemblies
        #[arg(long)]
        assemblies: Option<PathBuf>,

        /// Round-trip miles to the site
        #[arg(long)]
        miles: Option<f64>,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Identifier written into the lock file while saving
        #[arg(long, default_value = "foam_cli")]
        user: String,
    },

    /// Show the totals of a saved estimate
    Estimate {
        /// Path to the .sfe file
        path: PathBuf,

        /// Re-price with these settings instead of the saved snapshot
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show resolved spray rates per job condition
    Rates {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write a default pricing settings file
    InitConfig {
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PricingConfig> {
    match path {
        Some(path) => load_pricing_config(path)
            .with_context(|| format!("Failed to load pricing settings from {}", path.display())),
        None => {
            debug!("no pricing settings given, using defaults");
            Ok(PricingConfig::default())
        }
    }
}

fn required(value: Option<f64>, flag: &str, kind: &str) -> Result<f64> {
    match value {
        Some(v) => Ok(v),
        None => bail!("--{} is required for --kind {}", flag, kind),
    }
}

fn build_geometry(
    kind: Kind,
    linear_ft: Option<f64>,
    height_ft: Option<f64>,
    area_sqft: Option<f64>,
    pitch: f64,
    pitch_multiplier: bool,
    spray_width_in: Option<f64>,
) -> Result<Geometry> {
    Ok(match kind {
        Kind::Wall => Geometry::Wall {
            linear_ft: required(linear_ft, "linear-ft", "wall")?,
            height_ft: required(height_ft, "height-ft", "wall")?,
        },
        Kind::Attic => Geometry::Attic {
            area_sqft: required(area_sqft, "area-sqft", "attic")?,
            pitch,
            pitch_is_rise_over_12: !pitch_multiplier,
        },
        Kind::Flat => Geometry::Flat {
            area_sqft: required(area_sqft, "area-sqft", "flat")?,
        },
        Kind::Linear => Geometry::Linear {
            linear_ft: required(linear_ft, "linear-ft", "linear")?,
            spray_width_in: required(spray_width_in, "spray-width-in", "linear")?,
        },
    })
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_assembly(result: &AssemblyResult) {
    println!("{} ({}, {}, {})", result.label, result.geometry_kind, result.material, result.condition);
    println!("{}", "-".repeat(44));
    println!("{:<26} {:>16.2}", "Sprayed area (sq ft)", result.surface_sqft);
    println!("{:<26} {:>16.2}", "Board-feet", result.board_feet);
    println!("{:<26} {:>16.0}", "Spray rate (bdft/hr)", result.productivity_rate);
    println!("{:<26} {:>16.3}", "Labor hours", result.labor_hours);
    println!("{:<26} {:>16.2}", "Labor", result.labor_cost);
    println!("{:<26} {:>16.2}", "Material", result.material_cost);
    println!("{:<26} {:>16.2}", "Before margin", result.pre_margin_total);
    println!("{:<26} {:>16.2}", "Sell price", result.post_margin_total);
}

fn print_totals(estimate: &Estimate, totals: &EstimateTotals) {
    println!("{} - {}", estimate.meta.customer, estimate.meta.job_name);
    println!();
    println!(
        "{:<24} {:>10} {:>9} {:>10} {:>10} {:>10}",
        "Assembly", "Bdft", "Hours", "Labor", "Material", "Subtotal"
    );
    println!("{}", "-".repeat(78));
    for a in &totals.assemblies {
        println!(
            "{:<24} {:>10.2} {:>9.3} {:>10.2} {:>10.2} {:>10.2}",
            a.label, a.board_feet, a.labor_hours, a.labor_cost, a.material_cost, a.pre_margin_total
        );
    }
    println!("{}", "-".repeat(78));

    let job = &totals.job;
    let rows = [
        ("Total board-feet", job.total_board_feet),
        ("Total labor hours", totals.total_labor_hours),
        ("Material", job.material_total),
        ("Labor", job.labor_total),
        ("Base cost", job.base_cost),
        ("Overhead", job.overhead_total),
        ("Profit", job.profit_total),
        ("Subtotal", job.subtotal_with_margin),
        ("Mobilization", job.mobilization_fee),
        ("Fuel surcharge", job.fuel_surcharge),
    ];
    for (name, value) in rows {
        println!("{:<24} {:>53.2}", name, value);
    }
    println!("{}", "=".repeat(78));
    println!("{:<24} {:>53.2}", "GRAND TOTAL", job.grand_total);
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Assembly {
            kind,
            label,
            linear_ft,
            height_ft,
            area_sqft,
            pitch,
            pitch_multiplier,
            spray_width_in,
            thickness_in,
            material,
            cost_per_bdft,
            condition,
            config,
            json,
        } => {
            let config = load_config(config.as_deref())?;
            let input = AssemblyInput {
                label,
                geometry: build_geometry(kind, linear_ft, height_ft, area_sqft, pitch, pitch_multiplier, spray_width_in)?,
                thickness_in,
                material,
                material_cost_per_bdft: cost_per_bdft,
                condition,
            };
            let result = calculate_assembly(&input, &config).context("Failed to price assembly")?;

            if json {
                print_json(&result)?;
            } else {
                print_assembly(&result);
            }
        }

        Commands::New {
            path,
            customer,
            job,
            assemblies,
            miles,
            config,
            user,
        } => {
            let config = load_config(config.as_deref())?;
            let mut estimate = Estimate::new(customer, job, config)?;

            if let Some(list) = assemblies {
                let contents = std::fs::read_to_string(&list)
                    .with_context(|| format!("Failed to read {}", list.display()))?;
                let inputs: Vec<AssemblyInput> = serde_json::from_str(&contents)
                    .with_context(|| format!("Invalid assembly list in {}", list.display()))?;
                for input in inputs {
                    let label = input.label.clone();
                    estimate
                        .add_assembly(input)
                        .with_context(|| format!("Assembly '{}' rejected", label))?;
                }
            }
            if miles.is_some() {
                estimate.set_options(EstimateOptions {
                    miles,
                    ..EstimateOptions::default()
                })?;
            }

            let _lock = match FileLock::acquire(&path, user) {
                Ok(lock) => lock,
                Err(e) if e.is_recoverable() => bail!("{} - try again once it is closed", e),
                Err(e) => return Err(e).context("Failed to lock estimate"),
            };
            save_estimate(&estimate, &path).with_context(|| format!("Failed to save {}", path.display()))?;
            println!(
                "Saved {} ({} assemblies, grand total {:.2})",
                path.display(),
                estimate.assembly_count(),
                estimate.totals().job.grand_total
            );
        }

        Commands::Estimate { path, config, json } => {
            let mut estimate =
                load_estimate(&path).with_context(|| format!("Failed to open estimate {}", path.display()))?;

            if let Some(config_path) = config {
                let pricing = load_config(Some(&config_path))?;
                estimate.reprice(pricing).context("Estimate does not price under the new settings")?;
            }

            if json {
                print_json(estimate.totals())?;
            } else {
                print_totals(&estimate, estimate.totals());
            }
        }

        Commands::Rates { config } => {
            let config = load_config(config.as_deref())?;
            let rates = resolve_all(&config);
            let mode = if config.auto_productivity { "auto" } else { "manual" };

            println!("Spray rates ({} mode)", mode);
            println!("{:<12} {:>14}", "Condition", "bdft/hr");
            println!("{}", "-".repeat(27));
            for condition in Condition::ALL {
                println!("{:<12} {:>14.0}", condition.display_name(), rates.get(condition));
            }
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            save_pricing_config(&PricingConfig::default(), &path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote default pricing settings to {}", path.display());
        }
    }

    Ok(())
}
