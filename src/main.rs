use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use tree_estimator::{
    analysis::{estimate_batch, BatchSummary, Estimator},
    biomass::StumpAdjustment,
    config::EstimatorConfig,
    io::{self, EstimateWriter},
    models::{BiomassComponent, Measurement, TreeRecord},
    store::{MemoryStore, SqliteStore},
    visualization::{
        format_batch_summary, format_biomass_chart, format_estimates_table, format_species_record,
        format_tree_estimate, format_volume_estimate, format_volume_explanation,
    },
};

#[derive(Parser)]
#[command(
    name = "tree-estimator",
    about = "Tree Estimator - Per-tree biomass and gross volume from regional FIA equations",
    version,
    author
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite coefficient database (overrides the configuration file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Tree measurements shared by the volume commands.
#[derive(Args)]
struct MeasurementArgs {
    /// Diameter at breast height, inches
    #[arg(long)]
    dbh: Option<f64>,

    /// Total height, feet
    #[arg(long)]
    height: Option<f64>,

    /// Stand basal area, sq ft/acre
    #[arg(long)]
    basal_area: Option<f64>,

    /// Site index, feet
    #[arg(long)]
    site_index: Option<f64>,

    /// Number of stems (woodland species)
    #[arg(long)]
    stems: Option<u32>,

    /// Diameter at root collar, inches
    #[arg(long)]
    drc: Option<f64>,

    /// Bole height, feet
    #[arg(long)]
    bole_height: Option<f64>,
}

impl MeasurementArgs {
    fn to_measurement(&self) -> Measurement {
        Measurement {
            dbh: self.dbh,
            height: self.height,
            basal_area: self.basal_area,
            site_index: self.site_index,
            stems: self.stems,
            drc: self.drc,
            bole_height: self.bole_height,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Quantity {
    Total,
    Stem,
    Bark,
    Foliage,
    Root,
    Bole,
    Stump,
    Top,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate biomass components for one tree
    Biomass {
        /// FIA species code
        #[arg(short, long)]
        species: i64,

        /// Diameter at breast height, inches
        #[arg(short, long)]
        dbh: f64,

        /// Total height, feet (needed for top biomass)
        #[arg(long)]
        height: Option<f64>,

        /// Print only this quantity
        #[arg(short, long, value_enum)]
        component: Option<Quantity>,

        /// Fixed stump adjustment factor
        #[arg(long)]
        stump_adjustment: Option<f64>,

        /// Show a composition bar chart
        #[arg(long)]
        chart: bool,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Estimate gross cubic-foot volume for one tree
    Volume {
        /// FIA species code
        #[arg(short, long)]
        species: i64,

        /// Volume region identifier, e.g. S33 or S26LORW
        #[arg(short, long)]
        region: Option<String>,

        #[command(flatten)]
        measurement: MeasurementArgs,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a species' coefficients
    Species {
        /// FIA species code
        code: i64,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show which volume equation a tree would use
    Explain {
        /// FIA species code
        #[arg(short, long)]
        species: i64,

        /// Volume region identifier
        #[arg(short, long)]
        region: Option<String>,

        #[command(flatten)]
        measurement: MeasurementArgs,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Estimate every tree in a CSV or JSON file
    Batch {
        /// Tree file (.csv or .json)
        #[arg(short, long)]
        input: PathBuf,

        /// Write results here (.csv or .json) instead of printing tables
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Region for trees that have none
        #[arg(short, long)]
        region: Option<String>,

        /// Fixed stump adjustment factor
        #[arg(long)]
        stump_adjustment: Option<f64>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Create the coefficient database and import reference data
    InitDb {
        /// Directory with species.csv, config.csv and volume_coefficients.csv
        #[arg(long, conflicts_with = "json")]
        from: Option<PathBuf>,

        /// JSON file with species, config and coefficients arrays
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(path: &Path) -> Result<SqliteStore> {
    if !path.exists() {
        anyhow::bail!(
            "Coefficient database not found: {}. Run `tree-estimator init-db` first",
            path.display()
        );
    }
    Ok(SqliteStore::open_read_only(path)?)
}

fn stump_adjustment(flag: Option<f64>, config: &EstimatorConfig) -> StumpAdjustment {
    match flag {
        Some(f) => StumpAdjustment::Fixed(f),
        None => config.stump_adjustment(),
    }
}

fn resolve_region(flag: Option<String>, config: &EstimatorConfig) -> Result<String> {
    match flag.or_else(|| config.default_region.clone()) {
        Some(r) => Ok(r),
        None => anyhow::bail!("A region is required: pass --region or set default_region"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = EstimatorConfig::load(cli.config.as_deref())?;
    let db_path = cli.db.clone().unwrap_or_else(|| config.database.clone());
    let precision = config.precision;

    match cli.command {
        Commands::Biomass {
            species,
            dbh,
            height,
            component,
            stump_adjustment: flag,
            chart,
            json,
        } => {
            let estimator = Estimator::new(open_store(&db_path)?)
                .with_stump_adjustment(stump_adjustment(flag, &config));

            if let Some(quantity) = component {
                let value = match quantity {
                    Quantity::Total => estimator.total_above_ground_biomass(species, dbh)?,
                    Quantity::Stem => {
                        estimator.component_biomass(species, dbh, BiomassComponent::Stem)?
                    }
                    Quantity::Bark => {
                        estimator.component_biomass(species, dbh, BiomassComponent::Bark)?
                    }
                    Quantity::Foliage => {
                        estimator.component_biomass(species, dbh, BiomassComponent::Foliage)?
                    }
                    Quantity::Root => {
                        estimator.component_biomass(species, dbh, BiomassComponent::Root)?
                    }
                    Quantity::Bole => estimator.bole_biomass(species, dbh)?,
                    Quantity::Stump => estimator.stump_biomass(species, dbh)?,
                    Quantity::Top => match height {
                        Some(h) => estimator.top_biomass(species, dbh, h)?,
                        None => anyhow::bail!("--height is required for top biomass"),
                    },
                };
                println!("{value:.precision$}");
                return Ok(());
            }

            let sp = estimator.species(species)?;
            let mut tree = TreeRecord::new(1, species);
            tree.dbh = Some(dbh);
            tree.height = height;
            let est = estimator.estimate_tree(&tree);

            if json {
                println!("{}", serde_json::to_string_pretty(&est)?);
            } else {
                print!("{}", format_tree_estimate(&est, &sp.label(), precision));
                if chart {
                    print!("{}", format_biomass_chart(&est));
                }
            }
        }

        Commands::Volume {
            species,
            region,
            measurement,
            json,
        } => {
            let region = resolve_region(region, &config)?;
            let estimator = Estimator::new(open_store(&db_path)?);
            let est = estimator.estimate_volume(species, &region, &measurement.to_measurement())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&est)?);
            } else {
                print!("{}", format_volume_estimate(&est, precision));
            }
        }

        Commands::Species { code, json } => {
            let estimator = Estimator::new(open_store(&db_path)?);
            let sp = estimator.species(code)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sp)?);
            } else {
                print!("{}", format_species_record(&sp));
            }
        }

        Commands::Explain {
            species,
            region,
            measurement,
            json,
        } => {
            let region = resolve_region(region, &config)?;
            let estimator = Estimator::new(open_store(&db_path)?);
            let ex = estimator.explain_volume(species, &region, &measurement.to_measurement())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&ex)?);
            } else {
                print!("{}", format_volume_explanation(&ex));
            }
        }

        Commands::Batch {
            input,
            output,
            region,
            stump_adjustment: flag,
            pretty,
        } => {
            let trees = io::read_trees(&input)?;
            let mut estimator = Estimator::new(open_store(&db_path)?)
                .with_stump_adjustment(stump_adjustment(flag, &config));
            if let Some(r) = region.or_else(|| config.default_region.clone()) {
                estimator = estimator.with_default_region(r);
            }

            let estimates = estimate_batch(&estimator, &trees);
            let summary = BatchSummary::from_estimates(&estimates);

            match output {
                Some(out) => {
                    let ext = out
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("")
                        .to_lowercase();
                    let writer: Box<dyn EstimateWriter> = match ext.as_str() {
                        "csv" => Box::new(io::CsvFormat),
                        "json" => Box::new(io::JsonFormat { pretty }),
                        _ => anyhow::bail!("Unsupported output format: .{ext}. Use .csv or .json"),
                    };
                    writer.write(&estimates, &out)?;
                    println!(
                        "{} Estimated {} trees ({} with errors) -> {}",
                        "Success:".green().bold(),
                        summary.trees,
                        summary.with_errors,
                        out.display()
                    );
                }
                None => {
                    print!("{}", format_estimates_table(&estimates, precision));
                    for est in estimates.iter().filter(|e| !e.is_complete()) {
                        for e in &est.errors {
                            eprintln!("{}: tree {}: {e}", "Warning".yellow(), est.tree_id);
                        }
                    }
                    print!("{}", format_batch_summary(&summary, precision));
                }
            }
        }

        Commands::InitDb { from, json } => {
            let data = match (from, json) {
                (Some(dir), None) => io::load_reference_dir(&dir)?,
                (None, Some(file)) => MemoryStore::from_json_file(&file)?,
                (None, None) => MemoryStore::new(),
                (Some(_), Some(_)) => anyhow::bail!("--from and --json cannot be combined"),
            };
            let mut store = SqliteStore::open(&db_path)?;
            store.import(&data)?;
            let counts = store.counts()?;
            println!(
                "{} {} ({} species, {} mappings, {} coefficient rows)",
                "Initialized".green().bold(),
                db_path.display(),
                counts.species,
                counts.config,
                counts.coefficients
            );
        }
    }

    Ok(())
}
