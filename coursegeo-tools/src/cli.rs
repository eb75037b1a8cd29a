//! Définition et implémentation des commandes CLI
//!
//! - `check`: diagnostic d'un dossier et rapport texte
//! - `fix`: réparation des documents listés dans un rapport
//! - `fix-file` / `normalize`: traitement d'un document isolé
//! - `types` / `update-types`: catalogue des valeurs de `Type`
//! - `locate`: zone du parcours contenant une position GPS
//! - `fetch`: copie locale d'un préfixe de stockage

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use coursegeo::catalog::extract_types;
use coursegeo::location::DEFAULT_AREA_PRIORITY;
use coursegeo::{best_location_at, locations_at, normalize_file, repair_file, Document};
use tracing::info;

use crate::baseinfo::update_type_created;
use crate::config::Config;
use crate::fix::{repair_reported, status_line};
use crate::report::render_report;
use crate::scan::{scan, ScanOptions};
use crate::store::{BlobStore, LocalStore};

#[derive(Subcommand)]
pub enum Commands {
    /// Check every course document of a folder and write a text report
    Check {
        /// Folder containing the GeoJSON documents
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Report file (default: <report_dir>/geojson_check.txt, parent directories are created)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Print the report without saving it
        #[arg(long, conflicts_with = "report")]
        no_save: bool,

        /// Default feature properties template
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Document prefixes to check (repeatable, e.g. --prefix MGC --prefix TGC)
        #[arg(long)]
        prefix: Vec<String>,

        /// Smallest document number
        #[arg(long)]
        min: Option<u32>,

        /// Largest document number
        #[arg(long)]
        max: Option<u32>,
    },

    /// Repair the documents listed in a check report
    Fix {
        /// Report produced by `check` (default: <report_dir>/geojson_check.txt)
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Folder containing the GeoJSON documents
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Default feature properties template
        #[arg(long)]
        schema: Option<PathBuf>,

        /// Save the repair results as JSON
        #[arg(long)]
        results: Option<PathBuf>,
    },

    /// Repair a single document in place
    FixFile {
        /// GeoJSON document (its name gives the expected course id)
        path: PathBuf,

        /// Default feature properties template
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// Normalize the feature properties of a document in place
    Normalize {
        /// GeoJSON document
        path: PathBuf,

        /// Course id forced on every feature
        #[arg(long)]
        course_id: Option<String>,

        /// Default feature properties template
        #[arg(long)]
        schema: Option<PathBuf>,
    },

    /// List the distinct feature types of a document
    Types {
        /// GeoJSON document
        path: PathBuf,
    },

    /// Refresh the Type_created lists of a base info file
    UpdateTypes {
        /// Base info JSON file (list of objects with an `id`)
        #[arg(short, long)]
        baseinfo: PathBuf,

        /// Folder containing the GeoJSON documents
        #[arg(short, long)]
        folder: Option<PathBuf>,

        /// Only update ids starting with this prefix
        #[arg(long)]
        prefix: Option<String>,
    },

    /// Find the course area containing a GPS position
    Locate {
        /// Course GeoJSON document
        #[arg(short, long)]
        geojson: PathBuf,

        /// Longitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,

        /// Latitude (WGS84)
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,

        /// Area preference order (repeatable, default: 홀영역 그린 지역 코스 전면)
        #[arg(long)]
        priority: Vec<String>,

        /// Print every matching area instead of the preferred one
        #[arg(long)]
        all: bool,
    },

    /// Copy every object under a prefix from a store to a local folder
    Fetch {
        /// Store root directory (one sub-directory per bucket)
        #[arg(long)]
        store: PathBuf,

        /// Bucket name
        #[arg(long)]
        bucket: String,

        /// Key prefix
        #[arg(long, default_value = "")]
        prefix: String,

        /// Destination folder
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Exécute une sous-commande
pub fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Check {
            folder,
            report,
            no_save,
            schema,
            prefix,
            min,
            max,
        } => {
            let mut options = ScanOptions::from_config(&config);
            if !prefix.is_empty() {
                options.prefixes = prefix;
            }
            options.min_number = min.unwrap_or(options.min_number);
            options.max_number = max.unwrap_or(options.max_number);
            options.report_path = match (report, no_save) {
                (_, true) => None,
                (Some(path), false) => Some(path),
                (None, false) => Some(config.default_report_path()),
            };
            let folder = folder.unwrap_or_else(|| config.geojson_folder.clone());
            cmd_check(&folder, &with_schema(config, schema), &options)
        }
        Commands::Fix {
            report,
            folder,
            schema,
            results,
        } => {
            let folder = folder.unwrap_or_else(|| config.geojson_folder.clone());
            let report = report.unwrap_or_else(|| config.default_report_path());
            cmd_fix(&report, &folder, &with_schema(config, schema), results.as_deref())
        }
        Commands::FixFile { path, schema } => cmd_fix_file(&path, &with_schema(config, schema)),
        Commands::Normalize {
            path,
            course_id,
            schema,
        } => cmd_normalize(&path, course_id.as_deref(), &with_schema(config, schema)),
        Commands::Types { path } => cmd_types(&path),
        Commands::UpdateTypes {
            baseinfo,
            folder,
            prefix,
        } => {
            let folder = folder.unwrap_or_else(|| config.geojson_folder.clone());
            cmd_update_types(&baseinfo, &folder, prefix.as_deref())
        }
        Commands::Locate {
            geojson,
            lon,
            lat,
            priority,
            all,
        } => cmd_locate(&geojson, lon, lat, &priority, all),
        Commands::Fetch {
            store,
            bucket,
            prefix,
            output,
        } => cmd_fetch(&store, &bucket, &prefix, &output),
    }
}

fn with_schema(mut config: Config, schema: Option<PathBuf>) -> Config {
    if let Some(path) = schema {
        config.schema_path = path;
    }
    config
}

/// Diagnostic d'un dossier
pub fn cmd_check(folder: &Path, config: &Config, options: &ScanOptions) -> Result<()> {
    if !folder.is_dir() {
        bail!("GeoJSON folder not found: {}", folder.display());
    }
    let schema = config.load_schema()?;

    let outcome = scan(folder, &schema, options)?;
    println!("{}", render_report(&outcome));

    if let Some(path) = &options.report_path {
        println!("\n📄 Report saved: {}", path.display());
    }
    Ok(())
}

/// Réparation des documents d'un rapport
pub fn cmd_fix(report: &Path, folder: &Path, config: &Config, results_path: Option<&Path>) -> Result<()> {
    let schema = config.load_schema()?;
    let results = repair_reported(report, folder, &schema, &config.unwanted_types)?;

    if let Some(path) = results_path {
        let json = serde_json::to_string_pretty(&results)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write results: {}", path.display()))?;
        info!(results = %path.display(), "Repair results saved");
    }
    Ok(())
}

/// Réparation d'un document
pub fn cmd_fix_file(path: &Path, config: &Config) -> Result<()> {
    let schema = config.load_schema()?;
    let result = repair_file(path, &schema, &config.unwanted_types);
    println!("{}", status_line(&result));

    match result.error {
        Some(error) => bail!("Repair failed for {}: {}", path.display(), error),
        None => Ok(()),
    }
}

/// Normalisation d'un document
pub fn cmd_normalize(path: &Path, course_id: Option<&str>, config: &Config) -> Result<()> {
    let schema = config.load_schema()?;
    let summary = normalize_file(path, &schema, course_id)
        .with_context(|| format!("Failed to normalize {}", path.display()))?;

    println!(
        "{}: {} features normalized ({} skipped), {} coerced, {} defaulted, {} keys dropped, {} course ids filled",
        path.display(),
        summary.features,
        summary.skipped,
        summary.coerced,
        summary.defaulted,
        summary.dropped_keys,
        summary.course_ids_filled
    );
    Ok(())
}

/// Valeurs de `Type` d'un document
pub fn cmd_types(path: &Path) -> Result<()> {
    for kind in extract_types(path) {
        println!("{}", kind);
    }
    Ok(())
}

/// Mise à jour de `Type_created`
pub fn cmd_update_types(baseinfo: &Path, folder: &Path, prefix: Option<&str>) -> Result<()> {
    let summary = update_type_created(baseinfo, folder, prefix)?;

    println!("=== Type_created updated ({}) ===", prefix.unwrap_or("ALL"));
    println!(
        "Updated: {}, not found: {}, skipped: {}",
        summary.updated, summary.not_found, summary.skipped
    );
    println!("Saved: {}", baseinfo.display());
    Ok(())
}

/// Localisation d'une position GPS
pub fn cmd_locate(geojson: &Path, lon: f64, lat: f64, priority: &[String], all: bool) -> Result<()> {
    let collection = Document::load(geojson)
        .with_context(|| format!("Cannot load {}", geojson.display()))?
        .into_value();

    if all {
        let locations = locations_at(&collection, lon, lat);
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    let priority: Vec<&str> = if priority.is_empty() {
        DEFAULT_AREA_PRIORITY.to_vec()
    } else {
        priority.iter().map(String::as_str).collect()
    };

    match best_location_at(&collection, lon, lat, &priority) {
        Some(location) => println!("{}", serde_json::to_string_pretty(&location)?),
        None => println!("No area found at ({}, {})", lon, lat),
    }
    Ok(())
}

/// Copie locale d'un préfixe de stockage
pub fn cmd_fetch(store: &Path, bucket: &str, prefix: &str, output: &Path) -> Result<()> {
    let store = LocalStore::new(store);
    let count = store.download_many(bucket, prefix, output)?;

    println!(
        "Fetched {} objects from {}/{} into {}",
        count,
        bucket,
        prefix,
        output.display()
    );
    Ok(())
}
