//! # coursegeo
//!
//! Validation et réparation des propriétés des features GeoJSON de parcours de golf.
//!
//! ## Features
//!
//! - Template de propriétés par défaut (`Schema`) dont chaque valeur fixe le type attendu
//! - Normalisation des features à l'ingestion (conversion de types, clés hors template supprimées)
//! - Diagnostic en lecture seule d'un document (`validate_file`)
//! - Réparation déterministe et idempotente d'un document (`repair_file`)
//! - Résolution d'une position GPS vers les zones du parcours (types `geo`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coursegeo::{repair_file, validate_file, Schema, default_unwanted_types};
//! use std::path::Path;
//!
//! let schema = Schema::load(Path::new("./sample_cleanup/default_feature_properties.json"))?;
//! let unwanted = default_unwanted_types();
//!
//! let report = validate_file(Path::new("coursegeojson/MGC001.json"), &schema, &unwanted);
//! if report.has_problems() {
//!     let result = repair_file(Path::new("coursegeojson/MGC001.json"), &schema, &unwanted);
//!     println!("{} fixes", result.total_fixes());
//! }
//! ```

pub mod catalog;
pub mod document;
pub mod error;
pub mod location;
pub mod normalize;
pub mod repair;
pub mod schema;
pub mod types;
pub mod validate;

pub use document::Document;
pub use error::CourseError;
pub use location::{best_location_at, locations_at, Location};
pub use normalize::{normalize_features, normalize_file, NormalizeSummary};
pub use repair::{repair_document, repair_file};
pub use schema::{Field, Schema, ValueKind, COURSE_ID_KEY, DEFAULT_SCHEMA_PATH};
pub use types::{DiagnosticReport, RepairResult};
pub use validate::{default_unwanted_types, validate_document, validate_file};

use std::path::Path;

/// Extrait l'identifiant de parcours depuis le nom de fichier
/// Format attendu: MGC001.json -> MGC001
pub fn course_id_from_path(path: &Path) -> String {
    let name = file_name(path);
    name.strip_suffix(".json").unwrap_or(&name).to_string()
}

/// Nom de fichier (sans répertoire) en UTF-8 lossy
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
