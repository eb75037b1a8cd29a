//! # coursegeo-tools
//!
//! Outils de maintenance des documents GeoJSON de parcours de golf.
//!
//! ## Features
//!
//! - Analyse d'un dossier et rapport texte relisible (`scan`, `report`)
//! - Réparation des documents listés dans un rapport (`fix`)
//! - Mise à jour des types créés dans le fichier d'informations des parcours
//! - Copie locale d'un stockage d'objets
//!
//! ## Usage CLI
//!
//! ```bash
//! # Diagnostic et rapport
//! coursegeo check --folder ./coursegeojson --report ./reports/geojson_check.txt
//!
//! # Réparation des documents listés
//! coursegeo fix --report ./reports/geojson_check.txt --folder ./coursegeojson
//! ```

pub mod baseinfo;
pub mod cli;
pub mod config;
pub mod fix;
pub mod report;
pub mod scan;
pub mod store;

pub use config::Config;
pub use fix::repair_reported;
pub use report::{parse_problem_ids, render_report};
pub use scan::{course_files, scan, ScanOptions, ScanOutcome};
