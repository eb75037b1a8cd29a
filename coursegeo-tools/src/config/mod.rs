//! Configuration de l'outil
//!
//! Ordre de priorité: options CLI > variables d'environnement `COURSEGEO_*`
//! (éventuellement issues d'un `.env`) > fichier JSON > valeurs par défaut.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coursegeo::{default_unwanted_types, Schema, DEFAULT_SCHEMA_PATH};

/// Nom du rapport dans `report_dir`
pub const DEFAULT_REPORT_NAME: &str = "geojson_check.txt";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Template des propriétés par défaut
    pub schema_path: PathBuf,

    /// Valeurs de `Type` à supprimer
    pub unwanted_types: Vec<String>,

    /// Préfixes des documents à analyser (ex: MGC, TGC)
    pub prefixes: Vec<String>,

    /// Plus petit numéro de document retenu
    pub min_number: u32,

    /// Plus grand numéro de document retenu
    pub max_number: u32,

    /// Dossier des documents GeoJSON
    pub geojson_folder: PathBuf,

    /// Dossier des rapports générés
    pub report_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            unwanted_types: default_unwanted_types(),
            prefixes: vec!["MGC".to_string(), "TGC".to_string()],
            min_number: 1,
            max_number: 899,
            geojson_folder: PathBuf::from("./coursegeojson"),
            report_dir: PathBuf::from("./reports"),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier (champs absents = défaut)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Configuration par défaut complétée par l'environnement
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Fichier optionnel puis surcharges d'environnement
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::from_env());
        };
        let mut config = Self::load(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Applique les surcharges `COURSEGEO_*` fournies par `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("COURSEGEO_SCHEMA") {
            self.schema_path = PathBuf::from(path);
        }
        if let Some(types) = lookup("COURSEGEO_UNWANTED_TYPES") {
            self.unwanted_types = split_list(&types);
        }
        if let Some(prefixes) = lookup("COURSEGEO_PREFIXES") {
            self.prefixes = split_list(&prefixes);
        }
        if let Some(min) = lookup("COURSEGEO_MIN_NUMBER").and_then(|s| s.trim().parse().ok()) {
            self.min_number = min;
        }
        if let Some(max) = lookup("COURSEGEO_MAX_NUMBER").and_then(|s| s.trim().parse().ok()) {
            self.max_number = max;
        }
        if let Some(folder) = lookup("COURSEGEO_GEOJSON_FOLDER") {
            self.geojson_folder = PathBuf::from(folder);
        }
        if let Some(dir) = lookup("COURSEGEO_REPORT_DIR") {
            self.report_dir = PathBuf::from(dir);
        }
    }

    /// Rapport partagé par `check` et `fix` quand aucun chemin n'est donné
    pub fn default_report_path(&self) -> PathBuf {
        self.report_dir.join(DEFAULT_REPORT_NAME)
    }

    /// Charge le template désigné par la configuration
    pub fn load_schema(&self) -> Result<Schema> {
        Schema::load(&self.schema_path).with_context(|| {
            format!("Failed to load schema: {}", self.schema_path.display())
        })
    }
}

/// Liste séparée par des virgules, éléments vides ignorés
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
