//! Analyse d'un dossier de documents GeoJSON
//!
//! Les documents sont sélectionnés par préfixe et par numéro, diagnostiqués
//! un par un puis résumés dans un rapport texte.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use coursegeo::{validate_file, DiagnosticReport, Schema};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::report;

/// Paramètres d'une analyse
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub unwanted_types: Vec<String>,
    pub prefixes: Vec<String>,
    pub min_number: u32,
    pub max_number: u32,
    /// Fichier où écrire le rapport (dossiers parents créés)
    pub report_path: Option<PathBuf>,
}

impl ScanOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            unwanted_types: config.unwanted_types.clone(),
            prefixes: config.prefixes.clone(),
            min_number: config.min_number,
            max_number: config.max_number,
            report_path: None,
        }
    }
}

/// Résultat d'une analyse
#[derive(Debug, Clone, Default)]
pub struct ScanOutcome {
    /// Dossier analysé
    pub folder: PathBuf,
    /// Nombre de documents retenus par préfixe, dans l'ordre des préfixes
    pub prefix_counts: Vec<(String, usize)>,
    /// Diagnostics de tous les documents, dans l'ordre d'analyse
    pub reports: Vec<DiagnosticReport>,
}

impl ScanOutcome {
    /// Diagnostics des documents à corriger
    pub fn problems(&self) -> impl Iterator<Item = &DiagnosticReport> {
        self.reports.iter().filter(|r| r.has_problems())
    }

    pub fn total_features(&self) -> usize {
        self.reports.iter().map(|r| r.feature_count).sum()
    }

    /// Sépare (tous les diagnostics, diagnostics à corriger)
    pub fn into_parts(self) -> (Vec<DiagnosticReport>, Vec<DiagnosticReport>) {
        let problems = self.problems().cloned().collect();
        (self.reports, problems)
    }
}

/// Documents `{prefix}{n}.json` du dossier avec `n` dans `[min, max]`, triés
pub fn course_files(folder: &Path, prefix: &str, min: u32, max: u32) -> Result<Vec<PathBuf>> {
    let pattern = format!(
        "{}/{}*.json",
        glob::Pattern::escape(&folder.to_string_lossy()),
        glob::Pattern::escape(prefix)
    );

    let mut files: Vec<PathBuf> = glob::glob(&pattern)
        .with_context(|| format!("Invalid file pattern: {}", pattern))?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "Unreadable directory entry");
                None
            }
        })
        .filter(|path| {
            document_number(path, prefix).is_some_and(|n| (i64::from(min)..=i64::from(max)).contains(&n))
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Numéro du document: le nom sans préfixe ni extension
fn document_number(path: &Path, prefix: &str) -> Option<i64> {
    let name = path.file_name()?.to_str()?;
    name.strip_prefix(prefix)?
        .strip_suffix(".json")?
        .trim()
        .parse()
        .ok()
}

/// Analyse le dossier et écrit le rapport si demandé
pub fn scan(folder: &Path, schema: &Schema, options: &ScanOptions) -> Result<ScanOutcome> {
    let mut outcome = ScanOutcome {
        folder: folder.to_path_buf(),
        ..Default::default()
    };

    let mut files = Vec::new();
    for prefix in &options.prefixes {
        let found = course_files(folder, prefix, options.min_number, options.max_number)?;
        debug!(prefix = %prefix, count = found.len(), "Documents found");
        outcome.prefix_counts.push((prefix.clone(), found.len()));
        files.extend(found);
    }

    info!(folder = %folder.display(), documents = files.len(), "Scanning documents");

    outcome.reports = files
        .iter()
        .map(|path| validate_file(path, schema, &options.unwanted_types))
        .collect();

    if let Some(path) = &options.report_path {
        report::write_report(path, &report::render_report(&outcome))?;
        info!(report = %path.display(), "Report saved");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), "{}").unwrap();
    }

    #[test]
    fn test_course_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["MGC010.json", "MGC002.json", "MGC900.json", "MGC000.json", "MGCabc.json", "MGC005.txt", "TGC001.json"] {
            touch(dir.path(), name);
        }

        let files = course_files(dir.path(), "MGC", 1, 899).unwrap();
        let names: Vec<String> = files.iter().map(|p| coursegeo::file_name(p)).collect();
        assert_eq!(names, ["MGC002.json", "MGC010.json"]);
    }

    #[test]
    fn test_course_files_custom_range() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["TGC001.json", "TGC050.json", "TGC120.json"] {
            touch(dir.path(), name);
        }
        assert_eq!(course_files(dir.path(), "TGC", 1, 100).unwrap().len(), 2);
    }

    #[test]
    fn test_scan_partitions_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let schema = Schema::from_json_str(r#"{"Hole": 0, "mapdscourseid": ""}"#).unwrap();
        std::fs::write(
            dir.path().join("MGC001.json"),
            r#"{"features": [{"properties": {"Hole": 1, "mapdscourseid": "MGC001"}}]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("TGC001.json"), "broken").unwrap();

        let mut options = ScanOptions::from_config(&Config::default());
        options.report_path = Some(dir.path().join("reports/nested/check.txt"));

        let outcome = scan(dir.path(), &schema, &options).unwrap();
        assert_eq!(
            outcome.prefix_counts,
            [("MGC".to_string(), 1), ("TGC".to_string(), 1)]
        );
        assert_eq!(outcome.total_features(), 1);
        assert!(dir.path().join("reports/nested/check.txt").exists());

        let (all, problems) = outcome.into_parts();
        assert_eq!(all.len(), 2);
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].file, "TGC001.json");
    }
}
