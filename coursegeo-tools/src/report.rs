//! Rapport texte d'une analyse
//!
//! Seules les lignes marqueur (`📁 {id}.json (Features: {n})`) sont relues
//! par la suite; le reste du rapport est destiné à la lecture.

use std::path::Path;

use anyhow::{Context, Result};
use coursegeo::DiagnosticReport;
use regex::Regex;
use serde::Serialize;

use crate::scan::ScanOutcome;

/// Marqueur d'un document à corriger
pub const MARKER: &str = "📁";

const SEPARATOR_WIDTH: usize = 50;

/// Produit le texte du rapport.
///
/// Aucune date n'est incluse: deux rendus d'une même analyse sont identiques.
pub fn render_report(outcome: &ScanOutcome) -> String {
    let problems: Vec<&DiagnosticReport> = outcome.problems().collect();
    let mut lines = Vec::new();

    lines.push(format!("GeoJSON check report - {}", outcome.folder.display()));
    lines.push(format!("Documents: {}", counts_line(outcome)));
    lines.push(String::new());

    if !problems.is_empty() {
        lines.push(format!("=== Problem files: {} ===", problems.len()));
        lines.push(String::new());

        for report in &problems {
            lines.push(format!(
                "{} {} (Features: {})",
                MARKER, report.file, report.feature_count
            ));

            if let Some(error) = &report.error {
                lines.push(format!("  ❌ Error: {}", error));
            } else {
                push_category(&mut lines, "⚠️ Unwanted Types", &report.unwanted_types);
                push_category(&mut lines, "❌ Missing Keys", &report.missing_keys);
                push_category(&mut lines, "❌ Type Mismatches", &report.type_mismatches);
                push_category(&mut lines, "⚠️ Extra Keys", &report.extra_keys);
                push_category(&mut lines, "❌ Wrong mapdscourseid", &report.wrong_courseid);
            }
            lines.push(String::new());
        }
    }

    let separator = "=".repeat(SEPARATOR_WIDTH);
    lines.push(separator.clone());
    lines.push("SUMMARY".to_string());
    lines.push(separator);
    lines.push(format!(
        "Documents checked: {}, total features: {}",
        outcome.reports.len(),
        outcome.total_features()
    ));
    lines.push(format!("Problem documents: {}", problems.len()));

    if problems.is_empty() {
        lines.push("✅ All documents are valid".to_string());
    } else {
        let count = |pred: fn(&DiagnosticReport) -> bool| {
            outcome.reports.iter().filter(|r| pred(r)).count()
        };
        lines.push(format!("  - Errors: {}", count(|r| r.error.is_some())));
        lines.push(format!("  - Unwanted Types: {}", count(|r| !r.unwanted_types.is_empty())));
        lines.push(format!("  - Missing Keys: {}", count(|r| !r.missing_keys.is_empty())));
        lines.push(format!("  - Type Mismatches: {}", count(|r| !r.type_mismatches.is_empty())));
        lines.push(format!("  - Extra Keys: {}", count(|r| !r.extra_keys.is_empty())));
        lines.push(format!("  - Wrong mapdscourseid: {}", count(|r| !r.wrong_courseid.is_empty())));
    }

    lines.join("\n")
}

fn counts_line(outcome: &ScanOutcome) -> String {
    let parts: Vec<String> = outcome
        .prefix_counts
        .iter()
        .map(|(prefix, count)| format!("{}: {}", prefix, count))
        .collect();
    format!("{} = {} total", parts.join(" + "), outcome.reports.len())
}

/// Ajoute une ligne de catégorie si elle n'est pas vide
fn push_category<T>(lines: &mut Vec<String>, label: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value).unwrap_or_default();
    if !matches!(json.as_str(), "" | "{}" | "[]") {
        lines.push(format!("  {}: {}", label, json));
    }
}

/// Écrit le rapport (dossiers parents créés)
pub fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create report directory: {}", parent.display()))?;
    }
    std::fs::write(path, text).with_context(|| format!("Cannot write report: {}", path.display()))
}

/// Identifiants des documents listés par un rapport, dans l'ordre du fichier
pub fn parse_problem_ids(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read report: {}", path.display()))?;
    parse_problem_ids_str(&content)
}

pub fn parse_problem_ids_str(content: &str) -> Result<Vec<String>> {
    let marker = Regex::new(r"📁\s+(\w+)\.json").context("Invalid marker pattern")?;

    Ok(content
        .lines()
        .filter(|line| line.trim().starts_with(MARKER))
        .filter_map(|line| marker.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn outcome() -> ScanOutcome {
        let clean = DiagnosticReport {
            feature_count: 4,
            ..DiagnosticReport::new("MGC001.json", "MGC001")
        };
        let mut dirty = DiagnosticReport::new("MGC002.json", "MGC002");
        dirty.feature_count = 3;
        dirty.unwanted_types.insert("Undefined".into(), 2);
        dirty.extra_keys.insert("extra".into());
        dirty
            .type_mismatches
            .entry("Hole".into())
            .or_default()
            .insert("string (expected: integer)".into());
        let broken = DiagnosticReport::failed("TGC001.json", "TGC001", "Invalid JSON: EOF");

        ScanOutcome {
            folder: PathBuf::from("coursegeojson"),
            prefix_counts: vec![("MGC".into(), 2), ("TGC".into(), 1)],
            reports: vec![clean, dirty, broken],
        }
    }

    #[test]
    fn test_render_report_blocks() {
        let text = render_report(&outcome());

        assert!(text.contains("Documents: MGC: 2 + TGC: 1 = 3 total"));
        assert!(text.contains("=== Problem files: 2 ==="));
        assert!(text.contains("📁 MGC002.json (Features: 3)\n  ⚠️ Unwanted Types: {\"Undefined\":2}"));
        assert!(text.contains("  ❌ Type Mismatches: {\"Hole\":[\"string (expected: integer)\"]}"));
        assert!(text.contains("  ⚠️ Extra Keys: [\"extra\"]"));
        assert!(!text.contains("Missing Keys: ["));
        assert!(text.contains("📁 TGC001.json (Features: 0)\n  ❌ Error: Invalid JSON: EOF"));
        assert!(!text.contains("MGC001.json"));
        assert!(text.contains("Documents checked: 3, total features: 7"));
        assert!(text.contains("  - Errors: 1"));
    }

    #[test]
    fn test_render_report_is_deterministic() {
        assert_eq!(render_report(&outcome()), render_report(&outcome()));
    }

    #[test]
    fn test_render_report_all_clear() {
        let outcome = ScanOutcome {
            folder: PathBuf::from("coursegeojson"),
            prefix_counts: vec![("MGC".into(), 0)],
            reports: Vec::new(),
        };
        let text = render_report(&outcome);
        assert!(text.ends_with("✅ All documents are valid"));
        assert!(!text.contains(MARKER));
    }

    #[test]
    fn test_parse_problem_ids() {
        let content = "header 📁 XGC999.json\n\
                       📁 MGC002.json (Features: 3)\n\
                       \t  📁   TGC010.json (Features: 0)\n\
                       📁 not-an-id.json\n\
                       📁 TGC011.geojson\n\
                       📁 MGC002.json (Features: 3)\n";
        assert_eq!(
            parse_problem_ids_str(content).unwrap(),
            ["MGC002", "TGC010", "MGC002"]
        );
    }

    #[test]
    fn test_parse_rendered_report() {
        let text = render_report(&outcome());
        assert_eq!(parse_problem_ids_str(&text).unwrap(), ["MGC002", "TGC001"]);
    }

    #[test]
    fn test_parse_problem_ids_missing_file() {
        assert!(parse_problem_ids(Path::new("missing/report.txt")).is_err());
    }
}
