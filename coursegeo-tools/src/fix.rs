//! Réparation des documents listés dans un rapport

use std::path::Path;

use anyhow::Result;
use coursegeo::{repair_file, RepairResult, Schema};
use tracing::{info, warn};

use crate::report::parse_problem_ids;

/// Message associé à un document listé mais absent du dossier
pub const FILE_NOT_FOUND: &str = "File not found";

/// Répare chaque document listé par le rapport, dans l'ordre du rapport.
///
/// Les documents ne sont pas re-diagnostiqués. Seule la lecture du rapport
/// peut faire échouer l'opération.
pub fn repair_reported(
    report_path: &Path,
    folder: &Path,
    schema: &Schema,
    unwanted_types: &[String],
) -> Result<Vec<RepairResult>> {
    let ids = parse_problem_ids(report_path)?;

    if ids.is_empty() {
        println!("No problem documents listed in {}", report_path.display());
        return Ok(Vec::new());
    }

    info!(report = %report_path.display(), documents = ids.len(), "Repairing reported documents");
    println!("=== Documents to repair: {} ===", ids.len());

    let mut results = Vec::with_capacity(ids.len());
    for id in &ids {
        let path = folder.join(format!("{}.json", id));

        let result = if path.is_file() {
            repair_file(&path, schema, unwanted_types)
        } else {
            warn!(file = %path.display(), "Reported document not found");
            RepairResult::failed(format!("{}.json", id), FILE_NOT_FOUND)
        };

        println!("{}", status_line(&result));
        results.push(result);
    }

    print_summary(&results);
    Ok(results)
}

/// Ligne d'état d'un document
pub fn status_line(result: &RepairResult) -> String {
    if let Some(error) = &result.error {
        return format!("❌ {}: {}", result.file, error);
    }
    if result.is_noop() {
        return format!("✓ {}: nothing to fix", result.file);
    }

    let mut parts = Vec::new();
    if result.deleted_features > 0 {
        parts.push(format!("{} features deleted", result.deleted_features));
    }
    if result.total_fixes() > 0 {
        parts.push(format!("{} fixes", result.total_fixes()));
    }
    format!("✅ {}: {}", result.file, parts.join(", "))
}

fn print_summary(results: &[RepairResult]) {
    let repaired = results.iter().filter(|r| r.error.is_none()).count();
    let deleted: usize = results.iter().map(|r| r.deleted_features).sum();
    let fixes: usize = results.iter().map(|r| r.total_fixes()).sum();

    println!("\n=== Repair complete ===");
    println!("Documents processed: {}, failed: {}", repaired, results.len() - repaired);
    println!("Features deleted: {}, property fixes: {}", deleted, fixes);
}
