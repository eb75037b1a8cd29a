//! Réparation des documents GeoJSON
//!
//! Ordre des opérations (chaque étape travaille sur le résultat de la précédente):
//! 1. suppression des features dont le `Type` est interdit
//! 2. correction de l'identifiant de parcours
//! 3. ajout des clés manquantes et conversion des types
//! 4. suppression des clés hors template
//! 5. réécriture du document

pub mod properties;

use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use crate::document::{feature_properties, feature_properties_mut, feature_type};
use crate::{file_name, CourseError, Document, RepairResult, Schema};

/// Répare un fichier et le réécrit sur place.
///
/// Une erreur de lecture, de parsing ou de structure interrompt le traitement
/// avant toute modification: le résultat ne porte alors que `error`.
pub fn repair_file(path: &Path, schema: &Schema, unwanted_types: &[String]) -> RepairResult {
    let file = file_name(path);

    let mut document = match Document::load(path) {
        Ok(document) => document,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Cannot load document");
            return RepairResult::failed(file, e);
        }
    };

    let result = match repair_document(&mut document, schema, unwanted_types) {
        Ok(result) => result,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Invalid document structure");
            return RepairResult::failed(file, e);
        }
    };

    if let Err(e) = document.save() {
        warn!(file = %path.display(), error = %e, "Cannot write repaired document");
        return RepairResult::failed(file, e);
    }

    debug!(
        file = %path.display(),
        deleted = result.deleted_features,
        fixes = result.total_fixes(),
        "Document repaired"
    );
    result
}

/// Répare un document en mémoire
pub fn repair_document(
    document: &mut Document,
    schema: &Schema,
    unwanted_types: &[String],
) -> Result<RepairResult, CourseError> {
    let file = document.file_name();
    let expected = document.course_id();
    let mut result = RepairResult::new(&file);

    let features = document.features_mut()?;

    // Vérifier la structure avant toute modification
    for feature in features.iter() {
        feature_properties(feature, &file)?;
    }

    // 1. Features à type interdit
    let before = features.len();
    features.retain(|feature| !is_unwanted(feature, unwanted_types));
    result.deleted_features = before - features.len();

    // 2-4. Propriétés des features restantes
    for feature in features.iter_mut() {
        let props = feature_properties_mut(feature, &file)?;
        properties::repair_properties(props, schema, &expected, &file, &mut result);
    }

    Ok(result)
}

fn is_unwanted(feature: &Value, unwanted_types: &[String]) -> bool {
    feature
        .get("properties")
        .and_then(Value::as_object)
        .and_then(feature_type)
        .is_some_and(|kind| unwanted_types.iter().any(|u| u == kind))
}
