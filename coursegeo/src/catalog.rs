//! Catalogue des valeurs de `Type` d'un document

use std::collections::BTreeSet;
use std::path::Path;

use serde_json::Value;
use tracing::warn;

use crate::document::feature_type;
use crate::{CourseError, Document};

/// Valeurs de `Type` distinctes, triées.
///
/// Un document illisible donne une liste vide (l'erreur est journalisée).
pub fn extract_types(path: &Path) -> Vec<String> {
    match Document::load(path).and_then(|document| document_types(&document)) {
        Ok(types) => types,
        Err(e) => {
            warn!(file = %path.display(), error = %e, "Cannot read feature types");
            Vec::new()
        }
    }
}

/// Valeurs de `Type` distinctes d'un document chargé
pub fn document_types(document: &Document) -> Result<Vec<String>, CourseError> {
    let types: BTreeSet<&str> = document
        .features()?
        .iter()
        .filter_map(|feature| feature.get("properties").and_then(Value::as_object))
        .filter_map(feature_type)
        .collect();

    Ok(types.into_iter().map(str::to_string).collect())
}
