//! Mise à jour du fichier d'informations des parcours (`Type_created`)
//!
//! Le fichier est une liste d'objets identifiés par `id` (ex: MGC001).
//! Pour chaque parcours, `Type_created` reçoit les valeurs de `Type`
//! présentes dans son document GeoJSON.

use std::path::Path;

use anyhow::{bail, Context, Result};
use coursegeo::catalog::extract_types;
use coursegeo::document::write_json;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Clé mise à jour dans chaque entrée
pub const TYPE_CREATED_KEY: &str = "Type_created";

/// Compteurs d'une mise à jour
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeCreatedSummary {
    /// Entrées dont le document a été trouvé
    pub updated: usize,
    /// Entrées sans document (liste vide)
    pub not_found: usize,
    /// Entrées écartées par le filtre de préfixe
    pub skipped: usize,
}

/// Met à jour `Type_created` puis réécrit le fichier
pub fn update_type_created(
    baseinfo_path: &Path,
    geojson_folder: &Path,
    prefix: Option<&str>,
) -> Result<TypeCreatedSummary> {
    let content = std::fs::read_to_string(baseinfo_path)
        .with_context(|| format!("Cannot read base info: {}", baseinfo_path.display()))?;
    let mut data: Value = serde_json::from_str(&content)
        .with_context(|| format!("Invalid base info JSON: {}", baseinfo_path.display()))?;

    let Some(entries) = data.as_array_mut() else {
        bail!("Base info is not a list: {}", baseinfo_path.display());
    };

    let mut summary = TypeCreatedSummary::default();
    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
        let Some(id) = entry.get("id").and_then(Value::as_str).map(str::to_string) else {
            continue;
        };

        if prefix.is_some_and(|p| !p.is_empty() && !id.starts_with(p)) {
            summary.skipped += 1;
            continue;
        }

        let document = geojson_folder.join(format!("{}.json", id));
        let types = if document.is_file() {
            summary.updated += 1;
            extract_types(&document)
        } else {
            warn!(id = %id, "GeoJSON document not found");
            summary.not_found += 1;
            Vec::new()
        };

        entry.insert(
            TYPE_CREATED_KEY.to_string(),
            Value::Array(types.into_iter().map(Value::String).collect()),
        );
    }

    write_json(baseinfo_path, &data)
        .with_context(|| format!("Cannot write base info: {}", baseinfo_path.display()))?;

    info!(
        file = %baseinfo_path.display(),
        updated = summary.updated,
        not_found = summary.not_found,
        skipped = summary.skipped,
        "Type_created updated"
    );
    Ok(summary)
}
