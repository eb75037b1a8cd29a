//! Types d'erreurs pour le crate coursegeo

use thiserror::Error;

/// Erreurs pouvant survenir lors du traitement d'un document GeoJSON
#[derive(Debug, Error)]
pub enum CourseError {
    /// Erreur d'I/O (fichier absent, illisible, écriture impossible)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Contenu JSON invalide
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Document dont la structure n'est pas une FeatureCollection exploitable
    #[error("Invalid document structure in {file}: {reason}")]
    Structure { file: String, reason: String },

    /// Template de propriétés invalide
    #[error("Invalid schema: {0}")]
    Schema(String),

    /// Géométrie non convertible
    #[error("Invalid geometry: {0}")]
    Geometry(String),
}

impl CourseError {
    /// Crée une erreur de structure avec contexte
    pub fn structure(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Structure {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de schéma
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema(reason.into())
    }
}
