//! Types de résultats pour le crate coursegeo

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

/// Diagnostic d'un document GeoJSON (lecture seule)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticReport {
    /// Nom du fichier (ex: MGC001.json)
    pub file: String,

    /// Identifiant de parcours attendu (nom du fichier sans extension)
    pub expected_courseid: String,

    /// Nombre de features du document
    pub feature_count: usize,

    /// Erreur de lecture ou de structure; les autres champs restent vides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Valeurs de `Type` interdites -> nombre d'occurrences
    pub unwanted_types: BTreeMap<String, usize>,

    /// Clés du template absentes d'au moins une feature
    pub missing_keys: BTreeSet<String>,

    /// Clé -> descriptions "<trouvé> (expected: <attendu>)"
    pub type_mismatches: BTreeMap<String, BTreeSet<String>>,

    /// Clés présentes hors template
    pub extra_keys: BTreeSet<String>,

    /// Identifiant de parcours rencontré (incorrect) -> nombre d'occurrences
    pub wrong_courseid: BTreeMap<String, usize>,
}

impl DiagnosticReport {
    pub fn new(file: impl Into<String>, expected_courseid: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            expected_courseid: expected_courseid.into(),
            ..Default::default()
        }
    }

    /// Rapport d'un document illisible
    pub fn failed(
        file: impl Into<String>,
        expected_courseid: impl Into<String>,
        error: impl ToString,
    ) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(file, expected_courseid)
        }
    }

    /// Le document nécessite une intervention
    pub fn has_problems(&self) -> bool {
        self.error.is_some()
            || !self.unwanted_types.is_empty()
            || !self.missing_keys.is_empty()
            || !self.type_mismatches.is_empty()
            || !self.extra_keys.is_empty()
            || !self.wrong_courseid.is_empty()
    }

    /// Nombre total de features à type interdit
    pub fn unwanted_count(&self) -> usize {
        self.unwanted_types.values().sum()
    }
}

/// Résultat de la réparation d'un document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairResult {
    /// Nom du fichier (ex: MGC001.json)
    pub file: String,

    /// Features supprimées (type interdit)
    pub deleted_features: usize,

    /// Clés manquantes ajoutées avec leur valeur par défaut
    pub fixed_missing_keys: usize,

    /// Clés hors template supprimées
    pub fixed_extra_keys: usize,

    /// Valeurs converties (ou remplacées par défaut) vers le type attendu
    pub fixed_type_mismatches: usize,

    /// Identifiants de parcours corrigés
    pub fixed_wrong_courseid: usize,

    /// Erreur ayant empêché toute modification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RepairResult {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Default::default()
        }
    }

    /// Résultat d'un document non réparé
    pub fn failed(file: impl Into<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(file)
        }
    }

    /// Nombre de corrections de propriétés (hors suppressions)
    pub fn total_fixes(&self) -> usize {
        self.fixed_missing_keys
            + self.fixed_extra_keys
            + self.fixed_type_mismatches
            + self.fixed_wrong_courseid
    }

    /// Aucun changement appliqué
    pub fn is_noop(&self) -> bool {
        self.error.is_none() && self.deleted_features == 0 && self.total_fixes() == 0
    }
}
