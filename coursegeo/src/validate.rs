//! Diagnostic d'un document GeoJSON par rapport au template
//!
//! Le diagnostic est en lecture seule: ni le document ni le disque ne sont modifiés.

use std::path::Path;

use serde_json::{Map, Value};
use tracing::debug;

use crate::document::{feature_properties, feature_type, has_course_id};
use crate::schema::{ValueKind, COURSE_ID_KEY};
use crate::{course_id_from_path, file_name, CourseError, DiagnosticReport, Document, Schema};

/// Valeurs de `Type` marquant une feature à supprimer
pub const DEFAULT_UNWANTED_TYPES: [&str; 2] = ["Undefined", "그린B"];

pub fn default_unwanted_types() -> Vec<String> {
    DEFAULT_UNWANTED_TYPES.iter().map(|s| s.to_string()).collect()
}

/// Diagnostique un fichier.
///
/// Une erreur de lecture, de parsing ou de structure est consignée dans
/// `error`; tous les autres champs restent alors vides.
pub fn validate_file(path: &Path, schema: &Schema, unwanted_types: &[String]) -> DiagnosticReport {
    let result = Document::load(path)
        .and_then(|document| validate_document(&document, schema, unwanted_types));

    match result {
        Ok(report) => report,
        Err(e) => {
            debug!(file = %path.display(), error = %e, "Document not readable");
            DiagnosticReport::failed(file_name(path), course_id_from_path(path), e)
        }
    }
}

/// Diagnostique un document déjà chargé
pub fn validate_document(
    document: &Document,
    schema: &Schema,
    unwanted_types: &[String],
) -> Result<DiagnosticReport, CourseError> {
    let file = document.file_name();
    let expected = document.course_id();
    let mut report = DiagnosticReport::new(&file, &expected);

    let features = document.features()?;
    report.feature_count = features.len();

    let empty = Map::new();
    for feature in features {
        let props = feature_properties(feature, &file)?.unwrap_or(&empty);
        inspect_properties(props, schema, unwanted_types, &expected, &mut report);
    }

    Ok(report)
}

fn inspect_properties(
    props: &Map<String, Value>,
    schema: &Schema,
    unwanted_types: &[String],
    expected: &str,
    report: &mut DiagnosticReport,
) {
    if let Some(kind) = feature_type(props) {
        if unwanted_types.iter().any(|u| u == kind) {
            *report.unwanted_types.entry(kind.to_string()).or_default() += 1;
        }
    }

    for key in schema.keys() {
        if !props.contains_key(key) {
            report.missing_keys.insert(key.to_string());
        }
    }

    for (key, value) in props {
        match schema.get(key) {
            Some(field) if !field.accepts(value) => {
                report
                    .type_mismatches
                    .entry(key.clone())
                    .or_default()
                    .insert(format!(
                        "{} (expected: {})",
                        ValueKind::of(value),
                        field.kind
                    ));
            }
            Some(_) => {}
            None => {
                report.extra_keys.insert(key.clone());
            }
        }
    }

    if !has_course_id(props, expected) {
        let found = match props.get(COURSE_ID_KEY) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => format!("{} ({})", other, ValueKind::of(other)),
        };
        *report.wrong_courseid.entry(found).or_default() += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::from_json_str(r#"{"Hole": 0, "Type": "", "mapdscourseid": ""}"#).unwrap()
    }

    fn doc(name: &str, features: Value) -> Document {
        Document::from_value(
            Path::new(name),
            json!({"type": "FeatureCollection", "features": features}),
        )
    }

    #[test]
    fn test_clean_document() {
        let document = doc(
            "MGC001.json",
            json!([{"type": "Feature", "geometry": null,
                    "properties": {"Hole": 1, "Type": "그린", "mapdscourseid": "MGC001"}}]),
        );
        let report = validate_document(&document, &schema(), &default_unwanted_types()).unwrap();
        assert_eq!(report.feature_count, 1);
        assert!(!report.has_problems());
    }

    #[test]
    fn test_all_categories() {
        let document = doc(
            "MGC002.json",
            json!([
                {"type": "Feature", "properties": {"Hole": "3", "Type": "Undefined", "mapdscourseid": "MGC001", "x": 1}},
                {"type": "Feature", "properties": {"Hole": 2.5, "Type": "그린B"}},
                {"type": "Feature", "properties": {"Hole": 4, "Type": "Undefined", "mapdscourseid": 7}}
            ]),
        );
        let report = validate_document(&document, &schema(), &default_unwanted_types()).unwrap();

        assert_eq!(report.unwanted_types.get("Undefined"), Some(&2));
        assert_eq!(report.unwanted_types.get("그린B"), Some(&1));
        assert_eq!(report.missing_keys.iter().collect::<Vec<_>>(), ["mapdscourseid"]);
        let hole: Vec<&String> = report.type_mismatches["Hole"].iter().collect();
        assert_eq!(hole, ["float (expected: integer)", "string (expected: integer)"]);
        assert_eq!(
            report.type_mismatches["mapdscourseid"].iter().collect::<Vec<_>>(),
            ["integer (expected: string)"]
        );
        assert!(report.extra_keys.contains("x"));
        assert_eq!(report.wrong_courseid.get("MGC001"), Some(&1));
        assert_eq!(report.wrong_courseid.get(""), Some(&1));
        assert_eq!(report.wrong_courseid.get("7 (integer)"), Some(&1));
    }

    #[test]
    fn test_wrong_courseid_keeps_kinds_apart() {
        let document = doc(
            "MGC005.json",
            json!([
                {"type": "Feature", "properties": {"Hole": 1, "Type": "그린", "mapdscourseid": "12"}},
                {"type": "Feature", "properties": {"Hole": 2, "Type": "그린", "mapdscourseid": 12}},
                {"type": "Feature", "properties": {"Hole": 3, "Type": "그린", "mapdscourseid": null}}
            ]),
        );
        let report = validate_document(&document, &schema(), &[]).unwrap();

        assert_eq!(report.wrong_courseid.len(), 3);
        assert_eq!(report.wrong_courseid.get("12"), Some(&1));
        assert_eq!(report.wrong_courseid.get("12 (integer)"), Some(&1));
        assert_eq!(report.wrong_courseid.get("null (null)"), Some(&1));
    }

    #[test]
    fn test_missing_properties_counts_as_empty() {
        let document = doc("TGC010.json", json!([{"type": "Feature", "geometry": null}]));
        let report = validate_document(&document, &schema(), &default_unwanted_types()).unwrap();
        assert_eq!(report.missing_keys.len(), 3);
        assert_eq!(report.wrong_courseid.get(""), Some(&1));
    }

    #[test]
    fn test_structure_error() {
        let document = Document::from_value(Path::new("MGC003.json"), json!({"type": "FeatureCollection"}));
        assert!(validate_document(&document, &schema(), &[]).is_err());
    }

    #[test]
    fn test_validate_file_read_error() {
        let report = validate_file(Path::new("missing/MGC004.json"), &schema(), &[]);
        assert!(report.error.is_some());
        assert_eq!(report.file, "MGC004.json");
        assert_eq!(report.expected_courseid, "MGC004");
        assert_eq!(report.feature_count, 0);
        assert!(report.missing_keys.is_empty());
    }
}
