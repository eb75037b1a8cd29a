//! Réparation des propriétés d'une feature

use serde_json::{Map, Value};
use tracing::warn;

use crate::document::has_course_id;
use crate::schema::{Field, COURSE_ID_KEY};
use crate::{RepairResult, Schema};

/// État d'une clé du template avant correction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Valid,
    Absent,
    Mismatched,
}

/// Répare les propriétés d'une feature et met à jour les compteurs.
///
/// Les clés sont classées sur les propriétés d'origine, avant la correction
/// de l'identifiant de parcours: un identifiant absent compte à la fois comme
/// clé manquante et comme identifiant corrigé.
pub fn repair_properties(
    props: &mut Map<String, Value>,
    schema: &Schema,
    expected_courseid: &str,
    file: &str,
    result: &mut RepairResult,
) {
    let states: Vec<(&Field, KeyState)> = schema
        .fields()
        .iter()
        .map(|field| {
            let state = match props.get(&field.name) {
                None => KeyState::Absent,
                Some(value) if field.accepts(value) => KeyState::Valid,
                Some(_) => KeyState::Mismatched,
            };
            (field, state)
        })
        .collect();

    if !has_course_id(props, expected_courseid) {
        props.insert(
            COURSE_ID_KEY.to_string(),
            Value::String(expected_courseid.to_string()),
        );
        result.fixed_wrong_courseid += 1;
    }

    for (field, state) in states {
        match state {
            KeyState::Valid => {}
            KeyState::Absent => {
                result.fixed_missing_keys += 1;
                if !props.contains_key(&field.name) {
                    props.insert(field.name.clone(), field.default_value());
                }
            }
            KeyState::Mismatched => {
                result.fixed_type_mismatches += 1;
                if let Some(value) = props.get_mut(&field.name) {
                    if !field.accepts(value) {
                        *value = convert(field, value, file);
                    }
                }
            }
        }
    }

    let before = props.len();
    props.retain(|key, _| schema.contains(key));
    result.fixed_extra_keys += before - props.len();
}

/// Convertit vers le type attendu, ou retombe sur la valeur par défaut
fn convert(field: &Field, value: &Value, file: &str) -> Value {
    match field.kind.coerce(value) {
        Some(converted) => converted,
        None => {
            warn!(
                file = file,
                key = field.name.as_str(),
                value = %value,
                expected = %field.kind,
                "Value not convertible, replaced by default"
            );
            field.default_value()
        }
    }
}
