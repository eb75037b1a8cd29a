//! Normalisation des features à l'ingestion
//!
//! Chaque feature reçoit exactement les clés du template, dans l'ordre du
//! template. Les valeurs de mauvais type sont converties, ou remplacées par
//! la valeur par défaut. Les clés hors template disparaissent.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::schema::COURSE_ID_KEY;
use crate::{CourseError, Document, Schema};

/// Compteurs d'une normalisation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeSummary {
    /// Features normalisées
    pub features: usize,
    /// Features sans propriétés, laissées intactes
    pub skipped: usize,
    /// Valeurs converties vers le type attendu
    pub coerced: usize,
    /// Valeurs remplacées par défaut (absentes ou non convertibles)
    pub defaulted: usize,
    /// Clés hors template supprimées
    pub dropped_keys: usize,
    /// Identifiants de parcours renseignés via la table des clients
    pub course_ids_filled: usize,
}

/// Normalise une liste de features en place.
///
/// Un identifiant `course_id` non vide est imposé à toutes les features.
/// Sinon, un identifiant vide est complété via la valeur `Client` de la
/// feature, d'après la première feature du lot associant ce client à un
/// identifiant.
pub fn normalize_features(
    features: &mut [Value],
    schema: &Schema,
    course_id: Option<&str>,
) -> NormalizeSummary {
    let forced = course_id.filter(|id| !id.is_empty());
    let clients = client_table(features);
    let mut summary = NormalizeSummary::default();

    for feature in features.iter_mut() {
        let Some(props) = feature
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        else {
            summary.skipped += 1;
            continue;
        };

        let mut cleaned = clean_properties(props, schema, &mut summary);

        match forced {
            Some(id) => {
                cleaned.insert(COURSE_ID_KEY.to_string(), Value::String(id.to_string()));
            }
            None if is_empty_course_id(cleaned.get(COURSE_ID_KEY)) => {
                let found = props
                    .get("Client")
                    .and_then(Value::as_str)
                    .and_then(|client| clients.get(client));
                if let Some(id) = found {
                    cleaned.insert(COURSE_ID_KEY.to_string(), Value::String(id.clone()));
                    summary.course_ids_filled += 1;
                }
            }
            None => {}
        }

        *props = cleaned;
        summary.features += 1;
    }

    debug!(
        features = summary.features,
        coerced = summary.coerced,
        defaulted = summary.defaulted,
        "Features normalized"
    );
    summary
}

/// Normalise un document en mémoire
pub fn normalize_document(
    document: &mut Document,
    schema: &Schema,
    course_id: Option<&str>,
) -> Result<NormalizeSummary, CourseError> {
    let features = document.features_mut()?;
    Ok(normalize_features(features, schema, course_id))
}

/// Normalise un fichier et le réécrit sur place
pub fn normalize_file(
    path: &Path,
    schema: &Schema,
    course_id: Option<&str>,
) -> Result<NormalizeSummary, CourseError> {
    let mut document = Document::load(path)?;
    let summary = normalize_document(&mut document, schema, course_id)?;
    document.save()?;

    info!(
        file = %path.display(),
        features = summary.features,
        dropped_keys = summary.dropped_keys,
        "Document normalized"
    );
    Ok(summary)
}

/// Propriétés réduites au template, dans l'ordre du template
fn clean_properties(
    props: &Map<String, Value>,
    schema: &Schema,
    summary: &mut NormalizeSummary,
) -> Map<String, Value> {
    let mut cleaned = Map::new();

    for field in schema.fields() {
        let value = match props.get(&field.name) {
            Some(value) if field.accepts(value) => value.clone(),
            Some(value) => match field.kind.coerce(value) {
                Some(converted) => {
                    summary.coerced += 1;
                    converted
                }
                None => {
                    summary.defaulted += 1;
                    field.default_value()
                }
            },
            None => {
                summary.defaulted += 1;
                field.default_value()
            }
        };
        cleaned.insert(field.name.clone(), value);
    }

    summary.dropped_keys += props.keys().filter(|key| !schema.contains(key)).count();
    cleaned
}

/// Table client -> identifiant de parcours (première occurrence)
fn client_table(features: &[Value]) -> HashMap<String, String> {
    let mut table = HashMap::new();

    for props in features
        .iter()
        .filter_map(|feature| feature.get("properties").and_then(Value::as_object))
    {
        let client = props.get("Client").and_then(Value::as_str);
        let course = props.get(COURSE_ID_KEY).and_then(Value::as_str);
        if let (Some(client), Some(course)) = (client, course) {
            if !client.is_empty() && !course.is_empty() {
                table
                    .entry(client.to_string())
                    .or_insert_with(|| course.to_string());
            }
        }
    }

    table
}

fn is_empty_course_id(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
