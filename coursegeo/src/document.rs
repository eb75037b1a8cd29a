//! Lecture et écriture des documents GeoJSON (FeatureCollection)
//!
//! Le document est conservé sous forme de `serde_json::Value`: la géométrie et
//! les métadonnées de premier niveau sont transmises telles quelles, l'ordre
//! des clés est préservé.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::schema::COURSE_ID_KEY;
use crate::{course_id_from_path, file_name, CourseError};

/// Un document GeoJSON identifié par son chemin
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    root: Value,
}

impl Document {
    /// Charge et parse un document depuis le disque
    pub fn load(path: &Path) -> Result<Self, CourseError> {
        let content = std::fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&content)?;
        Ok(Self::from_value(path, root))
    }

    /// Associe un contenu déjà parsé à un chemin
    pub fn from_value(path: &Path, root: Value) -> Self {
        Self {
            path: path.to_path_buf(),
            root,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Nom du fichier (ex: MGC001.json)
    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }

    /// Identifiant de parcours attendu, dérivé du nom de fichier
    pub fn course_id(&self) -> String {
        course_id_from_path(&self.path)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Liste des features
    pub fn features(&self) -> Result<&Vec<Value>, CourseError> {
        self.root
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| self.missing_features())
    }

    /// Liste des features, modifiable
    pub fn features_mut(&mut self) -> Result<&mut Vec<Value>, CourseError> {
        let error = self.missing_features();
        self.root
            .get_mut("features")
            .and_then(Value::as_array_mut)
            .ok_or(error)
    }

    /// Réécrit le document à son emplacement d'origine
    pub fn save(&self) -> Result<(), CourseError> {
        write_json(&self.path, &self.root)
    }

    pub fn into_value(self) -> Value {
        self.root
    }

    fn missing_features(&self) -> CourseError {
        CourseError::structure(self.file_name(), "no 'features' list")
    }
}

/// Propriétés d'une feature.
///
/// `properties` absent ou `null` équivaut à un objet vide; une feature qui
/// n'est pas un objet, ou des propriétés qui ne sont pas un objet, sont des
/// erreurs de structure.
pub fn feature_properties<'a>(
    feature: &'a Value,
    file: &str,
) -> Result<Option<&'a Map<String, Value>>, CourseError> {
    let Some(object) = feature.as_object() else {
        return Err(CourseError::structure(file, "feature is not an object"));
    };
    match object.get("properties") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(props)) => Ok(Some(props)),
        Some(_) => Err(CourseError::structure(file, "properties is not an object")),
    }
}

/// Propriétés d'une feature, créées vides si absentes
pub fn feature_properties_mut<'a>(
    feature: &'a mut Value,
    file: &str,
) -> Result<&'a mut Map<String, Value>, CourseError> {
    let Some(object) = feature.as_object_mut() else {
        return Err(CourseError::structure(file, "feature is not an object"));
    };
    let props = object
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if props.is_null() {
        *props = Value::Object(Map::new());
    }
    props
        .as_object_mut()
        .ok_or_else(|| CourseError::structure(file, "properties is not an object"))
}

/// Valeur texte de la propriété `Type`
pub fn feature_type(props: &Map<String, Value>) -> Option<&str> {
    props.get("Type").and_then(Value::as_str)
}

/// L'identifiant de parcours vaut `expected` (absent équivaut à "")
pub fn has_course_id(props: &Map<String, Value>, expected: &str) -> bool {
    props.get(COURSE_ID_KEY).map_or(Some(""), Value::as_str) == Some(expected)
}

/// Écrit un JSON indenté (2 espaces, UTF-8 non échappé).
///
/// Le contenu passe par un fichier temporaire voisin puis un renommage:
/// le fichier cible n'est jamais écrit partiellement.
pub fn write_json(path: &Path, value: &Value) -> Result<(), CourseError> {
    let json = serde_json::to_string_pretty(value)?;

    let mut tmp_name = path.as_os_str().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    std::fs::write(&tmp_path, json)?;
    if let Err(e) = std::fs::rename(&tmp_path, path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_load_missing_file() {
        let result = Document::load(Path::new("nonexistent/MGC001.json"));
        assert!(matches!(result, Err(CourseError::Io(_))));
    }

    #[test]
    fn test_features_missing_is_structure_error() {
        let doc = Document::from_value(Path::new("MGC001.json"), json!({"type": "FeatureCollection"}));
        assert!(matches!(doc.features(), Err(CourseError::Structure { .. })));
        assert_eq!(doc.course_id(), "MGC001");
    }

    #[test]
    fn test_feature_properties_variants() {
        let feature = json!({"type": "Feature", "properties": null});
        assert!(feature_properties(&feature, "f").unwrap().is_none());

        let feature = json!({"type": "Feature", "properties": {"Type": "그린"}});
        let props = feature_properties(&feature, "f").unwrap().unwrap();
        assert_eq!(feature_type(props), Some("그린"));

        assert!(feature_properties(&json!("feature"), "f").is_err());
        assert!(feature_properties(&json!({"properties": 3}), "f").is_err());
    }

    #[test]
    fn test_feature_properties_mut_creates_object() {
        let mut feature = json!({"type": "Feature", "properties": null});
        feature_properties_mut(&mut feature, "f")
            .unwrap()
            .insert("Hole".into(), json!(1));
        assert_eq!(feature["properties"], json!({"Hole": 1}));

        let mut feature = json!({"type": "Feature"});
        assert!(feature_properties_mut(&mut feature, "f").unwrap().is_empty());
    }

    #[test]
    fn test_write_json_keeps_non_ascii_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("TGC001.json");
        write_json(&path, &json!({"z": "홀영역", "a": 1})).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "{\n  \"z\": \"홀영역\",\n  \"a\": 1\n}");
        assert!(!dir.path().join("TGC001.json.tmp").exists());
    }
}
