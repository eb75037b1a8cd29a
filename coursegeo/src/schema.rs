//! Template des propriétés par défaut
//!
//! Chaque clé du template associe un nom de propriété à une valeur par défaut.
//! Le type de cette valeur (`ValueKind`) est le type attendu pour la propriété.
//! Les types forment un ensemble fermé, chacun avec sa fonction de conversion.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use serde_json::{Number, Value};

use crate::CourseError;

/// Propriété portant l'identifiant de parcours
pub const COURSE_ID_KEY: &str = "mapdscourseid";

/// Emplacement conventionnel du template
pub const DEFAULT_SCHEMA_PATH: &str = "./sample_cleanup/default_feature_properties.json";

/// Type d'une valeur JSON tel que vu par le template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    Float,
    String,
    List,
    Object,
}

impl ValueKind {
    /// Type d'une valeur JSON (`1` est un entier, `1.0` un flottant)
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::List,
            Value::Object(_) => Self::Object,
        }
    }

    /// Nom affiché dans les rapports
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }

    /// Convertit une valeur vers ce type.
    ///
    /// Retourne `None` si la conversion échoue; l'appelant substitue alors
    /// la valeur par défaut du template.
    pub fn coerce(self, value: &Value) -> Option<Value> {
        if Self::of(value) == self {
            return Some(value.clone());
        }

        match (self, value) {
            (Self::Integer, Value::Number(n)) => n
                .as_f64()
                .map(f64::trunc)
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| Value::from(f as i64)),
            (Self::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (Self::Integer, Value::Bool(b)) => Some(Value::from(i64::from(*b))),

            (Self::Float, Value::Number(n)) => {
                n.as_f64().and_then(Number::from_f64).map(Value::Number)
            }
            (Self::Float, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            (Self::Float, Value::Bool(b)) => {
                Number::from_f64(if *b { 1.0 } else { 0.0 }).map(Value::Number)
            }

            (Self::String, Value::Number(n)) => Some(Value::String(n.to_string())),
            (Self::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (Self::String, v @ (Value::Array(_) | Value::Object(_))) => {
                Some(Value::String(v.to_string()))
            }

            (Self::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            (Self::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Some(Value::Bool(false)),
                Some(1) => Some(Value::Bool(true)),
                _ => None,
            },

            // Listes et objets stockés sous forme de texte JSON
            (Self::List, Value::String(s)) => {
                serde_json::from_str::<Value>(s).ok().filter(Value::is_array)
            }
            (Self::Object, Value::String(s)) => {
                serde_json::from_str::<Value>(s).ok().filter(Value::is_object)
            }

            _ => None,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Une propriété du template
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Nom de la propriété
    pub name: String,

    /// Type attendu (déduit de la valeur par défaut)
    pub kind: ValueKind,

    default: Value,
}

impl Field {
    /// Copie indépendante de la valeur par défaut.
    ///
    /// Chaque feature reçoit sa propre copie: aucune liste n'est partagée.
    pub fn default_value(&self) -> Value {
        self.default.clone()
    }

    /// Indique si la valeur a le type attendu
    pub fn accepts(&self, value: &Value) -> bool {
        ValueKind::of(value) == self.kind
    }
}

/// Template des propriétés par défaut, dans l'ordre du fichier source
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Charge le template depuis un fichier JSON
    pub fn load(path: &Path) -> Result<Self, CourseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse le template depuis du texte JSON
    pub fn from_json_str(json: &str) -> Result<Self, CourseError> {
        let entries: SchemaEntries = serde_json::from_str(json)?;
        Self::from_entries(entries.0)
    }

    /// Construit le template depuis des paires (clé, défaut) ordonnées.
    ///
    /// Rejette les clés dupliquées, les défauts `null` et un template sans
    /// identifiant de parcours de type texte.
    pub fn from_entries<I>(entries: I) -> Result<Self, CourseError>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut fields = Vec::new();
        let mut index = HashMap::new();

        for (name, default) in entries {
            let kind = ValueKind::of(&default);
            if kind == ValueKind::Null {
                return Err(CourseError::schema(format!(
                    "default value of '{}' is null",
                    name
                )));
            }
            if index.contains_key(&name) {
                return Err(CourseError::schema(format!("duplicate key '{}'", name)));
            }
            index.insert(name.clone(), fields.len());
            fields.push(Field {
                name,
                kind,
                default,
            });
        }

        match index.get(COURSE_ID_KEY).map(|&i| fields[i].kind) {
            Some(ValueKind::String) => {}
            Some(kind) => {
                return Err(CourseError::schema(format!(
                    "'{}' must default to a string, found {}",
                    COURSE_ID_KEY, kind
                )))
            }
            None => {
                return Err(CourseError::schema(format!(
                    "missing required key '{}'",
                    COURSE_ID_KEY
                )))
            }
        }

        Ok(Self { fields, index })
    }

    /// Propriétés dans l'ordre du template
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Propriété par nom
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    /// Indique si la clé fait partie du template
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Noms des propriétés dans l'ordre du template
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = SchemaEntries::deserialize(deserializer)?;
        Schema::from_entries(entries.0).map_err(de::Error::custom)
    }
}

/// Paires (clé, défaut) brutes, doublons conservés pour pouvoir les rejeter
struct SchemaEntries(Vec<(String, Value)>);

impl<'de> Deserialize<'de> for SchemaEntries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = SchemaEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a JSON object mapping property names to default values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, Value>()? {
                    entries.push((key, value));
                }
                Ok(SchemaEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Schema {
        Schema::from_json_str(
            r#"{"Hole": 0, "Type": "", "Par": 4.0, "Tags": [], "Active": true, "mapdscourseid": ""}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(ValueKind::of(&json!(1)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(1.0)), ValueKind::Float);
        assert_eq!(ValueKind::of(&json!("1")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!(false)), ValueKind::Boolean);
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!([1])), ValueKind::List);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
    }

    #[test]
    fn test_schema_order_and_kinds() {
        let schema = sample();
        let keys: Vec<&str> = schema.keys().collect();
        assert_eq!(keys, ["Hole", "Type", "Par", "Tags", "Active", "mapdscourseid"]);
        assert_eq!(schema.get("Par").unwrap().kind, ValueKind::Float);
        assert_eq!(schema.get("Tags").unwrap().kind, ValueKind::List);
        assert!(schema.contains("Active"));
        assert!(!schema.contains("extra"));
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let err = Schema::from_json_str(r#"{"Hole": 0, "Hole": 1, "mapdscourseid": ""}"#)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate key 'Hole'"));
    }

    #[test]
    fn test_schema_rejects_null_default() {
        assert!(Schema::from_json_str(r#"{"Hole": null, "mapdscourseid": ""}"#).is_err());
    }

    #[test]
    fn test_schema_requires_course_id() {
        assert!(Schema::from_json_str(r#"{"Hole": 0}"#).is_err());
        assert!(Schema::from_json_str(r#"{"Hole": 0, "mapdscourseid": 0}"#).is_err());
        assert!(Schema::from_json_str(r#"[1, 2]"#).is_err());
    }

    #[test]
    fn test_default_value_is_independent_copy() {
        let schema = sample();
        let field = schema.get("Tags").unwrap();
        let mut first = field.default_value();
        first.as_array_mut().unwrap().push(json!("A"));
        assert_eq!(field.default_value(), json!([]));
    }

    #[test]
    fn test_coerce_integer() {
        assert_eq!(ValueKind::Integer.coerce(&json!("3")), Some(json!(3)));
        assert_eq!(ValueKind::Integer.coerce(&json!(" 12 ")), Some(json!(12)));
        assert_eq!(ValueKind::Integer.coerce(&json!(3.7)), Some(json!(3)));
        assert_eq!(ValueKind::Integer.coerce(&json!(true)), Some(json!(1)));
        assert_eq!(ValueKind::Integer.coerce(&json!("3.5")), None);
        assert_eq!(ValueKind::Integer.coerce(&json!("abc")), None);
        assert_eq!(ValueKind::Integer.coerce(&json!(null)), None);
    }

    #[test]
    fn test_coerce_float() {
        assert_eq!(ValueKind::Float.coerce(&json!(3)), Some(json!(3.0)));
        assert_eq!(ValueKind::Float.coerce(&json!("2.5")), Some(json!(2.5)));
        assert_eq!(ValueKind::Float.coerce(&json!("NaN")), None);
        assert_eq!(ValueKind::Float.coerce(&json!([])), None);
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(ValueKind::String.coerce(&json!(12)), Some(json!("12")));
        assert_eq!(ValueKind::String.coerce(&json!(false)), Some(json!("false")));
        assert_eq!(ValueKind::String.coerce(&json!(["a"])), Some(json!(r#"["a"]"#)));
        assert_eq!(ValueKind::String.coerce(&json!(null)), None);
    }

    #[test]
    fn test_coerce_list_and_object() {
        assert_eq!(ValueKind::List.coerce(&json!(r#"["a","b"]"#)), Some(json!(["a", "b"])));
        assert_eq!(ValueKind::List.coerce(&json!("3")), None);
        assert_eq!(ValueKind::List.coerce(&json!(null)), None);
        assert_eq!(ValueKind::Object.coerce(&json!(r#"{"a":1}"#)), Some(json!({"a": 1})));
        assert_eq!(ValueKind::Object.coerce(&json!("[]")), None);
    }

    #[test]
    fn test_coerce_boolean() {
        assert_eq!(ValueKind::Boolean.coerce(&json!("TRUE")), Some(json!(true)));
        assert_eq!(ValueKind::Boolean.coerce(&json!(0)), Some(json!(false)));
        assert_eq!(ValueKind::Boolean.coerce(&json!(2)), None);
    }

    #[test]
    fn test_coerce_same_kind_is_identity() {
        assert_eq!(ValueKind::String.coerce(&json!("x")), Some(json!("x")));
    }
}
