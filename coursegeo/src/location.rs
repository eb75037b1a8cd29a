//! Résolution d'une position GPS vers les zones d'un parcours
//!
//! Les géométries GeoJSON sont converties en types `geo` puis testées
//! par inclusion (`Contains`). Seuls les polygones délimitent une zone.

use geo::{Contains, Geometry, Point};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{CourseError, ValueKind};

/// Ordre de préférence par défaut des zones
pub const DEFAULT_AREA_PRIORITY: [&str; 5] = ["홀영역", "그린", "지역", "코스", "전면"];

/// Zone du parcours contenant une position
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Location {
    pub hole: i64,
    pub area: String,
    pub client: String,
    pub course: String,
}

impl Location {
    /// None si `Hole` est renseigné mais non convertible en entier
    fn from_properties(props: &Map<String, Value>) -> Option<Self> {
        let text = |key: &str| {
            props
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let hole = match props.get("Hole") {
            None | Some(Value::Null) => 0,
            Some(raw) => ValueKind::Integer.coerce(raw)?.as_i64()?,
        };

        Some(Self {
            hole,
            area: text("Type"),
            client: text("Client"),
            course: text("Course"),
        })
    }
}

/// Toutes les zones contenant la position, dans l'ordre des features.
///
/// Une coordonnée nulle (0) signifie une position GPS absente: aucun résultat.
pub fn locations_at(collection: &Value, lon: f64, lat: f64) -> Vec<Location> {
    if lon == 0.0 || lat == 0.0 {
        return Vec::new();
    }

    let point = Point::new(lon, lat);
    let Some(features) = collection.get("features").and_then(Value::as_array) else {
        return Vec::new();
    };

    let empty = Map::new();
    features
        .iter()
        .filter(|feature| match feature_geometry(feature) {
            Ok(Some(geometry)) => contains(&geometry, &point),
            Ok(None) => false,
            Err(e) => {
                debug!(error = %e, "Skipping feature geometry");
                false
            }
        })
        .filter_map(|feature| {
            let props = feature
                .get("properties")
                .and_then(Value::as_object)
                .unwrap_or(&empty);
            let location = Location::from_properties(props);
            if location.is_none() {
                debug!(hole = ?props.get("Hole"), "Skipping feature with invalid hole");
            }
            location
        })
        .collect()
}

/// Zone préférée selon `priority`, sinon la première zone trouvée
pub fn best_location_at(
    collection: &Value,
    lon: f64,
    lat: f64,
    priority: &[&str],
) -> Option<Location> {
    let mut locations = locations_at(collection, lon, lat);

    let preferred = priority
        .iter()
        .find_map(|area| locations.iter().position(|loc| loc.area == *area));

    match preferred {
        Some(index) => Some(locations.swap_remove(index)),
        None if locations.is_empty() => None,
        None => Some(locations.swap_remove(0)),
    }
}

/// Géométrie `geo` d'une feature (None si absente)
fn feature_geometry(feature: &Value) -> Result<Option<Geometry<f64>>, CourseError> {
    let raw = match feature.get("geometry") {
        None | Some(Value::Null) => return Ok(None),
        Some(raw) => raw.clone(),
    };

    let geometry = geojson::Geometry::from_json_value(raw)
        .map_err(|e| CourseError::Geometry(e.to_string()))?;
    Geometry::<f64>::try_from(geometry)
        .map(Some)
        .map_err(|e| CourseError::Geometry(e.to_string()))
}

fn contains(geometry: &Geometry<f64>, point: &Point<f64>) -> bool {
    match geometry {
        Geometry::Polygon(polygon) => polygon.contains(point),
        Geometry::MultiPolygon(multi) => multi.contains(point),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(x0: f64, y0: f64, size: f64) -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[
                [x0, y0], [x0 + size, y0], [x0 + size, y0 + size], [x0, y0 + size], [x0, y0]
            ]]
        })
    }

    fn course() -> Value {
        json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": square(128.0, 35.0, 1.0),
                 "properties": {"Hole": 3, "Type": "코스", "Client": "Sky", "Course": "East"}},
                {"type": "Feature", "geometry": square(128.4, 35.4, 0.2),
                 "properties": {"Hole": "3", "Type": "그린", "Client": "Sky", "Course": "East"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [128.5, 35.5]},
                 "properties": {"Type": "홀영역"}},
                {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": "broken"},
                 "properties": {"Type": "홀영역"}},
                {"type": "Feature", "geometry": null, "properties": {"Type": "전면"}}
            ]
        })
    }

    #[test]
    fn test_locations_at() {
        let locations = locations_at(&course(), 128.5, 35.5);
        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].area, "코스");
        assert_eq!(locations[1].hole, 3);
        assert_eq!(locations[1].client, "Sky");
    }

    #[test]
    fn test_zero_coordinate_yields_nothing() {
        assert!(locations_at(&course(), 0.0, 35.5).is_empty());
        assert!(locations_at(&course(), 128.5, 0.0).is_empty());
    }

    #[test]
    fn test_best_location_priority() {
        let best = best_location_at(&course(), 128.5, 35.5, &DEFAULT_AREA_PRIORITY).unwrap();
        assert_eq!(best.area, "그린");

        let best = best_location_at(&course(), 128.5, 35.5, &["코스"]).unwrap();
        assert_eq!(best.area, "코스");
    }

    #[test]
    fn test_best_location_falls_back_to_first() {
        let best = best_location_at(&course(), 128.1, 35.1, &["그린"]).unwrap();
        assert_eq!(best.area, "코스");
        assert!(best_location_at(&course(), 10.0, 10.0, &DEFAULT_AREA_PRIORITY).is_none());
    }

    #[test]
    fn test_multipolygon() {
        let collection = json!({"type": "FeatureCollection", "features": [{
            "type": "Feature",
            "geometry": {"type": "MultiPolygon", "coordinates": [
                square(1.0, 1.0, 1.0)["coordinates"].clone(),
                square(5.0, 5.0, 1.0)["coordinates"].clone()
            ]},
            "properties": {"Hole": 9, "Type": "지역"}
        }]});

        let locations = locations_at(&collection, 5.5, 5.5);
        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].hole, 9);
        assert_eq!(locations[0].course, "");
    }

    #[test]
    fn test_unconvertible_hole_skips_feature() {
        let collection = json!({"type": "FeatureCollection", "features": [
            {"type": "Feature", "geometry": square(1.0, 1.0, 1.0),
             "properties": {"Hole": "north", "Type": "그린"}},
            {"type": "Feature", "geometry": square(1.0, 1.0, 1.0),
             "properties": {"Hole": null, "Type": "코스"}},
            {"type": "Feature", "geometry": square(1.0, 1.0, 1.0),
             "properties": {"Type": "지역"}}
        ]});

        let locations = locations_at(&collection, 1.5, 1.5);
        let areas: Vec<&str> = locations.iter().map(|loc| loc.area.as_str()).collect();
        assert_eq!(areas, ["코스", "지역"]);
        assert!(locations.iter().all(|loc| loc.hole == 0));

        let best = best_location_at(&collection, 1.5, 1.5, &["그린"]).unwrap();
        assert_eq!(best.area, "코스");
    }
}
