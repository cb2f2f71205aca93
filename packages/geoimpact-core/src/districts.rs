// District Builder: turns raw shapefile feature records into District
// entities. Attribute resolution is an ordered-fallback heuristic because
// boundary files carry no universal schema for names.
use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::geometry::Geometry;
use crate::models::District;
use crate::projection::{normalize, SourceProjection};

/// One parsed boundary feature as delivered by the external shapefile
/// reader: free-form properties plus an optional geometry.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureRecord {
    #[serde(default)]
    pub properties: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

// Candidate attribute keys, tried in order. Drawn from common GIS naming
// conventions (GADM, HDX, OCHA admin boundaries).
const NAME_KEYS: &[&str] = &[
    "NAME", "DISTRICT", "District", "name", "district", "ADM2_EN", "ADM2_NAME", "NAME_2",
];
const COUNTRY_KEYS: &[&str] = &["COUNTRY", "Country", "ADM0_NAME", "NAME_0"];
const REGION_KEYS: &[&str] = &["REGION", "Region", "ADM1_NAME", "NAME_1"];
const POPULATION_KEYS: &[&str] = &["POPULATION", "Population", "POP"];

fn resolve_text(
    properties: &HashMap<String, serde_json::Value>,
    keys: &[&str],
) -> Option<String> {
    for key in keys {
        match properties.get(*key) {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => {
                return Some(s.trim().to_string())
            }
            Some(serde_json::Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

fn resolve_number(
    properties: &HashMap<String, serde_json::Value>,
    keys: &[&str],
) -> Option<f64> {
    for key in keys {
        match properties.get(*key) {
            Some(serde_json::Value::Number(n)) => return n.as_f64(),
            Some(serde_json::Value::String(s)) => {
                if let Ok(v) = s.trim().parse::<f64>() {
                    return Some(v);
                }
            }
            _ => {}
        }
    }
    None
}

/// Build districts from raw feature records, normalizing each geometry
/// (reproject when a source projection is declared, then simplify) and
/// computing bounds afterwards.
pub fn build_districts(
    features: &[FeatureRecord],
    projection_definition: Option<&str>,
) -> Vec<District> {
    let projection = projection_definition.map(SourceProjection::parse);

    debug!(
        features = features.len(),
        projection = ?projection,
        "building districts from boundary features"
    );

    features
        .iter()
        .enumerate()
        .map(|(idx, feature)| {
            let name = resolve_text(&feature.properties, NAME_KEYS)
                .unwrap_or_else(|| format!("District {}", idx + 1));
            let country = resolve_text(&feature.properties, COUNTRY_KEYS);
            let region = resolve_text(&feature.properties, REGION_KEYS);
            let population = resolve_number(&feature.properties, POPULATION_KEYS);

            let geometry = feature
                .geometry
                .as_ref()
                .map(|g| normalize(g, projection.as_ref()).0);
            // Bounds always derive from the stored (normalized) geometry
            let bounds = geometry.as_ref().and_then(Geometry::bounds);

            District {
                id: idx,
                name,
                country,
                region,
                population,
                geometry,
                bounds,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Coord;
    use serde_json::json;

    fn props(entries: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn square_geometry() -> Geometry {
        Geometry::Polygon(vec![
            Coord { x: 120.0, y: 14.0 },
            Coord { x: 121.0, y: 14.0 },
            Coord { x: 121.0, y: 15.0 },
            Coord { x: 120.0, y: 15.0 },
        ])
    }

    #[test]
    fn test_name_resolution_order() {
        let features = vec![FeatureRecord {
            properties: props(&[
                ("ADM2_EN", json!("Quezon City")),
                ("NAME_2", json!("ignored, lower priority")),
            ]),
            geometry: Some(square_geometry()),
        }];
        let districts = build_districts(&features, None);
        assert_eq!(districts[0].name, "Quezon City");
    }

    #[test]
    fn test_synthetic_name_fallback() {
        let features = vec![
            FeatureRecord {
                properties: HashMap::new(),
                geometry: None,
            },
            FeatureRecord {
                properties: props(&[("IRRELEVANT", json!("x"))]),
                geometry: None,
            },
        ];
        let districts = build_districts(&features, None);
        assert_eq!(districts[0].name, "District 1");
        assert_eq!(districts[1].name, "District 2");
        assert!(districts[0].bounds.is_none());
    }

    #[test]
    fn test_country_region_population() {
        let features = vec![FeatureRecord {
            properties: props(&[
                ("NAME", json!("Marikina")),
                ("ADM0_NAME", json!("Philippines")),
                ("ADM1_NAME", json!("NCR")),
                ("POP", json!("450000")),
            ]),
            geometry: Some(square_geometry()),
        }];
        let d = &build_districts(&features, None)[0];
        assert_eq!(d.country.as_deref(), Some("Philippines"));
        assert_eq!(d.region.as_deref(), Some("NCR"));
        assert_eq!(d.population, Some(450000.0));
    }

    #[test]
    fn test_bounds_computed_after_normalization() {
        // Web Mercator square around the origin
        let features = vec![FeatureRecord {
            properties: props(&[("NAME", json!("Origin"))]),
            // Enough vertices that stride thinning still keeps the extremes
            geometry: Some(Geometry::Polygon(vec![
                Coord { x: -111_319.49, y: -111_325.6 },
                Coord { x: 0.0, y: -111_325.6 },
                Coord { x: 111_319.49, y: -111_325.6 },
                Coord { x: 111_319.49, y: 111_325.6 },
                Coord { x: 0.0, y: 111_325.6 },
                Coord { x: -111_319.49, y: 111_325.6 },
                Coord { x: -111_319.49, y: -111_325.6 },
            ])),
        }];
        let districts = build_districts(
            &features,
            Some("PROJCS[\"WGS 84 / Pseudo-Mercator\",AUTHORITY[\"EPSG\",\"3857\"]]"),
        );
        let bounds = districts[0].bounds.unwrap();
        // Bounds reflect reprojected degrees, not source meters
        assert!(bounds.max_lng <= 1.1 && bounds.max_lng >= 0.9);
        assert!(bounds.min_lat >= -1.1 && bounds.min_lat <= -0.9);
        assert!((bounds.center.0).abs() < 0.01);
    }
}
