// Spatial Impact Classifier: decides whether a hazard reaches a facility,
// preferring the event's polygon footprint and falling back to a
// type-specific impact radius around the event point.
use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::geometry::{point_in_ring, round2, EARTH_RADIUS_KM};
use crate::models::{DisasterEvent, Facility, ImpactMethod, ImpactRecord};

/// Radius applied to hazard types without a specific entry.
pub const DEFAULT_IMPACT_RADIUS_KM: f64 = 100.0;
/// Earthquake magnitude assumed when the title carries none.
pub const DEFAULT_EQ_MAGNITUDE: f64 = 6.0;
/// Kilometers of impact radius per unit of earthquake magnitude.
const EQ_RADIUS_KM_PER_MAGNITUDE: f64 = 50.0;

lazy_static! {
    /// Impact radius in km by hazard type code. Earthquakes are handled
    /// separately since their radius scales with magnitude.
    static ref IMPACT_RADIUS_KM: HashMap<&'static str, f64> = {
        let mut m = HashMap::new();
        m.insert("tc", 300.0); // tropical cyclone
        m.insert("fl", 100.0); // flood
        m.insert("vo", 100.0); // volcanic activity
        m.insert("dr", 500.0); // drought, regional by nature
        m
    };

    /// "m=6.2" style magnitude marker in GDACS-like titles.
    static ref MAGNITUDE_RE: Regex = Regex::new(r"m=([0-9.]+)").unwrap();
}

/// Extract an earthquake magnitude from an event title, defaulting when the
/// marker is absent or unparseable.
pub fn extract_magnitude(title: &str) -> f64 {
    MAGNITUDE_RE
        .captures(&title.to_lowercase())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or(DEFAULT_EQ_MAGNITUDE)
}

/// The impact radius in kilometers for an event, from the static type table.
pub fn impact_radius_km(disaster: &DisasterEvent) -> f64 {
    let type_code = disaster.event_type.to_lowercase();
    if type_code == "eq" {
        extract_magnitude(&disaster.title) * EQ_RADIUS_KM_PER_MAGNITUDE
    } else {
        IMPACT_RADIUS_KM
            .get(type_code.as_str())
            .copied()
            .unwrap_or(DEFAULT_IMPACT_RADIUS_KM)
    }
}

/// Great-circle distance between two (lat, lng) points in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Classify one facility/disaster pair.
///
/// Polygon containment wins outright: a facility inside the event footprint
/// is impacted at distance 0 regardless of the radius table. Otherwise the
/// facility is impacted when its great-circle distance to the event point is
/// within the type radius (inclusive). Events or facilities without usable
/// coordinates contribute nothing.
pub fn classify(facility: &Facility, disaster: &DisasterEvent) -> Option<ImpactRecord> {
    let (f_lat, f_lng) = facility.position()?;
    let (d_lat, d_lng) = disaster.position()?;

    if let Some(ring) = disaster.valid_polygon() {
        if point_in_ring(f_lat, f_lng, ring) {
            return Some(ImpactRecord {
                disaster: disaster.clone(),
                distance_km: 0.0,
                method: ImpactMethod::Polygon,
            });
        }
    }

    let distance = haversine_km(f_lat, f_lng, d_lat, d_lng);
    if distance <= impact_radius_km(disaster) {
        return Some(ImpactRecord {
            disaster: disaster.clone(),
            distance_km: round2(distance),
            method: ImpactMethod::Radius,
        });
    }

    None
}
