// This is the models module containing the shared data structures exchanged
// with callers: facility/disaster inputs and the plain assessment outputs.
use std::collections::HashMap;

use geo_types::Coord;
use serde::{Deserialize, Serialize};

use crate::geometry::{BoundingBox, Geometry};

/// A point facility (hospital, warehouse, school, ...) with an optional bag
/// of passthrough attributes from the source CSV/Excel row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl Facility {
    /// Usable position, or `None` when either component is not finite.
    pub fn position(&self) -> Option<(f64, f64)> {
        if self.latitude.is_finite() && self.longitude.is_finite() {
            Some((self.latitude, self.longitude))
        } else {
            None
        }
    }
}

/// A hazard event from an external feed. Coordinates are optional because
/// feeds deliver malformed entries; those events are skipped silently during
/// classification and excluded from statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterEvent {
    /// Type code, e.g. "eq", "tc", "fl", "vo", "dr". Matched case-insensitively.
    pub event_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub alert_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Outer ring of the event footprint, when the feed provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Vec<Coord<f64>>>,
}

impl DisasterEvent {
    /// Usable position, or `None` when a component is missing or not finite.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => Some((lat, lng)),
            _ => None,
        }
    }

    /// The footprint ring, only when it has enough points to form a polygon.
    pub fn valid_polygon(&self) -> Option<&[Coord<f64>]> {
        match &self.polygon {
            Some(ring) if ring.len() >= 3 => Some(ring),
            _ => None,
        }
    }
}

/// An administrative boundary built from one shapefile feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct District {
    pub id: usize,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
}

/// How a facility/disaster pair was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpactMethod {
    Polygon,
    Radius,
}

/// One facility/disaster hit. Created only for impacted pairs, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactRecord {
    pub disaster: DisasterEvent,
    /// Kilometers, rounded to 2 decimals. 0 for polygon containment.
    pub distance_km: f64,
    pub method: ImpactMethod,
}

/// A facility together with every hazard that reaches it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactedFacility {
    pub facility: Facility,
    pub impacts: Vec<ImpactRecord>,
}

/// Per-hazard aggregate. One entry per distinct hazard identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisasterStat {
    pub id: String,
    pub event_type: String,
    pub alert_level: String,
    pub name: String,
    pub severity: String,
    pub affected_facilities: usize,
    pub impact_area_km2: f64,
    pub uses_polygon: bool,
}

/// Facilities impacted by a specific unordered pair of hazards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlapGroup {
    /// The two hazard identities, sorted so (A,B) and (B,A) collapse.
    pub disasters: [String; 2],
    pub facilities: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_disasters: usize,
    pub total_facilities: usize,
    pub impacted_facility_count: usize,
    /// Rounded integer percent; 0 when there are no facilities.
    pub percentage_impacted: u32,
    pub disaster_stats: Vec<DisasterStat>,
    pub overlapping_impacts: Vec<OverlapGroup>,
}

/// Output of the statistics aggregator, shaped for report/AI consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactSummary {
    pub impacted_facilities: Vec<ImpactedFacility>,
    pub statistics: Statistics,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Campaign viability decision for one district.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "CAUTION")]
    Caution,
    #[serde(rename = "DELAY")]
    Delay,
    #[serde(rename = "NO-GO")]
    NoGo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictAssessment {
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub total_facilities: usize,
    pub impacted_facilities: usize,
    pub disaster_count: usize,
    /// Rounded integer percent of facilities in the district that are impacted.
    pub impact_rate: u32,
    pub decision: Decision,
    pub viability_score: u32,
    pub reason: String,
}

/// District rollup plus per-decision totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictSummary {
    pub assessments: Vec<DistrictAssessment>,
    pub total_districts: usize,
    pub assessed_districts: usize,
    pub go: usize,
    pub caution: usize,
    pub delay: usize,
    pub no_go: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
