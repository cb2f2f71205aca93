// Impact Statistics Aggregator: runs the classifier over the full
// facility x disaster cross product and rolls the hits up into per-hazard
// stats, overlap groups and global percentages.
use std::collections::{BTreeMap, BTreeSet, HashMap};

use rayon::prelude::*;
use tracing::debug;

use crate::classifier::{classify, impact_radius_km};
use crate::geometry::{ring_area_km2, round2};
use crate::models::{
    DisasterEvent, DisasterStat, Facility, ImpactSummary, ImpactedFacility, OverlapGroup,
    Statistics,
};

/// The de-duplication identity of a hazard: its name, else its title, else a
/// synthetic "type@lat,lng" key. A de-duplication heuristic, not a
/// guaranteed-unique id: feeds repeat events under the same name across
/// refreshes and this folds them together.
pub fn hazard_identity(disaster: &DisasterEvent) -> String {
    if let Some(name) = disaster.name.as_deref() {
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
    }
    if !disaster.title.trim().is_empty() {
        return disaster.title.trim().to_string();
    }
    let (lat, lng) = disaster.position().unwrap_or((0.0, 0.0));
    format!("{}@{},{}", disaster.event_type.to_lowercase(), lat, lng)
}

fn seed_stat(id: &str, disaster: &DisasterEvent) -> DisasterStat {
    let uses_polygon = disaster.valid_polygon().is_some();
    let impact_area_km2 = match disaster.valid_polygon() {
        Some(ring) => ring_area_km2(ring),
        None => {
            let r = impact_radius_km(disaster);
            std::f64::consts::PI * r * r
        }
    };

    DisasterStat {
        id: id.to_string(),
        event_type: disaster.event_type.clone(),
        alert_level: disaster.alert_level.clone(),
        name: id.to_string(),
        severity: disaster
            .severity
            .clone()
            .unwrap_or_else(|| disaster.alert_level.clone()),
        affected_facilities: 0,
        impact_area_km2: round2(impact_area_km2),
        uses_polygon,
    }
}

/// Assess every facility against every disaster and aggregate the results.
///
/// Disasters without usable coordinates are excluded outright, including
/// from the statistics. The per-facility classification loop runs in
/// parallel; all aggregation happens in a deterministic sequential merge.
pub fn aggregate(facilities: &[Facility], disasters: &[DisasterEvent]) -> ImpactSummary {
    let active: Vec<&DisasterEvent> = disasters
        .iter()
        .filter(|d| d.position().is_some())
        .collect();

    debug!(
        facilities = facilities.len(),
        disasters = disasters.len(),
        usable_disasters = active.len(),
        "running impact assessment"
    );

    // One stat per distinct hazard identity, in first-encounter order.
    let mut stats: Vec<DisasterStat> = Vec::new();
    let mut stat_index: HashMap<String, usize> = HashMap::new();
    for disaster in &active {
        let id = hazard_identity(disaster);
        if !stat_index.contains_key(&id) {
            stat_index.insert(id.clone(), stats.len());
            stats.push(seed_stat(&id, disaster));
        }
    }

    let impacted_facilities: Vec<ImpactedFacility> = facilities
        .par_iter()
        .filter_map(|facility| {
            let impacts: Vec<_> = active
                .iter()
                .filter_map(|disaster| classify(facility, disaster))
                .collect();
            if impacts.is_empty() {
                None
            } else {
                Some(ImpactedFacility {
                    facility: facility.clone(),
                    impacts,
                })
            }
        })
        .collect();

    // Per-facility identity sets drive both the affected counts and the
    // overlap pairs, so duplicate feed entries only count once.
    let mut overlaps: BTreeMap<(String, String), Vec<String>> = BTreeMap::new();
    for entry in &impacted_facilities {
        let identities: BTreeSet<String> = entry
            .impacts
            .iter()
            .map(|impact| hazard_identity(&impact.disaster))
            .collect();

        for id in &identities {
            if let Some(&i) = stat_index.get(id) {
                stats[i].affected_facilities += 1;
            }
        }

        let ids: Vec<&String> = identities.iter().collect();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                overlaps
                    .entry((ids[i].clone(), ids[j].clone()))
                    .or_default()
                    .push(entry.facility.name.clone());
            }
        }
    }

    let overlapping_impacts: Vec<OverlapGroup> = overlaps
        .into_iter()
        .map(|((a, b), facilities)| OverlapGroup {
            disasters: [a, b],
            facilities,
        })
        .collect();

    let total_facilities = facilities.len();
    let impacted_count = impacted_facilities.len();
    let percentage_impacted = if total_facilities == 0 {
        0
    } else {
        (100.0 * impacted_count as f64 / total_facilities as f64).round() as u32
    };

    let statistics = Statistics {
        total_disasters: active.len(),
        total_facilities,
        impacted_facility_count: impacted_count,
        percentage_impacted,
        disaster_stats: stats
            .into_iter()
            .filter(|s| s.affected_facilities > 0)
            .collect(),
        overlapping_impacts,
    };

    let message = if total_facilities == 0 || active.is_empty() {
        Some("No facilities or usable disasters supplied; nothing to assess".to_string())
    } else {
        None
    };

    ImpactSummary {
        impacted_facilities,
        statistics,
        message,
    }
}
