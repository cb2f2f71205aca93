// District Aggregator: buckets facilities and hazards into administrative
// districts and derives a campaign viability signal for each.
use std::collections::HashSet;

use tracing::debug;

use crate::geometry::BoundingBox;
use crate::models::{
    Decision, DisasterEvent, District, DistrictAssessment, DistrictSummary, Facility,
    ImpactedFacility,
};

/// Spatial membership strategy for a district. The default implementation is
/// bounding-box containment; a true point-in-polygon test can be substituted
/// without touching the aggregation. Callers may depend on the looser
/// behavior, so it is never silently tightened here.
pub trait Membership {
    fn contains(&self, lat: f64, lng: f64) -> bool;
}

/// Bounding-box membership. A point slightly outside an irregular district
/// boundary but inside its box counts as a member; known limitation.
pub struct BoundsMembership<'a>(pub &'a BoundingBox);

impl Membership for BoundsMembership<'_> {
    fn contains(&self, lat: f64, lng: f64) -> bool {
        self.0.contains(lat, lng)
    }
}

/// Deterministic decision from the impact rate alone.
pub fn decide(impact_rate: u32) -> Decision {
    if impact_rate > 50 {
        Decision::Delay
    } else if impact_rate > 20 {
        Decision::Caution
    } else {
        Decision::Go
    }
}

/// Viability score for a decision: `100 - rate - 10*disasters`, clamped to
/// 0..=100 and additionally capped so the score never implies a better
/// outlook than the decision category.
pub fn viability_score(impact_rate: u32, disaster_count: usize, decision: Decision) -> u32 {
    let base = (100i64 - impact_rate as i64 - 10 * disaster_count as i64).clamp(0, 100) as u32;
    match decision {
        Decision::NoGo => 0,
        Decision::Delay => base.min(40),
        Decision::Caution => base.min(70),
        Decision::Go => base,
    }
}

fn assess(
    district: &District,
    facilities: &[Facility],
    disasters: &[DisasterEvent],
    impacted_names: &HashSet<&str>,
) -> Option<DistrictAssessment> {
    let bounds = district.bounds.as_ref()?;
    let membership = BoundsMembership(bounds);

    let members: Vec<&Facility> = facilities
        .iter()
        .filter(|f| {
            f.position()
                .map(|(lat, lng)| membership.contains(lat, lng))
                .unwrap_or(false)
        })
        .collect();

    // Districts with no facilities are not assessable
    if members.is_empty() {
        return None;
    }

    let impacted = members
        .iter()
        .filter(|f| impacted_names.contains(f.name.as_str()))
        .count();

    let disaster_count = disasters
        .iter()
        .filter(|d| {
            d.position()
                .map(|(lat, lng)| membership.contains(lat, lng))
                .unwrap_or(false)
        })
        .count();

    let impact_rate = (100.0 * impacted as f64 / members.len() as f64).round() as u32;
    let decision = decide(impact_rate);

    Some(DistrictAssessment {
        district: district.name.clone(),
        country: district.country.clone(),
        region: district.region.clone(),
        total_facilities: members.len(),
        impacted_facilities: impacted,
        disaster_count,
        impact_rate,
        decision,
        viability_score: viability_score(impact_rate, disaster_count, decision),
        reason: format!(
            "{}% facilities impacted, {} disasters",
            impact_rate, disaster_count
        ),
    })
}

/// Roll facilities, hazards and impact results up into per-district
/// viability assessments. Membership is bounding-box only; districts whose
/// box contains no facility are excluded from the assessable set.
pub fn aggregate_by_district(
    districts: &[District],
    facilities: &[Facility],
    disasters: &[DisasterEvent],
    impacted: &[ImpactedFacility],
) -> DistrictSummary {
    let impacted_names: HashSet<&str> = impacted
        .iter()
        .map(|entry| entry.facility.name.as_str())
        .collect();

    let assessments: Vec<DistrictAssessment> = districts
        .iter()
        .filter_map(|district| assess(district, facilities, disasters, &impacted_names))
        .collect();

    debug!(
        districts = districts.len(),
        assessed = assessments.len(),
        "district rollup complete"
    );

    let count = |d: Decision| assessments.iter().filter(|a| a.decision == d).count();

    let message = if assessments.is_empty() {
        Some("No facilities found in any district".to_string())
    } else {
        None
    };

    DistrictSummary {
        total_districts: districts.len(),
        assessed_districts: assessments.len(),
        go: count(Decision::Go),
        caution: count(Decision::Caution),
        delay: count(Decision::Delay),
        no_go: count(Decision::NoGo),
        assessments,
        message,
    }
}

/// Order assessments for delegation to an external recommendation
/// collaborator: facility count descending, then impact rate descending.
/// Callers truncate this ordering to bound the collaborator's cost and fall
/// back to the deterministic decision for the remainder.
pub fn rank_for_review(assessments: &mut [DistrictAssessment]) {
    assessments.sort_by(|a, b| {
        b.total_facilities
            .cmp(&a.total_facilities)
            .then(b.impact_rate.cmp(&a.impact_rate))
    });
}

/// Apply an external decision override, recomputing the score caps so the
/// score stays consistent with the overridden category.
pub fn apply_override(
    assessment: &mut DistrictAssessment,
    decision: Decision,
    reason: impl Into<String>,
) {
    assessment.decision = decision;
    assessment.reason = reason.into();
    assessment.viability_score =
        viability_score(assessment.impact_rate, assessment.disaster_count, decision);
}
