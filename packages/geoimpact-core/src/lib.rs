//! Core geospatial impact assessment engine: geometry normalization,
//! facility/hazard impact classification, statistics aggregation and
//! district-level rollups. Pure synchronous computation over in-memory
//! records; file parsing, feeds, rendering and report generation live in
//! external collaborators.

// Shared coordinate/geometry model
pub mod geometry;
// Geometry normalization (reprojection + simplification)
pub mod projection;
// Shapefile feature records -> District entities
pub mod districts;
// Facility/disaster impact classification
pub mod classifier;
// Cross-product statistics and overlap aggregation
pub mod statistics;
// District-level spatial rollup and viability decisions
pub mod rollup;
// Shared input/output record types
pub mod models;

pub use classifier::{classify, haversine_km, impact_radius_km};
pub use districts::{build_districts, FeatureRecord};
pub use geometry::{BoundingBox, Geometry};
pub use models::{
    Decision, DisasterEvent, DisasterStat, District, DistrictAssessment, DistrictSummary,
    Facility, ImpactMethod, ImpactRecord, ImpactSummary, ImpactedFacility, OverlapGroup,
    Statistics,
};
pub use projection::{
    normalize, reproject, simplify, ProjectionError, ReprojectionIssue, SourceProjection,
};
pub use rollup::{aggregate_by_district, apply_override, rank_for_review, Membership};
pub use statistics::aggregate;
