// Geometry normalization: best-effort reprojection to WGS84 followed by
// payload-size simplification. Boundary files arrive in whatever reference
// system the publisher chose, declared by a free-form definition string from
// the accompanying .prj file.
use geo_types::Coord;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::Geometry;

/// Web Mercator sphere radius in meters (EPSG:3857).
const MERCATOR_RADIUS_M: f64 = 6_378_137.0;
/// Half the Web Mercator world extent in meters.
const MERCATOR_MAX_M: f64 = std::f64::consts::PI * MERCATOR_RADIUS_M;

/// Coordinate precision retained by simplification: 4 decimal places,
/// roughly 11 m at the equator.
const PRECISION_FACTOR: f64 = 10_000.0;
/// Vertex decimation stride: keep the first, the last, and every 3rd vertex.
const SIMPLIFY_STRIDE: usize = 3;

#[derive(Debug, Error)]
pub enum ProjectionError {
    #[error("coordinate ({x}, {y}) is not finite")]
    NonFinite { x: f64, y: f64 },
    #[error("coordinate ({x}, {y}) is outside the projection domain")]
    OutOfDomain { x: f64, y: f64 },
    #[error("unsupported source projection: {0}")]
    Unsupported(String),
}

/// A source coordinate reference system recognized from its definition
/// string. Unrecognized definitions still construct, so that reprojection
/// can degrade to a per-coordinate pass-through with diagnostics instead of
/// rejecting the whole boundary file.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceProjection {
    /// EPSG:4326, the canonical reference. Forward transform is the identity.
    Wgs84,
    /// EPSG:3857 / EPSG:900913 spherical Web Mercator.
    WebMercator,
    Unsupported(String),
}

impl SourceProjection {
    /// Recognize a projection from a WKT/proj-style definition string.
    /// Matching is heuristic: shapefile .prj contents vary too widely for
    /// full WKT parsing to pay off here.
    pub fn parse(definition: &str) -> SourceProjection {
        let d = definition.to_lowercase();
        // Mercator markers first: Web Mercator WKT usually mentions
        // WGS_1984 too ("WGS_1984_Web_Mercator_Auxiliary_Sphere").
        if d.contains("3857")
            || d.contains("900913")
            || d.contains("pseudo-mercator")
            || d.contains("pseudo_mercator")
            || d.contains("web mercator")
            || d.contains("web_mercator")
        {
            SourceProjection::WebMercator
        } else if d.trim().is_empty()
            || d.contains("4326")
            || d.contains("wgs84")
            || d.contains("wgs_1984")
            || d.contains("wgs 1984")
        {
            SourceProjection::Wgs84
        } else {
            SourceProjection::Unsupported(definition.trim().to_string())
        }
    }

    /// Forward transform of one coordinate into WGS84 decimal degrees.
    pub fn forward(&self, coord: Coord<f64>) -> Result<Coord<f64>, ProjectionError> {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(ProjectionError::NonFinite {
                x: coord.x,
                y: coord.y,
            });
        }

        match self {
            SourceProjection::Wgs84 => Ok(coord),
            SourceProjection::WebMercator => {
                if coord.x.abs() > MERCATOR_MAX_M || coord.y.abs() > MERCATOR_MAX_M {
                    return Err(ProjectionError::OutOfDomain {
                        x: coord.x,
                        y: coord.y,
                    });
                }
                let lng = (coord.x / MERCATOR_RADIUS_M).to_degrees();
                let lat = (coord.y / MERCATOR_RADIUS_M).sinh().atan().to_degrees();
                Ok(Coord { x: lng, y: lat })
            }
            SourceProjection::Unsupported(def) => {
                Err(ProjectionError::Unsupported(def.clone()))
            }
        }
    }
}

/// One coordinate that could not be transformed and was passed through
/// unchanged.
#[derive(Debug, Clone, Serialize)]
pub struct ReprojectionIssue {
    /// The untransformed (lng, lat-ish) pair as it appeared in the source.
    pub coordinate: (f64, f64),
    pub detail: String,
}

/// Reproject every coordinate of a geometry into WGS84. Failing coordinates
/// pass through unchanged and are collected as diagnostics; one bad vertex
/// never aborts the geometry.
pub fn reproject(
    geometry: &Geometry,
    projection: &SourceProjection,
) -> (Geometry, Vec<ReprojectionIssue>) {
    let mut issues = Vec::new();

    let transformed = geometry.map_coords(|c| match projection.forward(c) {
        Ok(out) => out,
        Err(err) => {
            warn!(x = c.x, y = c.y, error = %err, "failed to reproject coordinate, keeping original");
            issues.push(ReprojectionIssue {
                coordinate: (c.x, c.y),
                detail: err.to_string(),
            });
            c
        }
    });

    (transformed, issues)
}

fn truncate(value: f64) -> f64 {
    (value * PRECISION_FACTOR).round() / PRECISION_FACTOR
}

fn thin_ring(ring: &[Coord<f64>]) -> Vec<Coord<f64>> {
    ring.iter()
        .enumerate()
        .filter(|(i, _)| *i == 0 || *i == ring.len() - 1 || i % SIMPLIFY_STRIDE == 0)
        .map(|(_, c)| Coord {
            x: truncate(c.x),
            y: truncate(c.y),
        })
        .collect()
}

/// Reduce coordinate precision to 4 decimal places and thin ring vertices at
/// a fixed stride. This trades fidelity for payload size; it is not a
/// shape-preserving simplification like Douglas-Peucker.
pub fn simplify(geometry: &Geometry) -> Geometry {
    match geometry {
        Geometry::Point(c) => Geometry::Point(Coord {
            x: truncate(c.x),
            y: truncate(c.y),
        }),
        Geometry::Polygon(ring) => Geometry::Polygon(thin_ring(ring)),
        Geometry::MultiPolygon(rings) => {
            Geometry::MultiPolygon(rings.iter().map(|r| thin_ring(r)).collect())
        }
    }
}

/// Full normalization pass: reproject when a non-default source projection
/// is declared, then simplify. Callers must recompute bounds afterwards.
pub fn normalize(
    geometry: &Geometry,
    projection: Option<&SourceProjection>,
) -> (Geometry, Vec<ReprojectionIssue>) {
    let (reprojected, issues) = match projection {
        Some(p) if *p != SourceProjection::Wgs84 => reproject(geometry, p),
        _ => (geometry.clone(), Vec::new()),
    };

    if !issues.is_empty() {
        debug!(count = issues.len(), "geometry normalized with pass-through coordinates");
    }

    (simplify(&reprojected), issues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recognizes_common_definitions() {
        assert_eq!(SourceProjection::parse(""), SourceProjection::Wgs84);
        assert_eq!(
            SourceProjection::parse("GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\"]]"),
            SourceProjection::Wgs84
        );
        assert_eq!(
            SourceProjection::parse("PROJCS[\"WGS 84 / Pseudo-Mercator\",...,AUTHORITY[\"EPSG\",\"3857\"]]"),
            SourceProjection::WebMercator
        );
        // Web Mercator WKT names WGS_1984 too; Mercator must win
        assert_eq!(
            SourceProjection::parse("PROJCS[\"WGS_1984_Web_Mercator_Auxiliary_Sphere\",GEOGCS[\"GCS_WGS_1984\"]]"),
            SourceProjection::WebMercator
        );
        assert!(matches!(
            SourceProjection::parse("PROJCS[\"Belge 1972 / Belgian Lambert 72\"]"),
            SourceProjection::Unsupported(_)
        ));
    }

    #[test]
    fn test_web_mercator_forward() {
        let proj = SourceProjection::WebMercator;
        // Berlin, roughly
        let out = proj
            .forward(Coord {
                x: 1_491_538.66,
                y: 6_893_050.21,
            })
            .unwrap();
        assert!((out.x - 13.4).abs() < 0.01);
        assert!((out.y - 52.52).abs() < 0.01);

        // Origin maps to (0, 0)
        let zero = proj.forward(Coord { x: 0.0, y: 0.0 }).unwrap();
        assert!(zero.x.abs() < 1e-9 && zero.y.abs() < 1e-9);
    }

    #[test]
    fn test_wgs84_forward_is_identity() {
        let proj = SourceProjection::Wgs84;
        let c = Coord { x: 120.98, y: 14.6 };
        assert_eq!(proj.forward(c).unwrap(), c);
    }

    #[test]
    fn test_reproject_keeps_bad_coordinates() {
        let proj = SourceProjection::WebMercator;
        let geom = Geometry::Polygon(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: f64::NAN, y: 1.0 },
            Coord { x: 111_319.49, y: 0.0 },
        ]);

        let (out, issues) = reproject(&geom, &proj);
        assert_eq!(issues.len(), 1);
        match out {
            Geometry::Polygon(ring) => {
                assert_eq!(ring.len(), 3);
                assert!(ring[1].x.is_nan()); // passed through unchanged
                assert!((ring[2].x - 1.0).abs() < 1e-6);
            }
            _ => panic!("variant changed"),
        }
    }

    #[test]
    fn test_simplify_truncates_and_thins() {
        let ring: Vec<Coord<f64>> = (0..10)
            .map(|i| Coord {
                x: i as f64 + 0.123456,
                y: i as f64,
            })
            .collect();
        let out = simplify(&Geometry::Polygon(ring));
        match out {
            Geometry::Polygon(thinned) => {
                // Kept indices: 0, 3, 6, 9 (9 is also the last index)
                assert_eq!(thinned.len(), 4);
                assert_eq!(thinned[0].x, 0.1235);
                assert_eq!(thinned[3].y, 9.0);
            }
            _ => panic!("variant changed"),
        }
    }

    #[test]
    fn test_simplify_thins_even_minimal_rings() {
        let ring = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ];
        match simplify(&Geometry::Polygon(ring)) {
            // index 1 is dropped only when it is neither last nor on stride;
            // here len == 3 so index 2 is last and index 1 is dropped
            Geometry::Polygon(thinned) => assert_eq!(thinned.len(), 2),
            _ => panic!("variant changed"),
        }
    }

    #[test]
    fn test_normalize_on_wgs84_is_idempotent() {
        let geom = Geometry::Polygon(vec![
            Coord { x: 120.98, y: 14.6 },
            Coord { x: 121.4, y: 14.6 },
            Coord { x: 121.4, y: 15.0 },
        ]);
        let (once, issues) = normalize(&geom, Some(&SourceProjection::Wgs84));
        assert!(issues.is_empty());
        let (twice, _) = normalize(&once, Some(&SourceProjection::Wgs84));

        // A second pass only re-applies truncation/thinning to already
        // truncated coordinates of a short ring tail.
        match (&once, &twice) {
            (Geometry::Polygon(a), Geometry::Polygon(b)) => {
                for (ca, cb) in a.iter().zip(b.iter()) {
                    assert!((ca.x - cb.x).abs() < 1e-9);
                    assert!((ca.y - cb.y).abs() < 1e-9);
                }
            }
            _ => panic!("variant changed"),
        }
    }
}
