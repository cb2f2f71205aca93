// Shared coordinate/geometry model: tagged geometry variants, bounding box
// computation, point-in-ring testing and ring area. Coordinates follow the
// x = longitude, y = latitude convention throughout.
use geo_types::Coord;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geometry owned by a district or disaster event. Only outer rings are
/// carried; interior rings (holes) are ignored by contract, not subtracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coord<f64>),
    /// A single outer ring of at least 3 coordinates. The first/last point
    /// may or may not repeat.
    Polygon(Vec<Coord<f64>>),
    /// One outer ring per member polygon.
    MultiPolygon(Vec<Vec<Coord<f64>>>),
}

impl Geometry {
    /// Visit every coordinate in the geometry.
    pub fn for_each_coord<F: FnMut(&Coord<f64>)>(&self, mut f: F) {
        match self {
            Geometry::Point(c) => f(c),
            Geometry::Polygon(ring) => ring.iter().for_each(f),
            Geometry::MultiPolygon(rings) => {
                rings.iter().for_each(|ring| ring.iter().for_each(&mut f))
            }
        }
    }

    /// Rebuild the geometry with every coordinate passed through `f`,
    /// preserving the variant and ring structure.
    pub fn map_coords<F: FnMut(Coord<f64>) -> Coord<f64>>(&self, mut f: F) -> Geometry {
        match self {
            Geometry::Point(c) => Geometry::Point(f(*c)),
            Geometry::Polygon(ring) => Geometry::Polygon(ring.iter().map(|c| f(*c)).collect()),
            Geometry::MultiPolygon(rings) => Geometry::MultiPolygon(
                rings
                    .iter()
                    .map(|ring| ring.iter().map(|c| f(*c)).collect())
                    .collect(),
            ),
        }
    }

    /// The outer rings of the geometry, empty for points.
    pub fn rings(&self) -> Vec<&[Coord<f64>]> {
        match self {
            Geometry::Point(_) => Vec::new(),
            Geometry::Polygon(ring) => vec![ring.as_slice()],
            Geometry::MultiPolygon(rings) => rings.iter().map(|r| r.as_slice()).collect(),
        }
    }

    /// Axis-aligned bounds over all coordinates, or `None` when the geometry
    /// has no coordinates. Must be recomputed after any normalization pass
    /// since reprojection and simplification both move extrema.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut min_lat = f64::INFINITY;
        let mut max_lat = f64::NEG_INFINITY;
        let mut min_lng = f64::INFINITY;
        let mut max_lng = f64::NEG_INFINITY;
        let mut seen = false;

        self.for_each_coord(|c| {
            min_lat = min_lat.min(c.y);
            max_lat = max_lat.max(c.y);
            min_lng = min_lng.min(c.x);
            max_lng = max_lng.max(c.x);
            seen = true;
        });

        if !seen {
            return None;
        }

        Some(BoundingBox {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
            center: ((min_lat + max_lat) / 2.0, (min_lng + max_lng) / 2.0),
        })
    }
}

/// Axis-aligned box enclosing a geometry, cached alongside its owner and used
/// as a cheap spatial membership test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
    /// Midpoint as (lat, lng).
    pub center: (f64, f64),
}

impl BoundingBox {
    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        lat >= self.min_lat && lat <= self.max_lat && lng >= self.min_lng && lng <= self.max_lng
    }
}

/// Ray casting test for a point inside a closed ring. The ring does not need
/// to repeat its first coordinate.
pub fn point_in_ring(lat: f64, lng: f64, ring: &[Coord<f64>]) -> bool {
    let mut inside = false;
    let n = ring.len();

    for i in 0..n {
        let j = (i + 1) % n;
        let xi = ring[i].x;
        let yi = ring[i].y;
        let xj = ring[j].x;
        let yj = ring[j].y;

        let intersect =
            ((yi > lat) != (yj > lat)) && (lng < (xj - xi) * (lat - yi) / (yj - yi) + xi);

        if intersect {
            inside = !inside;
        }
    }

    inside
}

/// Shoelace area of a geographic ring in square kilometers. The ring is
/// projected to a local equirectangular plane around its mean latitude before
/// summing, which is accurate enough for event-footprint scale polygons.
pub fn ring_area_km2(ring: &[Coord<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }

    let mean_lat = ring.iter().map(|c| c.y).sum::<f64>() / ring.len() as f64;
    let km_per_deg = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;
    let lng_scale = km_per_deg * mean_lat.to_radians().cos();

    let mut sum = 0.0;
    let n = ring.len();
    for i in 0..n {
        let j = (i + 1) % n;
        let xi = ring[i].x * lng_scale;
        let yi = ring[i].y * km_per_deg;
        let xj = ring[j].x * lng_scale;
        let yj = ring[j].y * km_per_deg;
        sum += xi * yj - xj * yi;
    }

    sum.abs() / 2.0
}

/// Round to 2 decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
