use geo::{Coord, Intersects, Line};

use crate::geometry::sphere::{
    GeoPoint, UnitVec3, angular_distance_deg, mean_direction, tangent_basis,
};

/// One plate fragment's boundary at a reconstruction time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlatePolygon {
    /// Identifier of the plate the fragment belongs to.
    pub plate_id: u32,
    /// Boundary ring; a closing vertex equal to the first is allowed.
    pub vertices: Vec<GeoPoint>,
    /// Polygon area in any consistent unit (only ratios are used).
    pub area: f64,
}

/// Why a polygon was excluded from clustering.
#[derive(Clone, Debug, PartialEq)]
pub enum Degeneracy {
    TooFewVertices(usize),
    NonFiniteCoordinate,
    LatitudeOutOfRange(f64),
    NonPositiveArea(f64),
    NoCentroid,
    SelfIntersecting,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooFewVertices(n) => write!(f, "only {n} distinct vertices"),
            Self::NonFiniteCoordinate => write!(f, "non-finite vertex coordinate"),
            Self::LatitudeOutOfRange(lat) => write!(f, "vertex latitude {lat} outside [-90, 90]"),
            Self::NonPositiveArea(a) => write!(f, "non-positive area {a}"),
            Self::NoCentroid => write!(f, "vertices average to the sphere center"),
            Self::SelfIntersecting => write!(f, "self-intersecting boundary"),
        }
    }
}

/// Spherical summary of a valid polygon: what clustering actually works with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonSummary {
    pub plate_id: u32,
    /// Mean of the boundary vertices on the unit sphere.
    pub centroid: UnitVec3,
    /// Radius in degrees of the smallest centroid-centred cap containing every vertex.
    pub radius_deg: f64,
    pub area: f64,
}

impl PlatePolygon {
    pub fn new(plate_id: u32, vertices: Vec<GeoPoint>, area: f64) -> Self {
        Self {
            plate_id,
            vertices,
            area,
        }
    }

    /// Validate the polygon and reduce it to centroid, cap radius and area.
    pub fn summarize(&self) -> Result<PolygonSummary, Degeneracy> {
        if self.vertices.iter().any(|v| !v.is_finite()) {
            return Err(Degeneracy::NonFiniteCoordinate);
        }
        // Longitude may wrap, latitude may not.
        if let Some(v) = self.vertices.iter().find(|v| v.lat.abs() > 90.0) {
            return Err(Degeneracy::LatitudeOutOfRange(v.lat));
        }
        if !self.area.is_finite() || self.area <= 0.0 {
            return Err(Degeneracy::NonPositiveArea(self.area));
        }

        let ring = distinct_ring(&self.vertices);
        if ring.len() < 3 {
            return Err(Degeneracy::TooFewVertices(ring.len()));
        }

        let centroid = mean_direction(&ring, std::iter::repeat(1.0))
            .map_err(|_| Degeneracy::NoCentroid)?;
        if ring_self_intersects(&ring, &centroid) {
            return Err(Degeneracy::SelfIntersecting);
        }

        let radius_deg = ring
            .iter()
            .map(|v| angular_distance_deg(&centroid, v))
            .fold(0.0, f64::max);

        Ok(PolygonSummary {
            plate_id: self.plate_id,
            centroid,
            radius_deg,
            area: self.area,
        })
    }
}

/// Ring as unit vectors with consecutive duplicates and the closing vertex removed.
fn distinct_ring(vertices: &[GeoPoint]) -> Vec<UnitVec3> {
    const SAME_DEG: f64 = 1e-9;
    let mut ring: Vec<UnitVec3> = Vec::with_capacity(vertices.len());
    for v in vertices {
        let p = v.to_cartesian();
        if ring
            .last()
            .is_some_and(|last| angular_distance_deg(last, &p) < SAME_DEG)
        {
            continue;
        }
        ring.push(p);
    }
    while ring.len() > 1 && angular_distance_deg(&ring[0], &ring[ring.len() - 1]) < SAME_DEG {
        ring.pop();
    }
    ring
}

/// Crossing test between non-adjacent edges in a gnomonic projection around `center`.
///
/// Gnomonic projection maps great-circle arcs to straight segments, so planar segment
/// intersection is exact. Rings reaching the far hemisphere cannot be projected and are
/// accepted as-is.
fn ring_self_intersects(ring: &[UnitVec3], center: &UnitVec3) -> bool {
    let (east, north) = tangent_basis(center);
    let mut projected = Vec::with_capacity(ring.len());
    for v in ring {
        let d = v.dot(center.as_ref());
        if d <= 1e-6 {
            return false;
        }
        let p = v.as_ref() / d;
        projected.push(Coord {
            x: p.dot(east.as_ref()),
            y: p.dot(north.as_ref()),
        });
    }

    let n = projected.len();
    let edge = |i: usize| Line::new(projected[i], projected[(i + 1) % n]);
    for i in 0..n {
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edge(i).intersects(&edge(j)) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/polygon.rs"]
mod tests;
