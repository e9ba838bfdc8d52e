//! Unit-sphere helpers.
//!
//! Positions are carried either as [`GeoPoint`] (degrees, for IO and logging) or as unit
//! Cartesian vectors (for every computation that averages, interpolates or measures). Averaging
//! raw longitudes is wrong near the antimeridian; averaging Cartesian vectors is not, because the
//! ±180° seam does not exist in 3D.

use nalgebra::{Unit, Vector3};

use crate::foundation::error::{DriftError, DriftResult};

/// Unit vector on the sphere (x towards lon 0 / lat 0, z towards the north pole).
pub type UnitVec3 = Unit<Vector3<f64>>;

const DEGENERATE_NORM: f64 = 1e-12;

/// Geographic position in degrees.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GeoPoint {
    /// Longitude in `(-180, 180]`.
    pub lon: f64,
    /// Latitude in `[-90, 90]`.
    pub lat: f64,
}

impl GeoPoint {
    /// Build a point, normalizing longitude and clamping latitude.
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon: normalize_lon(lon),
            lat: lat.clamp(-90.0, 90.0),
        }
    }

    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    pub fn to_cartesian(self) -> UnitVec3 {
        to_cartesian(self.lon, self.lat)
    }

    /// Geographic position of a unit vector (never fails: the norm is 1).
    pub fn from_unit(v: &UnitVec3) -> Self {
        let lat = v.z.atan2(v.x.hypot(v.y)).to_degrees();
        let lon = v.y.atan2(v.x).to_degrees();
        Self::new(lon, lat)
    }
}

/// Wrap a longitude into `(-180, 180]`.
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { 180.0 } else { wrapped }
}

/// Geographic degrees to a unit Cartesian vector.
pub fn to_cartesian(lon: f64, lat: f64) -> UnitVec3 {
    let (lon, lat) = (lon.to_radians(), lat.to_radians());
    // The components already have unit norm; normalizing absorbs rounding drift.
    Unit::new_normalize(Vector3::new(
        lat.cos() * lon.cos(),
        lat.cos() * lon.sin(),
        lat.sin(),
    ))
}

/// Cartesian vector (any non-zero length) to geographic degrees.
pub fn to_geographic(v: &Vector3<f64>) -> DriftResult<GeoPoint> {
    let norm = v.norm();
    if !norm.is_finite() || norm <= DEGENERATE_NORM {
        return Err(DriftError::geometry(
            "cannot convert a zero-length vector to lon/lat",
        ));
    }
    Ok(GeoPoint::from_unit(&Unit::new_unchecked(v / norm)))
}

/// Weighted mean direction of unit vectors, renormalized onto the sphere.
pub fn mean_direction<'a>(
    vectors: impl IntoIterator<Item = &'a UnitVec3>,
    weights: impl IntoIterator<Item = f64>,
) -> DriftResult<UnitVec3> {
    let mut sum = Vector3::zeros();
    let mut total = 0.0;
    for (v, w) in vectors.into_iter().zip(weights) {
        if !w.is_finite() || w < 0.0 {
            return Err(DriftError::geometry(format!(
                "averaging weights must be finite and >= 0 (got {w})"
            )));
        }
        sum += v.as_ref() * w;
        total += w;
    }
    if total <= 0.0 {
        return Err(DriftError::geometry("averaging weights sum to zero"));
    }
    Unit::try_new(sum / total, DEGENERATE_NORM).ok_or_else(|| {
        DriftError::geometry("weighted mean cancels out (points are spread antipodally)")
    })
}

/// Antimeridian-safe weighted centroid of geographic points.
pub fn average_centroid(points: &[GeoPoint], weights: &[f64]) -> DriftResult<GeoPoint> {
    if points.is_empty() {
        return Err(DriftError::geometry("cannot average an empty point set"));
    }
    if points.len() != weights.len() {
        return Err(DriftError::geometry(format!(
            "point/weight length mismatch ({} vs {})",
            points.len(),
            weights.len()
        )));
    }
    let vectors: Vec<UnitVec3> = points.iter().map(|p| p.to_cartesian()).collect();
    let mean = mean_direction(&vectors, weights.iter().copied())?;
    to_geographic(&mean)
}

/// Great-circle distance in degrees.
pub fn angular_distance_deg(a: &UnitVec3, b: &UnitVec3) -> f64 {
    a.cross(b.as_ref()).norm().atan2(a.dot(b.as_ref())).to_degrees()
}

/// Spherical linear interpolation between unit vectors.
///
/// Antipodal endpoints have no unique great circle; the arc through the pole-most
/// perpendicular is used so the result is still deterministic.
pub fn slerp(a: &UnitVec3, b: &UnitVec3, t: f64) -> UnitVec3 {
    let dot = a.dot(b.as_ref()).clamp(-1.0, 1.0);
    let theta = dot.acos();
    if theta < 1e-9 {
        return *a;
    }
    let sin_theta = theta.sin();
    if sin_theta < 1e-9 {
        let axis = any_perpendicular(a);
        let angle = std::f64::consts::PI * t;
        return Unit::new_normalize(a.as_ref() * angle.cos() + axis.as_ref() * angle.sin());
    }
    let wa = ((1.0 - t) * theta).sin() / sin_theta;
    let wb = (t * theta).sin() / sin_theta;
    Unit::new_normalize(a.as_ref() * wa + b.as_ref() * wb)
}

/// Local east/north basis of the tangent plane at `p`.
///
/// At the poles east is taken along +y so the basis stays defined.
pub fn tangent_basis(p: &UnitVec3) -> (UnitVec3, UnitVec3) {
    let east = Unit::try_new(Vector3::z().cross(p.as_ref()), 1e-9)
        .unwrap_or_else(|| Unit::new_normalize(Vector3::y()));
    let north = Unit::new_normalize(p.cross(east.as_ref()));
    (east, north)
}

/// Project `v` onto the tangent plane at `p`; `None` when the projection vanishes.
pub fn project_to_tangent(p: &UnitVec3, v: &Vector3<f64>, eps: f64) -> Option<UnitVec3> {
    Unit::try_new(v - p.as_ref() * p.dot(v), eps)
}

fn any_perpendicular(a: &UnitVec3) -> UnitVec3 {
    project_to_tangent(a, &Vector3::z(), 1e-6)
        .or_else(|| project_to_tangent(a, &Vector3::x(), 1e-6))
        .unwrap_or_else(|| Unit::new_normalize(Vector3::y()))
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/sphere.rs"]
mod tests;
