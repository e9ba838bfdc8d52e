//! Raw (unsmoothed) camera trajectory, one sample per reconstruction step.

use nalgebra::Vector3;

use crate::{
    camera::eras::EraTrack,
    foundation::core::TrackId,
    foundation::error::{DriftError, DriftResult},
    foundation::math::smoothstep,
    geometry::sphere::{GeoPoint, UnitVec3, project_to_tangent, tangent_basis},
    tracking::tracker::TrackedLandmass,
};

const TANGENT_EPS: f64 = 1e-9;

/// Camera framing parameters. Distances are measured from the globe centre.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub globe_radius: f64,
    /// Distance used for landmasses up to `extent_near_deg`.
    pub min_distance: f64,
    /// Distance used for landmasses of `extent_far_deg` and wider.
    pub max_distance: f64,
    pub extent_near_deg: f64,
    pub extent_far_deg: f64,
    /// Angular radius around each pole where north is considered undefined.
    pub pole_guard_deg: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            globe_radius: 2.0,
            min_distance: 6.0,
            max_distance: 8.0,
            extent_near_deg: 15.0,
            extent_far_deg: 90.0,
            pole_guard_deg: 1.0,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> DriftResult<()> {
        if !self.globe_radius.is_finite() || self.globe_radius <= 0.0 {
            return Err(DriftError::validation("camera globe_radius must be > 0"));
        }
        if !self.min_distance.is_finite() || self.min_distance <= self.globe_radius {
            return Err(DriftError::validation(
                "camera min_distance must be larger than globe_radius",
            ));
        }
        if !self.max_distance.is_finite() || self.max_distance < self.min_distance {
            return Err(DriftError::validation(
                "camera max_distance must be >= min_distance",
            ));
        }
        if !(self.extent_near_deg >= 0.0 && self.extent_far_deg > self.extent_near_deg) {
            return Err(DriftError::validation(
                "camera extents must satisfy 0 <= extent_near_deg < extent_far_deg",
            ));
        }
        if !(0.0..90.0).contains(&self.pole_guard_deg) {
            return Err(DriftError::validation(
                "camera pole_guard_deg must be in [0, 90)",
            ));
        }
        Ok(())
    }

    /// Viewing distance for a landmass of the given angular extent.
    pub fn distance_for_extent(&self, extent_deg: f64) -> f64 {
        let x = (extent_deg - self.extent_near_deg) / (self.extent_far_deg - self.extent_near_deg);
        (self.min_distance + (self.max_distance - self.min_distance) * smoothstep(x))
            .clamp(self.min_distance, self.max_distance)
    }
}

/// Camera state for one reconstruction step.
#[derive(Clone, Debug, PartialEq)]
pub struct RawCameraSample {
    pub time_ma: u32,
    pub step_index: usize,
    pub target: UnitVec3,
    pub distance: f64,
    pub up: UnitVec3,
    pub track_id: TrackId,
    pub break_before: bool,
    pub interpolated: bool,
    /// Dominant landmass area (significance input).
    pub area: f64,
    /// Land dispersal around the dominant centroid (significance input).
    pub dispersal: f64,
}

impl RawCameraSample {
    pub fn target_geo(&self) -> GeoPoint {
        GeoPoint::from_unit(&self.target)
    }

    /// Eye position in globe coordinates.
    pub fn eye(&self) -> Vector3<f64> {
        self.target.into_inner() * self.distance
    }
}

/// Up-vector at `target`, continuous with `previous`.
///
/// Uses projected world north, except near the poles or when north would flip relative to
/// `previous`; then `previous` is carried over onto the new tangent plane.
pub fn up_vector(
    target: &UnitVec3,
    previous: Option<&UnitVec3>,
    pole_guard_deg: f64,
) -> UnitVec3 {
    let lat = GeoPoint::from_unit(target).lat;
    let north = if 90.0 - lat.abs() > pole_guard_deg {
        project_to_tangent(target, &Vector3::z(), TANGENT_EPS)
    } else {
        None
    };
    let transport = |p: &UnitVec3| {
        project_to_tangent(target, p.as_ref(), TANGENT_EPS)
            .unwrap_or_else(|| tangent_basis(target).1)
    };
    match (north, previous) {
        (Some(n), Some(p)) if n.dot(p.as_ref()) < 0.0 => transport(p),
        (Some(n), _) => n,
        (None, Some(p)) => transport(p),
        // At a pole the basis north is the prime meridian's tangent.
        (None, None) => tangent_basis(target).1,
    }
}

/// Turn the tracked dominant landmasses into raw camera samples, oldest first.
#[tracing::instrument(skip_all, fields(steps = tracked.len()))]
pub fn synthesize(
    tracked: &[TrackedLandmass],
    config: &CameraConfig,
    eras: &EraTrack,
) -> DriftResult<Vec<RawCameraSample>> {
    if tracked.is_empty() {
        return Err(DriftError::validation("no tracked steps to synthesize"));
    }

    let anchors = eras.anchor_targets(|time_ma| {
        tracked
            .iter()
            .min_by(|a, b| {
                (f64::from(a.landmass.time_ma) - time_ma)
                    .abs()
                    .total_cmp(&(f64::from(b.landmass.time_ma) - time_ma).abs())
            })
            .map_or(tracked[0].landmass.centroid, |t| t.landmass.centroid)
    });

    let mut samples: Vec<RawCameraSample> = Vec::with_capacity(tracked.len());
    for (step_index, t) in tracked.iter().enumerate() {
        let time_ma = t.landmass.time_ma;
        let target = eras.apply(f64::from(time_ma), &t.landmass.centroid, &anchors);
        let up = up_vector(&target, samples.last().map(|s| &s.up), config.pole_guard_deg);
        let sample = RawCameraSample {
            time_ma,
            step_index,
            target,
            distance: config.distance_for_extent(t.landmass.extent_deg),
            up,
            track_id: t.track_id,
            break_before: t.break_before,
            interpolated: t.interpolated,
            area: t.landmass.area,
            dispersal: t.dispersal,
        };
        tracing::debug!(
            time_ma,
            lon = sample.target_geo().lon,
            lat = sample.target_geo().lat,
            distance = sample.distance,
            "raw camera sample"
        );
        samples.push(sample);
    }
    Ok(samples)
}

#[cfg(test)]
#[path = "../../tests/unit/camera/synth.rs"]
mod tests;
