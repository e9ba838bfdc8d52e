//! Cross-step identity of the dominant landmass.
//!
//! Tracking is a fold over the clustered snapshots (oldest to newest) carrying only
//! [`TrackState`]: the previous dominant centroid, its extent and the current track id.

use crate::{
    foundation::core::TrackId,
    foundation::error::{DriftError, DriftResult},
    foundation::math::lerp,
    geometry::sphere::{GeoPoint, UnitVec3, angular_distance_deg, slerp},
    tracking::cluster::{ClusteredSnapshot, Landmass},
};

/// Tuning for dominance selection and continuity tracking.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Allowed centroid jump between steps for a point-like landmass, in degrees.
    pub base_threshold_deg: f64,
    /// Extra allowed jump per degree of the previous landmass's extent.
    pub extent_gain: f64,
    /// Relative widening at high latitude (`1 + polar_gain * |sin(lat)|`).
    pub polar_gain: f64,
    /// Hard cap on the adaptive threshold, in degrees.
    pub max_threshold_deg: f64,
    /// Landmasses within this relative area of the largest compete on proximity to the previous
    /// dominant centroid. A heuristic, not a guarantee of the "right" choice.
    pub tie_tolerance: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            base_threshold_deg: 10.0,
            extent_gain: 0.25,
            polar_gain: 0.5,
            max_threshold_deg: 45.0,
            tie_tolerance: 0.05,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> DriftResult<()> {
        let finite_non_negative = [
            ("base_threshold_deg", self.base_threshold_deg),
            ("extent_gain", self.extent_gain),
            ("polar_gain", self.polar_gain),
            ("max_threshold_deg", self.max_threshold_deg),
        ];
        for (name, v) in finite_non_negative {
            if !v.is_finite() || v < 0.0 {
                return Err(DriftError::validation(format!(
                    "tracker {name} must be finite and >= 0"
                )));
            }
        }
        if self.max_threshold_deg < self.base_threshold_deg {
            return Err(DriftError::validation(
                "tracker max_threshold_deg must be >= base_threshold_deg",
            ));
        }
        if !(0.0..1.0).contains(&self.tie_tolerance) {
            return Err(DriftError::validation("tracker tie_tolerance must be in [0, 1)"));
        }
        Ok(())
    }

    /// Largest centroid jump, in degrees, that still continues the previous track.
    pub fn adaptive_threshold_deg(&self, prev_extent_deg: f64, prev_lat_deg: f64) -> f64 {
        let by_extent = (self.base_threshold_deg + self.extent_gain * prev_extent_deg)
            .min(self.max_threshold_deg);
        let polar = 1.0 + self.polar_gain * prev_lat_deg.to_radians().sin().abs();
        (by_extent * polar).min(self.max_threshold_deg)
    }
}

/// What to do when a snapshot has no usable landmass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapPolicy {
    /// Fill the step from its valid neighbours.
    #[default]
    Interpolate,
    /// Propagate [`DriftError::DataGap`].
    Abort,
}

/// State carried from one step to the next.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackState {
    pub centroid: UnitVec3,
    pub extent_deg: f64,
    pub track_id: TrackId,
    pub next_id: u32,
}

/// The dominant landmass of one step with its track identity.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedLandmass {
    pub landmass: Landmass,
    pub track_id: TrackId,
    /// A new track started at this step.
    pub break_before: bool,
    /// The step was filled by the gap policy, not observed.
    pub interpolated: bool,
    /// Land area of the whole snapshot.
    pub total_area: f64,
    /// Area-weighted mean distance (radians) of all land from the dominant centroid.
    pub dispersal: f64,
}

/// A step where the dominant landmass could not be linked to the previous one.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ContinuityBreak {
    pub time_ma: u32,
    pub from: TrackId,
    pub to: TrackId,
    pub jump_deg: f64,
    pub threshold_deg: f64,
}

/// Output of [`LandmassTracker::track`].
#[derive(Clone, Debug)]
pub struct TrackReport {
    /// One entry per snapshot, oldest to newest.
    pub tracked: Vec<TrackedLandmass>,
    pub breaks: Vec<ContinuityBreak>,
    /// Times of snapshots that were filled by interpolation.
    pub gaps: Vec<u32>,
    pub skipped_polygons: usize,
}

/// Pick the dominant landmass: largest area, with near-ties resolved by proximity to
/// `previous`.
pub fn select_dominant<'a>(
    time_ma: u32,
    landmasses: &'a [Landmass],
    previous: Option<&UnitVec3>,
    tie_tolerance: f64,
) -> DriftResult<&'a Landmass> {
    let largest = landmasses
        .iter()
        .max_by(|a, b| a.area.total_cmp(&b.area))
        .ok_or(DriftError::DataGap { time_ma })?;
    let Some(prev) = previous else {
        return Ok(largest);
    };
    let floor = largest.area * (1.0 - tie_tolerance);
    Ok(landmasses
        .iter()
        .filter(|l| l.area >= floor)
        .min_by(|a, b| {
            angular_distance_deg(prev, &a.centroid)
                .total_cmp(&angular_distance_deg(prev, &b.centroid))
        })
        .unwrap_or(largest))
}

fn dispersal(snapshot: &ClusteredSnapshot, center: &UnitVec3) -> f64 {
    if snapshot.total_area <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = snapshot
        .polygons
        .iter()
        .map(|p| angular_distance_deg(center, &p.centroid).to_radians() * p.area)
        .sum();
    weighted / snapshot.total_area
}

/// Dominant-landmass tracker.
#[derive(Clone, Debug, Default)]
pub struct LandmassTracker {
    config: TrackerConfig,
}

impl LandmassTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Advance the fold by one snapshot.
    ///
    /// Returns [`DriftError::DataGap`] when the snapshot has no landmass; `state` is then left for
    /// the caller to carry over unchanged.
    pub fn step(
        &self,
        state: Option<&TrackState>,
        snapshot: &ClusteredSnapshot,
    ) -> DriftResult<(TrackState, TrackedLandmass, Option<ContinuityBreak>)> {
        let dominant = select_dominant(
            snapshot.time_ma,
            &snapshot.landmasses,
            state.map(|s| &s.centroid),
            self.config.tie_tolerance,
        )?;

        let (track_id, next_id, broke) = match state {
            None => (TrackId(0), 1, None),
            Some(prev) => {
                let jump_deg = angular_distance_deg(&prev.centroid, &dominant.centroid);
                let prev_lat = GeoPoint::from_unit(&prev.centroid).lat;
                let threshold_deg = self.config.adaptive_threshold_deg(prev.extent_deg, prev_lat);
                if jump_deg <= threshold_deg {
                    (prev.track_id, prev.next_id, None)
                } else {
                    let to = TrackId(prev.next_id);
                    (
                        to,
                        prev.next_id + 1,
                        Some(ContinuityBreak {
                            time_ma: snapshot.time_ma,
                            from: prev.track_id,
                            to,
                            jump_deg,
                            threshold_deg,
                        }),
                    )
                }
            }
        };

        let next_state = TrackState {
            centroid: dominant.centroid,
            extent_deg: dominant.extent_deg,
            track_id,
            next_id,
        };
        let tracked = TrackedLandmass {
            landmass: dominant.clone(),
            track_id,
            break_before: broke.is_some(),
            interpolated: false,
            total_area: snapshot.total_area,
            dispersal: dispersal(snapshot, &dominant.centroid),
        };
        Ok((next_state, tracked, broke))
    }

    /// Track the dominant landmass across `snapshots` (oldest to newest).
    #[tracing::instrument(skip(self, snapshots), fields(steps = snapshots.len()))]
    pub fn track(
        &self,
        snapshots: &[ClusteredSnapshot],
        gap_policy: GapPolicy,
    ) -> DriftResult<TrackReport> {
        if snapshots.is_empty() {
            return Err(DriftError::validation("no snapshots to track"));
        }

        let mut state: Option<TrackState> = None;
        let mut slots: Vec<Option<TrackedLandmass>> = Vec::with_capacity(snapshots.len());
        let mut breaks = Vec::new();
        let mut gaps = Vec::new();

        for snap in snapshots {
            match self.step(state.as_ref(), snap) {
                Ok((next, tracked, broke)) => {
                    if let Some(b) = broke {
                        tracing::warn!(
                            time_ma = b.time_ma,
                            from = b.from.0,
                            to = b.to.0,
                            jump_deg = b.jump_deg,
                            threshold_deg = b.threshold_deg,
                            "continuity break: starting a new track"
                        );
                        breaks.push(b);
                    }
                    state = Some(next);
                    slots.push(Some(tracked));
                }
                Err(DriftError::DataGap { time_ma }) if gap_policy == GapPolicy::Interpolate => {
                    tracing::warn!(time_ma, "no usable landmass, step will be interpolated");
                    gaps.push(time_ma);
                    slots.push(None);
                }
                Err(err) => return Err(err),
            }
        }

        let tracked = fill_gaps(snapshots, slots)?;
        let skipped_polygons = snapshots.iter().map(|s| s.skipped).sum();
        tracing::info!(
            steps = tracked.len(),
            breaks = breaks.len(),
            gaps = gaps.len(),
            skipped_polygons,
            "tracked dominant landmass"
        );
        Ok(TrackReport {
            tracked,
            breaks,
            gaps,
            skipped_polygons,
        })
    }
}

fn fill_gaps(
    snapshots: &[ClusteredSnapshot],
    slots: Vec<Option<TrackedLandmass>>,
) -> DriftResult<Vec<TrackedLandmass>> {
    let valid: Vec<usize> = (0..slots.len()).filter(|&i| slots[i].is_some()).collect();
    if valid.is_empty() {
        return Err(DriftError::DataGap {
            time_ma: snapshots[0].time_ma,
        });
    }

    let mut out = Vec::with_capacity(slots.len());
    for (i, slot) in slots.iter().enumerate() {
        if let Some(t) = slot {
            out.push(t.clone());
            continue;
        }
        let prev = valid.iter().rev().find(|&&v| v < i).copied();
        let next = valid.iter().find(|&&v| v > i).copied();
        let filled = match (prev, next) {
            (Some(p), Some(n)) => {
                let (a, b) = (slot_ref(&slots, p)?, slot_ref(&slots, n)?);
                let t = (i - p) as f64 / (n - p) as f64;
                interpolate_tracked(a, b, t, snapshots[i].time_ma)
            }
            (Some(only), None) | (None, Some(only)) => {
                let mut held = slot_ref(&slots, only)?.clone();
                held.landmass.time_ma = snapshots[i].time_ma;
                held.break_before = false;
                held.interpolated = true;
                held
            }
            (None, None) => {
                return Err(DriftError::DataGap {
                    time_ma: snapshots[i].time_ma,
                });
            }
        };
        out.push(filled);
    }
    Ok(out)
}

fn slot_ref(slots: &[Option<TrackedLandmass>], i: usize) -> DriftResult<&TrackedLandmass> {
    slots[i]
        .as_ref()
        .ok_or_else(|| DriftError::validation("internal error: expected a tracked step"))
}

fn interpolate_tracked(
    a: &TrackedLandmass,
    b: &TrackedLandmass,
    t: f64,
    time_ma: u32,
) -> TrackedLandmass {
    TrackedLandmass {
        landmass: Landmass {
            time_ma,
            centroid: slerp(&a.landmass.centroid, &b.landmass.centroid, t),
            area: lerp(a.landmass.area, b.landmass.area, t),
            extent_deg: lerp(a.landmass.extent_deg, b.landmass.extent_deg, t),
            plate_ids: a.landmass.plate_ids.clone(),
            polygon_count: 0,
        },
        track_id: a.track_id,
        break_before: false,
        interpolated: true,
        total_area: lerp(a.total_area, b.total_area, t),
        dispersal: lerp(a.dispersal, b.dispersal, t),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/tracker.rs"]
mod tests;
