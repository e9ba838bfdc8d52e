use crate::{
    foundation::error::{DriftError, DriftResult},
    foundation::math::lerp,
    geometry::sphere::{GeoPoint, UnitVec3, slerp},
};

/// Manual camera guidance for one point in geological time.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EraKeyframe {
    pub time_ma: f64,
    /// Where to look; `None` trusts the tracked centroid.
    #[serde(default)]
    pub target: Option<GeoPoint>,
    /// Pull towards `target`, in `[0, 1]`.
    #[serde(default)]
    pub weight: f64,
    pub label: String,
}

impl EraKeyframe {
    pub fn new(
        time_ma: f64,
        target: Option<GeoPoint>,
        weight: f64,
        label: impl Into<String>,
    ) -> Self {
        Self {
            time_ma,
            target,
            weight,
            label: label.into(),
        }
    }
}

/// Era keyframes ordered oldest first, with time interpolation between them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EraTrack {
    keyframes: Vec<EraKeyframe>,
}

impl EraTrack {
    pub fn new(mut keyframes: Vec<EraKeyframe>) -> DriftResult<Self> {
        for k in &keyframes {
            if !k.time_ma.is_finite() || k.time_ma < 0.0 {
                return Err(DriftError::validation(format!(
                    "era '{}' has invalid time {}",
                    k.label, k.time_ma
                )));
            }
            if !(0.0..=1.0).contains(&k.weight) {
                return Err(DriftError::validation(format!(
                    "era '{}' weight must be in [0, 1]",
                    k.label
                )));
            }
            if k.target.is_some_and(|t| !t.is_finite()) {
                return Err(DriftError::validation(format!(
                    "era '{}' target is not finite",
                    k.label
                )));
            }
        }
        keyframes.sort_by(|a, b| b.time_ma.total_cmp(&a.time_ma));
        if let Some(w) = keyframes.windows(2).find(|w| w[0].time_ma == w[1].time_ma) {
            return Err(DriftError::validation(format!(
                "eras '{}' and '{}' share time {} Ma",
                w[0].label, w[1].label, w[0].time_ma
            )));
        }
        Ok(Self { keyframes })
    }

    pub fn keyframes(&self) -> &[EraKeyframe] {
        &self.keyframes
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Keyframe indices around `time_ma` and the blend position between them.
    fn bracket(&self, time_ma: f64) -> Option<(usize, usize, f64)> {
        let last = self.keyframes.len().checked_sub(1)?;
        if time_ma >= self.keyframes[0].time_ma {
            return Some((0, 0, 0.0));
        }
        if time_ma <= self.keyframes[last].time_ma {
            return Some((last, last, 0.0));
        }
        let i = self
            .keyframes
            .windows(2)
            .position(|w| w[0].time_ma >= time_ma && time_ma > w[1].time_ma)?;
        let (older, younger) = (&self.keyframes[i], &self.keyframes[i + 1]);
        let u = (older.time_ma - time_ma) / (older.time_ma - younger.time_ma);
        Some((i, i + 1, u))
    }

    pub fn weight_at(&self, time_ma: f64) -> f64 {
        self.bracket(time_ma)
            .map(|(a, b, u)| lerp(self.keyframes[a].weight, self.keyframes[b].weight, u))
            .unwrap_or(0.0)
    }

    /// Era target of every keyframe, oldest first. A keyframe without a target is pinned to the
    /// tracked centroid at the keyframe's own time, as reported by `centroid_at`.
    pub fn anchor_targets(&self, centroid_at: impl Fn(f64) -> UnitVec3) -> Vec<UnitVec3> {
        self.keyframes
            .iter()
            .map(|k| k.target.map_or_else(|| centroid_at(k.time_ma), |p| p.to_cartesian()))
            .collect()
    }

    /// Camera target at `time_ma`: the tracked centroid pulled towards the era targets.
    ///
    /// `anchors` comes from [`EraTrack::anchor_targets`]; a missing entry trusts `tracked`.
    pub fn apply(&self, time_ma: f64, tracked: &UnitVec3, anchors: &[UnitVec3]) -> UnitVec3 {
        let Some((a, b, u)) = self.bracket(time_ma) else {
            return *tracked;
        };
        let anchor = |i: usize| anchors.get(i).copied().unwrap_or(*tracked);
        let era_target = slerp(&anchor(a), &anchor(b), u);
        slerp(tracked, &era_target, self.weight_at(time_ma))
    }

    /// Label of the youngest keyframe not younger than `time_ma`.
    pub fn label_at(&self, time_ma: f64) -> Option<&str> {
        self.keyframes
            .iter()
            .rev()
            .find(|k| k.time_ma >= time_ma)
            .or(self.keyframes.first())
            .map(|k| k.label.as_str())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/camera/eras.rs"]
mod tests;
