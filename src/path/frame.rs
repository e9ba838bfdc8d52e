//! The persisted camera path: per-frame camera parameters for the renderer.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    camera::eras::{EraKeyframe, EraTrack},
    camera::synth::RawCameraSample,
    foundation::core::{FrameIndex, Fps, TrackId},
    foundation::error::{DriftError, DriftResult},
    foundation::math::{lerp, sample_linear},
    geometry::sphere::{GeoPoint, project_to_tangent, slerp, tangent_basis},
    pacing::schedule::PacingSchedule,
    path::crossfade::CrossfadeBlend,
};

pub const FORMAT_VERSION: u32 = 1;

/// Camera parameters for one output frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraFrame {
    pub index: FrameIndex,
    pub anim_time_secs: f64,
    /// Reconstruction time shown, in Ma (fractional between steps).
    pub time_ma: f64,
    /// Step whose imagery is shown (texture index for the renderer).
    pub step_index: usize,
    pub target: GeoPoint,
    /// Camera distance from the globe centre.
    pub distance: f64,
    pub up: [f64; 3],
    pub eye: [f64; 3],
    pub significance: f64,
    pub track_id: TrackId,
    #[serde(default)]
    pub hold: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era_label: Option<String>,
}

/// Run description stored with the frames.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PathMetadata {
    pub format_version: u32,
    pub oldest_ma: u32,
    pub newest_ma: u32,
    pub step_ma: u32,
    pub steps: usize,
    pub frame_count: u64,
    pub fps: Fps,
    pub duration_secs: f64,
    pub smoothing_window: usize,
    pub smoothing_sigma: f64,
    pub pacing: String,
    #[serde(default)]
    pub continuity_breaks: usize,
    #[serde(default)]
    pub gap_steps: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPath {
    pub metadata: PathMetadata,
    #[serde(default)]
    pub eras: Vec<EraKeyframe>,
    pub frames: Vec<CameraFrame>,
    #[serde(default)]
    pub crossfades: Vec<CrossfadeBlend>,
}

impl CameraPath {
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: FrameIndex) -> Option<&CameraFrame> {
        usize::try_from(index.0).ok().and_then(|i| self.frames.get(i))
    }

    /// Crossfade hint for `index`, if the frame sits on a step transition.
    pub fn crossfade(&self, index: FrameIndex) -> Option<&CrossfadeBlend> {
        self.crossfades
            .binary_search_by_key(&index, |b| b.frame)
            .ok()
            .map(|i| &self.crossfades[i])
    }

    pub fn validate(&self) -> DriftResult<()> {
        let fps = Fps::new(self.metadata.fps.num, self.metadata.fps.den)?;
        let expected = fps.frames_for_duration(self.metadata.duration_secs)?;
        let actual = self.frames.len() as u64;
        if actual != expected || self.metadata.frame_count != expected {
            return Err(DriftError::FrameCountMismatch {
                expected,
                actual: if actual != expected {
                    actual
                } else {
                    self.metadata.frame_count
                },
            });
        }

        for (i, f) in self.frames.iter().enumerate() {
            if f.index.0 != i as u64 {
                return Err(DriftError::validation(format!(
                    "frame {i} carries index {}",
                    f.index.0
                )));
            }
            if f.step_index >= self.metadata.steps {
                return Err(DriftError::validation(format!(
                    "frame {i} references step {} of {}",
                    f.step_index, self.metadata.steps
                )));
            }
        }
        if let Some(w) = self
            .frames
            .windows(2)
            .find(|w| w[1].anim_time_secs <= w[0].anim_time_secs)
        {
            return Err(DriftError::validation(format!(
                "animation time does not increase at frame {}",
                w[1].index.0
            )));
        }

        for b in &self.crossfades {
            b.validate()?;
            if b.frame.0 >= actual {
                return Err(DriftError::validation(format!(
                    "crossfade references frame {} beyond the path",
                    b.frame.0
                )));
            }
        }
        if self.crossfades.windows(2).any(|w| w[1].frame <= w[0].frame) {
            return Err(DriftError::validation("crossfades must be sorted by frame"));
        }
        Ok(())
    }

    pub fn to_json_string(&self) -> DriftResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DriftError::serde(e.to_string()))
    }

    pub fn from_json_str(s: &str) -> DriftResult<Self> {
        let path: Self = serde_json::from_str(s).map_err(|e| DriftError::serde(e.to_string()))?;
        path.validate()?;
        Ok(path)
    }

    pub fn from_path(path: &Path) -> DriftResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read camera path '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Write the path as JSON, creating parent directories.
    pub fn write_to_path(&self, path: &Path) -> DriftResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json_string()?)?;
        tracing::info!(path = %path.display(), frames = self.len(), "wrote camera path");
        Ok(())
    }
}

/// Sample the smoothed per-step camera at every scheduled frame.
pub fn frames_from_schedule(
    samples: &[RawCameraSample],
    significance: &[f64],
    schedule: &PacingSchedule,
    eras: &EraTrack,
) -> DriftResult<Vec<CameraFrame>> {
    let last = samples
        .len()
        .checked_sub(1)
        .ok_or_else(|| DriftError::validation("no camera samples to sample frames from"))?;

    Ok(schedule
        .entries()
        .iter()
        .map(|e| {
            let pos = e.step_pos.clamp(0.0, last as f64);
            let i = (pos.floor() as usize).min(last);
            let j = (i + 1).min(last);
            let u = pos - i as f64;
            let (a, b) = (&samples[i], &samples[j]);

            let target = slerp(&a.target, &b.target, u);
            let up_raw = slerp(&a.up, &b.up, u);
            let up = project_to_tangent(&target, up_raw.as_ref(), 1e-9)
                .unwrap_or_else(|| tangent_basis(&target).1);
            let distance = lerp(a.distance, b.distance, u);
            let eye = target.into_inner() * distance;

            CameraFrame {
                index: e.frame,
                anim_time_secs: e.anim_time_secs,
                time_ma: e.time_ma,
                step_index: i,
                target: GeoPoint::from_unit(&target),
                distance,
                up: [up.x, up.y, up.z],
                eye: [eye.x, eye.y, eye.z],
                significance: sample_linear(significance, pos),
                track_id: if u < 0.5 { a.track_id } else { b.track_id },
                hold: e.hold,
                era_label: eras.label_at(e.time_ma).map(str::to_owned),
            }
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/path/frame.rs"]
mod tests;
