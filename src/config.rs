//! Run configuration.
//!
//! Every tunable lives here and is handed to the stage that needs it; nothing reads globals.
//! All structs deserialize with defaults so a JSON file only has to name what it changes.

use std::path::Path;

use anyhow::Context as _;

use crate::{
    camera::eras::{EraKeyframe, EraTrack},
    camera::synth::CameraConfig,
    foundation::core::Fps,
    foundation::error::{DriftError, DriftResult},
    geometry::sphere::GeoPoint,
    pacing::schedule::{HoldSpec, PacingConfig},
    pacing::smooth::SmoothingConfig,
    path::crossfade::CrossfadeConfig,
    tracking::cluster::ClusterConfig,
    tracking::tracker::{GapPolicy, TrackerConfig},
};

/// Reconstruction times to sample, oldest to newest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TimeRange {
    pub oldest_ma: u32,
    pub newest_ma: u32,
    /// Ma between consecutive snapshots.
    pub step_ma: u32,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            oldest_ma: 1000,
            newest_ma: 0,
            step_ma: 1,
        }
    }
}

impl TimeRange {
    pub fn validate(&self) -> DriftResult<()> {
        if self.step_ma == 0 {
            return Err(DriftError::validation("time step_ma must be > 0"));
        }
        if self.oldest_ma <= self.newest_ma {
            return Err(DriftError::validation(format!(
                "time range must run from older to newer ({} -> {} Ma)",
                self.oldest_ma, self.newest_ma
            )));
        }
        if (self.oldest_ma - self.newest_ma) % self.step_ma != 0 {
            return Err(DriftError::validation(format!(
                "step {} Ma does not divide the range {} -> {} Ma",
                self.step_ma, self.oldest_ma, self.newest_ma
            )));
        }
        Ok(())
    }

    /// Sampled times, oldest first.
    pub fn times(&self) -> Vec<u32> {
        let step = self.step_ma.max(1) as usize;
        (self.newest_ma..=self.oldest_ma)
            .rev()
            .step_by(step)
            .collect()
    }

    pub fn contains(&self, time_ma: f64) -> bool {
        (f64::from(self.newest_ma)..=f64::from(self.oldest_ma)).contains(&time_ma)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub duration_secs: f64,
    pub fps: Fps,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            duration_secs: 60.0,
            fps: Fps { num: 24, den: 1 },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Total attempts per snapshot when the source reports a transient failure.
    pub max_attempts: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// Threading controls for snapshot fetching and clustering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Threading {
    /// Fetch and cluster snapshots on a dedicated pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub time: TimeRange,
    pub output: OutputConfig,
    pub cluster: ClusterConfig,
    pub tracker: TrackerConfig,
    pub gap_policy: GapPolicy,
    pub camera: CameraConfig,
    pub smoothing: SmoothingConfig,
    pub pacing: PacingConfig,
    pub eras: Vec<EraKeyframe>,
    pub crossfade: CrossfadeConfig,
    pub source: SourceConfig,
    pub threading: Threading,
}

impl PipelineConfig {
    pub fn from_json_str(s: &str) -> DriftResult<Self> {
        serde_json::from_str(s).map_err(|e| DriftError::serde(e.to_string()))
    }

    pub fn from_path(path: &Path) -> DriftResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> DriftResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DriftError::serde(e.to_string()))
    }

    /// Check everything that can be checked before touching any snapshot.
    pub fn validate(&self) -> DriftResult<()> {
        self.time.validate()?;
        let fps = Fps::new(self.output.fps.num, self.output.fps.den)?;
        let total = fps.frames_for_duration(self.output.duration_secs)?;
        self.cluster.validate()?;
        self.tracker.validate()?;
        self.camera.validate()?;
        self.smoothing.validate()?;
        self.pacing.validate()?;
        for h in &self.pacing.holds {
            if !self.time.contains(h.time_ma) {
                return Err(DriftError::validation(format!(
                    "hold at {} Ma lies outside the time range",
                    h.time_ma
                )));
            }
        }
        let held: u64 = self
            .pacing
            .holds
            .iter()
            .map(|h| fps.secs_to_frames_round(h.seconds))
            .sum();
        // A validated time range has at least two steps, so pacing needs two motion frames.
        if held.saturating_add(2) > total {
            return Err(DriftError::validation(format!(
                "holds take {held} of {total} frames, leaving fewer than 2 motion frames"
            )));
        }
        EraTrack::new(self.eras.clone())?;
        if self.source.max_attempts == 0 {
            return Err(DriftError::validation("source max_attempts must be >= 1"));
        }
        if self.threading.threads == Some(0) {
            return Err(DriftError::validation(
                "threading 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }

    pub fn era_track(&self) -> DriftResult<EraTrack> {
        EraTrack::new(self.eras.clone())
    }

    /// The billion-year documentary cut: 1000 Ma to today at 1 Ma steps, era guidance and
    /// supercontinent holds.
    pub fn billion_year_preset() -> Self {
        let era = |t: f64, target: Option<(f64, f64)>, label: &str, weight: f64| {
            EraKeyframe::new(
                t,
                target.map(|(lon, lat)| GeoPoint::new(lon, lat)),
                weight,
                label,
            )
        };
        let hold = |t: f64, seconds: f64, label: &str| HoldSpec {
            time_ma: t,
            seconds,
            label: Some(label.to_owned()),
        };
        Self {
            output: OutputConfig {
                duration_secs: 180.0,
                fps: Fps { num: 24, den: 1 },
            },
            pacing: PacingConfig {
                holds: vec![
                    hold(900.0, 2.0, "Rodinia peak"),
                    hold(480.0, 1.5, "Gondwana peak"),
                    hold(250.0, 2.5, "Pangaea peak"),
                    hold(0.0, 2.5, "Present day"),
                ],
                ..PacingConfig::default()
            },
            eras: vec![
                era(1000.0, None, "Rodinia assembling", 0.0),
                era(900.0, None, "Rodinia assembled", 0.0),
                era(750.0, None, "Rodinia breaking up", 0.0),
                era(550.0, Some((100.0, -45.0)), "Gondwana assembling", 0.5),
                era(480.0, Some((120.0, -50.0)), "Gondwana assembled", 0.5),
                era(380.0, Some((5.0, -15.0)), "Laurussia forming", 0.4),
                era(350.0, Some((0.0, -10.0)), "Pangaea assembling", 0.5),
                era(300.0, Some((0.0, 10.0)), "Pangaea coalescing", 0.6),
                era(250.0, Some((0.0, 10.0)), "Pangaea assembled", 0.7),
                era(200.0, Some((20.0, 15.0)), "Pangaea breaking up", 0.5),
                era(150.0, Some((20.0, 10.0)), "Atlantic Ocean opening", 0.3),
                era(100.0, Some((10.0, 10.0)), "India racing north", 0.2),
                era(66.0, Some((0.0, 10.0)), "K-Pg extinction", 0.2),
                era(50.0, Some((0.0, 20.0)), "Modern world forming", 0.1),
                era(0.0, Some((15.0, 25.0)), "Present day", 0.4),
            ],
            ..Self::default()
        }
    }
}
