use crate::foundation::error::{DriftError, DriftResult};

/// Index of an output animation frame (0-based).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Persistent identifier linking a landmass across reconstruction steps.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackId(pub u32);

/// Output frame rate as a rational number (`30000/1001` for NTSC-style rates).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    pub num: u32,
    pub den: u32,
}

impl Fps {
    pub fn new(num: u32, den: u32) -> DriftResult<Self> {
        if num == 0 || den == 0 {
            return Err(DriftError::validation(format!(
                "output frame rate {num}/{den} must have a positive numerator and denominator"
            )));
        }
        Ok(Self { num, den })
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Animation seconds between consecutive frames.
    pub fn frame_duration_secs(self) -> f64 {
        f64::from(self.den) / f64::from(self.num)
    }

    /// Animation time at which frame `frames` starts.
    pub fn frames_to_secs(self, frames: u64) -> f64 {
        frames as f64 * f64::from(self.den) / f64::from(self.num)
    }

    pub fn secs_to_frames_round(self, secs: f64) -> u64 {
        (secs * self.as_f64()).round().max(0.0) as u64
    }

    /// Exact frame count for `duration_secs`.
    ///
    /// Fails when the duration does not cover a whole number of frames: the schedule has to
    /// integrate to the duration exactly.
    pub fn frames_for_duration(self, duration_secs: f64) -> DriftResult<u64> {
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(DriftError::validation(format!(
                "animation duration must be finite and > 0 (got {duration_secs}s)"
            )));
        }
        let exact = duration_secs * self.as_f64();
        let frames = exact.round();
        if (exact - frames).abs() > 1e-6 {
            return Err(DriftError::validation(format!(
                "duration {duration_secs}s at {}/{} fps is not a whole number of frames ({exact})",
                self.num, self.den
            )));
        }
        Ok(frames as u64)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
