//! Non-uniform allocation of animation frames to reconstruction time.
//!
//! Motion frames are spaced uniformly in cumulative interval weight, so heavy (significant)
//! intervals receive more frames. Holds pin extra frames to a single step.

use crate::{
    foundation::core::{FrameIndex, Fps},
    foundation::error::{DriftError, DriftResult},
    foundation::math::sample_linear,
};

/// Extra screen time pinned to the step nearest `time_ma`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HoldSpec {
    pub time_ma: f64,
    pub seconds: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl HoldSpec {
    pub fn new(time_ma: f64, seconds: f64) -> Self {
        Self {
            time_ma,
            seconds,
            label: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// How strongly significance slows the animation down (0 = uniform pacing).
    pub sensitivity: f64,
    /// Share of significance coming from dominant area (rest from inverted dispersal).
    pub area_weight: f64,
    pub holds: Vec<HoldSpec>,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            sensitivity: 2.0,
            area_weight: 0.5,
            holds: Vec::new(),
        }
    }
}

impl PacingConfig {
    pub fn validate(&self) -> DriftResult<()> {
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            return Err(DriftError::validation("pacing sensitivity must be finite and >= 0"));
        }
        if !(0.0..=1.0).contains(&self.area_weight) {
            return Err(DriftError::validation("pacing area_weight must be in [0, 1]"));
        }
        for h in &self.holds {
            if !h.time_ma.is_finite() || !h.seconds.is_finite() || h.seconds < 0.0 {
                return Err(DriftError::validation(format!(
                    "hold at {} Ma must have finite time and seconds >= 0",
                    h.time_ma
                )));
            }
        }
        Ok(())
    }
}

/// One output frame's position in reconstruction time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduleEntry {
    pub frame: FrameIndex,
    pub anim_time_secs: f64,
    /// Fractional index into the step sequence (oldest = 0).
    pub step_pos: f64,
    pub time_ma: f64,
    /// Frame belongs to a hold.
    pub hold: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PacingSchedule {
    entries: Vec<ScheduleEntry>,
    fps: Fps,
}

impl PacingSchedule {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    pub fn duration_secs(&self) -> f64 {
        self.fps.frames_to_secs(self.entries.len() as u64)
    }
}

/// Weights of the `n - 1` intervals between consecutive steps.
pub fn interval_weights(significance: &[f64], sensitivity: f64) -> Vec<f64> {
    significance
        .windows(2)
        .map(|w| 1.0 + sensitivity * (w[0] + w[1]) / 2.0)
        .collect()
}

/// Step position reached after a share `c` of the total cumulative weight.
fn invert_cumulative(cumulative: &[f64], weights: &[f64], c: f64) -> f64 {
    let i = cumulative
        .partition_point(|&x| x <= c)
        .saturating_sub(1)
        .min(weights.len().saturating_sub(1));
    (i as f64 + (c - cumulative[i]) / weights[i]).clamp(0.0, weights.len() as f64)
}

fn nearest_step(step_times: &[u32], time_ma: f64) -> usize {
    step_times
        .iter()
        .enumerate()
        .min_by(|a, b| {
            (f64::from(*a.1) - time_ma)
                .abs()
                .total_cmp(&(f64::from(*b.1) - time_ma).abs())
        })
        .map_or(0, |(i, _)| i)
}

/// Build the pacing schedule.
///
/// `step_times` are the reconstruction times oldest first, `significance` one value per step.
#[tracing::instrument(skip_all, fields(steps = step_times.len(), duration_secs = duration_secs))]
pub fn build_schedule(
    step_times: &[u32],
    significance: &[f64],
    config: &PacingConfig,
    fps: Fps,
    duration_secs: f64,
) -> DriftResult<PacingSchedule> {
    config.validate()?;
    let n = step_times.len();
    if n == 0 {
        return Err(DriftError::validation("cannot pace an empty step sequence"));
    }
    if significance.len() != n {
        return Err(DriftError::validation(format!(
            "significance has {} values for {n} steps",
            significance.len()
        )));
    }
    if step_times.windows(2).any(|w| w[1] >= w[0]) {
        return Err(DriftError::validation(
            "step times must be strictly decreasing (oldest first)",
        ));
    }
    let total = fps.frames_for_duration(duration_secs)?;

    let mut hold_frames = vec![0_u64; n];
    for h in &config.holds {
        let step = nearest_step(step_times, h.time_ma);
        hold_frames[step] += fps.secs_to_frames_round(h.seconds);
    }
    let held: u64 = hold_frames.iter().sum();

    let motion = if n == 1 {
        total
            .checked_sub(held)
            .ok_or_else(|| DriftError::validation("holds exceed the total frame count"))?
    } else {
        match total.checked_sub(held) {
            Some(m) if m >= 2 => m,
            _ => {
                return Err(DriftError::validation(format!(
                    "holds take {held} of {total} frames, leaving fewer than 2 motion frames"
                )));
            }
        }
    };

    let motion_pos: Vec<f64> = if n == 1 {
        vec![0.0; motion as usize]
    } else {
        let weights = interval_weights(significance, config.sensitivity);
        let mut cumulative = Vec::with_capacity(n);
        cumulative.push(0.0);
        for w in &weights {
            let last = cumulative[cumulative.len() - 1];
            cumulative.push(last + w);
        }
        let total_weight = cumulative[n - 1];
        let last_step = (n - 1) as f64;
        (0..motion)
            .map(|j| {
                if j + 1 == motion {
                    last_step
                } else {
                    let c = total_weight * j as f64 / (motion - 1) as f64;
                    invert_cumulative(&cumulative, &weights, c)
                }
            })
            .collect()
    };

    let times: Vec<f64> = step_times.iter().map(|&t| f64::from(t)).collect();
    let mut entries = Vec::with_capacity(total as usize);
    let mut push = |step_pos: f64, hold: bool| {
        let k = entries.len() as u64;
        entries.push(ScheduleEntry {
            frame: FrameIndex(k),
            anim_time_secs: fps.frames_to_secs(k),
            step_pos,
            time_ma: sample_linear(&times, step_pos),
            hold,
        });
    };

    // Holds at a step go right before the first motion frame past that step.
    let mut next_hold = 0;
    for &p in &motion_pos {
        while next_hold < n && (next_hold as f64) < p {
            for _ in 0..hold_frames[next_hold] {
                push(next_hold as f64, true);
            }
            next_hold += 1;
        }
        push(p, false);
    }
    for (step, &count) in hold_frames.iter().enumerate().skip(next_hold) {
        for _ in 0..count {
            push(step as f64, true);
        }
    }

    if entries.len() as u64 != total {
        return Err(DriftError::FrameCountMismatch {
            expected: total,
            actual: entries.len() as u64,
        });
    }
    tracing::info!(
        frames = total,
        motion_frames = motion,
        hold_frames = held,
        "built pacing schedule"
    );
    Ok(PacingSchedule { entries, fps })
}

#[cfg(test)]
#[path = "../../tests/unit/pacing/schedule.rs"]
mod tests;
