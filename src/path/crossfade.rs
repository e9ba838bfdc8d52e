use crate::foundation::{
    core::FrameIndex,
    ease::Ease,
    error::{DriftError, DriftResult},
};

/// How many frames on each side of a step change blend the two step textures.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CrossfadeConfig {
    /// Upper bound on blended frames per side; 0 disables crossfading.
    pub half_width: usize,
    pub ease: Ease,
}

impl Default for CrossfadeConfig {
    fn default() -> Self {
        Self {
            half_width: 1,
            ease: Ease::Linear,
        }
    }
}

/// Blend hint for one frame: mix `from_step` into `to_step` with weight `alpha`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CrossfadeBlend {
    pub frame: FrameIndex,
    pub from_step: usize,
    pub to_step: usize,
    /// Weight of `to_step`, in `(0, 1)`.
    pub alpha: f64,
}

impl CrossfadeBlend {
    pub fn validate(&self) -> DriftResult<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(DriftError::validation(format!(
                "crossfade alpha {} at frame {} is outside (0, 1)",
                self.alpha, self.frame.0
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct Run {
    start: usize,
    len: usize,
    step: usize,
}

fn runs(step_indices: &[usize]) -> Vec<Run> {
    let mut out: Vec<Run> = Vec::new();
    for (i, &step) in step_indices.iter().enumerate() {
        match out.last_mut() {
            Some(r) if r.step == step => r.len += 1,
            _ => out.push(Run {
                start: i,
                len: 1,
                step,
            }),
        }
    }
    out
}

/// Crossfade blends for a frame sequence given each frame's step index, sorted by frame.
///
/// Runs shorter than two frames get no blend on that side, so a single-frame step is shown
/// unblended.
pub fn compute_crossfade_schedule(
    step_indices: &[usize],
    config: &CrossfadeConfig,
) -> Vec<CrossfadeBlend> {
    let runs = runs(step_indices);
    let mut blends = Vec::new();
    for pair in runs.windows(2) {
        let (out, inc) = (pair[0], pair[1]);
        let half = (out.len / 2).min(inc.len / 2).min(config.half_width);
        if half == 0 {
            continue;
        }
        let window = 2 * half;
        let first = inc.start - half;
        blends.extend((0..window).map(|k| CrossfadeBlend {
            frame: FrameIndex((first + k) as u64),
            from_step: out.step,
            to_step: inc.step,
            alpha: config.ease.apply((k + 1) as f64 / (window + 1) as f64),
        }));
    }
    blends
}
