//! Gaussian smoothing of the raw camera trajectory.
//!
//! Every channel is filtered with the same normalized kernel. Edges are reflected
//! (`d c b a | a b c d | d c b a`) so the ends are not pulled towards zero, and the reflection
//! repeats for windows wider than the series.

use nalgebra::{Unit, Vector3};

use crate::{
    camera::synth::RawCameraSample,
    foundation::ease::Ease,
    foundation::error::{DriftError, DriftResult},
    foundation::math::lerp,
    geometry::sphere::{project_to_tangent, slerp, tangent_basis},
};

/// Smoothing parameters, in reconstruction steps.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Kernel width in steps; must be odd.
    pub window: usize,
    /// Standard deviation in steps; `None` uses `window / 6`.
    pub sigma: Option<f64>,
    /// Steps on each side of a continuity break replaced by an eased transition.
    pub break_blend_steps: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window: 361,
            sigma: None,
            break_blend_steps: 5,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> DriftResult<()> {
        if self.window == 0 || self.window % 2 == 0 {
            return Err(DriftError::validation(format!(
                "smoothing window must be odd (got {})",
                self.window
            )));
        }
        if let Some(s) = self.sigma
            && (!s.is_finite() || s <= 0.0)
        {
            return Err(DriftError::validation("smoothing sigma must be finite and > 0"));
        }
        Ok(())
    }

    pub fn effective_sigma(&self) -> f64 {
        self.sigma.unwrap_or(self.window as f64 / 6.0).max(0.5)
    }

    pub fn kernel(&self) -> Vec<f64> {
        gaussian_kernel(self.window, self.effective_sigma())
    }
}

/// Normalized Gaussian weights for an odd `window`.
pub fn gaussian_kernel(window: usize, sigma: f64) -> Vec<f64> {
    let half = (window / 2) as f64;
    let raw: Vec<f64> = (0..window)
        .map(|i| {
            let x = i as f64 - half;
            (-(x * x) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = raw.iter().sum();
    raw.into_iter().map(|w| w / sum).collect()
}

fn reflect_index(i: isize, n: usize) -> usize {
    let period = 2 * n as isize;
    let m = i.rem_euclid(period) as usize;
    if m < n { m } else { 2 * n - 1 - m }
}

/// Convolve `values` with `kernel` using reflected edges.
pub fn smooth_series(values: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let half = (kernel.len() / 2) as isize;
    (0..n as isize)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * values[reflect_index(i + k as isize - half, n)])
                .sum()
        })
        .collect()
}

fn smooth_vectors(vectors: &[Vector3<f64>], kernel: &[f64]) -> Vec<Vector3<f64>> {
    let channel = |c: usize| {
        let values: Vec<f64> = vectors.iter().map(|v| v[c]).collect();
        smooth_series(&values, kernel)
    };
    let (xs, ys, zs) = (channel(0), channel(1), channel(2));
    (0..vectors.len())
        .map(|i| Vector3::new(xs[i], ys[i], zs[i]))
        .collect()
}

/// Replace the targets around each continuity break with an eased slerp so no jump cut remains.
pub fn blend_breaks(samples: &mut [RawCameraSample], steps: usize) {
    let n = samples.len();
    let breaks: Vec<usize> = (1..n).filter(|&i| samples[i].break_before).collect();
    for b in breaks {
        let k = steps.min(b).min(n - b);
        if k < 2 {
            continue;
        }
        let (lo, hi) = (b - k, b + k - 1);
        let (from, to) = (samples[lo].target, samples[hi].target);
        let (d_from, d_to) = (samples[lo].distance, samples[hi].distance);
        let span = (hi - lo) as f64;
        for (j, s) in samples[lo..=hi].iter_mut().enumerate() {
            let t = Ease::InOutCubic.apply(j as f64 / span);
            s.target = slerp(&from, &to, t);
            s.distance = lerp(d_from, d_to, t);
            s.up = project_to_tangent(&s.target, s.up.as_ref(), 1e-9)
                .unwrap_or_else(|| tangent_basis(&s.target).1);
        }
        tracing::debug!(
            time_ma = samples[b].time_ma,
            from_step = lo,
            to_step = hi,
            "blended continuity break"
        );
    }
}

/// Blend breaks, then smooth targets, distances and up-vectors.
#[tracing::instrument(skip_all, fields(steps = samples.len(), window = config.window))]
pub fn smooth_samples(
    samples: &[RawCameraSample],
    config: &SmoothingConfig,
) -> DriftResult<Vec<RawCameraSample>> {
    config.validate()?;
    let mut blended = samples.to_vec();
    blend_breaks(&mut blended, config.break_blend_steps);

    let kernel = config.kernel();
    let targets: Vec<Vector3<f64>> = blended.iter().map(|s| s.target.into_inner()).collect();
    let ups: Vec<Vector3<f64>> = blended.iter().map(|s| s.up.into_inner()).collect();
    let distances: Vec<f64> = blended.iter().map(|s| s.distance).collect();

    let targets = smooth_vectors(&targets, &kernel);
    let ups = smooth_vectors(&ups, &kernel);
    let distances = smooth_series(&distances, &kernel);

    let out = blended
        .into_iter()
        .enumerate()
        .map(|(i, mut s)| {
            // A target that averages to the centre keeps its unsmoothed direction.
            s.target = Unit::try_new(targets[i], 1e-9).unwrap_or(s.target);
            s.up = project_to_tangent(&s.target, &ups[i], 1e-9)
                .or_else(|| project_to_tangent(&s.target, s.up.as_ref(), 1e-9))
                .unwrap_or_else(|| tangent_basis(&s.target).1);
            s.distance = distances[i];
            s
        })
        .collect();
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/pacing/smooth.rs"]
mod tests;
