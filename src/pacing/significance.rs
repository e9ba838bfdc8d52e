use crate::{
    camera::synth::RawCameraSample, foundation::math::normalize_min_max,
    pacing::smooth::smooth_series,
};

/// Per-step significance in `[0, 1]`: large dominant landmass and gathered land score high.
///
/// `area_weight` balances dominant area against (inverted) dispersal; both inputs are min-max
/// normalized over the run, then the score is smoothed with `kernel`.
pub fn significance(samples: &[RawCameraSample], area_weight: f64, kernel: &[f64]) -> Vec<f64> {
    let areas: Vec<f64> = samples.iter().map(|s| s.area).collect();
    let dispersals: Vec<f64> = samples.iter().map(|s| s.dispersal).collect();
    let (areas, dispersals) = (normalize_min_max(&areas), normalize_min_max(&dispersals));

    let raw: Vec<f64> = areas
        .iter()
        .zip(&dispersals)
        .map(|(a, d)| area_weight * a + (1.0 - area_weight) * (1.0 - d))
        .collect();
    smooth_series(&raw, kernel)
        .into_iter()
        .map(|s| s.clamp(0.0, 1.0))
        .collect()
}
