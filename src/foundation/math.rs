pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Hermite smoothstep of `x` clamped to `[0, 1]`.
pub(crate) fn smoothstep(x: f64) -> f64 {
    let t = x.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Min-max normalization to `[0, 1]`; a constant (or empty) series maps to zeros.
pub(crate) fn normalize_min_max(values: &[f64]) -> Vec<f64> {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if values.is_empty() || hi <= lo {
        return vec![0.0; values.len()];
    }
    let span = hi - lo;
    values.iter().map(|v| (v - lo) / span).collect()
}

/// Sample a series at a fractional position, linearly between neighbours.
pub(crate) fn sample_linear(values: &[f64], pos: f64) -> f64 {
    match values.len() {
        0 => 0.0,
        1 => values[0],
        n => {
            let p = pos.clamp(0.0, (n - 1) as f64);
            let i = (p.floor() as usize).min(n - 2);
            lerp(values[i], values[i + 1], p - i as f64)
        }
    }
}
