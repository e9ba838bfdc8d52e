use super::*;
use approx::assert_relative_eq;

fn fps(n: u32) -> Fps {
    Fps::new(n, 1).unwrap()
}

#[test]
fn uniform_significance_spaces_frames_evenly() {
    let times = [400, 300, 200, 100, 0];
    let sched = build_schedule(&times, &[0.0; 5], &PacingConfig::default(), fps(9), 1.0).unwrap();
    assert_eq!(sched.len(), 9);
    let pos: Vec<f64> = sched.entries().iter().map(|e| e.step_pos).collect();
    for (k, p) in pos.iter().enumerate() {
        assert_relative_eq!(*p, k as f64 * 0.5, epsilon = 1e-12);
    }
    assert_relative_eq!(sched.entries()[0].time_ma, 400.0);
    assert_relative_eq!(sched.entries()[8].time_ma, 0.0);
}

#[test]
fn deltas_sum_to_duration_and_time_runs_forward() {
    let times: Vec<u32> = (0..20).rev().map(|t| t * 10).collect();
    let sig: Vec<f64> = (0..20).map(|i| if (8..12).contains(&i) { 1.0 } else { 0.1 }).collect();
    let cfg = PacingConfig {
        holds: vec![HoldSpec::new(100.0, 0.5)],
        ..PacingConfig::default()
    };
    let sched = build_schedule(&times, &sig, &cfg, fps(24), 3.0).unwrap();
    assert_eq!(sched.len(), 72);
    assert_relative_eq!(sched.duration_secs(), 3.0, epsilon = 1e-12);

    let delta = sched.fps().frame_duration_secs();
    let sum: f64 = sched.entries().iter().map(|_| delta).sum();
    assert_relative_eq!(sum, 3.0, epsilon = 1e-9);

    for w in sched.entries().windows(2) {
        assert!(w[1].anim_time_secs > w[0].anim_time_secs);
        assert!(w[1].time_ma <= w[0].time_ma);
        assert!(w[1].step_pos >= w[0].step_pos);
        assert_eq!(w[1].frame.0, w[0].frame.0 + 1);
    }
    assert_eq!(sched.entries().iter().filter(|e| e.hold).count(), 12);
    assert!(
        sched
            .entries()
            .iter()
            .filter(|e| e.hold)
            .all(|e| e.time_ma == 100.0)
    );
}

#[test]
fn significant_intervals_get_more_frames() {
    let times = [300, 200, 100, 0];
    let sig = [0.0, 1.0, 1.0, 0.0];
    let sched = build_schedule(&times, &sig, &PacingConfig::default(), fps(60), 1.0).unwrap();
    let in_middle = sched
        .entries()
        .iter()
        .filter(|e| e.step_pos > 1.0 && e.step_pos < 2.0)
        .count();
    let in_first = sched
        .entries()
        .iter()
        .filter(|e| e.step_pos > 0.0 && e.step_pos < 1.0)
        .count();
    assert!(in_middle > in_first);
}

#[test]
fn weights_follow_sensitivity() {
    let w = interval_weights(&[0.0, 1.0, 0.5], 2.0);
    assert_eq!(w, vec![2.0, 2.5]);
}

#[test]
fn holds_that_starve_motion_are_rejected() {
    let cfg = PacingConfig {
        holds: vec![HoldSpec::new(0.0, 1.0)],
        ..PacingConfig::default()
    };
    let err = build_schedule(&[10, 0], &[0.0, 0.0], &cfg, fps(10), 1.0).unwrap_err();
    assert!(matches!(err, DriftError::Validation(_)));
}

#[test]
fn fractional_frame_count_is_fatal() {
    assert!(build_schedule(&[10, 0], &[0.0, 0.0], &PacingConfig::default(), fps(24), 0.3).is_err());
}

#[test]
fn single_step_holds_every_frame() {
    let sched = build_schedule(&[50], &[0.3], &PacingConfig::default(), fps(5), 1.0).unwrap();
    assert_eq!(sched.len(), 5);
    assert!(sched.entries().iter().all(|e| e.time_ma == 50.0));
}

#[test]
fn unordered_steps_are_rejected() {
    assert!(build_schedule(&[0, 10], &[0.0, 0.0], &PacingConfig::default(), fps(10), 1.0).is_err());
}
