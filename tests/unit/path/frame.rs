use super::*;
use crate::camera::synth::up_vector;
use crate::geometry::sphere::to_cartesian;
use crate::pacing::schedule::{PacingConfig, build_schedule};
use crate::path::crossfade::{CrossfadeConfig, compute_crossfade_schedule};
use approx::assert_relative_eq;

fn sample(step_index: usize, time_ma: u32, lon: f64) -> RawCameraSample {
    let target = to_cartesian(lon, 0.0);
    RawCameraSample {
        time_ma,
        step_index,
        target,
        distance: 6.0 + step_index as f64,
        up: up_vector(&target, None, 1.0),
        track_id: TrackId(0),
        break_before: false,
        interpolated: false,
        area: 1.0,
        dispersal: 0.0,
    }
}

fn path(frames: usize) -> CameraPath {
    let samples = [sample(0, 20, 0.0), sample(1, 10, 10.0), sample(2, 0, 20.0)];
    let fps = Fps::new(frames as u32, 1).unwrap();
    let schedule =
        build_schedule(&[20, 10, 0], &[0.0; 3], &PacingConfig::default(), fps, 1.0).unwrap();
    let frames = frames_from_schedule(&samples, &[0.2, 0.4, 0.6], &schedule, &EraTrack::default())
        .unwrap();
    let steps: Vec<usize> = frames.iter().map(|f| f.step_index).collect();
    CameraPath {
        metadata: PathMetadata {
            format_version: FORMAT_VERSION,
            oldest_ma: 20,
            newest_ma: 0,
            step_ma: 10,
            steps: 3,
            frame_count: frames.len() as u64,
            fps,
            duration_secs: 1.0,
            smoothing_window: 1,
            smoothing_sigma: 0.5,
            pacing: "uniform".to_owned(),
            continuity_breaks: 0,
            gap_steps: Vec::new(),
        },
        eras: Vec::new(),
        crossfades: compute_crossfade_schedule(&steps, &CrossfadeConfig::default()),
        frames,
    }
}

#[test]
fn frames_interpolate_between_steps() {
    let p = path(5);
    assert_eq!(p.len(), 5);
    let lons: Vec<f64> = p.frames.iter().map(|f| f.target.lon).collect();
    for (k, lon) in lons.iter().enumerate() {
        assert_relative_eq!(*lon, k as f64 * 5.0, epsilon = 1e-9);
    }
    let mid = p.frame(FrameIndex(1)).unwrap();
    assert_eq!(mid.step_index, 0);
    assert_relative_eq!(mid.time_ma, 15.0, epsilon = 1e-9);
    assert_relative_eq!(mid.distance, 6.5, epsilon = 1e-9);
    assert_relative_eq!(mid.significance, 0.3, epsilon = 1e-9);
    let eye_norm = mid.eye.iter().map(|c| c * c).sum::<f64>().sqrt();
    assert_relative_eq!(eye_norm, mid.distance, epsilon = 1e-9);
    assert_eq!(p.frames[4].step_index, 2);
    assert!(p.frame(FrameIndex(5)).is_none());
}

#[test]
fn json_round_trip_preserves_camera() {
    let p = path(9);
    p.validate().unwrap();
    let json = p.to_json_string().unwrap();
    let back = CameraPath::from_json_str(&json).unwrap();
    assert_eq!(back.len(), p.len());
    for (a, b) in p.frames.iter().zip(&back.frames) {
        assert_relative_eq!(a.target.lon, b.target.lon, epsilon = 1e-12);
        assert_relative_eq!(a.target.lat, b.target.lat, epsilon = 1e-12);
        assert_relative_eq!(a.distance, b.distance, epsilon = 1e-12);
        assert_eq!(a.up, b.up);
    }
    assert_eq!(back.crossfades, p.crossfades);
}

#[test]
fn frame_count_mismatch_is_rejected() {
    let mut p = path(5);
    p.frames.pop();
    assert!(matches!(
        p.validate(),
        Err(DriftError::FrameCountMismatch {
            expected: 5,
            actual: 4
        })
    ));
    let json = p.to_json_string().unwrap();
    assert!(CameraPath::from_json_str(&json).is_err());
}

#[test]
fn non_increasing_time_is_rejected() {
    let mut p = path(5);
    p.frames[3].anim_time_secs = p.frames[2].anim_time_secs;
    assert!(p.validate().is_err());
}

#[test]
fn crossfade_lookup_by_frame() {
    let p = path(9);
    assert!(!p.crossfades.is_empty());
    let first = p.crossfades[0];
    assert_eq!(p.crossfade(first.frame), Some(&first));
    assert!(p.crossfade(FrameIndex(0)).is_none());
}

#[test]
fn write_and_read_file() {
    let dir = std::env::temp_dir().join(format!("driftcam_path_{}", std::process::id()));
    let file = dir.join("nested").join("camera_path.json");
    let p = path(5);
    p.write_to_path(&file).unwrap();
    let back = CameraPath::from_path(&file).unwrap();
    assert_eq!(back.metadata, p.metadata);
    let _ = std::fs::remove_dir_all(&dir);
}
