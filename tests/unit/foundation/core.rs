use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    let err = Fps::new(24, 0).unwrap_err();
    assert!(err.to_string().contains("output frame rate 24/0"), "{err}");
}

#[test]
fn fps_frames_secs_roundtrip() {
    let fps = Fps::new(30000, 1001).unwrap();
    let secs = fps.frames_to_secs(123);
    assert_eq!(fps.secs_to_frames_round(secs), 123);
}

#[test]
fn frames_for_duration_requires_whole_frames() {
    let fps = Fps::new(24, 1).unwrap();
    assert_eq!(fps.frames_for_duration(45.5).unwrap(), 1092);
    assert!(fps.frames_for_duration(1.01).is_err());
    assert!(fps.frames_for_duration(0.0).is_err());
    assert!(fps.frames_for_duration(f64::NAN).is_err());
}

#[test]
fn frame_index_orders_numerically() {
    let mut v = vec![FrameIndex(3), FrameIndex(0), FrameIndex(2)];
    v.sort();
    assert_eq!(v, vec![FrameIndex(0), FrameIndex(2), FrameIndex(3)]);
}
