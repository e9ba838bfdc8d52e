use super::*;

const ALL: [Ease; 4] = [
    Ease::Linear,
    Ease::InOutQuad,
    Ease::InOutCubic,
    Ease::Smoothstep,
];

#[test]
fn endpoints_are_fixed() {
    for e in ALL {
        assert_eq!(e.apply(0.0), 0.0, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
    }
}

#[test]
fn curves_are_monotonic_and_clamped() {
    for e in ALL {
        let mut prev = e.apply(-0.5);
        for i in 0..=100 {
            let v = e.apply(f64::from(i) / 100.0);
            assert!(v >= prev - 1e-12, "{e:?} not monotonic at {i}");
            prev = v;
        }
        assert!((e.apply(1.5) - 1.0).abs() < 1e-12);
    }
}

#[test]
fn serde_names_are_snake_case() {
    let s = serde_json::to_string(&Ease::InOutCubic).unwrap();
    assert_eq!(s, "\"in_out_cubic\"");
    let back: Ease = serde_json::from_str("\"smoothstep\"").unwrap();
    assert_eq!(back, Ease::Smoothstep);
}
