use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        DriftError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        DriftError::geometry("x")
            .to_string()
            .contains("geometry error:")
    );
    assert!(
        DriftError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        DriftError::DataGap { time_ma: 420 }
            .to_string()
            .contains("420 Ma")
    );
}

#[test]
fn only_transient_source_errors_are_retryable() {
    assert!(DriftError::source(10, true, "timeout").is_transient());
    assert!(!DriftError::source(10, false, "missing file").is_transient());
    assert!(!DriftError::DataGap { time_ma: 10 }.is_transient());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DriftError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn io_errors_convert() {
    let err: DriftError = std::io::Error::other("disk").into();
    assert!(matches!(err, DriftError::Io(_)));
}
