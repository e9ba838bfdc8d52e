/// Convenience result type used across driftcam.
pub type DriftResult<T> = Result<T, DriftError>;

/// Top-level error taxonomy used by the camera-path pipeline.
#[derive(thiserror::Error, Debug)]
pub enum DriftError {
    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A reconstruction snapshot has no usable polygons.
    ///
    /// Callers must either interpolate from neighbouring snapshots or abort the run.
    #[error("data gap: snapshot at {time_ma} Ma has no usable polygons")]
    DataGap {
        /// Reconstruction time of the empty snapshot.
        time_ma: u32,
    },

    /// Geometric input that has no meaningful result (zero vector, empty average, ...).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// The number of produced frames differs from `duration * fps`.
    #[error("frame count mismatch: expected {expected} frames, got {actual}")]
    FrameCountMismatch {
        /// Frames implied by the configured duration and frame rate.
        expected: u64,
        /// Frames actually present.
        actual: u64,
    },

    /// The snapshot source failed to deliver a snapshot.
    #[error("snapshot source error at {time_ma} Ma: {message}")]
    Source {
        /// Requested reconstruction time.
        time_ma: u32,
        /// Whether retrying the request may succeed.
        transient: bool,
        /// Source-specific description.
        message: String,
    },

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem errors while reading inputs or writing the path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DriftError {
    /// Build a [`DriftError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DriftError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`DriftError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`DriftError::Source`] value.
    pub fn source(time_ma: u32, transient: bool, msg: impl Into<String>) -> Self {
        Self::Source {
            time_ma,
            transient,
            message: msg.into(),
        }
    }

    /// `true` for source failures that are worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Source {
                transient: true,
                ..
            }
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
