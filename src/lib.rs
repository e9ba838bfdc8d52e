//! driftcam computes the camera path for an animated visualization of continental drift.
//!
//! Input is a sequence of plate-tectonic reconstruction snapshots (plate polygons per time step);
//! output is a [`CameraPath`]: one set of camera parameters per animation frame, ready for a 3D
//! globe renderer.
//!
//! # Pipeline overview
//!
//! 1. **Cluster**: `ReconstructionSnapshot -> ClusteredSnapshot` (plate polygons grouped into
//!    landmasses with union-find)
//! 2. **Track**: follow the dominant landmass across steps with stable track ids
//! 3. **Synthesize**: look-at target, distance and up-vector per step, with era guidance
//! 4. **Smooth**: blend continuity breaks, then Gaussian-smooth every channel
//! 5. **Pace**: spend more frames on significant stretches (supercontinents) and holds
//! 6. **Serialize**: per-frame [`CameraFrame`]s plus crossfade hints, as JSON
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the same snapshots and config always produce the same path, also when
//!   snapshots are fetched in parallel.
//! - **Antimeridian-safe**: every average and interpolation happens on unit vectors.
#![forbid(unsafe_code)]

pub mod camera;
pub mod config;
pub mod foundation;
pub mod geometry;
pub mod pacing;
pub mod path;
pub mod pipeline;
pub mod source;
pub mod tracking;

pub use crate::camera::eras::{EraKeyframe, EraTrack};
pub use crate::camera::synth::{CameraConfig, RawCameraSample};
pub use crate::config::{OutputConfig, PipelineConfig, SourceConfig, Threading, TimeRange};
pub use crate::foundation::core::{Fps, FrameIndex, TrackId};
pub use crate::foundation::ease::Ease;
pub use crate::foundation::error::{DriftError, DriftResult};
pub use crate::geometry::polygon::PlatePolygon;
pub use crate::geometry::sphere::{
    GeoPoint, UnitVec3, angular_distance_deg, average_centroid, normalize_lon, slerp,
    to_cartesian, to_geographic,
};
pub use crate::pacing::schedule::{HoldSpec, PacingConfig, PacingSchedule};
pub use crate::pacing::smooth::SmoothingConfig;
pub use crate::path::crossfade::{CrossfadeBlend, CrossfadeConfig};
pub use crate::path::frame::{CameraFrame, CameraPath, PathMetadata};
pub use crate::pipeline::{compute_camera_path, compute_camera_path_from_snapshots};
pub use crate::source::snapshot::{
    ArchiveSource, InMemorySource, ReconstructionSnapshot, SnapshotArchive, SnapshotSource,
};
pub use crate::tracking::cluster::{ClusterConfig, Landmass};
pub use crate::tracking::tracker::{
    ContinuityBreak, GapPolicy, LandmassTracker, TrackReport, TrackerConfig,
};
