//! End-to-end camera path computation.
//!
//! Snapshot fetching and clustering are independent per time step and may run on a dedicated
//! rayon pool; everything after that (tracking, smoothing, pacing) is sequential and
//! deterministic.

use rayon::prelude::*;

use crate::{
    camera::synth::synthesize,
    config::PipelineConfig,
    foundation::core::Fps,
    foundation::error::{DriftError, DriftResult},
    pacing::schedule::build_schedule,
    pacing::significance::significance,
    pacing::smooth::smooth_samples,
    path::crossfade::compute_crossfade_schedule,
    path::frame::{CameraPath, FORMAT_VERSION, PathMetadata, frames_from_schedule},
    source::snapshot::{InMemorySource, ReconstructionSnapshot, SnapshotSource, fetch_with_retry},
    tracking::cluster::{ClusteredSnapshot, cluster_snapshot},
    tracking::tracker::LandmassTracker,
};

/// Fetch and cluster every configured time step, oldest first.
#[tracing::instrument(skip_all, fields(steps = times.len(), parallel = config.threading.parallel))]
pub fn fetch_and_cluster(
    source: &dyn SnapshotSource,
    times: &[u32],
    config: &PipelineConfig,
) -> DriftResult<Vec<ClusteredSnapshot>> {
    let attempts = config.source.max_attempts;
    let one = |&time_ma: &u32| -> DriftResult<ClusteredSnapshot> {
        let snapshot = fetch_with_retry(source, time_ma, attempts)?;
        Ok(cluster_snapshot(&snapshot, &config.cluster))
    };

    if !config.threading.parallel || times.len() < 2 {
        return times.iter().map(one).collect();
    }
    let pool = build_thread_pool(config.threading.threads)?;
    // `collect` on an indexed parallel iterator keeps input order.
    pool.install(|| times.par_iter().map(one).collect())
}

fn build_thread_pool(threads: Option<usize>) -> DriftResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(DriftError::validation(
            "threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| DriftError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

/// Compute the camera path for every step of `config.time` served by `source`.
#[tracing::instrument(skip_all)]
pub fn compute_camera_path(
    source: &dyn SnapshotSource,
    config: &PipelineConfig,
) -> DriftResult<CameraPath> {
    config.validate()?;
    let times = config.time.times();
    let fps = Fps::new(config.output.fps.num, config.output.fps.den)?;
    tracing::info!(
        oldest_ma = config.time.oldest_ma,
        newest_ma = config.time.newest_ma,
        step_ma = config.time.step_ma,
        steps = times.len(),
        "computing camera path"
    );

    let clustered = fetch_and_cluster(source, &times, config)?;
    let report = LandmassTracker::new(config.tracker.clone()).track(&clustered, config.gap_policy)?;

    let eras = config.era_track()?;
    let raw = synthesize(&report.tracked, &config.camera, &eras)?;
    let smoothed = smooth_samples(&raw, &config.smoothing)?;
    let sig = significance(&smoothed, config.pacing.area_weight, &config.smoothing.kernel());

    let schedule = build_schedule(
        &times,
        &sig,
        &config.pacing,
        fps,
        config.output.duration_secs,
    )?;
    let frames = frames_from_schedule(&smoothed, &sig, &schedule, &eras)?;
    let step_indices: Vec<usize> = frames.iter().map(|f| f.step_index).collect();
    let crossfades = compute_crossfade_schedule(&step_indices, &config.crossfade);

    let path = CameraPath {
        metadata: PathMetadata {
            format_version: FORMAT_VERSION,
            oldest_ma: config.time.oldest_ma,
            newest_ma: config.time.newest_ma,
            step_ma: config.time.step_ma,
            steps: times.len(),
            frame_count: frames.len() as u64,
            fps,
            duration_secs: config.output.duration_secs,
            smoothing_window: config.smoothing.window,
            smoothing_sigma: config.smoothing.effective_sigma(),
            pacing: format!(
                "significance-weighted: sensitivity {}, area weight {}, {} holds",
                config.pacing.sensitivity,
                config.pacing.area_weight,
                config.pacing.holds.len()
            ),
            continuity_breaks: report.breaks.len(),
            gap_steps: report.gaps.clone(),
        },
        eras: eras.keyframes().to_vec(),
        frames,
        crossfades,
    };
    path.validate()?;

    tracing::info!(
        frames = path.len(),
        crossfades = path.crossfades.len(),
        breaks = report.breaks.len(),
        gaps = report.gaps.len(),
        skipped_polygons = report.skipped_polygons,
        "camera path ready"
    );
    Ok(path)
}

/// Convenience wrapper over [`compute_camera_path`] for snapshots already in memory.
pub fn compute_camera_path_from_snapshots(
    snapshots: Vec<ReconstructionSnapshot>,
    config: &PipelineConfig,
) -> DriftResult<CameraPath> {
    compute_camera_path(&InMemorySource::new(snapshots), config)
}
