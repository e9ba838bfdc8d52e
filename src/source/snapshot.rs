use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::{
    foundation::error::{DriftError, DriftResult},
    geometry::polygon::PlatePolygon,
};

/// Polygon set produced by the reconstruction model for one time step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ReconstructionSnapshot {
    /// Reconstruction time in Ma (millions of years before present).
    pub time_ma: u32,
    pub polygons: Vec<PlatePolygon>,
}

impl ReconstructionSnapshot {
    pub fn new(time_ma: u32, polygons: Vec<PlatePolygon>) -> Self {
        Self { time_ma, polygons }
    }
}

/// Boundary to the plate-reconstruction collaborator.
///
/// Implementations may block (file or network IO). A failure that may succeed on retry should be
/// reported as [`DriftError::Source`] with `transient: true`.
pub trait SnapshotSource: Send + Sync {
    fn snapshot(&self, time_ma: u32) -> DriftResult<ReconstructionSnapshot>;
}

/// Fetch a snapshot, retrying transient failures up to `max_attempts` times in total.
pub fn fetch_with_retry(
    source: &dyn SnapshotSource,
    time_ma: u32,
    max_attempts: u32,
) -> DriftResult<ReconstructionSnapshot> {
    let attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match source.snapshot(time_ma) {
            Ok(snap) => {
                if snap.time_ma != time_ma {
                    return Err(DriftError::source(
                        time_ma,
                        false,
                        format!("source returned snapshot for {} Ma", snap.time_ma),
                    ));
                }
                return Ok(snap);
            }
            Err(err) if err.is_transient() && attempt < attempts => {
                tracing::warn!(time_ma, attempt, error = %err, "transient snapshot failure, retrying");
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Snapshots held in memory, keyed by reconstruction time.
#[derive(Clone, Debug, Default)]
pub struct InMemorySource {
    snapshots: BTreeMap<u32, ReconstructionSnapshot>,
}

impl InMemorySource {
    pub fn new(snapshots: impl IntoIterator<Item = ReconstructionSnapshot>) -> Self {
        Self {
            snapshots: snapshots.into_iter().map(|s| (s.time_ma, s)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Available times, oldest first.
    pub fn times_oldest_first(&self) -> Vec<u32> {
        self.snapshots.keys().rev().copied().collect()
    }
}

impl SnapshotSource for InMemorySource {
    fn snapshot(&self, time_ma: u32) -> DriftResult<ReconstructionSnapshot> {
        self.snapshots.get(&time_ma).cloned().ok_or_else(|| {
            DriftError::source(time_ma, false, "no snapshot stored for this time")
        })
    }
}

/// JSON archive of pre-exported snapshots: `{ "snapshots": [ { "time_ma": .., "polygons": [..] } ] }`.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct SnapshotArchive {
    pub snapshots: Vec<ReconstructionSnapshot>,
}

impl SnapshotArchive {
    pub fn from_json_str(s: &str) -> DriftResult<Self> {
        serde_json::from_str(s).map_err(|e| DriftError::serde(e.to_string()))
    }

    pub fn from_path(path: &Path) -> DriftResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read snapshot archive '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> DriftResult<String> {
        serde_json::to_string(self).map_err(|e| DriftError::serde(e.to_string()))
    }

    pub fn into_source(self) -> DriftResult<InMemorySource> {
        let mut seen = std::collections::BTreeSet::new();
        for s in &self.snapshots {
            if !seen.insert(s.time_ma) {
                return Err(DriftError::validation(format!(
                    "snapshot archive contains {} Ma twice",
                    s.time_ma
                )));
            }
        }
        Ok(InMemorySource::new(self.snapshots))
    }
}

/// Source backed by a [`SnapshotArchive`] file, loaded once on open.
#[derive(Clone, Debug)]
pub struct ArchiveSource {
    path: PathBuf,
    inner: InMemorySource,
}

impl ArchiveSource {
    pub fn open(path: impl AsRef<Path>) -> DriftResult<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = SnapshotArchive::from_path(&path)?.into_source()?;
        tracing::info!(path = %path.display(), snapshots = inner.len(), "opened snapshot archive");
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn times_oldest_first(&self) -> Vec<u32> {
        self.inner.times_oldest_first()
    }
}

impl SnapshotSource for ArchiveSource {
    fn snapshot(&self, time_ma: u32) -> DriftResult<ReconstructionSnapshot> {
        self.inner.snapshot(time_ma)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/snapshot.rs"]
mod tests;
