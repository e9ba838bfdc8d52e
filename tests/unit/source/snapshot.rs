use super::*;
use crate::geometry::sphere::GeoPoint;
use std::sync::atomic::{AtomicU32, Ordering};

fn tri(time_ma: u32) -> ReconstructionSnapshot {
    ReconstructionSnapshot::new(
        time_ma,
        vec![PlatePolygon::new(
            1,
            vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(2.0, 0.0),
                GeoPoint::new(1.0, 2.0),
            ],
            1.0,
        )],
    )
}

struct Flaky {
    failures_left: AtomicU32,
    transient: bool,
    calls: AtomicU32,
}

impl SnapshotSource for Flaky {
    fn snapshot(&self, time_ma: u32) -> DriftResult<ReconstructionSnapshot> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let left = self.failures_left.load(Ordering::SeqCst);
        if left > 0 {
            self.failures_left.store(left - 1, Ordering::SeqCst);
            return Err(DriftError::source(time_ma, self.transient, "flaky"));
        }
        Ok(tri(time_ma))
    }
}

fn flaky(failures: u32, transient: bool) -> Flaky {
    Flaky {
        failures_left: AtomicU32::new(failures),
        transient,
        calls: AtomicU32::new(0),
    }
}

#[test]
fn transient_failures_are_retried() {
    let src = flaky(2, true);
    let snap = fetch_with_retry(&src, 100, 3).unwrap();
    assert_eq!(snap.time_ma, 100);
    assert_eq!(src.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn retries_are_bounded() {
    let src = flaky(5, true);
    assert!(fetch_with_retry(&src, 100, 3).is_err());
    assert_eq!(src.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn permanent_failures_are_not_retried() {
    let src = flaky(1, false);
    assert!(fetch_with_retry(&src, 100, 5).is_err());
    assert_eq!(src.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn in_memory_source_serves_by_time() {
    let src = InMemorySource::new([tri(300), tri(200), tri(100)]);
    assert_eq!(src.len(), 3);
    assert_eq!(src.times_oldest_first(), vec![300, 200, 100]);
    assert_eq!(src.snapshot(200).unwrap().time_ma, 200);
    assert!(matches!(
        src.snapshot(250),
        Err(DriftError::Source {
            time_ma: 250,
            transient: false,
            ..
        })
    ));
}

#[test]
fn archive_json_roundtrip_and_duplicates() {
    let archive = SnapshotArchive {
        snapshots: vec![tri(10), tri(0)],
    };
    let json = archive.to_json_string().unwrap();
    let back = SnapshotArchive::from_json_str(&json).unwrap();
    assert_eq!(back.snapshots, archive.snapshots);
    assert_eq!(back.into_source().unwrap().len(), 2);

    let dup = SnapshotArchive {
        snapshots: vec![tri(10), tri(10)],
    };
    assert!(dup.into_source().is_err());
    assert!(SnapshotArchive::from_json_str("{ not json").is_err());
}

#[test]
fn archive_source_reads_file() {
    let dir = std::env::temp_dir().join(format!("driftcam_archive_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("snapshots.json");
    let archive = SnapshotArchive {
        snapshots: vec![tri(20), tri(10)],
    };
    std::fs::write(&path, archive.to_json_string().unwrap()).unwrap();

    let src = ArchiveSource::open(&path).unwrap();
    assert_eq!(src.path(), path.as_path());
    assert_eq!(src.times_oldest_first(), vec![20, 10]);
    assert_eq!(fetch_with_retry(&src, 10, 3).unwrap().time_ma, 10);
    assert!(ArchiveSource::open(dir.join("missing.json")).is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
