use super::*;
use crate::geometry::{polygon::PlatePolygon, sphere::GeoPoint};
use approx::assert_relative_eq;

fn square(plate_id: u32, lon: f64, lat: f64, half: f64, area: f64) -> PlatePolygon {
    PlatePolygon::new(
        plate_id,
        vec![
            GeoPoint::new(lon - half, lat - half),
            GeoPoint::new(lon + half, lat - half),
            GeoPoint::new(lon + half, lat + half),
            GeoPoint::new(lon - half, lat + half),
        ],
        area,
    )
}

#[test]
fn disjoint_set_merges_transitively() {
    let mut s = DisjointSet::new(5);
    s.union(0, 1);
    s.union(3, 4);
    s.union(1, 4);
    assert_eq!(s.find(0), s.find(3));
    assert_ne!(s.find(0), s.find(2));
    assert_eq!(s.groups(), vec![vec![0, 1, 3, 4], vec![2]]);
}

#[test]
fn adjacent_polygons_form_one_landmass() {
    let snap = ReconstructionSnapshot::new(
        300,
        vec![
            square(1, 0.0, 0.0, 3.0, 2.0),
            square(2, 6.0, 0.0, 3.0, 2.0),
            square(3, 100.0, 0.0, 3.0, 1.0),
        ],
    );
    let out = cluster_snapshot(&snap, &ClusterConfig::default());
    assert_eq!(out.landmasses.len(), 2);
    let big = &out.landmasses[0];
    assert_eq!(big.plate_ids, vec![1, 2]);
    assert_eq!(big.polygon_count, 2);
    assert_relative_eq!(big.area, 4.0);
    let c = big.centroid_geo();
    assert_relative_eq!(c.lon, 3.0, epsilon = 1e-6);
    assert!(big.extent_deg > 6.0 && big.extent_deg < 8.0);
    assert_relative_eq!(big.centroid.norm(), 1.0, epsilon = 1e-12);
    assert_eq!(out.landmasses[1].plate_ids, vec![3]);
}

#[test]
fn threshold_escalates_until_coverage_reached() {
    // Three equal polygons 15 deg apart: 12 deg links nothing (coverage 1/3),
    // 18 deg links the chain.
    let snap = ReconstructionSnapshot::new(
        10,
        vec![
            square(1, 0.0, 0.0, 1.0, 1.0),
            square(2, 15.0, 0.0, 1.0, 1.0),
            square(3, 30.0, 0.0, 1.0, 1.0),
        ],
    );
    let out = cluster_snapshot(&snap, &ClusterConfig::default());
    assert_eq!(out.link_threshold_deg, 18.0);
    assert_eq!(out.landmasses.len(), 1);
    assert_eq!(out.landmasses[0].polygon_count, 3);
}

#[test]
fn cluster_across_antimeridian_keeps_centroid_on_dateline() {
    let snap = ReconstructionSnapshot::new(
        50,
        vec![
            square(1, 177.0, -5.0, 2.0, 1.0),
            square(2, -177.0, -5.0, 2.0, 1.0),
        ],
    );
    let out = cluster_snapshot(&snap, &ClusterConfig::default());
    assert_eq!(out.landmasses.len(), 1);
    assert!(out.landmasses[0].centroid_geo().lon.abs() > 179.0);
}

#[test]
fn degenerate_polygons_are_skipped_not_fatal() {
    let snap = ReconstructionSnapshot::new(
        20,
        vec![square(1, 0.0, 0.0, 2.0, 0.0), square(2, 40.0, 0.0, 2.0, 1.0)],
    );
    let out = cluster_snapshot(&snap, &ClusterConfig::default());
    assert_eq!(out.skipped, 1);
    assert_eq!(out.landmasses.len(), 1);
    assert_eq!(out.landmasses[0].plate_ids, vec![2]);
}

#[test]
fn out_of_range_latitude_is_skipped() {
    let snap = ReconstructionSnapshot::new(
        20,
        vec![
            PlatePolygon::new(
                1,
                [(0.0, 120.0), (10.0, 120.0), (10.0, 130.0), (0.0, 130.0)]
                    .into_iter()
                    .map(|(lon, lat)| GeoPoint { lon, lat })
                    .collect(),
                9.0,
            ),
            square(2, 40.0, 0.0, 2.0, 1.0),
        ],
    );
    let out = cluster_snapshot(&snap, &ClusterConfig::default());
    assert_eq!(out.skipped, 1);
    assert_eq!(out.landmasses.len(), 1);
    assert_eq!(out.landmasses[0].plate_ids, vec![2]);
    assert_eq!(out.total_area, 1.0);
}

#[test]
fn empty_snapshot_yields_no_landmasses() {
    let snap = ReconstructionSnapshot::new(5, vec![]);
    let out = cluster_snapshot(&snap, &ClusterConfig::default());
    assert!(out.landmasses.is_empty());
    assert_eq!(out.total_area, 0.0);
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(ClusterConfig::default().validate().is_ok());
    let bad = ClusterConfig {
        min_coverage: 1.5,
        ..ClusterConfig::default()
    };
    assert!(bad.validate().is_err());
    let unordered = ClusterConfig {
        link_thresholds_deg: vec![20.0, 10.0],
        ..ClusterConfig::default()
    };
    assert!(unordered.validate().is_err());
    let nothing = ClusterConfig {
        link_thresholds_deg: vec![],
        link_overlapping_caps: false,
        ..ClusterConfig::default()
    };
    assert!(nothing.validate().is_err());
}
