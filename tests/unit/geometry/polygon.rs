use super::*;
use approx::assert_relative_eq;

fn square(lon: f64, lat: f64, half: f64) -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(lon - half, lat - half),
        GeoPoint::new(lon + half, lat - half),
        GeoPoint::new(lon + half, lat + half),
        GeoPoint::new(lon - half, lat + half),
        GeoPoint::new(lon - half, lat - half),
    ]
}

#[test]
fn square_summary_has_center_and_cap() {
    let poly = PlatePolygon::new(7, square(30.0, 0.0, 5.0), 2.0);
    let s = poly.summarize().unwrap();
    let c = crate::geometry::sphere::to_geographic(s.centroid.as_ref()).unwrap();
    assert_relative_eq!(c.lon, 30.0, epsilon = 1e-9);
    assert_relative_eq!(c.lat, 0.0, epsilon = 1e-9);
    assert!(s.radius_deg > 7.0 && s.radius_deg < 7.1, "{}", s.radius_deg);
    assert_eq!(s.plate_id, 7);
    assert_eq!(s.area, 2.0);
}

#[test]
fn square_across_antimeridian_is_centred_on_it() {
    let poly = PlatePolygon::new(1, square(180.0, 10.0, 3.0), 1.0);
    let s = poly.summarize().unwrap();
    let c = crate::geometry::sphere::to_geographic(s.centroid.as_ref()).unwrap();
    assert!(c.lon.abs() > 179.9, "lon {}", c.lon);
    assert!(s.radius_deg < 5.0);
}

#[test]
fn zero_area_is_degenerate() {
    let poly = PlatePolygon::new(1, square(0.0, 0.0, 1.0), 0.0);
    assert_eq!(poly.summarize(), Err(Degeneracy::NonPositiveArea(0.0)));
}

#[test]
fn too_few_distinct_vertices_is_degenerate() {
    let v = vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(1.0, 0.0),
        GeoPoint::new(1.0, 0.0),
        GeoPoint::new(0.0, 0.0),
    ];
    let poly = PlatePolygon::new(1, v, 1.0);
    assert_eq!(poly.summarize(), Err(Degeneracy::TooFewVertices(2)));
}

#[test]
fn non_finite_vertex_is_degenerate() {
    let mut v = square(0.0, 0.0, 1.0);
    v[1].lat = f64::NAN;
    let poly = PlatePolygon::new(1, v, 1.0);
    assert_eq!(poly.summarize(), Err(Degeneracy::NonFiniteCoordinate));
}

#[test]
fn latitude_past_the_pole_is_degenerate() {
    // `GeoPoint::new` clamps; archive data arrives unclamped through serde.
    let v: Vec<GeoPoint> = [(0.0, 120.0), (10.0, 120.0), (10.0, 130.0), (0.0, 130.0)]
        .into_iter()
        .map(|(lon, lat)| GeoPoint { lon, lat })
        .collect();
    let poly = PlatePolygon::new(3, v, 1.0);
    assert_eq!(poly.summarize(), Err(Degeneracy::LatitudeOutOfRange(120.0)));

    let mut v = square(0.0, 0.0, 1.0);
    v[2].lat = -90.5;
    let poly = PlatePolygon::new(3, v, 1.0);
    assert_eq!(poly.summarize(), Err(Degeneracy::LatitudeOutOfRange(-90.5)));
}

#[test]
fn longitude_beyond_180_still_summarizes() {
    let poly = PlatePolygon::new(3, square(190.0, 0.0, 2.0), 1.0);
    let s = poly.summarize().unwrap();
    let c = crate::geometry::sphere::to_geographic(s.centroid.as_ref()).unwrap();
    assert_relative_eq!(c.lon, -170.0, epsilon = 1e-9);
}

#[test]
fn bow_tie_is_self_intersecting() {
    let v = vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(4.0, 4.0),
        GeoPoint::new(4.0, 0.0),
        GeoPoint::new(0.0, 4.0),
    ];
    let poly = PlatePolygon::new(1, v, 1.0);
    assert_eq!(poly.summarize(), Err(Degeneracy::SelfIntersecting));
}

#[test]
fn degeneracy_messages_are_readable() {
    assert!(Degeneracy::SelfIntersecting.to_string().contains("self-intersecting"));
    assert!(Degeneracy::TooFewVertices(2).to_string().contains("2"));
    assert!(Degeneracy::LatitudeOutOfRange(120.0).to_string().contains("120"));
}
