use std::collections::BTreeMap;

use crate::{
    foundation::error::{DriftError, DriftResult},
    geometry::polygon::PolygonSummary,
    geometry::sphere::{GeoPoint, UnitVec3, angular_distance_deg, mean_direction},
    source::snapshot::ReconstructionSnapshot,
};

/// Controls how plate polygons are grouped into landmasses.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Centroid-proximity link distances in degrees, tried in order until the largest cluster
    /// reaches `min_coverage`.
    pub link_thresholds_deg: Vec<f64>,
    /// Fraction of the snapshot's land area the largest cluster should cover.
    pub min_coverage: f64,
    /// Also link polygons whose bounding caps overlap, whatever the centroid distance.
    pub link_overlapping_caps: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            link_thresholds_deg: vec![12.0, 18.0, 25.0],
            min_coverage: 0.5,
            link_overlapping_caps: true,
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> DriftResult<()> {
        if self.link_thresholds_deg.is_empty() && !self.link_overlapping_caps {
            return Err(DriftError::validation(
                "cluster config links nothing: set link_thresholds_deg or link_overlapping_caps",
            ));
        }
        if self
            .link_thresholds_deg
            .iter()
            .any(|t| !t.is_finite() || *t < 0.0 || *t > 180.0)
        {
            return Err(DriftError::validation(
                "cluster link thresholds must be within [0, 180] degrees",
            ));
        }
        if self.link_thresholds_deg.windows(2).any(|w| w[1] < w[0]) {
            return Err(DriftError::validation(
                "cluster link thresholds must be non-decreasing",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_coverage) {
            return Err(DriftError::validation("cluster min_coverage must be in [0, 1]"));
        }
        Ok(())
    }
}

/// A connected cluster of plate polygons at one reconstruction time.
#[derive(Clone, Debug, PartialEq)]
pub struct Landmass {
    pub time_ma: u32,
    /// Area-weighted centroid on the unit sphere.
    pub centroid: UnitVec3,
    /// Sum of member polygon areas.
    pub area: f64,
    /// Radius in degrees of a centroid-centred cap covering every member.
    pub extent_deg: f64,
    /// Distinct plate ids of the members, ascending.
    pub plate_ids: Vec<u32>,
    pub polygon_count: usize,
}

impl Landmass {
    pub fn centroid_geo(&self) -> GeoPoint {
        GeoPoint::from_unit(&self.centroid)
    }
}

/// Clustering result for one snapshot.
#[derive(Clone, Debug)]
pub struct ClusteredSnapshot {
    pub time_ma: u32,
    /// Landmasses ordered by decreasing area.
    pub landmasses: Vec<Landmass>,
    /// Valid polygon summaries (input to the dispersal metric).
    pub polygons: Vec<PolygonSummary>,
    /// Total area of the valid polygons.
    pub total_area: f64,
    /// Degenerate polygons that were skipped.
    pub skipped: usize,
    /// Proximity threshold that produced the final clusters.
    pub link_threshold_deg: f64,
}

/// Disjoint-set forest with path halving and union by rank.
#[derive(Clone, Debug)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub(crate) fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.rank[ra] < self.rank[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        if self.rank[ra] == self.rank[rb] {
            self.rank[ra] += 1;
        }
    }

    /// Member indices per set, sets ordered by their smallest member.
    pub(crate) fn groups(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..self.parent.len() {
            let root = self.find(i);
            by_root.entry(root).or_default().push(i);
        }
        let mut groups: Vec<Vec<usize>> = by_root.into_values().collect();
        groups.sort_by_key(|g| g[0]);
        groups
    }
}

/// Partition a snapshot's polygons into landmasses.
///
/// Degenerate polygons are skipped with a warning. A snapshot without valid polygons yields an
/// empty landmass list; deciding what that means is up to the tracker.
#[tracing::instrument(skip(snapshot, config), fields(time_ma = snapshot.time_ma))]
pub fn cluster_snapshot(
    snapshot: &ReconstructionSnapshot,
    config: &ClusterConfig,
) -> ClusteredSnapshot {
    let mut polygons = Vec::with_capacity(snapshot.polygons.len());
    let mut skipped = 0;
    for (idx, poly) in snapshot.polygons.iter().enumerate() {
        match poly.summarize() {
            Ok(summary) => polygons.push(summary),
            Err(reason) => {
                skipped += 1;
                tracing::warn!(
                    time_ma = snapshot.time_ma,
                    polygon = idx,
                    plate_id = poly.plate_id,
                    %reason,
                    "skipping degenerate polygon"
                );
            }
        }
    }

    let total_area: f64 = polygons.iter().map(|p| p.area).sum();
    let n = polygons.len();
    if n == 0 {
        return ClusteredSnapshot {
            time_ma: snapshot.time_ma,
            landmasses: Vec::new(),
            polygons,
            total_area,
            skipped,
            link_threshold_deg: 0.0,
        };
    }

    let mut pairs = Vec::with_capacity(n * (n - 1) / 2);
    for a in 0..n {
        for b in (a + 1)..n {
            let dist = angular_distance_deg(&polygons[a].centroid, &polygons[b].centroid);
            let overlap = dist <= polygons[a].radius_deg + polygons[b].radius_deg;
            pairs.push((a, b, dist, overlap));
        }
    }

    let mut thresholds = config.link_thresholds_deg.clone();
    if thresholds.is_empty() {
        thresholds.push(0.0);
    }

    let mut groups = Vec::new();
    let mut used = 0.0;
    for &threshold in &thresholds {
        let mut sets = DisjointSet::new(n);
        for &(a, b, dist, overlap) in &pairs {
            if dist < threshold || (config.link_overlapping_caps && overlap) {
                sets.union(a, b);
            }
        }
        groups = sets.groups();
        used = threshold;

        let largest = groups
            .iter()
            .map(|g| g.iter().map(|&i| polygons[i].area).sum::<f64>())
            .fold(0.0, f64::max);
        let coverage = if total_area > 0.0 {
            largest / total_area
        } else {
            0.0
        };
        if coverage >= config.min_coverage {
            break;
        }
        tracing::debug!(
            time_ma = snapshot.time_ma,
            threshold,
            coverage,
            "largest cluster below coverage target, escalating link threshold"
        );
    }

    let mut landmasses: Vec<Landmass> = groups
        .iter()
        .map(|members| build_landmass(snapshot.time_ma, &polygons, members))
        .collect();
    landmasses.sort_by(|a, b| b.area.total_cmp(&a.area));

    tracing::debug!(
        time_ma = snapshot.time_ma,
        polygons = n,
        skipped,
        landmasses = landmasses.len(),
        link_threshold_deg = used,
        "clustered snapshot"
    );

    ClusteredSnapshot {
        time_ma: snapshot.time_ma,
        landmasses,
        polygons,
        total_area,
        skipped,
        link_threshold_deg: used,
    }
}

fn build_landmass(time_ma: u32, polygons: &[PolygonSummary], members: &[usize]) -> Landmass {
    let area: f64 = members.iter().map(|&i| polygons[i].area).sum();
    let centroid = mean_direction(
        members.iter().map(|&i| &polygons[i].centroid),
        members.iter().map(|&i| polygons[i].area),
    )
    .unwrap_or_else(|err| {
        // Members spread around the whole sphere: fall back to the heaviest member.
        let heaviest = members
            .iter()
            .copied()
            .max_by(|&a, &b| polygons[a].area.total_cmp(&polygons[b].area))
            .unwrap_or(members[0]);
        tracing::warn!(time_ma, error = %err, "landmass centroid undefined, using largest member");
        polygons[heaviest].centroid
    });

    let extent_deg = members
        .iter()
        .map(|&i| angular_distance_deg(&centroid, &polygons[i].centroid) + polygons[i].radius_deg)
        .fold(0.0, f64::max)
        .min(180.0);

    let mut plate_ids: Vec<u32> = members.iter().map(|&i| polygons[i].plate_id).collect();
    plate_ids.sort_unstable();
    plate_ids.dedup();

    Landmass {
        time_ma,
        centroid,
        area,
        extent_deg,
        plate_ids,
        polygon_count: members.len(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/cluster.rs"]
mod tests;
