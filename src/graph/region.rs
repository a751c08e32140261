//! In-memory road graph for the loaded region
//!
//! A [`Region`] is decoded from one or more tile blobs, gets its endpoint
//! connectivity and spatial index built once, and is then read-only for its
//! whole lifetime. It is replaced wholesale when the vehicle leaves its
//! bounding box, never mutated in place.

use std::collections::{HashMap, HashSet};

use kiddo::{KdTree, SquaredEuclidean};
use prost::Message;
use tracing::debug;

use crate::algorithms::geodesy::LocalPlane;
use crate::core::{BoundingBox, GeoPoint, MatchedWay, Way};
use crate::graph::wire::RegionBlob;

/// Immutable-per-load road graph with spatial and id lookup
pub struct Region {
    pub bounds: BoundingBox,
    ways: Vec<Way>,
    by_id: HashMap<u64, usize>,
    /// Node index in local meters; items are indices into `ways`
    index: KdTree<f64, 2>,
    plane: LocalPlane,
}

impl Region {
    /// Region with no ways and an all-zero bounding box. Matching against it
    /// yields the null way; every position lies outside of it.
    pub fn empty() -> Self {
        Self::assemble(BoundingBox::default(), Vec::new())
    }

    /// Decode a single tile blob. Malformed input degrades to the empty
    /// region; callers treat that as "no match possible", not as an error.
    pub fn decode(bytes: &[u8]) -> Self {
        match RegionBlob::decode(bytes) {
            Ok(blob) => Self::from_blobs(vec![blob]),
            Err(err) => {
                debug!(error = %err, "could not decode region blob");
                Self::empty()
            }
        }
    }

    /// Decode and merge a set of tile blobs into one region. Ways appearing
    /// in several overlapping tiles are kept once.
    pub fn from_tiles(blobs: &[Vec<u8>]) -> Self {
        let mut decoded = Vec::with_capacity(blobs.len());
        for bytes in blobs {
            match RegionBlob::decode(bytes.as_slice()) {
                Ok(blob) => decoded.push(blob),
                Err(err) => debug!(error = %err, "skipping malformed tile blob"),
            }
        }
        Self::from_blobs(decoded)
    }

    fn from_blobs(blobs: Vec<RegionBlob>) -> Self {
        let mut bounds: Option<BoundingBox> = None;
        let mut ways: Vec<Way> = Vec::new();
        let mut seen: HashSet<u64> = HashSet::new();

        for blob in blobs {
            let tile_bounds =
                BoundingBox::new(blob.min_lat, blob.min_lon, blob.max_lat, blob.max_lon);
            bounds = Some(match bounds {
                Some(b) => b.union(&tile_bounds),
                None => tile_bounds,
            });

            for way in blob.ways {
                if seen.contains(&way.id) {
                    continue;
                }
                if way.node_lats.len() != way.node_lons.len() || way.node_lats.len() < 2 {
                    debug!(way = way.id, "skipping way with invalid geometry");
                    continue;
                }
                let nodes = way
                    .node_lats
                    .iter()
                    .zip(way.node_lons.iter())
                    .map(|(&latitude, &longitude)| GeoPoint {
                        latitude,
                        longitude,
                    })
                    .collect();
                seen.insert(way.id);
                ways.push(Way {
                    id: way.id,
                    name: way.name,
                    reference: way.reference,
                    max_speed: way.max_speed,
                    advisory_speed: way.advisory_speed,
                    hazard: way.hazard,
                    nodes,
                    forward_ways: Vec::new(),
                    backward_ways: Vec::new(),
                });
            }
        }

        Self::assemble(bounds.unwrap_or_default(), ways)
    }

    fn assemble(bounds: BoundingBox, mut ways: Vec<Way>) -> Self {
        link_endpoints(&mut ways);

        let plane = LocalPlane::new(bounds.center());
        let mut index: KdTree<f64, 2> = KdTree::new();
        let mut by_id = HashMap::with_capacity(ways.len());
        for (idx, way) in ways.iter().enumerate() {
            by_id.insert(way.id, idx);
            for node in &way.nodes {
                let p = plane.project(*node);
                index.add(&[p.x, p.y], idx as u64);
            }
        }

        Self {
            bounds,
            ways,
            by_id,
            index,
            plane,
        }
    }

    pub fn way_count(&self) -> usize {
        self.ways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ways.is_empty()
    }

    pub fn way_by_id(&self, id: u64) -> Option<&Way> {
        self.by_id.get(&id).map(|&idx| &self.ways[idx])
    }

    /// Way behind a window slot, `None` for the null way or after a reload
    /// dropped the id
    pub fn slot_way(&self, slot: &MatchedWay) -> Option<&Way> {
        slot.way.and_then(|id| self.way_by_id(id))
    }

    /// Ids of ways with at least one geometry node within `radius_m` of the
    /// point, in arbitrary order
    pub fn ways_near(&self, point: GeoPoint, radius_m: f64) -> Vec<u64> {
        let q = self.plane.project(point);
        let mut ids = Vec::new();
        for hit in self
            .index
            .within_unsorted::<SquaredEuclidean>(&[q.x, q.y], radius_m * radius_m)
        {
            let id = self.ways[hit.item as usize].id;
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

/// Populate forward/backward neighbor lists. Ways sharing an endpoint node
/// (by quantized key) are connected; a way's forward neighbors sit at its
/// last node, backward neighbors at its first.
fn link_endpoints(ways: &mut [Way]) {
    let mut by_endpoint: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
    for (idx, way) in ways.iter().enumerate() {
        if way.nodes.len() < 2 {
            continue;
        }
        by_endpoint
            .entry(way.first_node().quantized())
            .or_default()
            .push(idx);
        by_endpoint
            .entry(way.last_node().quantized())
            .or_default()
            .push(idx);
    }

    for idx in 0..ways.len() {
        if ways[idx].nodes.len() < 2 {
            continue;
        }
        let first = ways[idx].first_node().quantized();
        let last = ways[idx].last_node().quantized();

        let neighbors_at = |key: (i64, i64)| -> Vec<u64> {
            by_endpoint
                .get(&key)
                .map(|indices| {
                    indices
                        .iter()
                        .filter(|&&other| other != idx)
                        .map(|&other| ways[other].id)
                        .collect()
                })
                .unwrap_or_default()
        };

        let forward = neighbors_at(last);
        let backward = neighbors_at(first);
        ways[idx].forward_ways = forward;
        ways[idx].backward_ways = backward;
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::graph::wire::WayBlob;

    /// Straight east-west way on the 43rd parallel, 4 nodes, ~300 m long
    pub fn straight_way(id: u64, start_lon: f64, max_speed: f64) -> WayBlob {
        straight_way_at(id, 43.0, start_lon, max_speed)
    }

    /// Straight east-west way at an arbitrary latitude
    pub fn straight_way_at(id: u64, latitude: f64, start_lon: f64, max_speed: f64) -> WayBlob {
        WayBlob {
            id,
            name: format!("Way {id}"),
            reference: String::new(),
            max_speed,
            advisory_speed: 0.0,
            hazard: String::new(),
            node_lats: vec![latitude; 4],
            node_lons: (0..4).map(|i| start_lon + i as f64 * 0.00123).collect(),
        }
    }

    pub fn blob_around(ways: Vec<WayBlob>) -> RegionBlob {
        RegionBlob {
            min_lat: 42.0,
            min_lon: -84.0,
            max_lat: 44.0,
            max_lon: -82.0,
            ways,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_malformed_blob_degrades_to_empty_region() {
        let region = Region::decode(&[0xff, 0xff, 0x01, 0x07, 0x03]);
        assert!(region.is_empty());
        assert_eq!(region.bounds, BoundingBox::default());
        // The empty region contains no position, so the next tick reloads
        assert!(!region.bounds.contains(43.0, -83.0));
    }

    #[test]
    fn test_decode_round_trip_preserves_attributes() {
        let mut way = straight_way(7, -83.5, 27.0);
        way.advisory_speed = 13.0;
        way.hazard = "ice".to_string();
        let bytes = blob_around(vec![way]).encode_to_vec();

        let region = Region::decode(&bytes);
        assert_eq!(region.way_count(), 1);
        let way = region.way_by_id(7).unwrap();
        assert_eq!(way.road_name(), "Way 7");
        assert_eq!(way.max_speed, 27.0);
        assert_eq!(way.advisory_speed, 13.0);
        assert_eq!(way.hazard, "ice");
        assert_eq!(way.nodes.len(), 4);
    }

    #[test]
    fn test_merge_deduplicates_overlapping_tiles() {
        let a = blob_around(vec![straight_way(1, -83.5, 27.0)]).encode_to_vec();
        let b = blob_around(vec![straight_way(1, -83.5, 27.0), straight_way(2, -83.4, 31.0)])
            .encode_to_vec();

        let region = Region::from_tiles(&[a, b]);
        assert_eq!(region.way_count(), 2);
        assert!(region.way_by_id(1).is_some());
        assert!(region.way_by_id(2).is_some());
    }

    #[test]
    fn test_endpoint_linking_connects_consecutive_ways() {
        // Way 2 starts where way 1 ends
        let first = straight_way(1, -83.5, 27.0);
        let second = straight_way(2, -83.5 + 3.0 * 0.00123, 27.0);
        assert_eq!(first.node_lons.last(), second.node_lons.first());

        let bytes = blob_around(vec![first, second]).encode_to_vec();
        let region = Region::decode(&bytes);

        let first = region.way_by_id(1).unwrap();
        assert_eq!(first.forward_ways, vec![2]);
        assert!(first.backward_ways.is_empty());

        let second = region.way_by_id(2).unwrap();
        assert_eq!(second.backward_ways, vec![1]);
        assert!(second.forward_ways.is_empty());
    }

    #[test]
    fn test_ways_near_respects_radius() {
        let bytes = blob_around(vec![
            straight_way(1, -83.5, 27.0),
            straight_way(2, -82.5, 27.0), // ~80 km east
        ])
        .encode_to_vec();
        let region = Region::decode(&bytes);

        let near = region.ways_near(GeoPoint::new(43.0001, -83.499), 50.0);
        assert_eq!(near, vec![1]);

        let none = region.ways_near(GeoPoint::new(43.2, -83.499), 50.0);
        assert!(none.is_empty());
    }
}
