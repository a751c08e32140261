//! Forward projection to the next connected way
//!
//! With no route context the projector assumes through traffic: at a fork it
//! continues onto whichever neighbor departs closest to the current way's
//! exit heading. The projection is a pure function of (way, direction,
//! region) and is recomputed every tick so a changed current way can never
//! leave a stale chain behind.

use crate::algorithms::geodesy::{bearing_deg, heading_delta_deg, LocalPlane};
use crate::core::{GeoPoint, MatchedWay, Way};
use crate::graph::region::Region;

/// Next way continuing from a window slot in its travel direction. The null
/// way projects to the null way; a dead end does too.
pub fn next_way(slot: &MatchedWay, region: &Region) -> MatchedWay {
    let Some(way) = region.slot_way(slot) else {
        return MatchedWay::default();
    };
    if way.nodes.len() < 2 {
        return MatchedWay::default();
    }

    let neighbors = if slot.is_forward {
        &way.forward_ways
    } else {
        &way.backward_ways
    };
    if neighbors.is_empty() {
        return MatchedWay::default();
    }

    let junction = if slot.is_forward {
        way.last_node()
    } else {
        way.first_node()
    };
    let exit_heading = exit_heading(way, slot.is_forward, junction);

    let mut best_delta = f64::INFINITY;
    let mut best_id = u64::MAX;
    let mut best: Option<MatchedWay> = None;
    for &id in neighbors {
        let Some(neighbor) = region.way_by_id(id) else {
            continue;
        };
        if neighbor.nodes.len() < 2 || neighbor.id == way.id {
            continue;
        }
        // The neighbor is traversed forward when its first node sits at the
        // junction, backward when its last node does
        let enters_forward = neighbor.first_node().quantized() == junction.quantized();
        let entry_heading = entry_heading(neighbor, enters_forward, junction);
        let delta = heading_delta_deg(exit_heading, entry_heading);

        if delta < best_delta || (delta == best_delta && id < best_id) {
            let (start, end) = if enters_forward {
                (neighbor.first_node(), neighbor.last_node())
            } else {
                (neighbor.last_node(), neighbor.first_node())
            };
            best_delta = delta;
            best_id = id;
            best = Some(MatchedWay {
                way: Some(id),
                is_forward: enters_forward,
                start,
                end,
            });
        }
    }

    best.unwrap_or_default()
}

/// Heading of the final segment of `way` when leaving through `junction`
fn exit_heading(way: &Way, is_forward: bool, junction: GeoPoint) -> f64 {
    let plane = LocalPlane::new(junction);
    let n = way.nodes.len();
    let (from, to) = if is_forward {
        (way.nodes[n - 2], way.nodes[n - 1])
    } else {
        (way.nodes[1], way.nodes[0])
    };
    bearing_deg(plane.project(from), plane.project(to))
}

/// Heading of the first segment of `way` when entering at `junction`
fn entry_heading(way: &Way, enters_forward: bool, junction: GeoPoint) -> f64 {
    let plane = LocalPlane::new(junction);
    let n = way.nodes.len();
    let (from, to) = if enters_forward {
        (way.nodes[0], way.nodes[1])
    } else {
        (way.nodes[n - 1], way.nodes[n - 2])
    };
    bearing_deg(plane.project(from), plane.project(to))
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::graph::region::fixtures::{blob_around, straight_way};
    use crate::graph::wire::WayBlob;

    fn region_of(blobs: Vec<WayBlob>) -> Region {
        Region::decode(&blob_around(blobs).encode_to_vec())
    }

    fn slot(way: u64, is_forward: bool) -> MatchedWay {
        MatchedWay {
            way: Some(way),
            is_forward,
            ..MatchedWay::default()
        }
    }

    /// Way bending away from due east at `angle_deg`, starting at the given
    /// node, ~200 m long
    fn branch(id: u64, start_lat: f64, start_lon: f64, angle_deg: f64) -> WayBlob {
        let step = 0.00123;
        let heading = angle_deg.to_radians();
        WayBlob {
            id,
            name: format!("Way {id}"),
            reference: String::new(),
            max_speed: 0.0,
            advisory_speed: 0.0,
            hazard: String::new(),
            node_lats: (0..3)
                .map(|i| start_lat + i as f64 * step * heading.cos() * 0.73)
                .collect(),
            node_lons: (0..3).map(|i| start_lon + i as f64 * step * heading.sin()).collect(),
        }
    }

    #[test]
    fn test_null_way_projects_to_null_way() {
        let region = region_of(vec![straight_way(1, -83.5, 27.0)]);
        let result = next_way(&MatchedWay::default(), &region);
        assert_eq!(result, MatchedWay::default());
    }

    #[test]
    fn test_dead_end_projects_to_null_way() {
        let region = region_of(vec![straight_way(1, -83.5, 27.0)]);
        let result = next_way(&slot(1, true), &region);
        assert_eq!(result, MatchedWay::default());
    }

    #[test]
    fn test_follows_the_chain_in_both_directions() {
        let region = region_of(vec![
            straight_way(1, -83.5, 27.0),
            straight_way(2, -83.5 + 3.0 * 0.00123, 27.0),
        ]);

        // Forward from way 1 reaches way 2, traversed forward
        let result = next_way(&slot(1, true), &region);
        assert_eq!(result.way, Some(2));
        assert!(result.is_forward);
        assert!((result.start.longitude - (-83.5 + 3.0 * 0.00123)).abs() < 1e-9);
        assert!((result.end.longitude - (-83.5 + 6.0 * 0.00123)).abs() < 1e-9);

        // Backward from way 2 reaches way 1, traversed backward
        let result = next_way(&slot(2, false), &region);
        assert_eq!(result.way, Some(1));
        assert!(!result.is_forward);
        assert!((result.start.longitude - (-83.5 + 3.0 * 0.00123)).abs() < 1e-9);
        assert!((result.end.longitude - (-83.5)).abs() < 1e-9);
    }

    #[test]
    fn test_fork_prefers_straightest_continuation() {
        // Way 1 heads due east into a fork: way 2 continues nearly straight
        // (100° bearing), way 3 turns off (150° bearing)
        let junction_lon = -83.5 + 3.0 * 0.00123;
        let region = region_of(vec![
            straight_way(1, -83.5, 27.0),
            branch(2, 43.0, junction_lon, 100.0),
            branch(3, 43.0, junction_lon, 150.0),
        ]);

        let result = next_way(&slot(1, true), &region);
        assert_eq!(result.way, Some(2));
        assert!(result.is_forward);
    }

    #[test]
    fn test_projection_is_deterministic() {
        let region = region_of(vec![
            straight_way(1, -83.5, 27.0),
            straight_way(2, -83.5 + 3.0 * 0.00123, 27.0),
        ]);
        let a = next_way(&slot(1, true), &region);
        let b = next_way(&slot(1, true), &region);
        assert_eq!(a, b);
    }
}
