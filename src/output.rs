//! Per-tick output publishing
//!
//! Every tick republishes the full attribute set, one parameter-store key
//! per concept. Keys update independently; a failed write is logged and the
//! key keeps its last good value until a later tick succeeds.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::algorithms::{CurvaturePoint, VelocityPoint};
use crate::core::MatchedWay;
use crate::graph::region::Region;
use crate::store::{keys, ParamStore};

/// Upcoming legal-limit change point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NextSpeedLimit {
    pub latitude: f64,
    pub longitude: f64,
    pub speedlimit: f64,
}

/// Advisory limit over a stretch of road
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryLimit {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub speedlimit: f64,
}

/// Hazard over a stretch of road, empty label when none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: f64,
    pub end_longitude: f64,
    pub hazard: String,
}

/// Whether the next way (rather than the second-next) is the representative
/// upcoming change point for a limit value. The nearer segment is reported
/// unless its value is indistinguishable from "no change" while a real
/// change sits two segments ahead; short unposted connectors must not flap
/// the reported upcoming limit.
pub fn next_is_change_point(current: f64, next: f64, second_next: f64) -> bool {
    (next != current || second_next == current) && (next != 0.0 || second_next == 0.0)
}

/// Write every output key for the tick
pub fn publish<P: ParamStore>(
    params: &P,
    region: &Region,
    current: &MatchedWay,
    next: &MatchedWay,
    second_next: &MatchedWay,
    curvatures: &[CurvaturePoint],
    velocities: &[VelocityPoint],
) {
    put_json(params, keys::CURVATURES, &curvatures);
    put_json(params, keys::TARGET_VELOCITIES, &velocities);

    let road_name = region
        .slot_way(current)
        .map(|way| way.road_name().to_string())
        .unwrap_or_default();
    put_raw(params, keys::ROAD_NAME, road_name.as_bytes());

    put_json(params, keys::SPEED_LIMIT, &max_speed(region, current));
    put_json(
        params,
        keys::HAZARD,
        &Hazard {
            start_latitude: current.start.latitude,
            start_longitude: current.start.longitude,
            end_latitude: current.end.latitude,
            end_longitude: current.end.longitude,
            hazard: hazard(region, current),
        },
    );
    put_json(
        params,
        keys::ADVISORY_LIMIT,
        &AdvisoryLimit {
            start_latitude: current.start.latitude,
            start_longitude: current.start.longitude,
            end_latitude: current.end.latitude,
            end_longitude: current.end.longitude,
            speedlimit: advisory_speed(region, current),
        },
    );

    put_json(
        params,
        keys::NEXT_HAZARD,
        &Hazard {
            start_latitude: next.start.latitude,
            start_longitude: next.start.longitude,
            end_latitude: next.end.latitude,
            end_longitude: next.end.longitude,
            hazard: hazard(region, next),
        },
    );

    let speed_slot = if next_is_change_point(
        max_speed(region, current),
        max_speed(region, next),
        max_speed(region, second_next),
    ) {
        next
    } else {
        second_next
    };
    put_json(
        params,
        keys::NEXT_SPEED_LIMIT,
        &NextSpeedLimit {
            latitude: speed_slot.start.latitude,
            longitude: speed_slot.start.longitude,
            speedlimit: max_speed(region, speed_slot),
        },
    );

    let advisory_slot = if next_is_change_point(
        advisory_speed(region, current),
        advisory_speed(region, next),
        advisory_speed(region, second_next),
    ) {
        next
    } else {
        second_next
    };
    put_json(
        params,
        keys::NEXT_ADVISORY_LIMIT,
        &AdvisoryLimit {
            start_latitude: advisory_slot.start.latitude,
            start_longitude: advisory_slot.start.longitude,
            end_latitude: advisory_slot.end.latitude,
            end_longitude: advisory_slot.end.longitude,
            speedlimit: advisory_speed(region, advisory_slot),
        },
    );
}

fn max_speed(region: &Region, slot: &MatchedWay) -> f64 {
    region.slot_way(slot).map(|way| way.max_speed).unwrap_or(0.0)
}

fn advisory_speed(region: &Region, slot: &MatchedWay) -> f64 {
    region
        .slot_way(slot)
        .map(|way| way.advisory_speed)
        .unwrap_or(0.0)
}

fn hazard(region: &Region, slot: &MatchedWay) -> String {
    region
        .slot_way(slot)
        .map(|way| way.hazard.clone())
        .unwrap_or_default()
}

fn put_json<P: ParamStore, T: Serialize>(params: &P, key: &str, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => put_raw(params, key, &bytes),
        Err(err) => debug!(key, error = %err, "could not encode output"),
    }
}

fn put_raw<P: ParamStore>(params: &P, key: &str, bytes: &[u8]) {
    if let Err(err) = params.put(key, bytes) {
        warn!(key, error = %err, "could not write output");
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;
    use crate::graph::region::fixtures::{blob_around, straight_way};
    use crate::store::MemoryParamStore;

    #[test]
    fn test_change_point_selection_policy() {
        // A real change on the next segment reports the next segment
        assert!(next_is_change_point(30.0, 50.0, 50.0));
        // No change anywhere keeps the next segment
        assert!(next_is_change_point(30.0, 30.0, 30.0));
        // Unchanged next with a change behind it defers to second-next
        assert!(!next_is_change_point(30.0, 30.0, 50.0));
        // An unposted connector before a posted change defers too
        assert!(!next_is_change_point(30.0, 0.0, 50.0));
        // Everything unposted ahead still reports the next segment
        assert!(next_is_change_point(30.0, 0.0, 0.0));
    }

    #[test]
    fn test_publish_writes_every_output_key() {
        let mut blob_way = straight_way(1, -83.5, 27.0);
        blob_way.advisory_speed = 22.0;
        blob_way.hazard = "curve".to_string();
        let region = Region::decode(&blob_around(vec![blob_way]).encode_to_vec());

        let current = MatchedWay {
            way: Some(1),
            is_forward: true,
            ..MatchedWay::default()
        };
        let none = MatchedWay::default();
        let params = MemoryParamStore::new();

        publish(&params, &region, &current, &none, &none, &[], &[]);

        assert_eq!(params.get(keys::ROAD_NAME).unwrap(), b"Way 1");
        let limit: f64 = serde_json::from_slice(&params.get(keys::SPEED_LIMIT).unwrap()).unwrap();
        assert_eq!(limit, 27.0);
        let advisory: AdvisoryLimit =
            serde_json::from_slice(&params.get(keys::ADVISORY_LIMIT).unwrap()).unwrap();
        assert_eq!(advisory.speedlimit, 22.0);
        let hazard: Hazard = serde_json::from_slice(&params.get(keys::HAZARD).unwrap()).unwrap();
        assert_eq!(hazard.hazard, "curve");

        // Null next/second-next degrade to zero values, not missing keys
        let next_limit: NextSpeedLimit =
            serde_json::from_slice(&params.get(keys::NEXT_SPEED_LIMIT).unwrap()).unwrap();
        assert_eq!(next_limit.speedlimit, 0.0);
        let next_hazard: Hazard =
            serde_json::from_slice(&params.get(keys::NEXT_HAZARD).unwrap()).unwrap();
        assert!(next_hazard.hazard.is_empty());

        assert!(params.contains(keys::CURVATURES));
        assert!(params.contains(keys::TARGET_VELOCITIES));
    }
}
