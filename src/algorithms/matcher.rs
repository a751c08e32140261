//! Way matching with continuity preference
//!
//! Naive nearest-segment matching is unstable on grid road networks: GPS
//! noise makes the nearest way flip between parallel or crossing candidates
//! from one fix to the next. The matcher therefore scores a small candidate
//! set seeded from the previous tick's window, weighs heading agreement next
//! to perpendicular distance, and grants the previous current way a bonus so
//! near-ties resolve toward staying locked on.

use crate::algorithms::geodesy::{
    bearing_deg, heading_delta_deg, project_onto_segment, LocalPlane,
};
use crate::core::{GeoPoint, MatchedWay, Position, Way};
use crate::graph::region::Region;

/// Tunable matching heuristics. The scoring is a linear combination in
/// meters: perpendicular distance plus a per-degree penalty for heading
/// disagreement, minus a flat bonus for the incumbent way.
#[derive(Debug, Clone, Copy)]
pub struct MatcherParams {
    /// Radius of the spatial candidate search around the fix (m). Must
    /// comfortably exceed the node spacing of the map data, since the
    /// spatial index holds geometry nodes rather than segments.
    pub search_radius_m: f64,
    /// Candidates farther from the fix than this never match (m)
    pub max_match_distance_m: f64,
    /// Score penalty per degree of heading difference (m/deg)
    pub heading_weight_m_per_deg: f64,
    /// Score bonus for the previous tick's current way (m)
    pub continuity_bonus_m: f64,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            search_radius_m: 150.0,
            max_match_distance_m: 15.0,
            heading_weight_m_per_deg: 0.25,
            continuity_bonus_m: 8.0,
        }
    }
}

struct Candidate {
    way_id: u64,
    is_forward: bool,
    score: f64,
    start: GeoPoint,
    end: GeoPoint,
}

/// Select the current way for a new fix given the previous tick's window.
/// Returns the null way when nothing lies within tolerance, so downstream
/// consumers degrade to "unknown road" instead of failing the tick.
pub fn match_current(
    prev_current: &MatchedWay,
    prev_next: &MatchedWay,
    prev_second: &MatchedWay,
    region: &Region,
    position: &Position,
    params: &MatcherParams,
) -> MatchedWay {
    let plane = LocalPlane::new(position.point());

    let mut candidate_ids: Vec<u64> = Vec::new();
    for id in [prev_current.way, prev_next.way, prev_second.way]
        .into_iter()
        .flatten()
    {
        if !candidate_ids.contains(&id) {
            candidate_ids.push(id);
        }
    }
    for id in region.ways_near(position.point(), params.search_radius_m) {
        if !candidate_ids.contains(&id) {
            candidate_ids.push(id);
        }
    }

    let mut best: Option<Candidate> = None;
    for id in candidate_ids {
        let Some(way) = region.way_by_id(id) else {
            continue;
        };
        let Some(candidate) = evaluate(way, prev_current, position, &plane, params) else {
            continue;
        };
        match &best {
            Some(current_best) if current_best.score <= candidate.score => {}
            _ => best = Some(candidate),
        }
    }

    match best {
        Some(c) => MatchedWay {
            way: Some(c.way_id),
            is_forward: c.is_forward,
            start: c.start,
            end: c.end,
        },
        None => MatchedWay::default(),
    }
}

fn evaluate(
    way: &Way,
    prev_current: &MatchedWay,
    position: &Position,
    plane: &LocalPlane,
    params: &MatcherParams,
) -> Option<Candidate> {
    if way.nodes.len() < 2 {
        return None;
    }

    // Closest segment of the centerline to the fix (the fix is the plane
    // origin)
    let origin = nalgebra::Vector2::new(0.0, 0.0);
    let mut best_distance = f64::INFINITY;
    let mut best_segment = 0;
    let mut best_point = origin;
    let mut best_bearing = 0.0;
    for i in 0..way.nodes.len() - 1 {
        let a = plane.project(way.nodes[i]);
        let b = plane.project(way.nodes[i + 1]);
        let proj = project_onto_segment(origin, a, b);
        if proj.distance < best_distance {
            best_distance = proj.distance;
            best_segment = i;
            best_point = proj.point;
            best_bearing = bearing_deg(a, b);
        }
    }

    if best_distance > params.max_match_distance_m {
        return None;
    }

    let diff_forward = heading_delta_deg(position.bearing, best_bearing);
    let diff_backward = heading_delta_deg(position.bearing, best_bearing + 180.0);
    let heading_diff = diff_forward.min(diff_backward);

    let is_incumbent = prev_current.way == Some(way.id);
    let is_forward = if (diff_forward - diff_backward).abs() < 1e-9 {
        // Ambiguous heading: keep the incumbent direction, otherwise take
        // the direction that actually continues somewhere
        if is_incumbent {
            prev_current.is_forward
        } else if !way.forward_ways.is_empty() {
            true
        } else {
            way.backward_ways.is_empty()
        }
    } else {
        diff_forward < diff_backward
    };

    let mut score = best_distance + params.heading_weight_m_per_deg * heading_diff;
    if is_incumbent {
        score -= params.continuity_bonus_m;
    }

    // Reporting points: the interpolated nearest point and the next
    // geometry vertex in the travel direction
    let start = plane.unproject(best_point);
    let end = if is_forward {
        way.nodes[best_segment + 1]
    } else {
        way.nodes[best_segment]
    };

    Some(Candidate {
        way_id: way.id,
        is_forward,
        score,
        start,
        end,
    })
}
