//! Curvature profile and curve speed targets
//!
//! The engine concatenates the geometry of the three-way window from the
//! vehicle's projected point onward, evaluates curvature at every geometry
//! vertex with the three-point circumradius method, and converts the profile
//! into velocities bounded by the target lateral acceleration. The output
//! feeds map-based turn speed control downstream.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::algorithms::geodesy::{project_onto_segment, LocalPlane};
use crate::core::{
    GeoPoint, MatchedWay, Position, MIN_CURVATURE, UNCONSTRAINED_VELOCITY,
};
use crate::graph::region::Region;

/// Curvature at a distance ahead of the vehicle along the projected path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvaturePoint {
    /// Along-path distance from the vehicle (m)
    pub distance: f64,
    /// Curvature, the inverse circumradius (1/m)
    pub curvature: f64,
}

/// Target velocity at a distance ahead of the vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityPoint {
    /// Along-path distance from the vehicle (m)
    pub distance: f64,
    /// Target velocity (m/s)
    pub velocity: f64,
}

/// Curvature of the circle through three points, 0 for collinear points
pub fn three_point_curvature(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    // Twice the signed triangle area; the circumradius is abc / (4 * area)
    let area2 = (b - a).perp(&(c - a));
    if area2.abs() < 1e-9 {
        return 0.0;
    }
    let la = (b - a).norm();
    let lb = (c - b).norm();
    let lc = (a - c).norm();
    2.0 * area2.abs() / (la * lb * lc)
}

/// Curvature sequence ahead of the vehicle over the current, next and
/// second-next ways. Empty when the current way is the null way.
pub fn window_curvatures(
    current: &MatchedWay,
    next: &MatchedWay,
    second_next: &MatchedWay,
    region: &Region,
    position: &Position,
) -> Vec<CurvaturePoint> {
    let path = window_geometry(current, next, second_next, region, position);
    if path.len() < 3 {
        return Vec::new();
    }

    let plane = LocalPlane::new(position.point());
    let points: Vec<Vector2<f64>> = path.iter().map(|p| plane.project(*p)).collect();

    let mut cumulative = vec![0.0; points.len()];
    for i in 1..points.len() {
        cumulative[i] = cumulative[i - 1] + (points[i] - points[i - 1]).norm();
    }

    (1..points.len() - 1)
        .map(|i| CurvaturePoint {
            distance: cumulative[i],
            curvature: three_point_curvature(points[i - 1], points[i], points[i + 1]),
        })
        .collect()
}

/// Point-wise curve speed targets: `v = sqrt(a_lat / k)`, unconstrained on
/// straight road
pub fn target_velocities(
    curvatures: &[CurvaturePoint],
    target_lat_accel: f64,
) -> Vec<VelocityPoint> {
    curvatures
        .iter()
        .map(|point| VelocityPoint {
            distance: point.distance,
            velocity: if point.curvature > MIN_CURVATURE {
                (target_lat_accel / point.curvature).sqrt()
            } else {
                UNCONSTRAINED_VELOCITY
            },
        })
        .collect()
}

/// Concatenated geometry from the vehicle's projected point on the current
/// way through the second-next way, in travel order
fn window_geometry(
    current: &MatchedWay,
    next: &MatchedWay,
    second_next: &MatchedWay,
    region: &Region,
    position: &Position,
) -> Vec<GeoPoint> {
    let Some(way) = region.slot_way(current) else {
        return Vec::new();
    };

    let mut path = ahead_on_way(way, current.is_forward, position.point());
    for slot in [next, second_next] {
        let Some(way) = region.slot_way(slot) else {
            break;
        };
        let nodes: Vec<GeoPoint> = if slot.is_forward {
            way.nodes.clone()
        } else {
            way.nodes.iter().rev().copied().collect()
        };
        for node in nodes {
            if path
                .last()
                .is_some_and(|last| last.quantized() == node.quantized())
            {
                continue;
            }
            path.push(node);
        }
    }
    path
}

/// The projected point on `way` nearest to `from`, then every remaining
/// vertex in the travel direction
fn ahead_on_way(way: &crate::core::Way, is_forward: bool, from: GeoPoint) -> Vec<GeoPoint> {
    if way.nodes.len() < 2 {
        return Vec::new();
    }
    let plane = LocalPlane::new(from);
    let origin = Vector2::new(0.0, 0.0);

    let mut best_distance = f64::INFINITY;
    let mut best_segment = 0;
    let mut best_point = origin;
    for i in 0..way.nodes.len() - 1 {
        let a = plane.project(way.nodes[i]);
        let b = plane.project(way.nodes[i + 1]);
        let proj = project_onto_segment(origin, a, b);
        if proj.distance < best_distance {
            best_distance = proj.distance;
            best_segment = i;
            best_point = proj.point;
        }
    }

    let mut path = vec![plane.unproject(best_point)];
    if is_forward {
        path.extend(way.nodes[best_segment + 1..].iter().copied());
    } else {
        path.extend(way.nodes[..=best_segment].iter().rev().copied());
    }
    path
}
