//! Local tangent plane geometry for road matching and curvature math
//!
//! All matching and curvature computations run in a 2-D east/north plane
//! anchored near the vehicle. The equirectangular approximation is accurate
//! well below GPS noise over the few kilometers a region query spans.

use nalgebra::Vector2;

use crate::core::{GeoPoint, METERS_PER_DEG_LAT, METERS_PER_DEG_LON_EQUATOR};

/// Local tangent plane (east, north) in meters relative to a reference point
#[derive(Debug, Clone, Copy)]
pub struct LocalPlane {
    origin: GeoPoint,
    meters_per_deg_lon: f64,
}

impl LocalPlane {
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            meters_per_deg_lon: METERS_PER_DEG_LON_EQUATOR * origin.latitude.to_radians().cos(),
        }
    }

    /// Convert a geographic point to plane coordinates (x east, y north)
    pub fn project(&self, p: GeoPoint) -> Vector2<f64> {
        Vector2::new(
            (p.longitude - self.origin.longitude) * self.meters_per_deg_lon,
            (p.latitude - self.origin.latitude) * METERS_PER_DEG_LAT,
        )
    }

    /// Convert plane coordinates back to a geographic point
    pub fn unproject(&self, v: Vector2<f64>) -> GeoPoint {
        GeoPoint {
            latitude: self.origin.latitude + v.y / METERS_PER_DEG_LAT,
            longitude: self.origin.longitude + v.x / self.meters_per_deg_lon,
        }
    }
}

/// Compass bearing of the direction from `from` to `to` in the plane,
/// degrees clockwise from north in [0, 360)
pub fn bearing_deg(from: Vector2<f64>, to: Vector2<f64>) -> f64 {
    let d = to - from;
    let deg = d.x.atan2(d.y).to_degrees();
    (deg + 360.0) % 360.0
}

/// Absolute difference between two headings, normalized to [0, 180]
pub fn heading_delta_deg(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    if d > 180.0 {
        360.0 - d
    } else {
        d
    }
}

/// Result of projecting a point onto a segment
#[derive(Debug, Clone, Copy)]
pub struct SegmentProjection {
    /// Closest point on the segment
    pub point: Vector2<f64>,
    /// Parameter along the segment, clamped to [0, 1]
    pub t: f64,
    /// Distance from the query point to `point` in meters
    pub distance: f64,
}

/// Project `p` onto the segment from `a` to `b`
pub fn project_onto_segment(
    p: Vector2<f64>,
    a: Vector2<f64>,
    b: Vector2<f64>,
) -> SegmentProjection {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    let t = if len_sq > 0.0 {
        ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let point = a + ab * t;
    SegmentProjection {
        point,
        t,
        distance: (p - point).norm(),
    }
}
