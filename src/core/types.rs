//! Core data types for the road-matching engine

use serde::{Deserialize, Serialize};

use crate::core::constants::TILE_SIZE_DEG;

/// GPS fix with heading, as published by the position source
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Heading in degrees clockwise from north
    pub bearing: f64,
}

impl Position {
    /// Whether this fix carries usable coordinates. A (0, 0) fix is the
    /// position source's "never located" value and is rejected.
    pub fn has_fix(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.bearing.is_finite()
            && !(self.latitude == 0.0 && self.longitude == 0.0)
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Geographic point in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Quantized key for endpoint identity (about 1 cm of resolution).
    /// Two ways are connected when their endpoint keys are equal.
    pub fn quantized(&self) -> (i64, i64) {
        (
            (self.latitude * 1e7).round() as i64,
            (self.longitude * 1e7).round() as i64,
        )
    }
}

/// Axis-aligned bounding box in degrees, min <= max on each axis
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Strict containment check. Points on the boundary count as outside so
    /// that a vehicle reaching the edge of the loaded area triggers a reload.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude > self.min_lat
            && latitude < self.max_lat
            && longitude > self.min_lon
            && longitude < self.max_lon
    }

    /// Box spanning `margin_deg` on each side of a point
    pub fn around(center: GeoPoint, margin_deg: f64) -> Self {
        Self {
            min_lat: center.latitude - margin_deg,
            min_lon: center.longitude - margin_deg,
            max_lat: center.latitude + margin_deg,
            max_lon: center.longitude + margin_deg,
        }
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_lat: self.min_lat.min(other.min_lat),
            min_lon: self.min_lon.min(other.min_lon),
            max_lat: self.max_lat.max(other.max_lat),
            max_lon: self.max_lon.max(other.max_lon),
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: (self.min_lat + self.max_lat) / 2.0,
            longitude: (self.min_lon + self.max_lon) / 2.0,
        }
    }
}

/// Fixed grid cell used as the unit of map storage and fetch. Tile (i, j)
/// covers latitudes [i * 2, i * 2 + 2) and longitudes [j * 2, j * 2 + 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile {
    pub lat_idx: i32,
    pub lon_idx: i32,
}

impl Tile {
    /// Tile containing a coordinate
    pub fn containing(latitude: f64, longitude: f64) -> Self {
        Self {
            lat_idx: (latitude / TILE_SIZE_DEG).floor() as i32,
            lon_idx: (longitude / TILE_SIZE_DEG).floor() as i32,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox {
            min_lat: self.lat_idx as f64 * TILE_SIZE_DEG,
            min_lon: self.lon_idx as f64 * TILE_SIZE_DEG,
            max_lat: self.lat_idx as f64 * TILE_SIZE_DEG + TILE_SIZE_DEG,
            max_lon: self.lon_idx as f64 * TILE_SIZE_DEG + TILE_SIZE_DEG,
        }
    }
}

/// Road segment with centerline geometry, attributes and endpoint
/// connectivity. Immutable once the region is loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Way {
    pub id: u64,
    pub name: String,
    pub reference: String,
    /// Legal maximum speed in m/s, 0 when unknown
    pub max_speed: f64,
    /// Advisory speed in m/s, 0 when none is posted
    pub advisory_speed: f64,
    /// Hazard label, empty when none
    pub hazard: String,
    /// Ordered centerline nodes, at least two per valid way
    pub nodes: Vec<GeoPoint>,
    /// Ids of ways connected at the last node (continuing forward)
    pub forward_ways: Vec<u64>,
    /// Ids of ways connected at the first node (continuing backward)
    pub backward_ways: Vec<u64>,
}

impl Way {
    /// Display name preferring `name`, falling back to the reference code
    pub fn road_name(&self) -> &str {
        if !self.name.is_empty() {
            &self.name
        } else {
            &self.reference
        }
    }

    pub fn first_node(&self) -> GeoPoint {
        self.nodes.first().copied().unwrap_or_default()
    }

    pub fn last_node(&self) -> GeoPoint {
        self.nodes.last().copied().unwrap_or_default()
    }
}

/// One slot of the rolling current/next/second-next window. `way` is `None`
/// when no match exists; consumers treat that as "unknown road" and fall
/// back to zero speeds and empty strings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MatchedWay {
    pub way: Option<u64>,
    /// Travel direction relative to node order
    pub is_forward: bool,
    /// Interpolated point where the slot begins (for reporting)
    pub start: GeoPoint,
    /// Interpolated point one projection step ahead (for reporting)
    pub end: GeoPoint,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_fix_is_rejected() {
        let pos = Position::default();
        assert!(!pos.has_fix());

        let pos = Position {
            latitude: 42.3,
            longitude: -83.7,
            bearing: 90.0,
        };
        assert!(pos.has_fix());
    }

    #[test]
    fn test_bounding_box_containment_is_strict() {
        let b = BoundingBox::new(42.0, -84.0, 44.0, -82.0);
        assert!(b.contains(43.0, -83.0));
        // Boundary points count as outside
        assert!(!b.contains(42.0, -83.0));
        assert!(!b.contains(43.0, -82.0));
        assert!(!b.contains(45.0, -83.0));
    }

    #[test]
    fn test_tile_grid_snapping() {
        let tile = Tile::containing(43.1, -83.7);
        assert_eq!(tile.lat_idx, 21);
        assert_eq!(tile.lon_idx, -42);

        let bounds = tile.bounds();
        assert_eq!(bounds.min_lat, 42.0);
        assert_eq!(bounds.max_lat, 44.0);
        assert_eq!(bounds.min_lon, -84.0);
        assert_eq!(bounds.max_lon, -82.0);

        // Negative coordinates floor away from zero
        let tile = Tile::containing(-0.5, -0.5);
        assert_eq!(tile.lat_idx, -1);
        assert_eq!(tile.lon_idx, -1);
    }

    #[test]
    fn test_road_name_falls_back_to_reference() {
        let mut way = Way {
            name: "Main Street".to_string(),
            reference: "M-17".to_string(),
            ..Way::default()
        };
        assert_eq!(way.road_name(), "Main Street");

        way.name.clear();
        assert_eq!(way.road_name(), "M-17");

        way.reference.clear();
        assert_eq!(way.road_name(), "");
    }
}
