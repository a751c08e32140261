//! Region lifecycle: reload decision, tile cover and download requests
//!
//! The store owns the policy side of region loading. It decides when the
//! loaded region still covers the vehicle, computes which grid tiles a
//! bounding box needs, and drives the external tile source. Tile fetch
//! failures propagate so the caller can keep the previous region and retry
//! on the next tick; malformed blobs degrade inside the decoder instead.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{BoundingBox, GeoPoint, Position, Tile};
use crate::graph::locations;
use crate::graph::region::Region;
use crate::store::tiles::TileSource;
use crate::store::StoreResult;

/// Explicit download request payload: an arbitrary bounding box
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundsRequest {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundsRequest {
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.min_lat, self.min_lon, self.max_lat, self.max_lon)
    }
}

/// Named-location download request payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationsRequest {
    #[serde(default)]
    pub nations: Vec<String>,
    #[serde(default)]
    pub states: Vec<String>,
}

/// Grid tiles covering a bounding box, clipped to the fixed grid and
/// de-duplicated. Overlap between requests is permitted; containment is
/// never subtracted.
pub fn tiles_covering(bounds: &BoundingBox) -> Vec<Tile> {
    let min = Tile::containing(bounds.min_lat, bounds.min_lon);
    let max = Tile::containing(bounds.max_lat, bounds.max_lon);
    let mut tiles = Vec::new();
    for lat_idx in min.lat_idx..=max.lat_idx {
        for lon_idx in min.lon_idx..=max.lon_idx {
            tiles.push(Tile { lat_idx, lon_idx });
        }
    }
    tiles
}

/// Owns the currently relevant region-loading policy around a tile source
pub struct RegionStore<T: TileSource> {
    source: T,
    margin_deg: f64,
}

impl<T: TileSource> RegionStore<T> {
    pub fn new(source: T, margin_deg: f64) -> Self {
        Self { source, margin_deg }
    }

    /// Keep or replace the loaded region for a position. Returns `None` when
    /// the position is strictly inside the loaded bounds (no I/O happens)
    /// and the freshly loaded replacement otherwise. Fetch failures leave
    /// the caller on the previous region.
    pub fn ensure_region(&self, position: &Position, loaded: &Region) -> StoreResult<Option<Region>> {
        if loaded.bounds.contains(position.latitude, position.longitude) {
            return Ok(None);
        }
        self.load_around(position.point()).map(Some)
    }

    /// Load the region covering the margin box around a point
    pub fn load_around(&self, center: GeoPoint) -> StoreResult<Region> {
        let bounds = BoundingBox::around(center, self.margin_deg);
        let tiles = tiles_covering(&bounds);
        let mut blobs = Vec::with_capacity(tiles.len());
        for tile in &tiles {
            blobs.push(self.source.fetch(*tile)?);
        }
        let region = Region::from_tiles(&blobs);
        info!(
            tiles = tiles.len(),
            ways = region.way_count(),
            "loaded region around {:.4}, {:.4}",
            center.latitude,
            center.longitude
        );
        Ok(region)
    }

    /// Fetch every tile covering a requested area, warming the tile source.
    /// The vehicle-tracking region is left alone; the next reload around the
    /// vehicle picks the data up if it is relevant.
    pub fn download_area(&self, bounds: &BoundingBox) -> StoreResult<usize> {
        let tiles = tiles_covering(bounds);
        for tile in &tiles {
            self.source.fetch(*tile)?;
        }
        Ok(tiles.len())
    }

    /// Resolve and download a named-location request. Unknown codes are
    /// skipped with a log line; known ones download independently.
    pub fn download_locations(&self, request: &LocationsRequest) -> StoreResult<usize> {
        let mut fetched = 0;
        for code in &request.nations {
            match locations::nation_bounds(code) {
                Some(bounds) => fetched += self.download_area(&bounds)?,
                None => debug!(code = %code, "unknown nation code in download request"),
            }
        }
        for code in &request.states {
            match locations::state_bounds(code) {
                Some(bounds) => fetched += self.download_area(&bounds)?,
                None => debug!(code = %code, "unknown state code in download request"),
            }
        }
        Ok(fetched)
    }
}
