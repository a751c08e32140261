//! Tile source: packed region blobs by grid cell
//!
//! The production implementation reads pre-generated tile files from local
//! storage (a separate downloader keeps that directory current). The mock
//! serves canned blobs and counts fetches for the region-store tests.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::core::Tile;
use crate::store::{StoreError, StoreResult};

/// Produces the packed blob for one grid tile
pub trait TileSource {
    fn fetch(&self, tile: Tile) -> StoreResult<Vec<u8>>;
}

/// Tile files on local storage, one file per grid cell
pub struct FileTileSource {
    root: PathBuf,
}

impl FileTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, tile: Tile) -> PathBuf {
        self.root
            .join(format!("{}_{}.tile", tile.lat_idx, tile.lon_idx))
    }
}

impl TileSource for FileTileSource {
    fn fetch(&self, tile: Tile) -> StoreResult<Vec<u8>> {
        let path = self.path_for(tile);
        fs::read(&path).map_err(|_| StoreError::TileUnavailable(path.display().to_string()))
    }
}

/// In-memory tile source for tests: canned blobs per tile or one blob for
/// every tile, a fetch counter, and a failure mode
pub struct MockTileSource {
    tiles: Mutex<HashMap<Tile, Vec<u8>>>,
    fallback: Option<Vec<u8>>,
    fetches: AtomicUsize,
    fail: bool,
}

impl MockTileSource {
    pub fn new() -> Self {
        Self {
            tiles: Mutex::new(HashMap::new()),
            fallback: None,
            fetches: AtomicUsize::new(0),
            fail: false,
        }
    }

    /// Source that serves `blob` for every tile
    pub fn serving(blob: Vec<u8>) -> Self {
        Self {
            fallback: Some(blob),
            ..Self::new()
        }
    }

    /// Source whose every fetch fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn insert(&self, tile: Tile, blob: Vec<u8>) {
        self.tiles.lock().unwrap().insert(tile, blob);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl Default for MockTileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TileSource for MockTileSource {
    fn fetch(&self, tile: Tile) -> StoreResult<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(StoreError::TileUnavailable(format!(
                "{}_{}",
                tile.lat_idx, tile.lon_idx
            )));
        }
        if let Some(blob) = self.tiles.lock().unwrap().get(&tile) {
            return Ok(blob.clone());
        }
        self.fallback
            .clone()
            .ok_or_else(|| StoreError::TileUnavailable(format!("{}_{}", tile.lat_idx, tile.lon_idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_serves_and_counts() {
        let source = MockTileSource::serving(vec![1, 2, 3]);
        let tile = Tile::containing(43.0, -83.5);
        assert_eq!(source.fetch(tile).unwrap(), vec![1, 2, 3]);
        assert_eq!(source.fetch_count(), 1);

        source.insert(tile, vec![9]);
        assert_eq!(source.fetch(tile).unwrap(), vec![9]);
        assert_eq!(source.fetch_count(), 2);
    }

    #[test]
    fn test_mock_failure_mode() {
        let source = MockTileSource::failing();
        let tile = Tile::containing(43.0, -83.5);
        assert!(matches!(
            source.fetch(tile),
            Err(StoreError::TileUnavailable(_))
        ));
    }
}
