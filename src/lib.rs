//! Road-matching and curvature-based speed-advisory engine
//!
//! Tracks the vehicle's current road segment from a stream of GPS fixes,
//! projects the upcoming two segments, derives the road curvature profile
//! ahead and converts it into curve speed targets bounded by a maximum
//! lateral acceleration. Road attributes and the speed profile are
//! republished every tick for the downstream control stack.

pub mod algorithms;
pub mod config;
pub mod core;
pub mod daemon;
pub mod graph;
pub mod logging;
pub mod output;
pub mod store;

// Re-export commonly used types
pub use crate::algorithms::{CurvaturePoint, MatcherParams, VelocityPoint};
pub use crate::config::Tunables;
pub use crate::core::{BoundingBox, GeoPoint, MatchedWay, Position, Tile, Way};
pub use crate::daemon::{Daemon, TickState};
pub use crate::graph::{Region, RegionStore};
pub use crate::store::{
    keys, FileParamStore, FileTileSource, MemoryParamStore, MockTileSource, ParamStore,
    StoreError, StoreResult, TileSource,
};
