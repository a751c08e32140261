//! External collaborators behind narrow trait boundaries
//!
//! The daemon talks to the outside world through exactly two interfaces: a
//! key/value parameter store shared with other processes, and a tile source
//! producing packed region blobs. Both come with a production file-backed
//! implementation and an in-memory implementation for tests.

pub mod params;
pub mod tiles;

pub use params::{keys, FileParamStore, MemoryParamStore, ParamStore};
pub use tiles::{FileTileSource, MockTileSource, TileSource};

/// Errors crossing the collaborator boundary
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("could not access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parameter {0} is not set")]
    Missing(String),
    #[error("tile {0} unavailable")]
    TileUnavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
