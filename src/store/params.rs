//! Key/value parameter store shared with the rest of the vehicle stack
//!
//! Every read and write is a single atomic key operation; there is no
//! cross-key transaction. Downstream consumers tolerate transient cross-key
//! staleness, so writers update keys independently.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::store::{StoreError, StoreResult};

/// Parameter key names. One key per concept; `*_PERSIST` variants survive
/// reboots and are only read at startup.
pub mod keys {
    /// Latest GPS fix, JSON `{latitude, longitude, bearing}`
    pub const LAST_GPS_POSITION: &str = "LastGpsPosition";
    pub const LAST_GPS_POSITION_PERSIST: &str = "LastGpsPositionPersist";

    /// One-shot log level override ("trace".."error")
    pub const LOG_LEVEL: &str = "MapLogLevel";
    pub const LOG_LEVEL_PERSIST: &str = "MapLogLevelPersist";
    /// One-shot log format override, `1` = human readable, `0` = JSON lines
    pub const PRETTY_LOG: &str = "MapPrettyLog";
    pub const PRETTY_LOG_PERSIST: &str = "MapPrettyLogPersist";

    /// One-shot target lateral acceleration override, JSON number in m/s^2
    pub const TARGET_LAT_ACCEL: &str = "MapTargetLatA";
    pub const TARGET_LAT_ACCEL_PERSIST: &str = "MapTargetLatAPersist";

    /// Download triggers, consumed once then cleared
    pub const DOWNLOAD_BOUNDS: &str = "MapDownloadBounds";
    pub const DOWNLOAD_LOCATIONS: &str = "MapDownloadLocations";

    // Per-tick outputs
    pub const CURVATURES: &str = "MapCurvatures";
    pub const TARGET_VELOCITIES: &str = "MapTargetVelocities";
    pub const ROAD_NAME: &str = "RoadName";
    pub const SPEED_LIMIT: &str = "MapSpeedLimit";
    pub const ADVISORY_LIMIT: &str = "MapAdvisoryLimit";
    pub const HAZARD: &str = "MapHazard";
    pub const NEXT_HAZARD: &str = "NextMapHazard";
    pub const NEXT_SPEED_LIMIT: &str = "NextMapSpeedLimit";
    pub const NEXT_ADVISORY_LIMIT: &str = "NextMapAdvisoryLimit";

    /// Keys cleared at startup so consumers never see a previous run's data
    pub const VOLATILE: &[&str] = &[
        LOG_LEVEL,
        PRETTY_LOG,
        TARGET_LAT_ACCEL,
        DOWNLOAD_BOUNDS,
        DOWNLOAD_LOCATIONS,
        CURVATURES,
        TARGET_VELOCITIES,
        ROAD_NAME,
        SPEED_LIMIT,
        ADVISORY_LIMIT,
        HAZARD,
        NEXT_HAZARD,
        NEXT_SPEED_LIMIT,
        NEXT_ADVISORY_LIMIT,
    ];
}

/// Atomic single-key parameter operations
pub trait ParamStore {
    /// Read a key's raw value; `StoreError::Missing` when it is not set
    fn get(&self, key: &str) -> StoreResult<Vec<u8>>;

    /// Write a key's value, replacing any previous value atomically
    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Directory-backed store: one file per key, writes go through a temp file
/// and rename so readers never observe partial values
pub struct FileParamStore {
    root: PathBuf,
}

impl FileParamStore {
    pub fn new(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| StoreError::Io {
            path: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

impl ParamStore for FileParamStore {
    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(value) => Ok(value),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                Err(StoreError::Missing(key.to_string()))
            }
            Err(source) => Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        let path = self.path_for(key);
        let tmp = self.root.join(format!(".{key}.tmp"));
        fs::write(&tmp, value)
            .and_then(|()| fs::rename(&tmp, &path))
            .map_err(|source| StoreError::Io {
                path: path.display().to_string(),
                source,
            })
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}

/// In-memory store for tests and development
#[derive(Default)]
pub struct MemoryParamStore {
    values: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with a JSON-encoded value
    pub fn put_json<T: serde::Serialize>(&self, key: &str, value: &T) {
        let bytes = serde_json::to_vec(value).expect("value must serialize");
        self.put(key, &bytes).expect("memory store put cannot fail");
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.lock().unwrap().contains_key(key)
    }
}

impl ParamStore for MemoryParamStore {
    fn get(&self, key: &str) -> StoreResult<Vec<u8>> {
        self.values
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }

    fn put(&self, key: &str, value: &[u8]) -> StoreResult<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryParamStore::new();
        assert!(matches!(store.get("A"), Err(StoreError::Missing(_))));

        store.put("A", b"42").unwrap();
        assert_eq!(store.get("A").unwrap(), b"42");

        store.remove("A").unwrap();
        assert!(store.get("A").is_err());
        // Removing again is fine
        store.remove("A").unwrap();
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("mapspeed-params-{}", std::process::id()));
        let store = FileParamStore::new(&dir).unwrap();

        store.put("RoadName", b"M-17").unwrap();
        assert_eq!(store.get("RoadName").unwrap(), b"M-17");

        store.put("RoadName", b"I-94").unwrap();
        assert_eq!(store.get("RoadName").unwrap(), b"I-94");

        store.remove("RoadName").unwrap();
        assert!(matches!(
            store.get("RoadName"),
            Err(StoreError::Missing(_))
        ));

        let _ = fs::remove_dir_all(&dir);
    }
}
