//! Runtime tunables and parameter-store overrides

use tracing::{debug, info};

use crate::algorithms::MatcherParams;
use crate::core::DEFAULT_TARGET_LAT_ACCEL;
use crate::store::{keys, ParamStore};

/// Process-wide tunables. Defaults are conservative values for highway and
/// surface-street driving; the target lateral acceleration can be overridden
/// from the parameter store at startup and at runtime.
#[derive(Debug, Clone, Copy)]
pub struct Tunables {
    /// Lateral acceleration bound for curve speed targets (m/s^2)
    pub target_lat_accel: f64,
    /// Half side length of the region loaded around the vehicle (degrees)
    pub reload_margin_deg: f64,
    pub matcher: MatcherParams,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            target_lat_accel: DEFAULT_TARGET_LAT_ACCEL,
            reload_margin_deg: 0.2,
            matcher: MatcherParams::default(),
        }
    }
}

impl Tunables {
    /// Apply the persistent override keys once at startup. Persistent keys
    /// are read, not cleared.
    pub fn apply_startup_overrides<P: ParamStore>(&mut self, params: &P) {
        if let Some(accel) = read_accel(params, keys::TARGET_LAT_ACCEL_PERSIST) {
            self.target_lat_accel = accel;
            info!(target_lat_accel = accel, "loaded persistent target lateral accel");
        }
    }

    /// Consume the one-shot runtime override keys, clearing each after use
    pub fn consume_runtime_overrides<P: ParamStore>(&mut self, params: &P) {
        if let Some(accel) = read_accel(params, keys::TARGET_LAT_ACCEL) {
            self.target_lat_accel = accel;
            if let Err(err) = params.remove(keys::TARGET_LAT_ACCEL) {
                debug!(error = %err, "could not clear target lateral accel override");
            }
            info!(target_lat_accel = accel, "loaded target lateral accel override");
        }
    }
}

fn read_accel<P: ParamStore>(params: &P, key: &str) -> Option<f64> {
    let bytes = params.get(key).ok()?;
    match serde_json::from_slice::<f64>(&bytes) {
        Ok(accel) if accel.is_finite() && accel > 0.0 => Some(accel),
        Ok(accel) => {
            debug!(key, accel, "ignoring out-of-range lateral accel override");
            None
        }
        Err(err) => {
            debug!(key, error = %err, "ignoring malformed lateral accel override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryParamStore;

    #[test]
    fn test_runtime_override_is_consumed_once() {
        let params = MemoryParamStore::new();
        params.put_json(keys::TARGET_LAT_ACCEL, &2.4);

        let mut tunables = Tunables::default();
        tunables.consume_runtime_overrides(&params);
        assert_eq!(tunables.target_lat_accel, 2.4);
        assert!(!params.contains(keys::TARGET_LAT_ACCEL));

        // A second pass with the key cleared changes nothing
        tunables.consume_runtime_overrides(&params);
        assert_eq!(tunables.target_lat_accel, 2.4);
    }

    #[test]
    fn test_persistent_override_is_not_cleared() {
        let params = MemoryParamStore::new();
        params.put_json(keys::TARGET_LAT_ACCEL_PERSIST, &1.4);

        let mut tunables = Tunables::default();
        tunables.apply_startup_overrides(&params);
        assert_eq!(tunables.target_lat_accel, 1.4);
        assert!(params.contains(keys::TARGET_LAT_ACCEL_PERSIST));
    }

    #[test]
    fn test_malformed_override_is_ignored() {
        let params = MemoryParamStore::new();
        params.put(keys::TARGET_LAT_ACCEL, b"not json").unwrap();

        let mut tunables = Tunables::default();
        tunables.consume_runtime_overrides(&params);
        assert_eq!(tunables.target_lat_accel, DEFAULT_TARGET_LAT_ACCEL);

        params.put_json(keys::TARGET_LAT_ACCEL, &-3.0);
        tunables.consume_runtime_overrides(&params);
        assert_eq!(tunables.target_lat_accel, DEFAULT_TARGET_LAT_ACCEL);
    }
}
