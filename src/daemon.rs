//! Tick orchestration and fault isolation
//!
//! One tick is a bounded synchronous unit of work: read the fix, ensure the
//! region, match, project twice, compute the curvature profile, publish.
//! Cross-tick state exists only to give the matcher and projector
//! continuity; any panic inside a tick is caught at the boundary and resets
//! that state wholesale, trading one tick of re-acquisition latency for the
//! guarantee that a corrupted tick never poisons the next one.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::algorithms::{match_current, next_way, target_velocities, window_curvatures};
use crate::config::Tunables;
use crate::core::{MatchedWay, Position};
use crate::graph::region::Region;
use crate::graph::region_store::{BoundsRequest, LocationsRequest, RegionStore};
use crate::logging::{parse_level, parse_pretty, LevelHandle};
use crate::output;
use crate::store::tiles::TileSource;
use crate::store::{keys, ParamStore};

/// Cross-tick state owned by the run loop. Reset to its zero value whenever
/// a tick faults.
pub struct TickState {
    pub region: Region,
    pub current: MatchedWay,
    pub next: MatchedWay,
    pub second_next: MatchedWay,
    pub last_position: Position,
}

impl Default for TickState {
    fn default() -> Self {
        Self {
            region: Region::empty(),
            current: MatchedWay::default(),
            next: MatchedWay::default(),
            second_next: MatchedWay::default(),
            last_position: Position::default(),
        }
    }
}

/// The daemon: parameter store, region store and tunables wired into a tick
/// loop
pub struct Daemon<P: ParamStore, T: TileSource> {
    params: P,
    regions: RegionStore<T>,
    tunables: Tunables,
    log_handle: Option<LevelHandle>,
}

impl<P: ParamStore, T: TileSource> Daemon<P, T> {
    pub fn new(params: P, tiles: T, tunables: Tunables) -> Self {
        Self {
            params,
            regions: RegionStore::new(tiles, tunables.reload_margin_deg),
            tunables,
            log_handle: None,
        }
    }

    /// Attach the handle used by the runtime log-level override
    pub fn with_log_handle(mut self, handle: LevelHandle) -> Self {
        self.log_handle = Some(handle);
        self
    }

    /// Startup sequence: clear volatile keys, apply persistent overrides and
    /// preload the region around the last persisted position
    pub fn startup(&mut self, state: &mut TickState) {
        for key in keys::VOLATILE {
            if let Err(err) = self.params.remove(key) {
                warn!(key, error = %err, "could not clear volatile parameter");
            }
        }

        self.tunables.apply_startup_overrides(&self.params);

        if let Some(position) = self.read_position(true) {
            match self.regions.load_around(position.point()) {
                Ok(region) => state.region = region,
                Err(err) => debug!(error = %err, "could not preload region at startup"),
            }
        }
    }

    /// Run ticks forever with a fixed pacing delay
    pub fn run(&mut self, state: &mut TickState) -> ! {
        loop {
            thread::sleep(Duration::from_secs(1));
            self.tick(state);
        }
    }

    /// One guarded tick. A panic anywhere inside is logged and resets every
    /// piece of cross-tick state; the process keeps running.
    pub fn tick(&mut self, state: &mut TickState) {
        let result = catch_unwind(AssertUnwindSafe(|| self.run_tick(state)));
        if let Err(payload) = result {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(panic = %message, "tick panicked, resetting state");
            *state = TickState::default();
        }
    }

    fn run_tick(&mut self, state: &mut TickState) {
        self.consume_log_overrides();
        self.tunables.consume_runtime_overrides(&self.params);
        self.handle_download_triggers();

        // Without a fix no meaningful computation is possible: skip the tick
        // entirely, leaving every output at its last good value
        let Some(position) = self.read_position(false) else {
            debug!("no position fix, skipping tick");
            return;
        };

        match self.regions.ensure_region(&position, &state.region) {
            Ok(Some(region)) => state.region = region,
            Ok(None) => {}
            Err(err) => warn!(error = %err, "region unavailable, keeping previous region"),
        }

        let current = match_current(
            &state.current,
            &state.next,
            &state.second_next,
            &state.region,
            &position,
            &self.tunables.matcher,
        );
        state.current = current;

        let next = next_way(&state.current, &state.region);
        state.next = next;
        let second_next = next_way(&state.next, &state.region);
        state.second_next = second_next;

        let curvatures = window_curvatures(
            &state.current,
            &state.next,
            &state.second_next,
            &state.region,
            &position,
        );
        let velocities = target_velocities(&curvatures, self.tunables.target_lat_accel);

        output::publish(
            &self.params,
            &state.region,
            &state.current,
            &state.next,
            &state.second_next,
            &curvatures,
            &velocities,
        );

        state.last_position = position;
    }

    fn read_position(&self, persistent: bool) -> Option<Position> {
        let key = if persistent {
            keys::LAST_GPS_POSITION_PERSIST
        } else {
            keys::LAST_GPS_POSITION
        };
        let bytes = match self.params.get(key) {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(key, error = %err, "could not read position");
                return None;
            }
        };
        match serde_json::from_slice::<Position>(&bytes) {
            Ok(position) if position.has_fix() => Some(position),
            Ok(_) => {
                debug!(key, "position has no fix");
                None
            }
            Err(err) => {
                debug!(key, error = %err, "could not parse position");
                None
            }
        }
    }

    fn consume_log_overrides(&self) {
        if let Ok(bytes) = self.params.get(keys::LOG_LEVEL) {
            if let Some(level) = parse_level(&bytes) {
                match &self.log_handle {
                    Some(handle) => match handle.reload(level) {
                        Ok(()) => info!(level = %level, "log level changed"),
                        Err(err) => warn!(error = %err, "could not change log level"),
                    },
                    None => debug!("no log handle attached, ignoring level override"),
                }
            }
            let _ = self.params.remove(keys::LOG_LEVEL);
        }

        if let Ok(bytes) = self.params.get(keys::PRETTY_LOG) {
            if parse_pretty(&bytes).is_some() {
                info!("log format override applies at next start");
            }
            let _ = self.params.remove(keys::PRETTY_LOG);
        }
    }

    fn handle_download_triggers(&self) {
        if let Ok(bytes) = self.params.get(keys::DOWNLOAD_BOUNDS) {
            match serde_json::from_slice::<BoundsRequest>(&bytes) {
                Ok(request) => match self.regions.download_area(&request.bounds()) {
                    Ok(tiles) => info!(tiles, "downloaded requested area"),
                    Err(err) => warn!(error = %err, "could not download requested area"),
                },
                Err(err) => debug!(error = %err, "malformed area download request"),
            }
            let _ = self.params.remove(keys::DOWNLOAD_BOUNDS);
        }

        if let Ok(bytes) = self.params.get(keys::DOWNLOAD_LOCATIONS) {
            match serde_json::from_slice::<LocationsRequest>(&bytes) {
                Ok(request) => match self.regions.download_locations(&request) {
                    Ok(tiles) => info!(tiles, "downloaded requested locations"),
                    Err(err) => warn!(error = %err, "could not download requested locations"),
                },
                Err(err) => debug!(error = %err, "malformed locations download request"),
            }
            let _ = self.params.remove(keys::DOWNLOAD_LOCATIONS);
        }
    }
}
