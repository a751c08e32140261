use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use mapspeed::store::{keys, FileParamStore, FileTileSource, ParamStore};
use mapspeed::{config, daemon, logging};

/// Parameter-store directory shared with the rest of the vehicle stack
const DEFAULT_PARAMS_DIR: &str = "/dev/shm/mapspeed-params";
/// Local tile storage kept current by the downloader
const DEFAULT_TILES_DIR: &str = "/data/media/0/mapspeed/tiles";

fn main() {
    let params_dir =
        std::env::var("MAPSPEED_PARAMS_DIR").unwrap_or_else(|_| DEFAULT_PARAMS_DIR.to_string());
    let tiles_dir =
        std::env::var("MAPSPEED_TILES_DIR").unwrap_or_else(|_| DEFAULT_TILES_DIR.to_string());

    let params = match FileParamStore::new(&params_dir) {
        Ok(params) => params,
        Err(err) => {
            eprintln!("could not open parameter store at {params_dir}: {err}");
            std::process::exit(1);
        }
    };

    // Logging configuration comes from the persistent keys so a reboot keeps
    // the operator's choice
    let level = params
        .get(keys::LOG_LEVEL_PERSIST)
        .ok()
        .and_then(|bytes| logging::parse_level(&bytes))
        .unwrap_or(LevelFilter::INFO);
    let pretty = params
        .get(keys::PRETTY_LOG_PERSIST)
        .ok()
        .and_then(|bytes| logging::parse_pretty(&bytes))
        .unwrap_or(false);
    let log_handle = logging::init(level, pretty);
    debug!(%level, pretty, "logging initialized");

    let tiles = FileTileSource::new(&tiles_dir);
    let mut daemon =
        daemon::Daemon::new(params, tiles, config::Tunables::default()).with_log_handle(log_handle);

    let mut state = daemon::TickState::default();
    daemon.startup(&mut state);
    daemon.run(&mut state);
}
