//! Logging setup and runtime level control
//!
//! The subscriber is installed once at startup with a level filter behind a
//! reload handle. The output format (human readable vs JSON lines) is fixed
//! at startup; the level can be changed at runtime through the one-shot
//! parameter-store key.

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, Registry};

pub type LevelHandle = reload::Handle<LevelFilter, Registry>;

/// Install the global subscriber and return the level reload handle
pub fn init(level: LevelFilter, pretty: bool) -> LevelHandle {
    let (filter, handle) = reload::Layer::new(level);
    let registry = tracing_subscriber::registry().with(filter);
    if pretty {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    } else {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    }
    handle
}

/// Parse a parameter-store level value ("trace" through "error", or "off")
pub fn parse_level(bytes: &[u8]) -> Option<LevelFilter> {
    std::str::from_utf8(bytes)
        .ok()?
        .trim()
        .parse::<LevelFilter>()
        .ok()
}

/// Parse a parameter-store format flag: leading `1` selects the human
/// readable format, `0` JSON lines
pub fn parse_pretty(bytes: &[u8]) -> Option<bool> {
    match bytes.first() {
        Some(b'1') => Some(true),
        Some(b'0') => Some(false),
        _ => None,
    }
}
