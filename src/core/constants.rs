//! Physical constants and system parameters

/// Side length of a map storage tile in degrees
pub const TILE_SIZE_DEG: f64 = 2.0;

/// Meters per degree of latitude (roughly constant)
pub const METERS_PER_DEG_LAT: f64 = 111_132.0;

/// Meters per degree of longitude at the equator, scaled by cos(latitude)
pub const METERS_PER_DEG_LON_EQUATOR: f64 = 111_320.0;

/// Default lateral acceleration target for curve speeds (m/s^2)
pub const DEFAULT_TARGET_LAT_ACCEL: f64 = 1.9;

/// Velocity published for straight road, where curvature places no
/// constraint (m/s)
pub const UNCONSTRAINED_VELOCITY: f64 = 100.0;

/// Curvatures below this are treated as straight road (1/m)
pub const MIN_CURVATURE: f64 = 1e-6;
