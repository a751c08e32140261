//! Matching, projection and curvature math

pub mod curvature;
pub mod geodesy;
pub mod matcher;
pub mod projector;

pub use curvature::{target_velocities, window_curvatures, CurvaturePoint, VelocityPoint};
pub use matcher::{match_current, MatcherParams};
pub use projector::next_way;
