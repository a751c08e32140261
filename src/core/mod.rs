//! Core types and constants for the road-matching engine

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
