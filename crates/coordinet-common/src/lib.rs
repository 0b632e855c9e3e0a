//! # Coordinet Common
//!
//! Shared types and algorithms used by the registry and the node agent.
//!
//! ## Modules
//! - `coords` - 3-D coordinate space (`Position`) and vector operations
//! - `vivaldi` - Error-weighted coordinate update engine
//! - `wire` - Plain-text line formats carried over HTTP
//! - `types` - Registry snapshots and probe replies
//! - `error` - Common error types
//! - `constants` - Ports, periods, and timeouts
//! - `telemetry` - Log subscriber setup (feature `telemetry`)

pub mod constants;
pub mod coords;
pub mod error;
#[cfg(feature = "telemetry")]
pub mod telemetry;
pub mod types;
pub mod vivaldi;
pub mod wire;

pub use coords::Position;
pub use error::CoordinetError;
pub use types::*;
pub use vivaldi::VivaldiEngine;
