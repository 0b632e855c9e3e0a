//! Vivaldi coordinate engine.
//!
//! Each sample moves the local position along the line joining it to the
//! peer, by an amount proportional to how wrong the current model is and
//! to how much the local node trusts itself relative to the peer:
//!
//! ```text
//! w      = e_self / (e_self + e_peer)
//! e_s    = |rtt - |x_self - x_peer|| / rtt
//! e_self = e_s * ce * w + e_self * (1 - ce * w)
//! x_self = x_self + unit(x_self - x_peer) * (cc * w) * (rtt - |x_self - x_peer|) * 100
//! ```
//!
//! Malformed samples (zero RTT, NaN or infinite terms) leave the state
//! untouched.

use serde::{Deserialize, Serialize};

use crate::coords::Position;

/// Position correction gain
pub const CC: f64 = 0.25;

/// Error blending gain
pub const CE: f64 = 0.5;

/// Error of a node that has not taken any sample yet
pub const INITIAL_ERROR: f64 = 10.0;

/// Converts the unitless correction into milliseconds
pub const SCALE_FACTOR: f64 = 100.0;

/// A node's coordinate and the confidence it has in it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateState {
    pub position: Position,
    /// Unitless; large means unreliable. Always finite and >= 0.
    pub error: f64,
}

impl CoordinateState {
    pub fn new(position: Position, error: f64) -> Self {
        Self { position, error }
    }
}

impl Default for CoordinateState {
    fn default() -> Self {
        Self::new(Position::ORIGIN, INITIAL_ERROR)
    }
}

/// Relative-confidence weight of a sample
pub fn weight(self_error: f64, peer_error: f64) -> f64 {
    self_error / (self_error + peer_error)
}

/// Owns one node's coordinate state. Single writer; callers that share it
/// across tasks wrap it in a lock.
#[derive(Debug, Clone, Default)]
pub struct VivaldiEngine {
    state: CoordinateState,
}

impl VivaldiEngine {
    /// Engine at the origin with `INITIAL_ERROR`
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: CoordinateState) -> Self {
        Self { state }
    }

    pub fn position(&self) -> Position {
        self.state.position
    }

    pub fn error(&self) -> f64 {
        self.state.error
    }

    pub fn state(&self) -> CoordinateState {
        self.state
    }

    /// Apply one RTT sample (milliseconds) against a peer's reported state.
    ///
    /// Returns the new position, or the unchanged one if the sample was
    /// rejected.
    pub fn update(
        &mut self,
        observed_rtt: f64,
        peer_position: Position,
        peer_error: f64,
    ) -> Position {
        if observed_rtt <= 0.0 || peer_error < 0.0 || !peer_position.is_finite() {
            return self.state.position;
        }

        let w = weight(self.state.error, peer_error);
        let delta = self.state.position - peer_position;
        let estimated = delta.magnitude();
        let signed_error = observed_rtt - estimated;
        let relative_error = signed_error.abs() / observed_rtt;

        if observed_rtt.is_nan() || w.is_nan() || relative_error.is_nan() {
            return self.state.position;
        }

        let error = relative_error * CE * w + self.state.error * (1.0 - CE * w);
        let correction = CC * w;
        let step = correction * signed_error * SCALE_FACTOR;
        let position = self.state.position + delta.unit() * step;

        // Inf can slip past the NaN guard (e.g. an infinite RTT)
        if !error.is_finite() || error < 0.0 || !position.is_finite() {
            return self.state.position;
        }

        self.state = CoordinateState::new(position, error);
        position
    }
}
