//! Coordinate space.
//!
//! Positions live in a 3-D Euclidean space: two planar axes plus a
//! "height" axis that stands for access-link latency. Height is treated
//! as an ordinary third component, so distance is the plain Euclidean
//! norm of the difference.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point (or displacement) in coordinate space, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub h: f64,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0.0, y: 0.0, h: 0.0 };

    pub fn new(x: f64, y: f64, h: f64) -> Self {
        Self { x, y, h }
    }

    /// Euclidean length, always >= 0
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.h * self.h).sqrt()
    }

    /// Unit vector in the same direction. The zero vector maps to itself.
    pub fn unit(&self) -> Position {
        let len = self.magnitude();
        if len == 0.0 || !len.is_finite() {
            return Position::ORIGIN;
        }
        self.scale(1.0 / len)
    }

    pub fn scale(&self, k: f64) -> Position {
        Position::new(self.x * k, self.y * k, self.h * k)
    }

    /// Latency the model predicts between two positions
    pub fn estimated_rtt(&self, other: &Position) -> f64 {
        (*self - *other).magnitude()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.h.is_finite()
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.h + rhs.h)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.h - rhs.h)
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, k: f64) -> Position {
        self.scale(k)
    }
}
