//! Homogeneous frames (rotation + origin).
use super::{Rotation, Vector};
use serde::{Deserialize, Serialize};
use std::ops::Mul;

/// A rigid transformation: a rotation followed by a translation to `origin`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub rotation: Rotation,
    pub origin: Vector,
}

impl Frame {
    pub fn new(rotation: Rotation, origin: Vector) -> Self {
        Self { rotation, origin }
    }

    pub fn identity() -> Self {
        Self::new(Rotation::identity(), Vector::zeros())
    }
}

impl Mul for Frame {
    type Output = Frame;
    fn mul(self, rhs: Frame) -> Frame {
        Frame::new(self.rotation * rhs.rotation, self.rotation * rhs.origin + self.origin)
    }
}

impl Mul<Vector> for Frame {
    type Output = Vector;
    fn mul(self, rhs: Vector) -> Vector {
        self.rotation * rhs + self.origin
    }
}
