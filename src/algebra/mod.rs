//! The rigid-motion algebra the expression graph computes over.
//!
//! Vectors and rotations come straight from `nalgebra`. The composite
//! quantities of rigid-body mechanics (frames, twists and wrenches) are small
//! value types defined here on top of them.
pub mod frame;
pub mod screw;

pub use frame::Frame;
pub use screw::{Twist, Wrench};

/// A 3D vector (position, velocity, force, torque, angular velocity).
pub type Vector = nalgebra::Vector3<f64>;

/// A 3D rotation matrix.
pub type Rotation = nalgebra::Rotation3<f64>;
