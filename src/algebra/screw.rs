//! Twists and wrenches: paired vector quantities of rigid-body mechanics.
use super::{Rotation, Vector};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// A paired linear/angular velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub vel: Vector,
    pub rot: Vector,
}

/// A paired force/torque.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wrench {
    pub force: Vector,
    pub torque: Vector,
}

impl Twist {
    pub fn new(vel: Vector, rot: Vector) -> Self {
        Self { vel, rot }
    }

    pub fn zero() -> Self {
        Self::new(Vector::zeros(), Vector::zeros())
    }
}

impl Wrench {
    pub fn new(force: Vector, torque: Vector) -> Self {
        Self { force, torque }
    }

    pub fn zero() -> Self {
        Self::new(Vector::zeros(), Vector::zeros())
    }

    /// Changes the reference point of the wrench.
    ///
    /// `p` points from the old reference point to the new one; the torque picks
    /// up the moment of the force about the shifted point: `τ + f × p`.
    pub fn ref_point(&self, p: &Vector) -> Self {
        Self::new(self.force, self.torque + self.force.cross(p))
    }
}

// Both screw types share the same componentwise linear structure.
macro_rules! impl_screw_ops {
    ($ty:ident, $a:ident, $b:ident) => {
        impl Add for $ty {
            type Output = $ty;
            fn add(self, rhs: $ty) -> $ty {
                $ty::new(self.$a + rhs.$a, self.$b + rhs.$b)
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            fn sub(self, rhs: $ty) -> $ty {
                $ty::new(self.$a - rhs.$a, self.$b - rhs.$b)
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty::new(-self.$a, -self.$b)
            }
        }

        impl Mul<f64> for $ty {
            type Output = $ty;
            fn mul(self, rhs: f64) -> $ty {
                $ty::new(self.$a * rhs, self.$b * rhs)
            }
        }

        impl Mul<$ty> for Rotation {
            type Output = $ty;
            fn mul(self, rhs: $ty) -> $ty {
                $ty::new(self * rhs.$a, self * rhs.$b)
            }
        }

        impl Mul<&$ty> for &Rotation {
            type Output = $ty;
            fn mul(self, rhs: &$ty) -> $ty {
                $ty::new(self * rhs.$a, self * rhs.$b)
            }
        }
    };
}

impl_screw_ops!(Twist, vel, rot);
impl_screw_ops!(Wrench, force, torque);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ref_point_adds_lever_arm_moment() {
        let w = Wrench::new(Vector::new(0.0, 0.0, 1.0), Vector::zeros());
        let shifted = w.ref_point(&Vector::new(0.0, 1.0, 0.0));

        assert_eq!(shifted.force, w.force);
        assert_relative_eq!(shifted.torque, Vector::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn test_rotation_acts_on_both_components() {
        let r = Rotation::from_axis_angle(&Vector::z_axis(), std::f64::consts::FRAC_PI_2);
        let w = Wrench::new(Vector::x(), Vector::y());
        let rotated = r * w;

        assert_relative_eq!(rotated.force, Vector::y(), epsilon = 1e-12);
        assert_relative_eq!(rotated.torque, -Vector::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_linear_structure() {
        let a = Twist::new(Vector::new(1.0, 2.0, 3.0), Vector::new(4.0, 5.0, 6.0));
        let b = Twist::new(Vector::new(0.5, 0.5, 0.5), Vector::new(1.0, 1.0, 1.0));

        assert_eq!((a + b) - b, a);
        assert_eq!(-a + a, Twist::zero());
        assert_eq!(a * 2.0, a + a);
    }
}
