//! Rotation operators.
//!
//! The derivative of a rotation along a variable is its angular velocity,
//! expressed in the base frame.
use super::linear::{add, negate};
use super::vector::{rotate, scale};
use crate::algebra::{Rotation, Vector};
use crate::expression::{
    constant, Binary, BinaryArgs, BinaryOp, Differentiator, Expr, Unary, UnaryArgs, UnaryOp,
};
use nalgebra::Unit;

/// Rotation by a scalar angle about a fixed axis.
#[derive(Debug, Clone, Copy)]
pub struct AxisAngle {
    axis: Unit<Vector>,
}

impl UnaryOp for AxisAngle {
    type Arg = f64;
    type Output = Rotation;
    const NAME: &'static str = "rot";

    fn value(&self, angle: f64) -> Rotation {
        Rotation::from_axis_angle(&self.axis, angle)
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, f64>) -> Vector {
        self.axis.into_inner() * args.derivative()
    }

    fn derivative_expression(&self, arg: &Expr<f64>, d: &mut Differentiator) -> Expr<Vector> {
        scale(constant(self.axis.into_inner()), d.of(arg))
    }
}

/// Rotation of `angle` about `axis`.
///
/// # Panics
/// If `axis` has zero length.
pub fn rot(axis: Vector, angle: Expr<f64>) -> Expr<Rotation> {
    let axis = match Unit::try_new(axis, 0.0) {
        Some(axis) => axis,
        None => panic!("rotation axis must have non-zero length"),
    };
    Unary::expr(AxisAngle { axis }, angle)
}

pub fn rot_x(angle: Expr<f64>) -> Expr<Rotation> {
    rot(Vector::x(), angle)
}

pub fn rot_y(angle: Expr<f64>) -> Expr<Rotation> {
    rot(Vector::y(), angle)
}

pub fn rot_z(angle: Expr<f64>) -> Expr<Rotation> {
    rot(Vector::z(), angle)
}

/// `R1 * R2`.
#[derive(Debug, Clone, Copy)]
pub struct Composition;

impl BinaryOp for Composition {
    type Lhs = Rotation;
    type Rhs = Rotation;
    type Output = Rotation;
    const NAME: &'static str = "composition";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Rotation, rhs: Rotation) -> Rotation {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Rotation, Rotation>) -> Vector {
        args.dlhs() + args.lhs() * args.drhs()
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Rotation>,
        rhs: &Expr<Rotation>,
        d: &mut Differentiator,
    ) -> Expr<Vector> {
        let a = d.shared(lhs);
        let da = d.of(lhs);
        let db = d.of(rhs);
        add(da, rotate(a, db))
    }
}

pub fn compose(lhs: Expr<Rotation>, rhs: Expr<Rotation>) -> Expr<Rotation> {
    Binary::expr(Composition, lhs, rhs)
}

#[derive(Debug, Clone, Copy)]
pub struct Inverse;

impl UnaryOp for Inverse {
    type Arg = Rotation;
    type Output = Rotation;
    const NAME: &'static str = "inverse";
    const RETAIN_OPERAND: bool = true;

    fn value(&self, arg: Rotation) -> Rotation {
        arg.inverse()
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Rotation>) -> Vector {
        -(args.value().inverse() * args.derivative())
    }

    fn derivative_expression(&self, arg: &Expr<Rotation>, d: &mut Differentiator) -> Expr<Vector> {
        let a = d.shared(arg);
        let da = d.of(arg);
        negate(rotate(inverse(a), da))
    }
}

pub fn inverse(arg: Expr<Rotation>) -> Expr<Rotation> {
    Unary::expr(Inverse, arg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ledger::EvalContext;
    use crate::expression::{input, input_rotation, Expression, ExpressionBase};
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_angle_derivative_is_scaled_axis() {
        let mut ctx = EvalContext::new();
        let q = input(0);
        let angle = crate::ops::scalar::multiply(q.clone(), constant(3.0));
        let r = rot(Vector::new(0.0, 0.0, 2.0), angle);
        r.set_input_value(0, 0.1);

        assert_relative_eq!(r.value(&mut ctx).angle(), 0.3, epsilon = 1e-12);
        assert_eq!(r.derivative(&mut ctx, 0), Vector::new(0.0, 0.0, 3.0));
        assert_eq!(r.derivative_expression(0).value(&mut ctx), Vector::new(0.0, 0.0, 3.0));
    }

    #[test]
    #[should_panic(expected = "non-zero length")]
    fn test_zero_axis_is_rejected() {
        rot(Vector::zeros(), constant(1.0));
    }

    #[test]
    fn test_composition_transports_inner_rate() {
        let mut ctx = EvalContext::new();
        let outer = rot_z(constant(std::f64::consts::FRAC_PI_2));
        let inner = input_rotation(0, Vector::x());
        let r = compose(outer, inner);

        // The inner x-axis rate seen from the base frame is the y-axis.
        assert_relative_eq!(r.derivative(&mut ctx, 0), Vector::y(), epsilon = 1e-12);
        let graph = r.derivative_expression(0);
        assert_relative_eq!(graph.value(&mut ctx), Vector::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse_negates_rate() {
        let mut ctx = EvalContext::new();
        let q = input(0);
        let r = inverse(rot_y(q.clone()));
        r.set_input_value(0, 0.4);
        assert_relative_eq!(r.value(&mut ctx).angle(), 0.4, epsilon = 1e-12);
        // R(-q) about y has rate -y.
        assert_relative_eq!(r.derivative(&mut ctx, 0), -Vector::y(), epsilon = 1e-12);
        let graph = r.derivative_expression(0);
        assert_relative_eq!(graph.value(&mut ctx), -Vector::y(), epsilon = 1e-12);
    }
}
