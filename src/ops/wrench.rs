//! Wrench operators.
//!
//! A wrench is its own derivative type: the derivative of `(f, τ)` along a
//! variable is the pair of force and torque rates.
use super::linear;
use super::vector::{cross, rotate};
use crate::algebra::{Rotation, Vector, Wrench};
use crate::expression::{
    Binary, BinaryArgs, BinaryOp, Differentiator, Expr, Unary, UnaryArgs, UnaryOp,
};

/// Builds a wrench from a force and a torque.
#[derive(Debug, Clone, Copy)]
pub struct WrenchOf;

impl BinaryOp for WrenchOf {
    type Lhs = Vector;
    type Rhs = Vector;
    type Output = Wrench;
    const NAME: &'static str = "wrench";

    fn value(&self, lhs: Vector, rhs: Vector) -> Wrench {
        Wrench::new(lhs, rhs)
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Vector, Vector>) -> Wrench {
        Wrench::new(args.dlhs(), args.drhs())
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Vector>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Wrench> {
        let df = d.of(lhs);
        let dt = d.of(rhs);
        wrench(df, dt)
    }
}

pub fn wrench(force: Expr<Vector>, torque: Expr<Vector>) -> Expr<Wrench> {
    Binary::expr(WrenchOf, force, torque)
}

#[derive(Debug, Clone, Copy)]
pub struct Force;

impl UnaryOp for Force {
    type Arg = Wrench;
    type Output = Vector;
    const NAME: &'static str = "force";

    fn value(&self, arg: Wrench) -> Vector {
        arg.force
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Wrench>) -> Vector {
        args.derivative().force
    }

    fn derivative_expression(&self, arg: &Expr<Wrench>, d: &mut Differentiator) -> Expr<Vector> {
        force(d.of(arg))
    }
}

pub fn force(w: Expr<Wrench>) -> Expr<Vector> {
    Unary::expr(Force, w)
}

#[derive(Debug, Clone, Copy)]
pub struct Torque;

impl UnaryOp for Torque {
    type Arg = Wrench;
    type Output = Vector;
    const NAME: &'static str = "torque";

    fn value(&self, arg: Wrench) -> Vector {
        arg.torque
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Wrench>) -> Vector {
        args.derivative().torque
    }

    fn derivative_expression(&self, arg: &Expr<Wrench>, d: &mut Differentiator) -> Expr<Vector> {
        torque(d.of(arg))
    }
}

pub fn torque(w: Expr<Wrench>) -> Expr<Vector> {
    Unary::expr(Torque, w)
}

/// A rotation acting on a wrench: both components are rotated.
#[derive(Debug, Clone, Copy)]
pub struct Transform;

impl BinaryOp for Transform {
    type Lhs = Rotation;
    type Rhs = Wrench;
    type Output = Wrench;
    const NAME: &'static str = "transform";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Rotation, rhs: Wrench) -> Wrench {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Rotation, Wrench>) -> Wrench {
        let da = args.dlhs();
        let db = args.drhs();
        let r = args.lhs();
        let w = args.rhs();
        Wrench::new(
            r * db.force + da.cross(&(r * w.force)),
            r * db.torque + da.cross(&(r * w.torque)),
        )
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Rotation>,
        rhs: &Expr<Wrench>,
        d: &mut Differentiator,
    ) -> Expr<Wrench> {
        let a = d.shared(lhs);
        let da = d.shared_of(lhs);
        let b = d.shared(rhs);
        let db = d.shared_of(rhs);
        let f = linear::add(
            rotate(a.clone(), force(db.clone())),
            cross(da.clone(), rotate(a.clone(), force(b.clone()))),
        );
        let t = linear::add(rotate(a.clone(), torque(db)), cross(da, rotate(a, torque(b))));
        wrench(f, t)
    }
}

/// `R * W`.
pub fn transform(r: Expr<Rotation>, w: Expr<Wrench>) -> Expr<Wrench> {
    Binary::expr(Transform, r, w)
}

/// A wrench times a scalar.
#[derive(Debug, Clone, Copy)]
pub struct Multiplication;

impl BinaryOp for Multiplication {
    type Lhs = Wrench;
    type Rhs = f64;
    type Output = Wrench;
    const NAME: &'static str = "multiplication";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Wrench, rhs: f64) -> Wrench {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Wrench, f64>) -> Wrench {
        args.lhs() * args.drhs() + args.dlhs() * args.rhs()
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Wrench>,
        rhs: &Expr<f64>,
        d: &mut Differentiator,
    ) -> Expr<Wrench> {
        let a = d.shared(lhs);
        let s = d.shared(rhs);
        let da = d.of(lhs);
        let ds = d.of(rhs);
        linear::add(scale(a, ds), scale(da, s))
    }
}

/// `W * s`.
pub fn scale(w: Expr<Wrench>, s: Expr<f64>) -> Expr<Wrench> {
    Binary::expr(Multiplication, w, s)
}

/// `s * W`; builds the same node as [`scale`].
pub fn scale_by(s: Expr<f64>, w: Expr<Wrench>) -> Expr<Wrench> {
    scale(w, s)
}

/// Moves the reference point of a wrench: `(f, τ + f × p)`.
#[derive(Debug, Clone, Copy)]
pub struct RefPoint;

impl BinaryOp for RefPoint {
    type Lhs = Wrench;
    type Rhs = Vector;
    type Output = Wrench;
    const NAME: &'static str = "ref_point";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Wrench, rhs: Vector) -> Wrench {
        lhs.ref_point(&rhs)
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Wrench, Vector>) -> Wrench {
        let da = args.dlhs();
        let w = args.lhs();
        let p = args.rhs();
        let dp = args.drhs();
        Wrench::new(da.force, da.torque + da.force.cross(&p) + w.force.cross(&dp))
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Wrench>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Wrench> {
        let a = d.shared(lhs);
        let da = d.shared_of(lhs);
        let b = d.shared(rhs);
        let db = d.shared_of(rhs);
        wrench(
            force(da.clone()),
            linear::add(linear::add(torque(da.clone()), cross(force(da), b)), cross(force(a), db)),
        )
    }
}

pub fn ref_point(w: Expr<Wrench>, p: Expr<Vector>) -> Expr<Wrench> {
    Binary::expr(RefPoint, w, p)
}

pub fn add(lhs: Expr<Wrench>, rhs: Expr<Wrench>) -> Expr<Wrench> {
    linear::add(lhs, rhs)
}

pub fn negate(w: Expr<Wrench>) -> Expr<Wrench> {
    linear::negate(w)
}

pub fn subtract(lhs: Expr<Wrench>, rhs: Expr<Wrench>) -> Expr<Wrench> {
    linear::subtract(lhs, rhs)
}

/// Resultant of several wrenches expressed about the same point.
pub fn wrench_sum(terms: Vec<Expr<Wrench>>) -> Expr<Wrench> {
    linear::sum(terms)
}
