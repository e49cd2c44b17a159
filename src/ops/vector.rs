//! Vector operators.
use super::linear::add;
use crate::algebra::{Rotation, Vector};
use crate::expression::{
    Binary, BinaryArgs, BinaryOp, Differentiator, Expr, Nary, NaryArgs, NaryOp, Unary, UnaryArgs,
    UnaryOp,
};

/// Builds a vector from three scalar coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Compose;

impl NaryOp for Compose {
    type Arg = f64;
    type Output = Vector;
    const NAME: &'static str = "vector";
    const ARITY: Option<usize> = Some(3);

    fn value(&self, args: &[f64]) -> Vector {
        Vector::new(args[0], args[1], args[2])
    }

    fn derivative(&self, args: &mut NaryArgs<'_, f64>) -> Vector {
        Vector::new(args.derivative(0), args.derivative(1), args.derivative(2))
    }

    fn derivative_expression(&self, args: &[Expr<f64>], d: &mut Differentiator) -> Expr<Vector> {
        vector(d.of(&args[0]), d.of(&args[1]), d.of(&args[2]))
    }
}

pub fn vector(x: Expr<f64>, y: Expr<f64>, z: Expr<f64>) -> Expr<Vector> {
    Nary::expr(Compose, vec![x, y, z])
}

/// Coordinate `AXIS` of a vector.
#[derive(Debug, Clone, Copy)]
pub struct Coordinate<const AXIS: usize>;

impl<const AXIS: usize> UnaryOp for Coordinate<AXIS> {
    type Arg = Vector;
    type Output = f64;
    const NAME: &'static str = match AXIS {
        0 => "coord_x",
        1 => "coord_y",
        _ => "coord_z",
    };

    fn value(&self, arg: Vector) -> f64 {
        arg[AXIS]
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Vector>) -> f64 {
        args.derivative()[AXIS]
    }

    fn derivative_expression(&self, arg: &Expr<Vector>, d: &mut Differentiator) -> Expr<f64> {
        Unary::expr(Coordinate::<AXIS>, d.of(arg))
    }
}

pub fn coord_x(v: Expr<Vector>) -> Expr<f64> {
    Unary::expr(Coordinate::<0>, v)
}

pub fn coord_y(v: Expr<Vector>) -> Expr<f64> {
    Unary::expr(Coordinate::<1>, v)
}

pub fn coord_z(v: Expr<Vector>) -> Expr<f64> {
    Unary::expr(Coordinate::<2>, v)
}

#[derive(Debug, Clone, Copy)]
pub struct Cross;

impl BinaryOp for Cross {
    type Lhs = Vector;
    type Rhs = Vector;
    type Output = Vector;
    const NAME: &'static str = "cross";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Vector, rhs: Vector) -> Vector {
        lhs.cross(&rhs)
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Vector, Vector>) -> Vector {
        args.dlhs().cross(&args.rhs()) + args.lhs().cross(&args.drhs())
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Vector>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Vector> {
        let a = d.shared(lhs);
        let b = d.shared(rhs);
        let da = d.of(lhs);
        let db = d.of(rhs);
        add(cross(da, b), cross(a, db))
    }
}

pub fn cross(lhs: Expr<Vector>, rhs: Expr<Vector>) -> Expr<Vector> {
    Binary::expr(Cross, lhs, rhs)
}

#[derive(Debug, Clone, Copy)]
pub struct Dot;

impl BinaryOp for Dot {
    type Lhs = Vector;
    type Rhs = Vector;
    type Output = f64;
    const NAME: &'static str = "dot";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Vector, rhs: Vector) -> f64 {
        lhs.dot(&rhs)
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Vector, Vector>) -> f64 {
        args.dlhs().dot(&args.rhs()) + args.lhs().dot(&args.drhs())
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Vector>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<f64> {
        let a = d.shared(lhs);
        let b = d.shared(rhs);
        let da = d.of(lhs);
        let db = d.of(rhs);
        add(dot(da, b), dot(a, db))
    }
}

pub fn dot(lhs: Expr<Vector>, rhs: Expr<Vector>) -> Expr<f64> {
    Binary::expr(Dot, lhs, rhs)
}

/// A vector times a scalar.
#[derive(Debug, Clone, Copy)]
pub struct Scale;

impl BinaryOp for Scale {
    type Lhs = Vector;
    type Rhs = f64;
    type Output = Vector;
    const NAME: &'static str = "multiplication";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Vector, rhs: f64) -> Vector {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Vector, f64>) -> Vector {
        args.lhs() * args.drhs() + args.dlhs() * args.rhs()
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Vector>,
        rhs: &Expr<f64>,
        d: &mut Differentiator,
    ) -> Expr<Vector> {
        let a = d.shared(lhs);
        let s = d.shared(rhs);
        let da = d.of(lhs);
        let ds = d.of(rhs);
        add(scale(a, ds), scale(da, s))
    }
}

pub fn scale(v: Expr<Vector>, s: Expr<f64>) -> Expr<Vector> {
    Binary::expr(Scale, v, s)
}

/// A rotation acting on a vector.
#[derive(Debug, Clone, Copy)]
pub struct Rotate;

impl BinaryOp for Rotate {
    type Lhs = Rotation;
    type Rhs = Vector;
    type Output = Vector;
    const NAME: &'static str = "transform";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Rotation, rhs: Vector) -> Vector {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Rotation, Vector>) -> Vector {
        let r = args.lhs();
        let w = args.dlhs();
        r * args.drhs() + w.cross(&(r * args.rhs()))
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Rotation>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Vector> {
        let r = d.shared(lhs);
        let v = d.shared(rhs);
        let w = d.shared_of(lhs);
        let dv = d.of(rhs);
        add(rotate(r.clone(), dv), cross(w, rotate(r, v)))
    }
}

pub fn rotate(r: Expr<Rotation>, v: Expr<Vector>) -> Expr<Vector> {
    Binary::expr(Rotate, r, v)
}
