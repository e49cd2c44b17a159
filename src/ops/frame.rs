//! Frame and twist operators.
//!
//! A frame's derivative is a twist whose linear part is the rate of change of
//! the origin and whose angular part is the rotation rate, both in the base frame.
use super::linear::add;
use super::vector::{cross, rotate};
use crate::algebra::{Frame, Rotation, Twist, Vector};
use crate::expression::{
    Binary, BinaryArgs, BinaryOp, Differentiator, Expr, Unary, UnaryArgs, UnaryOp,
};

#[derive(Debug, Clone, Copy)]
pub struct FrameOf;

impl BinaryOp for FrameOf {
    type Lhs = Rotation;
    type Rhs = Vector;
    type Output = Frame;
    const NAME: &'static str = "frame";

    fn value(&self, lhs: Rotation, rhs: Vector) -> Frame {
        Frame::new(lhs, rhs)
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Rotation, Vector>) -> Twist {
        Twist::new(args.drhs(), args.dlhs())
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Rotation>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Twist> {
        let w = d.of(lhs);
        let v = d.of(rhs);
        twist(v, w)
    }
}

pub fn frame(rotation: Expr<Rotation>, origin: Expr<Vector>) -> Expr<Frame> {
    Binary::expr(FrameOf, rotation, origin)
}

#[derive(Debug, Clone, Copy)]
pub struct Origin;

impl UnaryOp for Origin {
    type Arg = Frame;
    type Output = Vector;
    const NAME: &'static str = "origin";

    fn value(&self, arg: Frame) -> Vector {
        arg.origin
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Frame>) -> Vector {
        args.derivative().vel
    }

    fn derivative_expression(&self, arg: &Expr<Frame>, d: &mut Differentiator) -> Expr<Vector> {
        transvel(d.of(arg))
    }
}

pub fn origin(f: Expr<Frame>) -> Expr<Vector> {
    Unary::expr(Origin, f)
}

#[derive(Debug, Clone, Copy)]
pub struct RotationOf;

impl UnaryOp for RotationOf {
    type Arg = Frame;
    type Output = Rotation;
    const NAME: &'static str = "rotation";

    fn value(&self, arg: Frame) -> Rotation {
        arg.rotation
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Frame>) -> Vector {
        args.derivative().rot
    }

    fn derivative_expression(&self, arg: &Expr<Frame>, d: &mut Differentiator) -> Expr<Vector> {
        rotvel(d.of(arg))
    }
}

pub fn rotation(f: Expr<Frame>) -> Expr<Rotation> {
    Unary::expr(RotationOf, f)
}

/// A frame acting on a point: `R p + o`.
#[derive(Debug, Clone, Copy)]
pub struct TransformPoint;

impl BinaryOp for TransformPoint {
    type Lhs = Frame;
    type Rhs = Vector;
    type Output = Vector;
    const NAME: &'static str = "transform";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Frame, rhs: Vector) -> Vector {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Frame, Vector>) -> Vector {
        let f = args.lhs();
        let df = args.dlhs();
        let rp = f.rotation * args.rhs();
        f.rotation * args.drhs() + df.rot.cross(&rp) + df.vel
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Frame>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Vector> {
        let f = d.shared(lhs);
        let r = d.shared(&rotation(f));
        let df = d.shared_of(lhs);
        let p = d.shared(rhs);
        let dp = d.of(rhs);
        add(
            add(rotate(r.clone(), dp), cross(rotvel(df.clone()), rotate(r, p))),
            transvel(df),
        )
    }
}

pub fn transform_point(f: Expr<Frame>, p: Expr<Vector>) -> Expr<Vector> {
    Binary::expr(TransformPoint, f, p)
}

/// `F1 * F2`.
#[derive(Debug, Clone, Copy)]
pub struct Composition;

impl BinaryOp for Composition {
    type Lhs = Frame;
    type Rhs = Frame;
    type Output = Frame;
    const NAME: &'static str = "composition";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: Frame, rhs: Frame) -> Frame {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Frame, Frame>) -> Twist {
        let a = args.lhs();
        let da = args.dlhs();
        let b = args.rhs();
        let db = args.drhs();
        Twist::new(
            da.vel + a.rotation * db.vel + da.rot.cross(&(a.rotation * b.origin)),
            da.rot + a.rotation * db.rot,
        )
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Frame>,
        rhs: &Expr<Frame>,
        d: &mut Differentiator,
    ) -> Expr<Twist> {
        let a = d.shared(lhs);
        let b = d.shared(rhs);
        let da = d.shared_of(lhs);
        let db = d.shared_of(rhs);
        let r = d.shared(&rotation(a));
        let vel = add(
            add(transvel(da.clone()), rotate(r.clone(), transvel(db.clone()))),
            cross(rotvel(da.clone()), rotate(r.clone(), origin(b))),
        );
        let rot = add(rotvel(da), rotate(r, rotvel(db)));
        twist(vel, rot)
    }
}

pub fn compose(lhs: Expr<Frame>, rhs: Expr<Frame>) -> Expr<Frame> {
    Binary::expr(Composition, lhs, rhs)
}

#[derive(Debug, Clone, Copy)]
pub struct TwistOf;

impl BinaryOp for TwistOf {
    type Lhs = Vector;
    type Rhs = Vector;
    type Output = Twist;
    const NAME: &'static str = "twist";

    fn value(&self, lhs: Vector, rhs: Vector) -> Twist {
        Twist::new(lhs, rhs)
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, Vector, Vector>) -> Twist {
        Twist::new(args.dlhs(), args.drhs())
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<Vector>,
        rhs: &Expr<Vector>,
        d: &mut Differentiator,
    ) -> Expr<Twist> {
        let dv = d.of(lhs);
        let dw = d.of(rhs);
        twist(dv, dw)
    }
}

pub fn twist(vel: Expr<Vector>, rot: Expr<Vector>) -> Expr<Twist> {
    Binary::expr(TwistOf, vel, rot)
}

#[derive(Debug, Clone, Copy)]
pub struct TransVel;

impl UnaryOp for TransVel {
    type Arg = Twist;
    type Output = Vector;
    const NAME: &'static str = "transvel";

    fn value(&self, arg: Twist) -> Vector {
        arg.vel
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Twist>) -> Vector {
        args.derivative().vel
    }

    fn derivative_expression(&self, arg: &Expr<Twist>, d: &mut Differentiator) -> Expr<Vector> {
        transvel(d.of(arg))
    }
}

pub fn transvel(t: Expr<Twist>) -> Expr<Vector> {
    Unary::expr(TransVel, t)
}

#[derive(Debug, Clone, Copy)]
pub struct RotVel;

impl UnaryOp for RotVel {
    type Arg = Twist;
    type Output = Vector;
    const NAME: &'static str = "rotvel";

    fn value(&self, arg: Twist) -> Vector {
        arg.rot
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, Twist>) -> Vector {
        args.derivative().rot
    }

    fn derivative_expression(&self, arg: &Expr<Twist>, d: &mut Differentiator) -> Expr<Vector> {
        rotvel(d.of(arg))
    }
}

pub fn rotvel(t: Expr<Twist>) -> Expr<Vector> {
    Unary::expr(RotVel, t)
}
