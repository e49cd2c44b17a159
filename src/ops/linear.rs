//! Addition, subtraction, negation and summation, shared by every kind that
//! is its own derivative type (scalars, vectors, twists, wrenches).
use crate::expression::{
    Binary, BinaryArgs, BinaryOp, Differentiator, Expr, Kind, Nary, NaryArgs, NaryOp, Unary,
    UnaryArgs, UnaryOp,
};
use std::marker::PhantomData;
use std::ops::{Add, Neg, Sub};

/// A kind closed under the linear operations, whose derivative has the same type.
pub trait Linear:
    Kind<Deriv = Self> + Copy + Add<Output = Self> + Sub<Output = Self> + Neg<Output = Self>
{
}

impl<T> Linear for T where
    T: Kind<Deriv = T> + Copy + Add<Output = T> + Sub<Output = T> + Neg<Output = T>
{
}

#[derive(Debug, Clone, Copy)]
pub struct Addition<T>(PhantomData<T>);

impl<T: Linear> BinaryOp for Addition<T> {
    type Lhs = T;
    type Rhs = T;
    type Output = T;
    const NAME: &'static str = "addition";

    fn value(&self, lhs: T, rhs: T) -> T {
        lhs + rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, T, T>) -> T {
        args.dlhs() + args.drhs()
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<T>,
        rhs: &Expr<T>,
        d: &mut Differentiator,
    ) -> Expr<T> {
        add(d.of(lhs), d.of(rhs))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Subtraction<T>(PhantomData<T>);

impl<T: Linear> BinaryOp for Subtraction<T> {
    type Lhs = T;
    type Rhs = T;
    type Output = T;
    const NAME: &'static str = "subtraction";

    fn value(&self, lhs: T, rhs: T) -> T {
        lhs - rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, T, T>) -> T {
        args.dlhs() - args.drhs()
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<T>,
        rhs: &Expr<T>,
        d: &mut Differentiator,
    ) -> Expr<T> {
        subtract(d.of(lhs), d.of(rhs))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Negation<T>(PhantomData<T>);

impl<T: Linear> UnaryOp for Negation<T> {
    type Arg = T;
    type Output = T;
    const NAME: &'static str = "negation";

    fn value(&self, arg: T) -> T {
        -arg
    }

    fn derivative(&self, args: &mut UnaryArgs<'_, T>) -> T {
        -args.derivative()
    }

    fn derivative_expression(&self, arg: &Expr<T>, d: &mut Differentiator) -> Expr<T> {
        negate(d.of(arg))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sum<T>(PhantomData<T>);

impl<T: Linear> NaryOp for Sum<T> {
    type Arg = T;
    type Output = T;
    const NAME: &'static str = "sum";

    fn value(&self, args: &[T]) -> T {
        args[1..].iter().fold(args[0], |acc, &v| acc + v)
    }

    fn derivative(&self, args: &mut NaryArgs<'_, T>) -> T {
        let mut acc = args.derivative(0);
        for pos in 1..args.len() {
            acc = acc + args.derivative(pos);
        }
        acc
    }

    fn derivative_expression(&self, args: &[Expr<T>], d: &mut Differentiator) -> Expr<T> {
        sum(args.iter().map(|arg| d.of(arg)).collect())
    }
}

pub fn add<T: Linear>(lhs: Expr<T>, rhs: Expr<T>) -> Expr<T> {
    Binary::expr(Addition(PhantomData), lhs, rhs)
}

pub fn subtract<T: Linear>(lhs: Expr<T>, rhs: Expr<T>) -> Expr<T> {
    Binary::expr(Subtraction(PhantomData), lhs, rhs)
}

pub fn negate<T: Linear>(arg: Expr<T>) -> Expr<T> {
    Unary::expr(Negation(PhantomData), arg)
}

/// Sum of one or more terms.
///
/// # Panics
/// If `terms` is empty.
pub fn sum<T: Linear>(terms: Vec<Expr<T>>) -> Expr<T> {
    Nary::expr(Sum(PhantomData), terms)
}
