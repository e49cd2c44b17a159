//! Shell for operators with one child.
use super::kind::{Deriv, Kind};
use super::node::{Arguments, CloneMemo, Differentiator, Expr, Expression, ExpressionBase};
use super::operand_value;
use crate::compute::ledger::{EvalContext, Slot};
use crate::store::{NodeId, ResultKind};
use smallvec::smallvec;
use std::sync::Arc;

/// The formula half of a unary node.
///
/// The shell supplies identity, traversal and cloning; an operator only states
/// how to compute its value, its directional derivative and its derivative graph.
pub trait UnaryOp: Clone + Send + Sync + 'static {
    type Arg: Kind;
    type Output: Kind;

    const NAME: &'static str;

    /// Store the operand value during `value` so `derivative` can reuse it.
    const RETAIN_OPERAND: bool = false;

    fn value(&self, arg: Self::Arg) -> Self::Output;

    fn derivative(&self, args: &mut UnaryArgs<'_, Self::Arg>) -> Deriv<Self::Output>;

    fn derivative_expression(
        &self,
        arg: &Expr<Self::Arg>,
        d: &mut Differentiator,
    ) -> Expr<Deriv<Self::Output>>;
}

/// Lazy access to the operand during a derivative evaluation.
pub struct UnaryArgs<'a, A: Kind> {
    ctx: &'a mut EvalContext,
    node: NodeId,
    arg: &'a Expr<A>,
    index: usize,
    retain: bool,
}

impl<'a, A: Kind> UnaryArgs<'a, A> {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn value(&mut self) -> A {
        operand_value(self.ctx, self.node, 0, self.retain, self.arg)
    }

    pub fn derivative(&mut self) -> Deriv<A> {
        self.arg.derivative(self.ctx, self.index)
    }
}

pub struct Unary<Op: UnaryOp> {
    id: NodeId,
    op: Op,
    arg: Expr<Op::Arg>,
}

impl<Op: UnaryOp> Unary<Op> {
    pub fn new(op: Op, arg: Expr<Op::Arg>) -> Self {
        Self { id: NodeId::fresh(), op, arg }
    }

    pub fn expr(op: Op, arg: Expr<Op::Arg>) -> Expr<Op::Output> {
        Arc::new(Self::new(op, arg))
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn arg(&self) -> &Expr<Op::Arg> {
        &self.arg
    }
}

impl<Op: UnaryOp> ExpressionBase for Unary<Op> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        Op::NAME
    }

    fn kind(&self) -> ResultKind {
        <Op::Output as Kind>::KIND
    }

    fn arguments(&self) -> Arguments {
        smallvec![<Op::Arg as Kind>::wrap(self.arg.clone())]
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }
}

impl<Op: UnaryOp> Expression<Op::Output> for Unary<Op> {
    fn value(&self, ctx: &mut EvalContext) -> Op::Output {
        let a = self.arg.value(ctx);
        if Op::RETAIN_OPERAND {
            ctx.insert(self.id, Slot::Operand(0), &a);
        }
        self.op.value(a)
    }

    fn derivative(&self, ctx: &mut EvalContext, index: usize) -> Deriv<Op::Output> {
        let mut args = UnaryArgs {
            ctx,
            node: self.id,
            arg: &self.arg,
            index,
            retain: Op::RETAIN_OPERAND,
        };
        self.op.derivative(&mut args)
    }

    fn build_derivative(&self, d: &mut Differentiator) -> Expr<Deriv<Op::Output>> {
        self.op.derivative_expression(&self.arg, d)
    }

    fn clone_with(&self, memo: &mut CloneMemo) -> Expr<Op::Output> {
        Self::expr(self.op.clone(), memo.clone_of(&self.arg))
    }
}
