//! Shell for operators with two children.
use super::kind::{Deriv, Kind};
use super::node::{Arguments, CloneMemo, Differentiator, Expr, Expression, ExpressionBase};
use super::operand_value;
use crate::compute::ledger::{EvalContext, Slot};
use crate::store::{NodeId, ResultKind};
use smallvec::smallvec;
use std::sync::Arc;

/// The formula half of a binary node.
pub trait BinaryOp: Clone + Send + Sync + 'static {
    type Lhs: Kind;
    type Rhs: Kind;
    type Output: Kind;

    const NAME: &'static str;

    /// Store both operand values during `value` so `derivative` can reuse them.
    const RETAIN_OPERANDS: bool = false;

    fn value(&self, lhs: Self::Lhs, rhs: Self::Rhs) -> Self::Output;

    fn derivative(&self, args: &mut BinaryArgs<'_, Self::Lhs, Self::Rhs>) -> Deriv<Self::Output>;

    fn derivative_expression(
        &self,
        lhs: &Expr<Self::Lhs>,
        rhs: &Expr<Self::Rhs>,
        d: &mut Differentiator,
    ) -> Expr<Deriv<Self::Output>>;
}

/// Lazy access to both operands during a derivative evaluation.
pub struct BinaryArgs<'a, L: Kind, R: Kind> {
    ctx: &'a mut EvalContext,
    node: NodeId,
    lhs: &'a Expr<L>,
    rhs: &'a Expr<R>,
    index: usize,
    retain: bool,
}

impl<'a, L: Kind, R: Kind> BinaryArgs<'a, L, R> {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn lhs(&mut self) -> L {
        operand_value(self.ctx, self.node, 0, self.retain, self.lhs)
    }

    pub fn rhs(&mut self) -> R {
        operand_value(self.ctx, self.node, 1, self.retain, self.rhs)
    }

    pub fn dlhs(&mut self) -> Deriv<L> {
        self.lhs.derivative(self.ctx, self.index)
    }

    pub fn drhs(&mut self) -> Deriv<R> {
        self.rhs.derivative(self.ctx, self.index)
    }
}

pub struct Binary<Op: BinaryOp> {
    id: NodeId,
    op: Op,
    lhs: Expr<Op::Lhs>,
    rhs: Expr<Op::Rhs>,
}

impl<Op: BinaryOp> Binary<Op> {
    pub fn new(op: Op, lhs: Expr<Op::Lhs>, rhs: Expr<Op::Rhs>) -> Self {
        Self { id: NodeId::fresh(), op, lhs, rhs }
    }

    pub fn expr(op: Op, lhs: Expr<Op::Lhs>, rhs: Expr<Op::Rhs>) -> Expr<Op::Output> {
        Arc::new(Self::new(op, lhs, rhs))
    }

    pub fn lhs(&self) -> &Expr<Op::Lhs> {
        &self.lhs
    }

    pub fn rhs(&self) -> &Expr<Op::Rhs> {
        &self.rhs
    }
}

impl<Op: BinaryOp> ExpressionBase for Binary<Op> {
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
        smallvec![
            <Op::Lhs as Kind>::wrap(self.lhs.clone()),
            <Op::Rhs as Kind>::wrap(self.rhs.clone())
        ]
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }
}

impl<Op: BinaryOp> Expression<Op::Output> for Binary<Op> {
    fn value(&self, ctx: &mut EvalContext) -> Op::Output {
        let a = self.lhs.value(ctx);
        let b = self.rhs.value(ctx);
        if Op::RETAIN_OPERANDS {
            ctx.insert(self.id, Slot::Operand(0), &a);
            ctx.insert(self.id, Slot::Operand(1), &b);
        }
        self.op.value(a, b)
    }

    fn derivative(&self, ctx: &mut EvalContext, index: usize) -> Deriv<Op::Output> {
        let mut args = BinaryArgs {
            ctx,
            node: self.id,
            lhs: &self.lhs,
            rhs: &self.rhs,
            index,
            retain: Op::RETAIN_OPERANDS,
        };
        self.op.derivative(&mut args)
    }

    fn build_derivative(&self, d: &mut Differentiator) -> Expr<Deriv<Op::Output>> {
        self.op.derivative_expression(&self.lhs, &self.rhs, d)
    }

    fn clone_with(&self, memo: &mut CloneMemo) -> Expr<Op::Output> {
        let lhs = memo.clone_of(&self.lhs);
        let rhs = memo.clone_of(&self.rhs);
        Self::expr(self.op.clone(), lhs, rhs)
    }
}
