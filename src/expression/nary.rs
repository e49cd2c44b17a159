//! Shell for operators over a list of same-kind children.
use super::kind::{Deriv, Kind};
use super::node::{Arguments, CloneMemo, Differentiator, Expr, Expression, ExpressionBase};
use super::operand_value;
use crate::compute::ledger::{EvalContext, Slot};
use crate::store::{NodeId, ResultKind};
use std::sync::Arc;

/// The formula half of an N-ary node.
pub trait NaryOp: Clone + Send + Sync + 'static {
    type Arg: Kind;
    type Output: Kind;

    const NAME: &'static str;

    /// Exact number of children, or `None` for any non-zero count.
    const ARITY: Option<usize> = None;

    const RETAIN_OPERANDS: bool = false;

    fn value(&self, args: &[Self::Arg]) -> Self::Output;

    fn derivative(&self, args: &mut NaryArgs<'_, Self::Arg>) -> Deriv<Self::Output>;

    fn derivative_expression(
        &self,
        args: &[Expr<Self::Arg>],
        d: &mut Differentiator,
    ) -> Expr<Deriv<Self::Output>>;
}

pub struct NaryArgs<'a, A: Kind> {
    ctx: &'a mut EvalContext,
    node: NodeId,
    args: &'a [Expr<A>],
    index: usize,
    retain: bool,
}

impl<'a, A: Kind> NaryArgs<'a, A> {
    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn value(&mut self, pos: usize) -> A {
        operand_value(self.ctx, self.node, pos, self.retain, &self.args[pos])
    }

    pub fn derivative(&mut self, pos: usize) -> Deriv<A> {
        self.args[pos].derivative(self.ctx, self.index)
    }
}

pub struct Nary<Op: NaryOp> {
    id: NodeId,
    op: Op,
    args: Vec<Expr<Op::Arg>>,
}

impl<Op: NaryOp> Nary<Op> {
    /// # Panics
    /// If `args` is empty or does not match `Op::ARITY`.
    pub fn new(op: Op, args: Vec<Expr<Op::Arg>>) -> Self {
        assert!(!args.is_empty(), "'{}' needs at least one argument", Op::NAME);
        if let Some(arity) = Op::ARITY {
            assert_eq!(
                args.len(),
                arity,
                "'{}' takes exactly {} arguments, got {}",
                Op::NAME,
                arity,
                args.len()
            );
        }
        Self { id: NodeId::fresh(), op, args }
    }

    pub fn expr(op: Op, args: Vec<Expr<Op::Arg>>) -> Expr<Op::Output> {
        Arc::new(Self::new(op, args))
    }

    pub fn args(&self) -> &[Expr<Op::Arg>] {
        &self.args
    }
}

impl<Op: NaryOp> ExpressionBase for Nary<Op> {
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
        self.args.iter().map(|arg| <Op::Arg as Kind>::wrap(arg.clone())).collect()
    }

    fn nr_of_arguments(&self) -> usize {
        self.args.len()
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }
}

impl<Op: NaryOp> Expression<Op::Output> for Nary<Op> {
    fn value(&self, ctx: &mut EvalContext) -> Op::Output {
        let values: Vec<Op::Arg> = self.args.iter().map(|arg| arg.value(ctx)).collect();
        if Op::RETAIN_OPERANDS {
            for (pos, v) in values.iter().enumerate() {
                ctx.insert(self.id, Slot::Operand(pos), v);
            }
        }
        self.op.value(&values)
    }

    fn derivative(&self, ctx: &mut EvalContext, index: usize) -> Deriv<Op::Output> {
        let mut args =
            NaryArgs { ctx, node: self.id, args: &self.args, index, retain: Op::RETAIN_OPERANDS };
        self.op.derivative(&mut args)
    }

    fn build_derivative(&self, d: &mut Differentiator) -> Expr<Deriv<Op::Output>> {
        self.op.derivative_expression(&self.args, d)
    }

    fn clone_with(&self, memo: &mut CloneMemo) -> Expr<Op::Output> {
        let args = self.args.iter().map(|arg| memo.clone_of(arg)).collect();
        Self::expr(self.op.clone(), args)
    }
}
