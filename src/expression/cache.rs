//! The cache node: evaluates its child at most once per epoch.
use super::kind::{Deriv, Kind};
use super::node::{Arguments, CloneMemo, Differentiator, Expr, Expression, ExpressionBase};
use crate::compute::ledger::{EvalContext, Slot};
use crate::store::{NodeId, ResultKind};
use smallvec::smallvec;
use std::sync::Arc;

/// Memoizes the value and per-index derivatives of its child in the
/// evaluation context, so every parent in a sweep observes one computation.
pub struct Cached<T: Kind> {
    id: NodeId,
    name: Option<String>,
    arg: Expr<T>,
}

impl<T: Kind> Cached<T> {
    pub fn new(name: Option<String>, arg: Expr<T>) -> Self {
        Self { id: NodeId::fresh(), name, arg }
    }

    pub fn arg(&self) -> &Expr<T> {
        &self.arg
    }
}

impl<T: Kind> ExpressionBase for Cached<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("cached")
    }

    fn kind(&self) -> ResultKind {
        T::KIND
    }

    fn arguments(&self) -> Arguments {
        smallvec![T::wrap(self.arg.clone())]
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }

    fn is_cache(&self) -> bool {
        true
    }
}

impl<T: Kind> Expression<T> for Cached<T> {
    fn value(&self, ctx: &mut EvalContext) -> T {
        if let Some(hit) = ctx.get::<T>(self.id, Slot::Value) {
            return hit;
        }
        log::trace!("cache miss: value of '{}'{}", self.name(), self.id);
        let v = self.arg.value(ctx);
        ctx.insert(self.id, Slot::Value, &v);
        v
    }

    fn derivative(&self, ctx: &mut EvalContext, index: usize) -> Deriv<T> {
        if let Some(hit) = ctx.get::<Deriv<T>>(self.id, Slot::Derivative(index)) {
            return hit;
        }
        log::trace!("cache miss: derivative {} of '{}'{}", index, self.name(), self.id);
        let dv = self.arg.derivative(ctx, index);
        ctx.insert(self.id, Slot::Derivative(index), &dv);
        dv
    }

    fn build_derivative(&self, d: &mut Differentiator) -> Expr<Deriv<T>> {
        d.shared_of(&self.arg)
    }

    fn clone_with(&self, memo: &mut CloneMemo) -> Expr<T> {
        Arc::new(Cached::new(self.name.clone(), memo.clone_of(&self.arg)))
    }
}

/// Wraps `expr` in a cache node. Already-cached expressions are returned as is.
pub fn cached<T: Kind>(expr: Expr<T>) -> Expr<T> {
    if expr.is_cache() {
        return expr;
    }
    Arc::new(Cached::new(None, expr))
}

/// A cache node carrying `name`, findable through named sub-expression search.
pub fn cached_named<T: Kind>(name: impl Into<String>, expr: Expr<T>) -> Expr<T> {
    Arc::new(Cached::new(Some(name.into()), expr))
}
