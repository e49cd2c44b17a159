//! Drives complete evaluations of a root: its value plus every Jacobian
//! column the root can actually produce.
use crate::compute::ledger::EvalContext;
use crate::expression::{Deriv, DependencySet, Expr, ExpressionBase, Kind};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// A value together with its sparse Jacobian column map.
///
/// Indices absent from `derivatives` have an exactly zero derivative.
#[derive(Debug, Clone)]
pub struct Evaluation<T: Kind> {
    pub value: T,
    pub derivatives: BTreeMap<usize, Deriv<T>>,
}

impl<T> PartialEq for Evaluation<T>
where
    T: Kind + PartialEq,
    Deriv<T>: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.derivatives == other.derivatives
    }
}

impl<T: Kind> Evaluation<T> {
    /// Derivative along `index`, zero when the root does not depend on it.
    pub fn derivative(&self, index: usize) -> Deriv<T> {
        self.derivatives.get(&index).cloned().unwrap_or_else(T::zero_derivative)
    }
}

pub struct Engine;

impl Engine {
    /// Variable indices read below `root`, visiting every shared node once.
    pub fn dependencies(root: &dyn ExpressionBase) -> DependencySet {
        let mut set = DependencySet::new();
        root.dependencies(&mut set);
        set
    }

    /// Value and every non-trivial derivative of `root` in one context.
    pub fn evaluate<T: Kind>(root: &Expr<T>, ctx: &mut EvalContext) -> Evaluation<T> {
        let value = root.value(ctx);
        let derivatives: BTreeMap<usize, Deriv<T>> = Self::dependencies(root.as_base())
            .into_iter()
            .map(|index| (index, root.derivative(ctx, index)))
            .collect();
        log::debug!(
            "evaluated '{}'{}: {} jacobian columns, {} context entries",
            root.name(),
            root.id(),
            derivatives.len(),
            ctx.len()
        );
        Evaluation { value, derivatives }
    }

    /// Like `evaluate`, with the Jacobian columns computed in parallel.
    ///
    /// The graph is shared read-only; every worker evaluates into its own context.
    pub fn par_jacobian<T: Kind>(root: &Expr<T>) -> Evaluation<T> {
        let value = root.value(&mut EvalContext::new());
        let indices: Vec<usize> = Self::dependencies(root.as_base()).into_iter().collect();
        let derivatives: BTreeMap<usize, Deriv<T>> = indices
            .par_iter()
            .map_init(EvalContext::new, |ctx, &index| (index, root.derivative(ctx, index)))
            .collect();
        log::debug!(
            "parallel jacobian of '{}'{}: {} columns",
            root.name(),
            root.id(),
            derivatives.len()
        );
        Evaluation { value, derivatives }
    }

    /// Derivative graphs along every variable `root` depends on.
    ///
    /// Built once; evaluate them with `evaluate_graphs` at each new operating point.
    pub fn derivative_graphs<T: Kind>(root: &Expr<T>) -> BTreeMap<usize, Expr<Deriv<T>>> {
        Self::dependencies(root.as_base())
            .into_iter()
            .map(|index| (index, root.derivative_expression(index)))
            .collect()
    }

    pub fn evaluate_graphs<D: Kind>(
        graphs: &BTreeMap<usize, Expr<D>>,
        ctx: &mut EvalContext,
    ) -> BTreeMap<usize, D> {
        graphs.iter().map(|(&index, graph)| (index, graph.value(ctx))).collect()
    }
}
