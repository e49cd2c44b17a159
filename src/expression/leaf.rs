//! Leaf nodes: constants and the variables that carry the operating point.
use super::kind::{Deriv, Kind};
use super::node::{Arguments, CloneMemo, Differentiator, Expr, Expression, ExpressionBase};
use crate::algebra::{Rotation, Vector};
use crate::compute::ledger::{advance_operating_point, EvalContext};
use crate::store::{NodeId, ResultKind, VariableKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// A fixed value. Its derivative is zero along every variable.
pub struct Constant<T: Kind> {
    id: NodeId,
    value: T,
}

impl<T: Kind> Constant<T> {
    pub fn new(value: T) -> Self {
        Self { id: NodeId::fresh(), value }
    }
}

impl<T: Kind> ExpressionBase for Constant<T> {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        "constant"
    }

    fn kind(&self) -> ResultKind {
        T::KIND
    }

    fn arguments(&self) -> Arguments {
        Arguments::new()
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }
}

impl<T: Kind> Expression<T> for Constant<T> {
    fn value(&self, _ctx: &mut EvalContext) -> T {
        self.value.clone()
    }

    fn derivative(&self, _ctx: &mut EvalContext, _index: usize) -> Deriv<T> {
        T::zero_derivative()
    }

    fn build_derivative(&self, _d: &mut Differentiator) -> Expr<Deriv<T>> {
        constant(T::zero_derivative())
    }

    fn clone_with(&self, _memo: &mut CloneMemo) -> Expr<T> {
        constant(self.value.clone())
    }
}

pub fn constant<T: Kind>(value: T) -> Expr<T> {
    Arc::new(Constant::new(value))
}

/// A scalar variable bound to one index of the variable space.
pub struct ScalarVariable {
    id: NodeId,
    index: usize,
    bits: AtomicU64,
}

impl ScalarVariable {
    pub fn new(index: usize, initial: f64) -> Self {
        Self { id: NodeId::fresh(), index, bits: AtomicU64::new(initial.to_bits()) }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
        advance_operating_point();
    }
}

impl ExpressionBase for ScalarVariable {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        "input"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Scalar
    }

    fn arguments(&self) -> Arguments {
        Arguments::new()
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }

    fn variable(&self) -> Option<(usize, VariableKind)> {
        Some((self.index, VariableKind::Scalar))
    }

    fn bind_scalar(&self, value: f64) {
        self.set(value);
    }
}

impl Expression<f64> for ScalarVariable {
    fn value(&self, _ctx: &mut EvalContext) -> f64 {
        self.get()
    }

    fn derivative(&self, _ctx: &mut EvalContext, index: usize) -> f64 {
        if index == self.index {
            1.0
        } else {
            0.0
        }
    }

    fn build_derivative(&self, d: &mut Differentiator) -> Expr<f64> {
        constant(if d.index() == self.index { 1.0 } else { 0.0 })
    }

    fn clone_with(&self, _memo: &mut CloneMemo) -> Expr<f64> {
        Arc::new(ScalarVariable::new(self.index, self.get()))
    }
}

/// Scalar variable leaf bound to `index`, starting at zero.
pub fn input(index: usize) -> Expr<f64> {
    Arc::new(ScalarVariable::new(index, 0.0))
}

/// A rotation-valued variable.
///
/// Along its own index the rotation turns about `axis`, so its directional
/// derivative there is `axis` and zero elsewhere.
pub struct RotationVariable {
    id: NodeId,
    index: usize,
    axis: Vector,
    value: RwLock<Rotation>,
}

impl RotationVariable {
    pub fn new(index: usize, axis: Vector, initial: Rotation) -> Self {
        Self { id: NodeId::fresh(), index, axis, value: RwLock::new(initial) }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn axis(&self) -> Vector {
        self.axis
    }

    pub fn get(&self) -> Rotation {
        *self.value.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExpressionBase for RotationVariable {
    fn id(&self) -> NodeId {
        self.id
    }

    fn name(&self) -> &str {
        "input_rotation"
    }

    fn kind(&self) -> ResultKind {
        ResultKind::Rotation
    }

    fn arguments(&self) -> Arguments {
        Arguments::new()
    }

    fn as_base(&self) -> &(dyn ExpressionBase + 'static) {
        self
    }

    fn variable(&self) -> Option<(usize, VariableKind)> {
        Some((self.index, VariableKind::Rotation))
    }

    fn bind_rotation(&self, value: &Rotation) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = *value;
        advance_operating_point();
    }
}

impl Expression<Rotation> for RotationVariable {
    fn value(&self, _ctx: &mut EvalContext) -> Rotation {
        self.get()
    }

    fn derivative(&self, _ctx: &mut EvalContext, index: usize) -> Vector {
        if index == self.index {
            self.axis
        } else {
            Vector::zeros()
        }
    }

    fn build_derivative(&self, d: &mut Differentiator) -> Expr<Vector> {
        constant(if d.index() == self.index { self.axis } else { Vector::zeros() })
    }

    fn clone_with(&self, _memo: &mut CloneMemo) -> Expr<Rotation> {
        Arc::new(RotationVariable::new(self.index, self.axis, self.get()))
    }
}

/// Rotation variable leaf bound to `index`, starting at the identity.
pub fn input_rotation(index: usize, axis: Vector) -> Expr<Rotation> {
    Arc::new(RotationVariable::new(index, axis, Rotation::identity()))
}
