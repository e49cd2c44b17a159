//! Result kinds: the six value types a node can produce, and the tagged
//! handle used wherever the result type is only known at runtime.
use super::node::{Expr, ExpressionBase};
use crate::algebra::{Frame, Rotation, Twist, Vector, Wrench};
use crate::compute::ledger::Value;
use crate::store::ResultKind;
use std::fmt;
use std::ops::Deref;

/// The directional-derivative type associated with a result type.
pub type Deriv<T> = <T as Kind>::Deriv;

/// A value type an expression node can produce.
pub trait Kind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Type of the directional derivative of a value of this kind.
    type Deriv: Kind;

    const KIND: ResultKind;

    /// The additive identity of `Self::Deriv`.
    fn zero_derivative() -> Self::Deriv;

    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;

    fn wrap(expr: Expr<Self>) -> AnyExpr;
    fn unwrap(expr: AnyExpr) -> Option<Expr<Self>>;
}

/// A type-erased expression handle tagged with its result kind.
#[derive(Clone)]
pub enum AnyExpr {
    Scalar(Expr<f64>),
    Vector(Expr<Vector>),
    Rotation(Expr<Rotation>),
    Frame(Expr<Frame>),
    Twist(Expr<Twist>),
    Wrench(Expr<Wrench>),
}

impl Deref for AnyExpr {
    type Target = dyn ExpressionBase;

    fn deref(&self) -> &Self::Target {
        match self {
            AnyExpr::Scalar(e) => e.as_base(),
            AnyExpr::Vector(e) => e.as_base(),
            AnyExpr::Rotation(e) => e.as_base(),
            AnyExpr::Frame(e) => e.as_base(),
            AnyExpr::Twist(e) => e.as_base(),
            AnyExpr::Wrench(e) => e.as_base(),
        }
    }
}

impl fmt::Debug for AnyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>{}", self.name(), self.kind(), self.id())
    }
}

macro_rules! impl_kind {
    ($ty:ty, $variant:ident, $deriv:ty, $zero:expr) => {
        impl Kind for $ty {
            type Deriv = $deriv;
            const KIND: ResultKind = ResultKind::$variant;

            fn zero_derivative() -> $deriv {
                $zero
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }

            fn wrap(expr: Expr<Self>) -> AnyExpr {
                AnyExpr::$variant(expr)
            }

            fn unwrap(expr: AnyExpr) -> Option<Expr<Self>> {
                match expr {
                    AnyExpr::$variant(e) => Some(e),
                    _ => None,
                }
            }
        }
    };
}

impl_kind!(f64, Scalar, f64, 0.0);
impl_kind!(Vector, Vector, Vector, Vector::zeros());
impl_kind!(Rotation, Rotation, Vector, Vector::zeros());
impl_kind!(Frame, Frame, Twist, Twist::zero());
impl_kind!(Twist, Twist, Twist, Twist::zero());
impl_kind!(Wrench, Wrench, Wrench, Wrench::zero());
