//! The differentiable node framework: typed expression interface, operator
//! shells, leaves and the cache node.
pub mod binary;
pub mod cache;
pub mod kind;
pub mod leaf;
pub mod nary;
pub mod node;
pub mod unary;

pub use binary::{Binary, BinaryArgs, BinaryOp};
pub use cache::{cached, cached_named, Cached};
pub use kind::{AnyExpr, Deriv, Kind};
pub use leaf::{constant, input, input_rotation, Constant, RotationVariable, ScalarVariable};
pub use nary::{Nary, NaryArgs, NaryOp};
pub use node::{
    sub_expression, Arguments, CloneMemo, DependencySet, Differentiator, Expr, Expression,
    ExpressionBase, Optimizer,
};
pub use unary::{Unary, UnaryArgs, UnaryOp};

use crate::compute::ledger::{EvalContext, Slot};
use crate::store::NodeId;

/// Value of the operand at `pos`, read back from the context when the owning
/// node retains its operands and the value was stored this epoch.
#[inline(always)]
pub(crate) fn operand_value<K: Kind>(
    ctx: &mut EvalContext,
    node: NodeId,
    pos: usize,
    retain: bool,
    arg: &Expr<K>,
) -> K {
    if retain {
        if let Some(v) = ctx.get::<K>(node, Slot::Operand(pos)) {
            return v;
        }
    }
    let v = arg.value(ctx);
    if retain {
        ctx.insert(node, Slot::Operand(pos), &v);
    }
    v
}
