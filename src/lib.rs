//! Differentiable expression graphs over rigid-body quantities.
//!
//! Graphs are built from operator constructors over shared, immutable nodes
//! (`Expr<T>`). Leaves carry the operating point; an [`EvalContext`] carries
//! every memoized result of an evaluation sweep. Each node yields its value,
//! its directional derivative along any variable index, and a derivative
//! graph that can be evaluated again at later operating points.
//!
//! ```
//! use expressiongraph_core::prelude::*;
//!
//! let q = input(0);
//! let lever = vector(q.clone(), constant(1.0), constant(0.0));
//! let w = ref_point(wrench(constant(Vector::z()), constant(Vector::zeros())), lever);
//! w.set_input_value(0, 0.5);
//!
//! let mut ctx = EvalContext::new();
//! let dw = w.derivative(&mut ctx, 0);
//! assert_eq!(dw.torque, Vector::z().cross(&Vector::x()));
//! assert_eq!(w.derivative_expression(0).value(&mut ctx), dw);
//! ```

pub mod algebra;
pub mod analysis;
pub mod compute;
pub mod expression;
pub mod ops;
pub mod store;

pub use algebra::{Frame, Rotation, Twist, Vector, Wrench};
pub use compute::{Engine, EvalContext, Evaluation};
pub use expression::{Expr, Expression, ExpressionBase};
pub use store::{RegistryError, VariableRegistry};

/// Everything needed to build and evaluate graphs.
pub mod prelude {
    pub use crate::algebra::{Frame, Rotation, Twist, Vector, Wrench};
    pub use crate::compute::{Engine, EvalContext, Evaluation};
    pub use crate::expression::{
        cached, cached_named, constant, input, input_rotation, sub_expression, Expr, Expression,
        ExpressionBase,
    };
    pub use crate::ops::frame::{frame, origin, rotation, rotvel, transform_point, transvel, twist};
    pub use crate::ops::rotation::{rot, rot_x, rot_y, rot_z};
    pub use crate::ops::scalar::multiply;
    pub use crate::ops::vector::{coord_x, coord_y, coord_z, cross, dot, rotate, scale, vector};
    pub use crate::ops::wrench::{force, ref_point, scale_by, torque, transform, wrench, wrench_sum};
    pub use crate::ops::{add, negate, subtract, sum};
    pub use crate::store::VariableRegistry;
}
