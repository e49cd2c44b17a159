//! Operator families and their construction functions.
//!
//! Every operator is a formula plugged into one of the unary, binary or N-ary
//! shells. Constructors are the only way to build graphs.
pub mod frame;
pub mod linear;
pub mod rotation;
pub mod scalar;
pub mod vector;
pub mod wrench;

pub use linear::{add, negate, subtract, sum, Linear};
