//! Optimizer and debug boundary: DAG recording and shape statistics.
pub mod telemetry;
pub mod topology;

pub use telemetry::GraphStats;
pub use topology::{ExpressionGraph, NodeInfo};
