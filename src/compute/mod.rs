//! Evaluation: the per-sweep result store and the engine that drives sweeps.
pub mod engine;
pub mod ledger;

pub use engine::{Engine, Evaluation};
pub use ledger::{operating_point_generation, CacheStats, EvalContext, Slot, Value};
