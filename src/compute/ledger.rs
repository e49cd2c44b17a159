//! ledger.rs
//! Per-sweep memoization of node results, held outside the node graph.

use crate::algebra::{Frame, Rotation, Twist, Vector, Wrench};
use crate::expression::kind::Kind;
use crate::store::{NodeId, ResultKind};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

static GENERATION: AtomicU64 = AtomicU64::new(1);

/// The process-wide operating-point generation.
///
/// Advanced every time any leaf receives a new input value, on any thread. A
/// cached result is valid only while the generation it was computed under is
/// current, so a push from one thread costs other threads' contexts a
/// recomputation but never yields a stale value.
pub fn operating_point_generation() -> u64 {
    GENERATION.load(Ordering::Acquire)
}

pub(crate) fn advance_operating_point() -> u64 {
    GENERATION.fetch_add(1, Ordering::AcqRel) + 1
}

/// A node result of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vector(Vector),
    Rotation(Rotation),
    Frame(Frame),
    Twist(Twist),
    Wrench(Wrench),
}

impl Value {
    pub fn kind(&self) -> ResultKind {
        match self {
            Value::Scalar(_) => ResultKind::Scalar,
            Value::Vector(_) => ResultKind::Vector,
            Value::Rotation(_) => ResultKind::Rotation,
            Value::Frame(_) => ResultKind::Frame,
            Value::Twist(_) => ResultKind::Twist,
            Value::Wrench(_) => ResultKind::Wrench,
        }
    }
}

/// What a cache entry holds for its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Value,
    Derivative(usize),
    /// Retained value of the operand at this argument position.
    Operand(usize),
}

#[derive(Debug, Clone)]
struct Entry {
    epoch: u64,
    value: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Number of epoch turnovers observed by this context.
    pub epochs: u64,
}

/// Evaluation context threaded through `value`/`derivative`.
///
/// Holds every memoized result of a sweep keyed by node identity. The graph
/// itself stays immutable, so independent contexts may evaluate the same
/// graph from different threads.
#[derive(Debug, Default)]
pub struct EvalContext {
    epoch: u64,
    entries: HashMap<(NodeId, Slot), Entry>,
    stats: CacheStats,
}

impl EvalContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: HashMap::with_capacity(capacity), ..Self::default() }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry; the next lookup of any node recomputes it.
    pub fn invalidate(&mut self) {
        self.entries.clear();
    }

    #[inline(always)]
    pub fn get<T: Kind>(&mut self, node: NodeId, slot: Slot) -> Option<T> {
        self.sync();
        let epoch = self.epoch;
        let hit = self
            .entries
            .get(&(node, slot))
            .filter(|entry| entry.epoch == epoch)
            .and_then(|entry| T::from_value(&entry.value));
        if hit.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        hit
    }

    #[inline(always)]
    pub fn insert<T: Kind>(&mut self, node: NodeId, slot: Slot, value: &T) {
        self.sync();
        let entry = Entry { epoch: self.epoch, value: value.clone().into_value() };
        self.entries.insert((node, slot), entry);
    }

    /// Starts a new epoch if the operating point moved since the last access.
    fn sync(&mut self) {
        let current = operating_point_generation();
        if current != self.epoch {
            log::trace!(
                "evaluation epoch {} -> {}, dropping {} cached entries",
                self.epoch,
                current,
                self.entries.len()
            );
            self.entries.clear();
            self.epoch = current;
            self.stats.epochs += 1;
        }
    }
}

/// Runs `sweep` on fresh contexts until one run stays inside a single epoch.
///
/// Tests on other threads push inputs concurrently, which may start a new
/// epoch in the middle of a sweep.
#[cfg(test)]
pub(crate) fn in_one_epoch<R>(mut sweep: impl FnMut(&mut EvalContext) -> R) -> (EvalContext, R) {
    for _ in 0..1000 {
        let mut ctx = EvalContext::new();
        let result = sweep(&mut ctx);
        if ctx.stats().epochs == 1 {
            return (ctx, result);
        }
    }
    panic!("operating point kept moving during every sweep");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_survive_within_an_epoch() {
        let node = NodeId::fresh();
        let (_, (value, derivative)) = in_one_epoch(|ctx| {
            ctx.insert(node, Slot::Value, &2.5);
            (ctx.get::<f64>(node, Slot::Value), ctx.get::<f64>(node, Slot::Derivative(0)))
        });
        assert_eq!(value, Some(2.5));
        assert_eq!(derivative, None);
    }

    #[test]
    fn test_generation_is_shared_across_threads() {
        let mut ctx = EvalContext::new();
        let node = NodeId::fresh();
        ctx.insert(node, Slot::Value, &1.0);

        let pushed = std::thread::spawn(advance_operating_point).join().unwrap();
        assert!(operating_point_generation() >= pushed);
        assert_eq!(ctx.get::<f64>(node, Slot::Value), None);
    }

    #[test]
    fn test_new_operating_point_invalidates() {
        let mut ctx = EvalContext::new();
        let node = NodeId::fresh();

        ctx.insert(node, Slot::Value, &Vector::x());
        advance_operating_point();

        assert_eq!(ctx.get::<Vector>(node, Slot::Value), None);
        assert!(ctx.is_empty());
        assert_eq!(ctx.stats().epochs, 2);
    }

    #[test]
    fn test_kind_mismatch_is_a_miss() {
        let mut ctx = EvalContext::new();
        let node = NodeId::fresh();

        ctx.insert(node, Slot::Operand(0), &1.0);
        assert_eq!(ctx.get::<Vector>(node, Slot::Operand(0)), None);
    }

    #[test]
    fn test_invalidate_clears() {
        let mut ctx = EvalContext::with_capacity(4);
        ctx.insert(NodeId::fresh(), Slot::Value, &Wrench::zero());
        ctx.invalidate();
        assert!(ctx.is_empty());
    }
}
