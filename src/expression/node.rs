//! The node abstraction shared by every expression, and the typed
//! expression interface layered on top of it.
use super::cache::cached;
use super::kind::{AnyExpr, Deriv, Kind};
use super::leaf::constant;
use crate::algebra::Rotation;
use crate::compute::ledger::EvalContext;
use crate::store::{NodeId, ResultKind, VariableKind};
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

/// Shared handle to a typed expression node.
pub type Expr<T> = Arc<dyn Expression<T>>;

/// The ordered children of a node.
pub type Arguments = SmallVec<[AnyExpr; 2]>;

/// Variable indices a subgraph reads.
pub type DependencySet = BTreeSet<usize>;

/// Receives node registrations when a root is added to an optimizer.
///
/// Every reachable node is registered exactly once, children before parents.
pub trait Optimizer {
    fn register(&mut self, node: &dyn ExpressionBase);
}

/// Operations every node supports regardless of its result type.
///
/// A node only has to describe itself (`id`, `name`, `kind`) and its children
/// (`arguments`). Input propagation, dependency queries, derivative counting,
/// named search and optimizer registration walk the DAG in argument order and
/// visit each shared node once; variable leaves only report `variable` and
/// accept `bind_*`.
pub trait ExpressionBase: Send + Sync {
    fn id(&self) -> NodeId;
    fn name(&self) -> &str;
    fn kind(&self) -> ResultKind;
    fn arguments(&self) -> Arguments;
    fn as_base(&self) -> &(dyn ExpressionBase + 'static);

    fn is_cache(&self) -> bool {
        false
    }

    fn nr_of_arguments(&self) -> usize {
        self.arguments().len()
    }

    /// Returns the child at `idx`.
    ///
    /// # Panics
    /// If `idx` is not below `nr_of_arguments()`.
    fn argument(&self, idx: usize) -> AnyExpr {
        let args = self.arguments();
        assert!(
            idx < args.len(),
            "argument index {} out of range for '{}' with {} arguments",
            idx,
            self.name(),
            args.len()
        );
        args[idx].clone()
    }

    /// The variable this node binds, for leaves carrying the operating point.
    fn variable(&self) -> Option<(usize, VariableKind)> {
        None
    }

    /// Stores a new scalar operating point; only scalar variables hold one.
    fn bind_scalar(&self, _value: f64) {}

    /// Stores a new rotation operating point; only rotation variables hold one.
    fn bind_rotation(&self, _value: &Rotation) {}

    /// Visits every distinct node below and including this one, children
    /// before parents, depth-first in argument order.
    fn for_each_node(&self, visit: &mut dyn FnMut(&dyn ExpressionBase)) {
        let mut seen = HashSet::new();
        self.walk(&mut seen, visit);
    }

    fn walk(&self, seen: &mut HashSet<NodeId>, visit: &mut dyn FnMut(&dyn ExpressionBase)) {
        if !seen.insert(self.id()) {
            return;
        }
        for arg in self.arguments() {
            arg.walk(seen, visit);
        }
        visit(self.as_base());
    }

    fn set_input_value(&self, index: usize, value: f64) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if node.variable() == Some((index, VariableKind::Scalar)) {
                node.bind_scalar(value);
            }
        });
    }

    fn set_input_rotation(&self, index: usize, value: &Rotation) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if node.variable() == Some((index, VariableKind::Rotation)) {
                node.bind_rotation(value);
            }
        });
    }

    /// Sets every scalar leaf whose index falls inside `values`.
    fn set_input_values(&self, values: &[f64]) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if let Some((index, VariableKind::Scalar)) = node.variable() {
                if let Some(&value) = values.get(index) {
                    node.bind_scalar(value);
                }
            }
        });
    }

    fn dependencies(&self, set: &mut DependencySet) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if let Some((index, _)) = node.variable() {
                set.insert(index);
            }
        });
    }

    fn scalar_dependencies(&self, set: &mut DependencySet) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if let Some((index, VariableKind::Scalar)) = node.variable() {
                set.insert(index);
            }
        });
    }

    fn rotation_dependencies(&self, set: &mut DependencySet) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if let Some((index, VariableKind::Rotation)) = node.variable() {
                set.insert(index);
            }
        });
    }

    /// One more than the largest variable index reachable from this node, 0 if none.
    fn number_of_derivatives(&self) -> usize {
        let mut count = 0;
        self.for_each_node(&mut |node: &dyn ExpressionBase| {
            if let Some((index, _)) = node.variable() {
                count = count.max(index + 1);
            }
        });
        count
    }

    /// Depth-first search below this node for a node of `kind` called `name`.
    fn find(&self, name: &str, kind: ResultKind) -> Option<AnyExpr> {
        let mut seen = HashSet::new();
        self.find_below(name, kind, &mut seen)
    }

    fn find_below(
        &self,
        name: &str,
        kind: ResultKind,
        seen: &mut HashSet<NodeId>,
    ) -> Option<AnyExpr> {
        for arg in self.arguments() {
            if !seen.insert(arg.id()) {
                continue;
            }
            if arg.kind() == kind && arg.name() == name {
                return Some(arg);
            }
            if let Some(found) = arg.find_below(name, kind, seen) {
                return Some(found);
            }
        }
        None
    }

    fn add_to_optimizer(&self, opt: &mut dyn Optimizer) {
        self.for_each_node(&mut |node: &dyn ExpressionBase| opt.register(node));
    }
}

/// A node producing values of type `T`.
///
/// Concrete operators provide the value, the numeric directional derivative,
/// the symbolic derivative and the structural copy.
pub trait Expression<T: Kind>: ExpressionBase {
    /// Evaluates at the operating point currently bound to the leaves.
    fn value(&self, ctx: &mut EvalContext) -> T;

    /// Directional derivative along variable `index`; zero when the subgraph
    /// does not depend on `index`.
    fn derivative(&self, ctx: &mut EvalContext, index: usize) -> Deriv<T>;

    /// Builds the derivative graph of this node for the differentiator's index.
    fn build_derivative(&self, d: &mut Differentiator) -> Expr<Deriv<T>>;

    /// Copies this node, resolving children through `memo`.
    fn clone_with(&self, memo: &mut CloneMemo) -> Expr<T>;

    /// A new graph whose value at any operating point equals `derivative(index)`.
    fn derivative_expression(&self, index: usize) -> Expr<Deriv<T>> {
        let mut d = Differentiator::new(index);
        if !d.depends_on(self.as_base()) {
            return constant(T::zero_derivative());
        }
        log::debug!(
            "building derivative graph of '{}'{} along variable {}",
            self.name(),
            self.id(),
            index
        );
        let graph = self.build_derivative(&mut d);
        log::debug!("derivative graph built from {} differentiated nodes", d.len());
        graph
    }

    /// Deep structural copy: no node instance is shared with the original.
    fn clone_expr(&self) -> Expr<T> {
        self.clone_with(&mut CloneMemo::default())
    }

    fn dependency_set(&self) -> DependencySet {
        let mut set = DependencySet::new();
        self.dependencies(&mut set);
        set
    }
}

/// Builds derivative graphs along one variable index.
///
/// Each source node is differentiated at most once per differentiator, so a
/// shared child yields one shared derivative subgraph. Subgraphs that do not
/// read the variable collapse to a zero constant.
pub struct Differentiator {
    index: usize,
    memo: HashMap<NodeId, AnyExpr>,
    shared: HashMap<NodeId, AnyExpr>,
    depends: HashMap<NodeId, bool>,
}

impl Differentiator {
    pub fn new(index: usize) -> Self {
        Self { index, memo: HashMap::new(), shared: HashMap::new(), depends: HashMap::new() }
    }

    #[inline(always)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of source nodes differentiated so far.
    pub fn len(&self) -> usize {
        self.memo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memo.is_empty()
    }

    /// The derivative graph of `expr`.
    pub fn of<K: Kind>(&mut self, expr: &Expr<K>) -> Expr<Deriv<K>> {
        let id = expr.id();
        if let Some(done) = self.memo.get(&id).cloned().and_then(<Deriv<K> as Kind>::unwrap) {
            return done;
        }
        let derived = if self.depends_on(expr.as_base()) {
            expr.build_derivative(self)
        } else {
            constant(K::zero_derivative())
        };
        self.memo.insert(id, <Deriv<K> as Kind>::wrap(derived.clone()));
        derived
    }

    /// `expr` behind a single cache node, reused for every later request.
    ///
    /// Leaves and cache nodes are returned unchanged.
    pub fn shared<K: Kind>(&mut self, expr: &Expr<K>) -> Expr<K> {
        if expr.is_cache() || expr.nr_of_arguments() == 0 {
            return expr.clone();
        }
        let id = expr.id();
        if let Some(done) = self.shared.get(&id).cloned().and_then(K::unwrap) {
            return done;
        }
        let wrapped = cached(expr.clone());
        self.shared.insert(id, K::wrap(wrapped.clone()));
        wrapped
    }

    /// Shorthand for `shared(&of(expr))`.
    pub fn shared_of<K: Kind>(&mut self, expr: &Expr<K>) -> Expr<Deriv<K>> {
        let derived = self.of(expr);
        self.shared(&derived)
    }

    /// Whether the subgraph below `node` reads this differentiator's variable.
    pub fn depends_on(&mut self, node: &dyn ExpressionBase) -> bool {
        if let Some(&known) = self.depends.get(&node.id()) {
            return known;
        }
        let args = node.arguments();
        let known = if args.is_empty() {
            node.variable().is_some_and(|(index, _)| index == self.index)
        } else {
            args.iter().any(|arg| self.depends_on(&**arg))
        };
        self.depends.insert(node.id(), known);
        known
    }
}

/// Maps source nodes to their copies during a single `clone_expr`.
#[derive(Default)]
pub struct CloneMemo {
    clones: HashMap<NodeId, AnyExpr>,
}

impl CloneMemo {
    pub fn clone_of<K: Kind>(&mut self, expr: &Expr<K>) -> Expr<K> {
        let id = expr.id();
        if let Some(done) = self.clones.get(&id).cloned().and_then(K::unwrap) {
            return done;
        }
        let copy = expr.clone_with(self);
        self.clones.insert(id, K::wrap(copy.clone()));
        copy
    }

    pub fn len(&self) -> usize {
        self.clones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clones.is_empty()
    }
}

/// Looks up a node of result kind `K` named `name`, starting with `root` itself.
pub fn sub_expression<K: Kind, T: Kind>(root: &Expr<T>, name: &str) -> Option<Expr<K>> {
    if T::KIND == K::KIND && root.name() == name {
        return K::unwrap(T::wrap(root.clone()));
    }
    root.find(name, K::KIND).and_then(K::unwrap)
}
