use approx::assert_relative_eq;
use expressiongraph_core::expression::{AnyExpr, DependencySet, Kind};
use expressiongraph_core::ops::rotation::compose;
use expressiongraph_core::ops::wrench;
use expressiongraph_core::prelude::*;
use rstest::rstest;

const ROT: usize = 3;

/// Operating points as (scalar values for indices 0..3, rotation angle about z).
const POINTS: [([f64; 3], f64); 3] = [
    ([0.0, 0.0, 0.0], 0.0),
    ([0.4, -1.2, 2.5], 0.3),
    ([-2.0, 0.75, -0.1], -1.9),
];

fn lever(q0: &Expr<f64>, q1: &Expr<f64>) -> Expr<Vector> {
    vector(q0.clone(), multiply(q0.clone(), q1.clone()), constant(0.5))
}

/// Wrench graphs exercising every operator of the wrench family.
fn graphs() -> Vec<(&'static str, Expr<Wrench>)> {
    let q0 = input(0);
    let q1 = input(1);
    let q2 = input(2);
    let r = compose(rot_x(q2.clone()), input_rotation(ROT, Vector::z()));
    let p = cached(lever(&q0, &q1));
    let base = wrench(p.clone(), cross(p.clone(), vector(q1.clone(), q2.clone(), constant(1.0))));

    vec![
        ("construction", base.clone()),
        ("negation", wrench::negate(base.clone())),
        ("addition", wrench::add(base.clone(), wrench(constant(Vector::x()), p.clone()))),
        ("subtraction", wrench::subtract(base.clone(), transform(r.clone(), base.clone()))),
        ("transform", transform(r.clone(), base.clone())),
        ("scale", wrench::scale(base.clone(), multiply(q2.clone(), q0.clone()))),
        ("scale_by", scale_by(q1.clone(), transform(r.clone(), base.clone()))),
        ("ref_point", ref_point(base.clone(), rotate(r.clone(), p.clone()))),
        (
            "nested",
            wrench_sum(vec![
                ref_point(transform(r.clone(), base.clone()), lever(&q2, &q0)),
                wrench(force(base.clone()), torque(transform(r, base.clone()))),
                wrench::scale(base, q1),
            ]),
        ),
    ]
}

fn bind(root: &Expr<Wrench>, point: &([f64; 3], f64)) {
    root.set_input_values(&point.0);
    root.set_input_rotation(ROT, &Rotation::from_axis_angle(&Vector::z_axis(), point.1));
}

fn assert_wrench_eq(a: Wrench, b: Wrench) {
    assert_relative_eq!(a.force, b.force, epsilon = 1e-9, max_relative = 1e-9);
    assert_relative_eq!(a.torque, b.torque, epsilon = 1e-9, max_relative = 1e-9);
}

#[test]
fn derivative_matches_derivative_graph() {
    for (label, root) in graphs() {
        let n = root.number_of_derivatives();
        assert!(n <= ROT + 1, "{label}");
        // Built once, evaluated at every operating point.
        let derived: Vec<Expr<Wrench>> =
            (0..ROT + 3).map(|i| root.derivative_expression(i)).collect();

        let mut ctx = EvalContext::new();
        for point in &POINTS {
            bind(&root, point);
            for (i, graph) in derived.iter().enumerate() {
                let direct = root.derivative(&mut ctx, i);
                let symbolic = graph.value(&mut ctx);
                assert_wrench_eq(direct, symbolic);
            }
        }
    }
}

#[test]
fn derivative_graph_of_derivative_graph() {
    let q = input(0);
    let p = vector(q.clone(), multiply(q.clone(), q.clone()), constant(0.0));
    let w = ref_point(wrench(p.clone(), constant(Vector::zeros())), p);
    let d1 = w.derivative_expression(0);
    let d2 = d1.derivative_expression(0);

    let mut ctx = EvalContext::new();
    for q0 in [0.0, 1.0, -0.5] {
        w.set_input_value(0, q0);
        assert_wrench_eq(d1.derivative(&mut ctx, 0), d2.value(&mut ctx));
        // f = (q, q^2, 0) and p = f, so τ = f × f = 0 everywhere.
        assert_relative_eq!(d2.value(&mut ctx).torque, Vector::zeros(), epsilon = 1e-12);
        assert_relative_eq!(d2.value(&mut ctx).force, Vector::new(0.0, 2.0, 0.0), epsilon = 1e-12);
    }
}

#[test]
fn linear_operators_are_exact() {
    let q0 = input(0);
    let q1 = input(1);
    let a = wrench(lever(&q0, &q1), vector(q1.clone(), q1.clone(), q0.clone()));
    let b = transform(
        rot_z(q1.clone()),
        wrench(vector(q0.clone(), constant(2.0), q1.clone()), lever(&q1, &q0)),
    );
    let sum = wrench::add(a.clone(), b.clone());
    let diff = wrench::subtract(a.clone(), b.clone());
    let neg = wrench::negate(a.clone());

    let mut ctx = EvalContext::new();
    for point in &POINTS {
        sum.set_input_values(&point.0);
        for i in 0..3 {
            let da = a.derivative(&mut ctx, i);
            let db = b.derivative(&mut ctx, i);
            assert_eq!(sum.derivative(&mut ctx, i), da + db);
            assert_eq!(diff.derivative(&mut ctx, i), da - db);
            assert_eq!(neg.derivative(&mut ctx, i), -da);
        }
    }
}

#[test]
fn derivative_is_zero_outside_dependencies() {
    for (label, root) in graphs() {
        let deps = Engine::dependencies(root.as_base());
        let mut all = DependencySet::new();
        root.dependencies(&mut all);
        assert_eq!(deps, all, "{label}");

        let mut ctx = EvalContext::new();
        for point in &POINTS {
            bind(&root, point);
            for i in 0..8 {
                if !deps.contains(&i) {
                    assert_eq!(root.derivative(&mut ctx, i), Wrench::zero(), "{label} along {i}");
                    assert_eq!(root.derivative_expression(i).value(&mut ctx), Wrench::zero());
                }
            }
        }
    }
}

#[test]
fn dependency_partitions() {
    let (_, root) = graphs().remove(4);
    let mut all = DependencySet::new();
    let mut scalar = DependencySet::new();
    let mut rot = DependencySet::new();
    root.dependencies(&mut all);
    root.scalar_dependencies(&mut scalar);
    root.rotation_dependencies(&mut rot);
    assert_eq!(all.into_iter().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(scalar.into_iter().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(rot.into_iter().collect::<Vec<_>>(), vec![ROT]);
}

#[test]
fn clone_is_independent() {
    for (label, root) in graphs() {
        let mut ctx = EvalContext::new();
        bind(&root, &POINTS[1]);
        let value = root.value(&mut ctx);
        let dvalue = root.derivative(&mut ctx, 0);

        let copy = root.clone_expr();
        let original = expressiongraph_core::analysis::ExpressionGraph::from_root(root.as_base());
        let cloned = expressiongraph_core::analysis::ExpressionGraph::from_root(copy.as_base());
        assert_eq!(original.node_count(), cloned.node_count(), "{label}");
        assert!(original.registration_order().iter().all(|id| cloned.info(*id).is_none()));

        bind(&copy, &POINTS[2]);
        assert_eq!(root.value(&mut ctx), value, "{label}");
        assert_eq!(root.derivative(&mut ctx, 0), dvalue, "{label}");
        let copied = copy.value(&mut ctx);
        bind(&root, &POINTS[2]);
        assert_wrench_eq(copied, root.value(&mut ctx));
    }
}

#[rstest]
#[case(0)]
#[case(4)]
#[case(7)]
#[case(8)]
fn cache_is_transparent(#[case] which: usize) {
    let (label, root) = graphs().remove(which);
    let wrapped = cached(root.clone());
    let mut plain_ctx = EvalContext::new();
    let mut cached_ctx = EvalContext::new();
    for point in &POINTS {
        bind(&root, point);
        assert_eq!(root.value(&mut plain_ctx), wrapped.value(&mut cached_ctx), "{label}");
        for i in 0..=ROT {
            assert_eq!(root.derivative(&mut plain_ctx, i), wrapped.derivative(&mut cached_ctx, i));
        }
    }
}

#[test]
fn round_trip_through_construction() {
    let mut ctx = EvalContext::new();
    let w = wrench(constant(Vector::new(1.0, 0.0, 0.0)), constant(Vector::new(0.0, 1.0, 0.0)));
    assert_eq!(torque(w.clone()).value(&mut ctx), Vector::new(0.0, 1.0, 0.0));
    assert_eq!(force(w).value(&mut ctx), Vector::new(1.0, 0.0, 0.0));
}

#[test]
fn rotating_a_constant_wrench() {
    let mut ctx = EvalContext::new();
    let v = Vector::new(0.0, 0.6, 0.8);
    let w0 = Wrench::new(Vector::new(1.0, 2.0, 3.0), Vector::new(-3.0, 0.0, 1.0));
    let e = transform(input_rotation(0, v), constant(w0));

    assert_eq!(e.derivative(&mut ctx, 0), Wrench::new(v.cross(&w0.force), v.cross(&w0.torque)));
}

#[test]
fn shifting_the_reference_point() {
    let mut ctx = EvalContext::new();
    let q = input(0);
    let p = vector(constant(1.0), q.clone(), constant(0.0));
    let w = constant(Wrench::new(Vector::new(0.0, 0.0, 1.0), Vector::zeros()));
    let e = ref_point(w, p);
    e.set_input_value(0, 0.0);

    let dw = e.derivative(&mut ctx, 0);
    assert_eq!(dw.torque, Vector::new(-1.0, 0.0, 0.0));
    assert_eq!(dw.force, Vector::zeros());
}

#[rstest]
#[case(2.0, 1.0)]
#[case(-0.5, 3.0)]
fn scaling_by_a_scalar(#[case] s0: f64, #[case] rate: f64) {
    let mut ctx = EvalContext::new();
    let q = input(0);
    let s = multiply(constant(rate), q.clone());
    let w0 = Wrench::new(Vector::new(1.0, -2.0, 0.5), Vector::new(0.0, 4.0, 1.0));
    let e = wrench::scale(constant(w0), s);
    e.set_input_value(0, s0 / rate);

    assert_wrench_eq(e.value(&mut ctx), w0 * s0);
    assert_eq!(e.derivative(&mut ctx, 0), w0 * rate);
}

#[test]
fn named_sub_expressions() {
    let mut registry = VariableRegistry::new();
    registry.declare_scalar("elbow").unwrap();
    registry.declare_rotation("wrist", Vector::y()).unwrap();

    let elbow = registry.scalar("elbow").unwrap();
    let wrist = registry.rotation("wrist").unwrap();
    let tip = cached_named("tip", vector(elbow.clone(), constant(0.0), constant(1.0)));
    let load = cached_named("load", wrench(tip.clone(), constant(Vector::zeros())));
    let root = ref_point(transform(wrist, load), tip);

    assert!(sub_expression::<Vector, _>(&root, "tip").is_some());
    assert!(sub_expression::<Wrench, _>(&root, "load").is_some());
    assert!(sub_expression::<Wrench, _>(&root, "tip").is_none());
    assert!(sub_expression::<Frame, _>(&root, "missing").is_none());
    let itself = sub_expression::<Wrench, _>(&root, "ref_point");
    assert!(itself.is_some_and(|found| found.id() == root.id()));

    registry.set_scalar(root.as_base(), "elbow", 2.0).unwrap();
    let tip = sub_expression::<Vector, _>(&root, "tip").unwrap();
    assert_eq!(tip.value(&mut EvalContext::new()), Vector::new(2.0, 0.0, 1.0));
    assert!(registry.set_rotation(root.as_base(), "elbow", &Rotation::identity()).is_err());
}

#[test]
fn structural_accessors() {
    let (_, root) = graphs().remove(7);
    assert_eq!(root.nr_of_arguments(), 2);
    assert_eq!(root.name(), "ref_point");
    match root.argument(0) {
        AnyExpr::Wrench(w) => assert_eq!(w.name(), "wrench"),
        other => panic!("unexpected argument {other:?}"),
    }
    assert!(Wrench::unwrap(root.argument(1)).is_none());
}

#[test]
#[should_panic(expected = "out of range")]
fn argument_index_out_of_range() {
    let (_, root) = graphs().remove(0);
    root.argument(2);
}

#[test]
fn optimizer_sees_each_node_once() {
    struct Counter(Vec<expressiongraph_core::store::NodeId>);
    impl expressiongraph_core::expression::Optimizer for Counter {
        fn register(&mut self, node: &dyn ExpressionBase) {
            self.0.push(node.id());
        }
    }

    let (_, root) = graphs().remove(8);
    let mut counter = Counter(Vec::new());
    root.add_to_optimizer(&mut counter);
    let mut ids = counter.0.clone();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), counter.0.len());
    assert_eq!(counter.0.last(), Some(&root.id()));
}

#[test]
fn rebinding_a_deep_derivative_graph_visits_each_node_once() {
    let q = input(0);
    let mut w = wrench(vector(q.clone(), q.clone(), constant(1.0)), constant(Vector::zeros()));
    for _ in 0..24 {
        w = ref_point(w, vector(q.clone(), constant(1.0), constant(0.0)));
    }
    let dw = w.derivative_expression(0);
    let stats = expressiongraph_core::analysis::GraphStats::of(dw.as_base());
    assert!(stats.tree_size > 1_000_000 * stats.node_count as u64);

    let mut visits = 0;
    dw.for_each_node(&mut |_: &dyn ExpressionBase| visits += 1);
    assert_eq!(visits, stats.node_count);

    let mut ctx = EvalContext::new();
    for q0 in [0.3, -1.1] {
        dw.set_input_value(0, q0);
        w.set_input_value(0, q0);
        assert_eq!(dw.number_of_derivatives(), 1);
        assert_eq!(Engine::dependencies(dw.as_base()).len(), 1);
        assert_wrench_eq(dw.value(&mut ctx), w.derivative(&mut ctx, 0));
    }
    assert!(sub_expression::<Frame, _>(&dw, "missing").is_none());
}

#[test_log::test]
fn parallel_and_symbolic_jacobians_agree() {
    let (_, root) = graphs().remove(8);
    bind(&root, &POINTS[1]);

    let direct = Engine::evaluate(&root, &mut EvalContext::new());
    let parallel = Engine::par_jacobian(&root);
    let graphs = Engine::derivative_graphs(&root);
    let symbolic = Engine::evaluate_graphs(&graphs, &mut EvalContext::new());

    assert_eq!(direct.derivatives.len(), ROT + 1);
    for (i, d) in &direct.derivatives {
        assert_wrench_eq(*d, parallel.derivatives[i]);
        assert_wrench_eq(*d, symbolic[i]);
    }
}
