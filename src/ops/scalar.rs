//! Scalar operators beyond the linear ones.
use super::linear::add;
use crate::expression::{Binary, BinaryArgs, BinaryOp, Differentiator, Expr};

#[derive(Debug, Clone, Copy)]
pub struct Multiplication;

impl BinaryOp for Multiplication {
    type Lhs = f64;
    type Rhs = f64;
    type Output = f64;
    const NAME: &'static str = "multiplication";
    const RETAIN_OPERANDS: bool = true;

    fn value(&self, lhs: f64, rhs: f64) -> f64 {
        lhs * rhs
    }

    fn derivative(&self, args: &mut BinaryArgs<'_, f64, f64>) -> f64 {
        args.lhs() * args.drhs() + args.dlhs() * args.rhs()
    }

    fn derivative_expression(
        &self,
        lhs: &Expr<f64>,
        rhs: &Expr<f64>,
        d: &mut Differentiator,
    ) -> Expr<f64> {
        let a = d.shared(lhs);
        let b = d.shared(rhs);
        let da = d.of(lhs);
        let db = d.of(rhs);
        add(multiply(a, db), multiply(da, b))
    }
}

pub fn multiply(lhs: Expr<f64>, rhs: Expr<f64>) -> Expr<f64> {
    Binary::expr(Multiplication, lhs, rhs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::ledger::EvalContext;
    use crate::expression::{cached, input, Expression, ExpressionBase};
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case(2.0, 3.0)]
    #[case(-1.5, 0.0)]
    #[case(0.25, -8.0)]
    fn test_product_rule(#[case] x0: f64, #[case] y0: f64) {
        let mut ctx = EvalContext::new();
        let x = input(0);
        let y = input(1);
        // x * (x * y)
        let e = multiply(x.clone(), multiply(x.clone(), y.clone()));
        e.set_input_values(&[x0, y0]);

        assert_relative_eq!(e.value(&mut ctx), x0 * x0 * y0);
        assert_relative_eq!(e.derivative(&mut ctx, 0), 2.0 * x0 * y0);
        assert_relative_eq!(e.derivative(&mut ctx, 1), x0 * x0);

        let de = e.derivative_expression(0);
        assert_relative_eq!(de.value(&mut ctx), 2.0 * x0 * y0);
    }

    #[test]
    fn test_derivative_without_prior_value() {
        let mut ctx = EvalContext::new();
        let x = input(0);
        let e = multiply(cached(x.clone()), x.clone());
        e.set_input_value(0, 4.0);
        assert_eq!(e.derivative(&mut ctx, 0), 8.0);
    }
}
