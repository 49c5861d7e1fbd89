#[cfg(test)]
mod tests {
    use crate::Utils::resolver_config::ResolverConfig;
    use crate::fractional::order::Order;
    use crate::fractional::resolver::{
        DifferintegralRequest, FractionalResolver, InterruptFlag, resolve_fractional_derivative,
    };
    use crate::fractional::result::{DifferintegralResult, FailureKind, MethodTag};
    use crate::symbolic::mellin::{ConvergenceStrip, InverseMellinOutcome, MellinOutcome};
    use crate::symbolic::special_functions::{GammaPole, gamma};
    use crate::symbolic::symbolic_engine::Expr;
    use crate::symbolic::symbolic_traits::{AlgebraEngine, NativeEngine};
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use std::collections::BTreeMap;
    use std::f64::consts::PI;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    fn success(result: DifferintegralResult) -> (Expr, MethodTag) {
        match result {
            DifferintegralResult::Success { expr, method } => (expr, method),
            DifferintegralResult::Failure(error) => panic!("expected success, got {}", error),
        }
    }

    fn resolve(input: &str, order: Order) -> DifferintegralResult {
        resolve_fractional_derivative(&parse(input), "x", &order)
    }

    //___________________________________POWER RULE TIER____________________________________

    #[test]
    fn test_cube_half_derivative_closed_form() {
        let (expr, method) = success(resolve("x^3", Order::Real(0.5)));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        let expected = Expr::Const(gamma(4.0) / gamma(3.5))
            * Expr::Var("x".to_string()).pow(Expr::Const(2.5));
        assert_eq!(expr, expected);
        assert_relative_eq!(
            expr.eval_expression(&["x"], &[2.0]),
            6.0 / gamma(3.5) * 2f64.powf(2.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_integer_order_matches_repeated_differentiation() {
        let engine = NativeEngine::new();
        let p = parse("3*x^4 - 2*x^3 + x^2/2 + 7*x - 1");
        for n in 0..=5_i64 {
            let (fractional, method) = success(resolve_fractional_derivative(&p, "x", &Order::Integer(n)));
            assert_eq!(method, MethodTag::RiemannLiouvillePower);
            let classical = (0..n).fold(p.clone(), |acc, _| engine.differentiate(&acc, "x"));
            for x in [-1.5, 0.0, 0.5, 2.0] {
                assert_relative_eq!(
                    fractional.eval_expression(&["x"], &[x]),
                    classical.eval_expression(&["x"], &[x]),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_zero_order_returns_input() {
        let engine = NativeEngine::new();
        for input in ["x^3", "3*x^4 + 2*x^2 + 5", "sqrt(x)", "sin(x)", "exp(x)"] {
            let expr = parse(input);
            let (result, _) = success(resolve_fractional_derivative(&expr, "x", &Order::Integer(0)));
            assert_eq!(result, engine.simplify(&expr), "{}", input);
        }
    }

    #[test]
    fn test_composition_of_integer_orders() {
        let resolver = FractionalResolver::new();
        let p = parse("3*x^4 + 2*x^2 + 5");
        let degree = 4;
        for m in 0..=degree {
            for n in 0..=(degree - m) {
                let (inner, _) = success(resolver.resolve(&p, "x", &Order::Integer(n)));
                let (composed, _) = success(resolver.resolve(&inner, "x", &Order::Integer(m)));
                let (direct, _) = success(resolver.resolve(&p, "x", &Order::Integer(m + n)));
                assert!(
                    resolver.engine().structurally_equal(&composed, &direct),
                    "D^{}(D^{} P) = {} but D^{} P = {}",
                    m,
                    n,
                    composed,
                    m + n,
                    direct
                );
            }
        }
        let (third, _) = success(resolver.resolve(&p, "x", &Order::Integer(3)));
        assert_eq!(third, parse("72*x").simplify());
    }

    #[test]
    fn test_pure_power_with_coefficient() {
        // D^0.5 (2/sqrt(x)) = 0 in the Riemann-Liouville sense: Γ(0.5)/Γ(0) has a pole in
        // the denominator, so the power rule fails and the Mellin tier has no transform
        let result = resolve("2/sqrt(x)", Order::Real(0.5));
        assert_eq!(result.failure_kind(), Some(FailureKind::TransformUnavailable));

        let (expr, method) = success(resolve("4*x^1.5", Order::Rational(1, 2)));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        assert_relative_eq!(
            expr.eval_expression(&["x"], &[3.0]),
            4.0 * gamma(2.5) / gamma(2.0) * 3.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_high_degree_terms() {
        let (expr, method) = success(resolve("x^65 + 1", Order::Integer(1)));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        assert_relative_eq!(expr.eval_expression(&["x"], &[1.0]), 65.0, epsilon = 1e-9);

        let (expr, method) = success(resolve("x^143", Order::Real(0.5)));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        let coefficient = expr.eval_expression(&["x"], &[1.0]);
        assert!(coefficient > 11.9 && coefficient < 12.0, "coefficient {}", coefficient);

        let (expr, _) = success(resolve("x^160", Order::Real(-0.5)));
        assert_ne!(expr, Expr::Const(0.0));
        let coefficient = expr.eval_expression(&["x"], &[1.0]);
        assert!(coefficient > 0.078 && coefficient < 0.079, "coefficient {}", coefficient);
    }

    #[test]
    fn test_integer_orders_of_reciprocal() {
        let (expr, method) = success(resolve("1/x", Order::Integer(1)));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        assert_relative_eq!(expr.eval_expression(&["x"], &[2.0]), -0.25, epsilon = 1e-12);
        let (expr, _) = success(resolve("1/x", Order::Integer(0)));
        assert_relative_eq!(expr.eval_expression(&["x"], &[2.0]), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_complex_order() {
        let order = Order::Complex(Complex64::new(0.5, 1.0));
        let (expr, method) = success(resolve("x^2", order));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        assert!(expr.contains_variable("I"));
    }

    #[test]
    fn test_symbolic_order() {
        let order = Order::Symbolic(Expr::Var("alpha".to_string()));
        let (expr, method) = success(resolve("x^2 + x", order));
        assert_eq!(method, MethodTag::RiemannLiouvillePower);
        assert!(expr.contains_variable("alpha"));
        let value = expr.eval_expression(&["x", "alpha"], &[4.0, 1.0]);
        assert_relative_eq!(value, 2.0 * 4.0 + 1.0, epsilon = 1e-10);
    }

    //___________________________________LOOKUP TIER____________________________________

    #[test]
    fn test_exp_any_order_uses_table() {
        let orders = [
            Order::Real(0.5),
            Order::Rational(1, 3),
            Order::Integer(2),
            Order::Real(-1.25),
            Order::Complex(Complex64::new(0.3, 0.2)),
            Order::Symbolic(Expr::Var("a".to_string())),
        ];
        for order in orders {
            let (expr, method) = success(resolve("exp(x)", order.clone()));
            assert_eq!(method, MethodTag::LookupTable, "order {}", order);
            let expected = Expr::Var("x".to_string()).pow(-order.to_expr())
                * Expr::Var("x".to_string()).exp();
            assert_eq!(expr, expected.simplify(), "order {}", order);
        }
    }

    #[test]
    fn test_sin_half_derivative_uses_table() {
        let (expr, method) = success(resolve("sin(x)", Order::Real(0.5)));
        assert_eq!(method, MethodTag::LookupTable);
        assert_relative_eq!(
            expr.eval_expression(&["x"], &[0.7]),
            (0.7 + PI / 4.0).sin(),
            epsilon = 1e-14
        );
    }

    #[test]
    fn test_table_miss_falls_through() {
        // no entry for sin at 0.25; the transform-domain product is not invertible
        let result = resolve("sin(x)", Order::Real(0.25));
        assert!(!result.is_success());
        assert_ne!(result.failure_kind(), Some(FailureKind::InternalError));
    }

    //___________________________________MELLIN TIER____________________________________

    #[test]
    fn test_mellin_tier_damped_root() {
        let (expr, method) = success(resolve("x^-0.5*exp(-x)", Order::Real(0.5)));
        assert_eq!(method, MethodTag::MellinTransform);
        assert_eq!(expr, parse("exp(-x)"));
    }

    #[test]
    fn test_mellin_tier_rational_function() {
        let (expr, method) = success(resolve("x^-0.5*(1+x)^-1", Order::Real(0.5)));
        assert_eq!(method, MethodTag::MellinTransform);
        assert_relative_eq!(
            expr.eval_expression(&["x"], &[2.0]),
            gamma(1.5) * 3f64.powf(-1.5),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_strip_retry_is_configurable() {
        let expr = parse("x*sin(x)");
        let with_retry = FractionalResolver::new().resolve(&expr, "x", &Order::Integer(0));
        assert_eq!(with_retry.method(), Some(MethodTag::MellinTransform));

        let config = ResolverConfig {
            strip_retry: false,
            ..ResolverConfig::default()
        };
        let without_retry = FractionalResolver::new()
            .with_config(config)
            .resolve(&expr, "x", &Order::Integer(0));
        assert_eq!(
            without_retry.failure_kind(),
            Some(FailureKind::InversionUnavailable)
        );
    }

    #[test]
    fn test_inversion_failure_is_never_a_success() {
        let result = resolve("exp(-x)", Order::Real(0.5));
        let error = result.error().expect("inversion must fail");
        assert_eq!(error.kind, FailureKind::InversionUnavailable);
        assert!(error.transform_domain.is_some());
        assert!(!error.message.is_empty());
    }

    #[test]
    fn test_transform_unavailable() {
        let result = resolve("1/x", Order::Real(0.5));
        assert_eq!(result.failure_kind(), Some(FailureKind::TransformUnavailable));
    }

    //___________________________________ORCHESTRATION____________________________________

    #[test]
    fn test_determinism() {
        let resolver = FractionalResolver::new();
        for (input, order) in [
            ("x^3 + 2*x", Order::Real(0.5)),
            ("exp(x)", Order::Real(0.3)),
            ("x^-0.5*exp(-x)", Order::Real(0.5)),
            ("exp(-x)", Order::Real(0.5)),
        ] {
            let expr = parse(input);
            let first = resolver.resolve(&expr, "x", &order);
            for _ in 0..3 {
                assert_eq!(resolver.resolve(&expr, "x", &order), first, "{}", input);
            }
        }
    }

    #[test]
    fn test_invalid_orders() {
        for order in [
            Order::Real(f64::NAN),
            Order::Rational(1, 0),
            Order::Symbolic(parse("2*x")),
        ] {
            let result = resolve("x^2", order);
            assert_eq!(result.failure_kind(), Some(FailureKind::UnsupportedOrder));
        }
    }

    #[test]
    fn test_interrupt_stops_resolution() {
        let flag = InterruptFlag::new();
        let resolver = FractionalResolver::new().with_interrupt(flag.clone());
        let expr = parse("x^2");
        assert!(resolver.resolve(&expr, "x", &Order::Real(0.5)).is_success());
        flag.interrupt();
        let result = resolver.resolve(&expr, "x", &Order::Real(0.5));
        assert_eq!(result.failure_kind(), Some(FailureKind::Timeout));
        flag.reset();
        assert!(resolver.resolve(&expr, "x", &Order::Real(0.5)).is_success());
    }

    #[test]
    fn test_disabled_tiers_behave_as_misses() {
        let config = ResolverConfig {
            power_rule: false,
            ..ResolverConfig::default()
        };
        // a bare power has no Mellin transform
        let resolver = FractionalResolver::new().with_config(config);
        let result = resolver.resolve(&parse("x^3"), "x", &Order::Real(0.5));
        assert_eq!(result.failure_kind(), Some(FailureKind::TransformUnavailable));

        let config = ResolverConfig {
            lookup_table: false,
            mellin_transform: false,
            ..ResolverConfig::default()
        };
        let resolver = FractionalResolver::new().with_config(config);
        let result = resolver.resolve(&parse("exp(x)"), "x", &Order::Real(0.5));
        assert_eq!(result.failure_kind(), Some(FailureKind::TransformUnavailable));
    }

    #[test]
    fn test_batch_keeps_request_order() {
        let resolver = FractionalResolver::new();
        let requests = vec![
            DifferintegralRequest::new(parse("x^3"), "x", Order::Real(0.5)),
            DifferintegralRequest::new(parse("exp(x)"), "x", Order::Real(0.5)),
            DifferintegralRequest::new(parse("x^-0.5*exp(-x)"), "x", Order::Real(0.5)),
            DifferintegralRequest::new(parse("1/x"), "x", Order::Real(0.5)),
            DifferintegralRequest::new(parse("y^2"), "y", Order::Integer(1)),
        ];
        let results = resolver.resolve_batch(&requests);
        assert_eq!(results.len(), requests.len());
        assert_eq!(results[0].method(), Some(MethodTag::RiemannLiouvillePower));
        assert_eq!(results[1].method(), Some(MethodTag::LookupTable));
        assert_eq!(results[2].method(), Some(MethodTag::MellinTransform));
        assert_eq!(results[3].failure_kind(), Some(FailureKind::TransformUnavailable));
        assert_eq!(results[4].expr(), Some(&parse("2*y")));
        for (request, result) in requests.iter().zip(&results) {
            assert_eq!(
                &resolver.resolve(&request.expr, &request.var, &request.order),
                result
            );
        }
    }

    //___________________________________FAULTY ENGINE____________________________________

    /// Delegates to the native engine but panics while decomposing polynomials.
    struct PanickingEngine(NativeEngine);

    impl AlgebraEngine for PanickingEngine {
        fn differentiate(&self, expr: &Expr, var: &str) -> Expr {
            self.0.differentiate(expr, var)
        }
        fn simplify(&self, expr: &Expr) -> Expr {
            self.0.simplify(expr)
        }
        fn is_polynomial_in(&self, expr: &Expr, var: &str) -> bool {
            self.0.is_polynomial_in(expr, var)
        }
        fn polynomial_terms(&self, _expr: &Expr, _var: &str) -> Option<BTreeMap<u32, Expr>> {
            panic!("polynomial decomposition exploded")
        }
        fn pure_power(&self, expr: &Expr, var: &str) -> Option<(Expr, f64)> {
            self.0.pure_power(expr, var)
        }
        fn evaluate_gamma(&self, z: &Expr) -> Result<Expr, GammaPole> {
            self.0.evaluate_gamma(z)
        }
        fn mellin_transform(&self, expr: &Expr, in_var: &str, out_var: &str) -> MellinOutcome {
            self.0.mellin_transform(expr, in_var, out_var)
        }
        fn inverse_mellin_transform(
            &self,
            expr: &Expr,
            in_var: &str,
            out_var: &str,
            strip: &ConvergenceStrip,
        ) -> InverseMellinOutcome {
            self.0.inverse_mellin_transform(expr, in_var, out_var, strip)
        }
        fn structurally_equal(&self, a: &Expr, b: &Expr) -> bool {
            self.0.structurally_equal(a, b)
        }
    }

    #[test]
    fn test_panicking_engine_yields_internal_error() {
        let resolver = FractionalResolver::with_engine(PanickingEngine(NativeEngine::new()));
        let result = resolver.resolve(&parse("x^2"), "x", &Order::Real(0.5));
        let error = result.error().expect("panic must become a failure");
        assert_eq!(error.kind, FailureKind::InternalError);
        assert!(error.message.contains("polynomial decomposition exploded"));
    }
}
