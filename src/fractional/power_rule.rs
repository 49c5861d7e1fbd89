//! Term-wise differintegral of polynomials and pure powers.
//!
//! Every term `c * x^a` maps to `c * Γ(a+1)/Γ(a+1-α) * x^(a-α)`, the gamma-function
//! generalization of the power rule (Riemann-Liouville with lower terminal 0).
//!
//! - non-negative integer α = n: the ratio is the falling factorial `a(a-1)...(a-n+1)`,
//!   terms with `a < n` of a polynomial vanish, which reproduces n-fold differentiation;
//! - real α: numeric gamma ratio;
//! - complex α: complex gamma ratio, coefficient and exponent carry the symbol `I`;
//! - symbolic α: `Γ(a+1-α)` stays an unevaluated gamma node.
//!
//! Outside the integer case a pole of Γ at `a+1` or `a+1-α` fails the whole expression
//! with `UndefinedAtPole`. A gamma ratio that is not a finite non-zero number fails it
//! with `InternalError`; Γ has no zeros, so a zero ratio can only mean lost precision.

use crate::fractional::classifier::ExpressionClass;
use crate::fractional::order::Order;
use crate::fractional::result::{DifferintegralError, FailureKind};
use crate::symbolic::special_functions::{
    complex_gamma, falling_factorial, gamma_ratio, is_gamma_pole,
};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::AlgebraEngine;
use log::debug;
use num_complex::Complex64;

/// `(coefficient, exponent)` pairs of a power-like class, highest exponent first.
fn power_terms(class: &ExpressionClass) -> Option<Vec<(Expr, f64)>> {
    match class {
        ExpressionClass::Polynomial(terms) => Some(
            terms
                .iter()
                .rev()
                .map(|(k, c)| (c.clone(), *k as f64))
                .collect(),
        ),
        ExpressionClass::PurePower {
            coefficient,
            exponent,
        } => Some(vec![(coefficient.clone(), *exponent)]),
        _ => None,
    }
}

fn pole_error(argument: f64, exponent: f64, order: &Order) -> DifferintegralError {
    DifferintegralError::new(
        FailureKind::UndefinedAtPole,
        format!(
            "gamma function has a pole at {} for the term with exponent {} and order {}",
            argument, exponent, order
        ),
    )
}

/// `var^exponent`, or `None` for a zero exponent.
fn power_of_var(var: &str, exponent: Expr) -> Option<Expr> {
    if exponent.is_zero() {
        None
    } else {
        Some(Expr::Var(var.to_string()).pow(exponent))
    }
}

/// The ratio `Γ(a+1)/Γ(a+1-α)` and the new exponent `a-α` of one term.
/// `Ok(None)` when the term vanishes.
fn term_factors<E: AlgebraEngine + ?Sized>(
    engine: &E,
    exponent: f64,
    order: &Order,
) -> Result<Option<(Expr, Expr)>, DifferintegralError> {
    let a = exponent;
    // D^n var^a = a(a-1)...(a-n+1) var^(a-n) holds for every real a
    if let Some(n) = order.as_nonnegative_integer() {
        let ratio = falling_factorial(a, n);
        if ratio == 0.0 {
            return Ok(None);
        }
        return Ok(Some((Expr::Const(ratio), Expr::Const(a - n as f64))));
    }
    if is_gamma_pole(a + 1.0) {
        return Err(pole_error(a + 1.0, a, order));
    }
    match order {
        Order::Integer(_) | Order::Rational(_, _) | Order::Real(_) => {
            let alpha = order.exact_real().unwrap_or(f64::NAN);
            let ratio = gamma_ratio(a + 1.0, a + 1.0 - alpha)
                .map_err(|pole| pole_error(pole.argument, a, order))?;
            if ratio == 0.0 || !ratio.is_finite() {
                return Err(DifferintegralError::new(
                    FailureKind::InternalError,
                    format!(
                        "gamma({})/gamma({}) evaluates to {} for the term with exponent {}",
                        a + 1.0,
                        a + 1.0 - alpha,
                        ratio,
                        a
                    ),
                ));
            }
            Ok(Some((Expr::Const(ratio), Expr::Const(a - alpha))))
        }
        Order::Complex(alpha) => {
            let shifted = Complex64::new(a + 1.0, 0.0) - alpha;
            if shifted.im == 0.0 && is_gamma_pole(shifted.re) {
                return Err(pole_error(shifted.re, a, order));
            }
            let ratio = complex_gamma(Complex64::new(a + 1.0, 0.0)) / complex_gamma(shifted);
            let ratio_expr = Expr::Const(ratio.re) + Expr::Const(ratio.im) * Expr::imaginary_unit();
            let exponent_expr =
                Expr::Const(a - alpha.re) - Expr::Const(alpha.im) * Expr::imaginary_unit();
            Ok(Some((ratio_expr, exponent_expr)))
        }
        Order::Symbolic(alpha) => {
            let numerator = engine
                .evaluate_gamma(&Expr::Const(a + 1.0))
                .map_err(|pole| pole_error(pole.argument, a, order))?;
            let denominator = engine
                .evaluate_gamma(&(Expr::Const(a + 1.0) - alpha.clone()))
                .map_err(|pole| pole_error(pole.argument, a, order))?;
            let exponent_expr = engine.simplify(&(Expr::Const(a) - alpha.clone()));
            Ok(Some((numerator / denominator, exponent_expr)))
        }
    }
}

/// Differintegral of a polynomial or pure power of `var`.
///
/// # Examples
/// ```rust, ignore
/// let engine = NativeEngine::new();
/// let x3 = Expr::parse_expression("x^3").unwrap();
/// let class = classify(&engine, &x3, "x");
/// // Γ(4)/Γ(3.5) * x^2.5
/// let half = power_rule(&engine, &class, "x", &Order::Real(0.5)).unwrap();
/// ```
pub fn power_rule<E: AlgebraEngine + ?Sized>(
    engine: &E,
    class: &ExpressionClass,
    var: &str,
    order: &Order,
) -> Result<Expr, DifferintegralError> {
    let terms = power_terms(class).ok_or_else(|| {
        DifferintegralError::new(
            FailureKind::InternalError,
            format!("power rule called on {}", class),
        )
    })?;
    let mut sum: Option<Expr> = None;
    for (coefficient, exponent) in terms {
        let Some((ratio, new_exponent)) = term_factors(engine, exponent, order)? else {
            debug!("term with exponent {} vanishes at order {}", exponent, order);
            continue;
        };
        let mut term = coefficient * ratio;
        if let Some(power) = power_of_var(var, engine.simplify(&new_exponent)) {
            term = term * power;
        }
        sum = Some(match sum {
            Some(acc) => acc + term,
            None => term,
        });
    }
    Ok(engine.simplify(&sum.unwrap_or(Expr::Const(0.0))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractional::classifier::classify;
    use crate::symbolic::special_functions::gamma;
    use crate::symbolic::symbolic_traits::NativeEngine;
    use approx::assert_relative_eq;

    fn apply(input: &str, order: Order) -> Result<Expr, DifferintegralError> {
        let engine = NativeEngine::new();
        let expr = Expr::parse_expression(input).unwrap();
        let class = classify(&engine, &expr, "x");
        power_rule(&engine, &class, "x", &order)
    }

    #[test]
    fn test_cube_half_derivative() {
        let result = apply("x^3", Order::Real(0.5)).unwrap();
        let expected = Expr::Mul(
            Box::new(Expr::Const(gamma(4.0) / gamma(3.5))),
            Box::new(Expr::Var("x".to_string()).pow(Expr::Const(2.5))),
        );
        assert_eq!(result, expected);
    }

    #[test]
    fn test_integer_order_is_falling_factorial() {
        let result = apply("3*x^4 + 2*x^2 + 5", Order::Integer(2)).unwrap();
        // 36x^2 + 4
        for x in [0.5, 1.0, 2.0] {
            assert_relative_eq!(
                result.eval_expression(&["x"], &[x]),
                36.0 * x * x + 4.0,
                epsilon = 1e-12
            );
        }
        assert_eq!(apply("x^2", Order::Integer(3)).unwrap(), Expr::Const(0.0));
    }

    #[test]
    fn test_rational_order_matches_real() {
        let rational = apply("x^2", Order::Rational(1, 2)).unwrap();
        let real = apply("x^2", Order::Real(0.5)).unwrap();
        assert_eq!(rational, real);
    }

    #[test]
    fn test_constant_half_derivative() {
        // D^0.5 c = c / Γ(0.5) x^-0.5
        let result = apply("2", Order::Real(0.5)).unwrap();
        assert_relative_eq!(
            result.eval_expression(&["x"], &[4.0]),
            2.0 / gamma(0.5) * 0.5,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_negative_order_integrates() {
        // D^-1 x = x^2 / 2
        let result = apply("x", Order::Integer(-1)).unwrap();
        assert_relative_eq!(result.eval_expression(&["x"], &[3.0]), 4.5, epsilon = 1e-12);
    }

    #[test]
    fn test_poles() {
        let error = apply("1/x", Order::Real(0.5)).unwrap_err();
        assert_eq!(error.kind, FailureKind::UndefinedAtPole);
        let error = apply("sqrt(x)", Order::Real(1.5)).unwrap_err();
        assert_eq!(error.kind, FailureKind::UndefinedAtPole);
    }

    #[test]
    fn test_large_exponents_keep_their_coefficient() {
        // Γ(144)/Γ(143.5) is about 11.99
        let result = apply("x^143", Order::Real(0.5)).unwrap();
        assert!(result.contains_variable("x"));
        let coefficient = result.eval_expression(&["x"], &[1.0]);
        assert!(coefficient > 11.9 && coefficient < 12.0, "coefficient {}", coefficient);

        // Γ(161)/Γ(161.5) is about 0.0789
        let result = apply("x^160", Order::Real(-0.5)).unwrap();
        let coefficient = result.eval_expression(&["x"], &[1.0]);
        assert!(coefficient > 0.078 && coefficient < 0.079, "coefficient {}", coefficient);

        let result = apply("x^200", Order::Integer(1)).unwrap();
        assert_relative_eq!(result.eval_expression(&["x"], &[1.0]), 200.0);
    }

    #[test]
    fn test_integer_order_of_reciprocal() {
        // no gamma function is involved for non-negative integer orders
        let identity = apply("1/x", Order::Integer(0)).unwrap();
        assert_relative_eq!(identity.eval_expression(&["x"], &[4.0]), 0.25, epsilon = 1e-12);
        let first = apply("1/x", Order::Integer(1)).unwrap();
        assert_relative_eq!(first.eval_expression(&["x"], &[2.0]), -0.25, epsilon = 1e-12);
        let second = apply("3/x", Order::Real(2.0)).unwrap();
        assert_relative_eq!(second.eval_expression(&["x"], &[1.0]), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_complex_order() {
        let result = apply("x^2", Order::Complex(Complex64::new(0.5, 1.0))).unwrap();
        assert!(result.contains_variable("I"));
        assert!(result.contains_variable("x"));
    }

    #[test]
    fn test_complex_order_with_zero_imaginary_part() {
        let result = apply("x^2", Order::Complex(Complex64::new(0.5, 0.0))).unwrap();
        assert!(!result.contains_variable("I"));
        assert_relative_eq!(
            result.eval_expression(&["x"], &[2.0]),
            gamma(3.0) / gamma(2.5) * 2f64.powf(1.5),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_symbolic_order_keeps_gamma_node() {
        let alpha = Expr::Var("alpha".to_string());
        let result = apply("x^2", Order::Symbolic(alpha)).unwrap();
        assert!(result.contains_variable("alpha"));
        let value = result.eval_expression(&["x", "alpha"], &[2.0, 0.5]);
        assert_relative_eq!(value, gamma(3.0) / gamma(2.5) * 2f64.powf(1.5), epsilon = 1e-10);
    }
}
