//! Decides which solvable shape an expression has with respect to the differentiation
//! variable. Checks run from the most to the least specific tier: polynomial, pure power,
//! named elementary function.

use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::AlgebraEngine;
use std::collections::BTreeMap;
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// Elementary functions with entries in the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum NamedFunction {
    #[strum(serialize = "sin")]
    Sin,
    #[strum(serialize = "cos")]
    Cos,
    #[strum(serialize = "exp")]
    Exp,
    #[strum(serialize = "log")]
    Log,
}

impl NamedFunction {
    /// `f(var)`
    pub fn of_variable(self, var: &str) -> Expr {
        let arg = Expr::Var(var.to_string());
        match self {
            NamedFunction::Sin => Expr::sin(arg.boxed()),
            NamedFunction::Cos => Expr::cos(arg.boxed()),
            NamedFunction::Exp => arg.exp(),
            NamedFunction::Log => arg.ln(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionClass {
    /// exponent -> coefficient
    Polynomial(BTreeMap<u32, Expr>),
    /// `coefficient * var^exponent`
    PurePower { coefficient: Expr, exponent: f64 },
    Named(NamedFunction),
    Unclassified,
}

impl ExpressionClass {
    /// Whether the term-wise power rule applies.
    pub fn is_power_like(&self) -> bool {
        matches!(
            self,
            ExpressionClass::Polynomial(_) | ExpressionClass::PurePower { .. }
        )
    }
}

impl fmt::Display for ExpressionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionClass::Polynomial(terms) => {
                let degree = terms.keys().next_back().copied().unwrap_or(0);
                write!(f, "polynomial of degree {}", degree)
            }
            ExpressionClass::PurePower { exponent, .. } => write!(f, "pure power ^{}", exponent),
            ExpressionClass::Named(function) => write!(f, "named function {}", function),
            ExpressionClass::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Exact structural match of `f(var)`; nested arguments such as `sin(2x)` do not count.
pub fn named_function(expr: &Expr, var: &str) -> Option<NamedFunction> {
    if expr.as_function().is_none() {
        return None;
    }
    NamedFunction::iter().find(|function| function.of_variable(var) == *expr)
}

/// Classifies `expr` with respect to `var`. Never fails: anything unrecognised is
/// `Unclassified`.
pub fn classify<E: AlgebraEngine + ?Sized>(engine: &E, expr: &Expr, var: &str) -> ExpressionClass {
    if let Some(terms) = engine.polynomial_terms(expr, var) {
        return ExpressionClass::Polynomial(terms);
    }
    if let Some((coefficient, exponent)) = engine.pure_power(expr, var) {
        return ExpressionClass::PurePower {
            coefficient,
            exponent,
        };
    }
    match named_function(expr, var) {
        Some(function) => ExpressionClass::Named(function),
        None => ExpressionClass::Unclassified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_traits::NativeEngine;

    fn classify_str(input: &str) -> ExpressionClass {
        let expr = Expr::parse_expression(input).unwrap();
        classify(&NativeEngine::new(), &expr, "x")
    }

    #[test]
    fn test_polynomial_first() {
        match classify_str("3*x^4 + 2*x^2 + 5") {
            ExpressionClass::Polynomial(terms) => {
                assert_eq!(terms.keys().copied().collect::<Vec<_>>(), vec![0, 2, 4])
            }
            other => panic!("expected polynomial, got {}", other),
        }
        // monomials are polynomials before they are pure powers
        assert!(matches!(classify_str("x^3"), ExpressionClass::Polynomial(_)));
        assert!(matches!(classify_str("sin(y)"), ExpressionClass::Polynomial(_)));
    }

    #[test]
    fn test_pure_power() {
        assert_eq!(
            classify_str("sqrt(x)"),
            ExpressionClass::PurePower {
                coefficient: Expr::Const(1.0),
                exponent: 0.5
            }
        );
        assert_eq!(
            classify_str("3/x"),
            ExpressionClass::PurePower {
                coefficient: Expr::Const(3.0),
                exponent: -1.0
            }
        );
    }

    #[test]
    fn test_named_functions() {
        assert_eq!(classify_str("sin(x)"), ExpressionClass::Named(NamedFunction::Sin));
        assert_eq!(classify_str("cos(x)"), ExpressionClass::Named(NamedFunction::Cos));
        assert_eq!(classify_str("exp(x)"), ExpressionClass::Named(NamedFunction::Exp));
        assert_eq!(classify_str("log(x)"), ExpressionClass::Named(NamedFunction::Log));
        for function in NamedFunction::iter() {
            assert_eq!(named_function(&function.of_variable("t"), "t"), Some(function));
            assert_eq!(named_function(&function.of_variable("t"), "x"), None);
        }
    }

    #[test]
    fn test_unclassified() {
        for input in ["sin(2x)", "exp(-x)", "x*sin(x)", "2*exp(x)", "tg(x)", "x^-0.5*exp(-x)"] {
            assert_eq!(
                classify_str(input),
                ExpressionClass::Unclassified,
                "{} should be unclassified",
                input
            );
        }
    }
}
