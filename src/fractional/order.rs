//! Order of a differintegral.
//!
//! The order keeps the form it was given in: a rational `1/2` stays rational, a complex
//! order with zero imaginary part stays complex. Only `exact_real` looks through the
//! integer, rational and real forms.

use crate::fractional::result::{DifferintegralError, FailureKind};
use crate::symbolic::symbolic_engine::Expr;
use num_complex::Complex64;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Integer(i64),
    /// numerator, denominator
    Rational(i64, i64),
    Real(f64),
    Complex(Complex64),
    Symbolic(Expr),
}

impl Order {
    /// Exact real value of integer, rational and real orders. Complex and symbolic orders
    /// are never coerced, even with zero imaginary part.
    pub fn exact_real(&self) -> Option<f64> {
        match self {
            Order::Integer(n) => Some(*n as f64),
            Order::Rational(p, q) if *q != 0 => Some(*p as f64 / *q as f64),
            Order::Real(value) => Some(*value),
            _ => None,
        }
    }

    /// `Some(n)` when the order is a real non-negative integer.
    pub fn as_nonnegative_integer(&self) -> Option<u64> {
        let value = self.exact_real()?;
        if value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
            Some(value as u64)
        } else {
            None
        }
    }

    /// The order as an expression; a complex order becomes `re + im*I`.
    pub fn to_expr(&self) -> Expr {
        match self {
            Order::Complex(z) => {
                Expr::Const(z.re) + Expr::Const(z.im) * Expr::imaginary_unit()
            }
            Order::Symbolic(expr) => expr.clone(),
            _ => Expr::Const(self.exact_real().unwrap_or(f64::NAN)),
        }
    }

    /// Rejects orders no tier can work with.
    pub fn validate(&self, var: &str) -> Result<(), DifferintegralError> {
        let unsupported = |message: String| {
            Err(DifferintegralError::new(FailureKind::UnsupportedOrder, message))
        };
        match self {
            Order::Integer(_) => Ok(()),
            Order::Rational(_, 0) => unsupported(format!("order {} has a zero denominator", self)),
            Order::Rational(_, _) => Ok(()),
            Order::Real(value) if !value.is_finite() => {
                unsupported(format!("order {} is not a finite number", value))
            }
            Order::Real(_) => Ok(()),
            Order::Complex(z) if !(z.re.is_finite() && z.im.is_finite()) => {
                unsupported(format!("complex order {} has a non-finite part", z))
            }
            Order::Complex(_) => Ok(()),
            Order::Symbolic(expr) if expr.contains_variable(var) => unsupported(format!(
                "symbolic order {} depends on the differentiation variable {}",
                expr, var
            )),
            Order::Symbolic(_) => Ok(()),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Order::Integer(n) => write!(f, "{}", n),
            Order::Rational(p, q) => write!(f, "{}/{}", p, q),
            Order::Real(value) => write!(f, "{}", value),
            Order::Complex(z) => write!(f, "{}", z),
            Order::Symbolic(expr) => write!(f, "{}", expr),
        }
    }
}

impl From<i64> for Order {
    fn from(value: i64) -> Self {
        Order::Integer(value)
    }
}

impl From<f64> for Order {
    fn from(value: f64) -> Self {
        Order::Real(value)
    }
}

impl From<Complex64> for Order {
    fn from(value: Complex64) -> Self {
        Order::Complex(value)
    }
}

impl From<Expr> for Order {
    fn from(value: Expr) -> Self {
        Order::Symbolic(value)
    }
}
