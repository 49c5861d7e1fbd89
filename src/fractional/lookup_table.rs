//! Curated closed forms of elementary functions at specific orders.
//!
//! | shape    | order | closed form         |
//! |----------|-------|---------------------|
//! | `sin(x)` | 0.5   | `sin(x + π/4)`      |
//! | `sin(x)` | 1.5   | `sin(x + 3π/4)`     |
//! | `cos(x)` | 0.5   | `cos(x + π/4)`      |
//! | `cos(x)` | 1.5   | `cos(x + 3π/4)`     |
//! | `exp(x)` | any   | `x^(-α) exp(x)`     |
//! | `log(x)` | 0.5   | `ln(4x) / √(πx)`    |
//! | `log(x)` | 1     | `1/x`               |
//!
//! Matching is exact on both the shape and the order value; there is no interpolation
//! between table orders.

use crate::fractional::classifier::{ExpressionClass, NamedFunction};
use crate::fractional::order::Order;
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::AlgebraEngine;
use std::f64::consts::PI;

/// Order an entry applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TableOrder {
    /// integer, rational or real order with exactly this value
    Exactly(f64),
    /// every order, complex and symbolic included
    Any,
}

impl TableOrder {
    fn matches(&self, order: &Order) -> bool {
        match self {
            TableOrder::Any => true,
            TableOrder::Exactly(value) => order.exact_real() == Some(*value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClosedForm {
    /// `f(x + shift)`
    PhaseShift(f64),
    /// `x^(-α) exp(x)`
    ScaledExp,
    /// `ln(4x) / √(πx)`
    HalfLog,
    /// `1/x`
    Reciprocal,
}

#[derive(Debug, Clone, Copy)]
struct TableEntry {
    shape: NamedFunction,
    order: TableOrder,
    form: ClosedForm,
}

const TABLE: [TableEntry; 7] = [
    TableEntry {
        shape: NamedFunction::Sin,
        order: TableOrder::Exactly(0.5),
        form: ClosedForm::PhaseShift(PI / 4.0),
    },
    TableEntry {
        shape: NamedFunction::Sin,
        order: TableOrder::Exactly(1.5),
        form: ClosedForm::PhaseShift(3.0 * PI / 4.0),
    },
    TableEntry {
        shape: NamedFunction::Cos,
        order: TableOrder::Exactly(0.5),
        form: ClosedForm::PhaseShift(PI / 4.0),
    },
    TableEntry {
        shape: NamedFunction::Cos,
        order: TableOrder::Exactly(1.5),
        form: ClosedForm::PhaseShift(3.0 * PI / 4.0),
    },
    TableEntry {
        shape: NamedFunction::Exp,
        order: TableOrder::Any,
        form: ClosedForm::ScaledExp,
    },
    TableEntry {
        shape: NamedFunction::Log,
        order: TableOrder::Exactly(0.5),
        form: ClosedForm::HalfLog,
    },
    TableEntry {
        shape: NamedFunction::Log,
        order: TableOrder::Exactly(1.0),
        form: ClosedForm::Reciprocal,
    },
];

fn build(shape: NamedFunction, form: ClosedForm, var: &str, order: &Order) -> Expr {
    let x = Expr::Var(var.to_string());
    match form {
        ClosedForm::PhaseShift(shift) => {
            let arg = Box::new(x + Expr::Const(shift));
            match shape {
                NamedFunction::Cos => Expr::cos(arg),
                _ => Expr::sin(arg),
            }
        }
        ClosedForm::ScaledExp => x.clone().pow(-order.to_expr()) * x.exp(),
        ClosedForm::HalfLog => {
            (Expr::Const(4.0) * x.clone()).ln() / (Expr::Const(PI) * x).pow(Expr::Const(0.5))
        }
        ClosedForm::Reciprocal => Expr::Const(1.0) / x,
    }
}

/// Closed form for a named shape at `order`, simplified; `None` on a table miss.
pub fn lookup<E: AlgebraEngine + ?Sized>(
    engine: &E,
    class: &ExpressionClass,
    var: &str,
    order: &Order,
) -> Option<Expr> {
    let ExpressionClass::Named(shape) = class else {
        return None;
    };
    TABLE
        .iter()
        .find(|entry| entry.shape == *shape && entry.order.matches(order))
        .map(|entry| engine.simplify(&build(entry.shape, entry.form, var, order)))
}
