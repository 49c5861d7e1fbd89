//! # Symbolic Engine Derivatives Module
//!
//! Classical (integer-order) analytical differentiation and direct numerical evaluation
//! of [`Expr`] trees.
//!
//! ## Key Methods
//!
//! ### Differentiation
//! - `diff(var: &str)` - Analytical partial/total derivative
//! - `n_th_derivative1D()` - Higher-order derivatives
//!
//! ### Function evaluation
//! - `eval_expression()` - Direct evaluation of an expression at a point
//!
//! ## Interesting Code Features
//!
//! 1. **Recursive Differentiation Rules**: product rule, quotient rule, chain rule and
//!    the general power rule `d(u^v) = u^v (v' ln u + v u'/u)` when the exponent
//!    depends on the variable
//!
//! 2. **Gamma nodes**: a gamma node whose argument is free of the variable is a constant;
//!    differentiating one that depends on the variable needs the digamma function, which
//!    the engine does not provide, so that case panics with an explicit message

use crate::symbolic::special_functions::gamma;
use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;

impl Expr {
    /// DIFFERENTIATION

    /// Computes the analytical derivative of the expression with respect to a variable.
    ///
    /// Implements all standard differentiation rules from calculus:
    /// - Power rule: d/dx(x^n) = n*x^(n-1)
    /// - Product rule: d/dx(f*g) = f'*g + f*g'
    /// - Quotient rule: d/dx(f/g) = (f'*g - f*g')/g^2
    /// - Chain rule: d/dx(f(g(x))) = f'(g(x))*g'(x)
    ///
    /// The result is not simplified; call `simplify()` on it.
    ///
    /// # Panics
    /// Panics on `Gamma(u)` where `u` depends on `var`.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let x = Expr::Var("x".to_string());
    /// let f = x.clone().pow(Expr::Const(2.0)); // x^2
    /// let df_dx = f.diff("x").simplify(); // 2*x
    /// ```
    pub fn diff(&self, var: &str) -> Expr {
        match self {
            Expr::Var(name) => {
                if name == var {
                    Expr::Const(1.0)
                } else {
                    Expr::Const(0.0)
                }
            }
            Expr::Const(_) => Expr::Const(0.0),
            Expr::Add(lhs, rhs) => Expr::Add(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Sub(lhs, rhs) => Expr::Sub(Box::new(lhs.diff(var)), Box::new(rhs.diff(var))),
            Expr::Mul(lhs, rhs) => Expr::Add(
                Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                Box::new(Expr::Mul(lhs.clone(), Box::new(rhs.diff(var)))),
            ),
            Expr::Div(lhs, rhs) => Expr::Div(
                Box::new(Expr::Sub(
                    Box::new(Expr::Mul(Box::new(lhs.diff(var)), rhs.clone())),
                    Box::new(Expr::Mul(Box::new(rhs.diff(var)), lhs.clone())),
                )),
                Box::new(Expr::Mul(rhs.clone(), rhs.clone())),
            ),
            Expr::Pow(base, exp) if exp.contains_variable(var) => {
                // u^v * (v' * ln(u) + v * u' / u)
                let log_part = Expr::Mul(Box::new(exp.diff(var)), Box::new(Expr::Ln(base.clone())));
                let base_part = Expr::Div(
                    Box::new(Expr::Mul(exp.clone(), Box::new(base.diff(var)))),
                    base.clone(),
                );
                Expr::Mul(
                    Box::new(self.clone()),
                    Box::new(Expr::Add(Box::new(log_part), Box::new(base_part))),
                )
            }
            Expr::Pow(base, exp) => Expr::Mul(
                Box::new(Expr::Mul(
                    exp.clone(),
                    Box::new(Expr::Pow(
                        base.clone(),
                        Box::new(Expr::Sub(exp.clone(), Box::new(Expr::Const(1.0)))),
                    )),
                )),
                Box::new(base.diff(var)),
            ),
            Expr::Exp(expr) => {
                Expr::Mul(Box::new(Expr::Exp(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::Ln(expr) => Expr::Div(Box::new(expr.diff(var)), expr.clone()),
            Expr::sin(expr) => {
                Expr::Mul(Box::new(Expr::cos(expr.clone())), Box::new(expr.diff(var)))
            }
            Expr::cos(expr) => Expr::Mul(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::sin(expr.clone())),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::tg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::cos(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::ctg(expr) => Expr::Mul(
                Box::new(Expr::Div(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(Expr::Pow(
                        Box::new(Expr::sin(expr.clone())),
                        Box::new(Expr::Const(2.0)),
                    )),
                )),
                Box::new(expr.diff(var)),
            ),
            Expr::arcsin(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arccos(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Pow(
                    Box::new(Expr::Sub(
                        Box::new(Expr::Const(1.0)),
                        Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                    )),
                    Box::new(Expr::Const(0.5)),
                )),
            ),
            Expr::arctg(expr) => Expr::Div(
                Box::new(expr.diff(var)),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::arcctg(expr) => Expr::Div(
                Box::new(Expr::Mul(
                    Box::new(Expr::Const(-1.0)),
                    Box::new(expr.diff(var)),
                )),
                Box::new(Expr::Add(
                    Box::new(Expr::Const(1.0)),
                    Box::new(Expr::Pow(expr.clone(), Box::new(Expr::Const(2.0)))),
                )),
            ),
            Expr::Gamma(expr) => {
                if expr.contains_variable(var) {
                    panic!(
                        "cannot differentiate gamma({}) with respect to {}: digamma is not supported",
                        expr, var
                    );
                }
                Expr::Const(0.0)
            }
        }
    } // end of diff

    /// Computes the n-th derivative with respect to `var_name`, simplifying after each step.
    pub fn n_th_derivative1D(&self, var_name: &str, n: usize) -> Expr {
        let mut expr = self.clone();
        for _ in 0..n {
            expr = expr.diff(var_name).simplify();
        }
        expr
    }

    /// Evaluates the expression numerically.
    ///
    /// # Arguments
    /// * `vars` - Variable names in order matching values array
    /// * `values` - Numerical values for each variable
    ///
    /// # Panics
    /// Panics if the expression contains a variable missing from `vars`.
    pub fn eval_expression(&self, vars: &[&str], values: &[f64]) -> f64 {
        match self {
            Expr::Var(name) => match vars.iter().position(|&x| x == name) {
                Some(index) => values[index],
                None => panic!("variable {} has no value", name),
            },
            Expr::Const(val) => *val,
            Expr::Add(lhs, rhs) => lhs.eval_expression(vars, values) + rhs.eval_expression(vars, values),
            Expr::Sub(lhs, rhs) => lhs.eval_expression(vars, values) - rhs.eval_expression(vars, values),
            Expr::Mul(lhs, rhs) => lhs.eval_expression(vars, values) * rhs.eval_expression(vars, values),
            Expr::Div(lhs, rhs) => lhs.eval_expression(vars, values) / rhs.eval_expression(vars, values),
            Expr::Pow(base, exp) => {
                let base_fn = base.eval_expression(vars, values);
                let exp_fn = exp.eval_expression(vars, values);
                base_fn.powf(exp_fn)
            }
            Expr::Exp(expr) => expr.eval_expression(vars, values).exp(),
            Expr::Ln(expr) => expr.eval_expression(vars, values).ln(),
            Expr::sin(expr) => expr.eval_expression(vars, values).sin(),
            Expr::cos(expr) => expr.eval_expression(vars, values).cos(),
            Expr::tg(expr) => expr.eval_expression(vars, values).tan(),
            Expr::ctg(expr) => 1.0 / expr.eval_expression(vars, values).tan(),
            Expr::arcsin(expr) => expr.eval_expression(vars, values).asin(),
            Expr::arccos(expr) => expr.eval_expression(vars, values).acos(),
            Expr::arctg(expr) => expr.eval_expression(vars, values).atan(),
            Expr::arcctg(expr) => PI / 2.0 - expr.eval_expression(vars, values).atan(),
            Expr::Gamma(expr) => gamma(expr.eval_expression(vars, values)),
        }
    } // end of eval_expression
}
