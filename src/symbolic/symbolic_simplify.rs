//! # Symbolic Expression Simplification Module
//!
//! Algebraic simplification of symbolic expressions, from constant folding to like-term
//! collection.
//!
//! ## Simplification Strategy
//!
//! 1. **Constant Folding**: evaluates arithmetic on numerical constants (only when the
//!    result is finite, so `0^-1` or `(-2)^0.5` stay symbolic)
//! 2. **Algebraic Identities**: x + 0 = x, x * 1 = x, x * 0 = 0, x^1 = x, x^0 = 1, u/u = 1
//! 3. **Canonical Constants**: numeric factors are pulled to the left of a product and
//!    merged, `x / 4` becomes `0.25 * x`
//! 4. **Power Rules**: x^a * x^b = x^(a+b), x^a / x^b = x^(a-b), (x^a)^b = x^(ab)
//! 5. **Gamma Evaluation**: `gamma(c)` for a numeric non-pole `c` becomes a constant;
//!    at a pole the node is left untouched
//! 6. **Polynomial Simplification**: collects like terms of monomials with integer
//!    exponents (3x + 2x = 5x); terms with non-integer exponents are never merged
//!
//! `simplify()` applies `simplify_()` until the tree stops changing or a bounded number
//! of passes is spent; hitting the bound is logged. Either way the pass sequence is
//! deterministic, so equal inputs always simplify to structurally equal outputs.

use crate::symbolic::special_functions::{gamma, is_gamma_pole};
use crate::symbolic::symbolic_engine::{Expr, Func};
use log::debug;
use std::collections::BTreeMap;

/// Upper bound on `simplify_` passes performed by `simplify()`.
const MAX_SIMPLIFY_PASSES: usize = 8;

impl Expr {
    //___________________________________SIMPLIFICATION____________________________________

    /// One bottom-up simplification pass.
    pub fn simplify_(&self) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => add_simplified(lhs.simplify_(), rhs.simplify_()),
            Expr::Sub(lhs, rhs) => sub_simplified(lhs.simplify_(), rhs.simplify_()),
            Expr::Mul(lhs, rhs) => mul_simplified(lhs.simplify_(), rhs.simplify_()),
            Expr::Div(lhs, rhs) => div_simplified(lhs.simplify_(), rhs.simplify_()),
            Expr::Pow(base, exp) => pow_simplified(base.simplify_(), exp.simplify_()),
            _ => match self.as_function() {
                Some((func, arg)) => function_simplified(func, arg.simplify_()),
                None => self.clone(),
            },
        }
    }

    /// Repeats `simplify_()` until a fixed point, at most `MAX_SIMPLIFY_PASSES` times.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let expr = Expr::parse_expression("2*x + 3*x - 0").unwrap();
    /// assert_eq!(expr.simplify(), Expr::parse_expression("5*x").unwrap());
    /// ```
    pub fn simplify(&self) -> Expr {
        let mut current = self.simplify_();
        for _ in 1..MAX_SIMPLIFY_PASSES {
            let next = current.simplify_();
            if next == current {
                return current;
            }
            current = next;
        }
        if current.simplify_() != current {
            debug!(
                "simplification stopped after {} passes before reaching a fixed point: {}",
                MAX_SIMPLIFY_PASSES, current
            );
        }
        current
    }

    /// Collects like terms in a sum whose terms are all monomials with numeric
    /// coefficients and integer exponents. Returns `None` if nothing was merged.
    fn simplify_polynomial(expr: &Expr) -> Option<Expr> {
        let mut terms = Vec::new();
        flatten_add(expr, &mut terms);
        if terms.len() < 2 {
            return None;
        }
        // first-appearance order keeps the output deterministic
        let mut collected: Vec<(MonomialKey, f64)> = Vec::new();
        for term in &terms {
            let (monomial, coeff) = extract_monomial(term)?;
            match collected.iter_mut().find(|(key, _)| *key == monomial) {
                Some((_, total)) => *total += coeff,
                None => collected.push((monomial, coeff)),
            }
        }
        if collected.len() == terms.len() {
            return None;
        }
        let result = collected
            .into_iter()
            .filter(|(_, coeff)| *coeff != 0.0)
            .map(|(monomial, coeff)| Self::build_monomial_term(&monomial, coeff))
            .reduce(|a, b| Expr::Add(Box::new(a), Box::new(b)))
            .unwrap_or(Expr::Const(0.0));
        Some(result)
    }

    /// Rebuilds `coeff * monomial`.
    fn build_monomial_term(monomial: &MonomialKey, coeff: f64) -> Expr {
        let mut factors = Vec::new();
        if coeff != 1.0 || monomial.0.is_empty() {
            factors.push(Expr::Const(coeff));
        }
        for (var, exp) in &monomial.0 {
            let var_expr = Expr::Var(var.clone());
            if *exp == 1 {
                factors.push(var_expr);
            } else {
                factors.push(Expr::Pow(Box::new(var_expr), Box::new(Expr::Const(*exp as f64))));
            }
        }
        factors
            .into_iter()
            .reduce(|a, b| Expr::Mul(Box::new(a), Box::new(b)))
            .unwrap_or(Expr::Const(1.0))
    }
}

fn add_simplified(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs.as_const(), rhs.as_const()) {
        (Some(a), Some(b)) => Expr::Const(a + b),
        (Some(a), _) if a == 0.0 => rhs,
        (_, Some(b)) if b == 0.0 => lhs,
        _ => {
            let sum = Expr::Add(Box::new(lhs), Box::new(rhs));
            Expr::simplify_polynomial(&sum).unwrap_or(sum)
        }
    }
}

fn sub_simplified(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs.as_const(), rhs.as_const()) {
        (Some(a), Some(b)) => Expr::Const(a - b),
        (_, Some(b)) if b == 0.0 => lhs,
        _ if lhs == rhs => Expr::Const(0.0),
        _ => add_simplified(lhs, mul_simplified(Expr::Const(-1.0), rhs)),
    }
}

fn mul_simplified(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs, rhs) {
        (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
        (Expr::Const(a), _) | (_, Expr::Const(a)) if a == 0.0 => Expr::Const(0.0),
        (Expr::Const(a), other) | (other, Expr::Const(a)) if a == 1.0 => other,
        (Expr::Const(c), Expr::Mul(inner_l, inner_r)) if matches!(*inner_l, Expr::Const(_)) => {
            let d = inner_l.as_const().unwrap_or(1.0);
            mul_simplified(Expr::Const(c * d), *inner_r)
        }
        (Expr::Mul(inner_l, inner_r), Expr::Const(c)) if matches!(*inner_l, Expr::Const(_)) => {
            let d = inner_l.as_const().unwrap_or(1.0);
            mul_simplified(Expr::Const(c * d), *inner_r)
        }
        (other, Expr::Const(c)) => Expr::Mul(Box::new(Expr::Const(c)), Box::new(other)),
        (Expr::Mul(inner_l, inner_r), other) if matches!(*inner_l, Expr::Const(_)) => {
            mul_simplified(*inner_l, mul_simplified(*inner_r, other))
        }
        (other, Expr::Mul(inner_l, inner_r)) if matches!(*inner_l, Expr::Const(_)) => {
            mul_simplified(*inner_l, mul_simplified(other, *inner_r))
        }
        (lhs, rhs) => match (power_parts(&lhs), power_parts(&rhs)) {
            (Some((base_l, exp_l)), Some((base_r, exp_r))) if base_l == base_r => {
                pow_simplified(base_l, add_simplified(exp_l, exp_r))
            }
            _ => Expr::Mul(Box::new(lhs), Box::new(rhs)),
        },
    }
}

fn div_simplified(lhs: Expr, rhs: Expr) -> Expr {
    match (lhs.as_const(), rhs.as_const()) {
        (Some(a), Some(b)) if b != 0.0 => return Expr::Const(a / b),
        (Some(a), _) if a == 0.0 && !rhs.is_zero() => return Expr::Const(0.0),
        (_, Some(b)) if b == 1.0 => return lhs,
        (_, Some(b)) if b != 0.0 => return mul_simplified(Expr::Const(1.0 / b), lhs),
        _ => {}
    }
    if lhs == rhs && !lhs.is_zero() {
        return Expr::Const(1.0);
    }
    if let (Some((base_l, exp_l)), Some((base_r, exp_r))) = (power_parts(&lhs), power_parts(&rhs)) {
        if base_l == base_r {
            return pow_simplified(base_l, sub_simplified(exp_l, exp_r));
        }
    }
    match lhs {
        Expr::Mul(inner_l, inner_r) if matches!(*inner_l, Expr::Const(_)) && rhs.as_const().is_none() => {
            mul_simplified(*inner_l, div_simplified(*inner_r, rhs))
        }
        lhs => Expr::Div(Box::new(lhs), Box::new(rhs)),
    }
}

fn pow_simplified(base: Expr, exp: Expr) -> Expr {
    match (base.as_const(), exp.as_const()) {
        (Some(a), Some(b)) if a.powf(b).is_finite() => return Expr::Const(a.powf(b)),
        (Some(_), Some(_)) => return Expr::Pow(Box::new(base), Box::new(exp)),
        (_, Some(b)) if b == 0.0 => return Expr::Const(1.0),
        (_, Some(b)) if b == 1.0 => return base,
        (Some(a), _) if a == 1.0 => return Expr::Const(1.0),
        _ => {}
    }
    match (base, exp.as_const()) {
        (Expr::Pow(inner_base, inner_exp), Some(b)) => match inner_exp.as_const() {
            Some(a) => pow_simplified(*inner_base, Expr::Const(a * b)),
            None => Expr::Pow(Box::new(Expr::Pow(inner_base, inner_exp)), Box::new(exp)),
        },
        (base, _) => Expr::Pow(Box::new(base), Box::new(exp)),
    }
}

fn function_simplified(func: Func, arg: Expr) -> Expr {
    match (func, &arg) {
        (Func::Exp, Expr::Const(a)) if *a == 0.0 => Expr::Const(1.0),
        (Func::Exp, Expr::Ln(inner)) => inner.as_ref().clone(),
        (Func::Ln, Expr::Const(a)) if *a == 1.0 => Expr::Const(0.0),
        (Func::Ln, Expr::Exp(inner)) => inner.as_ref().clone(),
        (Func::Sin | Func::Tg | Func::Arcsin | Func::Arctg, Expr::Const(a)) if *a == 0.0 => {
            Expr::Const(0.0)
        }
        (Func::Cos, Expr::Const(a)) if *a == 0.0 => Expr::Const(1.0),
        (Func::Arccos, Expr::Const(a)) if *a == 1.0 => Expr::Const(0.0),
        (Func::Gamma, Expr::Const(a)) if !is_gamma_pole(*a) && gamma(*a).is_finite() => {
            Expr::Const(gamma(*a))
        }
        _ => func.apply(arg),
    }
}

/// `x` as `x^1`, `x^e` as itself; anything else has no power decomposition.
fn power_parts(expr: &Expr) -> Option<(Expr, Expr)> {
    match expr {
        Expr::Var(_) => Some((expr.clone(), Expr::Const(1.0))),
        Expr::Pow(base, exp) if base.as_const().is_none() => {
            Some((base.as_ref().clone(), exp.as_ref().clone()))
        }
        _ => None,
    }
}

/// Variable part of a polynomial term (monomial): variable name → integer exponent.
///
/// - `x^2` → `MonomialKey({"x": 2})`
/// - `xy^3` → `MonomialKey({"x": 1, "y": 3})`
/// - `5` (constant) → `MonomialKey({})` (empty map)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonomialKey(pub BTreeMap<String, i32>);

/// Flatten nested Add/Sub expressions into a list of terms.
///
/// - `a - b` → `[a, -1*b]`
/// - `-1 * (x + y)` → `[-1*x, -1*y]`
fn flatten_add(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(a, b) => {
            flatten_add(a, out);
            flatten_add(b, out);
        }
        Expr::Sub(a, b) => {
            flatten_add(a, out);
            let neg_b = Expr::Mul(Box::new(Expr::Const(-1.0)), b.clone());
            flatten_add(&neg_b, out);
        }
        Expr::Mul(lhs, rhs) if matches!(lhs.as_ref(), Expr::Const(c) if *c == -1.0) => {
            match rhs.as_ref() {
                Expr::Add(a, b) => {
                    flatten_add(&Expr::Mul(Box::new(Expr::Const(-1.0)), a.clone()), out);
                    flatten_add(&Expr::Mul(Box::new(Expr::Const(-1.0)), b.clone()), out);
                }
                Expr::Sub(a, b) => {
                    flatten_add(&Expr::Mul(Box::new(Expr::Const(-1.0)), a.clone()), out);
                    flatten_add(b, out);
                }
                _ => out.push(expr.clone()),
            }
        }
        _ => out.push(expr.clone()),
    }
}

fn flatten_mul(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Mul(a, b) => {
            flatten_mul(a, out);
            flatten_mul(b, out);
        }
        _ => out.push(expr.clone()),
    }
}

/// Integer exponent of a constant, if it is one.
fn integer_exponent(exp: &Expr) -> Option<i32> {
    match exp {
        Expr::Const(n) if n.fract() == 0.0 && n.abs() <= i32::MAX as f64 => Some(*n as i32),
        _ => None,
    }
}

/// Splits a product of constants, variables and integer powers of variables into
/// its monomial and coefficient. `None` for anything else.
fn extract_monomial(expr: &Expr) -> Option<(MonomialKey, f64)> {
    let mut factors = Vec::new();
    flatten_mul(expr, &mut factors);
    let mut coeff = 1.0;
    let mut map: BTreeMap<String, i32> = BTreeMap::new();
    for factor in factors {
        match factor {
            Expr::Const(c) => coeff *= c,
            Expr::Var(v) => *map.entry(v).or_insert(0) += 1,
            Expr::Pow(base, exp) => match (*base, integer_exponent(&exp)) {
                (Expr::Var(v), Some(n)) => *map.entry(v).or_insert(0) += n,
                _ => return None,
            },
            _ => return None,
        }
    }
    map.retain(|_, exp| *exp != 0);
    Some((MonomialKey(map), coeff))
}
