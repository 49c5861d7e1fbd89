//! Polynomial and pure-power decomposition of expressions with respect to one variable.
//!
//! - `polynomial_terms(var)` returns `{k → c_k}` for `Σ c_k var^k` with non-negative
//!   integer `k` and `var`-free (possibly symbolic) coefficients. A `var`-free expression
//!   is the degree-0 polynomial.
//! - `pure_power(var)` returns `(coeff, a)` for `coeff · var^a` with real numeric `a`.

use crate::symbolic::symbolic_engine::Expr;
use std::collections::BTreeMap;

/// Degree bound for expanding integer powers of sums.
const MAX_EXPANDED_DEGREE: f64 = 64.0;

impl Expr {
    /// Whether the expression is a polynomial in `var`.
    pub fn is_polynomial_in(&self, var: &str) -> bool {
        self.polynomial_terms(var).is_some()
    }

    /// Exponent → simplified coefficient; zero coefficients are dropped.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let p = Expr::parse_expression("3*x^2 + a*x + 1").unwrap();
    /// let terms = p.polynomial_terms("x").unwrap();
    /// assert_eq!(terms.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    /// ```
    pub fn polynomial_terms(&self, var: &str) -> Option<BTreeMap<u32, Expr>> {
        let raw = self.raw_polynomial_terms(var)?;
        let terms = raw
            .into_iter()
            .map(|(k, c)| (k, c.simplify()))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        Some(terms)
    }

    fn raw_polynomial_terms(&self, var: &str) -> Option<BTreeMap<u32, Expr>> {
        if !self.contains_variable(var) {
            return Some(BTreeMap::from([(0, self.clone())]));
        }
        match self {
            Expr::Var(_) => Some(BTreeMap::from([(1, Expr::Const(1.0))])),
            Expr::Add(lhs, rhs) => Some(merge_terms(
                lhs.raw_polynomial_terms(var)?,
                rhs.raw_polynomial_terms(var)?,
                false,
            )),
            Expr::Sub(lhs, rhs) => Some(merge_terms(
                lhs.raw_polynomial_terms(var)?,
                rhs.raw_polynomial_terms(var)?,
                true,
            )),
            Expr::Mul(lhs, rhs) => Some(convolve_terms(
                &lhs.raw_polynomial_terms(var)?,
                &rhs.raw_polynomial_terms(var)?,
            )),
            Expr::Div(lhs, rhs) if !rhs.contains_variable(var) => {
                let numerator = lhs.raw_polynomial_terms(var)?;
                Some(
                    numerator
                        .into_iter()
                        .map(|(k, c)| (k, (c / rhs.as_ref().clone()).simplify()))
                        .collect(),
                )
            }
            Expr::Pow(base, exp) if !exp.contains_variable(var) => {
                let n = match exp.simplify() {
                    Expr::Const(n) if n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 => n,
                    _ => return None,
                };
                // a bare monomial needs no expansion
                if matches!(base.as_ref(), Expr::Var(name) if name == var) {
                    return Some(BTreeMap::from([(n as u32, Expr::Const(1.0))]));
                }
                if n > MAX_EXPANDED_DEGREE {
                    return None;
                }
                let n = n as u32;
                let base_terms = base.raw_polynomial_terms(var)?;
                let mut result = BTreeMap::from([(0, Expr::Const(1.0))]);
                for _ in 0..n {
                    result = convolve_terms(&result, &base_terms);
                }
                Some(result)
            }
            _ => None,
        }
    }

    /// `(coeff, a)` such that the expression equals `coeff · var^a`, with `coeff` free of
    /// `var` and `a` a finite real constant. `None` when the expression is not of that
    /// shape, including `var`-free expressions.
    pub fn pure_power(&self, var: &str) -> Option<(Expr, f64)> {
        let (coeff, exponent) = self.raw_pure_power(var)?;
        if !exponent.is_finite() {
            return None;
        }
        Some((coeff.simplify(), exponent))
    }

    fn raw_pure_power(&self, var: &str) -> Option<(Expr, f64)> {
        match self {
            Expr::Var(name) if name == var => Some((Expr::Const(1.0), 1.0)),
            Expr::Pow(base, exp) => {
                let a = exp.simplify().as_const()?;
                let (coeff, p) = base.raw_pure_power(var)?;
                Some((coeff.pow(Expr::Const(a)), p * a))
            }
            Expr::Mul(lhs, rhs) => match (lhs.contains_variable(var), rhs.contains_variable(var)) {
                (false, true) => {
                    let (coeff, p) = rhs.raw_pure_power(var)?;
                    Some((lhs.as_ref().clone() * coeff, p))
                }
                (true, false) => {
                    let (coeff, p) = lhs.raw_pure_power(var)?;
                    Some((coeff * rhs.as_ref().clone(), p))
                }
                (true, true) => {
                    let (c1, p1) = lhs.raw_pure_power(var)?;
                    let (c2, p2) = rhs.raw_pure_power(var)?;
                    Some((c1 * c2, p1 + p2))
                }
                (false, false) => None,
            },
            Expr::Div(lhs, rhs) => match (lhs.contains_variable(var), rhs.contains_variable(var)) {
                (true, false) => {
                    let (coeff, p) = lhs.raw_pure_power(var)?;
                    Some((coeff / rhs.as_ref().clone(), p))
                }
                (false, true) => {
                    let (coeff, p) = rhs.raw_pure_power(var)?;
                    Some((lhs.as_ref().clone() / coeff, -p))
                }
                (true, true) => {
                    let (c1, p1) = lhs.raw_pure_power(var)?;
                    let (c2, p2) = rhs.raw_pure_power(var)?;
                    Some((c1 / c2, p1 - p2))
                }
                (false, false) => None,
            },
            _ => None,
        }
    }
}

fn merge_terms(
    mut lhs: BTreeMap<u32, Expr>,
    rhs: BTreeMap<u32, Expr>,
    subtract: bool,
) -> BTreeMap<u32, Expr> {
    for (k, c) in rhs {
        let c = if subtract { -c } else { c };
        let merged = match lhs.remove(&k) {
            Some(existing) => (existing + c).simplify(),
            None => c.simplify(),
        };
        lhs.insert(k, merged);
    }
    lhs
}

fn convolve_terms(lhs: &BTreeMap<u32, Expr>, rhs: &BTreeMap<u32, Expr>) -> BTreeMap<u32, Expr> {
    let mut result: BTreeMap<u32, Expr> = BTreeMap::new();
    for (k1, c1) in lhs {
        for (k2, c2) in rhs {
            let product = (c1.clone() * c2.clone()).simplify();
            let merged = match result.remove(&(k1 + k2)) {
                Some(existing) => (existing + product).simplify(),
                None => product,
            };
            result.insert(k1 + k2, merged);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    #[test]
    fn test_polynomial_terms_basic() {
        let terms = parse("3*x^4 + 2*x^2 + 5").polynomial_terms("x").unwrap();
        assert_eq!(terms.len(), 3);
        assert_eq!(terms[&4], Expr::Const(3.0));
        assert_eq!(terms[&2], Expr::Const(2.0));
        assert_eq!(terms[&0], Expr::Const(5.0));
    }

    #[test]
    fn test_polynomial_expansion_and_cancellation() {
        let terms = parse("(x + 1)^2 - x^2").polynomial_terms("x").unwrap();
        assert_eq!(terms.len(), 2);
        assert_eq!(terms[&1], Expr::Const(2.0));
        assert_eq!(terms[&0], Expr::Const(1.0));
    }

    #[test]
    fn test_high_degree_monomials() {
        let terms = parse("x^65 + 1").polynomial_terms("x").unwrap();
        assert_eq!(terms.keys().copied().collect::<Vec<_>>(), vec![0, 65]);
        assert_eq!(terms[&65], Expr::Const(1.0));
        let terms = parse("2*x^200").polynomial_terms("x").unwrap();
        assert_eq!(terms[&200], Expr::Const(2.0));
        // expanding a sum stays bounded
        assert!(!parse("(x + 1)^65").is_polynomial_in("x"));
    }

    #[test]
    fn test_symbolic_coefficients() {
        let terms = parse("a*x^2 + b").polynomial_terms("x").unwrap();
        assert_eq!(terms[&2], Expr::Var("a".to_string()));
        assert_eq!(terms[&0], Expr::Var("b".to_string()));
        assert!(parse("sin(a)").is_polynomial_in("x"));
    }

    #[test]
    fn test_not_polynomial() {
        assert!(!parse("x^2.5").is_polynomial_in("x"));
        assert!(!parse("1/x").is_polynomial_in("x"));
        assert!(!parse("sin(x)").is_polynomial_in("x"));
        assert!(!parse("x^a").is_polynomial_in("x"));
    }

    #[test]
    fn test_pure_power() {
        assert_eq!(parse("x^2.5").pure_power("x"), Some((Expr::Const(1.0), 2.5)));
        assert_eq!(parse("sqrt(x)").pure_power("x"), Some((Expr::Const(1.0), 0.5)));
        assert_eq!(parse("3/x").pure_power("x"), Some((Expr::Const(3.0), -1.0)));
        assert_eq!(
            parse("2*x*x^0.5").pure_power("x"),
            Some((Expr::Const(2.0), 1.5))
        );
        assert_eq!(parse("x + 1").pure_power("x"), None);
        assert_eq!(parse("5").pure_power("x"), None);
        assert_eq!(parse("exp(x)").pure_power("x"), None);
    }
}
