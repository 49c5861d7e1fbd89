// SYMBOLIC TRAITS //////////////////////////////////////////////////////////////////
// This module contains the algebra-engine trait consumed by the fractional resolver.
// The trait is implemented for the native engine (Expr and its companions) below;
// add other engines here as needed

use crate::symbolic::mellin::{
    ConvergenceStrip, InverseMellinOutcome, MellinOutcome, inverse_mellin_transform,
    mellin_transform,
};
use crate::symbolic::special_functions::{GammaPole, checked_gamma};
use crate::symbolic::symbolic_engine::Expr;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// Operations the resolver needs from a computer-algebra back end.
pub trait AlgebraEngine: Send + Sync {
    fn differentiate(&self, expr: &Expr, var: &str) -> Expr;
    fn simplify(&self, expr: &Expr) -> Expr;
    fn is_polynomial_in(&self, expr: &Expr, var: &str) -> bool;
    /// exponent → coefficient, `None` if the expression is not a polynomial in `var`
    fn polynomial_terms(&self, expr: &Expr, var: &str) -> Option<BTreeMap<u32, Expr>>;
    /// `(coeff, a)` with `expr = coeff · var^a`
    fn pure_power(&self, expr: &Expr, var: &str) -> Option<(Expr, f64)>;
    /// Γ(z), numeric when `z` is a number, symbolic otherwise; poles are an error
    fn evaluate_gamma(&self, z: &Expr) -> Result<Expr, GammaPole>;
    fn mellin_transform(&self, expr: &Expr, in_var: &str, out_var: &str) -> MellinOutcome;
    fn inverse_mellin_transform(
        &self,
        expr: &Expr,
        in_var: &str,
        out_var: &str,
        strip: &ConvergenceStrip,
    ) -> InverseMellinOutcome;
    fn structurally_equal(&self, a: &Expr, b: &Expr) -> bool;
}

///////////////// IMPLEMENTATION OF THE TRAIT FOR THE NATIVE ENGINE /////////////////////////

/// The crate's own engine. Forward Mellin transforms are memoized behind a read/write lock.
#[derive(Debug, Default)]
pub struct NativeEngine {
    mellin_cache: RwLock<HashMap<String, MellinOutcome>>,
}

impl NativeEngine {
    pub fn new() -> Self {
        NativeEngine::default()
    }

    /// Number of memoized forward transforms.
    pub fn cached_transforms(&self) -> usize {
        match self.mellin_cache.read() {
            Ok(cache) => cache.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl AlgebraEngine for NativeEngine {
    fn differentiate(&self, expr: &Expr, var: &str) -> Expr {
        expr.diff(var).simplify()
    }

    fn simplify(&self, expr: &Expr) -> Expr {
        expr.simplify()
    }

    fn is_polynomial_in(&self, expr: &Expr, var: &str) -> bool {
        expr.is_polynomial_in(var)
    }

    fn polynomial_terms(&self, expr: &Expr, var: &str) -> Option<BTreeMap<u32, Expr>> {
        expr.polynomial_terms(var)
    }

    fn pure_power(&self, expr: &Expr, var: &str) -> Option<(Expr, f64)> {
        expr.pure_power(var)
    }

    fn evaluate_gamma(&self, z: &Expr) -> Result<Expr, GammaPole> {
        match z.simplify() {
            Expr::Const(value) => checked_gamma(value).map(Expr::Const),
            symbolic => Ok(symbolic.gamma()),
        }
    }

    fn mellin_transform(&self, expr: &Expr, in_var: &str, out_var: &str) -> MellinOutcome {
        let key = format!("{:?}|{}|{}", expr, in_var, out_var);
        let cached = match self.mellin_cache.read() {
            Ok(cache) => cache.get(&key).cloned(),
            Err(poisoned) => poisoned.into_inner().get(&key).cloned(),
        };
        if let Some(outcome) = cached {
            debug!("Mellin transform of {} served from cache", expr);
            return outcome;
        }
        let outcome = mellin_transform(expr, in_var, out_var);
        match self.mellin_cache.write() {
            Ok(mut cache) => {
                cache.insert(key, outcome.clone());
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(key, outcome.clone());
            }
        }
        outcome
    }

    fn inverse_mellin_transform(
        &self,
        expr: &Expr,
        in_var: &str,
        out_var: &str,
        strip: &ConvergenceStrip,
    ) -> InverseMellinOutcome {
        inverse_mellin_transform(expr, in_var, out_var, strip)
    }

    fn structurally_equal(&self, a: &Expr, b: &Expr) -> bool {
        a == b
    }
}
