//! Generic differintegral through the Mellin transform.
//!
//! In the transform domain differintegration of order α is the multiplication
//! `F(s) -> F(s) Γ(s)/Γ(s-α)`. The steps are:
//! 1. rename the variable to a fresh positive dummy `t`;
//! 2. forward transform `F(s)` with its convergence strip `(a, b)`;
//! 3. multiply by `Γ(s)/Γ(s-α)`; the poles of `Γ(s)` raise the lower bound to at least 0;
//! 4. invert along the narrowed strip, and once more along an unconstrained strip if that
//!    fails and the retry is enabled;
//! 5. rename back and simplify.

use crate::fractional::order::Order;
use crate::fractional::result::{DifferintegralError, FailureKind};
use crate::symbolic::mellin::{ConvergenceStrip, InverseMellinOutcome, MellinOutcome};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::AlgebraEngine;
use log::{debug, info, warn};

/// Differintegral of `expr` with respect to `var` by the Mellin transform route.
pub fn mellin_differintegral<E: AlgebraEngine + ?Sized>(
    engine: &E,
    expr: &Expr,
    var: &str,
    order: &Order,
    strip_retry: bool,
) -> Result<Expr, DifferintegralError> {
    let alpha = order.to_expr();
    let t = Expr::fresh_symbol("t", &[expr, &alpha]);
    let t_expr = Expr::Var(t.clone());
    let s = Expr::fresh_symbol("s", &[expr, &alpha, &t_expr]);
    let s_expr = Expr::Var(s.clone());
    let x = Expr::fresh_symbol("x", &[expr, &alpha, &t_expr, &s_expr]);
    let dummy = expr.rename_variable(var, &t);

    let (transform, strip) = match engine.mellin_transform(&dummy, &t, &s) {
        MellinOutcome::Transformed { transform, strip } => (transform, strip),
        MellinOutcome::Unevaluated { reason } => {
            return Err(DifferintegralError::new(
                FailureKind::TransformUnavailable,
                format!("Mellin transform of {} is not available: {}", expr, reason),
            ));
        }
    };
    debug!("M[{}]({}) = {} on strip {}", dummy, s, transform, strip);

    let multiplier = s_expr.clone().gamma() / (s_expr - alpha).gamma();
    let shifted = engine.simplify(&(transform * multiplier));
    let narrowed = strip.with_lower_at_least(0.0);
    if narrowed.is_empty() {
        warn!("strip {} is empty once the poles of gamma({}) are excluded", strip, s);
    } else if narrowed != strip {
        debug!("strip narrowed from {} to {}", strip, narrowed);
    }

    let inverted = match engine.inverse_mellin_transform(&shifted, &s, &x, &narrowed) {
        InverseMellinOutcome::Inverted(result) => Ok(result),
        InverseMellinOutcome::Unevaluated { reason, .. } if strip_retry => {
            info!(
                "inversion along {} failed ({}), retrying with an unconstrained strip",
                narrowed, reason
            );
            match engine.inverse_mellin_transform(
                &shifted,
                &s,
                &x,
                &ConvergenceStrip::unconstrained(),
            ) {
                InverseMellinOutcome::Inverted(result) => Ok(result),
                InverseMellinOutcome::Unevaluated { reason, .. } => Err(reason),
            }
        }
        InverseMellinOutcome::Unevaluated { reason, .. } => Err(reason),
    };

    match inverted {
        Ok(result) => Ok(engine.simplify(&result.rename_variable(&x, var))),
        Err(reason) => Err(DifferintegralError::new(
            FailureKind::InversionUnavailable,
            format!("inverse Mellin transform of {} is not available: {}", shifted, reason),
        )
        .with_transform_domain(shifted)),
    }
}
