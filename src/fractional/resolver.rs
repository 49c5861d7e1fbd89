//! # Fractional Derivative Resolver
//!
//! Orchestrates the three differintegral tiers, from the most exact and cheapest to the
//! most general:
//!
//! 1. term-wise power rule for polynomials and pure powers (`riemann-liouville-power`);
//! 2. closed forms of named functions (`lookup-table`);
//! 3. Mellin transform fallback (`mellin-transform`), terminal.
//!
//! A tier is tried only when the previous one cannot answer; its failure is logged and
//! the next tier runs. The outcome of the Mellin tier is returned as is. A panic inside
//! any tier is caught and reported as `InternalError`, and a raised [`InterruptFlag`]
//! stops the resolution between tiers with `Timeout`.
//!
//! # Examples
//! ```rust, ignore
//! use RustedFracCalc::fractional::order::Order;
//! use RustedFracCalc::fractional::resolver::FractionalResolver;
//! use RustedFracCalc::symbolic::symbolic_engine::Expr;
//! let resolver = FractionalResolver::new();
//! let expr = Expr::parse_expression("x^3").unwrap();
//! let result = resolver.resolve(&expr, "x", &Order::Real(0.5));
//! println!("{}", result); // 3.61... * x^2.5 [riemann-liouville-power]
//! ```

use crate::Utils::resolver_config::ResolverConfig;
use crate::fractional::classifier::{ExpressionClass, classify};
use crate::fractional::lookup_table::lookup;
use crate::fractional::mellin_fallback::mellin_differintegral;
use crate::fractional::order::Order;
use crate::fractional::power_rule::power_rule;
use crate::fractional::result::{
    DifferintegralError, DifferintegralResult, FailureKind, MethodTag,
};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_traits::{AlgebraEngine, NativeEngine};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag checked by the resolver between tiers.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag(Arc<AtomicBool>);

impl InterruptFlag {
    pub fn new() -> Self {
        InterruptFlag::default()
    }

    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// One item of a batch resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferintegralRequest {
    pub expr: Expr,
    pub var: String,
    pub order: Order,
}

impl DifferintegralRequest {
    pub fn new(expr: Expr, var: &str, order: Order) -> Self {
        DifferintegralRequest {
            expr,
            var: var.to_string(),
            order,
        }
    }
}

pub struct FractionalResolver<E: AlgebraEngine = NativeEngine> {
    engine: E,
    config: ResolverConfig,
    interrupt: Option<InterruptFlag>,
}

impl Default for FractionalResolver<NativeEngine> {
    fn default() -> Self {
        Self::new()
    }
}

impl FractionalResolver<NativeEngine> {
    /// Resolver over the native engine with every tier enabled.
    pub fn new() -> Self {
        FractionalResolver::with_engine(NativeEngine::new())
    }
}

impl<E: AlgebraEngine> FractionalResolver<E> {
    pub fn with_engine(engine: E) -> Self {
        FractionalResolver {
            engine,
            config: ResolverConfig::default(),
            interrupt: None,
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_interrupt(mut self, interrupt: InterruptFlag) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    fn check_interrupt(&self, stage: &str) -> Result<(), DifferintegralError> {
        match &self.interrupt {
            Some(flag) if flag.is_interrupted() => Err(DifferintegralError::new(
                FailureKind::Timeout,
                format!("resolution interrupted before {}", stage),
            )),
            _ => Ok(()),
        }
    }

    /// Runs `f`, turning a panic into an `InternalError`.
    fn guarded<T>(&self, stage: &str, f: impl FnOnce() -> T) -> Result<T, DifferintegralError> {
        catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
            let message = format!("{} panicked: {}", stage, panic_message(payload.as_ref()));
            warn!("{}", message);
            DifferintegralError::new(FailureKind::InternalError, message)
        })
    }

    /// Differintegral of order `order` of `expr` with respect to `var`.
    pub fn resolve(&self, expr: &Expr, var: &str, order: &Order) -> DifferintegralResult {
        info!("resolving D^({}) of {} with respect to {}", order, expr, var);
        match self.resolve_tiers(expr, var, order) {
            Ok((result, method)) => {
                info!("resolved by {}: {}", method, result);
                DifferintegralResult::Success {
                    expr: result,
                    method,
                }
            }
            Err(error) => {
                warn!("resolution failed: {}", error);
                DifferintegralResult::Failure(error)
            }
        }
    }

    fn resolve_tiers(
        &self,
        expr: &Expr,
        var: &str,
        order: &Order,
    ) -> Result<(Expr, MethodTag), DifferintegralError> {
        order.validate(var)?;
        self.check_interrupt("classification")?;
        let class = self.guarded("classification", || classify(&self.engine, expr, var))?;
        debug!("{} classified as {}", expr, class);

        if class.is_power_like() {
            self.check_interrupt("the power rule")?;
            if self.config.power_rule {
                let outcome = self
                    .guarded("power rule", || power_rule(&self.engine, &class, var, order))
                    .and_then(|inner| inner);
                match outcome {
                    Ok(result) => return Ok((result, MethodTag::RiemannLiouvillePower)),
                    Err(error) if error.kind == FailureKind::InternalError => return Err(error),
                    Err(error) => info!("power rule failed ({}), falling through", error),
                }
            } else {
                debug!("power rule disabled");
            }
        }

        if let ExpressionClass::Named(shape) = &class {
            self.check_interrupt("the lookup table")?;
            if self.config.lookup_table {
                let found = self.guarded("lookup table", || {
                    lookup(&self.engine, &class, var, order)
                })?;
                match found {
                    Some(result) => return Ok((result, MethodTag::LookupTable)),
                    None => info!("no table entry for {} at order {}", shape, order),
                }
            } else {
                debug!("lookup table disabled");
            }
        }

        self.check_interrupt("the Mellin transform")?;
        if !self.config.mellin_transform {
            return Err(DifferintegralError::new(
                FailureKind::TransformUnavailable,
                format!(
                    "no enabled tier resolves {} at order {}: Mellin transform tier is disabled",
                    expr, order
                ),
            ));
        }
        let strip_retry = self.config.strip_retry;
        let result = self
            .guarded("Mellin transform", || {
                mellin_differintegral(&self.engine, expr, var, order, strip_retry)
            })
            .and_then(|inner| inner)?;
        Ok((result, MethodTag::MellinTransform))
    }

    /// Resolves independent requests in parallel; results keep the request order.
    pub fn resolve_batch(&self, requests: &[DifferintegralRequest]) -> Vec<DifferintegralResult> {
        info!("resolving a batch of {} requests", requests.len());
        requests
            .par_iter()
            .map(|request| self.resolve(&request.expr, &request.var, &request.order))
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Differintegral with the default resolver (native engine, every tier enabled).
pub fn resolve_fractional_derivative(expr: &Expr, var: &str, order: &Order) -> DifferintegralResult {
    FractionalResolver::new().resolve(expr, var, order)
}
