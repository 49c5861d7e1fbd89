//! # Mellin Transforms
//!
//! Table-driven forward and inverse Mellin transforms,
//! `M[f](s) = ∫_0^∞ t^(s-1) f(t) dt`, with convergence-strip bookkeeping.
//!
//! ## Forward direction
//! Sums of terms `C · t^b · k(a·t)` with a kernel `k` from
//!
//! | kernel          | transform                                   | strip            |
//! |-----------------|---------------------------------------------|------------------|
//! | `exp(-a t)`     | `a^-(s+b) Γ(s+b)`                           | `(-b, ∞)`        |
//! | `sin(a t)`      | `a^-(s+b) Γ(s+b) sin(π(s+b)/2)`             | `(-1-b, 1-b)`    |
//! | `cos(a t)`      | `a^-(s+b) Γ(s+b) cos(π(s+b)/2)`             | `(-b, 1-b)`      |
//! | `(1 + a t)^-ρ`  | `a^-(s+b) Γ(s+b) Γ(ρ-b-s) / Γ(ρ)`           | `(-b, ρ-b)`      |
//!
//! A bare power `t^b` has no transform (the integral converges nowhere). The strip of a
//! sum is the intersection of the strips of its terms.
//!
//! ## Inverse direction
//! Sums of products `C · a^-s · Π Γ(±s + q)^m · [sin|cos](π(s+b)/2)`. After cancelling
//! equal gamma factors each product must match one of
//! `Γ(s+b)`, `Γ(s+b)Γ(c-s)`, `Γ(s+b) sin(π(s+b)/2)`, `Γ(s+b) cos(π(s+b)/2)`; the
//! requested strip has to be non-empty and lie inside the natural strip of every
//! matched product, an unconstrained strip accepts the natural one.

use crate::symbolic::special_functions::gamma;
use crate::symbolic::symbolic_engine::Expr;
use std::f64::consts::PI;
use std::fmt;

const TOLERANCE: f64 = 1e-12;

/// One side of a convergence strip.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StripBound {
    Finite(f64),
    /// -∞ for a lower bound, +∞ for an upper bound
    Unbounded,
    /// no information; imposes no constraint
    Unknown,
}

impl StripBound {
    fn as_lower(&self) -> Option<f64> {
        match self {
            StripBound::Finite(v) => Some(*v),
            StripBound::Unbounded => Some(f64::NEG_INFINITY),
            StripBound::Unknown => None,
        }
    }

    fn as_upper(&self) -> Option<f64> {
        match self {
            StripBound::Finite(v) => Some(*v),
            StripBound::Unbounded => Some(f64::INFINITY),
            StripBound::Unknown => None,
        }
    }

    fn from_value(value: f64) -> StripBound {
        if value.is_infinite() {
            StripBound::Unbounded
        } else {
            StripBound::Finite(value)
        }
    }
}

/// Vertical band `lower < Re(s) < upper` where a Mellin transform is valid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergenceStrip {
    pub lower: StripBound,
    pub upper: StripBound,
}

impl ConvergenceStrip {
    /// Strip from numeric bounds; infinite values become [`StripBound::Unbounded`].
    pub fn new(lower: f64, upper: f64) -> Self {
        ConvergenceStrip {
            lower: StripBound::from_value(lower),
            upper: StripBound::from_value(upper),
        }
    }

    /// Strip with both bounds unknown; lets the inversion pick the natural region.
    pub fn unconstrained() -> Self {
        ConvergenceStrip {
            lower: StripBound::Unknown,
            upper: StripBound::Unknown,
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.lower == StripBound::Unknown && self.upper == StripBound::Unknown
    }

    /// True when both bounds are known and `lower >= upper`.
    pub fn is_empty(&self) -> bool {
        match (self.lower.as_lower(), self.upper.as_upper()) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        }
    }

    pub fn intersect(&self, other: &ConvergenceStrip) -> ConvergenceStrip {
        let lower = match (self.lower.as_lower(), other.lower.as_lower()) {
            (Some(a), Some(b)) => StripBound::from_value(a.max(b)),
            (Some(_), None) => self.lower,
            (None, _) => other.lower,
        };
        let upper = match (self.upper.as_upper(), other.upper.as_upper()) {
            (Some(a), Some(b)) => StripBound::from_value(a.min(b)),
            (Some(_), None) => self.upper,
            (None, _) => other.upper,
        };
        ConvergenceStrip { lower, upper }
    }

    /// Raises the lower bound to at least `bound`.
    pub fn with_lower_at_least(&self, bound: f64) -> ConvergenceStrip {
        self.intersect(&ConvergenceStrip {
            lower: StripBound::Finite(bound),
            upper: StripBound::Unknown,
        })
    }

    /// Whether `inner` lies inside this strip. Unknown bounds of `self` accept anything,
    /// unknown bounds of `inner` cannot be verified and are rejected.
    pub fn contains(&self, inner: &ConvergenceStrip) -> bool {
        let lower_ok = match (self.lower.as_lower(), inner.lower.as_lower()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => b >= a - TOLERANCE,
        };
        let upper_ok = match (self.upper.as_upper(), inner.upper.as_upper()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => b <= a + TOLERANCE,
        };
        lower_ok && upper_ok
    }
}

impl fmt::Display for ConvergenceStrip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |bound: &StripBound, infinity: &str| match bound {
            StripBound::Finite(v) => v.to_string(),
            StripBound::Unbounded => infinity.to_string(),
            StripBound::Unknown => "?".to_string(),
        };
        write!(f, "({}, {})", show(&self.lower, "-oo"), show(&self.upper, "oo"))
    }
}

/// Result of a forward transform.
#[derive(Clone, Debug, PartialEq)]
pub enum MellinOutcome {
    Transformed { transform: Expr, strip: ConvergenceStrip },
    Unevaluated { reason: String },
}

/// Result of an inverse transform. `Unevaluated` keeps the transform-domain expression.
#[derive(Clone, Debug, PartialEq)]
pub enum InverseMellinOutcome {
    Inverted(Expr),
    Unevaluated { transform: Expr, reason: String },
}

//___________________________________FORWARD____________________________________

#[derive(Clone, Copy, Debug, PartialEq)]
enum Kernel {
    Exp { scale: f64 },
    Sin { scale: f64 },
    Cos { scale: f64 },
    Rational { scale: f64, rho: f64 },
}

/// `coefficient · t^power · kernel(t)`
struct KernelTerm {
    coefficient: Expr,
    power: f64,
    kernel: Option<Kernel>,
}

/// `(offset, slope)` of an expression that is linear in `var` with numeric coefficients.
fn numeric_linear(expr: &Expr, var: &str) -> Option<(f64, f64)> {
    let terms = expr.polynomial_terms(var)?;
    if terms.keys().any(|k| *k > 1) {
        return None;
    }
    let offset = match terms.get(&0) {
        Some(c) => c.as_const()?,
        None => 0.0,
    };
    let slope = match terms.get(&1) {
        Some(c) => c.as_const()?,
        None => 0.0,
    };
    Some((offset, slope))
}

fn additive_terms(expr: &Expr, out: &mut Vec<Expr>) {
    match expr {
        Expr::Add(lhs, rhs) => {
            additive_terms(lhs, out);
            additive_terms(rhs, out);
        }
        Expr::Sub(lhs, rhs) => {
            additive_terms(lhs, out);
            let mut negated = Vec::new();
            additive_terms(rhs, &mut negated);
            out.extend(negated.into_iter().map(|term| -term));
        }
        _ => out.push(expr.clone()),
    }
}

/// Factors of a product, `1` for numerator factors and `-1` for denominator factors.
fn signed_factors(expr: &Expr, sign: i32, out: &mut Vec<(Expr, i32)>) {
    match expr {
        Expr::Mul(lhs, rhs) => {
            signed_factors(lhs, sign, out);
            signed_factors(rhs, sign, out);
        }
        Expr::Div(lhs, rhs) => {
            signed_factors(lhs, sign, out);
            signed_factors(rhs, -sign, out);
        }
        _ => out.push((expr.clone(), sign)),
    }
}

fn power_of(factor: &Expr, t: &str) -> Option<f64> {
    match factor {
        Expr::Var(name) if name == t => Some(1.0),
        Expr::Pow(base, exp) => match (base.as_ref(), exp.simplify()) {
            (Expr::Var(name), Expr::Const(p)) if name == t => Some(p),
            _ => None,
        },
        _ => None,
    }
}

/// Kernel of a `t`-dependent factor together with the constant it contributes.
fn kernel_of(factor: &Expr, t: &str, sign: i32) -> Result<(Kernel, f64), String> {
    let unsupported = || format!("no Mellin table entry for factor {}", factor);
    let sign_f = sign as f64;
    match factor {
        Expr::Exp(arg) => {
            let (offset, slope) = numeric_linear(arg, t).ok_or_else(unsupported)?;
            let slope = sign_f * slope;
            if slope >= 0.0 {
                return Err(format!("{} does not decay at infinity", factor));
            }
            Ok((Kernel::Exp { scale: -slope }, (sign_f * offset).exp()))
        }
        Expr::sin(arg) | Expr::cos(arg) if sign > 0 => {
            let (offset, slope) = numeric_linear(arg, t).ok_or_else(unsupported)?;
            if offset != 0.0 || slope == 0.0 {
                return Err(unsupported());
            }
            match factor {
                Expr::sin(_) => Ok((Kernel::Sin { scale: slope.abs() }, slope.signum())),
                _ => Ok((Kernel::Cos { scale: slope.abs() }, 1.0)),
            }
        }
        Expr::Pow(base, exp) => {
            let e = exp.simplify().as_const().ok_or_else(unsupported)?;
            rational_kernel(base, t, sign_f * e).ok_or_else(unsupported)
        }
        _ => rational_kernel(factor, t, sign_f).ok_or_else(unsupported),
    }
}

/// `(c0 + c1 t)^e` with `c0, c1 > 0` and `e < 0`, as `c0^e (1 + (c1/c0) t)^e`.
fn rational_kernel(base: &Expr, t: &str, exponent: f64) -> Option<(Kernel, f64)> {
    let (c0, c1) = numeric_linear(base, t)?;
    let rho = -exponent;
    if c0 <= 0.0 || c1 <= 0.0 || rho <= 0.0 {
        return None;
    }
    Some((Kernel::Rational { scale: c1 / c0, rho }, c0.powf(exponent)))
}

fn decompose_term(term: &Expr, t: &str) -> Result<KernelTerm, String> {
    let mut factors = Vec::new();
    signed_factors(term, 1, &mut factors);
    let mut result = KernelTerm {
        coefficient: Expr::Const(1.0),
        power: 0.0,
        kernel: None,
    };
    for (factor, sign) in factors {
        if !factor.contains_variable(t) {
            result.coefficient = if sign > 0 {
                result.coefficient * factor
            } else {
                result.coefficient / factor
            };
            continue;
        }
        if let Some(p) = power_of(&factor, t) {
            result.power += sign as f64 * p;
            continue;
        }
        if result.kernel.is_some() {
            return Err(format!("{} has more than one non-power factor", term));
        }
        let (kernel, constant) = kernel_of(&factor, t, sign)?;
        result.kernel = Some(kernel);
        result.coefficient = result.coefficient * Expr::Const(constant);
    }
    Ok(result)
}

/// `s + b`
fn shifted(s: &str, b: f64) -> Expr {
    let s = Expr::Var(s.to_string());
    if b == 0.0 { s } else { s + Expr::Const(b) }
}

fn term_transform(term: &KernelTerm, s: &str) -> Result<(Expr, ConvergenceStrip), String> {
    let b = term.power;
    let kernel = term
        .kernel
        .ok_or_else(|| format!("t^{} alone has no Mellin transform", b))?;
    let scale = match kernel {
        Kernel::Exp { scale }
        | Kernel::Sin { scale }
        | Kernel::Cos { scale }
        | Kernel::Rational { scale, .. } => scale,
    };
    // a^-(s+b) = a^-b * a^-s
    let mut transform = term.coefficient.clone() * Expr::Const(scale.powf(-b));
    if scale != 1.0 {
        transform = transform * Expr::Const(scale).pow(-Expr::Var(s.to_string()));
    }
    transform = transform * shifted(s, b).gamma();
    let half_pi = Expr::Const(PI / 2.0);
    let (transform, strip) = match kernel {
        Kernel::Exp { .. } => (transform, ConvergenceStrip::new(-b, f64::INFINITY)),
        Kernel::Sin { .. } => (
            transform * Expr::sin(Box::new(half_pi * shifted(s, b))),
            ConvergenceStrip::new(-1.0 - b, 1.0 - b),
        ),
        Kernel::Cos { .. } => (
            transform * Expr::cos(Box::new(half_pi * shifted(s, b))),
            ConvergenceStrip::new(-b, 1.0 - b),
        ),
        Kernel::Rational { rho, .. } => (
            transform * (Expr::Const(rho - b) - Expr::Var(s.to_string())).gamma()
                / Expr::Const(gamma(rho)),
            ConvergenceStrip::new(-b, rho - b),
        ),
    };
    Ok((transform, strip))
}

/// Forward Mellin transform of `expr` in `t`, as a function of `s`.
pub fn mellin_transform(expr: &Expr, t: &str, s: &str) -> MellinOutcome {
    let mut terms = Vec::new();
    additive_terms(expr, &mut terms);
    let mut total: Option<Expr> = None;
    let mut strip = ConvergenceStrip::unconstrained();
    for term in &terms {
        let transformed = decompose_term(term, t).and_then(|parts| term_transform(&parts, s));
        let (transform, term_strip) = match transformed {
            Ok(pair) => pair,
            Err(reason) => return MellinOutcome::Unevaluated { reason },
        };
        strip = strip.intersect(&term_strip);
        total = Some(match total {
            Some(acc) => acc + transform,
            None => transform,
        });
    }
    if strip.is_empty() {
        return MellinOutcome::Unevaluated {
            reason: format!("strips of the terms of {} do not overlap", expr),
        };
    }
    match total {
        Some(transform) => MellinOutcome::Transformed {
            transform: transform.simplify(),
            strip,
        },
        None => MellinOutcome::Unevaluated {
            reason: "empty expression".to_string(),
        },
    }
}

//___________________________________INVERSE____________________________________

/// `slope · s + offset`, offset free of `s`.
#[derive(Clone, Debug)]
struct LinearForm {
    slope: f64,
    offset: Expr,
}

impl LinearForm {
    fn of(expr: &Expr, s: &str) -> Option<LinearForm> {
        let terms = expr.polynomial_terms(s)?;
        if terms.keys().any(|k| *k > 1) {
            return None;
        }
        let slope = match terms.get(&1) {
            Some(c) => c.as_const()?,
            None => 0.0,
        };
        let offset = terms.get(&0).cloned().unwrap_or(Expr::Const(0.0));
        Some(LinearForm { slope, offset })
    }

    fn same_as(&self, other: &LinearForm) -> bool {
        (self.slope - other.slope).abs() < TOLERANCE && offsets_equal(&self.offset, &other.offset)
    }
}

fn offsets_equal(a: &Expr, b: &Expr) -> bool {
    let (a, b) = (a.simplify(), b.simplify());
    match (a.as_const(), b.as_const()) {
        (Some(x), Some(y)) => (x - y).abs() <= 1e-9 * (1.0 + x.abs().max(y.abs())),
        _ => a == b,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum TrigKind {
    Sin,
    Cos,
}

/// `coefficient · scale^-s · Π Γ(form)^multiplicity · trig(form)`
#[derive(Clone, Debug)]
struct GammaProduct {
    coefficient: Expr,
    scale: f64,
    gammas: Vec<(LinearForm, i32)>,
    trig: Option<(TrigKind, LinearForm)>,
}

impl GammaProduct {
    fn constant(coefficient: Expr) -> GammaProduct {
        GammaProduct {
            coefficient,
            scale: 1.0,
            gammas: Vec::new(),
            trig: None,
        }
    }

    fn multiply(mut self, other: GammaProduct) -> Option<GammaProduct> {
        self.coefficient = self.coefficient * other.coefficient;
        self.scale *= other.scale;
        for (form, multiplicity) in other.gammas {
            match self.gammas.iter_mut().find(|(existing, _)| existing.same_as(&form)) {
                Some((_, m)) => *m += multiplicity,
                None => self.gammas.push((form, multiplicity)),
            }
        }
        self.gammas.retain(|(_, m)| *m != 0);
        self.trig = match (self.trig, other.trig) {
            (Some(_), Some(_)) => return None,
            (trig, None) | (None, trig) => trig,
        };
        Some(self)
    }

    fn reciprocal(self) -> Option<GammaProduct> {
        if self.trig.is_some() {
            return None;
        }
        Some(GammaProduct {
            coefficient: Expr::Const(1.0) / self.coefficient,
            scale: 1.0 / self.scale,
            gammas: self.gammas.into_iter().map(|(f, m)| (f, -m)).collect(),
            trig: None,
        })
    }

    fn powi(self, n: i32) -> Option<GammaProduct> {
        if self.trig.is_some() && n != 1 {
            return None;
        }
        Some(GammaProduct {
            coefficient: self.coefficient.pow(Expr::Const(n as f64)),
            scale: self.scale.powi(n),
            gammas: self.gammas.into_iter().map(|(f, m)| (f, m * n)).collect(),
            trig: self.trig,
        })
    }
}

fn single(mut products: Vec<GammaProduct>) -> Option<GammaProduct> {
    if products.len() == 1 { products.pop() } else { None }
}

fn gamma_products(expr: &Expr, s: &str) -> Option<Vec<GammaProduct>> {
    if !expr.contains_variable(s) {
        return Some(vec![GammaProduct::constant(expr.clone())]);
    }
    match expr {
        Expr::Add(lhs, rhs) => {
            let mut products = gamma_products(lhs, s)?;
            products.extend(gamma_products(rhs, s)?);
            Some(products)
        }
        Expr::Sub(lhs, rhs) => {
            let mut products = gamma_products(lhs, s)?;
            for mut product in gamma_products(rhs, s)? {
                product.coefficient = -product.coefficient;
                products.push(product);
            }
            Some(products)
        }
        Expr::Mul(lhs, rhs) => {
            let left = gamma_products(lhs, s)?;
            let right = gamma_products(rhs, s)?;
            let mut products = Vec::new();
            for l in &left {
                for r in &right {
                    products.push(l.clone().multiply(r.clone())?);
                }
            }
            Some(products)
        }
        Expr::Div(lhs, rhs) => {
            let denominator = single(gamma_products(rhs, s)?)?.reciprocal()?;
            gamma_products(lhs, s)?
                .into_iter()
                .map(|product| product.multiply(denominator.clone()))
                .collect()
        }
        Expr::Pow(base, exp) if !base.contains_variable(s) => {
            let a = base.simplify().as_const()?;
            if a <= 0.0 {
                return None;
            }
            let form = LinearForm::of(exp, s)?;
            // a^(k s + q) = a^q (a^-k)^-s
            let mut product = GammaProduct::constant(Expr::Const(a).pow(form.offset));
            product.scale = a.powf(-form.slope);
            Some(vec![product])
        }
        Expr::Pow(base, exp) => {
            let n = exp.simplify().as_const()?;
            if n.fract() != 0.0 || n.abs() > 64.0 {
                return None;
            }
            Some(vec![single(gamma_products(base, s)?)?.powi(n as i32)?])
        }
        Expr::Gamma(arg) => {
            let form = LinearForm::of(arg, s)?;
            if form.slope == 0.0 {
                return Some(vec![GammaProduct::constant(form.offset.gamma())]);
            }
            let mut product = GammaProduct::constant(Expr::Const(1.0));
            product.gammas.push((form, 1));
            Some(vec![product])
        }
        Expr::sin(arg) | Expr::cos(arg) => {
            let form = LinearForm::of(arg, s)?;
            let kind = if matches!(expr, Expr::sin(_)) {
                TrigKind::Sin
            } else {
                TrigKind::Cos
            };
            let mut product = GammaProduct::constant(Expr::Const(1.0));
            product.trig = Some((kind, form));
            Some(vec![product])
        }
        _ => None,
    }
}

/// Inverts one matched product; returns the `x`-domain term and its natural strip.
fn invert_product(product: &GammaProduct, x: &str) -> Option<(Expr, ConvergenceStrip)> {
    if !(product.scale > 0.0 && product.scale.is_finite()) {
        return None;
    }
    if product.gammas.iter().any(|(_, m)| *m != 1) {
        return None;
    }
    let rising: Vec<&LinearForm> = product
        .gammas
        .iter()
        .filter(|(f, _)| (f.slope - 1.0).abs() < TOLERANCE)
        .map(|(f, _)| f)
        .collect();
    let falling: Vec<&LinearForm> = product
        .gammas
        .iter()
        .filter(|(f, _)| (f.slope + 1.0).abs() < TOLERANCE)
        .map(|(f, _)| f)
        .collect();
    if rising.len() + falling.len() != product.gammas.len() {
        return None;
    }
    let x = if product.scale == 1.0 {
        Expr::Var(x.to_string())
    } else {
        Expr::Const(product.scale) * Expr::Var(x.to_string())
    };
    let bound = |value: Option<f64>| match value {
        Some(v) => StripBound::from_value(v),
        None => StripBound::Unknown,
    };
    let coefficient = product.coefficient.clone();
    match (rising.as_slice(), falling.as_slice(), &product.trig) {
        // a^-s Γ(s+b) <-> (ax)^b exp(-ax)
        ([g], [], None) => {
            let b = g.offset.simplify();
            let term = coefficient * x.clone().pow(b.clone()) * (-x).exp();
            let strip = ConvergenceStrip {
                lower: bound(b.as_const().map(|b| -b)),
                upper: StripBound::Unbounded,
            };
            Some((term, strip))
        }
        // a^-s Γ(s+b) Γ(c-s) <-> Γ(b+c) (ax)^b (1+ax)^-(b+c)
        ([g], [h], None) => {
            let b = g.offset.simplify();
            let c = h.offset.simplify();
            let rho = (b.clone() + c.clone()).simplify();
            if rho.as_const().is_some_and(|r| r <= 0.0) {
                return None;
            }
            let term = coefficient
                * rho.clone().gamma()
                * x.clone().pow(b.clone())
                * (Expr::Const(1.0) + x).pow(-rho);
            let strip = ConvergenceStrip {
                lower: bound(b.as_const().map(|b| -b)),
                upper: bound(c.as_const()),
            };
            Some((term, strip))
        }
        // a^-s Γ(s+b) sin|cos(π(s+b)/2) <-> (ax)^b sin|cos(ax)
        ([g], [], Some((kind, form))) => {
            let b = g.offset.simplify();
            let expected_offset = Expr::Const(PI / 2.0) * b.clone();
            if (form.slope - PI / 2.0).abs() > TOLERANCE || !offsets_equal(&form.offset, &expected_offset) {
                return None;
            }
            let b_value = b.as_const();
            let (trig, strip) = match kind {
                TrigKind::Sin => (
                    Expr::sin(Box::new(x.clone())),
                    ConvergenceStrip {
                        lower: bound(b_value.map(|b| -1.0 - b)),
                        upper: bound(b_value.map(|b| 1.0 - b)),
                    },
                ),
                TrigKind::Cos => (
                    Expr::cos(Box::new(x.clone())),
                    ConvergenceStrip {
                        lower: bound(b_value.map(|b| -b)),
                        upper: bound(b_value.map(|b| 1.0 - b)),
                    },
                ),
            };
            Some((coefficient * x.pow(b) * trig, strip))
        }
        _ => None,
    }
}

/// Inverse Mellin transform of `transform` in `s`, as a function of `x`, along `strip`.
pub fn inverse_mellin_transform(
    transform: &Expr,
    s: &str,
    x: &str,
    strip: &ConvergenceStrip,
) -> InverseMellinOutcome {
    let unevaluated = |reason: String| InverseMellinOutcome::Unevaluated {
        transform: transform.clone(),
        reason,
    };
    if strip.is_empty() {
        return unevaluated(format!("strip {} is empty", strip));
    }
    let products = match gamma_products(&transform.simplify(), s) {
        Some(products) => products,
        None => return unevaluated(format!("{} is not a sum of gamma products", transform)),
    };
    let mut total: Option<Expr> = None;
    let mut common = ConvergenceStrip::unconstrained();
    for product in products {
        if product.coefficient.simplify().is_zero() {
            continue;
        }
        let (term, natural) = match invert_product(&product, x) {
            Some(pair) => pair,
            None => return unevaluated("no inversion pattern matches".to_string()),
        };
        if natural.is_empty() {
            return unevaluated(format!("natural strip {} is empty", natural));
        }
        if !strip.is_unconstrained() && !natural.contains(strip) {
            return unevaluated(format!("strip {} lies outside {}", strip, natural));
        }
        common = common.intersect(&natural);
        total = Some(match total {
            Some(acc) => acc + term,
            None => term,
        });
    }
    if common.is_empty() {
        return unevaluated("terms have no common strip".to_string());
    }
    match total {
        Some(expr) => InverseMellinOutcome::Inverted(expr.simplify()),
        None => unevaluated("transform vanishes identically".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(input: &str) -> Expr {
        Expr::parse_expression(input).unwrap()
    }

    fn transformed(outcome: MellinOutcome) -> (Expr, ConvergenceStrip) {
        match outcome {
            MellinOutcome::Transformed { transform, strip } => (transform, strip),
            MellinOutcome::Unevaluated { reason } => panic!("unevaluated: {}", reason),
        }
    }

    fn inverted(outcome: InverseMellinOutcome) -> Expr {
        match outcome {
            InverseMellinOutcome::Inverted(expr) => expr,
            InverseMellinOutcome::Unevaluated { reason, .. } => panic!("unevaluated: {}", reason),
        }
    }

    #[test]
    fn test_strip_operations() {
        let a = ConvergenceStrip::new(-1.0, 1.0);
        let b = ConvergenceStrip::new(0.5, f64::INFINITY);
        assert_eq!(a.intersect(&b), ConvergenceStrip::new(0.5, 1.0));
        assert!(ConvergenceStrip::new(1.0, 1.0).is_empty());
        assert!(!ConvergenceStrip::unconstrained().is_empty());
        assert_eq!(
            ConvergenceStrip::new(-2.0, 0.0).with_lower_at_least(0.0),
            ConvergenceStrip::new(0.0, 0.0)
        );
        assert!(a.contains(&ConvergenceStrip::new(0.0, 0.5)));
        assert!(!a.contains(&ConvergenceStrip::unconstrained()));
        assert!(ConvergenceStrip::unconstrained().contains(&a));
        assert_eq!(b.to_string(), "(0.5, oo)");
    }

    #[test]
    fn test_forward_exponential() {
        let (transform, strip) = transformed(mellin_transform(&parse("exp(-t)"), "t", "s"));
        assert_eq!(transform, Expr::Var("s".to_string()).gamma());
        assert_eq!(strip, ConvergenceStrip::new(0.0, f64::INFINITY));
        let value = transform.eval_expression(&["s"], &[2.5]);
        assert_relative_eq!(value, gamma(2.5), epsilon = 1e-12);
    }

    #[test]
    fn test_forward_scaled_power_sine() {
        // M[t sin(2t)](s) = 2^-(s+1) Γ(s+1) sin(π(s+1)/2), strip (-2, 0)
        let (transform, strip) = transformed(mellin_transform(&parse("t*sin(2t)"), "t", "s"));
        assert_eq!(strip, ConvergenceStrip::new(-2.0, 0.0));
        let s = -0.5;
        let expected = 2f64.powf(-(s + 1.0)) * gamma(s + 1.0) * (PI * (s + 1.0) / 2.0).sin();
        assert_relative_eq!(transform.eval_expression(&["s"], &[s]), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_forward_rational_kernel() {
        // M[(1+t)^-2](s) = Γ(s)Γ(2-s)/Γ(2), strip (0, 2)
        let (transform, strip) = transformed(mellin_transform(&parse("1/(1+t)^2"), "t", "s"));
        assert_eq!(strip, ConvergenceStrip::new(0.0, 2.0));
        let s = 0.7;
        assert_relative_eq!(
            transform.eval_expression(&["s"], &[s]),
            gamma(s) * gamma(2.0 - s),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_forward_unavailable() {
        for input in ["t^2", "exp(t)", "tg(t)", "exp(-t)*sin(t)", "exp(-t) + 1/(1+t)^0.5*t^3"] {
            let outcome = mellin_transform(&parse(input), "t", "s");
            assert!(
                matches!(outcome, MellinOutcome::Unevaluated { .. }),
                "{} should not transform",
                input
            );
        }
    }

    #[test]
    fn test_round_trips() {
        for input in ["exp(-2t)", "t^0.5*exp(-t)", "cos(t)", "t*sin(3t)", "(1+t)^(-1.5)"] {
            let f = parse(input);
            let (transform, strip) = transformed(mellin_transform(&f, "t", "s"));
            let back = inverted(inverse_mellin_transform(&transform, "s", "t", &strip));
            for t in [0.3, 1.1, 2.7] {
                assert_relative_eq!(
                    back.eval_expression(&["t"], &[t]),
                    f.eval_expression(&["t"], &[t]),
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn test_inverse_respects_strip() {
        let transform = Expr::Var("s".to_string()).gamma();
        let outside = ConvergenceStrip::new(-0.5, 1.0);
        assert!(matches!(
            inverse_mellin_transform(&transform, "s", "x", &outside),
            InverseMellinOutcome::Unevaluated { .. }
        ));
        let free = inverse_mellin_transform(&transform, "s", "x", &ConvergenceStrip::unconstrained());
        assert_eq!(inverted(free), parse("exp(-x)"));
    }

    #[test]
    fn test_inverse_unmatched_keeps_transform() {
        let s = Expr::Var("s".to_string());
        let transform = s.clone().gamma() * s.clone().gamma() / (s - Expr::Const(0.5)).gamma();
        match inverse_mellin_transform(&transform, "s", "x", &ConvergenceStrip::new(0.5, 10.0)) {
            InverseMellinOutcome::Unevaluated { transform: kept, .. } => assert_eq!(kept, transform),
            other => panic!("expected unevaluated, got {:?}", other),
        }
    }
}
