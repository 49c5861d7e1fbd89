//! Gamma function family used by the simplifier, the power rule and the Mellin tables.
//!
//! Real and complex Γ are evaluated with the Lanczos approximation (g = 7) and the
//! reflection formula `Γ(z)Γ(1-z) = π/sin(πz)` for `Re z < 0.5`. Positive integers are
//! evaluated exactly as factorials. Poles (non-positive integers) are reported through
//! [`GammaPole`] by the fallible entry points instead of producing ∞ or NaN.

use num_complex::Complex64;
use std::f64::consts::PI;
use std::fmt;

const LANCZOS_G: f64 = 7.0;
const LANCZOS_COEFFS: [f64; 9] = [
    0.99999999999980993,
    676.5203681218851,
    -1259.1392167224028,
    771.32342877765313,
    -176.61502916214059,
    12.507343278686905,
    -0.13857109526572012,
    9.9843695780195716e-6,
    1.5056327351493116e-7,
];

/// Largest integer argument whose factorial is still finite in f64.
const MAX_FACTORIAL_ARG: f64 = 171.0;

/// Beyond this magnitude `gamma_ratio` works with `ln Γ` instead of Γ itself.
const DIRECT_RATIO_LIMIT: f64 = 140.0;

/// Γ evaluated at one of its poles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaPole {
    pub argument: f64,
}

impl fmt::Display for GammaPole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gamma function has a pole at {}", self.argument)
    }
}

impl std::error::Error for GammaPole {}

/// True for 0, -1, -2, ...
pub fn is_gamma_pole(x: f64) -> bool {
    x <= 0.0 && x == x.floor()
}

/// Computes the Gamma function Γ(x). Returns infinity at the poles.
pub fn gamma(x: f64) -> f64 {
    if is_gamma_pole(x) {
        return f64::INFINITY;
    }
    if x == x.floor() && x <= MAX_FACTORIAL_ARG {
        // (x-1)! exactly
        return (2..x as u64).fold(1.0, |acc, k| acc * k as f64);
    }
    if x < 0.5 {
        PI / ((PI * x).sin() * gamma(1.0 - x))
    } else {
        lanczos_gamma(x)
    }
}

/// Γ(x) or an error at the poles.
pub fn checked_gamma(x: f64) -> Result<f64, GammaPole> {
    if is_gamma_pole(x) {
        Err(GammaPole { argument: x })
    } else {
        Ok(gamma(x))
    }
}

fn lanczos_gamma(x: f64) -> f64 {
    let x = x - 1.0;
    let mut ag = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        ag += coeff / (x + i as f64);
    }
    let t = x + LANCZOS_G + 0.5;
    // t^(x+0.5) alone overflows long before Γ does
    let half_power = t.powf((x + 0.5) / 2.0);
    (2.0 * PI).sqrt() * half_power * ((-t).exp() * half_power) * ag
}

/// Sign of Γ(x) away from the poles: negative on (-1, 0), (-3, -2), ...
pub fn gamma_sign(x: f64) -> f64 {
    if x > 0.0 || (-x).ceil() as i64 % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// ln |Γ(x)|, usable far beyond the range where Γ itself overflows.
pub fn ln_gamma(x: f64) -> f64 {
    if is_gamma_pole(x) {
        return f64::INFINITY;
    }
    if x < 0.5 {
        // reflection: |Γ(x)| = π / (|sin(πx)| Γ(1-x))
        return PI.ln() - (PI * x).sin().abs().ln() - ln_gamma(1.0 - x);
    }
    let z = x - 1.0;
    let mut ag = LANCZOS_COEFFS[0];
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        ag += coeff / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    0.5 * (2.0 * PI).ln() + (z + 0.5) * t.ln() - t + ag.ln()
}

/// Γ(z) for complex z.
pub fn complex_gamma(z: Complex64) -> Complex64 {
    if z.im == 0.0 {
        return Complex64::new(gamma(z.re), 0.0);
    }
    if z.re < 0.5 {
        let pi = Complex64::new(PI, 0.0);
        return pi / ((pi * z).sin() * complex_gamma(Complex64::new(1.0, 0.0) - z));
    }
    let z = z - 1.0;
    let mut ag = Complex64::new(LANCZOS_COEFFS[0], 0.0);
    for (i, coeff) in LANCZOS_COEFFS.iter().enumerate().skip(1) {
        ag += *coeff / (z + i as f64);
    }
    let t = z + LANCZOS_G + 0.5;
    (2.0 * PI).sqrt() * t.powc(z + 0.5) * (-t).exp() * ag
}

/// Falling factorial a(a-1)...(a-n+1); 1 for n = 0.
pub fn falling_factorial(a: f64, n: u64) -> f64 {
    (0..n).fold(1.0, |acc, i| acc * (a - i as f64))
}

/// Γ(a)/Γ(b).
///
/// When `a - b` is an integer the ratio is the exact rising/falling product, which stays
/// finite where both gammas overflow. Otherwise it is evaluated directly while both
/// gammas are representable, and through `ln Γ` with tracked signs beyond that.
pub fn gamma_ratio(a: f64, b: f64) -> Result<f64, GammaPole> {
    if is_gamma_pole(a) {
        return Err(GammaPole { argument: a });
    }
    if is_gamma_pole(b) {
        return Err(GammaPole { argument: b });
    }
    let shift = a - b;
    if shift == shift.floor() && shift.abs() <= 64.0 {
        let n = shift.abs() as u64;
        // Γ(b+n)/Γ(b) = b(b+1)...(b+n-1)
        let rising = if shift >= 0.0 {
            falling_factorial(a - 1.0, n)
        } else {
            falling_factorial(b - 1.0, n)
        };
        return Ok(if shift >= 0.0 { rising } else { 1.0 / rising });
    }
    if a.abs() <= DIRECT_RATIO_LIMIT && b.abs() <= DIRECT_RATIO_LIMIT {
        let (numerator, denominator) = (gamma(a), gamma(b));
        if numerator.is_finite() && denominator.is_finite() && denominator != 0.0 {
            return Ok(numerator / denominator);
        }
    }
    let sign = gamma_sign(a) * gamma_sign(b);
    Ok(sign * (ln_gamma(a) - ln_gamma(b)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gamma_integer() {
        assert_eq!(gamma(1.0), 1.0);
        assert_eq!(gamma(2.0), 1.0);
        assert_eq!(gamma(4.0), 6.0);
        assert_eq!(gamma(6.0), 120.0);
    }

    #[test]
    fn test_gamma_half_and_reflection() {
        assert_relative_eq!(gamma(0.5), PI.sqrt(), epsilon = 1e-12);
        // Γ(-0.5) = -2√π
        assert_relative_eq!(gamma(-0.5), -2.0 * PI.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(gamma(3.5), 15.0 / 8.0 * PI.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_poles() {
        assert!(is_gamma_pole(0.0));
        assert!(is_gamma_pole(-3.0));
        assert!(!is_gamma_pole(-2.5));
        assert!(!is_gamma_pole(1.0));
        assert_eq!(checked_gamma(-1.0), Err(GammaPole { argument: -1.0 }));
        assert!(gamma_ratio(1.0, -2.0).is_err());
    }

    #[test]
    fn test_ln_gamma_matches_gamma() {
        for x in [0.7, 1.5, 3.2, 10.0, 25.5] {
            assert_relative_eq!(ln_gamma(x), gamma(x).ln(), epsilon = 1e-9);
        }
        // ln(200!) stays finite
        assert!(ln_gamma(201.0).is_finite());
    }

    #[test]
    fn test_complex_gamma_real_axis_and_recurrence() {
        let z = Complex64::new(2.5, 0.0);
        assert_relative_eq!(complex_gamma(z).re, gamma(2.5), epsilon = 1e-12);
        // Γ(z+1) = zΓ(z)
        let z = Complex64::new(1.3, 0.7);
        let lhs = complex_gamma(z + 1.0);
        let rhs = z * complex_gamma(z);
        assert_relative_eq!(lhs.re, rhs.re, epsilon = 1e-9);
        assert_relative_eq!(lhs.im, rhs.im, epsilon = 1e-9);
        // reflection branch
        let z = Complex64::new(-0.4, 0.3);
        let lhs = complex_gamma(z + 1.0);
        let rhs = z * complex_gamma(z);
        assert_relative_eq!(lhs.re, rhs.re, epsilon = 1e-9);
        assert_relative_eq!(lhs.im, rhs.im, epsilon = 1e-9);
    }

    #[test]
    fn test_falling_factorial_and_ratio() {
        assert_eq!(falling_factorial(5.0, 0), 1.0);
        assert_eq!(falling_factorial(5.0, 2), 20.0);
        assert_eq!(falling_factorial(2.0, 3), 0.0);
        assert_eq!(gamma_ratio(7.0, 5.0), Ok(30.0));
        assert_eq!(gamma_ratio(5.0, 7.0), Ok(1.0 / 30.0));
        assert_relative_eq!(gamma_ratio(4.0, 3.5).unwrap(), gamma(4.0) / gamma(3.5));
        assert_relative_eq!(
            gamma_ratio(300.5, 300.0).unwrap(),
            (ln_gamma(300.5) - ln_gamma(300.0)).exp()
        );
    }

    #[test]
    fn test_large_arguments() {
        // Γ(143.5) is finite (about 1e246)
        assert!(gamma(143.5).is_finite());
        assert_relative_eq!(gamma(143.5).ln(), ln_gamma(143.5), max_relative = 1e-10);
        // Γ(a+1)/Γ(a+1/2) ~ sqrt(a)
        let ratio = gamma_ratio(144.0, 143.5).unwrap();
        assert!(ratio > 11.9 && ratio < 12.0, "ratio {}", ratio);
        let ratio = gamma_ratio(161.0, 161.5).unwrap();
        assert!(ratio > 0.078 && ratio < 0.079, "ratio {}", ratio);
        assert!(gamma_ratio(1000.0, 999.7).unwrap().is_finite());
    }

    #[test]
    fn test_signs_on_the_negative_axis() {
        assert_eq!(gamma_sign(2.5), 1.0);
        assert_eq!(gamma_sign(-0.5), -1.0);
        assert_eq!(gamma_sign(-1.5), 1.0);
        assert_eq!(gamma_sign(-2.5), -1.0);
        assert_relative_eq!(ln_gamma(-0.5), gamma(-0.5).abs().ln(), epsilon = 1e-10);
        // Γ(-200.5) underflows but the ratio with its neighbour is -1/200.5
        assert_relative_eq!(
            gamma_ratio(-200.5, -199.5).unwrap(),
            1.0 / -200.5,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            gamma_ratio(-150.25, 150.25).unwrap(),
            gamma_sign(-150.25) * (ln_gamma(-150.25) - ln_gamma(150.25)).exp(),
            max_relative = 1e-12
        );
    }
}
