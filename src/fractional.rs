//! Fractional differintegral resolution: classification of the expression, the three
//! resolution tiers and the resolver that orchestrates them.
//!
//! # Example
//! ```rust, ignore
//! use RustedFracCalc::fractional::order::Order;
//! use RustedFracCalc::fractional::resolver::resolve_fractional_derivative;
//! use RustedFracCalc::symbolic::symbolic_engine::Expr;
//! let expr = Expr::parse_expression("x^-0.5*exp(-x)").unwrap();
//! let result = resolve_fractional_derivative(&expr, "x", &Order::Real(0.5));
//! println!("{}", result); // exp(-x) [mellin-transform]
//! ```
/// which solvable shape an expression has: polynomial, pure power, named function
pub mod classifier;
/// curated closed forms of sin, cos, exp and log at specific orders
pub mod lookup_table;
/// differintegral through the Mellin transform, the terminal tier
pub mod mellin_fallback;
/// integer, rational, real, complex or symbolic order of a differintegral
pub mod order;
/// gamma-function power rule for polynomials and pure powers
pub mod power_rule;
/// tier orchestration, panic isolation, interruption and batch resolution
pub mod resolver;
/// method provenance and typed failures
pub mod result;
///
mod fractional_tests;
