//! # Symbolic Engine Module
//!
//! Core expression tree of the crate. Every other part of the library (parser,
//! simplifier, polynomial decomposition, Mellin transforms and the fractional
//! derivative resolver) consumes and produces [`Expr`] values.
//!
//! ## Main Structures and Methods
//!
//! ### `Expr` Enum
//! - **Variables**: `Var(String)` - symbolic variables like "x", "alpha"
//! - **Constants**: `Const(f64)` - numerical constants
//! - **Operations**: `Add`, `Sub`, `Mul`, `Div`, `Pow` - basic arithmetic
//! - **Functions**: `Exp`, `Ln`, `sin`, `cos`, `tg`, `ctg`, inverse trigonometric functions
//! - **Gamma**: `Gamma(z)` - Euler's gamma function, kept symbolic unless its argument is numeric
//!
//! ### Key Methods
//! - `Symbols(symbols: &str)` - create several variables from a comma-separated string
//! - `substitute_variable()`, `rename_variable()`, `set_variable()` - substitution
//! - `contains_variable()` - dependency test used by every classifier
//! - `map_children()` - structural recursion helper, rebuilds a node from mapped children
//!
//! Expressions are immutable values: all transformations return a new tree.
//! The imaginary unit is represented by the reserved symbol `I` (see [`IMAGINARY_UNIT`]).

#![allow(non_camel_case_types)]

use itertools::Itertools;
use std::fmt;

/// Name of the symbol standing for the imaginary unit in complex-valued results.
pub const IMAGINARY_UNIT: &str = "I";

/// Symbolic expression tree.
///
/// # Examples
/// ```rust, ignore
/// use RustedFracCalc::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let expr = Expr::Add(Box::new(x), Box::new(Expr::Const(2.0)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// Symbolic variable with a name (e.g., "x", "y", "alpha")
    Var(String),
    /// Numerical constant value
    Const(f64),
    /// Addition operation: left + right
    Add(Box<Expr>, Box<Expr>),
    /// Subtraction operation: left - right
    Sub(Box<Expr>, Box<Expr>),
    /// Multiplication operation: left * right
    Mul(Box<Expr>, Box<Expr>),
    /// Division operation: left / right
    Div(Box<Expr>, Box<Expr>),
    /// Power operation: base ^ exponent
    Pow(Box<Expr>, Box<Expr>),
    /// Exponential function: e^x
    Exp(Box<Expr>),
    /// Natural logarithm: ln(x)
    Ln(Box<Expr>),
    /// Sine function
    sin(Box<Expr>),
    /// Cosine function
    cos(Box<Expr>),
    /// Tangent function, written `tg`
    tg(Box<Expr>),
    /// Cotangent function, written `ctg`
    ctg(Box<Expr>),
    /// Arcsine function
    arcsin(Box<Expr>),
    /// Arccosine function
    arccos(Box<Expr>),
    /// Arctangent function, written `arctg`
    arctg(Box<Expr>),
    /// Arccotangent function, written `arcctg`
    arcctg(Box<Expr>),
    /// Euler's gamma function Γ(z)
    Gamma(Box<Expr>),
}

/// One-argument functions of the engine, used to dispatch over the unary variants
/// of [`Expr`] without repeating every arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Func {
    Exp,
    Ln,
    Sin,
    Cos,
    Tg,
    Ctg,
    Arcsin,
    Arccos,
    Arctg,
    Arcctg,
    Gamma,
}

impl Func {
    /// Name used by `Display` and accepted by the parser.
    pub fn name(self) -> &'static str {
        match self {
            Func::Exp => "exp",
            Func::Ln => "ln",
            Func::Sin => "sin",
            Func::Cos => "cos",
            Func::Tg => "tg",
            Func::Ctg => "ctg",
            Func::Arcsin => "arcsin",
            Func::Arccos => "arccos",
            Func::Arctg => "arctg",
            Func::Arcctg => "arcctg",
            Func::Gamma => "gamma",
        }
    }

    /// Resolves a function name, including the usual aliases (`log`, `tan`, `atan`...).
    pub fn from_name(name: &str) -> Option<Func> {
        let func = match name {
            "exp" => Func::Exp,
            "ln" | "log" => Func::Ln,
            "sin" => Func::Sin,
            "cos" => Func::Cos,
            "tg" | "tan" => Func::Tg,
            "ctg" | "cot" => Func::Ctg,
            "arcsin" | "asin" => Func::Arcsin,
            "arccos" | "acos" => Func::Arccos,
            "arctg" | "arctan" | "atan" => Func::Arctg,
            "arcctg" | "arccot" | "acot" => Func::Arcctg,
            "gamma" => Func::Gamma,
            _ => return None,
        };
        Some(func)
    }

    /// Wraps `arg` into the corresponding expression node.
    pub fn apply(self, arg: Expr) -> Expr {
        let arg = Box::new(arg);
        match self {
            Func::Exp => Expr::Exp(arg),
            Func::Ln => Expr::Ln(arg),
            Func::Sin => Expr::sin(arg),
            Func::Cos => Expr::cos(arg),
            Func::Tg => Expr::tg(arg),
            Func::Ctg => Expr::ctg(arg),
            Func::Arcsin => Expr::arcsin(arg),
            Func::Arccos => Expr::arccos(arg),
            Func::Arctg => Expr::arctg(arg),
            Func::Arcctg => Expr::arcctg(arg),
            Func::Gamma => Expr::Gamma(arg),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Var(name) => write!(f, "{}", name),
            Expr::Const(val) => write!(f, "{}", val),
            Expr::Add(lhs, rhs) => write!(f, "({} + {})", lhs, rhs),
            Expr::Sub(lhs, rhs) => write!(f, "({} - {})", lhs, rhs),
            Expr::Mul(lhs, rhs) => write!(f, "({} * {})", lhs, rhs),
            Expr::Div(lhs, rhs) => write!(f, "({} / {})", lhs, rhs),
            Expr::Pow(base, exp) => write!(f, "({} ^ {})", base, exp),
            _ => match self.as_function() {
                Some((func, arg)) => write!(f, "{}({})", func.name(), arg),
                None => unreachable!("every remaining variant is a unary function"),
            },
        }
    }
}

impl std::ops::Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Expr::Add(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Expr::Sub(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Expr::Mul(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Div for Expr {
    type Output = Self;

    fn div(self, rhs: Self) -> Self::Output {
        Expr::Div(self.boxed(), rhs.boxed())
    }
}

impl std::ops::Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Expr::Mul(Box::new(Expr::Const(-1.0)), Box::new(self))
    }
}

impl Expr {
    /// BASIC FEATURES

    /// Creates multiple symbolic variables from a comma-separated string.
    ///
    /// # Examples
    /// ```rust, ignore
    /// let vars = Expr::Symbols("x, y, z");
    /// assert_eq!(vars.len(), 3);
    /// ```
    pub fn Symbols(symbols: &str) -> Vec<Expr> {
        symbols
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| Expr::Var(s.to_string()))
            .collect()
    }

    /// Convenience method to wrap expression in Box for recursive structures.
    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }

    /// Creates power expression self^rhs.
    pub fn pow(self, rhs: Expr) -> Expr {
        Expr::Pow(self.boxed(), rhs.boxed())
    }

    /// Creates exponential function e^(self).
    pub fn exp(self) -> Expr {
        Expr::Exp(self.boxed())
    }

    /// Creates natural logarithm ln(self).
    pub fn ln(self) -> Expr {
        Expr::Ln(self.boxed())
    }

    /// Creates Γ(self).
    pub fn gamma(self) -> Expr {
        Expr::Gamma(self.boxed())
    }

    /// The imaginary unit symbol.
    pub fn imaginary_unit() -> Expr {
        Expr::Var(IMAGINARY_UNIT.to_string())
    }

    /// Checks if expression is exactly zero (constant 0.0).
    pub fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(val) if *val == 0.0)
    }

    /// Numeric value of a constant node.
    pub fn as_const(&self) -> Option<f64> {
        match self {
            Expr::Const(val) => Some(*val),
            _ => None,
        }
    }

    /// Splits a unary function node into its function tag and argument.
    pub fn as_function(&self) -> Option<(Func, &Expr)> {
        let parts = match self {
            Expr::Exp(arg) => (Func::Exp, arg),
            Expr::Ln(arg) => (Func::Ln, arg),
            Expr::sin(arg) => (Func::Sin, arg),
            Expr::cos(arg) => (Func::Cos, arg),
            Expr::tg(arg) => (Func::Tg, arg),
            Expr::ctg(arg) => (Func::Ctg, arg),
            Expr::arcsin(arg) => (Func::Arcsin, arg),
            Expr::arccos(arg) => (Func::Arccos, arg),
            Expr::arctg(arg) => (Func::Arctg, arg),
            Expr::arcctg(arg) => (Func::Arcctg, arg),
            Expr::Gamma(arg) => (Func::Gamma, arg),
            _ => return None,
        };
        Some((parts.0, parts.1.as_ref()))
    }

    /// Rebuilds this node with every direct child replaced by `f(child)`.
    /// Leaves (`Var`, `Const`) are cloned unchanged.
    pub fn map_children(&self, f: &mut dyn FnMut(&Expr) -> Expr) -> Expr {
        match self {
            Expr::Var(_) | Expr::Const(_) => self.clone(),
            Expr::Add(lhs, rhs) => Expr::Add(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Sub(lhs, rhs) => Expr::Sub(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Mul(lhs, rhs) => Expr::Mul(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Div(lhs, rhs) => Expr::Div(f(lhs).boxed(), f(rhs).boxed()),
            Expr::Pow(base, exp) => Expr::Pow(f(base).boxed(), f(exp).boxed()),
            _ => match self.as_function() {
                Some((func, arg)) => func.apply(f(arg)),
                None => self.clone(),
            },
        }
    }

    /// Direct children of the node, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Var(_) | Expr::Const(_) => Vec::new(),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs)
            | Expr::Pow(lhs, rhs) => vec![lhs.as_ref(), rhs.as_ref()],
            _ => self.as_function().map(|(_, arg)| vec![arg]).unwrap_or_default(),
        }
    }

    /// Substitutes a variable with a constant value throughout the expression.
    pub fn set_variable(&self, var: &str, value: f64) -> Expr {
        self.substitute_variable(var, &Expr::Const(value))
    }

    /// Renames a variable throughout the expression.
    pub fn rename_variable(&self, old_var: &str, new_var: &str) -> Expr {
        self.substitute_variable(old_var, &Expr::Var(new_var.to_string()))
    }

    /// Substitutes a variable with an expression.
    pub fn substitute_variable(&self, var: &str, replacement: &Expr) -> Expr {
        match self {
            Expr::Var(name) if name == var => replacement.clone(),
            _ => self.map_children(&mut |child| child.substitute_variable(var, replacement)),
        }
    }

    /// Checks if the expression contains a variable.
    pub fn contains_variable(&self, var_name: &str) -> bool {
        match self {
            Expr::Var(name) => name == var_name,
            Expr::Const(_) => false,
            _ => self
                .children()
                .into_iter()
                .any(|child| child.contains_variable(var_name)),
        }
    }

    /// Sorted, deduplicated names of all variables appearing in the expression.
    pub fn all_arguments_are_variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names.into_iter().sorted().dedup().collect()
    }

    fn collect_variables(&self, out: &mut Vec<String>) {
        match self {
            Expr::Var(name) => out.push(name.clone()),
            _ => {
                for child in self.children() {
                    child.collect_variables(out);
                }
            }
        }
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(|child| child.node_count())
            .sum::<usize>()
    }

    /// Returns `base` if no variable of that name appears in any of `exprs`,
    /// otherwise the first of `base_1`, `base_2`, ... that is free.
    pub fn fresh_symbol(base: &str, exprs: &[&Expr]) -> String {
        let taken = |name: &str| {
            name == IMAGINARY_UNIT || exprs.iter().any(|e| e.contains_variable(name))
        };
        if !taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|i| format!("{}_{}", base, i))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

//___________________________________MACROS____________________________________

/// Macro to create symbolic variables from a comma-separated list
/// Usage: symbols!(x, y, z) -> creates variables x, y, z
#[macro_export]
macro_rules! symbols {
    ($($var:ident),+ $(,)?) => {
        {
            ($(
                $crate::symbolic::symbolic_engine::Expr::Var(stringify!($var).to_string())
            ),+)
        }
    };
}
