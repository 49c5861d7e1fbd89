#![allow(non_camel_case_types)]

use crate::symbolic::parse_expr::ParseError;
use crate::symbolic::symbolic_engine::Expr;
use nalgebra::DMatrix;
use rayon::prelude::*;

///
/// calculate symbolic jacobian and evaluate it
/// Example#
/// ```rust, ignore
/// use RustedFracCalc::symbolic::symbolic_functions::Jacobian;
///  let mut Jacobian_instance = Jacobian::new();
///  // function of 2 or more arguments
///  let vec_of_expressions = vec!["2*x^3+y".to_string(), "1".to_string()];
///  Jacobian_instance.set_funcvecor_from_str(vec_of_expressions).unwrap();
///  Jacobian_instance.set_varvecor_from_str("x, y");
///  Jacobian_instance.calc_jacobian();
///  Jacobian_instance.readable_jacobian();
///  let evaluated = Jacobian_instance.evaluate_func_jacobian_DMatrix(&[1.0, 2.0]);
/// ```
pub struct Jacobian {
    pub vector_of_functions: Vec<Expr>,    // vector of symbolic functions/expressions
    pub variable_string: Vec<String>,      // vector of string representation of variables
    pub symbolic_jacobian: Vec<Vec<Expr>>, // vector of symbolic jacobian
    pub readable_jacobian: Vec<Vec<String>>, // human readable jacobian
}

impl Default for Jacobian {
    fn default() -> Self {
        Self::new()
    }
}

impl Jacobian {
    pub fn new() -> Self {
        Self {
            vector_of_functions: Vec::new(),
            variable_string: Vec::new(),
            symbolic_jacobian: Vec::new(),
            readable_jacobian: Vec::new(),
        }
    }

    pub fn from_vectors(vector_of_functions: Vec<Expr>, variables: &[&str]) -> Self {
        let mut instance = Self::new();
        instance.vector_of_functions = vector_of_functions;
        instance.variable_string = variables.iter().map(|v| v.to_string()).collect();
        instance
    }

    /// parse the functions from strings
    pub fn set_funcvecor_from_str(&mut self, value: Vec<String>) -> Result<(), ParseError> {
        let refs: Vec<&str> = value.iter().map(|s| s.as_str()).collect();
        self.vector_of_functions = Expr::parse_vector_expression(&refs)?;
        Ok(())
    }

    /// set the variables from a comma-separated string
    pub fn set_varvecor_from_str(&mut self, symbols: &str) {
        self.variable_string = Expr::Symbols(symbols)
            .into_iter()
            .map(|v| v.to_string())
            .collect();
    }

    /// calculate the symbolic jacobian in parallel
    pub fn calc_jacobian(&mut self) {
        let variables: Vec<&str> = self.variable_string.iter().map(|s| s.as_str()).collect();
        self.symbolic_jacobian = jacobian(&self.vector_of_functions, &variables);
    }

    /// turn jacobian into readable format
    pub fn readable_jacobian(&mut self) {
        self.readable_jacobian = self
            .symbolic_jacobian
            .iter()
            .map(|row| row.iter().map(|element| element.to_string()).collect())
            .collect();
    }

    pub fn evaluate_func_jacobian_DMatrix(&self, x: &[f64]) -> DMatrix<f64> {
        let variables: Vec<&str> = self.variable_string.iter().map(|s| s.as_str()).collect();
        evaluate_matrix(&self.symbolic_jacobian, &variables, x)
    }
}

/// Differentiates successively by each variable in order (mixed partial derivative).
/// An empty list returns the simplified expression.
pub fn derivative_sequence(expr: &Expr, vars: &[&str]) -> Expr {
    vars.iter()
        .fold(expr.simplify(), |acc, var| acc.diff(var).simplify())
}

/// First-order partial derivatives, one per variable.
pub fn gradient(expr: &Expr, vars: &[&str]) -> Vec<Expr> {
    vars.iter().map(|var| expr.diff(var).simplify()).collect()
}

/// The jacobian of a single scalar function: a 1 x n matrix holding its gradient.
pub fn jacobian_row(expr: &Expr, vars: &[&str]) -> Vec<Vec<Expr>> {
    vec![gradient(expr, vars)]
}

/// m x n jacobian of a vector of functions, rows computed in parallel.
pub fn jacobian(functions: &[Expr], vars: &[&str]) -> Vec<Vec<Expr>> {
    functions
        .par_iter()
        .map(|function| gradient(function, vars))
        .collect()
}

/// n x n matrix of second derivatives.
pub fn hessian(expr: &Expr, vars: &[&str]) -> Vec<Vec<Expr>> {
    gradient(expr, vars)
        .iter()
        .map(|first| gradient(first, vars))
        .collect()
}

/// Evaluates a symbolic matrix at a point.
///
/// # Panics
/// Panics if an element contains a variable missing from `vars`, or if the rows are ragged.
pub fn evaluate_matrix(matrix: &[Vec<Expr>], vars: &[&str], values: &[f64]) -> DMatrix<f64> {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, |row| row.len());
    assert!(
        matrix.iter().all(|row| row.len() == cols),
        "matrix rows have different lengths"
    );
    DMatrix::from_fn(rows, cols, |i, j| matrix[i][j].eval_expression(vars, values))
}
