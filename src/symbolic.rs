#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// a module turns a String expression into a symbolic expression
///
///# Example
/// ```
/// use RustedFracCalc::symbolic::symbolic_engine::Expr;
/// let parsed_expression = Expr::parse_expression("x^2.3*log(x+y+y^2.6)").unwrap();
/// println!("parsed_expression {}", parsed_expression);
/// assert_eq!(parsed_expression.all_arguments_are_variables(), vec!["x", "y"]);
///  ```
/// ________________________________________________________________________________________________________________________________
pub mod parse_expr;
///____________________________________________________________________________________________________________________________
/// # Symbolic engine
/// the expression tree, its operators and structural helpers (substitution, renaming, fresh symbols)
///# Example#
/// ```
/// use RustedFracCalc::symbolic::symbolic_engine::Expr;
/// let x = Expr::Var("x".to_string());
/// let f = x.clone().pow(Expr::Const(2.0)) + x.exp();
/// assert!(f.contains_variable("x"));
/// let g = f.rename_variable("x", "t");
/// println!("{}", g);
/// ```
pub mod symbolic_engine;
/// differentiation and numerical evaluation
///# Example#
/// ```
/// use RustedFracCalc::symbolic::symbolic_engine::Expr;
/// let f = Expr::parse_expression("exp(x)+log(y)").unwrap();
/// let df_dx = f.diff("x").simplify();
/// let df_dy = f.diff("y").simplify();
/// println!("df_dx = {}, df_dy = {}", df_dx, df_dy);
/// assert_eq!(df_dy.eval_expression(&["x", "y"], &[0.0, 2.0]), 0.5);
/// ```
pub mod symbolic_engine_derivatives;
/// algebraic simplification: constant folding, identities, power and gamma rules
pub mod symbolic_simplify;
/// polynomial detection and coefficient extraction
pub mod polynomial;
/// gamma function (real and complex), falling factorials, pole detection
pub mod special_functions;
/// forward and inverse Mellin transforms over a table of kernels
pub mod mellin;
///____________________________________________________________________________________________________________________________
/// # Symbolic functions
/// gradients, jacobians and hessians of symbolic expressions
///# Example#
/// ```
/// use RustedFracCalc::symbolic::symbolic_functions::Jacobian;
/// let mut jacobian_instance = Jacobian::new();
/// let vector_of_functions = vec!["2*x^3+y".to_string(), "1.0".to_string()];
/// jacobian_instance.set_funcvecor_from_str(vector_of_functions).unwrap();
/// jacobian_instance.set_varvecor_from_str("x, y");
/// jacobian_instance.calc_jacobian();
/// jacobian_instance.readable_jacobian();
/// println!("Jacobian_DMatrix: {:?}", jacobian_instance.readable_jacobian);
/// ```
pub mod symbolic_functions;
/// the algebra engine interface consumed by the fractional resolver
pub mod symbolic_traits;
