// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_snake_case)]

use crate::fractional::order::Order;
use crate::fractional::resolver::{DifferintegralRequest, FractionalResolver};
use crate::symbolic::symbolic_engine::Expr;
use crate::symbolic::symbolic_functions::{gradient, hessian, jacobian_row, Jacobian};
use num_complex::Complex64;

fn parse_or_report(input: &str) -> Option<Expr> {
    match Expr::parse_expression(input) {
        Ok(expr) => Some(expr),
        Err(e) => {
            println!("cannot parse '{}': {}", input, e);
            None
        }
    }
}

/// Demo cases, resolved with a configured resolver.
pub fn fractional_examples_with(resolver: &FractionalResolver, example: usize) {
    match example {
        0 => {
            // POWER RULE: polynomials and pure powers
            for (input, order) in [
                ("x^3", Order::Real(0.5)),
                ("3*x^4 + 2*x^2 + 5", Order::Integer(2)),
                ("sqrt(x)", Order::Rational(1, 2)),
                ("x^2", Order::Complex(Complex64::new(0.5, 1.0))),
                ("x^2", Order::Symbolic(Expr::Var("alpha".to_string()))),
            ] {
                let Some(expr) = parse_or_report(input) else {
                    continue;
                };
                let result = resolver.resolve(&expr, "x", &order);
                println!("D^({}) {} = {}", order, input, result);
            }
        }
        1 => {
            // LOOKUP TABLE: named functions at tabulated orders
            for (input, order) in [
                ("sin(x)", Order::Real(0.5)),
                ("cos(x)", Order::Real(1.5)),
                ("exp(x)", Order::Real(0.3)),
                ("log(x)", Order::Real(0.5)),
                ("log(x)", Order::Integer(1)),
            ] {
                let Some(expr) = parse_or_report(input) else {
                    continue;
                };
                let result = resolver.resolve(&expr, "x", &order);
                println!("D^({}) {} = {}", order, input, result);
            }
        }
        2 => {
            // MELLIN TRANSFORM fallback, including failures with their reason
            for (input, order) in [
                ("x^-0.5*exp(-x)", Order::Real(0.5)),
                ("x^-0.5*(1+x)^-1", Order::Real(0.5)),
                ("x*sin(x)", Order::Integer(0)),
                ("exp(-x)", Order::Real(0.5)),
                ("1/x", Order::Real(0.5)),
            ] {
                let Some(expr) = parse_or_report(input) else {
                    continue;
                };
                let result = resolver.resolve(&expr, "x", &order);
                println!("D^({}) {} = {}", order, input, result);
            }
        }
        3 => {
            // BATCH: independent requests resolved in parallel
            let requests: Vec<DifferintegralRequest> = ["x^2", "x^3 + x", "exp(x)", "x^-0.5*exp(-x)"]
                .iter()
                .filter_map(|input| parse_or_report(input))
                .map(|expr| DifferintegralRequest::new(expr, "x", Order::Real(0.5)))
                .collect();
            for (request, result) in requests.iter().zip(resolver.resolve_batch(&requests)) {
                println!("D^(0.5) {} = {}", request.expr, result);
            }
        }
        4 => {
            // ORDINARY AND PARTIAL DERIVATIVES
            let Some(f) = parse_or_report("x^2*y + exp(x*y)") else {
                return;
            };
            let vars = ["x", "y"];
            println!("gradient = {:?}", gradient(&f, &vars).iter().map(|e| e.to_string()).collect::<Vec<_>>());
            println!("jacobian row = {:?}", jacobian_row(&f, &vars).len());
            let h = hessian(&f, &vars);
            for row in &h {
                println!("hessian row: {}", row.iter().map(|e| e.to_string()).collect::<Vec<_>>().join(", "));
            }
            println!("d3f/dx3 = {}", f.n_th_derivative1D("x", 3));

            let mut jacobian_instance = Jacobian::new();
            let functions = vec!["2*x^3+y".to_string(), "sin(x)*y".to_string()];
            if let Err(e) = jacobian_instance.set_funcvecor_from_str(functions) {
                println!("cannot parse functions: {}", e);
                return;
            }
            jacobian_instance.set_varvecor_from_str("x, y");
            jacobian_instance.calc_jacobian();
            jacobian_instance.readable_jacobian();
            println!("jacobian = {:?}", jacobian_instance.readable_jacobian);
            let evaluated = jacobian_instance.evaluate_func_jacobian_DMatrix(&[1.0, 2.0]);
            println!("jacobian at (1, 2) = {}", evaluated);
        }
        _ => {
            println!("no example with number {}", example);
        }
    }
}
