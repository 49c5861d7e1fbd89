//! a module turns a String expression into a symbolic expression
//!
//! Grammar (lowest to highest precedence):
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary | implicit)*      implicit: "2x", "3(x+1)", "2sin(x)"
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') unary)?              right associative, "x^-2" allowed
//! primary := number | function '(' sum ')' | identifier | '(' sum ')'
//! ```
//! `pi` and `E` are the numeric constants, `sqrt(u)` becomes `u^0.5`, `log` is the natural
//! logarithm, `tan/cot/asin/...` are aliases of the engine's `tg/ctg/arcsin/...`.
//!
//!# Example
//! ```rust, ignore
//! use RustedFracCalc::symbolic::symbolic_engine::Expr;
//! let parsed_expression = Expr::parse_expression("2x^2 + sin(x)/y").unwrap();
//! println!(" parsed_expression {}", parsed_expression);
//! ```
use crate::symbolic::symbolic_engine::{Expr, Func};
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1, multispace0, one_of, satisfy},
    combinator::{map, map_res, opt, peek, recognize},
    error::ErrorKind,
    multi::many0,
    sequence::{delimited, pair, preceded},
};
use std::f64::consts::{E, PI};
use std::fmt;

/// Failure to turn a string into an [`Expr`].
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    Empty,
    Syntax(String),
    TrailingInput { position: usize, rest: String },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty expression"),
            ParseError::Syntax(msg) => write!(f, "syntax error: {}", msg),
            ParseError::TrailingInput { position, rest } => {
                write!(f, "unexpected input at position {}: '{}'", position, rest)
            }
        }
    }
}

impl std::error::Error for ParseError {}

fn ws<'a, O, P>(inner: P) -> impl Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>
where
    P: Parser<&'a str, Output = O, Error = nom::error::Error<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

fn number(input: &str) -> IResult<&str, f64> {
    // "2.5" | "2." | "2" | ".5"
    let mantissa = alt((
        recognize(pair(digit1, pair(char('.'), digit1))),
        recognize(pair(digit1, opt(char('.')))),
        recognize(pair(char('.'), digit1)),
    ));
    // the exponent is taken only when digits follow, so "2exp(x)" stays 2 * exp(x)
    let exponent = opt((one_of("eE"), opt(one_of("+-")), digit1));
    let mut parser = map_res(recognize(pair(mantissa, exponent)), |s: &str| s.parse::<f64>());
    parser.parse(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    let mut parser = recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_")))),
    ));
    parser.parse(input)
}

fn symbol(name: &str) -> Expr {
    match name {
        "pi" => Expr::Const(PI),
        "E" => Expr::Const(E),
        _ => Expr::Var(name.to_string()),
    }
}

fn negate(expr: Expr) -> Expr {
    match expr {
        Expr::Const(c) => Expr::Const(-c),
        other => -other,
    }
}

fn function_call(input: &str) -> IResult<&str, Expr> {
    let (rest, name) = identifier(input)?;
    let mut argument = delimited(
        preceded(multispace0, char('(')),
        sum,
        preceded(multispace0, char(')')),
    );
    let (rest, arg) = argument.parse(rest)?;
    if name == "sqrt" {
        return Ok((rest, arg.pow(Expr::Const(0.5))));
    }
    match Func::from_name(name) {
        Some(func) => Ok((rest, func.apply(arg))),
        None => Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Verify))),
    }
}

fn primary(input: &str) -> IResult<&str, Expr> {
    let (input, _) = multispace0(input)?;
    let mut parser = alt((
        map(number, Expr::Const),
        function_call,
        map(identifier, symbol),
        delimited(char('('), sum, preceded(multispace0, char(')'))),
    ));
    parser.parse(input)
}

fn power(input: &str) -> IResult<&str, Expr> {
    let (input, base) = primary(input)?;
    let mut exponent = opt(preceded(ws(alt((tag("**"), tag("^")))), unary));
    let (input, exponent) = exponent.parse(input)?;
    match exponent {
        Some(exp) => Ok((input, base.pow(exp))),
        None => Ok((input, base)),
    }
}

fn unary(input: &str) -> IResult<&str, Expr> {
    let mut parser = alt((
        map(preceded(ws(char('-')), unary), negate),
        preceded(ws(char('+')), unary),
        power,
    ));
    parser.parse(input)
}

fn product(input: &str) -> IResult<&str, Expr> {
    let (input, first) = unary(input)?;
    let explicit = pair(ws(one_of("*/")), unary);
    let implicit = map(
        preceded(
            multispace0,
            preceded(peek(satisfy(|c: char| c.is_ascii_alphabetic() || c == '_' || c == '(')), power),
        ),
        |factor| ('*', factor),
    );
    let mut factors = many0(alt((explicit, implicit)));
    let (input, factors) = factors.parse(input)?;
    let expr = factors.into_iter().fold(first, |acc, (op, factor)| match op {
        '/' => acc / factor,
        _ => acc * factor,
    });
    Ok((input, expr))
}

fn sum(input: &str) -> IResult<&str, Expr> {
    let (input, first) = product(input)?;
    let mut terms = many0(pair(ws(one_of("+-")), product));
    let (input, terms) = terms.parse(input)?;
    let expr = terms.into_iter().fold(first, |acc, (op, term)| match op {
        '-' => acc - term,
        _ => acc + term,
    });
    Ok((input, expr))
}

/// Parses a whole string; anything left unconsumed is an error.
pub fn parse_expression_func(input: &str) -> Result<Expr, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::Empty);
    }
    match sum(trimmed) {
        Ok((rest, expr)) => {
            let rest = rest.trim();
            if rest.is_empty() {
                Ok(expr)
            } else {
                Err(ParseError::TrailingInput {
                    position: trimmed.len() - rest.len(),
                    rest: rest.to_string(),
                })
            }
        }
        Err(e) => Err(ParseError::Syntax(e.to_string())),
    }
}

impl Expr {
    /// EXPRESSION PARSING FROM STRINGS

    /// Parses a mathematical expression from string representation.
    ///
    /// # Supported Syntax
    /// - Variables: x, y, var_name
    /// - Constants: 3.14, 2.5e-3, pi, E
    /// - Operators: +, -, *, /, ^, ** and implicit multiplication (2x, 3(x+1))
    /// - Functions: sin, cos, tg/tan, ctg/cot, arcsin/asin, arccos/acos, arctg/atan,
    ///   arcctg/acot, exp, ln/log, sqrt, gamma
    pub fn parse_expression(input: &str) -> Result<Expr, ParseError> {
        parse_expression_func(input)
    }

    /// Parses every string of the slice, stopping at the first error.
    pub fn parse_vector_expression(inputs: &[&str]) -> Result<Vec<Expr>, ParseError> {
        inputs.iter().map(|input| Expr::parse_expression(input)).collect()
    }
}
