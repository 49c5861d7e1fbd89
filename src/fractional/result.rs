//! Outcome types of the resolver: method provenance on success, a typed error on failure.

use crate::symbolic::symbolic_engine::Expr;
use std::fmt;
use strum_macros::Display;

/// Which tier produced a differintegral.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum MethodTag {
    #[strum(serialize = "riemann-liouville-power")]
    RiemannLiouvillePower,
    #[strum(serialize = "lookup-table")]
    LookupTable,
    #[strum(serialize = "mellin-transform")]
    MellinTransform,
}

/// Machine-readable failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FailureKind {
    /// a gamma function argument hit a non-positive integer
    UndefinedAtPole,
    /// no symbolic forward Mellin transform
    TransformUnavailable,
    /// the transform-domain product could not be inverted
    InversionUnavailable,
    /// a tier panicked
    InternalError,
    UnsupportedOrder,
    /// the host raised the interrupt flag
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DifferintegralError {
    pub kind: FailureKind,
    pub message: String,
    /// the un-invertible transform-domain expression, for inversion failures
    pub transform_domain: Option<Expr>,
}

impl DifferintegralError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        DifferintegralError {
            kind,
            message: message.into(),
            transform_domain: None,
        }
    }

    pub fn with_transform_domain(mut self, transform: Expr) -> Self {
        self.transform_domain = Some(transform);
        self
    }
}

impl fmt::Display for DifferintegralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(transform) = &self.transform_domain {
            write!(f, " (transform-domain expression: {})", transform)?;
        }
        Ok(())
    }
}

impl std::error::Error for DifferintegralError {}

#[derive(Debug, Clone, PartialEq)]
pub enum DifferintegralResult {
    Success { expr: Expr, method: MethodTag },
    Failure(DifferintegralError),
}

impl DifferintegralResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DifferintegralResult::Success { .. })
    }

    pub fn method(&self) -> Option<MethodTag> {
        match self {
            DifferintegralResult::Success { method, .. } => Some(*method),
            DifferintegralResult::Failure(_) => None,
        }
    }

    pub fn expr(&self) -> Option<&Expr> {
        match self {
            DifferintegralResult::Success { expr, .. } => Some(expr),
            DifferintegralResult::Failure(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error().map(|error| error.kind)
    }

    pub fn error(&self) -> Option<&DifferintegralError> {
        match self {
            DifferintegralResult::Success { .. } => None,
            DifferintegralResult::Failure(error) => Some(error),
        }
    }

    /// `(expression, method)` or the error, for use with `?`.
    pub fn into_result(self) -> Result<(Expr, MethodTag), DifferintegralError> {
        match self {
            DifferintegralResult::Success { expr, method } => Ok((expr, method)),
            DifferintegralResult::Failure(error) => Err(error),
        }
    }
}

impl fmt::Display for DifferintegralResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DifferintegralResult::Success { expr, method } => write!(f, "{} [{}]", expr, method),
            DifferintegralResult::Failure(error) => write!(f, "failed: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_display() {
        assert_eq!(MethodTag::RiemannLiouvillePower.to_string(), "riemann-liouville-power");
        assert_eq!(MethodTag::LookupTable.to_string(), "lookup-table");
        assert_eq!(MethodTag::MellinTransform.to_string(), "mellin-transform");
        assert_eq!(FailureKind::UndefinedAtPole.to_string(), "UndefinedAtPole");
    }

    #[test]
    fn test_accessors() {
        let success = DifferintegralResult::Success {
            expr: Expr::Var("x".to_string()),
            method: MethodTag::LookupTable,
        };
        assert!(success.is_success());
        assert_eq!(success.method(), Some(MethodTag::LookupTable));
        assert_eq!(success.failure_kind(), None);

        let failure = DifferintegralResult::Failure(
            DifferintegralError::new(FailureKind::InversionUnavailable, "no pattern")
                .with_transform_domain(Expr::Var("s".to_string()).gamma()),
        );
        assert!(!failure.is_success());
        assert_eq!(failure.failure_kind(), Some(FailureKind::InversionUnavailable));
        assert!(failure.to_string().contains("gamma(s)"));
        assert!(failure.into_result().is_err());
    }
}
