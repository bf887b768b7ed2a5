//! Formula error types

use std::fmt;

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// The stage in which the recursion guard tripped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Parse,
    Evaluate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Parse => write!(f, "parsing"),
            Phase::Evaluate => write!(f, "evaluation"),
        }
    }
}

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Structural problem in the formula text
    #[error("Malformed expression at position {position}: {message}")]
    MalformedExpression { position: usize, message: String },

    /// Nesting exceeded the configured depth
    #[error("Recursion limit of {limit} exceeded during {phase}")]
    RecursionLimit { limit: usize, phase: Phase },

    /// Variable absent from the mapping and no fallback was supplied
    #[error("Missing variable: {0}")]
    MissingVariable(String),

    /// Tree or operator that cannot be evaluated
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
}

impl FormulaError {
    /// Create a malformed-expression error at a character position
    pub fn malformed<S: Into<String>>(position: usize, message: S) -> Self {
        FormulaError::MalformedExpression {
            position,
            message: message.into(),
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FormulaError::MalformedExpression { .. })
    }

    pub fn is_recursion_limit(&self) -> bool {
        matches!(self, FormulaError::RecursionLimit { .. })
    }

    pub fn is_missing_variable(&self) -> bool {
        matches!(self, FormulaError::MissingVariable(_))
    }

    /// Character position for structural errors
    pub fn position(&self) -> Option<usize> {
        match self {
            FormulaError::MalformedExpression { position, .. } => Some(*position),
            _ => None,
        }
    }
}
