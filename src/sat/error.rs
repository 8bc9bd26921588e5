//! Error types.
//!
//! Only malformed input is an error. Conflicts drive the search and never
//! escape it, and unsatisfiability or an exhausted budget are ordinary
//! [`SolveResult`](crate::sat::solver::SolveResult) outcomes.

use crate::sat::literal::Literal;
use thiserror::Error;

/// Setup errors raised while building a formula.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// The literal names a variable outside `0..num_vars`.
    #[error("literal {literal:?} (variable {}) is out of range for {num_vars} variables", .literal.variable())]
    InvalidLiteral { literal: Literal, num_vars: usize },

    /// More variables than a formula may hold.
    #[error("cannot create a solver over {requested} variables (maximum {max})")]
    InvalidVariableCount { requested: usize, max: usize },

    /// `0` terminates DIMACS clauses and is not a literal.
    #[error("0 is not a valid DIMACS literal")]
    ZeroDimacsLiteral,
}

/// Failures while reading DIMACS CNF input.
#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: cannot parse '{token}' as a literal")]
    InvalidToken { line: usize, token: String },

    #[error("line {line}: malformed problem line '{content}'")]
    InvalidHeader { line: usize, content: String },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Convenient alias for fallible formula construction.
pub type Result<T> = std::result::Result<T, SolverError>;
