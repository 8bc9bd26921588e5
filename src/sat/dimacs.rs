#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! A reader for the DIMACS CNF format.
//!
//! - Lines starting with `c` are comments.
//! - `p cnf <variables> <clauses>` declares the problem size. The variable
//!   count sizes the formula; without it the largest variable seen is used.
//! - Everything else is whitespace-separated signed literals, each clause
//!   terminated by `0`. A clause may span lines, and a final clause missing
//!   its `0` is accepted.
//! - A line starting with `%` ends the input.
//!
//! Writing is the [`Display`](std::fmt::Display) impl of [`Cnf`].

use crate::sat::cnf::Cnf;
use crate::sat::error::DimacsError;
use crate::sat::literal::Literal;
use crate::sat::log::targets;
use std::io::{self, BufRead};
use std::path::Path;

/// The declared sizes from a `p cnf` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub num_vars: usize,
    pub num_clauses: usize,
}

fn parse_header(line: &str, line_no: usize) -> Result<Header, DimacsError> {
    let invalid = || DimacsError::InvalidHeader {
        line: line_no,
        content: line.to_string(),
    };

    let mut parts = line.split_whitespace();
    if parts.next() != Some("p") || parts.next() != Some("cnf") {
        return Err(invalid());
    }
    let num_vars = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    let num_clauses = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    Ok(Header {
        num_vars,
        num_clauses,
    })
}

/// Reads a DIMACS CNF formula.
///
/// # Errors
///
/// - [`DimacsError::Io`] if reading fails.
/// - [`DimacsError::InvalidHeader`] for a malformed `p` line.
/// - [`DimacsError::InvalidToken`] for anything that is not a 32-bit integer.
/// - [`DimacsError::Solver`] if a literal exceeds the declared variable count.
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut header = None;
    let mut clauses: Vec<Vec<Literal>> = Vec::new();
    let mut current = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let mut tokens = line.split_whitespace().peekable();

        match tokens.peek() {
            None => continue,
            Some(t) if t.starts_with('%') => break,
            Some(t) if t.starts_with('c') => continue,
            Some(&"p") => {
                header = Some(parse_header(&line, line_no)?);
                continue;
            }
            Some(_) => {}
        }

        for token in tokens {
            let value: i32 = token.parse().map_err(|_| DimacsError::InvalidToken {
                line: line_no,
                token: token.to_string(),
            })?;

            match Literal::from_dimacs(value) {
                Some(lit) => current.push(lit),
                None => clauses.push(std::mem::take(&mut current)),
            }
        }
    }

    if !current.is_empty() {
        clauses.push(current);
    }

    let num_vars = match header {
        Some(h) => {
            if h.num_clauses != clauses.len() {
                log::warn!(
                    target: targets::CLAUSE_DB,
                    "header declares {} clauses, read {}",
                    h.num_clauses,
                    clauses.len()
                );
            }
            h.num_vars
        }
        None => clauses
            .iter()
            .flatten()
            .map(|lit| lit.variable() as usize + 1)
            .max()
            .unwrap_or(0),
    };

    let mut cnf = Cnf::new(num_vars)?;
    for clause in clauses {
        cnf.add_clause(clause)?;
    }
    Ok(cnf)
}

/// Reads a DIMACS CNF formula from a string.
///
/// # Errors
///
/// As [`parse_dimacs`].
pub fn parse_str(input: &str) -> Result<Cnf, DimacsError> {
    parse_dimacs(input.as_bytes())
}

/// Reads a DIMACS CNF file.
///
/// # Errors
///
/// As [`parse_dimacs`], plus [`DimacsError::Io`] if the file cannot be
/// opened.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cnf, DimacsError> {
    let file = std::fs::File::open(path)?;
    parse_dimacs(io::BufReader::new(file))
}
