//! The formula store.
//!
//! Holds the original clauses, supplied before search, followed by the
//! clauses learned during search. Both only ever grow: nothing is removed and
//! stored literals are never rewritten. A clause is addressed by its
//! [`ClauseRef`], its position in the store, which stays valid throughout a
//! search.

use crate::sat::assignment::{Assignment, Solutions};
use crate::sat::clause::Clause;
use crate::sat::error::{Result, SolverError};
use crate::sat::literal::Literal;
use crate::sat::log::targets;
use core::ops::Index;
use std::fmt::{Display, Formatter};

/// The largest formula accepted, in variables.
///
/// Every variable costs a solver on the order of a hundred bytes before any
/// clause is read (two watch lists, trail and assignment slots, a selector
/// score), so this caps that up-front allocation at a few GiB. It sits well
/// below [`MAX_VARIABLE`](crate::sat::literal::MAX_VARIABLE).
pub const MAX_VARS: usize = 1 << 25;

/// Position of a clause in the store.
pub type ClauseRef = usize;

/// Search depth counter; `0` is the root.
pub type DecisionLevel = usize;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    pub clauses: Vec<Clause>,
    pub num_vars: usize,
    /// Learned clauses start at this index.
    pub non_learnt_idx: usize,
}

impl Cnf {
    /// An empty formula over `num_vars` variables.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidVariableCount`] if `num_vars` exceeds
    /// [`MAX_VARS`].
    pub fn new(num_vars: usize) -> Result<Self> {
        if num_vars > MAX_VARS {
            return Err(SolverError::InvalidVariableCount {
                requested: num_vars,
                max: MAX_VARS,
            });
        }

        Ok(Self {
            clauses: Vec::new(),
            num_vars,
            non_learnt_idx: 0,
        })
    }

    /// Builds a formula from 1-based signed DIMACS clauses, sizing it to the
    /// largest variable mentioned.
    ///
    /// # Errors
    ///
    /// [`SolverError::ZeroDimacsLiteral`] if any clause contains `0`.
    pub fn from_dimacs<I, C>(clauses: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: IntoIterator<Item = i32>,
    {
        let clauses = clauses
            .into_iter()
            .map(|c| {
                c.into_iter()
                    .map(|v| Literal::from_dimacs(v).ok_or(SolverError::ZeroDimacsLiteral))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        let num_vars = clauses
            .iter()
            .flatten()
            .map(|l| l.variable() as usize + 1)
            .max()
            .unwrap_or(0);

        let mut cnf = Self::new(num_vars)?;
        for clause in clauses {
            cnf.add_clause(clause)?;
        }
        Ok(cnf)
    }

    /// Adds an original clause.
    ///
    /// Original clauses occupy the prefix of the store, so if learned clauses
    /// already exist they shift up by one and any outside index over them
    /// (such as a propagator's watch lists) must be rebuilt.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidLiteral`] if any literal's variable is out of
    /// range. The store is left unchanged.
    pub fn add_clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Result<ClauseRef> {
        let clause = Clause::new(literals);
        self.check(&clause)?;

        let c_ref = self.non_learnt_idx;
        log::trace!(target: targets::CLAUSE_DB, "original clause {c_ref}: {clause}");
        self.clauses.insert(c_ref, clause);
        self.non_learnt_idx += 1;
        Ok(c_ref)
    }

    /// Appends a learned clause.
    pub fn add_learnt(&mut self, mut clause: Clause) -> ClauseRef {
        clause.learnt = true;
        let c_ref = self.clauses.len();
        log::trace!(target: targets::CLAUSE_DB, "learnt clause {c_ref}: {clause}");
        self.clauses.push(clause);
        c_ref
    }

    fn check(&self, clause: &Clause) -> Result<()> {
        match clause
            .iter()
            .find(|l| l.variable() as usize >= self.num_vars)
        {
            Some(&literal) => Err(SolverError::InvalidLiteral {
                literal,
                num_vars: self.num_vars,
            }),
            None => Ok(()),
        }
    }

    /// Total number of clauses, learned ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    #[must_use]
    pub fn num_original(&self) -> usize {
        self.non_learnt_idx
    }

    #[must_use]
    pub fn num_learnt(&self) -> usize {
        self.clauses.len() - self.non_learnt_idx
    }

    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    #[must_use]
    pub fn original(&self) -> &[Clause] {
        &self.clauses[..self.non_learnt_idx]
    }

    #[must_use]
    pub fn learnt(&self) -> &[Clause] {
        &self.clauses[self.non_learnt_idx..]
    }

    /// Number of literal occurrences across the original clauses.
    #[must_use]
    pub fn num_literals(&self) -> usize {
        self.original().iter().map(Clause::len).sum()
    }

    /// Every original clause has a true literal under `assignment`.
    #[must_use]
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.original().iter().all(|c| c.is_satisfied(assignment))
    }

    /// Checks a model against every original clause.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        self.original().iter().all(|c| c.is_satisfied_by(solutions))
    }
}

impl Index<ClauseRef> for Cnf {
    type Output = Clause;

    fn index(&self, index: ClauseRef) -> &Self::Output {
        &self.clauses[index]
    }
}

impl Display for Cnf {
    /// The original clauses in DIMACS CNF.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.non_learnt_idx)?;
        for clause in self.original() {
            writeln!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::MAX_VARIABLE;

    fn lit(v: i32) -> Literal {
        Literal::from_dimacs(v).unwrap()
    }

    #[test]
    fn test_from_dimacs_sizes_to_largest_variable() {
        let cnf = Cnf::from_dimacs(vec![vec![1, -2], vec![2, 5]]).unwrap();
        assert_eq!(cnf.num_vars, 5);
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.num_original(), 2);
        assert_eq!(cnf.num_learnt(), 0);
        assert_eq!(cnf.num_literals(), 4);
    }

    #[test]
    fn test_from_dimacs_rejects_zero() {
        assert_eq!(
            Cnf::from_dimacs(vec![vec![1, 0, 2]]),
            Err(SolverError::ZeroDimacsLiteral)
        );
    }

    #[test]
    fn test_add_clause_rejects_out_of_range() {
        let mut cnf = Cnf::new(2).unwrap();
        let err = cnf.add_clause([lit(1), lit(3)]).unwrap_err();
        assert_eq!(
            err,
            SolverError::InvalidLiteral {
                literal: lit(3),
                num_vars: 2
            }
        );
        assert!(cnf.is_empty());
    }

    #[test]
    fn test_too_many_variables() {
        assert!(Cnf::new(MAX_VARS).is_ok());
        assert_eq!(
            Cnf::new(MAX_VARS + 1),
            Err(SolverError::InvalidVariableCount {
                requested: MAX_VARS + 1,
                max: MAX_VARS
            })
        );
        assert!(matches!(
            Cnf::new(1 << 31),
            Err(SolverError::InvalidVariableCount { .. })
        ));
        assert!(matches!(
            Cnf::from_dimacs([[i32::MIN]]),
            Err(SolverError::InvalidVariableCount { requested, .. }) if requested == 1 << 31
        ));
    }

    #[test]
    fn test_largest_encodable_variable_is_out_of_range() {
        let top = Literal::new(MAX_VARIABLE, false);
        let mut cnf = Cnf::new(1).unwrap();
        assert_eq!(
            cnf.add_clause([top]),
            Err(SolverError::InvalidLiteral {
                literal: top,
                num_vars: 1
            })
        );
        assert_eq!(cnf.add_clause([lit(-1)]), Ok(0));
        assert_eq!(cnf[0], Clause::new([Literal::new(0, false)]));
    }

    #[test]
    fn test_learnt_clauses_follow_originals() {
        let mut cnf = Cnf::new(2).unwrap();
        cnf.add_clause([lit(1), lit(2)]).unwrap();
        let c_ref = cnf.add_learnt(Clause::learnt([lit(-1)]));
        assert_eq!(c_ref, 1);
        assert_eq!(cnf.num_original(), 1);
        assert_eq!(cnf.num_learnt(), 1);
        assert!(cnf[c_ref].learnt);
        assert_eq!(cnf.learnt().len(), 1);
        assert_eq!(cnf.original()[0], Clause::new([lit(1), lit(2)]));
    }

    #[test]
    fn test_original_added_after_learning_keeps_prefix() {
        let mut cnf = Cnf::new(2).unwrap();
        cnf.add_clause([lit(1), lit(2)]).unwrap();
        cnf.add_learnt(Clause::learnt([lit(-1)]));
        let c_ref = cnf.add_clause([lit(-2)]).unwrap();
        assert_eq!(c_ref, 1);
        assert_eq!(cnf.num_original(), 2);
        assert!(!cnf[1].learnt);
        assert!(cnf[2].learnt);
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::from_dimacs(vec![vec![1, 2], vec![-1]]).unwrap();
        assert!(cnf.verify(&Solutions::new(vec![false, true])));
        assert!(!cnf.verify(&Solutions::new(vec![true, true])));
    }

    #[test]
    fn test_display_is_dimacs() {
        let cnf = Cnf::from_dimacs(vec![vec![1, -2], vec![2]]).unwrap();
        assert_eq!(cnf.to_string(), "p cnf 2 2\n1 -2 0\n2 0\n");
    }
}
