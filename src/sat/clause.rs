//! A disjunction of literals.

use crate::sat::assignment::{Assignment, Solutions};
use crate::sat::literal::Literal;
use core::ops::Index;
use itertools::Itertools;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// Literal storage for a clause. Most clauses in practice are short.
pub type LiteralStorage = SmallVec<[Literal; 8]>;

/// How a clause stands under a partial assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseState {
    /// At least one literal is true.
    Satisfied,
    /// Every literal is false.
    Falsified,
    /// Not satisfied, and exactly this literal is unassigned.
    Unit(Literal),
    /// Not satisfied, two or more literals unassigned.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Clause {
    pub literals: LiteralStorage,
    pub learnt: bool,
}

impl Clause {
    /// Builds a clause, dropping repeated literals.
    #[must_use]
    pub fn new<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        let mut seen = FxHashSet::default();
        let literals = literals.into_iter().filter(|l| seen.insert(*l)).collect();
        Self {
            literals,
            learnt: false,
        }
    }

    /// Builds a learned clause, keeping literal order as given.
    #[must_use]
    pub fn learnt<I: IntoIterator<Item = Literal>>(literals: I) -> Self {
        Self {
            literals: literals.into_iter().collect(),
            learnt: true,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.len() == 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &Literal> {
        self.literals.iter()
    }

    /// Contains both polarities of some variable.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        self.literals
            .iter()
            .tuple_combinations()
            .any(|(a, b)| a.is_complement_of(*b))
    }

    /// Classifies every literal under `assignment`.
    #[must_use]
    pub fn state(&self, assignment: &Assignment) -> ClauseState {
        let mut unassigned = None;
        let mut open = 0_usize;

        for &lit in &self.literals {
            match assignment.literal_value(lit) {
                Some(true) => return ClauseState::Satisfied,
                Some(false) => {}
                None => {
                    open += 1;
                    unassigned = Some(lit);
                }
            }
        }

        match (open, unassigned) {
            (0, _) => ClauseState::Falsified,
            (1, Some(lit)) => ClauseState::Unit(lit),
            _ => ClauseState::Unresolved,
        }
    }

    #[must_use]
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.literals
            .iter()
            .any(|&lit| assignment.literal_value(lit) == Some(true))
    }

    /// Whether a complete model satisfies this clause.
    #[must_use]
    pub fn is_satisfied_by(&self, model: &Solutions) -> bool {
        self.literals.iter().any(|&lit| model.satisfies(lit))
    }
}

impl Index<usize> for Clause {
    type Output = Literal;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl<'a> IntoIterator for &'a Clause {
    type Item = &'a Literal;
    type IntoIter = std::slice::Iter<'a, Literal>;

    fn into_iter(self) -> Self::IntoIter {
        self.literals.iter()
    }
}

impl From<Vec<Literal>> for Clause {
    fn from(literals: Vec<Literal>) -> Self {
        Self::new(literals)
    }
}

impl From<&[Literal]> for Clause {
    fn from(literals: &[Literal]) -> Self {
        Self::new(literals.iter().copied())
    }
}

impl Display for Clause {
    /// One DIMACS clause line.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for lit in &self.literals {
            write!(f, "{lit} ")?;
        }
        write!(f, "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(v: i32) -> Literal {
        Literal::from_dimacs(v).unwrap()
    }

    #[test]
    fn test_new_drops_duplicates() {
        let clause = Clause::new([lit(1), lit(2), lit(1), lit(-3)]);
        assert_eq!(clause.len(), 3);
        assert_eq!(clause[0], lit(1));
        assert_eq!(clause[1], lit(2));
        assert_eq!(clause[2], lit(-3));
        assert!(!clause.learnt);
    }

    #[test]
    fn test_tautology() {
        assert!(Clause::new([lit(1), lit(2), lit(-1)]).is_tautology());
        assert!(!Clause::new([lit(1), lit(2), lit(-3)]).is_tautology());
    }

    #[test]
    fn test_state_classification() {
        let clause = Clause::new([lit(1), lit(2), lit(3)]);
        let mut a = Assignment::new(3);
        assert_eq!(clause.state(&a), ClauseState::Unresolved);

        a.assign(lit(-1));
        a.assign(lit(-2));
        assert_eq!(clause.state(&a), ClauseState::Unit(lit(3)));

        a.assign(lit(-3));
        assert_eq!(clause.state(&a), ClauseState::Falsified);

        a.assign(lit(2));
        assert_eq!(clause.state(&a), ClauseState::Satisfied);
    }

    #[test]
    fn test_empty_clause_is_falsified() {
        let clause = Clause::new(Vec::<Literal>::new());
        assert!(clause.is_empty());
        assert_eq!(clause.state(&Assignment::new(0)), ClauseState::Falsified);
    }

    #[test]
    fn test_display() {
        assert_eq!(Clause::new([lit(1), lit(-2)]).to_string(), "1 -2 0");
    }
}
