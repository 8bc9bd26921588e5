#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The solver interface shared by the DPLL and CDCL drivers, and the
//! configurations that pick their components.

use crate::sat::assignment::Solutions;
use crate::sat::cdcl::Cdcl;
use crate::sat::cnf::{ClauseRef, Cnf};
use crate::sat::conflict_analysis::{Analyser, AnalyserImpls, FirstUip, LevelScan};
use crate::sat::dpll::Dpll;
use crate::sat::error::Result;
use crate::sat::literal::Literal;
use crate::sat::propagation::{Propagator, PropagatorImpls, UnitSearch, WatchedLiterals};
use crate::sat::restarter::{Fixed, Linear, Restarter, RestarterImpls};
use crate::sat::variable_selection::{FixedOrder, VariableSelection, VariableSelectionImpls};
use clap::ValueEnum;
use std::fmt::{Debug, Display};
use std::time::Duration;

/// Chooses the component implementations a driver is built from.
pub trait SolverConfig: Debug + Clone {
    type Propagator: Propagator;
    type VariableSelector: VariableSelection;
    type Restarter: Restarter;
    type Analyser: Analyser;
}

/// Watched literals, lowest-index decisions, a restart every 100 conflicts
/// and first-UIP learning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultConfig;

impl SolverConfig for DefaultConfig {
    type Propagator = WatchedLiterals;
    type VariableSelector = FixedOrder;
    type Restarter = Fixed<100>;
    type Analyser = FirstUip;
}

/// Clause-scanning propagation with level-scan analysis, which learns each
/// conflicting clause verbatim. Restart intervals grow linearly: learning
/// a clause already in the formula adds nothing, so a constant interval could
/// replay the same search forever.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BasicConfig;

impl SolverConfig for BasicConfig {
    type Propagator = UnitSearch;
    type VariableSelector = FixedOrder;
    type Restarter = Linear<100>;
    type Analyser = LevelScan;
}

/// Components chosen at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DynamicConfig;

impl SolverConfig for DynamicConfig {
    type Propagator = PropagatorImpls;
    type VariableSelector = VariableSelectionImpls;
    type Restarter = RestarterImpls;
    type Analyser = AnalyserImpls;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SolveResult {
    Satisfiable(Solutions),
    Unsatisfiable,
    /// The budget ran out first.
    Unknown,
}

impl SolveResult {
    #[must_use]
    pub const fn is_sat(&self) -> bool {
        matches!(self, Self::Satisfiable(_))
    }

    #[must_use]
    pub const fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsatisfiable)
    }

    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    #[must_use]
    pub const fn solutions(&self) -> Option<&Solutions> {
        match self {
            Self::Satisfiable(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_solutions(self) -> Option<Solutions> {
        match self {
            Self::Satisfiable(s) => Some(s),
            _ => None,
        }
    }

    /// SAT competition exit status: 10, 20, or 0 when undecided.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Satisfiable(_) => 10,
            Self::Unsatisfiable => 20,
            Self::Unknown => 0,
        }
    }
}

impl Display for SolveResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable(_) => write!(f, "SATISFIABLE"),
            Self::Unsatisfiable => write!(f, "UNSATISFIABLE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Counters accumulated over a solver's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SolutionStats {
    pub conflicts: usize,
    pub decisions: usize,
    pub propagations: usize,
    pub restarts: usize,
    pub learnt_clauses: usize,
}

/// Per-call search limits. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Budget {
    pub max_conflicts: Option<usize>,
    pub max_decisions: Option<usize>,
    pub timeout: Option<Duration>,
}

impl Budget {
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_conflicts: None,
            max_decisions: None,
            timeout: None,
        }
    }

    #[must_use]
    pub const fn with_max_conflicts(mut self, n: usize) -> Self {
        self.max_conflicts = Some(n);
        self
    }

    #[must_use]
    pub const fn with_max_decisions(mut self, n: usize) -> Self {
        self.max_decisions = Some(n);
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Whether a search that has so far spent `conflicts`, `decisions` and
    /// `elapsed` must stop.
    #[must_use]
    pub fn is_exhausted(&self, conflicts: usize, decisions: usize, elapsed: Duration) -> bool {
        self.max_conflicts.is_some_and(|max| conflicts >= max)
            || self.max_decisions.is_some_and(|max| decisions >= max)
            || self.timeout.is_some_and(|max| elapsed >= max)
    }
}

pub trait Solver<C: SolverConfig = DefaultConfig>: Sized {
    /// A solver over `num_vars` variables and no clauses.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidVariableCount`](crate::sat::error::SolverError::InvalidVariableCount)
    /// if `num_vars` exceeds [`MAX_VARS`](crate::sat::cnf::MAX_VARS).
    fn new(num_vars: usize) -> Result<Self> {
        Cnf::new(num_vars).map(Self::from_cnf)
    }

    fn from_cnf(cnf: Cnf) -> Self;

    /// Adds an original clause. Duplicate literals are dropped.
    ///
    /// # Errors
    ///
    /// [`SolverError::InvalidLiteral`](crate::sat::error::SolverError::InvalidLiteral)
    /// if a literal's variable is out of range; the clause is not added.
    fn add_clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Result<ClauseRef>;

    /// Searches from an empty assignment. May be called again; learned
    /// clauses and statistics carry over.
    fn solve(&mut self) -> SolveResult;

    fn stats(&self) -> SolutionStats;

    fn cnf(&self) -> &Cnf;

    fn set_budget(&mut self, budget: Budget);

    fn num_vars(&self) -> usize {
        self.cnf().num_vars
    }

    /// Clauses held, learned ones included.
    fn num_clauses(&self) -> usize {
        self.cnf().len()
    }

    fn num_learnt(&self) -> usize {
        self.cnf().num_learnt()
    }

    fn num_conflicts(&self) -> usize {
        self.stats().conflicts
    }
}

/// Either driver, chosen at runtime.
#[derive(Debug, Clone)]
pub enum SolverImpls<C: SolverConfig = DynamicConfig> {
    Dpll(Box<Dpll<C>>),
    Cdcl(Box<Cdcl<C>>),
}

impl<C: SolverConfig> Solver<C> for SolverImpls<C> {
    fn from_cnf(cnf: Cnf) -> Self {
        Self::Cdcl(Box::new(Cdcl::from_cnf(cnf)))
    }

    fn add_clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Result<ClauseRef> {
        match self {
            Self::Dpll(s) => s.add_clause(literals),
            Self::Cdcl(s) => s.add_clause(literals),
        }
    }

    fn solve(&mut self) -> SolveResult {
        match self {
            Self::Dpll(s) => s.solve(),
            Self::Cdcl(s) => s.solve(),
        }
    }

    fn stats(&self) -> SolutionStats {
        match self {
            Self::Dpll(s) => s.stats(),
            Self::Cdcl(s) => s.stats(),
        }
    }

    fn cnf(&self) -> &Cnf {
        match self {
            Self::Dpll(s) => s.cnf(),
            Self::Cdcl(s) => s.cnf(),
        }
    }

    fn set_budget(&mut self, budget: Budget) {
        match self {
            Self::Dpll(s) => s.set_budget(budget),
            Self::Cdcl(s) => s.set_budget(budget),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum SolverType {
    #[default]
    Cdcl,
    Dpll,
}

impl Display for SolverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cdcl => write!(f, "cdcl"),
            Self::Dpll => write!(f, "dpll"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_limits() {
        let b = Budget::unlimited();
        assert!(!b.is_exhausted(usize::MAX, usize::MAX, Duration::MAX));

        let b = Budget::default().with_max_conflicts(10).with_max_decisions(5);
        assert!(!b.is_exhausted(9, 4, Duration::ZERO));
        assert!(b.is_exhausted(10, 0, Duration::ZERO));
        assert!(b.is_exhausted(0, 5, Duration::ZERO));

        let b = Budget::default().with_timeout(Duration::from_millis(5));
        assert!(b.is_exhausted(0, 0, Duration::from_millis(5)));
    }

    #[test]
    fn test_solve_result_accessors() {
        let sat = SolveResult::Satisfiable(Solutions::new(vec![true]));
        assert!(sat.is_sat());
        assert_eq!(sat.exit_code(), 10);
        assert_eq!(sat.solutions().map(Solutions::len), Some(1));
        assert_eq!(sat.to_string(), "SATISFIABLE");

        assert_eq!(SolveResult::Unsatisfiable.exit_code(), 20);
        assert!(SolveResult::Unknown.is_unknown());
        assert_eq!(SolveResult::Unknown.into_solutions(), None);
    }

    #[test]
    fn test_solver_impls_dispatch() {
        let mut s: SolverImpls<DefaultConfig> =
            SolverImpls::Dpll(Box::new(Dpll::new(2).unwrap()));
        s.add_clause([Literal::new(0, false)]).unwrap();
        s.add_clause([Literal::new(0, true), Literal::new(1, true)]).unwrap();
        assert_eq!(
            s.solve().into_solutions().map(|m| m.as_slice().to_vec()),
            Some(vec![false, true])
        );
        assert_eq!(s.num_vars(), 2);
        assert_eq!(s.num_clauses(), 2);

        let mut s = SolverImpls::<DefaultConfig>::new(1).unwrap();
        s.add_clause([Literal::new(0, true)]).unwrap();
        s.add_clause([Literal::new(0, false)]).unwrap();
        assert!(s.solve().is_unsat());
    }
}
