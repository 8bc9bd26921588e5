//! The DPLL (Davis-Putnam-Logemann-Loveland) search driver.
//!
//! Plain DPLL: propagate, and when propagation stalls branch on an unassigned
//! variable, trying `true` first. A conflict undoes the most recent branch
//! that has only tried one polarity and retries it with the other. Nothing is
//! learned and the search never restarts, so backtracking is strictly
//! chronological.
//!
//! The search is an explicit loop over the trail rather than a recursion, so
//! the depth of the search tree is bounded only by the number of variables.
//!
//! `Dpll` is generic over a [`SolverConfig`] but only uses its propagator and
//! variable selector.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::{ClauseRef, Cnf};
use crate::sat::error::Result;
use crate::sat::literal::Literal;
use crate::sat::log::targets;
use crate::sat::propagation::{Propagation, Propagator};
use crate::sat::solver::{Budget, DefaultConfig, SolutionStats, SolveResult, Solver, SolverConfig};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::VariableSelection;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Dpll<Config: SolverConfig = DefaultConfig> {
    pub trail: Trail,
    pub assignment: Assignment,
    pub cnf: Cnf,
    pub selector: Config::VariableSelector,
    pub propagator: Config::Propagator,
    conflicts: usize,
    decisions: usize,
    budget: Budget,
}

impl<Config: SolverConfig> Dpll<Config> {
    /// Builds a solver from explicitly constructed components.
    pub fn from_parts(
        cnf: Cnf,
        propagator: Config::Propagator,
        selector: Config::VariableSelector,
    ) -> Self {
        Self {
            trail: Trail::new(cnf.num_vars),
            assignment: Assignment::new(cnf.num_vars),
            cnf,
            selector,
            propagator,
            conflicts: 0,
            decisions: 0,
            budget: Budget::unlimited(),
        }
    }

    /// Undoes the highest branch that still has a polarity left and takes
    /// the other polarity. Returns `false` once every branch is exhausted.
    fn backtrack(&mut self) -> bool {
        let level = self.trail.decision_level();
        let Some(branch) = self
            .trail
            .highest_open_branch(level)
            .and_then(|k| self.trail.branch_at(k).copied())
        else {
            return false;
        };

        log::debug!(
            target: targets::BACKJUMP,
            "level {level}: retrying {} at level {}",
            !branch.lit,
            branch.decision_level
        );

        self.trail
            .backstep_to(&mut self.assignment, branch.decision_level - 1);
        self.trail.new_decision_level();
        self.trail
            .push(&mut self.assignment, !branch.lit, Reason::Flipped);
        true
    }

    fn decide(&mut self) -> bool {
        let Some(var) = self.selector.pick(&self.assignment) else {
            return false;
        };

        self.decisions += 1;
        self.trail.new_decision_level();
        let lit = Literal::new(var, true);
        log::trace!(
            target: targets::DECISION,
            "decide {lit} at level {}",
            self.trail.decision_level()
        );
        self.trail.push(&mut self.assignment, lit, Reason::Decision);
        true
    }
}

impl<Config: SolverConfig> Solver<Config> for Dpll<Config> {
    fn from_cnf(cnf: Cnf) -> Self {
        let propagator = Config::Propagator::new(&cnf);
        let selector = Config::VariableSelector::new(cnf.num_vars);
        Self::from_parts(cnf, propagator, selector)
    }

    fn add_clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Result<ClauseRef> {
        self.trail.clear(&mut self.assignment);
        let c_ref = self.cnf.add_clause(literals)?;
        self.propagator
            .add_clause(&self.cnf, c_ref, &self.assignment, &self.trail);
        Ok(c_ref)
    }

    fn solve(&mut self) -> SolveResult {
        let started = Instant::now();
        let (conflicts_before, decisions_before) = (self.conflicts, self.decisions);
        log::info!(
            target: targets::SEARCH,
            "dpll: {} variables, {} clauses",
            self.cnf.num_vars,
            self.cnf.len()
        );

        self.trail.clear(&mut self.assignment);

        let result = loop {
            if self.budget.is_exhausted(
                self.conflicts - conflicts_before,
                self.decisions - decisions_before,
                started.elapsed(),
            ) {
                break SolveResult::Unknown;
            }

            match self
                .propagator
                .propagate(&self.cnf, &mut self.trail, &mut self.assignment)
            {
                Propagation::Conflict(c_ref) => {
                    self.conflicts += 1;
                    log::debug!(
                        target: targets::ANALYSIS,
                        "conflict on clause {c_ref} at level {}",
                        self.trail.decision_level()
                    );
                    if !self.backtrack() {
                        break SolveResult::Unsatisfiable;
                    }
                }
                Propagation::Propagated => {
                    if self.cnf.is_satisfied(&self.assignment) {
                        break SolveResult::Satisfiable(self.assignment.get_solutions());
                    }
                    if !self.decide() {
                        break SolveResult::Unsatisfiable;
                    }
                }
            }
        };

        log::info!(
            target: targets::SEARCH,
            "dpll: {result} after {} conflicts, {} decisions in {:?}",
            self.conflicts - conflicts_before,
            self.decisions - decisions_before,
            started.elapsed()
        );
        result
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            conflicts: self.conflicts,
            decisions: self.decisions,
            propagations: self.propagator.num_propagations(),
            restarts: 0,
            learnt_clauses: 0,
        }
    }

    fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    fn set_budget(&mut self, budget: Budget) {
        self.budget = budget;
    }
}
