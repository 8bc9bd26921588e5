//! The CDCL (Conflict-Driven Clause Learning) search driver.
//!
//! DPLL extended with clause learning, non-chronological backtracking and
//! restarts. The loop is:
//!
//! 1. Propagate. A conflict at level 0 ends the search as unsatisfiable.
//! 2. On any other conflict, analyse it, learn the resulting clause and
//!    resume where the analyser says; count the conflict towards the next
//!    restart.
//! 3. Once propagation reaches a fixed point with every variable assigned,
//!    the assignment is a model.
//! 4. If a restart is due, clear the assignment (learned clauses stay) and go
//!    back to 1.
//! 5. Otherwise decide on the variable the selector picks and go back to 1.
//!
//! The [`Budget`] is checked once per iteration.

use crate::sat::assignment::Assignment;
use crate::sat::clause::Clause;
use crate::sat::cnf::{ClauseRef, Cnf, DecisionLevel};
use crate::sat::conflict_analysis::{Analyser, Conflict};
use crate::sat::error::Result;
use crate::sat::literal::Literal;
use crate::sat::log::targets;
use crate::sat::propagation::{Propagation, Propagator};
use crate::sat::restarter::Restarter;
use crate::sat::solver::{Budget, DefaultConfig, SolutionStats, SolveResult, Solver, SolverConfig};
use crate::sat::trail::{Reason, Trail};
use crate::sat::variable_selection::VariableSelection;
use std::time::Instant;

#[derive(Debug, Clone)]
pub struct Cdcl<Config: SolverConfig = DefaultConfig> {
    pub trail: Trail,
    pub assignment: Assignment,
    pub cnf: Cnf,
    pub selector: Config::VariableSelector,
    pub propagator: Config::Propagator,
    pub restarter: Config::Restarter,
    pub analyser: Config::Analyser,
    conflicts: usize,
    decisions: usize,
    budget: Budget,
}

/// What to do after a conflict has been dealt with.
enum Resolution {
    Continue,
    Unsatisfiable,
}

impl<Config: SolverConfig> Cdcl<Config> {
    /// Builds a solver from explicitly constructed components.
    pub fn from_parts(
        cnf: Cnf,
        propagator: Config::Propagator,
        selector: Config::VariableSelector,
        restarter: Config::Restarter,
        analyser: Config::Analyser,
    ) -> Self {
        Self {
            trail: Trail::new(cnf.num_vars),
            assignment: Assignment::new(cnf.num_vars),
            cnf,
            selector,
            propagator,
            restarter,
            analyser,
            conflicts: 0,
            decisions: 0,
            budget: Budget::unlimited(),
        }
    }

    /// Stores a learned clause and watches it under the current assignment.
    fn learn(&mut self, clause: Clause) -> ClauseRef {
        let c_ref = self.cnf.add_learnt(clause);
        self.propagator
            .add_clause(&self.cnf, c_ref, &self.assignment, &self.trail);
        c_ref
    }

    fn backjump(&mut self, level: DecisionLevel) {
        log::debug!(
            target: targets::BACKJUMP,
            "backjump {} -> {level}",
            self.trail.decision_level()
        );
        self.trail.backstep_to(&mut self.assignment, level);
    }

    fn handle_conflict(&mut self, c_ref: ClauseRef) -> Resolution {
        self.conflicts += 1;

        if self.trail.decision_level() == 0 {
            log::debug!(target: targets::ANALYSIS, "conflict on clause {c_ref} at level 0");
            return Resolution::Unsatisfiable;
        }

        let (conflict, to_bump) = self.analyser.analyse(&self.cnf, &self.trail, c_ref);
        self.selector.bumps(to_bump);
        self.selector.decay();

        match conflict {
            Conflict::Ground => return Resolution::Unsatisfiable,
            Conflict::Learned {
                clause,
                backtrack_level,
            } => {
                let asserting = clause[0];
                self.backjump(backtrack_level);
                let learnt = self.learn(clause);
                self.trail
                    .push(&mut self.assignment, asserting, Reason::Clause(learnt));
            }
            Conflict::Retry {
                clause,
                backtrack_level,
            } => {
                let Some(branch) = self
                    .trail
                    .highest_open_branch(backtrack_level + 1)
                    .and_then(|k| self.trail.branch_at(k).copied())
                else {
                    return Resolution::Unsatisfiable;
                };

                self.backjump(branch.decision_level - 1);
                self.learn(clause);
                log::debug!(
                    target: targets::BACKJUMP,
                    "retrying {} at level {}",
                    !branch.lit,
                    branch.decision_level
                );
                self.trail.new_decision_level();
                self.trail
                    .push(&mut self.assignment, !branch.lit, Reason::Flipped);
            }
        }

        Resolution::Continue
    }

    fn restart(&mut self) {
        self.restarter.restart();
        log::debug!(
            target: targets::RESTART,
            "restart {} after {} conflicts, {} learnt clauses",
            self.restarter.num_restarts(),
            self.conflicts,
            self.cnf.num_learnt()
        );
        self.trail.clear(&mut self.assignment);
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

impl<Config: SolverConfig> Solver<Config> for Cdcl<Config> {
    fn from_cnf(cnf: Cnf) -> Self {
        let propagator = Config::Propagator::new(&cnf);
        let selector = Config::VariableSelector::new(cnf.num_vars);
        let analyser = Config::Analyser::new(cnf.num_vars);
        Self::from_parts(cnf, propagator, selector, Config::Restarter::new(), analyser)
    }

    /// Adds an original clause, discarding any partial assignment.
    ///
    /// Original clauses precede learned ones in the store, so once anything
    /// has been learned the propagator is re-indexed from scratch.
    fn add_clause<I: IntoIterator<Item = Literal>>(&mut self, literals: I) -> Result<ClauseRef> {
        self.trail.clear(&mut self.assignment);
        let shifts = self.cnf.num_learnt() > 0;
        let c_ref = self.cnf.add_clause(literals)?;

        if shifts {
            self.propagator.rebuild(&self.cnf);
        } else {
            self.propagator
                .add_clause(&self.cnf, c_ref, &self.assignment, &self.trail);
        }
        Ok(c_ref)
    }

    fn solve(&mut self) -> SolveResult {
        let started = Instant::now();
        let (conflicts_before, decisions_before) = (self.conflicts, self.decisions);
        log::info!(
            target: targets::SEARCH,
            "cdcl: {} variables, {} clauses ({} learnt)",
            self.cnf.num_vars,
            self.cnf.len(),
            self.cnf.num_learnt()
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
                    if let Resolution::Unsatisfiable = self.handle_conflict(c_ref) {
                        break SolveResult::Unsatisfiable;
                    }
                    self.restarter.tick();
                }
                Propagation::Propagated => {
                    if self.assignment.all_assigned() {
                        break SolveResult::Satisfiable(self.assignment.get_solutions());
                    }
                    if self.restarter.is_due() {
                        self.restart();
                        continue;
                    }
                    if !self.decide() {
                        break SolveResult::Satisfiable(self.assignment.get_solutions());
                    }
                }
            }
        };

        log::info!(
            target: targets::SEARCH,
            "cdcl: {result} after {} conflicts, {} decisions, {} learnt clauses in {:?}",
            self.conflicts - conflicts_before,
            self.decisions - decisions_before,
            self.cnf.num_learnt(),
            started.elapsed()
        );
        result
    }

    fn stats(&self) -> SolutionStats {
        SolutionStats {
            conflicts: self.conflicts,
            decisions: self.decisions,
            propagations: self.propagator.num_propagations(),
            restarts: self.restarter.num_restarts(),
            learnt_clauses: self.cnf.num_learnt(),
        }
    }

    fn cnf(&self) -> &Cnf {
        &self.cnf
    }

    fn set_budget(&mut self, budget: Budget) {
        self.budget = budget;
    }
}
