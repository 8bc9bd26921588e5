#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The trail: every assigned literal in assignment order, together with the
//! decision level and reason of each assignment.
//!
//! Levels along the trail never decrease. The first step of every level above
//! zero is the branching literal of that level, either a fresh
//! [`Reason::Decision`] or a [`Reason::Flipped`] retry of the opposite
//! polarity, so backtracking to level `L` is a truncation at the start of
//! level `L + 1`.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::{ClauseRef, DecisionLevel};
use crate::sat::literal::{Literal, Variable};
use crate::sat::log::targets;
use std::ops::Index;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash, PartialOrd, Ord)]
pub enum Reason {
    /// Chosen by the decision engine.
    Decision,
    /// The opposite polarity of a decision whose first polarity failed.
    Flipped,
    /// Forced by unit propagation on this clause.
    Clause(ClauseRef),
}

#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct Step {
    pub lit: Literal,
    pub decision_level: DecisionLevel,
    pub reason: Reason,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trail {
    t: Vec<Step>,
    /// Next trail position the watched-literal propagator has to visit.
    pub curr_idx: usize,
    /// Level and reason per variable; `None` while unassigned.
    var_info: Vec<Option<(DecisionLevel, Reason)>>,
    /// `level_start[k]` is the trail position where level `k + 1` begins.
    level_start: Vec<usize>,
}

impl Index<usize> for Trail {
    type Output = Step;

    fn index(&self, index: usize) -> &Self::Output {
        &self.t[index]
    }
}

impl Trail {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            t: Vec::with_capacity(num_vars),
            curr_idx: 0,
            var_info: vec![None; num_vars],
            level_start: Vec::new(),
        }
    }

    /// The current decision level.
    #[must_use]
    pub fn decision_level(&self) -> DecisionLevel {
        self.level_start.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> {
        self.t.iter()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Step> {
        self.t.last()
    }

    /// Level `var` was assigned at, `None` while unassigned.
    #[must_use]
    pub fn level(&self, var: Variable) -> Option<DecisionLevel> {
        self.var_info[var as usize].map(|(level, _)| level)
    }

    #[must_use]
    pub fn reason(&self, var: Variable) -> Option<Reason> {
        self.var_info[var as usize].map(|(_, reason)| reason)
    }

    /// Opens a new decision level. The next pushed literal starts it.
    pub fn new_decision_level(&mut self) {
        self.level_start.push(self.t.len());
    }

    /// Assigns `lit` at the current level and records it.
    ///
    /// The variable must be unassigned.
    pub fn push(&mut self, assignment: &mut Assignment, lit: Literal, reason: Reason) {
        let var = lit.variable() as usize;
        debug_assert!(self.var_info[var].is_none(), "variable {var} assigned twice");

        let decision_level = self.decision_level();
        assignment.assign(lit);
        self.var_info[var] = Some((decision_level, reason));
        self.t.push(Step {
            lit,
            decision_level,
            reason,
        });
    }

    /// The branching step of `level` (`1..=decision_level()`).
    #[must_use]
    pub fn branch_at(&self, level: DecisionLevel) -> Option<&Step> {
        let start = *self.level_start.get(level.checked_sub(1)?)?;
        self.t.get(start).filter(|step| step.decision_level == level)
    }

    /// The highest level `<= max_level` whose branch has only tried its first
    /// polarity, or `None` if every branch up to `max_level` has been flipped.
    #[must_use]
    pub fn highest_open_branch(&self, max_level: DecisionLevel) -> Option<DecisionLevel> {
        (1..=max_level.min(self.decision_level()))
            .rev()
            .find(|&level| {
                self.branch_at(level)
                    .is_some_and(|step| step.reason == Reason::Decision)
            })
    }

    /// Unassigns every variable above `level` and makes `level` current.
    pub fn backstep_to(&mut self, assignment: &mut Assignment, level: DecisionLevel) {
        if level >= self.decision_level() {
            return;
        }

        let truncate_at = self.level_start[level];
        log::trace!(
            target: targets::BACKJUMP,
            "backstep {} -> {level}, unassigning {} variables",
            self.decision_level(),
            self.t.len() - truncate_at
        );

        for step in self.t.drain(truncate_at..).rev() {
            let var = step.lit.variable();
            assignment.unassign(var);
            self.var_info[var as usize] = None;
        }

        self.level_start.truncate(level);
        self.curr_idx = self.curr_idx.min(truncate_at);
    }

    /// Unassigns everything, level 0 included.
    pub fn clear(&mut self, assignment: &mut Assignment) {
        for step in self.t.drain(..) {
            self.var_info[step.lit.variable() as usize] = None;
        }
        assignment.clear();
        self.level_start.clear();
        self.curr_idx = 0;
    }
}
