#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Conflict analysis.
//!
//! Given the clause that propagation found falsified, an analyser decides what
//! the search driver learns and where it resumes. [`LevelScan`] learns the
//! conflicting clause as is and sends the search back one level below the
//! deepest level involved. [`FirstUip`] resolves along reason clauses to the
//! first unique implication point and produces an asserting clause.

use crate::sat::clause::Clause;
use crate::sat::cnf::{ClauseRef, Cnf, DecisionLevel};
use crate::sat::literal::{Literal, Variable};
use crate::sat::log::targets;
use crate::sat::trail::{Reason, Trail};
use bit_vec::BitVec;
use clap::ValueEnum;
use std::fmt::{Debug, Display};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Conflict {
    /// Every literal of the conflict was forced at level 0: the formula is
    /// unsatisfiable.
    #[default]
    Ground,
    /// An asserting clause. After backjumping to `backtrack_level`, every
    /// literal but `clause[0]` is false and `clause[0]` must be asserted.
    Learned {
        clause: Clause,
        backtrack_level: DecisionLevel,
    },
    /// A copy of the conflicting clause. The driver backtracks to
    /// `backtrack_level` and retries the complementary polarity of the branch
    /// just vacated, or of the nearest open branch below it.
    Retry {
        clause: Clause,
        backtrack_level: DecisionLevel,
    },
}

pub trait Analyser: Debug + Clone {
    fn new(num_vars: usize) -> Self;

    /// Analyses the conflict on `c_ref` under the current trail.
    ///
    /// Returns the verdict and the variables involved, for activity bumping.
    fn analyse(&mut self, cnf: &Cnf, trail: &Trail, c_ref: ClauseRef) -> (Conflict, Vec<Variable>);
}

fn max_level(clause: &Clause, trail: &Trail) -> DecisionLevel {
    clause
        .iter()
        .filter_map(|lit| trail.level(lit.variable()))
        .max()
        .unwrap_or(0)
}

/// Scans the conflicting clause for its deepest decision level `L` and
/// targets `L - 1`. Learns the conflicting clause itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LevelScan;

impl Analyser for LevelScan {
    fn new(_: usize) -> Self {
        Self
    }

    fn analyse(&mut self, cnf: &Cnf, trail: &Trail, c_ref: ClauseRef) -> (Conflict, Vec<Variable>) {
        let conflict = &cnf[c_ref];
        let to_bump = conflict.iter().map(|lit| lit.variable()).collect();
        let level = max_level(conflict, trail);

        if level == 0 {
            log::debug!(target: targets::ANALYSIS, "conflict on clause {c_ref} at level 0");
            return (Conflict::Ground, to_bump);
        }

        log::debug!(
            target: targets::ANALYSIS,
            "conflict on clause {c_ref}, deepest level {level}"
        );

        let clause = Clause::learnt(conflict.iter().copied());
        (
            Conflict::Retry {
                clause,
                backtrack_level: level - 1,
            },
            to_bump,
        )
    }
}

/// First-UIP clause learning.
///
/// Starting from the conflicting clause, repeatedly resolves on the most
/// recently assigned literal of the conflict level until exactly one literal
/// of that level remains. Literals assigned at level 0 are dropped since
/// they hold in every model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FirstUip {
    seen: BitVec,
}

impl Analyser for FirstUip {
    fn new(num_vars: usize) -> Self {
        Self {
            seen: BitVec::from_elem(num_vars, false),
        }
    }

    fn analyse(&mut self, cnf: &Cnf, trail: &Trail, c_ref: ClauseRef) -> (Conflict, Vec<Variable>) {
        if self.seen.len() < cnf.num_vars {
            self.seen.grow(cnf.num_vars - self.seen.len(), false);
        }

        let conflict_level = max_level(&cnf[c_ref], trail);
        if conflict_level == 0 {
            log::debug!(target: targets::ANALYSIS, "conflict on clause {c_ref} at level 0");
            let to_bump = cnf[c_ref].iter().map(|lit| lit.variable()).collect();
            return (Conflict::Ground, to_bump);
        }

        // slot 0 is filled with the UIP once found
        let mut learnt: Vec<Literal> = vec![Literal::default()];
        let mut to_bump = Vec::new();
        let mut counter = 0_usize;
        let mut idx = trail.len();
        let mut reason = c_ref;
        let mut pivot: Option<Variable> = None;

        let uip = loop {
            for &lit in &cnf[reason] {
                let var = lit.variable();
                if pivot == Some(var) || self.seen[var as usize] {
                    continue;
                }
                let level = trail.level(var).unwrap_or(0);
                if level == 0 {
                    continue;
                }

                self.seen.set(var as usize, true);
                to_bump.push(var);
                if level >= conflict_level {
                    counter += 1;
                } else {
                    learnt.push(lit);
                }
            }

            let step = loop {
                idx -= 1;
                if self.seen[trail[idx].lit.variable() as usize] {
                    break trail[idx];
                }
            };

            counter -= 1;
            if counter == 0 {
                break step.lit;
            }

            match step.reason {
                Reason::Clause(r) => {
                    pivot = Some(step.lit.variable());
                    reason = r;
                }
                Reason::Decision | Reason::Flipped => break step.lit,
            }
        };

        for &var in &to_bump {
            self.seen.set(var as usize, false);
        }

        learnt[0] = !uip;

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            let (pos, level) = learnt
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, lit)| (i, trail.level(lit.variable()).unwrap_or(0)))
                .max_by_key(|&(_, level)| level)
                .unwrap_or((1, 0));
            learnt.swap(1, pos);
            level
        };

        log::debug!(
            target: targets::ANALYSIS,
            "conflict on clause {c_ref} at level {conflict_level}: learnt {} literals, uip {uip}, backjump to {backtrack_level}",
            learnt.len()
        );

        (
            Conflict::Learned {
                clause: Clause::learnt(learnt),
                backtrack_level,
            },
            to_bump,
        )
    }
}

/// Runtime choice of analyser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyserImpls {
    FirstUip(FirstUip),
    LevelScan(LevelScan),
}

impl Analyser for AnalyserImpls {
    fn new(num_vars: usize) -> Self {
        Self::FirstUip(FirstUip::new(num_vars))
    }

    fn analyse(&mut self, cnf: &Cnf, trail: &Trail, c_ref: ClauseRef) -> (Conflict, Vec<Variable>) {
        match self {
            Self::FirstUip(a) => a.analyse(cnf, trail, c_ref),
            Self::LevelScan(a) => a.analyse(cnf, trail, c_ref),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum AnalyserType {
    #[default]
    FirstUip,
    LevelScan,
}

impl Display for AnalyserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FirstUip => write!(f, "first-uip"),
            Self::LevelScan => write!(f, "level-scan"),
        }
    }
}

impl AnalyserType {
    #[must_use]
    pub fn to_impl(self, num_vars: usize) -> AnalyserImpls {
        match self {
            Self::FirstUip => AnalyserImpls::FirstUip(FirstUip::new(num_vars)),
            Self::LevelScan => AnalyserImpls::LevelScan(LevelScan::new(num_vars)),
        }
    }
}
