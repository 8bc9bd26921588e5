#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Unit propagation.
//!
//! A propagator repeatedly finds clauses that have become unit under the
//! current assignment and assigns their remaining literal, until either no
//! clause is unit (a fixed point) or some clause has every literal false (a
//! conflict). Each forced literal is pushed onto the trail at the current
//! decision level with the forcing clause as its reason.
//!
//! Two strategies are provided:
//! - [`UnitSearch`] rescans every clause until nothing changes. Simple and
//!   obviously correct, O(clauses × literals) per pass.
//! - [`WatchedLiterals`] keeps two watched positions per clause and only
//!   visits a clause when one of its watched literals becomes false.
//!
//! [`PropagatorImpls`] wraps both for selection at runtime.

use crate::sat::assignment::Assignment;
use crate::sat::cnf::{ClauseRef, Cnf};
use crate::sat::literal::Literal;
use crate::sat::log::targets;
use crate::sat::trail::{Reason, Trail};
use clap::ValueEnum;
use itertools::Itertools;
use std::cmp::Reverse;
use std::fmt::{Debug, Display};

/// Outcome of running propagation to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Propagation {
    /// Fixed point reached without a falsified clause.
    Propagated,
    /// This clause has every literal false.
    Conflict(ClauseRef),
}

impl Propagation {
    #[must_use]
    pub const fn is_conflict(self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub trait Propagator: Debug + Clone {
    /// Builds any index the strategy needs over the clauses already in `cnf`.
    /// Nothing may be assigned yet.
    fn new(cnf: &Cnf) -> Self;

    /// Registers the clause at `c_ref`, appended to `cnf` after construction.
    ///
    /// `assignment` and `trail` describe the state the clause is added in.
    fn add_clause(&mut self, cnf: &Cnf, c_ref: ClauseRef, assignment: &Assignment, trail: &Trail);

    /// Re-indexes every clause of `cnf` after clause references shifted.
    /// Nothing may be assigned. Counters are kept.
    fn rebuild(&mut self, cnf: &Cnf);

    /// Propagates to a fixed point or the first conflict.
    fn propagate(&mut self, cnf: &Cnf, trail: &mut Trail, assignment: &mut Assignment)
    -> Propagation;

    /// Literals assigned by propagation so far.
    fn num_propagations(&self) -> usize;
}

/// Rescans the whole clause list until no clause is unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitSearch {
    propagations: usize,
}

impl Propagator for UnitSearch {
    fn new(_: &Cnf) -> Self {
        Self::default()
    }

    fn add_clause(&mut self, _: &Cnf, _: ClauseRef, _: &Assignment, _: &Trail) {}

    fn rebuild(&mut self, _: &Cnf) {}

    fn propagate(
        &mut self,
        cnf: &Cnf,
        trail: &mut Trail,
        assignment: &mut Assignment,
    ) -> Propagation {
        use crate::sat::clause::ClauseState;

        loop {
            let mut changed = false;

            for (c_ref, clause) in cnf.iter().enumerate() {
                match clause.state(assignment) {
                    ClauseState::Falsified => {
                        log::trace!(target: targets::PROPAGATION, "conflict on clause {c_ref}");
                        trail.curr_idx = trail.len();
                        return Propagation::Conflict(c_ref);
                    }
                    ClauseState::Unit(lit) => {
                        log::trace!(target: targets::PROPAGATION, "{lit} forced by clause {c_ref}");
                        trail.push(assignment, lit, Reason::Clause(c_ref));
                        self.propagations += 1;
                        changed = true;
                    }
                    ClauseState::Satisfied | ClauseState::Unresolved => {}
                }
            }

            if !changed {
                trail.curr_idx = trail.len();
                return Propagation::Propagated;
            }
        }
    }

    fn num_propagations(&self) -> usize {
        self.propagations
    }
}

/// Two-watched-literal propagation.
///
/// Every clause of two or more literals watches two of its positions. The
/// positions are kept here rather than by reordering clause literals, so the
/// formula store is never rewritten. While a clause is not satisfied its
/// watched literals are non-false, or it is unit or falsified at the level
/// that made it so; a clause therefore only needs attention when a watched
/// literal turns false.
///
/// Unit and empty clauses cannot be watched and are checked directly on each
/// call instead, which re-asserts unit clauses after a restart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchedLiterals {
    /// Clauses watching each literal, indexed by literal code.
    watches: Vec<Vec<ClauseRef>>,
    /// Watched positions per clause; meaningless for clauses shorter than two.
    positions: Vec<[usize; 2]>,
    units: Vec<ClauseRef>,
    empty: Vec<ClauseRef>,
    propagations: usize,
}

impl WatchedLiterals {
    /// Picks watch positions: non-false literals first, then false literals
    /// by decreasing decision level.
    fn pick_watches(cnf: &Cnf, c_ref: ClauseRef, assignment: &Assignment, trail: &Trail) -> [usize; 2] {
        let clause = &cnf[c_ref];
        let ranked = (0..clause.len())
            .sorted_by_key(|&i| {
                let lit = clause[i];
                match assignment.literal_value(lit) {
                    Some(false) => (1, Reverse(trail.level(lit.variable()).unwrap_or(0))),
                    _ => (0, Reverse(0)),
                }
            })
            .take(2)
            .collect_vec();
        [ranked[0], ranked[1]]
    }

    fn attach(&mut self, cnf: &Cnf, c_ref: ClauseRef, positions: [usize; 2]) {
        let clause = &cnf[c_ref];
        self.watches[clause[positions[0]].index()].push(c_ref);
        self.watches[clause[positions[1]].index()].push(c_ref);
        self.positions[c_ref] = positions;
    }

    fn register(&mut self, cnf: &Cnf, c_ref: ClauseRef, assignment: &Assignment, trail: &Trail) {
        if self.positions.len() <= c_ref {
            self.positions.resize(c_ref + 1, [0, 0]);
        }

        match cnf[c_ref].len() {
            0 => self.empty.push(c_ref),
            1 => self.units.push(c_ref),
            _ => {
                let positions = Self::pick_watches(cnf, c_ref, assignment, trail);
                self.attach(cnf, c_ref, positions);
            }
        }
    }

    /// Visits every clause watching `false_lit`, which has just become false.
    /// Returns the first falsified clause found.
    fn propagate_false(
        &mut self,
        false_lit: Literal,
        cnf: &Cnf,
        trail: &mut Trail,
        assignment: &mut Assignment,
    ) -> Option<ClauseRef> {
        let mut watchers = std::mem::take(&mut self.watches[false_lit.index()]);
        let mut conflict = None;
        let mut i = 0;

        while i < watchers.len() {
            let c_ref = watchers[i];
            let clause = &cnf[c_ref];
            let [p0, p1] = self.positions[c_ref];
            let (side, other) = if clause[p0] == false_lit { (0, p1) } else { (1, p0) };
            let other_lit = clause[other];

            if assignment.literal_value(other_lit) == Some(true) {
                i += 1;
                continue;
            }

            let replacement = (0..clause.len()).find(|&k| {
                k != p0 && k != p1 && assignment.literal_value(clause[k]) != Some(false)
            });

            if let Some(k) = replacement {
                self.positions[c_ref][side] = k;
                self.watches[clause[k].index()].push(c_ref);
                watchers.swap_remove(i);
                continue;
            }

            if assignment.literal_value(other_lit) == Some(false) {
                log::trace!(target: targets::PROPAGATION, "conflict on clause {c_ref}");
                conflict = Some(c_ref);
                break;
            }

            log::trace!(target: targets::PROPAGATION, "{other_lit} forced by clause {c_ref}");
            trail.push(assignment, other_lit, Reason::Clause(c_ref));
            self.propagations += 1;
            i += 1;
        }

        let added = std::mem::replace(&mut self.watches[false_lit.index()], watchers);
        self.watches[false_lit.index()].extend(added);
        conflict
    }
}

impl Propagator for WatchedLiterals {
    fn new(cnf: &Cnf) -> Self {
        let mut wl = Self::default();
        wl.rebuild(cnf);
        wl
    }

    fn add_clause(&mut self, cnf: &Cnf, c_ref: ClauseRef, assignment: &Assignment, trail: &Trail) {
        self.register(cnf, c_ref, assignment, trail);
    }

    fn rebuild(&mut self, cnf: &Cnf) {
        self.watches = vec![Vec::new(); cnf.num_vars * 2];
        self.positions = Vec::with_capacity(cnf.len());
        self.units.clear();
        self.empty.clear();

        let assignment = Assignment::new(cnf.num_vars);
        let trail = Trail::new(cnf.num_vars);
        for c_ref in 0..cnf.len() {
            self.register(cnf, c_ref, &assignment, &trail);
        }
    }

    fn propagate(
        &mut self,
        cnf: &Cnf,
        trail: &mut Trail,
        assignment: &mut Assignment,
    ) -> Propagation {
        if let Some(&c_ref) = self.empty.first() {
            return Propagation::Conflict(c_ref);
        }

        for i in 0..self.units.len() {
            let c_ref = self.units[i];
            let lit = cnf[c_ref][0];
            match assignment.literal_value(lit) {
                Some(true) => {}
                Some(false) => return Propagation::Conflict(c_ref),
                None => {
                    log::trace!(target: targets::PROPAGATION, "{lit} asserted by unit clause {c_ref}");
                    trail.push(assignment, lit, Reason::Clause(c_ref));
                    self.propagations += 1;
                }
            }
        }

        while trail.curr_idx < trail.len() {
            let lit = trail[trail.curr_idx].lit;
            trail.curr_idx += 1;

            if let Some(c_ref) = self.propagate_false(!lit, cnf, trail, assignment) {
                return Propagation::Conflict(c_ref);
            }
        }

        Propagation::Propagated
    }

    fn num_propagations(&self) -> usize {
        self.propagations
    }
}

/// Runtime choice of propagator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropagatorImpls {
    WatchedLiterals(WatchedLiterals),
    UnitSearch(UnitSearch),
}

impl Propagator for PropagatorImpls {
    fn new(cnf: &Cnf) -> Self {
        Self::WatchedLiterals(WatchedLiterals::new(cnf))
    }

    fn add_clause(&mut self, cnf: &Cnf, c_ref: ClauseRef, assignment: &Assignment, trail: &Trail) {
        match self {
            Self::WatchedLiterals(p) => p.add_clause(cnf, c_ref, assignment, trail),
            Self::UnitSearch(p) => p.add_clause(cnf, c_ref, assignment, trail),
        }
    }

    fn rebuild(&mut self, cnf: &Cnf) {
        match self {
            Self::WatchedLiterals(p) => p.rebuild(cnf),
            Self::UnitSearch(p) => p.rebuild(cnf),
        }
    }

    fn propagate(
        &mut self,
        cnf: &Cnf,
        trail: &mut Trail,
        assignment: &mut Assignment,
    ) -> Propagation {
        match self {
            Self::WatchedLiterals(p) => p.propagate(cnf, trail, assignment),
            Self::UnitSearch(p) => p.propagate(cnf, trail, assignment),
        }
    }

    fn num_propagations(&self) -> usize {
        match self {
            Self::WatchedLiterals(p) => p.num_propagations(),
            Self::UnitSearch(p) => p.num_propagations(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum PropagatorType {
    #[default]
    WatchedLiterals,
    UnitSearch,
}

impl Display for PropagatorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WatchedLiterals => write!(f, "watched-literals"),
            Self::UnitSearch => write!(f, "unit-search"),
        }
    }
}

impl PropagatorType {
    #[must_use]
    pub fn to_impl(self, cnf: &Cnf) -> PropagatorImpls {
        match self {
            Self::WatchedLiterals => PropagatorImpls::WatchedLiterals(WatchedLiterals::new(cnf)),
            Self::UnitSearch => PropagatorImpls::UnitSearch(UnitSearch::new(cnf)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cnf(clauses: Vec<Vec<i32>>) -> Cnf {
        Cnf::from_dimacs(clauses).unwrap()
    }

    fn lit(v: i32) -> Literal {
        Literal::from_dimacs(v).unwrap()
    }

    fn decide(trail: &mut Trail, a: &mut Assignment, l: Literal) {
        trail.new_decision_level();
        trail.push(a, l, Reason::Decision);
    }

    fn check_chain<P: Propagator>() {
        // x1, x1 -> x2, x2 -> x3
        let f = cnf(vec![vec![1], vec![-1, 2], vec![-2, 3]]);
        let mut p = P::new(&f);
        let mut a = Assignment::new(f.num_vars);
        let mut t = Trail::new(f.num_vars);

        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert_eq!(a.var_value(0), Some(true));
        assert_eq!(a.var_value(1), Some(true));
        assert_eq!(a.var_value(2), Some(true));
        assert_eq!(t.reason(2), Some(Reason::Clause(2)));
        assert!(t.iter().all(|s| s.decision_level == 0));
        assert_eq!(p.num_propagations(), 3);
    }

    fn check_conflict<P: Propagator>() {
        // deciding -x1 forces x2 and x3, which clash on the last clause
        let f = cnf(vec![vec![1, 2], vec![1, 3], vec![-2, -3]]);
        let mut p = P::new(&f);
        let mut a = Assignment::new(f.num_vars);
        let mut t = Trail::new(f.num_vars);

        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert!(t.is_empty());

        decide(&mut t, &mut a, lit(-1));
        let result = p.propagate(&f, &mut t, &mut a);
        assert!(result.is_conflict());
        assert!(t.iter().skip(1).all(|s| s.decision_level == 1));
    }

    fn check_idempotent<P: Propagator>() {
        let f = cnf(vec![vec![1, 2, 3], vec![-1, 2], vec![-2, 4], vec![-3, -4]]);
        let mut p = P::new(&f);
        let mut a = Assignment::new(f.num_vars);
        let mut t = Trail::new(f.num_vars);

        decide(&mut t, &mut a, lit(1));
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        let snapshot = t.clone();
        let count = p.num_propagations();

        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert_eq!(t, snapshot);
        assert_eq!(p.num_propagations(), count);
    }

    fn check_empty_clause<P: Propagator>() {
        let mut f = Cnf::new(1).unwrap();
        f.add_clause([lit(1)]).unwrap();
        f.add_clause(Vec::new()).unwrap();
        let mut p = P::new(&f);
        let mut a = Assignment::new(1);
        let mut t = Trail::new(1);
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Conflict(1));
    }

    fn check_after_backtrack<P: Propagator>() {
        let f = cnf(vec![vec![-1, 2], vec![-2, 3], vec![-3, -1, 4]]);
        let mut p = P::new(&f);
        let mut a = Assignment::new(f.num_vars);
        let mut t = Trail::new(f.num_vars);

        decide(&mut t, &mut a, lit(1));
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert_eq!(a.num_assigned(), 4);

        t.backstep_to(&mut a, 0);
        assert_eq!(a.num_assigned(), 0);

        decide(&mut t, &mut a, lit(1));
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert_eq!(a.num_assigned(), 4);
        assert_eq!(a.var_value(3), Some(true));
    }

    #[test]
    fn test_unit_search() {
        check_chain::<UnitSearch>();
        check_conflict::<UnitSearch>();
        check_idempotent::<UnitSearch>();
        check_empty_clause::<UnitSearch>();
        check_after_backtrack::<UnitSearch>();
    }

    #[test]
    fn test_watched_literals() {
        check_chain::<WatchedLiterals>();
        check_conflict::<WatchedLiterals>();
        check_idempotent::<WatchedLiterals>();
        check_empty_clause::<WatchedLiterals>();
        check_after_backtrack::<WatchedLiterals>();
    }

    #[test]
    fn test_rebuild_after_original_inserted_before_learnt() {
        let mut f = Cnf::new(3).unwrap();
        f.add_clause([lit(1), lit(2)]).unwrap();
        let mut p = WatchedLiterals::new(&f);
        f.add_learnt(crate::sat::clause::Clause::learnt([lit(-1), lit(3)]));
        p.add_clause(&f, 1, &Assignment::new(3), &Trail::new(3));
        p.propagations = 7;

        f.add_clause([lit(-2)]).unwrap();
        p.rebuild(&f);
        assert_eq!(p.units, vec![1]);
        assert_eq!(p.num_propagations(), 7);

        let mut a = Assignment::new(3);
        let mut t = Trail::new(3);
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert_eq!(a.var_value(0), Some(true));
        assert_eq!(a.var_value(1), Some(false));
        assert_eq!(a.var_value(2), Some(true));
        assert_eq!(t.reason(2), Some(Reason::Clause(2)));
    }

    #[test]
    fn test_dynamic_propagator() {
        check_chain::<PropagatorImpls>();
        check_conflict::<PropagatorImpls>();
    }

    #[test]
    fn test_learnt_clause_watches_non_false_literals() {
        let mut f = cnf(vec![vec![1, 2, 3]]);
        let mut p = WatchedLiterals::new(&f);
        let mut a = Assignment::new(3);
        let mut t = Trail::new(3);

        decide(&mut t, &mut a, lit(-1));
        decide(&mut t, &mut a, lit(-2));
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Propagated);
        assert_eq!(a.var_value(2), Some(true));

        t.backstep_to(&mut a, 1);
        let c_ref = f.add_learnt(crate::sat::clause::Clause::learnt([lit(1), lit(2), lit(-3)]));
        p.add_clause(&f, c_ref, &a, &t);
        assert_eq!(p.positions[c_ref], [1, 2]);

        decide(&mut t, &mut a, lit(-2));
        assert_eq!(p.propagate(&f, &mut t, &mut a), Propagation::Conflict(c_ref));
    }
}
