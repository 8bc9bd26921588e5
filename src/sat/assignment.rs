//! Per-variable truth values and the model handed back to callers.

use crate::sat::literal::{Literal, Variable};
use core::ops::Index;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Copy, Default, Hash, PartialOrd, Ord)]
pub enum VarState {
    #[default]
    Unassigned,
    Assigned(bool),
}

impl VarState {
    #[must_use]
    pub const fn is_assigned(self) -> bool {
        matches!(self, Self::Assigned(_))
    }

    #[must_use]
    pub const fn is_unassigned(self) -> bool {
        !self.is_assigned()
    }

    #[must_use]
    pub const fn value(self) -> Option<bool> {
        match self {
            Self::Assigned(b) => Some(b),
            Self::Unassigned => None,
        }
    }
}

/// The current truth value of every variable.
///
/// Only the propagator, the decision step and backtracking write to it; the
/// matching bookkeeping (level, reason, trail position) lives in
/// [`Trail`](crate::sat::trail::Trail).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assignment {
    states: Vec<VarState>,
    assigned: usize,
}

impl Index<Variable> for Assignment {
    type Output = VarState;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.states[index as usize]
    }
}

impl Assignment {
    #[must_use]
    pub fn new(num_vars: usize) -> Self {
        Self {
            states: vec![VarState::Unassigned; num_vars],
            assigned: 0,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Makes `lit` true.
    pub fn assign(&mut self, lit: Literal) {
        let slot = &mut self.states[lit.variable() as usize];
        if slot.is_unassigned() {
            self.assigned += 1;
        }
        *slot = VarState::Assigned(lit.polarity());
    }

    pub fn unassign(&mut self, var: Variable) {
        let slot = &mut self.states[var as usize];
        if slot.is_assigned() {
            self.assigned -= 1;
        }
        *slot = VarState::Unassigned;
    }

    pub fn clear(&mut self) {
        self.states.fill(VarState::Unassigned);
        self.assigned = 0;
    }

    #[must_use]
    pub fn is_assigned(&self, var: Variable) -> bool {
        self[var].is_assigned()
    }

    #[must_use]
    pub fn num_assigned(&self) -> usize {
        self.assigned
    }

    #[must_use]
    pub fn all_assigned(&self) -> bool {
        self.assigned == self.states.len()
    }

    #[must_use]
    pub fn var_value(&self, var: Variable) -> Option<bool> {
        self.states.get(var as usize).and_then(|s| s.value())
    }

    /// `Some(true)` if `lit` is satisfied, `Some(false)` if falsified, `None`
    /// while its variable is unassigned.
    #[must_use]
    pub fn literal_value(&self, lit: Literal) -> Option<bool> {
        self.var_value(lit.variable())
            .map(|b| b == lit.polarity())
    }

    /// Freezes the current values into a model; unassigned variables are
    /// reported as `false`.
    #[must_use]
    pub fn get_solutions(&self) -> Solutions {
        Solutions(
            self.states
                .iter()
                .map(|s| s.value().unwrap_or(false))
                .collect(),
        )
    }
}

/// A complete model: one boolean per variable, indexed by variable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Solutions(Vec<bool>);

impl Solutions {
    #[must_use]
    pub const fn new(values: Vec<bool>) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn value(&self, var: Variable) -> Option<bool> {
        self.0.get(var as usize).copied()
    }

    /// Whether `lit` holds under this model.
    #[must_use]
    pub fn satisfies(&self, lit: Literal) -> bool {
        self.value(lit.variable()) == Some(lit.polarity())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, bool)> + '_ {
        (0..).zip(self.0.iter().copied())
    }

    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }
}

impl Display for Solutions {
    /// DIMACS model line body: signed 1-based literals, `0` terminated.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let body = self
            .iter()
            .map(|(var, value)| Literal::new(var, value))
            .join(" ");
        if body.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{body} 0")
        }
    }
}
