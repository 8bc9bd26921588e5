#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The decision engine: which unassigned variable to branch on next.
//!
//! Every selector branches on the chosen variable with `true` first; the
//! drivers take care of retrying `false`.

use crate::sat::assignment::Assignment;
use crate::sat::literal::Variable;
use clap::ValueEnum;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::fmt::{Debug, Display};
use std::ops::Index;

pub trait VariableSelection: Debug + Clone {
    fn new(num_vars: usize) -> Self;

    /// The next variable to branch on, or `None` once every variable is
    /// assigned.
    fn pick(&self, assignment: &Assignment) -> Option<Variable>;

    /// Rewards variables that took part in a conflict.
    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T);

    /// Ages all scores; called once per conflict.
    fn decay(&mut self);
}

#[allow(clippy::cast_possible_truncation)]
const fn to_variable(index: usize) -> Variable {
    index as Variable
}

/// Always the lowest-indexed unassigned variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedOrder(usize);

impl VariableSelection for FixedOrder {
    fn new(num_vars: usize) -> Self {
        Self(num_vars)
    }

    fn pick(&self, assignment: &Assignment) -> Option<Variable> {
        (0..self.0)
            .map(to_variable)
            .find(|&var| !assignment.is_assigned(var))
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, _: T) {}

    fn decay(&mut self) {}
}

pub const DEFAULT_DECAY: f64 = 0.95;

/// Activities above this are scaled down by [`RESCALE_FACTOR`].
const RESCALE_LIMIT: f64 = 1e100;
const RESCALE_FACTOR: f64 = 1e-100;

/// Variable State Independent Decaying Sum.
///
/// Each variable carries an activity score bumped whenever it appears in
/// conflict analysis, so recently conflicting variables are preferred. Ties
/// go to the lowest index.
///
/// Rather than scaling every score down after a conflict, the bump increment
/// grows by `1 / decay`, which orders variables the same way. Scores and the
/// increment are rescaled together once either passes [`RESCALE_LIMIT`].
#[derive(Debug, Clone, PartialEq)]
pub struct Vsids {
    activity: Vec<OrderedFloat<f64>>,
    decay: f64,
    increment: f64,
}

impl Index<Variable> for Vsids {
    type Output = OrderedFloat<f64>;

    fn index(&self, index: Variable) -> &Self::Output {
        &self.activity[index as usize]
    }
}

impl Vsids {
    #[must_use]
    pub fn with_decay(num_vars: usize, decay: f64) -> Self {
        Self {
            activity: vec![OrderedFloat(0.0); num_vars],
            decay,
            increment: 1.0,
        }
    }

    pub fn bump(&mut self, var: Variable) {
        let a = &mut self.activity[var as usize].0;
        *a += self.increment;
        if *a > RESCALE_LIMIT {
            self.rescale();
        }
    }

    /// The amount the next bump adds.
    #[must_use]
    pub const fn increment(&self) -> f64 {
        self.increment
    }

    fn rescale(&mut self) {
        for a in &mut self.activity {
            a.0 *= RESCALE_FACTOR;
        }
        self.increment *= RESCALE_FACTOR;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        (0..).zip(self.activity.iter().map(|a| a.0))
    }
}

impl VariableSelection for Vsids {
    fn new(num_vars: usize) -> Self {
        Self::with_decay(num_vars, DEFAULT_DECAY)
    }

    fn pick(&self, assignment: &Assignment) -> Option<Variable> {
        self.activity
            .iter()
            .enumerate()
            .map(|(i, &a)| (to_variable(i), a))
            .filter(|&(var, _)| !assignment.is_assigned(var))
            .min_by_key(|&(var, a)| (Reverse(a), var))
            .map(|(var, _)| var)
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        for var in vars {
            self.bump(var);
        }
    }

    fn decay(&mut self) {
        self.increment /= self.decay;
        if self.increment > RESCALE_LIMIT {
            self.rescale();
        }
    }
}

/// Runtime choice of decision heuristic.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableSelectionImpls {
    FixedOrder(FixedOrder),
    Vsids(Vsids),
}

impl VariableSelection for VariableSelectionImpls {
    fn new(num_vars: usize) -> Self {
        Self::FixedOrder(FixedOrder::new(num_vars))
    }

    fn pick(&self, assignment: &Assignment) -> Option<Variable> {
        match self {
            Self::FixedOrder(s) => s.pick(assignment),
            Self::Vsids(s) => s.pick(assignment),
        }
    }

    fn bumps<T: IntoIterator<Item = Variable>>(&mut self, vars: T) {
        match self {
            Self::FixedOrder(s) => s.bumps(vars),
            Self::Vsids(s) => s.bumps(vars),
        }
    }

    fn decay(&mut self) {
        match self {
            Self::FixedOrder(s) => s.decay(),
            Self::Vsids(s) => s.decay(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum VariableSelectionType {
    #[default]
    FixedOrder,
    Vsids,
}

impl Display for VariableSelectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FixedOrder => write!(f, "fixed-order"),
            Self::Vsids => write!(f, "vsids"),
        }
    }
}

impl VariableSelectionType {
    #[must_use]
    pub fn to_impl(self, num_vars: usize) -> VariableSelectionImpls {
        match self {
            Self::FixedOrder => VariableSelectionImpls::FixedOrder(FixedOrder::new(num_vars)),
            Self::Vsids => VariableSelectionImpls::Vsids(Vsids::new(num_vars)),
        }
    }
}
