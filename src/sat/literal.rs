//! Literal encoding.
//!
//! A literal is a variable together with a polarity, packed into a single
//! `u32` as `variable * 2 + polarity_bit`. An even code is the positive
//! literal, an odd code the negated one, so the two literals of a variable
//! sit next to each other and `code ^ 1` is the complement. The code doubles
//! as a dense index for per-literal tables such as watch lists.

use core::ops::{Neg, Not};
use std::fmt::{Display, Formatter};

/// Index of a variable, in `0..num_vars`.
pub type Variable = u32;

/// The largest variable index the encoding can hold.
pub const MAX_VARIABLE: Variable = (1 << 31) - 1;

/// A signed reference to a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Literal(u32);

impl Literal {
    /// Creates the literal of `var` with the given polarity.
    ///
    /// `positive == true` yields `var`, `false` yields `¬var`.
    ///
    /// # Panics
    ///
    /// If `var` exceeds [`MAX_VARIABLE`]. Use [`Literal::try_new`] for
    /// unchecked input.
    #[must_use]
    pub const fn new(var: Variable, positive: bool) -> Self {
        assert!(var <= MAX_VARIABLE, "variable index too large for the literal encoding");
        Self((var << 1) | !positive as u32)
    }

    /// Creates the literal of `var`, or `None` if `var` exceeds
    /// [`MAX_VARIABLE`].
    #[must_use]
    pub const fn try_new(var: Variable, positive: bool) -> Option<Self> {
        if var > MAX_VARIABLE {
            None
        } else {
            Some(Self::new(var, positive))
        }
    }

    /// Reinterprets a raw `variable * 2 + polarity_bit` code.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        Self(code)
    }

    /// Converts a 1-based signed DIMACS literal (`3`, `-3`) into a literal
    /// over the 0-based variable `|value| - 1`.
    ///
    /// Returns `None` for `0`, which DIMACS reserves as the clause terminator.
    #[must_use]
    pub const fn from_dimacs(value: i32) -> Option<Self> {
        if value == 0 {
            return None;
        }
        let var = value.unsigned_abs() - 1;
        Some(Self::new(var, value > 0))
    }

    /// The raw encoding.
    #[must_use]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// The encoding as a table index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn variable(self) -> Variable {
        self.0 >> 1
    }

    /// `true` for the positive literal of a variable.
    #[must_use]
    pub const fn polarity(self) -> bool {
        self.0 & 1 == 0
    }

    #[must_use]
    pub const fn is_negated(self) -> bool {
        !self.polarity()
    }

    #[must_use]
    pub const fn negated(self) -> Self {
        Self(self.0 ^ 1)
    }

    /// Whether `other` refers to the same variable with opposite polarity.
    #[must_use]
    pub const fn is_complement_of(self, other: Self) -> bool {
        self.0 ^ 1 == other.0
    }

    /// The 1-based signed DIMACS form of this literal.
    #[must_use]
    pub fn to_dimacs(self) -> i64 {
        let var = i64::from(self.variable()) + 1;
        if self.polarity() { var } else { -var }
    }
}

impl Neg for Literal {
    type Output = Self;

    fn neg(self) -> Self::Output {
        self.negated()
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Not for &Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        self.negated()
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}
