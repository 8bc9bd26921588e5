#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Restart schedules.
//!
//! A restart abandons the current partial assignment and resumes search from
//! level 0, keeping every learned clause. The CDCL driver ticks its
//! restarter once per conflict and, at the next conflict-free fixed point,
//! restarts if the current interval has elapsed. Only restarts actually
//! carried out are counted.
//!
//! - [`Fixed`]: every `N` conflicts.
//! - [`Linear`]: after `N`, `2N`, `3N`, ... conflicts.
//! - [`Geometric`]: after `N`, `2N`, `4N`, ... conflicts.
//! - [`Luby`]: after `N` times each term of the Luby sequence
//!   `1, 1, 2, 1, 1, 2, 4, 1, ...`.
//! - [`Never`].

use clap::ValueEnum;
use std::fmt::{Debug, Display};

pub trait Restarter: Debug + Clone {
    fn new() -> Self;

    /// Conflicts left before the next restart.
    fn restarts_in(&self) -> usize;

    /// Counts one conflict towards the current interval.
    fn tick(&mut self);

    /// Records a restart and starts the next interval.
    fn restart(&mut self);

    /// Restarts recorded so far.
    fn num_restarts(&self) -> usize;

    /// Whether the current interval has elapsed. Stays `true` until
    /// [`restart`](Restarter::restart) is called.
    fn is_due(&self) -> bool {
        self.restarts_in() == 0
    }
}

/// Conflict countdown shared by the interval schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    restarts: usize,
    restarts_in: usize,
}

impl Countdown {
    const fn new(first: usize) -> Self {
        Self {
            restarts: 0,
            restarts_in: first,
        }
    }

    const fn tick(&mut self) {
        self.restarts_in = self.restarts_in.saturating_sub(1);
    }

    const fn restart(&mut self, next: usize) {
        self.restarts += 1;
        self.restarts_in = next;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixed<const N: usize>(Countdown);

impl<const N: usize> Restarter for Fixed<N> {
    fn new() -> Self {
        Self(Countdown::new(N.max(1)))
    }

    fn restarts_in(&self) -> usize {
        self.0.restarts_in
    }

    fn tick(&mut self) {
        self.0.tick();
    }

    fn restart(&mut self) {
        self.0.restart(N.max(1));
    }

    fn num_restarts(&self) -> usize {
        self.0.restarts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linear<const N: usize> {
    countdown: Countdown,
    interval: usize,
}

impl<const N: usize> Restarter for Linear<N> {
    fn new() -> Self {
        Self {
            countdown: Countdown::new(N.max(1)),
            interval: N.max(1),
        }
    }

    fn restarts_in(&self) -> usize {
        self.countdown.restarts_in
    }

    fn tick(&mut self) {
        self.countdown.tick();
    }

    fn restart(&mut self) {
        self.interval = self.interval.saturating_add(N.max(1));
        self.countdown.restart(self.interval);
    }

    fn num_restarts(&self) -> usize {
        self.countdown.restarts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Geometric<const N: usize> {
    countdown: Countdown,
    interval: usize,
}

impl<const N: usize> Restarter for Geometric<N> {
    fn new() -> Self {
        Self {
            countdown: Countdown::new(N.max(1)),
            interval: N.max(1),
        }
    }

    fn restarts_in(&self) -> usize {
        self.countdown.restarts_in
    }

    fn tick(&mut self) {
        self.countdown.tick();
    }

    fn restart(&mut self) {
        self.interval = self.interval.saturating_mul(2);
        self.countdown.restart(self.interval);
    }

    fn num_restarts(&self) -> usize {
        self.countdown.restarts
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Luby<const N: usize> {
    countdown: Countdown,
    /// 1-based index of the current term.
    term: usize,
}

/// The `i`-th term (1-based) of the Luby sequence.
#[must_use]
pub fn luby(mut i: usize) -> usize {
    debug_assert!(i > 0, "the Luby sequence is 1-based");
    loop {
        let mut k = 1_u32;
        while (1_usize << k) - 1 < i {
            k += 1;
        }
        if (1_usize << k) - 1 == i {
            return 1 << (k - 1);
        }
        i -= (1 << (k - 1)) - 1;
    }
}

impl<const N: usize> Restarter for Luby<N> {
    fn new() -> Self {
        Self {
            countdown: Countdown::new(N.max(1)),
            term: 1,
        }
    }

    fn restarts_in(&self) -> usize {
        self.countdown.restarts_in
    }

    fn tick(&mut self) {
        self.countdown.tick();
    }

    fn restart(&mut self) {
        self.term += 1;
        self.countdown
            .restart(luby(self.term).saturating_mul(N.max(1)));
    }

    fn num_restarts(&self) -> usize {
        self.countdown.restarts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Never;

impl Restarter for Never {
    fn new() -> Self {
        Self
    }

    fn restarts_in(&self) -> usize {
        usize::MAX
    }

    fn tick(&mut self) {}

    fn restart(&mut self) {}

    fn num_restarts(&self) -> usize {
        0
    }

    fn is_due(&self) -> bool {
        false
    }
}

/// Conflicts per restart unit for the runtime-selected schedules.
pub const DEFAULT_INTERVAL: usize = 100;

/// Runtime choice of restart schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestarterImpls {
    Fixed(Fixed<DEFAULT_INTERVAL>),
    Linear(Linear<DEFAULT_INTERVAL>),
    Geometric(Geometric<DEFAULT_INTERVAL>),
    Luby(Luby<DEFAULT_INTERVAL>),
    Never(Never),
}

impl Restarter for RestarterImpls {
    fn new() -> Self {
        Self::Fixed(Fixed::new())
    }

    fn restarts_in(&self) -> usize {
        match self {
            Self::Fixed(r) => r.restarts_in(),
            Self::Linear(r) => r.restarts_in(),
            Self::Geometric(r) => r.restarts_in(),
            Self::Luby(r) => r.restarts_in(),
            Self::Never(r) => r.restarts_in(),
        }
    }

    fn tick(&mut self) {
        match self {
            Self::Fixed(r) => r.tick(),
            Self::Linear(r) => r.tick(),
            Self::Geometric(r) => r.tick(),
            Self::Luby(r) => r.tick(),
            Self::Never(r) => r.tick(),
        }
    }

    fn restart(&mut self) {
        match self {
            Self::Fixed(r) => r.restart(),
            Self::Linear(r) => r.restart(),
            Self::Geometric(r) => r.restart(),
            Self::Luby(r) => r.restart(),
            Self::Never(r) => r.restart(),
        }
    }

    fn num_restarts(&self) -> usize {
        match self {
            Self::Fixed(r) => r.num_restarts(),
            Self::Linear(r) => r.num_restarts(),
            Self::Geometric(r) => r.num_restarts(),
            Self::Luby(r) => r.num_restarts(),
            Self::Never(r) => r.num_restarts(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, ValueEnum)]
pub enum RestarterType {
    #[default]
    Fixed,
    Linear,
    Geometric,
    Luby,
    Never,
}

impl Display for RestarterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed => write!(f, "fixed"),
            Self::Linear => write!(f, "linear"),
            Self::Geometric => write!(f, "geometric"),
            Self::Luby => write!(f, "luby"),
            Self::Never => write!(f, "never"),
        }
    }
}

impl RestarterType {
    #[must_use]
    pub fn to_impl(self) -> RestarterImpls {
        match self {
            Self::Fixed => RestarterImpls::Fixed(Fixed::new()),
            Self::Linear => RestarterImpls::Linear(Linear::new()),
            Self::Geometric => RestarterImpls::Geometric(Geometric::new()),
            Self::Luby => RestarterImpls::Luby(Luby::new()),
            Self::Never => RestarterImpls::Never(Never::new()),
        }
    }
}
