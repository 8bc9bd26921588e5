//! Targets for the [`log`] macros used throughout the solver.
//!
//! The library never installs a logger. Use any `log` backend and filter on
//! these targets, e.g. `RUST_LOG=analysis=debug,backjump=trace` with
//! `env_logger`.

pub mod targets {
    /// Unit propagation.
    pub const PROPAGATION: &str = "propagation";

    /// Conflict analysis and clause learning.
    pub const ANALYSIS: &str = "analysis";

    /// Backtracking and backjumping.
    pub const BACKJUMP: &str = "backjump";

    /// Decisions.
    pub const DECISION: &str = "decision";

    /// Restarts.
    pub const RESTART: &str = "restart";

    /// Search driver start, finish and budget checks.
    pub const SEARCH: &str = "search";

    /// Additions to the formula store.
    pub const CLAUSE_DB: &str = "clause_db";
}
