//! A DPLL and CDCL SAT solver.
//!
//! Formulas are built through the [`Solver`](sat::solver::Solver) trait or
//! read from DIMACS with [`sat::dimacs`], then solved by either search driver:
//! [`Dpll`](sat::dpll::Dpll) for plain chronological backtracking or
//! [`Cdcl`](sat::cdcl::Cdcl) for clause learning with backjumping and
//! restarts. The components each driver is built from are chosen through a
//! [`SolverConfig`](sat::solver::SolverConfig).
//!
//! ```
//! use sat_engine::sat::cdcl::Cdcl;
//! use sat_engine::sat::literal::Literal;
//! use sat_engine::sat::solver::{DefaultConfig, Solver};
//!
//! let mut solver = Cdcl::<DefaultConfig>::new(2).unwrap();
//! solver.add_clause([Literal::new(0, true), Literal::new(1, true)]).unwrap();
//! solver.add_clause([Literal::new(0, false)]).unwrap();
//!
//! let model = solver.solve().into_solutions().unwrap();
//! assert_eq!(model.as_slice(), &[false, true]);
//! ```

/// The solver: formula store, search state, components and drivers.
pub mod sat;
