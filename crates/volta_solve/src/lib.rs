//! Solver abstraction for the Volta SAT translator.
//!
//! The translator composes opaque literals through the [`SolverBuilder`]
//! trait; a backend implements only the gate primitives (fresh/frozen
//! literals, AND/OR/NOT, assume) and inherits the full vector algebra as
//! default methods. [`LogicSolver`] is the bundled reference backend: a
//! structural formula store with a DPLL satisfiability check, good for
//! conformance queries but not a performance solver.

#![warn(missing_docs)]

mod builder;
mod lit;
mod solver;

pub use builder::{BoolOp, SolverBuilder};
pub use lit::Lit;
pub use solver::{LogicSolver, Model};
