//! Shared foundational types for the Volta verification toolkit.
//!
//! This crate provides the 5-state logic value, packed constant vectors,
//! interned identifiers, and the report sink used by all passes.

#![warn(missing_docs)]

pub mod const_vec;
pub mod ident;
pub mod logic;
pub mod report;

pub use const_vec::Const;
pub use ident::{Ident, Interner};
pub use logic::Logic;
pub use report::{Note, Reporter, Severity};
