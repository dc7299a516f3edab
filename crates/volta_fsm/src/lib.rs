//! FSM transition-table optimisation.
//!
//! Rewrites the transition tables of `$fsm` cells: dead outputs and
//! inputs are dropped, aliased and fed-back inputs are folded, and
//! groups of transitions are fused with don't-care bits. The rewrites
//! preserve the FSM's language over input streams under the
//! interpretation that a don't-care bit matches any value.

#![warn(missing_docs)]

mod opt;

pub use opt::{fsm_opt, optimize_fsm};
