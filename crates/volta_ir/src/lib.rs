//! VoltaIR — the netlist data model for the Volta verification toolkit.
//!
//! This crate defines the post-elaboration netlist types consumed by the
//! SAT translator and the optimisation passes: [`Wire`]s with attribute
//! dictionaries, bit-level [`SigSpec`] signal references, [`Cell`]s as
//! tagged variants carrying exactly the ports each family needs,
//! [`Process`]es for init extraction, [`FsmData`] transition tables, and
//! the [`SignalMap`] canonicaliser.

#![warn(missing_docs)]

mod arena;
mod cell;
mod design;
mod fsm;
mod ids;
mod module;
mod process;
mod sigmap;
mod sigspec;
mod wire;

pub use arena::{Arena, ArenaId};
pub use cell::{
    ArithOp, BitwiseOp, Cell, CellKind, CompareOp, DivModOp, FsmCell, LogicBinOp, Polarity,
    ReduceOp, ShiftOp, UnaryOp,
};
pub use design::Design;
pub use fsm::{FsmData, FsmError, Transition};
pub use ids::{CellId, ModuleId, ProcessId, WireId};
pub use module::{Connection, Module};
pub use process::{Action, CaseRule, Process, Switch, SyncKind, SyncRule};
pub use sigmap::SignalMap;
pub use sigspec::{SigBit, SigChunk, SigSpec};
pub use wire::{AttrValue, Wire};
