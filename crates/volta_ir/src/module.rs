//! Module container: wires, cells, processes, and alias connections.

use crate::arena::Arena;
use crate::cell::{Cell, CellKind};
use crate::ids::{CellId, ModuleId, ProcessId, WireId};
use crate::process::Process;
use crate::sigspec::SigSpec;
use crate::wire::Wire;
use serde::{Deserialize, Serialize};
use volta_common::Ident;

/// An alias connection between two equal-width signals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// The driven signal.
    pub lhs: SigSpec,
    /// The driving signal.
    pub rhs: SigSpec,
}

/// A single module of a design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The unique ID of this module within the design.
    pub id: ModuleId,
    /// The module name.
    pub name: Ident,
    /// All wires.
    pub wires: Arena<WireId, Wire>,
    /// All cells.
    pub cells: Arena<CellId, Cell>,
    /// All processes (pre-lowering remnants consumed by proc-init).
    pub processes: Arena<ProcessId, Process>,
    /// Alias connections between signals.
    pub connections: Vec<Connection>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(id: ModuleId, name: Ident) -> Self {
        Self {
            id,
            name,
            wires: Arena::new(),
            cells: Arena::new(),
            processes: Arena::new(),
            connections: Vec::new(),
        }
    }

    /// Adds a wire and returns its ID.
    pub fn add_wire(&mut self, name: Ident, width: u32) -> WireId {
        let id = WireId::from_raw(self.wires.len() as u32);
        self.wires.alloc(Wire::new(id, name, width))
    }

    /// Adds a cell and returns its ID.
    pub fn add_cell(&mut self, name: Ident, kind: CellKind) -> CellId {
        let id = CellId::from_raw(self.cells.len() as u32);
        self.cells.alloc(Cell { id, name, kind })
    }

    /// Returns a [`SigSpec`] covering all bits of a wire.
    ///
    /// # Panics
    ///
    /// Panics if the wire does not exist.
    pub fn wire_spec(&self, wire: WireId) -> SigSpec {
        SigSpec::from_wire(wire, self.wires[wire].width)
    }
}
