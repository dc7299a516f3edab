//! Conformance test helpers for the Volta toolkit.
//!
//! Provides a netlist builder, solver pin/force helpers, and a
//! reference FSM interpreter used by the integration suites under
//! `tests/`.

#![warn(missing_docs)]

use volta_common::{Const, Interner};
use volta_ir::{Cell, CellId, CellKind, Connection, FsmData, Module, ModuleId, SigSpec};
use volta_solve::{Lit, LogicSolver, SolverBuilder};

/// A module under construction plus its interner.
pub struct NetBuilder {
    /// Interner owning every name in the module.
    pub interner: Interner,
    /// The module being built.
    pub module: Module,
}

impl NetBuilder {
    /// Creates an empty module named `top`.
    pub fn new() -> Self {
        let interner = Interner::new();
        let name = interner.get_or_intern("top");
        Self {
            module: Module::new(ModuleId::from_raw(0), name),
            interner,
        }
    }

    /// Adds a wire and returns a signal covering it.
    pub fn wire(&mut self, name: &str, width: u32) -> SigSpec {
        let ident = self.interner.get_or_intern(name);
        let id = self.module.add_wire(ident, width);
        self.module.wire_spec(id)
    }

    /// Registers an alias connection.
    pub fn connect(&mut self, lhs: &SigSpec, rhs: &SigSpec) {
        self.module.connections.push(Connection {
            lhs: lhs.clone(),
            rhs: rhs.clone(),
        });
    }
}

impl Default for NetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wraps a kind into a throwaway cell for `import_cell`.
pub fn cell(kind: CellKind) -> Cell {
    Cell {
        id: CellId::from_raw(0),
        name: volta_common::Ident::from_raw(0),
        kind,
    }
}

/// Pins each bit of a vector to the given constant via assumptions.
pub fn pin(solver: &mut LogicSolver, lits: &[Lit], value: u64) {
    for (i, &lit) in lits.iter().enumerate() {
        if (value >> i) & 1 != 0 {
            solver.assume(lit);
        } else {
            let n = solver.not(lit);
            solver.assume(n);
        }
    }
}

/// Asserts that every bit of a vector is forced to the expected value:
/// satisfiable at the expected polarity, unsatisfiable at the opposite.
pub fn assert_forced(solver: &mut LogicSolver, lits: &[Lit], expected: u64) {
    for (i, &lit) in lits.iter().enumerate() {
        let want = (expected >> i) & 1 != 0;
        let nlit = solver.not(lit);
        let (pos, neg) = if want { (lit, nlit) } else { (nlit, lit) };
        assert!(
            solver.solve(&[pos]).is_some(),
            "bit {i} cannot take its expected value"
        );
        assert!(solver.solve(&[neg]).is_none(), "bit {i} is not forced");
    }
}

/// True if all literals can be 1 in one model.
pub fn all_satisfiable_high(solver: &LogicSolver, lits: &[Lit]) -> bool {
    solver.solve(lits).is_some()
}

/// True if the vector can take the given constant in some model.
pub fn satisfiable_as(solver: &mut LogicSolver, lits: &[Lit], value: u64) -> bool {
    let assumptions: Vec<Lit> = lits
        .iter()
        .enumerate()
        .map(|(i, &lit)| {
            if (value >> i) & 1 != 0 {
                lit
            } else {
                solver.not(lit)
            }
        })
        .collect();
    solver.solve(&assumptions).is_some()
}

/// One step of the reference FSM interpreter: finds the first transition
/// out of `state` matching `input` (a defined pattern bit must equal the
/// input bit; x and don't-care accept anything) and returns the next
/// state and output pattern.
pub fn fsm_step(data: &FsmData, state: usize, input: &Const) -> Option<(usize, Const)> {
    assert_eq!(input.width(), data.num_inputs, "input width mismatch");
    for tr in &data.transition_table {
        if tr.state_in != state {
            continue;
        }
        let matches = (0..data.num_inputs).all(|i| {
            let p = tr.ctrl_in.get(i);
            !p.is_defined() || p == input.get(i)
        });
        if matches {
            return Some((tr.state_out, tr.ctrl_out.clone()));
        }
    }
    None
}

/// Runs the interpreter over an input stream from a starting state.
pub fn fsm_run(data: &FsmData, start: usize, inputs: &[Const]) -> Vec<Option<(usize, Const)>> {
    let mut state = start;
    let mut out = Vec::with_capacity(inputs.len());
    for input in inputs {
        match fsm_step(data, state, input) {
            Some((next, ctrl_out)) => {
                state = next;
                out.push(Some((next, ctrl_out)));
            }
            None => out.push(None),
        }
    }
    out
}
