//! Shared helpers for encoder unit tests.

use volta_common::Interner;
use volta_ir::{Cell, CellId, CellKind, Connection, Module, ModuleId, SigSpec};
use volta_solve::{Lit, LogicSolver, SolverBuilder};

use crate::encoder::SatEncoder;

/// A module under construction plus its interner.
pub(crate) struct TestBench {
    pub interner: Interner,
    pub module: Module,
}

impl TestBench {
    pub fn new() -> Self {
        let interner = Interner::new();
        let name = interner.get_or_intern("bench");
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

    /// Creates an encoder over the bench module.
    pub fn encoder<'s, S: SolverBuilder>(&'s self, solver: &'s mut S) -> SatEncoder<'s, S> {
        SatEncoder::new(solver, &self.module, &self.interner)
    }
}

/// Wraps a kind into a throwaway cell for `import_cell`.
pub(crate) fn cell(kind: CellKind) -> Cell {
    Cell {
        id: CellId::from_raw(0),
        name: volta_common::Ident::from_raw(0),
        kind,
    }
}

/// Pins each bit of a vector to the given constant via assumptions.
pub(crate) fn pin(solver: &mut LogicSolver, lits: &[Lit], value: u64) {
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
pub(crate) fn assert_forced(solver: &mut LogicSolver, lits: &[Lit], expected: u64) {
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
