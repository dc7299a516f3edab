//! Word-level rewiring cells: slice and concat.

use crate::encoder::{SatEncoder, Timestep};
use volta_ir::SigSpec;
use volta_solve::SolverBuilder;

impl<S: SolverBuilder> SatEncoder<'_, S> {
    pub(crate) fn encode_slice(&mut self, offset: u32, a: &SigSpec, y: &SigSpec, t: Timestep) {
        let sliced = a.extract(offset, y.width());
        let eq = self.signals_eq(&sliced, y, t, t);
        self.solver().assume(eq);
    }

    pub(crate) fn encode_concat(&mut self, a: &SigSpec, b: &SigSpec, y: &SigSpec, t: Timestep) {
        let mut ab = a.clone();
        ab.append(b);
        let eq = self.signals_eq(&ab, y, t, t);
        self.solver().assume(eq);
    }
}
