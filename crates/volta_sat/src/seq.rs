//! Sequential cells and assertions.

use crate::encoder::SatEncoder;
use volta_ir::SigSpec;
use volta_solve::SolverBuilder;

impl<S: SolverBuilder> SatEncoder<'_, S> {
    /// The D-flip-flop data equation across timesteps.
    ///
    /// At timestep 1 the `Q` bits join the initial-state set and no
    /// constraint is emitted; afterwards `Q@t = D@(t-1)`, companions
    /// alike. Clock polarity and asynchronous resets are not modelled.
    pub(crate) fn encode_dff(&mut self, d: &SigSpec, q: &SigSpec, ts: u32) {
        if ts == 1 {
            self.record_initial_state(q);
            return;
        }

        let vd = self.import_tracked(d, Some(ts - 1));
        let vq = self.import_tracked(q, Some(ts));

        let qq = if self.models_undef() {
            self.solver().vec_fresh(vq.len())
        } else {
            vq.clone()
        };
        self.solver().vec_assume_eq(&vd, &qq);

        if self.models_undef() {
            let ud = self.import_undef(d, Some(ts - 1));
            let uq = self.import_undef(q, Some(ts));
            self.solver().vec_assume_eq(&ud, &uq);
            self.undef_gating(&vq, &qq, &uq);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{assert_forced, cell, pin, TestBench};
    use volta_common::Const;
    use volta_ir::{CellKind, Polarity, SigBit, SigSpec};
    use volta_solve::LogicSolver;

    fn dff(bench: &mut TestBench) -> (SigSpec, SigSpec, CellKind) {
        let clk = bench.wire("clk", 1);
        let d = bench.wire("d", 2);
        let q = bench.wire("q", 2);
        let kind = CellKind::Dff {
            polarity: Polarity::Pos,
            clk,
            d: d.clone(),
            q: q.clone(),
        };
        (d, q, kind)
    }

    #[test]
    fn without_timestep_is_not_handled() {
        let mut bench = TestBench::new();
        let (_, _, kind) = dff(&mut bench);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(!enc.import_cell(&cell(kind), None));
    }

    #[test]
    fn first_timestep_records_initial_state() {
        let mut bench = TestBench::new();
        let (_, q, kind) = dff(&mut bench);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), Some(1)));
        for &bit in q.bits() {
            assert!(enc.initial_state().contains(&bit));
        }
        // No constraint was emitted for timestep 1.
        assert_eq!(solver.assumption_count(), 0);
    }

    #[test]
    fn later_timesteps_connect_d_to_q() {
        let mut bench = TestBench::new();
        let (d, q, kind) = dff(&mut bench);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind.clone()), Some(1)));
        assert!(enc.import_cell(&cell(kind), Some(2)));
        let d1 = enc.import_defined(&d, Some(1));
        let q2 = enc.import_defined(&q, Some(2));
        pin(&mut solver, &d1, 0b10);
        assert_forced(&mut solver, &q2, 0b10);
    }

    #[test]
    fn constant_d_drives_next_q() {
        let mut bench = TestBench::new();
        let clk = bench.wire("clk", 1);
        let q = bench.wire("q", 1);
        let kind = CellKind::Dff {
            polarity: Polarity::Pos,
            clk,
            d: SigSpec::from_const(&Const::from_u64(1, 1)),
            q: q.clone(),
        };
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind.clone()), Some(1)));
        assert!(enc.import_cell(&cell(kind), Some(2)));
        let q2 = enc.import_defined(&q, Some(2));
        assert_forced(&mut solver, &q2, 1);
    }

    #[test]
    fn initial_state_uses_canonical_bits() {
        let mut bench = TestBench::new();
        let clk = bench.wire("clk", 1);
        let d = bench.wire("d", 1);
        let q = bench.wire("q", 1);
        let alias = bench.wire("q_alias", 1);
        bench.connect(&q, &alias);
        let kind = CellKind::Dff {
            polarity: Polarity::Pos,
            clk,
            d,
            q: q.clone(),
        };
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), Some(1)));
        // The canonical representative of q (the earlier wire in the
        // union) is what lands in the set.
        let canonical: Vec<SigBit> = enc.sigmap().apply(&q).bits().to_vec();
        for bit in canonical {
            assert!(enc.initial_state().contains(&bit));
        }
    }
}
