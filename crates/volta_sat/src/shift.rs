//! Barrel shifters.

use crate::encoder::{SatEncoder, Timestep};
use volta_ir::{ShiftOp, SigSpec};
use volta_solve::{BoolOp, Lit, SolverBuilder};

/// One conditional stage of the barrel shifter: shift by `2^stage`
/// (capped to bound variable blow-up on absurd shift-amount widths).
fn shift_stage(tmp: &[Lit], stage: usize, shift_left: bool, sign_extend: bool) -> Vec<Lit> {
    let step = 1i64 << stage.min(30);
    let dir = if shift_left { -1 } else { 1 };
    (0..tmp.len() as i64)
        .map(|j| {
            let idx = j + step * dir;
            if 0 <= idx && idx < tmp.len() as i64 {
                tmp[idx as usize]
            } else if sign_extend {
                *tmp.last().unwrap()
            } else {
                Lit::FALSE
            }
        })
        .collect()
}

impl<S: SolverBuilder> SatEncoder<'_, S> {
    pub(crate) fn encode_shift(
        &mut self,
        op: ShiftOp,
        a_signed: bool,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let mut va = self.import_tracked(a, t);
        let vb = self.import_tracked(b, t);
        let mut vy = self.import_tracked(y, t);

        let shift_left = matches!(op, ShiftOp::Shl | ShiftOp::Sshl);
        let sign_extend = op == ShiftOp::Sshr && a_signed;

        while vy.len() < va.len() {
            let fresh = self.solver().fresh_lit();
            vy.push(fresh);
        }
        while vy.len() > va.len() {
            let ext = if a_signed {
                *va.last().unwrap_or(&Lit::FALSE)
            } else {
                Lit::FALSE
            };
            va.push(ext);
        }

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        let mut tmp = va.clone();
        for (i, &sel) in vb.iter().enumerate() {
            let shifted = shift_stage(&tmp, i, shift_left, sign_extend);
            tmp = self.solver().vec_ite(sel, &shifted, &tmp);
        }
        self.solver().vec_assume_eq(&tmp, &yy);

        if self.models_undef() {
            let mut ua = self.import_undef(a, t);
            let ub = self.import_undef(b, t);
            let mut uy = self.import_undef(y, t);

            while uy.len() < ua.len() {
                let fresh = self.solver().fresh_lit();
                uy.push(fresh);
            }
            while uy.len() > ua.len() {
                let ext = if a_signed {
                    *ua.last().unwrap_or(&Lit::FALSE)
                } else {
                    Lit::FALSE
                };
                ua.push(ext);
            }

            // The companion shifts in lockstep with the value, using the
            // same (value) selectors.
            let mut utmp = ua.clone();
            for (i, &sel) in vb.iter().enumerate() {
                let shifted = shift_stage(&utmp, i, shift_left, sign_extend);
                utmp = self.solver().vec_ite(sel, &shifted, &utmp);
            }

            let any_b_undef = self.solver().expression(BoolOp::Or, &ub);
            let broadcast = vec![any_b_undef; uy.len()];
            let poisoned = self.solver().vec_or(&utmp, &broadcast);
            self.solver().vec_assume_eq(&poisoned, &uy);
            self.undef_gating(&vy, &yy, &uy);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{assert_forced, cell, pin, TestBench};
    use volta_ir::{CellKind, ShiftOp, SigSpec};
    use volta_solve::LogicSolver;

    fn shift_bench(op: ShiftOp, signed: bool) -> (TestBench, SigSpec, SigSpec, SigSpec, CellKind) {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let b = bench.wire("b", 2);
        let y = bench.wire("y", 4);
        let kind = CellKind::Shift {
            op,
            a_signed: signed,
            a: a.clone(),
            b: b.clone(),
            y: y.clone(),
        };
        (bench, a, b, y, kind)
    }

    fn check(op: ShiftOp, signed: bool, a_val: u64, b_val: u64, expect: u64) {
        let (bench, a, b, y, kind) = shift_bench(op, signed);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, a_val);
        pin(&mut solver, &vb, b_val);
        assert_forced(&mut solver, &vy, expect);
    }

    #[test]
    fn logical_shifts() {
        check(ShiftOp::Shl, false, 0b0011, 1, 0b0110);
        check(ShiftOp::Shl, false, 0b0011, 3, 0b1000);
        check(ShiftOp::Shr, false, 0b1100, 2, 0b0011);
        check(ShiftOp::Shr, false, 0b1000, 3, 0b0001);
        check(ShiftOp::Sshl, false, 0b0011, 2, 0b1100);
    }

    #[test]
    fn arithmetic_shift_right_sign_fills() {
        check(ShiftOp::Sshr, true, 0b1000, 2, 0b1110);
        // Unsigned operand: zero-fill like $shr.
        check(ShiftOp::Sshr, false, 0b1000, 2, 0b0010);
    }

    #[test]
    fn zero_shift_is_identity() {
        check(ShiftOp::Shl, false, 0b1010, 0, 0b1010);
        check(ShiftOp::Shr, false, 0b1010, 0, 0b1010);
    }

    #[test]
    fn out_of_range_shifts_clear() {
        check(ShiftOp::Shl, false, 0b1111, 3, 0b1000);
        check(ShiftOp::Shr, false, 0b1111, 3, 0b0001);
    }
}
