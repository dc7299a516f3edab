//! Reductions and the logical connectives.

use crate::encoder::{SatEncoder, Timestep};
use volta_ir::{LogicBinOp, ReduceOp, SigSpec};
use volta_solve::{BoolOp, Lit, SolverBuilder};

impl<S: SolverBuilder> SatEncoder<'_, S> {
    pub(crate) fn encode_reduce(&mut self, op: ReduceOp, a: &SigSpec, y: &SigSpec, t: Timestep) {
        let va = self.import_tracked(a, t);
        let vy = self.import_tracked(y, t);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        let result = match op {
            ReduceOp::And => self.solver().expression(BoolOp::And, &va),
            ReduceOp::Or | ReduceOp::Bool => self.solver().expression(BoolOp::Or, &va),
            ReduceOp::Xor => self.solver().expression(BoolOp::Xor, &va),
            ReduceOp::Xnor => {
                let x = self.solver().expression(BoolOp::Xor, &va);
                self.solver().not(x)
            }
            ReduceOp::LogicNot => {
                let any = self.solver().expression(BoolOp::Or, &va);
                self.solver().not(any)
            }
        };
        self.solver().set(result, yy[0]);
        for &bit in &yy[1..] {
            self.solver().set(Lit::FALSE, bit);
        }

        if self.models_undef() {
            let ua = self.import_undef(a, t);
            let uy = self.import_undef(y, t);
            let any_undef = self.solver().expression(BoolOp::Or, &ua);

            let undef_bit = match op {
                // An AND reduction is pinned by any known 0; otherwise
                // the unknowns could flip it.
                ReduceOp::And => {
                    let na = self.solver().vec_not(&va);
                    let nua = self.solver().vec_not(&ua);
                    let known0 = self.solver().vec_and(&na, &nua);
                    let pinned = self.solver().expression(BoolOp::Or, &known0);
                    let not_pinned = self.solver().not(pinned);
                    self.solver().and(not_pinned, any_undef)
                }
                // Dual rule: an OR reduction is pinned by any known 1.
                ReduceOp::Or | ReduceOp::Bool | ReduceOp::LogicNot => {
                    let nua = self.solver().vec_not(&ua);
                    let known1 = self.solver().vec_and(&va, &nua);
                    let pinned = self.solver().expression(BoolOp::Or, &known1);
                    let not_pinned = self.solver().not(pinned);
                    self.solver().and(not_pinned, any_undef)
                }
                ReduceOp::Xor | ReduceOp::Xnor => any_undef,
            };
            self.solver().set(undef_bit, uy[0]);
            for &bit in &uy[1..] {
                self.solver().set(Lit::FALSE, bit);
            }
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    pub(crate) fn encode_logic_bin(
        &mut self,
        op: LogicBinOp,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let va = self.import_tracked(a, t);
        let vb = self.import_tracked(b, t);
        let vy = self.import_tracked(y, t);

        let bool_a = self.solver().expression(BoolOp::Or, &va);
        let bool_b = self.solver().expression(BoolOp::Or, &vb);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        let result = match op {
            LogicBinOp::And => self.solver().and(bool_a, bool_b),
            LogicBinOp::Or => self.solver().or(bool_a, bool_b),
        };
        self.solver().set(result, yy[0]);
        for &bit in &yy[1..] {
            self.solver().set(Lit::FALSE, bit);
        }

        if self.models_undef() {
            let ua = self.import_undef(a, t);
            let ub = self.import_undef(b, t);
            let uy = self.import_undef(y, t);

            // Per-operand facts: definitely all-zero, definitely
            // boolean-true, or possibly undef.
            let a_any_v = self.solver().expression(BoolOp::Or, &va);
            let a_any_x = self.solver().expression(BoolOp::Or, &ua);
            let a_vis = self.solver().or(a_any_v, a_any_x);
            let a_zero = self.solver().not(a_vis);
            let b_any_v = self.solver().expression(BoolOp::Or, &vb);
            let b_any_x = self.solver().expression(BoolOp::Or, &ub);
            let b_vis = self.solver().or(b_any_v, b_any_x);
            let b_zero = self.solver().not(b_vis);

            let nua = self.solver().vec_not(&ua);
            let a_known1_bits = self.solver().vec_and(&va, &nua);
            let a_one = self.solver().expression(BoolOp::Or, &a_known1_bits);
            let nub = self.solver().vec_not(&ub);
            let b_known1_bits = self.solver().vec_and(&vb, &nub);
            let b_one = self.solver().expression(BoolOp::Or, &b_known1_bits);

            let some_undef = self.solver().or(a_any_x, b_any_x);

            let undef_bit = match op {
                LogicBinOp::And => {
                    let both_one = self.solver().and(a_one, b_one);
                    let not_forced_1 = self.solver().not(both_one);
                    let not_a0 = self.solver().not(a_zero);
                    let not_b0 = self.solver().not(b_zero);
                    let u = self.solver().and(some_undef, not_forced_1);
                    let u = self.solver().and(u, not_a0);
                    self.solver().and(u, not_b0)
                }
                LogicBinOp::Or => {
                    let both_zero = self.solver().and(a_zero, b_zero);
                    let not_forced_0 = self.solver().not(both_zero);
                    let not_a1 = self.solver().not(a_one);
                    let not_b1 = self.solver().not(b_one);
                    let u = self.solver().and(some_undef, not_forced_0);
                    let u = self.solver().and(u, not_a1);
                    self.solver().and(u, not_b1)
                }
            };
            self.solver().set(undef_bit, uy[0]);
            for &bit in &uy[1..] {
                self.solver().set(Lit::FALSE, bit);
            }
            self.undef_gating(&vy, &yy, &uy);
        }
    }
}
