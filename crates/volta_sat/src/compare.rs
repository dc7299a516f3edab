//! Comparison cells, including the strict eqx/nex pair.

use crate::align::extend_binary;
use crate::encoder::{SatEncoder, Timestep};
use volta_ir::{CompareOp, SigSpec};
use volta_solve::{BoolOp, Lit, SolverBuilder};

impl<S: SolverBuilder> SatEncoder<'_, S> {
    pub(crate) fn encode_compare(
        &mut self,
        op: CompareOp,
        is_signed: bool,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let is_arith = matches!(
            op,
            CompareOp::Lt | CompareOp::Le | CompareOp::Ge | CompareOp::Gt
        );
        if self.models_undef() && is_arith {
            self.arith_undef_prelude(a, b, y, true, None, t);
        }

        let mut va = self.import_tracked(a, t);
        let mut vb = self.import_tracked(b, t);
        let vy = self.import_tracked(y, t);
        extend_binary(&mut va, &mut vb, 0, is_signed);

        let mut yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        let strict = matches!(op, CompareOp::Eqx | CompareOp::Nex);
        if self.models_undef() && strict {
            // Undef bits take part in the comparison as values; the
            // companions extend like the values so the ORs line up.
            let mut ua = self.import_undef(a, t);
            let mut ub = self.import_undef(b, t);
            extend_binary(&mut ua, &mut ub, 0, is_signed);
            va = self.solver().vec_or(&va, &ua);
            vb = self.solver().vec_or(&vb, &ub);
        }

        let result = match op {
            CompareOp::Lt if is_signed => self.solver().vec_lt_signed(&va, &vb),
            CompareOp::Lt => self.solver().vec_lt_unsigned(&va, &vb),
            CompareOp::Le if is_signed => self.solver().vec_le_signed(&va, &vb),
            CompareOp::Le => self.solver().vec_le_unsigned(&va, &vb),
            CompareOp::Eq | CompareOp::Eqx => self.solver().vec_eq(&va, &vb),
            CompareOp::Ne | CompareOp::Nex => self.solver().vec_ne(&va, &vb),
            CompareOp::Ge if is_signed => self.solver().vec_ge_signed(&va, &vb),
            CompareOp::Ge => self.solver().vec_ge_unsigned(&va, &vb),
            CompareOp::Gt if is_signed => self.solver().vec_gt_signed(&va, &vb),
            CompareOp::Gt => self.solver().vec_gt_unsigned(&va, &vb),
        };
        self.solver().set(result, yy[0]);
        for &bit in &yy[1..] {
            self.solver().set(Lit::FALSE, bit);
        }

        if self.models_undef() && strict {
            let mut ua = self.import_undef(a, t);
            let mut ub = self.import_undef(b, t);
            let uy = self.import_undef(y, t);
            extend_binary(&mut ua, &mut ub, 0, is_signed);

            yy[0] = match op {
                CompareOp::Eqx => {
                    let undef_eq = self.solver().vec_eq(&ua, &ub);
                    self.solver().and(yy[0], undef_eq)
                }
                CompareOp::Nex => {
                    let undef_ne = self.solver().vec_ne(&ua, &ub);
                    self.solver().or(yy[0], undef_ne)
                }
                _ => unreachable!(),
            };

            // The strict compares always produce a defined output.
            for &bit in &uy {
                self.solver().set(Lit::FALSE, bit);
            }
            self.solver().vec_assume_eq(&vy, &yy);
        } else if self.models_undef() && matches!(op, CompareOp::Eq | CompareOp::Ne) {
            let mut ua = self.import_undef(a, t);
            let mut ub = self.import_undef(b, t);
            let uy = self.import_undef(y, t);
            extend_binary(&mut ua, &mut ub, 0, is_signed);

            let any_a = self.solver().expression(BoolOp::Or, &ua);
            let any_b = self.solver().expression(BoolOp::Or, &ub);
            let any_undef = self.solver().or(any_a, any_b);

            // Masked comparison: a bit is ignored when either side is
            // undef there. Only a definite mismatch makes the output
            // defined.
            let either_undef = self.solver().vec_or(&ua, &ub);
            let masked_a = self.solver().vec_or(&va, &either_undef);
            let masked_b = self.solver().vec_or(&vb, &either_undef);
            let masked_ne = self.solver().vec_ne(&masked_a, &masked_b);
            let not_separated = self.solver().not(masked_ne);
            let undef_bit = self.solver().and(any_undef, not_separated);

            for &bit in &uy[1..] {
                self.solver().set(Lit::FALSE, bit);
            }
            self.solver().set(undef_bit, uy[0]);
            self.undef_gating(&vy, &yy, &uy);
        } else if self.models_undef() {
            // Arithmetic compare: the prelude already constrained the
            // companion; only the gate remains.
            let uy = self.import_undef(y, t);
            self.undef_gating(&vy, &yy, &uy);
        }
    }
}
