//! Unary arithmetic, multiplication, division, and the shared
//! any-undef-poisons-everything prelude for the arithmetic families.

use crate::align::{extend_binary, extend_binary_with_y, extend_unary};
use crate::encoder::{DivZeroPolicy, SatEncoder, Timestep};
use volta_ir::{DivModOp, SigSpec, UnaryOp};
use volta_solve::{BoolOp, Lit, SolverBuilder};

impl<S: SolverBuilder> SatEncoder<'_, S> {
    /// Shared undef layer for add/sub/mul/div/mod and the arithmetic
    /// compares: any undef bit in either operand poisons the whole
    /// output (for compares, only the result bit). Division adds "the
    /// divisor could be zero" as a further poison source.
    pub(crate) fn arith_undef_prelude(
        &mut self,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        is_compare: bool,
        div_b: Option<&SigSpec>,
        t: Timestep,
    ) {
        let mut ua = self.import_undef(a, t);
        let mut ub = self.import_undef(b, t);
        let mut uy = self.import_undef(y, t);
        if is_compare {
            extend_binary(&mut ua, &mut ub, 0, true);
        } else {
            extend_binary_with_y(self.solver(), &mut ua, &mut ub, &mut uy, true);
        }

        let any_a = self.solver().expression(BoolOp::Or, &ua);
        let any_b = self.solver().expression(BoolOp::Or, &ub);
        let mut poison = self.solver().or(any_a, any_b);

        if let Some(divisor) = div_b {
            let vb = self.import_defined(divisor, t);
            let nonzero = self.solver().expression(BoolOp::Or, &vb);
            let maybe_zero = self.solver().not(nonzero);
            poison = self.solver().or(poison, maybe_zero);
        }

        if is_compare {
            for &bit in &uy[1..] {
                self.solver().set(Lit::FALSE, bit);
            }
            self.solver().set(poison, uy[0]);
        } else {
            let broadcast = vec![poison; uy.len()];
            self.solver().vec_assume_eq(&broadcast, &uy);
        }
    }

    pub(crate) fn encode_unary(
        &mut self,
        op: UnaryOp,
        a_signed: bool,
        a: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let mut va = self.import_tracked(a, t);
        let mut vy = self.import_tracked(y, t);
        extend_unary(self.solver(), &mut va, &mut vy, a_signed);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        match op {
            UnaryOp::Pos | UnaryOp::Bu0 => self.solver().vec_assume_eq(&va, &yy),
            UnaryOp::Neg => {
                let zero = vec![Lit::FALSE; va.len()];
                let negated = self.solver().vec_sub(&zero, &va);
                self.solver().vec_assume_eq(&negated, &yy);
            }
        }

        if self.models_undef() {
            let mut ua = self.import_undef(a, t);
            let mut uy = self.import_undef(y, t);
            // Undef companions of $pos/$neg always sign-extend; $bu0
            // follows its (unsigned) operand.
            let undef_signed = op != UnaryOp::Bu0 || a_signed;
            extend_unary(self.solver(), &mut ua, &mut uy, undef_signed);

            match op {
                UnaryOp::Pos | UnaryOp::Bu0 => self.solver().vec_assume_eq(&ua, &uy),
                UnaryOp::Neg => {
                    let any_a = self.solver().expression(BoolOp::Or, &ua);
                    let broadcast = vec![any_a; uy.len()];
                    self.solver().vec_assume_eq(&broadcast, &uy);
                }
            }
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    pub(crate) fn encode_mul(
        &mut self,
        is_signed: bool,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        if self.models_undef() {
            self.arith_undef_prelude(a, b, y, false, None, t);
        }

        let mut va = self.import_tracked(a, t);
        let mut vb = self.import_tracked(b, t);
        let mut vy = self.import_tracked(y, t);
        extend_binary_with_y(self.solver(), &mut va, &mut vb, &mut vy, is_signed);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        // Shift-and-add over the bits of b.
        let mut acc = vec![Lit::FALSE; va.len()];
        for i in 0..va.len() {
            let mut shifted = vec![Lit::FALSE; va.len()];
            for j in i..va.len() {
                shifted[j] = va[j - i];
            }
            let sum = self.solver().vec_add(&acc, &shifted);
            acc = self.solver().vec_ite(vb[i], &sum, &acc);
        }
        self.solver().vec_assume_eq(&acc, &yy);

        if self.models_undef() {
            let uy = self.import_undef(y, t);
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    pub(crate) fn encode_divmod(
        &mut self,
        op: DivModOp,
        is_signed: bool,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        if self.models_undef() {
            self.arith_undef_prelude(a, b, y, false, Some(b), t);
        }

        let mut va = self.import_tracked(a, t);
        let mut vb = self.import_tracked(b, t);
        let mut vy = self.import_tracked(y, t);
        extend_binary_with_y(self.solver(), &mut va, &mut vb, &mut vy, is_signed);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        // Operate on magnitudes; sign fixups come after the chain.
        let (a_mag, b_mag) = if is_signed {
            let na = self.solver().vec_neg(&va);
            let a_mag = self.solver().vec_ite(*va.last().unwrap(), &na, &va);
            let nb = self.solver().vec_neg(&vb);
            let b_mag = self.solver().vec_ite(*vb.last().unwrap(), &nb, &vb);
            (a_mag, b_mag)
        } else {
            (va.clone(), vb.clone())
        };

        // Restoring long division: the chain buffer is doubled each
        // round so the shifted divisor never truncates.
        let width = a_mag.len();
        let mut chain = a_mag.clone();
        let mut quotient = vec![Lit::FALSE; width];
        for i in (0..width).rev() {
            let doubled = chain.len() * 2;
            chain.resize(doubled, Lit::FALSE);

            let mut b_shl = vec![Lit::FALSE; i];
            b_shl.extend_from_slice(&b_mag);
            b_shl.resize(chain.len(), Lit::FALSE);

            quotient[i] = self.solver().vec_ge_unsigned(&chain, &b_shl);
            let reduced = self.solver().vec_sub(&chain, &b_shl);
            chain = self.solver().vec_ite(quotient[i], &reduced, &chain);
            chain.truncate(width);
        }

        let y_tmp = if self.div_zero_policy() == DivZeroPolicy::Constrain {
            yy.clone()
        } else {
            self.solver().vec_fresh(vy.len())
        };

        match op {
            DivModOp::Div => {
                let result = if is_signed {
                    let nq = self.solver().vec_neg(&quotient);
                    let sign = self.solver().xor(*va.last().unwrap(), *vb.last().unwrap());
                    self.solver().vec_ite(sign, &nq, &quotient)
                } else {
                    quotient.clone()
                };
                self.solver().vec_assume_eq(&y_tmp, &result);
            }
            DivModOp::Mod => {
                let result = if is_signed {
                    let nr = self.solver().vec_neg(&chain);
                    self.solver().vec_ite(*va.last().unwrap(), &nr, &chain)
                } else {
                    chain.clone()
                };
                self.solver().vec_assume_eq(&y_tmp, &result);
            }
        }

        if self.div_zero_policy() == DivZeroPolicy::Constrain {
            let nonzero = self.solver().expression(BoolOp::Or, &vb);
            self.solver().assume(nonzero);
        } else {
            let div_zero = self.div_zero_result(op, is_signed, a, b, &va, &vy);
            let nonzero = self.solver().expression(BoolOp::Or, &vb);
            let muxed = self.solver().vec_ite(nonzero, &y_tmp, &div_zero);
            self.solver().vec_assume_eq(&yy, &muxed);
        }

        if self.models_undef() {
            let uy = self.import_undef(y, t);
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    /// The defined result vector used when the divisor is zero.
    fn div_zero_result(
        &mut self,
        op: DivModOp,
        is_signed: bool,
        a: &SigSpec,
        b: &SigSpec,
        va: &[Lit],
        vy: &[Lit],
    ) -> Vec<Lit> {
        match op {
            DivModOp::Div if is_signed => {
                let all_ones = vec![Lit::TRUE; vy.len()];
                let mut low_one = vec![Lit::FALSE; vy.len()];
                low_one[0] = Lit::TRUE;
                self.solver().vec_ite(*va.last().unwrap(), &low_one, &all_ones)
            }
            DivModOp::Div => {
                // All-ones over the (pre-extension) dividend width,
                // zero-padded to the output.
                let mut out = vec![Lit::TRUE; a.width() as usize];
                out.resize(vy.len(), Lit::FALSE);
                out
            }
            DivModOp::Mod => {
                let copy_bits = a.width().min(b.width()) as usize;
                let mut out = va[..copy_bits].to_vec();
                let pad = if is_signed {
                    *out.last().unwrap_or(&Lit::FALSE)
                } else {
                    Lit::FALSE
                };
                out.resize(vy.len(), pad);
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::encoder::DivZeroPolicy;
    use crate::test_util::{assert_forced, cell, pin, TestBench};
    use volta_ir::{CellKind, DivModOp, SigSpec, UnaryOp};
    use volta_solve::LogicSolver;

    fn divmod_bench(op: DivModOp, signed: bool) -> (TestBench, SigSpec, SigSpec, SigSpec, CellKind) {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let b = bench.wire("b", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::DivMod {
            op,
            a_signed: signed,
            b_signed: signed,
            a: a.clone(),
            b: b.clone(),
            y: y.clone(),
        };
        (bench, a, b, y, kind)
    }

    #[test]
    fn neg_is_twos_complement() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::Unary {
            op: UnaryOp::Neg,
            a_signed: false,
            a: a.clone(),
            y: y.clone(),
        };
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 3);
        assert_forced(&mut solver, &vy, 0b1101);
    }

    #[test]
    fn pos_passes_through() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 3);
        let y = bench.wire("y", 3);
        let kind = CellKind::Unary {
            op: UnaryOp::Pos,
            a_signed: false,
            a: a.clone(),
            y: y.clone(),
        };
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 0b110);
        assert_forced(&mut solver, &vy, 0b110);
    }

    #[test]
    fn mul_computes_product() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let b = bench.wire("b", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::Arith {
            op: volta_ir::ArithOp::Mul,
            a_signed: false,
            b_signed: false,
            a: a.clone(),
            b: b.clone(),
            y: y.clone(),
        };
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 3);
        pin(&mut solver, &vb, 5);
        assert_forced(&mut solver, &vy, 15);
    }

    #[test]
    fn unsigned_division() {
        let (bench, a, b, y, kind) = divmod_bench(DivModOp::Div, false);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 13);
        pin(&mut solver, &vb, 3);
        assert_forced(&mut solver, &vy, 4);
    }

    #[test]
    fn unsigned_modulo() {
        let (bench, a, b, y, kind) = divmod_bench(DivModOp::Mod, false);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 13);
        pin(&mut solver, &vb, 3);
        assert_forced(&mut solver, &vy, 1);
    }

    #[test]
    fn signed_division_rounds_toward_zero() {
        let (bench, a, b, y, kind) = divmod_bench(DivModOp::Div, true);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        // -7 / 2 = -3 (magnitude division, quotient sign = sign xor)
        pin(&mut solver, &va, 0b1001);
        pin(&mut solver, &vb, 0b0010);
        assert_forced(&mut solver, &vy, 0b1101);
    }

    #[test]
    fn signed_modulo_takes_dividend_sign() {
        let (bench, a, b, y, kind) = divmod_bench(DivModOp::Mod, true);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        // -7 mod 2 = -1
        pin(&mut solver, &va, 0b1001);
        pin(&mut solver, &vb, 0b0010);
        assert_forced(&mut solver, &vy, 0b1111);
    }

    #[test]
    fn div_by_zero_defined_result() {
        let (bench, a, b, y, kind) = divmod_bench(DivModOp::Div, false);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        enc.set_div_zero_policy(DivZeroPolicy::DefinedResult);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 0b1001);
        pin(&mut solver, &vb, 0);
        assert_forced(&mut solver, &vy, 0b1111);
    }

    #[test]
    fn div_by_zero_constrained_away() {
        let (bench, a, b, y, kind) = divmod_bench(DivModOp::Div, false);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        enc.set_div_zero_policy(DivZeroPolicy::Constrain);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        let _ = enc.import_defined(&y, None);
        pin(&mut solver, &va, 0b1001);
        pin(&mut solver, &vb, 0);
        assert!(solver.solve(&[]).is_none());
    }
}
