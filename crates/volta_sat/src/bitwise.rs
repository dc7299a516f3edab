//! Bitwise gates, the inverter, and the shared add/sub encode path.

use crate::align::{extend_binary_with_y, extend_unary};
use crate::encoder::{SatEncoder, Timestep};
use volta_ir::{ArithOp, BitwiseOp, SigSpec};
use volta_solve::SolverBuilder;

impl<S: SolverBuilder> SatEncoder<'_, S> {
    pub(crate) fn encode_bitwise(
        &mut self,
        op: BitwiseOp,
        is_signed: bool,
        a: &SigSpec,
        b: &SigSpec,
        y: &SigSpec,
        t: Timestep,
    ) {
        let mut va = self.import_tracked(a, t);
        let mut vb = self.import_tracked(b, t);
        let mut vy = self.import_tracked(y, t);
        extend_binary_with_y(self.solver(), &mut va, &mut vb, &mut vy, is_signed);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };

        let result = match op {
            BitwiseOp::And => self.solver().vec_and(&va, &vb),
            BitwiseOp::Or => self.solver().vec_or(&va, &vb),
            BitwiseOp::Xor => self.solver().vec_xor(&va, &vb),
            BitwiseOp::Xnor => {
                let x = self.solver().vec_xor(&va, &vb);
                self.solver().vec_not(&x)
            }
        };
        self.solver().vec_assume_eq(&result, &yy);

        if self.models_undef() {
            let mut ua = self.import_undef(a, t);
            let mut ub = self.import_undef(b, t);
            let mut uy = self.import_undef(y, t);
            // Companions extend with the same signedness as the values,
            // so the masks line up bit for bit.
            extend_binary_with_y(self.solver(), &mut ua, &mut ub, &mut uy, is_signed);

            let yx = match op {
                // An AND output is defined when either operand is a
                // known 0; an OR output when either is a known 1.
                BitwiseOp::And => {
                    let na = self.solver().vec_not(&va);
                    let nua = self.solver().vec_not(&ua);
                    let a0 = self.solver().vec_and(&na, &nua);
                    let nb = self.solver().vec_not(&vb);
                    let nub = self.solver().vec_not(&ub);
                    let b0 = self.solver().vec_and(&nb, &nub);
                    let either_x = self.solver().vec_or(&ua, &ub);
                    let absorbed = self.solver().vec_or(&a0, &b0);
                    let not_absorbed = self.solver().vec_not(&absorbed);
                    self.solver().vec_and(&either_x, &not_absorbed)
                }
                BitwiseOp::Or => {
                    let nua = self.solver().vec_not(&ua);
                    let a1 = self.solver().vec_and(&va, &nua);
                    let nub = self.solver().vec_not(&ub);
                    let b1 = self.solver().vec_and(&vb, &nub);
                    let either_x = self.solver().vec_or(&ua, &ub);
                    let absorbed = self.solver().vec_or(&a1, &b1);
                    let not_absorbed = self.solver().vec_not(&absorbed);
                    self.solver().vec_and(&either_x, &not_absorbed)
                }
                BitwiseOp::Xor | BitwiseOp::Xnor => self.solver().vec_or(&ua, &ub),
            };
            self.solver().vec_assume_eq(&yx, &uy);
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    pub(crate) fn encode_not(&mut self, a_signed: bool, a: &SigSpec, y: &SigSpec, t: Timestep) {
        let mut va = self.import_tracked(a, t);
        let mut vy = self.import_tracked(y, t);
        extend_unary(self.solver(), &mut va, &mut vy, a_signed);

        let yy = if self.models_undef() {
            self.solver().vec_fresh(vy.len())
        } else {
            vy.clone()
        };
        let inverted = self.solver().vec_not(&va);
        self.solver().vec_assume_eq(&inverted, &yy);

        if self.models_undef() {
            let mut ua = self.import_undef(a, t);
            let mut uy = self.import_undef(y, t);
            extend_unary(self.solver(), &mut ua, &mut uy, true);
            self.solver().vec_assume_eq(&ua, &uy);
            self.undef_gating(&vy, &yy, &uy);
        }
    }

    pub(crate) fn encode_addsub(
        &mut self,
        op: ArithOp,
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
        let result = match op {
            ArithOp::Add => self.solver().vec_add(&va, &vb),
            ArithOp::Sub => self.solver().vec_sub(&va, &vb),
            ArithOp::Mul => unreachable!("multiplication has its own encode path"),
        };
        self.solver().vec_assume_eq(&result, &yy);

        if self.models_undef() {
            let uy = self.import_undef(y, t);
            self.undef_gating(&vy, &yy, &uy);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::{assert_forced, cell, pin, TestBench};
    use volta_ir::{ArithOp, BitwiseOp, CellKind};
    use volta_solve::LogicSolver;

    fn two_input(op: BitwiseOp) -> (TestBench, CellKind) {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let b = bench.wire("b", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::Bitwise {
            op,
            a_signed: false,
            b_signed: false,
            a,
            b,
            y,
        };
        (bench, kind)
    }

    fn roundtrip(op: BitwiseOp, a: u64, b: u64, expect: u64) {
        let (bench, kind) = two_input(op);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind.clone()), None));
        let (sa, sb, sy) = match &kind {
            CellKind::Bitwise { a, b, y, .. } => (a.clone(), b.clone(), y.clone()),
            _ => unreachable!(),
        };
        let va = enc.import_defined(&sa, None);
        let vb = enc.import_defined(&sb, None);
        let vy = enc.import_defined(&sy, None);
        pin(&mut solver, &va, a);
        pin(&mut solver, &vb, b);
        assert_forced(&mut solver, &vy, expect);
    }

    #[test]
    fn and_or_xor_xnor_truth() {
        roundtrip(BitwiseOp::And, 0b1100, 0b1010, 0b1000);
        roundtrip(BitwiseOp::Or, 0b1100, 0b1010, 0b1110);
        roundtrip(BitwiseOp::Xor, 0b1100, 0b1010, 0b0110);
        roundtrip(BitwiseOp::Xnor, 0b1100, 0b1010, 0b1001);
    }

    #[test]
    fn add_computes_sum() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let b = bench.wire("b", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::Arith {
            op: ArithOp::Add,
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
        pin(&mut solver, &va, 0b0011);
        pin(&mut solver, &vb, 0b0110);
        assert_forced(&mut solver, &vy, 0b1001);
    }

    #[test]
    fn sub_wraps_modulo_width() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 4);
        let b = bench.wire("b", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::Arith {
            op: ArithOp::Sub,
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
        pin(&mut solver, &va, 2);
        pin(&mut solver, &vb, 5);
        assert_forced(&mut solver, &vy, 0b1101);
    }

    #[test]
    fn signed_extension_to_wider_output() {
        // -1 (2 bits) & 0b1111 with both operands signed extends a to 0b1111.
        let mut bench = TestBench::new();
        let a = bench.wire("a", 2);
        let b = bench.wire("b", 4);
        let y = bench.wire("y", 4);
        let kind = CellKind::Bitwise {
            op: BitwiseOp::And,
            a_signed: true,
            b_signed: true,
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
        pin(&mut solver, &va, 0b11);
        pin(&mut solver, &vb, 0b1111);
        assert_forced(&mut solver, &vy, 0b1111);
    }

    #[test]
    fn not_inverts() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 3);
        let y = bench.wire("y", 3);
        let kind = CellKind::Not {
            a_signed: false,
            a: a.clone(),
            y: y.clone(),
        };
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        assert!(enc.import_cell(&cell(kind), None));
        let va = enc.import_defined(&a, None);
        let vy = enc.import_defined(&y, None);
        pin(&mut solver, &va, 0b101);
        assert_forced(&mut solver, &vy, 0b010);
    }
}
