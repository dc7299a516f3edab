//! Translator state: signal import, naming, asserts, and cell dispatch.

use std::collections::{BTreeMap, BTreeSet};
use volta_common::{Interner, Logic};
use volta_ir::{ArithOp, Cell, CellKind, Module, SigBit, SigSpec, SignalMap};
use volta_solve::{BoolOp, Lit, SolverBuilder};

/// Timestep discriminator for sequential unrolling.
///
/// `None` imports signals without a timestep tag; `Some(0)` is reserved
/// and rejected.
pub type Timestep = Option<u32>;

/// What to emit for a division by zero.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum DivZeroPolicy {
    /// Emit the defined div-zero result vectors, so `b = 0` stays
    /// satisfiable with a fixed `y`.
    #[default]
    DefinedResult,
    /// Tell the solver `b ≠ 0`; queries needing a zero divisor become
    /// unsatisfiable.
    Constrain,
}

/// The check/enable signals collected from `$assert` cells at one
/// prefix-timestep key.
#[derive(Clone, Debug, Default)]
pub struct AssertPair {
    /// Concatenated `A` ports.
    pub check: SigSpec,
    /// Concatenated `EN` ports.
    pub enable: SigSpec,
}

/// Translates cells into solver constraints.
///
/// Holds the solver by exclusive mutable borrow for the duration of a
/// translation pass; all state the translator owns beyond the solver is
/// the assertion envelope and the initial-state set.
pub struct SatEncoder<'a, S: SolverBuilder> {
    solver: &'a mut S,
    module: &'a Module,
    interner: &'a Interner,
    sigmap: SignalMap,
    prefix: String,
    model_undef: bool,
    div_zero_policy: DivZeroPolicy,
    initial_state: BTreeSet<SigBit>,
    asserts: BTreeMap<String, AssertPair>,
}

impl<'a, S: SolverBuilder> SatEncoder<'a, S> {
    /// Creates an encoder over a module, building the signal map from
    /// the module's alias connections.
    pub fn new(solver: &'a mut S, module: &'a Module, interner: &'a Interner) -> Self {
        Self {
            solver,
            module,
            interner,
            sigmap: SignalMap::from_module(module),
            prefix: String::new(),
            model_undef: false,
            div_zero_policy: DivZeroPolicy::default(),
            initial_state: BTreeSet::new(),
            asserts: BTreeMap::new(),
        }
    }

    /// Enables or disables undef (x) modelling. Must be decided before
    /// any cell is imported.
    pub fn set_model_undef(&mut self, on: bool) {
        self.model_undef = on;
    }

    /// Returns `true` when undef modelling is enabled.
    pub fn models_undef(&self) -> bool {
        self.model_undef
    }

    /// Selects the division-by-zero policy.
    pub fn set_div_zero_policy(&mut self, policy: DivZeroPolicy) {
        self.div_zero_policy = policy;
    }

    pub(crate) fn div_zero_policy(&self) -> DivZeroPolicy {
        self.div_zero_policy
    }

    /// Replaces the naming prefix (used between unrollings or modules).
    pub fn set_context(&mut self, prefix: &str) {
        self.prefix = prefix.to_string();
    }

    /// The canonical bits of `Q` ports seen at timestep 1; the caller
    /// constrains or scans these to model the initial state.
    pub fn initial_state(&self) -> &BTreeSet<SigBit> {
        &self.initial_state
    }

    pub(crate) fn solver(&mut self) -> &mut S {
        &mut *self.solver
    }

    #[cfg(test)]
    pub(crate) fn sigmap(&self) -> &SignalMap {
        &self.sigmap
    }

    pub(crate) fn record_initial_state(&mut self, q: &SigSpec) {
        let canon = self.sigmap.apply(q);
        for &bit in canon.bits() {
            self.initial_state.insert(bit);
        }
    }

    fn key_prefix(&self, undef: bool, timestep: Timestep) -> String {
        let mut pf = String::new();
        if undef {
            pf.push_str("undef:");
        }
        pf.push_str(&self.prefix);
        if let Some(t) = timestep {
            pf.push_str(&format!("@{t}:"));
        }
        pf
    }

    fn import_worker(&mut self, sig: &SigSpec, pf: &str, undef_mode: bool, dup_undef: bool) -> Vec<Lit> {
        let sig = self.sigmap.apply(sig);
        let mut vec = Vec::with_capacity(sig.width() as usize);
        for &bit in sig.bits() {
            match bit {
                SigBit::Const(value) => {
                    if self.model_undef && dup_undef && value == Logic::X {
                        vec.push(self.solver.frozen_lit(None));
                    } else {
                        let hot = value == if undef_mode { Logic::X } else { Logic::One };
                        vec.push(if hot { Lit::TRUE } else { Lit::FALSE });
                    }
                }
                SigBit::Wire { wire, offset } => {
                    let w = &self.module.wires[wire];
                    let name = self.interner.resolve(w.name);
                    let key = if w.width == 1 {
                        format!("{pf}{name}")
                    } else {
                        format!("{pf}{name} [{offset}]")
                    };
                    vec.push(self.solver.frozen_lit(Some(&key)));
                }
            }
        }
        vec
    }

    /// Imports the value bits of a signal; constant `x` bits become FALSE.
    pub fn import_defined(&mut self, sig: &SigSpec, timestep: Timestep) -> Vec<Lit> {
        assert!(timestep != Some(0), "timestep 0 is reserved");
        let pf = self.key_prefix(false, timestep);
        self.import_worker(sig, &pf, false, false)
    }

    /// Imports the value bits of a signal; in undef mode each constant
    /// `x` becomes a fresh frozen literal, since its undef companion
    /// carries the undefinedness.
    pub fn import_tracked(&mut self, sig: &SigSpec, timestep: Timestep) -> Vec<Lit> {
        assert!(timestep != Some(0), "timestep 0 is reserved");
        let pf = self.key_prefix(false, timestep);
        self.import_worker(sig, &pf, false, true)
    }

    /// Imports the undef companion bits of a signal; a constant `x` is
    /// TRUE, every other constant FALSE.
    ///
    /// # Panics
    ///
    /// Panics when undef modelling is disabled.
    pub fn import_undef(&mut self, sig: &SigSpec, timestep: Timestep) -> Vec<Lit> {
        assert!(
            self.model_undef,
            "import_undef requires undef modelling to be enabled"
        );
        assert!(timestep != Some(0), "timestep 0 is reserved");
        let pf = self.key_prefix(true, timestep);
        self.import_worker(sig, &pf, true, false)
    }

    /// Returns a literal asserting that two signals carry the same
    /// value. In undef mode the comparison is undef-aware: companions
    /// must match, and values must match wherever defined.
    pub fn signals_eq(
        &mut self,
        lhs: &SigSpec,
        rhs: &SigSpec,
        timestep_lhs: Timestep,
        timestep_rhs: Timestep,
    ) -> Lit {
        assert_eq!(
            lhs.width(),
            rhs.width(),
            "signals_eq requires equal widths"
        );
        let vl = self.import_defined(lhs, timestep_lhs);
        let vr = self.import_defined(rhs, timestep_rhs);

        if !self.model_undef {
            return self.solver.vec_eq(&vl, &vr);
        }

        let ul = self.import_undef(lhs, timestep_lhs);
        let ur = self.import_undef(rhs, timestep_rhs);

        let mut eq_bits = Vec::with_capacity(vl.len());
        for i in 0..vl.len() {
            let undef_match = self.solver.iff(ul[i], ur[i]);
            let l_vis = self.solver.or(vl[i], ul[i]);
            let r_vis = self.solver.or(vr[i], ur[i]);
            let value_match = self.solver.iff(l_vis, r_vis);
            eq_bits.push(self.solver.and(undef_match, value_match));
        }
        self.solver.expression(BoolOp::And, &eq_bits)
    }

    /// Ties a gated output to its clean value: wherever the undef
    /// companion is low, `y` must equal `yy`.
    pub(crate) fn undef_gating(&mut self, y: &[Lit], yy: &[Lit], undef_y: &[Lit]) {
        assert!(self.model_undef, "undef gating requires undef modelling");
        let iff = self.solver.vec_iff(y, yy);
        let gated = self.solver.vec_or(undef_y, &iff);
        let all = self.solver.expression(BoolOp::And, &gated);
        self.solver.assume(all);
    }

    /// Records an `$assert` cell's signals under the timestep key.
    pub(crate) fn record_assert(&mut self, a: &SigSpec, en: &SigSpec, timestep: Timestep) {
        let key = self.key_prefix(false, timestep);
        let canon_a = self.sigmap.apply(a);
        let canon_en = self.sigmap.apply(en);
        let pair = self.asserts.entry(key).or_default();
        pair.check.append(&canon_a);
        pair.enable.append(&canon_en);
    }

    /// Returns the assert envelope collected at a timestep.
    pub fn asserts_for(&self, timestep: Timestep) -> AssertPair {
        let key = self.key_prefix(false, timestep);
        self.asserts.get(&key).cloned().unwrap_or_default()
    }

    /// Reduces the timestep's assert envelope to a single literal that
    /// holds iff every enabled check passes. In undef mode, checks and
    /// enables are masked to "defined and not undef" first, so an undef
    /// assert cannot falsely satisfy the property.
    pub fn aggregate_asserts(&mut self, timestep: Timestep) -> Lit {
        let pair = self.asserts_for(timestep);

        let (check_bits, enable_bits) = if self.model_undef {
            let cu = self.import_undef(&pair.check, timestep);
            let cd = self.import_tracked(&pair.check, timestep);
            let ncu = self.solver.vec_not(&cu);
            let check = self.solver.vec_and(&ncu, &cd);

            let eu = self.import_undef(&pair.enable, timestep);
            let ed = self.import_tracked(&pair.enable, timestep);
            let neu = self.solver.vec_not(&eu);
            let enable = self.solver.vec_and(&neu, &ed);
            (check, enable)
        } else {
            (
                self.import_tracked(&pair.check, timestep),
                self.import_tracked(&pair.enable, timestep),
            )
        };

        let not_enabled = self.solver.vec_not(&enable_bits);
        let holds = self.solver.vec_or(&check_bits, &not_enabled);
        self.solver.expression(BoolOp::And, &holds)
    }

    /// Emits the constraints for one cell.
    ///
    /// Returns `false` when the cell family is not handled by the
    /// translator (`$pow`, `$lut`, `$fsm`, latches, and flip-flops
    /// imported without a timestep); the caller decides whether that is
    /// an error.
    pub fn import_cell(&mut self, cell: &Cell, timestep: Timestep) -> bool {
        assert!(timestep != Some(0), "timestep 0 is reserved");
        match &cell.kind {
            CellKind::Bitwise {
                op,
                a_signed,
                b_signed,
                a,
                b,
                y,
            } => {
                self.encode_bitwise(*op, *a_signed && *b_signed, a, b, y, timestep);
                true
            }
            CellKind::Not { a_signed, a, y } => {
                self.encode_not(*a_signed, a, y, timestep);
                true
            }
            CellKind::Unary { op, a_signed, a, y } => {
                self.encode_unary(*op, *a_signed, a, y, timestep);
                true
            }
            CellKind::Arith {
                op,
                a_signed,
                b_signed,
                a,
                b,
                y,
            } => {
                let signed = *a_signed && *b_signed;
                match op {
                    ArithOp::Add | ArithOp::Sub => {
                        self.encode_addsub(*op, signed, a, b, y, timestep)
                    }
                    ArithOp::Mul => self.encode_mul(signed, a, b, y, timestep),
                }
                true
            }
            CellKind::DivMod {
                op,
                a_signed,
                b_signed,
                a,
                b,
                y,
            } => {
                self.encode_divmod(*op, *a_signed && *b_signed, a, b, y, timestep);
                true
            }
            CellKind::Compare {
                op,
                a_signed,
                b_signed,
                a,
                b,
                y,
            } => {
                self.encode_compare(*op, *a_signed && *b_signed, a, b, y, timestep);
                true
            }
            CellKind::Shift { op, a_signed, a, b, y } => {
                self.encode_shift(*op, *a_signed, a, b, y, timestep);
                true
            }
            CellKind::Reduce { op, a, y } => {
                self.encode_reduce(*op, a, y, timestep);
                true
            }
            CellKind::LogicBin { op, a, b, y } => {
                self.encode_logic_bin(*op, a, b, y, timestep);
                true
            }
            CellKind::Mux { a, b, s, y } => {
                self.encode_mux(a, b, s, y, timestep);
                true
            }
            CellKind::Pmux { safe, a, b, s, y } => {
                self.encode_pmux(*safe, a, b, s, y, timestep);
                true
            }
            CellKind::Slice { offset, a, y } => {
                self.encode_slice(*offset, a, y, timestep);
                true
            }
            CellKind::Concat { a, b, y } => {
                self.encode_concat(a, b, y, timestep);
                true
            }
            CellKind::Dff { d, q, .. } => match timestep {
                Some(ts) => {
                    self.encode_dff(d, q, ts);
                    true
                }
                None => false,
            },
            CellKind::Assert { a, en } => {
                self.record_assert(a, en, timestep);
                true
            }
            // Unsupported families: exponentiation, lookup tables, FSMs,
            // and every sequential cell other than the D-flip-flop.
            CellKind::Fsm(_) | CellKind::Pow { .. } | CellKind::Lut { .. } | CellKind::Dlatch { .. } => {
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::test_util::TestBench;
    use volta_ir::SigSpec;
    use volta_solve::{Lit, LogicSolver, SolverBuilder};

    #[test]
    fn wire_bits_import_to_stable_named_literals() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 2);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        let first = enc.import_defined(&a, None);
        let second = enc.import_defined(&a, None);
        assert_eq!(first, second);
        assert_ne!(first[0], first[1]);
    }

    #[test]
    fn timestep_and_undef_are_distinct_namespaces() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 1);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        enc.set_model_undef(true);
        let plain = enc.import_defined(&a, None);
        let at1 = enc.import_defined(&a, Some(1));
        let at2 = enc.import_defined(&a, Some(2));
        let undef = enc.import_undef(&a, Some(1));
        assert_ne!(plain[0], at1[0]);
        assert_ne!(at1[0], at2[0]);
        assert_ne!(at1[0], undef[0]);
    }

    #[test]
    fn constants_import_by_mode() {
        let bench = TestBench::new();
        let sig = SigSpec::from_const(&volta_common::Const::from_binary_str("x10").unwrap());
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        enc.set_model_undef(true);
        let defined = enc.import_defined(&sig, None);
        assert_eq!(defined, vec![Lit::FALSE, Lit::TRUE, Lit::FALSE]);
        let undef = enc.import_undef(&sig, None);
        assert_eq!(undef, vec![Lit::FALSE, Lit::FALSE, Lit::TRUE]);
        let tracked = enc.import_tracked(&sig, None);
        assert_eq!(&tracked[..2], &[Lit::FALSE, Lit::TRUE]);
        assert!(!tracked[2].is_const());
    }

    #[test]
    #[should_panic(expected = "undef modelling")]
    fn import_undef_without_model_undef_panics() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 1);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        enc.import_undef(&a, None);
    }

    #[test]
    #[should_panic(expected = "timestep 0")]
    fn timestep_zero_is_rejected() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 1);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        enc.import_defined(&a, Some(0));
    }

    #[test]
    fn prefix_participates_in_keys() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 1);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        let plain = enc.import_defined(&a, None);
        enc.set_context("m1.");
        let prefixed = enc.import_defined(&a, None);
        assert_ne!(plain[0], prefixed[0]);
    }

    #[test]
    fn aliased_wires_import_to_same_literal() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 1);
        let b = bench.wire("b", 1);
        bench.connect(&b, &a);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        assert_eq!(va, vb);
    }

    #[test]
    fn signals_eq_two_valued() {
        let mut bench = TestBench::new();
        let a = bench.wire("a", 2);
        let b = bench.wire("b", 2);
        let mut solver = LogicSolver::new();
        let mut enc = bench.encoder(&mut solver);
        let eq = enc.signals_eq(&a, &b, None, None);
        let va = enc.import_defined(&a, None);
        let vb = enc.import_defined(&b, None);
        solver.assume(eq);
        solver.assume(va[0]);
        let nb = solver.not(va[1]);
        solver.assume(nb);
        let model = solver.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&vb), 0b01);
    }
}
