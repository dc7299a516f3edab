//! Reference solver backend: structural gate store plus DPLL.

use crate::builder::SolverBuilder;
use crate::lit::Lit;
use std::collections::{HashMap, HashSet};

/// The two reserved constant ids; gate variables start above them.
const FIRST_VAR: u32 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Gate {
    /// A free variable (fresh or frozen).
    Var,
    And(Lit, Lit),
    Or(Lit, Lit),
    Not(Lit),
}

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
enum CacheKey {
    And(Lit, Lit),
    Or(Lit, Lit),
    Not(Lit),
}

/// A satisfying assignment returned by [`LogicSolver::solve`].
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// The value of a literal in this model.
    pub fn get(&self, lit: Lit) -> bool {
        match lit {
            Lit::TRUE => true,
            Lit::FALSE => false,
            other => self.values[(other.as_raw() - FIRST_VAR) as usize],
        }
    }

    /// Reads a vector of literals as an unsigned integer, LSB first.
    pub fn get_vec(&self, lits: &[Lit]) -> u64 {
        lits.iter()
            .enumerate()
            .fold(0, |acc, (i, &l)| acc | ((self.get(l) as u64) << i))
    }
}

/// A structural formula store with a DPLL satisfiability check.
///
/// Gates are hash-consed and constant-folded on construction, frozen
/// names map idempotently to literals, and `assume` records root
/// constraints. [`solve`](Self::solve) translates the gates to CNF and
/// runs DPLL with unit propagation — adequate for conformance queries,
/// not tuned for large formulas.
#[derive(Default)]
pub struct LogicSolver {
    gates: Vec<Gate>,
    cache: HashMap<CacheKey, Lit>,
    named: HashMap<String, Lit>,
    frozen: HashSet<Lit>,
    assumed: Vec<Lit>,
}

impl LogicSolver {
    /// Creates an empty solver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of assumptions recorded so far.
    pub fn assumption_count(&self) -> usize {
        self.assumed.len()
    }

    /// Returns `true` if the literal was created frozen.
    pub fn is_frozen(&self, lit: Lit) -> bool {
        self.frozen.contains(&lit)
    }

    fn push_gate(&mut self, gate: Gate) -> Lit {
        let lit = Lit::from_raw(FIRST_VAR + self.gates.len() as u32);
        self.gates.push(gate);
        lit
    }

    fn gate(&self, lit: Lit) -> Option<Gate> {
        if lit.is_const() {
            None
        } else {
            Some(self.gates[(lit.as_raw() - FIRST_VAR) as usize])
        }
    }

    /// Checks satisfiability of all assumed constraints plus the given
    /// extra assumptions; returns a model on success.
    pub fn solve(&self, assumptions: &[Lit]) -> Option<Model> {
        let nvars = self.gates.len();
        let var_of = |lit: Lit| (lit.as_raw() - 1) as usize; // TRUE→0, FALSE→1, gates→2..

        let mut clauses: Vec<Vec<(usize, bool)>> = Vec::new();
        clauses.push(vec![(var_of(Lit::TRUE), true)]);
        clauses.push(vec![(var_of(Lit::FALSE), false)]);

        for (i, gate) in self.gates.iter().enumerate() {
            let g = i + 2;
            match *gate {
                Gate::Var => {}
                Gate::And(a, b) => {
                    let (a, b) = (var_of(a), var_of(b));
                    clauses.push(vec![(g, false), (a, true)]);
                    clauses.push(vec![(g, false), (b, true)]);
                    clauses.push(vec![(g, true), (a, false), (b, false)]);
                }
                Gate::Or(a, b) => {
                    let (a, b) = (var_of(a), var_of(b));
                    clauses.push(vec![(g, true), (a, false)]);
                    clauses.push(vec![(g, true), (b, false)]);
                    clauses.push(vec![(g, false), (a, true), (b, true)]);
                }
                Gate::Not(a) => {
                    let a = var_of(a);
                    clauses.push(vec![(g, false), (a, false)]);
                    clauses.push(vec![(g, true), (a, true)]);
                }
            }
        }
        for &lit in self.assumed.iter().chain(assumptions) {
            clauses.push(vec![(var_of(lit), true)]);
        }

        let assignment = dpll(&clauses, nvars + 2)?;
        Some(Model {
            values: assignment[2..].to_vec(),
        })
    }
}

impl SolverBuilder for LogicSolver {
    fn fresh_lit(&mut self) -> Lit {
        self.push_gate(Gate::Var)
    }

    fn frozen_lit(&mut self, name: Option<&str>) -> Lit {
        if let Some(name) = name {
            if let Some(&lit) = self.named.get(name) {
                return lit;
            }
        }
        let lit = self.push_gate(Gate::Var);
        self.frozen.insert(lit);
        if let Some(name) = name {
            self.named.insert(name.to_string(), lit);
        }
        lit
    }

    fn and(&mut self, a: Lit, b: Lit) -> Lit {
        if a == Lit::FALSE || b == Lit::FALSE {
            return Lit::FALSE;
        }
        if a == Lit::TRUE {
            return b;
        }
        if b == Lit::TRUE || a == b {
            return a;
        }
        let key = CacheKey::And(a.min(b), a.max(b));
        if let Some(&hit) = self.cache.get(&key) {
            return hit;
        }
        let lit = self.push_gate(Gate::And(a, b));
        self.cache.insert(key, lit);
        lit
    }

    fn or(&mut self, a: Lit, b: Lit) -> Lit {
        if a == Lit::TRUE || b == Lit::TRUE {
            return Lit::TRUE;
        }
        if a == Lit::FALSE {
            return b;
        }
        if b == Lit::FALSE || a == b {
            return a;
        }
        let key = CacheKey::Or(a.min(b), a.max(b));
        if let Some(&hit) = self.cache.get(&key) {
            return hit;
        }
        let lit = self.push_gate(Gate::Or(a, b));
        self.cache.insert(key, lit);
        lit
    }

    fn not(&mut self, a: Lit) -> Lit {
        match a {
            Lit::TRUE => return Lit::FALSE,
            Lit::FALSE => return Lit::TRUE,
            _ => {}
        }
        if let Some(Gate::Not(inner)) = self.gate(a) {
            return inner;
        }
        let key = CacheKey::Not(a);
        if let Some(&hit) = self.cache.get(&key) {
            return hit;
        }
        let lit = self.push_gate(Gate::Not(a));
        self.cache.insert(key, lit);
        lit
    }

    fn assume(&mut self, lit: Lit) {
        self.assumed.push(lit);
    }
}

/// Chronological-backtracking DPLL with unit propagation.
///
/// Variables are plain indices; clauses are (var, polarity) pairs.
fn dpll(clauses: &[Vec<(usize, bool)>], nvars: usize) -> Option<Vec<bool>> {
    let mut assign: Vec<Option<bool>> = vec![None; nvars];
    let mut trail: Vec<usize> = Vec::new();
    // (trail length at decision, decided var); decisions always try
    // `true` first, and a flipped var leaves the stack (its `false` is
    // then implied at the enclosing level).
    let mut decisions: Vec<(usize, usize)> = Vec::new();

    loop {
        if propagate(clauses, &mut assign, &mut trail) {
            let Some((mark, var)) = decisions.pop() else {
                return None;
            };
            while trail.len() > mark {
                assign[trail.pop().unwrap()] = None;
            }
            assign[var] = Some(false);
            trail.push(var);
            continue;
        }

        match assign.iter().position(|v| v.is_none()) {
            None => return Some(assign.into_iter().map(|v| v.unwrap()).collect()),
            Some(var) => {
                decisions.push((trail.len(), var));
                assign[var] = Some(true);
                trail.push(var);
            }
        }
    }
}

/// Runs unit propagation to fixpoint. Returns `true` on conflict.
fn propagate(
    clauses: &[Vec<(usize, bool)>],
    assign: &mut [Option<bool>],
    trail: &mut Vec<usize>,
) -> bool {
    loop {
        let mut changed = false;
        for clause in clauses {
            let mut satisfied = false;
            let mut unassigned = None;
            let mut unassigned_count = 0;
            for &(var, pol) in clause {
                match assign[var] {
                    Some(v) if v == pol => {
                        satisfied = true;
                        break;
                    }
                    Some(_) => {}
                    None => {
                        unassigned = Some((var, pol));
                        unassigned_count += 1;
                    }
                }
            }
            if satisfied {
                continue;
            }
            match (unassigned_count, unassigned) {
                (0, _) => return true,
                (1, Some((var, pol))) => {
                    assign[var] = Some(pol);
                    trail.push(var);
                    changed = true;
                }
                _ => {}
            }
        }
        if !changed {
            return false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::BoolOp;

    #[test]
    fn empty_formula_is_sat() {
        let solver = LogicSolver::new();
        assert!(solver.solve(&[]).is_some());
    }

    #[test]
    fn constants_fold() {
        let mut s = LogicSolver::new();
        let v = s.fresh_lit();
        assert_eq!(s.and(Lit::FALSE, v), Lit::FALSE);
        assert_eq!(s.and(Lit::TRUE, v), v);
        assert_eq!(s.or(Lit::TRUE, v), Lit::TRUE);
        assert_eq!(s.or(Lit::FALSE, v), v);
        assert_eq!(s.not(Lit::TRUE), Lit::FALSE);
        let nv = s.not(v);
        assert_eq!(s.not(nv), v);
    }

    #[test]
    fn gates_are_hash_consed() {
        let mut s = LogicSolver::new();
        let a = s.fresh_lit();
        let b = s.fresh_lit();
        let g1 = s.and(a, b);
        let g2 = s.and(b, a);
        assert_eq!(g1, g2);
    }

    #[test]
    fn frozen_names_are_idempotent() {
        let mut s = LogicSolver::new();
        let a = s.frozen_lit(Some("top.q [3]"));
        let b = s.frozen_lit(Some("top.q [3]"));
        let c = s.frozen_lit(Some("top.q [2]"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(s.is_frozen(a));
    }

    #[test]
    fn unsatisfiable_assumption() {
        let mut s = LogicSolver::new();
        let v = s.fresh_lit();
        let nv = s.not(v);
        s.assume(v);
        assert!(s.solve(&[]).is_some());
        assert!(s.solve(&[nv]).is_none());
    }

    #[test]
    fn and_semantics() {
        let mut s = LogicSolver::new();
        let a = s.fresh_lit();
        let b = s.fresh_lit();
        let conj = s.and(a, b);
        s.assume(conj);
        let model = s.solve(&[]).unwrap();
        assert!(model.get(a) && model.get(b));
    }

    #[test]
    fn xor_semantics() {
        let mut s = LogicSolver::new();
        let a = s.fresh_lit();
        let b = s.fresh_lit();
        let x = s.xor(a, b);
        s.assume(x);
        let model = s.solve(&[]).unwrap();
        assert_ne!(model.get(a), model.get(b));
        // XOR with both pinned equal is unsat.
        let na = s.not(a);
        let nb = s.not(b);
        assert!(s.solve(&[na, nb]).is_none());
    }

    #[test]
    fn ite_selects() {
        let mut s = LogicSolver::new();
        let sel = s.fresh_lit();
        let out = s.ite(sel, Lit::TRUE, Lit::FALSE);
        let nout = s.not(out);
        let model = s.solve(&[out]).unwrap();
        assert!(model.get(sel));
        let model = s.solve(&[nout]).unwrap();
        assert!(!model.get(sel));
    }

    #[test]
    fn expression_reductions() {
        let mut s = LogicSolver::new();
        assert_eq!(s.expression(BoolOp::And, &[]), Lit::TRUE);
        assert_eq!(s.expression(BoolOp::Or, &[]), Lit::FALSE);
        assert_eq!(s.expression(BoolOp::Xor, &[]), Lit::FALSE);
        let v = s.vec_fresh(3);
        let all = s.expression(BoolOp::And, &v);
        s.assume(all);
        let model = s.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&v), 0b111);
    }

    #[test]
    fn onehot_accepts_and_rejects() {
        let mut s = LogicSolver::new();
        let v = s.vec_fresh(3);
        let oh = s.onehot(&v, false);
        s.assume(oh);
        s.assume(v[1]);
        let model = s.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&v), 0b010);
        // A second hot bit contradicts exactly-one.
        assert!(s.solve(&[v[0]]).is_none());
    }

    #[test]
    fn onehot_zero_acceptance() {
        let mut s = LogicSolver::new();
        let v = s.vec_fresh(2);
        let amo = s.onehot(&v, true);
        let n0 = s.not(v[0]);
        let n1 = s.not(v[1]);
        s.assume(amo);
        assert!(s.solve(&[n0, n1]).is_some());
        assert!(s.solve(&[v[0], v[1]]).is_none());
    }

    #[test]
    fn vec_add_computes_sum() {
        let mut s = LogicSolver::new();
        let a = s.vec_fresh(4);
        let b = s.vec_fresh(4);
        let sum = s.vec_add(&a, &b);
        let a_is_3 = pin(&mut s, &a, 0b0011);
        let b_is_6 = pin(&mut s, &b, 0b0110);
        s.assume(a_is_3);
        s.assume(b_is_6);
        let model = s.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&sum), 0b1001);
    }

    #[test]
    fn vec_sub_wraps() {
        let mut s = LogicSolver::new();
        let a = s.vec_fresh(4);
        let b = s.vec_fresh(4);
        let diff = s.vec_sub(&a, &b);
        let pa = pin(&mut s, &a, 2);
        let pb = pin(&mut s, &b, 5);
        s.assume(pa);
        s.assume(pb);
        let model = s.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&diff), 0b1101); // 2 - 5 = -3 = 0b1101
    }

    #[test]
    fn vec_neg_is_twos_complement() {
        let mut s = LogicSolver::new();
        let a = s.vec_fresh(3);
        let neg = s.vec_neg(&a);
        let pa = pin(&mut s, &a, 0b011);
        s.assume(pa);
        let model = s.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&neg), 0b101); // -3 in 3 bits
    }

    #[test]
    fn unsigned_comparisons() {
        let mut s = LogicSolver::new();
        let a = s.vec_fresh(3);
        let b = s.vec_fresh(3);
        let pa = pin(&mut s, &a, 2);
        let pb = pin(&mut s, &b, 5);
        s.assume(pa);
        s.assume(pb);
        let lt = s.vec_lt_unsigned(&a, &b);
        let le = s.vec_le_unsigned(&a, &b);
        let ge = s.vec_ge_unsigned(&a, &b);
        let gt = s.vec_gt_unsigned(&a, &b);
        let model = s.solve(&[]).unwrap();
        assert!(model.get(lt));
        assert!(model.get(le));
        assert!(!model.get(ge));
        assert!(!model.get(gt));
    }

    #[test]
    fn signed_comparisons() {
        let mut s = LogicSolver::new();
        let a = s.vec_fresh(3);
        let b = s.vec_fresh(3);
        let pa = pin(&mut s, &a, 0b101); // -3
        let pb = pin(&mut s, &b, 0b001); // 1
        s.assume(pa);
        s.assume(pb);
        let lt = s.vec_lt_signed(&a, &b);
        let gt = s.vec_gt_signed(&a, &b);
        let model = s.solve(&[]).unwrap();
        assert!(model.get(lt));
        assert!(!model.get(gt));
        // Unsigned view disagrees: 5 > 1.
        let ult = s.vec_lt_unsigned(&a, &b);
        let model = s.solve(&[]).unwrap();
        assert!(!model.get(ult));
    }

    #[test]
    fn vec_eq_and_ne() {
        let mut s = LogicSolver::new();
        let a = s.vec_fresh(2);
        let b = s.vec_fresh(2);
        let eq = s.vec_eq(&a, &b);
        s.assume(eq);
        s.assume(a[0]);
        let na1 = s.not(a[1]);
        s.assume(na1);
        let model = s.solve(&[]).unwrap();
        assert_eq!(model.get_vec(&b), 0b01);
    }

    /// Builds a literal pinning a vector to a constant.
    fn pin(s: &mut LogicSolver, lits: &[Lit], value: u64) -> Lit {
        let consts: Vec<Lit> = (0..lits.len())
            .map(|i| {
                if (value >> i) & 1 != 0 {
                    Lit::TRUE
                } else {
                    Lit::FALSE
                }
            })
            .collect();
        s.vec_eq(lits, &consts)
    }
}
