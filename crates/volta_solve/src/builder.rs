//! The `SolverBuilder` trait: gate primitives plus a derived vector algebra.

use crate::lit::Lit;

/// Reduction operator selector for [`SolverBuilder::expression`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BoolOp {
    /// AND reduction (TRUE on an empty vector).
    And,
    /// OR reduction (FALSE on an empty vector).
    Or,
    /// XOR reduction (FALSE on an empty vector).
    Xor,
}

/// Constraint builder interface consumed by the SAT translator.
///
/// A backend implements the six primitives; everything else is provided
/// in terms of them, so the derived operations are correct on any
/// backend. All operations are pure composition except [`assume`]
/// (records a root constraint) and the literal constructors.
///
/// [`assume`]: Self::assume
pub trait SolverBuilder {
    /// Returns a fresh unconstrained literal.
    fn fresh_lit(&mut self) -> Lit;

    /// Returns a frozen literal the backend must not eliminate during
    /// simplification. With a name, the mapping is idempotent: the same
    /// name always yields the same literal.
    fn frozen_lit(&mut self, name: Option<&str>) -> Lit;

    /// Conjunction of two literals.
    fn and(&mut self, a: Lit, b: Lit) -> Lit;

    /// Disjunction of two literals.
    fn or(&mut self, a: Lit, b: Lit) -> Lit;

    /// Negation of a literal.
    fn not(&mut self, a: Lit) -> Lit;

    /// Asserts that a literal holds in every model.
    fn assume(&mut self, lit: Lit);

    // --- derived scalar operations ---

    /// Exclusive or.
    fn xor(&mut self, a: Lit, b: Lit) -> Lit {
        let na = self.not(a);
        let nb = self.not(b);
        let only_a = self.and(a, nb);
        let only_b = self.and(na, b);
        self.or(only_a, only_b)
    }

    /// Equivalence.
    fn iff(&mut self, a: Lit, b: Lit) -> Lit {
        let x = self.xor(a, b);
        self.not(x)
    }

    /// If-then-else: `s ? a : b`.
    fn ite(&mut self, s: Lit, a: Lit, b: Lit) -> Lit {
        let ns = self.not(s);
        let then_branch = self.and(s, a);
        let else_branch = self.and(ns, b);
        self.or(then_branch, else_branch)
    }

    /// Asserts `a ≡ b`.
    fn set(&mut self, a: Lit, b: Lit) {
        let eq = self.iff(a, b);
        self.assume(eq);
    }

    /// Reduces a vector with the given operator.
    fn expression(&mut self, op: BoolOp, bits: &[Lit]) -> Lit {
        let mut acc = match op {
            BoolOp::And => Lit::TRUE,
            BoolOp::Or | BoolOp::Xor => Lit::FALSE,
        };
        for &bit in bits {
            acc = match op {
                BoolOp::And => self.and(acc, bit),
                BoolOp::Or => self.or(acc, bit),
                BoolOp::Xor => self.xor(acc, bit),
            };
        }
        acc
    }

    /// At-most-one / exactly-one predicate over a vector.
    ///
    /// With `also_accept_zero` the result is "no two bits set";
    /// otherwise "exactly one bit set".
    fn onehot(&mut self, bits: &[Lit], also_accept_zero: bool) -> Lit {
        let mut seen_one = Lit::FALSE;
        let mut seen_many = Lit::FALSE;
        for &bit in bits {
            let another = self.and(seen_one, bit);
            seen_many = self.or(seen_many, another);
            seen_one = self.or(seen_one, bit);
        }
        let not_many = self.not(seen_many);
        if also_accept_zero {
            not_many
        } else {
            self.and(seen_one, not_many)
        }
    }

    // --- derived vector operations ---

    /// Returns `n` fresh unconstrained literals.
    fn vec_fresh(&mut self, n: usize) -> Vec<Lit> {
        (0..n).map(|_| self.fresh_lit()).collect()
    }

    /// Element-wise negation.
    fn vec_not(&mut self, a: &[Lit]) -> Vec<Lit> {
        a.iter().map(|&x| self.not(x)).collect()
    }

    /// Element-wise conjunction.
    fn vec_and(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_and");
        a.iter().zip(b).map(|(&x, &y)| self.and(x, y)).collect()
    }

    /// Element-wise disjunction.
    fn vec_or(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_or");
        a.iter().zip(b).map(|(&x, &y)| self.or(x, y)).collect()
    }

    /// Element-wise exclusive or.
    fn vec_xor(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_xor");
        a.iter().zip(b).map(|(&x, &y)| self.xor(x, y)).collect()
    }

    /// Element-wise equivalence.
    fn vec_iff(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_iff");
        a.iter().zip(b).map(|(&x, &y)| self.iff(x, y)).collect()
    }

    /// Element-wise select: `s ? a : b`.
    fn vec_ite(&mut self, s: Lit, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_ite");
        a.iter()
            .zip(b)
            .map(|(&x, &y)| self.ite(s, x, y))
            .collect()
    }

    /// Single literal for vector equality.
    fn vec_eq(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let bits = self.vec_iff(a, b);
        self.expression(BoolOp::And, &bits)
    }

    /// Single literal for vector inequality.
    fn vec_ne(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let eq = self.vec_eq(a, b);
        self.not(eq)
    }

    /// Asserts two vectors equal.
    fn vec_assume_eq(&mut self, a: &[Lit], b: &[Lit]) {
        let eq = self.vec_eq(a, b);
        self.assume(eq);
    }

    /// Unsigned less-than.
    fn vec_lt_unsigned(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        assert_eq!(a.len(), b.len(), "vector width mismatch in comparison");
        let mut lt = Lit::FALSE;
        for (&x, &y) in a.iter().zip(b) {
            // Higher bits dominate: walk LSB to MSB, letting each stage
            // override the verdict from below when the bits differ.
            let differ = self.xor(x, y);
            let nx = self.not(x);
            let here = self.and(nx, y);
            lt = self.ite(differ, here, lt);
        }
        lt
    }

    /// Unsigned less-or-equal.
    fn vec_le_unsigned(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let gt = self.vec_lt_unsigned(b, a);
        self.not(gt)
    }

    /// Unsigned greater-or-equal.
    fn vec_ge_unsigned(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let lt = self.vec_lt_unsigned(a, b);
        self.not(lt)
    }

    /// Unsigned greater-than.
    fn vec_gt_unsigned(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        self.vec_lt_unsigned(b, a)
    }

    /// Two's-complement signed less-than.
    fn vec_lt_signed(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        assert_eq!(a.len(), b.len(), "vector width mismatch in comparison");
        if a.is_empty() {
            return Lit::FALSE;
        }
        let n = a.len();
        let lower = self.vec_lt_unsigned(&a[..n - 1], &b[..n - 1]);
        let sign_differs = self.xor(a[n - 1], b[n - 1]);
        self.ite(sign_differs, a[n - 1], lower)
    }

    /// Signed less-or-equal.
    fn vec_le_signed(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let gt = self.vec_lt_signed(b, a);
        self.not(gt)
    }

    /// Signed greater-or-equal.
    fn vec_ge_signed(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        let lt = self.vec_lt_signed(a, b);
        self.not(lt)
    }

    /// Signed greater-than.
    fn vec_gt_signed(&mut self, a: &[Lit], b: &[Lit]) -> Lit {
        self.vec_lt_signed(b, a)
    }

    /// Ripple-carry addition; the result has the operand width (carry
    /// out is discarded).
    fn vec_add(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_add");
        let mut carry = Lit::FALSE;
        let mut out = Vec::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let half = self.xor(x, y);
            let sum = self.xor(half, carry);
            let gen = self.and(x, y);
            let prop = self.and(carry, half);
            carry = self.or(gen, prop);
            out.push(sum);
        }
        out
    }

    /// Ripple-borrow subtraction (`a + ¬b + 1`).
    fn vec_sub(&mut self, a: &[Lit], b: &[Lit]) -> Vec<Lit> {
        assert_eq!(a.len(), b.len(), "vector width mismatch in vec_sub");
        let mut carry = Lit::TRUE;
        let mut out = Vec::with_capacity(a.len());
        for (&x, &y) in a.iter().zip(b) {
            let ny = self.not(y);
            let half = self.xor(x, ny);
            let sum = self.xor(half, carry);
            let gen = self.and(x, ny);
            let prop = self.and(carry, half);
            carry = self.or(gen, prop);
            out.push(sum);
        }
        out
    }

    /// Two's-complement negation.
    fn vec_neg(&mut self, a: &[Lit]) -> Vec<Lit> {
        let zero = vec![Lit::FALSE; a.len()];
        self.vec_sub(&zero, a)
    }
}
