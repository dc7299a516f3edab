//! Signal canonicalisation.
//!
//! Alias connections make several wire bits name the same net. The
//! [`SignalMap`] union-finds all connected bits and rewrites signals to a
//! canonical representative, so two references to the same net always
//! import to the same solver literal. Constants win over wires: a wire
//! bit tied to a constant canonicalises to that constant.

use crate::module::Module;
use crate::sigspec::{SigBit, SigSpec};
use std::collections::HashMap;

/// A canonicalising map over signal bits.
#[derive(Debug, Default)]
pub struct SignalMap {
    /// Parent pointers; only wire bits appear as keys, and every chain
    /// ends in a bit without an entry (the representative).
    parent: HashMap<SigBit, SigBit>,
}

impl SignalMap {
    /// Creates an empty map (every bit is its own representative).
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from a module's alias connections.
    pub fn from_module(module: &Module) -> Self {
        let mut map = Self::new();
        for conn in &module.connections {
            map.add(&conn.lhs, &conn.rhs);
        }
        map
    }

    /// Registers `lhs` and `rhs` as aliases, bit by bit.
    pub fn add(&mut self, lhs: &SigSpec, rhs: &SigSpec) {
        for (l, r) in lhs.bits().iter().zip(rhs.bits()) {
            self.union(*l, *r);
        }
    }

    /// Returns the canonical representative of a bit.
    pub fn canonical_bit(&self, bit: SigBit) -> SigBit {
        let mut cur = bit;
        while let Some(&next) = self.parent.get(&cur) {
            cur = next;
        }
        cur
    }

    /// Returns the canonical form of a signal.
    pub fn apply(&self, sig: &SigSpec) -> SigSpec {
        SigSpec::from_bits(sig.bits().iter().map(|&b| self.canonical_bit(b)).collect())
    }

    fn union(&mut self, a: SigBit, b: SigBit) {
        let ra = self.canonical_bit(a);
        let rb = self.canonical_bit(b);
        if ra == rb {
            return;
        }
        // SigBit's derived order puts constants first, so the smaller
        // representative is the constant when there is one. Two distinct
        // constants aliased to each other is a malformed netlist; leave
        // them untouched.
        if ra.is_const() && rb.is_const() {
            return;
        }
        if ra < rb {
            self.parent.insert(rb, ra);
        } else {
            self.parent.insert(ra, rb);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::WireId;
    use volta_common::Logic;

    fn wire_bit(wire: u32, offset: u32) -> SigBit {
        SigBit::Wire {
            wire: WireId::from_raw(wire),
            offset,
        }
    }

    fn spec(bits: Vec<SigBit>) -> SigSpec {
        SigSpec::from_bits(bits)
    }

    #[test]
    fn identity_without_connections() {
        let map = SignalMap::new();
        assert_eq!(map.canonical_bit(wire_bit(0, 0)), wire_bit(0, 0));
    }

    #[test]
    fn aliased_bits_share_representative() {
        let mut map = SignalMap::new();
        map.add(&spec(vec![wire_bit(1, 0)]), &spec(vec![wire_bit(0, 0)]));
        assert_eq!(map.canonical_bit(wire_bit(1, 0)), wire_bit(0, 0));
        assert_eq!(map.canonical_bit(wire_bit(0, 0)), wire_bit(0, 0));
    }

    #[test]
    fn chains_resolve_transitively() {
        let mut map = SignalMap::new();
        map.add(&spec(vec![wire_bit(2, 0)]), &spec(vec![wire_bit(1, 0)]));
        map.add(&spec(vec![wire_bit(1, 0)]), &spec(vec![wire_bit(0, 0)]));
        assert_eq!(map.canonical_bit(wire_bit(2, 0)), wire_bit(0, 0));
    }

    #[test]
    fn constants_become_representatives() {
        let mut map = SignalMap::new();
        map.add(
            &spec(vec![wire_bit(0, 0)]),
            &spec(vec![SigBit::Const(Logic::One)]),
        );
        assert_eq!(map.canonical_bit(wire_bit(0, 0)), SigBit::Const(Logic::One));
        // A wire later aliased to the tied wire also resolves to the constant.
        map.add(&spec(vec![wire_bit(1, 0)]), &spec(vec![wire_bit(0, 0)]));
        assert_eq!(map.canonical_bit(wire_bit(1, 0)), SigBit::Const(Logic::One));
    }

    #[test]
    fn apply_rewrites_whole_signal() {
        let mut map = SignalMap::new();
        map.add(&spec(vec![wire_bit(1, 3)]), &spec(vec![wire_bit(0, 2)]));
        let sig = spec(vec![wire_bit(1, 3), SigBit::Const(Logic::Zero), wire_bit(2, 0)]);
        let canon = map.apply(&sig);
        assert_eq!(
            canon.bits(),
            &[wire_bit(0, 2), SigBit::Const(Logic::Zero), wire_bit(2, 0)]
        );
    }

    #[test]
    fn conflicting_constants_are_left_alone() {
        let mut map = SignalMap::new();
        map.add(
            &spec(vec![SigBit::Const(Logic::Zero)]),
            &spec(vec![SigBit::Const(Logic::One)]),
        );
        assert_eq!(
            map.canonical_bit(SigBit::Const(Logic::One)),
            SigBit::Const(Logic::One)
        );
    }
}
