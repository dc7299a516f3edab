//! Wires and their attribute dictionaries.

use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use volta_common::{Const, Ident};

/// The value of a wire attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    /// A constant bit vector (e.g. the `init` value written by proc-init).
    Const(Const),
    /// A free-form string (e.g. `unused_bits`, a list of space-separated
    /// bit indices).
    String(String),
}

impl AttrValue {
    /// Returns the string payload, if this is a string attribute.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            AttrValue::Const(_) => None,
        }
    }

    /// Returns the constant payload, if this is a constant attribute.
    pub fn as_const(&self) -> Option<&Const> {
        match self {
            AttrValue::Const(c) => Some(c),
            AttrValue::String(_) => None,
        }
    }
}

/// A named bundle of bits with a fixed width.
///
/// Attributes recognised by the core passes: `unused_bits` (string of
/// space-separated bit indices the surrounding design never reads) and
/// `init` (constant initial value, written by the proc-init pass).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    /// The unique ID of this wire within its module.
    pub id: WireId,
    /// The wire name.
    pub name: Ident,
    /// Bit width of the wire.
    pub width: u32,
    /// Attribute dictionary.
    pub attributes: BTreeMap<Ident, AttrValue>,
}

impl Wire {
    /// Creates a wire with no attributes.
    pub fn new(id: WireId, name: Ident, width: u32) -> Self {
        Self {
            id,
            name,
            width,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns `true` if bit `offset` is listed in the wire's
    /// `unused_bits` attribute (interned as `key`).
    pub fn bit_is_unused(&self, key: Ident, offset: u32) -> bool {
        let Some(attr) = self.attributes.get(&key).and_then(AttrValue::as_str) else {
            return false;
        };
        attr.split_whitespace()
            .any(|tok| tok.parse::<u32>() == Ok(offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use volta_common::Interner;

    #[test]
    fn wire_without_attributes() {
        let interner = Interner::new();
        let w = Wire::new(WireId::from_raw(0), interner.get_or_intern("data"), 8);
        assert_eq!(w.width, 8);
        assert!(w.attributes.is_empty());
        assert!(!w.bit_is_unused(interner.get_or_intern("unused_bits"), 0));
    }

    #[test]
    fn unused_bits_lookup() {
        let interner = Interner::new();
        let key = interner.get_or_intern("unused_bits");
        let mut w = Wire::new(WireId::from_raw(0), interner.get_or_intern("ctrl"), 4);
        w.attributes
            .insert(key, AttrValue::String("1 3".to_string()));
        assert!(!w.bit_is_unused(key, 0));
        assert!(w.bit_is_unused(key, 1));
        assert!(!w.bit_is_unused(key, 2));
        assert!(w.bit_is_unused(key, 3));
    }

    #[test]
    fn const_attribute_access() {
        let interner = Interner::new();
        let key = interner.get_or_intern("init");
        let mut w = Wire::new(WireId::from_raw(0), interner.get_or_intern("q"), 2);
        let init = Const::from_binary_str("10").unwrap();
        w.attributes.insert(key, AttrValue::Const(init.clone()));
        assert_eq!(w.attributes[&key].as_const(), Some(&init));
        assert_eq!(w.attributes[&key].as_str(), None);
    }

    #[test]
    fn serde_roundtrip() {
        let interner = Interner::new();
        let mut w = Wire::new(WireId::from_raw(3), interner.get_or_intern("bus"), 16);
        w.attributes.insert(
            interner.get_or_intern("unused_bits"),
            AttrValue::String("15".to_string()),
        );
        let json = serde_json::to_string(&w).unwrap();
        let back: Wire = serde_json::from_str(&json).unwrap();
        assert_eq!(back.width, 16);
        assert_eq!(back.attributes.len(), 1);
    }
}
