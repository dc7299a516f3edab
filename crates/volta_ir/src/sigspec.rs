//! Bit-level signal references.
//!
//! A [`SigSpec`] is an ordered sequence of [`SigBit`]s, LSB first. It is
//! the connection currency of the netlist: every cell port, process
//! action, and module connection is a `SigSpec`. Working at bit
//! granularity keeps concatenations and slices trivial; the
//! [`chunks`](SigSpec::chunks) view recovers `(wire, offset, width)` runs
//! when a pass needs them.

use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use volta_common::{Const, Logic};

/// A single bit of a signal: a constant or a reference into a wire.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum SigBit {
    /// A constant logic value.
    Const(Logic),
    /// Bit `offset` of a wire.
    Wire {
        /// The referenced wire.
        wire: WireId,
        /// The bit offset within the wire, LSB = 0.
        offset: u32,
    },
}

impl SigBit {
    /// Returns `true` for constant bits.
    pub fn is_const(self) -> bool {
        matches!(self, SigBit::Const(_))
    }
}

/// A maximal run of bits from one source, recovered by [`SigSpec::chunks`].
#[derive(Clone, PartialEq, Debug)]
pub enum SigChunk {
    /// A run of constant bits.
    Const(Const),
    /// A run of consecutive bits of one wire.
    Wire {
        /// The referenced wire.
        wire: WireId,
        /// Offset of the first bit of the run.
        offset: u32,
        /// Number of bits in the run.
        width: u32,
    },
}

/// An ordered, LSB-first sequence of signal bits.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SigSpec {
    bits: Vec<SigBit>,
}

impl SigSpec {
    /// Creates an empty signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a signal from a vector of bits.
    pub fn from_bits(bits: Vec<SigBit>) -> Self {
        Self { bits }
    }

    /// Creates a signal covering all `width` bits of a wire.
    pub fn from_wire(wire: WireId, width: u32) -> Self {
        Self {
            bits: (0..width).map(|offset| SigBit::Wire { wire, offset }).collect(),
        }
    }

    /// Creates a constant signal.
    pub fn from_const(value: &Const) -> Self {
        Self {
            bits: value.iter().map(SigBit::Const).collect(),
        }
    }

    /// Creates a constant signal from the low `width` bits of a `u64`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        Self::from_const(&Const::from_u64(value, width))
    }

    /// The width of the signal (number of bits).
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    /// Returns `true` if the signal has no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The underlying bits, LSB first.
    pub fn bits(&self) -> &[SigBit] {
        &self.bits
    }

    /// The bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn bit(&self, index: u32) -> SigBit {
        self.bits[index as usize]
    }

    /// Appends a single bit at the top.
    pub fn push(&mut self, bit: SigBit) {
        self.bits.push(bit);
    }

    /// Appends all bits of `other` above the current top.
    pub fn append(&mut self, other: &SigSpec) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// Removes the bit at `index`, shifting higher bits down.
    pub fn remove(&mut self, index: u32) {
        self.bits.remove(index as usize);
    }

    /// Returns the sub-signal `[offset, offset + len)`.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the width.
    pub fn extract(&self, offset: u32, len: u32) -> SigSpec {
        let lo = offset as usize;
        let hi = lo + len as usize;
        assert!(
            hi <= self.bits.len(),
            "extract [{offset}, {hi}) out of bounds for width {}",
            self.bits.len()
        );
        SigSpec {
            bits: self.bits[lo..hi].to_vec(),
        }
    }

    /// Substitutes every occurrence of a `pattern` bit with the bit at
    /// the same position in `with`. Constant pattern bits are ignored.
    ///
    /// # Panics
    ///
    /// Panics if the pattern and replacement widths differ.
    pub fn replace(&mut self, pattern: &SigSpec, with: &SigSpec) {
        assert_eq!(
            pattern.width(),
            with.width(),
            "replace pattern and replacement must have equal widths"
        );
        let map: HashMap<SigBit, SigBit> = pattern
            .bits
            .iter()
            .zip(&with.bits)
            .filter(|(p, _)| !p.is_const())
            .map(|(p, w)| (*p, *w))
            .collect();
        for bit in &mut self.bits {
            if let Some(replacement) = map.get(bit) {
                *bit = *replacement;
            }
        }
    }

    /// Returns `true` if every bit is a constant.
    pub fn is_fully_const(&self) -> bool {
        self.bits.iter().all(|b| b.is_const())
    }

    /// Converts to a [`Const`] when fully constant, `None` otherwise.
    pub fn as_const(&self) -> Option<Const> {
        self.bits
            .iter()
            .map(|b| match b {
                SigBit::Const(v) => Some(*v),
                SigBit::Wire { .. } => None,
            })
            .collect::<Option<Const>>()
    }

    /// Groups the bits into maximal same-source runs.
    pub fn chunks(&self) -> Vec<SigChunk> {
        let mut out: Vec<SigChunk> = Vec::new();
        for &bit in &self.bits {
            let extended = match (bit, out.last_mut()) {
                (SigBit::Const(v), Some(SigChunk::Const(run))) => {
                    run.push(v);
                    true
                }
                (
                    SigBit::Wire { wire, offset },
                    Some(SigChunk::Wire {
                        wire: run_wire,
                        offset: run_offset,
                        width,
                    }),
                ) if *run_wire == wire && *run_offset + *width == offset => {
                    *width += 1;
                    true
                }
                _ => false,
            };
            if !extended {
                match bit {
                    SigBit::Const(v) => {
                        let mut run = Const::new(0);
                        run.push(v);
                        out.push(SigChunk::Const(run));
                    }
                    SigBit::Wire { wire, offset } => out.push(SigChunk::Wire {
                        wire,
                        offset,
                        width: 1,
                    }),
                }
            }
        }
        out
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        SigSpec { bits: vec![bit] }
    }
}
