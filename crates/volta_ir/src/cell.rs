//! Cells as tagged variants.
//!
//! Every cell family is a [`CellKind`] variant carrying exactly the
//! ports and parameters that family needs, so a consumer dispatching on
//! the kind cannot forget a port or look up one that does not exist.
//! Width laws (e.g. `|B| = |A|·|S|` for parallel muxes) are the
//! producer's obligation; the SAT translator asserts them.

use crate::fsm::FsmData;
use crate::ids::CellId;
use crate::sigspec::SigSpec;
use serde::{Deserialize, Serialize};
use volta_common::Ident;

/// Bitwise two-operand operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitwiseOp {
    /// Bitwise AND (`$and`, `$_AND_`).
    And,
    /// Bitwise OR (`$or`, `$_OR_`).
    Or,
    /// Bitwise XOR (`$xor`, `$_XOR_`).
    Xor,
    /// Bitwise XNOR (`$xnor`).
    Xnor,
}

/// Unary word-level operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Identity (`$pos`).
    Pos,
    /// Two's-complement negation (`$neg`).
    Neg,
    /// Zero-extending identity (`$bu0`; always unsigned).
    Bu0,
}

/// Word-level arithmetic operators sharing one encode shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArithOp {
    /// Addition (`$add`).
    Add,
    /// Subtraction (`$sub`).
    Sub,
    /// Multiplication (`$mul`).
    Mul,
}

/// Division-family operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DivModOp {
    /// Quotient (`$div`).
    Div,
    /// Remainder (`$mod`; takes the sign of the dividend).
    Mod,
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    /// Less-than (`$lt`).
    Lt,
    /// Less-or-equal (`$le`).
    Le,
    /// Equality (`$eq`).
    Eq,
    /// Inequality (`$ne`).
    Ne,
    /// Strict equality: undef bits compare as values (`$eqx`).
    Eqx,
    /// Strict inequality (`$nex`).
    Nex,
    /// Greater-or-equal (`$ge`).
    Ge,
    /// Greater-than (`$gt`).
    Gt,
}

/// Shift operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShiftOp {
    /// Logical shift left (`$shl`).
    Shl,
    /// Logical shift right (`$shr`).
    Shr,
    /// Arithmetic shift left (`$sshl`; same as `$shl`).
    Sshl,
    /// Arithmetic shift right (`$sshr`; sign-fills when `A` is signed).
    Sshr,
}

/// Reduction operators producing a single result bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReduceOp {
    /// AND reduction (`$reduce_and`).
    And,
    /// OR reduction (`$reduce_or`).
    Or,
    /// XOR reduction (`$reduce_xor`).
    Xor,
    /// XNOR reduction (`$reduce_xnor`).
    Xnor,
    /// Boolean coercion, same as OR reduction (`$reduce_bool`).
    Bool,
    /// Logical negation, inverted OR reduction (`$logic_not`).
    LogicNot,
}

/// Logical connectives over boolean-coerced operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicBinOp {
    /// `$logic_and`.
    And,
    /// `$logic_or`.
    Or,
}

/// Clock polarity of a flip-flop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Rising edge (`$dff`, `$_DFF_P_`).
    Pos,
    /// Falling edge (`$_DFF_N_`).
    Neg,
}

/// An FSM cell: transition table plus its control connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsmCell {
    /// Clock input (single bit).
    pub clk: SigSpec,
    /// Clock polarity.
    pub clk_polarity: Polarity,
    /// Asynchronous reset input (may be empty).
    pub arst: SigSpec,
    /// Reset polarity.
    pub arst_polarity: Polarity,
    /// Control inputs; width matches `data.num_inputs`.
    pub ctrl_in: SigSpec,
    /// Control outputs; width matches `data.num_outputs`.
    pub ctrl_out: SigSpec,
    /// The transition table.
    pub data: FsmData,
}

/// The family and ports of a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[allow(missing_docs)] // port fields follow the uniform A/B/S/Y naming
pub enum CellKind {
    /// Bitwise two-operand gate.
    Bitwise {
        op: BitwiseOp,
        a_signed: bool,
        b_signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Bitwise inverter (`$not`, `$_INV_`).
    Not {
        a_signed: bool,
        a: SigSpec,
        y: SigSpec,
    },
    /// Unary word-level operation.
    Unary {
        op: UnaryOp,
        a_signed: bool,
        a: SigSpec,
        y: SigSpec,
    },
    /// Word-level arithmetic.
    Arith {
        op: ArithOp,
        a_signed: bool,
        b_signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Division or modulo.
    DivMod {
        op: DivModOp,
        a_signed: bool,
        b_signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Comparison producing one result bit.
    Compare {
        op: CompareOp,
        a_signed: bool,
        b_signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Barrel shift.
    Shift {
        op: ShiftOp,
        a_signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Reduction to one bit.
    Reduce { op: ReduceOp, a: SigSpec, y: SigSpec },
    /// Logical connective over boolean-coerced operands.
    LogicBin {
        op: LogicBinOp,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Two-input multiplexer (`$mux`, `$_MUX_`; `|S| = 1`).
    Mux {
        a: SigSpec,
        b: SigSpec,
        s: SigSpec,
        y: SigSpec,
    },
    /// Parallel multiplexer (`|B| = |A|·|S|`). When `safe`, two or more
    /// active select bits yield `A` (`$safe_pmux`).
    Pmux {
        safe: bool,
        a: SigSpec,
        b: SigSpec,
        s: SigSpec,
        y: SigSpec,
    },
    /// Bit-field extraction: `Y = A[offset .. offset+|Y|)`.
    Slice { offset: u32, a: SigSpec, y: SigSpec },
    /// Concatenation: `A` occupies the low bits of `Y`.
    Concat { a: SigSpec, b: SigSpec, y: SigSpec },
    /// D flip-flop; only the data equation across timesteps is modelled.
    Dff {
        polarity: Polarity,
        clk: SigSpec,
        d: SigSpec,
        q: SigSpec,
    },
    /// Assertion: `A` must hold whenever `EN` is active.
    Assert { a: SigSpec, en: SigSpec },
    /// Finite state machine (optimised by `volta_fsm`, rejected by the
    /// SAT translator).
    Fsm(Box<FsmCell>),
    /// Exponentiation; not handled by the SAT translator.
    Pow {
        a_signed: bool,
        b_signed: bool,
        a: SigSpec,
        b: SigSpec,
        y: SigSpec,
    },
    /// Look-up table; not handled by the SAT translator.
    Lut {
        lut: volta_common::Const,
        a: SigSpec,
        y: SigSpec,
    },
    /// Level-sensitive latch; not handled by the SAT translator.
    Dlatch {
        en: SigSpec,
        d: SigSpec,
        q: SigSpec,
    },
}

impl CellKind {
    /// The canonical type tag, for logging and error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellKind::Bitwise { op: BitwiseOp::And, .. } => "$and",
            CellKind::Bitwise { op: BitwiseOp::Or, .. } => "$or",
            CellKind::Bitwise { op: BitwiseOp::Xor, .. } => "$xor",
            CellKind::Bitwise { op: BitwiseOp::Xnor, .. } => "$xnor",
            CellKind::Not { .. } => "$not",
            CellKind::Unary { op: UnaryOp::Pos, .. } => "$pos",
            CellKind::Unary { op: UnaryOp::Neg, .. } => "$neg",
            CellKind::Unary { op: UnaryOp::Bu0, .. } => "$bu0",
            CellKind::Arith { op: ArithOp::Add, .. } => "$add",
            CellKind::Arith { op: ArithOp::Sub, .. } => "$sub",
            CellKind::Arith { op: ArithOp::Mul, .. } => "$mul",
            CellKind::DivMod { op: DivModOp::Div, .. } => "$div",
            CellKind::DivMod { op: DivModOp::Mod, .. } => "$mod",
            CellKind::Compare { op: CompareOp::Lt, .. } => "$lt",
            CellKind::Compare { op: CompareOp::Le, .. } => "$le",
            CellKind::Compare { op: CompareOp::Eq, .. } => "$eq",
            CellKind::Compare { op: CompareOp::Ne, .. } => "$ne",
            CellKind::Compare { op: CompareOp::Eqx, .. } => "$eqx",
            CellKind::Compare { op: CompareOp::Nex, .. } => "$nex",
            CellKind::Compare { op: CompareOp::Ge, .. } => "$ge",
            CellKind::Compare { op: CompareOp::Gt, .. } => "$gt",
            CellKind::Shift { op: ShiftOp::Shl, .. } => "$shl",
            CellKind::Shift { op: ShiftOp::Shr, .. } => "$shr",
            CellKind::Shift { op: ShiftOp::Sshl, .. } => "$sshl",
            CellKind::Shift { op: ShiftOp::Sshr, .. } => "$sshr",
            CellKind::Reduce { op: ReduceOp::And, .. } => "$reduce_and",
            CellKind::Reduce { op: ReduceOp::Or, .. } => "$reduce_or",
            CellKind::Reduce { op: ReduceOp::Xor, .. } => "$reduce_xor",
            CellKind::Reduce { op: ReduceOp::Xnor, .. } => "$reduce_xnor",
            CellKind::Reduce { op: ReduceOp::Bool, .. } => "$reduce_bool",
            CellKind::Reduce { op: ReduceOp::LogicNot, .. } => "$logic_not",
            CellKind::LogicBin { op: LogicBinOp::And, .. } => "$logic_and",
            CellKind::LogicBin { op: LogicBinOp::Or, .. } => "$logic_or",
            CellKind::Mux { .. } => "$mux",
            CellKind::Pmux { safe: false, .. } => "$pmux",
            CellKind::Pmux { safe: true, .. } => "$safe_pmux",
            CellKind::Slice { .. } => "$slice",
            CellKind::Concat { .. } => "$concat",
            CellKind::Dff {
                polarity: Polarity::Pos,
                ..
            } => "$dff",
            CellKind::Dff {
                polarity: Polarity::Neg,
                ..
            } => "$_DFF_N_",
            CellKind::Assert { .. } => "$assert",
            CellKind::Fsm(_) => "$fsm",
            CellKind::Pow { .. } => "$pow",
            CellKind::Lut { .. } => "$lut",
            CellKind::Dlatch { .. } => "$dlatch",
        }
    }
}

/// A cell in the netlist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The unique ID of this cell within its module.
    pub id: CellId,
    /// The cell instance name.
    pub name: Ident,
    /// The cell family and its ports.
    pub kind: CellKind,
}
