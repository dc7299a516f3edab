//! FSM transition tables.

use serde::{Deserialize, Serialize};
use volta_common::Const;

/// Errors raised when an FSM cell's table and connections disagree.
///
/// These are user-input errors: the netlist references signals whose
/// widths are inconsistent with the transition table.
#[derive(Debug, thiserror::Error)]
pub enum FsmError {
    /// A control connection width does not match the table.
    #[error("FSM `{cell}`: {port} width {actual} does not match table width {expected}")]
    ControlWidthMismatch {
        /// The FSM cell name.
        cell: String,
        /// The offending port (`CTRL_IN` or `CTRL_OUT`).
        port: &'static str,
        /// The connection width found.
        actual: u32,
        /// The width the table requires.
        expected: u32,
    },
    /// A transition pattern width does not match the table.
    #[error("FSM `{cell}`: transition {index} has a {port} pattern of width {actual}, expected {expected}")]
    PatternWidthMismatch {
        /// The FSM cell name.
        cell: String,
        /// Index of the offending transition.
        index: usize,
        /// The pattern side (`ctrl_in` or `ctrl_out`).
        port: &'static str,
        /// The pattern width found.
        actual: u32,
        /// The width the table requires.
        expected: u32,
    },
}

/// One row of a transition table.
///
/// Pattern bits are 0/1/x/a; `a` (don't-care) is only produced by the
/// optimiser and matches any input value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Transition {
    /// Index of the source state in the state table.
    pub state_in: usize,
    /// Index of the destination state.
    pub state_out: usize,
    /// Input pattern this row matches.
    pub ctrl_in: Const,
    /// Output pattern this row drives.
    pub ctrl_out: Const,
}

/// The transition table of an FSM cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FsmData {
    /// Number of control input columns.
    pub num_inputs: u32,
    /// Number of control output columns.
    pub num_outputs: u32,
    /// State encodings, indexed by the transitions' state numbers.
    pub state_table: Vec<Const>,
    /// Index of the reset state, if one exists.
    pub reset_state: Option<usize>,
    /// All transitions, in priority order.
    pub transition_table: Vec<Transition>,
}

impl FsmData {
    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.state_table.len()
    }

    /// Checks that every pattern in the table matches the declared
    /// column counts and that the control connections have the declared
    /// widths. `cell` names the cell for error reporting.
    pub fn check_widths(
        &self,
        cell: &str,
        ctrl_in_width: u32,
        ctrl_out_width: u32,
    ) -> Result<(), FsmError> {
        if ctrl_in_width != self.num_inputs {
            return Err(FsmError::ControlWidthMismatch {
                cell: cell.to_string(),
                port: "CTRL_IN",
                actual: ctrl_in_width,
                expected: self.num_inputs,
            });
        }
        if ctrl_out_width != self.num_outputs {
            return Err(FsmError::ControlWidthMismatch {
                cell: cell.to_string(),
                port: "CTRL_OUT",
                actual: ctrl_out_width,
                expected: self.num_outputs,
            });
        }
        for (index, tr) in self.transition_table.iter().enumerate() {
            if tr.ctrl_in.width() != self.num_inputs {
                return Err(FsmError::PatternWidthMismatch {
                    cell: cell.to_string(),
                    index,
                    port: "ctrl_in",
                    actual: tr.ctrl_in.width(),
                    expected: self.num_inputs,
                });
            }
            if tr.ctrl_out.width() != self.num_outputs {
                return Err(FsmError::PatternWidthMismatch {
                    cell: cell.to_string(),
                    index,
                    port: "ctrl_out",
                    actual: tr.ctrl_out.width(),
                    expected: self.num_outputs,
                });
            }
        }
        Ok(())
    }
}
