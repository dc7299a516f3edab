//! Processes: the pre-lowering behavioural remnant the init pass consumes.
//!
//! Only the shape needed by init extraction is modelled: a root case
//! with actions and nested switches, plus a list of sync rules whose
//! `Init` kind carries the initial-value assignments.

use crate::ids::ProcessId;
use crate::sigspec::SigSpec;
use serde::{Deserialize, Serialize};
use volta_common::Ident;

/// An assignment of a value to a target signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// The driven signal.
    pub target: SigSpec,
    /// The driving signal or constant.
    pub value: SigSpec,
}

/// A case branch: comparison values, its actions, and nested switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseRule {
    /// Values the switch signal is compared against (empty on the root).
    pub compare: Vec<SigSpec>,
    /// Assignments active in this branch.
    pub actions: Vec<Action>,
    /// Nested switches.
    pub switches: Vec<Switch>,
}

/// A switch over a signal with one case per branch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    /// The switched signal.
    pub signal: SigSpec,
    /// The branches.
    pub cases: Vec<CaseRule>,
}

/// When a sync rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncKind {
    /// Initialisation-time assignments (from `initial` blocks).
    Init,
    /// Unconditional.
    Always,
    /// Rising edge of the sync signal.
    Posedge,
    /// Falling edge of the sync signal.
    Negedge,
    /// While the sync signal is high.
    High,
    /// While the sync signal is low.
    Low,
}

/// A synchronisation rule with its actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncRule {
    /// When the rule fires.
    pub kind: SyncKind,
    /// The triggering signal (empty for `Init`/`Always`).
    pub signal: SigSpec,
    /// Assignments performed when the rule fires.
    pub actions: Vec<Action>,
}

/// A behavioural process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Process {
    /// The unique ID of this process within its module.
    pub id: ProcessId,
    /// The process name.
    pub name: Ident,
    /// The root decision tree.
    pub root_case: CaseRule,
    /// Synchronisation rules.
    pub syncs: Vec<SyncRule>,
}
