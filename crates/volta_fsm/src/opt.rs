//! The optimisation passes over a loaded transition table.

use std::collections::{BTreeMap, BTreeSet};
use volta_common::{Const, Interner, Logic, Reporter};
use volta_ir::{CellId, CellKind, FsmCell, FsmError, Module, SigBit, Transition};

/// Applies the optimiser to every FSM cell of a module. Returns the
/// number of cells optimised.
pub fn fsm_opt(
    module: &mut Module,
    interner: &Interner,
    reporter: &Reporter,
) -> Result<usize, FsmError> {
    let fsm_cells: Vec<CellId> = module
        .cells
        .iter()
        .filter(|(_, cell)| matches!(cell.kind, CellKind::Fsm(_)))
        .map(|(id, _)| id)
        .collect();
    for &id in &fsm_cells {
        optimize_fsm(module, id, interner, reporter)?;
    }
    Ok(fsm_cells.len())
}

/// Optimises a single FSM cell in place.
///
/// The cell contents are cloned out, rewritten, and written back
/// atomically; on error the cell is left untouched.
///
/// # Panics
///
/// Panics if `cell_id` does not name an FSM cell.
pub fn optimize_fsm(
    module: &mut Module,
    cell_id: CellId,
    interner: &Interner,
    reporter: &Reporter,
) -> Result<(), FsmError> {
    let cell = &module.cells[cell_id];
    let cell_name = interner.resolve(cell.name).to_string();
    let CellKind::Fsm(fsm) = &cell.kind else {
        panic!("optimize_fsm called on non-FSM cell `{cell_name}`");
    };
    let mut fsm: FsmCell = (**fsm).clone();
    fsm.data
        .check_widths(&cell_name, fsm.ctrl_in.width(), fsm.ctrl_out.width())?;

    reporter.info(format!(
        "optimizing FSM `{cell_name}` in module `{}`",
        interner.resolve(module.name)
    ));

    let ctx = OptContext {
        module,
        interner,
        reporter,
    };
    opt_unused_outputs(&mut fsm, &ctx);
    opt_alias_inputs(&mut fsm, &ctx);
    opt_feedback_inputs(&mut fsm, &ctx);
    opt_find_dont_care(&mut fsm, &ctx);
    opt_const_and_unused_inputs(&mut fsm, &ctx);

    module.cells[cell_id].kind = CellKind::Fsm(Box::new(fsm));
    Ok(())
}

struct OptContext<'a> {
    module: &'a Module,
    interner: &'a Interner,
    reporter: &'a Reporter,
}

impl OptContext<'_> {
    /// Human-readable name of a single signal bit, for report notes.
    fn bit_name(&self, bit: SigBit) -> String {
        match bit {
            SigBit::Const(value) => format!("1'b{value}"),
            SigBit::Wire { wire, offset } => {
                let w = &self.module.wires[wire];
                let name = self.interner.resolve(w.name);
                if w.width == 1 {
                    name.to_string()
                } else {
                    format!("{name} [{offset}]")
                }
            }
        }
    }

    /// True if the wire bit behind the signal carries an `unused_bits`
    /// attribute listing its offset.
    fn bit_is_unused(&self, bit: SigBit) -> bool {
        let SigBit::Wire { wire, offset } = bit else {
            return false;
        };
        let key = self.interner.get_or_intern("unused_bits");
        self.module.wires[wire].bit_is_unused(key, offset)
    }
}

/// Drops output columns whose driven wire bits are never read.
fn opt_unused_outputs(fsm: &mut FsmCell, ctx: &OptContext) {
    let mut i = 0;
    while i < fsm.ctrl_out.width() {
        let bit = fsm.ctrl_out.bit(i);
        if ctx.bit_is_unused(bit) {
            ctx.reporter
                .info(format!("removing unused output signal {}", ctx.bit_name(bit)));
            fsm.ctrl_out.remove(i);
            for tr in &mut fsm.data.transition_table {
                tr.ctrl_out.remove(i);
            }
            fsm.data.num_outputs -= 1;
        } else {
            i += 1;
        }
    }
}

/// Merges input columns driven by the same signal bit.
fn opt_alias_inputs(fsm: &mut FsmCell, ctx: &OptContext) {
    let mut i = 0;
    while i < fsm.ctrl_in.width() {
        let mut j = i + 1;
        while j < fsm.ctrl_in.width() {
            if fsm.ctrl_in.bit(i) != fsm.ctrl_in.bit(j) {
                j += 1;
                continue;
            }
            ctx.reporter.info(format!(
                "folding signal {} connected to inputs {i} and {j}",
                ctx.bit_name(fsm.ctrl_in.bit(i))
            ));

            let mut new_table = Vec::new();
            for tr in &fsm.data.transition_table {
                let mut tr = tr.clone();
                let mut si = tr.ctrl_in.get(i);
                let mut sj = tr.ctrl_in.get(j);
                // A don't-constrain bit adopts the other column's value;
                // two conflicting driven bits can never match together.
                if !si.is_defined() {
                    si = sj;
                } else if !sj.is_defined() {
                    sj = si;
                }
                if si == sj {
                    tr.ctrl_in.set(i, si);
                    tr.ctrl_in.remove(j);
                    new_table.push(tr);
                }
            }
            fsm.data.transition_table = new_table;
            fsm.ctrl_in.remove(j);
            fsm.data.num_inputs -= 1;
        }
        i += 1;
    }
}

/// Folds input columns that are fed directly from an output column.
fn opt_feedback_inputs(fsm: &mut FsmCell, ctx: &OptContext) {
    let mut j = 0;
    while j < fsm.ctrl_out.width() {
        let mut i = 0;
        while i < fsm.ctrl_in.width() {
            if fsm.ctrl_in.bit(i) != fsm.ctrl_out.bit(j) {
                i += 1;
                continue;
            }
            ctx.reporter.info(format!(
                "folding feedback signal {} connected to input {i} and output {j}",
                ctx.bit_name(fsm.ctrl_in.bit(i))
            ));

            let mut new_table = Vec::new();
            for tr in &fsm.data.transition_table {
                let mut tr = tr.clone();
                let si = tr.ctrl_in.get(i);
                let sj = tr.ctrl_out.get(j);
                // Keep a row iff its input pattern cannot contradict the
                // output it produces itself.
                if !si.is_defined() || si == sj {
                    tr.ctrl_in.remove(i);
                    new_table.push(tr);
                }
            }
            fsm.data.transition_table = new_table;
            fsm.ctrl_in.remove(i);
            fsm.data.num_inputs -= 1;
        }
        j += 1;
    }
}

/// One merge sweep over a single pattern column within a group.
fn merge_column(
    patterns: &BTreeSet<Const>,
    bit: u32,
    ctx: &OptContext,
    did_something: &mut bool,
) -> BTreeSet<Const> {
    let mut merged = BTreeSet::new();
    for pattern in patterns {
        if !pattern.get(bit).is_defined() {
            merged.insert(pattern.clone());
            continue;
        }
        let mut other = pattern.clone();
        other.set(
            bit,
            match pattern.get(bit) {
                Logic::One => Logic::Zero,
                _ => Logic::One,
            },
        );
        if patterns.contains(&other) {
            ctx.reporter
                .info(format!("merging patterns {pattern} and {other}"));
            other.set(bit, Logic::DontCare);
            merged.insert(other);
            *did_something = true;
            continue;
        }
        merged.insert(pattern.clone());
    }
    merged
}

/// Fuses pattern pairs differing in exactly one defined bit into a
/// single pattern with a don't-care at that bit, per
/// `(state_in, state_out, ctrl_out)` group, iterating columns LSB-first
/// to a fixpoint.
fn opt_find_dont_care(fsm: &mut FsmCell, ctx: &OptContext) {
    let mut groups: BTreeMap<(usize, usize, Const), BTreeSet<Const>> = BTreeMap::new();
    for tr in &fsm.data.transition_table {
        groups
            .entry((tr.state_in, tr.state_out, tr.ctrl_out.clone()))
            .or_default()
            .insert(tr.ctrl_in.clone());
    }

    fsm.data.transition_table.clear();
    for ((state_in, state_out, ctrl_out), mut patterns) in groups {
        let mut did_something = true;
        while did_something {
            did_something = false;
            for bit in 0..fsm.data.num_inputs {
                patterns = merge_column(&patterns, bit, ctx, &mut did_something);
            }
        }
        for ctrl_in in patterns {
            fsm.data.transition_table.push(Transition {
                state_in,
                state_out,
                ctrl_in,
                ctrl_out: ctrl_out.clone(),
            });
        }
    }
}

/// Deletes transitions contradicting constantly-driven inputs, then
/// drops input columns no surviving transition constrains.
fn opt_const_and_unused_inputs(fsm: &mut FsmCell, ctx: &OptContext) {
    let width = fsm.ctrl_in.width();
    let mut used = vec![false; width as usize];

    let mut new_table = Vec::new();
    'transitions: for tr in &fsm.data.transition_table {
        for i in 0..width {
            let pattern_bit = tr.ctrl_in.get(i);
            if let SigBit::Const(driven) = fsm.ctrl_in.bit(i) {
                if pattern_bit.is_defined() && pattern_bit != driven {
                    continue 'transitions;
                }
                continue;
            }
            if pattern_bit.is_defined() {
                used[i as usize] = true;
            }
        }
        new_table.push(tr.clone());
    }

    for i in (0..width).rev() {
        if !used[i as usize] {
            ctx.reporter.info(format!(
                "removing unused input signal {}",
                ctx.bit_name(fsm.ctrl_in.bit(i))
            ));
            for tr in &mut new_table {
                tr.ctrl_in.remove(i);
            }
            fsm.ctrl_in.remove(i);
            fsm.data.num_inputs -= 1;
        }
    }

    fsm.data.transition_table = new_table;
}
