//! Init-attribute extraction.
//!
//! Processes carry `Init` sync rules produced from `initial` blocks.
//! This pass folds each init action's right-hand side to a constant by
//! iterative substitution through the process's root case, writes the
//! constant to the driven wire's `init` attribute, and removes the init
//! rules. The SAT translator and downstream passes then read initial
//! values from the wire attributes alone.

#![warn(missing_docs)]

use volta_common::{Interner, Reporter};
use volta_ir::{AttrValue, CaseRule, Module, ProcessId, SigChunk, SigSpec, SyncKind};

/// Errors raised while folding init values.
///
/// Both variants are user-input errors carrying the offending signal's
/// name; the pass aborts on the first one.
#[derive(Debug, thiserror::Error)]
pub enum ProcInitError {
    /// The right-hand side of an init action did not reduce to a constant.
    #[error("failed to get a constant init value for `{signal}`")]
    NonConstant {
        /// The driven signal.
        signal: String,
    },
    /// An init action covers only part of a wire.
    #[error("init value does not cover the entire wire `{wire}`")]
    PartialInit {
        /// The partially initialised wire.
        wire: String,
    },
}

/// Folds a signal to its constant value under a case's actions,
/// substituting until a fixpoint is reached.
fn fold_to_const(sig: &mut SigSpec, case: &CaseRule) {
    assert!(
        case.compare.is_empty(),
        "init folding requires the unconditional root case"
    );
    loop {
        let mut next = sig.clone();
        for action in &case.actions {
            next.replace(&action.target, &action.value);
        }
        if next == *sig {
            return;
        }
        *sig = next;
    }
}

/// Runs init extraction over every process of a module.
pub fn proc_init(
    module: &mut Module,
    interner: &Interner,
    reporter: &Reporter,
) -> Result<(), ProcInitError> {
    let process_ids: Vec<ProcessId> = module.processes.ids().collect();
    for id in process_ids {
        proc_init_one(module, id, interner, reporter)?;
    }
    Ok(())
}

fn proc_init_one(
    module: &mut Module,
    id: ProcessId,
    interner: &Interner,
    reporter: &Reporter,
) -> Result<(), ProcInitError> {
    let proc = module.processes[id].clone();
    let mut found_init = false;

    for sync in &proc.syncs {
        if sync.kind != SyncKind::Init {
            continue;
        }
        found_init = true;
        reporter.info(format!(
            "found init rule in `{}.{}`",
            interner.resolve(module.name),
            interner.resolve(proc.name)
        ));

        for action in &sync.actions {
            let lhs = action.target.clone();
            let mut rhs = action.value.clone();
            fold_to_const(&mut rhs, &proc.root_case);

            if !rhs.is_fully_const() {
                return Err(ProcInitError::NonConstant {
                    signal: describe(module, interner, &lhs),
                });
            }
            let rhs = rhs.as_const().expect("checked fully const");

            let mut offset = 0;
            for chunk in lhs.chunks() {
                let SigChunk::Wire { wire, width, .. } = chunk else {
                    continue;
                };
                let value = rhs.extract(offset, width);
                let wire_width = module.wires[wire].width;
                if value.width() != wire_width {
                    return Err(ProcInitError::PartialInit {
                        wire: interner.resolve(module.wires[wire].name).to_string(),
                    });
                }
                reporter.info(format!(
                    "setting init value: {} = {value}",
                    interner.resolve(module.wires[wire].name)
                ));
                let key = interner.get_or_intern("init");
                module.wires[wire]
                    .attributes
                    .insert(key, AttrValue::Const(value));
                offset += wire_width;
            }
        }
    }

    if found_init {
        module.processes[id]
            .syncs
            .retain(|sync| sync.kind != SyncKind::Init);
    }
    Ok(())
}

/// Best-effort display of a signal for error messages.
fn describe(module: &Module, interner: &Interner, sig: &SigSpec) -> String {
    let mut parts = Vec::new();
    for chunk in sig.chunks() {
        match chunk {
            SigChunk::Const(c) => parts.push(format!("{}'{c}", c.width())),
            SigChunk::Wire { wire, offset, width } => {
                let name = interner.resolve(module.wires[wire].name);
                if width == module.wires[wire].width && offset == 0 {
                    parts.push(name.to_string());
                } else {
                    parts.push(format!("{name} [{}:{offset}]", offset + width - 1));
                }
            }
        }
    }
    parts.join(" ++ ")
}
