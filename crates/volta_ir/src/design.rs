//! Top-level design container.

use crate::arena::Arena;
use crate::ids::ModuleId;
use crate::module::Module;
use serde::{Deserialize, Serialize};

/// A complete design: all modules plus the top module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Design {
    /// All modules, keyed by [`ModuleId`].
    pub modules: Arena<ModuleId, Module>,
    /// The top-level module.
    pub top: ModuleId,
}

impl Design {
    /// Creates a design containing a single module as top.
    pub fn with_top(module: Module) -> Self {
        let mut modules = Arena::new();
        let top = modules.alloc(module);
        Self { modules, top }
    }

    /// Returns a reference to the top-level module.
    pub fn top_module(&self) -> &Module {
        &self.modules[self.top]
    }
}
