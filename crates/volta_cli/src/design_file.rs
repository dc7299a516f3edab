//! On-disk design file: symbol table plus netlist.

use serde::{Deserialize, Serialize};
use volta_common::Interner;
use volta_ir::Design;

/// A serialized design: the interner that owns every [`Ident`] in the
/// netlist, and the design itself.
///
/// [`Ident`]: volta_common::Ident
#[derive(Serialize, Deserialize)]
pub struct DesignFile {
    /// Symbol table for all interned names.
    pub interner: Interner,
    /// The design netlist.
    pub design: Design,
}

#[cfg(test)]
mod tests {
    use super::*;
    use volta_ir::{Module, ModuleId};

    #[test]
    fn roundtrip_preserves_names() {
        let interner = Interner::new();
        let mut module = Module::new(ModuleId::from_raw(0), interner.get_or_intern("core"));
        let wire = module.add_wire(interner.get_or_intern("state"), 3);
        let file = DesignFile {
            interner,
            design: Design::with_top(module),
        };
        let json = serde_json::to_string(&file).unwrap();
        let back: DesignFile = serde_json::from_str(&json).unwrap();
        let module = back.design.top_module();
        assert_eq!(back.interner.resolve(module.name), "core");
        assert_eq!(back.interner.resolve(module.wires[wire].name), "state");
        assert_eq!(module.wires[wire].width, 3);
    }
}
