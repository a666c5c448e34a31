//! Shared symbol registry.
//!
//! One [`Context`] is shared by every function carved out of the same
//! binary. The analyzer is its single writer for the duration of one
//! `analyze` call (an exclusive borrow); emission only reads, except for
//! marking symbols defined during data fallback. All growth is monotonic:
//! entries are added or updated in place, never removed.

use std::collections::BTreeMap;

/// Data type tag attached to a discovered symbol.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum SymbolType {
    F32,
    F64,
    Byte,
    Short,
    Word,
    Pointer,
}

/// Section a symbol or relocation entry belongs to.
#[derive(Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Debug)]
pub enum FileSection {
    Text,
    Data,
    Rodata,
    Bss,
    Reloc,
}

/// A symbol known to the context, identified by its vram address.
#[derive(Clone, Debug)]
pub struct ContextSymbol {
    pub vram: u32,
    name: String,
    /// Optional late-name hook; wins over `name` when present
    name_get_cb: Option<fn(u32) -> String>,
    pub typ: Option<SymbolType>,
    pub section: Option<FileSection>,
    pub is_defined: bool,
    pub vrom: Option<u32>,
    pub size: Option<u32>,
    pub is_autogenerated: bool,
}

impl ContextSymbol {
    pub fn new(vram: u32, name: String) -> ContextSymbol {
        return ContextSymbol {
            vram,
            name,
            name_get_cb: None,
            typ: None,
            section: None,
            is_defined: false,
            vrom: None,
            size: None,
            is_autogenerated: false,
        };
    }

    pub fn autogenerated(vram: u32, name: String) -> ContextSymbol {
        let mut sym = ContextSymbol::new(vram, name);
        sym.is_autogenerated = true;
        return sym;
    }

    pub fn get_name(&self) -> String {
        if let Some(cb) = self.name_get_cb {
            return cb(self.vram);
        }
        return self.name.clone();
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
        self.is_autogenerated = false;
    }

    pub fn set_name_get_callback(&mut self, cb: fn(u32) -> String) {
        self.name_get_cb = Some(cb);
    }

    /// Whether `addr` falls inside this symbol's declared extent.
    fn covers(&self, addr: u32) -> bool {
        match self.size {
            Some(size) => self.vram <= addr && addr < self.vram.wrapping_add(size),
            None => self.vram == addr,
        }
    }
}

/// A pre-populated ELF relocation entry, looked up by file offset.
#[derive(Clone, Debug)]
pub struct RelocSymbol {
    pub name: String,
    pub addend: Option<i32>,
}

impl RelocSymbol {
    pub fn new(name: String) -> RelocSymbol {
        return RelocSymbol { name, addend: None };
    }

    pub fn get_name_plus_offset(&self) -> String {
        match self.addend {
            Some(addend) if addend > 0 => format!("{} + 0x{:X}", self.name, addend),
            Some(addend) if addend < 0 => format!("{} - 0x{:X}", self.name, -addend),
            _ => self.name.clone(),
        }
    }
}

/// The registry itself. Fields are public in the same spirit as the rest
/// of the crate; the upsert helpers below are the intended write path.
#[derive(Default, Debug)]
pub struct Context {
    /// Data symbols discovered or pre-seeded, keyed by vram
    pub symbols: BTreeMap<u32, ContextSymbol>,
    /// Real functions (`func_*` or user-named), keyed by vram
    pub functions: BTreeMap<u32, ContextSymbol>,
    /// Branch targets inside functions, keyed by vram
    pub branch_labels: BTreeMap<u32, String>,
    /// Jump table base addresses, keyed by vram
    pub jump_tables: BTreeMap<u32, String>,
    /// Case targets found inside jump tables, keyed by vram
    pub jump_table_labels: BTreeMap<u32, String>,
    /// `J` targets believed to be tail calls rather than real functions
    pub fake_functions: BTreeMap<u32, String>,
    /// Named constants keyed by their 32-bit value
    pub constants: BTreeMap<u32, String>,
    /// Per-section relocation entries keyed by file offset
    pub reloc_symbols: BTreeMap<FileSection, BTreeMap<u32, RelocSymbol>>,
}

impl Context {
    pub fn new() -> Context {
        return Context::default();
    }

    /// Name of any symbol-like entry at `addr`: jump tables first (so a
    /// table upgraded from a plain `D_*` keeps its `jtbl_*` spelling in
    /// `%lo` pairs), then functions, then data symbols. With
    /// `try_plus_offset`, also accept the closest lower data symbol whose
    /// declared size covers `addr`.
    pub fn get_generic_symbol(&self, addr: u32, try_plus_offset: bool) -> Option<String> {
        if let Some(name) = self.jump_tables.get(&addr) {
            return Some(name.clone());
        }
        if let Some(sym) = self.functions.get(&addr) {
            return Some(sym.get_name());
        }
        if let Some(sym) = self.symbols.get(&addr) {
            return Some(sym.get_name());
        }
        if try_plus_offset {
            if let Some((_, sym)) = self.symbols.range(..=addr).next_back() {
                if sym.covers(addr) {
                    let offset = addr - sym.vram;
                    return Some(format!("{} + 0x{:X}", sym.get_name(), offset));
                }
            }
        }
        return None;
    }

    /// Label-like name at `addr`: branch labels, jump-table case targets,
    /// and function entries all qualify.
    pub fn get_generic_label(&self, addr: u32) -> Option<String> {
        if let Some(label) = self.branch_labels.get(&addr) {
            return Some(label.clone());
        }
        if let Some(label) = self.jump_table_labels.get(&addr) {
            return Some(label.clone());
        }
        if let Some(sym) = self.functions.get(&addr) {
            return Some(sym.get_name());
        }
        return None;
    }

    pub fn get_function(&self, addr: u32) -> Option<&ContextSymbol> {
        return self.functions.get(&addr);
    }

    /// Exact-match data symbol lookup, mutable (used to flag symbols as
    /// defined during data emission).
    pub fn get_symbol_mut(&mut self, addr: u32) -> Option<&mut ContextSymbol> {
        return self.symbols.get_mut(&addr);
    }

    /// Upsert a function. An existing entry with a user-provided name
    /// always keeps it; an autogenerated entry is renamed when a real
    /// name arrives.
    pub fn add_function(&mut self, name: Option<String>, vram: u32, fallback: String) {
        if let Some(existing) = self.functions.get_mut(&vram) {
            if !existing.is_autogenerated {
                return;
            }
            if let Some(name) = name {
                existing.set_name(name);
            }
            return;
        }
        let sym = match name {
            Some(name) => ContextSymbol::new(vram, name),
            None => ContextSymbol::autogenerated(vram, fallback),
        };
        self.functions.insert(vram, sym);
    }

    pub fn add_fake_function(&mut self, vram: u32, name: String) {
        self.fake_functions.entry(vram).or_insert(name);
    }

    pub fn add_branch_label(&mut self, vram: u32, label: &str) {
        self.branch_labels
            .entry(vram)
            .or_insert_with(|| label.to_string());
    }

    pub fn add_jump_table(&mut self, vram: u32, name: String) {
        self.jump_tables.entry(vram).or_insert(name);
    }

    pub fn add_jump_table_label(&mut self, vram: u32, name: String) {
        self.jump_table_labels.entry(vram).or_insert(name);
    }

    pub fn add_constant(&mut self, value: u32, name: String) {
        self.constants.entry(value).or_insert(name);
    }

    pub fn get_constant(&self, value: u32) -> Option<&str> {
        return self.constants.get(&value).map(|s| s.as_str());
    }

    pub fn add_reloc_symbol(&mut self, file_offset: u32, section: FileSection, sym: RelocSymbol) {
        self.reloc_symbols
            .entry(section)
            .or_insert_with(BTreeMap::new)
            .insert(file_offset, sym);
    }

    pub fn get_reloc_symbol(&self, file_offset: u32, section: FileSection) -> Option<&RelocSymbol> {
        return self
            .reloc_symbols
            .get(&section)
            .and_then(|m| m.get(&file_offset));
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn existing_function_name_wins() {
        let mut ctx = Context::new();
        ctx.add_function(Some(String::from("osInitialize")), 0x8000_0400, String::new());
        ctx.add_function(None, 0x8000_0400, String::from("func_80000400"));
        assert_eq!(
            ctx.get_function(0x8000_0400).unwrap().get_name(),
            "osInitialize"
        );
    }

    #[test]
    fn autogenerated_function_gets_renamed() {
        let mut ctx = Context::new();
        ctx.add_function(None, 0x8000_0400, String::from("func_80000400"));
        ctx.add_function(Some(String::from("osInitialize")), 0x8000_0400, String::new());
        assert_eq!(
            ctx.get_function(0x8000_0400).unwrap().get_name(),
            "osInitialize"
        );
    }

    #[test]
    fn plus_offset_lookup_respects_size() {
        let mut ctx = Context::new();
        let mut sym = ContextSymbol::new(0x8000_1000, String::from("gStateTable"));
        sym.size = Some(0x20);
        ctx.symbols.insert(0x8000_1000, sym);

        assert_eq!(
            ctx.get_generic_symbol(0x8000_1010, true).as_deref(),
            Some("gStateTable + 0x10")
        );
        assert_eq!(ctx.get_generic_symbol(0x8000_1020, true), None);
        assert_eq!(ctx.get_generic_symbol(0x8000_1010, false), None);
    }

    #[test]
    fn jump_table_name_shadows_data_symbol() {
        let mut ctx = Context::new();
        ctx.symbols.insert(
            0x8001_0000,
            ContextSymbol::autogenerated(0x8001_0000, String::from("D_80010000")),
        );
        ctx.add_jump_table(0x8001_0000, String::from("jtbl_80010000"));
        assert_eq!(
            ctx.get_generic_symbol(0x8001_0000, false).as_deref(),
            Some("jtbl_80010000")
        );
    }

    #[test]
    fn name_callback_overrides_stored_name() {
        let mut sym = ContextSymbol::new(0x8000_2000, String::from("func_80002000"));
        sym.set_name_get_callback(|vram| format!("ovl1_{:08X}", vram));
        assert_eq!(sym.get_name(), "ovl1_80002000");
    }

    #[test]
    fn reloc_lookup_is_per_section() {
        let mut ctx = Context::new();
        ctx.add_reloc_symbol(0x40, FileSection::Data, RelocSymbol::new(String::from("gSaveContext")));
        assert!(ctx.get_reloc_symbol(0x40, FileSection::Data).is_some());
        assert!(ctx.get_reloc_symbol(0x40, FileSection::Rodata).is_none());
    }
}
