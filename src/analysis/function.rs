//! Per-function static analysis.
//!
//! A [`Function`] owns a slice of decoded instructions plus the side
//! tables the analyzer fills in: branch labels, recovered `%hi`/`%lo`
//! address pairs, constants, and the vrams/constants the function
//! references. The analysis is a single forward pass that tracks which
//! registers currently hold a `LUI` upper half and pairs them with
//! matching low halves, peeking through branches into delay slots and
//! branch targets. It is deliberately heuristic: small upper halves are
//! treated as arithmetic rather than addresses, and the tracking
//! invalidation rules mirror compiler idioms rather than real dataflow.

use crate::analysis::context::{Context, ContextSymbol, SymbolType};
use crate::config::Config;
use crate::error::DasmError;
use crate::isa::decode::decode_instruction;
use crate::isa::registers::REG_RA;
use crate::isa::structs::{Instruction, Mnemonic};
use log::trace;
use std::collections::{BTreeMap, BTreeSet};

macro_rules! sign_extend16 {
    ($val: expr) => {{
        (($val as i16) as i64)
    }};
}

/// A function carved out of the instruction stream, plus everything the
/// analyzer learned about it.
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    /// Load address of the first instruction; None when the stream has no
    /// known vram (raw overlay blobs)
    pub vram: Option<u32>,
    /// File offset of the first instruction
    pub in_file_offset: u32,
    /// Added to emitted offset comments (split files)
    pub comment_offset: u32,
    /// Position of this function within its file, for `# N` comments
    pub index: Option<usize>,
    pub instructions: Vec<Instruction>,
    /// Labels local to this function, keyed by absolute file offset.
    /// Signed keys: a branch can target below the function start.
    pub local_labels: BTreeMap<i64, String>,
    /// Per-instruction resolved address, indexed by instruction
    pub pointers_per_instruction: Vec<Option<u32>>,
    /// Per-instruction recovered constant, indexed by instruction
    pub constants_per_instruction: Vec<Option<u32>>,
    /// Byte offsets of every branch in the function
    pub branch_instructions: Vec<u32>,
    /// Externally supplied file offsets to blank out with the pointers
    pub pointers_offsets: Vec<u32>,
    pub referenced_vrams: BTreeSet<u32>,
    pub referenced_constants: BTreeSet<u32>,
    pub has_unimplemented_instrs: bool,
    pub pointers_removed: bool,
    /// Suffix appended to symbols discovered past this function's vram,
    /// supplied by an owning segment for overlay disambiguation
    pub new_stuff_suffix: Option<String>,
}

impl Function {
    pub fn new(
        name: String,
        instructions: Vec<Instruction>,
        in_file_offset: u32,
        vram: Option<u32>,
    ) -> Function {
        let n_instr = instructions.len();
        return Function {
            name,
            vram,
            in_file_offset,
            comment_offset: 0,
            index: None,
            instructions,
            local_labels: BTreeMap::new(),
            pointers_per_instruction: vec![None; n_instr],
            constants_per_instruction: vec![None; n_instr],
            branch_instructions: Vec::new(),
            pointers_offsets: Vec::new(),
            referenced_vrams: BTreeSet::new(),
            referenced_constants: BTreeSet::new(),
            has_unimplemented_instrs: false,
            pointers_removed: false,
            new_stuff_suffix: None,
        };
    }

    /// Decode a function straight out of a big-endian byte buffer.
    pub fn from_be_bytes(
        name: String,
        bytes: &[u8],
        in_file_offset: u32,
        vram: Option<u32>,
    ) -> Result<Function, DasmError> {
        if bytes.len() % 4 != 0 {
            return Err(DasmError::UnalignedStream(bytes.len()));
        }
        if let Some(vram) = vram {
            if vram % 4 != 0 {
                return Err(DasmError::UnalignedVram(vram));
            }
        }
        let instructions = bytes
            .chunks_exact(4)
            .map(|b| {
                let word = ((b[0] as u32) << 24) | ((b[1] as u32) << 16) | ((b[2] as u32) << 8) | b[3] as u32;
                decode_instruction(word)
            })
            .collect();
        return Ok(Function::new(name, instructions, in_file_offset, vram));
    }

    pub fn n_instr(&self) -> usize {
        return self.instructions.len();
    }

    /// Record one recovered upper/lower address pair. Registers the vram,
    /// creates a `D_*` symbol when allowed, and annotates both halves.
    fn process_symbol(
        &mut self,
        lui_instr: Instruction,
        lui_offset: u32,
        lower_instr: Instruction,
        lower_offset: u32,
        ctx: &mut Context,
        cfg: &Config,
    ) -> u32 {
        let upper_half = (lui_instr.immediate() as u32) << 16;
        let address = (upper_half as i64 + sign_extend16!(lower_instr.immediate())) as u32;
        self.referenced_vrams.insert(address);

        if ctx.get_generic_symbol(address, false).is_none() && cfg.add_new_symbols {
            let mut sym = ContextSymbol::autogenerated(address, format!("D_{:08X}", address));
            if lower_instr.is_float() {
                sym.typ = Some(if lower_instr.is_double_float() {
                    SymbolType::F64
                } else {
                    SymbolType::F32
                });
            }
            if let (Some(suffix), Some(vram)) = (&self.new_stuff_suffix, self.vram) {
                if address >= vram {
                    let renamed = format!("{}_{}", sym.get_name(), suffix);
                    sym.set_name(renamed);
                    sym.is_autogenerated = true;
                }
            }
            trace!(target: "analysis", "new symbol {} from pair at 0x{:X}/0x{:X}", sym.get_name(), lui_offset, lower_offset);
            ctx.symbols.insert(address, sym);
        }

        let lower_idx = (lower_offset / 4) as usize;
        if self.pointers_per_instruction[lower_idx].is_none() {
            self.pointers_per_instruction[lower_idx] = Some(address);
        }
        let lui_idx = (lui_offset / 4) as usize;
        if self.pointers_per_instruction[lui_idx].is_none() {
            self.pointers_per_instruction[lui_idx] = Some(address);
        }

        return address;
    }

    /// The main analysis pass. Walks the instructions once, pairing `LUI`
    /// upper halves with matching low halves, labeling branch targets,
    /// and registering discovered symbols in the shared context.
    pub fn analyze(&mut self, ctx: &mut Context, cfg: &Config) {
        if !cfg.disassemble_unknown_instructions
            && self.instructions.iter().any(|i| !i.is_implemented())
        {
            // The whole function will be emitted as data; just surface
            // any symbols that are already known to land inside it.
            self.has_unimplemented_instrs = true;
            if let Some(vram) = self.vram {
                for i in 0..self.instructions.len() {
                    if let Some(sym) = ctx.get_symbol_mut(vram + 4 * i as u32) {
                        sym.is_defined = true;
                    }
                }
            }
            return;
        }

        // Registers currently holding a LUI upper half, by LUI index.
        // `tracked` honors branch-likely shadows; `tracked_all` does not
        // and only feeds the ORI constant rule.
        let mut tracked: [Option<usize>; 32] = [None; 32];
        let mut tracked_all: [Option<usize>; 32] = [None; 32];
        // Last fully resolved value written to each register
        let mut register_values: [Option<u32>; 32] = [None; 32];

        for i in 0..self.instructions.len() {
            let instr = self.instructions[i];
            let offset = 4 * i as u32;
            let mut is_lui = false;

            if instr.is_branch() {
                let branch = offset as i64 + sign_extend16!(instr.immediate()) * 4 + 4;
                if let Some(vram) = self.vram {
                    let target = (vram as i64 + branch) as u32;
                    self.referenced_vrams.insert(target);
                    let label = match ctx.get_generic_label(target) {
                        Some(known) => known,
                        None => format!(".L{:05X}", target),
                    };
                    self.local_labels
                        .insert(self.in_file_offset as i64 + branch, label.clone());
                    ctx.add_branch_label(target, &label);
                } else {
                    let target = (self.in_file_offset as i64 + branch) as u32;
                    let label = format!(".L{:05X}", target);
                    self.local_labels
                        .insert(self.in_file_offset as i64 + branch, label);
                }
                self.branch_instructions.push(offset);
            } else if instr.is_jtype() {
                let target = 0x8000_0000 | (instr.instr_index() << 2);
                if instr.mnemonic() == Mnemonic::J {
                    ctx.add_fake_function(target, format!("fakefunc_{:08X}", target));
                } else {
                    ctx.add_function(None, target, format!("func_{:08X}", target));
                }
                self.pointers_per_instruction[i] = Some(target);
            } else if instr.is_itype() {
                // symbol finder
                is_lui = instr.mnemonic() == Mnemonic::LUI;
                if is_lui {
                    // Small upper halves are usually arithmetic, not
                    // addresses; don't let them seed %hi/%lo pairs.
                    if instr.immediate() >= 0x4000 {
                        let last_instr = if i > 0 {
                            Some(self.instructions[i - 1])
                        } else {
                            None
                        };
                        match last_instr.filter(|last| last.is_branch()) {
                            Some(last) => {
                                // Look through the branch: its target may
                                // consume the register we just loaded.
                                let branch = offset as i64 + sign_extend16!(last.immediate()) * 4;
                                if branch > 0 {
                                    let mut target_idx = (branch / 4) as usize;
                                    if let Some(target) = self.instructions.get(target_idx) {
                                        if target.mnemonic() == Mnemonic::JR
                                            && target.rs() == REG_RA
                                        {
                                            // Function exit: the delay slot
                                            // is what actually runs.
                                            target_idx += 1;
                                        }
                                    }
                                    if let Some(&target) = self.instructions.get(target_idx) {
                                        if target.is_itype()
                                            && target.rs() == instr.rt()
                                            && !matches!(
                                                target.mnemonic(),
                                                Mnemonic::LUI
                                                    | Mnemonic::ANDI
                                                    | Mnemonic::ORI
                                                    | Mnemonic::XORI
                                                    | Mnemonic::CACHE
                                            )
                                        {
                                            self.process_symbol(
                                                instr,
                                                offset,
                                                target,
                                                branch as u32,
                                                ctx,
                                                cfg,
                                            );
                                        }
                                    }
                                    // A branch-likely annuls this delay
                                    // slot when not taken, and after an
                                    // unconditional B the LUI never runs
                                    // in straight-line order.
                                    if !(last.is_branch_likely()
                                        || last.mnemonic() == Mnemonic::B)
                                    {
                                        tracked[instr.rt() as usize] = Some(i);
                                    }
                                }
                            }
                            None => {
                                tracked[instr.rt() as usize] = Some(i);
                            }
                        }
                    }
                    tracked_all[instr.rt() as usize] = Some(i);
                } else if instr.mnemonic() == Mnemonic::ORI {
                    // Constants are built with OR, so the lower half is
                    // zero-extended here rather than sign-extended.
                    let rs = instr.rs() as usize;
                    if let Some(lui_idx) = tracked_all[rs] {
                        let lui_instr = self.instructions[lui_idx];
                        let constant =
                            ((lui_instr.immediate() as u32) << 16) | instr.immediate() as u32;
                        self.referenced_constants.insert(constant);
                        self.constants_per_instruction[i] = Some(constant);
                        self.constants_per_instruction[lui_idx] = Some(constant);
                        register_values[instr.rt() as usize] = Some(constant);
                    }
                } else if !matches!(
                    instr.mnemonic(),
                    Mnemonic::ANDI | Mnemonic::XORI | Mnemonic::CACHE
                ) {
                    let rs = instr.rs() as usize;
                    if let Some(lui_idx) = tracked[rs] {
                        let lui_instr = self.instructions[lui_idx];
                        let address = self.process_symbol(
                            lui_instr,
                            4 * lui_idx as u32,
                            instr,
                            offset,
                            ctx,
                            cfg,
                        );
                        register_values[instr.rt() as usize] = Some(address);
                    }
                }
            } else if instr.mnemonic() == Mnemonic::JR {
                // An indirect jump through a resolved address is how
                // switch statements dispatch through their jump table.
                if instr.rs() != REG_RA {
                    if let Some(address) = register_values[instr.rs() as usize] {
                        self.referenced_vrams.insert(address);
                        trace!(target: "analysis", "jump table jtbl_{:08X}", address);
                        ctx.add_jump_table(address, format!("jtbl_{:08X}", address));
                    }
                }
            }

            if !instr.is_float() {
                if !is_lui && instr.modifies_rt() {
                    let rt = instr.rt() as usize;
                    tracked[rt] = None;
                    tracked_all[rt] = None;
                }
                if instr.modifies_rd() {
                    let rd = instr.rd() as usize;
                    if instr.mnemonic() == Mnemonic::ADDU {
                        // Array indexing adds an index register into the
                        // tracked base; only a three-register ADDU kills
                        // the upper half.
                        if instr.rd() != instr.rs() && instr.rd() != instr.rt() {
                            tracked[rd] = None;
                            tracked_all[rd] = None;
                        }
                    } else {
                        tracked[rd] = None;
                        tracked_all[rd] = None;
                    }
                }
            } else if matches!(
                instr.mnemonic(),
                Mnemonic::MTC1 | Mnemonic::DMTC1 | Mnemonic::CTC1
            ) {
                // IDO uses a general register as scratch when feeding a
                // constant to the FPU and never reuses the value after.
                let rt = instr.rt() as usize;
                tracked[rt] = None;
                tracked_all[rt] = None;
            }

            // look-ahead symbol finder
            if i > 0 {
                let last_instr = self.instructions[i - 1];
                if last_instr.is_branch() {
                    let branch = offset as i64 + sign_extend16!(last_instr.immediate()) * 4;
                    if branch > 0 && ((branch / 4) as usize) < self.instructions.len() {
                        let target = self.instructions[(branch / 4) as usize];
                        if target.is_itype()
                            && !matches!(
                                target.mnemonic(),
                                Mnemonic::LUI
                                    | Mnemonic::ANDI
                                    | Mnemonic::ORI
                                    | Mnemonic::XORI
                                    | Mnemonic::CACHE
                            )
                        {
                            if let Some(lui_idx) = tracked[target.rs() as usize] {
                                let lui_instr = self.instructions[lui_idx];
                                self.process_symbol(
                                    lui_instr,
                                    4 * lui_idx as u32,
                                    target,
                                    branch as u32,
                                    ctx,
                                    cfg,
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    /// Drop trailing no-ops, keeping the canonical delay-slot NOP when
    /// the function ends in `jr $ra`.
    pub fn remove_trailing_nops(&mut self) -> bool {
        let n_instr = self.n_instr();
        let mut first_nop = n_instr;

        for i in (0..n_instr).rev() {
            let instr = self.instructions[i];
            if instr.mnemonic() != Mnemonic::NOP {
                if instr.mnemonic() == Mnemonic::JR && instr.rs() == REG_RA {
                    first_nop += 1;
                }
                break;
            }
            first_nop = i;
        }

        if first_nop < n_instr {
            self.instructions.truncate(first_nop);
            self.pointers_per_instruction.truncate(first_nop);
            self.constants_per_instruction.truncate(first_nop);
            return true;
        }
        return false;
    }

    /// Blank out every instruction that carries a resolved pointer (and
    /// every branch, under `ignore_branches`), for diff-stable output.
    pub fn remove_pointers(&mut self, cfg: &Config) -> bool {
        if !cfg.remove_pointers {
            return false;
        }

        let mut was_updated = false;
        for i in 0..self.pointers_per_instruction.len() {
            if self.pointers_per_instruction[i].is_some() {
                self.instructions[i].blank_out();
                was_updated = true;
            }
        }

        for k in 0..self.pointers_offsets.len() {
            let index = (self.pointers_offsets[k] as i64 - self.in_file_offset as i64) / 4;
            if index < 0 || index as usize >= self.instructions.len() {
                continue;
            }
            self.instructions[index as usize].blank_out();
        }

        if cfg.ignore_branches {
            for k in 0..self.branch_instructions.len() {
                let index = (self.branch_instructions[k] / 4) as usize;
                self.instructions[index].blank_out();
            }
            was_updated = was_updated || !self.branch_instructions.is_empty();
        }

        self.pointers_removed = true;
        return was_updated;
    }

    /// Pairwise blank-out of instructions whose opcodes match but whose
    /// arguments differ, applied to both functions.
    pub fn blank_out_differences(&mut self, other: &mut Function, cfg: &Config) -> bool {
        if !cfg.remove_pointers {
            return false;
        }

        let mut was_updated = false;
        let len = self.n_instr().min(other.n_instr());
        for i in 0..len {
            if self.instructions[i].same_opcode_but_different_arguments(&other.instructions[i]) {
                self.instructions[i].blank_out();
                other.instructions[i].blank_out();
                was_updated = true;
            }
        }
        return was_updated;
    }

    pub fn count_diff_opcodes(&self, other: &Function) -> usize {
        let len = self.n_instr().min(other.n_instr());
        let mut result = 0;
        for i in 0..len {
            if !self.instructions[i].same_opcode(&other.instructions[i]) {
                result += 1;
            }
        }
        return result;
    }

    pub fn count_same_opcode_but_different_arguments(&self, other: &Function) -> usize {
        let len = self.n_instr().min(other.n_instr());
        let mut result = 0;
        for i in 0..len {
            if self.instructions[i].same_opcode_but_different_arguments(&other.instructions[i]) {
                result += 1;
            }
        }
        return result;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn make_function(words: &[u32], vram: Option<u32>) -> Function {
        let instructions = words.iter().map(|&w| decode_instruction(w)).collect();
        return Function::new(String::from("test"), instructions, 0, vram);
    }

    #[test]
    fn pairs_lui_with_addiu() {
        // lui $at, 0x8010; addiu $at, $at, 0x10
        let mut func = make_function(&[0x3C01_8010, 0x2421_0010], Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[0], Some(0x8010_0010));
        assert_eq!(func.pointers_per_instruction[1], Some(0x8010_0010));
        assert!(func.referenced_vrams.contains(&0x8010_0010));
        assert_eq!(
            ctx.get_generic_symbol(0x8010_0010, false).as_deref(),
            Some("D_80100010")
        );
    }

    #[test]
    fn small_upper_half_is_not_a_pointer() {
        // lui $at, 0x0001; addiu $at, $at, 0x10
        let mut func = make_function(&[0x3C01_0001, 0x2421_0010], Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction, vec![None, None]);
        assert!(ctx.symbols.is_empty());
    }

    #[test]
    fn pairs_lui_with_lw_through_unconditional_branch() {
        // lui $t0, 0x8000; b +2; nop; nop; lw $t0, 0x20($t0)
        let words = [0x3C08_8000, 0x1000_0002, 0x0000_0000, 0x0000_0000, 0x8D08_0020];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[0], Some(0x8000_0020));
        assert_eq!(func.pointers_per_instruction[4], Some(0x8000_0020));
        assert!(func.referenced_vrams.contains(&0x8000_0020));
    }

    #[test]
    fn unconditional_branch_suppresses_tracking() {
        // b +1; lui $t0, 0x8000; nop; addiu $t0, $t0, 0x10
        // The LUI sits in the delay slot of an unconditional branch, so a
        // later low half must not pair with it.
        let words = [0x1000_0001, 0x3C08_8000, 0x0000_0000, 0x2508_0010];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[3], None);
    }

    #[test]
    fn ori_builds_zero_extended_constant() {
        // lui $at, 0x3F80; ori $at, $at, 0x0
        let mut func = make_function(&[0x3C01_3F80, 0x3421_0000], Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.constants_per_instruction[0], Some(0x3F80_0000));
        assert_eq!(func.constants_per_instruction[1], Some(0x3F80_0000));
        assert!(func.referenced_constants.contains(&0x3F80_0000));
    }

    #[test]
    fn ori_lower_half_is_or_combined_not_added() {
        // lui $at, 0x8000; ori $at, $at, 0x8000
        // Pins the zero-extension: the result is an OR, not a signed add.
        let mut func = make_function(&[0x3C01_8000, 0x3421_8000], Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.constants_per_instruction[1], Some(0x8000_8000));
    }

    #[test]
    fn negative_lower_half_is_sign_extended() {
        // lui $t0, 0x8001; lw $t0, -0x10($t0)
        let mut func = make_function(&[0x3C08_8001, 0x8D08_FFF0], Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[1], Some(0x8000_FFF0));
    }

    #[test]
    fn registers_jump_table_at_indirect_jr() {
        // lui $t0, 0x8001; addiu $t0, $t0, 0x0; jr $t0; nop
        let words = [0x3C08_8001, 0x2508_0000, 0x0100_0008, 0x0000_0000];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert!(func.referenced_vrams.contains(&0x8001_0000));
        assert_eq!(
            ctx.jump_tables.get(&0x8001_0000).map(|s| s.as_str()),
            Some("jtbl_80010000")
        );
    }

    #[test]
    fn jr_ra_does_not_register_a_jump_table() {
        let words = [0x3C08_8001, 0x2508_0000, 0x03E0_0008, 0x0000_0000];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert!(ctx.jump_tables.is_empty());
    }

    #[test]
    fn branch_gets_local_label_and_context_entry() {
        // beqz $a0, +2; nop; jr $ra; nop
        let words = [0x1080_0002, 0x0000_0000, 0x03E0_0008, 0x0000_0000];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.branch_instructions, vec![0]);
        assert!(func.referenced_vrams.contains(&0x8000_000C));
        assert_eq!(
            func.local_labels.get(&0xC).map(|s| s.as_str()),
            Some(".L8000000C")
        );
        assert!(ctx.branch_labels.contains_key(&0x8000_000C));
    }

    #[test]
    fn branch_likely_suppresses_tracking() {
        // beql $a0, $a1, +3; lui $t0, 0x8001; nop; addiu $t0, $t0, 0x10
        let words = [0x5085_0003, 0x3C08_8001, 0x0000_0000, 0x2508_0010];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[3], None);
    }

    #[test]
    fn jal_registers_function_and_j_registers_fake() {
        // jal 0x80002000; nop; j 0x80003000; nop
        let words = [0x0C00_0800, 0x0000_0000, 0x0800_0C00, 0x0000_0000];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(
            ctx.get_function(0x8000_2000).unwrap().get_name(),
            "func_80002000"
        );
        assert_eq!(
            ctx.fake_functions.get(&0x8000_3000).map(|s| s.as_str()),
            Some("fakefunc_80003000")
        );
        assert_eq!(func.pointers_per_instruction[0], Some(0x8000_2000));
        assert_eq!(func.pointers_per_instruction[2], Some(0x8000_3000));
    }

    #[test]
    fn addu_with_distinct_dest_invalidates_tracking() {
        // lui $t0, 0x8001; addu $t1, $t0, $v0 -> $t1 evicted, $t0 kept
        // lui $t2, 0x8002; addu $t2, $t2, $v0 -> $t2 kept (two-register form)
        let words = [
            0x3C08_8001, // lui $t0, 0x8001
            0x0102_4821, // addu $t1, $t0, $v0
            0x2508_0010, // addiu $t0, $t0, 0x10   (still pairs)
            0x3C0A_8002, // lui $t2, 0x8002
            0x0142_5021, // addu $t2, $t2, $v0
            0x254A_0020, // addiu $t2, $t2, 0x20   (still pairs, carve-out)
        ];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[2], Some(0x8001_0010));
        assert_eq!(func.pointers_per_instruction[5], Some(0x8002_0020));
    }

    #[test]
    fn write_to_tracked_register_evicts_it() {
        // lui $t0, 0x8001; li $t0, 5 (addiu from zero); addiu $t0, $t0, 0x10
        let words = [0x3C08_8001, 0x2408_0005, 0x2508_0010];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        // the li overwrote $t0, so the later low half has nothing to pair with
        assert_eq!(func.pointers_per_instruction[1], None);
        assert_eq!(func.pointers_per_instruction[2], None);
    }

    #[test]
    fn mtc1_evicts_scratch_register() {
        // lui $t0, 0x4080; mtc1 $t0, $f4; addiu $t0, $t0, 0x10
        let words = [0x3C08_4080, 0x4488_2000, 0x2508_0010];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        assert_eq!(func.pointers_per_instruction[2], None);
    }

    #[test]
    fn float_load_types_new_symbol() {
        // lui $at, 0x8010; lwc1 $f4, 0x40($at)
        let mut func = make_function(&[0x3C01_8010, 0xC424_0040], Some(0x8000_0000));
        let mut ctx = Context::new();
        func.analyze(&mut ctx, &Config::default());

        let sym = &ctx.symbols[&0x8010_0040];
        assert_eq!(sym.typ, Some(SymbolType::F32));

        // ldc1 instead gives f64
        let mut func = make_function(&[0x3C01_8011, 0xD424_0040], Some(0x8000_0000));
        func.analyze(&mut ctx, &Config::default());
        assert_eq!(ctx.symbols[&0x8011_0040].typ, Some(SymbolType::F64));
    }

    #[test]
    fn unimplemented_instruction_downgrades_function() {
        let words = [0x3C01_8010, 0x4C00_0123]; // lui; COP3 garbage
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        ctx.symbols.insert(
            0x8000_0004,
            ContextSymbol::autogenerated(0x8000_0004, String::from("D_80000004")),
        );
        func.analyze(&mut ctx, &Config::default());

        assert!(func.has_unimplemented_instrs);
        assert_eq!(func.pointers_per_instruction, vec![None, None]);
        assert!(ctx.symbols[&0x8000_0004].is_defined);
    }

    #[test]
    fn removes_trailing_nops_keeping_delay_slot() {
        // addiu; jr $ra; nop; nop; nop
        let words = [0x2408_0005, 0x03E0_0008, 0, 0, 0];
        let mut func = make_function(&words, Some(0x8000_0000));
        assert!(func.remove_trailing_nops());
        assert_eq!(func.n_instr(), 3);
        assert_eq!(func.instructions[1].mnemonic(), Mnemonic::JR);
        assert_eq!(func.instructions[2].mnemonic(), Mnemonic::NOP);
    }

    #[test]
    fn remove_trailing_nops_without_jr_drops_all() {
        let words = [0x2408_0005, 0, 0];
        let mut func = make_function(&words, Some(0x8000_0000));
        assert!(func.remove_trailing_nops());
        assert_eq!(func.n_instr(), 1);
    }

    #[test]
    fn remove_pointers_blanks_annotated_instructions() {
        let words = [0x3C01_8010, 0x2421_0010, 0x03E0_0008, 0x0000_0000];
        let mut func = make_function(&words, Some(0x8000_0000));
        let mut ctx = Context::new();
        let mut cfg = Config::default();
        func.analyze(&mut ctx, &cfg);

        cfg.remove_pointers = true;
        assert!(func.remove_pointers(&cfg));
        assert!(func.pointers_removed);
        assert_eq!(func.instructions[0].immediate(), 0);
        assert_eq!(func.instructions[1].immediate(), 0);
        assert_eq!(func.instructions[0].mnemonic(), Mnemonic::LUI);
    }

    #[test]
    fn blank_out_differences_hits_both_sides() {
        let mut a = make_function(&[0x2408_0005, 0x0000_0000], None);
        let mut b = make_function(&[0x2408_0009, 0x0000_0000], None);
        let mut cfg = Config::default();
        cfg.remove_pointers = true;

        assert_eq!(a.count_same_opcode_but_different_arguments(&b), 1);
        assert!(a.blank_out_differences(&mut b, &cfg));
        assert_eq!(a.instructions[0].raw(), b.instructions[0].raw());
        assert_eq!(a.count_diff_opcodes(&b), 0);
    }

    #[test]
    fn from_be_bytes_rejects_ragged_input() {
        let err = Function::from_be_bytes(String::from("f"), &[0, 0, 0], 0, None);
        assert!(err.is_err());
        let func =
            Function::from_be_bytes(String::from("f"), &[0x3C, 0x01, 0x80, 0x10], 0, None).unwrap();
        assert_eq!(func.instructions[0].mnemonic(), Mnemonic::LUI);
        assert_eq!(func.instructions[0].raw(), 0x3C01_8010);
    }
}
