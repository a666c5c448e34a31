//! Text emission.
//!
//! Stateless renderers from decoded instructions (plus the analyzer's
//! side tables and the shared context) to GAS-compatible MIPS assembly.
//! The per-instruction renderer knows nothing about symbols; whatever the
//! caller resolved arrives as an optional immediate override string like
//! `%hi(D_80100010)` or `.L80000010`.

use crate::analysis::context::Context;
use crate::analysis::function::Function;
use crate::config::Config;
use crate::isa::registers::{cop0_name, fpr_name, gpr_name, rsp_vector_name, REG_RA};
use crate::isa::structs::{Instruction, Mnemonic};

fn format_opcode(mnemonic: Mnemonic, squeeze: bool, cfg: &Config) -> String {
    let width = if squeeze {
        cfg.opcode_ljust.saturating_sub(1)
    } else {
        cfg.opcode_ljust
    };
    return format!("{:<1$}", mnemonic.name(), width);
}

/// Signed immediates print with an explicit sign, the way assemblers
/// expect load/store displacements.
fn imm_hex(imm: u16) -> String {
    let value = imm as i16 as i32;
    if value < 0 {
        return format!("-0x{:X}", -value);
    }
    return format!("0x{:X}", value);
}

fn imm_hex_unsigned(imm: u16) -> String {
    return format!("0x{:X}", imm);
}

/// Render one instruction as `opcode operands`, with the opcode column
/// left-justified. `squeeze` narrows the column by the single space a
/// delay-slot indent adds, keeping lines aligned.
pub fn disassemble_instruction(
    instr: &Instruction,
    imm_override: Option<&str>,
    squeeze: bool,
    cfg: &Config,
) -> String {
    use Mnemonic::*;
    let mnemonic = instr.mnemonic();

    if !instr.is_implemented() {
        return format!("{:<1$} 0x{2:08X}", ".word", cfg.opcode_ljust, instr.raw());
    }

    let opcode = format_opcode(mnemonic, squeeze, cfg);
    let imm = |default: String| match imm_override {
        Some(over) => over.to_string(),
        None => default,
    };

    match mnemonic {
        NOP | SYSCALL | BREAK | SYNC | TLBR | TLBWI | TLBWR | TLBP | ERET | VNOP => {
            return mnemonic.name();
        }

        //#region branches
        B | BC0F | BC0T | BC0FL | BC0TL | BC1F | BC1T | BC1FL | BC1TL | BC2F | BC2T | BC2FL
        | BC2TL => {
            return format!("{} {}", opcode, imm(imm_hex(instr.immediate())));
        }
        BEQZ | BNEZ | BLEZ | BGTZ | BLEZL | BGTZL | BLTZ | BGEZ | BLTZL | BGEZL | BLTZAL
        | BGEZAL | BLTZALL | BGEZALL => {
            return format!(
                "{} {}, {}",
                opcode,
                gpr_name(instr.rs()),
                imm(imm_hex(instr.immediate()))
            );
        }
        BEQ | BNE | BEQL | BNEL => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                gpr_name(instr.rs()),
                gpr_name(instr.rt()),
                imm(imm_hex(instr.immediate()))
            );
        }
        //#endregion

        //#region jumps
        J | JAL => {
            let target = 0x8000_0000u32 | (instr.instr_index() << 2);
            return format!("{} {}", opcode, imm(format!("0x{:08X}", target)));
        }
        JR => {
            return format!("{} {}", opcode, gpr_name(instr.rs()));
        }
        JALR => {
            if instr.rd() == REG_RA {
                return format!("{} {}", opcode, gpr_name(instr.rs()));
            }
            return format!(
                "{} {}, {}",
                opcode,
                gpr_name(instr.rd()),
                gpr_name(instr.rs())
            );
        }
        //#endregion

        //#region loads and stores
        LB | LBU | LH | LHU | LW | LWU | LWL | LWR | LDL | LDR | LL | LLD | LD | SB | SH | SW
        | SWL | SWR | SDL | SDR | SC | SCD | SD => {
            return format!(
                "{} {}, {}({})",
                opcode,
                gpr_name(instr.rt()),
                imm(imm_hex(instr.immediate())),
                gpr_name(instr.rs())
            );
        }
        LWC1 | SWC1 | LDC1 | SDC1 => {
            return format!(
                "{} {}, {}({})",
                opcode,
                fpr_name(instr.ft()),
                imm(imm_hex(instr.immediate())),
                gpr_name(instr.rs())
            );
        }
        LWC2 | SWC2 | LDC2 | SDC2 => {
            return format!(
                "{} {}, {}({})",
                opcode,
                rsp_vector_name(instr.rt()),
                imm(imm_hex(instr.immediate())),
                gpr_name(instr.rs())
            );
        }
        CACHE | PREF => {
            return format!(
                "{} 0x{:X}, {}({})",
                opcode,
                instr.rt(),
                imm(imm_hex(instr.immediate())),
                gpr_name(instr.rs())
            );
        }
        //#endregion

        //#region immediate ALU
        ANDI | ORI | XORI => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                gpr_name(instr.rt()),
                gpr_name(instr.rs()),
                imm(imm_hex_unsigned(instr.immediate()))
            );
        }
        ADDI | ADDIU | SLTI | SLTIU | DADDI | DADDIU => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                gpr_name(instr.rt()),
                gpr_name(instr.rs()),
                imm(imm_hex(instr.immediate()))
            );
        }
        LUI => {
            return format!(
                "{} {}, {}",
                opcode,
                gpr_name(instr.rt()),
                imm(imm_hex_unsigned(instr.immediate()))
            );
        }
        //#endregion

        //#region SPECIAL register ops
        SLL | SRL | SRA | DSLL | DSRL | DSRA | DSLL32 | DSRL32 | DSRA32 => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                gpr_name(instr.rd()),
                gpr_name(instr.rt()),
                instr.sa()
            );
        }
        SLLV | SRLV | SRAV | DSLLV | DSRLV | DSRAV => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                gpr_name(instr.rd()),
                gpr_name(instr.rt()),
                gpr_name(instr.rs())
            );
        }
        ADD | ADDU | SUB | SUBU | AND | OR | XOR | NOR | SLT | SLTU | DADD | DADDU | DSUB
        | DSUBU => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                gpr_name(instr.rd()),
                gpr_name(instr.rs()),
                gpr_name(instr.rt())
            );
        }
        MULT | MULTU | DIV | DIVU | DMULT | DMULTU | DDIV | DDIVU | TGE | TGEU | TLT | TLTU
        | TEQ | TNE => {
            return format!(
                "{} {}, {}",
                opcode,
                gpr_name(instr.rs()),
                gpr_name(instr.rt())
            );
        }
        TGEI | TGEIU | TLTI | TLTIU | TEQI | TNEI => {
            return format!(
                "{} {}, {}",
                opcode,
                gpr_name(instr.rs()),
                imm(imm_hex(instr.immediate()))
            );
        }
        MFHI | MFLO => {
            return format!("{} {}", opcode, gpr_name(instr.rd()));
        }
        MTHI | MTLO => {
            return format!("{} {}", opcode, gpr_name(instr.rs()));
        }
        //#endregion

        //#region coprocessor moves
        MFC0 | DMFC0 | CFC0 | MTC0 | DMTC0 | CTC0 => {
            let result = format!("{} {},", opcode, gpr_name(instr.rt()));
            return format!("{:<14} {}", result, cop0_name(instr.rd()));
        }
        MFC1 | DMFC1 | CFC1 | MTC1 | DMTC1 | CTC1 => {
            return format!(
                "{} {}, {}",
                opcode,
                gpr_name(instr.rt()),
                fpr_name(instr.fs())
            );
        }
        MFC2 | MTC2 => {
            return format!(
                "{} {}, {}[{}]",
                opcode,
                gpr_name(instr.rt()),
                rsp_vector_name(instr.rd()),
                instr.move_element()
            );
        }
        CFC2 | CTC2 => {
            return format!("{} {}, ${}", opcode, gpr_name(instr.rt()), instr.rd());
        }
        //#endregion

        //#region COP1 arithmetic
        ADD_S | SUB_S | MUL_S | DIV_S | ADD_D | SUB_D | MUL_D | DIV_D => {
            return format!(
                "{} {}, {}, {}",
                opcode,
                fpr_name(instr.fd()),
                fpr_name(instr.fs()),
                fpr_name(instr.ft())
            );
        }
        C_F_S | C_UN_S | C_EQ_S | C_UEQ_S | C_OLT_S | C_ULT_S | C_OLE_S | C_ULE_S | C_SF_S
        | C_NGLE_S | C_SEQ_S | C_NGL_S | C_LT_S | C_NGE_S | C_LE_S | C_NGT_S | C_F_D | C_UN_D
        | C_EQ_D | C_UEQ_D | C_OLT_D | C_ULT_D | C_OLE_D | C_ULE_D | C_SF_D | C_NGLE_D
        | C_SEQ_D | C_NGL_D | C_LT_D | C_NGE_D | C_LE_D | C_NGT_D => {
            return format!(
                "{} {}, {}",
                opcode,
                fpr_name(instr.fs()),
                fpr_name(instr.ft())
            );
        }
        SQRT_S | ABS_S | MOV_S | NEG_S | SQRT_D | ABS_D | MOV_D | NEG_D | ROUND_L_S
        | TRUNC_L_S | CEIL_L_S | FLOOR_L_S | ROUND_W_S | TRUNC_W_S | CEIL_W_S | FLOOR_W_S
        | ROUND_L_D | TRUNC_L_D | CEIL_L_D | FLOOR_L_D | ROUND_W_D | TRUNC_W_D | CEIL_W_D
        | FLOOR_W_D | CVT_D_S | CVT_W_S | CVT_L_S | CVT_S_D | CVT_W_D | CVT_L_D | CVT_S_W
        | CVT_D_W | CVT_S_L | CVT_D_L => {
            return format!(
                "{} {}, {}",
                opcode,
                fpr_name(instr.fd()),
                fpr_name(instr.fs())
            );
        }
        //#endregion

        //#region RSP vector unit
        VRCP | VRCPL | VRCPH | VMOV | VRSQ | VRSQL | VRSQH => {
            return format!(
                "{} {}[{}], {}[{}]",
                opcode,
                rsp_vector_name(instr.sa()),
                instr.rd() & 0x7,
                rsp_vector_name(instr.rt()),
                instr.vector_element()
            );
        }
        _ => {
            // remaining identities are the three-operand vector ops
            return format!(
                "{} {}, {}, {}[{}]",
                opcode,
                rsp_vector_name(instr.sa()),
                rsp_vector_name(instr.rd()),
                rsp_vector_name(instr.rt()),
                instr.vector_element()
            );
        } //#endregion
    }
}

impl Function {
    /// Render the whole function, interleaving labels and resolving
    /// immediates against the analyzer's side tables and the context.
    pub fn disassemble(&self, ctx: &mut Context, cfg: &Config) -> String {
        if !cfg.disassemble_unknown_instructions && self.has_unimplemented_instrs {
            return self.disassemble_as_data(ctx, cfg);
        }

        let mut output = String::new();
        output.push_str(&format!("glabel {}", self.name));
        if cfg.function_asm_count {
            if let Some(index) = self.index {
                output.push_str(&format!(" # {}", index));
            }
        }
        output.push_str(cfg.line_ends);

        let mut was_last_inst_a_branch = false;

        for i in 0..self.instructions.len() {
            let instr = self.instructions[i];
            let offset = 4 * i as u32;
            let aux_offset = self.in_file_offset + offset;

            let mut imm_override: Option<String> = None;
            if instr.is_branch() {
                if !cfg.ignore_branches {
                    let diff = (instr.immediate() as i16) as i64;
                    let branch = offset as i64 + diff * 4 + 4;
                    if let Some(vram) = self.vram {
                        let target = (vram as i64 + branch) as u32;
                        imm_override = ctx.get_generic_label(target);
                    }
                    if imm_override.is_none() {
                        imm_override = self
                            .local_labels
                            .get(&(self.in_file_offset as i64 + branch))
                            .cloned();
                    }
                }
            } else if instr.is_itype() {
                if !self.pointers_removed && self.pointers_per_instruction[i].is_some() {
                    let address = self.pointers_per_instruction[i].unwrap();
                    if let Some(symbol) = ctx.get_generic_symbol(address, false) {
                        imm_override = Some(if instr.mnemonic() == Mnemonic::LUI {
                            format!("%hi({})", symbol)
                        } else {
                            format!("%lo({})", symbol)
                        });
                    }
                } else if let Some(constant) = self.constants_per_instruction[i] {
                    if let Some(symbol) = ctx.get_constant(constant) {
                        imm_override = Some(if instr.mnemonic() == Mnemonic::LUI {
                            format!("%hi({})", symbol)
                        } else {
                            format!("%lo({})", symbol)
                        });
                    }
                }
            } else if instr.is_jtype() {
                if let Some(target) = self.pointers_per_instruction[i] {
                    if instr.mnemonic() == Mnemonic::J {
                        imm_override = ctx.fake_functions.get(&target).cloned();
                    } else if let Some(func) = ctx.get_function(target) {
                        imm_override = Some(func.get_name());
                    }
                }
            }

            let line =
                disassemble_instruction(&instr, imm_override.as_deref(), was_last_inst_a_branch, cfg);

            let mut comment = String::new();
            if cfg.asm_comment {
                let vram_hex = match self.vram {
                    Some(vram) => format!("{:08X}", vram + offset),
                    None => String::new(),
                };
                comment = format!(
                    "/* {:0width$X} {} {:08X} */  ",
                    aux_offset + self.comment_offset,
                    vram_hex,
                    instr.raw(),
                    width = cfg.asm_comment_offset_width
                );
            }
            if was_last_inst_a_branch {
                comment.push(' ');
            }

            let mut label = String::new();
            if !cfg.ignore_branches {
                let current_vram = self.vram.map(|vram| vram + offset);
                let generic = current_vram.and_then(|vram| ctx.get_generic_label(vram));
                if let (Some(current_vram), Some(label_aux)) = (current_vram, generic) {
                    if ctx.get_function(current_vram).is_some() {
                        // the glabel up top already names the entry
                    } else if ctx.jump_table_labels.contains_key(&current_vram) {
                        label = format!("glabel {}{}", label_aux, cfg.line_ends);
                    } else {
                        label = format!("{}:{}", label_aux, cfg.line_ends);
                    }
                } else if let Some(local) = self.local_labels.get(&(aux_offset as i64)) {
                    label = format!("{}:{}", local, cfg.line_ends);
                } else if let Some(fake) =
                    current_vram.and_then(|vram| ctx.fake_functions.get(&vram))
                {
                    label = format!("{}:{}", fake, cfg.line_ends);
                }
            }

            output.push_str(&label);
            output.push_str(&comment);
            output.push_str(&line);
            output.push_str(cfg.line_ends);

            was_last_inst_a_branch = instr.is_branch()
                || instr.is_jtype()
                || matches!(instr.mnemonic(), Mnemonic::JR | Mnemonic::JALR);
        }

        return output;
    }

    /// Raw-data fallback: every word as `.word 0x<hex>`, with `glabel`s
    /// for known symbols that land inside the function. Symbols touched
    /// this way get flagged as defined.
    pub fn disassemble_as_data(&self, ctx: &mut Context, cfg: &Config) -> String {
        let mut output = String::new();

        for i in 0..self.instructions.len() {
            let instr = self.instructions[i];
            let offset = 4 * i as u32;
            let aux_offset = self.in_file_offset + offset;

            let mut label = String::new();
            let mut vram_hex = String::new();
            if let Some(vram) = self.vram {
                let current_vram = vram + offset;
                vram_hex = format!("{:08X}", current_vram);

                let aux_label = ctx
                    .get_generic_label(current_vram)
                    .or_else(|| ctx.get_generic_symbol(current_vram, false));
                if let Some(aux_label) = aux_label {
                    label = format!("{}glabel {}{}", cfg.line_ends, aux_label, cfg.line_ends);
                }
                if let Some(sym) = ctx.get_symbol_mut(current_vram) {
                    sym.is_defined = true;
                }
            }

            let line = format!("{:<1$} 0x{2:08X}", ".word", cfg.opcode_ljust, instr.raw());

            let mut comment = String::new();
            if cfg.asm_comment {
                comment = format!(
                    "/* {:0width$X} {} {:08X} */  ",
                    aux_offset + self.comment_offset,
                    vram_hex,
                    instr.raw(),
                    width = cfg.asm_comment_offset_width
                );
            }

            output.push_str(&label);
            output.push_str(&comment);
            output.push_str(&line);
            output.push_str(cfg.line_ends);
        }

        return output;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isa::decode::decode_instruction;

    fn render(word: u32) -> String {
        let cfg = Config::default();
        return disassemble_instruction(&decode_instruction(word), None, false, &cfg);
    }

    #[test]
    fn renders_itype_shapes() {
        assert_eq!(render(0x2648_1234), "addiu   $t0, $s2, 0x1234");
        assert_eq!(render(0x8D08_FFF0), "lw      $t0, -0x10($t0)");
        assert_eq!(render(0x3C01_8010), "lui     $at, 0x8010");
        assert_eq!(render(0x3421_8000), "ori     $at, $at, 0x8000");
    }

    #[test]
    fn renders_rtype_shapes() {
        assert_eq!(render(0x0122_4821), "addu    $t1, $t1, $v0");
        assert_eq!(render(0x0008_4080), "sll     $t0, $t0, 2");
        assert_eq!(render(0x03E0_0008), "jr      $ra");
        assert_eq!(render(0x0000_000D), "break");
    }

    #[test]
    fn renders_immediate_override() {
        let cfg = Config::default();
        let lui = decode_instruction(0x3C01_8010);
        let line = disassemble_instruction(&lui, Some("%hi(D_80100010)"), false, &cfg);
        assert_eq!(line, "lui     $at, %hi(D_80100010)");
    }

    #[test]
    fn squeeze_narrows_opcode_column() {
        let cfg = Config::default();
        let instr = decode_instruction(0x2408_0005);
        let line = disassemble_instruction(&instr, None, true, &cfg);
        assert_eq!(line, "addiu  $t0, $zero, 0x5");
    }

    #[test]
    fn renders_cop0_and_float() {
        assert_eq!(render(0x4088_6000), "mtc0    $t0,   Status");
        assert_eq!(render(0x4623_1080), "add.d   $f2, $f2, $f3");
        assert_eq!(render(0x4602_003C), "c.lt.s  $f0, $f2");
        assert_eq!(render(0xC424_0040), "lwc1    $f4, 0x40($at)");
    }

    #[test]
    fn renders_rsp_vector_op() {
        // vadd $v1, $v2, $v3[4]
        let word = 0x4A83_10D0;
        let rendered = render(word);
        assert!(rendered.starts_with("vadd"));
        assert!(rendered.contains("[4]"));
    }

    #[test]
    fn invalid_renders_as_word_data() {
        assert_eq!(render(0x4C00_0123), ".word   0x4C000123");
    }
}
