//! The instruction decoder.
//!
//! `decode_instruction` is total: every 32-bit word decodes to something,
//! and encodings we do not recognize come back as [`Mnemonic::INVALID`]
//! with the raw word preserved so they can still be emitted as data.

use crate::isa::structs::{Instruction, Mnemonic};
use log::debug;

//#region primary opcode consts
const OP_SPECIAL: u8 = 0b000000;
const OP_REGIMM: u8 = 0b000001;
const OP_J: u8 = 0b000010;
const OP_JAL: u8 = 0b000011;
const OP_BEQ: u8 = 0b000100;
const OP_BNE: u8 = 0b000101;
const OP_BLEZ: u8 = 0b000110;
const OP_BGTZ: u8 = 0b000111;
const OP_ADDI: u8 = 0b001000;
const OP_ADDIU: u8 = 0b001001;
const OP_SLTI: u8 = 0b001010;
const OP_SLTIU: u8 = 0b001011;
const OP_ANDI: u8 = 0b001100;
const OP_ORI: u8 = 0b001101;
const OP_XORI: u8 = 0b001110;
const OP_LUI: u8 = 0b001111;
const OP_COP0: u8 = 0b010000;
const OP_COP1: u8 = 0b010001;
const OP_COP2: u8 = 0b010010;
const OP_BEQL: u8 = 0b010100;
const OP_BNEL: u8 = 0b010101;
const OP_BLEZL: u8 = 0b010110;
const OP_BGTZL: u8 = 0b010111;
const OP_DADDI: u8 = 0b011000;
const OP_DADDIU: u8 = 0b011001;
const OP_LDL: u8 = 0b011010;
const OP_LDR: u8 = 0b011011;
const OP_LB: u8 = 0b100000;
const OP_LH: u8 = 0b100001;
const OP_LWL: u8 = 0b100010;
const OP_LW: u8 = 0b100011;
const OP_LBU: u8 = 0b100100;
const OP_LHU: u8 = 0b100101;
const OP_LWR: u8 = 0b100110;
const OP_LWU: u8 = 0b100111;
const OP_SB: u8 = 0b101000;
const OP_SH: u8 = 0b101001;
const OP_SWL: u8 = 0b101010;
const OP_SW: u8 = 0b101011;
const OP_SDL: u8 = 0b101100;
const OP_SDR: u8 = 0b101101;
const OP_SWR: u8 = 0b101110;
const OP_CACHE: u8 = 0b101111;
const OP_LL: u8 = 0b110000;
const OP_LWC1: u8 = 0b110001;
const OP_LWC2: u8 = 0b110010;
const OP_PREF: u8 = 0b110011;
const OP_LLD: u8 = 0b110100;
const OP_LDC1: u8 = 0b110101;
const OP_LDC2: u8 = 0b110110;
const OP_LD: u8 = 0b110111;
const OP_SC: u8 = 0b111000;
const OP_SWC1: u8 = 0b111001;
const OP_SWC2: u8 = 0b111010;
const OP_SCD: u8 = 0b111100;
const OP_SDC1: u8 = 0b111101;
const OP_SDC2: u8 = 0b111110;
const OP_SD: u8 = 0b111111;
//#endregion

//#region SPECIAL function consts
const FUNCT_SLL: u8 = 0b000000;
const FUNCT_SRL: u8 = 0b000010;
const FUNCT_SRA: u8 = 0b000011;
const FUNCT_SLLV: u8 = 0b000100;
const FUNCT_SRLV: u8 = 0b000110;
const FUNCT_SRAV: u8 = 0b000111;
const FUNCT_JR: u8 = 0b001000;
const FUNCT_JALR: u8 = 0b001001;
const FUNCT_SYSCALL: u8 = 0b001100;
const FUNCT_BREAK: u8 = 0b001101;
const FUNCT_SYNC: u8 = 0b001111;
const FUNCT_MFHI: u8 = 0b010000;
const FUNCT_MTHI: u8 = 0b010001;
const FUNCT_MFLO: u8 = 0b010010;
const FUNCT_MTLO: u8 = 0b010011;
const FUNCT_DSLLV: u8 = 0b010100;
const FUNCT_DSRLV: u8 = 0b010110;
const FUNCT_DSRAV: u8 = 0b010111;
const FUNCT_MULT: u8 = 0b011000;
const FUNCT_MULTU: u8 = 0b011001;
const FUNCT_DIV: u8 = 0b011010;
const FUNCT_DIVU: u8 = 0b011011;
const FUNCT_DMULT: u8 = 0b011100;
const FUNCT_DMULTU: u8 = 0b011101;
const FUNCT_DDIV: u8 = 0b011110;
const FUNCT_DDIVU: u8 = 0b011111;
const FUNCT_ADD: u8 = 0b100000;
const FUNCT_ADDU: u8 = 0b100001;
const FUNCT_SUB: u8 = 0b100010;
const FUNCT_SUBU: u8 = 0b100011;
const FUNCT_AND: u8 = 0b100100;
const FUNCT_OR: u8 = 0b100101;
const FUNCT_XOR: u8 = 0b100110;
const FUNCT_NOR: u8 = 0b100111;
const FUNCT_SLT: u8 = 0b101010;
const FUNCT_SLTU: u8 = 0b101011;
const FUNCT_DADD: u8 = 0b101100;
const FUNCT_DADDU: u8 = 0b101101;
const FUNCT_DSUB: u8 = 0b101110;
const FUNCT_DSUBU: u8 = 0b101111;
const FUNCT_TGE: u8 = 0b110000;
const FUNCT_TGEU: u8 = 0b110001;
const FUNCT_TLT: u8 = 0b110010;
const FUNCT_TLTU: u8 = 0b110011;
const FUNCT_TEQ: u8 = 0b110100;
const FUNCT_TNE: u8 = 0b110110;
const FUNCT_DSLL: u8 = 0b111000;
const FUNCT_DSRL: u8 = 0b111010;
const FUNCT_DSRA: u8 = 0b111011;
const FUNCT_DSLL32: u8 = 0b111100;
const FUNCT_DSRL32: u8 = 0b111110;
const FUNCT_DSRA32: u8 = 0b111111;
//#endregion

//#region REGIMM rt consts
const RZ_BLTZ: u8 = 0b00000;
const RZ_BGEZ: u8 = 0b00001;
const RZ_BLTZL: u8 = 0b00010;
const RZ_BGEZL: u8 = 0b00011;
const RZ_TGEI: u8 = 0b01000;
const RZ_TGEIU: u8 = 0b01001;
const RZ_TLTI: u8 = 0b01010;
const RZ_TLTIU: u8 = 0b01011;
const RZ_TEQI: u8 = 0b01100;
const RZ_TNEI: u8 = 0b01110;
const RZ_BLTZAL: u8 = 0b10000;
const RZ_BGEZAL: u8 = 0b10001;
const RZ_BLTZALL: u8 = 0b10010;
const RZ_BGEZALL: u8 = 0b10011;
//#endregion

//#region coprocessor format consts
const FMT_MF: u8 = 0b00000;
const FMT_DMF: u8 = 0b00001;
const FMT_CF: u8 = 0b00010;
const FMT_MT: u8 = 0b00100;
const FMT_DMT: u8 = 0b00101;
const FMT_CT: u8 = 0b00110;
const FMT_BC: u8 = 0b01000;
const FMT_S: u8 = 0b10000;
const FMT_D: u8 = 0b10001;
const FMT_W: u8 = 0b10100;
const FMT_L: u8 = 0b10101;
//#endregion

//#region COP0 TLB function consts
const FUNCT_TLBR: u8 = 0b000001;
const FUNCT_TLBWI: u8 = 0b000010;
const FUNCT_TLBWR: u8 = 0b000110;
const FUNCT_TLBP: u8 = 0b001000;
const FUNCT_ERET: u8 = 0b011000;
//#endregion

/// Decode one big-endian machine word into an [`Instruction`].
pub fn decode_instruction(word: u32) -> Instruction {
    let instr = Instruction::with_mnemonic(word, Mnemonic::INVALID);
    let mnemonic = match instr.op() {
        OP_SPECIAL => decode_special_instruction(instr),
        OP_REGIMM => decode_regimm_instruction(instr),
        OP_COP0 => decode_cop0_instruction(instr),
        OP_COP1 => decode_cop1_instruction(instr),
        OP_COP2 => decode_cop2_instruction(instr),
        OP_J => Mnemonic::J,
        OP_JAL => Mnemonic::JAL,
        OP_BEQ => match (instr.rs(), instr.rt()) {
            (0, 0) => Mnemonic::B,
            (_, 0) => Mnemonic::BEQZ,
            _ => Mnemonic::BEQ,
        },
        OP_BNE => {
            if instr.rt() == 0 {
                Mnemonic::BNEZ
            } else {
                Mnemonic::BNE
            }
        }
        OP_BLEZ => Mnemonic::BLEZ,
        OP_BGTZ => Mnemonic::BGTZ,
        OP_ADDI => Mnemonic::ADDI,
        OP_ADDIU => Mnemonic::ADDIU,
        OP_SLTI => Mnemonic::SLTI,
        OP_SLTIU => Mnemonic::SLTIU,
        OP_ANDI => Mnemonic::ANDI,
        OP_ORI => Mnemonic::ORI,
        OP_XORI => Mnemonic::XORI,
        OP_LUI => Mnemonic::LUI,
        OP_BEQL => Mnemonic::BEQL,
        OP_BNEL => Mnemonic::BNEL,
        OP_BLEZL => Mnemonic::BLEZL,
        OP_BGTZL => Mnemonic::BGTZL,
        OP_DADDI => Mnemonic::DADDI,
        OP_DADDIU => Mnemonic::DADDIU,
        OP_LDL => Mnemonic::LDL,
        OP_LDR => Mnemonic::LDR,
        OP_LB => Mnemonic::LB,
        OP_LH => Mnemonic::LH,
        OP_LWL => Mnemonic::LWL,
        OP_LW => Mnemonic::LW,
        OP_LBU => Mnemonic::LBU,
        OP_LHU => Mnemonic::LHU,
        OP_LWR => Mnemonic::LWR,
        OP_LWU => Mnemonic::LWU,
        OP_SB => Mnemonic::SB,
        OP_SH => Mnemonic::SH,
        OP_SWL => Mnemonic::SWL,
        OP_SW => Mnemonic::SW,
        OP_SDL => Mnemonic::SDL,
        OP_SDR => Mnemonic::SDR,
        OP_SWR => Mnemonic::SWR,
        OP_CACHE => Mnemonic::CACHE,
        OP_LL => Mnemonic::LL,
        OP_LWC1 => Mnemonic::LWC1,
        OP_LWC2 => Mnemonic::LWC2,
        OP_PREF => Mnemonic::PREF,
        OP_LLD => Mnemonic::LLD,
        OP_LDC1 => Mnemonic::LDC1,
        OP_LDC2 => Mnemonic::LDC2,
        OP_LD => Mnemonic::LD,
        OP_SC => Mnemonic::SC,
        OP_SWC1 => Mnemonic::SWC1,
        OP_SWC2 => Mnemonic::SWC2,
        OP_SCD => Mnemonic::SCD,
        OP_SDC1 => Mnemonic::SDC1,
        OP_SDC2 => Mnemonic::SDC2,
        OP_SD => Mnemonic::SD,
        _ => {
            debug!(target: "decode", "Unknown opcode encountered: 0x{:08X}", word);
            Mnemonic::INVALID
        }
    };
    return Instruction::with_mnemonic(word, mnemonic);
}

fn decode_special_instruction(instr: Instruction) -> Mnemonic {
    if instr.raw() == 0 {
        return Mnemonic::NOP;
    }
    match instr.funct() {
        FUNCT_SLL => Mnemonic::SLL,
        FUNCT_SRL => Mnemonic::SRL,
        FUNCT_SRA => Mnemonic::SRA,
        FUNCT_SLLV => Mnemonic::SLLV,
        FUNCT_SRLV => Mnemonic::SRLV,
        FUNCT_SRAV => Mnemonic::SRAV,
        FUNCT_JR => Mnemonic::JR,
        FUNCT_JALR => Mnemonic::JALR,
        FUNCT_SYSCALL => Mnemonic::SYSCALL,
        FUNCT_BREAK => Mnemonic::BREAK,
        FUNCT_SYNC => Mnemonic::SYNC,
        FUNCT_MFHI => Mnemonic::MFHI,
        FUNCT_MTHI => Mnemonic::MTHI,
        FUNCT_MFLO => Mnemonic::MFLO,
        FUNCT_MTLO => Mnemonic::MTLO,
        FUNCT_DSLLV => Mnemonic::DSLLV,
        FUNCT_DSRLV => Mnemonic::DSRLV,
        FUNCT_DSRAV => Mnemonic::DSRAV,
        FUNCT_MULT => Mnemonic::MULT,
        FUNCT_MULTU => Mnemonic::MULTU,
        FUNCT_DIV => Mnemonic::DIV,
        FUNCT_DIVU => Mnemonic::DIVU,
        FUNCT_DMULT => Mnemonic::DMULT,
        FUNCT_DMULTU => Mnemonic::DMULTU,
        FUNCT_DDIV => Mnemonic::DDIV,
        FUNCT_DDIVU => Mnemonic::DDIVU,
        FUNCT_ADD => Mnemonic::ADD,
        FUNCT_ADDU => Mnemonic::ADDU,
        FUNCT_SUB => Mnemonic::SUB,
        FUNCT_SUBU => Mnemonic::SUBU,
        FUNCT_AND => Mnemonic::AND,
        FUNCT_OR => Mnemonic::OR,
        FUNCT_XOR => Mnemonic::XOR,
        FUNCT_NOR => Mnemonic::NOR,
        FUNCT_SLT => Mnemonic::SLT,
        FUNCT_SLTU => Mnemonic::SLTU,
        FUNCT_DADD => Mnemonic::DADD,
        FUNCT_DADDU => Mnemonic::DADDU,
        FUNCT_DSUB => Mnemonic::DSUB,
        FUNCT_DSUBU => Mnemonic::DSUBU,
        FUNCT_TGE => Mnemonic::TGE,
        FUNCT_TGEU => Mnemonic::TGEU,
        FUNCT_TLT => Mnemonic::TLT,
        FUNCT_TLTU => Mnemonic::TLTU,
        FUNCT_TEQ => Mnemonic::TEQ,
        FUNCT_TNE => Mnemonic::TNE,
        FUNCT_DSLL => Mnemonic::DSLL,
        FUNCT_DSRL => Mnemonic::DSRL,
        FUNCT_DSRA => Mnemonic::DSRA,
        FUNCT_DSLL32 => Mnemonic::DSLL32,
        FUNCT_DSRL32 => Mnemonic::DSRL32,
        FUNCT_DSRA32 => Mnemonic::DSRA32,
        _ => {
            debug!(target: "decode", "Unknown SPECIAL funct: 0b{:06b} / 0x{:08X}", instr.funct(), instr.raw());
            Mnemonic::INVALID
        }
    }
}

fn decode_regimm_instruction(instr: Instruction) -> Mnemonic {
    match instr.rt() {
        RZ_BLTZ => Mnemonic::BLTZ,
        RZ_BGEZ => Mnemonic::BGEZ,
        RZ_BLTZL => Mnemonic::BLTZL,
        RZ_BGEZL => Mnemonic::BGEZL,
        RZ_TGEI => Mnemonic::TGEI,
        RZ_TGEIU => Mnemonic::TGEIU,
        RZ_TLTI => Mnemonic::TLTI,
        RZ_TLTIU => Mnemonic::TLTIU,
        RZ_TEQI => Mnemonic::TEQI,
        RZ_TNEI => Mnemonic::TNEI,
        RZ_BLTZAL => Mnemonic::BLTZAL,
        RZ_BGEZAL => Mnemonic::BGEZAL,
        RZ_BLTZALL => Mnemonic::BLTZALL,
        RZ_BGEZALL => Mnemonic::BGEZALL,
        _ => {
            debug!(target: "decode", "Unknown REGIMM rt: 0b{:05b} / 0x{:08X}", instr.rt(), instr.raw());
            Mnemonic::INVALID
        }
    }
}

/// Branch-on-condition sub-decode shared by all three coprocessors.
/// `tf` picks true/false, `nd` picks the likely variant.
fn decode_cop_branch(instr: Instruction, table: [Mnemonic; 4]) -> Mnemonic {
    let idx = (instr.tf() as usize) | ((instr.nd() as usize) << 1);
    return table[idx];
}

fn decode_cop0_instruction(instr: Instruction) -> Mnemonic {
    match instr.fmt() {
        FMT_MF => Mnemonic::MFC0,
        FMT_DMF => Mnemonic::DMFC0,
        FMT_CF => Mnemonic::CFC0,
        FMT_MT => Mnemonic::MTC0,
        FMT_DMT => Mnemonic::DMTC0,
        FMT_CT => Mnemonic::CTC0,
        FMT_BC => decode_cop_branch(
            instr,
            [Mnemonic::BC0F, Mnemonic::BC0T, Mnemonic::BC0FL, Mnemonic::BC0TL],
        ),
        _ => match instr.funct() {
            FUNCT_TLBR => Mnemonic::TLBR,
            FUNCT_TLBWI => Mnemonic::TLBWI,
            FUNCT_TLBWR => Mnemonic::TLBWR,
            FUNCT_TLBP => Mnemonic::TLBP,
            FUNCT_ERET => Mnemonic::ERET,
            _ => {
                debug!(target: "decode", "Unknown COP0 encoding: 0x{:08X}", instr.raw());
                Mnemonic::INVALID
            }
        },
    }
}

#[rustfmt::skip]
const COP1_COMPARE_S: [Mnemonic; 16] = [
    Mnemonic::C_F_S,  Mnemonic::C_UN_S,   Mnemonic::C_EQ_S,  Mnemonic::C_UEQ_S,
    Mnemonic::C_OLT_S, Mnemonic::C_ULT_S, Mnemonic::C_OLE_S, Mnemonic::C_ULE_S,
    Mnemonic::C_SF_S,  Mnemonic::C_NGLE_S, Mnemonic::C_SEQ_S, Mnemonic::C_NGL_S,
    Mnemonic::C_LT_S,  Mnemonic::C_NGE_S, Mnemonic::C_LE_S,  Mnemonic::C_NGT_S,
];

#[rustfmt::skip]
const COP1_COMPARE_D: [Mnemonic; 16] = [
    Mnemonic::C_F_D,  Mnemonic::C_UN_D,   Mnemonic::C_EQ_D,  Mnemonic::C_UEQ_D,
    Mnemonic::C_OLT_D, Mnemonic::C_ULT_D, Mnemonic::C_OLE_D, Mnemonic::C_ULE_D,
    Mnemonic::C_SF_D,  Mnemonic::C_NGLE_D, Mnemonic::C_SEQ_D, Mnemonic::C_NGL_D,
    Mnemonic::C_LT_D,  Mnemonic::C_NGE_D, Mnemonic::C_LE_D,  Mnemonic::C_NGT_D,
];

fn decode_cop1_instruction(instr: Instruction) -> Mnemonic {
    use Mnemonic::*;
    let unknown = || {
        debug!(target: "decode", "Unknown COP1 encoding: 0x{:08X}", instr.raw());
        INVALID
    };
    match instr.fmt() {
        FMT_MF => MFC1,
        FMT_DMF => DMFC1,
        FMT_CF => CFC1,
        FMT_MT => MTC1,
        FMT_DMT => DMTC1,
        FMT_CT => CTC1,
        FMT_BC => decode_cop_branch(instr, [BC1F, BC1T, BC1FL, BC1TL]),
        FMT_S => match instr.funct() {
            0b000000 => ADD_S,
            0b000001 => SUB_S,
            0b000010 => MUL_S,
            0b000011 => DIV_S,
            0b000100 => SQRT_S,
            0b000101 => ABS_S,
            0b000110 => MOV_S,
            0b000111 => NEG_S,
            0b001000 => ROUND_L_S,
            0b001001 => TRUNC_L_S,
            0b001010 => CEIL_L_S,
            0b001011 => FLOOR_L_S,
            0b001100 => ROUND_W_S,
            0b001101 => TRUNC_W_S,
            0b001110 => CEIL_W_S,
            0b001111 => FLOOR_W_S,
            0b100001 => CVT_D_S,
            0b100100 => CVT_W_S,
            0b100101 => CVT_L_S,
            f if f >= 0b110000 => COP1_COMPARE_S[instr.cond() as usize],
            _ => unknown(),
        },
        FMT_D => match instr.funct() {
            0b000000 => ADD_D,
            0b000001 => SUB_D,
            0b000010 => MUL_D,
            0b000011 => DIV_D,
            0b000100 => SQRT_D,
            0b000101 => ABS_D,
            0b000110 => MOV_D,
            0b000111 => NEG_D,
            0b001000 => ROUND_L_D,
            0b001001 => TRUNC_L_D,
            0b001010 => CEIL_L_D,
            0b001011 => FLOOR_L_D,
            0b001100 => ROUND_W_D,
            0b001101 => TRUNC_W_D,
            0b001110 => CEIL_W_D,
            0b001111 => FLOOR_W_D,
            0b100000 => CVT_S_D,
            0b100100 => CVT_W_D,
            0b100101 => CVT_L_D,
            f if f >= 0b110000 => COP1_COMPARE_D[instr.cond() as usize],
            _ => unknown(),
        },
        FMT_W => match instr.funct() {
            0b100000 => CVT_S_W,
            0b100001 => CVT_D_W,
            _ => unknown(),
        },
        FMT_L => match instr.funct() {
            0b100000 => CVT_S_L,
            0b100001 => CVT_D_L,
            _ => unknown(),
        },
        _ => unknown(),
    }
}

fn decode_cop2_instruction(instr: Instruction) -> Mnemonic {
    use Mnemonic::*;
    // bit 25 set selects the RSP vector computational unit
    if (instr.raw() >> 25) & 1 == 1 {
        return match instr.funct() {
            0x00 => VMULF,
            0x01 => VMULU,
            0x02 => VRNDP,
            0x03 => VMULQ,
            0x04 => VMUDL,
            0x05 => VMUDM,
            0x06 => VMUDN,
            0x07 => VMUDH,
            0x08 => VMACF,
            0x09 => VMACU,
            0x0A => VRNDN,
            0x0B => VMACQ,
            0x0C => VMADL,
            0x0D => VMADM,
            0x0E => VMADN,
            0x0F => VMADH,
            0x10 => VADD,
            0x11 => VSUB,
            0x13 => VABS,
            0x14 => VADDC,
            0x15 => VSUBC,
            0x1D => VSAR,
            0x20 => VLT,
            0x21 => VEQ,
            0x22 => VNE,
            0x23 => VGE,
            0x24 => VCL,
            0x25 => VCH,
            0x26 => VCR,
            0x27 => VMRG,
            0x28 => VAND,
            0x29 => VNAND,
            0x2A => VOR,
            0x2B => VNOR,
            0x2C => VXOR,
            0x2D => VNXOR,
            0x30 => VRCP,
            0x31 => VRCPL,
            0x32 => VRCPH,
            0x33 => VMOV,
            0x34 => VRSQ,
            0x35 => VRSQL,
            0x36 => VRSQH,
            0x37 => VNOP,
            _ => {
                debug!(target: "decode", "Unknown RSP vector funct: 0x{:02X} / 0x{:08X}", instr.funct(), instr.raw());
                INVALID
            }
        };
    }
    match instr.fmt() {
        FMT_MF => MFC2,
        FMT_CF => CFC2,
        FMT_MT => MTC2,
        FMT_CT => CTC2,
        FMT_BC => decode_cop_branch(instr, [BC2F, BC2T, BC2FL, BC2TL]),
        _ => {
            debug!(target: "decode", "Unknown COP2 encoding: 0x{:08X}", instr.raw());
            INVALID
        }
    }
}
