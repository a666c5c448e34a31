//! Instruction record and mnemonic identities for the r4300 + RSP.
//!
//! An [`Instruction`] wraps the raw 32-bit word together with the concrete
//! mnemonic chosen by the decoder. Field accessors slice the word on
//! demand; nothing but [`Instruction::blank_out`] ever mutates it, and that
//! only clears operand bits, so the dispatch identity survives blanking.

//#region instruction word masks
const INSTR_PART_OP: u32 = 0xFC00_0000;
const INSTR_PART_RS: u32 = 0x03E0_0000;
const INSTR_PART_RT: u32 = 0x001F_0000;
const INSTR_PART_RD: u32 = 0x0000_F800;
const INSTR_PART_SA: u32 = 0x0000_07C0;
const INSTR_PART_FUNCT: u32 = 0x0000_003F;
const INSTR_PART_IMMEDIATE: u32 = 0x0000_FFFF;
const INSTR_PART_TARGET: u32 = 0x03FF_FFFF;
/// RSP vector operand fields: e | vt | vs | vd
const INSTR_PART_VECTOR_OPERANDS: u32 = 0x01FF_FFC0;
//#endregion

const OP_REGIMM: u8 = 0b000001;
const OP_COP0: u8 = 0b010000;
const OP_COP1: u8 = 0b010001;
const OP_COP2: u8 = 0b010010;

/// COP1 format field value for double precision
const FMT_D: u8 = 0b10001;

/// The concrete identity of a decoded instruction.
///
/// This is a closed sum: every implemented encoding maps to exactly one
/// variant, and anything the decoder does not recognize maps to
/// [`Mnemonic::INVALID`] while keeping the raw word around for data
/// emission.
#[allow(non_camel_case_types)]
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
#[rustfmt::skip]
pub enum Mnemonic {
    //#region primary opcode table
    /// Jump
    J,
    /// Jump and link
    JAL,
    /// Branch on equal
    BEQ,
    /// Branch on not equal
    BNE,
    /// Branch on <= 0
    BLEZ,
    /// Branch on > 0
    BGTZ,
    /// Add immediate
    ADDI,
    /// Add immediate unsigned
    ADDIU,
    /// Set on < immediate
    SLTI,
    /// Set on < immediate unsigned
    SLTIU,
    /// Logical AND immediate
    ANDI,
    /// Logical OR immediate
    ORI,
    /// Logical XOR immediate
    XORI,
    /// Load upper immediate
    LUI,
    /// Branch likely variants annul the delay slot when not taken
    BEQL, BNEL, BLEZL, BGTZL,
    /// Doubleword add immediate
    DADDI,
    /// Doubleword add immediate unsigned
    DADDIU,
    LDL, LDR,
    LB, LH, LWL, LW, LBU, LHU, LWR, LWU,
    SB, SH, SWL, SW, SDL, SDR, SWR,
    /// Cache maintenance op; rt selects the operation
    CACHE,
    /// Load linked
    LL,
    LWC1, LWC2,
    PREF,
    LLD, LDC1, LDC2, LD,
    /// Store conditional
    SC,
    SWC1, SWC2,
    SCD, SDC1, SDC2, SD,
    //#endregion
    //#region SPECIAL table
    SLL, SRL, SRA, SLLV, SRLV, SRAV,
    /// Jump register
    JR,
    /// Jump and link register
    JALR,
    SYSCALL, BREAK, SYNC,
    MFHI, MTHI, MFLO, MTLO,
    DSLLV, DSRLV, DSRAV,
    MULT, MULTU, DIV, DIVU, DMULT, DMULTU, DDIV, DDIVU,
    ADD, ADDU, SUB, SUBU, AND, OR, XOR, NOR, SLT, SLTU,
    DADD, DADDU, DSUB, DSUBU,
    TGE, TGEU, TLT, TLTU, TEQ, TNE,
    DSLL, DSRL, DSRA, DSLL32, DSRL32, DSRA32,
    //#endregion
    //#region REGIMM table
    BLTZ, BGEZ, BLTZL, BGEZL,
    TGEI, TGEIU, TLTI, TLTIU, TEQI, TNEI,
    /// Branch and link variants clobber $ra
    BLTZAL, BGEZAL, BLTZALL, BGEZALL,
    //#endregion
    //#region COP0
    MFC0, DMFC0, CFC0, MTC0, DMTC0, CTC0,
    BC0F, BC0T, BC0FL, BC0TL,
    TLBR, TLBWI, TLBWR, TLBP, ERET,
    //#endregion
    //#region COP1
    MFC1, DMFC1, CFC1, MTC1, DMTC1, CTC1,
    BC1F, BC1T, BC1FL, BC1TL,
    ADD_S, SUB_S, MUL_S, DIV_S, SQRT_S, ABS_S, MOV_S, NEG_S,
    ROUND_L_S, TRUNC_L_S, CEIL_L_S, FLOOR_L_S,
    ROUND_W_S, TRUNC_W_S, CEIL_W_S, FLOOR_W_S,
    CVT_D_S, CVT_W_S, CVT_L_S,
    ADD_D, SUB_D, MUL_D, DIV_D, SQRT_D, ABS_D, MOV_D, NEG_D,
    ROUND_L_D, TRUNC_L_D, CEIL_L_D, FLOOR_L_D,
    ROUND_W_D, TRUNC_W_D, CEIL_W_D, FLOOR_W_D,
    CVT_S_D, CVT_W_D, CVT_L_D,
    CVT_S_W, CVT_D_W, CVT_S_L, CVT_D_L,
    C_F_S, C_UN_S, C_EQ_S, C_UEQ_S, C_OLT_S, C_ULT_S, C_OLE_S, C_ULE_S,
    C_SF_S, C_NGLE_S, C_SEQ_S, C_NGL_S, C_LT_S, C_NGE_S, C_LE_S, C_NGT_S,
    C_F_D, C_UN_D, C_EQ_D, C_UEQ_D, C_OLT_D, C_ULT_D, C_OLE_D, C_ULE_D,
    C_SF_D, C_NGLE_D, C_SEQ_D, C_NGL_D, C_LT_D, C_NGE_D, C_LE_D, C_NGT_D,
    //#endregion
    //#region COP2 (RSP)
    MFC2, MTC2, CFC2, CTC2,
    BC2F, BC2T, BC2FL, BC2TL,
    VMULF, VMULU, VRNDP, VMULQ, VMUDL, VMUDM, VMUDN, VMUDH,
    VMACF, VMACU, VRNDN, VMACQ, VMADL, VMADM, VMADN, VMADH,
    VADD, VSUB, VABS, VADDC, VSUBC, VSAR,
    VLT, VEQ, VNE, VGE, VCL, VCH, VCR, VMRG,
    VAND, VNAND, VOR, VNOR, VXOR, VNXOR,
    VRCP, VRCPL, VRCPH, VMOV, VRSQ, VRSQL, VRSQH, VNOP,
    //#endregion
    //#region pseudo identities assigned at decode time
    /// The canonical no-op, word 0x00000000
    NOP,
    /// Unconditional branch (`beq $zero, $zero`)
    B,
    /// `beq` with rt == $zero
    BEQZ,
    /// `bne` with rt == $zero
    BNEZ,
    //#endregion
    /// Unrecognized encoding; emitted as raw data
    INVALID,
}

impl Mnemonic {
    /// Assembler spelling of the opcode, e.g. `addiu`, `c.le.s`, `bc1fl`.
    pub fn name(&self) -> String {
        return format!("{:?}", self).to_lowercase().replace('_', ".");
    }
}

/// One decoded machine word.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Instruction {
    word: u32,
    mnemonic: Mnemonic,
}

impl Instruction {
    pub(crate) fn with_mnemonic(word: u32, mnemonic: Mnemonic) -> Instruction {
        return Instruction { word, mnemonic };
    }

    /// The undisturbed 32-bit word this instruction was decoded from
    /// (or the blanked word, after [`Instruction::blank_out`]).
    pub fn raw(&self) -> u32 {
        self.word
    }

    pub fn mnemonic(&self) -> Mnemonic {
        self.mnemonic
    }

    //#region field accessors
    pub fn op(&self) -> u8 {
        ((self.word & INSTR_PART_OP) >> 26) as u8
    }

    pub fn rs(&self) -> u8 {
        ((self.word & INSTR_PART_RS) >> 21) as u8
    }

    pub fn rt(&self) -> u8 {
        ((self.word & INSTR_PART_RT) >> 16) as u8
    }

    pub fn rd(&self) -> u8 {
        ((self.word & INSTR_PART_RD) >> 11) as u8
    }

    pub fn sa(&self) -> u8 {
        ((self.word & INSTR_PART_SA) >> 6) as u8
    }

    pub fn funct(&self) -> u8 {
        (self.word & INSTR_PART_FUNCT) as u8
    }

    pub fn immediate(&self) -> u16 {
        (self.word & INSTR_PART_IMMEDIATE) as u16
    }

    /// The 26-bit jump target index of a J-type instruction
    pub fn instr_index(&self) -> u32 {
        self.word & INSTR_PART_TARGET
    }

    /// Coprocessor format field (aliases rs)
    pub fn fmt(&self) -> u8 {
        self.rs()
    }

    /// Float target register (aliases rt)
    pub fn ft(&self) -> u8 {
        self.rt()
    }

    /// Float source register (aliases rd)
    pub fn fs(&self) -> u8 {
        self.rd()
    }

    /// Float destination register (aliases sa)
    pub fn fd(&self) -> u8 {
        self.sa()
    }

    /// Branch-on-true bit of coprocessor branch encodings
    pub fn tf(&self) -> bool {
        (self.word >> 16) & 1 == 1
    }

    /// Nullify-delay-slot ("likely") bit of coprocessor branch encodings
    pub fn nd(&self) -> bool {
        (self.word >> 17) & 1 == 1
    }

    /// Float compare condition, low four bits of funct
    pub fn cond(&self) -> u8 {
        self.funct() & 0xF
    }

    /// Element field of an RSP vector computational op
    pub fn vector_element(&self) -> u8 {
        ((self.word >> 21) & 0xF) as u8
    }

    /// Element field of an RSP move (`mfc2`/`mtc2`) encoding
    pub fn move_element(&self) -> u8 {
        ((self.word >> 7) & 0xF) as u8
    }
    //#endregion

    //#region capability predicates
    pub fn is_implemented(&self) -> bool {
        self.mnemonic != Mnemonic::INVALID
    }

    pub fn is_branch(&self) -> bool {
        use Mnemonic::*;
        matches!(
            self.mnemonic,
            BEQ | BNE | BLEZ | BGTZ | BEQL | BNEL | BLEZL | BGTZL
                | BLTZ | BGEZ | BLTZL | BGEZL
                | BLTZAL | BGEZAL | BLTZALL | BGEZALL
                | BC0F | BC0T | BC0FL | BC0TL
                | BC1F | BC1T | BC1FL | BC1TL
                | BC2F | BC2T | BC2FL | BC2TL
                | B | BEQZ | BNEZ
        )
    }

    pub fn is_branch_likely(&self) -> bool {
        use Mnemonic::*;
        matches!(
            self.mnemonic,
            BEQL | BNEL | BLEZL | BGTZL | BLTZL | BGEZL | BLTZALL | BGEZALL
                | BC0FL | BC0TL | BC1FL | BC1TL | BC2FL | BC2TL
        )
    }

    pub fn is_jtype(&self) -> bool {
        matches!(self.mnemonic, Mnemonic::J | Mnemonic::JAL)
    }

    /// Loads, stores, immediate ALU ops and LUI. Branches are excluded:
    /// their immediate is a PC-relative word offset, not an address half.
    pub fn is_itype(&self) -> bool {
        use Mnemonic::*;
        matches!(
            self.mnemonic,
            LB | LH | LWL | LW | LBU | LHU | LWR | LWU
                | SB | SH | SWL | SW | SDL | SDR | SWR
                | LDL | LDR | LL | SC | LLD | SCD | LD | SD
                | CACHE | PREF
                | LWC1 | SWC1 | LDC1 | SDC1 | LWC2 | SWC2 | LDC2 | SDC2
                | ADDI | ADDIU | SLTI | SLTIU | ANDI | ORI | XORI
                | DADDI | DADDIU | LUI
        )
    }

    /// Whether this instruction writes a general register through the rt
    /// field (loads, immediate ALU, and moves out of a coprocessor).
    pub fn modifies_rt(&self) -> bool {
        use Mnemonic::*;
        matches!(
            self.mnemonic,
            LB | LBU | LH | LHU | LW | LWU | LWL | LWR | LDL | LDR | LL | LLD | LD
                | LUI
                | ADDI | ADDIU | SLTI | SLTIU | ANDI | ORI | XORI | DADDI | DADDIU
                | MFC0 | DMFC0 | CFC0
                | MFC1 | DMFC1 | CFC1
                | MFC2 | CFC2
        )
    }

    /// Whether this instruction writes a general register through the rd
    /// field. Jumps and traps do not count, and neither do the mult/div
    /// family (they write HI/LO).
    pub fn modifies_rd(&self) -> bool {
        use Mnemonic::*;
        matches!(
            self.mnemonic,
            SLL | SRL | SRA | SLLV | SRLV | SRAV
                | DSLLV | DSRLV | DSRAV | DSLL | DSRL | DSRA | DSLL32 | DSRL32 | DSRA32
                | MFHI | MFLO
                | ADD | ADDU | SUB | SUBU | AND | OR | XOR | NOR | SLT | SLTU
                | DADD | DADDU | DSUB | DSUBU
        )
    }

    /// Whether the instruction's register file is `$f`. Keyed off the
    /// opcode so that even unimplemented COP1 encodings count.
    pub fn is_float(&self) -> bool {
        use Mnemonic::*;
        self.op() == OP_COP1 || matches!(self.mnemonic, LWC1 | SWC1 | LDC1 | SDC1)
    }

    pub fn is_double_float(&self) -> bool {
        use Mnemonic::*;
        matches!(self.mnemonic, LDC1 | SDC1) || (self.op() == OP_COP1 && self.fmt() == FMT_D)
    }
    //#endregion

    /// Two instructions carry the same opcode identity.
    pub fn same_opcode(&self, other: &Instruction) -> bool {
        if self.mnemonic == Mnemonic::INVALID {
            return other.mnemonic == Mnemonic::INVALID && self.op() == other.op();
        }
        return self.mnemonic == other.mnemonic;
    }

    pub fn same_opcode_but_different_arguments(&self, other: &Instruction) -> bool {
        return self.same_opcode(other) && self.word != other.word;
    }

    /// Zero the operand-carrying fields of this instruction while keeping
    /// the fields that select its identity, so `same_opcode` is stable
    /// across blanking. Idempotent.
    pub fn blank_out(&mut self) {
        use Mnemonic::*;
        if !self.is_implemented() || self.mnemonic == NOP {
            return;
        }
        let clear = if self.is_jtype() {
            INSTR_PART_TARGET
        } else if self.is_branch() {
            match self.mnemonic {
                // rt selects the REGIMM op, keep it
                BLTZ | BGEZ | BLTZL | BGEZL | BLTZAL | BGEZAL | BLTZALL | BGEZALL => {
                    INSTR_PART_RS | INSTR_PART_IMMEDIATE
                }
                // tf/nd live in the rt field, keep it
                BC0F | BC0T | BC0FL | BC0TL | BC1F | BC1T | BC1FL | BC1TL | BC2F | BC2T
                | BC2FL | BC2TL => INSTR_PART_IMMEDIATE,
                _ => INSTR_PART_RS | INSTR_PART_RT | INSTR_PART_IMMEDIATE,
            }
        } else if self.is_itype() {
            INSTR_PART_RS | INSTR_PART_RT | INSTR_PART_IMMEDIATE
        } else if self.op() == OP_REGIMM {
            // rt selects the REGIMM trap, keep it
            INSTR_PART_RS | INSTR_PART_IMMEDIATE
        } else if self.op() == OP_COP0 {
            match self.mnemonic {
                MFC0 | DMFC0 | CFC0 | MTC0 | DMTC0 | CTC0 => {
                    INSTR_PART_RT | INSTR_PART_RD | INSTR_PART_SA | INSTR_PART_FUNCT
                }
                // funct selects the TLB op, keep it
                _ => INSTR_PART_RT | INSTR_PART_RD | INSTR_PART_SA,
            }
        } else if self.op() == OP_COP2 && (self.word >> 25) & 1 == 1 {
            INSTR_PART_VECTOR_OPERANDS
        } else {
            // SPECIAL register ops, COP1 arithmetic/moves, COP2 moves:
            // funct (and fmt, where present) stay, operands go
            INSTR_PART_RT | INSTR_PART_RD | INSTR_PART_SA
        };
        self.word &= !clear;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::isa::decode::decode_instruction;

    #[test]
    fn accessors_reconstruct_bit_layout() {
        // addiu $t0, $s2, 0x1234
        const WORD: u32 = 0x2648_1234;
        let instr = decode_instruction(WORD);
        assert_eq!(instr.raw(), WORD);
        assert_eq!(instr.op(), 0b001001);
        assert_eq!(instr.rs(), 18);
        assert_eq!(instr.rt(), 8);
        assert_eq!(instr.immediate(), 0x1234);
        let rebuilt = ((instr.op() as u32) << 26)
            | ((instr.rs() as u32) << 21)
            | ((instr.rt() as u32) << 16)
            | instr.immediate() as u32;
        assert_eq!(rebuilt, WORD);
    }

    #[test]
    fn branch_is_not_itype_nor_jtype() {
        const BEQ_INSTR: u32 = 0x1053_0004;
        let instr = decode_instruction(BEQ_INSTR);
        assert!(instr.is_branch());
        assert!(!instr.is_itype());
        assert!(!instr.is_jtype());
    }

    #[test]
    fn likely_branches_are_branches() {
        const BNEL_INSTR: u32 = 0x5453_0004;
        let instr = decode_instruction(BNEL_INSTR);
        assert!(instr.is_branch_likely());
        assert!(instr.is_branch());
    }

    #[test]
    fn register_write_predicates() {
        let lui = decode_instruction(0x3C08_8000);
        assert!(lui.modifies_rt());
        let beq = decode_instruction(0x1053_0004);
        assert!(!beq.modifies_rt());
        let addu = decode_instruction(0x0122_4821); // addu $t1, $t1, $v0
        assert!(addu.modifies_rd());
        let jr = decode_instruction(0x03E0_0008); // jr $ra
        assert!(!jr.modifies_rd());
    }

    #[test]
    fn float_predicates() {
        let lwc1 = decode_instruction(0xC7AC_0020);
        assert!(lwc1.is_float());
        assert!(!lwc1.is_double_float());
        let ldc1 = decode_instruction(0xD7AC_0020);
        assert!(ldc1.is_double_float());
        let add_d = decode_instruction(0x4623_1080); // add.d $f2, $f2, $f3
        assert!(add_d.is_float());
        assert!(add_d.is_double_float());
    }

    #[test]
    fn blank_out_is_idempotent_and_keeps_opcode() {
        let mut instr = decode_instruction(0x2648_1234); // addiu
        let before = instr;
        instr.blank_out();
        assert!(before.same_opcode(&instr));
        assert_eq!(instr.rs(), 0);
        assert_eq!(instr.rt(), 0);
        assert_eq!(instr.immediate(), 0);
        let once = instr.raw();
        instr.blank_out();
        assert_eq!(instr.raw(), once);
    }

    #[test]
    fn blank_out_keeps_regimm_selector() {
        let mut instr = decode_instruction(0x0601_0003); // bgez $s0, +3
        instr.blank_out();
        assert_eq!(instr.mnemonic(), Mnemonic::BGEZ);
        assert_eq!(instr.rt(), 0b00001);
        assert_eq!(instr.rs(), 0);
        assert_eq!(instr.immediate(), 0);
    }

    #[test]
    fn float_names_use_dots() {
        assert_eq!(Mnemonic::ADD_S.name(), "add.s");
        assert_eq!(Mnemonic::C_LE_D.name(), "c.le.d");
        assert_eq!(Mnemonic::CVT_S_W.name(), "cvt.s.w");
        assert_eq!(Mnemonic::DSLL32.name(), "dsll32");
    }
}
