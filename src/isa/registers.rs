//! Register name tables for the r4300 and the RSP.
//!
//! All text emission goes through these so that every call site agrees on
//! the O32 spelling of a register.

/// Return address register, alias R31
pub const REG_RA: u8 = 31;

#[rustfmt::skip]
const GPR_NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3",
    "$t0",   "$t1", "$t2", "$t3", "$t4", "$t5", "$t6", "$t7",
    "$s0",   "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7",
    "$t8",   "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

/// Conventional names for the r4300 COP0 registers. The reserved slots
/// keep their raw `$N` spelling.
#[rustfmt::skip]
const COP0_NAMES: [&str; 32] = [
    "Index",       "Random",     "EntryLo0", "EntryLo1",
    "Context",     "PageMask",   "Wired",    "$7",
    "BadVaddr",    "Count",      "EntryHi",  "Compare",
    "Status",      "Cause",      "EPC",      "PRevID",
    "Config",      "LLAddr",     "WatchLo",  "WatchHi",
    "XContext",    "$21",        "$22",      "$23",
    "$24",         "$25",        "ParityError", "CacheError",
    "TagLo",       "TagHi",      "ErrorEPC", "$31",
];

#[rustfmt::skip]
const FPR_NAMES: [&str; 32] = [
    "$f0",  "$f1",  "$f2",  "$f3",  "$f4",  "$f5",  "$f6",  "$f7",
    "$f8",  "$f9",  "$f10", "$f11", "$f12", "$f13", "$f14", "$f15",
    "$f16", "$f17", "$f18", "$f19", "$f20", "$f21", "$f22", "$f23",
    "$f24", "$f25", "$f26", "$f27", "$f28", "$f29", "$f30", "$f31",
];

#[rustfmt::skip]
const RSP_VECTOR_NAMES: [&str; 32] = [
    "$v0",  "$v1",  "$v2",  "$v3",  "$v4",  "$v5",  "$v6",  "$v7",
    "$v8",  "$v9",  "$v10", "$v11", "$v12", "$v13", "$v14", "$v15",
    "$v16", "$v17", "$v18", "$v19", "$v20", "$v21", "$v22", "$v23",
    "$v24", "$v25", "$v26", "$v27", "$v28", "$v29", "$v30", "$v31",
];

/// O32 name of a general purpose register
pub fn gpr_name(idx: u8) -> &'static str {
    return GPR_NAMES[(idx & 0x1F) as usize];
}

/// Conventional name of a COP0 register
pub fn cop0_name(idx: u8) -> &'static str {
    return COP0_NAMES[(idx & 0x1F) as usize];
}

/// Name of a COP1 floating point register
pub fn fpr_name(idx: u8) -> &'static str {
    return FPR_NAMES[(idx & 0x1F) as usize];
}

/// Name of an RSP vector register
pub fn rsp_vector_name(idx: u8) -> &'static str {
    return RSP_VECTOR_NAMES[(idx & 0x1F) as usize];
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn names_follow_o32() {
        assert_eq!(gpr_name(0), "$zero");
        assert_eq!(gpr_name(4), "$a0");
        assert_eq!(gpr_name(29), "$sp");
        assert_eq!(gpr_name(REG_RA), "$ra");
    }

    #[test]
    fn cop0_reserved_slots_stay_numeric() {
        assert_eq!(cop0_name(0), "Index");
        assert_eq!(cop0_name(7), "$7");
        assert_eq!(cop0_name(14), "EPC");
        assert_eq!(cop0_name(21), "$21");
    }
}
