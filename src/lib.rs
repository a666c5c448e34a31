//! Disassembler core for N64-era MIPS binaries (r4300 + RSP).
//!
//! The pipeline is: raw big-endian words -> [`isa::decode_instruction`]
//! -> a [`Function`] -> [`Function::analyze`] against a shared
//! [`Context`] -> text via [`Function::disassemble`]. File loading,
//! section management, and ELF handling belong to the host program; this
//! crate only consumes pre-loaded word streams and a pre-seeded context.

pub mod analysis;
pub mod config;
pub mod emit;
pub mod error;
pub mod isa;

pub use self::analysis::context::{Context, ContextSymbol, FileSection, RelocSymbol, SymbolType};
pub use self::analysis::function::Function;
pub use self::config::Config;
pub use self::emit::disassemble_instruction;
pub use self::error::DasmError;
pub use self::isa::decode::decode_instruction;
pub use self::isa::structs::{Instruction, Mnemonic};
