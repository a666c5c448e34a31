//! Instruction set support: decoding, instruction records, register names.

pub mod decode;
pub mod registers;
pub mod structs;

pub use self::decode::decode_instruction;
pub use self::structs::{Instruction, Mnemonic};
