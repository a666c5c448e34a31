//! Static analysis: the shared symbol context and the function analyzer.

pub mod context;
pub mod function;

pub use self::context::{Context, ContextSymbol, FileSection, RelocSymbol, SymbolType};
pub use self::function::Function;
