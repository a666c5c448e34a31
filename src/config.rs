/// Knobs consumed by the analyzer and the emitter.
///
/// Hosts build one of these up front and pass it by reference into every
/// `analyze`/`disassemble` call; there is no global configuration state.
#[derive(Clone, Debug)]
pub struct Config {
    /// When false, a function containing an unknown encoding is downgraded
    /// to raw `.word` data emission instead of being disassembled.
    pub disassemble_unknown_instructions: bool,
    /// Whether the analyzer may create new context symbols (`D_*`) for
    /// discovered addresses.
    pub add_new_symbols: bool,
    /// Blank out instructions that carry resolved pointers (diff mode).
    pub remove_pointers: bool,
    /// Blank out branches too, and suppress label emission (diff mode).
    pub ignore_branches: bool,
    /// Emit the `/* offset vram word */` comment before each line.
    pub asm_comment: bool,
    /// Hex digit width of the file offset inside the comment prefix.
    pub asm_comment_offset_width: usize,
    /// Append `# <index>` after `glabel <name>` for indexed functions.
    pub function_asm_count: bool,
    /// Line terminator for emitted text.
    pub line_ends: &'static str,
    /// Left-justification width for opcode names.
    pub opcode_ljust: usize,
}

impl Default for Config {
    fn default() -> Config {
        return Config {
            disassemble_unknown_instructions: false,
            add_new_symbols: true,
            remove_pointers: false,
            ignore_branches: false,
            asm_comment: true,
            asm_comment_offset_width: 6,
            function_asm_count: true,
            line_ends: "\n",
            opcode_ljust: 7,
        };
    }
}
