//! Crate error type.
//!
//! Only stream ingestion can fail: the decoder is total, and analysis and
//! emission are infallible on a well-formed `Function`.

use thiserror::Error;

/// Errors produced while turning a raw byte buffer into instruction words.
#[derive(Debug, Error)]
pub enum DasmError {
    /// The buffer cannot be split into whole big-endian words.
    #[error("byte stream of {0} bytes is not a multiple of 4")]
    UnalignedStream(usize),
    /// The load address must be word aligned for branch/label math to hold.
    #[error("vram {0:#010X} is not word aligned")]
    UnalignedVram(u32),
}
