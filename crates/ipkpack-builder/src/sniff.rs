//! File mode inference from content.

use ipkpack_section::{EXECUTABLE, REGULAR};

/// `\x7FELF` read as a big-endian u32.
pub const ELF_MAGIC: u32 = 0x7F45_4C46;

/// `#!` read as a big-endian u16.
pub const SHEBANG_MAGIC: u16 = 0x2321;

/// True for ELF binaries and `#!` scripts.
///
/// Content shorter than four bytes is never executable, even `#!\n`.
pub fn is_executable(content: &[u8]) -> bool {
    let Some(head) = content.first_chunk::<4>() else {
        return false;
    };
    let word = u32::from_be_bytes(*head);
    word == ELF_MAGIC || (word >> 16) as u16 == SHEBANG_MAGIC
}

/// `0755` for executables, `0644` otherwise.
pub fn file_mode(content: &[u8]) -> u32 {
    if is_executable(content) {
        EXECUTABLE
    } else {
        REGULAR
    }
}
