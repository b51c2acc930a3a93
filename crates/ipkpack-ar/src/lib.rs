//! Debian `ar` container encoding for ipk packages.
//!
//! An archive is the 8-byte magic `!<arch>\n` followed by members. Every
//! member carries a fixed 60-byte ASCII header:
//! - identifier (16), modification time (12), owner id (6), group id (6)
//! - file mode (8), content length (10), terminator `` `\n `` (2)
//!
//! Content follows the header and is padded to an even length with `\n`.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_entry, encode_entry, ArEntry, DEFAULT_FILE_MODE, HEADER_SIZE, MAGIC,
    MAX_IDENTIFIER_LEN,
};
pub use error::{ArError, Result};
pub use reader::{read_archive, ArReader};
pub use writer::{ArConfig, ArWriter};
