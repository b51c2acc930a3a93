/// Errors that can occur while encoding or decoding `ar` archives.
#[derive(Debug, thiserror::Error)]
pub enum ArError {
    /// The member identifier does not fit the 16-byte header field.
    #[error("identifier {identifier:?} too long ({len} bytes, max {max})")]
    IdentifierTooLong {
        identifier: String,
        len: usize,
        max: usize,
    },

    /// A numeric header value does not fit its fixed-width field.
    #[error("{field} value {value} does not fit in {width} bytes")]
    FieldOverflow {
        field: &'static str,
        value: String,
        width: usize,
    },

    /// The archive does not start with `!<arch>\n`.
    #[error("invalid archive magic (expected \"!<arch>\\n\")")]
    InvalidMagic,

    /// A member header field could not be parsed.
    #[error("malformed member header: invalid {field} field")]
    MalformedHeader { field: &'static str },

    /// The archive ended in the middle of a member.
    #[error("archive truncated (incomplete member)")]
    Truncated,

    /// An I/O error occurred while reading an archive.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ArError>;
