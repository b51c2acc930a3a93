use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ArError, Result};

/// Global archive magic.
pub const MAGIC: &[u8; 8] = b"!<arch>\n";

/// Member header: 16 + 12 + 6 + 6 + 8 + 10 + 2 = 60 bytes.
pub const HEADER_SIZE: usize = 60;

/// Maximum identifier length in bytes.
pub const MAX_IDENTIFIER_LEN: usize = 16;

/// Regular file, `rw-r--r--`. Written as octal digits (`100644`).
pub const DEFAULT_FILE_MODE: u32 = 0o100644;

const TERMINATOR: &[u8; 2] = b"`\n";
const PAD: u8 = b'\n';

const TIMESTAMP_WIDTH: usize = 12;
const OWNER_WIDTH: usize = 6;
const GROUP_WIDTH: usize = 6;
const MODE_WIDTH: usize = 8;
const SIZE_WIDTH: usize = 10;

/// One archive member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArEntry {
    /// Member name, at most 16 bytes.
    pub identifier: String,
    /// Modification time in seconds since the epoch.
    pub timestamp: u64,
    /// Owner id.
    pub owner_id: u32,
    /// Group id.
    pub group_id: u32,
    /// Unix file mode.
    pub file_mode: u32,
    /// Member content.
    pub content: Bytes,
}

impl ArEntry {
    /// Create a member owned by root with the default file mode.
    ///
    /// Fails with [`ArError::IdentifierTooLong`] if the identifier does not
    /// fit the header field.
    pub fn new(identifier: impl Into<String>, content: impl Into<Bytes>) -> Result<Self> {
        let identifier = identifier.into();
        if identifier.len() > MAX_IDENTIFIER_LEN {
            return Err(ArError::IdentifierTooLong {
                len: identifier.len(),
                identifier,
                max: MAX_IDENTIFIER_LEN,
            });
        }

        Ok(Self {
            identifier,
            timestamp: 0,
            owner_id: 0,
            group_id: 0,
            file_mode: DEFAULT_FILE_MODE,
            content: content.into(),
        })
    }

    /// Number of `\n` bytes appended after the content.
    pub fn padding(&self) -> usize {
        self.content.len() % 2
    }

    /// The total wire size of this member (header + content + padding).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.content.len() + self.padding()
    }
}

/// Encode one member (header, content and padding) into `dst`.
///
/// Wire format:
/// ```text
/// ┌────────────┬───────────┬───────┬───────┬──────┬──────────┬──────┬─────────┬─────┐
/// │ Identifier │ Timestamp │ Owner │ Group │ Mode │ Size     │ "`\n" │ Content │ Pad │
/// │ (16B)      │ (12B)     │ (6B)  │ (6B)  │ (8B) │ (10B)    │ (2B)  │         │ 0/1 │
/// └────────────┴───────────┴───────┴───────┴──────┴──────────┴──────┴─────────┴─────┘
/// ```
/// Fields are ASCII, left-justified and padded with spaces. The mode is octal.
pub fn encode_entry(entry: &ArEntry, dst: &mut BytesMut) -> Result<()> {
    if entry.identifier.len() > MAX_IDENTIFIER_LEN {
        return Err(ArError::IdentifierTooLong {
            identifier: entry.identifier.clone(),
            len: entry.identifier.len(),
            max: MAX_IDENTIFIER_LEN,
        });
    }

    let mut header = [b' '; HEADER_SIZE];
    let mut offset = 0usize;
    put_field(&mut header, &mut offset, "identifier", &entry.identifier, MAX_IDENTIFIER_LEN)?;
    put_field(
        &mut header,
        &mut offset,
        "timestamp",
        &entry.timestamp.to_string(),
        TIMESTAMP_WIDTH,
    )?;
    put_field(
        &mut header,
        &mut offset,
        "owner id",
        &entry.owner_id.to_string(),
        OWNER_WIDTH,
    )?;
    put_field(
        &mut header,
        &mut offset,
        "group id",
        &entry.group_id.to_string(),
        GROUP_WIDTH,
    )?;
    put_field(
        &mut header,
        &mut offset,
        "file mode",
        &format!("{:o}", entry.file_mode),
        MODE_WIDTH,
    )?;
    put_field(
        &mut header,
        &mut offset,
        "size",
        &entry.content.len().to_string(),
        SIZE_WIDTH,
    )?;
    header[offset..].copy_from_slice(TERMINATOR);

    dst.reserve(entry.wire_size());
    dst.put_slice(&header);
    dst.put_slice(&entry.content);
    if entry.padding() == 1 {
        dst.put_u8(PAD);
    }
    Ok(())
}

fn put_field(
    header: &mut [u8; HEADER_SIZE],
    offset: &mut usize,
    field: &'static str,
    value: &str,
    width: usize,
) -> Result<()> {
    if value.len() > width {
        return Err(ArError::FieldOverflow {
            field,
            value: value.to_string(),
            width,
        });
    }
    header[*offset..*offset + value.len()].copy_from_slice(value.as_bytes());
    *offset += width;
    Ok(())
}

/// Decode one member from a buffer positioned after the archive magic.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete member yet.
/// On success, consumes the member bytes (including padding) from the buffer.
pub fn decode_entry(src: &mut BytesMut) -> Result<Option<ArEntry>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    if &src[HEADER_SIZE - TERMINATOR.len()..HEADER_SIZE] != TERMINATOR {
        return Err(ArError::MalformedHeader {
            field: "terminator",
        });
    }

    let mut offset = 0usize;
    let identifier = take_field(src, &mut offset, MAX_IDENTIFIER_LEN, "identifier")?.to_string();
    let timestamp = parse_decimal(take_field(src, &mut offset, TIMESTAMP_WIDTH, "timestamp")?)
        .ok_or(ArError::MalformedHeader { field: "timestamp" })?;
    let owner_id = parse_decimal(take_field(src, &mut offset, OWNER_WIDTH, "owner id")?)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(ArError::MalformedHeader { field: "owner id" })?;
    let group_id = parse_decimal(take_field(src, &mut offset, GROUP_WIDTH, "group id")?)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or(ArError::MalformedHeader { field: "group id" })?;
    let file_mode = u32::from_str_radix(take_field(src, &mut offset, MODE_WIDTH, "file mode")?, 8)
        .map_err(|_| ArError::MalformedHeader { field: "file mode" })?;
    let size = parse_decimal(take_field(src, &mut offset, SIZE_WIDTH, "size")?)
        .and_then(|v| usize::try_from(v).ok())
        .ok_or(ArError::MalformedHeader { field: "size" })?;

    let total = HEADER_SIZE + size + size % 2;
    if src.len() < total {
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let content = src.split_to(size).freeze();
    src.advance(size % 2);

    Ok(Some(ArEntry {
        identifier,
        timestamp,
        owner_id,
        group_id,
        file_mode,
        content,
    }))
}

fn take_field<'a>(
    src: &'a [u8],
    offset: &mut usize,
    width: usize,
    field: &'static str,
) -> Result<&'a str> {
    let raw = &src[*offset..*offset + width];
    *offset += width;
    std::str::from_utf8(raw)
        .map(|s| s.trim_end_matches(' '))
        .map_err(|_| ArError::MalformedHeader { field })
}

fn parse_decimal(field: &str) -> Option<u64> {
    field.parse().ok()
}
