use std::io::{ErrorKind, Read};

use bytes::{Buf, BytesMut};

use crate::codec::{decode_entry, ArEntry, MAGIC};
use crate::error::{ArError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads archive members from any `Read` stream.
///
/// The magic is checked before the first member is returned.
pub struct ArReader<T> {
    inner: T,
    buf: BytesMut,
    magic_checked: bool,
    eof: bool,
}

impl<T: Read> ArReader<T> {
    /// Create a new archive reader.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            magic_checked: false,
            eof: false,
        }
    }

    /// Read the next member.
    ///
    /// Returns `Ok(None)` at a clean end of archive and
    /// `Err(ArError::Truncated)` if the stream stops inside a member.
    pub fn read_entry(&mut self) -> Result<Option<ArEntry>> {
        loop {
            if !self.magic_checked {
                if self.buf.len() >= MAGIC.len() {
                    if &self.buf[..MAGIC.len()] != MAGIC {
                        return Err(ArError::InvalidMagic);
                    }
                    self.buf.advance(MAGIC.len());
                    self.magic_checked = true;
                    continue;
                }
            } else if let Some(entry) = decode_entry(&mut self.buf)? {
                return Ok(Some(entry));
            }

            if self.eof {
                if !self.magic_checked {
                    return Err(ArError::InvalidMagic);
                }
                if self.buf.is_empty() {
                    return Ok(None);
                }
                return Err(ArError::Truncated);
            }

            self.fill()?;
        }
    }

    /// Read every remaining member.
    pub fn read_all(mut self) -> Result<Vec<ArEntry>> {
        let mut entries = Vec::new();
        while let Some(entry) = self.read_entry()? {
            entries.push(entry);
        }
        Ok(entries)
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn fill(&mut self) -> Result<()> {
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(());
                }
                Ok(n) => {
                    self.buf.extend_from_slice(&chunk[..n]);
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(ArError::Io(err)),
            }
        }
    }
}

/// Decode a complete in-memory archive.
pub fn read_archive(data: &[u8]) -> Result<Vec<ArEntry>> {
    ArReader::new(data).read_all()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::codec::HEADER_SIZE;
    use crate::writer::{ArConfig, ArWriter};

    fn archive(members: &[(&str, &'static [u8])]) -> Vec<u8> {
        let mut writer = ArWriter::with_config(ArConfig {
            timestamp: 42,
            ..ArConfig::default()
        });
        for (name, content) in members {
            writer.append(name, *content).unwrap();
        }
        writer.finalize().unwrap().to_vec()
    }

    #[test]
    fn reads_members_in_order() {
        let data = archive(&[("first", b"one"), ("second", b"two!")]);
        let entries = read_archive(&data).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].identifier, "first");
        assert_eq!(entries[0].content.as_ref(), b"one");
        assert_eq!(entries[1].identifier, "second");
        assert_eq!(entries[1].content.as_ref(), b"two!");
    }

    #[test]
    fn empty_archive_has_no_members() {
        assert!(read_archive(MAGIC).unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_magic() {
        let err = read_archive(b"!<arcx>\nrest").unwrap_err();
        assert!(matches!(err, ArError::InvalidMagic));
    }

    #[test]
    fn rejects_short_input() {
        let err = read_archive(b"!<a").unwrap_err();
        assert!(matches!(err, ArError::InvalidMagic));
    }

    #[test]
    fn truncated_member_is_reported() {
        let mut data = archive(&[("member", b"payload")]);
        data.truncate(MAGIC.len() + HEADER_SIZE + 3);

        let err = read_archive(&data).unwrap_err();
        assert!(matches!(err, ArError::Truncated));
    }

    #[test]
    fn missing_final_pad_is_truncation() {
        let mut data = archive(&[("odd", b"abc")]);
        data.pop();

        let err = read_archive(&data).unwrap_err();
        assert!(matches!(err, ArError::Truncated));
    }

    #[test]
    fn reads_across_small_chunks() {
        struct OneByte(Cursor<Vec<u8>>);

        impl Read for OneByte {
            fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
                let len = buf.len().min(1);
                self.0.read(&mut buf[..len])
            }
        }

        let data = archive(&[("a", b"xyz"), ("b", b"")]);
        let entries = ArReader::new(OneByte(Cursor::new(data))).read_all().unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].content.as_ref(), b"xyz");
        assert!(entries[1].content.is_empty());
    }
}
