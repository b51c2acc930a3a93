use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::codec::{encode_entry, ArEntry, DEFAULT_FILE_MODE, MAGIC};
use crate::error::Result;

/// Header values stamped on every appended member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArConfig {
    /// Modification time in seconds since the epoch. Default: now.
    pub timestamp: u64,
    /// Owner id. Default: 0.
    pub owner_id: u32,
    /// Group id. Default: 0.
    pub group_id: u32,
    /// File mode. Default: `0o100644`.
    pub file_mode: u32,
}

impl Default for ArConfig {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            owner_id: 0,
            group_id: 0,
            file_mode: DEFAULT_FILE_MODE,
        }
    }
}

/// Collects members in order and encodes them into one archive buffer.
#[derive(Debug, Clone)]
pub struct ArWriter {
    entries: Vec<ArEntry>,
    config: ArConfig,
}

impl ArWriter {
    /// Create a new archive writer with default configuration.
    pub fn new() -> Self {
        Self::with_config(ArConfig::default())
    }

    /// Create a new archive writer with explicit configuration.
    pub fn with_config(config: ArConfig) -> Self {
        Self {
            entries: Vec::new(),
            config,
        }
    }

    /// Record one member.
    ///
    /// The identifier is checked here, so an oversized name fails before
    /// anything is encoded.
    pub fn append(&mut self, identifier: &str, content: impl Into<Bytes>) -> Result<()> {
        let mut entry = ArEntry::new(identifier, content)?;
        entry.timestamp = self.config.timestamp;
        entry.owner_id = self.config.owner_id;
        entry.group_id = self.config.group_id;
        entry.file_mode = self.config.file_mode;

        debug!(identifier, size = entry.content.len(), "appended ar member");
        self.entries.push(entry);
        Ok(())
    }

    /// Encode the magic and every member into the final buffer.
    pub fn finalize(&self) -> Result<Bytes> {
        let size = MAGIC.len() + self.entries.iter().map(ArEntry::wire_size).sum::<usize>();
        let mut buf = BytesMut::with_capacity(size);
        buf.extend_from_slice(MAGIC);
        for entry in &self.entries {
            encode_entry(entry, &mut buf)?;
        }
        Ok(buf.freeze())
    }

    /// Members recorded so far, in order.
    pub fn entries(&self) -> &[ArEntry] {
        &self.entries
    }

    /// Current writer configuration.
    pub fn config(&self) -> &ArConfig {
        &self.config
    }
}

impl Default for ArWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::HEADER_SIZE;
    use crate::error::ArError;
    use crate::reader::read_archive;

    fn fixed_config() -> ArConfig {
        ArConfig {
            timestamp: 1_600_000_000,
            ..ArConfig::default()
        }
    }

    #[test]
    fn empty_archive_is_magic_only() {
        let writer = ArWriter::with_config(fixed_config());
        assert_eq!(writer.finalize().unwrap().as_ref(), MAGIC);
    }

    #[test]
    fn write_single_member() {
        let mut writer = ArWriter::with_config(fixed_config());
        writer.append("debian-binary", "2.0\n").unwrap();

        let buf = writer.finalize().unwrap();
        assert_eq!(buf.len(), MAGIC.len() + HEADER_SIZE + 4);
        assert_eq!(&buf[..MAGIC.len()], MAGIC);
    }

    #[test]
    fn long_identifier_fails_before_any_member_is_recorded() {
        let mut writer = ArWriter::with_config(fixed_config());
        let err = writer
            .append("seventeen-chars!!", "payload")
            .unwrap_err();

        assert!(matches!(err, ArError::IdentifierTooLong { .. }));
        assert!(writer.entries().is_empty());
        assert_eq!(writer.finalize().unwrap().as_ref(), MAGIC);
    }

    #[test]
    fn members_keep_append_order_and_config() {
        let mut writer = ArWriter::with_config(fixed_config());
        writer.append("debian-binary", "2.0\n").unwrap();
        writer.append("control.tar.gz", vec![1u8, 2, 3]).unwrap();
        writer.append("data.tar.gz", vec![4u8, 5]).unwrap();

        let entries = read_archive(writer.finalize().unwrap().as_ref()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(names, ["debian-binary", "control.tar.gz", "data.tar.gz"]);
        assert!(entries.iter().all(|e| e.timestamp == 1_600_000_000));
        assert_eq!(entries[1].content.as_ref(), &[1u8, 2, 3]);
        assert_eq!(entries[2].content.as_ref(), &[4u8, 5]);
    }

    #[test]
    fn finalize_is_repeatable() {
        let mut writer = ArWriter::with_config(fixed_config());
        writer.append("a", "odd").unwrap();

        assert_eq!(writer.finalize().unwrap(), writer.finalize().unwrap());
    }
}
