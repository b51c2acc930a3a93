use std::io::Read;

use bytes::Bytes;
use flate2::read::GzDecoder;
use tar::{Archive, EntryType};

use crate::error::{Result, SectionError};

/// Kind of a listed tar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
    Other,
}

/// One entry decoded from a rendered section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedEntry {
    /// Archive path without a trailing slash.
    pub path: String,
    pub kind: EntryKind,
    /// Permission bits from the tar header.
    pub mode: u32,
    /// Modification time from the tar header.
    pub mtime: u64,
    pub size: u64,
    pub content: Bytes,
}

/// Decompress and list a gzip-compressed tar section.
pub fn read_section(data: &[u8]) -> Result<Vec<ListedEntry>> {
    let mut archive = Archive::new(GzDecoder::new(data));
    let mut listed = Vec::new();

    for entry in archive.entries().map_err(SectionError::Read)? {
        let mut entry = entry.map_err(SectionError::Read)?;

        let header = entry.header();
        let kind = match header.entry_type() {
            EntryType::Directory => EntryKind::Directory,
            EntryType::Regular => EntryKind::File,
            _ => EntryKind::Other,
        };
        let mode = header.mode().map_err(SectionError::Read)?;
        let mtime = header.mtime().map_err(SectionError::Read)?;
        let size = header.size().map_err(SectionError::Read)?;
        let path = entry
            .path()
            .map_err(SectionError::Read)?
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();

        let mut content = Vec::new();
        entry
            .read_to_end(&mut content)
            .map_err(SectionError::Read)?;

        listed.push(ListedEntry {
            path,
            kind,
            mode,
            mtime,
            size,
            content: Bytes::from(content),
        });
    }

    Ok(listed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_gzip_input() {
        let err = read_section(b"definitely not gzip").unwrap_err();
        assert!(matches!(err, SectionError::Read(_)));
    }
}
