use bytes::Bytes;

/// One entry of a tar section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionEntry {
    /// A directory marker.
    Directory { path: String },
    /// A regular file with explicit permission bits.
    File {
        path: String,
        mode: u32,
        content: Bytes,
    },
}

impl SectionEntry {
    /// Archive path of this entry.
    pub fn path(&self) -> &str {
        match self {
            Self::Directory { path } | Self::File { path, .. } => path,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}
