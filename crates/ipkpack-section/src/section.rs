use std::collections::HashSet;
use std::io::Write;

use bytes::Bytes;
use flate2::{Compression, GzBuilder};
use tar::{Builder, EntryType, Header};
use tracing::{debug, warn};

use crate::entry::SectionEntry;
use crate::error::{Result, SectionError};
use crate::mode::DIRECTORY;
use crate::tree::{ancestors, DirectoryTree};

/// Header values stamped on every tar entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectionConfig {
    /// Modification time in seconds since the epoch. Default: 0.
    pub mtime: u64,
    /// Owner id. Default: 0.
    pub uid: u64,
    /// Group id. Default: 0.
    pub gid: u64,
}

/// An ordered tar section with idempotent directory synthesis.
#[derive(Debug, Clone, Default)]
pub struct Section {
    entries: Vec<SectionEntry>,
    tree: DirectoryTree,
    files: HashSet<String>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `dir` and every ancestor that has not been emitted yet.
    ///
    /// Fails without staging anything if `dir` or one of its ancestors is
    /// already a file.
    pub fn add_directory(&mut self, dir: &str) -> Result<()> {
        if let Some(path) = ancestors(dir).into_iter().find(|p| self.files.contains(p)) {
            warn!(path = %path, directory = %dir, "directory collides with a staged file");
            return Err(SectionError::PathConflict {
                path,
                existing: "file",
            });
        }

        for path in self.tree.insert(dir) {
            debug!(path = %path, "synthesized directory");
            self.entries.push(SectionEntry::Directory { path });
        }
        Ok(())
    }

    /// Add a file, preceded by any missing parent directories.
    ///
    /// A path that is already a directory or a file is rejected.
    pub fn add_file(&mut self, path: &str, mode: u32, content: impl Into<Bytes>) -> Result<()> {
        let existing = if self.tree.contains(path) {
            Some("directory")
        } else if self.files.contains(path) {
            Some("file")
        } else {
            None
        };
        if let Some(existing) = existing {
            warn!(path = %path, existing, "file collides with a staged entry");
            return Err(SectionError::PathConflict {
                path: path.to_string(),
                existing,
            });
        }

        if let Some((parent, _)) = path.rsplit_once('/') {
            self.add_directory(parent)?;
        }
        self.files.insert(path.to_string());
        self.entries.push(SectionEntry::File {
            path: path.to_string(),
            mode,
            content: content.into(),
        });
        Ok(())
    }

    /// Entries in emission order.
    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }

    /// Directories emitted so far.
    pub fn directories(&self) -> &DirectoryTree {
        &self.tree
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the section into a gzip-compressed tar stream.
    ///
    /// Output is a pure function of the entries and `config`.
    pub fn render(&self, config: &SectionConfig) -> Result<Bytes> {
        let encoder = GzBuilder::new()
            .mtime(0)
            .write(Vec::new(), Compression::best());
        let mut builder = Builder::new(encoder);

        for entry in &self.entries {
            append_entry(&mut builder, entry, config)?;
        }

        let encoder = builder.into_inner().map_err(SectionError::Gzip)?;
        let compressed = encoder.finish().map_err(SectionError::Gzip)?;
        debug!(
            entries = self.entries.len(),
            size = compressed.len(),
            "rendered section"
        );
        Ok(Bytes::from(compressed))
    }
}

fn append_entry<W: Write>(
    builder: &mut Builder<W>,
    entry: &SectionEntry,
    config: &SectionConfig,
) -> Result<()> {
    let mut header = Header::new_gnu();
    header.set_mtime(config.mtime);
    header.set_uid(config.uid);
    header.set_gid(config.gid);

    let result = match entry {
        SectionEntry::Directory { path } => {
            header.set_entry_type(EntryType::Directory);
            header.set_mode(DIRECTORY);
            header.set_size(0);
            builder.append_data(&mut header, path, std::io::empty())
        }
        SectionEntry::File {
            path,
            mode,
            content,
        } => {
            header.set_entry_type(EntryType::Regular);
            header.set_mode(*mode);
            header.set_size(content.len() as u64);
            builder.append_data(&mut header, path, content.as_ref())
        }
    };

    result.map_err(|source| SectionError::Tar {
        path: entry.path().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::{EXECUTABLE, REGULAR};
    use crate::reader::{read_section, EntryKind};

    #[test]
    fn files_imply_parent_directories_once() {
        let mut section = Section::new();
        section.add_file("usr/palm/a.js", REGULAR, "a").unwrap();
        section.add_file("usr/palm/b.js", REGULAR, "b").unwrap();
        section.add_file("usr/palm/lib/c.js", REGULAR, "c").unwrap();

        let paths: Vec<_> = section.entries().iter().map(SectionEntry::path).collect();
        assert_eq!(
            paths,
            [
                "usr",
                "usr/palm",
                "usr/palm/a.js",
                "usr/palm/b.js",
                "usr/palm/lib",
                "usr/palm/lib/c.js",
            ]
        );
    }

    #[test]
    fn top_level_file_has_no_directories() {
        let mut section = Section::new();
        section.add_file("control", REGULAR, "Package: x\n").unwrap();

        assert_eq!(section.len(), 1);
        assert!(section.directories().is_empty());
    }

    #[test]
    fn render_round_trips_through_tar() {
        let mut section = Section::new();
        section.add_directory("opt/app").unwrap();
        section.add_file("opt/app/run", EXECUTABLE, "#!/bin/sh\n").unwrap();
        section.add_file("opt/app/data.txt", REGULAR, "hello").unwrap();

        let rendered = section
            .render(&SectionConfig {
                mtime: 1_234,
                ..SectionConfig::default()
            })
            .unwrap();
        let listed = read_section(&rendered).unwrap();

        let summary: Vec<_> = listed
            .iter()
            .map(|e| (e.path.as_str(), e.kind, e.mode))
            .collect();
        assert_eq!(
            summary,
            [
                ("opt", EntryKind::Directory, DIRECTORY),
                ("opt/app", EntryKind::Directory, DIRECTORY),
                ("opt/app/run", EntryKind::File, EXECUTABLE),
                ("opt/app/data.txt", EntryKind::File, REGULAR),
            ]
        );
        assert_eq!(listed[3].content.as_ref(), b"hello");
        assert!(listed.iter().all(|e| e.mtime == 1_234));
    }

    #[test]
    fn render_is_deterministic() {
        let mut section = Section::new();
        section.add_file("a/b", REGULAR, "content").unwrap();

        let config = SectionConfig::default();
        assert_eq!(
            section.render(&config).unwrap(),
            section.render(&config).unwrap()
        );
    }

    #[test]
    fn gzip_header_timestamp_is_zeroed() {
        let mut section = Section::new();
        section.add_file("f", REGULAR, "x").unwrap();

        let rendered = section.render(&SectionConfig::default()).unwrap();
        assert_eq!(&rendered[..2], &[0x1fu8, 0x8b]);
        assert_eq!(&rendered[4..8], &[0u8; 4]);
    }

    #[test]
    fn file_over_directory_is_rejected() {
        let mut section = Section::new();
        section.add_file("app/lib/a.js", REGULAR, "a").unwrap();

        let err = section.add_file("app/lib", REGULAR, "x").unwrap_err();
        assert!(matches!(
            err,
            SectionError::PathConflict { ref path, existing: "directory" } if path == "app/lib"
        ));
        assert_eq!(section.len(), 3);
    }

    #[test]
    fn directory_under_file_is_rejected() {
        let mut section = Section::new();
        section.add_file("app/lib", REGULAR, "x").unwrap();

        let err = section.add_file("app/lib/a.js", REGULAR, "a").unwrap_err();
        assert!(matches!(
            err,
            SectionError::PathConflict { ref path, existing: "file" } if path == "app/lib"
        ));
        assert!(section.add_directory("app/lib/sub").is_err());
        assert!(!section.directories().contains("app/lib"));
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn duplicate_file_is_rejected() {
        let mut section = Section::new();
        section.add_file("a/b", REGULAR, "1").unwrap();

        let err = section.add_file("a/b", REGULAR, "2").unwrap_err();
        assert!(matches!(err, SectionError::PathConflict { existing: "file", .. }));
        assert_eq!(section.len(), 2);
    }

    #[test]
    fn long_paths_survive_rendering() {
        let long = format!("usr/palm/applications/{}/main.js", "x".repeat(120));
        let mut section = Section::new();
        section.add_file(&long, REGULAR, "1").unwrap();

        let listed = read_section(&section.render(&SectionConfig::default()).unwrap()).unwrap();
        assert_eq!(listed.last().map(|e| e.path.as_str()), Some(long.as_str()));
    }
}
