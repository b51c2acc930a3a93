//! Gzip-compressed tar sections for ipk packages.
//!
//! A [`Section`] is an ordered list of directories and files. Directories are
//! synthesized for every ancestor of an added path and emitted at most once.
//! Rendering produces a tar stream compressed at the best gzip level with a
//! zeroed gzip timestamp.

pub mod entry;
pub mod error;
pub mod mode;
pub mod reader;
pub mod section;
pub mod tree;

pub use entry::SectionEntry;
pub use error::{Result, SectionError};
pub use mode::{DIRECTORY, EXECUTABLE, REGULAR};
pub use reader::{read_section, EntryKind, ListedEntry};
pub use section::{Section, SectionConfig};
pub use tree::{ancestors, DirectoryTree};
