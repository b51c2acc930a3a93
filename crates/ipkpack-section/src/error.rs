/// Errors that can occur while rendering or reading a section.
#[derive(Debug, thiserror::Error)]
pub enum SectionError {
    /// Writing a tar header or entry failed.
    #[error("tar encoding failed for {path}: {source}")]
    Tar {
        path: String,
        source: std::io::Error,
    },

    /// A path was staged both as a file and as a directory, or as a file
    /// twice.
    #[error("{path} is already staged as a {existing}")]
    PathConflict {
        path: String,
        existing: &'static str,
    },

    /// Finishing the tar stream or the gzip stream failed.
    #[error("gzip compression failed: {0}")]
    Gzip(std::io::Error),

    /// Decompressing or parsing a section failed.
    #[error("failed to read section: {0}")]
    Read(std::io::Error),
}

pub type Result<T> = std::result::Result<T, SectionError>;
