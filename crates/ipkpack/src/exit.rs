use std::fmt;
use std::io;

use ipkpack_ar::ArError;
use ipkpack_builder::IpkError;
use ipkpack_section::SectionError;

// Exit codes follow sysexits-style semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::NotFound => FAILURE,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn ar_error(context: &str, err: ArError) -> CliError {
    match err {
        ArError::Io(source) => io_error(context, source),
        ArError::IdentifierTooLong { .. } | ArError::FieldOverflow { .. } => {
            CliError::new(INTERNAL, format!("{context}: {err}"))
        }
        other => CliError::new(DATA_INVALID, format!("{context}: {other}")),
    }
}

pub fn section_error(context: &str, err: SectionError) -> CliError {
    match err {
        SectionError::Read(_) | SectionError::PathConflict { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn ipk_error(context: &str, err: IpkError) -> CliError {
    match err {
        IpkError::Archive(err) => ar_error(context, err),
        IpkError::Section(err) => section_error(context, err),
        IpkError::InvalidAssetPath { .. }
        | IpkError::InvalidNamespaceId { .. }
        | IpkError::InvalidPackageId { .. }
        | IpkError::InvalidVersion { .. }
        | IpkError::DuplicateNamespace(_) => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        IpkError::DeadlineExceeded { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        IpkError::ProducerFailed { .. } | IpkError::ProducerDropped(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn deadline_maps_to_timeout() {
        let err = ipk_error(
            "pack failed",
            IpkError::DeadlineExceeded {
                deadline: Duration::from_secs(1),
                pending: vec!["svc".to_string()],
            },
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.contains("svc"));
    }

    #[test]
    fn corrupt_archive_is_data_invalid() {
        let err = ipk_error("inspect failed", IpkError::Archive(ArError::InvalidMagic));
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn rejected_definition_is_data_invalid() {
        let err = ipk_error(
            "invalid definition",
            IpkError::InvalidNamespaceId {
                id: "../etc".to_string(),
                reason: "id contains a path separator",
            },
        );
        assert_eq!(err.code, DATA_INVALID);

        let conflict = SectionError::PathConflict {
            path: "usr/palm/services/svc/lib".to_string(),
            existing: "file",
        };
        let err = ipk_error("pack failed", IpkError::Section(conflict));
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn permission_denied_keeps_its_code() {
        let err = io_error(
            "write failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "nope"),
        );
        assert_eq!(err.code, PERMISSION_DENIED);
        assert_eq!(err.message, "write failed: nope");
    }
}
