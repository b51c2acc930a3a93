use serde::{Deserialize, Serialize};

use crate::error::{IpkError, Result};
use crate::namespace::id_problem;

/// Package identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub id: String,
    pub version: String,
}

impl PackageMetadata {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// `{id}_{version}_all.ipk`.
    pub fn default_filename(&self) -> String {
        format!("{}_{}_all.ipk", self.id, self.version)
    }

    /// Directory holding `packageinfo.json`, e.g. `usr/palm/packages/{id}`.
    pub fn package_root(&self) -> String {
        format!("usr/palm/packages/{}", self.id)
    }

    /// Check that id and version fit a directory name, the control file and
    /// the default file name.
    pub fn validate(&self) -> Result<()> {
        if let Some(reason) = id_problem(&self.id) {
            return Err(IpkError::InvalidPackageId {
                id: self.id.clone(),
                reason,
            });
        }

        let reason = if self.version.is_empty() {
            Some("version is empty")
        } else if self.version.contains(['/', '\\']) {
            Some("version contains a path separator")
        } else if self
            .version
            .chars()
            .any(|c| c.is_whitespace() || c.is_control())
        {
            Some("version contains whitespace or control characters")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(IpkError::InvalidVersion {
                version: self.version.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

/// Contents of `packageinfo.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageInfo {
    pub id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default)]
    pub services: Vec<String>,
}

impl PackageInfo {
    /// Tab-indented JSON, as the webOS package manager writes it.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        to_tab_pretty_json(self)
    }
}

/// Serialize `value` as pretty JSON indented with tabs.
pub fn to_tab_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(out)
}
