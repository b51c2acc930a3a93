//! App-store manifest written next to the package.

use ipkpack_builder::to_tab_pretty_json;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::definition::Definition;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<'a> {
    pub id: &'a str,
    pub version: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'a str>,
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_description: Option<&'a str>,
    pub icon_url: &'a str,
    pub source_uri: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_required: Option<bool>,
    pub ipk_url: &'a str,
    pub ipk_hash: IpkHash,
}

#[derive(Debug, Serialize)]
pub struct IpkHash {
    pub sha256: String,
}

/// Lowercase hex SHA-256 of the package bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

impl<'a> Manifest<'a> {
    /// Build the manifest when the definition asks for one.
    pub fn from_definition(
        definition: &'a Definition,
        ipk_url: &'a str,
        package: &[u8],
    ) -> Option<Self> {
        if !definition.options.emit_manifest {
            return None;
        }
        let options = definition.options.manifest.as_ref()?;

        Some(Self {
            id: &definition.id,
            version: &definition.version,
            kind: options.kind.as_deref(),
            title: &options.title,
            app_description: options.description.as_deref(),
            icon_url: &options.icon_url,
            source_uri: &options.source_url,
            root_required: options.root_required,
            ipk_url,
            ipk_hash: IpkHash {
                sha256: sha256_hex(package),
            },
        })
    }

    pub fn filename(&self) -> String {
        format!("{}.manifest.json", self.id)
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        to_tab_pretty_json(self)
    }
}
