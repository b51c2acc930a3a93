use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use indexmap::IndexMap;
use ipkpack_ar::{ArConfig, ArWriter, DEFAULT_FILE_MODE};
use ipkpack_section::{Section, SectionConfig, REGULAR};
use tracing::{debug, info, warn};

use crate::config::BuilderConfig;
use crate::control::ControlSection;
use crate::error::{IpkError, Result};
use crate::metadata::{PackageInfo, PackageMetadata};
use crate::namespace::{Namespace, NamespaceRegistry};
use crate::sniff::file_mode;

/// Finished assets of one namespace, keyed by relative posix path.
pub type Assets = IndexMap<String, Bytes>;

/// Name of the format-version member.
pub const DEBIAN_BINARY_MEMBER: &str = "debian-binary";
/// Name of the control member.
pub const CONTROL_MEMBER: &str = "control.tar.gz";
/// Name of the data member.
pub const DATA_MEMBER: &str = "data.tar.gz";
/// Content of the format-version member.
pub const DEBIAN_BINARY: &str = "2.0\n";

const CONTROL_FILE: &str = "control";
const PACKAGE_INFO_FILE: &str = "packageinfo.json";

/// Accumulates namespace trees and renders the final ipk.
#[derive(Debug, Clone)]
pub struct IpkBuilder {
    config: BuilderConfig,
    timestamp: u64,
    meta: Option<PackageMetadata>,
    namespaces: NamespaceRegistry,
    data: Section,
}

impl IpkBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::with_config(BuilderConfig::default())
    }

    /// Create a builder with explicit configuration.
    pub fn with_config(config: BuilderConfig) -> Self {
        let timestamp = config.timestamp.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });
        Self {
            config,
            timestamp,
            meta: None,
            namespaces: NamespaceRegistry::new(),
            data: Section::new(),
        }
    }

    /// Builder-style metadata setter for a fresh builder.
    pub fn with_metadata(mut self, meta: PackageMetadata) -> Result<Self> {
        self.set_metadata(meta)?;
        Ok(self)
    }

    /// Supply package metadata.
    ///
    /// The id and version are validated here, before anything is rendered.
    /// Setting the same metadata again is a no-op; changing it fails.
    pub fn set_metadata(&mut self, meta: PackageMetadata) -> Result<()> {
        meta.validate()?;
        match &self.meta {
            Some(existing) if *existing != meta => Err(IpkError::MetadataAlreadySet {
                id: existing.id.clone(),
                version: existing.version.clone(),
            }),
            _ => {
                self.meta = Some(meta);
                Ok(())
            }
        }
    }

    pub fn metadata(&self) -> Option<&PackageMetadata> {
        self.meta.as_ref()
    }

    pub fn namespaces(&self) -> &NamespaceRegistry {
        &self.namespaces
    }

    /// Build time stamped on every header.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Add the assets of one namespace under its install root.
    ///
    /// The namespace id and every path are validated and the entries staged
    /// on a copy of the data section, so a rejected call leaves the builder
    /// unchanged.
    pub fn add_entries(&mut self, namespace: &Namespace, assets: &Assets) -> Result<()> {
        namespace.validate()?;
        let normalized = assets
            .iter()
            .map(|(path, content)| Ok((normalize_asset_path(path)?, content)))
            .collect::<Result<Vec<_>>>()?;

        let root = namespace.root();
        let mut data = self.data.clone();
        data.add_directory(&root)?;

        for (path, content) in normalized {
            let mode = if self.config.detect_executables {
                file_mode(content)
            } else {
                REGULAR
            };
            let name = format!("{root}/{path}");
            debug!(path = %name, mode = %format!("{mode:o}"), size = content.len(), "staged asset");
            data.add_file(&name, mode, content.clone())?;
        }

        self.data = data;
        self.namespaces.register(namespace);

        debug!(namespace = %namespace, assets = assets.len(), "added namespace entries");
        Ok(())
    }

    /// Output filename: `{id}_{version}_all.ipk`.
    pub fn filename(&self) -> Result<String> {
        Ok(self.require_metadata()?.default_filename())
    }

    /// Control file for the current metadata.
    pub fn control_section(&self) -> Result<ControlSection> {
        Ok(ControlSection::new(self.require_metadata()?))
    }

    /// `packageinfo.json` for the current metadata and namespaces.
    pub fn package_info(&self) -> Result<PackageInfo> {
        let meta = self.require_metadata()?;
        let app = self.namespaces.app().map(str::to_string);
        if app.is_none() {
            warn!(package = %meta.id, "no app namespace registered; packageinfo.json has no app");
        }
        Ok(PackageInfo {
            id: meta.id.clone(),
            version: meta.version.clone(),
            app,
            services: self.namespaces.services().map(str::to_string).collect(),
        })
    }

    /// Render the complete ipk.
    ///
    /// The builder is not modified, so repeated calls return identical bytes.
    pub fn buffer(&self) -> Result<Bytes> {
        let meta = self.require_metadata()?;
        let section_config = SectionConfig {
            mtime: self.timestamp,
            uid: u64::from(self.config.uid),
            gid: u64::from(self.config.gid),
        };
        let mut ar = ArWriter::with_config(ArConfig {
            timestamp: self.timestamp,
            owner_id: self.config.uid,
            group_id: self.config.gid,
            file_mode: DEFAULT_FILE_MODE,
        });
        ar.append(DEBIAN_BINARY_MEMBER, DEBIAN_BINARY)?;

        let mut control = Section::new();
        control.add_file(CONTROL_FILE, REGULAR, self.control_section()?.render())?;
        ar.append(CONTROL_MEMBER, control.render(&section_config)?)?;

        let mut data = self.data.clone();
        let package_root = meta.package_root();
        data.add_directory(&package_root)?;
        data.add_file(
            &format!("{package_root}/{PACKAGE_INFO_FILE}"),
            REGULAR,
            self.package_info()?.to_json()?,
        )?;
        ar.append(DATA_MEMBER, data.render(&section_config)?)?;

        let buffer = ar.finalize()?;
        info!(
            package = %meta.id,
            version = %meta.version,
            entries = data.len(),
            size = buffer.len(),
            "assembled ipk"
        );
        Ok(buffer)
    }

    fn require_metadata(&self) -> Result<&PackageMetadata> {
        self.meta.as_ref().ok_or(IpkError::MetadataNotSet)
    }
}

impl Default for IpkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_asset_path(path: &str) -> Result<String> {
    let mut trimmed = path;
    while let Some(rest) = trimmed.strip_prefix("./") {
        trimmed = rest;
    }

    let reason = if trimmed.is_empty() {
        Some("path is empty")
    } else if trimmed.starts_with('/') {
        Some("path is absolute")
    } else if trimmed.split('/').any(|segment| segment == "..") {
        Some("path escapes the namespace root")
    } else if trimmed.split('/').any(|segment| segment.is_empty()) {
        Some("path has an empty segment")
    } else if trimmed.split('/').any(|segment| segment == ".") {
        Some("path has a `.` segment")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(IpkError::InvalidAssetPath {
            path: path.to_string(),
            reason,
        }),
        None => Ok(trimmed.to_string()),
    }
}
