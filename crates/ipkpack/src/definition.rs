//! Package definition files consumed by `ipkpack pack`.

use std::fs;
use std::path::{Path, PathBuf};

use ipkpack_builder::{Namespace, PackageMetadata};
use serde::Deserialize;
use serde_json::Value;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, INTERNAL};

const DEFINITION_SCHEMA: &str = include_str!("../schema/definition.schema.json");

#[derive(Debug, Clone, Deserialize)]
pub struct Definition {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub options: PackOptions,
    pub app: NamespaceSource,
    #[serde(default)]
    pub services: Vec<NamespaceSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackOptions {
    pub filename: Option<String>,
    /// Sniff ELF and shebang files and mark them executable. Default: on.
    pub set_executable_bit: Option<bool>,
    #[serde(default)]
    pub emit_manifest: bool,
    pub manifest: Option<ManifestOptions>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestOptions {
    pub title: String,
    pub description: Option<String>,
    pub icon_url: String,
    pub source_url: String,
    pub root_required: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// A namespace id and the directory its assets are read from.
#[derive(Debug, Clone, Deserialize)]
pub struct NamespaceSource {
    pub id: String,
    pub path: PathBuf,
}

impl Definition {
    pub fn metadata(&self) -> PackageMetadata {
        PackageMetadata::new(&self.id, &self.version)
    }

    /// Namespaces in registration order, app first, with their directories
    /// resolved against `base`.
    pub fn namespaces(&self, base: &Path) -> Vec<(Namespace, PathBuf)> {
        std::iter::once((Namespace::app(&self.app.id), &self.app.path))
            .chain(
                self.services
                    .iter()
                    .map(|service| (Namespace::service(&service.id), &service.path)),
            )
            .map(|(namespace, path)| (namespace, base.join(path)))
            .collect()
    }
}

/// Read, validate and parse a definition file.
pub fn load(path: &Path) -> CliResult<Definition> {
    let raw = fs::read(path)
        .map_err(|err| io_error(&format!("failed to read {}", path.display()), err))?;
    let value: Value = serde_json::from_slice(&raw).map_err(|err| {
        CliError::new(
            DATA_INVALID,
            format!("{} is not valid JSON: {err}", path.display()),
        )
    })?;
    parse(value)
}

pub fn parse(value: Value) -> CliResult<Definition> {
    validate(&value)?;
    serde_json::from_value(value)
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid definition: {err}")))
}

fn validate(value: &Value) -> CliResult<()> {
    let schema: Value = serde_json::from_str(DEFINITION_SCHEMA).map_err(|err| {
        CliError::new(INTERNAL, format!("embedded definition schema: {err}"))
    })?;
    let validator = jsonschema::validator_for(&schema).map_err(|err| {
        CliError::new(
            INTERNAL,
            format!("failed to compile definition schema: {err}"),
        )
    })?;

    let mut errors = validator.iter_errors(value);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(3) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(CliError::new(
            DATA_INVALID,
            format!("invalid definition: {message}"),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use ipkpack_builder::NamespaceKind;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_minimal_definition() {
        let definition = parse(json!({
            "id": "com.example.app",
            "version": "1.0.0",
            "app": { "id": "com.example.app", "path": "dist" }
        }))
        .unwrap();

        assert_eq!(definition.metadata().default_filename(), "com.example.app_1.0.0_all.ipk");
        assert!(definition.services.is_empty());
        assert!(!definition.options.emit_manifest);
        assert_eq!(definition.options.set_executable_bit, None);
    }

    #[test]
    fn namespaces_resolve_against_base() {
        let definition = parse(json!({
            "id": "com.example.app",
            "version": "1.0.0",
            "app": { "id": "com.example.app", "path": "app" },
            "services": [
                { "id": "com.example.app.one", "path": "svc/one" },
                { "id": "com.example.app.two", "path": "/abs/two" }
            ]
        }))
        .unwrap();

        let namespaces = definition.namespaces(Path::new("/work"));
        assert_eq!(namespaces.len(), 3);
        assert_eq!(namespaces[0].0.kind, NamespaceKind::App);
        assert_eq!(namespaces[0].1, PathBuf::from("/work/app"));
        assert_eq!(namespaces[1].0.id, "com.example.app.one");
        assert_eq!(namespaces[1].1, PathBuf::from("/work/svc/one"));
        assert_eq!(namespaces[2].1, PathBuf::from("/abs/two"));
    }

    #[test]
    fn rejects_missing_app() {
        let err = parse(json!({ "id": "com.example.app", "version": "1.0.0" })).unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn rejects_unknown_options() {
        let err = parse(json!({
            "id": "com.example.app",
            "version": "1.0.0",
            "options": { "compress": false },
            "app": { "id": "com.example.app", "path": "dist" }
        }))
        .unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn emit_manifest_requires_manifest() {
        let err = parse(json!({
            "id": "com.example.app",
            "version": "1.0.0",
            "options": { "emitManifest": true },
            "app": { "id": "com.example.app", "path": "dist" }
        }))
        .unwrap_err();
        assert_eq!(err.code, DATA_INVALID);
    }

    #[test]
    fn parses_manifest_options() {
        let definition = parse(json!({
            "id": "com.example.app",
            "version": "1.0.0",
            "options": {
                "emitManifest": true,
                "setExecutableBit": false,
                "manifest": {
                    "title": "Example",
                    "iconUrl": "icon.png",
                    "sourceUrl": "https://example.com/src",
                    "type": "web"
                }
            },
            "app": { "id": "com.example.app", "path": "dist" }
        }))
        .unwrap();

        let manifest = definition.options.manifest.unwrap();
        assert_eq!(manifest.title, "Example");
        assert_eq!(manifest.kind.as_deref(), Some("web"));
        assert_eq!(definition.options.set_executable_bit, Some(false));
    }
}
