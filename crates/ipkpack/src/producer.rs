//! Directory-backed namespace producers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use ipkpack_builder::{AssetSink, Assets};
use tokio::task::JoinHandle;
use tracing::debug;
use walkdir::WalkDir;

/// Read every regular file under `root` into an asset map keyed by posix path.
///
/// Entries are visited in file-name order so the map, and the archive built
/// from it, does not depend on directory iteration order.
pub fn collect_assets(root: &Path) -> io::Result<Assets> {
    if !fs::metadata(root)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a directory",
        ));
    }

    let mut assets = Assets::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|err| io::Error::other(err.to_string()))?;
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let content = fs::read(entry.path())?;
        assets.insert(key, Bytes::from(content));
    }

    Ok(assets)
}

/// Walk `root` on the blocking pool and report the result through `sink`.
pub fn spawn(sink: AssetSink, root: PathBuf) -> JoinHandle<()> {
    tokio::task::spawn_blocking(move || {
        let namespace = sink.namespace().to_string();
        let reported = match collect_assets(&root) {
            Ok(assets) => {
                debug!(%namespace, assets = assets.len(), root = %root.display(), "collected assets");
                sink.complete(assets)
            }
            Err(err) => sink.fail(format!("{}: {err}", root.display())),
        };
        if let Err(err) = reported {
            debug!(%namespace, error = %err, "producer result discarded");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_nested_files_with_posix_keys() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("js/lib")).unwrap();
        fs::write(dir.path().join("index.html"), "<html>").unwrap();
        fs::write(dir.path().join("js/lib/util.js"), "export {}").unwrap();
        fs::write(dir.path().join("js/app.js"), "main()").unwrap();

        let assets = collect_assets(dir.path()).unwrap();
        let keys: Vec<_> = assets.keys().map(String::as_str).collect();
        assert_eq!(keys, ["index.html", "js/app.js", "js/lib/util.js"]);
        assert_eq!(assets["js/app.js"].as_ref(), b"main()");
    }

    #[test]
    fn empty_directory_yields_no_assets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_assets(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_assets(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn file_root_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let err = collect_assets(&file).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
