use std::fs;
use std::path::Path;
use std::time::Duration;

use ipkpack_builder::{Aggregator, AggregatorConfig, BuilderConfig, IpkBuilder};
use serde::Serialize;
use tracing::info;

use crate::cmd::PackArgs;
use crate::definition::{self, Definition};
use crate::exit::{io_error, ipk_error, CliError, CliResult, INTERNAL, SUCCESS, USAGE};
use crate::manifest::{sha256_hex, Manifest};
use crate::output::{print_json, table, OutputFormat};
use crate::producer;

#[derive(Serialize)]
struct PackOutput {
    package: String,
    version: String,
    path: String,
    size: usize,
    sha256: String,
    namespaces: Vec<String>,
    manifest: Option<String>,
}

pub fn run(args: PackArgs, format: OutputFormat) -> CliResult<i32> {
    let definition = definition::load(&args.definition)?;
    let base = args
        .definition
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let deadline = args.timeout.as_deref().map(parse_timeout).transpose()?;

    let config = BuilderConfig {
        timestamp: args.source_date_epoch,
        detect_executables: definition.options.set_executable_bit.unwrap_or(true),
        ..BuilderConfig::default()
    };
    let mut builder = IpkBuilder::with_config(config)
        .with_metadata(definition.metadata())
        .map_err(|err| ipk_error("invalid definition", err))?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|err| io_error("failed to start runtime", err))?;
    let joined = runtime.block_on(join_producers(&definition, base, deadline, &mut builder));
    // Producers still walking after a failed join are abandoned.
    runtime.shutdown_background();
    joined?;

    let buffer = builder
        .buffer()
        .map_err(|err| ipk_error("failed to render package", err))?;

    let filename = match args.filename.or_else(|| definition.options.filename.clone()) {
        Some(name) => name,
        None => builder
            .filename()
            .map_err(|err| ipk_error("failed to name package", err))?,
    };
    if filename.contains(['/', '\\']) {
        return Err(CliError::new(
            USAGE,
            format!("output filename must not contain a path separator: {filename}"),
        ));
    }

    fs::create_dir_all(&args.out_dir).map_err(|err| {
        io_error(&format!("failed to create {}", args.out_dir.display()), err)
    })?;
    let path = args.out_dir.join(&filename);
    fs::write(&path, &buffer)
        .map_err(|err| io_error(&format!("failed to write {}", path.display()), err))?;
    info!(path = %path.display(), size = buffer.len(), "wrote package");

    let manifest_path = match Manifest::from_definition(&definition, &filename, &buffer) {
        Some(manifest) => {
            let json = manifest.to_json().map_err(|err| {
                CliError::new(INTERNAL, format!("failed to serialize manifest: {err}"))
            })?;
            let manifest_path = args.out_dir.join(manifest.filename());
            fs::write(&manifest_path, json).map_err(|err| {
                io_error(&format!("failed to write {}", manifest_path.display()), err)
            })?;
            info!(path = %manifest_path.display(), "wrote manifest");
            Some(manifest_path.display().to_string())
        }
        None => None,
    };

    let out = PackOutput {
        package: definition.id.clone(),
        version: definition.version.clone(),
        path: path.display().to_string(),
        size: buffer.len(),
        sha256: sha256_hex(&buffer),
        namespaces: builder
            .namespaces()
            .app()
            .into_iter()
            .chain(builder.namespaces().services())
            .map(str::to_string)
            .collect(),
        manifest: manifest_path,
    };
    print_pack(&out, format);
    Ok(SUCCESS)
}

async fn join_producers(
    definition: &Definition,
    base: &Path,
    deadline: Option<Duration>,
    builder: &mut IpkBuilder,
) -> CliResult<()> {
    let mut aggregator = Aggregator::with_config(AggregatorConfig {
        deadline,
        ..AggregatorConfig::default()
    });

    let mut producers = Vec::new();
    for (namespace, root) in definition.namespaces(base) {
        let sink = aggregator
            .register(namespace)
            .map_err(|err| ipk_error("invalid definition", err))?;
        producers.push(producer::spawn(sink, root));
    }

    aggregator
        .join(builder)
        .await
        .map_err(|err| ipk_error("failed to collect assets", err))?;

    for producer in producers {
        producer
            .await
            .map_err(|err| CliError::new(INTERNAL, format!("producer task failed: {err}")))?;
    }
    Ok(())
}

fn print_pack(out: &PackOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = table(vec!["PACKAGE", "VERSION", "SIZE", "SHA256", "PATH"]);
            table.add_row(vec![
                out.package.clone(),
                out.version.clone(),
                out.size.to_string(),
                out.sha256.clone(),
                out.path.clone(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Package:    {} {}", out.package, out.version);
            println!("Path:       {}", out.path);
            println!("Size:       {} bytes", out.size);
            println!("SHA-256:    {}", out.sha256);
            println!("Namespaces: {}", out.namespaces.join(", "));
            if let Some(manifest) = &out.manifest {
                println!("Manifest:   {manifest}");
            }
        }
    }
}

fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_timeout_seconds() {
        assert_eq!(parse_timeout("5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn parse_timeout_millis() {
        assert_eq!(parse_timeout("150ms").unwrap(), Duration::from_millis(150));
    }

    #[test]
    fn parse_timeout_invalid() {
        assert!(parse_timeout("0s").is_err());
        assert!(parse_timeout("bad").is_err());
        assert!(parse_timeout("").is_err());
    }
}
