use std::fs;

use ipkpack_ar::{read_archive, ArEntry};
use ipkpack_section::{mode::mode_string, read_section, EntryKind, ListedEntry};
use serde::Serialize;

use crate::cmd::InspectArgs;
use crate::exit::{ar_error, io_error, section_error, CliResult, SUCCESS};
use crate::output::{print_json, table, OutputFormat};

#[derive(Serialize)]
struct EntryOutput {
    path: String,
    kind: &'static str,
    mode: String,
    size: u64,
}

#[derive(Serialize)]
struct MemberOutput {
    name: String,
    size: usize,
    mode: String,
    timestamp: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<Vec<EntryOutput>>,
}

#[derive(Serialize)]
struct InspectOutput {
    path: String,
    members: Vec<MemberOutput>,
}

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let context = format!("failed to inspect {}", args.path.display());
    let data = fs::read(&args.path).map_err(|err| io_error(&context, err))?;
    let members = read_archive(&data).map_err(|err| ar_error(&context, err))?;

    let members = members
        .iter()
        .map(|member| describe(member).map_err(|err| section_error(&context, err)))
        .collect::<CliResult<Vec<_>>>()?;

    let out = InspectOutput {
        path: args.path.display().to_string(),
        members,
    };
    print_inspect(&out, format);
    Ok(SUCCESS)
}

fn describe(member: &ArEntry) -> ipkpack_section::Result<MemberOutput> {
    let entries = if member.identifier.ends_with(".tar.gz") {
        let listed = read_section(&member.content)?;
        Some(listed.iter().map(describe_entry).collect())
    } else {
        None
    };

    Ok(MemberOutput {
        name: member.identifier.clone(),
        size: member.content.len(),
        mode: format!("{:o}", member.file_mode),
        timestamp: member.timestamp,
        entries,
    })
}

fn describe_entry(entry: &ListedEntry) -> EntryOutput {
    let (kind, is_dir) = match entry.kind {
        EntryKind::Directory => ("directory", true),
        EntryKind::File => ("file", false),
        EntryKind::Other => ("other", false),
    };
    EntryOutput {
        path: entry.path.clone(),
        kind,
        mode: mode_string(entry.mode, is_dir),
        size: entry.size,
    }
}

fn print_inspect(out: &InspectOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut members = table(vec!["MEMBER", "SIZE", "MODE", "TIMESTAMP"]);
            for member in &out.members {
                members.add_row(vec![
                    member.name.clone(),
                    member.size.to_string(),
                    member.mode.clone(),
                    member.timestamp.to_string(),
                ]);
            }
            println!("{members}");

            for member in &out.members {
                let Some(entries) = &member.entries else {
                    continue;
                };
                println!("{}:", member.name);
                let mut listing = table(vec!["MODE", "SIZE", "PATH"]);
                for entry in entries {
                    listing.add_row(vec![
                        entry.mode.clone(),
                        entry.size.to_string(),
                        entry.path.clone(),
                    ]);
                }
                println!("{listing}");
            }
        }
        OutputFormat::Pretty => {
            println!("{}", out.path);
            for member in &out.members {
                println!("  {} ({} bytes, mode {})", member.name, member.size, member.mode);
                for entry in member.entries.iter().flatten() {
                    println!("    {} {:>8} {}", entry.mode, entry.size, entry.path);
                }
            }
        }
    }
}
