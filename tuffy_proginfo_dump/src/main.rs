//! CLI tool: dump the s390x opcode property table, or resolve a list of
//! decoded instructions, as JSON.

mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use tuffy_target_s390x::{DecodedInst, progtable, resolve};

use schema::{ResolvedInst, TableEntry};

const USAGE: &str = "Usage:
  tuffy_proginfo_dump table <output.json>
  tuffy_proginfo_dump resolve <input.json> <output.json>";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        Some("table") if args.len() == 3 => dump_table(&PathBuf::from(&args[2])),
        Some("resolve") if args.len() == 4 => {
            resolve_file(&PathBuf::from(&args[2]), &PathBuf::from(&args[3]))
        }
        _ => {
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}

fn dump_table(output_path: &Path) {
    let entries: Vec<TableEntry> = progtable::classified()
        .map(|(opcode, info)| TableEntry { opcode, info })
        .collect();
    write_json(output_path, &entries);
    eprintln!(
        "Wrote {} table entries -> {}",
        entries.len(),
        output_path.display()
    );
}

fn resolve_file(input_path: &Path, output_path: &Path) {
    let json_str = fs::read_to_string(input_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", input_path.display()));

    let insts: Vec<DecodedInst> =
        serde_json::from_str(&json_str).unwrap_or_else(|e| panic!("failed to parse JSON: {e}"));

    // An unclassified opcode aborts here, naming the instruction.
    let resolved: Vec<ResolvedInst> = insts
        .iter()
        .map(|inst| ResolvedInst {
            asm: inst.to_string(),
            info: resolve(inst),
        })
        .collect();

    write_json(output_path, &resolved);
    log::info!("resolved {} instructions", resolved.len());
    eprintln!(
        "Resolved {} instructions -> {}",
        resolved.len(),
        output_path.display()
    );
}

fn write_json<T: serde::Serialize>(output_path: &Path, value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| panic!("failed to serialize JSON: {e}"));
    fs::write(output_path, json)
        .unwrap_or_else(|e| panic!("failed to write {}: {e}", output_path.display()));
}
