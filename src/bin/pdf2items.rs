//! CLI tool for extracting item tables from PDFs into CSV files

use pdf_item_table::{output_file_name, process_batch, write_csv_file, ExtractionConfig};
use std::env;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} <pdf_file>... [--out-dir DIR] [--json]", program);
    eprintln!();
    eprintln!("Extracts the QTD / CÓDIGO / TITULO table from the first page of each PDF");
    eprintln!("and writes <name>_extracao.csv into DIR (default: current directory).");
    process::exit(1);
}

fn json_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pdf2items");

    let mut inputs: Vec<PathBuf> = Vec::new();
    let mut out_dir = PathBuf::from(".");
    let mut json_output = false;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--json" => json_output = true,
            "--out-dir" => match rest.next() {
                Some(dir) => out_dir = PathBuf::from(dir),
                None => usage(program),
            },
            "-h" | "--help" => usage(program),
            _ => inputs.push(PathBuf::from(arg)),
        }
    }
    if inputs.is_empty() {
        usage(program);
    }

    if let Err(e) = std::fs::create_dir_all(&out_dir) {
        eprintln!("Error: cannot create {}: {}", out_dir.display(), e);
        process::exit(1);
    }

    let start = Instant::now();
    let config = ExtractionConfig::default();
    let outcomes = process_batch(&inputs, &config);

    let mut succeeded = 0usize;
    let mut json_entries = Vec::new();

    for outcome in &outcomes {
        let source = outcome.source.display().to_string();
        let written = outcome.result.as_ref().map_err(|e| e.to_string()).and_then(|table| {
            let target = out_dir.join(output_file_name(&outcome.source, "csv"));
            write_csv_file(&target, table)
                .map(|_| (target, table.rows.len()))
                .map_err(|e| e.to_string())
        });

        match written {
            Ok((target, count)) => {
                succeeded += 1;
                if json_output {
                    json_entries.push(format!(
                        r#"{{"source":"{}","output":"{}","items":{}}}"#,
                        json_escape(&source),
                        json_escape(&target.display().to_string()),
                        count
                    ));
                } else {
                    println!("{} -> {} ({} items)", source, target.display(), count);
                }
            }
            Err(e) => {
                if json_output {
                    json_entries.push(format!(
                        r#"{{"source":"{}","error":"{}"}}"#,
                        json_escape(&source),
                        json_escape(&e)
                    ));
                } else {
                    eprintln!("{}: FAILED: {}", source, e);
                }
            }
        }
    }

    if json_output {
        println!(
            r#"{{"documents":{},"succeeded":{},"processing_time_ms":{},"results":[{}]}}"#,
            outcomes.len(),
            succeeded,
            start.elapsed().as_millis(),
            json_entries.join(",")
        );
    } else {
        println!();
        println!(
            "{}/{} documents extracted in {}ms",
            succeeded,
            outcomes.len(),
            start.elapsed().as_millis()
        );
    }

    if succeeded == 0 {
        process::exit(1);
    }
}
