//! Debug tool: Print every stage of the item table pipeline for one PDF
//!
//! Usage: debug_rows <pdf_file>
//!
//! Shows the header anchors and column boundaries, the data region, each row
//! cluster with its tokens, the raw per-column rows and the merged items.

use pdf_item_table::extract_first_page;
use pdf_item_table::pipeline::trace_extraction;
use pdf_item_table::ExtractionConfig;
use std::env;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <pdf_file>", args[0]);
        process::exit(1);
    }

    let page = match extract_first_page(&args[1]) {
        Ok(page) => page,
        Err(e) => {
            eprintln!("Error extracting words: {}", e);
            process::exit(1);
        }
    };
    println!(
        "Page {}: {:.1} x {:.1}, {} tokens",
        page.page_number,
        page.width,
        page.height,
        page.tokens.len()
    );

    let trace = match trace_extraction(&page, &ExtractionConfig::default()) {
        Ok(trace) => trace,
        Err(e) => {
            eprintln!("Extraction failed: {}", e);
            process::exit(2);
        }
    };

    println!();
    println!("Header (top {:.1}, bottom {:.1})", trace.header.header_top, trace.header.header_bottom);
    for anchor in &trace.header.anchors {
        println!(
            "  {:<13} '{}' x0={:.1} x1={:.1} top={:.1}",
            anchor.label.name(),
            anchor.token.text,
            anchor.token.x0,
            anchor.token.x1,
            anchor.token.top
        );
    }
    for column in &trace.header.columns {
        println!("  column {:<7} [{:.1}, {:.1})", column.column.name(), column.x0, column.x1);
    }

    println!();
    println!(
        "Data region: {:.1} < top < {:.1} ({}), {} tokens",
        trace.region.y_start,
        trace.region.y_stop,
        if trace.region.stop_anchor_found {
            "summary anchor"
        } else {
            "page bottom"
        },
        trace.region.tokens.len()
    );

    println!();
    println!("Clusters:");
    for cluster in &trace.clusters {
        println!("  y={:>7.1}  {}", cluster.key, cluster.text());
    }

    println!();
    println!("Raw rows:");
    for row in &trace.raw_rows {
        println!(
            "  y={:>7.1}  QTD='{}' CÓDIGO='{}' TITULO='{}'",
            row.y_level, row.quantity, row.code, row.title
        );
    }

    println!();
    println!("Items ({}):", trace.rows.len());
    for row in &trace.rows {
        println!("  {:>6} | {:<16} | {}", row.quantity_text, row.code, row.title);
    }
}
