//! CSV output of extracted item tables

use crate::pipeline::ItemTable;
use crate::ExtractError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Suffix appended to the source file stem
pub const OUTPUT_SUFFIX: &str = "_extracao";

/// Output file name for a source document: `<stem>_extracao.<ext>`
pub fn output_file_name(source: &Path, extension: &str) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "documento".to_string());
    PathBuf::from(format!("{}{}.{}", stem, OUTPUT_SUFFIX, extension))
}

/// Write the table as CSV with a `QTD,CÓDIGO,TITULO` header
pub fn write_csv<W: Write>(writer: W, table: &ItemTable) -> Result<(), ExtractError> {
    let mut csv = csv::WriterBuilder::new().from_writer(writer);
    csv.write_record(["QTD", "CÓDIGO", "TITULO"])?;
    for row in &table.rows {
        csv.write_record([row.quantity_text.as_str(), row.code.as_str(), row.title.as_str()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the table as CSV to `path`
pub fn write_csv_file<P: AsRef<Path>>(path: P, table: &ItemTable) -> Result<(), ExtractError> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), table)
}
