//! Header-anchored item table extraction from PDF documents
//!
//! This crate provides:
//! - Word extraction with bounding boxes from the first page of a PDF
//! - Column inference from the header labels of an item table
//! - Row reconstruction with multi-line title merging
//! - Batch processing and CSV output

pub mod batch;
pub mod columns;
pub mod config;
pub mod extractor;
pub mod header;
pub mod merge;
pub mod output;
pub mod pipeline;
pub mod region;
pub mod rows;

pub use batch::{process_batch, process_pdf, process_pdf_mem, DocumentOutcome};
pub use config::{Column, ExtractionConfig, HeaderLabel, HeaderLabels};
pub use extractor::{extract_first_page, extract_first_page_mem, PageTokens, Token};
pub use merge::ExtractedRow;
pub use output::{output_file_name, write_csv, write_csv_file};
pub use pipeline::{extract_items, ItemTable};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("PDF has no pages")]
    NoPages,
    #[error("Header row not found: {0}")]
    HeaderNotFound(String),
    #[error("No tokens between the header and the end of the item table")]
    EmptyDataRegion,
    #[error("No row with a numeric quantity")]
    NoExtractableRows,
    #[error("Output error: {0}")]
    Output(String),
    #[error("Unexpected failure: {0}")]
    Internal(String),
}

impl From<lopdf::Error> for ExtractError {
    fn from(e: lopdf::Error) -> Self {
        ExtractError::Parse(e.to_string())
    }
}

impl From<csv::Error> for ExtractError {
    fn from(e: csv::Error) -> Self {
        ExtractError::Output(e.to_string())
    }
}
