//! Document-level processing
//!
//! Each document is read, its first page run through the pipeline, and the
//! outcome reported on its own. A failing document never stops a batch.

use crate::config::ExtractionConfig;
use crate::extractor::{extract_first_page, extract_first_page_mem};
use crate::pipeline::{extract_items, ItemTable};
use crate::ExtractError;
use rayon::prelude::*;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Outcome of processing one document in a batch
#[derive(Debug)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    pub result: Result<ItemTable, ExtractError>,
}

impl DocumentOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Extract the item table from the first page of a PDF file
pub fn process_pdf<P: AsRef<Path>>(
    path: P,
    config: &ExtractionConfig,
) -> Result<ItemTable, ExtractError> {
    let page = extract_first_page(path)?;
    extract_items(&page, config)
}

/// Extract the item table from the first page of a PDF held in memory
pub fn process_pdf_mem(buffer: &[u8], config: &ExtractionConfig) -> Result<ItemTable, ExtractError> {
    let page = extract_first_page_mem(buffer)?;
    extract_items(&page, config)
}

/// Process documents in parallel, returning outcomes in input order.
///
/// Panics raised while reading a document are caught and reported as
/// [`ExtractError::Internal`] for that document.
pub fn process_batch<P: AsRef<Path> + Sync>(
    paths: &[P],
    config: &ExtractionConfig,
) -> Vec<DocumentOutcome> {
    paths
        .par_iter()
        .map(|path| {
            let source = path.as_ref().to_path_buf();
            let result = process_guarded(&source, config);
            match &result {
                Ok(table) => log::info!(
                    "{}: {} items extracted",
                    source.display(),
                    table.rows.len()
                ),
                Err(ExtractError::Internal(msg)) => {
                    log::error!("{}: unexpected failure: {}", source.display(), msg)
                }
                Err(e) => log::warn!("{}: {}", source.display(), e),
            }
            DocumentOutcome { source, result }
        })
        .collect()
}

fn process_guarded(path: &Path, config: &ExtractionConfig) -> Result<ItemTable, ExtractError> {
    match catch_unwind(AssertUnwindSafe(|| process_pdf(path, config))) {
        Ok(result) => result,
        Err(payload) => {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "panic while reading document".to_string());
            Err(ExtractError::Internal(msg))
        }
    }
}
