//! Item table extraction pipeline
//!
//! Runs the stages in order on one page of tokens: header location, data
//! region selection, row clustering, column assignment and title merging.

use crate::columns::{assign_columns, RawRow};
use crate::config::ExtractionConfig;
use crate::extractor::PageTokens;
use crate::header::{locate_header, HeaderLayout};
use crate::merge::{merge_rows, ExtractedRow};
use crate::region::{select_data_region, DataRegion};
use crate::rows::{cluster_rows, LineCluster};
use crate::ExtractError;

/// Items extracted from one page
#[derive(Debug, Clone, PartialEq)]
pub struct ItemTable {
    pub page_number: u32,
    /// Top to bottom; never empty
    pub rows: Vec<ExtractedRow>,
}

/// Intermediate results of every stage, for diagnostics
#[derive(Debug, Clone)]
pub struct PipelineTrace {
    pub header: HeaderLayout,
    pub region: DataRegion,
    pub clusters: Vec<LineCluster>,
    pub raw_rows: Vec<RawRow>,
    pub rows: Vec<ExtractedRow>,
}

/// Extract the item table from one page of tokens
pub fn extract_items(
    page: &PageTokens,
    config: &ExtractionConfig,
) -> Result<ItemTable, ExtractError> {
    let trace = trace_extraction(page, config)?;
    if trace.rows.is_empty() {
        log::debug!("no rows left after merging");
        return Err(ExtractError::NoExtractableRows);
    }
    Ok(ItemTable {
        page_number: page.page_number,
        rows: trace.rows,
    })
}

/// Run every stage and keep the intermediate results.
///
/// Header and data region failures are returned as errors; an empty row list
/// is not, so callers can inspect why nothing survived.
pub fn trace_extraction(
    page: &PageTokens,
    config: &ExtractionConfig,
) -> Result<PipelineTrace, ExtractError> {
    log::debug!(
        "page {}: {:.1} x {:.1}, {} tokens",
        page.page_number,
        page.width,
        page.height,
        page.tokens.len()
    );

    let header = locate_header(&page.tokens, page.width, page.height, config)?;
    let region = select_data_region(
        &page.tokens,
        page.width,
        page.height,
        header.header_bottom,
        config,
    )?;

    let clusters = cluster_rows(&region.tokens, config.row_tolerance);
    let raw_rows: Vec<RawRow> = clusters
        .iter()
        .filter_map(|cluster| assign_columns(cluster, &header.columns, config))
        .collect();
    let rows = merge_rows(&raw_rows, config.merge_tolerance);

    log::debug!(
        "{} clusters, {} raw rows, {} items",
        clusters.len(),
        raw_rows.len(),
        rows.len()
    );

    Ok(PipelineTrace {
        header,
        region,
        clusters,
        raw_rows,
        rows,
    })
}
