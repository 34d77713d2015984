//! Vertical extent of the item table
//!
//! The table starts just below the header row and ends at the summary line
//! ("Troca / R&I ..."), which always begins near the left margin. When no
//! summary line is present the table runs to the bottom of the page.

use crate::config::{normalize_label, ExtractionConfig};
use crate::extractor::Token;
use crate::ExtractError;

/// Tokens belonging to the item table body
#[derive(Debug, Clone)]
pub struct DataRegion {
    pub tokens: Vec<Token>,
    /// Data tokens have `top` strictly greater than this
    pub y_start: f32,
    /// Data tokens have `top` strictly less than this
    pub y_stop: f32,
    pub stop_anchor_found: bool,
}

/// Find the vertical coordinate where the item table ends.
///
/// `candidates` are the tokens below the header. Returns `page_height` when no
/// stop anchor is found.
pub fn find_stop_limit(
    candidates: &[Token],
    page_width: f32,
    page_height: f32,
    config: &ExtractionConfig,
) -> Option<f32> {
    let anchors: Vec<String> = config
        .stop_anchors
        .iter()
        .map(|a| normalize_label(a))
        .filter(|a| !a.is_empty())
        .collect();
    let max_x = page_width * config.stop_anchor_max_x_ratio;

    let highest = candidates
        .iter()
        .filter(|t| t.x0 < max_x)
        .filter(|t| {
            let text = normalize_label(&t.text);
            anchors.iter().any(|a| text.contains(a.as_str()))
        })
        .map(|t| t.top)
        .fold(None, |acc: Option<f32>, top| Some(acc.map_or(top, |a| a.min(top))));

    match highest {
        Some(top) => {
            let limit = top - config.stop_margin;
            log::debug!("item table ends before summary anchor, y stop limit {:.1}", limit);
            Some(limit)
        }
        None => {
            log::debug!(
                "summary anchor not found, reading to page bottom ({:.1})",
                page_height
            );
            None
        }
    }
}

/// Select the tokens between the header bottom and the summary anchor.
///
/// Fails with [`ExtractError::EmptyDataRegion`] when nothing is left.
pub fn select_data_region(
    tokens: &[Token],
    page_width: f32,
    page_height: f32,
    header_bottom: f32,
    config: &ExtractionConfig,
) -> Result<DataRegion, ExtractError> {
    let y_start = header_bottom + config.header_clearance;
    let below_header: Vec<Token> = tokens.iter().filter(|t| t.top > y_start).cloned().collect();

    let stop = find_stop_limit(&below_header, page_width, page_height, config);
    let y_stop = stop.unwrap_or(page_height);

    let data: Vec<Token> = below_header.into_iter().filter(|t| t.top < y_stop).collect();
    if data.is_empty() {
        log::debug!(
            "no data tokens between y={:.1} and y={:.1}",
            y_start,
            y_stop
        );
        return Err(ExtractError::EmptyDataRegion);
    }

    Ok(DataRegion {
        tokens: data,
        y_start,
        y_stop,
        stop_anchor_found: stop.is_some(),
    })
}
