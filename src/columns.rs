//! Column assignment for one visual row

use crate::config::{Column, ExtractionConfig};
use crate::extractor::Token;
use crate::header::ColumnBoundary;
use crate::rows::LineCluster;

/// Per-column text of one visual row, before quantity validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub quantity: String,
    pub code: String,
    pub title: String,
    /// Cluster key the row came from
    pub y_level: f32,
}

/// Pick the column a token belongs to.
///
/// Quantity and Code claim a token as soon as its center falls inside them or
/// it overlaps them significantly; Title only takes what neither claimed.
pub fn column_for_token(
    token: &Token,
    columns: &[ColumnBoundary],
    config: &ExtractionConfig,
) -> Option<Column> {
    let center = token.center_x();
    let width = token.width();
    let mut best_fit = None;

    for column in Column::ALL {
        let Some(bounds) = columns.iter().find(|b| b.column == column) else {
            continue;
        };
        let center_in = bounds.x0 <= center && center < bounds.x1;
        let overlap = token.x1.min(bounds.x1) - token.x0.max(bounds.x0);
        let significant = (width > 0.0 && overlap / width > config.overlap_ratio)
            || overlap > config.overlap_min_width;

        if !(center_in || significant) {
            continue;
        }
        match column {
            Column::Quantity | Column::Code => return Some(column),
            Column::Title => {
                if best_fit.is_none() {
                    best_fit = Some(column);
                }
            }
        }
    }
    best_fit
}

/// Assemble the Quantity, Code and Title text of one cluster.
///
/// Returns `None` for clusters with neither quantity nor title text, which can
/// never contribute to an item.
pub fn assign_columns(
    cluster: &LineCluster,
    columns: &[ColumnBoundary],
    config: &ExtractionConfig,
) -> Option<RawRow> {
    let mut quantity: Vec<&str> = Vec::new();
    let mut code: Vec<&str> = Vec::new();
    let mut title: Vec<&str> = Vec::new();

    let mut tokens: Vec<&Token> = cluster.tokens.iter().collect();
    tokens.sort_by(|a, b| a.x0.total_cmp(&b.x0));

    for token in tokens {
        let text = token.text.trim();
        if text.is_empty() {
            continue;
        }
        match column_for_token(token, columns, config) {
            Some(Column::Quantity) => quantity.push(text),
            Some(Column::Code) => code.push(text),
            Some(Column::Title) => title.push(text),
            None => log::trace!(
                "unassigned token '{}' (x0: {:.1}, x1: {:.1}) on row {:.1}",
                text,
                token.x0,
                token.x1,
                cluster.key
            ),
        }
    }

    let row = RawRow {
        quantity: quantity.join(" ").trim().to_string(),
        code: code.join(" ").trim().to_string(),
        title: title.join(" ").trim().to_string(),
        y_level: cluster.key,
    };
    if row.quantity.is_empty() && row.title.is_empty() {
        return None;
    }
    Some(row)
}
