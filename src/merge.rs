//! Quantity validation and multi-line title merging
//!
//! A title that wraps onto the next line leaves that line with no quantity
//! and no code. Such continuation rows are appended to the item above them as
//! long as they stay close vertically.

use crate::columns::RawRow;

/// One item of the extracted table
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRow {
    pub quantity: f64,
    /// The cleaned quantity token as it appeared (decimal comma replaced)
    pub quantity_text: String,
    pub code: String,
    pub title: String,
}

/// Parse the numeric quantity out of a quantity cell.
///
/// Decimal commas become dots and the last space-separated piece is taken,
/// so stray prefixes like `"un 2"` still yield `2`. Returns the cleaned piece
/// and its value.
pub fn parse_quantity(text: &str) -> Option<(String, f64)> {
    let cleaned = text.replace(',', ".");
    let last = cleaned.trim().split(' ').last()?;
    let value: f64 = last.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some((last.to_string(), value))
}

fn is_continuation(row: &RawRow, current_y: f32, tolerance: f32) -> bool {
    let no_quantity = row.quantity.is_empty() || parse_quantity(&row.quantity).is_none();
    no_quantity && !row.title.is_empty() && (row.y_level - current_y) < tolerance
}

/// Turn raw rows (top to bottom) into items, merging title continuations.
///
/// Rows without a valid quantity that cannot continue an item are dropped.
pub fn merge_rows(rows: &[RawRow], merge_tolerance: f32) -> Vec<ExtractedRow> {
    let mut merged = Vec::new();
    let mut i = 0;

    while i < rows.len() {
        let row = &rows[i];
        let Some((quantity_text, quantity)) = parse_quantity(&row.quantity) else {
            log::debug!(
                "dropping row at y={:.1}: no valid quantity in '{}' (title: '{}')",
                row.y_level,
                row.quantity,
                row.title
            );
            i += 1;
            continue;
        };

        let mut item = ExtractedRow {
            quantity,
            quantity_text,
            code: row.code.clone(),
            title: row.title.clone(),
        };
        let mut current_y = row.y_level;
        let mut j = i + 1;
        while j < rows.len() && is_continuation(&rows[j], current_y, merge_tolerance) {
            log::debug!("merging title '{}' + '{}'", item.title, rows[j].title);
            item.title = format!("{} {}", item.title, rows[j].title)
                .trim()
                .to_string();
            current_y = rows[j].y_level;
            j += 1;
        }

        merged.push(item);
        i = j;
    }

    merged
}
