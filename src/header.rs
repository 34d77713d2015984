//! Header row location and column boundary inference
//!
//! The item table has no ruling lines, so its columns are inferred from the
//! header labels: each column runs from its own label to the label on its
//! right. FORNECIMENTO closes the title column and OPERAÇÕES pins the header
//! line.

use crate::config::{Column, ExtractionConfig, HeaderLabel};
use crate::extractor::Token;
use crate::ExtractError;
use std::collections::BTreeMap;

/// A header label bound to the token that represents it
#[derive(Debug, Clone)]
pub struct HeaderAnchor {
    pub label: HeaderLabel,
    pub token: Token,
}

/// Horizontal span of one output column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnBoundary {
    pub column: Column,
    pub x0: f32,
    pub x1: f32,
    pub y_top: f32,
    pub y_bottom: f32,
}

impl ColumnBoundary {
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }
}

/// Located header row with the derived column boundaries
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    /// One anchor per label, in label priority order
    pub anchors: Vec<HeaderAnchor>,
    /// Quantity, Code, Title, left to right
    pub columns: Vec<ColumnBoundary>,
    pub header_top: f32,
    pub header_bottom: f32,
}

impl HeaderLayout {
    pub fn anchor(&self, label: HeaderLabel) -> Option<&Token> {
        self.anchors
            .iter()
            .find(|a| a.label == label)
            .map(|a| &a.token)
    }

    pub fn column(&self, column: Column) -> Option<&ColumnBoundary> {
        self.columns.iter().find(|c| c.column == column)
    }
}

/// Find the header row and derive the Quantity, Code and Title boundaries.
///
/// Fails with [`ExtractError::HeaderNotFound`] if any of the five labels is
/// missing or none of its candidates sits on the header line.
pub fn locate_header(
    tokens: &[Token],
    page_width: f32,
    page_height: f32,
    config: &ExtractionConfig,
) -> Result<HeaderLayout, ExtractError> {
    let mut candidates: BTreeMap<HeaderLabel, Vec<&Token>> = BTreeMap::new();
    for token in tokens {
        if let Some(label) = config.labels.label_for(&token.text) {
            candidates.entry(label).or_default().push(token);
        }
    }

    let missing: Vec<&str> = HeaderLabel::ALL
        .iter()
        .filter(|label| !candidates.contains_key(*label))
        .map(|label| label.name())
        .collect();
    if !missing.is_empty() {
        log::debug!(
            "header labels missing: {:?} (found: {:?})",
            missing,
            candidates
                .iter()
                .map(|(label, c)| (label.name(), c.len()))
                .collect::<Vec<_>>()
        );
        return Err(ExtractError::HeaderNotFound(format!(
            "missing labels {}",
            missing.join(", ")
        )));
    }

    // The first label in priority order pins the header line
    let (ref_label, ref_top) = HeaderLabel::ALL
        .iter()
        .find_map(|label| {
            let tops = candidates.get(label)?.iter().map(|t| t.top);
            Some((*label, tops.fold(f32::INFINITY, f32::min)))
        })
        .ok_or_else(|| ExtractError::HeaderNotFound("no reference label".to_string()))?;
    log::debug!("using {} (top: {:.1}) as header line reference", ref_label, ref_top);

    let mut anchors = Vec::with_capacity(HeaderLabel::ALL.len());
    let mut header_top = page_height;
    let mut header_bottom = 0.0f32;

    for label in HeaderLabel::ALL {
        let best = candidates
            .get(&label)
            .into_iter()
            .flatten()
            .filter(|t| (t.top - ref_top).abs() < config.header_tolerance)
            .min_by(|a, b| a.x0.total_cmp(&b.x0).then(a.top.total_cmp(&b.top)));

        let Some(token) = best else {
            log::debug!("label {} not aligned with header line at {:.1}", label, ref_top);
            return Err(ExtractError::HeaderNotFound(format!(
                "label {} not aligned with header line at {:.1}",
                label, ref_top
            )));
        };
        header_top = header_top.min(token.top);
        header_bottom = header_bottom.max(token.bottom);
        anchors.push(HeaderAnchor {
            label,
            token: (*token).clone(),
        });
    }

    let x0_of = |label: HeaderLabel| {
        anchors
            .iter()
            .find(|a| a.label == label)
            .map(|a| a.token.x0)
            .unwrap_or(0.0)
    };

    let spans = [
        (Column::Quantity, HeaderLabel::Quantity, HeaderLabel::Code),
        (Column::Code, HeaderLabel::Code, HeaderLabel::Title),
        (Column::Title, HeaderLabel::Title, HeaderLabel::Supply),
    ];
    let columns: Vec<ColumnBoundary> = spans
        .iter()
        .map(|&(column, own, next)| {
            let x0 = x0_of(own) - config.column_gap;
            let x1 = x0_of(next) - config.column_gap;
            ColumnBoundary {
                column,
                x0: x0.max(0.0),
                x1: x1.max(x0 + config.column_min_width(column)),
                y_top: header_top,
                y_bottom: header_bottom,
            }
        })
        .collect();

    log::debug!(
        "header anchors: {:?}",
        anchors
            .iter()
            .map(|a| (a.label.name(), a.token.text.as_str()))
            .collect::<Vec<_>>()
    );
    log::debug!(
        "column boundaries (page width {:.1}): {:?}",
        page_width,
        columns
            .iter()
            .map(|c| (c.column.name(), c.x0, c.x1))
            .collect::<Vec<_>>()
    );
    log::debug!("header bottom at {:.1}", header_bottom);

    Ok(HeaderLayout {
        anchors,
        columns,
        header_top,
        header_bottom,
    })
}
