//! Extraction configuration
//!
//! All geometric thresholds used by the pipeline live here, together with the
//! accepted spellings of each header label and of the summary anchor that ends
//! the item table. The defaults are tuned for one family of work-order layouts.

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalize token text for label matching: collapse whitespace runs, trim,
/// uppercase.
pub fn normalize_label(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").to_uppercase()
}

/// Logical header labels, in the priority order used to pick the reference
/// header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderLabel {
    Operations,
    Quantity,
    Code,
    Title,
    Supply,
}

impl HeaderLabel {
    /// Every label, in priority order.
    pub const ALL: [HeaderLabel; 5] = [
        HeaderLabel::Operations,
        HeaderLabel::Quantity,
        HeaderLabel::Code,
        HeaderLabel::Title,
        HeaderLabel::Supply,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HeaderLabel::Operations => "OPERAÇÕES",
            HeaderLabel::Quantity => "QTD",
            HeaderLabel::Code => "CÓDIGO",
            HeaderLabel::Title => "TITULO",
            HeaderLabel::Supply => "FORNECIMENTO",
        }
    }
}

impl std::fmt::Display for HeaderLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Output columns of the item table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Quantity,
    Code,
    Title,
}

impl Column {
    /// Assignment order: earlier columns win ambiguous tokens.
    pub const ALL: [Column; 3] = [Column::Quantity, Column::Code, Column::Title];

    pub fn name(self) -> &'static str {
        match self {
            Column::Quantity => "QTD",
            Column::Code => "CÓDIGO",
            Column::Title => "TITULO",
        }
    }
}

/// Accepted spellings per header label
#[derive(Debug, Clone)]
pub struct HeaderLabels {
    variants: Vec<(HeaderLabel, Vec<String>)>,
}

impl HeaderLabels {
    /// Build a label table; variants are stored normalized.
    pub fn new<I, S>(entries: impl IntoIterator<Item = (HeaderLabel, I)>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut variants: Vec<(HeaderLabel, Vec<String>)> = entries
            .into_iter()
            .map(|(label, spellings)| {
                let spellings = spellings
                    .into_iter()
                    .map(|s| normalize_label(s.as_ref()))
                    .collect();
                (label, spellings)
            })
            .collect();
        variants.sort_by_key(|(label, _)| *label);
        Self { variants }
    }

    /// Normalized variants accepted for `label`
    pub fn variants(&self, label: HeaderLabel) -> &[String] {
        self.variants
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    /// First label (in priority order) accepting this token text.
    pub fn label_for(&self, text: &str) -> Option<HeaderLabel> {
        let normalized = normalize_label(text);
        if normalized.is_empty() {
            return None;
        }
        self.variants
            .iter()
            .find(|(_, spellings)| spellings.iter().any(|s| *s == normalized))
            .map(|(label, _)| *label)
    }
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self::new([
            (
                HeaderLabel::Operations,
                vec!["OPERAÇÕES", "OPERACÕES", "OPERACOES"],
            ),
            (HeaderLabel::Quantity, vec!["QTD", "QTD."]),
            (HeaderLabel::Code, vec!["CÓDIGO", "CODIGO", "CÓD.", "COD."]),
            (
                HeaderLabel::Title,
                vec!["TITULO", "TÍTULO", "DESCRIÇÃO", "DESCRICAO"],
            ),
            (HeaderLabel::Supply, vec!["FORNECIMENTO"]),
        ])
    }
}

/// Configuration for item table extraction
#[derive(Debug, Clone)]
pub struct ExtractionConfig {
    /// Gap left between adjacent column boundaries (default: 2.0)
    pub column_gap: f32,
    /// Minimum width of the quantity column
    pub quantity_min_width: f32,
    /// Minimum width of the code column
    pub code_min_width: f32,
    /// Minimum width of the title column
    pub title_min_width: f32,
    /// Max distance between a label's `top` and the reference header line
    pub header_tolerance: f32,
    /// Data tokens must start this far below the header bottom
    pub header_clearance: f32,
    /// Stop anchors must start in this leftmost fraction of the page width
    pub stop_anchor_max_x_ratio: f32,
    /// Distance kept above the highest stop anchor
    pub stop_margin: f32,
    /// Max vertical-center distance for tokens on the same row
    pub row_tolerance: f32,
    /// Fraction of a token's width that must overlap a column
    pub overlap_ratio: f32,
    /// Absolute overlap that is always significant
    pub overlap_min_width: f32,
    /// Max vertical distance between a row and its title continuation
    pub merge_tolerance: f32,
    /// Accepted header spellings
    pub labels: HeaderLabels,
    /// Phrases marking the start of the table's summary section
    pub stop_anchors: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            column_gap: 2.0,
            quantity_min_width: 10.0,
            code_min_width: 10.0,
            title_min_width: 50.0,
            header_tolerance: 5.0,
            header_clearance: 1.0,
            stop_anchor_max_x_ratio: 0.20,
            stop_margin: 2.0,
            row_tolerance: 2.5,
            overlap_ratio: 0.4,
            overlap_min_width: 5.0,
            merge_tolerance: 15.0,
            labels: HeaderLabels::default(),
            stop_anchors: ["Troca / R&I", "Troca/R&I", "TROCA / R&I", "TROCA/R&I"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl ExtractionConfig {
    pub fn column_min_width(&self, column: Column) -> f32 {
        match column {
            Column::Quantity => self.quantity_min_width,
            Column::Code => self.code_min_width,
            Column::Title => self.title_min_width,
        }
    }
}
