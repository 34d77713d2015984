//! Integration tests for pdf-item-table

use pdf_item_table::config::{normalize_label, Column};
use pdf_item_table::header::locate_header;
use pdf_item_table::pipeline::trace_extraction;
use pdf_item_table::{
    extract_first_page, extract_first_page_mem, extract_items, output_file_name, process_batch,
    process_pdf, process_pdf_mem, write_csv, ExtractError, ExtractionConfig, HeaderLabel,
    HeaderLabels, PageTokens, Token,
};
use std::path::Path;

// Helper to create a token roughly the width of its text
fn make_token(text: &str, x0: f32, top: f32) -> Token {
    let width = text.chars().count() as f32 * 5.0;
    Token::new(text, x0, top, x0 + width, top + 10.0)
}

fn make_page(tokens: Vec<Token>) -> PageTokens {
    PageTokens {
        page_number: 1,
        width: 600.0,
        height: 800.0,
        tokens,
    }
}

fn header_tokens() -> Vec<Token> {
    vec![
        make_token("OPERAÇÕES", 20.0, 100.0),
        make_token("QTD", 120.0, 100.0),
        make_token("CÓDIGO", 160.0, 100.0),
        make_token("TITULO", 240.0, 100.0),
        make_token("FORNECIMENTO", 480.0, 100.0),
    ]
}

/// Header, two items (the first wrapping onto a second line), a summary
/// anchor and a row below it that must not be read.
fn work_order_tokens() -> Vec<Token> {
    let mut tokens = header_tokens();
    tokens.extend([
        make_token("Troca", 20.0, 120.0),
        make_token("1", 125.0, 120.0),
        make_token("7701208265", 165.0, 120.0),
        make_token("Pastilha", 245.0, 120.0),
        make_token("de", 290.0, 120.0),
        make_token("freio", 305.0, 120.0),
        make_token("Original", 500.0, 120.0),
        make_token("dianteira", 245.0, 131.0),
        make_token("2", 125.0, 145.0),
        make_token("8200768913", 165.0, 145.0),
        make_token("Filtro", 245.0, 145.0),
        make_token("Troca/R&I", 20.0, 200.0),
        make_token("3", 125.0, 220.0),
        make_token("0000000000", 165.0, 220.0),
        make_token("Ignorado", 245.0, 220.0),
    ]);
    tokens
}

/// Build a one-page PDF showing each (text, x, baseline) with Helvetica 10pt
fn make_test_pdf(words: &[(&str, i64, i64)]) -> Vec<u8> {
    use lopdf::dictionary;
    use lopdf::{Document, Object, Stream};

    let mut doc = Document::with_version("1.4");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let content: String = words
        .iter()
        .map(|(text, x, y)| format!("BT /F1 10 Tf {} {} Td ({}) Tj ET\n", x, y, text))
        .collect();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    };

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "MediaBox" => vec![0.into(), 0.into(), 600.into(), 800.into()],
        "Contents" => content_id,
        "Resources" => resources,
    });

    let pages_id = doc.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    });

    if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
        dict.set("Parent", pages_id);
    }

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

fn work_order_pdf() -> Vec<u8> {
    make_test_pdf(&[
        ("OPERACOES", 20, 700),
        ("QTD", 120, 700),
        ("CODIGO", 160, 700),
        ("TITULO", 240, 700),
        ("FORNECIMENTO", 480, 700),
        ("1", 125, 680),
        ("AB-100", 170, 680),
        ("Pastilha de freio", 250, 680),
        ("dianteira", 250, 670),
        ("2", 125, 650),
        ("CD-200", 170, 650),
        ("Filtro", 250, 650),
        ("Troca/R&I", 20, 620),
        ("9", 125, 600),
        ("ZZ-999", 170, 600),
        ("Ignorado", 250, 600),
    ])
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_extraction_config_default() {
    let config = ExtractionConfig::default();
    assert_eq!(config.column_gap, 2.0);
    assert_eq!(config.header_tolerance, 5.0);
    assert_eq!(config.merge_tolerance, 15.0);
    assert!((config.overlap_ratio - 0.4).abs() < 0.001);
    assert!((config.stop_anchor_max_x_ratio - 0.2).abs() < 0.001);
}

#[test]
fn test_custom_labels() {
    let labels = HeaderLabels::new([
        (HeaderLabel::Operations, vec!["OPS"]),
        (HeaderLabel::Quantity, vec!["Qty"]),
        (HeaderLabel::Code, vec!["Code"]),
        (HeaderLabel::Title, vec!["Title"]),
        (HeaderLabel::Supply, vec!["Supply"]),
    ]);
    assert_eq!(labels.variants(HeaderLabel::Quantity), ["QTY".to_string()]);

    let config = ExtractionConfig {
        labels,
        stop_anchors: vec!["Subtotal".to_string()],
        ..ExtractionConfig::default()
    };
    let tokens = vec![
        make_token("OPS", 20.0, 100.0),
        make_token("Qty", 120.0, 100.0),
        make_token("Code", 160.0, 100.0),
        make_token("Title", 240.0, 100.0),
        make_token("Supply", 480.0, 100.0),
        make_token("4", 125.0, 120.0),
        make_token("Front", 245.0, 120.0),
        make_token("Subtotal", 20.0, 140.0),
        make_token("5", 125.0, 160.0),
        make_token("Rear", 245.0, 160.0),
    ];
    let table = extract_items(&make_page(tokens), &config).unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].title, "Front");
}

#[test]
fn test_normalize_label_collapses_whitespace() {
    assert_eq!(normalize_label(" Troca \n / R&I "), "TROCA / R&I");
}

// ============================================================================
// Header / Boundary Tests
// ============================================================================

#[test]
fn test_boundaries_non_overlapping_and_ordered() {
    let config = ExtractionConfig::default();
    let layout = locate_header(&header_tokens(), 600.0, 800.0, &config).unwrap();

    let code_anchor = layout.anchor(HeaderLabel::Code).unwrap();
    let qtd = layout.column(Column::Quantity).unwrap();
    assert_eq!(qtd.x1, code_anchor.x0 - config.column_gap);

    for pair in layout.columns.windows(2) {
        assert!(pair[0].x1 <= pair[1].x0, "{:?} overlaps {:?}", pair[0], pair[1]);
        assert!(pair[0].x0 < pair[1].x0);
    }
    let supply = layout.anchor(HeaderLabel::Supply).unwrap();
    assert_eq!(layout.column(Column::Title).unwrap().x1, supply.x0 - config.column_gap);
}

#[test]
fn test_header_not_found_without_supply_label() {
    let mut tokens = work_order_tokens();
    tokens.retain(|t| t.text != "FORNECIMENTO");
    let err = extract_items(&make_page(tokens), &ExtractionConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::HeaderNotFound(_)));
}

// ============================================================================
// End-to-End Token Pipeline Tests
// ============================================================================

#[test]
fn test_end_to_end_work_order() {
    let table = extract_items(&make_page(work_order_tokens()), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(table.page_number, 1);
    assert_eq!(table.rows.len(), 2);

    assert_eq!(table.rows[0].quantity, 1.0);
    assert_eq!(table.rows[0].code, "7701208265");
    assert_eq!(table.rows[0].title, "Pastilha de freio dianteira");

    assert_eq!(table.rows[1].quantity, 2.0);
    assert_eq!(table.rows[1].code, "8200768913");
    assert_eq!(table.rows[1].title, "Filtro");
}

#[test]
fn test_tokens_at_or_below_stop_anchor_excluded() {
    let trace =
        trace_extraction(&make_page(work_order_tokens()), &ExtractionConfig::default()).unwrap();
    assert!(trace.region.stop_anchor_found);
    assert_eq!(trace.region.y_stop, 198.0);
    assert!(trace.region.tokens.iter().all(|t| t.top < 198.0));
    assert!(!trace.region.tokens.iter().any(|t| t.text == "Ignorado"));
}

#[test]
fn test_without_stop_anchor_reads_to_page_bottom() {
    let mut tokens = work_order_tokens();
    tokens.retain(|t| t.text != "Troca/R&I");
    let table = extract_items(&make_page(tokens), &ExtractionConfig::default()).unwrap();
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.rows[2].title, "Ignorado");
}

#[test]
fn test_extraction_is_idempotent() {
    let page = make_page(work_order_tokens());
    let config = ExtractionConfig::default();
    let first = extract_items(&page, &config).unwrap();
    let second = extract_items(&page, &config).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_token_order_does_not_change_result() {
    let config = ExtractionConfig::default();
    let forward = extract_items(&make_page(work_order_tokens()), &config).unwrap();

    let mut reversed = work_order_tokens();
    reversed.reverse();
    let backward = extract_items(&make_page(reversed), &config).unwrap();

    let mut interleaved = work_order_tokens();
    interleaved.rotate_left(7);
    let rotated = extract_items(&make_page(interleaved), &config).unwrap();

    assert_eq!(forward, backward);
    assert_eq!(forward, rotated);
}

#[test]
fn test_empty_data_region() {
    let err = extract_items(&make_page(header_tokens()), &ExtractionConfig::default())
        .unwrap_err();
    assert!(matches!(err, ExtractError::EmptyDataRegion));
}

#[test]
fn test_no_extractable_rows() {
    let mut tokens = header_tokens();
    tokens.push(make_token("abc", 125.0, 120.0));
    tokens.push(make_token("Sem", 245.0, 120.0));
    let err = extract_items(&make_page(tokens), &ExtractionConfig::default()).unwrap_err();
    assert!(matches!(err, ExtractError::NoExtractableRows));
}

// ============================================================================
// PDF Extraction Tests
// ============================================================================

#[test]
fn test_extract_first_page_mem_tokens() {
    let page = extract_first_page_mem(&work_order_pdf()).unwrap();
    assert_eq!(page.page_number, 1);
    assert_eq!(page.width, 600.0);
    assert_eq!(page.height, 800.0);

    let qtd = page.tokens.iter().find(|t| t.text == "QTD").unwrap();
    assert!((qtd.x0 - 120.0).abs() < 0.01);
    assert!(qtd.x1 > qtd.x0);
    assert!(qtd.bottom > qtd.top);
    // Baseline 700 on an 800 high page
    assert!((qtd.top - 92.0).abs() < 0.01);

    // Shown strings are split into words
    assert!(page.tokens.iter().any(|t| t.text == "Pastilha"));
    assert!(page.tokens.iter().any(|t| t.text == "freio"));
}

#[test]
fn test_process_pdf_mem_end_to_end() {
    let table = process_pdf_mem(&work_order_pdf(), &ExtractionConfig::default()).unwrap();
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].quantity_text, "1");
    assert_eq!(table.rows[0].code, "AB-100");
    assert_eq!(table.rows[0].title, "Pastilha de freio dianteira");
    assert_eq!(table.rows[1].code, "CD-200");
    assert_eq!(table.rows[1].title, "Filtro");
}

#[test]
fn test_extract_first_page_nonexistent_file() {
    let result = extract_first_page("/nonexistent/file.pdf");
    assert!(matches!(result, Err(ExtractError::FileNotFound(_))));
}

#[test]
fn test_process_pdf_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("OS-1234.pdf");
    std::fs::write(&path, work_order_pdf()).unwrap();

    let table = process_pdf(&path, &ExtractionConfig::default()).unwrap();
    assert_eq!(table.rows.len(), 2);
}

// ============================================================================
// Batch and Output Tests
// ============================================================================

#[test]
fn test_batch_continues_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.pdf");
    let no_header = dir.path().join("no_header.pdf");
    let missing = dir.path().join("missing.pdf");
    std::fs::write(&good, work_order_pdf()).unwrap();
    std::fs::write(&no_header, make_test_pdf(&[("Hello", 100, 700)])).unwrap();

    let outcomes = process_batch(
        &[good.clone(), no_header.clone(), missing.clone()],
        &ExtractionConfig::default(),
    );
    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(matches!(
        outcomes[1].result,
        Err(ExtractError::HeaderNotFound(_))
    ));
    assert!(matches!(
        outcomes[2].result,
        Err(ExtractError::FileNotFound(_))
    ));
    assert_eq!(outcomes[2].source, missing);
}

#[test]
fn test_csv_output_for_extracted_table() {
    let table = process_pdf_mem(&work_order_pdf(), &ExtractionConfig::default()).unwrap();
    let mut buf = Vec::new();
    write_csv(&mut buf, &table).unwrap();
    let text = String::from_utf8(buf).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "QTD,CÓDIGO,TITULO",
            "1,AB-100,Pastilha de freio dianteira",
            "2,CD-200,Filtro",
        ]
    );
}

#[test]
fn test_output_naming() {
    assert_eq!(
        output_file_name(Path::new("uploads/orcamento.pdf"), "csv"),
        Path::new("orcamento_extracao.csv")
    );
}
