use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};

use super::metrics::text_width;
use super::{REPORT_TITLE, ReportError, ReportRecord, encode_latin1};

const PT_PER_MM: f32 = 72.0 / 25.4;

// A4 portrait, millimetres.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 20.0;
const CELL_HEIGHT: f32 = 10.0;
const CELL_PADDING: f32 = 1.0;

const FONT_NAME: &str = "F1";
const FONT_SIZE: f32 = 16.0;

/// Renders the report as a standalone PDF.
pub fn render(record: &ReportRecord) -> Result<Vec<u8>, ReportError> {
    let lines = record.lines();
    let pages = layout(&lines)?;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_NAME => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            (PAGE_WIDTH * PT_PER_MM).into(),
            (PAGE_HEIGHT * PT_PER_MM).into(),
        ],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(REPORT_TITLE),
        "Producer" => Object::string_literal("deepfake-backend"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Lays lines out top to bottom in fixed-height cells, one content stream per page.
///
/// The first line is the title, centered across the printable width; the rest sit at the left
/// margin. Empty lines only advance the cursor.
pub(crate) fn layout(lines: &[(&'static str, String)]) -> Result<Vec<Vec<Operation>>, ReportError> {
    let font_height = FONT_SIZE / PT_PER_MM;
    let page_break_at = PAGE_HEIGHT - BOTTOM_MARGIN;

    let mut pages = Vec::new();
    let mut current = Vec::new();
    let mut y = MARGIN;

    for (index, (field, line)) in lines.iter().enumerate() {
        if y + CELL_HEIGHT > page_break_at {
            pages.push(std::mem::take(&mut current));
            y = MARGIN;
        }

        if !line.is_empty() {
            let text = encode_latin1(*field, line)?;
            let x = if index == 0 {
                let width = text_width(&text, FONT_SIZE) / PT_PER_MM;
                MARGIN + (PAGE_WIDTH - 2.0 * MARGIN - width) / 2.0
            } else {
                MARGIN + CELL_PADDING
            };
            let baseline = y + 0.5 * CELL_HEIGHT + 0.3 * font_height;
            current.extend(text_operations(text, x, baseline));
        }

        y += CELL_HEIGHT;
    }

    pages.push(current);
    Ok(pages)
}

fn text_operations(text: Vec<u8>, x_mm: f32, baseline_mm: f32) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![FONT_NAME.into(), FONT_SIZE.into()]),
        Operation::new(
            "Td",
            vec![
                (x_mm * PT_PER_MM).into(),
                ((PAGE_HEIGHT - baseline_mm) * PT_PER_MM).into(),
            ],
        ),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Text shown by every `Tj` on every page, decoded as Latin-1.
#[cfg(test)]
pub(crate) fn shown_text(pdf: &[u8]) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let mut shown = Vec::new();
    for (_, page_id) in doc.get_pages() {
        let data = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&data).unwrap();
        for op in content.operations.iter().filter(|op| op.operator == "Tj") {
            let bytes = op.operands[0].as_str().unwrap();
            shown.push(bytes.iter().map(|&b| b as char).collect());
        }
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Label;

    fn sample_record() -> ReportRecord {
        ReportRecord::new("Ada", Label::Fake, 0.73, "2024-01-01 00:00:00", "x.png")
    }

    #[test]
    fn renders_prediction_and_score() {
        let pdf = render(&sample_record()).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.5"));

        let text = shown_text(&pdf);
        assert!(text.iter().any(|line| line.contains("Prediction: Fake")));
        assert!(text.iter().any(|line| line.contains("Prediction Accuracy: 0.7300")));
        assert_eq!(text[0], "Fake Image Detection Report");
        assert_eq!(text.len(), 7);
    }

    #[test]
    fn report_fits_on_one_page() {
        let pdf = render(&sample_record()).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn non_latin_user_name_is_an_encoding_error() {
        let mut record = sample_record();
        record.user_name = "名前".to_string();

        let err = render(&record).unwrap_err();
        assert!(matches!(err, ReportError::Encoding { field: "user_name", .. }));
    }

    #[test]
    fn non_latin_file_name_is_an_encoding_error() {
        let mut record = sample_record();
        record.source_filename = "фото.png".to_string();

        let err = render(&record).unwrap_err();
        assert!(matches!(err, ReportError::Encoding { field: "source_filename", .. }));
    }

    #[test]
    fn control_characters_with_no_winansi_glyph_are_rejected() {
        let mut record = sample_record();
        record.user_name = "Ada\u{80}".to_string();

        let err = render(&record).unwrap_err();
        assert!(matches!(err, ReportError::Encoding { field: "user_name", ch: '\u{80}' }));
    }

    #[test]
    fn latin1_names_round_trip() {
        let mut record = sample_record();
        record.user_name = "Zoë Ångström".to_string();

        let text = shown_text(&render(&record).unwrap());
        assert!(text.contains(&"User Name: Zoë Ångström".to_string()));
    }

    #[test]
    fn title_is_centered_and_fields_are_left_aligned() {
        let pages = layout(&sample_record().lines()).unwrap();
        let offsets: Vec<f32> = pages[0]
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| op.operands[0].as_float().unwrap())
            .collect();

        let left = (MARGIN + CELL_PADDING) * PT_PER_MM;
        assert!(offsets[0] > left + 50.0);
        assert!(offsets[1..].iter().all(|x| (x - left).abs() < 0.01));
    }

    #[test]
    fn spacer_line_leaves_a_gap_after_the_title() {
        let pages = layout(&sample_record().lines()).unwrap();
        let baselines: Vec<f32> = pages[0]
            .iter()
            .filter(|op| op.operator == "Td")
            .map(|op| op.operands[1].as_float().unwrap())
            .collect();

        let cell = CELL_HEIGHT * PT_PER_MM;
        assert!((baselines[0] - baselines[1] - 2.0 * cell).abs() < 0.01);
        assert!((baselines[1] - baselines[2] - cell).abs() < 0.01);
    }

    #[test]
    fn long_documents_break_onto_new_pages() {
        let lines: Vec<(&'static str, String)> =
            (0..30).map(|i| ("line", format!("Line {}", i))).collect();

        let pages = layout(&lines).unwrap();
        assert_eq!(pages.len(), 2);

        let shown = |ops: &Vec<Operation>| ops.iter().filter(|op| op.operator == "Tj").count();
        assert_eq!(shown(&pages[0]), 26);
        assert_eq!(shown(&pages[1]), 4);
    }
}
