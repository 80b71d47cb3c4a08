use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{Mm, PdfDocument};

use super::{ReportError, ReportMeta, report_path, split_lines};

const PAGE_WIDTH: Mm = Mm(210.0);
const PAGE_HEIGHT: Mm = Mm(297.0);
const MARGIN_MM: f32 = 10.0;
const LINE_HEIGHT_MM: f32 = 5.0;
const FONT_SIZE: f32 = 12.0;
const LAYER_NAME: &str = "Layer 1";

/// Builtin PDF fonts only cover WinAnsi, which drops Cyrillic text.
static BODY_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Writes `report_<code>.pdf`, one text line per newline marker in `text`.
#[tracing::instrument(name = "report pdf", skip(text, meta), fields(report.code = %meta.code, report.lines))]
pub fn to_pdf_report(text: &str, meta: &ReportMeta, dir: &Path) -> Result<PathBuf, ReportError> {
    let path = report_path(dir, meta, "pdf");

    let (doc, page, layer) =
        PdfDocument::new(meta.title.as_str(), PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
    let font = doc
        .add_external_font(BODY_FONT)
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;

    let top = PAGE_HEIGHT.0 - MARGIN_MM;
    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = top;
    let mut lines = 0usize;

    for line in split_lines(text) {
        if y < MARGIN_MM {
            let (page, layer) = doc.add_page(PAGE_WIDTH, PAGE_HEIGHT, LAYER_NAME);
            current = doc.get_page(page).get_layer(layer);
            y = top;
        }
        current.use_text(line, FONT_SIZE, Mm(MARGIN_MM), Mm(y), &font);
        y -= LINE_HEIGHT_MM;
        lines += 1;
    }

    tracing::Span::current().record("report.lines", lines);

    let file = File::create(&path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;

    Ok(path)
}
