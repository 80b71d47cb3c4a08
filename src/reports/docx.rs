use std::fs::File;
use std::path::{Path, PathBuf};

use docx_rs::{BreakType, Docx, Paragraph, Run, Style, StyleType};

use super::{ReportError, ReportMeta, report_path, split_lines};

const HEADING_STYLE: &str = "Heading1";

/// Writes `report_<code>.docx` with the title as a level-1 heading followed by
/// the analysis text. An existing file at that path is replaced.
#[tracing::instrument(name = "report docx", skip(text, meta), fields(report.code = %meta.code))]
pub fn to_docx_report(text: &str, meta: &ReportMeta, dir: &Path) -> Result<PathBuf, ReportError> {
    let path = report_path(dir, meta, "docx");

    let file = File::create(&path)?;
    build_document(text, meta)
        .build()
        .pack(file)
        .map_err(|e| ReportError::Docx(e.to_string()))?;

    tracing::debug!(path = %path.display(), "DOCX report written");

    Ok(path)
}

fn build_document(text: &str, meta: &ReportMeta) -> Docx {
    let heading = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 1")
        .size(32)
        .bold();

    // One paragraph, with line breaks where the text has newlines.
    let mut body = Run::new();
    for (i, line) in split_lines(text).enumerate() {
        if i > 0 {
            body = body.add_break(BreakType::TextWrapping);
        }
        body = body.add_text(line);
    }

    Docx::new()
        .add_style(heading)
        .add_paragraph(
            Paragraph::new()
                .add_run(Run::new().add_text(meta.title.as_str()))
                .style(HEADING_STYLE),
        )
        .add_paragraph(Paragraph::new().add_run(body))
}
