use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

use super::{ReportError, ReportMeta, report_path};

// Excel rejects longer cell strings.
const MAX_CELL_CHARS: usize = 32_767;

/// Writes `report_<code>.xlsx`: a `meta` / `analysis` header row and one data
/// row holding the stringified meta and the analysis text.
#[tracing::instrument(name = "report xlsx", skip(text, meta), fields(report.code = %meta.code))]
pub fn to_excel_report(
    text: &str,
    meta: &ReportMeta,
    dir: &Path,
) -> Result<PathBuf, ReportError> {
    let path = report_path(dir, meta, "xlsx");
    let meta_json = serde_json::to_string(meta)?;

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Report")?;

    worksheet.write_string(0, 0, "meta")?;
    worksheet.write_string(0, 1, "analysis")?;
    worksheet.write_string(1, 0, clip(&meta_json))?;
    worksheet.write_string(1, 1, clip(text))?;

    workbook.save(&path)?;

    tracing::debug!(path = %path.display(), "XLSX report written");

    Ok(path)
}

fn clip(s: &str) -> String {
    if s.chars().count() <= MAX_CELL_CHARS {
        s.to_string()
    } else {
        s.chars().take(MAX_CELL_CHARS).collect()
    }
}
