pub mod docx;
pub mod json;
pub mod pdf;
pub mod store;
pub mod xlsx;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use docx::to_docx_report;
pub use json::{JsonReport, to_json_report};
pub use pdf::to_pdf_report;
pub use store::ArtifactStore;
pub use xlsx::to_excel_report;

/// Free-form report metadata. `title` and `code` are the only keys the
/// formatters read; anything else is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub code: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ReportMeta {
    pub fn new(title: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            code: code.into(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Text,
    Pdf,
    Xlsx,
    Docx,
}

impl ReportFormat {
    pub const FILE_FORMATS: [ReportFormat; 3] =
        [ReportFormat::Pdf, ReportFormat::Xlsx, ReportFormat::Docx];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Text => "text",
            ReportFormat::Pdf => "pdf",
            ReportFormat::Xlsx => "xlsx",
            ReportFormat::Docx => "docx",
        }
    }

    /// Extension of the file this format writes, `None` for inline formats.
    pub fn file_extension(&self) -> Option<&'static str> {
        match self {
            ReportFormat::Pdf | ReportFormat::Xlsx | ReportFormat::Docx => Some(self.as_str()),
            ReportFormat::Json | ReportFormat::Text => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ReportFormat::Json => "application/json",
            ReportFormat::Text => "text/plain; charset=utf-8",
            ReportFormat::Pdf => "application/pdf",
            ReportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ReportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::FILE_FORMATS
            .into_iter()
            .find(|f| f.file_extension() == Some(ext))
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "json" => Ok(ReportFormat::Json),
            "text" | "txt" => Ok(ReportFormat::Text),
            "pdf" => Ok(ReportFormat::Pdf),
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            "docx" | "word" => Ok(ReportFormat::Docx),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// A generated report file, owned by the [`ArtifactStore`] directory `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportArtifact {
    pub id: Uuid,
    pub format: ReportFormat,
    pub path: PathBuf,
}

impl ReportArtifact {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("report.{}", self.format))
    }
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("unsupported report format: {0}")]
    UnsupportedFormat(String),

    #[error("{0} reports are not written to disk")]
    NotAFile(ReportFormat),

    #[error("report not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("DOCX error: {0}")]
    Docx(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

/// Splits on real newlines and on the two-character `\n` escape that
/// upstream text often carries.
pub(crate) fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .flat_map(|line| line.split("\\n"))
        .map(|line| line.trim_end_matches('\r'))
}

/// Writes the report for `format` into `dir` and returns its path.
pub fn write_report(
    format: ReportFormat,
    text: &str,
    meta: &ReportMeta,
    dir: &Path,
) -> Result<PathBuf, ReportError> {
    match format {
        ReportFormat::Pdf => to_pdf_report(text, meta, dir),
        ReportFormat::Xlsx => to_excel_report(text, meta, dir),
        ReportFormat::Docx => to_docx_report(text, meta, dir),
        ReportFormat::Json | ReportFormat::Text => Err(ReportError::NotAFile(format)),
    }
}

/// `report_<code>.<ext>`, with anything outside `[A-Za-z0-9_-]` in the code
/// replaced so the name stays inside its directory.
pub fn report_file_name(code: &str, ext: &str) -> String {
    let code: String = code
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("report_{code}.{ext}")
}

pub(crate) fn report_path(dir: &Path, meta: &ReportMeta, ext: &str) -> PathBuf {
    dir.join(report_file_name(&meta.code, ext))
}
