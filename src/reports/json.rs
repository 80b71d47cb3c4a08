use serde::Serialize;

use super::{ReportError, ReportMeta};

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub meta: &'a ReportMeta,
    pub analysis: &'a str,
}

impl<'a> JsonReport<'a> {
    pub fn new(text: &'a str, meta: &'a ReportMeta) -> Self {
        Self {
            meta,
            analysis: text,
        }
    }

    pub fn to_value(&self) -> Result<serde_json::Value, ReportError> {
        Ok(serde_json::to_value(self)?)
    }
}

pub fn to_json_report(text: &str, meta: &ReportMeta) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(&JsonReport::new(text, meta))?)
}
