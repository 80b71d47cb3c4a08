use super::params::{AnalysisParams, Language};
use crate::reports::ReportFormat;

pub fn system_prompt(lang: Language) -> String {
    let language = match lang {
        Language::Uz => "Uzbek",
        Language::Ru => "Russian",
        Language::En => "English",
    };
    format!(
        "You are a financial consultant. Analyze the data you are given and answer in \
         {language} ({lang}). Write plain text without markdown; separate paragraphs with \
         new lines."
    )
}

pub fn user_prompt(code: &str, format: ReportFormat, params: &AnalysisParams) -> String {
    let mut prompt = String::new();

    if let Some(content) = &params.content {
        prompt.push_str("Data:\n");
        prompt.push_str(content);
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!("Analyze by code: {code}, format: {format}"));
    if let Some(period) = &params.period {
        prompt.push_str(&format!(", period: {period}"));
    }

    prompt
}
