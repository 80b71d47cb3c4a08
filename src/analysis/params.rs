use std::fmt;

use serde_json::Value;

/// Characters of uploaded document text that make it into the prompt.
pub const MAX_CONTENT_CHARS: usize = 1500;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Language {
    Uz,
    #[default]
    Ru,
    En,
}

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uz" => Some(Language::Uz),
            "ru" => Some(Language::Ru),
            "en" => Some(Language::En),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::Ru => "ru",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view over the opaque `params` value. Unknown keys are ignored and a
/// key of the wrong shape falls back to its default without affecting the rest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisParams {
    pub lang: Language,
    pub period: Option<String>,
    pub content: Option<String>,
}

impl AnalysisParams {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let lang = match obj.get("lang").and_then(Value::as_str) {
            Some(s) => Language::parse(s).unwrap_or_else(|| {
                tracing::debug!(lang = s, "Unsupported language, using default");
                Language::default()
            }),
            None => Language::default(),
        };

        let period = obj
            .get("period")
            .and_then(|p| match p {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|p| !p.trim().is_empty());

        let content = obj
            .get("content")
            .and_then(Value::as_str)
            .map(|c| c.trim().chars().take(MAX_CONTENT_CHARS).collect::<String>())
            .filter(|c| !c.is_empty());

        Self {
            lang,
            period,
            content,
        }
    }
}
