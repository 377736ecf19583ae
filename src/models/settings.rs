use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Farsi,
}

impl Language {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Some(Language::English),
            "farsi" | "fa" => Some(Language::Farsi),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Farsi => "farsi",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub id: i32,
    pub user_name: String,
    pub language: Language,
    pub currency: String,
    pub pattern_lookback: i64,
    pub recent_symbols_limit: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateSettingsInput {
    pub user_name: Option<String>,
    pub language: Option<Language>,
    pub currency: Option<String>,
    pub pattern_lookback: Option<i64>,
    pub recent_symbols_limit: Option<i64>,
}
