use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Languages the translation providers are keyed on (ISO 639-1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Zh,
    Fr,
    Es,
    Pt,
    De,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Zh => "zh",
            Language::Fr => "fr",
            Language::Es => "es",
            Language::Pt => "pt",
            Language::De => "de",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown language code: {0}")]
pub struct UnknownLanguage(String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "zh" => Ok(Language::Zh),
            "fr" => Ok(Language::Fr),
            "es" => Ok(Language::Es),
            "pt" => Ok(Language::Pt),
            "de" => Ok(Language::De),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}
