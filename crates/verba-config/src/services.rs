use std::env;

use serde::{Deserialize, Serialize};

fn default_free_dictionary_url() -> String {
    "https://api.dictionaryapi.dev/api/v2/entries/en".to_string()
}

fn default_wordnik_url() -> String {
    "https://api.wordnik.com/v4".to_string()
}

fn default_linguee_url() -> String {
    "http://127.0.0.1:8010".to_string()
}

fn default_google_translate_url() -> String {
    "https://translation.googleapis.com/language/translate/v2".to_string()
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    #[serde(default = "default_free_dictionary_url")]
    pub free_dictionary_url: String,
    #[serde(default = "default_wordnik_url")]
    pub wordnik_url: String,
    #[serde(default)]
    pub wordnik_api_key: String,
    /// Self-hosted Linguee proxy base URL.
    #[serde(default = "default_linguee_url")]
    pub linguee_url: String,
    #[serde(default = "default_google_translate_url")]
    pub google_translate_url: String,
    #[serde(default)]
    pub google_api_key: String,
}

impl ServicesConfig {
    pub fn new() -> Self {
        Self {
            free_dictionary_url: env::var("FREE_DICTIONARY_URL")
                .unwrap_or_else(|_| default_free_dictionary_url()),
            wordnik_url: env::var("WORDNIK_URL").unwrap_or_else(|_| default_wordnik_url()),
            wordnik_api_key: env::var("WORDNIK_API_KEY").unwrap_or_default(),
            linguee_url: env::var("LINGUEE_URL").unwrap_or_else(|_| default_linguee_url()),
            google_translate_url: env::var("GOOGLE_TRANSLATE_URL")
                .unwrap_or_else(|_| default_google_translate_url()),
            google_api_key: env::var("GOOGLE_API_KEY").unwrap_or_default(),
        }
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self::new()
    }
}
