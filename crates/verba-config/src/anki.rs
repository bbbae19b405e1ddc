use std::env;

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct AnkiConfig {
    /// AnkiConnect URL
    pub url: String,
    /// Default deck name
    pub deck: String,
    /// Note model name
    pub model: String,
}

impl AnkiConfig {
    pub fn new() -> Self {
        Self {
            url: env::var("ANKI_URL").unwrap_or_else(|_| "http://127.0.0.1:8765".to_string()),
            deck: env::var("ANKI_DECK").unwrap_or_else(|_| "Verba Words".to_string()),
            model: env::var("ANKI_MODEL").unwrap_or_else(|_| "Basic".to_string()),
        }
    }
}
