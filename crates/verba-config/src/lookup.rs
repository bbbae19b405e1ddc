use std::env;

use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Maximum examples and synonyms kept on finalization.
    pub example_limit: usize,
    /// Preferred maximum example length.
    pub example_char_limit: usize,
    /// Top-up examples by exclusion instead of the positional slice.
    pub dedup_top_up: bool,
    /// Source language of looked-up words.
    pub src_lang: String,
    /// Target language for example-sentence pairs.
    pub example_lang: String,
    /// Target language for translations.
    pub translation_lang: String,
}

impl LookupConfig {
    pub fn new() -> Self {
        let example_limit = env::var("EXAMPLE_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let example_char_limit = env::var("EXAMPLE_CHAR_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(150);

        let dedup_top_up = env::var("EXAMPLE_DEDUP_TOP_UP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

        Self {
            example_limit,
            example_char_limit,
            dedup_top_up,
            src_lang: env::var("SRC_LANG").unwrap_or_else(|_| "en".to_string()),
            example_lang: env::var("EXAMPLE_LANG").unwrap_or_else(|_| "fr".to_string()),
            translation_lang: env::var("TRANSLATION_LANG").unwrap_or_else(|_| "zh".to_string()),
        }
    }
}
