use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use verba_core::{Language, Translation, Word, WordError, WordInfo, WordService};

/// Google Cloud Translation v2 REST: a single translation candidate,
/// keyed by language pair. Any failure contributes nothing.
pub struct GoogleTranslate {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    src: Language,
    dst: Language,
}

#[derive(Debug, Deserialize)]
struct TranslatePayload {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

impl GoogleTranslate {
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: String,
        src: Language,
        dst: Language,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            src,
            dst,
        }
    }

    /// Wire codes differ from ours for Chinese.
    fn wire_code(lang: Language) -> &'static str {
        match lang {
            Language::Zh => "zh-CN",
            other => other.as_str(),
        }
    }
}

#[async_trait]
impl WordService for GoogleTranslate {
    fn name(&self) -> &'static str {
        "GoogleTranslate"
    }

    fn paid(&self) -> bool {
        true
    }

    fn hourly_quota(&self) -> Option<u32> {
        Some(1666)
    }

    fn info_available(&self) -> WordInfo {
        WordInfo::TRANSLATION
    }

    async fn process(&self, word: &mut Word, _info: WordInfo) -> Result<(), WordError> {
        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = json!({
            "q": word.text,
            "source": Self::wire_code(self.src),
            "target": Self::wire_code(self.dst),
            "format": "text",
        });

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "GoogleTranslate unreachable");
                return Ok(());
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "GoogleTranslate errored");
            return Ok(());
        }

        match response.json::<TranslatePayload>().await {
            Ok(payload) => {
                if let Some(first) = payload.data.translations.into_iter().next() {
                    word.translations.push(Translation {
                        text: Some(first.translated_text),
                        examples: Vec::new(),
                    });
                }
            }
            Err(e) => tracing::warn!(error = %e, "GoogleTranslate payload unreadable"),
        }

        Ok(())
    }
}
