use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use verba_core::{Meaning, Word, WordError, WordInfo, WordService};
use verba_core::word::urlify;

use crate::text::dedup_similar;

/// Example texts within this edit distance are considered the same
/// sentence; the feed repeats lightly-edited copies across sources.
const FUZZ_THRESHOLD: usize = 10;

/// Wordnik: definitions and example sentences on a metered key.
pub struct Wordnik {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DefinitionItem {
    text: Option<String>,
    #[serde(rename = "sourceDictionary")]
    source_dictionary: Option<String>,
    #[serde(rename = "partOfSpeech")]
    part_of_speech: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamplesPayload {
    #[serde(default)]
    examples: Vec<ExampleItem>,
}

#[derive(Debug, Deserialize)]
struct ExampleItem {
    text: String,
}

impl Wordnik {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    fn check_status(&self, status: StatusCode, word: &Word) -> Result<(), WordError> {
        if status == StatusCode::NOT_FOUND {
            return Err(WordError::DefinitionNotFound(word.raw_input.clone()));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WordError::RateLimitExceeded("Wordnik"));
        }
        Ok(())
    }

    /// Items with no text are skipped (the API sometimes omits it); the
    /// source dictionary is kept as a definition suffix.
    fn collect_definitions(items: Vec<DefinitionItem>, wanted: WordInfo) -> Vec<Meaning> {
        items
            .into_iter()
            .filter_map(|item| {
                let text = item.text?;
                let mut meaning = Meaning::default();

                if wanted.contains(WordInfo::DEFINITION) {
                    meaning.definition = Some(match item.source_dictionary {
                        Some(src) => format!("{text} ({src})"),
                        None => text,
                    });
                }
                if wanted.contains(WordInfo::POS) {
                    meaning.pos = item.part_of_speech;
                }

                Some(meaning)
            })
            .collect()
    }

    fn collect_examples(payload: ExamplesPayload) -> Vec<String> {
        let texts = payload.examples.into_iter().map(|e| e.text).collect();
        dedup_similar(texts, FUZZ_THRESHOLD)
    }
}

#[async_trait]
impl WordService for Wordnik {
    fn name(&self) -> &'static str {
        "Wordnik"
    }

    fn paid(&self) -> bool {
        true
    }

    fn hourly_quota(&self) -> Option<u32> {
        Some(100)
    }

    fn info_available(&self) -> WordInfo {
        WordInfo::DEFINITION | WordInfo::POS | WordInfo::EXAMPLES
    }

    async fn process(&self, word: &mut Word, info: WordInfo) -> Result<(), WordError> {
        if info.intersects(WordInfo::DEFINITION | WordInfo::POS) {
            let url = format!(
                "{}/word.json/{}/definitions?limit=10&sourceDictionaries=ahd-5%2Ccentury&api_key={}",
                self.base_url,
                word.urlable.to_lowercase(),
                self.api_key
            );

            match self.client.get(&url).send().await {
                Ok(response) => {
                    self.check_status(response.status(), word)?;
                    match response.json::<Vec<DefinitionItem>>().await {
                        Ok(items) => {
                            word.meanings.extend(Self::collect_definitions(items, info));
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Wordnik definitions unreadable");
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Wordnik unreachable"),
            }
        }

        if info.contains(WordInfo::EXAMPLES) {
            // keyed on the (possibly provider-corrected) display text
            let url = format!(
                "{}/word.json/{}/examples?api_key={}",
                self.base_url,
                urlify(&word.text),
                self.api_key
            );

            match self.client.get(&url).send().await {
                Ok(response) => {
                    self.check_status(response.status(), word)?;
                    match response.json::<ExamplesPayload>().await {
                        Ok(payload) => word.push_examples(Self::collect_examples(payload)),
                        Err(e) => {
                            tracing::warn!(error = %e, "Wordnik examples unreadable");
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "Wordnik unreachable"),
            }
        }

        Ok(())
    }
}
