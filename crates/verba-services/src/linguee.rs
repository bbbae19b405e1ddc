use async_trait::async_trait;
use serde::Deserialize;

use verba_core::{Language, TranslatedSentence, Translation, Word, WordError, WordInfo, WordService};

use crate::text::tidy_markers;

const PROXY_THROTTLED: &str = "The Linguee server returned 503";
const TRANSLATIONS_PER_ITEM: usize = 5;

/// Linguee (via a self-hosted proxy): translations, translated sentence
/// pairs and bare example sentences, keyed by language pair.
pub struct Linguee {
    client: reqwest::Client,
    base_url: String,
    src: Language,
    dst: Language,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TranslationItem {
    translations: Vec<TranslationText>,
}

#[derive(Debug, Deserialize)]
struct TranslationText {
    text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourcePair {
    src: String,
    dst: String,
}

#[derive(Debug, Deserialize)]
struct ProxyError {
    message: String,
}

impl Linguee {
    pub fn new(client: reqwest::Client, base_url: String, src: Language, dst: Language) -> Self {
        Self {
            client,
            base_url,
            src,
            dst,
        }
    }

    /// Proxy errors are swallowed except the 503 passthrough, which means
    /// Linguee itself is throttling us.
    async fn fetch(&self, endpoint: &str, query: &str) -> Result<Option<reqwest::Response>, WordError> {
        let url = format!(
            "{}/api/v2/{endpoint}?query={query}&src={}&dst={}",
            self.base_url, self.src, self.dst
        );

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Linguee proxy unreachable");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            if let Ok(err) = response.json::<ProxyError>().await {
                if err.message == PROXY_THROTTLED {
                    return Err(WordError::RateLimitExceeded("Linguee"));
                }
            }
            return Ok(None);
        }

        Ok(Some(response))
    }

    /// Up to five translation texts per result item, each its own
    /// candidate.
    fn collect_translations(items: Vec<TranslationItem>) -> Vec<Translation> {
        let mut out = Vec::new();
        for item in items {
            for text in item.translations.into_iter().take(TRANSLATIONS_PER_ITEM) {
                out.push(Translation {
                    text: Some(text.text),
                    examples: Vec::new(),
                });
            }
        }
        out
    }

    /// Attach the sentence pairs to every translation contributed by this
    /// call and extend every previously-existing candidate's pair list. A
    /// bare translation is created when pairs exist but the translations
    /// endpoint produced nothing.
    fn attach_pairs(word: &mut Word, fresh: &mut Vec<Translation>, pairs: Vec<TranslatedSentence>) {
        if pairs.is_empty() {
            return;
        }
        if fresh.is_empty() {
            fresh.push(Translation::default());
        }
        for translation in fresh.iter_mut() {
            translation.examples = pairs.clone();
        }
        for prev in &mut word.translations {
            prev.examples.extend(pairs.iter().cloned());
        }
    }
}

#[async_trait]
impl WordService for Linguee {
    fn name(&self) -> &'static str {
        "Linguee"
    }

    fn info_available(&self) -> WordInfo {
        WordInfo::TRANSLATION_FULL | WordInfo::EXAMPLES
    }

    async fn process(&self, word: &mut Word, info: WordInfo) -> Result<(), WordError> {
        let want_translation = info.intersects(WordInfo::TRANSLATION_FULL);
        let mut fresh: Vec<Translation> = Vec::new();

        if info.contains(WordInfo::TRANSLATION) {
            if let Some(response) = self.fetch("translations", &word.urlable).await? {
                match response.json::<Vec<TranslationItem>>().await {
                    Ok(items) => fresh = Self::collect_translations(items),
                    Err(e) => tracing::warn!(error = %e, "Linguee translations unreadable"),
                }
            }
        }

        if info.intersects(WordInfo::TRANSLATED_EXAMPLES | WordInfo::EXAMPLES) {
            if let Some(response) = self.fetch("external_sources", &word.urlable).await? {
                match response.json::<Vec<SourcePair>>().await {
                    Ok(items) => {
                        if info.contains(WordInfo::EXAMPLES) {
                            let sens: Vec<String> =
                                items.iter().map(|p| tidy_markers(&p.src)).collect();
                            word.push_examples(sens);
                        }

                        if info.contains(WordInfo::TRANSLATED_EXAMPLES) {
                            let pairs: Vec<TranslatedSentence> = items
                                .into_iter()
                                .map(|p| TranslatedSentence {
                                    source: tidy_markers(&p.src),
                                    target: tidy_markers(&p.dst),
                                })
                                .collect();
                            Self::attach_pairs(word, &mut fresh, pairs);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Linguee sources unreadable"),
                }
            }
        }

        if want_translation {
            word.translations.extend(fresh);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_translations_per_item_each_a_candidate() {
        let payload = r#"[
            {"translations": [
                {"text": "pain"}, {"text": "pain de mie"}, {"text": "t3"},
                {"text": "t4"}, {"text": "t5"}, {"text": "t6"}
            ]},
            {"translations": [{"text": "fric"}]}
        ]"#;
        let items: Vec<TranslationItem> = serde_json::from_str(payload).unwrap();

        let out = Linguee::collect_translations(items);
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].text.as_deref(), Some("pain"));
        assert_eq!(out[5].text.as_deref(), Some("fric"));
    }

    #[test]
    fn pairs_attach_to_fresh_and_extend_previous_candidates() {
        let mut word = Word::new("bread", None);
        word.translations = vec![Translation {
            text: Some("earlier".into()),
            examples: vec![TranslatedSentence {
                source: "old src".into(),
                target: "old dst".into(),
            }],
        }];

        let mut fresh = vec![Translation {
            text: Some("pain".into()),
            examples: Vec::new(),
        }];
        let pairs = vec![TranslatedSentence {
            source: "Bread is life.".into(),
            target: "Le pain, c'est la vie.".into(),
        }];

        Linguee::attach_pairs(&mut word, &mut fresh, pairs);

        assert_eq!(fresh[0].examples.len(), 1);
        assert_eq!(word.translations[0].examples.len(), 2);
    }

    #[test]
    fn bare_translation_created_when_only_pairs_exist() {
        let mut word = Word::new("bread", None);
        let mut fresh = Vec::new();
        let pairs = vec![TranslatedSentence {
            source: "s".into(),
            target: "t".into(),
        }];

        Linguee::attach_pairs(&mut word, &mut fresh, pairs);

        assert_eq!(fresh.len(), 1);
        assert!(fresh[0].text.is_none());
        assert_eq!(fresh[0].examples.len(), 1);
    }

    #[test]
    fn no_pairs_changes_nothing() {
        let mut word = Word::new("bread", None);
        let mut fresh = Vec::new();
        Linguee::attach_pairs(&mut word, &mut fresh, Vec::new());
        assert!(fresh.is_empty());
    }
}
