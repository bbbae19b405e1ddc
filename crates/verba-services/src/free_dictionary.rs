use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

use verba_core::{Meaning, Word, WordError, WordInfo, WordService};

/// Free Dictionary API (dictionaryapi.dev): the full monolingual set, no
/// quota, English only.
pub struct FreeDictionary {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Entry {
    word: String,
    phonetic: Option<String>,
    origin: Option<String>,
    meanings: Vec<EntryMeaning>,
}

#[derive(Debug, Deserialize)]
struct EntryMeaning {
    #[serde(rename = "partOfSpeech")]
    part_of_speech: Option<String>,
    definitions: Vec<EntryDefinition>,
}

#[derive(Debug, Deserialize)]
struct EntryDefinition {
    definition: String,
    #[serde(default)]
    synonyms: Vec<String>,
    example: Option<String>,
}

impl FreeDictionary {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    /// One candidate per (entry meaning, definition), fields masked by the
    /// requested info. Returns the corrected headword alongside.
    fn collect(
        entry: Entry,
        wanted: WordInfo,
        manual_pos: Option<&str>,
        word: &Word,
    ) -> Result<(String, Vec<Meaning>), WordError> {
        let their_meanings: Vec<EntryMeaning> = match manual_pos {
            Some(pos) => entry
                .meanings
                .into_iter()
                .filter(|m| m.part_of_speech.as_deref() == Some(pos))
                .collect(),
            None => entry.meanings,
        };

        if their_meanings.is_empty() {
            return Err(WordError::DefinitionNotFound(word.raw_input.clone()));
        }

        let mut meanings = Vec::new();
        for their in their_meanings {
            for def in their.definitions {
                let mut meaning = Meaning::default();

                if wanted.contains(WordInfo::DEFINITION) {
                    meaning.definition = Some(def.definition);
                }
                if wanted.contains(WordInfo::PRONUNCIATION) {
                    meaning.pronunciation = entry.phonetic.clone();
                }
                if wanted.contains(WordInfo::ETYMOLOGY) {
                    meaning.etymology = entry.origin.clone();
                }
                if wanted.contains(WordInfo::POS) {
                    meaning.pos = their.part_of_speech.clone();
                }
                if wanted.contains(WordInfo::SYNONYMS) {
                    meaning.synonyms = def.synonyms;
                }
                if wanted.contains(WordInfo::EXAMPLES) {
                    meaning.examples = def.example.into_iter().collect();
                }

                meanings.push(meaning);
            }
        }

        Ok((entry.word, meanings))
    }
}

#[async_trait]
impl WordService for FreeDictionary {
    fn name(&self) -> &'static str {
        "FreeDictionary"
    }

    fn info_available(&self) -> WordInfo {
        WordInfo::MEANING
    }

    async fn process(&self, word: &mut Word, info: WordInfo) -> Result<(), WordError> {
        let url = format!("{}/{}", self.base_url, word.urlable);
        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "FreeDictionary unreachable");
                return Ok(());
            }
        };

        if response.status() == StatusCode::NOT_FOUND {
            return Err(WordError::DefinitionNotFound(word.raw_input.clone()));
        }
        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "FreeDictionary errored");
            return Ok(());
        }

        let mut entries: Vec<Entry> = match response.json().await {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "FreeDictionary payload unreadable");
                return Ok(());
            }
        };
        if entries.is_empty() {
            return Err(WordError::DefinitionNotFound(word.raw_input.clone()));
        }

        let entry = entries.remove(0);
        let (headword, meanings) =
            Self::collect(entry, info, word.manual_pos.as_deref(), word)?;

        word.text = headword;
        word.meanings.extend(meanings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "word": "bread",
        "phonetic": "/brɛd/",
        "origin": "Old English brēad",
        "meanings": [
            {
                "partOfSpeech": "noun",
                "definitions": [
                    {
                        "definition": "food made of flour, water, and yeast",
                        "synonyms": ["loaf"],
                        "example": "a loaf of bread"
                    },
                    {
                        "definition": "money (slang)",
                        "synonyms": []
                    }
                ]
            },
            {
                "partOfSpeech": "verb",
                "definitions": [
                    {"definition": "to coat with breadcrumbs", "synonyms": []}
                ]
            }
        ]
    }"#;

    fn entry() -> Entry {
        serde_json::from_str(PAYLOAD).unwrap()
    }

    #[test]
    fn collects_one_candidate_per_definition() {
        let word = Word::new("bread", None);
        let (headword, meanings) =
            FreeDictionary::collect(entry(), WordInfo::MEANING, None, &word).unwrap();

        assert_eq!(headword, "bread");
        assert_eq!(meanings.len(), 3);
        assert_eq!(
            meanings[0].definition.as_deref(),
            Some("food made of flour, water, and yeast")
        );
        assert_eq!(meanings[0].pronunciation.as_deref(), Some("/brɛd/"));
        assert_eq!(meanings[0].examples, ["a loaf of bread"]);
        assert_eq!(meanings[1].examples, Vec::<String>::new());
        assert_eq!(meanings[2].pos.as_deref(), Some("verb"));
    }

    #[test]
    fn manual_pos_filters_entry_meanings() {
        let word = Word::new("bread", Some("verb".into()));
        let (_, meanings) =
            FreeDictionary::collect(entry(), WordInfo::MEANING, Some("verb"), &word).unwrap();
        assert_eq!(meanings.len(), 1);
        assert_eq!(meanings[0].pos.as_deref(), Some("verb"));

        let err = FreeDictionary::collect(entry(), WordInfo::MEANING, Some("adverb"), &word)
            .unwrap_err();
        assert!(matches!(err, WordError::DefinitionNotFound(_)));
    }

    #[test]
    fn wanted_mask_limits_populated_fields() {
        let word = Word::new("bread", None);
        let (_, meanings) = FreeDictionary::collect(
            entry(),
            WordInfo::DEFINITION | WordInfo::POS,
            None,
            &word,
        )
        .unwrap();

        assert!(meanings[0].definition.is_some());
        assert!(meanings[0].pos.is_some());
        assert!(meanings[0].pronunciation.is_none());
        assert!(meanings[0].synonyms.is_empty());
        assert!(meanings[0].examples.is_empty());
    }
}
