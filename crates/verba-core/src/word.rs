use std::time::Instant;

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::error::WordError;
use crate::service::{ServiceRequest, valid_info};

/// One candidate monolingual sense contributed by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Meaning {
    pub definition: Option<String>,
    /// IPA or similar.
    pub pronunciation: Option<String>,
    pub pos: Option<String>,
    pub synonyms: Vec<String>,
    pub examples: Vec<String>,
    pub etymology: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedSentence {
    pub source: String,
    pub target: String,
}

/// One candidate translation contributed by a provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Translation {
    pub text: Option<String>,
    pub examples: Vec<TranslatedSentence>,
}

/// Caps applied to example/synonym lists on finalization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExampleLimits {
    /// Maximum examples and synonyms kept.
    pub count: usize,
    /// Preferred maximum example length; longer ones are only used as
    /// top-up when short examples run out.
    pub char_limit: usize,
    /// When topping up from the length-sorted list, skip entries already
    /// kept instead of taking a positional slice. Off by default: the
    /// positional slice can re-include a kept example, which is the
    /// long-observed behavior of this pipeline.
    pub dedup_top_up: bool,
}

impl Default for ExampleLimits {
    fn default() -> Self {
        Self {
            count: 5,
            char_limit: 150,
            dedup_top_up: false,
        }
    }
}

/// Terminal, serializable output of selection: at most one meaning and one
/// translation, lists capped. Never aliases the candidate pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedWord {
    pub text: String,
    pub manual_pos: Option<String>,
    pub meaning: Option<Meaning>,
    pub translation: Option<Translation>,
}

/// The working aggregate for one lookup: the input in its raw, normalized
/// and URL-safe forms plus the candidates accumulated so far. Owned
/// exclusively by one lookup flow; providers append, never remove.
#[derive(Debug, Clone)]
pub struct Word {
    /// As typed by the user.
    pub raw_input: String,
    /// NFKC-normalized, space-escaped form for URLs.
    pub urlable: String,
    /// Display form; a provider may correct it (e.g. capitalization).
    pub text: String,
    /// Constrains which candidate meanings providers may emit.
    pub manual_pos: Option<String>,
    pub meanings: Vec<Meaning>,
    pub translations: Vec<Translation>,
}

pub fn urlify(s: &str) -> String {
    s.replace(' ', "%20")
}

impl Word {
    pub fn new(raw_input: &str, manual_pos: Option<String>) -> Self {
        let normalized: String = raw_input.trim().nfkc().collect();
        Self {
            raw_input: raw_input.to_string(),
            urlable: urlify(&normalized),
            text: normalized,
            manual_pos,
            meanings: Vec::new(),
            translations: Vec::new(),
        }
    }

    /// Run the lookup plan against a fresh word. Providers are invoked
    /// strictly in plan order, each awaited to completion before the next:
    /// later providers may fan examples out across candidates contributed
    /// by earlier ones, so the merge rule is only well defined
    /// sequentially. Domain errors abort the remaining plan.
    pub async fn lookup(
        raw_input: &str,
        plan: &[ServiceRequest],
        manual_pos: Option<String>,
    ) -> Result<Word, WordError> {
        let mut word = Word::new(raw_input, manual_pos);

        for (service, wanted) in plan {
            let wanted = valid_info(service.as_ref(), *wanted, &word)?;
            let start = Instant::now();
            service.process(&mut word, wanted).await?;
            tracing::debug!(
                service = service.name(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                meanings = word.meanings.len(),
                translations = word.translations.len(),
                "provider call finished"
            );
        }

        Ok(word)
    }

    /// Merge rule for providers that contribute only example sentences:
    /// with no candidate meanings yet, a bare meaning holding the examples
    /// is created; otherwise the examples are appended to every existing
    /// candidate.
    pub fn push_examples(&mut self, examples: Vec<String>) {
        if examples.is_empty() {
            return;
        }
        if self.meanings.is_empty() {
            self.meanings.push(Meaning {
                examples,
                ..Meaning::default()
            });
        } else {
            for meaning in &mut self.meanings {
                meaning.examples.extend(examples.iter().cloned());
            }
        }
    }

    /// Collapse the candidate pool to the user's picks. Reads, never
    /// mutates, the word; the output owns deep copies of everything.
    pub fn finalized(
        &self,
        mindex: Option<usize>,
        tindex: Option<usize>,
        limits: &ExampleLimits,
    ) -> Result<FinalizedWord, WordError> {
        if mindex.is_none() && tindex.is_none() {
            return Err(WordError::SelectionRequired);
        }
        if mindex.is_some_and(|i| i >= self.meanings.len())
            || tindex.is_some_and(|i| i >= self.translations.len())
        {
            return Err(WordError::InvalidSelection);
        }

        let mut meaning = mindex.map(|i| self.meanings[i].clone());
        let mut translation = tindex.map(|i| self.translations[i].clone());

        if let Some(m) = &mut meaning {
            m.examples = truncate_examples(&m.examples, limits, |s| s.len());
            m.synonyms.truncate(limits.count);
        }
        if let Some(t) = &mut translation {
            t.examples = truncate_examples(&t.examples, limits, |p| p.source.len());
        }

        Ok(FinalizedWord {
            text: self.text.clone(),
            manual_pos: self.manual_pos.clone(),
            meaning,
            translation,
        })
    }
}

/// Prefer examples under the char limit, in source order; when those run
/// out, fill the quota from the whole list re-sorted by ascending length.
/// The default top-up takes a positional slice of the sorted list, so a
/// kept example can appear twice; `dedup_top_up` switches to exclusion.
fn truncate_examples<T, F>(all: &[T], limits: &ExampleLimits, len: F) -> Vec<T>
where
    T: Clone + PartialEq,
    F: Fn(&T) -> usize,
{
    let mut kept: Vec<T> = all
        .iter()
        .filter(|item| len(item) < limits.char_limit)
        .take(limits.count)
        .cloned()
        .collect();

    if kept.len() < limits.count {
        let mut sorted = all.to_vec();
        sorted.sort_by_key(|item| len(item));

        if limits.dedup_top_up {
            for item in sorted {
                if kept.len() == limits.count {
                    break;
                }
                if !kept.contains(&item) {
                    kept.push(item);
                }
            }
        } else {
            let missing = limits.count - kept.len();
            let skip = kept.len();
            kept.extend(sorted.into_iter().skip(skip).take(missing));
        }
    }

    kept
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::info::WordInfo;
    use crate::service::WordService;

    /// Contributes canned meanings, or only examples when given none.
    struct StubService {
        meanings: Vec<Meaning>,
        examples: Vec<String>,
        calls: AtomicUsize,
    }

    impl StubService {
        fn with_meanings(meanings: Vec<Meaning>) -> Arc<Self> {
            Arc::new(Self {
                meanings,
                examples: Vec::new(),
                calls: AtomicUsize::new(0),
            })
        }

        fn with_examples(examples: Vec<&str>) -> Arc<Self> {
            Arc::new(Self {
                meanings: Vec::new(),
                examples: examples.into_iter().map(String::from).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl WordService for StubService {
        fn name(&self) -> &'static str {
            "Stub"
        }

        fn info_available(&self) -> WordInfo {
            WordInfo::MEANING
        }

        async fn process(&self, word: &mut Word, _info: WordInfo) -> Result<(), WordError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            word.meanings.extend(self.meanings.iter().cloned());
            if !self.examples.is_empty() {
                word.push_examples(self.examples.clone());
            }
            Ok(())
        }
    }

    fn meaning(def: &str) -> Meaning {
        Meaning {
            definition: Some(def.to_string()),
            ..Meaning::default()
        }
    }

    #[test]
    fn normalizes_input_for_urls() {
        let word = Word::new("  hot dog ", None);
        assert_eq!(word.text, "hot dog");
        assert_eq!(word.urlable, "hot%20dog");
        assert_eq!(word.raw_input, "  hot dog ");
    }

    #[tokio::test]
    async fn info_gate_rejects_before_provider_runs() {
        let stub = StubService::with_meanings(vec![meaning("a")]);
        let plan: Vec<ServiceRequest> = vec![(stub.clone(), WordInfo::TRANSLATION)];

        let err = Word::lookup("bread", &plan, None).await.unwrap_err();
        assert!(matches!(err, WordError::InfoRequest(_)));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn providers_append_in_plan_order() {
        let first = StubService::with_meanings(vec![meaning("a"), meaning("b"), meaning("c")]);
        let second = StubService::with_meanings(vec![meaning("d"), meaning("e")]);
        let plan: Vec<ServiceRequest> = vec![
            (first, WordInfo::MEANING),
            (second, WordInfo::MEANING),
        ];

        let word = Word::lookup("bread", &plan, None).await.unwrap();
        let defs: Vec<_> = word
            .meanings
            .iter()
            .map(|m| m.definition.as_deref().unwrap())
            .collect();
        assert_eq!(defs, ["a", "b", "c", "d", "e"]);
        assert!(word.translations.is_empty());
    }

    #[test]
    fn bare_examples_create_one_meaning_when_pool_empty() {
        let mut word = Word::new("bread", None);
        word.push_examples(vec!["I love bread.".to_string()]);

        assert_eq!(word.meanings.len(), 1);
        assert_eq!(word.meanings[0].examples, ["I love bread."]);
        assert!(word.meanings[0].definition.is_none());
    }

    #[test]
    fn bare_examples_fan_out_across_every_candidate() {
        let mut word = Word::new("bread", None);
        word.meanings = vec![meaning("a"), meaning("b")];
        word.push_examples(vec!["one".to_string(), "two".to_string()]);

        assert_eq!(word.meanings.len(), 2);
        for m in &word.meanings {
            assert_eq!(m.examples, ["one", "two"]);
        }
    }

    #[test]
    fn finalize_requires_a_selection() {
        let word = Word::new("bread", None);
        let err = word
            .finalized(None, None, &ExampleLimits::default())
            .unwrap_err();
        assert!(matches!(err, WordError::SelectionRequired));
    }

    #[test]
    fn finalize_rejects_out_of_range_indices() {
        let mut word = Word::new("bread", None);
        word.meanings = vec![meaning("a"); 5];

        let err = word
            .finalized(Some(7), None, &ExampleLimits::default())
            .unwrap_err();
        assert!(matches!(err, WordError::InvalidSelection));

        let err = word
            .finalized(Some(0), Some(0), &ExampleLimits::default())
            .unwrap_err();
        assert!(matches!(err, WordError::InvalidSelection));
    }

    #[test]
    fn finalize_may_pick_only_one_category() {
        let mut word = Word::new("bread", None);
        word.meanings = vec![meaning("a")];

        let fw = word
            .finalized(Some(0), None, &ExampleLimits::default())
            .unwrap();
        assert!(fw.meaning.is_some());
        assert!(fw.translation.is_none());
    }

    #[test]
    fn finalize_deep_copies_and_never_mutates_the_entry() {
        let mut word = Word::new("bread", None);
        word.meanings = vec![Meaning {
            definition: Some("a".into()),
            examples: (0..8).map(|i| format!("example {i}")).collect(),
            synonyms: (0..8).map(|i| format!("syn{i}")).collect(),
            ..Meaning::default()
        }];

        let fw = word
            .finalized(Some(0), None, &ExampleLimits::default())
            .unwrap();
        let m = fw.meaning.unwrap();
        assert_eq!(m.examples.len(), 5);
        assert_eq!(m.synonyms.len(), 5);
        // candidate pool untouched
        assert_eq!(word.meanings[0].examples.len(), 8);
        assert_eq!(word.meanings[0].synonyms.len(), 8);
    }

    fn sized(lens: &[usize]) -> Vec<String> {
        lens.iter().map(|n| "x".repeat(*n)).collect()
    }

    #[test]
    fn truncation_prefers_short_examples_then_tops_up_by_length() {
        let all = sized(&[200, 40, 160, 30, 170, 20, 180, 10]);
        let out = truncate_examples(&all, &ExampleLimits::default(), |s| s.len());

        let lens: Vec<_> = out.iter().map(|s| s.len()).collect();
        assert_eq!(lens, [40, 30, 20, 10, 160]);
    }

    #[test]
    fn truncation_all_short_keeps_source_order() {
        let all = sized(&[40, 30, 20, 10, 50, 60]);
        let out = truncate_examples(&all, &ExampleLimits::default(), |s| s.len());

        let lens: Vec<_> = out.iter().map(|s| s.len()).collect();
        assert_eq!(lens, [40, 30, 20, 10, 50]);
    }

    #[test]
    fn positional_top_up_can_duplicate_a_kept_example() {
        // Three under the limit; the sorted slice [3..5] lands on entries
        // that were already kept.
        let all = vec![
            "bb".to_string(),
            "cccc".to_string(),
            "a".to_string(),
            "e".repeat(200),
            "f".repeat(300),
        ];
        let limits = ExampleLimits::default();
        let out = truncate_examples(&all, &limits, |s| s.len());
        assert_eq!(out.len(), 5);
        // sorted ascending: a, bb, cccc, e*200, f*300 -> slice [3..5]
        assert_eq!(out[3].len(), 200);
        assert_eq!(out[4].len(), 300);

        let deduped = truncate_examples(
            &all,
            &ExampleLimits {
                dedup_top_up: true,
                ..limits
            },
            |s| s.len(),
        );
        assert_eq!(deduped.len(), 5);
        let mut unique = deduped.clone();
        unique.dedup();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn translated_pairs_truncate_on_source_length() {
        let mut word = Word::new("bread", None);
        word.translations = vec![Translation {
            text: Some("pain".into()),
            examples: (0..8)
                .map(|i| TranslatedSentence {
                    source: "s".repeat(if i % 2 == 0 { 200 } else { 10 }),
                    target: "t".into(),
                })
                .collect(),
        }];

        let fw = word
            .finalized(None, Some(0), &ExampleLimits::default())
            .unwrap();
        let t = fw.translation.unwrap();
        assert_eq!(t.examples.len(), 5);
        // the four short sources come first
        assert!(t.examples[..4].iter().all(|p| p.source.len() == 10));
    }

    #[tokio::test]
    async fn example_only_provider_after_meanings_extends_them_all() {
        let first = StubService::with_meanings(vec![meaning("a"), meaning("b")]);
        let second = StubService::with_examples(vec!["shared example"]);
        let plan: Vec<ServiceRequest> = vec![
            (first, WordInfo::MEANING),
            (second, WordInfo::EXAMPLES),
        ];

        let word = Word::lookup("bread", &plan, None).await.unwrap();
        assert_eq!(word.meanings.len(), 2);
        for m in &word.meanings {
            assert_eq!(m.examples, ["shared example"]);
        }
    }
}
