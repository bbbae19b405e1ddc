use std::time::Duration;

use async_trait::async_trait;

use crate::word::Word;

/// Most candidates a prompt will carry; chat select menus cap out at 25
/// entries with one slot reserved for cancel.
pub const CHOICE_CAP: usize = 24;

const DESCRIPTION_CAP: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub label: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChoicePrompt {
    pub title: String,
    pub choices: Vec<Choice>,
    /// More candidates existed than the cap allowed.
    pub truncated: bool,
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceOutcome {
    Selected(usize),
    Cancelled,
    TimedOut,
}

/// Human-disambiguation boundary: present the prompt, await exactly one
/// selected index, an explicit cancellation, or a timeout. On cancel or
/// timeout the caller abandons the lookup; finalize is never called.
#[async_trait]
pub trait SelectPort: Send + Sync {
    async fn present_choices(&self, user: &str, prompt: ChoicePrompt) -> ChoiceOutcome;
}

fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Prompt over the word's candidate meanings, labeled by part of speech
/// with the definition as description.
pub fn meaning_choices(word: &Word, timeout: Duration) -> ChoicePrompt {
    let choices: Vec<Choice> = word
        .meanings
        .iter()
        .take(CHOICE_CAP)
        .enumerate()
        .map(|(i, m)| Choice {
            label: format!("{}. {}", i + 1, m.pos.as_deref().unwrap_or("?")),
            description: m.definition.as_deref().map(|d| clip(d, DESCRIPTION_CAP)),
        })
        .collect();

    ChoicePrompt {
        title: format!("Multiple meanings of \"{}\" found:", word.text),
        truncated: word.meanings.len() > CHOICE_CAP,
        choices,
        timeout,
    }
}

/// Prompt over the word's candidate translations.
pub fn translation_choices(word: &Word, timeout: Duration) -> ChoicePrompt {
    let choices: Vec<Choice> = word
        .translations
        .iter()
        .take(CHOICE_CAP)
        .enumerate()
        .map(|(i, t)| Choice {
            label: clip(
                &format!("{}. {}", i + 1, t.text.as_deref().unwrap_or("?")),
                DESCRIPTION_CAP,
            ),
            description: None,
        })
        .collect();

    ChoicePrompt {
        title: format!("Multiple translations of \"{}\" found:", word.text),
        truncated: word.translations.len() > CHOICE_CAP,
        choices,
        timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::{Meaning, Translation};

    #[test]
    fn meaning_prompt_numbers_and_describes_candidates() {
        let mut word = Word::new("bread", None);
        word.meanings = vec![
            Meaning {
                definition: Some("baked food".into()),
                pos: Some("noun".into()),
                ..Meaning::default()
            },
            Meaning {
                definition: Some("money (slang)".into()),
                pos: Some("noun".into()),
                ..Meaning::default()
            },
        ];

        let prompt = meaning_choices(&word, Duration::from_secs(60));
        assert_eq!(prompt.choices.len(), 2);
        assert!(!prompt.truncated);
        assert_eq!(prompt.choices[0].label, "1. noun");
        assert_eq!(prompt.choices[0].description.as_deref(), Some("baked food"));
        assert_eq!(prompt.choices[1].label, "2. noun");
    }

    #[test]
    fn prompts_cap_at_twenty_four_and_flag_overflow() {
        let mut word = Word::new("bread", None);
        word.translations = (0..30)
            .map(|i| Translation {
                text: Some(format!("t{i}")),
                ..Translation::default()
            })
            .collect();

        let prompt = translation_choices(&word, Duration::from_secs(60));
        assert_eq!(prompt.choices.len(), CHOICE_CAP);
        assert!(prompt.truncated);
        assert_eq!(prompt.choices[0].label, "1. t0");
    }

    #[test]
    fn long_descriptions_are_clipped() {
        let mut word = Word::new("bread", None);
        word.meanings = vec![Meaning {
            definition: Some("d".repeat(500)),
            pos: Some("noun".into()),
            ..Meaning::default()
        }];

        let prompt = meaning_choices(&word, Duration::from_secs(60));
        assert_eq!(prompt.choices[0].description.as_ref().unwrap().len(), 100);
    }
}
