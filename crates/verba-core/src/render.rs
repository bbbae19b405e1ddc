use serde::{Deserialize, Serialize};

use crate::error::WordError;
use crate::word::FinalizedWord;

/// General-purpose flashcard; front-text uniqueness is the store's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub front: String,
    pub back: String,
}

const DNL: &str = " <br><br> ";
const SYNONYM_CAP: usize = 5;

pub fn card_front(word: &FinalizedWord) -> String {
    match &word.manual_pos {
        Some(pos) => format!("{} ({})", word.text, pos),
        None => word.text.clone(),
    }
}

/// Project a finalized word onto a flashcard. Back fields appear in a
/// fixed order and absent fields are skipped without empty separators.
pub fn to_card(word: &FinalizedWord) -> Result<Card, WordError> {
    let front = card_front(word);
    let mut parts: Vec<String> = Vec::new();

    let meaning = word.meaning.as_ref();
    let translation = word.translation.as_ref();

    if let Some(m) = meaning {
        for field in [&m.pronunciation, &m.pos, &m.definition] {
            if let Some(text) = field {
                parts.push(text.clone());
            }
        }
    }

    if let Some(text) = translation.and_then(|t| t.text.as_ref()) {
        parts.push(text.clone());
    }

    if let Some(m) = meaning {
        if let Some(ety) = &m.etymology {
            parts.push(ety.clone());
        }
        if !m.synonyms.is_empty() {
            parts.push(
                m.synonyms
                    .iter()
                    .take(SYNONYM_CAP)
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        if !m.examples.is_empty() {
            let mut list = String::from("<ul>");
            for example in &m.examples {
                list.push_str("<li> ");
                list.push_str(&italicize(example, &word.text));
                list.push_str(" </li>");
            }
            list.push_str("</ul>");
            parts.push(list);
        }
    }

    if let Some(t) = translation {
        if !t.examples.is_empty() {
            let mut table = String::from(
                "<style> table, th, td {border: 1px solid black; \
                 border-collapse: collapse;}</style><table>",
            );
            for pair in &t.examples {
                table.push_str(&format!(
                    "<tr><td> {} </td><td> {} </td></tr>",
                    pair.source, pair.target
                ));
            }
            table.push_str("</table>");
            parts.push(table);
        }
    }

    let back = parts.join(DNL);
    if front.is_empty() || back.is_empty() {
        return Err(WordError::EmptyResult(word.text.clone()));
    }

    Ok(Card { front, back })
}

/// Chat-markdown projection of a finalized word, same field set and order
/// as the card back.
pub fn to_display_text(word: &FinalizedWord) -> Result<String, WordError> {
    let mut parts: Vec<String> = Vec::new();

    let meaning = word.meaning.as_ref();
    let translation = word.translation.as_ref();

    let mut first_line = format!("**{}**", word.text);
    if let Some(pos) = meaning.and_then(|m| m.pos.as_ref()) {
        first_line.push_str(&format!("  *{pos}*"));
    }
    parts.push(first_line);

    if let Some(m) = meaning {
        if let Some(ipa) = &m.pronunciation {
            parts.push(format!("Pronunciation: {ipa}"));
        }
        if let Some(def) = &m.definition {
            parts.push(format!("Definition: *{def}*"));
        }
    }

    if let Some(text) = translation.and_then(|t| t.text.as_ref()) {
        parts.push(format!("Translation: {text}"));
    }

    if let Some(m) = meaning {
        if let Some(ety) = &m.etymology {
            parts.push(format!("Etymology: *{ety}*"));
        }
        if !m.synonyms.is_empty() {
            parts.push(format!("Synonyms: *{}*", m.synonyms.join(", ")));
        }
        if !m.examples.is_empty() {
            let list: Vec<String> = m.examples.iter().map(|s| format!("- *{s}*")).collect();
            parts.push(format!("Examples: \n{}", list.join("\n")));
        }
    }

    if let Some(t) = translation {
        if !t.examples.is_empty() {
            let pairs: Vec<String> = t
                .examples
                .iter()
                .map(|p| format!("- {}\n- {}", p.source, p.target))
                .collect();
            parts.push(format!("Translated sentences: \n{}", pairs.join("\n\n")));
        }
    }

    // only the headword line means nothing to show
    if parts.len() == 1 {
        return Err(WordError::EmptyResult(word.text.clone()));
    }

    Ok(parts.join("\n\n"))
}

/// Wraps every case-insensitive occurrence of `word` in `<i>` tags.
fn italicize(sentence: &str, word: &str) -> String {
    if word.is_empty() {
        return sentence.to_string();
    }

    let needle = word.to_lowercase();
    let needle_chars = word.chars().count();
    let chars: Vec<(usize, char)> = sentence.char_indices().collect();

    let mut out = String::with_capacity(sentence.len());
    let mut i = 0;
    while i < chars.len() {
        let end = i + needle_chars;
        if end <= chars.len() {
            let start_byte = chars[i].0;
            let end_byte = if end < chars.len() {
                chars[end].0
            } else {
                sentence.len()
            };
            let candidate = &sentence[start_byte..end_byte];
            if candidate.to_lowercase() == needle {
                out.push_str("<i> ");
                out.push_str(candidate);
                out.push_str(" </i>");
                i = end;
                continue;
            }
        }
        out.push(chars[i].1);
        i += 1;
    }

    out
}
