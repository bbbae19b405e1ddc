use std::fmt;
use std::ops::{BitAnd, BitOr, Sub};

use serde::{Deserialize, Serialize};

/// Flag set describing which categories of lexical information a caller
/// wants from a provider, or a provider declares it can supply.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WordInfo(u8);

impl WordInfo {
    pub const NONE: WordInfo = WordInfo(0);

    pub const DEFINITION: WordInfo = WordInfo(1);
    pub const EXAMPLES: WordInfo = WordInfo(1 << 1);
    pub const POS: WordInfo = WordInfo(1 << 2);
    pub const PRONUNCIATION: WordInfo = WordInfo(1 << 3);
    pub const SYNONYMS: WordInfo = WordInfo(1 << 4);
    pub const ETYMOLOGY: WordInfo = WordInfo(1 << 5);
    pub const TRANSLATION: WordInfo = WordInfo(1 << 6);
    pub const TRANSLATED_EXAMPLES: WordInfo = WordInfo(1 << 7);

    /// Everything a monolingual dictionary can say about a word.
    pub const MEANING: WordInfo = WordInfo(
        Self::DEFINITION.0
            | Self::POS.0
            | Self::PRONUNCIATION.0
            | Self::EXAMPLES.0
            | Self::SYNONYMS.0
            | Self::ETYMOLOGY.0,
    );

    /// Translation text plus translated sentence pairs.
    pub const TRANSLATION_FULL: WordInfo =
        WordInfo(Self::TRANSLATION.0 | Self::TRANSLATED_EXAMPLES.0);

    pub fn contains(self, other: WordInfo) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(self, other: WordInfo) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for WordInfo {
    type Output = WordInfo;

    fn bitor(self, rhs: WordInfo) -> WordInfo {
        WordInfo(self.0 | rhs.0)
    }
}

impl BitAnd for WordInfo {
    type Output = WordInfo;

    fn bitand(self, rhs: WordInfo) -> WordInfo {
        WordInfo(self.0 & rhs.0)
    }
}

/// Set difference, e.g. `WordInfo::MEANING - WordInfo::PRONUNCIATION`.
impl Sub for WordInfo {
    type Output = WordInfo;

    fn sub(self, rhs: WordInfo) -> WordInfo {
        WordInfo(self.0 & !rhs.0)
    }
}

impl fmt::Debug for WordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(WordInfo, &str); 8] = [
            (WordInfo::DEFINITION, "def"),
            (WordInfo::EXAMPLES, "examples"),
            (WordInfo::POS, "pos"),
            (WordInfo::PRONUNCIATION, "pron"),
            (WordInfo::SYNONYMS, "syns"),
            (WordInfo::ETYMOLOGY, "ety"),
            (WordInfo::TRANSLATION, "trans"),
            (WordInfo::TRANSLATED_EXAMPLES, "trans_examples"),
        ];

        if self.is_empty() {
            return write!(f, "none");
        }

        let mut first = true;
        for (flag, name) in NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}
