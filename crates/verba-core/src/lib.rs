pub mod error;
pub mod info;
pub mod language;
pub mod render;
pub mod select;
pub mod service;
pub mod word;

pub use error::WordError;
pub use info::WordInfo;
pub use language::Language;
pub use render::Card;
pub use service::{ServiceRequest, WordService};
pub use word::{ExampleLimits, FinalizedWord, Meaning, TranslatedSentence, Translation, Word};
