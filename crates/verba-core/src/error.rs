/// Domain errors for one word in particular, not the code. Display strings
/// are user-facing: the chat layer prints them verbatim.
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    /// Caller asked a provider for information it does not supply.
    #[error("Invalid info request for \"{0}\"!")]
    InfoRequest(String),

    #[error("No definition found for \"{0}\"!")]
    DefinitionNotFound(String),

    #[error("{0} API limit exceeded!")]
    RateLimitExceeded(&'static str),

    #[error("No meaning or translation selected!")]
    SelectionRequired,

    #[error("Invalid meaning/translation selection!")]
    InvalidSelection,

    #[error("Empty card for \"{0}\"!")]
    EmptyResult(String),
}
