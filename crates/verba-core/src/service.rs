use std::sync::Arc;

use async_trait::async_trait;

use crate::error::WordError;
use crate::info::WordInfo;
use crate::word::Word;

/// One step of a lookup plan: a provider and the information asked of it.
pub type ServiceRequest = (Arc<dyn WordService>, WordInfo);

/// Lookup provider interface. Implementations are process-wide shared,
/// immutable instances; `process` mutates only the passed-in word and must
/// be safe to call concurrently from independent lookups.
#[async_trait]
pub trait WordService: Send + Sync {
    /// Provider name as shown in logs and rate-limit messages.
    fn name(&self) -> &'static str;

    /// Whether calls count against a paid plan.
    fn paid(&self) -> bool {
        false
    }

    /// Hourly request quota, `None` = unlimited. Declarative only; limits
    /// are enforced by the remote side and surface as `RateLimitExceeded`.
    fn hourly_quota(&self) -> Option<u32> {
        None
    }

    /// Categories of information this provider can append.
    fn info_available(&self) -> WordInfo;

    /// Look the word up and append candidate meanings and/or translations.
    /// Transport failures are absorbed as zero candidates; only domain
    /// errors (`DefinitionNotFound`, `RateLimitExceeded`) propagate.
    async fn process(&self, word: &mut Word, info: WordInfo) -> Result<(), WordError>;
}

/// Central capability gate, run before every `process` call: a request for
/// information the provider does not declare is a caller error and must
/// fail before any network access.
pub fn valid_info(
    service: &dyn WordService,
    wanted: WordInfo,
    word: &Word,
) -> Result<WordInfo, WordError> {
    let available = service.info_available();
    if (wanted | available) != available {
        return Err(WordError::InfoRequest(word.raw_input.clone()));
    }
    Ok(wanted)
}
