//! The definition service seam.

use async_trait::async_trait;

use crate::error::DefinitionError;
use crate::wire::Definitions;

/// Something that can produce definitions for a batch of keywords.
///
/// Implementations may omit keywords they cannot define. Validation of the
/// returned keys against the request is the caller's job (see
/// `DefinitionCache::complete`).
#[async_trait]
pub trait DictionaryService: Send + Sync {
    /// Short backend name for logging.
    fn name(&self) -> &'static str;

    /// Define every keyword in one batched call.
    async fn define(&self, keywords: &[String]) -> Result<Definitions, DefinitionError>;
}
