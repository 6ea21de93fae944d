//! Client abstraction consumed by the session engine.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::error::Result;
use crate::params::GenerationParams;

/// Lazily pulled sequence of reply fragments, in emission order. The
/// concatenation of all items is the complete model reply. Dropping the
/// stream closes the underlying connection.
pub type GenerationStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Open a streaming generation for an assembled prompt.
    ///
    /// Fails with `Transport`/`Api` before any chunk is produced; once a
    /// stream is returned, failures surface as `Truncated` items within it.
    async fn stream_generation(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<GenerationStream>;
}
