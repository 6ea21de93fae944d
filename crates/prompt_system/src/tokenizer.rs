//! Token counting via tiktoken BPE.
//!
//! The counter wraps a pretrained BPE encoding resolved from a model name.
//! Initialization either succeeds or the process cannot serve sessions; there
//! is no heuristic fallback that would silently under-count.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use thiserror::Error;
use tiktoken_rs::CoreBPE;

#[derive(Error, Debug, Clone)]
pub enum TokenizerError {
    /// Fatal: the named model has no resolvable encoding.
    #[error("failed to initialize tokenizer for model '{model}': {message}")]
    Init { model: String, message: String },
}

/// A pretrained tokenizer handle. Read-only after construction, safe to share
/// across sessions without locking.
pub struct TokenCounter {
    bpe: CoreBPE,
    model: String,
}

impl TokenCounter {
    /// Resolve the BPE encoding for a model name.
    pub fn from_model(model: &str) -> Result<Self, TokenizerError> {
        let bpe = tiktoken_rs::get_bpe_from_model(model).map_err(|e| TokenizerError::Init {
            model: model.to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(model, "tokenizer initialized");
        Ok(Self {
            bpe,
            model: model.to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Number of BPE tokens in `text`. Deterministic; 0 for the empty string.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_ordinary(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

static SHARED: OnceCell<Arc<TokenCounter>> = OnceCell::new();

/// Process-wide memoized counter.
///
/// The first call pays the initialization cost; every later call returns the
/// cached handle (the model argument of later calls is ignored). A failed
/// first initialization is fatal and is reported to every caller.
pub fn shared_counter(model: &str) -> Result<Arc<TokenCounter>, TokenizerError> {
    SHARED
        .get_or_try_init(|| TokenCounter::from_model(model).map(Arc::new))
        .cloned()
}
