//! Budget gate - the pre-dispatch token ceiling.
//!
//! Evaluated strictly before any network call. There is no partial or
//! truncated dispatch on overflow: the caller either resets history or
//! refuses to proceed.

use std::sync::Arc;

use crate::tokenizer::TokenCounter;

/// Ceiling used when the session configuration does not override it.
pub const DEFAULT_TOKEN_LIMIT: usize = 3072;

/// Result of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allowed {
        tokens: usize,
    },
    /// The prompt reached the ceiling. `reason` is user-facing; `recovery`
    /// names the action that makes progress possible again.
    Rejected {
        tokens: usize,
        limit: usize,
        reason: String,
        recovery: String,
    },
}

impl GateDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Token-ceiling check over assembled prompts.
#[derive(Debug, Clone)]
pub struct BudgetGate {
    counter: Arc<TokenCounter>,
    limit: usize,
}

impl BudgetGate {
    pub fn new(counter: Arc<TokenCounter>, limit: usize) -> Self {
        Self { counter, limit }
    }

    pub fn with_default_limit(counter: Arc<TokenCounter>) -> Self {
        Self::new(counter, DEFAULT_TOKEN_LIMIT)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Admit the prompt iff its token count is strictly below the limit.
    pub fn check(&self, prompt: &str) -> GateDecision {
        let tokens = self.counter.count(prompt);
        if tokens < self.limit {
            tracing::debug!(tokens, limit = self.limit, "budget gate: allowed");
            GateDecision::Allowed { tokens }
        } else {
            tracing::warn!(tokens, limit = self.limit, "budget gate: rejected");
            GateDecision::Rejected {
                tokens,
                limit: self.limit,
                reason: format!(
                    "Conversation length too long. Please keep it under {} tokens.",
                    self.limit
                ),
                recovery: "Clear chat history and try again.".to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Arc<TokenCounter> {
        Arc::new(TokenCounter::from_model("gpt-3.5-turbo").unwrap())
    }

    #[test]
    fn prompt_below_limit_is_allowed() {
        let gate = BudgetGate::with_default_limit(counter());
        let decision = gate.check("short prompt");
        assert!(decision.is_allowed());
    }

    #[test]
    fn count_equal_to_limit_is_rejected() {
        let counter = counter();
        let prompt = "a prompt of some moderate length for the boundary check";
        let exact = counter.count(prompt);

        // strict less-than: a count equal to the limit must be rejected
        let at_limit = BudgetGate::new(counter.clone(), exact);
        assert!(!at_limit.check(prompt).is_allowed());

        let above_limit = BudgetGate::new(counter, exact + 1);
        assert!(above_limit.check(prompt).is_allowed());
    }

    #[test]
    fn rejection_carries_reason_and_recovery() {
        let gate = BudgetGate::new(counter(), 1);
        let GateDecision::Rejected {
            tokens,
            limit,
            reason,
            recovery,
        } = gate.check("definitely more than one token")
        else {
            panic!("expected rejection");
        };

        assert!(tokens >= limit);
        assert_eq!(limit, 1);
        assert!(reason.contains("under 1 tokens"));
        assert!(recovery.contains("Clear chat history"));
    }

    #[test]
    fn gate_is_monotonic_in_prompt_growth() {
        let counter = counter();
        let prompt = "base prompt text";
        let limit = counter.count(prompt); // rejects the base prompt exactly
        let gate = BudgetGate::new(counter, limit);

        assert!(!gate.check(prompt).is_allowed());
        for suffix in [" ", " and more", "\nanother line entirely"] {
            let grown = format!("{prompt}{suffix}");
            assert!(
                !gate.check(&grown).is_allowed(),
                "rejected prompt must stay rejected after growing by {suffix:?}"
            );
        }
    }
}
