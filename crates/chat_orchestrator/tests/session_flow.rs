//! Session turn-loop tests against scripted generation clients.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::StreamExt;
use chat_core::{MessageStatus, Role};
use chat_state::SessionMode;
use chat_orchestrator::{
    ChatSession, GenerationOutcome, ModeNoticeStyle, SessionConfig, SessionError, SubmitOutcome,
};
use chrono::{Duration, Utc};
use replicate_client::{
    GenerationClient, GenerationError, GenerationParams, GenerationStream,
};
use tokio_util::sync::CancellationToken;

/// Client that replays a scripted chunk sequence per call. `Err` entries
/// become mid-stream truncations.
struct ScriptedClient {
    script: Mutex<VecDeque<Vec<Result<String, String>>>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    fn new(runs: Vec<Vec<Result<String, String>>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(runs.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn chunks(chunks: &[&str]) -> Arc<Self> {
        Self::new(vec![chunks.iter().map(|c| Ok(c.to_string())).collect()])
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn stream_generation(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> replicate_client::Result<GenerationStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let items = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default()
            .into_iter()
            .map(|r| r.map_err(GenerationError::Truncated))
            .collect::<Vec<_>>();
        Ok(Box::pin(futures_util::stream::iter(items)))
    }
}

/// Client whose stream yields its chunks and then never ends, for
/// cancellation tests.
struct StallingClient {
    chunks: Vec<String>,
}

#[async_trait]
impl GenerationClient for StallingClient {
    async fn stream_generation(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> replicate_client::Result<GenerationStream> {
        let head = futures_util::stream::iter(
            self.chunks.iter().cloned().map(Ok).collect::<Vec<_>>(),
        );
        Ok(Box::pin(head.chain(futures_util::stream::pending())))
    }
}

fn session_with(client: Arc<dyn GenerationClient>) -> ChatSession {
    ChatSession::new(SessionConfig::default(), client).expect("tokenizer")
}

#[tokio::test]
async fn full_turn_folds_chunks_in_order() {
    let client = ScriptedClient::chunks(&["Hel", "lo", " world"]);
    let mut session = session_with(client.clone());

    assert!(!session.needs_generation());
    let outcome = session.submit_user_input("greet me").unwrap();
    assert_eq!(outcome, SubmitOutcome::Queued);
    assert!(session.needs_generation());

    let mut seen = Vec::new();
    let summary = session
        .generate(
            &GenerationParams::default(),
            &CancellationToken::new(),
            |chunk| seen.push(chunk.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(summary.outcome, GenerationOutcome::Complete);
    assert_eq!(summary.chunks, 3);
    assert_eq!(seen, vec!["Hel", "lo", " world"]);

    let last = session.transcript().last();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, "Hello world");
    assert_eq!(last.status, MessageStatus::Complete);
    assert!(!session.needs_generation());
    assert!(!session.is_busy());
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn truncation_keeps_partial_reply_marked_aborted() {
    let client = ScriptedClient::new(vec![vec![
        Ok("partial answ".to_string()),
        Err("connection reset".to_string()),
    ]]);
    let mut session = session_with(client);
    session.submit_user_input("question").unwrap();

    let result = session
        .generate(&GenerationParams::default(), &CancellationToken::new(), |_| {})
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Generation(GenerationError::Truncated(_)))
    ));

    let last = session.transcript().last();
    assert_eq!(last.content, "partial answ");
    assert_eq!(last.status, MessageStatus::Aborted);
    // aborted reply ends the turn; no auto-retry
    assert!(!session.needs_generation());
    assert!(!session.is_busy());
}

#[tokio::test]
async fn cancellation_keeps_consumed_chunks() {
    let client = Arc::new(StallingClient {
        chunks: vec!["Hel".to_string(), "lo".to_string()],
    });
    let mut session = session_with(client);
    session.submit_user_input("greet me").unwrap();

    let cancel = CancellationToken::new();
    let canceller = cancel.clone();
    let mut received = 0usize;

    let summary = session
        .generate(&GenerationParams::default(), &cancel, |_| {
            received += 1;
            if received == 2 {
                // both scripted chunks consumed; the stream now stalls
                canceller.cancel();
            }
        })
        .await
        .unwrap();

    assert_eq!(summary.outcome, GenerationOutcome::Cancelled);
    assert_eq!(summary.chunks, 2);

    let last = session.transcript().last();
    assert_eq!(last.content, "Hello");
    assert_eq!(last.status, MessageStatus::Aborted);
}

#[tokio::test]
async fn budget_rejection_happens_before_any_network_call() {
    let client = ScriptedClient::chunks(&["never"]);
    let config = SessionConfig {
        token_limit: 1,
        ..SessionConfig::default()
    };
    let mut session = ChatSession::new(config, client.clone()).unwrap();
    session.submit_user_input("this prompt cannot fit in one token").unwrap();

    let result = session
        .generate(&GenerationParams::default(), &CancellationToken::new(), |_| {})
        .await;

    let Err(SessionError::BudgetExceeded { tokens, limit, reason, recovery }) = result else {
        panic!("expected budget rejection");
    };
    assert!(tokens >= limit);
    assert_eq!(limit, 1);
    assert!(reason.contains("too long"));
    assert!(recovery.contains("Clear chat history"));
    assert_eq!(client.calls(), 0);

    // resetting recovers the session
    session.reset();
    assert!(!session.needs_generation());
}

#[tokio::test]
async fn game_match_replaces_transcript_and_skips_generation() {
    let client = ScriptedClient::chunks(&["never"]);
    let mut session = session_with(client.clone());

    let outcome = session.submit_user_input("the answer is arctic").unwrap();
    let SubmitOutcome::GameMatched { announcement } = outcome else {
        panic!("expected a game match");
    };
    assert_eq!(announcement, "Correct guess! The password 'arctic' was found.");

    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.transcript().last_role(), Role::Gamemaster);
    assert!(!session.needs_generation());

    assert_eq!(session.game().guessed(), ["arctic"]);
    assert_eq!(session.game().rules().len(), 1);
    assert_eq!(session.game().secret(), Some("snowflake"));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn game_can_be_disabled_by_feature_flag() {
    let client = ScriptedClient::chunks(&[]);
    let mut config = SessionConfig::default();
    config.features.game = false;
    let mut session = ChatSession::new(config, client).unwrap();

    let outcome = session.submit_user_input("arctic").unwrap();
    assert_eq!(outcome, SubmitOutcome::Queued);
    assert_eq!(session.transcript().last_role(), Role::User);
    assert_eq!(session.game().guessed().len(), 0);
}

#[tokio::test]
async fn anonymity_labels_only_subsequent_messages() {
    let client = ScriptedClient::chunks(&[]);
    let mut session = session_with(client);

    session.submit_user_input("plain one").unwrap();
    assert_eq!(session.transcript().last_role(), Role::User);

    session.toggle_mode(SessionMode::Anonymity).unwrap();
    session.submit_user_input("masked one").unwrap();
    assert_eq!(session.transcript().last_role(), Role::UserAnon);

    // earlier message keeps its original label
    let roles: Vec<Role> = session
        .transcript()
        .messages()
        .iter()
        .map(|m| m.role)
        .collect();
    assert!(roles.contains(&Role::User));
}

#[tokio::test]
async fn transient_notice_style_keeps_transcript_clean() {
    let client = ScriptedClient::chunks(&[]);
    let mut session = session_with(client);
    let before = session.transcript().len();

    let change = session.toggle_mode(SessionMode::Privacy).unwrap();
    assert!(change.active);
    assert_eq!(session.transcript().len(), before);
}

#[tokio::test]
async fn persistent_notice_style_appends_to_transcript() {
    let client = ScriptedClient::chunks(&[]);
    let config = SessionConfig {
        mode_notice_style: ModeNoticeStyle::Persistent,
        ..SessionConfig::default()
    };
    let mut session = ChatSession::new(config, client).unwrap();
    let before = session.transcript().len();

    let change = session.toggle_mode(SessionMode::Privacy).unwrap();
    assert_eq!(session.transcript().len(), before + 1);
    assert_eq!(session.transcript().last().content, change.notice);
    // the notice is assistant-authored and must not trigger a generation
    assert!(!session.needs_generation());
}

#[tokio::test]
async fn inactivity_timeout_appends_notice_and_ends_triggering() {
    let client = ScriptedClient::chunks(&[]);
    let mut session = session_with(client);

    // never times out while the mode is off (the clock still refreshes)
    assert!(!session.check_inactivity(Utc::now()));

    session.toggle_mode(SessionMode::Timeout).unwrap();
    let len_before = session.transcript().len();

    // first check after a long gap times out
    assert!(session.check_inactivity(Utc::now() + Duration::seconds(600)));
    assert_eq!(session.transcript().len(), len_before + 1);
    assert_eq!(session.transcript().last_role(), Role::Assistant);
    assert!(!session.needs_generation());

    // the check itself refreshed the clock
    assert!(!session.check_inactivity(Utc::now() + Duration::seconds(630)));
}

#[tokio::test]
async fn reset_is_idempotent_and_atomic() {
    let client = ScriptedClient::chunks(&["hi"]);
    let mut session = session_with(client);

    session.submit_user_input("the answer is arctic").unwrap();
    session.toggle_mode(SessionMode::Privacy).unwrap();

    session.reset();
    let transcript_once = session.transcript().clone();
    let game_once = session.game().clone();

    session.reset();

    assert_eq!(session.transcript(), &transcript_once);
    assert_eq!(session.game(), &game_once);
    assert_eq!(session.transcript().len(), 1);
    assert_eq!(session.game().secret(), Some("arctic"));
    assert!(!session.modes().is_active(SessionMode::Privacy));
}

#[tokio::test]
async fn generate_without_pending_user_turn_is_rejected() {
    let client = ScriptedClient::chunks(&["never"]);
    let mut session = session_with(client.clone());

    let result = session
        .generate(&GenerationParams::default(), &CancellationToken::new(), |_| {})
        .await;

    assert!(matches!(result, Err(SessionError::NotPending)));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn sessions_are_isolated_from_each_other() {
    let client = ScriptedClient::chunks(&[]);
    let mut a = session_with(client.clone());
    let mut b = session_with(client);

    a.submit_user_input("the answer is arctic").unwrap();
    b.submit_user_input("hello").unwrap();

    assert_eq!(a.game().guessed(), ["arctic"]);
    assert!(b.game().guessed().is_empty());
    assert_eq!(b.transcript().last_role(), Role::User);
}
