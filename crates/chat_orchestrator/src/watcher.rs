//! Interval-based inactivity recheck.
//!
//! The timeout mode needs periodic re-evaluation independent of any UI
//! refresh. This watcher owns that schedule: a fixed-period tick that calls
//! [`ChatSession::check_inactivity`] until shut down.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::session::ChatSession;

/// Spawn the periodic inactivity check. The task ends when `shutdown` fires.
pub fn spawn_inactivity_watcher(
    session: Arc<Mutex<ChatSession>>,
    period: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let mut session = session.lock().await;
                    session.check_inactivity(Utc::now());
                }
            }
        }
        tracing::debug!("inactivity watcher stopped");
    })
}
