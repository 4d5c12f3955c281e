/// Polling market clock driving the session banner
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::time::session::{compute_session_state, next_transition};
use crate::types::SessionState;

/// One evaluation of the session calculator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    pub at: DateTime<Utc>,
    pub state: SessionState,
    /// True on the first tick and whenever the state differs from the last one
    pub changed: bool,
    pub next_change: DateTime<Utc>,
}

pub struct SessionClock {
    period: Duration,
    last_state: Option<SessionState>,
}

impl SessionClock {
    pub fn new(period: Duration) -> Self {
        SessionClock {
            period,
            last_state: None,
        }
    }

    /// Evaluate the session at `now` and remember the result
    pub fn observe(&mut self, now: DateTime<Utc>) -> ClockTick {
        let state = compute_session_state(now);
        let changed = self.last_state != Some(state);

        if changed {
            match self.last_state {
                Some(prev) => info!("IDX session {} -> {}", prev.as_str(), state.as_str()),
                None => info!("IDX session is {}", state.as_str()),
            }
        }
        self.last_state = Some(state);

        ClockTick {
            at: now,
            state,
            changed,
            next_change: next_transition(now),
        }
    }

    /// Tick every `period` until the receiver goes away
    pub async fn run(mut self, tx: mpsc::Sender<ClockTick>) {
        let mut interval = tokio::time::interval(self.period);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tx.closed() => {
                    debug!("Clock receiver dropped, stopping");
                    break;
                }
            }

            let tick = self.observe(Utc::now());
            debug!("Clock tick: {} (next change {})", tick.state.as_str(), tick.next_change);

            if tx.send(tick).await.is_err() {
                debug!("Clock receiver dropped, stopping");
                break;
            }
        }
    }
}
