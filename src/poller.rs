//! Status poller — fetch, validate, extract, notify, wait.
//!
//! One task runs the whole loop. Every failure inside a cycle is logged,
//! reported to the channel on a best-effort basis and then retried after
//! the fixed period. Only a configuration error ends the loop.

use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::error::{ErrorKind, PollError};
use crate::notify::{send_message, Notifier};
use crate::practicum::{check_response, current_date, parse_status, HomeworkSource};

/// Lower bound of the next query window, in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollState {
    pub from_date: i64,
}

impl PollState {
    pub fn starting_now() -> Self {
        Self { from_date: Utc::now().timestamp() }
    }

    /// Move the window forward; never backwards.
    fn advance(&mut self, to: Option<i64>) {
        if let Some(to) = to {
            if to > self.from_date {
                self.from_date = to;
            }
        }
    }
}

/// What a single cycle ended with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new status message reached the channel.
    Notified,
    /// A message was produced but matches the last one delivered.
    Unchanged,
    /// A message was produced but delivery failed.
    Undelivered,
    /// The window held no homework updates.
    NoHomeworks,
    /// A recoverable failure; it has been logged and reported.
    Failed(ErrorKind),
}

/// A validated reply: the status message, if any, and the reply's own
/// `current_date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReply {
    pub message: Option<String>,
    pub reply_date: Option<i64>,
}

pub struct Poller {
    source: Arc<dyn HomeworkSource>,
    notifier: Arc<dyn Notifier>,
    state: PollState,
    retry_period: Duration,
    last_message: Option<String>,
}

impl Poller {
    pub fn new(
        source: Arc<dyn HomeworkSource>,
        notifier: Arc<dyn Notifier>,
        state: PollState,
        retry_period: Duration,
    ) -> Self {
        Self { source, notifier, state, retry_period, last_message: None }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Fetch and interpret one reply without touching the window.
    pub async fn poll_once(&self) -> Result<PollReply, PollError> {
        let response = self.source.get_api_answer(self.state.from_date).await?;
        let reply_date = current_date(&response);

        let message = match check_response(response) {
            Ok(record) => Some(parse_status(&record)?),
            Err(PollError::EmptyHomeworks) => {
                debug!(from_date = self.state.from_date, "No status changes in window");
                None
            }
            Err(e) => return Err(e),
        };

        Ok(PollReply { message, reply_date })
    }

    /// Run one full cycle. Recoverable failures are absorbed into the
    /// outcome; a fatal one is returned.
    ///
    /// The window moves forward only once the reply has been fully handled,
    /// so an undelivered status change is fetched again next cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, PollError> {
        match self.poll_once().await {
            Ok(PollReply { message: Some(message), reply_date }) => {
                let outcome = self.deliver(message).await;
                if outcome != CycleOutcome::Undelivered {
                    self.state.advance(reply_date);
                }
                Ok(outcome)
            }
            Ok(PollReply { message: None, reply_date }) => {
                self.state.advance(reply_date);
                Ok(CycleOutcome::NoHomeworks)
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                let kind = e.kind();
                error!(kind = ?kind, "Program failure: {}", e);
                self.deliver(format!("Program failure: {e}")).await;
                Ok(CycleOutcome::Failed(kind))
            }
        }
    }

    /// Send unless identical to the last delivered text.
    async fn deliver(&mut self, message: String) -> CycleOutcome {
        if self.last_message.as_deref() == Some(message.as_str()) {
            debug!("Message unchanged since last delivery — not resending");
            return CycleOutcome::Unchanged;
        }
        if send_message(self.notifier.as_ref(), &message).await {
            self.last_message = Some(message);
            CycleOutcome::Notified
        } else {
            CycleOutcome::Undelivered
        }
    }

    /// Loop until `shutdown` resolves or a fatal error occurs.
    pub async fn run<F>(mut self, shutdown: F) -> Result<(), PollError>
    where
        F: Future<Output = ()>,
    {
        info!(
            from_date = self.state.from_date,
            retry_secs = self.retry_period.as_secs(),
            "📡 Poller started"
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                outcome = self.run_cycle() => {
                    let outcome = outcome?;
                    debug!(?outcome, from_date = self.state.from_date, "Cycle finished");
                }
            }
            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.retry_period) => {}
            }
        }

        info!("Poller stopped");
        Ok(())
    }
}
