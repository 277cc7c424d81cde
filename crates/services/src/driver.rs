//! Real-time pump for sessions that run on a virtual timeline.
//!
//! Sessions never read a clock; they only move when fed elapsed time. The
//! driver measures wall time with tokio's `Instant`, feeds it to the session
//! before every host access and sleeps until the next scheduled task in
//! between, so a host only has to forward user events.

use std::future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify, broadcast};
use tokio::time::{self, Instant};
use tracing::{debug, trace};

use crate::matching::MatchSession;
use crate::quiz::QuizSession;

/// A session that can be pumped by [`SessionDriver`].
pub trait TimedSession: Send + 'static {
    fn advance(&mut self, elapsed: Duration);

    /// Time until the earliest scheduled task, `None` when nothing is pending.
    fn until_next_task(&self) -> Option<Duration>;
}

impl TimedSession for QuizSession {
    fn advance(&mut self, elapsed: Duration) {
        QuizSession::advance(self, elapsed);
    }

    fn until_next_task(&self) -> Option<Duration> {
        QuizSession::until_next_task(self)
    }
}

impl TimedSession for MatchSession {
    fn advance(&mut self, elapsed: Duration) {
        MatchSession::advance(self, elapsed);
    }

    fn until_next_task(&self) -> Option<Duration> {
        MatchSession::until_next_task(self)
    }
}

struct Pumped<S> {
    session: S,
    last: Instant,
}

impl<S: TimedSession> Pumped<S> {
    /// Feeds whole milliseconds elapsed since the last catch-up.
    fn catch_up(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last);
        let whole = Duration::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX));
        if whole.is_zero() {
            return;
        }
        self.session.advance(whole);
        self.last += whole;
    }
}

/// Shares one session between a host and a background pump task.
pub struct SessionDriver<S> {
    inner: Arc<Mutex<Pumped<S>>>,
    wake: Arc<Notify>,
}

impl<S> Clone for SessionDriver<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            wake: Arc::clone(&self.wake),
        }
    }
}

impl<S: TimedSession> SessionDriver<S> {
    #[must_use]
    pub fn new(session: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Pumped {
                session,
                last: Instant::now(),
            })),
            wake: Arc::new(Notify::new()),
        }
    }

    /// Brings the session up to date, applies a host command and wakes the
    /// pump so it picks up any task the command scheduled.
    pub async fn with_session<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut pumped = self.inner.lock().await;
        pumped.catch_up(Instant::now());
        let out = f(&mut pumped.session);
        drop(pumped);
        self.wake.notify_one();
        out
    }

    /// Reads the up-to-date session.
    pub async fn snapshot<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let mut pumped = self.inner.lock().await;
        pumped.catch_up(Instant::now());
        f(&pumped.session)
    }

    /// Fires scheduled tasks on time until `shutdown` yields or its sender
    /// is dropped.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        debug!("session driver started");
        loop {
            let deadline = {
                let mut pumped = self.inner.lock().await;
                pumped.catch_up(Instant::now());
                pumped
                    .session
                    .until_next_task()
                    .map(|wait| pumped.last + wait)
            };
            let sleep = async move {
                match deadline {
                    Some(at) => time::sleep_until(at).await,
                    None => future::pending().await,
                }
            };

            tokio::select! {
                _ = shutdown.recv() => {
                    debug!("session driver stopped");
                    break;
                }
                () = sleep => trace!("session driver woke for a task"),
                () = self.wake.notified() => trace!("session driver woke for a command"),
            }
        }
    }
}
