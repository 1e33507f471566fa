//! Cancellable call context
//!
//! A [`Context`] travels with every registry call. It can be cancelled
//! through its [`CancelHandle`] and can carry a deadline. Contexts are
//! cheap to clone; clones observe the same cancellation.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

use super::error::CancelReason;

#[derive(Debug, Clone)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels the context it was created with. Dropping it does not cancel.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self {
            cancel: None,
            deadline: None,
        }
    }

    /// A context that ends when the returned handle is cancelled
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel: Some(rx),
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// Derive a context that also ends at `deadline`. An earlier existing
    /// deadline wins.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: why the context has ended, if it has
    pub fn err(&self) -> Option<CancelReason> {
        if let Some(rx) = &self.cancel {
            if *rx.borrow() {
                return Some(CancelReason::Cancelled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(CancelReason::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context ends. Never resolves for a background
    /// context.
    pub async fn done(&self) -> CancelReason {
        let cancelled = Self::cancelled(self.cancel.clone());
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = cancelled => CancelReason::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => CancelReason::DeadlineExceeded,
                }
            }
            None => {
                cancelled.await;
                CancelReason::Cancelled
            }
        }
    }

    async fn cancelled(rx: Option<watch::Receiver<bool>>) {
        let Some(mut rx) = rx else {
            return std::future::pending().await;
        };
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                // Handle dropped without cancelling
                return std::future::pending().await;
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready_eq, task};

    #[test]
    fn test_background_never_ends() {
        let ctx = Context::background();
        assert_eq!(ctx.err(), None);
        let mut done = task::spawn(ctx.done());
        assert_pending!(done.poll());
    }

    #[test]
    fn test_cancel_wakes_done() {
        let (ctx, handle) = Context::with_cancel();
        let mut done = task::spawn(ctx.done());
        assert_pending!(done.poll());

        handle.cancel();
        assert!(done.is_woken());
        assert_ready_eq!(done.poll(), CancelReason::Cancelled);
        assert_eq!(ctx.err(), Some(CancelReason::Cancelled));
    }

    #[test]
    fn test_clones_share_cancellation() {
        let (ctx, handle) = Context::with_cancel();
        let child = ctx.with_timeout(Duration::from_secs(3600));
        handle.cancel();
        assert_eq!(child.err(), Some(CancelReason::Cancelled));
    }

    #[test]
    fn test_dropped_handle_does_not_cancel() {
        let (ctx, handle) = Context::with_cancel();
        drop(handle);
        assert_eq!(ctx.err(), None);
        let mut done = task::spawn(ctx.done());
        assert_pending!(done.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = Context::background().with_timeout(Duration::from_millis(50));
        assert_eq!(ctx.err(), None);
        assert_eq!(ctx.done().await, CancelReason::DeadlineExceeded);
        assert_eq!(ctx.err(), Some(CancelReason::DeadlineExceeded));
    }

    #[test]
    fn test_earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background().with_deadline(now + Duration::from_secs(1));
        let later = ctx.with_deadline(now + Duration::from_secs(10));
        assert_eq!(later.deadline(), Some(now + Duration::from_secs(1)));
    }
}
