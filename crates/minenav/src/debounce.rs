//! Delayed delivery where each new value cancels the pending one.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

/// Sends a scheduled value after `delay` unless another value is scheduled first.
pub struct Debouncer<T> {
    delay: Duration,
    sender: UnboundedSender<T>,
    pending: Option<CancellationToken>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration, sender: UnboundedSender<T>) -> Self {
        Self {
            delay,
            sender,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T) {
        self.cancel();

        let cancel_token = CancellationToken::new();
        self.pending = Some(cancel_token.clone());

        let sender = self.sender.clone();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel_token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    // The receiver is gone once the session ends.
                    let _ = sender.send(value);
                }
            }
        });
    }

    /// Cancel the pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(cancel_token) => {
                let was_pending = !cancel_token.is_cancelled();
                cancel_token.cancel();
                was_pending
            }
            None => false,
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(cancel_token) = self.pending.take() {
            cancel_token.cancel();
        }
    }
}
