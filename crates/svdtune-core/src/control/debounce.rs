//! Single-timer debouncing for control changes.
//!
//! A slider drag produces a burst of changes; only the value that survives a
//! quiet period should reach the backend. The [`Debouncer`] keeps at most one
//! live timer. Arming it again cancels the pending timer and starts a new one,
//! so at most one value is emitted per quiet window and it is always the last
//! one armed.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A value whose debounce window elapsed without being superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<T> {
    /// Generation of the arm that produced this value
    pub generation: u64,
    /// The armed value
    pub value: T,
}

/// Debouncer that posts the last armed value once the delay elapses.
///
/// Fired values are delivered through a channel so the owner can apply them
/// on its own event loop. Because a timer may fire just before it is
/// cancelled, the owner must pass every received [`Fired`] through
/// [`Debouncer::accept`], which drops values from superseded generations.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<Fired<T>>,
    generation: u64,
    pending: Option<JoinHandle<()>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer with the given delay, posting fired values to `tx`.
    #[must_use]
    pub const fn new(delay: Duration, tx: mpsc::UnboundedSender<Fired<T>>) -> Self {
        Self {
            delay,
            tx,
            generation: 0,
            pending: None,
        }
    }

    /// Cancel any pending timer and start a new one for `value`.
    ///
    /// Returns the generation assigned to this arm.
    pub fn arm(&mut self, value: T) -> u64 {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Fired { generation, value });
        }));

        tracing::debug!(generation, delay_ms = delay.as_millis(), "debounce timer armed");
        generation
    }

    /// Drop the pending timer, if any, without emitting its value.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Whether a timer is armed and has not been accepted or cancelled.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Accept a fired value if it belongs to the live timer.
    ///
    /// Returns `None` for values from a cancelled or superseded arm.
    pub fn accept(&mut self, fired: Fired<T>) -> Option<T> {
        if self.pending.is_none() || fired.generation != self.generation {
            tracing::debug!(
                generation = fired.generation,
                live = self.generation,
                "discarding superseded debounce fire"
            );
            return None;
        }
        self.pending = None;
        Some(fired.value)
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}
