use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::trace;

use crate::app::domain::messages::Event;

/// Single cancelable debounce timer.
///
/// Arming always replaces the previous timer (last edit wins). Each arm or
/// cancel bumps the generation, so an expiry that was already queued when the
/// timer got canceled is recognized as stale and dropped.
pub struct AutosaveTimer {
    delay: Duration,
    events: UnboundedSender<Event>,
    pending: Option<JoinHandle<()>>,
    generation: u64,
}

impl AutosaveTimer {
    pub fn new(delay: Duration, events: UnboundedSender<Event>) -> Self {
        Self {
            delay,
            events,
            pending: None,
            generation: 0,
        }
    }

    /// (Re)start the countdown from now.
    pub fn arm(&mut self) {
        self.cancel();
        let generation = self.generation;
        let delay = self.delay;
        let events = self.events.clone();
        trace!(generation, "autosave armed");
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::AutosaveDue { generation });
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.generation += 1;
    }

    /// Consume an expiry. Only the most recently armed, still pending timer
    /// counts; anything else is stale.
    pub fn take_expiry(&mut self, generation: u64) -> bool {
        if generation != self.generation || self.pending.is_none() {
            return false;
        }
        self.pending = None;
        true
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const DELAY: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = AutosaveTimer::new(DELAY, tx);
        timer.arm();
        assert!(timer.is_armed());

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        let Ok(Event::AutosaveDue { generation }) = rx.try_recv() else {
            panic!("expected an expiry");
        };
        assert!(timer.take_expiry(generation));
        assert!(!timer.is_armed());
        // Consumed once only
        assert!(!timer.take_expiry(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_restarts_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = AutosaveTimer::new(DELAY, tx);
        timer.arm();
        tokio::time::sleep(Duration::from_millis(600)).await;
        timer.arm();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(500)).await;
        let Ok(Event::AutosaveDue { generation }) = rx.try_recv() else {
            panic!("expected an expiry");
        };
        assert!(timer.take_expiry(generation));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_queued_expiry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = AutosaveTimer::new(DELAY, tx);
        timer.arm();
        tokio::time::sleep(Duration::from_millis(1001)).await;

        // Expiry is already queued when the cancel happens
        timer.cancel();
        let Ok(Event::AutosaveDue { generation }) = rx.try_recv() else {
            panic!("expected an expiry");
        };
        assert!(!timer.take_expiry(generation));
    }

    #[tokio::test(start_paused = true)]
    async fn test_canceled_timer_never_fires() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut timer = AutosaveTimer::new(DELAY, tx);
        timer.arm();
        timer.cancel();
        tokio::time::sleep(Duration::from_millis(5000)).await;
        assert!(rx.try_recv().is_err());
    }
}
