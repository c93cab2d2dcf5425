//! Cancellable once-per-period tick source for the mock exam countdown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// One elapsed countdown period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

/// A background task sending [`Tick`]s every `period`.
///
/// The task is aborted when this handle is cancelled or dropped, and it
/// exits on its own once the receiving side is gone.
#[derive(Debug)]
pub struct Countdown {
    handle: JoinHandle<()>,
}

impl Countdown {
    /// Spawns the ticking task on the current tokio runtime. The first tick
    /// arrives one full `period` after spawning.
    pub fn spawn<T>(period: Duration, sender: mpsc::UnboundedSender<T>) -> Self
    where
        T: From<Tick> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if sender.send(T::from(Tick)).is_err() {
                    break;
                }
            }
        });
        Self { handle }
    }

    pub fn every_second<T>(sender: mpsc::UnboundedSender<T>) -> Self
    where
        T: From<Tick> + Send + 'static,
    {
        Self::spawn(Duration::from_secs(1), sender)
    }

    pub fn cancel(self) {
        drop(self);
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}

impl Drop for Countdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Tick>();
        let _countdown = Countdown::every_second(tx);

        time::advance(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(Tick));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticking() {
        let (tx, mut rx) = mpsc::unbounded_channel::<Tick>();
        let countdown = Countdown::every_second(tx);
        assert_eq!(rx.recv().await, Some(Tick));

        countdown.cancel();
        // The aborted task drops its sender, closing the channel.
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_exits_when_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel::<Tick>();
        let countdown = Countdown::every_second(tx);
        drop(rx);

        time::sleep(Duration::from_secs(2)).await;
        assert!(!countdown.is_running());
    }
}
