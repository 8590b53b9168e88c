//! Periodic tick broadcaster shared by time-driven widgets.
//!
//! Widgets hold a [`TickReceiver`] only while they are on screen. Dropping the
//! receiver is the unsubscribe, so the background task has nothing to do
//! while every consumer is hidden.

use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub type TickReceiver = broadcast::Receiver<Instant>;

/// Ticks are only ever read to find the latest one, so a short buffer is enough.
const TICK_BUFFER: usize = 4;

pub struct Ticker {
  period: Duration,
  tx: broadcast::Sender<Instant>,
  handle: Option<JoinHandle<()>>,
}

impl Ticker {
  pub fn new(period: Duration) -> Self {
    let (tx, _) = broadcast::channel(TICK_BUFFER);
    Self { period, tx, handle: None }
  }

  pub fn period(&self) -> Duration {
    self.period
  }

  pub fn subscribe(&self) -> TickReceiver {
    self.tx.subscribe()
  }

  pub fn subscriber_count(&self) -> usize {
    self.tx.receiver_count()
  }

  /// Broadcast one tick. Returns how many subscribers received it.
  pub fn tick(&self, now: Instant) -> usize {
    if self.tx.receiver_count() == 0 {
      return 0;
    }
    self.tx.send(now).unwrap_or(0)
  }

  /// Spawn the interval task. Must be called inside a tokio runtime.
  pub fn start(&mut self) {
    if self.handle.is_some() {
      return;
    }
    let tx = self.tx.clone();
    let period = self.period;
    info!(period_ms = period.as_millis() as u64, "ticker: started");
    self.handle = Some(tokio::spawn(async move {
      let mut interval = tokio::time::interval(period);
      interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
      loop {
        interval.tick().await;
        if tx.receiver_count() > 0 {
          let _ = tx.send(Instant::now());
        }
      }
    }));
  }

  pub fn is_running(&self) -> bool {
    self.handle.is_some()
  }

  pub fn shutdown(&mut self) {
    if let Some(handle) = self.handle.take() {
      debug!("ticker: shutting down");
      handle.abort();
    }
  }
}

impl Drop for Ticker {
  fn drop(&mut self) {
    self.shutdown();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn tick_without_subscribers_is_dropped() {
    let ticker = Ticker::new(Duration::from_secs(1));
    assert_eq!(ticker.tick(Instant::now()), 0);
  }

  #[test]
  fn dropping_receiver_unsubscribes() {
    let ticker = Ticker::new(Duration::from_secs(1));
    let rx = ticker.subscribe();
    assert_eq!(ticker.subscriber_count(), 1);
    drop(rx);
    assert_eq!(ticker.subscriber_count(), 0);
  }

  #[test]
  fn manual_tick_reaches_every_subscriber() {
    let ticker = Ticker::new(Duration::from_secs(1));
    let mut a = ticker.subscribe();
    let mut b = ticker.subscribe();
    let now = Instant::now();
    assert_eq!(ticker.tick(now), 2);
    assert_eq!(a.try_recv().ok(), Some(now));
    assert_eq!(b.try_recv().ok(), Some(now));
  }

  #[tokio::test]
  async fn background_task_ticks_and_shuts_down() {
    let mut ticker = Ticker::new(Duration::from_millis(10));
    let mut rx = ticker.subscribe();
    ticker.start();
    assert!(ticker.is_running());

    let tick = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;
    assert!(matches!(tick, Ok(Ok(_))));

    ticker.shutdown();
    assert!(!ticker.is_running());
  }
}
