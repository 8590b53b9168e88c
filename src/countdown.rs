use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::TryRecvError;

use crate::ticker::{TickReceiver, Ticker};
use crate::youtube::format_duration;

/// Remaining-time label for the playback screen.
///
/// Listens to the [`Ticker`] only while visible. Callers hide it (or call
/// [`CountdownLabel::detach`]) when playback ends so no ticks are delivered
/// to a label nobody sees.
#[derive(Default)]
pub struct CountdownLabel {
  ticks: Option<TickReceiver>,
  visible: bool,
  remaining: Duration,
  /// Last tick seen while running; `None` while paused or stopped.
  last_tick: Option<Instant>,
  running: bool,
  text: String,
}

impl CountdownLabel {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_visible(&self) -> bool {
    self.visible
  }

  pub fn is_subscribed(&self) -> bool {
    self.ticks.is_some()
  }

  pub fn set_visible(&mut self, visible: bool, ticker: &Ticker) {
    if visible == self.visible {
      return;
    }
    self.visible = visible;
    if visible {
      self.ticks = Some(ticker.subscribe());
    } else {
      self.ticks = None;
    }
    self.last_tick = None;
  }

  /// Drop the tick subscription for good.
  pub fn detach(&mut self) {
    self.visible = false;
    self.ticks = None;
  }

  pub fn start(&mut self, total: Duration) {
    self.remaining = total;
    self.running = true;
    self.last_tick = None;
    self.refresh_text();
  }

  pub fn pause(&mut self) {
    self.running = false;
    self.last_tick = None;
  }

  pub fn resume(&mut self) {
    self.running = true;
  }

  /// Snap to a position reported by the player. Ticks only interpolate
  /// between reports.
  pub fn sync(&mut self, remaining: Duration, paused: bool) -> bool {
    self.remaining = remaining;
    self.running = !paused && !remaining.is_zero();
    self.last_tick = None;
    self.refresh_text()
  }

  pub fn reset(&mut self) {
    self.running = false;
    self.remaining = Duration::ZERO;
    self.last_tick = None;
    self.text.clear();
  }

  pub fn remaining(&self) -> Duration {
    self.remaining
  }

  pub fn text(&self) -> &str {
    &self.text
  }

  /// Drain pending ticks. Returns `true` if the text changed.
  pub fn poll(&mut self) -> bool {
    let mut latest = None;
    if let Some(rx) = self.ticks.as_mut() {
      loop {
        match rx.try_recv() {
          Ok(at) => latest = Some(at),
          Err(TryRecvError::Lagged(_)) => continue,
          Err(TryRecvError::Empty) => break,
          Err(TryRecvError::Closed) => {
            self.ticks = None;
            break;
          }
        }
      }
    }
    match latest {
      Some(at) => self.on_tick(at),
      None => false,
    }
  }

  fn on_tick(&mut self, at: Instant) -> bool {
    if !self.running {
      return false;
    }
    // The first tick after start/resume only anchors the clock.
    if let Some(prev) = self.last_tick {
      self.remaining = self.remaining.saturating_sub(at.saturating_duration_since(prev));
    }
    self.last_tick = Some(at);
    if self.remaining.is_zero() {
      self.running = false;
    }
    self.refresh_text()
  }

  fn refresh_text(&mut self) -> bool {
    let text = format!("-{}", format_duration(self.remaining.as_secs()));
    if text == self.text {
      return false;
    }
    self.text = text;
    true
  }
}
