//! Search suggestions for the tag row.
//!
//! Only the newest request is ever delivered: starting a request aborts the
//! previous task and drops its receiver, so a slow stale response cannot
//! overwrite a fresher one.

use anyhow::{Context, Result, anyhow};
use futures::future::BoxFuture;
use reqwest::Client;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::constants::constants;
use crate::tags::{Item, Tag};

/// Receives the full result set of one completed search.
pub trait SearchResults {
  fn on_results(&mut self, items: Vec<Item>);
}

pub trait SuggestionSource: Send + Sync + 'static {
  fn fetch(&self, query: String) -> BoxFuture<'static, Result<Vec<Tag>>>;
}

/// Suggestions from the public YouTube completion endpoint.
#[derive(Clone)]
pub struct RemoteSuggestions {
  client: Client,
}

impl RemoteSuggestions {
  pub fn new(client: Client) -> Self {
    Self { client }
  }
}

impl SuggestionSource for RemoteSuggestions {
  fn fetch(&self, query: String) -> BoxFuture<'static, Result<Vec<Tag>>> {
    let client = self.client.clone();
    Box::pin(async move {
      let c = constants();
      let url = reqwest::Url::parse_with_params(
        &c.suggest_endpoint,
        &[("client", "firefox"), ("ds", "yt"), ("q", query.as_str())],
      )
      .context("Invalid suggestion endpoint")?;
      let body: serde_json::Value = client
        .get(url)
        .send()
        .await
        .context("Failed to reach suggestion service")?
        .error_for_status()
        .context("Suggestion service returned an error")?
        .json()
        .await
        .context("Failed to decode suggestion response")?;
      let mut tags = parse_suggestions(&body)?;
      tags.truncate(c.suggestion_limit);
      Ok(tags)
    })
  }
}

/// The endpoint answers `["query", ["suggestion", ...], ...]`.
fn parse_suggestions(body: &serde_json::Value) -> Result<Vec<Tag>> {
  let list = body
    .get(1)
    .and_then(|v| v.as_array())
    .ok_or_else(|| anyhow!("Unexpected suggestion response shape"))?;
  Ok(list.iter().filter_map(|v| v.as_str()).filter(|s| !s.trim().is_empty()).map(Tag::new).collect())
}

struct InFlight {
  query: String,
  rx: oneshot::Receiver<Result<Vec<Tag>>>,
  handle: JoinHandle<()>,
}

pub struct SuggestionProvider<S: SuggestionSource> {
  source: std::sync::Arc<S>,
  in_flight: Option<InFlight>,
}

impl<S: SuggestionSource> SuggestionProvider<S> {
  pub fn new(source: S) -> Self {
    Self { source: std::sync::Arc::new(source), in_flight: None }
  }

  pub fn is_pending(&self) -> bool {
    self.in_flight.is_some()
  }

  pub fn cancel(&mut self) {
    if let Some(prev) = self.in_flight.take() {
      debug!(query = %prev.query, "suggest: cancelling");
      prev.handle.abort();
    }
  }

  /// Start fetching suggestions for `query`, replacing any unfinished request.
  /// Must be called inside a tokio runtime.
  pub fn request(&mut self, query: &str) {
    self.cancel();
    let query = query.trim().to_string();
    if query.is_empty() {
      return;
    }

    let (tx, rx) = oneshot::channel();
    let source = std::sync::Arc::clone(&self.source);
    let q = query.clone();
    let handle = tokio::spawn(async move {
      let _ = tx.send(source.fetch(q).await);
    });
    self.in_flight = Some(InFlight { query, rx, handle });
  }

  /// Deliver a finished result to `sink`. Returns `true` if it was called.
  pub fn poll(&mut self, sink: &mut dyn SearchResults) -> bool {
    let Some(mut flight) = self.in_flight.take() else { return false };
    match flight.rx.try_recv() {
      Ok(Ok(tags)) => {
        info!(query = %flight.query, count = tags.len(), "suggest: results");
        sink.on_results(tags.into_iter().map(Item::Tag).collect());
        true
      }
      Ok(Err(e)) => {
        warn!(query = %flight.query, err = %format!("{:#}", e), "suggest: fetch failed");
        false
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.in_flight = Some(flight);
        false
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        warn!(query = %flight.query, "suggest: task ended without a result");
        false
      }
    }
  }
}

impl<S: SuggestionSource> Drop for SuggestionProvider<S> {
  fn drop(&mut self) {
    self.cancel();
  }
}
