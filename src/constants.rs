//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!` so it's always available,
//! with no runtime file I/O. Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Listing sizes
  /// Upper bound handed to `ytsearchN:`; pages are cut from this pool.
  pub search_pool: usize,
  pub initial_page_size: usize,
  pub page_size: usize,
  /// Request the next page when the selection is this close to the end.
  pub load_more_threshold: usize,

  // Suggestions
  pub suggest_endpoint: String,
  pub suggestion_limit: usize,
  pub suggest_debounce_ms: u64,

  // UI
  pub tick_ms: u64,
  pub error_dismiss_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is caught by the tests below.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn embedded_constants_parse() {
    let c = constants();
    assert!(c.page_size > 0);
    assert!(c.initial_page_size >= c.page_size);
    assert!(c.search_pool >= c.initial_page_size);
    assert!(c.suggest_endpoint.starts_with("https://"));
  }
}
