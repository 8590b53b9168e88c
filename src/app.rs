use anyhow::Result;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::constants;
use crate::countdown::CountdownLabel;
use crate::paging::{Group, ListChange, PagedList, TraceObserver};
use crate::player::{Player, VideoDetails};
use crate::quirks::DecoderQuirks;
use crate::settings::{Setting, SettingsScreen};
use crate::suggest::{RemoteSuggestions, SearchResults, SuggestionProvider};
use crate::tags::{Item, TagList};
use crate::theme::{THEMES, Theme, theme_index};
use crate::ticker::Ticker;
use crate::youtube::{detect_channel_url, fetch_page, get_video_info, search_source};

// --- Types ---

pub type PageResult = Result<Group<Item>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Tags,
  Results,
  Settings,
}

/// The suggestion row under the search box.
#[derive(Default)]
pub struct TagRow {
  pub list: TagList,
  pub selected: Option<usize>,
}

impl SearchResults for TagRow {
  fn on_results(&mut self, items: Vec<Item>) {
    self.list.clear();
    self.list.add_all(items);
    self.selected = None;
  }
}

impl TagRow {
  pub fn next(&mut self) {
    if self.list.is_empty() {
      return;
    }
    self.selected = Some(self.selected.map_or(0, |i| (i + 1) % self.list.len()));
  }

  pub fn prev(&mut self) {
    if self.list.is_empty() {
      return;
    }
    let len = self.list.len();
    self.selected = Some(self.selected.map_or(len - 1, |i| if i == 0 { len - 1 } else { i - 1 }));
  }
}

/// Keep the grid selection stable across a list change.
///
/// Appends never move the selection, so the grid doesn't jump while the next
/// page streams in. A removal that swallows the selection clamps it.
pub fn apply_change(list_state: &mut ListState, change: ListChange, len: usize) {
  match change {
    ListChange::Inserted { .. } => {
      if list_state.selected().is_none() && len > 0 {
        list_state.select(Some(0));
      }
    }
    ListChange::Removed { .. } => {
      if len == 0 {
        list_state.select(None);
        *list_state.offset_mut() = 0;
      } else if let Some(sel) = list_state.selected()
        && sel >= len
      {
        list_state.select(Some(len - 1));
      }
    }
  }
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) search_rx: Option<oneshot::Receiver<PageResult>>,
  pub(crate) more_rx: Option<oneshot::Receiver<PageResult>>,
  pub(crate) load_rx: Option<oneshot::Receiver<Result<VideoDetails>>>,
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub mode: AppMode,
  /// Mode to return to when leaving the settings screen.
  previous_mode: AppMode,
  pub theme_index: usize,
  pub config: Config,
  pub results: PagedList<Item>,
  pub list_state: ListState,
  pub tag_row: TagRow,
  pub suggestions: SuggestionProvider<RemoteSuggestions>,
  /// When the debounced suggestion request should fire.
  suggest_due: Option<Instant>,
  pub settings: SettingsScreen,
  pub player: Player,
  pub countdown: CountdownLabel,
  pub ticker: Ticker,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  pub should_quit: bool,
  pub(crate) tasks: AsyncTasks,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(config: Config) -> Self {
    let quirks = DecoderQuirks::for_profile(&config.device_profile(), config.surface_clamp_forced());
    let mut results = PagedList::new();
    results.subscribe(Box::new(TraceObserver { name: "results" }));
    let mut tag_row = TagRow::default();
    tag_row.list.subscribe(Box::new(TraceObserver { name: "tags" }));

    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      mode: AppMode::Input,
      previous_mode: AppMode::Input,
      theme_index: theme_index(config.theme_name.as_deref()),
      config,
      results,
      list_state: ListState::default(),
      tag_row,
      suggestions: SuggestionProvider::new(RemoteSuggestions::new(reqwest::Client::new())),
      suggest_due: None,
      settings: SettingsScreen::default(),
      player: Player::new(quirks),
      countdown: CountdownLabel::new(),
      ticker: Ticker::new(Duration::from_millis(constants().tick_ms)),
      last_error: None,
      status_message: None,
      should_quit: false,
      tasks: AsyncTasks::default(),
      error_time: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index always comes from theme_index(), which is bounded by THEMES.len().
    &THEMES[self.theme_index]
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  // --- Settings ---

  pub fn open_settings(&mut self) {
    if self.mode != AppMode::Settings {
      self.previous_mode = self.mode;
      self.mode = AppMode::Settings;
    }
  }

  pub fn close_settings(&mut self) {
    self.mode = self.previous_mode;
  }

  /// Toggle the selected setting, persist it and apply it to the running app.
  pub fn activate_setting(&mut self) {
    let changed = self.settings.activate(&mut self.config);
    self.config.save();
    info!(setting = changed.label(), value = %changed.value(&self.config), "settings: changed");
    match changed {
      Setting::Theme => self.theme_index = theme_index(self.config.theme_name.as_deref()),
      Setting::Suggestions => {
        if !self.config.suggestions_enabled() {
          self.suggestions.cancel();
          self.suggest_due = None;
          self.tag_row.list.clear();
          self.tag_row.selected = None;
        }
      }
      Setting::SurfaceClamp => {
        self.player.quirks =
          DecoderQuirks::for_profile(&self.config.device_profile(), self.config.surface_clamp_forced());
      }
    }
  }

  // --- Suggestions ---

  /// Called after every edit of the search box.
  pub fn input_changed(&mut self) {
    if !self.config.suggestions_enabled() {
      return;
    }
    if self.input.trim().is_empty() {
      self.suggest_due = None;
      self.suggestions.cancel();
      return;
    }
    self.suggest_due = Some(Instant::now() + Duration::from_millis(constants().suggest_debounce_ms));
  }

  fn poll_suggestions(&mut self) {
    if let Some(due) = self.suggest_due
      && Instant::now() >= due
    {
      self.suggest_due = None;
      self.suggestions.request(&self.input);
    }
    self.suggestions.poll(&mut self.tag_row);
  }

  /// Put the selected tag into the search box and search for it.
  pub fn search_selected_tag(&mut self) {
    let Some(tag) = self.tag_row.selected.and_then(|i| self.tag_row.list.tags().get(i)) else { return };
    self.input = tag.text.clone();
    self.cursor_position = self.input.chars().count();
    self.input_scroll = 0;
    self.trigger_search();
  }

  // --- Listing ---

  pub fn trigger_search(&mut self) {
    let query = self.input.trim().to_string();
    if query.is_empty() {
      self.set_error("Enter a search term.".to_string());
      return;
    }
    info!(query = %query, "search triggered");
    self.tasks.search_rx = None;
    self.tasks.more_rx = None;
    self.suggest_due = None;
    self.suggestions.cancel();
    self.clear_error();

    let (source, title) = match detect_channel_url(&query) {
      Some(url) => {
        self.status_message = Some("Loading channel…".to_string());
        (url, format!("Channel {}", query))
      }
      None => {
        self.status_message = Some(format!("Searching '{}'…", query));
        (search_source(&query), format!("Search '{}'", query))
      }
    };

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let page = fetch_page(&source, 1, constants().initial_page_size).await;
      let _ = tx.send(page.map(|g| g.with_title(title)));
    });
    self.tasks.search_rx = Some(rx);
  }

  /// Fetch the next page of the current listing, if it has one.
  pub fn trigger_load_more(&mut self) {
    if self.tasks.more_rx.is_some() || self.tasks.search_rx.is_some() {
      return;
    }
    let Some(last) = self.results.group() else { return };
    let Some(next) = last.continuation.clone() else { return };
    let title = last.title.clone();
    debug!(source = %next.source, start = next.start, "load more");

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let page = fetch_page(&next.source, next.start, constants().page_size).await;
      let _ = tx.send(page.map(|g| Group { title, ..g }));
    });
    self.tasks.more_rx = Some(rx);
  }

  /// Whether the selection is close enough to the end to prefetch.
  pub fn near_end(&self) -> bool {
    match self.list_state.selected() {
      Some(sel) => sel + constants().load_more_threshold >= self.results.len(),
      None => false,
    }
  }

  pub fn on_search_page(&mut self, result: PageResult) {
    self.status_message = None;
    match result {
      Ok(group) if group.is_empty() => {
        if let Some(change) = self.results.clear() {
          apply_change(&mut self.list_state, change, self.results.len());
        }
        self.set_error("No results found.".to_string());
      }
      Ok(group) => {
        if let Some(change) = self.results.clear() {
          apply_change(&mut self.list_state, change, self.results.len());
        }
        if let Some(change) = self.results.append(Some(group)) {
          apply_change(&mut self.list_state, change, self.results.len());
        }
        self.mode = AppMode::Results;
      }
      Err(e) => self.set_error(format!("Search failed: {:#}", e)),
    }
  }

  pub fn on_more_page(&mut self, result: PageResult) {
    match result {
      Ok(group) => {
        let change = self.results.append(Some(group));
        if let Some(change) = change {
          apply_change(&mut self.list_state, change, self.results.len());
        }
      }
      Err(e) => self.set_error(format!("Failed to load more: {:#}", e)),
    }
  }

  pub fn selected_item(&self) -> Option<&Item> {
    self.list_state.selected().and_then(|i| self.results.try_get(i))
  }

  // --- Playback ---

  pub fn trigger_load(&mut self) {
    let video_id = match self.selected_item().cloned() {
      Some(Item::Video(v)) => v.video_id,
      Some(Item::Tag(t)) => {
        self.input = t.text;
        self.cursor_position = self.input.chars().count();
        self.trigger_search();
        return;
      }
      None => return,
    };
    self.clear_error();
    self.status_message = Some("Loading…".to_string());

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(get_video_info(&video_id).await);
    });
    self.tasks.load_rx = Some(rx);
  }

  async fn on_video_loaded(&mut self, result: Result<VideoDetails>) {
    self.status_message = None;
    match result {
      Ok(details) => {
        let duration = details.duration_secs.map(Duration::from_secs);
        if let Err(e) = self.player.play(details).await {
          self.set_error(format!("Playback error: {:#}", e));
          let _ = self.player.stop().await;
          self.playback_ended();
          return;
        }
        self.show_countdown(duration);
      }
      Err(e) => self.set_error(format!("Failed to load: {:#}", e)),
    }
  }

  pub async fn toggle_pause(&mut self) {
    if !self.player.is_playing() {
      return;
    }
    if let Err(e) = self.player.toggle_pause().await {
      self.set_error(format!("Pause error: {:#}", e));
      return;
    }
    if self.player.paused {
      self.countdown.pause();
    } else {
      self.countdown.resume();
    }
  }

  pub async fn stop_playback(&mut self) -> Result<()> {
    self.player.stop().await?;
    self.playback_ended();
    Ok(())
  }

  /// Show the label for a timed video; live streams get none.
  fn show_countdown(&mut self, duration: Option<Duration>) {
    match duration {
      Some(total) => {
        self.countdown.start(total);
        self.countdown.set_visible(true, &self.ticker);
      }
      None => self.playback_ended(),
    }
  }

  fn playback_ended(&mut self) {
    self.countdown.set_visible(false, &self.ticker);
    self.countdown.reset();
  }

  /// Release everything tied to the screen before exit.
  pub async fn shutdown(&mut self) -> Result<()> {
    self.countdown.detach();
    self.ticker.shutdown();
    self.suggestions.cancel();
    self.player.stop().await
  }

  // --- Polling ---

  pub async fn check_pending(&mut self) -> Result<()> {
    if let Some(mut rx) = self.tasks.search_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.on_search_page(result),
        Err(oneshot::error::TryRecvError::Empty) => self.tasks.search_rx = Some(rx),
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Search task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.more_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.on_more_page(result),
        Err(oneshot::error::TryRecvError::Empty) => self.tasks.more_rx = Some(rx),
        Err(oneshot::error::TryRecvError::Closed) => {}
      }
    }

    if let Some(mut rx) = self.tasks.load_rx.take() {
      match rx.try_recv() {
        Ok(result) => self.on_video_loaded(result).await,
        Err(oneshot::error::TryRecvError::Empty) => self.tasks.load_rx = Some(rx),
        Err(oneshot::error::TryRecvError::Closed) => {
          self.status_message = None;
          self.set_error("Load task failed.".to_string());
        }
      }
    }

    self.poll_suggestions();

    if self.player.check_status() {
      self.playback_ended();
    } else if let Some(status) = self.player.take_status()
      && self.countdown.is_visible()
    {
      self.countdown.sync(status.remaining(), status.paused);
    }
    self.countdown.poll();

    Ok(())
  }
}
