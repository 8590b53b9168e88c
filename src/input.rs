use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub async fn handle_key_event(app: &mut App, key: event::KeyEvent) -> Result<()> {
  let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

  if ctrl && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return Ok(());
  }

  if ctrl && key.code == KeyCode::Char('p') {
    if app.mode == AppMode::Settings {
      app.close_settings();
    } else {
      app.open_settings();
    }
    return Ok(());
  }

  if ctrl && key.code == KeyCode::Char('s') {
    if app.player.is_playing() {
      app.stop_playback().await.context("Failed to stop playback")?;
    }
    return Ok(());
  }

  match app.mode {
    AppMode::Input => handle_input_key(app, key),
    AppMode::Tags => handle_tags_key(app, key),
    AppMode::Results => handle_results_key(app, key).await.context("Failed to handle results key event")?,
    AppMode::Settings => handle_settings_key(app, key),
  }
  Ok(())
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter => {
      app.trigger_search();
    }
    KeyCode::Char(c) => {
      let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
      app.input.insert(byte_idx, c);
      app.cursor_position += 1;
      app.input_changed();
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.input_changed();
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
        app.input_changed();
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Tab => {
      if !app.tag_row.list.is_empty() {
        app.tag_row.next();
        app.mode = AppMode::Tags;
      }
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
        app.input_changed();
      } else if !app.results.is_empty() {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down => {
      if !app.results.is_empty() {
        app.mode = AppMode::Results;
      }
    }
    _ => {}
  }
}

fn handle_tags_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Right | KeyCode::Tab | KeyCode::Char('l') => app.tag_row.next(),
    KeyCode::Left | KeyCode::BackTab | KeyCode::Char('h') => app.tag_row.prev(),
    KeyCode::Enter => {
      app.search_selected_tag();
      app.tag_row.selected = None;
    }
    KeyCode::Esc | KeyCode::Up => {
      app.tag_row.selected = None;
      app.mode = AppMode::Input;
    }
    KeyCode::Down => {
      if !app.results.is_empty() {
        app.tag_row.selected = None;
        app.mode = AppMode::Results;
      }
    }
    _ => {}
  }
}

async fn handle_results_key(app: &mut App, key: event::KeyEvent) -> Result<()> {
  match key.code {
    KeyCode::Enter => {
      app.trigger_load();
    }
    KeyCode::Char(' ') => {
      app.toggle_pause().await;
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.results.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1).min(count - 1));
        app.list_state.select(Some(i));
        if app.near_end() {
          app.trigger_load_more();
        }
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      match app.list_state.selected() {
        Some(0) | None => app.mode = AppMode::Input,
        Some(i) => app.list_state.select(Some(i - 1)),
      }
    }
    KeyCode::Esc => {
      app.mode = AppMode::Input;
    }
    _ => {}
  }
  Ok(())
}

fn handle_settings_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Down | KeyCode::Char('j') => app.settings.next(),
    KeyCode::Up | KeyCode::Char('k') => app.settings.prev(),
    KeyCode::Enter | KeyCode::Char(' ') => app.activate_setting(),
    KeyCode::Esc => app.close_settings(),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Config;
  use crate::paging::Group;
  use crate::tags::{Item, Tag};
  use crate::youtube::VideoSummary;
  use ratatui::crossterm::event::KeyEvent;

  fn press(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn app_with_results(n: usize) -> App {
    let mut app = App::new(Config { suggestions: Some(false), ..Config::default() });
    let items = (0..n)
      .map(|i| {
        Item::Video(VideoSummary { video_id: i.to_string(), title: i.to_string(), channel: None, duration_secs: None })
      })
      .collect();
    app.on_search_page(Ok(Group::new(items)));
    app
  }

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- key handling ---

  #[tokio::test]
  async fn typing_edits_input() {
    let mut app = App::new(Config { suggestions: Some(false), ..Config::default() });
    for c in "cats".chars() {
      handle_key_event(&mut app, press(KeyCode::Char(c))).await.unwrap();
    }
    handle_key_event(&mut app, press(KeyCode::Backspace)).await.unwrap();
    assert_eq!(app.input, "cat");
    assert_eq!(app.cursor_position, 3);
  }

  #[tokio::test]
  async fn results_navigation_stops_at_bounds() {
    let mut app = app_with_results(3);
    assert_eq!(app.mode, AppMode::Results);
    for _ in 0..5 {
      handle_key_event(&mut app, press(KeyCode::Down)).await.unwrap();
    }
    assert_eq!(app.list_state.selected(), Some(2));

    app.list_state.select(Some(0));
    handle_key_event(&mut app, press(KeyCode::Up)).await.unwrap();
    assert_eq!(app.mode, AppMode::Input);
  }

  #[tokio::test]
  async fn tab_enters_tag_row_only_with_tags() {
    use crate::suggest::SearchResults;

    let mut app = App::new(Config { suggestions: Some(false), ..Config::default() });
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.mode, AppMode::Input);

    app.tag_row.on_results(vec![Item::Tag(Tag::new("lofi"))]);
    handle_key_event(&mut app, press(KeyCode::Tab)).await.unwrap();
    assert_eq!(app.mode, AppMode::Tags);
    assert_eq!(app.tag_row.selected, Some(0));

    handle_key_event(&mut app, press(KeyCode::Esc)).await.unwrap();
    assert_eq!(app.mode, AppMode::Input);
    assert_eq!(app.tag_row.selected, None);
  }

  #[tokio::test]
  async fn ctrl_p_toggles_settings() {
    let mut app = App::new(Config::default());
    let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
    handle_key_event(&mut app, ctrl_p).await.unwrap();
    assert_eq!(app.mode, AppMode::Settings);
    handle_key_event(&mut app, press(KeyCode::Down)).await.unwrap();
    assert_eq!(app.settings.selected, 1);
    handle_key_event(&mut app, ctrl_p).await.unwrap();
    assert_eq!(app.mode, AppMode::Input);
  }
}
