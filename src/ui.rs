use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph},
};

use crate::app::{App, AppMode};
use crate::settings::Setting;
use crate::tags::Item;
use crate::theme::Theme;
use crate::youtube::format_duration;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, input_area, tags_area, main_area, status_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_input(frame, app, input_area);
  render_tags(frame, app, tags_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_footer(frame, app, footer_area);

  if app.mode == AppMode::Settings {
    render_settings(frame, app, main_area);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let left = Line::from(Span::styled(" ▶ tvtube ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)));
  frame.render_widget(left, area);

  let clock = chrono::Local::now().format("%a %H:%M");
  let right_text = if app.countdown.is_visible() && !app.countdown.text().is_empty() {
    format!("{}  {}  v{} ", app.countdown.text(), clock, env!("CARGO_PKG_VERSION"))
  } else {
    format!("{}  v{} ", clock, env!("CARGO_PKG_VERSION"))
  };
  let width = right_text.chars().count() as u16;
  let right = Line::from(Span::styled(right_text, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(width), width: width.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Input { theme.accent } else { theme.border };
  let input_block = rounded(theme)
    .title(" Search YouTube ")
    .title_style(Style::default().fg(border_color))
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if app.mode == AppMode::Input {
    let cursor_x = area.x + 2 + (cursor_col - app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_tags(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let tags = app.tag_row.list.tags();
  if tags.is_empty() {
    let hint = if app.suggestions.is_pending() { " …" } else { "" };
    frame.render_widget(Line::from(Span::styled(hint, Style::default().fg(theme.muted))), area);
    return;
  }

  let mut spans = vec![Span::raw(" ")];
  for (i, tag) in tags.iter().enumerate() {
    let style = if app.mode == AppMode::Tags && app.tag_row.selected == Some(i) {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    spans.push(Span::styled(format!(" {} ", tag.text), style));
    spans.push(Span::raw(" "));
  }
  frame.render_widget(Line::from(spans), area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  if !app.results.is_empty() && app.mode != AppMode::Input {
    render_results(frame, app, area);
  } else if app.player.is_playing() {
    render_player(frame, app, area);
  } else if !app.results.is_empty() {
    render_results(frame, app, area);
  } else {
    render_welcome(frame, app.theme(), area);
  }
}

fn render_welcome(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  tvtube", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("YouTube from the couch.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled("Type a query or @channel and press Enter.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded(theme));
  frame.render_widget(paragraph, area);
}

fn render_player(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let block = rounded(theme)
    .title(Span::styled(" Now Playing ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .padding(Padding::horizontal(1));

  let Some(details) = &app.player.current_details else {
    frame.render_widget(block, area);
    return;
  };
  let inner_w = area.width.saturating_sub(4) as usize;

  let mut lines = vec![
    Line::from(""),
    Line::from(Span::styled(
      truncate_str(&details.title, inner_w),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
  ];
  if let Some(uploader) = &details.uploader {
    let label = "Uploader   ";
    lines.push(Line::from(vec![
      Span::styled(label, Style::default().fg(theme.muted)),
      Span::styled(truncate_str(uploader, inner_w.saturating_sub(label.len())), Style::default().fg(theme.fg)),
    ]));
  }
  if let Some(secs) = details.duration_secs {
    lines.push(Line::from(vec![
      Span::styled("Duration   ", Style::default().fg(theme.muted)),
      Span::styled(format_duration(secs), Style::default().fg(theme.fg)),
    ]));
  }
  if app.countdown.is_visible() {
    lines.push(Line::from(vec![
      Span::styled("Remaining  ", Style::default().fg(theme.muted)),
      Span::styled(app.countdown.text().to_string(), Style::default().fg(theme.accent)),
    ]));
  }
  if let (Some(w), Some(h)) = (details.width, details.height) {
    lines.push(Line::from(vec![
      Span::styled("Source     ", Style::default().fg(theme.muted)),
      Span::styled(format!("{}x{}", w, h), Style::default().fg(theme.fg)),
    ]));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    truncate_str(&details.url, inner_w),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));

  frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let loading_more = app.tasks.more_rx.is_some();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .results
    .iter()
    .enumerate()
    .map(|(i, item)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let right = match item {
        Item::Video(v) => {
          let channel = v.channel.as_deref().unwrap_or("");
          match v.duration_secs {
            Some(secs) if !channel.is_empty() => format!("{}  {}", channel, format_duration(secs)),
            Some(secs) => format_duration(secs),
            None => channel.to_string(),
          }
        }
        Item::Tag(_) => "search".to_string(),
      };

      let right_w = right.chars().count();
      let title_max = if right.is_empty() { inner_w } else { inner_w.saturating_sub(right_w + 2) };
      let title = truncate_str(item.title(), title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);
      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let title = match app.results.group().and_then(|g| g.title.as_deref()) {
    Some(t) => format!(" {} ({}) ", t, app.results.len()),
    None => format!(" Results ({}) ", app.results.len()),
  };
  let title = if loading_more { format!("{}· loading more… ", title) } else { title };

  let list = List::new(items)
    .block(rounded(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_settings(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let width = area.width.min(56);
  let height = (Setting::ALL.len() as u16 + 4).min(area.height);
  let popup = Rect {
    x: area.x + (area.width.saturating_sub(width)) / 2,
    y: area.y + (area.height.saturating_sub(height)) / 2,
    width,
    height,
  };
  frame.render_widget(Clear, popup);

  let inner_w = width.saturating_sub(4) as usize;
  let mut lines = vec![Line::from("")];
  for (i, setting) in Setting::ALL.iter().enumerate() {
    let value = setting.value(&app.config);
    let gap = inner_w.saturating_sub(setting.label().chars().count() + value.chars().count());
    let style = if i == app.settings.selected {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.fg)
    };
    lines.push(Line::from(format!("{}{}{}", setting.label(), " ".repeat(gap), value)).style(style));
  }

  let block = rounded(theme)
    .title(" Settings ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .style(Style::default().bg(theme.bg))
    .padding(Padding::horizontal(1));
  frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else {
    match app.player.last_status() {
      Some(status) => (format!(" ▶ {}", status), Style::default().fg(theme.status)),
      None => (" Ready".to_string(), Style::default().fg(theme.muted)),
    }
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let has_results = !app.results.is_empty();
  let is_playing = app.player.is_playing();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Input => {
      let mut k = vec![("Enter", "Search")];
      if !app.tag_row.list.is_empty() {
        k.push(("Tab", "Suggestions"));
      }
      if is_playing {
        k.push(("^s", "Stop"));
      }
      k.push(("^p", "Settings"));
      if has_results {
        k.push(("↓", "Results"));
      } else {
        k.push(("Esc", "Quit"));
      }
      k
    }
    AppMode::Tags => vec![("←/→", "Choose"), ("Enter", "Search"), ("Esc", "Back")],
    AppMode::Results => {
      let mut k = vec![("Enter", "Play"), ("j/k", "Navigate")];
      if is_playing {
        let pause_label = if app.player.paused { "Resume" } else { "Pause" };
        k.push(("Space", pause_label));
        k.push(("^s", "Stop"));
      }
      k.push(("^p", "Settings"));
      k.push(("Esc", "Back"));
      k
    }
    AppMode::Settings => vec![("j/k", "Navigate"), ("Enter", "Change"), ("Esc", "Close")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
