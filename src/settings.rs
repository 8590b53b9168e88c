//! Settings screen: a short list of preferences edited in place.

use crate::config::Config;
use crate::theme::{THEMES, theme_index};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
  Theme,
  Suggestions,
  SurfaceClamp,
}

impl Setting {
  pub const ALL: [Setting; 3] = [Setting::Theme, Setting::Suggestions, Setting::SurfaceClamp];

  pub fn label(self) -> &'static str {
    match self {
      Setting::Theme => "Theme",
      Setting::Suggestions => "Search suggestions",
      Setting::SurfaceClamp => "Force full-HD decoder surface",
    }
  }

  pub fn value(self, config: &Config) -> String {
    let on_off = |b: bool| if b { "on" } else { "off" }.to_string();
    match self {
      Setting::Theme => THEMES[theme_index(config.theme_name.as_deref())].name.to_string(),
      Setting::Suggestions => on_off(config.suggestions_enabled()),
      Setting::SurfaceClamp => on_off(config.surface_clamp_forced()),
    }
  }
}

#[derive(Debug, Default)]
pub struct SettingsScreen {
  pub selected: usize,
}

impl SettingsScreen {
  pub fn selected_setting(&self) -> Setting {
    Setting::ALL[self.selected % Setting::ALL.len()]
  }

  pub fn next(&mut self) {
    self.selected = (self.selected + 1) % Setting::ALL.len();
  }

  pub fn prev(&mut self) {
    self.selected = (self.selected + Setting::ALL.len() - 1) % Setting::ALL.len();
  }

  /// Toggle or cycle the selected entry. Returns which one changed.
  pub fn activate(&self, config: &mut Config) -> Setting {
    let setting = self.selected_setting();
    match setting {
      Setting::Theme => {
        let next = (theme_index(config.theme_name.as_deref()) + 1) % THEMES.len();
        config.theme_name = Some(THEMES[next].name.to_string());
      }
      Setting::Suggestions => config.suggestions = Some(!config.suggestions_enabled()),
      Setting::SurfaceClamp => config.force_surface_clamp = Some(!config.surface_clamp_forced()),
    }
    setting
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn navigation_wraps() {
    let mut screen = SettingsScreen::default();
    screen.prev();
    assert_eq!(screen.selected_setting(), Setting::SurfaceClamp);
    screen.next();
    assert_eq!(screen.selected_setting(), Setting::Theme);
  }

  #[test]
  fn activate_toggles_booleans() {
    let mut config = Config::default();
    let mut screen = SettingsScreen::default();
    screen.next();
    assert_eq!(screen.activate(&mut config), Setting::Suggestions);
    assert_eq!(config.suggestions, Some(false));
    assert_eq!(Setting::Suggestions.value(&config), "off");

    screen.next();
    screen.activate(&mut config);
    assert!(config.surface_clamp_forced());
  }

  #[test]
  fn activate_cycles_theme() {
    let mut config = Config::default();
    let screen = SettingsScreen::default();
    for _ in 0..THEMES.len() {
      screen.activate(&mut config);
    }
    assert_eq!(config.theme_name.as_deref(), Some(THEMES[0].name));
  }
}
