use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub accent: Color,
  pub muted: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub const THEMES: [Theme; 3] = [
  Theme {
    name: "Living Room",
    bg: Color::Rgb(18, 18, 24),
    fg: Color::Rgb(226, 226, 232),
    accent: Color::Rgb(255, 64, 64),
    muted: Color::Rgb(128, 128, 144),
    border: Color::Rgb(60, 60, 76),
    highlight_fg: Color::Rgb(255, 255, 255),
    highlight_bg: Color::Rgb(48, 48, 64),
    stripe_bg: Color::Rgb(24, 24, 32),
    status: Color::Rgb(120, 200, 255),
    error: Color::Rgb(255, 110, 110),
    key_fg: Color::Rgb(18, 18, 24),
    key_bg: Color::Rgb(200, 200, 210),
  },
  Theme {
    name: "Ember",
    bg: Color::Rgb(28, 20, 16),
    fg: Color::Rgb(240, 224, 208),
    accent: Color::Rgb(255, 150, 60),
    muted: Color::Rgb(150, 128, 110),
    border: Color::Rgb(80, 60, 48),
    highlight_fg: Color::Rgb(255, 244, 232),
    highlight_bg: Color::Rgb(64, 44, 32),
    stripe_bg: Color::Rgb(34, 25, 20),
    status: Color::Rgb(255, 200, 120),
    error: Color::Rgb(255, 96, 80),
    key_fg: Color::Rgb(28, 20, 16),
    key_bg: Color::Rgb(220, 190, 160),
  },
  Theme {
    name: "Daylight",
    bg: Color::Rgb(244, 244, 240),
    fg: Color::Rgb(30, 30, 34),
    accent: Color::Rgb(200, 20, 30),
    muted: Color::Rgb(120, 120, 126),
    border: Color::Rgb(200, 200, 196),
    highlight_fg: Color::Rgb(0, 0, 0),
    highlight_bg: Color::Rgb(222, 222, 216),
    stripe_bg: Color::Rgb(236, 236, 232),
    status: Color::Rgb(30, 100, 180),
    error: Color::Rgb(190, 30, 30),
    key_fg: Color::Rgb(244, 244, 240),
    key_bg: Color::Rgb(60, 60, 66),
  },
];

pub fn theme_index(name: Option<&str>) -> usize {
  name.and_then(|n| THEMES.iter().position(|t| t.name == n)).unwrap_or(0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn theme_lookup() {
    assert_eq!(theme_index(Some("Ember")), 1);
    assert_eq!(theme_index(Some("nope")), 0);
    assert_eq!(theme_index(None), 0);
  }
}
