use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::quirks::DeviceProfile;

/// User preferences, stored as `prefs.toml` in the platform config dir.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
  pub suggestions: Option<bool>,
  pub device_vendor: Option<String>,
  pub device_model: Option<String>,
  /// Force the minimum decoder surface even on unaffected devices.
  pub force_surface_clamp: Option<bool>,
}

impl Config {
  pub fn path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "tvtube").map(|dirs| dirs.config_dir().join("prefs.toml"))
  }

  pub fn load() -> Self {
    Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
  }

  pub fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path) {
      match toml::from_str(&content) {
        Ok(config) => return config,
        Err(e) => warn!(path = %path.display(), err = %e, "config: ignoring malformed preferences"),
      }
    }
    Self::default()
  }

  pub fn save(&self) {
    if let Some(path) = Self::path() {
      self.save_to(&path);
    }
  }

  pub fn save_to(&self, path: &Path) {
    if let Err(e) = self.try_save_to(path) {
      warn!(path = %path.display(), err = %format!("{:#}", e), "config: failed to save preferences");
    }
  }

  pub(crate) fn try_save_to(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let content = toml::to_string(self).context("serializing preferences")?;
    std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
  }

  pub fn suggestions_enabled(&self) -> bool {
    self.suggestions.unwrap_or(true)
  }

  pub fn surface_clamp_forced(&self) -> bool {
    self.force_surface_clamp.unwrap_or(false)
  }

  pub fn device_profile(&self) -> DeviceProfile {
    DeviceProfile {
      vendor: self.device_vendor.clone().unwrap_or_default(),
      model: self.device_model.clone().unwrap_or_default(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("tvtube-test-{}-{}", std::process::id(), name)).join("prefs.toml")
  }

  #[test]
  fn save_then_load() {
    let path = temp_path("roundtrip");
    let config = Config {
      theme_name: Some("Ember".into()),
      suggestions: Some(false),
      device_vendor: Some("Amlogic".into()),
      device_model: None,
      force_surface_clamp: Some(true),
    };
    config.save_to(&path);
    assert_eq!(Config::load_from(&path), config);
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
  }

  #[test]
  fn missing_file_gives_defaults() {
    let config = Config::load_from(&temp_path("missing"));
    assert_eq!(config, Config::default());
    assert!(config.suggestions_enabled());
    assert!(!config.surface_clamp_forced());
  }

  #[test]
  fn malformed_file_gives_defaults() {
    let path = temp_path("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "theme_name = [").unwrap();
    assert_eq!(Config::load_from(&path), Config::default());
    let _ = std::fs::remove_dir_all(path.parent().unwrap());
  }

  #[test]
  fn save_reports_unwritable_directory() {
    let blocker = temp_path("blocked");
    std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
    std::fs::write(&blocker, "").unwrap();
    // `prefs.toml` is a file, so it cannot be used as a directory.
    let path = blocker.join("prefs.toml");

    let err = Config::default().try_save_to(&path).unwrap_err();
    assert!(format!("{:#}", err).starts_with("creating "));
    Config::default().save_to(&path);
    assert!(!path.exists());
    let _ = std::fs::remove_dir_all(blocker.parent().unwrap());
  }

  #[test]
  fn device_profile_from_config() {
    let config = Config { device_vendor: Some("Amlogic".into()), ..Config::default() };
    let profile = config.device_profile();
    assert_eq!(profile.vendor, "Amlogic");
    assert_eq!(profile.model, "");
  }
}
