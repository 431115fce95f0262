use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Persisted user preferences (`prefs.toml` in the platform config dir).
#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
  pub theme_name: Option<String>,
}

fn prefs_path() -> Option<PathBuf> {
  ProjectDirs::from("", "", "trendboard").map(|dirs| dirs.config_dir().join("prefs.toml"))
}

impl Config {
  pub fn load() -> Self {
    prefs_path().map(|path| Self::load_from(&path)).unwrap_or_default()
  }

  pub fn save(&self) {
    if let Some(path) = prefs_path() {
      self.save_to(&path);
    }
  }

  fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  fn save_to(&self, path: &Path) {
    if let Some(dir) = path.parent()
      && let Err(e) = std::fs::create_dir_all(dir)
    {
      warn!(err = %e, dir = %dir.display(), "config: cannot create config dir");
      return;
    }
    match toml::to_string(self) {
      Ok(content) => {
        if let Err(e) = std::fs::write(path, content) {
          warn!(err = %e, path = %path.display(), "config: cannot write preferences");
        }
      }
      Err(e) => warn!(err = %e, "config: cannot serialize preferences"),
    }
  }
}
