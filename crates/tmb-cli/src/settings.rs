//! Layered settings: built-in defaults, then `tmb.toml`, then `TMB_*`
//! environment variables (nested keys use `__`, e.g. `TMB_PYRAMID__COLS`).

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, ConfigBuilder, ConfigError, builder::DefaultState};
use serde::Deserialize;
use tmb_core::{
  retention::{DEFAULT_WINDOW_SECS, RetentionPolicy},
  tile::{Bounds, TilePyramid},
};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  pub store_path:     PathBuf,
  pub raster_dir:     PathBuf,
  /// Age in seconds past which a swept message is deleted.
  pub retention_secs: i64,
  pub pyramid:        PyramidSettings,
}

/// Flat shape of the tile pyramid as it appears in the config file.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PyramidSettings {
  pub west:   f64,
  pub south:  f64,
  pub east:   f64,
  pub north:  f64,
  pub cols:   u32,
  pub rows:   u32,
  pub levels: u8,
}

impl Settings {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    with_defaults()
      .context("invalid default settings")?
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("TMB")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise Settings")
  }

  pub fn retention(&self) -> RetentionPolicy { RetentionPolicy::from_secs(self.retention_secs) }

  pub fn pyramid(&self) -> TilePyramid {
    let p = &self.pyramid;
    TilePyramid {
      bounds: Bounds::new(p.west, p.south, p.east, p.north),
      cols:   p.cols,
      rows:   p.rows,
      levels: p.levels,
    }
  }
}

/// Danish straits, 2° root tiles, three zoom levels.
fn with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
  Config::builder()
    .set_default("store_path", "~/.local/share/tmb/tmb.db")?
    .set_default("raster_dir", "~/.local/share/tmb/tiles")?
    .set_default("retention_secs", DEFAULT_WINDOW_SECS)?
    .set_default("pyramid.west", 8.0)?
    .set_default("pyramid.south", 54.0)?
    .set_default("pyramid.east", 16.0)?
    .set_default("pyramid.north", 58.0)?
    .set_default("pyramid.cols", 4_i64)?
    .set_default("pyramid.rows", 2_i64)?
    .set_default("pyramid.levels", 3_i64)
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use config::{File, FileFormat};

  use super::*;

  fn from_toml(toml: &str) -> Settings {
    with_defaults()
      .unwrap()
      .add_source(File::from_str(toml, FileFormat::Toml))
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap()
  }

  #[test]
  fn defaults_fill_missing_keys() {
    let settings = from_toml(r#"store_path = "/var/lib/tmb/tmb.db""#);
    assert_eq!(settings.store_path, PathBuf::from("/var/lib/tmb/tmb.db"));
    assert_eq!(settings.retention_secs, 300);
    assert_eq!(settings.retention(), RetentionPolicy::default());

    let pyramid = settings.pyramid();
    assert_eq!((pyramid.cols, pyramid.rows, pyramid.levels), (4, 2, 3));
    assert_eq!(pyramid.tiles().unwrap().len(), 168);
  }

  #[test]
  fn file_overrides_nested_pyramid_keys() {
    let settings = from_toml(
      r#"
      retention_secs = 60

      [pyramid]
      cols   = 1
      rows   = 1
      levels = 2
      "#,
    );
    assert_eq!(settings.retention_secs, 60);
    assert_eq!(settings.pyramid().tiles().unwrap().len(), 5);
    assert_eq!(settings.pyramid.west, 8.0);
  }

  #[test]
  fn tilde_expands_against_home() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(expand_tilde(Path::new("~/tmb.db")), PathBuf::from(home).join("tmb.db"));
    assert_eq!(expand_tilde(Path::new("/tmp/tmb.db")), PathBuf::from("/tmp/tmb.db"));
  }
}
