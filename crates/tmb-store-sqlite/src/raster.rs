//! [`DirRasterStore`] keeps tile rasters as files under one directory.

use std::{
  io,
  path::{Component, Path, PathBuf},
};

use bytes::Bytes;
use tmb_core::tile::RasterStore;

/// Reads `<root>/<key>` for each raster key.
#[derive(Debug, Clone)]
pub struct DirRasterStore {
  root: PathBuf,
}

impl DirRasterStore {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  /// Keys are plain relative paths; anything that could climb out of the
  /// root resolves to no file at all.
  fn path_for(&self, key: &str) -> Option<PathBuf> {
    let rel = Path::new(key);
    let plain = rel.components().all(|c| matches!(c, Component::Normal(_)));
    (plain && !key.is_empty()).then(|| self.root.join(rel))
  }
}

impl RasterStore for DirRasterStore {
  async fn load(&self, key: &str) -> io::Result<Option<Bytes>> {
    let Some(path) = self.path_for(key) else { return Ok(None) };
    match tokio::fs::read(&path).await {
      Ok(data) => Ok(Some(Bytes::from(data))),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(e),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keys_cannot_escape_the_root() {
    let store = DirRasterStore::new("/srv/tiles");
    assert_eq!(store.path_for("7.png"), Some(PathBuf::from("/srv/tiles/7.png")));
    assert_eq!(store.path_for("z2/7.png"), Some(PathBuf::from("/srv/tiles/z2/7.png")));
    assert_eq!(store.path_for("../etc/passwd"), None);
    assert_eq!(store.path_for("/etc/passwd"), None);
    assert_eq!(store.path_for(""), None);
  }

  #[tokio::test]
  async fn missing_file_is_none() {
    let store = DirRasterStore::new(std::env::temp_dir().join("tmb-no-such-raster-dir"));
    assert!(store.load("1.png").await.unwrap().is_none());
  }
}
