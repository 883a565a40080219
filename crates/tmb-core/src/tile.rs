//! Map tiles: the fixed tile pyramid and the raster blob contract.
//!
//! Tiles form a 4-ary tree. Zoom 1 is a grid of root tiles over the covered
//! area; every tile at zoom `z` is split into its four quadrants at `z + 1`.
//! The parent/child relation and each tile's bounds are persisted, so queries
//! never recompute the split from raw coordinates.

use std::{collections::HashMap, future::Future, io};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Geometry ────────────────────────────────────────────────────────────────

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
  pub west:  f64,
  pub south: f64,
  pub east:  f64,
  pub north: f64,
}

impl Bounds {
  pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
    Self { west, south, east, north }
  }

  /// Half-open on the east and north edges so adjacent tiles never both
  /// claim a point.
  pub fn contains_point(&self, longitude: f64, latitude: f64) -> bool {
    self.west <= longitude
      && longitude < self.east
      && self.south <= latitude
      && latitude < self.north
  }

  pub fn contains(&self, other: &Bounds) -> bool {
    self.west <= other.west
      && other.east <= self.east
      && self.south <= other.south
      && other.north <= self.north
  }

  pub fn center(&self) -> (f64, f64) {
    ((self.west + self.east) / 2.0, (self.south + self.north) / 2.0)
  }

  /// North-west, north-east, south-west, south-east.
  pub fn quadrants(&self) -> [Bounds; 4] {
    let (mid_lon, mid_lat) = self.center();
    [
      Bounds::new(self.west, mid_lat, mid_lon, self.north),
      Bounds::new(mid_lon, mid_lat, self.east, self.north),
      Bounds::new(self.west, self.south, mid_lon, mid_lat),
      Bounds::new(mid_lon, self.south, self.east, mid_lat),
    ]
  }
}

// ─── Tiles ───────────────────────────────────────────────────────────────────

/// A stored map tile (`map_views` row).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
  pub id:          i64,
  pub name:        String,
  /// Zoom level, starting at 1.
  pub scale:       u8,
  pub parent_id:   Option<i64>,
  pub bounds:      Bounds,
  /// Key of the raster image in the [`RasterStore`].
  pub raster_file: String,
}

/// Deepest zoom level persisted on position reports and ports.
pub const MAX_SCALE: u8 = 3;

/// Generator for a complete tile pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilePyramid {
  pub bounds: Bounds,
  /// Root grid columns at zoom 1.
  pub cols:   u32,
  /// Root grid rows at zoom 1.
  pub rows:   u32,
  pub levels: u8,
}

impl TilePyramid {
  /// Build every tile, level by level. Ids start at 1; zoom-1 ids run
  /// row-major from the north-west corner, and each deeper level lists the
  /// quadrants of its parents in parent order.
  pub fn tiles(&self) -> Result<Vec<MapView>> {
    self.validate()?;

    let cell_w = (self.bounds.east - self.bounds.west) / f64::from(self.cols);
    let cell_h = (self.bounds.north - self.bounds.south) / f64::from(self.rows);

    let mut next_id = 1_i64;
    let mut tiles = Vec::new();
    for row in 0..self.rows {
      for col in 0..self.cols {
        let north = self.bounds.north - cell_h * f64::from(row);
        let west = self.bounds.west + cell_w * f64::from(col);
        tiles.push(tile(next_id, 1, None, Bounds::new(west, north - cell_h, west + cell_w, north)));
        next_id += 1;
      }
    }

    let mut level_start = 0;
    for scale in 2..=self.levels {
      let level_end = tiles.len();
      for parent_idx in level_start..level_end {
        let (parent_id, quads) = (tiles[parent_idx].id, tiles[parent_idx].bounds.quadrants());
        for quad in quads {
          tiles.push(tile(next_id, scale, Some(parent_id), quad));
          next_id += 1;
        }
      }
      level_start = level_end;
    }

    Ok(tiles)
  }

  fn validate(&self) -> Result<()> {
    let b = &self.bounds;
    if self.cols == 0 || self.rows == 0 {
      return Err(Error::InvalidInput("tile grid needs at least one row and column".into()));
    }
    if self.levels == 0 || self.levels > MAX_SCALE {
      return Err(Error::InvalidInput(format!(
        "tile pyramid levels must be within 1..={MAX_SCALE}, got {}",
        self.levels
      )));
    }
    if !(b.west < b.east && b.south < b.north) {
      return Err(Error::InvalidInput(format!("degenerate tile bounds: {b:?}")));
    }
    Ok(())
  }
}

fn tile(id: i64, scale: u8, parent_id: Option<i64>, bounds: Bounds) -> MapView {
  MapView {
    id,
    name: format!("z{scale}-{id}"),
    scale,
    parent_id,
    bounds,
    raster_file: format!("{id}.png"),
  }
}

// ─── Raster blobs ────────────────────────────────────────────────────────────

/// Opaque blob storage for tile rasters, keyed by [`MapView::raster_file`].
pub trait RasterStore: Send + Sync {
  /// `Ok(None)` when no blob exists under `key`.
  fn load<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = io::Result<Option<Bytes>>> + Send + 'a;
}

/// In-process raster store; mostly for tests and fixtures.
#[derive(Debug, Clone, Default)]
pub struct MemoryRasterStore {
  blobs: HashMap<String, Bytes>,
}

impl MemoryRasterStore {
  pub fn insert(&mut self, key: impl Into<String>, blob: impl Into<Bytes>) {
    self.blobs.insert(key.into(), blob.into());
  }
}

impl RasterStore for MemoryRasterStore {
  async fn load(&self, key: &str) -> io::Result<Option<Bytes>> {
    Ok(self.blobs.get(key).cloned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pyramid() -> TilePyramid {
    TilePyramid {
      bounds: Bounds::new(8.0, 54.0, 16.0, 58.0),
      cols:   4,
      rows:   2,
      levels: 3,
    }
  }

  #[test]
  fn pyramid_sizes_per_level() {
    let tiles = pyramid().tiles().unwrap();
    let count = |s: u8| tiles.iter().filter(|t| t.scale == s).count();
    assert_eq!(count(1), 8);
    assert_eq!(count(2), 32);
    assert_eq!(count(3), 128);
    assert_eq!(tiles.first().map(|t| t.id), Some(1));
    assert_eq!(tiles.last().map(|t| t.id), Some(168));
  }

  #[test]
  fn children_are_contained_in_parent() {
    let tiles = pyramid().tiles().unwrap();
    for child in tiles.iter().filter(|t| t.scale > 1) {
      let parent = tiles
        .iter()
        .find(|t| Some(t.id) == child.parent_id)
        .expect("parent exists");
      assert_eq!(parent.scale + 1, child.scale);
      assert!(parent.bounds.contains(&child.bounds));
    }
  }

  #[test]
  fn every_tile_has_four_children_above_the_last_level() {
    let tiles = pyramid().tiles().unwrap();
    for parent in tiles.iter().filter(|t| t.scale < 3) {
      let n = tiles.iter().filter(|t| t.parent_id == Some(parent.id)).count();
      assert_eq!(n, 4, "tile {} has {n} children", parent.id);
    }
  }

  #[test]
  fn quadrants_partition_points() {
    let b = Bounds::new(0.0, 0.0, 2.0, 2.0);
    for (lon, lat) in [(0.5, 0.5), (1.5, 0.5), (0.5, 1.5), (1.5, 1.5), (1.0, 1.0)] {
      let hits = b.quadrants().iter().filter(|q| q.contains_point(lon, lat)).count();
      assert_eq!(hits, 1, "({lon}, {lat})");
    }
  }

  #[test]
  fn invalid_pyramids_are_rejected() {
    let mut p = pyramid();
    p.levels = 4;
    assert!(p.tiles().is_err());

    let mut p = pyramid();
    p.cols = 0;
    assert!(p.tiles().is_err());

    let mut p = pyramid();
    p.bounds = Bounds::new(1.0, 1.0, 1.0, 2.0);
    assert!(p.tiles().is_err());
  }

  #[tokio::test]
  async fn memory_raster_store_roundtrip() {
    let mut store = MemoryRasterStore::default();
    store.insert("1.png", vec![0x89, b'P', b'N', b'G']);
    assert_eq!(store.load("1.png").await.unwrap().unwrap().len(), 4);
    assert!(store.load("2.png").await.unwrap().is_none());
  }
}
