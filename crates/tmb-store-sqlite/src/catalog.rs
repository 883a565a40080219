//! [`TileCatalog`] pairs tile pyramid lookups with raster blobs.

use bytes::Bytes;
use tmb_core::{
  store::TrafficStore,
  tile::{MapView, RasterStore},
};

use crate::{Error, Result, SqliteStore};

/// Resolves tile ids against the store's pyramid and fetches their rasters
/// from `R`.
#[derive(Clone)]
pub struct TileCatalog<R> {
  store:   SqliteStore,
  rasters: R,
}

impl<R: RasterStore> TileCatalog<R> {
  pub fn new(store: SqliteStore, rasters: R) -> Self { Self { store, rasters } }

  /// The four tiles one zoom level below `parent_id`.
  pub async fn child_tiles(&self, parent_id: i64, parent_zoom: u8) -> Result<[MapView; 4]> {
    self.store.child_tiles(parent_id, parent_zoom).await
  }

  pub async fn tile(&self, tile_id: i64) -> Result<MapView> {
    self.store.map_view(tile_id).await?.ok_or(Error::TileNotFound(tile_id))
  }

  /// The raster image of a tile. Unknown tiles and tiles whose raster is
  /// absent or empty are both not-found.
  pub async fn tile_by_id(&self, tile_id: i64) -> Result<Bytes> {
    let tile = self.tile(tile_id).await?;
    match self.rasters.load(&tile.raster_file).await? {
      Some(blob) if !blob.is_empty() => Ok(blob),
      _ => Err(Error::RasterMissing { tile_id, key: tile.raster_file }),
    }
  }
}
