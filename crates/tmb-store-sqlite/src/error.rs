//! Error type for `tmb-store-sqlite`.

use thiserror::Error;
use tmb_core::ErrorKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] tmb_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("raster store error: {0}")]
  Raster(#[from] std::io::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// Child rows were addressed to a parent message that does not exist.
  #[error("ais message not found: {0}")]
  MessageNotFound(i64),

  #[error("map tile not found: {0}")]
  TileNotFound(i64),

  #[error("port not found: {0}")]
  PortNotFound(String),

  #[error("port {0} lies outside the tile pyramid")]
  PortOutsideCoverage(i64),

  /// No position of this vessel could be joined with static data.
  #[error("no vessel information for MMSI {0}")]
  VesselNotFound(u32),

  #[error("no raster stored for tile {tile_id} under {key:?}")]
  RasterMissing { tile_id: i64, key: String },

  #[error("tile {parent_id} has {found} children at zoom {zoom}, expected 4")]
  MalformedPyramid { parent_id: i64, zoom: u8, found: usize },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Error::Core(e) => e.kind(),
      Error::MessageNotFound(_)
      | Error::TileNotFound(_)
      | Error::PortNotFound(_)
      | Error::PortOutsideCoverage(_)
      | Error::VesselNotFound(_)
      | Error::RasterMissing { .. } => ErrorKind::NotFound,
      Error::Database(_)
      | Error::Raster(_)
      | Error::DateParse(_)
      | Error::MalformedPyramid { .. } => ErrorKind::DataAccess,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
