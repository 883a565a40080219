//! SQLite backend for the TMB vessel-traffic store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The same crate hosts the tile catalog,
//! which pairs the store's tile pyramid with a raster blob store.

mod catalog;
mod encode;
mod raster;
mod schema;
mod store;

pub mod error;

pub use catalog::TileCatalog;
pub use error::{Error, Result};
pub use raster::DirRasterStore;
pub use store::{SqliteStore, StoreStats};
