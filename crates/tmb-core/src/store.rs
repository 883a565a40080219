//! The `TrafficStore` trait and the reports its write operations return.
//!
//! The trait is implemented by storage backends (e.g. `tmb-store-sqlite`).
//! Higher layers (the `tmb` binary) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  message::AisMessage,
  normalize::{Batch, MessageStamp, RecordRejection},
  retention::RetentionPolicy,
  tile::MapView,
  vessel::{
    NewPort, Port, PortTileLookup, VesselCriteria, VesselInfo, VesselPosition, VesselStatic,
  },
};

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Row counts produced by an ingestion call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertionReport {
  pub position_insertions: usize,
  pub static_insertions:   usize,
  pub message_insertions:  usize,
  /// Records dropped by the normalizer, carried through for the caller.
  pub rejected:            Vec<RecordRejection>,
}

impl InsertionReport {
  pub fn total(&self) -> usize {
    self.position_insertions + self.static_insertions + self.message_insertions
  }
}

/// Row counts produced by a retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
  pub messages:         usize,
  pub position_reports: usize,
  pub static_data:      usize,
  pub rejected:         Vec<RecordRejection>,
}

impl DeletionReport {
  pub fn total(&self) -> usize { self.messages + self.position_reports + self.static_data }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a vessel-traffic store backend.
///
/// Messages and their child rows are created only by ingestion and removed
/// only by the retention sweep; ports and map views are reference data.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait TrafficStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Ingestion ─────────────────────────────────────────────────────────

  /// Insert every accepted record: one `ais_messages` row with a
  /// store-assigned id, plus exactly one child row chosen by the message
  /// kind. Each record commits atomically on its own.
  fn insert_batch(
    &self,
    batch: Batch<AisMessage>,
  ) -> impl Future<Output = Result<InsertionReport, Self::Error>> + Send + '_;

  /// Insert only the child rows of each record under an existing parent
  /// message. No parent row is written and no id is consumed.
  fn insert_children(
    &self,
    parent_id: i64,
    batch: Batch<AisMessage>,
  ) -> impl Future<Output = Result<InsertionReport, Self::Error>> + Send + '_;

  // ── Retention ─────────────────────────────────────────────────────────

  /// Delete every message matching a stamp older than `policy.window` at
  /// `now`, together with its child rows.
  fn expire_older_than(
    &self,
    stamps: Batch<MessageStamp>,
    policy: RetentionPolicy,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<DeletionReport, Self::Error>> + Send + '_;

  /// Delete every message (with children) timestamped before `cutoff`.
  fn purge_before(
    &self,
    cutoff: DateTime<Utc>,
  ) -> impl Future<Output = Result<DeletionReport, Self::Error>> + Send + '_;

  // ── Position / vessel queries ─────────────────────────────────────────

  /// Latest position of every vessel. Ties on timestamp go to the higher
  /// message id.
  fn most_recent_positions(
    &self,
  ) -> impl Future<Output = Result<Vec<VesselPosition>, Self::Error>> + Send + '_;

  /// Latest position of one vessel, if any.
  fn position_by_mmsi(
    &self,
    mmsi: u32,
  ) -> impl Future<Output = Result<Option<VesselPosition>, Self::Error>> + Send + '_;

  /// Up to `limit` positions of one vessel, newest first.
  fn recent_positions(
    &self,
    mmsi: u32,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<VesselPosition>, Self::Error>> + Send + '_;

  fn last_five_positions(
    &self,
    mmsi: u32,
  ) -> impl Future<Output = Result<Vec<VesselPosition>, Self::Error>> + Send + '_ {
    self.recent_positions(mmsi, 5)
  }

  /// Latest static data reported by one vessel.
  fn static_data(
    &self,
    mmsi: u32,
  ) -> impl Future<Output = Result<Option<VesselStatic>, Self::Error>> + Send + '_;

  /// Latest position whose static data matches `criteria`, joined with that
  /// static data and its destination port. Fails with a not-found error when
  /// no such row exists.
  fn vessel_info(
    &self,
    mmsi: u32,
    criteria: VesselCriteria,
  ) -> impl Future<Output = Result<VesselInfo, Self::Error>> + Send + '_;

  /// Latest per-vessel positions lying in `tile_id` at any zoom level.
  fn positions_in_tile(
    &self,
    tile_id: i64,
  ) -> impl Future<Output = Result<Vec<VesselPosition>, Self::Error>> + Send + '_;

  /// Latest per-vessel positions sharing all three tile ids with the port.
  fn positions_headed_to_port(
    &self,
    port_id: i64,
  ) -> impl Future<Output = Result<Vec<VesselPosition>, Self::Error>> + Send + '_;

  // ── Ports ─────────────────────────────────────────────────────────────

  fn ports_by_name<'a>(
    &'a self,
    name: &'a str,
    country: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<Port>, Self::Error>> + Send + 'a;

  /// Zoom-3 tile around the named port with the positions inside it.
  fn positions_for_port_scale3<'a>(
    &'a self,
    name: &'a str,
    country: &'a str,
  ) -> impl Future<Output = Result<PortTileLookup, Self::Error>> + Send + 'a;

  // ── Tiles ─────────────────────────────────────────────────────────────

  fn map_view(
    &self,
    tile_id: i64,
  ) -> impl Future<Output = Result<Option<MapView>, Self::Error>> + Send + '_;

  /// The four tiles at `parent_zoom + 1` covering the parent's quadrants.
  fn child_tiles(
    &self,
    parent_id: i64,
    parent_zoom: u8,
  ) -> impl Future<Output = Result<[MapView; 4], Self::Error>> + Send + '_;

  // ── Reference data ────────────────────────────────────────────────────

  /// Seed map views. Parents must precede their children.
  fn load_map_views(
    &self,
    tiles: Vec<MapView>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Seed ports, resolving their tile ids from the stored map views.
  fn load_ports(
    &self,
    ports: Vec<NewPort>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
