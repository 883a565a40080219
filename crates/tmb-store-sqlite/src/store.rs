//! [`SqliteStore`], the SQLite implementation of [`TrafficStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, ToSql};
use serde::Serialize;
use tmb_core::{
  message::{AisMessage, MessageKind, PositionReportMessage, StaticDataMessage},
  normalize::{Batch, MessageStamp, parse_batch, parse_stamps},
  retention::RetentionPolicy,
  store::{DeletionReport, InsertionReport, TrafficStore},
  tile::{MAX_SCALE, MapView},
  vessel::{
    NewPort, Port, PortTileLookup, VesselCriteria, VesselInfo, VesselPosition, VesselStatic,
  },
};

use crate::{
  Error, Result,
  encode::{
    MAP_VIEW_COLUMNS, PORT_COLUMNS, POSITION_COLUMNS, POSITION_JOINS, RawPosition, RawStatic,
    STATIC_COLUMNS, encode_dt, into_positions, map_view_from_row, port_from_row, raw_position,
    raw_static,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Row counts per table, plus child rows whose parent message is missing
/// (always zero while foreign keys are enforced).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StoreStats {
  pub messages:         usize,
  pub position_reports: usize,
  pub static_data:      usize,
  pub ports:            usize,
  pub map_views:        usize,
  pub orphaned_rows:    usize,
}

/// A vessel-traffic store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. Every call
/// runs on the connection's own thread, so statements never interleave.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Normalize a raw JSON payload and ingest it.
  pub async fn ingest_json(&self, payload: Option<&str>) -> Result<InsertionReport> {
    let batch = parse_batch(payload)?;
    self.insert_batch(batch).await
  }

  /// Normalize a raw JSON payload and expire its stale messages.
  pub async fn expire_json(
    &self,
    payload: Option<&str>,
    policy: RetentionPolicy,
    now: DateTime<Utc>,
  ) -> Result<DeletionReport> {
    let stamps = parse_stamps(payload)?;
    self.expire_older_than(stamps, policy, now).await
  }

  pub async fn stats(&self) -> Result<StoreStats> {
    let stats = self
      .conn
      .call(|conn| {
        let count = |sql: &str| -> rusqlite::Result<usize> {
          conn.query_row(sql, [], |r| r.get::<_, i64>(0)).map(|n| n as usize)
        };
        Ok(StoreStats {
          messages:         count("SELECT COUNT(*) FROM ais_messages")?,
          position_reports: count("SELECT COUNT(*) FROM position_reports")?,
          static_data:      count("SELECT COUNT(*) FROM static_data")?,
          ports:            count("SELECT COUNT(*) FROM ports")?,
          map_views:        count("SELECT COUNT(*) FROM map_views")?,
          orphaned_rows:    count(
            "SELECT
               (SELECT COUNT(*) FROM position_reports p
                LEFT JOIN ais_messages m ON m.id = p.ais_message_id WHERE m.id IS NULL)
             + (SELECT COUNT(*) FROM static_data s
                LEFT JOIN ais_messages m ON m.id = s.ais_message_id WHERE m.id IS NULL)",
          )?,
        })
      })
      .await?;
    Ok(stats)
  }
}

// ─── Write helpers ───────────────────────────────────────────────────────────
//
// These run inside `Connection::call` on a transaction; the caller commits.

/// Insert the parent message row and return its store-assigned id.
fn insert_message_row(conn: &rusqlite::Connection, msg: &AisMessage) -> rusqlite::Result<i64> {
  let header = msg.header();
  conn.execute(
    "INSERT INTO ais_messages (timestamp, mmsi, class, vessel_imo) VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![encode_dt(header.timestamp), header.mmsi, header.class, msg.vessel_imo()],
  )?;
  Ok(conn.last_insert_rowid())
}

/// Insert the single child row the message kind calls for.
fn insert_child_row(
  conn: &rusqlite::Connection,
  message_id: i64,
  msg: &AisMessage,
) -> rusqlite::Result<usize> {
  match msg {
    AisMessage::StaticData(s) => insert_static(conn, message_id, s),
    AisMessage::PositionReport(p) => insert_position(conn, message_id, p),
  }
}

fn insert_static(
  conn: &rusqlite::Connection,
  message_id: i64,
  s: &StaticDataMessage,
) -> rusqlite::Result<usize> {
  let destination_port_id: Option<i64> =
    match s.destination.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
      Some(dest) => conn
        .query_row(
          "SELECT id FROM ports WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
          rusqlite::params![dest],
          |r| r.get(0),
        )
        .optional()?,
      None => None,
    };

  conn.execute(
    "INSERT INTO static_data (
       ais_message_id, vessel_imo, name, vessel_type, length, breadth,
       call_sign, destination, destination_port_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    rusqlite::params![
      message_id,
      s.imo,
      s.name,
      s.vessel_type,
      s.length,
      s.breadth,
      s.call_sign,
      s.destination,
      destination_port_id,
    ],
  )
}

fn insert_position(
  conn: &rusqlite::Connection,
  message_id: i64,
  p: &PositionReportMessage,
) -> rusqlite::Result<usize> {
  let [view1, view2, view3] =
    tile_ids_for(conn, p.position.longitude(), p.position.latitude())?;

  // Static data reported after this position never describes it.
  let last_static_data_id: Option<i64> = conn
    .query_row(
      "SELECT s.id FROM static_data s
       JOIN ais_messages m ON m.id = s.ais_message_id
       WHERE m.mmsi = ?1 AND m.timestamp <= ?2
       ORDER BY m.timestamp DESC, m.id DESC
       LIMIT 1",
      rusqlite::params![p.header.mmsi, encode_dt(p.header.timestamp)],
      |r| r.get(0),
    )
    .optional()?;

  conn.execute(
    "INSERT INTO position_reports (
       ais_message_id, navigational_status, longitude, latitude, rate_of_turn,
       speed_over_ground, course_over_ground, heading,
       map_view1_id, map_view2_id, map_view3_id, last_static_data_id
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    rusqlite::params![
      message_id,
      p.status,
      p.position.longitude(),
      p.position.latitude(),
      p.rate_of_turn,
      p.speed_over_ground,
      p.course_over_ground,
      p.heading,
      view1,
      view2,
      view3,
      last_static_data_id,
    ],
  )
}

/// Ids of the tiles containing a point at zoom 1, 2 and 3; `None` outside
/// the pyramid.
fn tile_ids_for(
  conn: &rusqlite::Connection,
  longitude: f64,
  latitude: f64,
) -> rusqlite::Result<[Option<i64>; 3]> {
  let mut stmt = conn.prepare_cached(
    "SELECT id FROM map_views
     WHERE scale = ?1 AND west <= ?2 AND ?2 < east AND south <= ?3 AND ?3 < north
     ORDER BY id
     LIMIT 1",
  )?;
  let mut ids = [None; 3];
  for (slot, scale) in ids.iter_mut().zip(1..=MAX_SCALE) {
    *slot = stmt
      .query_row(rusqlite::params![scale, longitude, latitude], |r| r.get(0))
      .optional()?;
  }
  Ok(ids)
}

fn count_insert(report: &mut InsertionReport, kind: MessageKind, rows: usize) {
  match kind {
    MessageKind::StaticData => report.static_insertions += rows,
    MessageKind::PositionReport => report.position_insertions += rows,
  }
}

/// Delete the messages selected by `filter` and every child row pointing at
/// them. Children go first so foreign keys hold at every statement.
fn delete_messages_where(
  conn: &rusqlite::Connection,
  filter: &str,
  params: &[&dyn ToSql],
  report: &mut DeletionReport,
) -> rusqlite::Result<()> {
  report.position_reports += conn.execute(
    &format!(
      "DELETE FROM position_reports
       WHERE ais_message_id IN (SELECT id FROM ais_messages WHERE {filter})"
    ),
    params,
  )?;
  report.static_data += conn.execute(
    &format!(
      "DELETE FROM static_data
       WHERE ais_message_id IN (SELECT id FROM ais_messages WHERE {filter})"
    ),
    params,
  )?;
  report.messages += conn.execute(&format!("DELETE FROM ais_messages WHERE {filter}"), params)?;
  Ok(())
}

// ─── Read helpers ────────────────────────────────────────────────────────────

/// Latest position per MMSI, optionally narrowed by `filter` (an `AND ...`
/// clause over `p`, `m` and `s`). The filter applies after ranking: a vessel
/// whose latest position falls outside it is omitted rather than replaced by
/// an older matching position.
fn latest_positions(
  conn: &rusqlite::Connection,
  filter: &str,
  params: &[&dyn ToSql],
) -> rusqlite::Result<Vec<RawPosition>> {
  let sql = format!(
    "WITH latest AS (
       SELECT lp.id AS position_id,
              ROW_NUMBER() OVER (
                PARTITION BY lm.mmsi
                ORDER BY lm.timestamp DESC, lm.id DESC
              ) AS recency
       FROM position_reports lp
       JOIN ais_messages lm ON lm.id = lp.ais_message_id
     )
     SELECT {POSITION_COLUMNS}
     FROM latest l
     JOIN position_reports p ON p.id = l.position_id
     {POSITION_JOINS}
     WHERE l.recency = 1 {filter}
     ORDER BY m.mmsi"
  );
  let mut stmt = conn.prepare(&sql)?;
  let rows = stmt
    .query_map(params, raw_position)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn port_by_id(conn: &rusqlite::Connection, port_id: i64) -> rusqlite::Result<Option<Port>> {
  conn
    .query_row(
      &format!("SELECT {PORT_COLUMNS} FROM ports pt WHERE pt.id = ?1"),
      rusqlite::params![port_id],
      port_from_row,
    )
    .optional()
}

fn ports_matching(
  conn: &rusqlite::Connection,
  name: &str,
  country: Option<&str>,
) -> rusqlite::Result<Vec<Port>> {
  let mut stmt = conn.prepare(&format!(
    "SELECT {PORT_COLUMNS} FROM ports pt
     WHERE pt.name = ?1 COLLATE NOCASE
       AND (?2 IS NULL OR pt.country = ?2 COLLATE NOCASE)
     ORDER BY pt.id"
  ))?;
  let rows = stmt
    .query_map(rusqlite::params![name, country], port_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn map_view_by_id(conn: &rusqlite::Connection, tile_id: i64) -> rusqlite::Result<Option<MapView>> {
  conn
    .query_row(
      &format!("SELECT {MAP_VIEW_COLUMNS} FROM map_views v WHERE v.id = ?1"),
      rusqlite::params![tile_id],
      map_view_from_row,
    )
    .optional()
}

// ─── TrafficStore impl ───────────────────────────────────────────────────────

impl TrafficStore for SqliteStore {
  type Error = Error;

  // ── Ingestion ─────────────────────────────────────────────────────────────

  async fn insert_batch(&self, batch: Batch<AisMessage>) -> Result<InsertionReport> {
    let Batch { records, rejected } = batch;
    for r in &rejected {
      tracing::warn!(index = r.index, reason = %r.reason, "rejected AIS record");
    }

    let mut report = self
      .conn
      .call(move |conn| {
        let mut report = InsertionReport::default();
        for msg in &records {
          let tx = conn.transaction()?;
          let message_id = insert_message_row(&tx, msg)?;
          let child_rows = insert_child_row(&tx, message_id, msg)?;
          tx.commit()?;

          report.message_insertions += 1;
          count_insert(&mut report, msg.kind(), child_rows);
        }
        Ok(report)
      })
      .await?;

    report.rejected = rejected;
    tracing::debug!(
      messages = report.message_insertions,
      positions = report.position_insertions,
      statics = report.static_insertions,
      rejected = report.rejected.len(),
      "ingested AIS batch"
    );
    Ok(report)
  }

  async fn insert_children(
    &self,
    parent_id: i64,
    batch: Batch<AisMessage>,
  ) -> Result<InsertionReport> {
    let Batch { records, rejected } = batch;
    for r in &rejected {
      tracing::warn!(index = r.index, reason = %r.reason, "rejected AIS record");
    }

    let report: Option<InsertionReport> = self
      .conn
      .call(move |conn| {
        let parent_exists = conn
          .query_row(
            "SELECT 1 FROM ais_messages WHERE id = ?1",
            rusqlite::params![parent_id],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !parent_exists {
          return Ok(None);
        }

        let mut report = InsertionReport::default();
        for msg in &records {
          let tx = conn.transaction()?;
          let child_rows = insert_child_row(&tx, parent_id, msg)?;
          tx.commit()?;
          count_insert(&mut report, msg.kind(), child_rows);
        }
        Ok(Some(report))
      })
      .await?;

    let mut report = report.ok_or(Error::MessageNotFound(parent_id))?;
    report.rejected = rejected;
    Ok(report)
  }

  // ── Retention ─────────────────────────────────────────────────────────────

  async fn expire_older_than(
    &self,
    stamps: Batch<MessageStamp>,
    policy: RetentionPolicy,
    now: DateTime<Utc>,
  ) -> Result<DeletionReport> {
    let Batch { records, rejected } = stamps;
    let stale: Vec<(String, u32)> = records
      .iter()
      .filter(|s| policy.is_stale(s.timestamp, now))
      .map(|s| (encode_dt(s.timestamp), s.mmsi))
      .collect();

    let mut report = self
      .conn
      .call(move |conn| {
        let mut report = DeletionReport::default();
        for (timestamp, mmsi) in &stale {
          let tx = conn.transaction()?;
          delete_messages_where(
            &tx,
            "timestamp = ?1 AND mmsi = ?2",
            rusqlite::params![timestamp, mmsi],
            &mut report,
          )?;
          tx.commit()?;
        }
        Ok(report)
      })
      .await?;

    report.rejected = rejected;
    tracing::debug!(
      messages = report.messages,
      total = report.total(),
      "expired stale AIS messages"
    );
    Ok(report)
  }

  async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<DeletionReport> {
    let cutoff_str = encode_dt(cutoff);

    let report = self
      .conn
      .call(move |conn| {
        let mut report = DeletionReport::default();
        let tx = conn.transaction()?;
        delete_messages_where(&tx, "timestamp < ?1", rusqlite::params![cutoff_str], &mut report)?;
        tx.commit()?;
        Ok(report)
      })
      .await?;

    tracing::debug!(messages = report.messages, %cutoff, "purged AIS messages");
    Ok(report)
  }

  // ── Position / vessel queries ─────────────────────────────────────────────

  async fn most_recent_positions(&self) -> Result<Vec<VesselPosition>> {
    let raws = self
      .conn
      .call(|conn| Ok(latest_positions(conn, "", &[])?))
      .await?;
    into_positions(raws)
  }

  async fn position_by_mmsi(&self, mmsi: u32) -> Result<Option<VesselPosition>> {
    let raw: Option<RawPosition> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {POSITION_COLUMNS}
               FROM position_reports p {POSITION_JOINS}
               WHERE m.mmsi = ?1
               ORDER BY m.timestamp DESC, m.id DESC
               LIMIT 1"
            ),
            rusqlite::params![mmsi],
            raw_position,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPosition::into_position).transpose()
  }

  async fn recent_positions(&self, mmsi: u32, limit: usize) -> Result<Vec<VesselPosition>> {
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POSITION_COLUMNS}
           FROM position_reports p {POSITION_JOINS}
           WHERE m.mmsi = ?1
           ORDER BY m.timestamp DESC, m.id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![mmsi, limit_val], raw_position)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    into_positions(raws)
  }

  async fn static_data(&self, mmsi: u32) -> Result<Option<VesselStatic>> {
    let raw: Option<RawStatic> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {STATIC_COLUMNS}
               FROM static_data s
               JOIN ais_messages sm ON sm.id = s.ais_message_id
               WHERE sm.mmsi = ?1
               ORDER BY sm.timestamp DESC, sm.id DESC
               LIMIT 1"
            ),
            rusqlite::params![mmsi],
            raw_static,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStatic::into_static).transpose()
  }

  async fn vessel_info(&self, mmsi: u32, criteria: VesselCriteria) -> Result<VesselInfo> {
    let VesselCriteria { imo, name, call_sign } = criteria;

    let joined: Option<(RawPosition, RawStatic, Option<Port>)> = self
      .conn
      .call(move |conn| {
        let position = conn
          .query_row(
            &format!(
              "SELECT {POSITION_COLUMNS}
               FROM position_reports p {POSITION_JOINS}
               WHERE m.mmsi = ?1 AND p.last_static_data_id IS NOT NULL
                 AND (?2 IS NULL OR s.vessel_imo = ?2)
                 AND (?3 IS NULL OR s.name = ?3 COLLATE NOCASE)
                 AND (?4 IS NULL OR s.call_sign = ?4 COLLATE NOCASE)
               ORDER BY m.timestamp DESC, m.id DESC
               LIMIT 1"
            ),
            rusqlite::params![mmsi, imo, name, call_sign],
            raw_position,
          )
          .optional()?;
        let Some(position) = position else { return Ok(None) };

        let vessel = conn.query_row(
          &format!(
            "SELECT {STATIC_COLUMNS}
             FROM static_data s
             JOIN ais_messages sm ON sm.id = s.ais_message_id
             WHERE s.id = ?1"
          ),
          rusqlite::params![position.last_static_data_id],
          raw_static,
        )?;

        let port = match vessel.destination_port_id {
          Some(port_id) => port_by_id(conn, port_id)?,
          None => None,
        };

        Ok(Some((position, vessel, port)))
      })
      .await?;

    let (position, vessel, destination_port) = joined.ok_or(Error::VesselNotFound(mmsi))?;
    Ok(VesselInfo {
      position: position.into_position()?,
      vessel: vessel.into_static()?,
      destination_port,
    })
  }

  async fn positions_in_tile(&self, tile_id: i64) -> Result<Vec<VesselPosition>> {
    let raws: Option<Vec<RawPosition>> = self
      .conn
      .call(move |conn| {
        if map_view_by_id(conn, tile_id)?.is_none() {
          return Ok(None);
        }
        Ok(Some(latest_positions(
          conn,
          "AND ?1 IN (p.map_view1_id, p.map_view2_id, p.map_view3_id)",
          rusqlite::params![tile_id],
        )?))
      })
      .await?;

    into_positions(raws.ok_or(Error::TileNotFound(tile_id))?)
  }

  async fn positions_headed_to_port(&self, port_id: i64) -> Result<Vec<VesselPosition>> {
    let raws: Option<Vec<RawPosition>> = self
      .conn
      .call(move |conn| {
        let Some(port) = port_by_id(conn, port_id)? else { return Ok(None) };
        let [view1, view2, view3] = port.map_view_ids;
        Ok(Some(latest_positions(
          conn,
          "AND p.map_view1_id = ?1 AND p.map_view2_id = ?2 AND p.map_view3_id = ?3",
          rusqlite::params![view1, view2, view3],
        )?))
      })
      .await?;

    into_positions(raws.ok_or_else(|| Error::PortNotFound(port_id.to_string()))?)
  }

  // ── Ports ─────────────────────────────────────────────────────────────────

  async fn ports_by_name(&self, name: &str, country: Option<&str>) -> Result<Vec<Port>> {
    let name = name.to_owned();
    let country = country.map(str::to_owned);

    let ports = self
      .conn
      .call(move |conn| Ok(ports_matching(conn, &name, country.as_deref())?))
      .await?;
    Ok(ports)
  }

  async fn positions_for_port_scale3(&self, name: &str, country: &str) -> Result<PortTileLookup> {
    let mut ports = self.ports_by_name(name, Some(country)).await?;
    let port = match ports.len() {
      0 => return Err(Error::PortNotFound(format!("{name} ({country})"))),
      1 => ports.remove(0),
      _ => return Ok(PortTileLookup::Ambiguous { ports }),
    };

    let tile_id = port.map_view_ids[2].ok_or(Error::PortOutsideCoverage(port.id))?;
    let found: Option<(MapView, Vec<RawPosition>)> = self
      .conn
      .call(move |conn| {
        let Some(tile) = map_view_by_id(conn, tile_id)? else { return Ok(None) };
        let positions =
          latest_positions(conn, "AND p.map_view3_id = ?1", rusqlite::params![tile_id])?;
        Ok(Some((tile, positions)))
      })
      .await?;

    let (tile, raws) = found.ok_or(Error::TileNotFound(tile_id))?;
    Ok(PortTileLookup::Tile { port, tile, positions: into_positions(raws)? })
  }

  // ── Tiles ─────────────────────────────────────────────────────────────────

  async fn map_view(&self, tile_id: i64) -> Result<Option<MapView>> {
    let tile = self
      .conn
      .call(move |conn| Ok(map_view_by_id(conn, tile_id)?))
      .await?;
    Ok(tile)
  }

  async fn child_tiles(&self, parent_id: i64, parent_zoom: u8) -> Result<[MapView; 4]> {
    let children: Option<Vec<MapView>> = self
      .conn
      .call(move |conn| {
        let parent = conn
          .query_row(
            "SELECT 1 FROM map_views WHERE id = ?1 AND scale = ?2",
            rusqlite::params![parent_id, parent_zoom],
            |_| Ok(()),
          )
          .optional()?;
        if parent.is_none() {
          return Ok(None);
        }

        let mut stmt = conn.prepare(&format!(
          "SELECT {MAP_VIEW_COLUMNS} FROM map_views v
           WHERE v.parent_id = ?1 AND v.scale = ?2 + 1
           ORDER BY v.id"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![parent_id, parent_zoom], map_view_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Some(rows))
      })
      .await?;

    let children = children.ok_or(Error::TileNotFound(parent_id))?;
    children.try_into().map_err(|found: Vec<MapView>| Error::MalformedPyramid {
      parent_id,
      zoom: parent_zoom.saturating_add(1),
      found: found.len(),
    })
  }

  // ── Reference data ────────────────────────────────────────────────────────

  async fn load_map_views(&self, tiles: Vec<MapView>) -> Result<usize> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO map_views (
               id, name, scale, parent_id, west, south, east, north, raster_file
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO NOTHING",
          )?;
          for t in &tiles {
            inserted += stmt.execute(rusqlite::params![
              t.id,
              t.name,
              t.scale,
              t.parent_id,
              t.bounds.west,
              t.bounds.south,
              t.bounds.east,
              t.bounds.north,
              t.raster_file,
            ])?;
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    tracing::debug!(inserted, "loaded map views");
    Ok(inserted)
  }

  async fn load_ports(&self, ports: Vec<NewPort>) -> Result<usize> {
    let inserted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for port in &ports {
          let [view1, view2, view3] = tile_ids_for(&tx, port.longitude, port.latitude)?;
          inserted += tx.execute(
            "INSERT INTO ports (
               id, name, country, longitude, latitude,
               map_view1_id, map_view2_id, map_view3_id
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(id) DO NOTHING",
            rusqlite::params![
              port.id,
              port.name,
              port.country,
              port.longitude,
              port.latitude,
              view1,
              view2,
              view3,
            ],
          )?;
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await?;

    tracing::debug!(inserted, "loaded ports");
    Ok(inserted)
  }
}
