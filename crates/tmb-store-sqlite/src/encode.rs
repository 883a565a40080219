//! Encoding and decoding helpers between Rust domain types and the column
//! representations stored in SQLite.
//!
//! Timestamps are stored as RFC 3339 strings with millisecond precision and a
//! `Z` suffix, so lexical order equals chronological order and stamps from a
//! payload compare equal to stored values. Everything else maps onto native
//! SQLite integers and reals.

use chrono::{DateTime, SecondsFormat, Utc};
use tmb_core::{
  tile::{Bounds, MapView},
  vessel::{Port, VesselPosition, VesselStatic},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Millis, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Column lists ────────────────────────────────────────────────────────────

/// Joins that every position query needs: the parent message, and the static
/// data the position was reported under.
pub const POSITION_JOINS: &str = "
  JOIN ais_messages m     ON m.id = p.ais_message_id
  LEFT JOIN static_data s ON s.id = p.last_static_data_id";

/// Columns read by [`raw_position`]; requires [`POSITION_JOINS`].
pub const POSITION_COLUMNS: &str = "
  m.mmsi, p.latitude, p.longitude, COALESCE(m.vessel_imo, s.vessel_imo),
  m.id, m.timestamp, p.navigational_status, p.rate_of_turn,
  p.speed_over_ground, p.course_over_ground, p.heading,
  p.map_view1_id, p.map_view2_id, p.map_view3_id, p.last_static_data_id";

/// Columns read by [`raw_static`]; `s` joined with its message as `sm`.
pub const STATIC_COLUMNS: &str = "
  sm.id, sm.timestamp, sm.mmsi, s.vessel_imo, s.name, s.vessel_type,
  s.length, s.breadth, s.call_sign, s.destination, s.destination_port_id";

/// Columns read by [`port_from_row`]; ports aliased as `pt`.
pub const PORT_COLUMNS: &str = "
  pt.id, pt.name, pt.country, pt.longitude, pt.latitude,
  pt.map_view1_id, pt.map_view2_id, pt.map_view3_id";

/// Columns read by [`map_view_from_row`]; map views aliased as `v`.
pub const MAP_VIEW_COLUMNS: &str = "
  v.id, v.name, v.scale, v.parent_id, v.west, v.south, v.east, v.north,
  v.raster_file";

// ─── Row types ───────────────────────────────────────────────────────────────

/// A position row as read; the timestamp still needs decoding.
pub struct RawPosition {
  pub mmsi:                u32,
  pub latitude:            f64,
  pub longitude:           f64,
  pub vessel_imo:          Option<i64>,
  pub ais_message_id:      i64,
  pub timestamp:           String,
  pub navigational_status: String,
  pub rate_of_turn:        f64,
  pub speed_over_ground:   f64,
  pub course_over_ground:  f64,
  pub heading:             u16,
  pub map_view_ids:        [Option<i64>; 3],
  pub last_static_data_id: Option<i64>,
}

pub fn raw_position(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawPosition> {
  Ok(RawPosition {
    mmsi:                row.get(0)?,
    latitude:            row.get(1)?,
    longitude:           row.get(2)?,
    vessel_imo:          row.get(3)?,
    ais_message_id:      row.get(4)?,
    timestamp:           row.get(5)?,
    navigational_status: row.get(6)?,
    rate_of_turn:        row.get(7)?,
    speed_over_ground:   row.get(8)?,
    course_over_ground:  row.get(9)?,
    heading:             row.get(10)?,
    map_view_ids:        [row.get(11)?, row.get(12)?, row.get(13)?],
    last_static_data_id: row.get(14)?,
  })
}

impl RawPosition {
  pub fn into_position(self) -> Result<VesselPosition> {
    Ok(VesselPosition {
      mmsi:                self.mmsi,
      latitude:            self.latitude,
      longitude:           self.longitude,
      vessel_imo:          self.vessel_imo,
      ais_message_id:      self.ais_message_id,
      timestamp:           decode_dt(&self.timestamp)?,
      navigational_status: self.navigational_status,
      rate_of_turn:        self.rate_of_turn,
      speed_over_ground:   self.speed_over_ground,
      course_over_ground:  self.course_over_ground,
      heading:             self.heading,
      map_view_ids:        self.map_view_ids,
    })
  }
}

pub fn into_positions(raws: Vec<RawPosition>) -> Result<Vec<VesselPosition>> {
  raws.into_iter().map(RawPosition::into_position).collect()
}

/// A static-data row joined with its message.
pub struct RawStatic {
  pub ais_message_id:      i64,
  pub timestamp:           String,
  pub mmsi:                u32,
  pub imo:                 i64,
  pub name:                String,
  pub vessel_type:         String,
  pub length:              f64,
  pub breadth:             f64,
  pub call_sign:           Option<String>,
  pub destination:         Option<String>,
  pub destination_port_id: Option<i64>,
}

pub fn raw_static(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawStatic> {
  Ok(RawStatic {
    ais_message_id:      row.get(0)?,
    timestamp:           row.get(1)?,
    mmsi:                row.get(2)?,
    imo:                 row.get(3)?,
    name:                row.get(4)?,
    vessel_type:         row.get(5)?,
    length:              row.get(6)?,
    breadth:             row.get(7)?,
    call_sign:           row.get(8)?,
    destination:         row.get(9)?,
    destination_port_id: row.get(10)?,
  })
}

impl RawStatic {
  pub fn into_static(self) -> Result<VesselStatic> {
    Ok(VesselStatic {
      ais_message_id:      self.ais_message_id,
      timestamp:           decode_dt(&self.timestamp)?,
      mmsi:                self.mmsi,
      imo:                 self.imo,
      name:                self.name,
      vessel_type:         self.vessel_type,
      length:              self.length,
      breadth:             self.breadth,
      call_sign:           self.call_sign,
      destination:         self.destination,
      destination_port_id: self.destination_port_id,
    })
  }
}

// Ports and map views carry no encoded columns, so they map straight onto
// the domain types.

pub fn port_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Port> {
  Ok(Port {
    id:           row.get(0)?,
    name:         row.get(1)?,
    country:      row.get(2)?,
    longitude:    row.get(3)?,
    latitude:     row.get(4)?,
    map_view_ids: [row.get(5)?, row.get(6)?, row.get(7)?],
  })
}

pub fn map_view_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MapView> {
  Ok(MapView {
    id:          row.get(0)?,
    name:        row.get(1)?,
    scale:       row.get(2)?,
    parent_id:   row.get(3)?,
    bounds:      Bounds {
      west:  row.get(4)?,
      south: row.get(5)?,
      east:  row.get(6)?,
      north: row.get(7)?,
    },
    raster_file: row.get(8)?,
  })
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn timestamps_keep_millisecond_shape() {
    let dt = Utc.with_ymd_and_hms(2020, 11, 18, 0, 0, 0).unwrap();
    let encoded = encode_dt(dt);
    assert_eq!(encoded, "2020-11-18T00:00:00.000Z");
    assert_eq!(decode_dt(&encoded).unwrap(), dt);
  }

  #[test]
  fn encoded_timestamps_sort_chronologically() {
    let earlier = encode_dt(Utc.with_ymd_and_hms(2020, 11, 18, 9, 59, 59).unwrap());
    let later = encode_dt(Utc.with_ymd_and_hms(2020, 11, 18, 10, 0, 0).unwrap());
    assert!(earlier < later);
  }

  #[test]
  fn garbage_timestamp_is_a_parse_error() {
    assert!(matches!(decode_dt("yesterday"), Err(Error::DateParse(_))));
  }
}
