//! Read models returned by the query service.
//!
//! None of these are stored as-is; they are assembled from joins over the
//! message, position, static-data, port and map-view tables.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tile::MapView;

/// A position report joined with its parent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselPosition {
  pub mmsi:                u32,
  pub latitude:            f64,
  pub longitude:           f64,
  /// From the parent message, else from the vessel's last static data.
  pub vessel_imo:          Option<i64>,
  pub ais_message_id:      i64,
  pub timestamp:           DateTime<Utc>,
  pub navigational_status: String,
  pub rate_of_turn:        f64,
  pub speed_over_ground:   f64,
  pub course_over_ground:  f64,
  pub heading:             u16,
  /// Containing tiles at zoom 1, 2 and 3.
  pub map_view_ids:        [Option<i64>; 3],
}

/// A static-data report joined with its parent message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselStatic {
  pub ais_message_id:      i64,
  pub timestamp:           DateTime<Utc>,
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

/// Latest position, the static data it was reported under, and the
/// destination port when one was resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselInfo {
  pub position:         VesselPosition,
  pub vessel:           VesselStatic,
  pub destination_port: Option<Port>,
}

/// Extra filters on the static data joined by a vessel-info lookup. Unset
/// fields match anything; name and call sign compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VesselCriteria {
  pub imo:       Option<i64>,
  pub name:      Option<String>,
  pub call_sign: Option<String>,
}

// ─── Ports ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
  pub id:           i64,
  pub name:         String,
  pub country:      String,
  pub longitude:    f64,
  pub latitude:     f64,
  pub map_view_ids: [Option<i64>; 3],
}

/// Port reference data as seeded; tile ids are resolved by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPort {
  pub id:        i64,
  pub name:      String,
  pub country:   String,
  pub longitude: f64,
  pub latitude:  f64,
}

/// Result of looking up the zoom-3 tile around a named port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PortTileLookup {
  /// Exactly one port matched.
  Tile {
    port:      Port,
    tile:      MapView,
    /// Most recent position of every vessel currently inside `tile`.
    positions: Vec<VesselPosition>,
  },
  /// Several ports matched; the caller has to narrow the query.
  Ambiguous { ports: Vec<Port> },
}
