//! Inbound AIS message model.
//!
//! A message is a tagged variant selected by its `MsgType` field. Field names
//! follow the wire format of the AIS feed (`Timestamp`, `MMSI`, `SoG`, ...);
//! defaults for optional telemetry are applied during deserialisation so the
//! rest of the system never sees a missing rate-of-turn or a textual IMO.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// IMO stored when a static-data record carries anything but an integer
/// (commonly the string `"Unknown"`).
pub const DEFAULT_IMO: i64 = 1;

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
  StaticData,
  PositionReport,
}

impl MessageKind {
  pub fn as_str(self) -> &'static str {
    match self {
      MessageKind::StaticData => "static_data",
      MessageKind::PositionReport => "position_report",
    }
  }
}

// ─── Envelope ────────────────────────────────────────────────────────────────

/// Fields every AIS message carries regardless of kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageHeader {
  #[serde(rename = "Timestamp")]
  pub timestamp: DateTime<Utc>,
  #[serde(rename = "MMSI")]
  pub mmsi:      u32,
  #[serde(rename = "Class")]
  pub class:     String,
}

/// A single decoded AIS message. The `MsgType` tag is authoritative: it
/// decides which child table receives a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "MsgType", rename_all = "snake_case")]
pub enum AisMessage {
  StaticData(StaticDataMessage),
  PositionReport(PositionReportMessage),
}

impl AisMessage {
  pub fn kind(&self) -> MessageKind {
    match self {
      AisMessage::StaticData(_) => MessageKind::StaticData,
      AisMessage::PositionReport(_) => MessageKind::PositionReport,
    }
  }

  pub fn header(&self) -> &MessageHeader {
    match self {
      AisMessage::StaticData(m) => &m.header,
      AisMessage::PositionReport(m) => &m.header,
    }
  }

  /// IMO recorded on the parent message row; only static data carries one.
  pub fn vessel_imo(&self) -> Option<i64> {
    match self {
      AisMessage::StaticData(m) => Some(m.imo),
      AisMessage::PositionReport(_) => None,
    }
  }
}

// ─── Static data ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticDataMessage {
  #[serde(flatten)]
  pub header:      MessageHeader,
  #[serde(
    rename = "IMO",
    default = "default_imo",
    deserialize_with = "imo_or_default"
  )]
  pub imo:         i64,
  #[serde(rename = "Name")]
  pub name:        String,
  #[serde(rename = "VesselType")]
  pub vessel_type: String,
  #[serde(rename = "Length")]
  pub length:      f64,
  #[serde(rename = "Breadth")]
  pub breadth:     f64,
  #[serde(rename = "CallSign", default, skip_serializing_if = "Option::is_none")]
  pub call_sign:   Option<String>,
  /// Free-text destination as broadcast; matched against port names.
  #[serde(rename = "Destination", default, skip_serializing_if = "Option::is_none")]
  pub destination: Option<String>,
}

// ─── Position report ─────────────────────────────────────────────────────────

/// GeoJSON point. Coordinates are in `[longitude, latitude]` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
  pub coordinates: [f64; 2],
}

impl GeoPoint {
  pub fn longitude(&self) -> f64 { self.coordinates[0] }

  pub fn latitude(&self) -> f64 { self.coordinates[1] }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionReportMessage {
  #[serde(flatten)]
  pub header:             MessageHeader,
  #[serde(rename = "Status")]
  pub status:             String,
  #[serde(rename = "Position")]
  pub position:           GeoPoint,
  /// Degrees per minute; `0.0` when the feed omits it.
  #[serde(rename = "RoT", default, deserialize_with = "null_as_zero")]
  pub rate_of_turn:       f64,
  #[serde(rename = "SoG")]
  pub speed_over_ground:  f64,
  #[serde(rename = "CoG")]
  pub course_over_ground: f64,
  #[serde(rename = "Heading")]
  pub heading:            u16,
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

fn default_imo() -> i64 { DEFAULT_IMO }

fn imo_or_default<'de, D>(de: D) -> Result<i64, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = serde_json::Value::deserialize(de)?;
  Ok(raw.as_i64().unwrap_or(DEFAULT_IMO))
}

fn null_as_zero<'de, D>(de: D) -> Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(Option::<f64>::deserialize(de)?.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn static_data_with_text_imo_uses_default() {
    let msg: AisMessage = serde_json::from_value(json!({
      "Timestamp": "2020-11-19T00:00:00.000Z",
      "Class": "AtoN",
      "MMSI": 992111840,
      "MsgType": "static_data",
      "IMO": "Unknown",
      "Name": "WIND FARM BALTIC1NW",
      "VesselType": "Undefined",
      "Length": 60,
      "Breadth": 60,
      "A": 30
    }))
    .unwrap();

    assert_eq!(msg.kind(), MessageKind::StaticData);
    assert_eq!(msg.vessel_imo(), Some(DEFAULT_IMO));
    let AisMessage::StaticData(s) = msg else { panic!("wrong variant") };
    assert_eq!(s.length, 60.0);
    assert!(s.call_sign.is_none());
  }

  #[test]
  fn static_data_with_integer_imo_is_kept() {
    let msg: AisMessage = serde_json::from_value(json!({
      "Timestamp": "2020-11-19T00:00:00.000Z",
      "Class": "Class A",
      "MMSI": 219005465,
      "MsgType": "static_data",
      "IMO": 9074729,
      "Name": "SKANDI",
      "VesselType": "Cargo",
      "Length": 120.5,
      "Breadth": 18,
      "CallSign": "OZAB2"
    }))
    .unwrap();

    assert_eq!(msg.vessel_imo(), Some(9074729));
  }

  #[test]
  fn position_report_defaults_rate_of_turn() {
    let msg: AisMessage = serde_json::from_value(json!({
      "Timestamp": "2020-11-18T00:00:00.000Z",
      "Class": "Class A",
      "MMSI": 304858000,
      "MsgType": "position_report",
      "Position": { "type": "Point", "coordinates": [13.371672, 55.218332] },
      "Status": "Under way using engine",
      "SoG": 10.8,
      "CoG": 94.3,
      "Heading": 97
    }))
    .unwrap();

    let AisMessage::PositionReport(p) = msg else { panic!("wrong variant") };
    assert_eq!(p.rate_of_turn, 0.0);
    assert_eq!(p.position.longitude(), 13.371672);
    assert_eq!(p.position.latitude(), 55.218332);
    assert_eq!(p.header.mmsi, 304858000);
  }

  #[test]
  fn unknown_message_type_is_rejected() {
    let err = serde_json::from_value::<AisMessage>(json!({
      "Timestamp": "2020-11-18T00:00:00.000Z",
      "Class": "Class A",
      "MMSI": 1,
      "MsgType": "safety_broadcast"
    }));
    assert!(err.is_err());
  }
}
