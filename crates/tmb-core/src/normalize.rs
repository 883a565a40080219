//! Batch normalizer. Turns a raw JSON payload into typed messages.
//!
//! Whole-payload problems (absent, empty, not JSON, not an array) fail the
//! call with [`Error::InvalidInput`] before any store access. Problems with a
//! single element are reported as a [`RecordRejection`] and the rest of the
//! batch is kept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::{Error, Result, message::AisMessage};

// ─── Output types ────────────────────────────────────────────────────────────

/// One element of a payload that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRejection {
  /// Zero-based position of the element in the payload array.
  pub index:  usize,
  pub reason: String,
}

/// A decoded payload: accepted elements in payload order plus rejections.
#[derive(Debug, Clone, Default)]
pub struct Batch<T> {
  pub records:  Vec<T>,
  pub rejected: Vec<RecordRejection>,
}

impl<T> Batch<T> {
  pub fn len(&self) -> usize { self.records.len() }

  pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

/// The part of a message the retention sweeper needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageStamp {
  #[serde(rename = "Timestamp")]
  pub timestamp: DateTime<Utc>,
  #[serde(rename = "MMSI")]
  pub mmsi:      u32,
}

// ─── Payload parsing ─────────────────────────────────────────────────────────

/// Decode an ingestion payload into [`AisMessage`] records.
pub fn parse_batch(payload: Option<&str>) -> Result<Batch<AisMessage>> {
  decode_elements(payload)
}

/// Decode a payload keeping only `Timestamp` and `MMSI` of each element.
pub fn parse_stamps(payload: Option<&str>) -> Result<Batch<MessageStamp>> {
  decode_elements(payload)
}

fn decode_elements<T>(payload: Option<&str>) -> Result<Batch<T>>
where
  T: for<'de> Deserialize<'de>,
{
  let elements = payload_elements(payload)?;

  let mut batch = Batch { records: Vec::with_capacity(elements.len()), rejected: vec![] };
  for (index, element) in elements.iter().enumerate() {
    match serde_json::from_str::<T>(element.get()) {
      Ok(record) => batch.records.push(record),
      Err(e) => batch.rejected.push(RecordRejection { index, reason: e.to_string() }),
    }
  }
  Ok(batch)
}

/// Split the payload into undecoded array elements. Only the outer syntax is
/// checked here, so a value that fails to convert (an overflowing number, a
/// wrong type) rejects its own element and nothing else.
fn payload_elements(payload: Option<&str>) -> Result<Vec<Box<RawValue>>> {
  let raw = payload
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .ok_or_else(|| Error::InvalidInput("payload is empty".into()))?;

  let value: Box<RawValue> = serde_json::from_str(raw)
    .map_err(|e| Error::InvalidInput(format!("payload is not valid JSON: {e}")))?;

  if !value.get().starts_with('[') {
    return Err(Error::InvalidInput(format!(
      "payload must be a JSON array, got {}",
      json_type_name(value.get())
    )));
  }
  serde_json::from_str(value.get())
    .map_err(|e| Error::InvalidInput(format!("payload is not valid JSON: {e}")))
}

fn json_type_name(raw: &str) -> &'static str {
  match raw.as_bytes().first() {
    Some(b'{') => "object",
    Some(b'[') => "array",
    Some(b'"') => "string",
    Some(b't' | b'f') => "boolean",
    Some(b'n') => "null",
    _ => "number",
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ErrorKind, message::MessageKind};

  const SAMPLE: &str = r#"[
    {"Timestamp":"2020-11-18T00:00:00.000Z","Class":"Class A","MMSI":304858000,"MsgType":"position_report","Position":{"type":"Point","coordinates":[13.371672,55.218332]},"Status":"Under way using engine","SoG":10.8,"CoG":94.3,"Heading":97},
    {"Timestamp":"2020-11-19T00:00:00.000Z","Class":"AtoN","MMSI":992111840,"MsgType":"static_data","IMO":"Unknown","Name":"WIND FARM BALTIC1NW","VesselType":"Undefined","Length":60,"Breadth":60,"A":30,"B":30,"C":30,"D":30},
    {"Timestamp":"2020-11-20T00:00:00.000Z","Class":"Class A","MMSI":219005465,"MsgType":"position_report","Position":{"type":"Point","coordinates":[11.929218,54.572602]},"Status":"Under way using engine","RoT":12.5,"SoG":0,"CoG":298.7,"Heading":203}
  ]"#;

  #[test]
  fn empty_and_absent_payloads_are_invalid() {
    for payload in [None, Some(""), Some("   ")] {
      let err = parse_batch(payload).unwrap_err();
      assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
  }

  #[test]
  fn malformed_json_is_invalid() {
    let err = parse_batch(Some("{not json")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidInput);
  }

  #[test]
  fn non_array_json_is_invalid() {
    let err = parse_batch(Some(r#"{"MsgType":"static_data"}"#)).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("object")));
  }

  #[test]
  fn sample_batch_decodes_in_order() {
    let batch = parse_batch(Some(SAMPLE)).unwrap();
    assert!(batch.rejected.is_empty());
    let kinds: Vec<_> = batch.records.iter().map(AisMessage::kind).collect();
    assert_eq!(kinds, [
      MessageKind::PositionReport,
      MessageKind::StaticData,
      MessageKind::PositionReport,
    ]);

    let AisMessage::PositionReport(first) = &batch.records[0] else { panic!() };
    assert_eq!(first.rate_of_turn, 0.0);
    let AisMessage::PositionReport(last) = &batch.records[2] else { panic!() };
    assert_eq!(last.rate_of_turn, 12.5);
  }

  #[test]
  fn bad_record_is_rejected_without_failing_batch() {
    let payload = r#"[
      {"Timestamp":"2020-11-19T00:00:00.000Z","Class":"AtoN","MMSI":1,"MsgType":"static_data","IMO":1,"Name":"A","VesselType":"x","Length":"long","Breadth":2},
      {"Timestamp":"2020-11-19T00:00:00.000Z","Class":"AtoN","MMSI":2,"MsgType":"static_data","IMO":1,"Name":"B","VesselType":"x","Length":1,"Breadth":2}
    ]"#;
    let batch = parse_batch(Some(payload)).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].index, 0);
  }

  #[test]
  fn overflowing_number_rejects_only_its_record() {
    let payload = r#"[
      {"Timestamp":"2020-11-19T00:00:00.000Z","Class":"AtoN","MMSI":1,"MsgType":"static_data","IMO":1,"Name":"A","VesselType":"x","Length":1e400,"Breadth":2},
      {"Timestamp":"2020-11-19T00:00:00.000Z","Class":"AtoN","MMSI":2,"MsgType":"static_data","IMO":1,"Name":"B","VesselType":"x","Length":1,"Breadth":2}
    ]"#;
    let batch = parse_batch(Some(payload)).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.rejected.len(), 1);
    assert_eq!(batch.rejected[0].index, 0);
    assert!(batch.rejected[0].reason.contains("out of range"), "{}", batch.rejected[0].reason);
  }

  #[test]
  fn stamps_ignore_kind_specific_fields() {
    let stamps = parse_stamps(Some(SAMPLE)).unwrap();
    assert_eq!(stamps.len(), 3);
    assert_eq!(stamps.records[1].mmsi, 992111840);
  }

  #[test]
  fn integer_filters() {
    assert_eq!(parse_integer_filter("tile id", " 42 ").unwrap(), 42);
    assert_eq!(parse_mmsi("304858000").unwrap(), 304858000);
    assert_eq!(
      parse_integer_filter("tile id", "forty").unwrap_err().kind(),
      ErrorKind::InvalidInput
    );
    assert_eq!(parse_mmsi("-3").unwrap_err().kind(), ErrorKind::InvalidInput);
  }
}
