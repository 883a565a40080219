//! SQL schema for the TMB SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Reference data: the tile pyramid. Bounds are in degrees.
CREATE TABLE IF NOT EXISTS map_views (
    id          INTEGER PRIMARY KEY,
    name        TEXT    NOT NULL,
    scale       INTEGER NOT NULL CHECK (scale BETWEEN 1 AND 3),
    parent_id   INTEGER REFERENCES map_views(id),
    west        REAL    NOT NULL,
    south       REAL    NOT NULL,
    east        REAL    NOT NULL,
    north       REAL    NOT NULL,
    raster_file TEXT    NOT NULL,
    CHECK (west < east AND south < north)
);

CREATE TABLE IF NOT EXISTS ports (
    id           INTEGER PRIMARY KEY,
    name         TEXT NOT NULL,
    country      TEXT NOT NULL,
    longitude    REAL NOT NULL,
    latitude     REAL NOT NULL,
    map_view1_id INTEGER REFERENCES map_views(id),
    map_view2_id INTEGER REFERENCES map_views(id),
    map_view3_id INTEGER REFERENCES map_views(id)
);

-- AUTOINCREMENT: ids are never reused, even after the sweep deletes the
-- highest one.
CREATE TABLE IF NOT EXISTS ais_messages (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp  TEXT    NOT NULL,   -- RFC 3339, millisecond precision, UTC
    mmsi       INTEGER NOT NULL,
    class      TEXT    NOT NULL,
    vessel_imo INTEGER
);

CREATE TABLE IF NOT EXISTS static_data (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    ais_message_id      INTEGER NOT NULL REFERENCES ais_messages(id),
    vessel_imo          INTEGER NOT NULL,
    name                TEXT    NOT NULL,
    vessel_type         TEXT    NOT NULL,
    length              REAL    NOT NULL,
    breadth             REAL    NOT NULL,
    call_sign           TEXT,
    destination         TEXT,
    destination_port_id INTEGER REFERENCES ports(id)
);

CREATE TABLE IF NOT EXISTS position_reports (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    ais_message_id      INTEGER NOT NULL REFERENCES ais_messages(id),
    navigational_status TEXT    NOT NULL,
    longitude           REAL    NOT NULL,
    latitude            REAL    NOT NULL,
    rate_of_turn        REAL    NOT NULL DEFAULT 0,
    speed_over_ground   REAL    NOT NULL,
    course_over_ground  REAL    NOT NULL,
    heading             INTEGER NOT NULL,
    map_view1_id        INTEGER REFERENCES map_views(id),
    map_view2_id        INTEGER REFERENCES map_views(id),
    map_view3_id        INTEGER REFERENCES map_views(id),
    last_static_data_id INTEGER REFERENCES static_data(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS ais_messages_mmsi_idx      ON ais_messages(mmsi, timestamp);
CREATE INDEX IF NOT EXISTS ais_messages_timestamp_idx ON ais_messages(timestamp);
CREATE INDEX IF NOT EXISTS static_data_message_idx    ON static_data(ais_message_id);
CREATE INDEX IF NOT EXISTS position_message_idx       ON position_reports(ais_message_id);
CREATE INDEX IF NOT EXISTS map_views_parent_idx       ON map_views(parent_id);
CREATE INDEX IF NOT EXISTS ports_name_idx             ON ports(name, country);

PRAGMA user_version = 1;
";
