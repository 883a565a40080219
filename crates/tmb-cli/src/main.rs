//! `tmb`: command-line front end for the vessel-traffic store.
//!
//! Reads `tmb.toml` (or the path given with `--config`), opens the SQLite
//! store and runs one subcommand. Query results are printed as JSON.
//!
//! # Usage
//!
//! ```text
//! tmb seed-tiles
//! tmb seed-ports ports.json
//! tmb ingest feed.json
//! tmb sweep feed.json
//! tmb vessel 304858000 --call-sign SBKL
//! tmb port-tile Trelleborg Sweden
//! ```

mod settings;

use std::path::PathBuf;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use settings::{Settings, expand_tilde};
use tmb_core::{
  normalize::{parse_batch, parse_integer_filter, parse_mmsi},
  store::TrafficStore,
  vessel::{NewPort, VesselCriteria},
};
use tmb_store_sqlite::{DirRasterStore, SqliteStore, TileCatalog};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "AIS vessel-traffic store")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tmb.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

/// Ids and MMSIs are taken as text and validated before the store is touched.
#[derive(Subcommand)]
enum Command {
  /// Generate the configured tile pyramid and store it.
  SeedTiles,
  /// Load ports from a JSON array of `{id, name, country, longitude, latitude}`.
  SeedPorts { file: PathBuf },
  /// Ingest a JSON array of AIS messages.
  Ingest { file: PathBuf },
  /// Attach the messages' child rows to an existing message.
  InsertChildren {
    #[arg(long)]
    parent: String,
    file:   PathBuf,
  },
  /// Delete the messages of a payload that have outlived the retention window.
  Sweep {
    file: PathBuf,
    /// Evaluate staleness at this instant instead of now (RFC 3339).
    #[arg(long)]
    now:  Option<DateTime<Utc>>,
  },
  /// Delete every message older than the retention window.
  Purge {
    /// Explicit cutoff (RFC 3339) instead of now minus the window.
    #[arg(long)]
    before: Option<DateTime<Utc>>,
  },
  /// Latest position of every vessel.
  Recent,
  /// Latest position of one vessel.
  Position { mmsi: String },
  /// Newest positions of one vessel.
  History {
    mmsi:  String,
    #[arg(long, default_value_t = 5)]
    limit: usize,
  },
  /// Latest static data of one vessel.
  Static { mmsi: String },
  /// Latest position joined with static data and destination port.
  Vessel {
    mmsi:      String,
    /// Only accept static data reporting this IMO.
    #[arg(long)]
    imo:       Option<String>,
    #[arg(long)]
    name:      Option<String>,
    #[arg(long)]
    call_sign: Option<String>,
  },
  /// Latest positions inside a tile at any zoom.
  TilePositions { tile: String },
  /// Ports matching a name, optionally within one country.
  Ports {
    name:    String,
    #[arg(long)]
    country: Option<String>,
  },
  /// Zoom-3 tile around a port and the vessels inside it.
  PortTile { name: String, country: String },
  /// Latest positions sharing all tiles with a port.
  HeadedTo { port: String },
  /// The four tiles one zoom below a tile.
  Children { tile: String, zoom: String },
  /// Write a tile's raster image to a file.
  Tile {
    tile: String,
    #[arg(short, long)]
    out:  PathBuf,
  },
  /// Row counts per table.
  Stats,
}

// ─── Entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let settings = Settings::load(&cli.config)?;

  let store_path = expand_tilde(&settings.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  run(cli.command, &settings, store).await
}

async fn run(command: Command, settings: &Settings, store: SqliteStore) -> anyhow::Result<()> {
  match command {
    Command::SeedTiles => {
      let tiles = settings.pyramid().tiles()?;
      let total = tiles.len();
      let inserted = store.load_map_views(tiles).await?;
      tracing::info!(inserted, total, "seeded tile pyramid");
    }
    Command::SeedPorts { file } => {
      let raw = read_payload(&file)?;
      let ports: Vec<NewPort> =
        serde_json::from_str(&raw).with_context(|| format!("parsing ports from {file:?}"))?;
      let inserted = store.load_ports(ports).await?;
      tracing::info!(inserted, "seeded ports");
    }
    Command::Ingest { file } => {
      let raw = read_payload(&file)?;
      print_json(&store.ingest_json(Some(&raw)).await?)?;
    }
    Command::InsertChildren { parent, file } => {
      let parent_id = parse_integer_filter("parent message id", &parent)?;
      let raw = read_payload(&file)?;
      let batch = parse_batch(Some(&raw))?;
      print_json(&store.insert_children(parent_id, batch).await?)?;
    }
    Command::Sweep { file, now } => {
      let raw = read_payload(&file)?;
      let now = now.unwrap_or_else(Utc::now);
      print_json(&store.expire_json(Some(&raw), settings.retention(), now).await?)?;
    }
    Command::Purge { before } => {
      let cutoff = before.unwrap_or_else(|| settings.retention().cutoff(Utc::now()));
      print_json(&store.purge_before(cutoff).await?)?;
    }
    Command::Recent => print_json(&store.most_recent_positions().await?)?,
    Command::Position { mmsi } => print_json(&store.position_by_mmsi(parse_mmsi(&mmsi)?).await?)?,
    Command::History { mmsi, limit } => {
      print_json(&store.recent_positions(parse_mmsi(&mmsi)?, limit).await?)?
    }
    Command::Static { mmsi } => print_json(&store.static_data(parse_mmsi(&mmsi)?).await?)?,
    Command::Vessel { mmsi, imo, name, call_sign } => {
      let criteria = VesselCriteria {
        imo: imo.map(|raw| parse_integer_filter("IMO", &raw)).transpose()?,
        name,
        call_sign,
      };
      print_json(&store.vessel_info(parse_mmsi(&mmsi)?, criteria).await?)?
    }
    Command::TilePositions { tile } => {
      let tile_id = parse_integer_filter("tile id", &tile)?;
      print_json(&store.positions_in_tile(tile_id).await?)?
    }
    Command::Ports { name, country } => {
      print_json(&store.ports_by_name(&name, country.as_deref()).await?)?
    }
    Command::PortTile { name, country } => {
      print_json(&store.positions_for_port_scale3(&name, &country).await?)?
    }
    Command::HeadedTo { port } => {
      let port_id = parse_integer_filter("port id", &port)?;
      print_json(&store.positions_headed_to_port(port_id).await?)?
    }
    Command::Children { tile, zoom } => {
      let tile_id = parse_integer_filter("tile id", &tile)?;
      let zoom = u8::try_from(parse_integer_filter("zoom", &zoom)?)
        .with_context(|| format!("zoom out of range: {zoom}"))?;
      let catalog = TileCatalog::new(store, rasters(settings));
      print_json(&catalog.child_tiles(tile_id, zoom).await?)?
    }
    Command::Tile { tile, out } => {
      let tile_id = parse_integer_filter("tile id", &tile)?;
      let catalog = TileCatalog::new(store, rasters(settings));
      let blob = catalog.tile_by_id(tile_id).await?;
      tokio::fs::write(&out, &blob)
        .await
        .with_context(|| format!("failed to write {out:?}"))?;
      tracing::info!(tile_id, bytes = blob.len(), "wrote tile raster to {}", out.display());
    }
    Command::Stats => print_json(&store.stats().await?)?,
  }
  Ok(())
}

fn rasters(settings: &Settings) -> DirRasterStore {
  DirRasterStore::new(expand_tilde(&settings.raster_dir))
}

fn read_payload(path: &std::path::Path) -> anyhow::Result<String> {
  std::fs::read_to_string(path).with_context(|| format!("reading payload {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
