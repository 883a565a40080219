//! Core types and trait definitions for the TMB vessel-traffic store.
//!
//! This crate is deliberately free of database dependencies. It owns the
//! inbound AIS message model, the batch normalizer, the read models returned
//! by queries, the tile pyramid and the [`store::TrafficStore`] abstraction
//! that storage backends implement.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod message;
pub mod normalize;
pub mod retention;
pub mod store;
pub mod tile;
pub mod vessel;

pub use error::{Error, ErrorKind, Result};
