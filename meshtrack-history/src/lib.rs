//! # meshtrack-history
//!
//! Per-peer location history store. Append-only, ordered by timestamp,
//! bounded by sample count and age, safe for concurrent use across peers.
//!
//! Out-of-order samples are rejected, never reordered.

pub mod store;

pub use store::HistoryStore;
