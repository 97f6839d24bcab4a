//! Runtime layer for TMS Training Insights.
//!
//! Owns the memoized, process-wide dataset snapshot: ingestion runs once,
//! readers share the immutable result, and refresh atomically replaces it.

pub mod store;

pub use store::SnapshotStore;
