//! Ingestion and query layer for TMS Training Insights.
//!
//! Responsible for enumerating batch sources, extracting and normalizing
//! the nested session documents into flat tables, joining them into the
//! denormalized record view, and serving filtering, aggregation and export
//! over that view.

pub mod aggregate;
pub mod analysis;
pub mod export;
pub mod extract;
pub mod filter;
pub mod join;
pub mod schema;
pub mod sources;

pub use insight_core as core;
