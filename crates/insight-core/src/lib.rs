//! Core domain model for TMS Training Insights.
//!
//! Defines the canonical record types produced by ingestion (sessions,
//! instructor/trainee links, joined rows), the canonical column projection
//! shared by search and export, date coercion, the error taxonomy and the
//! CLI settings.

pub mod dates;
pub mod error;
pub mod models;
pub mod settings;
