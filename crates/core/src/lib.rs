//! Core library for minenav
//!
//! This crate implements the **Functional Core** of minenav, following the
//! Functional Core - Imperative Shell pattern used across the project.
//!
//! # Architecture Overview
//!
//! - **`minenav_core`** (this crate): raw registry models and pure transformation functions
//! - **`minenav`**: HTTP adapters, persistence, the filter router and terminal output
//!
//! Three registries are supported: Modrinth, SpigotMC (through the Spiget API) and
//! Hangar. Each one answers with a different JSON shape, so every registry gets a
//! module with its raw types plus the functions that normalize them into the
//! shared [`model::PluginSummary`] / [`model::PluginDetail`] records.
//!
//! # Module Organization
//!
//! - [`platform`]: the registry enum and the "all platforms" filter
//! - [`config`]: static category, sort, loader, tag and link tables
//! - [`modrinth`], [`spiget`], [`hangar`]: raw API types and per-registry normalization
//! - [`model`]: the unified records and the tagged [`model::RawItem`]
//! - [`tags`]: loader/datapack/tag classification and Hangar special tags
//! - [`versions`]: version range formatting and latest-version resolution
//! - [`links`]: external link extraction
//! - [`metadata`]: card/detail metadata derived from detail and version responses
//! - [`query`]: unified search query to native request parameters
//! - [`merge`]: cross-platform merge and sort
//! - [`state`]: filter state, change sets and the query-string codec
//! - [`favorites`]: favorites list operations
//! - [`i18n`], [`format`]: localized labels and display helpers
//! - [`cache`]: the in-memory cache abstraction
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use minenav_core::modrinth::ModrinthHit;
//! use minenav_core::model::RawItem;
//!
//! let hit: ModrinthHit = serde_json::from_str(r#"{"project_id":"abc","title":"X"}"#)?;
//! let summary = RawItem::Modrinth(hit).normalize();
//! assert_eq!(summary.id, "abc");
//! ```

pub mod cache;
pub mod config;
mod de;
pub mod favorites;
pub mod format;
pub mod hangar;
pub mod i18n;
pub mod links;
pub mod merge;
pub mod metadata;
pub mod model;
pub mod modrinth;
pub mod platform;
pub mod query;
pub mod spiget;
pub mod state;
pub mod tags;
pub mod versions;
