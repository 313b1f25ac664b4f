// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for Weft plugin lifecycle state.
//!
//! Holds the durable enable/disable record consulted by the native plugin
//! manager on restore. All access goes through [`Database`], which wraps a
//! single tokio-rusqlite connection with WAL mode and embedded migrations.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::PluginStateRecord;
