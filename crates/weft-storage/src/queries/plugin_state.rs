// SPDX-FileCopyrightText: 2026 Weft Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin enable/disable state persistence.
//!
//! Upserted on every state change; each timestamp column is only advanced
//! by a change in its own direction, so `enabled_at` survives a later
//! disable and vice versa.

use chrono::Utc;
use rusqlite::{params, OptionalExtension};

use weft_core::WeftError;

use crate::database::{map_tr_err, Database};
use crate::models::PluginStateRecord;

/// Record a plugin's current enabled state and version.
pub async fn upsert_state(
    db: &Database,
    name: &str,
    enabled: bool,
    version: &str,
) -> Result<(), WeftError> {
    let name = name.to_string();
    let version = version.to_string();
    let now = Utc::now().to_rfc3339();
    let (enabled_at, disabled_at) = if enabled {
        (Some(now), None)
    } else {
        (None, Some(now))
    };

    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO plugin_state (name, enabled, version, enabled_at, disabled_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(name) DO UPDATE SET
                     enabled = excluded.enabled,
                     version = excluded.version,
                     enabled_at = COALESCE(excluded.enabled_at, plugin_state.enabled_at),
                     disabled_at = COALESCE(excluded.disabled_at, plugin_state.disabled_at)",
                params![name, enabled, version, enabled_at, disabled_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one plugin's persisted state.
pub async fn get_state(db: &Database, name: &str) -> Result<Option<PluginStateRecord>, WeftError> {
    let name = name.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT name, enabled, version, enabled_at, disabled_at
                 FROM plugin_state WHERE name = ?1",
            )?;
            let record = stmt
                .query_row(params![name], |row| {
                    Ok(PluginStateRecord {
                        name: row.get(0)?,
                        enabled: row.get(1)?,
                        version: row.get(2)?,
                        enabled_at: row.get(3)?,
                        disabled_at: row.get(4)?,
                    })
                })
                .optional()?;
            Ok(record)
        })
        .await
        .map_err(map_tr_err)
}

/// Names of every plugin whose last persisted state was enabled, sorted.
pub async fn list_enabled(db: &Database) -> Result<Vec<String>, WeftError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT name FROM plugin_state WHERE enabled = 1 ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(names)
        })
        .await
        .map_err(map_tr_err)
}

/// Every persisted state row, sorted by name.
pub async fn list_all(db: &Database) -> Result<Vec<PluginStateRecord>, WeftError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT name, enabled, version, enabled_at, disabled_at
                 FROM plugin_state ORDER BY name",
            )?;
            let records = stmt
                .query_map([], |row| {
                    Ok(PluginStateRecord {
                        name: row.get(0)?,
                        enabled: row.get(1)?,
                        version: row.get(2)?,
                        enabled_at: row.get(3)?,
                        disabled_at: row.get(4)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn upsert_and_get_round_trips() {
        let (db, _dir) = setup_db().await;

        upsert_state(&db, "store-browser", true, "1.0.0").await.unwrap();

        let record = get_state(&db, "store-browser").await.unwrap().unwrap();
        assert_eq!(record.name, "store-browser");
        assert!(record.enabled);
        assert_eq!(record.version, "1.0.0");
        assert!(record.enabled_at.is_some());
        assert!(record.disabled_at.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_unknown_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_state(&db, "no-such-plugin").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn disable_preserves_enabled_at() {
        let (db, _dir) = setup_db().await;

        upsert_state(&db, "p", true, "1.0.0").await.unwrap();
        let first = get_state(&db, "p").await.unwrap().unwrap();

        upsert_state(&db, "p", false, "1.0.0").await.unwrap();
        let second = get_state(&db, "p").await.unwrap().unwrap();

        assert!(!second.enabled);
        assert_eq!(second.enabled_at, first.enabled_at);
        assert!(second.disabled_at.is_some());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_enabled_filters_and_sorts() {
        let (db, _dir) = setup_db().await;

        upsert_state(&db, "zulu", true, "1.0.0").await.unwrap();
        upsert_state(&db, "alpha", true, "1.0.0").await.unwrap();
        upsert_state(&db, "mike", false, "1.0.0").await.unwrap();

        let names = list_enabled(&db).await.unwrap();
        assert_eq!(names, vec!["alpha", "zulu"]);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn list_all_returns_every_row() {
        let (db, _dir) = setup_db().await;

        upsert_state(&db, "a", true, "1.0.0").await.unwrap();
        upsert_state(&db, "b", false, "2.0.0").await.unwrap();

        let rows = list_all(&db).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "a");
        assert_eq!(rows[1].name, "b");
        assert!(rows[0].enabled);
        assert!(!rows[1].enabled);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn upsert_updates_version() {
        let (db, _dir) = setup_db().await;

        upsert_state(&db, "p", true, "1.0.0").await.unwrap();
        upsert_state(&db, "p", true, "1.1.0").await.unwrap();

        let record = get_state(&db, "p").await.unwrap().unwrap();
        assert_eq!(record.version, "1.1.0");

        let rows = list_all(&db).await.unwrap();
        assert_eq!(rows.len(), 1);

        db.close().await.unwrap();
    }
}
