//! Schema steps for the `kv_entries` table.
//!
//! `MIGRATIONS` is ordered by `version`; the highest applied version is kept
//! in `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Pending steps run in one transaction, so a failure leaves the schema at
/// its previous version.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();
    if from > to {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .skip_while(|migration| migration.version <= from)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    info!("event=db_migrate module=db status=start from={from} to={to}");
    let tx = conn.transaction()?;
    for migration in pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;
    info!("event=db_migrate module=db status=ok from={from} to={to}");

    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
