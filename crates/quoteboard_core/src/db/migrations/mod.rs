//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Bring a connection from its stored schema version to the latest one
//!   inside a single transaction.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Each applied step is mirrored to `PRAGMA user_version`.
//! - `quote.quote_id` is `AUTOINCREMENT`, so deleted ids are never reissued.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::{Connection, Transaction};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

impl Migration {
    fn apply(&self, tx: &Transaction<'_>) -> DbResult<()> {
        tx.execute_batch(self.sql)?;
        tx.pragma_update(None, "user_version", self.version)?;
        debug!(
            "event=db_migrate_step module=db status=ok version={}",
            self.version
        );
        Ok(())
    }
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_init.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Upgrades the connection's schema to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
/// - Any SQLite failure; the transaction is rolled back on drop.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();

    match from.cmp(&to) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from,
                latest_supported: to,
            })
        }
        Ordering::Equal => {
            debug!("event=db_migrate module=db status=skip version={from}");
            return Ok(());
        }
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for migration in pending(from) {
        migration.apply(&tx)?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={to}");
    Ok(())
}

fn pending(from: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS
        .iter()
        .filter(move |migration| migration.version > from)
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
