//! Active-selection registry over the fixed model catalog.
//!
//! # Responsibility
//! - Expose the seeded catalog and the single globally-active entry.
//! - Own the atomic active-flag swap transaction.
//!
//! # Invariants
//! - Exactly one entry is active at any observable instant once the catalog
//!   is non-empty; `ux_model_catalog_single_active` backstops this in storage.
//! - `set_active` either swaps completely or changes nothing.
//! - Racing `set_active` calls serialize on the immediate-transaction write
//!   lock: last committer wins, the final state is whichever committed last.
//!   A caller that cannot take the lock within the busy timeout observes
//!   `RepoError::Unavailable` and may retry.

use crate::model::catalog::{CatalogItem, ItemId};
use crate::repo::note_repo::RepoError;
use crate::repo::{ensure_schema_version, ensure_table};
use log::{info, warn};
use rusqlite::{Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry error for catalog lookup and active-swap operations.
#[derive(Debug)]
pub enum RegistryError {
    /// The catalog has zero rows. Fatal misconfiguration; not retried.
    EmptyCatalog,
    /// The referenced id is absent from the catalog. Nothing was changed.
    UnknownItem(ItemId),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCatalog => write!(f, "model catalog has no entries"),
            Self::UnknownItem(id) => write!(f, "unknown catalog item id: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

/// Registry interface for the single-select model catalog.
pub trait CatalogRegistry {
    /// Lists the whole catalog ordered by id ascending.
    fn list_items(&self) -> RegistryResult<Vec<CatalogItem>>;
    /// Returns the active entry, promoting the lowest-id entry when no flag
    /// is set (self-healing recovery, persisted).
    fn get_active(&mut self) -> RegistryResult<CatalogItem>;
    /// Atomically moves the active flag to the requested entry.
    fn set_active(&mut self, item_id: ItemId) -> RegistryResult<CatalogItem>;
}

/// SQLite-backed catalog registry.
pub struct SqliteCatalogRegistry<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCatalogRegistry<'conn> {
    /// Constructs a registry from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RegistryResult<Self> {
        ensure_schema_version(conn)?;
        ensure_table(conn, "model_catalog", &["id", "key", "label", "active"])?;
        Ok(Self { conn })
    }
}

impl CatalogRegistry for SqliteCatalogRegistry<'_> {
    fn list_items(&self) -> RegistryResult<Vec<CatalogItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, key, label, active FROM model_catalog ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(CatalogItem {
                id: row.get("id")?,
                key: row.get("key")?,
                label: row.get("label")?,
                active: row.get::<_, i64>("active")? == 1,
            });
        }
        Ok(items)
    }

    fn get_active(&mut self) -> RegistryResult<CatalogItem> {
        // Fast path: a flagged row exists, no write needed.
        if let Some(item) = query_active(self.conn)? {
            return Ok(item);
        }

        // No flag set (fresh catalog or manually cleared state). Promote the
        // lowest-id entry inside one immediate transaction so concurrent
        // callers serialize on the same recovery write.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if let Some(item) = query_active(&tx)? {
            // Another caller healed the flag before we took the lock.
            tx.commit()?;
            return Ok(item);
        }

        let lowest = tx
            .query_row(
                "SELECT id, key, label FROM model_catalog ORDER BY id ASC LIMIT 1;",
                [],
                |row| {
                    Ok((
                        row.get::<_, ItemId>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((id, key, label)) = lowest else {
            return Err(RegistryError::EmptyCatalog);
        };

        tx.execute(
            "UPDATE model_catalog SET active = CASE WHEN id = ?1 THEN 1 ELSE 0 END;",
            [id],
        )?;
        tx.commit()?;

        warn!("event=active_recovered module=catalog status=ok item_id={id}");
        Ok(CatalogItem {
            id,
            key,
            label,
            active: true,
        })
    }

    fn set_active(&mut self, item_id: ItemId) -> RegistryResult<CatalogItem> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let target = tx
            .query_row(
                "SELECT key, label FROM model_catalog WHERE id = ?1;",
                [item_id],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        let Some((key, label)) = target else {
            // Dropping the transaction rolls back; catalog state unchanged.
            return Err(RegistryError::UnknownItem(item_id));
        };

        // Clear-then-set inside the transaction keeps the partial unique
        // index satisfied; the swap is atomic to any concurrent reader.
        tx.execute("UPDATE model_catalog SET active = 0 WHERE active = 1;", [])?;
        tx.execute(
            "UPDATE model_catalog SET active = 1 WHERE id = ?1;",
            [item_id],
        )?;
        tx.commit()?;

        info!("event=set_active module=catalog status=ok item_id={item_id}");
        Ok(CatalogItem {
            id: item_id,
            key,
            label,
            active: true,
        })
    }
}

fn query_active(conn: &Connection) -> RegistryResult<Option<CatalogItem>> {
    let item = conn
        .query_row(
            "SELECT id, key, label FROM model_catalog WHERE active = 1;",
            [],
            |row| {
                Ok(CatalogItem {
                    id: row.get(0)?,
                    key: row.get(1)?,
                    label: row.get(2)?,
                    active: true,
                })
            },
        )
        .optional()?;
    Ok(item)
}
