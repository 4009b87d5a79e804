//! Selectable-model catalog domain model.
//!
//! # Invariants
//! - `id` and `key` are stable across restarts (seeded at bootstrap).
//! - At most one catalog entry carries `active = true` at any time; the
//!   registry and a storage-level unique index enforce this jointly.

use serde::{Deserialize, Serialize};

/// Stable catalog entry identifier.
pub type ItemId = i64;

/// One selectable model in the fixed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Seeded primary key, never reassigned.
    pub id: ItemId,
    /// Globally unique opaque key handed to the upstream API.
    pub key: String,
    /// Human-readable name shown by the dispatcher.
    pub label: String,
    /// Whether this entry is the one currently in effect.
    pub active: bool,
}
