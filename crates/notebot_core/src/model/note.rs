//! Note domain model.
//!
//! # Invariants
//! - `id` is assigned by storage and never reused for another note.
//! - `owner_id` is immutable once the note is created.
//! - Only `text` is mutable over a note's lifetime.

use serde::{Deserialize, Serialize};

/// Storage-assigned note identifier.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type NoteId = i64;

/// External user id that scopes note visibility and mutation rights.
pub type OwnerId = i64;

/// A single per-owner text note as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Monotonically assigned storage id, global across owners.
    pub id: NoteId,
    /// Owning user. Every query path filters on this value.
    pub owner_id: OwnerId,
    /// Note body. Non-empty after trimming by repository contract.
    pub text: String,
    /// Creation time in Unix epoch milliseconds, set by storage.
    pub created_at: i64,
}
