//! Note use-case service.
//!
//! # Responsibility
//! - Provide note create/search/update/delete entry points for dispatchers.
//! - Enforce the per-owner capacity policy before inserts.
//!
//! # Invariants
//! - The repository stays capacity-agnostic; the cap is checked here, before
//!   `add_note` touches storage.
//! - Service APIs never bypass repository ownership scoping.

use crate::model::note::{Note, NoteId, OwnerId};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Matches the original dispatcher's per-user cap.
pub const DEFAULT_MAX_NOTES_PER_OWNER: u64 = 50;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// The owner already holds the maximum number of notes.
    LimitReached { count: u64, max: u64 },
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LimitReached { count, max } => {
                write!(f, "note limit reached: {count} of {max}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::LimitReached { .. } => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Capacity snapshot for one owner, used by usage reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteUsage {
    /// Notes currently held by the owner.
    pub count: u64,
    /// Configured per-owner maximum.
    pub max: u64,
    /// Room left before `add_note` starts failing with `LimitReached`.
    pub remaining: u64,
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    max_notes_per_owner: u64,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service with the default per-owner capacity.
    pub fn new(repo: R) -> Self {
        Self::with_capacity(repo, DEFAULT_MAX_NOTES_PER_OWNER)
    }

    /// Creates a service with an explicit per-owner capacity.
    pub fn with_capacity(repo: R, max_notes_per_owner: u64) -> Self {
        Self {
            repo,
            max_notes_per_owner,
        }
    }

    /// Adds one note after checking the owner's capacity.
    pub fn add_note(&self, owner_id: OwnerId, text: &str) -> Result<NoteId, NoteServiceError> {
        let count = self.repo.count_notes(owner_id)?;
        if count >= self.max_notes_per_owner {
            return Err(NoteServiceError::LimitReached {
                count,
                max: self.max_notes_per_owner,
            });
        }
        Ok(self.repo.add_note(owner_id, text)?)
    }

    /// Gets one owned note by id.
    pub fn get_note(&self, owner_id: OwnerId, note_id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_note(owner_id, note_id)
    }

    /// Lists the owner's notes, newest first.
    pub fn list_notes(&self, owner_id: OwnerId, limit: Option<u32>) -> RepoResult<Vec<Note>> {
        self.repo.list_notes(owner_id, limit)
    }

    /// Finds the owner's notes containing a literal substring.
    pub fn find_notes(
        &self,
        owner_id: OwnerId,
        query: &str,
        limit: Option<u32>,
    ) -> RepoResult<Vec<Note>> {
        self.repo.find_notes(owner_id, query, limit)
    }

    /// Replaces the text of one owned note.
    pub fn update_note(&self, owner_id: OwnerId, note_id: NoteId, text: &str) -> RepoResult<bool> {
        self.repo.update_note(owner_id, note_id, text)
    }

    /// Deletes one owned note.
    pub fn delete_note(&self, owner_id: OwnerId, note_id: NoteId) -> RepoResult<bool> {
        self.repo.delete_note(owner_id, note_id)
    }

    /// Reports the owner's capacity usage.
    pub fn usage(&self, owner_id: OwnerId) -> RepoResult<NoteUsage> {
        let count = self.repo.count_notes(owner_id)?;
        Ok(NoteUsage {
            count,
            max: self.max_notes_per_owner,
            remaining: self.max_notes_per_owner.saturating_sub(count),
        })
    }
}
