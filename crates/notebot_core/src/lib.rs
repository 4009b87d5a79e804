//! Core persistence logic for the notebot command dispatcher.
//! This crate is the single source of truth for storage invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::catalog::{CatalogItem, ItemId};
pub use model::note::{Note, NoteId, OwnerId};
pub use repo::catalog_repo::{CatalogRegistry, RegistryError, RegistryResult, SqliteCatalogRegistry};
pub use repo::note_repo::{
    NoteRepository, RepoError, RepoResult, SqliteNoteRepository, DEFAULT_LIST_LIMIT,
};
pub use service::note_service::{NoteService, NoteServiceError, NoteUsage};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
