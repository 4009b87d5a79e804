//! Domain model for notes and the selectable-model catalog.
//!
//! # Responsibility
//! - Define canonical data structures used by core persistence logic.
//! - Keep record shapes in one place, independent of SQL details.
//!
//! # Invariants
//! - Every note belongs to exactly one owner; ownership never changes.
//! - Catalog entries are identified by stable integer ids seeded once.

pub mod catalog;
pub mod note;
