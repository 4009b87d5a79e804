//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Enforce policies that belong above storage, such as per-owner capacity.

pub mod note_service;
