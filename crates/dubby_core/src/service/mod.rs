//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, projection and notes calls into registry-level APIs.
//! - Keep CLI callers decoupled from storage and filesystem details.

pub mod registry;
