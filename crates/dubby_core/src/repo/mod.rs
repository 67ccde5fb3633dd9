//! Manifest persistence.
//!
//! # Responsibility
//! - Define the manifest repository contract used by the registry.
//! - Keep file layout and JSON details behind that contract.
//!
//! # Invariants
//! - One manifest file per project, `<registry-dir>/<name>.json`.
//! - Saves overwrite the whole record; there is no merge.

pub mod manifest_repo;
