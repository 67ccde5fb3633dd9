//! Project domain model.
//!
//! # Responsibility
//! - Define the in-memory `Project` and its persisted `ManifestRecord` shape.
//! - Keep derived attributes (organization, locality) as pure computations.
//!
//! # Invariants
//! - The manifest is the only persisted state; everything else is recomputed.

pub mod project;
