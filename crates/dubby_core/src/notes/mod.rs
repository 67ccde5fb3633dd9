//! External notes store projection.
//!
//! # Responsibility
//! - Map external note pages onto `Notes/` links inside a project directory.
//! - Link image assets referenced by those pages into `Notes/assets/`.
//! - Prune local links whose external page disappeared.
//! - Copy a project's notes into the aggregate-notes root.
//!
//! # Invariants
//! - Every link left in `Notes/` resolves to an existing file.
//! - `Notes/assets/` exists only while it holds at least one entry.

pub mod export;
pub mod linker;
pub mod naming;
pub mod page_template;

pub use export::{copy_notes_to_mirror, NotesExportReport};
pub use linker::{NotesLinker, NotesSyncReport, ASSETS_DIR_NAME, NOTES_DIR_NAME};
