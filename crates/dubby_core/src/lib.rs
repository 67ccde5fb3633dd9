//! Core domain logic for dubby, a personal project registry.
//!
//! Manifests are the single source of truth; every directory, symlink and
//! generated file is a projection re-derivable from them.

pub mod aliases;
pub mod backup;
pub mod config;
pub mod confirm;
pub mod links;
pub mod logging;
pub mod model;
pub mod notes;
pub mod projection;
pub mod repo;
pub mod service;
pub mod workon;

pub use backup::{BackupError, BackupRequest};
pub use config::{AppConfig, ConfigError};
pub use confirm::{AutoConfirm, Confirmer, StepOutcome};
pub use logging::{default_log_level, init_logging};
pub use model::project::{derive_org, InvalidStatus, ManifestRecord, Project, ProjectStatus};
pub use notes::{NotesExportReport, NotesLinker, NotesSyncReport};
pub use projection::{LinkDomains, ProjectionMode, ProjectionReport};
pub use repo::manifest_repo::{
    JsonManifestRepository, ManifestError, ManifestRepository, ManifestResult,
};
pub use service::registry::{
    CreateProjectRequest, DeleteReport, MaterializeReport, ProjectFilter, Registry, RegistryError,
    RegistryResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
