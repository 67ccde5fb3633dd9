//! Symlink projections derived from a `Project`.
//!
//! # Responsibility
//! - Reconcile the status-bucket index and the mirror link against a project.
//! - Report exactly which links each run created or removed.
//!
//! # Invariants
//! - Both domains are re-derivable from a `Project` alone and never read back
//!   as a source of truth.
//! - Every step is safe to repeat from any intermediate state; a second run
//!   with an unchanged project reports no changes.
//! - Apply only runs for local projects. Remove always deletes links, but the
//!   mirror folder is offered for deletion only when the project was local on
//!   this machine when teardown began.

use crate::config::AppConfig;
use crate::confirm::{Confirmer, StepOutcome};
use crate::model::project::Project;
use log::{debug, info};
use std::path::PathBuf;

pub mod mirror;
pub mod status_index;

pub use mirror::{project_mirror, MIRROR_LINK_NAME};
pub use status_index::project_status;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionMode {
    Apply,
    /// Tear down for project deletion.
    Remove,
}

/// Which symlink domains a sync touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkDomains {
    All,
    Status,
    Mirror,
}

impl LinkDomains {
    fn includes_status(self) -> bool {
        matches!(self, Self::All | Self::Status)
    }

    fn includes_mirror(self) -> bool {
        matches!(self, Self::All | Self::Mirror)
    }
}

/// Filesystem changes made by one projection run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionReport {
    pub created: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
    /// Set only by a mirror remove run.
    pub mirror_folder: Option<StepOutcome>,
}

impl ProjectionReport {
    /// True when the run created and removed nothing.
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty()
            && self.removed.is_empty()
            && !matches!(self.mirror_folder, Some(StepOutcome::Removed))
    }

    fn absorb(&mut self, other: ProjectionReport) {
        self.created.extend(other.created);
        self.removed.extend(other.removed);
        if other.mirror_folder.is_some() {
            self.mirror_folder = other.mirror_folder;
        }
    }
}

/// Runs the selected projections for `project`.
pub fn sync_symlinks(
    config: &AppConfig,
    project: &Project,
    domains: LinkDomains,
    mode: ProjectionMode,
    confirmer: &mut dyn Confirmer,
) -> std::io::Result<ProjectionReport> {
    let is_local = project.is_local();
    if mode == ProjectionMode::Apply && !is_local {
        debug!(
            "event=sync_symlinks module=projection status=skip project={} reason=not_local",
            project.name
        );
        return Ok(ProjectionReport::default());
    }
    run_projections(config, project, domains, mode, is_local, confirmer)
}

/// Remove-mode sync for a teardown that may already have deleted the local
/// directory. `was_local` is the project's local presence sampled before that.
pub fn remove_symlinks(
    config: &AppConfig,
    project: &Project,
    domains: LinkDomains,
    was_local: bool,
    confirmer: &mut dyn Confirmer,
) -> std::io::Result<ProjectionReport> {
    run_projections(config, project, domains, ProjectionMode::Remove, was_local, confirmer)
}

fn run_projections(
    config: &AppConfig,
    project: &Project,
    domains: LinkDomains,
    mode: ProjectionMode,
    was_local: bool,
    confirmer: &mut dyn Confirmer,
) -> std::io::Result<ProjectionReport> {
    let mut report = ProjectionReport::default();
    if domains.includes_status() {
        report.absorb(project_status(config, project, mode)?);
    }
    if domains.includes_mirror() {
        report.absorb(project_mirror(config, project, mode, was_local, confirmer)?);
    }

    info!(
        "event=sync_symlinks module=projection status=ok project={} mode={:?} created={} removed={}",
        project.name,
        mode,
        report.created.len(),
        report.removed.len()
    );
    Ok(report)
}
