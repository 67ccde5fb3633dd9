//! Status-bucket index: one `<projects-local>--<status>` directory per status.
//!
//! Apply is create-correct-then-remove-incorrect, so a project is never in
//! zero buckets mid-run and any starting state converges to exactly one.

use super::{ProjectionMode, ProjectionReport};
use crate::config::AppConfig;
use crate::links::{remove_symlink, symlink};
use crate::model::project::{Project, ProjectStatus};
use log::debug;
use std::path::PathBuf;

/// Reconciles the project's bucket links with its current status.
///
/// - `Apply`: link `bucket[status]/<name>` to `local_path` unless a symlink
///   already sits there (never replaced in place), then remove the project's
///   link from the other buckets.
/// - `Remove`: remove the project's link from every bucket.
pub fn project_status(
    config: &AppConfig,
    project: &Project,
    mode: ProjectionMode,
) -> std::io::Result<ProjectionReport> {
    let mut report = ProjectionReport::default();
    let links = bucket_links(config, &project.name)?;

    match mode {
        ProjectionMode::Remove => {
            for (_, link) in &links {
                if remove_symlink(link)? {
                    report.removed.push(link.clone());
                }
            }
        }
        ProjectionMode::Apply => {
            for (status, link) in &links {
                if *status == project.status && !link.is_symlink() {
                    symlink(&project.local_path, link)?;
                    report.created.push(link.clone());
                }
            }
            for (status, link) in &links {
                if *status != project.status && remove_symlink(link)? {
                    report.removed.push(link.clone());
                }
            }
        }
    }

    debug!(
        "event=status_projection module=projection status=ok project={} target={} created={} removed={}",
        project.name,
        project.status,
        report.created.len(),
        report.removed.len()
    );
    Ok(report)
}

/// Ensures all bucket directories exist and returns each bucket's link path.
fn bucket_links(config: &AppConfig, name: &str) -> std::io::Result<Vec<(ProjectStatus, PathBuf)>> {
    ProjectStatus::ALL
        .iter()
        .map(|status| {
            let dir = config.status_bucket_dir(*status);
            std::fs::create_dir_all(&dir)?;
            Ok((*status, dir.join(name)))
        })
        .collect()
}
