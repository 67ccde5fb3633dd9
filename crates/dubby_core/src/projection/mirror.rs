//! Mirror link: `<local_path>/Mirror` -> `<projects-mirror>/<name>`.

use super::{ProjectionMode, ProjectionReport};
use crate::config::AppConfig;
use crate::confirm::{Confirmer, StepOutcome};
use crate::links::{points_to, remove_symlink, symlink};
use crate::model::project::Project;
use log::{debug, info, warn};

/// Name of the link inside each local project directory.
pub const MIRROR_LINK_NAME: &str = "Mirror";

/// Reconciles the mirror link for `project`.
///
/// - `Apply`: ensure the mirror folder exists and the link points at it. A link
///   pointing elsewhere is unlinked and re-created; a correct one is left alone.
/// - `Remove`: drop the link, then delete the mirror folder if the operator
///   confirms. A failed folder deletion is reported, not returned as an error.
///   When `owns_folder` is false the folder belongs to another machine's
///   checkout and is never offered for deletion.
pub fn project_mirror(
    config: &AppConfig,
    project: &Project,
    mode: ProjectionMode,
    owns_folder: bool,
    confirmer: &mut dyn Confirmer,
) -> std::io::Result<ProjectionReport> {
    let mut report = ProjectionReport::default();
    std::fs::create_dir_all(&config.projects_mirror)?;

    let folder = config.mirror_folder(&project.name);
    let link = project.local_path.join(MIRROR_LINK_NAME);

    match mode {
        ProjectionMode::Apply => {
            if !folder.is_dir() {
                std::fs::create_dir(&folder)?;
            }
            if !points_to(&link, &folder) {
                if remove_symlink(&link)? {
                    report.removed.push(link.clone());
                }
                symlink(&folder, &link)?;
                report.created.push(link);
            }
        }
        ProjectionMode::Remove => {
            if remove_symlink(&link)? {
                report.removed.push(link);
            }
            report.mirror_folder = Some(if owns_folder {
                remove_mirror_folder(project, &folder, confirmer)
            } else {
                debug!(
                    "event=mirror_folder_remove module=projection status=skip project={} reason=not_local",
                    project.name
                );
                StepOutcome::Skipped
            });
        }
    }

    debug!(
        "event=mirror_projection module=projection status=ok project={} created={} removed={}",
        project.name,
        report.created.len(),
        report.removed.len()
    );
    Ok(report)
}

fn remove_mirror_folder(
    project: &Project,
    folder: &std::path::Path,
    confirmer: &mut dyn Confirmer,
) -> StepOutcome {
    if !folder.is_dir() {
        return StepOutcome::Absent;
    }
    let prompt = format!("Delete the mirror folder `{}`?", folder.display());
    if !confirmer.confirm(&prompt, true) {
        info!(
            "event=mirror_folder_remove module=projection status=skip project={} reason=declined",
            project.name
        );
        return StepOutcome::Retained;
    }
    match std::fs::remove_dir_all(folder) {
        Ok(()) => {
            info!(
                "event=mirror_folder_remove module=projection status=ok project={}",
                project.name
            );
            StepOutcome::Removed
        }
        Err(err) => {
            warn!(
                "event=mirror_folder_remove module=projection status=error project={} error={}",
                project.name, err
            );
            StepOutcome::Failed(err.to_string())
        }
    }
}
