//! Copies a project's linked notes into `<aggregate-notes>/project-notes/<name>/`.

use super::linker::{ASSETS_DIR_NAME, NOTES_DIR_NAME};
use crate::config::AppConfig;
use crate::model::project::Project;
use log::info;
use std::io;
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesExportReport {
    pub pages_copied: usize,
    pub assets_copied: usize,
}

/// Copies every `Notes/*.md` (following links) and the `assets` tree into the
/// aggregate-notes root. Existing destination files are overwritten.
pub fn copy_notes_to_mirror(
    config: &AppConfig,
    project: &Project,
) -> io::Result<NotesExportReport> {
    let destination = config.project_notes_dir().join(&project.name);
    std::fs::create_dir_all(&destination)?;

    let notes_dir = project.local_path.join(NOTES_DIR_NAME);
    let mut report = NotesExportReport::default();

    if notes_dir.is_dir() {
        let mut pages = Vec::new();
        for entry in std::fs::read_dir(&notes_dir)? {
            let path = entry?.path();
            let is_page = path.extension().is_some_and(|ext| ext == "md") && path.is_file();
            if is_page {
                pages.push(path);
            }
        }
        for page in pages {
            if let Some(file_name) = page.file_name() {
                std::fs::copy(&page, destination.join(file_name))?;
                report.pages_copied += 1;
            }
        }
    }

    let assets_dir = notes_dir.join(ASSETS_DIR_NAME);
    if assets_dir.is_dir() {
        let assets_destination = destination.join(ASSETS_DIR_NAME);
        for entry in WalkDir::new(&assets_dir).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let relative = entry
                .path()
                .strip_prefix(&assets_dir)
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
            let target = assets_destination.join(relative);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
                continue;
            }
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::copy(entry.path(), &target)?;
            report.assets_copied += 1;
        }
    }

    info!(
        "event=notes_export module=notes status=ok project={} pages={} assets={}",
        project.name, report.pages_copied, report.assets_copied
    );
    Ok(report)
}
