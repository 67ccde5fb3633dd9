//! Notes linker: external pages -> `<local_path>/Notes/` links.
//!
//! # Invariants
//! - Page links are created only when absent and are never replaced, so a
//!   renamed external page gains a new link while the old one lingers until its
//!   target disappears.
//! - Asset links are always replaced.
//! - Pruning removes top-level `Notes/` links that no longer resolve to a file.

use super::naming::{local_link_name, page_prefix, primary_page_file_name, PAGE_EXTENSION};
use super::page_template::render_primary_page;
use crate::config::AppConfig;
use crate::links::{is_dangling_file_link, remove_symlink, symlink};
use crate::model::project::Project;
use chrono::{Local, NaiveDate};
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};

pub const NOTES_DIR_NAME: &str = "Notes";
pub const ASSETS_DIR_NAME: &str = "assets";

static ASSET_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.\./assets/([^)\s]+)").expect("valid asset reference regex"));

/// Changes made by one `NotesLinker::sync` run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotesSyncReport {
    /// The primary page did not exist and was seeded.
    pub page_created: bool,
    /// Local page links created in this run.
    pub linked: Vec<String>,
    /// Asset links (re)created in this run.
    pub assets_linked: Vec<String>,
    /// Dangling links removed in this run.
    pub pruned: Vec<String>,
}

/// Projects a project's external pages into its local `Notes` directory.
pub struct NotesLinker<'a> {
    config: &'a AppConfig,
    today: NaiveDate,
}

impl<'a> NotesLinker<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self::with_date(config, Local::now().date_naive())
    }

    /// Linker whose seeded pages carry `today` as their creation date.
    pub fn with_date(config: &'a AppConfig, today: NaiveDate) -> Self {
        Self { config, today }
    }

    /// Ensures the primary page, links every matching page and its assets, then
    /// prunes dangling links.
    ///
    /// # Errors
    /// - `NotFound` when the project has no local directory.
    /// - Any filesystem failure; earlier steps stay applied.
    pub fn sync(&self, project: &Project) -> io::Result<NotesSyncReport> {
        if !project.is_local() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("project `{}` has no local directory", project.name),
            ));
        }

        let mut report = NotesSyncReport {
            page_created: self.ensure_primary_page(&project.name)?,
            ..NotesSyncReport::default()
        };

        let notes_dir = project.local_path.join(NOTES_DIR_NAME);
        let assets_dir = notes_dir.join(ASSETS_DIR_NAME);
        std::fs::create_dir_all(&assets_dir)?;

        for (page, link_name) in self.project_pages(&project.name)? {
            let link = notes_dir.join(&link_name);
            if !link.is_symlink() {
                symlink(&page, &link)?;
                report.linked.push(link_name);
            }
            for asset in asset_references(&std::fs::read(&page)?) {
                if !is_plain_asset_name(&asset) {
                    warn!(
                        "event=notes_asset_skip module=notes status=skip project={} reason=nested_path",
                        project.name
                    );
                    continue;
                }
                self.link_asset(&assets_dir, &asset)?;
                report.assets_linked.push(asset);
            }
        }

        if std::fs::read_dir(&assets_dir)?.next().is_none() {
            std::fs::remove_dir(&assets_dir)?;
        }

        report.pruned = prune_dangling_links(&notes_dir)?;

        info!(
            "event=notes_sync module=notes status=ok project={} page_created={} linked={} assets={} pruned={}",
            project.name,
            report.page_created,
            report.linked.len(),
            report.assets_linked.len(),
            report.pruned.len()
        );
        Ok(report)
    }

    /// External pages belonging to `project_name`, with their local link names,
    /// sorted by path.
    pub fn project_pages(&self, project_name: &str) -> io::Result<Vec<(PathBuf, String)>> {
        let pattern = format!(
            "{}/{}*{PAGE_EXTENSION}",
            glob::Pattern::escape(&self.config.notes_pages_dir().to_string_lossy()),
            glob::Pattern::escape(&page_prefix(project_name))
        );
        let entries = glob::glob(&pattern)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

        let mut pages = Vec::new();
        for entry in entries {
            let path = entry.map_err(glob::GlobError::into_error)?;
            let Some(file_name) = path.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            match local_link_name(file_name, project_name) {
                Some(link_name) => pages.push((path.clone(), link_name)),
                None => debug!(
                    "event=notes_page_skip module=notes status=skip project={} reason=foreign_page",
                    project_name
                ),
            }
        }
        pages.sort();
        Ok(pages)
    }

    /// Seeds `projects___<name>.md` when missing. Returns whether it was created.
    fn ensure_primary_page(&self, project_name: &str) -> io::Result<bool> {
        let pages_dir = self.config.notes_pages_dir();
        let page = pages_dir.join(primary_page_file_name(project_name));
        if page.is_file() {
            return Ok(false);
        }
        std::fs::create_dir_all(&pages_dir)?;
        std::fs::write(&page, render_primary_page(self.today))?;
        info!(
            "event=notes_page_create module=notes status=ok project={}",
            project_name
        );
        Ok(true)
    }

    fn link_asset(&self, assets_dir: &Path, asset: &str) -> io::Result<()> {
        let link = assets_dir.join(asset);
        remove_symlink(&link)?;
        symlink(&self.config.notes_assets_dir().join(asset), &link)
    }
}

/// Image file names referenced as `../assets/<file>` in page text.
pub fn asset_references(content: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(content);
    ASSET_REF_RE
        .captures_iter(&text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Single file name inside the shared assets directory.
fn is_plain_asset_name(asset: &str) -> bool {
    !asset.contains(['/', '\\']) && asset != "." && asset != ".."
}

fn prune_dangling_links(notes_dir: &Path) -> io::Result<Vec<String>> {
    let mut pruned = Vec::new();
    for entry in std::fs::read_dir(notes_dir)? {
        let path = entry?.path();
        if is_dangling_file_link(&path) && remove_symlink(&path)? {
            pruned.push(path.file_name().map_or_else(String::new, |name| {
                name.to_string_lossy().into_owned()
            }));
        }
    }
    pruned.sort();
    Ok(pruned)
}
