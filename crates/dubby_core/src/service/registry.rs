//! Registry use-case service.
//!
//! # Responsibility
//! - Create, materialize, mutate, list and delete projects.
//! - Compose the manifest repository, the symlink projections and the notes
//!   linker into single operations.
//!
//! # Invariants
//! - Every setter rewrites the full manifest before touching the filesystem.
//! - `create` never mutates anything when the name is taken.
//! - `delete` removes the manifest last; earlier steps are best-effort and
//!   individually confirmable.
//! - Materialization sub-steps are idempotent, so re-running `materialize`
//!   completes a partially initialized project.

use crate::aliases;
use crate::backup::{self, BackupError, BackupRequest};
use crate::config::AppConfig;
use crate::confirm::{AutoConfirm, Confirmer, StepOutcome};
use crate::model::project::{
    is_valid_project_name, InvalidStatus, Project, ProjectStatus,
};
use crate::notes::{self, NotesExportReport, NotesLinker, NotesSyncReport};
use crate::projection::{self, LinkDomains, ProjectionMode, ProjectionReport};
use crate::repo::manifest_repo::{JsonManifestRepository, ManifestError, ManifestRepository};
use crate::workon::ensure_workon_script;
use chrono::Local;
use log::{info, warn};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry operation error.
#[derive(Debug)]
pub enum RegistryError {
    /// No manifest exists for the name.
    NotFound(String),
    /// `create` on a name that already has a manifest.
    AlreadyExists(String),
    /// The name cannot key a manifest file and directory.
    InvalidName(String),
    InvalidStatus(InvalidStatus),
    /// The operation needs a local directory that does not exist.
    NotLocal(String),
    Manifest(ManifestError),
    /// Directory or symlink failure; earlier steps stay applied.
    Io(std::io::Error),
    Backup(BackupError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "no project named `{name}`"),
            Self::AlreadyExists(name) => write!(f, "a project named `{name}` already exists"),
            Self::InvalidName(name) => write!(f, "invalid project name `{name}`"),
            Self::InvalidStatus(err) => write!(f, "{err}"),
            Self::NotLocal(name) => write!(f, "project `{name}` has no local directory"),
            Self::Manifest(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "filesystem error: {err}"),
            Self::Backup(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidStatus(err) => Some(err),
            Self::Manifest(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Backup(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ManifestError> for RegistryError {
    fn from(value: ManifestError) -> Self {
        match value {
            ManifestError::NotFound(name) => Self::NotFound(name),
            other => Self::Manifest(other),
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<BackupError> for RegistryError {
    fn from(value: BackupError) -> Self {
        match value {
            BackupError::NotLocal(name) => Self::NotLocal(name),
            other => Self::Backup(other),
        }
    }
}

impl From<InvalidStatus> for RegistryError {
    fn from(value: InvalidStatus) -> Self {
        Self::InvalidStatus(value)
    }
}

/// Input for `Registry::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProjectRequest {
    pub name: String,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
}

impl CreateProjectRequest {
    /// Active project with no tags, tagline or description.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: ProjectStatus::Active,
            tags: Vec::new(),
            tagline: None,
            description: None,
        }
    }
}

/// Conjunctive list filter. Empty/`None` fields do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    /// Keeps projects sharing at least one of these tags.
    pub tags: Vec<String>,
    pub status: Option<ProjectStatus>,
    /// Keeps only projects whose local directory exists now.
    pub local: bool,
    pub org: Option<String>,
}

impl ProjectFilter {
    pub fn matches(&self, project: &Project) -> bool {
        if !self.tags.is_empty() && !self.tags.iter().any(|tag| project.tags.contains(tag)) {
            return false;
        }
        if self.status.is_some_and(|status| status != project.status) {
            return false;
        }
        if self.local && !project.is_local() {
            return false;
        }
        if let Some(org) = self.org.as_deref() {
            if project.org() != Some(org) {
                return false;
            }
        }
        true
    }
}

/// What one `materialize` run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterializeReport {
    pub local_dir_created: bool,
    pub workon_created: bool,
    pub notes: NotesSyncReport,
    pub symlinks: ProjectionReport,
}

/// Per-step outcome of `Registry::delete`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub notes: StepOutcome,
    pub local_dir: StepOutcome,
    pub symlinks: ProjectionReport,
    pub manifest: StepOutcome,
}

/// Collection-level project operations over a manifest repository.
pub struct Registry<R: ManifestRepository = JsonManifestRepository> {
    config: AppConfig,
    repo: R,
}

impl Registry<JsonManifestRepository> {
    /// Registry over `<projects-mirror>/.registry`.
    pub fn open(config: AppConfig) -> Self {
        let repo =
            JsonManifestRepository::new(config.registry_dir(), config.projects_local.clone());
        Self::new(config, repo)
    }
}

impl<R: ManifestRepository> Registry<R> {
    pub fn new(config: AppConfig, repo: R) -> Self {
        Self { config, repo }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn get(&self, name: &str) -> RegistryResult<Project> {
        Ok(self.repo.load(name)?)
    }

    /// Persists a new manifest and materializes its local presence, then
    /// refreshes the alias file.
    ///
    /// # Errors
    /// - `AlreadyExists` before any mutation when the name is taken.
    /// - `InvalidName` for names that cannot key a file.
    /// - Filesystem errors partway leave a partial local directory that
    ///   `materialize` can complete.
    pub fn create(
        &self,
        request: CreateProjectRequest,
    ) -> RegistryResult<(Project, MaterializeReport)> {
        if !is_valid_project_name(&request.name) {
            return Err(RegistryError::InvalidName(request.name));
        }
        if self.repo.exists(&request.name) {
            warn!(
                "event=project_create module=registry status=error project={} error_code=already_exists",
                request.name
            );
            return Err(RegistryError::AlreadyExists(request.name));
        }

        let local_path = self.config.local_path(&request.name);
        let mut project = Project::new(request.name, request.status, local_path);
        project.add_tags(&request.tags);
        project.tagline = request.tagline;
        project.description = request.description;
        self.repo.save(&project)?;
        info!(
            "event=project_create module=registry status=ok project={} org={}",
            project.name,
            project.org().unwrap_or("-")
        );

        let report = self.materialize(&project)?;
        self.sync_aliases()?;
        Ok((project, report))
    }

    /// Builds (or completes) the local presence of an existing project:
    /// directory, notes links, startup script, both symlink projections.
    pub fn materialize(&self, project: &Project) -> RegistryResult<MaterializeReport> {
        let local_dir_created = !project.local_path.is_dir();
        std::fs::create_dir_all(&project.local_path)?;

        let notes = NotesLinker::new(&self.config).sync(project)?;
        let workon_created = ensure_workon_script(&project.local_path)?;
        let symlinks = self.sync_symlinks(project, LinkDomains::All)?;

        info!(
            "event=project_materialize module=registry status=ok project={} dir_created={}",
            project.name, local_dir_created
        );
        Ok(MaterializeReport {
            local_dir_created,
            workon_created,
            notes,
            symlinks,
        })
    }

    /// Removes a project: external pages, local directory, symlinks, and
    /// finally the manifest. Declined steps are reported as `Retained`.
    pub fn delete(
        &self,
        name: &str,
        confirmer: &mut dyn Confirmer,
    ) -> RegistryResult<DeleteReport> {
        let project = self.get(name)?;
        let was_local = project.is_local();

        let notes = self.remove_note_pages(&project, confirmer)?;
        let local_dir = self.remove_local_dir(&project, confirmer)?;
        let symlinks = projection::remove_symlinks(
            &self.config,
            &project,
            LinkDomains::All,
            was_local,
            confirmer,
        )?;

        let manifest = if confirmer.confirm(
            "Delete project manifest? This removes the project from the registry, \
             though local directories may exist on other systems.",
            true,
        ) {
            self.repo.delete(name)?;
            StepOutcome::Removed
        } else {
            StepOutcome::Retained
        };

        info!(
            "event=project_delete module=registry status=ok project={} manifest={:?}",
            name, manifest
        );
        Ok(DeleteReport {
            notes,
            local_dir,
            symlinks,
            manifest,
        })
    }

    /// Every project matching `filter`, ordered case-insensitively by name.
    pub fn list(&self, filter: &ProjectFilter) -> RegistryResult<Vec<Project>> {
        let projects = self.repo.list_all()?;
        Ok(projects
            .into_iter()
            .filter(|project| filter.matches(project))
            .collect())
    }

    /// Sorted distinct organizations among matching projects.
    pub fn list_orgs(&self, filter: &ProjectFilter) -> RegistryResult<Vec<String>> {
        let orgs: BTreeSet<String> = self
            .list(filter)?
            .iter()
            .filter_map(|project| project.org().map(str::to_string))
            .collect();
        Ok(orgs.into_iter().collect())
    }

    /// Sorted distinct tags among matching projects.
    pub fn list_tags(&self, filter: &ProjectFilter) -> RegistryResult<Vec<String>> {
        let tags: BTreeSet<String> = self
            .list(filter)?
            .into_iter()
            .flat_map(|project| project.tags)
            .collect();
        Ok(tags.into_iter().collect())
    }

    /// Persists the new status and re-projects the status index.
    pub fn set_status(
        &self,
        project: &mut Project,
        status: ProjectStatus,
    ) -> RegistryResult<ProjectionReport> {
        project.status = status;
        self.repo.save(project)?;
        info!(
            "event=set_status module=registry status=ok project={} value={}",
            project.name, status
        );
        self.sync_symlinks(project, LinkDomains::Status)
    }

    /// String form of `set_status`. An unknown status is logged and ignored:
    /// returns `Ok(None)` without mutating anything.
    pub fn set_status_str(
        &self,
        project: &mut Project,
        status: &str,
    ) -> RegistryResult<Option<ProjectionReport>> {
        match status.parse::<ProjectStatus>() {
            Ok(parsed) => self.set_status(project, parsed).map(Some),
            Err(err) => {
                warn!(
                    "event=set_status module=registry status=skip project={} reason=invalid_status value={}",
                    project.name, err.0
                );
                Ok(None)
            }
        }
    }

    pub fn add_tags(&self, project: &mut Project, tags: &[String]) -> RegistryResult<()> {
        project.add_tags(tags);
        Ok(self.repo.save(project)?)
    }

    pub fn remove_tags(&self, project: &mut Project, tags: &[String]) -> RegistryResult<()> {
        project.remove_tags(tags);
        Ok(self.repo.save(project)?)
    }

    pub fn set_description(
        &self,
        project: &mut Project,
        description: Option<String>,
    ) -> RegistryResult<()> {
        project.description = description;
        Ok(self.repo.save(project)?)
    }

    pub fn set_tagline(
        &self,
        project: &mut Project,
        tagline: Option<String>,
    ) -> RegistryResult<()> {
        project.tagline = tagline;
        Ok(self.repo.save(project)?)
    }

    /// Applies the selected projections. Non-local projects are left untouched.
    pub fn sync_symlinks(
        &self,
        project: &Project,
        domains: LinkDomains,
    ) -> RegistryResult<ProjectionReport> {
        // Apply never prompts; the confirmer is only consulted on removal.
        let mut no_prompt = AutoConfirm::no();
        Ok(projection::sync_symlinks(
            &self.config,
            project,
            domains,
            ProjectionMode::Apply,
            &mut no_prompt,
        )?)
    }

    pub fn sync_notes(&self, project: &Project) -> RegistryResult<NotesSyncReport> {
        if !project.is_local() {
            return Err(RegistryError::NotLocal(project.name.clone()));
        }
        Ok(NotesLinker::new(&self.config).sync(project)?)
    }

    pub fn copy_notes_to_mirror(&self, project: &Project) -> RegistryResult<NotesExportReport> {
        Ok(notes::copy_notes_to_mirror(&self.config, project)?)
    }

    /// Regenerates the alias file from all local projects. Returns how many
    /// projects received aliases.
    pub fn sync_aliases(&self) -> RegistryResult<usize> {
        let projects = self.repo.list_all()?;
        Ok(aliases::sync_aliases(
            &self.config.aliases_file,
            &self.config.tool_command,
            &projects,
        )?)
    }

    /// Archives the local directory; returns the archive path.
    pub fn backup(&self, project: &Project, request: &BackupRequest) -> RegistryResult<PathBuf> {
        let target_dir = request
            .target_dir
            .clone()
            .unwrap_or_else(|| self.config.projects_local.clone());
        Ok(backup::backup_project(
            project,
            &target_dir,
            request,
            Local::now().date_naive(),
        )?)
    }

    fn remove_note_pages(
        &self,
        project: &Project,
        confirmer: &mut dyn Confirmer,
    ) -> RegistryResult<StepOutcome> {
        let pages: Vec<PathBuf> = NotesLinker::new(&self.config)
            .project_pages(&project.name)?
            .into_iter()
            .map(|(page, _)| page)
            .filter(|page| page.is_file())
            .collect();
        if pages.is_empty() {
            return Ok(StepOutcome::Absent);
        }

        let listing = pages
            .iter()
            .map(|page| format!("  {}", page.display()))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!("Existing note pages:\n{listing}\nDelete these files?");
        if !confirmer.confirm(&prompt, true) {
            warn!(
                "event=project_delete module=registry status=skip project={} step=notes reason=declined",
                project.name
            );
            return Ok(StepOutcome::Retained);
        }
        for page in &pages {
            std::fs::remove_file(page)?;
        }
        Ok(StepOutcome::Removed)
    }

    fn remove_local_dir(
        &self,
        project: &Project,
        confirmer: &mut dyn Confirmer,
    ) -> RegistryResult<StepOutcome> {
        if !project.is_local() {
            return Ok(StepOutcome::Absent);
        }
        let prompt = format!(
            "Delete local project directory `{}`?",
            project.local_path.display()
        );
        if !confirmer.confirm(&prompt, true) {
            warn!(
                "event=project_delete module=registry status=skip project={} step=local_dir reason=declined",
                project.name
            );
            return Ok(StepOutcome::Retained);
        }
        std::fs::remove_dir_all(&project.local_path)?;
        Ok(StepOutcome::Removed)
    }
}
