//! Manifest repository contract and JSON-file implementation.
//!
//! # Responsibility
//! - Load, save, list and delete project manifests.
//! - Attach configuration-derived `local_path` on load.
//!
//! # Invariants
//! - Serialization is deterministic: sorted tags, `null` for absent optionals.
//! - Malformed JSON is returned as an error, never skipped.
//! - `list_all` orders projects case-insensitively by name.

use crate::model::project::{ManifestRecord, Project};
use log::{debug, error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const MANIFEST_EXTENSION: &str = "json";

pub type ManifestResult<T> = Result<T, ManifestError>;

#[derive(Debug)]
pub enum ManifestError {
    NotFound(String),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Display for ManifestError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "no manifest for project `{name}`"),
            Self::Io { path, source } => {
                write!(f, "manifest io failure at `{}`: {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "malformed manifest `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for ManifestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
        }
    }
}

/// Repository interface for project manifests.
pub trait ManifestRepository {
    fn exists(&self, name: &str) -> bool;
    fn load(&self, name: &str) -> ManifestResult<Project>;
    /// Writes the full record, creating the manifest directory if needed.
    fn save(&self, project: &Project) -> ManifestResult<()>;
    fn list_all(&self) -> ManifestResult<Vec<Project>>;
    fn delete(&self, name: &str) -> ManifestResult<()>;
}

/// Manifest files under a registry directory.
#[derive(Debug, Clone)]
pub struct JsonManifestRepository {
    registry_dir: PathBuf,
    projects_local: PathBuf,
}

impl JsonManifestRepository {
    pub fn new(registry_dir: impl Into<PathBuf>, projects_local: impl Into<PathBuf>) -> Self {
        Self {
            registry_dir: registry_dir.into(),
            projects_local: projects_local.into(),
        }
    }

    pub fn manifest_path(&self, name: &str) -> PathBuf {
        self.registry_dir.join(format!("{name}.{MANIFEST_EXTENSION}"))
    }

    fn load_path(&self, name: &str, path: &Path) -> ManifestResult<Project> {
        let text = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        let record: ManifestRecord = serde_json::from_str(&text).map_err(|source| {
            error!(
                "event=manifest_load module=repo status=error project={} error_code=malformed",
                name
            );
            ManifestError::Malformed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(Project::from_manifest(name, record, self.projects_local.join(name)))
    }
}

impl ManifestRepository for JsonManifestRepository {
    fn exists(&self, name: &str) -> bool {
        self.manifest_path(name).is_file()
    }

    fn load(&self, name: &str) -> ManifestResult<Project> {
        let path = self.manifest_path(name);
        if !path.is_file() {
            return Err(ManifestError::NotFound(name.to_string()));
        }
        self.load_path(name, &path)
    }

    fn save(&self, project: &Project) -> ManifestResult<()> {
        std::fs::create_dir_all(&self.registry_dir)
            .map_err(|source| io_error(&self.registry_dir, source))?;

        let path = self.manifest_path(&project.name);
        let body = serialize_manifest(&project.to_manifest()).map_err(|source| {
            ManifestError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        std::fs::write(&path, body).map_err(|source| io_error(&path, source))?;
        info!(
            "event=manifest_save module=repo status=ok project={}",
            project.name
        );
        Ok(())
    }

    fn list_all(&self) -> ManifestResult<Vec<Project>> {
        if !self.registry_dir.is_dir() {
            return Ok(Vec::new());
        }

        let pattern = format!(
            "{}/*.{MANIFEST_EXTENSION}",
            glob::Pattern::escape(&self.registry_dir.to_string_lossy())
        );
        let entries = glob::glob(&pattern).map_err(|err| {
            io_error(
                &self.registry_dir,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
            )
        })?;

        let mut named = Vec::new();
        for entry in entries {
            let path = entry.map_err(|err| {
                let path = err.path().to_path_buf();
                io_error(&path, err.into_error())
            })?;
            if !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                named.push((stem.to_string(), path.clone()));
            }
        }
        named.sort_by_key(|(name, _)| name.to_lowercase());

        let projects = named
            .iter()
            .map(|(name, path)| self.load_path(name, path))
            .collect::<ManifestResult<Vec<_>>>()?;
        debug!(
            "event=manifest_list module=repo status=ok count={}",
            projects.len()
        );
        Ok(projects)
    }

    fn delete(&self, name: &str) -> ManifestResult<()> {
        let path = self.manifest_path(name);
        if !path.is_file() {
            return Err(ManifestError::NotFound(name.to_string()));
        }
        std::fs::remove_file(&path).map_err(|source| io_error(&path, source))?;
        info!(
            "event=manifest_delete module=repo status=ok project={}",
            name
        );
        Ok(())
    }
}

/// Pretty JSON with two-space indentation, as stored on disk.
pub fn serialize_manifest(record: &ManifestRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(record)
}

fn io_error(path: &Path, source: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.to_path_buf(),
        source,
    }
}
