//! Filesystem roots and derived paths.
//!
//! # Responsibility
//! - Load `configs.json` and overlay `configs.local.json` path entries.
//! - Expand `~` and derive registry/archive/alias/bucket paths.
//!
//! # Invariants
//! - Config is read-only after load; every derived path is computed from the
//!   four roots, never stored independently.

use crate::model::project::ProjectStatus;
use log::{debug, info};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "configs.json";
pub const LOCAL_CONFIG_FILE_NAME: &str = "configs.local.json";
pub const ALIASES_FILE_NAME: &str = ".bash_aliases";
const DEFAULT_TOOL_COMMAND: &str = "dubby";

const KEY_PROJECTS_LOCAL: &str = "projects-local";
const KEY_PROJECTS_MIRROR: &str = "projects-mirror";
const KEY_NOTES_STORE: &str = "notes-store";
const KEY_AGGREGATE_NOTES: &str = "aggregate-notes";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    MissingPath(&'static str),
    NoHomeDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Malformed { path, source } => {
                write!(f, "malformed config `{}`: {source}", path.display())
            }
            Self::MissingPath(key) => write!(f, "config is missing required path `{key}`"),
            Self::NoHomeDir => write!(f, "cannot expand `~`: home directory is unknown"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Malformed { source, .. } => Some(source),
            Self::MissingPath(_) | Self::NoHomeDir => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    paths: BTreeMap<String, String>,
    #[serde(rename = "tool-command")]
    tool_command: Option<String>,
}

/// Resolved configuration consumed by every core component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Root holding one working directory per local project.
    pub projects_local: PathBuf,
    /// External synchronized-storage root (per-project mirror folders, registry).
    pub projects_mirror: PathBuf,
    /// External notes store root with `pages` and `assets` subdirectories.
    pub notes_store: PathBuf,
    /// Aggregate-notes root used by `copy_notes_to_mirror`.
    pub aggregate_notes: PathBuf,
    /// Location of the generated alias file.
    pub aliases_file: PathBuf,
    /// Command the tool's own alias points at.
    pub tool_command: String,
}

impl AppConfig {
    /// Loads `configs.json` from `config_dir`, overlaying `configs.local.json`.
    pub fn load(config_dir: &Path) -> ConfigResult<Self> {
        let base_path = config_dir.join(CONFIG_FILE_NAME);
        let mut raw = read_raw(&base_path)?;

        let local_path = config_dir.join(LOCAL_CONFIG_FILE_NAME);
        if local_path.is_file() {
            let local = read_raw(&local_path)?;
            debug!(
                "event=config_overlay module=config status=ok keys={}",
                local.paths.len()
            );
            raw.paths.extend(local.paths);
            if local.tool_command.is_some() {
                raw.tool_command = local.tool_command;
            }
        }

        let config = Self {
            projects_local: required_path(&raw, KEY_PROJECTS_LOCAL)?,
            projects_mirror: required_path(&raw, KEY_PROJECTS_MIRROR)?,
            notes_store: required_path(&raw, KEY_NOTES_STORE)?,
            aggregate_notes: required_path(&raw, KEY_AGGREGATE_NOTES)?,
            aliases_file: config_dir.join(ALIASES_FILE_NAME),
            tool_command: raw
                .tool_command
                .unwrap_or_else(|| DEFAULT_TOOL_COMMAND.to_string()),
        };
        info!(
            "event=config_load module=config status=ok dir={}",
            config_dir.display()
        );
        Ok(config)
    }

    /// Builds a config from explicit roots, deriving everything else.
    pub fn from_roots(
        projects_local: impl Into<PathBuf>,
        projects_mirror: impl Into<PathBuf>,
        notes_store: impl Into<PathBuf>,
        aggregate_notes: impl Into<PathBuf>,
        aliases_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            projects_local: projects_local.into(),
            projects_mirror: projects_mirror.into(),
            notes_store: notes_store.into(),
            aggregate_notes: aggregate_notes.into(),
            aliases_file: aliases_file.into(),
            tool_command: DEFAULT_TOOL_COMMAND.to_string(),
        }
    }

    /// Manifest storage directory.
    pub fn registry_dir(&self) -> PathBuf {
        self.projects_mirror.join(".registry")
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.projects_mirror.join(".archive")
    }

    /// Working directory for `name`, whether or not it exists.
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.projects_local.join(name)
    }

    /// Bucket directory for one status: a sibling `<projects-local>--<status>`.
    pub fn status_bucket_dir(&self, status: ProjectStatus) -> PathBuf {
        // Rebuilding from components drops a trailing separator.
        let root: PathBuf = self.projects_local.components().collect();
        let mut raw = root.into_os_string();
        raw.push(format!("--{}", status.as_str()));
        PathBuf::from(raw)
    }

    pub fn mirror_folder(&self, name: &str) -> PathBuf {
        self.projects_mirror.join(name)
    }

    pub fn notes_pages_dir(&self) -> PathBuf {
        self.notes_store.join("pages")
    }

    pub fn notes_assets_dir(&self) -> PathBuf {
        self.notes_store.join("assets")
    }

    pub fn project_notes_dir(&self) -> PathBuf {
        self.aggregate_notes.join("project-notes")
    }
}

fn read_raw(path: &Path) -> ConfigResult<RawConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::Malformed {
        path: path.to_path_buf(),
        source,
    })
}

fn required_path(raw: &RawConfig, key: &'static str) -> ConfigResult<PathBuf> {
    let value = raw.paths.get(key).ok_or(ConfigError::MissingPath(key))?;
    expand_home(value)
}

/// Expands a leading `~` to the user's home directory.
pub fn expand_home(value: &str) -> ConfigResult<PathBuf> {
    if value == "~" {
        return dirs::home_dir().ok_or(ConfigError::NoHomeDir);
    }
    if let Some(rest) = value.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(value))
}
