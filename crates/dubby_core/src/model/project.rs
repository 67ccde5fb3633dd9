//! Project entity and manifest record.
//!
//! # Responsibility
//! - Combine persisted manifest fields with configuration-derived fields.
//! - Own tag-set mutation semantics and organization derivation.
//!
//! # Invariants
//! - `name` is immutable and equals the manifest base filename.
//! - `org` is parsed from `name` on demand, never cached.
//! - `is_local` probes the filesystem on every call.
//! - Tags are a set; serialization emits them sorted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

/// Reserved separator between organization and the rest of a project name.
pub const ORG_SEPARATOR: &str = "__";

/// Lifecycle status; each value owns one status bucket directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Active,
    Inactive,
    Archived,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [Self::Active, Self::Inactive, Self::Archived];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }
}

impl Display for ProjectStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = InvalidStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "archived" => Ok(Self::Archived),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Status string outside `active|inactive|archived`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl Display for InvalidStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid status `{}`; expected active|inactive|archived",
            self.0
        )
    }
}

impl Error for InvalidStatus {}

/// On-disk manifest shape, one JSON file per project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    pub status: ProjectStatus,
    /// Written for readers of the file; ignored on load in favor of the name.
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tagline: Option<String>,
}

/// A registry project: manifest fields plus derived local presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub status: ProjectStatus,
    pub tags: BTreeSet<String>,
    pub tagline: Option<String>,
    pub description: Option<String>,
    /// `<projects-local>/<name>`, computed from configuration at load time.
    pub local_path: PathBuf,
}

impl Project {
    pub fn new(name: impl Into<String>, status: ProjectStatus, local_path: PathBuf) -> Self {
        Self {
            name: name.into(),
            status,
            tags: BTreeSet::new(),
            tagline: None,
            description: None,
            local_path,
        }
    }

    /// Rebuilds a project from its manifest. Any stored `org` is discarded.
    pub fn from_manifest(
        name: impl Into<String>,
        record: ManifestRecord,
        local_path: PathBuf,
    ) -> Self {
        Self {
            name: name.into(),
            status: record.status,
            tags: normalize_tags(record.tags),
            tagline: record.tagline,
            description: record.description,
            local_path,
        }
    }

    pub fn to_manifest(&self) -> ManifestRecord {
        ManifestRecord {
            status: self.status,
            org: self.org().map(str::to_string),
            tags: self.tags.iter().cloned().collect(),
            description: self.description.clone(),
            tagline: self.tagline.clone(),
        }
    }

    pub fn org(&self) -> Option<&str> {
        derive_org(&self.name)
    }

    pub fn is_local(&self) -> bool {
        self.local_path.is_dir()
    }

    /// Unions `tags` into the set. Returns whether the set changed.
    pub fn add_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.tags.len();
        self.tags.extend(normalize_tags(tags));
        self.tags.len() != before
    }

    /// Removes every listed tag. Returns whether the set changed.
    pub fn remove_tags<I, S>(&mut self, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let doomed = normalize_tags(tags);
        let before = self.tags.len();
        self.tags.retain(|tag| !doomed.contains(tag));
        self.tags.len() != before
    }
}

/// Organization prefix: the substring before the first `__`, if any.
///
/// `"acme__site"` -> `Some("acme")`; `"site"` -> `None`.
pub fn derive_org(name: &str) -> Option<&str> {
    name.split_once(ORG_SEPARATOR).map(|(org, _)| org)
}

/// Whether `name` can key a manifest file and a directory.
pub fn is_valid_project_name(name: &str) -> bool {
    !name.trim().is_empty()
        && name.trim() == name
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
}

/// Trims tag values and drops blanks; the result is ordered.
pub fn normalize_tags<I, S>(tags: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .filter_map(|tag| {
            let trimmed = tag.as_ref().trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .collect()
}
