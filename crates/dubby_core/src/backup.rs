//! Dated tarball of a project's local directory via the system `tar`.

use crate::model::project::Project;
use crate::notes::NOTES_DIR_NAME;
use crate::projection::MIRROR_LINK_NAME;
use chrono::NaiveDate;
use log::{error, info};
use std::error::Error;
use std::ffi::OsString;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::process::Command;

const TAR_PROGRAM: &str = "tar";
const ARCHIVE_SEPARATOR: &str = "___";

/// Directory names never archived, in addition to caller exclusions.
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    NOTES_DIR_NAME,
    MIRROR_LINK_NAME,
    "node_modules",
    "env",
    "ENV",
    "__pycache__",
];

#[derive(Debug)]
pub enum BackupError {
    NotLocal(String),
    Io(std::io::Error),
    TarFailed { status: Option<i32> },
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotLocal(name) => write!(f, "project `{name}` has no local directory to back up"),
            Self::Io(err) => write!(f, "backup failed: {err}"),
            Self::TarFailed { status: Some(code) } => write!(f, "tar exited with status {code}"),
            Self::TarFailed { status: None } => write!(f, "tar was terminated by a signal"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BackupError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Caller-supplied backup options; every call owns its own exclusion list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupRequest {
    pub exclude: Vec<String>,
    /// Defaults to the local-projects root.
    pub target_dir: Option<PathBuf>,
}

/// `<name>___<YYYY-MM-DD>.tar.gz`
pub fn archive_file_name(project_name: &str, date: NaiveDate) -> String {
    format!(
        "{project_name}{ARCHIVE_SEPARATOR}{}.tar.gz",
        date.format("%Y-%m-%d")
    )
}

/// Arguments for `tar`, archiving `local_path` by its name relative to its parent.
pub fn tar_arguments(
    local_path: &Path,
    archive_path: &Path,
    extra_exclusions: &[String],
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-C".into()];
    args.push(
        local_path
            .parent()
            .unwrap_or_else(|| Path::new("/"))
            .as_os_str()
            .to_owned(),
    );

    let exclusions = DEFAULT_EXCLUSIONS
        .iter()
        .map(|name| (*name).to_string())
        .chain(extra_exclusions.iter().cloned());
    for exclusion in exclusions {
        args.push("--exclude".into());
        args.push(exclusion.into());
    }

    args.push("-czf".into());
    args.push(archive_path.as_os_str().to_owned());
    args.push(
        local_path
            .file_name()
            .map(ToOwned::to_owned)
            .unwrap_or_default(),
    );
    args
}

/// Archives the project's local directory into `target_dir`.
/// Returns the archive path.
pub fn backup_project(
    project: &Project,
    target_dir: &Path,
    request: &BackupRequest,
    date: NaiveDate,
) -> Result<PathBuf, BackupError> {
    if !project.is_local() {
        return Err(BackupError::NotLocal(project.name.clone()));
    }
    std::fs::create_dir_all(target_dir)?;

    let archive_path = target_dir.join(archive_file_name(&project.name, date));
    let status = Command::new(TAR_PROGRAM)
        .args(tar_arguments(&project.local_path, &archive_path, &request.exclude))
        .status()?;
    if !status.success() {
        error!(
            "event=backup module=backup status=error project={} exit_code={:?}",
            project.name,
            status.code()
        );
        return Err(BackupError::TarFailed {
            status: status.code(),
        });
    }

    info!(
        "event=backup module=backup status=ok project={} archive={}",
        project.name,
        archive_path.display()
    );
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::{archive_file_name, tar_arguments};
    use chrono::NaiveDate;
    use std::ffi::OsString;
    use std::path::Path;

    #[test]
    fn archive_name_is_dated() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(archive_file_name("acme__site", date), "acme__site___2026-03-07.tar.gz");
    }

    #[test]
    fn tar_arguments_exclude_fixed_and_extra_names() {
        let args = tar_arguments(
            Path::new("/home/me/projects/acme"),
            Path::new("/backups/acme___2026-03-07.tar.gz"),
            &["target".to_string()],
        );
        let args: Vec<String> = args
            .into_iter()
            .map(|arg: OsString| arg.to_string_lossy().into_owned())
            .collect();

        assert_eq!(&args[..2], ["-C", "/home/me/projects"]);
        assert!(args.windows(2).any(|pair| pair == ["--exclude", "Notes"]));
        assert!(args.windows(2).any(|pair| pair == ["--exclude", "Mirror"]));
        assert!(args.windows(2).any(|pair| pair == ["--exclude", "target"]));
        assert_eq!(
            &args[args.len() - 3..],
            ["-czf", "/backups/acme___2026-03-07.tar.gz", "acme"]
        );
    }
}
