#![allow(dead_code)]

use dubby_core::{AppConfig, JsonManifestRepository, Project, ProjectStatus, Registry};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temp roots laid out like a real install.
pub struct Fixture {
    _tmp: TempDir,
    pub config: AppConfig,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        std::fs::create_dir_all(root.join("projects")).unwrap();
        std::fs::create_dir_all(root.join("notes/pages")).unwrap();
        std::fs::create_dir_all(root.join("notes/assets")).unwrap();
        let config = AppConfig::from_roots(
            root.join("projects"),
            root.join("mirror"),
            root.join("notes"),
            root.join("aggregate"),
            root.join("config/.bash_aliases"),
        );
        Self { _tmp: tmp, config }
    }

    pub fn registry(&self) -> Registry<JsonManifestRepository> {
        Registry::open(self.config.clone())
    }

    /// A project value whose local directory exists, without any manifest.
    pub fn local_project(&self, name: &str, status: ProjectStatus) -> Project {
        let project = Project::new(name, status, self.config.local_path(name));
        std::fs::create_dir_all(&project.local_path).unwrap();
        project
    }

    pub fn page(&self, file_name: &str) -> PathBuf {
        self.config.notes_pages_dir().join(file_name)
    }

    pub fn write_page(&self, file_name: &str, content: &str) -> PathBuf {
        let path = self.page(file_name);
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn bucket_link(&self, status: ProjectStatus, name: &str) -> PathBuf {
        self.config.status_bucket_dir(status).join(name)
    }

    /// Statuses whose bucket currently holds a link for `name`.
    pub fn buckets_holding(&self, name: &str) -> Vec<ProjectStatus> {
        ProjectStatus::ALL
            .into_iter()
            .filter(|status| self.bucket_link(*status, name).is_symlink())
            .collect()
    }
}

/// Sorted entry names of a directory.
pub fn entry_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
